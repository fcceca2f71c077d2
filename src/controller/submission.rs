use tokio::sync::watch;

use crate::{
    api::ScanService,
    domain::{ScanRequest, ScanResult},
};

use super::state::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Applied,
    Superseded,
}

/// Owns the single [`UiState`]. Overlapping submits are allowed; only the
/// latest one may write its result.
pub struct SubmissionController<S> {
    service: S,
    state: watch::Sender<UiState>,
}

impl<S: ScanService> SubmissionController<S> {
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(UiState::default());
        Self { service, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn set_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.state.send_if_modified(|state| {
            if state.url == url {
                return false;
            }
            state.url = url;
            true
        });
    }

    pub async fn submit_url(&self, url: impl Into<String>) -> SubmitOutcome {
        self.set_url(url);
        self.submit().await
    }

    /// Scans the current `url`. Any previous result is cleared before the
    /// request goes out, and loading is released on every exit path.
    pub async fn submit(&self) -> SubmitOutcome {
        let mut ticket = 0;
        let mut request = ScanRequest::new(String::new());
        self.state.send_modify(|state| {
            ticket = state.begin();
            request.url.clone_from(&state.url);
        });
        tracing::info!(target: "controller", ticket, url = %request.url, "scan submitted");

        let in_flight = InFlight {
            state: &self.state,
            ticket,
            settled: false,
        };

        let result = match self.service.scan(&request).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(target: "controller", ticket, error = %err, "scan request failed");
                ScanResult::client_failure(err.to_string())
            }
        };

        let outcome = in_flight.settle(result);
        if outcome == SubmitOutcome::Superseded {
            tracing::debug!(target: "controller", ticket, "discarding stale scan response");
        }
        outcome
    }
}

struct InFlight<'a> {
    state: &'a watch::Sender<UiState>,
    ticket: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, result: ScanResult) -> SubmitOutcome {
        self.settled = true;
        let ticket = self.ticket;
        if self
            .state
            .send_if_modified(move |state| state.settle(ticket, result))
        {
            SubmitOutcome::Applied
        } else {
            SubmitOutcome::Superseded
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let ticket = self.ticket;
        if self.state.send_if_modified(|state| state.abandon(ticket)) {
            tracing::debug!(target: "controller", ticket, "scan dropped before it settled");
        }
    }
}
