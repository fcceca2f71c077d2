use std::{
    future::Future,
    io::{self, BufRead, Write},
    sync::Arc,
    thread,
};

use anyhow::Result;
use tokio::{sync::mpsc, task::JoinSet};

use crate::{
    api::ScanService,
    config::DisplayConfig,
    controller::{Phase, SubmissionController, UiState},
    domain::ScanResult,
    presenter::present,
};

pub struct Session<S> {
    controller: Arc<SubmissionController<S>>,
    renderer: Renderer,
}

impl<S: ScanService + 'static> Session<S> {
    pub fn new(controller: Arc<SubmissionController<S>>, display: DisplayConfig) -> Self {
        Self {
            controller,
            renderer: Renderer::new(display),
        }
    }

    pub async fn run(self) -> Result<()> {
        eprintln!("MalURL Scanner: enter one URL per line, Ctrl+D to quit");
        self.drive(spawn_line_reader(), io::stdout(), tokio::signal::ctrl_c())
            .await
    }

    /// Submits every received line and renders each state change to `out`.
    /// Returns once `interrupt` fires, or once `lines` is closed and every
    /// in-flight request has settled.
    pub async fn drive<W, F>(
        mut self,
        mut lines: mpsc::UnboundedReceiver<String>,
        mut out: W,
        interrupt: F,
    ) -> Result<()>
    where
        W: Write,
        F: Future,
    {
        let mut updates = self.controller.subscribe();
        let mut in_flight = JoinSet::new();
        let mut input_open = true;
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                _ = &mut interrupt => {
                    tracing::info!(target: "session", pending = in_flight.len(), "interrupted");
                    break;
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = updates.borrow_and_update().clone();
                    self.renderer.render(&state, &mut out)?;
                }
                line = lines.recv(), if input_open => match line {
                    Some(line) => {
                        let controller = self.controller.clone();
                        in_flight.spawn(async move { controller.submit_url(line).await });
                    }
                    None => {
                        tracing::debug!(target: "session", "input closed");
                        input_open = false;
                    }
                },
                Some(joined) = in_flight.join_next() => {
                    if let Err(err) = joined {
                        if err.is_panic() {
                            tracing::error!(target: "session", "scan task panicked");
                        }
                    }
                }
            }

            if !input_open && in_flight.is_empty() {
                break;
            }
        }

        if updates.has_changed().unwrap_or(false) {
            let state = updates.borrow_and_update().clone();
            self.renderer.render(&state, &mut out)?;
        }
        Ok(())
    }
}

// Blocking stdin lives on its own thread so shutdown never waits on a read.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line.trim().to_string()).is_err() {
                break;
            }
        }
    });
    rx
}

// Each (request, loading) pair is written once. JSON mode skips the progress
// line so stdout stays a stream of JSON documents.
pub struct Renderer {
    display: DisplayConfig,
    last: Option<(u64, bool)>,
}

impl Renderer {
    pub fn new(display: DisplayConfig) -> Self {
        Self {
            display,
            last: None,
        }
    }

    pub fn render<W: Write>(&mut self, state: &UiState, out: &mut W) -> io::Result<()> {
        let key = (state.request_seq(), state.is_loading());
        if self.last == Some(key) {
            return Ok(());
        }
        self.last = Some(key);

        match state.phase() {
            Phase::Idle => {}
            Phase::Loading if self.display.json => {}
            Phase::Loading => writeln!(out, "Scanning {}...", state.url)?,
            Phase::Shown(result) => write_result(result, &self.display, out)?,
        }
        out.flush()
    }
}

pub fn write_result<W: Write>(
    result: &ScanResult,
    display: &DisplayConfig,
    out: &mut W,
) -> io::Result<()> {
    if display.json {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)
    } else {
        write!(out, "{}", present(Some(result), display.top_contributions))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use super::*;
    use crate::api::testing::{verdict, GatedService};

    fn display(json: bool) -> DisplayConfig {
        DisplayConfig {
            top_contributions: 8,
            json,
        }
    }

    fn rendered(renderer: &mut Renderer, state: &UiState) -> String {
        let mut out = Vec::new();
        renderer.render(state, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_loading_then_result_once_each() {
        let mut renderer = Renderer::new(display(false));
        let mut state = UiState::default();
        state.url = "https://down.test".to_string();
        assert_eq!(rendered(&mut renderer, &state), "");

        let ticket = state.begin();
        assert_eq!(rendered(&mut renderer, &state), "Scanning https://down.test...\n");
        assert_eq!(rendered(&mut renderer, &state), "");

        state.settle(ticket, ScanResult::client_failure("Failed to fetch"));
        assert_eq!(rendered(&mut renderer, &state), "Failed to fetch\n");

        state.url.push('/');
        assert_eq!(rendered(&mut renderer, &state), "");
    }

    #[test]
    fn json_mode_keeps_progress_off_stdout() {
        let mut renderer = Renderer::new(display(true));
        let mut state = UiState::default();
        state.url = "https://slow.test".to_string();

        let ticket = state.begin();
        assert_eq!(rendered(&mut renderer, &state), "");

        state.settle(ticket, ScanResult::client_failure("Failed to fetch"));
        let value: serde_json::Value =
            serde_json::from_str(&rendered(&mut renderer, &state)).unwrap();
        assert_eq!(value["error"], "Failed to fetch");
    }

    #[test]
    fn json_mode_reports_failure_origin() {
        let mut out = Vec::new();
        write_result(
            &ScanResult::server_failure("url rejected"),
            &display(true),
            &mut out,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["error"], "url rejected");
        assert_eq!(value["origin"], "server");
    }

    #[derive(Clone, Default)]
    struct SharedOutput(Arc<Mutex<Vec<u8>>>);

    impl SharedOutput {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn wait_for_text(output: &SharedOutput, needle: &str) {
        let appeared = tokio::time::timeout(Duration::from_secs(5), async {
            while !output.text().contains(needle) {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(appeared.is_ok(), "{needle:?} never printed: {:?}", output.text());
    }

    #[tokio::test]
    async fn latest_line_wins_and_eof_waits_for_in_flight_scans() {
        let service = Arc::new(GatedService::default());
        let controller = Arc::new(SubmissionController::new(service.clone()));
        let first_gate = service.gate("https://first.test");
        let second_gate = service.gate("https://second.test");

        let output = SharedOutput::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(controller.clone(), display(false));
        let run = tokio::spawn(session.drive(rx, output.clone(), std::future::pending::<()>()));

        tx.send("https://first.test".to_string()).unwrap();
        wait_for_text(&output, "Scanning https://first.test...").await;
        tx.send("https://second.test".to_string()).unwrap();
        wait_for_text(&output, "Scanning https://second.test...").await;
        drop(tx);

        second_gate.send(Ok(verdict("https://second.test"))).unwrap();
        wait_for_text(&output, "URL: https://second.test").await;
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        assert!(!run.is_finished());

        first_gate.send(Ok(verdict("https://first.test"))).unwrap();
        run.await.unwrap().unwrap();

        assert_eq!(
            output.text(),
            "Scanning https://first.test...\n\
             Scanning https://second.test...\n\
             URL: https://second.test\n\
             Rule score: 0.200 (benign)\n\
             Top contributions\n"
        );
        assert!(!controller.snapshot().is_loading());
    }
}
