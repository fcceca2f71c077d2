use crate::domain::ScanResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Shown(ScanResult),
}

// Only begin/settle/abandon touch `phase`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub url: String,
    phase: Phase,
    request_seq: u64,
}

impl UiState {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn result(&self) -> Option<&ScanResult> {
        match &self.phase {
            Phase::Shown(result) => Some(result),
            Phase::Idle | Phase::Loading => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn request_seq(&self) -> u64 {
        self.request_seq
    }

    pub(crate) fn begin(&mut self) -> u64 {
        self.request_seq += 1;
        self.phase = Phase::Loading;
        self.request_seq
    }

    pub(crate) fn settle(&mut self, ticket: u64, result: ScanResult) -> bool {
        if ticket != self.request_seq {
            return false;
        }
        self.phase = Phase::Shown(result);
        true
    }

    // Drops loading for a request that ended without a result.
    pub(crate) fn abandon(&mut self, ticket: u64) -> bool {
        if ticket != self.request_seq || !self.is_loading() {
            return false;
        }
        self.phase = Phase::Idle;
        true
    }
}
