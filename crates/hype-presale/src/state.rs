//! Shell-side state: notices, task results and the countdown.

use alloy::primitives::B256;
use hype_presale_core::{
    ConfirmationRecord, ConnectOutcome, FlowError, PendingHandle, ReconcileState, TransferKind,
};

const HOUR_MS: u64 = 60 * 60 * 1000;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Presale closes one day and eighteen hours after the page opens.
pub const COUNTDOWN_MS: u64 = DAY_MS + 18 * HOUR_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTone {
    Info,
    Success,
    Error,
}

/// Blocking notification; the user dismisses it before continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: NoticeTone,
    pub message: String,
    pub link: Option<String>,
}

/// Results posted back by wallet tasks.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Connected(Result<ConnectOutcome, FlowError>),
    Switched(Result<ReconcileState, FlowError>),
    Submitted {
        kind: TransferKind,
        result: Result<PendingHandle, FlowError>,
    },
    Confirmed {
        handle: PendingHandle,
        result: Result<ConfirmationRecord, FlowError>,
    },
}

#[derive(Debug, Default)]
pub struct UiState {
    pub amount: String,
    pub notices: Vec<Notice>,
    pub awaiting: Option<B256>,
    /// Set once a deep link has been followed; the page is about to unload.
    pub redirecting: bool,
}

impl UiState {
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            tone: NoticeTone::Error,
            message: message.into(),
            link: None,
        });
    }

    pub fn push_info(&mut self, message: impl Into<String>, link: Option<String>) {
        self.notices.push(Notice {
            tone: NoticeTone::Info,
            message: message.into(),
            link,
        });
    }

    pub fn push_success(&mut self, message: impl Into<String>, link: Option<String>) {
        self.notices.push(Notice {
            tone: NoticeTone::Success,
            message: message.into(),
            link,
        });
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.first()
    }

    pub fn dismiss_notice(&mut self) {
        if !self.notices.is_empty() {
            self.notices.remove(0);
        }
    }
}

/// `(days, hours)` left after `elapsed_ms`, floored and clamped at zero.
pub fn countdown_parts(elapsed_ms: u64) -> (u64, u64) {
    let remaining = COUNTDOWN_MS.saturating_sub(elapsed_ms);
    (remaining / DAY_MS, (remaining / HOUR_MS) % 24)
}

/// User-facing text for a failed flow.
pub fn failure_text(context: &str, err: &FlowError) -> String {
    match err {
        FlowError::Port(hype_presale_core::PortError::ProviderUnavailable(reason))
            if reason == "Please install MetaMask!" =>
        {
            reason.clone()
        }
        FlowError::WrongNetwork { .. } => {
            let mut text = err.to_string();
            if let Some(first) = text.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            text
        }
        other => format!("{context} failed: {other}"),
    }
}
