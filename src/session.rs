use serde::{Deserialize, Serialize};

/// Lifecycle of a typing session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    #[default]
    NoText,
    Ready,
    Running,
    Completed,
}

/// Something the engine observed that may move the session to another status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A target text was (re)selected and all progress cleared.
    Selected { has_text: bool },
    /// Input was reconciled against the target.
    InputApplied {
        accepted: usize,
        target_len: usize,
        timer_started: bool,
    },
}

impl GameStatus {
    pub fn transition(self, event: SessionEvent) -> GameStatus {
        match (self, event) {
            (_, SessionEvent::Selected { has_text: true }) => GameStatus::Ready,
            (_, SessionEvent::Selected { has_text: false }) => GameStatus::NoText,
            // completed sessions only leave through reselection
            (GameStatus::Completed, SessionEvent::InputApplied { .. }) => GameStatus::Completed,
            (GameStatus::NoText, SessionEvent::InputApplied { .. }) => GameStatus::NoText,
            (
                GameStatus::Ready | GameStatus::Running,
                SessionEvent::InputApplied {
                    accepted,
                    target_len,
                    timer_started,
                },
            ) => {
                if target_len > 0 && accepted == target_len {
                    GameStatus::Completed
                } else if timer_started {
                    GameStatus::Running
                } else {
                    GameStatus::Ready
                }
            }
        }
    }

    pub fn is_completed(self) -> bool {
        self == GameStatus::Completed
    }
}

/// Metrics at one instant; rebuilt on every engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    pub status: GameStatus,
    pub target_length: usize,
    pub typed_length: usize,
    pub errors: usize,
    pub accuracy: f64,
    pub wpm: u32,
    pub elapsed_seconds: f64,
    pub started: bool,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankProgress {
    /// 1-based; 0 when the bank is empty.
    pub position: usize,
    pub total: usize,
    pub has_next: bool,
}

impl BankProgress {
    pub fn new(index: usize, total: usize) -> Self {
        Self {
            position: if total == 0 { 0 } else { index + 1 },
            total,
            has_next: index + 1 < total,
        }
    }
}

/// Payload returned by every engine command except `summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metrics: GameMetrics,
    /// Only present when the command selected a text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_text: Option<String>,
    pub typed_text: String,
    pub bank_progress: BankProgress,
}
