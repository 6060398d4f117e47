use std::fmt;

/// Where a prompt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    LoadingHistory,
    AwaitingModel { round: usize },
    ToolRound { round: usize, calls: usize },
    Done,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnState::LoadingHistory => write!(f, "loading history"),
            TurnState::AwaitingModel { round } => write!(f, "awaiting model (round {round})"),
            TurnState::ToolRound { round, calls } => {
                write!(f, "tool round {round} ({calls} calls)")
            }
            TurnState::Done => write!(f, "done"),
        }
    }
}
