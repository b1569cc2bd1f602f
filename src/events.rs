use crate::data::calls::ActionRequest;
use crate::data::history::HistoryOutcome;
use crate::data::poller::SnapshotState;
use crate::data::types::ReadGroup;
use crate::data::workflow::TxWorkflow;

/// Pages the user can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Token,
    Swap,
    History,
}

impl View {
    pub const ALL: [View; 3] = [View::Token, View::Swap, View::History];

    pub fn title(&self) -> &'static str {
        match self {
            View::Token => "Token",
            View::Swap => "Swap",
            View::History => "History",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Token => 0,
            View::Swap => 1,
            View::History => 2,
        }
    }

    /// Map a number key ('1'..'3') to a view.
    pub fn from_key(c: char) -> Option<View> {
        match c {
            '1' => Some(View::Token),
            '2' => Some(View::Swap),
            '3' => Some(View::History),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Events sent from background data tasks and components to the main app loop
#[derive(Debug)]
pub enum AppEvent {
    // Chain
    Connected(u64), // chain_id
    LatestBlockNumber(u64),

    // Reads
    SnapshotUpdated {
        group: ReadGroup,
        state: SnapshotState,
    },
    HistoryLoaded(HistoryOutcome),
    HistoryFailed(String),

    // Writes
    SubmitAction(ActionRequest),
    WorkflowUpdated(TxWorkflow),

    // Export
    ExportHistory(ExportFormat),
    ExportComplete(String),

    // Navigation
    Navigate(View),
    RefreshHistory,

    // Status
    Error(String),
}
