use crate::result::{CategorizedLinks, FinishReason};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Messages from the engine to whoever is displaying the crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StatusEvent {
    NodeVisited {
        url: String,
        depth: usize,
        categorized_links: CategorizedLinks,
    },
    Error {
        url: String,
        message: String,
    },
    Finished {
        reason: FinishReason,
        total_visited: usize,
        max_depth_reached: usize,
        visited: Vec<String>,
    },
}

/// Non-blocking sink for status events.
///
/// Backed by an unbounded channel so a slow consumer never holds up the
/// crawl loop. Events sent after the receiver is gone are dropped.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    tx: Option<mpsc::UnboundedSender<StatusEvent>>,
}

impl StatusReporter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A reporter that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: StatusEvent) {
        if let Some(tx) = &self.tx
            && tx.send(event).is_err()
        {
            debug!("Status receiver dropped, event discarded");
        }
    }
}
