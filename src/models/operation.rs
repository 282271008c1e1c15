use serde::Serialize;
use serde_json::Value;

/// Kind of mutation waiting in the sync queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpKind {
    Insert,
    Update,
    Delete,
}

impl OpKind {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OpKind::Insert => "INSERT",
            OpKind::Update => "UPDATE",
            OpKind::Delete => "DELETE",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "INSERT" => Some(OpKind::Insert),
            "UPDATE" => Some(OpKind::Update),
            "DELETE" => Some(OpKind::Delete),
            _ => None,
        }
    }
}

/// Collection targeted by a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Collection {
    Entries,
    Settings,
}

impl Collection {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Collection::Entries => "pomodoros",
            Collection::Settings => "settings",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pomodoros" => Some(Collection::Entries),
            "settings" => Some(Collection::Settings),
            _ => None,
        }
    }
}

/// A pending propagation task.
/// `sequence` is the queue row id: monotonic, and the replay order.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedOperation {
    pub sequence: i64,
    pub kind: OpKind,
    pub collection: Collection,
    pub target_id: String,
    pub payload: Option<Value>,
    pub enqueued_at: String,
}

impl QueuedOperation {
    pub fn target(&self) -> (Collection, &str) {
        (self.collection, self.target_id.as_str())
    }
}
