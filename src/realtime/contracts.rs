use std::sync::{mpsc, Arc};

use crate::domain::events::{ConnectionState, PresenceEvent};

pub type ConnectionId = u64;

/// A live bidirectional channel owned by whichever integration created it.
/// Consumers read its state and subscribe to events; they never construct
/// or close the connection.
pub trait RealtimeConnection: Send + Sync {
    fn id(&self) -> ConnectionId;
    fn state(&self) -> ConnectionState;
    fn subscribe(&self) -> mpsc::Receiver<PresenceEvent>;
    fn request_online_count(&self) -> Result<(), InvokeError>;
}

/// Hands out the shared connection handle once its owner has published it.
pub trait ConnectionProvider: Send + Sync {
    fn current(&self) -> Option<Arc<dyn RealtimeConnection>>;
}

/// Coarse notification endpoint: named broadcast groups.
pub trait NotificationFacade: Send + Sync {
    fn join_group(&self, group: &str) -> Result<(), InvokeError>;
    fn leave_group(&self, group: &str) -> Result<(), InvokeError>;
}

/// Finer, question-scoped feed. Ids are integer-typed on the wire.
pub trait QuestionFeedFacade: Send + Sync {
    fn join_question(&self, question_id: i64) -> Result<(), InvokeError>;
    fn leave_question(&self, question_id: i64) -> Result<(), InvokeError>;
}

/// Optional façade dependencies, decided at composition time. `None` means
/// the façade is not part of this composition, not that it failed.
pub trait FacadeProvider: Send + Sync {
    fn notifications(&self) -> Option<Arc<dyn NotificationFacade>>;
    fn question_feed(&self) -> Option<Arc<dyn QuestionFeedFacade>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    NotConnected,
    Transport(String),
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => f.write_str("connection is not in the connected state"),
            Self::Transport(details) => write!(f, "transport failure: {details}"),
        }
    }
}

impl std::error::Error for InvokeError {}
