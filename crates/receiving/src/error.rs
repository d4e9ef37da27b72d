use std::fmt;

#[derive(Debug)]
pub enum ReceivingError {
    /// A mutator was called before issue history was resolved.
    NotReady,
    /// `resolve_history` was called a second time.
    AlreadyResolved,
    /// No group with the given key exists in the session.
    UnknownGroup(String),
    /// Selection attempt on a group with nothing left to account for.
    NothingRemaining(String),
    /// `build_change_set` called while validation blocks submission.
    NotSubmittable(String),
    /// External collaborator failure (fetch or submit).
    Gateway(String),
}

impl fmt::Display for ReceivingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "session is still loading issue history"),
            Self::AlreadyResolved => write!(f, "issue history already resolved"),
            Self::UnknownGroup(key) => write!(f, "unknown group: {key}"),
            Self::NothingRemaining(key) => {
                write!(f, "group '{key}' is fully accounted; nothing left to select")
            }
            Self::NotSubmittable(msg) => write!(f, "session not submittable: {msg}"),
            Self::Gateway(msg) => write!(f, "gateway error: {msg}"),
        }
    }
}

impl std::error::Error for ReceivingError {}

/// Opaque failure from the order-management collaborator.
#[derive(Debug)]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}
