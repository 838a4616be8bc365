//! Persistence collaborator contract.
//!
//! # Invariants
//! - `save` is idempotent for the same draft snapshot and status.
//! - A transport failure and a `success: false` response both leave the
//!   stored article unchanged.

use crate::model::draft::{ArticleStatus, Draft, ValidationError};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Server answer to one save call.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveResponse {
    pub success: bool,
    /// Stored copy of the article, when the server echoes it.
    pub article: Option<Draft>,
    /// Human-readable reason, surfaced verbatim for manual saves.
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn saved(article: Option<Draft>) -> Self {
        Self {
            success: true,
            article,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            article: None,
            message: Some(message.into()),
        }
    }
}

/// The save call itself failed; nothing is known about the stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint could not be reached.
    Unreachable(String),
    /// Request did not complete in time.
    Timeout,
    /// Backing storage failed while handling the request.
    Storage(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(details) => write!(f, "persistence endpoint unreachable: {details}"),
            Self::Timeout => write!(f, "persistence request timed out"),
            Self::Storage(details) => write!(f, "storage failure: {details}"),
        }
    }
}

impl Error for TransportError {}

/// Endpoint that stores drafts.
#[async_trait]
pub trait DraftPersistence: Send + Sync {
    async fn save(
        &self,
        draft: &Draft,
        status: ArticleStatus,
    ) -> Result<SaveResponse, TransportError>;
}

/// Failure of an explicit save/publish/archive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// Draft is missing fields the action needs.
    Validation(ValidationError),
    /// Another save is in flight.
    Busy,
    /// The coordinator was disposed.
    Disposed,
    Transport(TransportError),
    /// Server answered `success: false`; carries its message.
    Rejected(String),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Busy => write!(f, "a save is already in progress"),
            Self::Disposed => write!(f, "editor session is closed"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::Rejected(message) => write!(f, "{message}"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Transport(err) => Some(err),
            Self::Busy | Self::Disposed | Self::Rejected(_) => None,
        }
    }
}

impl From<ValidationError> for SaveError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TransportError> for SaveError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}
