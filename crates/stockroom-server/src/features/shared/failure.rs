//! Classification of handler errors
//!
//! Every command error is either a *structured failure* the client can act
//! on (duplicate code, nothing to edit, ...) or a fault of the server or its
//! store. [`Failure::failure_kind`] draws that line; the API layer reports
//! structured failures in the mutation result and everything else as an
//! error.

use serde::{Deserialize, Serialize};

use crate::storage::SealError;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    DuplicateCode,
    InvalidAttachmentType,
    NoOpEdit,
    NotFound,
    NotDeleted,
    NoChange,
    MalformedId,
    InvalidKey,
    Validation,
}

pub trait Failure: std::error::Error {
    /// `None` when the error is a fault rather than a structured failure
    fn failure_kind(&self) -> Option<FailureKind>;

    fn is_fatal(&self) -> bool {
        self.failure_kind().is_none()
    }
}

impl Failure for SealError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            SealError::InvalidAttachmentType(_) => Some(FailureKind::InvalidAttachmentType),
            SealError::InvalidKey(_) => Some(FailureKind::InvalidKey),
            SealError::Io(_) => None,
        }
    }
}

impl Failure for StoreError {
    fn failure_kind(&self) -> Option<FailureKind> {
        None
    }
}
