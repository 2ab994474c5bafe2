//! Sequential batches with first-failure short-circuit
//!
//! Elements are applied one after another in input order, each committing
//! on its own. The first failing element stops the batch; everything before
//! it stays applied.

use std::error::Error as StdError;

use super::failure::{Failure, FailureKind};

/// Failure of one batch element
#[derive(Debug, thiserror::Error)]
#[error("{source} (element {index})")]
pub struct BatchError<E>
where
    E: StdError + 'static,
{
    /// Zero-based position of the failing element
    pub index: usize,
    #[source]
    pub source: E,
}

impl<E> BatchError<E>
where
    E: StdError + 'static,
{
    pub fn new(index: usize, source: E) -> Self {
        Self { index, source }
    }
}

impl<E> Failure for BatchError<E>
where
    E: Failure + 'static,
{
    fn failure_kind(&self) -> Option<FailureKind> {
        self.source.failure_kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SealError;

    #[test]
    fn test_batch_error_keeps_source_kind() {
        let err = BatchError::new(2, SealError::InvalidKey(String::new()));
        assert_eq!(err.index, 2);
        assert_eq!(err.failure_kind(), Some(FailureKind::InvalidKey));
        assert!(err.to_string().ends_with("(element 2)"));
    }
}
