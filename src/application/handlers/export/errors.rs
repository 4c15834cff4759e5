//! Errors of the export handlers.

use thiserror::Error;

use crate::ports::{AssetError, ContentApiError, StorageError, SyncLogError};

/// Failure of one unit of export work.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error(transparent)]
    Content(#[from] ContentApiError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    SyncLog(#[from] SyncLogError),
}

impl ExportError {
    /// Whether running the export again could succeed on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            ExportError::Content(e) => e.is_transient(),
            ExportError::Asset(AssetError::Download { .. }) => true,
            ExportError::Asset(AssetError::Status { status, .. }) => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_port_errors() {
        let err: ExportError = ContentApiError::NotFound("page".into()).into();
        assert!(matches!(err, ExportError::Content(_)));
        assert_eq!(err.to_string(), "Object not found: page");

        let err: ExportError = StorageError::invalid_name("..").into();
        assert!(matches!(err, ExportError::Storage(_)));
    }

    #[test]
    fn transient_classification() {
        assert!(ExportError::from(ContentApiError::Network("reset".into())).is_transient());
        assert!(ExportError::from(AssetError::Status {
            url: "u".into(),
            status: 503
        })
        .is_transient());
        assert!(!ExportError::from(AssetError::Status {
            url: "u".into(),
            status: 403
        })
        .is_transient());
        assert!(!ExportError::from(SyncLogError::Corrupt("x".into())).is_transient());
    }
}
