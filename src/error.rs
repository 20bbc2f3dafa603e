//! Error taxonomy shared by the loader, the pipeline and the views.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The dataset file could not be opened.
    #[error("dataset not available at {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be deserialized into a [`crate::record::Record`].
    #[error("malformed record at line {line}: {source}")]
    MalformedRecord {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("invalid category map: {0}")]
    InvalidCategoryMap(String),

    /// Fewer entities were selected than a comparison needs.
    #[error("select at least {min} entities to compare ({selected} selected)")]
    EmptySelection { selected: usize, min: usize },

    #[error("at most {max} entities can be compared ({selected} selected)")]
    TooManySelected { selected: usize, max: usize },

    /// A valid selection matched no rows.
    #[error("no data for {0}")]
    EmptyResult(String),
}

impl DashboardError {
    /// Errors that end a single rendering pass and are shown to the user,
    /// as opposed to data defects in the source or configuration.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DashboardError::SourceUnavailable { .. }
                | DashboardError::EmptySelection { .. }
                | DashboardError::TooManySelected { .. }
                | DashboardError::EmptyResult(_)
        )
    }

    /// Selection problems are warnings: nothing was computed.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            DashboardError::EmptySelection { .. } | DashboardError::TooManySelected { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_errors_are_warnings() {
        let err = DashboardError::EmptySelection {
            selected: 1,
            min: 2,
        };
        assert!(err.is_warning());
        assert!(err.is_user_facing());
        assert_eq!(
            err.to_string(),
            "select at least 2 entities to compare (1 selected)"
        );
    }

    #[test]
    fn test_invalid_map_is_not_user_facing() {
        let err = DashboardError::InvalidCategoryMap("bad".into());
        assert!(!err.is_user_facing());
        assert!(!err.is_warning());
    }

    #[test]
    fn test_source_unavailable_message_names_path() {
        let err = DashboardError::SourceUnavailable {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.csv"));
        assert!(err.is_user_facing());
    }
}
