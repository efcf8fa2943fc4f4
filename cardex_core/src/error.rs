use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Failures surfaced to search callers.
///
/// The display text is deliberately generic; the cause is kept as the
/// error source for logging.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search failed")]
    Repository(#[source] anyhow::Error),
}

impl SearchError {
    #[must_use]
    pub fn repository(err: anyhow::Error) -> Self {
        Self::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn repository_error_is_generic_but_keeps_source() {
        let err = SearchError::repository(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "search failed");
        assert!(err.source().is_some_and(|s| s.to_string().contains("connection reset")));
    }
}
