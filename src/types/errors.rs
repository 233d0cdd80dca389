use serde::Serialize;
use thiserror::Error;

use crate::services::matcher::types::Catalog;

/// Failures surfaced to the caller. Matching ambiguity is never an error;
/// it is an unresolved `Resolution` with a machine-readable reason.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Search failed for {catalog} catalog: {detail}")]
    Search { catalog: Catalog, detail: String },
    #[error("Cache store error: {0}")]
    Store(String),
}

impl Serialize for MatchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type MatchResult<T> = Result<T, MatchError>;
