use thiserror::Error;

/// Why a resource could not be obtained from its live source.
///
/// Every variant collapses to its display string in
/// [`FetchState::error`](crate::fetcher::FetchState::error). The type is `Clone`
/// because one in-flight outcome is handed to every caller waiting on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection failure or the request timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// The envelope reported failure, carried no data, or had an unexpected shape.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The upstream answered successfully but with zero usable points.
    #[error("Empty dataset for {0}")]
    EmptyDataset(String),

    /// The caller went away before the request settled.
    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Upstream(format!("malformed response body: {e}"))
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Upstream(format!("malformed payload: {e}"))
    }
}
