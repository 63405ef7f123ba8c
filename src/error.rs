use reqwest::StatusCode;
use thiserror::Error;

/// Network and protocol failures of a single fetch.
///
/// These are runtime conditions, not caller mistakes: they come back as the
/// inner `Err` of a download so callers can branch on them without unwinding.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unexpected HTTP status {status} for url ({url})")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error(
        "server answered {url} with an HTML page instead of data; the endpoint probably needs a browser with JavaScript enabled"
    )]
    UnexpectedHtmlResponse { url: String },

    #[error("failed to parse JSON payload from {url}: {source}")]
    MalformedPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// HTTP status code carried by [`FetchError::UnexpectedStatus`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url }
            | FetchError::UnexpectedStatus { url, .. }
            | FetchError::UnexpectedHtmlResponse { url }
            | FetchError::MalformedPayload { url, .. }
            | FetchError::Transport { url, .. } => url,
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Caller misuse of the dataset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("dataset '{name}' is not available; use Client::list_datasets() to see which ones are")]
    UnknownDataset { name: String },

    #[error("dataset '{name}' is disabled: {reason}")]
    DatasetDisabled { name: String, reason: String },

    #[error("dataset name '{name}' appears more than once in the catalog")]
    DuplicateName { name: String },
}
