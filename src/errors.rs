use thiserror::Error;

/// Failures surfaced by the client builder and the dispatcher.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The TLS backend or another client component could not be initialised.
    #[error("couldn't build http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Send {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Status and headers arrived but the body couldn't be drained.
    #[error("couldn't read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Why a saved raw request couldn't be turned into a URL.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BurpError {
    #[error("invalid base64: {0}")]
    Decode(String),

    #[error("malformed raw request: {0}")]
    Parse(String),

    #[error("request has no host in its target and no Host header")]
    MissingHost,
}
