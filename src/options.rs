use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.132 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Per-invocation settings, normally filled from command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Seconds; `0` disables every timeout.
    pub timeout: u64,
    pub retry: u32,
    /// Raw `"Key: Value"` strings.
    pub headers: Vec<String>,
    pub debug: bool,
    /// Follow redirects instead of capturing the first one.
    pub redirect: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            timeout: DEFAULT_TIMEOUT_SECS,
            retry: 0,
            headers: Vec::new(),
            debug: false,
            redirect: false,
        }
    }
}

impl Options {
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout))
        }
    }
}

fn default_headers() -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
        ("Accept".to_string(), "*/*".to_string()),
        ("Accept-Language".to_string(), "en-US,en;q=0.8".to_string()),
    ]
}

/// Merges user supplied `"Key: Value"` strings over the default headers.
///
/// Keys compare case-sensitively, so `accept: x` is added next to the default
/// `Accept` rather than replacing it. Entries without a colon or with an empty
/// key are dropped.
pub fn resolve_headers(custom: &[String]) -> Vec<(String, String)> {
    let mut headers = default_headers();
    for raw in custom {
        let Some((key, value)) = raw.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        match headers.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => headers.push((key.to_string(), value)),
        }
    }
    headers
}
