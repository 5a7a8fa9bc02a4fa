use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::{Attempt, Policy};
use tokio_retry::strategy::ExponentialBackoff;

use crate::errors::ProbeError;
use crate::logging::LogSink;
use crate::options::{resolve_headers, Options};

pub const MAX_IDLE_CONNS: usize = 100;
pub const MAX_CONNS_PER_HOST: usize = 1000;
pub const MAX_REDIRECTS: usize = 10;

/// What to do when the server answers with a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectAction {
    Follow,
    /// Hand the redirect response back to the caller as the final response.
    Capture,
    Fail(String),
}

pub fn redirect_action(follow: bool, hops_so_far: usize) -> RedirectAction {
    if !follow {
        RedirectAction::Capture
    } else if hops_so_far >= MAX_REDIRECTS {
        RedirectAction::Fail(format!("stopped after {} redirects", MAX_REDIRECTS))
    } else {
        RedirectAction::Follow
    }
}

fn redirect_policy(follow: bool) -> Policy {
    Policy::custom(move |attempt: Attempt| {
        match redirect_action(follow, attempt.previous().len()) {
            RedirectAction::Follow => attempt.follow(),
            RedirectAction::Capture => attempt.stop(),
            RedirectAction::Fail(reason) => attempt.error(reason),
        }
    })
}

/// How often, and how patiently, a failed send is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub count: u32,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn none() -> RetryPolicy {
        RetryPolicy {
            count: 0,
            timeout: Duration::ZERO,
        }
    }

    pub fn from_options(options: &Options) -> RetryPolicy {
        if options.retry == 0 {
            return RetryPolicy::none();
        }
        RetryPolicy {
            count: options.retry,
            timeout: options.timeout().unwrap_or(Duration::ZERO),
        }
    }

    /// Pauses between attempts, one per retry: timeout/2 first, doubling,
    /// never above the timeout.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        // from_millis(2) yields 2f, 4f, 8f.. so f = half of the first wait
        let half_wait = (self.timeout / 2).as_millis() as u64 / 2;
        ExponentialBackoff::from_millis(2)
            .factor(half_wait)
            .max_delay(self.timeout)
            .take(self.count as usize)
    }
}

/// A configured blocking client plus the knobs the dispatcher needs.
#[derive(Debug, Clone)]
pub struct HttpClient {
    pub(crate) inner: reqwest::blocking::Client,
    pub headers: Vec<(String, String)>,
    pub retry: RetryPolicy,
    pub follow_redirects: bool,
    pub max_conns_per_host: usize,
    pub log: LogSink,
}

fn header_map(headers: &[(String, String)], log: LogSink) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        match (HeaderName::try_from(key.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                map.append(name, value);
            }
            _ => log.warn(format_args!("skipping invalid header {:?}: {:?}", key, value)),
        }
    }
    map
}

/// Builds the probing client. No network traffic happens here.
pub fn build_client(options: &Options) -> Result<HttpClient, ProbeError> {
    let log = LogSink::from_debug(options.debug);
    let headers = resolve_headers(&options.headers);
    let timeout = options.timeout();

    let inner = reqwest::blocking::Client::builder()
        .default_headers(header_map(&headers, log))
        .pool_max_idle_per_host(MAX_IDLE_CONNS)
        .pool_idle_timeout(timeout)
        .connect_timeout(timeout)
        .timeout(timeout)
        .danger_accept_invalid_certs(true)
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .redirect(redirect_policy(options.redirect))
        .build()
        .map_err(ProbeError::Build)?;

    // capturing relies on seeing the very first redirect
    let retry = if options.redirect {
        RetryPolicy::from_options(options)
    } else {
        RetryPolicy::none()
    };

    log.debug(format_args!(
        "client ready: timeout={:?} retry={} follow_redirects={}",
        timeout, retry.count, options.redirect
    ));

    Ok(HttpClient {
        inner,
        headers,
        retry,
        follow_redirects: options.redirect,
        max_conns_per_host: MAX_CONNS_PER_HOST,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn options(retry: u32, timeout: u64, redirect: bool) -> Options {
        Options {
            timeout,
            retry,
            redirect,
            ..Options::default()
        }
    }

    #[test]
    fn zero_retry_means_no_retries() {
        let client = build_client(&options(0, 10, true)).unwrap();
        assert_eq!(client.retry, RetryPolicy::none());
    }

    #[test]
    fn retry_waits_derive_from_timeout() {
        let client = build_client(&options(3, 10, true)).unwrap();
        assert_eq!(client.retry.count, 3);
        assert_eq!(client.retry.timeout, Duration::from_secs(10));
    }

    #[test]
    fn capturing_redirects_disables_retries() {
        let client = build_client(&options(3, 10, false)).unwrap();
        assert_eq!(client.retry.count, 0);
        assert!(!client.follow_redirects);
    }

    #[test]
    fn custom_headers_reach_the_client() {
        let opts = Options {
            headers: vec!["X-Probe: 1".to_string(), "garbage".to_string()],
            ..Options::default()
        };
        let client = build_client(&opts).unwrap();
        assert!(client
            .headers
            .contains(&("X-Probe".to_string(), "1".to_string())));
        assert_eq!(client.max_conns_per_host, MAX_CONNS_PER_HOST);
    }

    #[test]
    fn invalid_header_values_are_left_out_of_the_map() {
        let headers = vec![
            ("X-Ok".to_string(), "fine".to_string()),
            ("Bad Name".to_string(), "x".to_string()),
        ];
        let map = header_map(&headers, LogSink::Discard);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "fine");
    }

    #[test]
    fn delays_start_at_half_timeout_and_cap() {
        let policy = RetryPolicy::from_options(&options(4, 10, true));
        let delays: Vec<Duration> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(10),
                Duration::from_secs(10),
            ]
        );
    }

    #[test_case(0, 10 ; "no retries")]
    #[test_case(3, 0 ; "no timeout")]
    fn delays_count_matches_retries(retry: u32, timeout: u64) {
        let policy = RetryPolicy::from_options(&options(retry, timeout, true));
        let delays: Vec<Duration> = policy.delays().collect();
        assert_eq!(delays.len(), retry as usize);
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(timeout)));
    }

    #[test_case(false, 0, RedirectAction::Capture ; "capture first redirect")]
    #[test_case(true, 0, RedirectAction::Follow ; "follow when enabled")]
    #[test_case(true, MAX_REDIRECTS, RedirectAction::Fail(format!("stopped after {} redirects", MAX_REDIRECTS)) ; "too many hops")]
    fn redirect_decisions(follow: bool, hops: usize, expected: RedirectAction) {
        assert_eq!(redirect_action(follow, hops), expected);
    }
}
