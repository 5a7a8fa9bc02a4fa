use std::thread;
use std::time::Instant;

use crate::errors::ProbeError;
use crate::http_client::{HttpClient, RetryPolicy};
use crate::http_response::{parse_response, RawResponse, Response};
use crate::options::Options;

/// How a send ended, before normalization.
#[derive(Debug)]
pub enum SendOutcome {
    Completed(RawResponse),
    /// First redirect of a client that doesn't follow them, captured as-is.
    Intercepted(RawResponse),
}

impl SendOutcome {
    pub fn raw(&self) -> &RawResponse {
        match self {
            SendOutcome::Completed(raw) | SendOutcome::Intercepted(raw) => raw,
        }
    }
}

fn send_get(
    options: &Options,
    url: &str,
    client: &HttpClient,
    started: Instant,
) -> Result<SendOutcome, ProbeError> {
    let retry = if options.redirect {
        client.retry
    } else {
        RetryPolicy::none()
    };

    let mut delays = retry.delays();
    let mut attempt = 0;
    let resp = loop {
        let err = match client.inner.get(url).send() {
            Ok(resp) => break resp,
            Err(err) => err,
        };
        let Some(wait) = delays.next() else {
            client.log.error(format_args!("{} {}", url, err));
            return Err(ProbeError::Send {
                url: url.to_string(),
                source: err,
            });
        };
        attempt += 1;
        client.log.debug(format_args!(
            "{} failed ({}), retry {}/{} in {:?}",
            url, err, attempt, retry.count, wait
        ));
        thread::sleep(wait);
    };

    let intercepted = !client.follow_redirects && resp.status().is_redirection();
    let raw = RawResponse::read(resp, started).map_err(|source| {
        client.log.error(format_args!("{} {}", url, source));
        ProbeError::Body {
            url: url.to_string(),
            source,
        }
    })?;

    return if intercepted {
        Ok(SendOutcome::Intercepted(raw))
    } else {
        Ok(SendOutcome::Completed(raw))
    };
}

/// Sends `method` to `url`. Only GET is wired up; any other method returns an
/// empty [`Response`] without touching the network.
pub fn send_with_method(
    options: &Options,
    method: &str,
    url: &str,
    client: &HttpClient,
) -> Result<Response, ProbeError> {
    if options.redirect != client.follow_redirects {
        client.log.debug(format_args!(
            "client was built with follow_redirects={}, ignoring redirect={} for {}",
            client.follow_redirects, options.redirect, url
        ));
    }

    let started = Instant::now();
    let outcome = match method.trim().to_lowercase().as_str() {
        "get" => send_get(options, url, client, started)?,
        other => {
            client.log.debug(format_args!("method {} is not supported, nothing sent", other));
            return Ok(Response::default());
        }
    };

    if let SendOutcome::Intercepted(raw) = &outcome {
        client.log.debug(format_args!(
            "captured {} redirect from {} without following it",
            raw.status_code, url
        ));
    }
    return Ok(parse_response(outcome.raw()));
}

/// Issues a single GET and returns the normalized response.
pub fn just_send(options: &Options, url: &str, client: &HttpClient) -> Result<Response, ProbeError> {
    return send_with_method(options, "GET", url, client);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::build_client;

    #[test]
    fn unsupported_method_sends_nothing() {
        let options = Options::default();
        let client = build_client(&options).unwrap();
        // nothing listens here; a real send would fail
        let res = send_with_method(&options, "PURGE", "http://127.0.0.1:9/", &client).unwrap();
        assert_eq!(res, Response::default());
    }
}
