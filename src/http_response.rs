use std::time::{Duration, Instant};

use serde::Serialize;

use crate::beautify::{beautify_headers, beautify_response};

pub const TOTAL_LENGTH_HEADER: &str = "Total Length";
pub const RESPONSE_TIME_HEADER: &str = "Response Time";

/// A captured response, ready for display.
///
/// `headers` keeps the wire order and ends with two synthetic entries,
/// [`TOTAL_LENGTH_HEADER`] and [`RESPONSE_TIME_HEADER`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    /// Protocol first, e.g. `HTTP/1.1 302 Found`.
    pub status: String,
    pub status_code: u16,
    pub content_type: String,
    pub location: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Body bytes plus every `"Key: Value\n"` header line.
    pub length: usize,
    /// Seconds since the request was dispatched.
    pub response_time: f64,
    pub beautify: String,
    pub beautify_header: String,
}

/// Everything read off the wire for one response, body fully drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub reason: String,
    pub version: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub elapsed: Duration,
}

fn version_name(version: reqwest::Version) -> String {
    match version {
        reqwest::Version::HTTP_09 => "HTTP/0.9".to_string(),
        reqwest::Version::HTTP_10 => "HTTP/1.0".to_string(),
        reqwest::Version::HTTP_11 => "HTTP/1.1".to_string(),
        reqwest::Version::HTTP_2 => "HTTP/2.0".to_string(),
        reqwest::Version::HTTP_3 => "HTTP/3.0".to_string(),
        _ => "UNKNOWN".to_string(),
    }
}

/// `content-type` -> `Content-Type`. The transport lower-cases names.
pub fn canonical_header_key(key: &str) -> String {
    key.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

impl RawResponse {
    /// Drains `resp` and stamps the time elapsed since `started`.
    pub fn read(
        resp: reqwest::blocking::Response,
        started: Instant,
    ) -> Result<RawResponse, reqwest::Error> {
        let status = resp.status();
        let version = version_name(resp.version());
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    canonical_header_key(name.as_str()),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp.bytes()?.to_vec();

        Ok(RawResponse {
            status_code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            version,
            headers,
            body,
            elapsed: started.elapsed(),
        })
    }
}

pub fn header_line_len(key: &str, value: &str) -> usize {
    key.len() + ": ".len() + value.len() + "\n".len()
}

/// Normalizes a drained response. Both renderings are filled in before
/// returning.
pub fn parse_response(raw: &RawResponse) -> Response {
    let mut res = Response::default();
    let mut length = raw.body.len();

    let mut headers = Vec::with_capacity(raw.headers.len() + 2);
    for (key, value) in &raw.headers {
        match key.as_str() {
            "Content-Type" => res.content_type = value.clone(),
            "Location" => res.location = value.clone(),
            _ => {}
        }
        length += header_line_len(key, value);
        headers.push((key.clone(), value.clone()));
    }

    let response_time = raw.elapsed.as_secs_f64();
    headers.push((TOTAL_LENGTH_HEADER.to_string(), length.to_string()));
    headers.push((RESPONSE_TIME_HEADER.to_string(), format!("{:.6}", response_time)));

    res.status = format!("{} {} {}", raw.version, raw.status_code, raw.reason)
        .trim_end()
        .to_string();
    res.status_code = raw.status_code;
    res.headers = headers;
    res.body = String::from_utf8_lossy(&raw.body).into_owned();
    res.length = length;
    res.response_time = response_time;
    res.beautify = beautify_response(&res);
    res.beautify_header = beautify_headers(&res);
    return res;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn raw(headers: &[(&str, &str)], body: &str) -> RawResponse {
        RawResponse {
            status_code: 200,
            reason: "OK".to_string(),
            version: "HTTP/1.1".to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.as_bytes().to_vec(),
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test_case("content-type", "Content-Type")]
    #[test_case("x-xss-protection", "X-Xss-Protection")]
    #[test_case("ETAG", "Etag")]
    #[test_case("location", "Location")]
    fn canonical_keys(input: &str, expected: &str) {
        assert_eq!(canonical_header_key(input), expected);
    }

    #[test]
    fn length_counts_body_and_header_lines() {
        let res = parse_response(&raw(&[("Content-Type", "text/plain")], "hello"));
        assert_eq!(res.length, 5 + "Content-Type: text/plain\n".len());
        assert_eq!(res.body, "hello");
        assert_eq!(res.content_type, "text/plain");
    }

    #[test]
    fn repeated_headers_all_count() {
        let res = parse_response(&raw(&[("Set-Cookie", "a=1"), ("Set-Cookie", "b=2")], ""));
        assert_eq!(res.length, 2 * "Set-Cookie: a=1\n".len());
        assert_eq!(res.headers[0], ("Set-Cookie".to_string(), "a=1".to_string()));
        assert_eq!(res.headers[1], ("Set-Cookie".to_string(), "b=2".to_string()));
    }

    #[test]
    fn synthetic_entries_trail_the_wire_headers() {
        let res = parse_response(&raw(&[("Server", "nginx")], "abc"));
        let expected_len = 3 + "Server: nginx\n".len();
        assert_eq!(res.headers.len(), 3);
        assert_eq!(
            res.headers[1],
            (TOTAL_LENGTH_HEADER.to_string(), expected_len.to_string())
        );
        assert_eq!(
            res.headers[2],
            (RESPONSE_TIME_HEADER.to_string(), "1.500000".to_string())
        );
        assert_eq!(res.response_time, 1.5);
    }

    #[test]
    fn location_and_status_line() {
        let mut r = raw(&[("Location", "https://example.com/y")], "");
        r.status_code = 302;
        r.reason = "Found".to_string();
        let res = parse_response(&r);
        assert_eq!(res.status_code, 302);
        assert_eq!(res.status, "HTTP/1.1 302 Found");
        assert_eq!(res.location, "https://example.com/y");
        assert!(res.content_type.is_empty());
    }

    #[test]
    fn renderings_are_populated() {
        let res = parse_response(&raw(&[], "body"));
        assert_eq!(res.beautify, beautify_response(&res));
        assert_eq!(res.beautify_header, beautify_headers(&res));
        assert!(res.beautify.starts_with("HTTP/1.1 200 OK\n"));
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let res = parse_response(&raw(&[("content-type", "text/html")], ""));
        assert!(res.content_type.is_empty());
    }
}
