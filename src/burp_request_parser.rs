use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use url::Url;

use crate::errors::BurpError;
use crate::http_request::Request;

// Represents the part of the raw request the latest line belonged to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ParseState {
    RequestLine,
    Headers,
}

fn request_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\S+) (\S+) (HTTP/\d+\.\d+)$").expect("static regex"))
}

#[derive(Debug, Default)]
struct RawRequest {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl RawRequest {
    fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

fn parse_raw_request(text: &str) -> Result<RawRequest, BurpError> {
    let mut raw = RawRequest::default();
    let mut state = ParseState::RequestLine;
    let mut lines = text.split('\n');
    let mut line_no: u32 = 1;

    while let Some(line) = lines.next() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match state {
            ParseState::RequestLine => {
                let caps = request_line_regex().captures(line).ok_or_else(|| {
                    BurpError::Parse(format!("bad request line {:?}", line))
                })?;
                raw.method = caps[1].to_string();
                raw.target = caps[2].to_string();
                state = ParseState::Headers;
            }
            ParseState::Headers => {
                if line.is_empty() {
                    raw.body = lines.by_ref().collect::<Vec<&str>>().join("\n");
                    break;
                }
                let (key, value) = line.split_once(':').ok_or_else(|| {
                    BurpError::Parse(format!("bad header in line {}: {:?}", line_no, line))
                })?;
                let key = key.trim();
                if key.is_empty() || key.contains(char::is_whitespace) {
                    return Err(BurpError::Parse(format!(
                        "bad header name in line {}: {:?}",
                        line_no, key
                    )));
                }
                raw.headers.push((key.to_string(), value.trim().to_string()));
            }
        }
        line_no += 1;
    }
    Ok(raw)
}

/// Decodes a base64 raw request, as saved by an intercepting proxy, and
/// resolves the absolute URL it was sent to.
///
/// A target without a host takes the `Host` header. A target without a scheme
/// inherits the scheme of the `Referer` header, or `https` when there is none.
pub fn decode_burp_request(encoded: &str) -> Result<Request, BurpError> {
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| BurpError::Decode(e.to_string()))?;
    let raw = parse_raw_request(&String::from_utf8_lossy(&decoded))?;

    let absolute = Url::parse(&raw.target).ok().filter(|u| u.has_host());

    let host = match absolute.as_ref().and_then(|u| u.host_str()) {
        Some(host) => match absolute.as_ref().and_then(|u| u.port()) {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        },
        None => raw
            .header("Host")
            .filter(|h| !h.is_empty())
            .ok_or(BurpError::MissingHost)?
            .to_string(),
    };

    let scheme = match &absolute {
        Some(u) => u.scheme().to_string(),
        None => raw
            .header("Referer")
            .and_then(|referer| Url::parse(referer).ok())
            .map(|referer| referer.scheme().to_string())
            .unwrap_or_else(|| "https".to_string()),
    };

    let path = match &absolute {
        Some(u) => match u.query() {
            Some(query) => format!("{}?{}", u.path(), query),
            None => u.path().to_string(),
        },
        None if raw.target.starts_with('/') => raw.target.clone(),
        None => String::new(),
    };

    let url = Url::parse(&format!("{}://{}{}", scheme, host, path))
        .map_err(|e| BurpError::Parse(format!("couldn't build url: {}", e)))?;

    Ok(Request {
        method: raw.method,
        url: url.to_string(),
        host,
        scheme,
        path: raw.target,
        headers: raw.headers,
        body: raw.body,
    })
}

/// URL of a saved raw request, or an empty string if anything about it is off.
pub fn parse_burp_request(encoded: &str) -> String {
    decode_burp_request(encoded)
        .map(|req| req.url)
        .unwrap_or_default()
}
