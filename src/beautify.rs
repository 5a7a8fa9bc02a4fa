use std::fmt::Write;

use crate::http_request::Request;
use crate::http_response::Response;

/// Raw request framing. Always claims HTTP/1.1.
pub fn beautify_request(req: &Request) -> String {
    let mut out = format!("{} {} HTTP/1.1\n", req.method, req.url);
    for (key, value) in &req.headers {
        if !key.is_empty() && !value.is_empty() {
            let _ = writeln!(out, "{}: {}", key, value);
        }
    }
    if !req.body.is_empty() {
        let _ = write!(out, "\n{}\n", req.body);
    }
    out
}

/// Status and headers only, each line prefixed with `< ` like a curl trace.
pub fn beautify_headers(res: &Response) -> String {
    let mut out = format!("< {}\n", res.status);
    for (key, value) in &res.headers {
        let _ = writeln!(out, "< {}: {}", key, value);
    }
    out
}

pub fn beautify_response(res: &Response) -> String {
    let mut out = format!("{}\n", res.status);
    for (key, value) in &res.headers {
        let _ = writeln!(out, "{}: {}", key, value);
    }
    let _ = write!(out, "\n{}\n", res.body);
    out
}
