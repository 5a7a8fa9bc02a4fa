use std::io::BufRead;

use anyhow::{Context, Result};

use crate::beautify::beautify_request;
use crate::burp_request_parser::decode_burp_request;
use crate::http_client::build_client;
use crate::http_request_executor::just_send;
use crate::http_response::Response;
use crate::options::Options;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputFormat {
    Full,
    HeadersOnly,
    Json,
}

pub fn render(res: &Response, format: OutputFormat) -> Result<String> {
    return Ok(match format {
        OutputFormat::Full => res.beautify.clone(),
        OutputFormat::HeadersOnly => res.beautify_header.clone(),
        OutputFormat::Json => serde_json::to_string(res).context("while encoding response")?,
    });
}

/// One URL per line; blank lines and `#` comments are skipped.
pub fn read_urls(reader: impl BufRead) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    for line in reader.lines() {
        let line = line.context("while reading urls")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        urls.push(line.to_string());
    }
    return Ok(urls);
}

/// Probes each URL in turn. A failed URL is reported and skipped.
pub fn probe_urls(options: &Options, urls: &[String], format: OutputFormat) -> Result<()> {
    let client = build_client(options).context("while building http client")?;
    for url in urls {
        // failed sends are logged by the dispatcher
        if let Ok(res) = just_send(options, url, &client) {
            println!("{}", render(&res, format)?);
        }
    }
    return Ok(());
}

pub fn show_burp_request(encoded: &str, as_request: bool) -> Result<()> {
    let request = decode_burp_request(encoded).context("while decoding saved request")?;
    if as_request {
        print!("{}", beautify_request(&request));
    } else {
        println!("{}", request.url);
    }
    return Ok(());
}
