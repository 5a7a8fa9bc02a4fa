pub mod beautify;
pub mod burp_request_parser;
pub mod errors;
pub mod execute;
pub mod http_client;
pub mod http_request;
pub mod http_request_executor;
pub mod http_response;
pub mod logging;
pub mod options;

pub use beautify::{beautify_headers, beautify_request, beautify_response};
pub use burp_request_parser::{decode_burp_request, parse_burp_request};
pub use errors::{BurpError, ProbeError};
pub use http_client::{build_client, HttpClient};
pub use http_request::Request;
pub use http_request_executor::{just_send, send_with_method};
pub use http_response::{parse_response, RawResponse, Response};
pub use options::{resolve_headers, Options};
