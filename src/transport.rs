//! The seam between the lifecycle controller and the actual HTTP stack.
//!
//! The controller never talks to a socket itself. It hands a
//! [`PreparedRequest`] to a [`Transport`], receives an in-flight
//! [`Exchange`] handle back, and drives that handle by polling. Anything
//! that can send bytes and report progress can sit behind these traits.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::ConfetchResult;

/// Classification of a finished exchange, as reported by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExchangeOutcome {
    Success,
    ConnectionError,
    ProtocolError,
    DataProcessingError,
}

impl ExchangeOutcome {
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::Success)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ConnectionError => "connection_error",
            Self::ProtocolError => "protocol_error",
            Self::DataProcessingError => "data_processing_error",
        }
    }
}

impl std::fmt::Display for ExchangeOutcome {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// An upload payload with the content type attached to it.
#[derive(Clone, Debug)]
pub struct RequestBody {
    pub bytes: Bytes,
    pub content_type: String,
}

/// A validated, ready-to-send request.
///
/// Produced by [`RequestConfig::prepare`](crate::RequestConfig); headers are
/// carried verbatim and the body is buffered so that a retry can replay it.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub uri: Uri,
    /// The configured URL text, kept for reports and log lines.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// One physical HTTP request/response cycle tied to a single attempt.
///
/// The controller owns the handle exclusively for the duration of one
/// attempt and drops it when the attempt ends; dropping releases whatever
/// resources the transport holds for it.
pub trait Exchange: Send + 'static {
    /// Fraction of the upload completed so far, in `[0, 1]`.
    fn upload_progress(&self) -> f64;

    /// Fraction of the download completed so far, in `[0, 1]`.
    fn download_progress(&self) -> f64;

    /// Whether the exchange has finished, successfully or not.
    fn is_done(&self) -> bool;

    /// Result classification once the exchange is done.
    fn outcome(&self) -> ExchangeOutcome;

    /// HTTP response status code; `0` when none was received.
    fn status_code(&self) -> i64;

    /// Transport error text, if any.
    fn error_message(&self) -> Option<String>;

    /// Response headers, if the transport captured any.
    fn response_headers(&self) -> Option<HeaderMap>;

    /// The URI the exchange actually resolved to.
    fn resolved_uri(&self) -> Option<Uri>;

    /// Response body decoded as text.
    fn body_text(&self) -> String;

    /// Abort the exchange if it is still in flight.
    fn abort(&mut self);
}

/// Issues exchanges on behalf of the controller.
///
/// `issue` both creates and starts the exchange; the returned handle must
/// already be in flight.
pub trait Transport: Send + Sync + 'static {
    type Handle: Exchange;

    fn issue(&self, request: &PreparedRequest) -> ConfetchResult<Self::Handle>;
}
