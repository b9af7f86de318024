use std::sync::Arc;

use http::{HeaderMap, Uri};

use crate::executor::RequestObserver;
use crate::transport::Exchange;

/// Status code reserved for requests that never produced an exchange because
/// their configuration was invalid.
pub const INVALID_REQUEST_STATUS: i64 = -1;

/// URI placed on an invalid-request report when the configured URL itself was
/// too malformed to echo back.
const FALLBACK_URI: &str = "https://config.invalid/";

/// The single normalized terminal outcome of one controller instance.
///
/// Success, transport error, and configuration-invalid results all use this
/// shape; `status` is [`INVALID_REQUEST_STATUS`] only on the
/// configuration-invalid path.
#[derive(Clone, Debug)]
pub struct ResponseReport {
    pub status: i64,
    pub request_url: String,
    pub has_error: bool,
    pub error_message: String,
    pub headers: HeaderMap,
    pub uri: Uri,
    pub text: String,
}

impl ResponseReport {
    pub fn is_invalid_request(&self) -> bool {
        self.status == INVALID_REQUEST_STATUS
    }
}

/// Builds the terminal report and delivers it to the observer exactly once.
///
/// Both emit methods take `self` by value, so a second terminal notification
/// is unrepresentable rather than merely discouraged.
pub(crate) struct ResponseAssembler {
    observer: Arc<dyn RequestObserver>,
    request_url: String,
}

impl ResponseAssembler {
    pub(crate) fn new(observer: Arc<dyn RequestObserver>, request_url: String) -> Self {
        Self {
            observer,
            request_url,
        }
    }

    /// Terminal report for a configuration that never produced an exchange.
    pub(crate) fn emit_invalid(self) {
        let report = invalid_report(&self.request_url);
        self.observer.on_done(&report);
    }

    /// Terminal report from a completed or aborted exchange.
    pub(crate) fn emit_done<H: Exchange>(self, exchange: &H) {
        let report = exchange_report(&self.request_url, exchange);
        self.observer.on_done(&report);
    }
}

fn exchange_report<H: Exchange>(request_url: &str, exchange: &H) -> ResponseReport {
    let error_message = exchange.error_message().unwrap_or_default();
    ResponseReport {
        status: exchange.status_code(),
        request_url: request_url.to_owned(),
        has_error: !error_message.trim().is_empty(),
        error_message,
        headers: exchange.response_headers().unwrap_or_default(),
        uri: exchange
            .resolved_uri()
            .or_else(|| request_url.parse().ok())
            .unwrap_or_else(|| Uri::from_static(FALLBACK_URI)),
        text: exchange.body_text(),
    }
}

fn invalid_report(request_url: &str) -> ResponseReport {
    let request_url = if request_url.trim().is_empty() {
        String::new()
    } else {
        request_url.to_owned()
    };
    ResponseReport {
        status: INVALID_REQUEST_STATUS,
        uri: request_url
            .parse()
            .ok()
            .filter(|uri: &Uri| uri.scheme_str().is_some() && uri.host().is_some())
            .unwrap_or_else(|| Uri::from_static(FALLBACK_URI)),
        request_url,
        has_error: true,
        error_message: String::new(),
        headers: HeaderMap::new(),
        text: String::new(),
    }
}
