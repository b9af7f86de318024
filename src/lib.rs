//! `confetch` fetches remote configuration payloads over HTTP for a client
//! application.
//!
//! The crate is built around a **request lifecycle controller**: a state
//! machine that issues a single HTTP exchange through a caller-supplied
//! [`Transport`], watches the exchange for stalls (no observable upload or
//! download progress, as opposed to merely being slow), aborts and retries
//! stalled exchanges under a bounded policy, supports cooperative
//! cancellation, and always delivers exactly one terminal [`ResponseReport`]
//! to its [`RequestObserver`], regardless of which path was taken: success,
//! transport error, or configuration-invalid.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use confetch::prelude::{RequestConfig, RequestExecutor, RequestObserver, ResponseReport};
//!
//! struct PrintObserver;
//!
//! impl RequestObserver for PrintObserver {
//!     fn on_done(&self, report: &ResponseReport) {
//!         println!("status={} body={}", report.status, report.text);
//!     }
//! }
//!
//! # fn demo(transport: Arc<impl confetch::Transport>) {
//! let config = RequestConfig::get("https://api.example.com/v1/combine")
//!     .header("x-api-key", "secret")
//!     .attempt_limit(3);
//!
//! let mut executor = RequestExecutor::new(config, Arc::new(PrintObserver), transport);
//! executor.start();
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - One controller manages one logical request, with at most one physical
//!   exchange in flight at a time. This is not a general-purpose HTTP client:
//!   no pooling, no redirects, no streaming.
//! - The default attempt limit is 1, which means the first attempt consumes
//!   the whole retry budget and the restart path never runs. Raise
//!   [`RequestConfig::attempt_limit`] to observe retries.
//! - Stopping a pending request tears the exchange down without a terminal
//!   report; cancellation is caller-initiated abandonment, not an outcome.

mod config;
mod endpoint;
mod error;
mod executor;
mod response;
mod retry;
mod transport;
mod watchdog;

pub use crate::config::{DEFAULT_ATTEMPT_LIMIT, RequestConfig, RequestMethod, RequestOptions};
pub use crate::endpoint::{catalog_url, combine_content_url};
pub use crate::error::{Error, ErrorCode};
pub use crate::executor::{RequestExecutor, RequestObserver, RequestState};
pub use crate::response::{INVALID_REQUEST_STATUS, ResponseReport};
pub use crate::retry::RetryPolicy;
pub use crate::transport::{Exchange, ExchangeOutcome, PreparedRequest, RequestBody, Transport};
pub use crate::watchdog::{StallVerdict, StallWatchdog};

pub type ConfetchResult<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        ConfetchResult, Error, ErrorCode, Exchange, ExchangeOutcome, PreparedRequest,
        RequestConfig, RequestExecutor, RequestMethod, RequestObserver, RequestOptions,
        RequestState, ResponseReport, RetryPolicy, Transport,
    };
}
