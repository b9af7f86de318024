use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{error, info};

use crate::config::RequestConfig;
use crate::response::{ResponseAssembler, ResponseReport};
use crate::retry::RetryPolicy;
use crate::transport::{Exchange, PreparedRequest, Transport};
use crate::watchdog::{StallVerdict, StallWatchdog};

/// How long the poll loop yields between ticks.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Receives the controller's notifications.
///
/// Register the observer at construction, before any exchange can start.
/// `on_restart` fires before each retry attempt begins; `on_done` delivers
/// the single terminal report and is the last event a controller instance
/// ever emits. A cancelled request emits neither.
pub trait RequestObserver: Send + Sync + 'static {
    /// A stalled attempt is about to be retried; carries the number of
    /// attempts used so far.
    fn on_restart(&self, _attempts_used: u32) {}

    /// The terminal report, emitted exactly once per controller instance.
    fn on_done(&self, _report: &ResponseReport) {}
}

/// No-op observer for callers that only poll [`RequestExecutor::state`].
impl RequestObserver for () {}

/// Lifecycle stage of the controller.
///
/// Advances only forward within an attempt cycle; the sole backward edge is
/// the explicit `Timeout` to `Pending` restart transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestState {
    /// No exchange running. Also terminal when construction failed
    /// validation.
    Idle = 0,
    /// The poll loop is driving an in-flight exchange.
    Pending = 1,
    /// The current attempt stalled past its budget.
    Timeout = 2,
    /// The exchange finished and the terminal report was emitted.
    Completed = 3,
}

impl RequestState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Pending,
            2 => Self::Timeout,
            3 => Self::Completed,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Default)]
struct StateCell(AtomicU8);

impl StateCell {
    fn load(&self) -> RequestState {
        RequestState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn store(&self, state: RequestState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Moves `from` to `to`; returns false if another transition won.
    fn transition(&self, from: RequestState, to: RequestState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Drives one logical request to exactly one terminal report.
///
/// The executor validates its configuration, issues exchanges through the
/// transport, polls them cooperatively, retries stalled attempts within the
/// configured limit, and hands the normalized outcome to the observer. The
/// state guards assume single-threaded invocation of `start`/`stop`;
/// concurrent calls from multiple threads are the caller's responsibility to
/// avoid.
pub struct RequestExecutor<T: Transport> {
    transport: Arc<T>,
    observer: Arc<dyn RequestObserver>,
    state: Arc<StateCell>,
    config: Option<RequestConfig>,
    prepared: Option<PreparedRequest>,
    cancel: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl<T: Transport> RequestExecutor<T> {
    /// Validates the configuration and builds the controller.
    ///
    /// On validation failure the configuration-invalid terminal report is
    /// emitted synchronously, before this returns, and no exchange is ever
    /// created. With `auto_start` set, polling begins immediately; either
    /// way, construction must happen inside a Tokio runtime.
    pub fn new(config: RequestConfig, observer: Arc<dyn RequestObserver>, transport: Arc<T>) -> Self {
        let state = Arc::new(StateCell::default());
        match config.prepare() {
            Ok(prepared) => {
                let auto_start = config.is_auto_start();
                let mut executor = Self {
                    transport,
                    observer,
                    state,
                    config: Some(config),
                    prepared: Some(prepared),
                    cancel: None,
                    task: None,
                };
                if auto_start {
                    executor.start();
                }
                executor
            }
            Err(validation_error) => {
                error!(
                    url = %config.url(),
                    error = %validation_error,
                    "failed to configure request"
                );
                ResponseAssembler::new(observer.clone(), config.url().to_owned()).emit_invalid();
                Self {
                    transport,
                    observer,
                    state,
                    config: None,
                    prepared: None,
                    cancel: None,
                    task: None,
                }
            }
        }
    }

    /// Current lifecycle stage; readable at any time.
    pub fn state(&self) -> RequestState {
        self.state.load()
    }

    /// Begins the poll loop. Valid only from [`RequestState::Idle`]; in any
    /// other state, or after a failed-validation construction, this is a
    /// silent no-op.
    pub fn start(&mut self) {
        if self.state.load() != RequestState::Idle {
            return;
        }
        let Some(config) = self.config.clone() else {
            return;
        };
        let prepared = match self.prepared.take() {
            Some(prepared) => prepared,
            None => match config.prepare() {
                Ok(prepared) => prepared,
                Err(validation_error) => {
                    error!(
                        url = %config.url(),
                        error = %validation_error,
                        "failed to reconfigure request"
                    );
                    return;
                }
            },
        };

        self.state.store(RequestState::Pending);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.cancel = Some(cancel_tx);
        let assembler =
            ResponseAssembler::new(self.observer.clone(), config.url().to_owned());
        let context = LoopContext {
            transport: self.transport.clone(),
            observer: self.observer.clone(),
            state: self.state.clone(),
            policy: RetryPolicy::new(config.attempt_limit_value()),
            config,
            prepared,
            cancel: cancel_rx,
        };
        self.task = Some(tokio::spawn(run_loop(context, assembler)));
    }

    /// Cancels a pending request and tears the exchange down.
    ///
    /// Valid only from [`RequestState::Pending`]; otherwise a silent no-op.
    /// Returns once the exchange has been aborted and released. No terminal
    /// report is emitted: cancellation is caller-initiated abandonment, not
    /// a result-bearing outcome.
    pub async fn stop(&mut self) {
        if !self
            .state
            .transition(RequestState::Pending, RequestState::Idle)
        {
            return;
        }
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(true);
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

struct LoopContext<T: Transport> {
    transport: Arc<T>,
    observer: Arc<dyn RequestObserver>,
    state: Arc<StateCell>,
    policy: RetryPolicy,
    config: RequestConfig,
    prepared: PreparedRequest,
    cancel: watch::Receiver<bool>,
}

async fn run_loop<T: Transport>(context: LoopContext<T>, assembler: ResponseAssembler) {
    let LoopContext {
        transport,
        observer,
        state,
        policy,
        config,
        mut prepared,
        cancel,
    } = context;
    let mut attempts_used: u32 = 0;

    loop {
        let budget = policy.attempt_budget(attempts_used + 1);
        attempts_used += 1;

        let mut exchange = match transport.issue(&prepared) {
            Ok(exchange) => exchange,
            Err(issue_error) => {
                // No terminal report on this path; callers that care apply
                // their own external timeout.
                error!(
                    url = %config.url(),
                    attempt = attempts_used,
                    error = %issue_error,
                    "failed to issue exchange"
                );
                return;
            }
        };

        let attempt_started = Instant::now();
        let mut watchdog = StallWatchdog::new(budget);

        let finished_naturally = loop {
            if *cancel.borrow() {
                info!(url = %config.url(), "request was cancelled");
                exchange.abort();
                return;
            }
            if exchange.is_done() {
                break true;
            }
            let progress = exchange.upload_progress() + exchange.download_progress();
            if watchdog.observe(progress, attempt_started.elapsed()) == StallVerdict::Stalled {
                break false;
            }
            sleep(POLL_INTERVAL).await;
        };

        if finished_naturally {
            if !state.transition(RequestState::Pending, RequestState::Completed) {
                // A concurrent stop won the race; tear down silently.
                exchange.abort();
                return;
            }
            let outcome = exchange.outcome();
            if outcome.is_error() {
                error!(
                    outcome = %outcome,
                    error = exchange.error_message().as_deref().unwrap_or(""),
                    url = %config.url(),
                    "request finished with transport error"
                );
            } else {
                info!(
                    url = %config.url(),
                    status = exchange.status_code(),
                    "request completed"
                );
            }
            assembler.emit_done(&exchange);
            drop(config);
            return;
        }

        // Stalled at or past the attempt budget.
        if !state.transition(RequestState::Pending, RequestState::Timeout) {
            exchange.abort();
            return;
        }
        if policy.allows_another(attempts_used) {
            exchange.abort();
            drop(exchange);
            state.store(RequestState::Pending);
            info!(
                url = %config.url(),
                attempt = attempts_used,
                "request timed out and will restart"
            );
            observer.on_restart(attempts_used);
            prepared = match config.prepare() {
                Ok(prepared) => prepared,
                Err(validation_error) => {
                    error!(
                        url = %config.url(),
                        error = %validation_error,
                        "failed to reconfigure request for restart"
                    );
                    return;
                }
            };
            continue;
        }

        // Attempts exhausted: the report is built from whatever state the
        // aborted exchange is in.
        exchange.abort();
        assembler.emit_done(&exchange);
        drop(config);
        return;
    }
}
