//! gpsd-backed location platform.
//!
//! Connects to a gpsd daemon over TCP, enables JSON watch mode, and turns
//! TPV reports into platform fixes.
//!
//! # Requests
//!
//! Each single-shot request opens its own connection and reads reports
//! until a TPV satisfies the strategy (3-D fix for high accuracy, 2-D or
//! better otherwise) or the strategy timeout expires. The last accepted
//! fix is kept and handed back when a later request tolerates its age.
//!
//! # Subscriptions
//!
//! Each continuous subscription runs as a spawned task that keeps a
//! connection open and forwards every qualifying fix. A quiet period longer
//! than the strategy timeout is reported as a `Timeout` event. Lost
//! connections are retried with exponential backoff (2^n seconds, capped at
//! one minute). Cancelling a subscription stops its task before any further
//! event is delivered.

mod config;
mod error;
pub mod protocol;

pub use config::{GpsdConfig, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT};
pub use error::GpsdError;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::error::PlatformFailure;
use super::platform::{LocationPlatform, PositionSink, SubscriptionId};
use super::reading::PlatformFix;
use super::strategy::AcquisitionStrategy;
use protocol::{Report, Tpv, WATCH_COMMAND};

/// Maximum reconnect backoff for subscriptions.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

type ReportLines = Lines<BufReader<TcpStream>>;

#[derive(Debug, Clone, Copy)]
struct CachedFix {
    fix: PlatformFix,
    mode: u8,
    received: Instant,
}

impl CachedFix {
    fn satisfies(&self, strategy: &AcquisitionStrategy) -> bool {
        self.mode >= Tpv::required_mode(strategy.high_accuracy)
            && self.received.elapsed() < strategy.max_cached_age
    }
}

/// Shared last-fix cache.
#[derive(Debug, Clone, Default)]
struct FixCache(Arc<Mutex<Option<CachedFix>>>);

impl FixCache {
    fn get(&self, strategy: &AcquisitionStrategy) -> Option<PlatformFix> {
        self.0
            .lock()
            .filter(|cached| cached.satisfies(strategy))
            .map(|cached| cached.fix)
    }

    fn store(&self, fix: PlatformFix, mode: u8) {
        *self.0.lock() = Some(CachedFix {
            fix,
            mode,
            received: Instant::now(),
        });
    }
}

/// Location platform backed by a gpsd daemon.
///
/// Continuous subscriptions spawn Tokio tasks, so
/// [`request_continuous_position`](LocationPlatform::request_continuous_position)
/// must be called from within a runtime.
pub struct GpsdPlatform {
    config: GpsdConfig,
    cache: FixCache,
    watches: Arc<DashMap<SubscriptionId, CancellationToken>>,
    next_subscription: AtomicU64,
}

impl GpsdPlatform {
    pub fn new(config: GpsdConfig) -> Self {
        Self {
            config,
            cache: FixCache::default(),
            watches: Arc::new(DashMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &GpsdConfig {
        &self.config
    }

    /// Number of subscriptions whose tasks are still running.
    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }
}

impl Default for GpsdPlatform {
    fn default() -> Self {
        Self::new(GpsdConfig::default())
    }
}

impl Drop for GpsdPlatform {
    fn drop(&mut self) {
        for entry in self.watches.iter() {
            entry.value().cancel();
        }
    }
}

impl LocationPlatform for GpsdPlatform {
    fn is_available(&self) -> bool {
        true
    }

    fn request_position(
        &self,
        strategy: AcquisitionStrategy,
    ) -> impl Future<Output = Result<PlatformFix, PlatformFailure>> + Send {
        let config = self.config.clone();
        let cache = self.cache.clone();

        async move {
            if let Some(fix) = cache.get(&strategy) {
                debug!(accuracy_m = fix.accuracy_meters, "Reusing cached gpsd fix");
                return Ok(fix);
            }

            let session = async {
                let mut lines = connect(&config).await?;
                let (fix, mode) = next_fix(&mut lines, strategy.high_accuracy).await?;
                cache.store(fix, mode);
                Ok::<_, GpsdError>(fix)
            };

            match tokio::time::timeout(strategy.timeout, session).await {
                Ok(result) => result.map_err(PlatformFailure::from),
                Err(_) => Err(GpsdError::NoFix {
                    timeout_ms: strategy.timeout_millis(),
                }
                .into()),
            }
        }
    }

    fn request_continuous_position(
        &self,
        strategy: AcquisitionStrategy,
        sink: PositionSink,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        self.watches.insert(id, token.clone());

        let watch = Watch {
            id,
            config: self.config.clone(),
            strategy,
            sink,
            token,
            cache: self.cache.clone(),
        };
        let watches = Arc::clone(&self.watches);
        tokio::spawn(async move {
            watch.run().await;
            watches.remove(&id);
        });

        id
    }

    fn cancel_subscription(&self, id: SubscriptionId) {
        match self.watches.remove(&id) {
            Some((_, token)) => {
                debug!(subscription = %id, "Cancelling gpsd watch");
                token.cancel();
            }
            None => trace!(subscription = %id, "Cancel for unknown gpsd watch"),
        }
    }
}

/// Open a connection and enable JSON watch mode.
async fn connect(config: &GpsdConfig) -> Result<ReportLines, GpsdError> {
    let address = config.address();

    let mut stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&address))
        .await
        .map_err(|_| GpsdError::ConnectTimeout {
            address: address.clone(),
        })?
        .map_err(|source| GpsdError::Connect {
            address: address.clone(),
            source,
        })?;

    stream.write_all(WATCH_COMMAND).await?;

    trace!(%address, "Connected to gpsd");
    Ok(BufReader::new(stream).lines())
}

/// Read reports until one qualifies as a fix. Returns the fix and its mode.
async fn next_fix(
    lines: &mut ReportLines,
    high_accuracy: bool,
) -> Result<(PlatformFix, u8), GpsdError> {
    loop {
        let line = lines.next_line().await?.ok_or(GpsdError::Closed)?;

        match protocol::parse_report(&line) {
            Ok(Report::Tpv(tpv)) => {
                if let Some(fix) = tpv.to_fix(high_accuracy) {
                    return Ok((fix, tpv.mode));
                }
            }
            Ok(Report::Version { release, .. }) => {
                debug!(%release, "gpsd version");
            }
            Ok(Report::Error { message }) => {
                warn!(gpsd_message = %message, "gpsd reported an error");
            }
            Ok(Report::Other) => {}
            Err(e) => {
                trace!(error = %e, "Skipping malformed gpsd line");
            }
        }
    }
}

/// State of one continuous subscription task.
struct Watch {
    id: SubscriptionId,
    config: GpsdConfig,
    strategy: AcquisitionStrategy,
    sink: PositionSink,
    token: CancellationToken,
    cache: FixCache,
}

impl Watch {
    async fn run(self) {
        info!(
            subscription = %self.id,
            address = %self.config.address(),
            high_accuracy = self.strategy.high_accuracy,
            "gpsd watch started"
        );

        let mut consecutive_errors: u32 = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                result = self.stream(&mut consecutive_errors) => result,
            };

            if let Err(e) = result {
                consecutive_errors += 1;
                warn!(
                    subscription = %self.id,
                    error = %e,
                    consecutive_errors,
                    "gpsd watch connection failed"
                );
                self.deliver(Err(e.into()));
            }

            let backoff = calculate_backoff(consecutive_errors);
            debug!(
                subscription = %self.id,
                backoff_secs = backoff.as_secs(),
                "Reconnecting to gpsd"
            );
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
        }

        info!(subscription = %self.id, "gpsd watch stopped");
    }

    /// Forward fixes from one connection until it fails.
    async fn stream(&self, consecutive_errors: &mut u32) -> Result<(), GpsdError> {
        let mut lines = connect(&self.config).await?;

        loop {
            match tokio::time::timeout(
                self.strategy.timeout,
                next_fix(&mut lines, self.strategy.high_accuracy),
            )
            .await
            {
                Ok(Ok((fix, mode))) => {
                    *consecutive_errors = 0;
                    self.cache.store(fix, mode);
                    self.deliver(Ok(fix));
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    let quiet = GpsdError::NoFix {
                        timeout_ms: self.strategy.timeout_millis(),
                    };
                    self.deliver(Err(quiet.into()));
                }
            }
        }
    }

    fn deliver(&self, event: Result<PlatformFix, PlatformFailure>) {
        if !self.token.is_cancelled() {
            (self.sink)(event);
        }
    }
}

/// Calculate exponential backoff: 2^n seconds, capped at MAX_BACKOFF.
fn calculate_backoff(consecutive_errors: u32) -> Duration {
    let secs = 2u64.saturating_pow(consecutive_errors.min(20));
    Duration::from_secs(secs).min(MAX_BACKOFF)
}
