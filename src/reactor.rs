//! Re-applying the navigation fix whenever it might be needed.
//!
//! The pages are rewritten by a process navcase does not control, so the
//! reactor fires redundantly instead of relying on any single signal:
//!
//! - once at startup, then after each configured initial delay;
//! - one deferred "frame" after mutation batches (a pending frame absorbs
//!   further batches);
//! - on every page lifecycle event;
//! - after each location change, at the configured follow-up delays;
//! - on a fallback timer, for a bounded number of ticks.
//!
//! Every run is idempotent, so redundant runs cost a scan and nothing else.
//! Mutation batches, page events and the location observable are optional
//! capabilities; a reactor without them still runs its timers.

use std::fmt;
use std::future::{self, Future};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant};

use crate::config::TriggerConfig;
use crate::surface::NavSurface;

/// Paths changed together.
pub type MutationBatch = Vec<PathBuf>;

/// Page lifecycle and navigation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    DomContentLoaded,
    Load,
    HashChange,
    PopState,
    /// Instant navigation swapped the page content.
    ContentSwitch,
}

impl fmt::Display for PageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageEvent::DomContentLoaded => "DOMContentLoaded",
            PageEvent::Load => "load",
            PageEvent::HashChange => "hashchange",
            PageEvent::PopState => "popstate",
            PageEvent::ContentSwitch => "content-switch",
        };
        f.write_str(name)
    }
}

/// A source of location changes (the path navigated to).
pub trait LocationObservable {
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

impl LocationObservable for broadcast::Sender<String> {
    fn subscribe(&self) -> broadcast::Receiver<String> {
        broadcast::Sender::subscribe(self)
    }
}

/// Why a run happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Delay(Duration),
    Frame,
    Page(PageEvent),
    Location(String),
    Fallback(u32),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => f.write_str("startup"),
            Trigger::Delay(delay) => write!(f, "delay {}ms", delay.as_millis()),
            Trigger::Frame => f.write_str("mutation frame"),
            Trigger::Page(event) => write!(f, "page event {event}"),
            Trigger::Location(path) => write!(f, "location {path}"),
            Trigger::Fallback(tick) => write!(f, "fallback tick {tick}"),
        }
    }
}

/// Totals over the reactor's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactorStats {
    pub runs: usize,
    pub nodes_rewritten: usize,
    pub failures: usize,
}

/// One-shot runs waiting for their deadline.
#[derive(Debug, Default)]
struct Schedule {
    pending: Vec<(Instant, Trigger)>,
}

impl Schedule {
    fn push(&mut self, at: Instant, trigger: Trigger) {
        self.pending.push((at, trigger));
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(at, _)| *at).min()
    }

    /// Remove and return every trigger due at `now`, earliest first.
    fn take_due(&mut self, now: Instant) -> Vec<Trigger> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = pending;
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, trigger)| trigger).collect()
    }

    fn contains(&self, trigger: &Trigger) -> bool {
        self.pending.iter().any(|(_, t)| t == trigger)
    }
}

/// Drives a [`NavSurface`] from timers and optional event sources.
///
/// Each run happens on the blocking thread pool; runs never overlap.
pub struct Reactor<S> {
    surface: Arc<Mutex<S>>,
    policy: TriggerConfig,
    mutations: Option<mpsc::UnboundedReceiver<MutationBatch>>,
    page_events: Option<mpsc::UnboundedReceiver<PageEvent>>,
    location: Option<broadcast::Receiver<String>>,
    stats: ReactorStats,
}

impl<S: NavSurface + 'static> Reactor<S> {
    pub fn new(surface: S, policy: TriggerConfig) -> Self {
        Self {
            surface: Arc::new(Mutex::new(surface)),
            policy,
            mutations: None,
            page_events: None,
            location: None,
            stats: ReactorStats::default(),
        }
    }

    /// Re-apply one frame after each batch of changes.
    pub fn with_mutations(mut self, mutations: mpsc::UnboundedReceiver<MutationBatch>) -> Self {
        self.mutations = Some(mutations);
        self
    }

    /// Re-apply on page lifecycle and navigation events.
    pub fn with_page_events(mut self, events: mpsc::UnboundedReceiver<PageEvent>) -> Self {
        self.page_events = Some(events);
        self
    }

    /// Re-apply after location changes. Subscribes immediately, so changes
    /// published before [`Reactor::run_until`] starts are not lost.
    pub fn with_location(mut self, observable: &impl LocationObservable) -> Self {
        self.location = Some(observable.subscribe());
        self
    }

    pub fn stats(&self) -> ReactorStats {
        self.stats
    }

    /// Apply the fix once, recording the outcome. Failures are logged, not
    /// returned: the next trigger simply tries again.
    pub async fn run_now(&mut self, trigger: &Trigger) {
        self.stats.runs += 1;

        let surface = Arc::clone(&self.surface);
        let result = tokio::task::spawn_blocking(move || {
            // Poisoned only if an earlier run panicked
            let mut surface = surface.lock().unwrap_or_else(PoisonError::into_inner);
            surface.apply()
        })
        .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.stats.failures += 1;
                tracing::warn!(%trigger, error = %e, "navigation fix task failed");
                return;
            }
        };

        match result {
            Ok(report) => {
                self.stats.nodes_rewritten += report.nodes_rewritten;
                if report.pages_written > 0 {
                    tracing::info!(%trigger, %report, "navigation labels updated");
                } else {
                    tracing::trace!(%trigger, "navigation labels already correct");
                }
            }
            Err(e) => {
                self.stats.failures += 1;
                tracing::warn!(%trigger, error = %e, "failed to apply navigation fix");
            }
        }
    }

    /// Run until `shutdown` completes, then return the totals.
    pub async fn run_until<F>(mut self, shutdown: F) -> ReactorStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let start = Instant::now();
        let mut schedule = Schedule::default();
        for &ms in &self.policy.initial_delays_ms {
            let delay = Duration::from_millis(ms);
            schedule.push(start + delay, Trigger::Delay(delay));
        }

        self.run_now(&Trigger::Startup).await;

        let period = Duration::from_millis(self.policy.fallback_interval_ms.max(1));
        let mut fallback = time::interval_at(start + period, period);
        let mut ticks = 0;

        let frame = Duration::from_millis(self.policy.frame_ms);
        let mut mutations = self.mutations.take();
        let mut page_events = self.page_events.take();
        let mut location = self.location.take();

        loop {
            let next = schedule.next_deadline();

            tokio::select! {
                biased;

                () = &mut shutdown => break,

                () = sleep_until(next) => {
                    for trigger in schedule.take_due(Instant::now()) {
                        self.run_now(&trigger).await;
                    }
                }

                _ = fallback.tick(), if ticks < self.policy.fallback_ticks => {
                    ticks += 1;
                    self.run_now(&Trigger::Fallback(ticks)).await;
                    if ticks == self.policy.fallback_ticks {
                        tracing::debug!(ticks, "fallback timer finished");
                    }
                }

                batch = recv(&mut mutations) => match batch {
                    Some(batch) => {
                        tracing::trace!(paths = batch.len(), "mutation batch");
                        if !schedule.contains(&Trigger::Frame) {
                            schedule.push(Instant::now() + frame, Trigger::Frame);
                        }
                    }
                    None => mutations = None,
                },

                event = recv(&mut page_events) => match event {
                    Some(event) => self.run_now(&Trigger::Page(event)).await,
                    None => page_events = None,
                },

                change = recv_location(&mut location) => match change {
                    Some(path) => {
                        let now = Instant::now();
                        for &ms in &self.policy.location_delays_ms {
                            let at = now + Duration::from_millis(ms);
                            schedule.push(at, Trigger::Location(path.clone()));
                        }
                    }
                    None => location = None,
                },
            }
        }

        self.stats
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

/// Receive from an optional channel; an absent channel never yields.
async fn recv<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => future::pending().await,
    }
}

async fn recv_location(rx: &mut Option<broadcast::Receiver<String>>) -> Option<String> {
    let Some(rx) = rx else {
        return future::pending().await;
    };

    loop {
        match rx.recv().await {
            Ok(path) => return Some(path),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // Missed some paths, but the next one triggers a run anyway
                tracing::debug!(skipped, "location subscriber lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
