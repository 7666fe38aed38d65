//! Timer-driven poll loop: fetch the status record, project it, publish it.
//!
//! Each tick dispatches its fetch as a separate task, so a slow response never
//! delays the timer. Responses are fenced by dispatch order: a view is applied
//! only if it comes from a fetch dispatched after the one that produced the
//! current view.

use std::sync::Arc;
use std::time::Duration;

use async_channel::{Receiver, Sender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::fetch::AuthFetch;
use crate::record::StatusRecord;
use crate::view::{Projector, ViewState};

const COMMAND_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub auto_update: bool,
}

impl PollSettings {
    fn state(&self) -> PollState {
        if self.auto_update {
            PollState::Active
        } else {
            PollState::Idle
        }
    }
}

impl From<&Config> for PollSettings {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.poll_interval,
            auto_update: config.auto_update,
        }
    }
}

/// What the loop publishes after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub view: ViewState,
    /// Sequence number of the fetch that produced `view`; 0 before any.
    pub applied_seq: u64,
    /// Sequence number of the newest failed fetch; 0 before any.
    pub failed_seq: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub state: PollState,
    pub interval: Duration,
}

impl Snapshot {
    fn new(settings: &PollSettings) -> Self {
        Self {
            view: ViewState::default(),
            applied_seq: 0,
            failed_seq: 0,
            consecutive_failures: 0,
            last_error: None,
            state: settings.state(),
            interval: settings.interval,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.consecutive_failures > 0
    }
}

#[derive(Debug)]
enum Command {
    SetAutoUpdate(bool),
    SetInterval(Duration),
    Refresh,
}

#[derive(Clone)]
pub struct Poller {
    commands: Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl Poller {
    pub fn new(
        fetch: Arc<dyn AuthFetch>,
        caption_url: impl Into<String>,
        projector: Projector,
        settings: PollSettings,
    ) -> (Self, JoinHandle<()>) {
        let (commands, receiver) = async_channel::bounded(COMMAND_CAPACITY);
        let (publisher, snapshots) = watch::channel(Snapshot::new(&settings));

        let cycle = Arc::new(Cycle {
            fetch,
            caption_url: caption_url.into(),
            projector,
            publisher,
        });
        let handle = tokio::spawn(Self::run(cycle, receiver, settings));

        (
            Self {
                commands,
                snapshots,
            },
            handle,
        )
    }

    async fn run(cycle: Arc<Cycle>, commands: Receiver<Command>, mut settings: PollSettings) {
        let mut ticker = schedule(&settings);
        let mut next_seq: u64 = 0;

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Ok(command) = command else {
                        break;
                    };

                    match command {
                        Command::SetAutoUpdate(enabled) => {
                            if enabled == settings.auto_update {
                                continue;
                            }
                            settings.auto_update = enabled;
                            info!("Auto update {}", if enabled { "enabled" } else { "disabled" });
                        }
                        Command::SetInterval(period) => {
                            if period == settings.interval {
                                continue;
                            }
                            settings.interval = period;
                            info!("Polling interval set to {:?}", period);
                        }
                        Command::Refresh => {
                            next_seq += 1;
                            cycle.dispatch(next_seq);
                            continue;
                        }
                    }

                    // the old timer is dropped; a new one ticks immediately
                    ticker = schedule(&settings);
                    cycle.publisher.send_modify(|snapshot| {
                        snapshot.state = settings.state();
                        snapshot.interval = settings.interval;
                    });
                }
                _ = next_tick(&mut ticker) => {
                    next_seq += 1;
                    cycle.dispatch(next_seq);
                }
            }
        }

        debug!("Poll loop stopped");
    }

    pub async fn set_auto_update(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetAutoUpdate(enabled)).await
    }

    pub async fn set_interval(&self, period: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(Error::Config("Polling interval must be positive".into()));
        }
        self.send(Command::SetInterval(period)).await
    }

    /// One fetch outside the schedule; the timer is left alone.
    pub async fn refresh(&self) -> Result<()> {
        self.send(Command::Refresh).await
    }

    /// Stops future ticks. Fetches already in flight still complete.
    pub fn stop(&self) {
        self.commands.close();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::PollerStopped)
    }
}

struct Cycle {
    fetch: Arc<dyn AuthFetch>,
    caption_url: String,
    projector: Projector,
    publisher: watch::Sender<Snapshot>,
}

impl Cycle {
    fn dispatch(self: &Arc<Self>, seq: u64) {
        let cycle = Arc::clone(self);
        tokio::spawn(async move { cycle.run(seq).await });
    }

    /// Never fails: errors are logged and recorded on the snapshot.
    async fn run(&self, seq: u64) {
        match self.fetch_view().await {
            Ok(view) => {
                let applied = self.publisher.send_if_modified(|snapshot| {
                    if seq <= snapshot.applied_seq {
                        return false;
                    }
                    snapshot.view = view;
                    snapshot.applied_seq = seq;
                    // a newer fetch already failed: the data is still stale
                    if seq > snapshot.failed_seq {
                        snapshot.consecutive_failures = 0;
                        snapshot.last_error = None;
                    }
                    true
                });

                if !applied {
                    debug!(seq, "Discarding response older than the applied view");
                }
            }
            Err(err) => {
                error!(seq, "/caption error: {}", err);
                self.publisher.send_if_modified(|snapshot| {
                    if seq <= snapshot.applied_seq {
                        return false;
                    }
                    snapshot.failed_seq = snapshot.failed_seq.max(seq);
                    snapshot.consecutive_failures += 1;
                    snapshot.last_error = Some(err.to_string());
                    true
                });
            }
        }
    }

    async fn fetch_view(&self) -> Result<ViewState> {
        let body = self.fetch.get_json(&self.caption_url).await?;
        let record = StatusRecord::from_json(body)?;

        self.projector.project(&record)
    }
}

fn schedule(settings: &PollSettings) -> Option<Interval> {
    if !settings.auto_update {
        return None;
    }

    let mut ticker = interval(settings.interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(ticker)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
