//! Forwarder sync engine
//!
//! The SyncEngine is responsible for:
//! - Fetching the part of the account snapshot a desired list touches
//! - Diffing desired against current state
//! - Applying the resulting creates/updates, one API call per forwarder
//! - Reporting every per-entry outcome
//!
//! ## Flow
//!
//! ```text
//!  desired entries ──► plan() ──► SyncPlan ──► apply() ──► SyncReport
//!                        │                        │
//!                        ▼                        ▼
//!               list_domains()           create_forwarder()
//!               list_forwarders()        modify_forwarder()
//!                 (per domain)             (per change)
//! ```
//!
//! ## Failure policy
//!
//! - A failed write is recorded and the next write still happens. Nothing is
//!   rolled back.
//! - Rejected credentials stop the run immediately. During apply the
//!   report is still returned, with [`SyncReport::aborted`] set, so the
//!   writes that already went through can be shown.
//! - Entries for domains the account does not host are rejected during
//!   planning without any write call.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::forwarders::{ChangeAction, ForwarderChange, ForwarderEntry, diff};
use crate::snapshot::AccountSnapshot;
use crate::traits::ControlPanel;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Planning finished
    Planned {
        creates: usize,
        updates: usize,
        unchanged: usize,
        rejected: usize,
    },

    /// A write is about to be sent
    WriteStarted {
        address: String,
        action: ChangeAction,
    },

    /// A write succeeded
    WriteSucceeded {
        address: String,
        action: ChangeAction,
    },

    /// A write failed; later writes continue
    WriteFailed { address: String, error: String },

    /// Apply finished
    Finished { succeeded: usize, failed: usize },
}

/// An entry that could not be planned
#[derive(Debug)]
pub struct RejectedEntry {
    /// The desired forwarder
    pub entry: ForwarderEntry,
    /// Why it was rejected
    pub error: Error,
}

/// Changes computed by [`SyncEngine::plan`]
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// One change per accepted desired entry, in input order
    pub changes: Vec<ForwarderChange>,
    /// Entries that cannot be applied to this account
    pub rejected: Vec<RejectedEntry>,
}

impl SyncPlan {
    /// Number of changes with the given action
    pub fn count(&self, action: ChangeAction) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }
}

/// Result of one planned change after apply
#[derive(Debug)]
pub struct SyncOutcome {
    /// The change that was applied (or skipped, when unchanged)
    pub change: ForwarderChange,
    /// `Err(Error::RemoteWrite)` when the write failed
    pub result: Result<()>,
}

impl SyncOutcome {
    /// Whether the change is in place on the account
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything that happened during a sync
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Outcome of each planned change, in input order
    pub outcomes: Vec<SyncOutcome>,
    /// Entries rejected during planning
    pub rejected: Vec<RejectedEntry>,
    /// Set when rejected credentials stopped apply; later changes were not tried
    pub aborted: Option<Error>,
}

impl SyncReport {
    /// Successful outcomes with the given action
    pub fn succeeded(&self, action: ChangeAction) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes
            .iter()
            .filter(move |o| o.change.action == action && o.is_success())
    }

    /// Failed writes
    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Number of failed writes plus rejected entries
    pub fn failure_count(&self) -> usize {
        self.failures().count() + self.rejected.len()
    }

    /// Whether every desired entry is now in place
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failure_count() == 0
    }
}

/// Forwarder sync engine
///
/// Runs strictly sequentially: every panel call is awaited before the next
/// one is issued.
pub struct SyncEngine {
    /// Control panel for reads and writes
    panel: Box<dyn ControlPanel>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields sync events.
    /// Dropping the receiver is fine; events are then discarded.
    pub fn new(
        panel: Box<dyn ControlPanel>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        if config.event_channel_capacity == 0 {
            return Err(Error::config("Event channel capacity must be > 0"));
        }

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);
        Ok((
            Self {
                panel,
                event_tx: tx,
            },
            rx,
        ))
    }

    /// Fetch current state and compute the changes for `desired`
    ///
    /// Issues one domain list call and one forwarder list call per distinct
    /// hosted domain among the desired entries.
    pub async fn plan(&self, desired: &[ForwarderEntry]) -> Result<SyncPlan> {
        let mut snapshot = AccountSnapshot::new(self.panel.list_domains().await?);

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        let mut fetched: Vec<String> = Vec::new();

        for entry in desired {
            let Some(domain) = snapshot.hosted_domain(entry.domain()).map(str::to_string) else {
                warn!(
                    "{} is not hosted on this account, skipping {}",
                    entry.domain(),
                    entry.address()
                );
                rejected.push(RejectedEntry {
                    entry: entry.clone(),
                    error: Error::not_found(format!(
                        "domain {} is not hosted on this account",
                        entry.domain()
                    )),
                });
                continue;
            };

            if !fetched.contains(&domain) {
                debug!("Fetching forwarders for {}", domain);
                let forwarders = self.panel.list_forwarders(&domain).await?;
                snapshot.insert_forwarders(&domain, forwarders);
                fetched.push(domain.clone());
            }

            // Writes go to the domain as the panel spells it
            accepted.push(ForwarderEntry::new(
                format!("{}@{}", entry.user(), domain),
                entry.destinations().to_vec(),
            ));
        }

        let plan = SyncPlan {
            changes: diff(&accepted, &snapshot),
            rejected,
        };

        self.emit_event(SyncEvent::Planned {
            creates: plan.count(ChangeAction::Create),
            updates: plan.count(ChangeAction::Update),
            unchanged: plan.count(ChangeAction::Unchanged),
            rejected: plan.rejected.len(),
        });

        Ok(plan)
    }

    /// Apply a plan
    ///
    /// Unchanged entries are not sent. A failed write is recorded as
    /// [`Error::RemoteWrite`] and processing continues with the next change,
    /// except for rejected credentials: apply stops there and the report
    /// carries the [`Error::Authentication`] in `aborted`.
    pub async fn apply(&self, plan: SyncPlan) -> Result<SyncReport> {
        let mut report = SyncReport {
            outcomes: Vec::with_capacity(plan.changes.len()),
            rejected: plan.rejected,
            aborted: None,
        };

        for change in plan.changes {
            if !change.action.is_write() {
                debug!("{} is already up to date", change.address());
                report.outcomes.push(SyncOutcome {
                    change,
                    result: Ok(()),
                });
                continue;
            }

            self.emit_event(SyncEvent::WriteStarted {
                address: change.address().to_string(),
                action: change.action,
            });

            let result = match self.write(&change).await {
                Ok(()) => {
                    info!(
                        "{} {} -> {}",
                        change.action,
                        change.address(),
                        change.destinations().join(",")
                    );
                    self.emit_event(SyncEvent::WriteSucceeded {
                        address: change.address().to_string(),
                        action: change.action,
                    });
                    Ok(())
                }
                Err(e) if e.is_authentication() => {
                    warn!(
                        "Credentials rejected while writing {}, stopping",
                        change.address()
                    );
                    self.emit_event(SyncEvent::WriteFailed {
                        address: change.address().to_string(),
                        error: e.to_string(),
                    });
                    report.aborted = Some(e);
                    break;
                }
                Err(e) => {
                    warn!("Failed to write forwarder {}: {}", change.address(), e);
                    self.emit_event(SyncEvent::WriteFailed {
                        address: change.address().to_string(),
                        error: e.to_string(),
                    });
                    Err(Error::remote_write(change.address(), e.to_string()))
                }
            };

            report.outcomes.push(SyncOutcome { change, result });
        }

        let failed = report.failures().count();
        self.emit_event(SyncEvent::Finished {
            succeeded: report.outcomes.len() - failed,
            failed,
        });

        Ok(report)
    }

    /// Plan and apply in one step
    pub async fn sync(&self, desired: &[ForwarderEntry]) -> Result<SyncReport> {
        let plan = self.plan(desired).await?;
        self.apply(plan).await
    }

    /// Perform a single forwarder write
    async fn write(&self, change: &ForwarderChange) -> Result<()> {
        let entry = &change.entry;
        match change.action {
            ChangeAction::Create => {
                self.panel
                    .create_forwarder(entry.domain(), entry.user(), entry.destinations())
                    .await
            }
            ChangeAction::Update => {
                self.panel
                    .modify_forwarder(entry.domain(), entry.user(), entry.destinations())
                    .await
            }
            ChangeAction::Unchanged => Ok(()),
        }
    }

    /// Emit a sync event
    fn emit_event(&self, event: SyncEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Event channel full, dropping event. \
                    Consider increasing event_channel_capacity."
                );
            }
        }
    }
}
