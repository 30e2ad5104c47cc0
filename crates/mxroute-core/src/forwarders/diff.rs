//! Reconcile a desired forwarder list against an account snapshot

use super::{ForwarderEntry, same_destinations};
use crate::snapshot::AccountSnapshot;
use std::fmt;

/// What has to happen to one desired forwarder
///
/// There is deliberately no delete: forwarders that exist only on the
/// account are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// The forwarder does not exist yet
    Create,
    /// The forwarder exists with a different destination set
    Update,
    /// The forwarder already has exactly these destinations
    Unchanged,
}

impl ChangeAction {
    /// Whether this action needs a remote write
    pub fn is_write(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Unchanged => "UNCHANGED",
        })
    }
}

/// One line of a reconciliation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderChange {
    /// The desired forwarder
    pub entry: ForwarderEntry,
    /// Destinations currently on the account, when the forwarder exists
    pub current: Option<Vec<String>>,
    /// What to do
    pub action: ChangeAction,
}

impl ForwarderChange {
    /// Local address
    pub fn address(&self) -> &str {
        self.entry.address()
    }

    /// Desired destinations
    pub fn destinations(&self) -> &[String] {
        self.entry.destinations()
    }
}

/// Compute the change needed for every desired entry, in input order
pub fn diff(desired: &[ForwarderEntry], current: &AccountSnapshot) -> Vec<ForwarderChange> {
    desired
        .iter()
        .map(|entry| {
            let existing = current.forwarder(entry.address());
            let action = match existing {
                None => ChangeAction::Create,
                Some(dests) if same_destinations(dests, entry.destinations()) => {
                    ChangeAction::Unchanged
                }
                Some(_) => ChangeAction::Update,
            };

            ForwarderChange {
                entry: entry.clone(),
                current: existing.map(<[String]>::to_vec),
                action,
            }
        })
        .collect()
}
