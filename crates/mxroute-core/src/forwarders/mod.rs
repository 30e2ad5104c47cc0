//! Forwarder list translation
//!
//! Converts between the line-oriented forwarder format
//!
//! ```text
//! local@domain --> dest1@domain,dest2@domain
//! ```
//!
//! and [`ForwarderEntry`] values, and reconciles a desired list against an
//! [`AccountSnapshot`](crate::snapshot::AccountSnapshot).
//!
//! ## Address comparison
//!
//! The local part of an address is compared case-sensitively and the domain
//! part case-insensitively, so `a@X.com` and `a@x.com` are the same address
//! while `A@x.com` is a different one. Destinations without an `@` (such as
//! `:fail:` or pipe targets) are compared verbatim.

pub mod diff;
pub mod parse;

pub use diff::{ChangeAction, ForwarderChange, diff};
pub use parse::{parse, parse_line, serialize};

use std::collections::BTreeSet;
use std::fmt;

/// Separator between the local address and its destinations
pub const SEPARATOR: &str = "-->";

/// Split `user@domain` into its two parts
///
/// Returns `None` unless there is exactly one `@` with text on both sides.
pub fn split_address(address: &str) -> Option<(&str, &str)> {
    let (user, domain) = address.split_once('@')?;
    if user.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some((user, domain))
}

/// Comparison key for an address under the crate's case policy
pub fn address_key(address: &str) -> String {
    match split_address(address) {
        Some((user, domain)) => format!("{}@{}", user, domain.to_ascii_lowercase()),
        None => address.to_string(),
    }
}

/// Whether two destination lists hold the same set of addresses
pub fn same_destinations(a: &[String], b: &[String]) -> bool {
    let a: BTreeSet<String> = a.iter().map(|d| address_key(d)).collect();
    let b: BTreeSet<String> = b.iter().map(|d| address_key(d)).collect();
    a == b
}

/// A local mailbox address and the addresses its mail is forwarded to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderEntry {
    address: String,
    destinations: Vec<String>,
}

impl ForwarderEntry {
    /// Create an entry
    ///
    /// Destinations keep their first-seen order; later duplicates (under the
    /// address comparison policy) are dropped.
    pub fn new<I, S>(address: impl Into<String>, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let destinations = destinations
            .into_iter()
            .map(Into::into)
            .filter(|d: &String| seen.insert(address_key(d)))
            .collect();

        Self {
            address: address.into(),
            destinations,
        }
    }

    /// Full local address, `user@domain`
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The part before `@`
    pub fn user(&self) -> &str {
        split_address(&self.address)
            .map(|(user, _)| user)
            .unwrap_or(&self.address)
    }

    /// The part after `@`, as written
    pub fn domain(&self) -> &str {
        split_address(&self.address)
            .map(|(_, domain)| domain)
            .unwrap_or_default()
    }

    /// Destination addresses in order
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    /// Comparison key of the local address
    pub fn key(&self) -> String {
        address_key(&self.address)
    }

    /// Render as one forwarder line, without newline
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {}",
            self.address,
            SEPARATOR,
            self.destinations.join(",")
        )
    }
}

impl fmt::Display for ForwarderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
