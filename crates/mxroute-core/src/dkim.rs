//! DKIM configuration check
//!
//! Compares the DKIM key the control panel expects for a domain (its
//! `x._domainkey` TXT record) with what live DNS actually serves, and
//! renders the record to publish when they differ.

use crate::error::Result;
use crate::traits::{ControlPanel, DnsRecord, TxtResolver};
use tracing::{debug, warn};

/// DKIM selector record name used by the panel
pub const DKIM_SELECTOR: &str = "x._domainkey";

/// TTL printed in the suggested zone file line
pub const SUGGESTED_TTL: u32 = 3000;

/// Longest character string in a suggested TXT record
///
/// DNS limits a single TXT character string to 255 bytes.
pub const TXT_CHUNK_LEN: usize = 250;

/// Outcome of a DKIM check for one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DkimStatus {
    /// DNS serves the key the panel expects
    Correct,
    /// DNS serves a DKIM record, but not the expected one
    Mismatch,
    /// DNS serves no record at the selector
    Missing,
    /// The panel holds no DKIM record for the domain
    NotConfigured,
}

/// DKIM check result for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DkimReport {
    /// Domain checked
    pub domain: String,
    /// Unquoted value from the panel's zone
    pub expected: Option<String>,
    /// Value found in live DNS
    pub published: Option<String>,
    /// Verdict
    pub status: DkimStatus,
}

impl DkimReport {
    /// Decide the status from the expected value and the live TXT records
    pub fn evaluate(
        domain: impl Into<String>,
        expected: Option<String>,
        published: &[String],
    ) -> Self {
        let domain = domain.into();

        // An empty panel value holds no key to publish
        let Some(expected) = expected.filter(|e| !e.is_empty()) else {
            return Self {
                domain,
                expected: None,
                published: published.first().cloned(),
                status: DkimStatus::NotConfigured,
            };
        };

        let (published, status) = match published.iter().find(|p| **p == expected) {
            Some(matching) => (Some(matching.clone()), DkimStatus::Correct),
            None => match published.first() {
                Some(other) => (Some(other.clone()), DkimStatus::Mismatch),
                None => (None, DkimStatus::Missing),
            },
        };

        Self {
            domain,
            expected: Some(expected),
            published,
            status,
        }
    }

    /// Zone file line to publish, when DNS does not match the panel
    pub fn suggested_record(&self) -> Option<String> {
        match (self.status, &self.expected) {
            (DkimStatus::Mismatch | DkimStatus::Missing, Some(expected)) => {
                Some(txt_record_line(expected))
            }
            _ => None,
        }
    }
}

/// Find the panel's DKIM value among a domain's DNS records
///
/// Matches the relative name `x._domainkey` as well as the fully qualified
/// `x._domainkey.<domain>` (with or without trailing dot).
pub fn find_dkim_value(domain: &str, records: &[DnsRecord]) -> Option<String> {
    let fqdn = format!("{}.{}", DKIM_SELECTOR, domain);
    records
        .iter()
        .find(|record| {
            let name = record.name.trim_end_matches('.');
            name.eq_ignore_ascii_case(DKIM_SELECTOR) || name.eq_ignore_ascii_case(&fqdn)
        })
        .map(|record| unquote_txt(&record.value))
        .filter(|value| !value.is_empty())
}

/// Strip zone-file quoting from a TXT value
///
/// All quoted character strings are concatenated, so `"ab" "cd"` becomes
/// `abcd`. A value without quotes is returned trimmed.
pub fn unquote_txt(value: &str) -> String {
    let value = value.trim();
    if !value.contains('"') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut in_quotes = false;
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            c if in_quotes => out.push(c),
            _ => {}
        }
    }
    out
}

/// Render `value` as a zone file TXT line split into quoted chunks
pub fn txt_record_line(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let chunks: Vec<String> = chars
        .chunks(TXT_CHUNK_LEN)
        .map(|chunk| format!("\"{}\"", chunk.iter().collect::<String>()))
        .collect();

    format!(
        "{} {} IN TXT {}",
        DKIM_SELECTOR,
        SUGGESTED_TTL,
        chunks.join(" ")
    )
}

/// Runs DKIM checks against a panel and a resolver
pub struct DkimChecker<'a> {
    panel: &'a dyn ControlPanel,
    resolver: &'a dyn TxtResolver,
}

impl<'a> DkimChecker<'a> {
    /// Create a checker
    pub fn new(panel: &'a dyn ControlPanel, resolver: &'a dyn TxtResolver) -> Self {
        Self { panel, resolver }
    }

    /// Check one domain
    ///
    /// Panel errors propagate. A failed DNS lookup is logged and treated as
    /// no published record.
    pub async fn check_domain(&self, domain: &str) -> Result<DkimReport> {
        let records = self.panel.list_dns_records(domain).await?;
        let expected = find_dkim_value(domain, &records);
        if expected.is_none() {
            debug!("{} has no {} record on the panel", domain, DKIM_SELECTOR);
            return Ok(DkimReport::evaluate(domain, None, &[]));
        }

        let name = format!("{}.{}", DKIM_SELECTOR, domain);
        let published = match self.resolver.lookup_txt(&name).await {
            Ok(values) => values,
            Err(e) => {
                warn!("TXT lookup for {} failed: {}", name, e);
                Vec::new()
            }
        };

        Ok(DkimReport::evaluate(domain, expected, &published))
    }

    /// Check each domain in order
    pub async fn check_all(&self, domains: &[String]) -> Result<Vec<DkimReport>> {
        let mut reports = Vec::with_capacity(domains.len());
        for domain in domains {
            reports.push(self.check_domain(domain).await?);
        }
        Ok(reports)
    }
}
