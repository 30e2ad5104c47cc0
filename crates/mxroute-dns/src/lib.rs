// # Live DNS TXT Resolver
//
// This crate provides the `TxtResolver` used by the DKIM check to see what
// the world currently resolves for `x._domainkey.<domain>`.
//
// ## Behavior
//
// - Uses the system resolver configuration (`/etc/resolv.conf` on Unix)
// - Names are queried as fully qualified, no search domains
// - Multi-string TXT records are joined into one value
// - NXDOMAIN / no TXT data is an empty answer, not an error

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use mxroute_core::traits::TxtResolver;
use mxroute_core::{Error, Result};

/// TXT lookups through hickory's async resolver
pub struct HickoryTxtResolver {
    resolver: TokioAsyncResolver,
}

impl std::fmt::Debug for HickoryTxtResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryTxtResolver").finish_non_exhaustive()
    }
}

impl HickoryTxtResolver {
    /// Build a resolver from the host's DNS configuration
    pub fn from_system_conf() -> Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| Error::dns(format!("Failed to load system resolver config: {}", e)))?;
        Ok(Self { resolver })
    }
}

#[async_trait]
impl TxtResolver for HickoryTxtResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>> {
        let fqdn = fully_qualified(name);
        tracing::debug!("TXT lookup for {}", fqdn);

        match self.resolver.txt_lookup(fqdn.as_str()).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|txt| join_character_strings(txt.txt_data()))
                .collect()),
            Err(e) if is_no_records(&e) => {
                tracing::debug!("No TXT records for {}", fqdn);
                Ok(Vec::new())
            }
            Err(e) => Err(Error::dns(format!("TXT lookup for {} failed: {}", fqdn, e))),
        }
    }
}

fn is_no_records(e: &ResolveError) -> bool {
    matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

fn fully_qualified(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Concatenate the character-strings of one TXT record
///
/// DKIM keys longer than 255 bytes are split across strings of one record;
/// the value is the concatenation with nothing in between.
fn join_character_strings<P: AsRef<[u8]>>(parts: &[P]) -> String {
    let combined: Vec<u8> = parts
        .iter()
        .flat_map(|part| part.as_ref().iter().copied())
        .collect();
    String::from_utf8_lossy(&combined).into_owned()
}
