// # TXT Resolver Trait
//
// Live DNS TXT lookups, used to check that the DKIM key the panel expects
// is actually published.
//
// ## Implementations
//
// - hickory-resolver: `mxroute-dns` crate

use async_trait::async_trait;

/// Trait for DNS TXT lookups
#[async_trait]
pub trait TxtResolver: Send + Sync {
    /// Look up the TXT records at `name`
    ///
    /// Each element is one TXT record with its character strings
    /// concatenated. A name without TXT records yields `Ok(vec![])`; only
    /// resolver failures are errors.
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, crate::Error>;
}
