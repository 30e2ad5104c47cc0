// # mxroute-core
//
// Core library for mxroute-tools.
//
// ## Architecture Overview
//
// - **ForwarderListTranslator** (`forwarders`): parses and renders the
//   `local@domain --> dest,dest` list format and diffs it against an account
// - **ControlPanel**: trait for the hosting control panel's account API
// - **TxtResolver**: trait for live DNS TXT lookups
// - **AccountSnapshot**: point-in-time view of domains, mailboxes, forwarders
// - **SyncEngine**: plan → apply orchestration with per-entry outcomes
// - **DkimChecker**: compares the panel's DKIM key with live DNS
//
// ## Design Principles
//
// 1. **Explicit configuration**: credentials travel in `PanelConfig`, never globals
// 2. **Sequential**: one remote call at a time, each awaited before the next
// 3. **Never delete**: reconciliation only creates and updates
// 4. **Fail fast on input, continue on writes**: malformed input aborts before
//    any write; one failed write does not stop the others

pub mod config;
pub mod dkim;
pub mod engine;
pub mod error;
pub mod forwarders;
pub mod snapshot;
pub mod traits;

// Re-export core types for convenience
pub use config::{PanelConfig, SyncConfig};
pub use dkim::{DkimChecker, DkimReport, DkimStatus};
pub use engine::{SyncEngine, SyncEvent, SyncPlan, SyncReport};
pub use error::{Error, FormatError, FormatErrorKind, Result};
pub use forwarders::{ChangeAction, ForwarderChange, ForwarderEntry};
pub use snapshot::{AccountSnapshot, FetchScope};
pub use traits::{ControlPanel, DnsRecord, TxtResolver};
