use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Options {
    /// Logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// MXRoute server, e.g. `maildemo` for maildemo.mxrouting.net
    #[arg(short = 's', long = "host", env = "MXROUTE_HOST")]
    pub host: String,

    /// DirectAdmin username
    #[arg(short = 'u', long = "user", env = "MXROUTE_USER")]
    pub user: String,

    /// Password or login key (prompted for when omitted)
    #[arg(short = 'p', long = "pass", env = "MXROUTE_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Full panel URL, overriding the one derived from --host
    #[arg(long = "url")]
    pub url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", default_value_t = 10)]
    pub timeout: u64,

    // `list` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List domains, email accounts and forwarders
    List,
    /// List hosted domains
    Domains,
    /// List email accounts of every domain
    Mailboxes,
    /// List forwarders of every domain in sync format
    Forwarders,
    /// Compare each domain's DKIM key with what DNS serves
    Dkim,
    /// Create or update forwarders from a `user@domain --> dest,dest` list
    Sync {
        /// Forwarder list to read (stdin when omitted)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Show what would change without writing
        #[arg(short = 'n', long = "dry-run")]
        dry_run: bool,
    },
}
