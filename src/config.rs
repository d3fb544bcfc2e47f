//! Centralized configuration and CLI surface.
//!
//! Combines environment variables and CLI arguments, CLI taking precedence.

use crate::store::DEFAULT_SCAN_LIMIT;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub scan_limit: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Date-partitioned filesystem content store")]
pub struct Args {
    /// Store root directory (overrides DATEVAULT_ROOT)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Max concurrent directory scans during fan-out (overrides DATEVAULT_SCAN_LIMIT)
    #[arg(long)]
    pub scan_limit: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store an object from a file or stdin
    Put {
        /// Target identifier, date/owner/name
        file_id: String,
        /// Read content from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Make the object publicly visible
        #[arg(long)]
        public: bool,
    },
    /// Stream an object to stdout or a file
    Cat {
        file_id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show size and visibility for one object
    Stat { file_id: String },
    /// Delete objects; already-absent identifiers are ignored
    Rm {
        #[arg(required = true)]
        file_ids: Vec<String>,
    },
    /// Make objects publicly visible
    Publish {
        #[arg(required = true)]
        file_ids: Vec<String>,
    },
    /// Hide objects from public listings
    Unpublish {
        #[arg(required = true)]
        file_ids: Vec<String>,
    },
    /// Print the full year/month/day tree as JSON
    Tree {
        /// Only publicly visible objects (with --owner: visible or owned)
        #[arg(long)]
        public: bool,
        /// Only objects owned by this account
        #[arg(long)]
        owner: Option<String>,
    },
    /// Page through history as JSON, newest first
    List {
        /// Soft cap on the number of objects returned
        #[arg(long, default_value_t = 50)]
        limit: usize,
        /// Exclusive cursor: only partitions strictly older than this date
        #[arg(long)]
        older_than: Option<String>,
        /// Only publicly visible objects (with --owner: visible or owned)
        #[arg(long)]
        public: bool,
        /// Only objects owned by this account
        #[arg(long)]
        owner: Option<String>,
    },
    /// Print all partition dates, oldest first
    Dates,
}

impl StoreConfig {
    /// Parse environment variables + CLI args into config and the command.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        let args = Args::parse();

        let env_root = env::var_os("DATEVAULT_ROOT").map(PathBuf::from);
        let env_scan_limit = match env::var("DATEVAULT_SCAN_LIMIT") {
            Ok(value) => Some(
                value
                    .parse::<usize>()
                    .with_context(|| format!("parsing DATEVAULT_SCAN_LIMIT value `{value}`"))?,
            ),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading DATEVAULT_SCAN_LIMIT"),
        };

        let root = args
            .root
            .or(env_root)
            .context("store root not set: pass --root or set DATEVAULT_ROOT")?;

        let cfg = Self {
            root,
            scan_limit: args
                .scan_limit
                .or(env_scan_limit)
                .unwrap_or(DEFAULT_SCAN_LIMIT),
        };

        Ok((cfg, args.command))
    }
}
