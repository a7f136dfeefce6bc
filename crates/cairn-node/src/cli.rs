//! CLI argument parsing for cairn-node

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cairn block reader
#[derive(Parser, Debug, Clone)]
#[command(name = "cairn")]
#[command(about = "Reconstruct canonical blocks and transactions from the row store")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// RocksDB directory (overrides the config file)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Archive directory (overrides the config file)
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Print the metrics snapshot after the lookup
    #[arg(long)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Lookups
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a block by number
    Block {
        /// Chain ID
        chain_id: u64,
        /// Block number
        number: u64,
        /// Serve this block hash even if it is not canonical
        #[arg(long)]
        hash: Option<String>,
    },
    /// Fetch a transaction from a known block
    Tx {
        /// Chain ID
        chain_id: u64,
        /// Block number
        number: u64,
        /// Transaction hash
        hash: String,
    },
    /// Fetch a block by its hash
    BlockByHash {
        /// Block hash
        hash: String,
    },
    /// Fetch a transaction by its hash
    TxByHash {
        /// Transaction hash
        hash: String,
    },
    /// Look a hash up in the hash index
    Hash {
        /// Block hash, state root or transaction hash
        hash: String,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["cairn", "block", "1", "100"]);
        assert!(cli.config.is_none());
        assert!(cli.db_path.is_none());
        assert!(cli.log_level.is_none());
        assert!(!cli.log_json);
        assert!(!cli.metrics);
        assert_eq!(
            cli.command,
            Command::Block {
                chain_id: 1,
                number: 100,
                hash: None
            }
        );
    }

    #[test]
    fn test_cli_custom_values() {
        let cli = Cli::parse_from([
            "cairn",
            "--config", "/etc/cairn.toml",
            "--db-path", "/var/lib/cairn",
            "--archive-dir", "/var/lib/archive",
            "--log-level", "debug",
            "--log-json",
            "--metrics",
            "tx-by-hash", "0xabc",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/cairn.toml")));
        assert_eq!(cli.db_path, Some(PathBuf::from("/var/lib/cairn")));
        assert_eq!(cli.archive_dir, Some(PathBuf::from("/var/lib/archive")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.log_json);
        assert!(cli.metrics);
        assert_eq!(cli.command, Command::TxByHash { hash: "0xabc".to_string() });
    }

    #[test]
    fn test_block_with_hash() {
        let cli = Cli::parse_from(["cairn", "block", "5", "7", "--hash", "0x01"]);
        assert_eq!(
            cli.command,
            Command::Block {
                chain_id: 5,
                number: 7,
                hash: Some("0x01".to_string())
            }
        );
    }
}
