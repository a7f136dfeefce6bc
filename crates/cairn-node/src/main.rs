//! Cairn block reader binary
//!
//! Opens the row store (and optionally an archive directory), runs one
//! lookup and prints the canonical JSON on stdout. Logs go to stderr.

mod cli;
mod config;

use anyhow::{Context, Result};
use cairn_core::BlockReader;
use cairn_metrics::MetricsSnapshot;
use cairn_primitives::H256;
use cairn_storage::{ArchiveStore, DbConfig, DirArchive, NoArchive, RocksRowStore, RowStore};
use cli::{Cli, Command};
use config::NodeConfig;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = NodeConfig::resolve(&cli)?;
    init_tracing(&config);

    let store = RocksRowStore::open_read_only(&config.db_path, &DbConfig::default())
        .with_context(|| format!("opening row store {}", config.db_path.display()))?;
    let archive: Arc<dyn ArchiveStore> = match &config.archive_dir {
        Some(dir) => {
            tracing::info!("Archive fallback from {:?}", dir);
            Arc::new(DirArchive::new(dir))
        }
        None => Arc::new(NoArchive),
    };
    let reader = BlockReader::new(store, archive, config.reader.clone());

    let result = run(&reader, &cli.command).await;

    if cli.metrics {
        let snapshot = MetricsSnapshot::from_metrics(reader.metrics());
        eprintln!("{}", snapshot.to_json()?);
    }

    println!("{}", result?);
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(config: &NodeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

/// Execute one lookup and render it as pretty JSON
async fn run<S: RowStore, A: ArchiveStore>(
    reader: &BlockReader<S, A>,
    command: &Command,
) -> Result<String> {
    let value = match command {
        Command::Block {
            chain_id,
            number,
            hash,
        } => {
            let hash = hash.as_deref().map(parse_hash).transpose()?;
            let block = reader.fetch_block(*chain_id, *number, hash.as_ref()).await?;
            serde_json::to_value(block)?
        }
        Command::Tx {
            chain_id,
            number,
            hash,
        } => {
            let tx = reader
                .fetch_transaction(*chain_id, *number, &parse_hash(hash)?)
                .await?;
            serde_json::to_value(tx)?
        }
        Command::BlockByHash { hash } => {
            serde_json::to_value(reader.fetch_block_by_hash(&parse_hash(hash)?).await?)?
        }
        Command::TxByHash { hash } => {
            serde_json::to_value(reader.fetch_transaction_by_hash(&parse_hash(hash)?).await?)?
        }
        Command::Hash { hash } => serde_json::to_value(reader.resolve_hash(hash).await?)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn parse_hash(s: &str) -> Result<H256> {
    H256::from_hex(s).with_context(|| format!("invalid hash {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::ReaderConfig;
    use cairn_storage::{RowKey, Table};
    use serde_json::Value;
    use tempfile::TempDir;

    const HASH: &str = "0x7777777777777777777777777777777777777777777777777777777777777777";

    fn seeded_store(dir: &TempDir) -> RocksRowStore {
        let store = RocksRowStore::open(dir.path(), &DbConfig::default()).unwrap();
        let key = RowKey::for_block(7).unwrap();
        let header = format!(r#"{{"number": 7, "hash": "{}", "timestamp": 1700000000}}"#, HASH);
        store.put_cell(Table::Chain(1), &key, "finalized", HASH, b"", 1).unwrap();
        store
            .put_cell(Table::Chain(1), &key, "blockrawevm", HASH, header.as_bytes(), 1)
            .unwrap();
        store
            .put_cell(
                Table::Hashes,
                &RowKey::for_hash(HASH),
                "feed",
                "block",
                br#"{"chainID": 1, "blockNumber": 7}"#,
                1,
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_block_lookup_from_rocksdb() {
        let dir = TempDir::new().unwrap();
        let reader = BlockReader::new(seeded_store(&dir), NoArchive, ReaderConfig::default());

        let out = run(&reader, &Command::Block { chain_id: 1, number: 7, hash: None })
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["number"], "0x7");
        assert_eq!(json["status"], "finalized");
        assert_eq!(json["chainID"], 1);
        assert_eq!(json["transactions"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_hash_lookups() {
        let dir = TempDir::new().unwrap();
        let reader = BlockReader::new(seeded_store(&dir), NoArchive, ReaderConfig::default());

        let out = run(&reader, &Command::Hash { hash: HASH.to_string() }).await.unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["hashType"], "blockHash");
        assert_eq!(json["status"], "finalized");
        assert_eq!(json["blockNumber"], 7);

        let out = run(&reader, &Command::BlockByHash { hash: HASH.to_string() })
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["hash"], HASH);
    }

    #[tokio::test]
    async fn test_missing_block_is_error() {
        let dir = TempDir::new().unwrap();
        let reader = BlockReader::new(seeded_store(&dir), NoArchive, ReaderConfig::default());
        let err = run(&reader, &Command::Block { chain_id: 1, number: 8, hash: None })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_bad_hash_argument() {
        let dir = TempDir::new().unwrap();
        let reader = BlockReader::new(seeded_store(&dir), NoArchive, ReaderConfig::default());
        let command = Command::TxByHash { hash: "0xzz".to_string() };
        assert!(run(&reader, &command).await.is_err());
    }
}
