//! Shared fixtures: one finalized block (number 100) with two transactions,
//! three logs and optional call traces.

use cairn_storage::families::block;
use cairn_storage::{Cell, MemoryStore, Row, RowKey, Table};
use cairn_types::TraceItem;
use serde_json::{json, Value};

pub const H_BLOCK: &str = "0xb10cb10cb10cb10cb10cb10cb10cb10cb10cb10cb10cb10cb10cb10cb10cb10c";
pub const H_OTHER: &str = "0x0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f";
pub const H_PARENT: &str = "0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0";
pub const TX0: &str = "0x0000000000000000000000000000000000000000000000000000000000000a00";
pub const TX1: &str = "0x0000000000000000000000000000000000000000000000000000000000000a01";

const ALICE: &str = "0x1111111111111111111111111111111111111111";
const BOB: &str = "0x2222222222222222222222222222222222222222";
const TOKEN: &str = "0x3333333333333333333333333333333333333333";
const TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

fn warehouse_header() -> Value {
    json!({
        "timestamp": 1_700_000_000u64,
        "number": 100,
        "hash": H_BLOCK,
        "parent_hash": H_PARENT,
        "nonce": "0x0000000000000000",
        "miner": ALICE,
        "gas_limit": "30000000",
        "gas_used": 63_000,
        "size": 1024,
        "transactions": warehouse_transactions(),
    })
}

fn warehouse_transactions() -> Vec<Value> {
    vec![
        json!({
            "block_hash": H_BLOCK,
            "block_number": 100,
            "from_address": ALICE,
            "to_address": TOKEN,
            "gas": 100_000,
            "gas_price": "1000000000",
            "hash": TX0,
            "input": "0xa9059cbb",
            "nonce": 7,
            "transaction_index": 0,
            "value": "0",
            "transaction_type": 0,
            "chain_id": 1,
        }),
        json!({
            "block_hash": H_BLOCK,
            "block_number": 100,
            "from_address": BOB,
            "to_address": ALICE,
            "gas": 21_000,
            "max_fee_per_gas": "2000000000",
            "max_priority_fee_per_gas": "100000000",
            "hash": TX1,
            "input": "0x",
            "nonce": 0,
            "transaction_index": 1,
            "value": "1000000000000000000",
            "transaction_type": 2,
            "chain_id": 1,
        }),
    ]
}

fn warehouse_receipts() -> Vec<Value> {
    vec![
        json!({
            "block_hash": H_BLOCK,
            "block_number": 100,
            "receipt_cumulative_gas_used": 42_000,
            "receipt_effective_gas_price": "1000000000",
            "receipt_gas_used": 42_000,
            "receipt_status": 1,
            "from_address": ALICE,
            "to_address": TOKEN,
            "hash": TX0,
            "transaction_index": 0,
            "transaction_type": 0,
        }),
        json!({
            "block_hash": H_BLOCK,
            "block_number": 100,
            "receipt_cumulative_gas_used": 63_000,
            "receipt_effective_gas_price": "1100000000",
            "receipt_gas_used": 21_000,
            "receipt_status": 1,
            "from_address": BOB,
            "to_address": ALICE,
            "hash": TX1,
            "transaction_index": 1,
            "transaction_type": 2,
        }),
    ]
}

fn warehouse_logs() -> Vec<Value> {
    [(0, TX0, 0), (1, TX0, 0), (2, TX1, 1)]
        .iter()
        .map(|(log_index, tx_hash, tx_index)| {
            json!({
                "address": TOKEN,
                "topics": [TOPIC],
                "data": "0x01",
                "block_number": 100,
                "transaction_hash": tx_hash,
                "transaction_index": tx_index,
                "block_hash": H_BLOCK,
                "log_index": log_index,
            })
        })
        .collect()
}

/// Call traces for the two transactions: three frames, then one
pub fn trace_items_json() -> Value {
    json!([
        {
            "txHash": TX0,
            "result": {
                "type": "CALL",
                "from": ALICE,
                "to": TOKEN,
                "value": "0x0",
                "gas": "0x186a0",
                "gasUsed": "0xa410",
                "input": "0xa9059cbb",
                "output": "0x01",
                "calls": [
                    { "type": "STATICCALL", "from": TOKEN, "to": BOB, "gas": "0x1000", "gasUsed": "0x100" },
                    { "type": "CALL", "from": TOKEN, "to": ALICE, "value": "0x1", "error": "execution reverted" }
                ]
            }
        },
        { "type": "CALL", "from": BOB, "to": ALICE, "value": "0xde0b6b3a7640000", "gas": "0x5208", "gasUsed": "0x5208", "input": "0x" }
    ])
}

pub fn trace_items() -> Vec<TraceItem> {
    serde_json::from_value(trace_items_json()).unwrap()
}

/// Block row as written by the indexer, finalized under `H_BLOCK`
pub fn scenario_row() -> Row {
    let mut row = Row::new(&RowKey::for_block(100).unwrap());
    for (family, value) in scenario_cells() {
        row.insert(family, H_BLOCK, Cell::new(value, 1));
    }
    row
}

fn scenario_cells() -> Vec<(&'static str, String)> {
    vec![
        (block::FINALIZED, String::new()),
        (block::BLOCK, warehouse_header().to_string()),
        (block::RECEIPTS, Value::from(warehouse_receipts()).to_string()),
        (block::LOGS, Value::from(warehouse_logs()).to_string()),
    ]
}

/// Write the scenario row into `store` at `chain_id`/`block_number`
pub fn populate_scenario(store: &MemoryStore, chain_id: u64, block_number: u64) {
    let key = RowKey::for_block(block_number).unwrap();
    for (family, value) in scenario_cells() {
        store.put_cell(Table::Chain(chain_id), &key, family, H_BLOCK, value, 1);
    }
}

/// The same block as an archived RPC-shaped bundle, with traces
pub fn archive_bundle() -> String {
    let rpc_log = |log_index: u64, tx_hash: &str, tx_index: u64| {
        json!({
            "address": TOKEN,
            "topics": [TOPIC],
            "data": "0x01",
            "blockNumber": "0x64",
            "transactionHash": tx_hash,
            "transactionIndex": format!("0x{:x}", tx_index),
            "blockHash": H_BLOCK,
            "logIndex": format!("0x{:x}", log_index),
            "removed": false,
        })
    };

    json!({
        "block": {
            "number": "0x64",
            "hash": H_BLOCK,
            "parentHash": H_PARENT,
            "timestamp": "0x6553f100",
            "nonce": "0x0000000000000000",
            "miner": ALICE,
            "gasLimit": "0x1c9c380",
            "gasUsed": "0xf618",
            "baseFeePerGas": "0x3b9aca00",
            "transactions": [
                {
                    "blockHash": H_BLOCK,
                    "blockNumber": "0x64",
                    "from": ALICE,
                    "to": TOKEN,
                    "gas": "0x186a0",
                    "gasPrice": "0x3b9aca00",
                    "hash": TX0,
                    "input": "0xa9059cbb",
                    "nonce": "0x7",
                    "transactionIndex": "0x0",
                    "value": "0x0",
                    "type": "0x0",
                    "chainId": "0x1"
                },
                {
                    "blockHash": H_BLOCK,
                    "blockNumber": "0x64",
                    "from": BOB,
                    "to": ALICE,
                    "gas": "0x5208",
                    "maxFeePerGas": "0x77359400",
                    "maxPriorityFeePerGas": "0x5f5e100",
                    "hash": TX1,
                    "input": "0x",
                    "nonce": "0x0",
                    "transactionIndex": "0x1",
                    "value": "0xde0b6b3a7640000",
                    "type": "0x2",
                    "chainId": "0x1"
                }
            ]
        },
        "receipts": [
            {
                "blockHash": H_BLOCK,
                "blockNumber": "0x64",
                "cumulativeGasUsed": "0xa410",
                "effectiveGasPrice": "0x3b9aca00",
                "from": ALICE,
                "gasUsed": "0xa410",
                "logsBloom": format!("0x{}", "00".repeat(256)),
                "status": "0x1",
                "to": TOKEN,
                "transactionHash": TX0,
                "transactionIndex": "0x0",
                "type": "0x0",
                "logs": [rpc_log(0, TX0, 0), rpc_log(1, TX0, 0)]
            },
            {
                "blockHash": H_BLOCK,
                "blockNumber": "0x64",
                "cumulativeGasUsed": "0xf618",
                "effectiveGasPrice": "0x4190ab00",
                "from": BOB,
                "gasUsed": "0x5208",
                "logsBloom": format!("0x{}", "00".repeat(256)),
                "status": "0x1",
                "to": ALICE,
                "transactionHash": TX1,
                "transactionIndex": "0x1",
                "type": "0x2",
                "logs": [rpc_log(2, TX1, 1)]
            }
        ],
        "traces": trace_items_json()
    })
    .to_string()
}
