//! Call trace flattening

use crate::error::FuseError;
use cairn_primitives::H256;
use cairn_types::{CallFrame, CanonicalTransaction, TraceEntry, TraceItem};

/// Flatten one nested call tree into pre-order entries
pub fn flatten(root: &CallFrame, transaction_index: u64, transaction_hash: Option<H256>) -> Vec<TraceEntry> {
    let mut out = Vec::new();
    let mut stack: Vec<(&CallFrame, Vec<usize>)> = vec![(root, Vec::new())];

    while let Some((frame, trace_address)) = stack.pop() {
        let children = frame.children();
        for (i, child) in children.iter().enumerate().rev() {
            let mut address = trace_address.clone();
            address.push(i);
            stack.push((child, address));
        }

        out.push(TraceEntry {
            transaction_index,
            transaction_hash,
            depth: trace_address.len(),
            trace_address,
            subtraces: children.len(),
            call_type: frame.call_type.clone(),
            from: frame.from,
            to: frame.to,
            value: frame.value,
            gas: frame.gas,
            gas_used: frame.gas_used,
            input: frame.input.clone(),
            output: frame.output.clone(),
            error: frame.error.clone(),
        });
    }
    out
}

/// Flatten the per-transaction trace list of a block.
///
/// `transactions` must already be in index order; item `i` belongs to
/// transaction `i`.
pub fn flatten_block(
    items: &[TraceItem],
    transactions: &[CanonicalTransaction],
) -> Result<Vec<TraceEntry>, FuseError> {
    if items.len() != transactions.len() {
        return Err(FuseError::Invalid(format!(
            "{} traces for {} transactions",
            items.len(),
            transactions.len()
        )));
    }

    let mut out = Vec::new();
    for (position, (item, tx)) in items.iter().zip(transactions).enumerate() {
        if let (Some(traced), Some(expected)) = (item.tx_hash(), tx.hash.as_ref()) {
            if traced != expected {
                return Err(FuseError::Invalid(format!(
                    "trace {} belongs to {}, transaction is {}",
                    position, traced, expected
                )));
            }
        }
        out.extend(flatten(item.root(), position as u64, tx.hash));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(name: &str, calls: Vec<CallFrame>) -> CallFrame {
        CallFrame {
            call_type: Some(name.to_string()),
            calls: if calls.is_empty() { None } else { Some(calls) },
            ..Default::default()
        }
    }

    fn names(entries: &[TraceEntry]) -> Vec<String> {
        entries.iter().map(|e| e.call_type.clone().unwrap_or_default()).collect()
    }

    #[test]
    fn test_depth_three_preorder() {
        // a -> [b -> [d, e -> [g]], c -> [f]]
        let root = frame(
            "a",
            vec![
                frame("b", vec![frame("d", vec![]), frame("e", vec![frame("g", vec![])])]),
                frame("c", vec![frame("f", vec![])]),
            ],
        );
        let flat = flatten(&root, 3, None);
        assert_eq!(names(&flat), vec!["a", "b", "d", "e", "g", "c", "f"]);

        let addresses: Vec<Vec<usize>> = flat.iter().map(|e| e.trace_address.clone()).collect();
        assert_eq!(
            addresses,
            vec![vec![], vec![0], vec![0, 0], vec![0, 1], vec![0, 1, 0], vec![1], vec![1, 0]]
        );
        let depths: Vec<usize> = flat.iter().map(|e| e.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 3, 1, 2]);
        let subtraces: Vec<usize> = flat.iter().map(|e| e.subtraces).collect();
        assert_eq!(subtraces, vec![2, 2, 0, 1, 0, 1, 0]);
        assert!(flat.iter().all(|e| e.transaction_index == 3));
    }

    fn tx(hash: u8) -> CanonicalTransaction {
        CanonicalTransaction {
            hash: Some(H256::from_bytes([hash; 32])),
            ..Default::default()
        }
    }

    #[test]
    fn test_flatten_block_tags_owner() {
        let items = vec![
            TraceItem::Bare(frame("a", vec![frame("b", vec![])])),
            TraceItem::Wrapped {
                tx_hash: Some(H256::from_bytes([2; 32])),
                result: frame("c", vec![]),
            },
        ];
        let flat = flatten_block(&items, &[tx(1), tx(2)]).unwrap();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[1].transaction_index, 0);
        assert_eq!(flat[1].transaction_hash, Some(H256::from_bytes([1; 32])));
        assert_eq!(flat[2].transaction_index, 1);
    }

    #[test]
    fn test_flatten_block_length_mismatch() {
        let items = vec![TraceItem::Bare(frame("a", vec![]))];
        let err = flatten_block(&items, &[tx(1), tx(2)]).unwrap_err();
        assert!(matches!(err, FuseError::Invalid(_)));
    }

    #[test]
    fn test_flatten_block_hash_mismatch() {
        let items = vec![TraceItem::Wrapped {
            tx_hash: Some(H256::from_bytes([9; 32])),
            result: frame("a", vec![]),
        }];
        let err = flatten_block(&items, &[tx(1)]).unwrap_err();
        assert!(matches!(err, FuseError::Invalid(_)));
    }

    fn arb_frame() -> impl Strategy<Value = CallFrame> {
        let leaf = Just(CallFrame::default());
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(|calls| CallFrame {
                calls: Some(calls),
                ..Default::default()
            })
        })
    }

    fn count(frame: &CallFrame) -> usize {
        1 + frame.children().iter().map(count).sum::<usize>()
    }

    proptest! {
        #[test]
        fn prop_preorder_addresses(root in arb_frame()) {
            let flat = flatten(&root, 0, None);
            prop_assert_eq!(flat.len(), count(&root));
            prop_assert!(flat[0].trace_address.is_empty());
            // pre-order over trace addresses is lexicographic order
            for pair in flat.windows(2) {
                prop_assert!(pair[0].trace_address < pair[1].trace_address);
            }
            for entry in &flat {
                prop_assert_eq!(entry.depth, entry.trace_address.len());
            }
        }
    }
}
