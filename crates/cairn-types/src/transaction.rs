//! Canonical transaction record

use cairn_primitives::{Address, HexBytes, Quantity, H256};
use serde::{Deserialize, Serialize};

/// Transaction envelope types the reader accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxType {
    /// Legacy transaction (type 0)
    Legacy = 0,
    /// EIP-2930 access list transaction (type 1)
    AccessList = 1,
    /// EIP-1559 dynamic fee transaction (type 2)
    DynamicFee = 2,
}

impl TxType {
    /// Map a raw type quantity to a known type
    pub fn from_quantity(value: &Quantity) -> Option<Self> {
        match value.as_u64()? {
            0 => Some(TxType::Legacy),
            1 => Some(TxType::AccessList),
            2 => Some(TxType::DynamicFee),
            _ => None,
        }
    }
}

/// Store-independent transaction.
///
/// Every field is nullable; a field the source did not carry serializes as `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    /// Hash of the containing block
    pub block_hash: Option<H256>,
    /// Number of the containing block
    pub block_number: Option<Quantity>,
    /// Sender
    pub from: Option<Address>,
    /// Gas limit
    pub gas: Option<Quantity>,
    /// Gas price
    pub gas_price: Option<Quantity>,
    /// Fee cap (type 2)
    pub max_fee_per_gas: Option<Quantity>,
    /// Priority fee cap (type 2)
    pub max_priority_fee_per_gas: Option<Quantity>,
    /// Transaction hash
    pub hash: Option<H256>,
    /// Call data
    pub input: Option<HexBytes>,
    /// Sender nonce
    pub nonce: Option<Quantity>,
    /// Recipient; null for contract creation
    pub to: Option<Address>,
    /// Position in the block
    pub transaction_index: Option<Quantity>,
    /// Transferred value
    pub value: Option<Quantity>,
    /// Envelope type
    #[serde(rename = "type")]
    pub tx_type: Option<Quantity>,
    /// Chain id from the signature
    pub chain_id: Option<Quantity>,
}

impl CanonicalTransaction {
    /// Position in the block as an integer
    pub fn index(&self) -> Option<u64> {
        self.transaction_index.as_ref()?.as_u64()
    }

    /// Known envelope type, if any
    pub fn known_type(&self) -> Option<TxType> {
        TxType::from_quantity(self.tx_type.as_ref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(TxType::from_quantity(&Quantity::from(0)), Some(TxType::Legacy));
        assert_eq!(TxType::from_quantity(&Quantity::from(1)), Some(TxType::AccessList));
        assert_eq!(TxType::from_quantity(&Quantity::from(2)), Some(TxType::DynamicFee));
        assert_eq!(TxType::from_quantity(&Quantity::from(3)), None);
        assert_eq!(TxType::from_quantity(&Quantity::from(126)), None);
    }

    #[test]
    fn test_missing_fields_serialize_as_null() {
        let tx = CanonicalTransaction {
            transaction_index: Some(Quantity::from(4)),
            ..Default::default()
        };
        let json = serde_json::to_value(&tx).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 15);
        assert!(obj["to"].is_null());
        assert!(obj["type"].is_null());
        assert_eq!(obj["transactionIndex"], "0x4");
        assert_eq!(tx.index(), Some(4));
        assert_eq!(tx.known_type(), None);
    }
}
