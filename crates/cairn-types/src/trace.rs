//! Call traces: nested frames as stored, flat entries as served

use cairn_primitives::{Address, HexBytes, Quantity, H256};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One nested call frame as produced by a call tracer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// Call kind (`CALL`, `DELEGATECALL`, `CREATE`, ...)
    #[serde(rename = "type", default)]
    pub call_type: Option<String>,
    /// Caller
    #[serde(default)]
    pub from: Option<Address>,
    /// Callee
    #[serde(default)]
    pub to: Option<Address>,
    /// Transferred value
    #[serde(default)]
    pub value: Option<Quantity>,
    /// Gas provided
    #[serde(default)]
    pub gas: Option<Quantity>,
    /// Gas consumed
    #[serde(default)]
    pub gas_used: Option<Quantity>,
    /// Call input
    #[serde(default)]
    pub input: Option<HexBytes>,
    /// Return data
    #[serde(default)]
    pub output: Option<HexBytes>,
    /// Failure reason
    #[serde(default)]
    pub error: Option<String>,
    /// Child calls in execution order
    #[serde(default)]
    pub calls: Option<Vec<CallFrame>>,
}

impl CallFrame {
    /// Child calls, empty when the frame made none
    pub fn children(&self) -> &[CallFrame] {
        self.calls.as_deref().unwrap_or(&[])
    }
}

/// One per-transaction item of a stored trace list.
///
/// An object carrying `txHash` or `result` is always read as the wrapper, so
/// a malformed `result` fails instead of degrading to an empty bare frame. A
/// bare frame must name its call `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TraceItem {
    /// `{txHash, result}` wrapper
    Wrapped {
        /// Transaction the trace belongs to
        #[serde(rename = "txHash", default)]
        tx_hash: Option<H256>,
        /// Root frame
        result: CallFrame,
    },
    /// Bare root frame
    Bare(CallFrame),
}

impl TraceItem {
    /// Transaction hash carried by the item, if any
    pub fn tx_hash(&self) -> Option<&H256> {
        match self {
            TraceItem::Wrapped { tx_hash, .. } => tx_hash.as_ref(),
            TraceItem::Bare(_) => None,
        }
    }

    /// Root frame
    pub fn root(&self) -> &CallFrame {
        match self {
            TraceItem::Wrapped { result, .. } => result,
            TraceItem::Bare(frame) => frame,
        }
    }
}

impl<'de> Deserialize<'de> for TraceItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut obj = match Value::deserialize(deserializer)? {
            Value::Object(obj) => obj,
            other => {
                return Err(de::Error::custom(format!(
                    "trace item is not an object: {}",
                    other
                )))
            }
        };

        if obj.contains_key("txHash") || obj.contains_key("result") {
            let tx_hash = match obj.remove("txHash") {
                None | Some(Value::Null) => None,
                Some(v) => Some(H256::deserialize(v).map_err(de::Error::custom)?),
            };
            let result = match obj.remove("result") {
                Some(Value::Object(frame)) => root_frame(frame).map_err(de::Error::custom)?,
                Some(other) => {
                    return Err(de::Error::custom(format!(
                        "trace result is not an object: {}",
                        other
                    )))
                }
                None => return Err(de::Error::missing_field("result")),
            };
            return Ok(TraceItem::Wrapped { tx_hash, result });
        }

        root_frame(obj).map(TraceItem::Bare).map_err(de::Error::custom)
    }
}

fn root_frame(obj: Map<String, Value>) -> Result<CallFrame, String> {
    if !obj.contains_key("type") {
        return Err("call frame has no type".to_string());
    }
    CallFrame::deserialize(Value::Object(obj)).map_err(|e| e.to_string())
}

/// One call frame of a flattened trace
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    /// Position of the owning transaction
    pub transaction_index: u64,
    /// Hash of the owning transaction
    pub transaction_hash: Option<H256>,
    /// Child positions leading from the root frame to this one
    pub trace_address: Vec<usize>,
    /// Nesting depth; the root frame is 0
    pub depth: usize,
    /// Number of direct child calls
    pub subtraces: usize,
    /// Call kind
    #[serde(rename = "type")]
    pub call_type: Option<String>,
    /// Caller
    pub from: Option<Address>,
    /// Callee
    pub to: Option<Address>,
    /// Transferred value
    pub value: Option<Quantity>,
    /// Gas provided
    pub gas: Option<Quantity>,
    /// Gas consumed
    pub gas_used: Option<Quantity>,
    /// Call input
    pub input: Option<HexBytes>,
    /// Return data
    pub output: Option<HexBytes>,
    /// Failure reason
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_shapes() {
        let bare: TraceItem =
            serde_json::from_str(r#"{"type":"CALL","gas":"0x10","calls":[{"type":"STATICCALL"}]}"#)
                .unwrap();
        assert!(bare.tx_hash().is_none());
        assert_eq!(bare.root().children().len(), 1);

        let hash = format!("0x{}", "11".repeat(32));
        let wrapped: TraceItem = serde_json::from_str(&format!(
            r#"{{"txHash":"{}","result":{{"type":"CREATE"}}}}"#,
            hash
        ))
        .unwrap();
        assert_eq!(wrapped.tx_hash().unwrap().to_hex(), hash);
        assert_eq!(wrapped.root().call_type.as_deref(), Some("CREATE"));
        assert!(wrapped.root().children().is_empty());
    }

    #[test]
    fn test_null_calls() {
        let frame: CallFrame = serde_json::from_str(r#"{"type":"CALL","calls":null}"#).unwrap();
        assert!(frame.children().is_empty());
    }

    #[test]
    fn test_wrapped_with_bad_result_rejected() {
        let hash = format!("0x{}", "11".repeat(32));
        let result = serde_json::from_str::<TraceItem>(&format!(
            r#"{{"txHash":"{}","result":{{"type":"CALL","from":"0x12"}}}}"#,
            hash
        ));
        assert!(result.is_err());

        let result = serde_json::from_str::<TraceItem>(&format!(r#"{{"txHash":"{}"}}"#, hash));
        assert!(result.is_err());

        let result = serde_json::from_str::<TraceItem>(r#"{"txHash":"0x12","result":{"type":"CALL"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unrelated_object_rejected() {
        assert!(serde_json::from_str::<TraceItem>(r#"{"unrelated":42}"#).is_err());
        assert!(serde_json::from_str::<TraceItem>(r#"[1, 2]"#).is_err());
        assert!(serde_json::from_str::<Vec<TraceItem>>(r#"[{"type":"CALL"}, {}]"#).is_err());
    }

    #[test]
    fn test_wrapped_without_hash() {
        let item: TraceItem = serde_json::from_str(r#"{"result":{"type":"CALL"}}"#).unwrap();
        assert!(item.tx_hash().is_none());
        assert_eq!(item.root().call_type.as_deref(), Some("CALL"));
    }

    #[test]
    fn test_malformed_frame_rejected() {
        let result = serde_json::from_str::<TraceItem>(r#"{"type":"CALL","from":"0x12"}"#);
        assert!(result.is_err());
    }
}
