//! Finality resolution over a block row
//!
//! A block row can carry several competing block hashes at once. Each
//! hash-bearing family is a tier; tiers are consulted strongest first and the
//! first tier holding exactly one hash decides the block. A tier holding more
//! than one hash is logged and skipped, never guessed.

use cairn_storage::families::block;
use cairn_storage::Row;
use cairn_types::BlockStatus;

/// One hash-bearing family and the status it confers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tier {
    /// Family name
    pub family: &'static str,
    /// Status of a hash found in the family
    pub status: BlockStatus,
    /// Whether the tier implies a trace payload was written
    pub trace_augmented: bool,
}

/// Block tiers, strongest first
pub const BLOCK_TIERS: [Tier; 4] = [
    Tier {
        family: block::FINALIZED,
        status: BlockStatus::Finalized,
        trace_augmented: false,
    },
    Tier {
        family: block::BLOCK,
        status: BlockStatus::Unfinalized,
        trace_augmented: false,
    },
    Tier {
        family: block::TRACES,
        status: BlockStatus::Unfinalized,
        trace_augmented: true,
    },
    Tier {
        family: block::PENDING,
        status: BlockStatus::Pending,
        trace_augmented: false,
    },
];

/// Hashes one family holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TierState {
    /// No hash
    Absent,
    /// Exactly one hash
    Single(String),
    /// Competing hashes
    Ambiguous(Vec<String>),
}

impl TierState {
    /// Classify the columns of `family` in `row`
    pub fn of(row: &Row, family: &str) -> Self {
        let mut hashes = row.columns_of(family);
        match hashes.len() {
            0 => TierState::Absent,
            1 => TierState::Single(hashes.remove(0).to_lowercase()),
            _ => TierState::Ambiguous(hashes.into_iter().map(str::to_lowercase).collect()),
        }
    }
}

/// Hash and status chosen for a row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Column key of the chosen block hash
    pub block_hash: String,
    /// Status conferred by the deciding tier
    pub status: BlockStatus,
    /// Family of the deciding tier
    pub tier: &'static str,
    /// Whether the deciding tier implies traces
    pub trace_augmented: bool,
}

impl Resolution {
    fn from_tier(tier: &Tier, block_hash: String) -> Self {
        Self {
            block_hash,
            status: tier.status,
            tier: tier.family,
            trace_augmented: tier.trace_augmented,
        }
    }
}

/// A tier skipped because it held competing hashes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbiguousTier {
    /// Family of the tier
    pub family: &'static str,
    /// Competing hashes
    pub candidates: Vec<String>,
}

/// Outcome of resolving a row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalityReport {
    /// Chosen hash, if any tier decided
    pub resolution: Option<Resolution>,
    /// Tiers skipped as ambiguous
    pub ambiguous: Vec<AmbiguousTier>,
}

/// Pick the authoritative block hash of a row.
///
/// Without `requested`, the first tier holding exactly one hash wins. With a
/// requested hash, the strongest tier containing it wins; competing hashes in
/// a lower tier are then expected, but an ambiguous `finalized` tier still
/// cannot confer finality.
pub fn resolve_block(row: &Row, requested: Option<&str>) -> FinalityReport {
    let requested = requested.map(str::to_lowercase);
    let mut report = FinalityReport::default();

    for tier in BLOCK_TIERS.iter() {
        match TierState::of(row, tier.family) {
            TierState::Absent => continue,
            TierState::Single(hash) => {
                if requested.as_ref().map_or(true, |r| *r == hash) {
                    report.resolution = Some(Resolution::from_tier(tier, hash));
                    break;
                }
            }
            TierState::Ambiguous(candidates) => {
                if let Some(r) = requested.as_ref() {
                    if tier.status != BlockStatus::Finalized && candidates.contains(r) {
                        report.resolution = Some(Resolution::from_tier(tier, r.clone()));
                        break;
                    }
                    if tier.status != BlockStatus::Finalized {
                        continue;
                    }
                }
                tracing::error!(
                    row_key = %row.key(),
                    family = tier.family,
                    candidates = ?candidates,
                    "ambiguous finality tier"
                );
                report.ambiguous.push(AmbiguousTier {
                    family: tier.family,
                    candidates,
                });
            }
        }
    }
    report
}
