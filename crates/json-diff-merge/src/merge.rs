//! Chain merge: fold an ordered chain of diff records into one.

use thiserror::Error;
use tracing::debug;

use json_tree_diff::{apply_delta, diff, DeltaError, DiffRecord};

use crate::reverse::{reverse_diff, ReverseError};
use crate::shadow::{ShadowError, ShadowTree};

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    /// Forward or reverse delta application failed at the given chain step.
    #[error("delta application failed at step {step}: {source}")]
    Apply {
        step: usize,
        #[source]
        source: DeltaError,
    },
    /// Reversing the record at the given chain step failed.
    #[error("reversal failed at step {step}: {source}")]
    Reverse {
        step: usize,
        #[source]
        source: ReverseError,
    },
    #[error("flatten failed: {source}")]
    Flatten {
        #[from]
        source: ShadowError,
    },
}

/// Fold `records` — each describing one step of a single linear history —
/// into the one record equivalent to the diff from the first state to the
/// last.
///
/// Diffs are not composable as algebraic objects, so the chain is replayed
/// instead: every record is applied forward onto a fresh [`ShadowTree`] to
/// materialize the end state, then every record's reversal is applied in
/// reverse chain order to walk the tree back to the start state, and the two
/// flattened endpoints are re-diffed. Unique placeholder names keep distinct
/// unset leaves from ever comparing equal, so the re-diff preserves every
/// structural distinction the deltas introduced. Any failing step aborts the
/// merge with its chain index; no partial result is returned.
pub fn merge(records: &[DiffRecord]) -> Result<DiffRecord, MergeError> {
    let mut tree = ShadowTree::new();
    for (step, record) in records.iter().enumerate() {
        debug!(step, changes = record.len(), "applying forward delta");
        apply_delta(&mut tree, record).map_err(|source| MergeError::Apply { step, source })?;
    }
    // Snapshot before the reverse walk mutates the tree back to the start.
    let end_state = tree.flatten()?;
    for (step, record) in records.iter().enumerate().rev() {
        debug!(step, "applying reversed delta");
        let reversed =
            reverse_diff(record).map_err(|source| MergeError::Reverse { step, source })?;
        apply_delta(&mut tree, &reversed).map_err(|source| MergeError::Apply { step, source })?;
    }
    let start_state = tree.flatten()?;
    Ok(diff(&start_state, &end_state))
}

// ── Tests ─────────────────────────────────────────────────────────────────
