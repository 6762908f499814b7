//! The incremental conversion cache (spec §4.F): per-paragraph,
//! content-addressed reuse of previously converted [`FlowBlock`]s across
//! renders.
//!
//! [`FlowBlockCache`] is the only component in the pipeline that survives
//! across renders (spec §5 "Shared resources"): it is owned by the host
//! (the editor), gated by a two-generation `begin`/`commit` protocol so a
//! cancelled render never corrupts state a committed one depends on (spec
//! §5 "Cancellation").

use std::collections::HashMap;

use crate::flow::blocks::{min_pm_start, FlowBlock};
use crate::warnings::{LayoutError, Warning, WarningKind, WarningSite, WarningSink};

/// A cached conversion result for one paragraph (spec §4.F "Value").
#[derive(Debug, Clone)]
struct CacheEntry {
    node_rev: Option<u64>,
    node_json: String,
    blocks: Vec<FlowBlock>,
    pm_start: usize,
}

/// Per-paragraph memoization keyed by stable paragraph id (spec §4.F "Key").
///
/// Usage: call [`FlowBlockCache::begin`] once per render, then
/// [`FlowBlockCache::lookup`] or [`FlowBlockCache::insert`] for every
/// paragraph the converter visits, then [`FlowBlockCache::commit`] once the
/// render completes successfully. A render that is cancelled must simply
/// never call `commit` (spec §5): `previous` is left untouched and the
/// half-built `next` generation is discarded.
#[derive(Debug, Default)]
pub struct FlowBlockCache {
    previous: HashMap<String, CacheEntry>,
    next: HashMap<String, CacheEntry>,
    begun: bool,
}

/// What a cache lookup produced: either blocks ready to use as-is (the
/// converter does not need to re-run), or a clear instruction to convert
/// from scratch.
pub enum CacheOutcome {
    /// Cache hit: shifted, shallow-copied blocks from a prior render (spec
    /// §4.F: "Always return shallow copies (even with Δ=0)").
    Hit(Vec<FlowBlock>),
    /// Cache miss (no entry, or content differs, or a shift produced a
    /// negative position and the entry was discarded per spec §7 "Cache
    /// inconsistency"): caller must convert this paragraph from scratch.
    Miss,
}

impl FlowBlockCache {
    /// Construct an empty cache with no generation open yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render generation: clears `next` (spec §4.F `begin()`).
    pub fn begin(&mut self) {
        self.next.clear();
        self.begun = true;
    }

    /// Replace `previous` with `next`, ending the render generation (spec
    /// §4.F `commit()`). Paragraphs not re-inserted via [`Self::lookup`] /
    /// [`Self::insert`] during this generation are dropped, matching spec:
    /// "Paragraphs not referenced in the render are dropped."
    pub fn commit(&mut self) -> Result<(), LayoutError> {
        if !self.begun {
            return Err(LayoutError::CacheNotBegun);
        }
        self.previous = std::mem::take(&mut self.next);
        self.begun = false;
        Ok(())
    }

    /// Look up a paragraph by its stable id, comparing the current node's
    /// revision (fast path) or serialized content (slow path) against the
    /// cached entry, and shifting any hit by the paragraph's new PM start
    /// (spec §4.F lookup steps 1-3).
    ///
    /// `node_json` must be a deterministic serialization of the paragraph
    /// node's content (the cache does not serialize nodes itself — that
    /// belongs to whatever editor-tree representation the host uses).
    pub fn lookup(
        &mut self,
        block_id: &str,
        node_rev: Option<u64>,
        node_json: &str,
        new_pm_start: usize,
        warnings: &mut WarningSink,
    ) -> CacheOutcome {
        let Some(entry) = self.previous.get(block_id) else {
            return CacheOutcome::Miss;
        };

        let hit = match (entry.node_rev, node_rev) {
            (Some(cached), Some(current)) => cached == current,
            _ => entry.node_json == node_json,
        };
        if !hit {
            return CacheOutcome::Miss;
        }

        let delta = new_pm_start as i64 - entry.pm_start as i64;
        // `new_pm_start` is itself a `usize` (never negative), so comparing
        // `entry.pm_start + delta` against zero is tautological — it always
        // equals `new_pm_start`. The actual §4.F/§7 "negative position"
        // hazard lives in the blocks' own internal positions, which can sit
        // below `entry.pm_start` if the cache entry's bookkeeping position
        // ever disagrees with what was actually recorded on its blocks.
        if let Some(min_pos) = min_pm_start(&entry.blocks) {
            if min_pos as i64 + delta < 0 {
                warnings.push(Warning::new(
                    WarningKind::CacheInconsistent {
                        reason: format!("shift by {delta} would move position {min_pos} negative"),
                    },
                    WarningSite::Block(block_id.to_string()),
                ));
                return CacheOutcome::Miss;
            }
        }

        let mut blocks = entry.blocks.clone();
        for block in &mut blocks {
            block.shift_positions(delta);
        }
        CacheOutcome::Hit(blocks)
    }

    /// Record a freshly converted (or cache-hit, re-shifted) result for this
    /// generation (spec §4.F: "each paragraph encountered during the render
    /// is inserted into `next`").
    pub fn insert(
        &mut self,
        block_id: String,
        node_rev: Option<u64>,
        node_json: String,
        blocks: Vec<FlowBlock>,
        pm_start: usize,
    ) {
        self.next.insert(
            block_id,
            CacheEntry {
                node_rev,
                node_json,
                blocks,
                pm_start,
            },
        );
    }

    /// Number of paragraphs retained from the last committed generation.
    pub fn retained_len(&self) -> usize {
        self.previous.len()
    }
}
