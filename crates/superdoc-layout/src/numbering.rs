//! List numbering (spec §4.C): stateful counter management over numbered
//! paragraphs for a single document traversal.
//!
//! [`NumberingManager`] is constructed per render (spec §3 "NumberingState
//! ... scoped to a single document traversal") and is not shared across
//! renders, mirroring how `crate::cache::FlowBlockCache` is the only
//! component that *does* survive across renders.

use std::collections::{BTreeMap, HashMap};

use crate::style::context::{LevelDef, NumFormat, NumberingTables};
use crate::warnings::{Warning, WarningKind, WarningSite, WarningSink};

/// The result of encountering a numbered paragraph: its ancestor path and
/// the rendered marker.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingResult {
    /// `[c_0, c_1, ..., c_ilvl]` — the ancestors' counters plus this level's
    /// (spec §4.C `path`, invariant 5).
    pub path: Vec<i32>,
    /// The expanded marker text (spec §4.C "Marker text").
    pub marker_text: String,
}

/// Legacy Symbol-font bullet code points mapped to common Unicode bullets
/// (spec §9 open question: "the full mapping table is data, not a spec
/// decision" — this covers the handful of code points that show up in
/// practice).
fn normalize_legacy_bullet(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let mapped = match ch {
            '\u{F0B7}' => '\u{2022}', // Symbol bullet -> BULLET
            '\u{F0A7}' => '\u{25AA}', // Symbol square -> BLACK SMALL SQUARE
            '\u{F0D8}' => '\u{27A4}', // Wingdings arrow -> BLACK RIGHTWARDS ARROWHEAD
            '\u{F06F}' => '\u{25CB}', // Symbol open circle -> WHITE CIRCLE
            other => other,
        };
        out.push(mapped);
    }
    out
}

/// Format a single counter value per a numbering format.
fn format_counter(value: i32, fmt: &NumFormat) -> String {
    let value = value.max(1);
    match fmt {
        NumFormat::Decimal => value.to_string(),
        NumFormat::LowerLetter => letter(value, false),
        NumFormat::UpperLetter => letter(value, true),
        NumFormat::LowerRoman => roman(value).to_lowercase(),
        NumFormat::UpperRoman => roman(value),
        NumFormat::Bullet => value.to_string(), // unreachable in practice; callers special-case Bullet before formatting.
    }
}

/// Bijective base-26 lettering: 1 -> a, 26 -> z, 27 -> aa, …
fn letter(mut value: i32, upper: bool) -> String {
    let mut letters = Vec::new();
    while value > 0 {
        let rem = ((value - 1) % 26) as u8;
        letters.push(if upper { b'A' + rem } else { b'a' + rem });
        value = (value - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Roman numeral rendering for 1..=3999; values outside that range fall
/// back to plain decimal rather than producing nonsense.
fn roman(value: i32) -> String {
    const NUMERALS: &[(i32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if !(1..=3999).contains(&value) {
        return value.to_string();
    }
    let mut remaining = value;
    let mut out = String::new();
    for (n, sym) in NUMERALS {
        while remaining >= *n {
            out.push_str(sym);
            remaining -= n;
        }
    }
    out
}

/// Expand a `lvlText` template (e.g. `"%1.%2)"`) against a resolved path and
/// the per-level definitions needed to format each referenced ancestor
/// counter in *its own* numbering format (spec §4.C).
///
/// `levels` must contain the level definitions for every index the template
/// could plausibly reference; indices beyond `path.len() - 1` are resolved
/// via that level's `start` value instead of a live counter (spec: "`lvlText`
/// referencing a level not yet seen uses that level's start").
fn expand_lvl_text(current: &LevelDef, path: &[i32], levels: &BTreeMap<u8, LevelDef>) -> String {
    if current.num_fmt == NumFormat::Bullet {
        return normalize_legacy_bullet(&current.lvl_text);
    }
    let mut out = String::new();
    let mut chars = current.lvl_text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(d) = chars.peek().copied().filter(|d| d.is_ascii_digit()) {
                chars.next();
                let n = d.to_digit(10).unwrap() as usize;
                let idx = n.saturating_sub(1) as u8;
                let (value, fmt) = if (idx as usize) < path.len() {
                    let fmt = levels
                        .get(&idx)
                        .map(|l| l.num_fmt.clone())
                        .unwrap_or(NumFormat::Decimal);
                    (path[idx as usize], fmt)
                } else if let Some(level) = levels.get(&idx) {
                    (level.start, level.num_fmt.clone())
                } else {
                    (1, NumFormat::Decimal)
                };
                out.push_str(&format_counter(value, &fmt));
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Stateful counter manager for a single document traversal (spec §4.C).
pub struct NumberingManager<'a> {
    tables: &'a NumberingTables,
    /// Last emitted ilvl per numId, used to detect ascend/descend/same.
    last_ilvl: HashMap<u32, u8>,
    /// Current counter value per (numId, ilvl).
    counters: HashMap<(u32, u8), i32>,
    cache_enabled: bool,
    last_query: Option<((u32, u8), NumberingResult)>,
}

impl<'a> NumberingManager<'a> {
    /// Create a manager bound to a document's numbering tables. Does not
    /// reset state — call [`NumberingManager::begin`] before each traversal.
    pub fn new(tables: &'a NumberingTables) -> Self {
        Self {
            tables,
            last_ilvl: HashMap::new(),
            counters: HashMap::new(),
            cache_enabled: false,
            last_query: None,
        }
    }

    /// Reset all counters to their starts (spec §4.C `begin()`).
    pub fn begin(&mut self) {
        self.last_ilvl.clear();
        self.counters.clear();
        self.last_query = None;
    }

    /// Enable same-position lookup caching (spec §4.C `enableCache`).
    pub fn enable_cache(&mut self) {
        self.cache_enabled = true;
    }

    /// Disable same-position lookup caching (spec §4.C `disableCache`).
    pub fn disable_cache(&mut self) {
        self.cache_enabled = false;
        self.last_query = None;
    }

    /// `path(numId, ilvl)` (spec §4.C): the ancestors' current counters plus
    /// this level's, defaulting any missing entry to 1 (spec: "Missing start
    /// defaults to 1").
    pub fn path(&self, num_id: u32, ilvl: u8) -> Vec<i32> {
        (0..=ilvl)
            .map(|l| self.counters.get(&(num_id, l)).copied().unwrap_or(1))
            .collect()
    }

    /// Encounter a numbered paragraph at `(num_id, ilvl)`, advancing counter
    /// state per spec §4.C and returning its path and rendered marker.
    ///
    /// This always advances state and recomputes — the per-position cache
    /// (spec §4.C `enableCache`) applies to [`NumberingManager::marker_for`],
    /// a read-only re-query of the *current* position, not to this method:
    /// two calls to `encounter` with the same `(num_id, ilvl)` are two
    /// distinct paragraphs (e.g. S1's two list items) and must each advance
    /// the counter, never share a cached result.
    ///
    /// Returns `None` (and records a [`WarningKind::NumberingGap`]) when the
    /// numId/ilvl pair has no definition; callers must then treat the
    /// paragraph as unnumbered (spec §7).
    pub fn encounter(
        &mut self,
        num_id: u32,
        ilvl: u8,
        warnings: &mut WarningSink,
    ) -> Option<NumberingResult> {
        let Some((level, start_override)) = self.tables.effective_level(num_id, ilvl) else {
            warnings.push(Warning::new(
                WarningKind::NumberingGap { num_id, ilvl },
                WarningSite::Numbering { num_id, ilvl },
            ));
            return None;
        };
        let start = start_override.unwrap_or(level.start);

        match self.last_ilvl.get(&num_id).copied() {
            Some(last) if last > ilvl => {
                let counter = self.counters.entry((num_id, ilvl)).or_insert(start);
                *counter += 1;
                let deeper: Vec<u8> = self
                    .counters
                    .keys()
                    .filter(|(n, l)| *n == num_id && *l > ilvl)
                    .map(|(_, l)| *l)
                    .collect();
                for l in deeper {
                    self.counters.remove(&(num_id, l));
                }
            }
            Some(last) if last < ilvl => {
                self.counters.insert((num_id, ilvl), start);
            }
            Some(_) => {
                *self.counters.entry((num_id, ilvl)).or_insert(start) += 1;
            }
            None => {
                self.counters.insert((num_id, ilvl), start);
            }
        }
        self.last_ilvl.insert(num_id, ilvl);

        let path = self.path(num_id, ilvl);
        let levels = &self
            .tables
            .concrete_defs
            .get(&num_id)
            .and_then(|c| self.tables.abstract_defs.get(&c.abstract_num_id))
            .map(|a| a.levels.clone())
            .unwrap_or_default();
        let marker_text = expand_lvl_text(level, &path, levels);

        let result = NumberingResult { path, marker_text };
        self.last_query = None; // state changed; any memoized read is now stale.
        Some(result)
    }

    /// Re-query the marker for the *current* position without advancing any
    /// counter (spec §4.C `enableCache`: "repeated lookups at the same
    /// document position are O(1)"). Safe to call any number of times
    /// between two [`NumberingManager::encounter`] calls; returns `None` if
    /// `(num_id, ilvl)` has no definition.
    pub fn marker_for(&mut self, num_id: u32, ilvl: u8) -> Option<NumberingResult> {
        if self.cache_enabled {
            if let Some((key, result)) = &self.last_query {
                if *key == (num_id, ilvl) {
                    return Some(result.clone());
                }
            }
        }
        let (level, _) = self.tables.effective_level(num_id, ilvl)?;
        let path = self.path(num_id, ilvl);
        let levels = self
            .tables
            .concrete_defs
            .get(&num_id)
            .and_then(|c| self.tables.abstract_defs.get(&c.abstract_num_id))
            .map(|a| a.levels.clone())
            .unwrap_or_default();
        let marker_text = expand_lvl_text(level, &path, &levels);
        let result = NumberingResult { path, marker_text };
        if self.cache_enabled {
            self.last_query = Some(((num_id, ilvl), result.clone()));
        }
        Some(result)
    }
}
