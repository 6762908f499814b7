//! The cascade engine (spec §4.A): deep-merge ordered property layers with
//! two escape hatches — whole-object override for atomic composite fields,
//! and pairwise special handlers for fields whose merge needs context (e.g.
//! mutually exclusive `firstLine`/`hanging` indents).
//!
//! There is no single dynamically-typed "property object" here; OOXML
//! property bags are modeled as plain structs (see `crate::style::context`),
//! and each one implements [`Combine`] to describe its own merge rule. This
//! keeps every cascade step statically checked while still giving each
//! property bag full control over full-override vs. deep-merge vs.
//! special-cased fields, matching spec §4.A's three knobs.

/// A property bag that knows how to fold a higher-priority layer onto a
/// lower-priority (already-combined) base.
///
/// Implementations must be pure and must treat `Self::default()` as a
/// no-op contribution, so that `combine_properties` on an all-default chain
/// returns `Self::default()` (spec §4.A: "Null/empty objects are treated as
/// no-op contributions").
pub trait Combine: Sized {
    /// Fold `over` onto `base`, returning a new value. `over` wins ties.
    fn combine_over(base: &Self, over: &Self) -> Self;
}

/// Fold an ordered low-to-high-priority chain of property layers into one
/// combined value (spec §4.A `combineProperties`).
///
/// Order matters: `chain[0]` is lowest priority (e.g. docDefaults) and
/// `chain[chain.len() - 1]` is highest (e.g. direct formatting). Inputs are
/// never mutated; each fold step allocates a new combined value.
pub fn combine_properties<T: Combine + Default>(chain: &[T]) -> T {
    chain
        .iter()
        .fold(T::default(), |base, layer| T::combine_over(&base, layer))
}

/// Generic "override if present" merge for a plain `Option<V>` field: the
/// higher-priority layer's value wins whenever it is `Some`, regardless of
/// what the base held. This is the default rule spec §4.A describes for
/// ordinary scalar fields.
pub fn override_option<V: Clone>(base: &Option<V>, over: &Option<V>) -> Option<V> {
    over.clone().or_else(|| base.clone())
}

/// Whole-object override for a composite field that must never be
/// deep-merged field-by-field (spec §4.A `fullOverrideKeys`): a `Some` in
/// `over` replaces `base` entirely, never blending sub-fields from both.
///
/// This has the same signature as [`override_option`] on purpose — the two
/// exist separately so call sites document *why* a field is handled the way
/// it is, even though the semantics for a leaf `Option<V>` happen to
/// coincide. Sites where this matters are fields whose `V` is itself a
/// multi-field struct that would otherwise recurse via [`Combine`].
pub fn full_override<V: Clone>(base: &Option<V>, over: &Option<V>) -> Option<V> {
    over.clone().or_else(|| base.clone())
}

/// Replace-wholesale merge for array fields (spec §4.A: "Arrays are
/// replaced wholesale (never element-merged)").
pub fn replace_array<V: Clone>(base: &[V], over: &[V]) -> Vec<V> {
    if over.is_empty() {
        base.to_vec()
    } else {
        over.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Scalar {
        a: Option<i32>,
        b: Option<i32>,
    }

    impl Combine for Scalar {
        fn combine_over(base: &Self, over: &Self) -> Self {
            Scalar {
                a: override_option(&base.a, &over.a),
                b: override_option(&base.b, &over.b),
            }
        }
    }

    #[test]
    fn empty_layers_are_no_op() {
        let chain = vec![Scalar::default(), Scalar::default()];
        assert_eq!(combine_properties(&chain), Scalar::default());
    }

    #[test]
    fn later_layer_overrides_earlier_per_key() {
        let chain = vec![
            Scalar { a: Some(1), b: Some(2) },
            Scalar { a: Some(9), b: None },
        ];
        let combined = combine_properties(&chain);
        assert_eq!(combined, Scalar { a: Some(9), b: Some(2) });
    }

    #[test]
    fn order_matters_reversed_chain_differs() {
        let forward = vec![Scalar { a: Some(1), b: None }, Scalar { a: Some(2), b: None }];
        let backward = vec![Scalar { a: Some(2), b: None }, Scalar { a: Some(1), b: None }];
        assert_ne!(combine_properties(&forward), combine_properties(&backward));
    }

    #[test]
    fn combine_properties_is_deterministic() {
        let chain = vec![Scalar { a: Some(1), b: Some(2) }, Scalar { a: None, b: Some(3) }];
        assert_eq!(combine_properties(&chain), combine_properties(&chain));
    }
}
