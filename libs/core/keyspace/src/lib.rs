// [libs/core/keyspace/src/lib.rs]
//! Pure keyspace arithmetic for hashcat-equivalent attacks: total keyspace
//! computation per §4.1 and slice (skip/limit) generation for dispatch.
//! Nothing here touches a store or a clock — callers resolve resource line
//! counts and mask content themselves and hand in plain values, which keeps
//! this crate exhaustively unit- and property-testable on its own.

mod mask;

use std::fmt;

pub use mask::{charset_size_at, mask_token_count};

/// Conservative first-slice size when no benchmark exists yet for the
/// target hash type (§4.1). ~100M candidates, a few seconds to a few
/// minutes on most hardware — safe to overshoot downward, never upward.
pub const DEFAULT_PROBE_SLICE: u128 = 100_000_000;

#[derive(Debug, thiserror::Error)]
pub enum KeyspaceError {
    #[error("keyspace arithmetic overflowed u128 computing {0}")]
    Overflow(&'static str),
    #[error("attack is not dispatchable: {0}")]
    NotDispatchable(&'static str),
    #[error("invalid mask {mask:?}: {reason}")]
    InvalidMask { mask: String, reason: String },
    #[error("mask references custom charset {0} but none was supplied")]
    UnknownCustomCharset(u8),
    #[error("slice size must be greater than zero")]
    ZeroSliceSize,
}

fn checked_mul(a: u128, b: u128, ctx: &'static str) -> Result<u128, KeyspaceError> {
    a.checked_mul(b).ok_or(KeyspaceError::Overflow(ctx))
}

fn checked_add(a: u128, b: u128, ctx: &'static str) -> Result<u128, KeyspaceError> {
    a.checked_add(b).ok_or(KeyspaceError::Overflow(ctx))
}

/// The four custom charset slots hashcat exposes as `?1`..`?4` in a mask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomCharsets {
    pub c1: Option<String>,
    pub c2: Option<String>,
    pub c3: Option<String>,
    pub c4: Option<String>,
}

impl CustomCharsets {
    pub fn slot(&self, n: u8) -> Option<&str> {
        match n {
            1 => self.c1.as_deref(),
            2 => self.c2.as_deref(),
            3 => self.c3.as_deref(),
            4 => self.c4.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackMode {
    Dictionary,
    Mask,
    HybridDictionary,
    HybridMask,
}

impl fmt::Display for AttackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttackMode::Dictionary => "dictionary",
            AttackMode::Mask => "mask",
            AttackMode::HybridDictionary => "hybrid_dictionary",
            AttackMode::HybridMask => "hybrid_mask",
        };
        f.write_str(s)
    }
}

/// Increment varies the mask's effective length from `min` to `max`,
/// inclusive, each length treated as an independent phase (§4.1). `max`
/// is clamped to the mask's own token count by the caller of
/// [`mask_keyspace`]; a `max` beyond that is an error, not a silent clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementRange {
    pub min: u32,
    pub max: u32,
}

/// Everything the planner needs to compute one attack's total keyspace.
/// `masks` holds either the single configured mask (len 1) or every line
/// of a `mask_list` resource (already read by the caller).
#[derive(Debug, Clone)]
pub struct AttackInput {
    pub mode: AttackMode,
    pub word_list_line_count: Option<u64>,
    pub rule_list_line_count: Option<u64>,
    pub masks: Vec<String>,
    pub custom_charsets: CustomCharsets,
    pub increment: Option<IncrementRange>,
}

/// One `[skip, skip+limit)` slice of an attack's total keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub skip: u128,
    pub limit: u128,
}

/// Keyspace of a single mask, honoring increment phases when present.
/// Sums `charset_size(pos)` across the mask's positions per §4.1; with
/// increment, sums that product over each candidate length independently.
pub fn mask_keyspace(
    pattern: &str,
    charsets: &CustomCharsets,
    increment: Option<IncrementRange>,
) -> Result<u128, KeyspaceError> {
    let tokens = mask::parse(pattern)?;
    let n = tokens.len() as u32;

    let Some(range) = increment else {
        return tokens
            .iter()
            .try_fold(1u128, |acc, tok| checked_mul(acc, tok.charset_size(charsets)?, "mask keyspace"));
    };

    if range.min == 0 || range.max > n || range.min > range.max {
        return Err(KeyspaceError::InvalidMask {
            mask: pattern.to_string(),
            reason: format!(
                "increment range {}..={} is outside 1..={}",
                range.min, range.max, n
            ),
        });
    }

    let mut total = 0u128;
    for len in range.min..=range.max {
        let phase = tokens[..len as usize]
            .iter()
            .try_fold(1u128, |acc, tok| checked_mul(acc, tok.charset_size(charsets)?, "increment phase"))?;
        total = checked_add(total, phase, "increment phase sum")?;
    }
    Ok(total)
}

/// Total keyspace for an attack, per §4.1's per-mode formulas. Returns
/// `NotDispatchable` when a referenced resource's line count is unknown
/// (still being counted asynchronously) rather than guessing.
pub fn total_keyspace(input: &AttackInput) -> Result<u128, KeyspaceError> {
    match input.mode {
        AttackMode::Dictionary => {
            let words = input
                .word_list_line_count
                .ok_or(KeyspaceError::NotDispatchable("word_list.line_count is unknown"))?;
            let rule_multiplier = input.rule_list_line_count.unwrap_or(1).max(1);
            checked_mul(words as u128, rule_multiplier as u128, "dictionary keyspace")
        }
        AttackMode::Mask => mask_list_keyspace(input),
        AttackMode::HybridDictionary | AttackMode::HybridMask => {
            let words = input
                .word_list_line_count
                .ok_or(KeyspaceError::NotDispatchable("word_list.line_count is unknown"))?;
            let rule_multiplier = input.rule_list_line_count.unwrap_or(1).max(1);
            let masks = mask_list_keyspace(input)?;
            let per_word = checked_mul(rule_multiplier as u128, masks, "hybrid rule x mask")?;
            checked_mul(words as u128, per_word, "hybrid keyspace")
        }
    }
}

fn mask_list_keyspace(input: &AttackInput) -> Result<u128, KeyspaceError> {
    if input.masks.is_empty() {
        return Err(KeyspaceError::NotDispatchable("no mask configured"));
    }
    input.masks.iter().try_fold(0u128, |acc, m| {
        let k = mask_keyspace(m, &input.custom_charsets, input.increment)?;
        checked_add(acc, k, "mask list keyspace sum")
    })
}

/// Splits one contiguous `[0, total)` range into consecutive, non-overlapping
/// slices of `target_size`, with the last slice absorbing `total % target_size`
/// (§4.1 tie-break) instead of spawning a short tail slice.
pub fn slice_range(total: u128, target_size: u128) -> Result<Vec<Slice>, KeyspaceError> {
    if target_size == 0 {
        return Err(KeyspaceError::ZeroSliceSize);
    }
    if total == 0 {
        return Ok(Vec::new());
    }

    let full = total / target_size;
    let remainder = total % target_size;

    if full == 0 {
        return Ok(vec![Slice { skip: 0, limit: total }]);
    }

    let mut slices = Vec::with_capacity(full as usize);
    let mut skip = 0u128;
    for i in 0..full {
        let limit = if i == full - 1 {
            target_size + remainder
        } else {
            target_size
        };
        slices.push(Slice { skip, limit });
        skip += limit;
    }
    Ok(slices)
}

/// One keyspace phase: an increment length (or the whole mask/dictionary
/// keyspace when increment is not in play) paired with its own slices,
/// offset into the attack's absolute keyspace coordinate.
#[derive(Debug, Clone)]
pub struct Phase {
    pub keyspace: u128,
    pub slices: Vec<Slice>,
}

/// Full dispatch plan for an attack: total keyspace plus every slice,
/// already offset to absolute `(skip, limit)` coordinates. When increment
/// phases are present, slicing is done per phase so no slice spans a
/// phase boundary, then phases are concatenated with a running offset.
#[derive(Debug, Clone)]
pub struct KeyspacePlan {
    pub total: u128,
    pub phases: Vec<Phase>,
}

impl KeyspacePlan {
    /// Flattened, absolute-offset view across all phases, in dispatch order.
    pub fn slices(&self) -> Vec<Slice> {
        self.phases.iter().flat_map(|p| p.slices.clone()).collect()
    }
}

pub fn plan(input: &AttackInput, target_slice_size: u128) -> Result<KeyspacePlan, KeyspaceError> {
    let phases = match (&input.mode, input.increment) {
        (AttackMode::Mask, Some(range)) if input.masks.len() == 1 => {
            let tokens = mask::parse(&input.masks[0])?;
            let n = tokens.len() as u32;
            if range.min == 0 || range.max > n || range.min > range.max {
                return Err(KeyspaceError::InvalidMask {
                    mask: input.masks[0].clone(),
                    reason: format!("increment range {}..={} is outside 1..={}", range.min, range.max, n),
                });
            }
            let mut phases = Vec::new();
            let mut offset = 0u128;
            for len in range.min..=range.max {
                let phase_keyspace = tokens[..len as usize]
                    .iter()
                    .try_fold(1u128, |acc, t| checked_mul(acc, t.charset_size(&input.custom_charsets)?, "phase keyspace"))?;
                let local = slice_range(phase_keyspace, target_slice_size)?;
                let absolute = local
                    .into_iter()
                    .map(|s| Slice { skip: s.skip + offset, limit: s.limit })
                    .collect();
                offset = checked_add(offset, phase_keyspace, "phase offset")?;
                phases.push(Phase { keyspace: phase_keyspace, slices: absolute });
            }
            phases
        }
        _ => {
            let total = total_keyspace(input)?;
            vec![Phase { keyspace: total, slices: slice_range(total, target_slice_size)? }]
        }
    };

    let total = phases.iter().try_fold(0u128, |acc, p| checked_add(acc, p.keyspace, "plan total"))?;
    Ok(KeyspacePlan { total, phases })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_custom() -> CustomCharsets {
        CustomCharsets::default()
    }

    #[test]
    fn dictionary_keyspace_multiplies_by_rule_count() {
        let input = AttackInput {
            mode: AttackMode::Dictionary,
            word_list_line_count: Some(1_000),
            rule_list_line_count: Some(4),
            masks: vec![],
            custom_charsets: no_custom(),
            increment: None,
        };
        assert_eq!(total_keyspace(&input).unwrap(), 4_000);
    }

    #[test]
    fn dictionary_without_rules_defaults_multiplier_to_one() {
        let input = AttackInput {
            mode: AttackMode::Dictionary,
            word_list_line_count: Some(1_000),
            rule_list_line_count: None,
            masks: vec![],
            custom_charsets: no_custom(),
            increment: None,
        };
        assert_eq!(total_keyspace(&input).unwrap(), 1_000);
    }

    #[test]
    fn dictionary_unknown_line_count_is_not_dispatchable() {
        let input = AttackInput {
            mode: AttackMode::Dictionary,
            word_list_line_count: None,
            rule_list_line_count: None,
            masks: vec![],
            custom_charsets: no_custom(),
            increment: None,
        };
        assert!(matches!(total_keyspace(&input), Err(KeyspaceError::NotDispatchable(_))));
    }

    #[test]
    fn mask_keyspace_lowercase_digits() {
        // ?l?l?d?d -> 26 * 26 * 10 * 10
        let input = AttackInput {
            mode: AttackMode::Mask,
            word_list_line_count: None,
            rule_list_line_count: None,
            masks: vec!["?l?l?d?d".to_string()],
            custom_charsets: no_custom(),
            increment: None,
        };
        assert_eq!(total_keyspace(&input).unwrap(), 26 * 26 * 10 * 10);
    }

    #[test]
    fn mask_list_sums_each_mask() {
        let input = AttackInput {
            mode: AttackMode::Mask,
            word_list_line_count: None,
            rule_list_line_count: None,
            masks: vec!["?d?d".to_string(), "?l?l".to_string()],
            custom_charsets: no_custom(),
            increment: None,
        };
        assert_eq!(total_keyspace(&input).unwrap(), 100 + 676);
    }

    #[test]
    fn hybrid_dictionary_multiplies_words_by_mask() {
        let input = AttackInput {
            mode: AttackMode::HybridDictionary,
            word_list_line_count: Some(10),
            rule_list_line_count: None,
            masks: vec!["?d?d".to_string()],
            custom_charsets: no_custom(),
            increment: None,
        };
        assert_eq!(total_keyspace(&input).unwrap(), 10 * 100);
    }

    #[test]
    fn custom_charset_resolves_by_slot() {
        let mut charsets = no_custom();
        charsets.c1 = Some("ab".to_string());
        let input = AttackInput {
            mode: AttackMode::Mask,
            word_list_line_count: None,
            rule_list_line_count: None,
            masks: vec!["?1?1".to_string()],
            custom_charsets: charsets,
            increment: None,
        };
        assert_eq!(total_keyspace(&input).unwrap(), 4);
    }

    #[test]
    fn missing_custom_charset_is_an_error() {
        let input = AttackInput {
            mode: AttackMode::Mask,
            word_list_line_count: None,
            rule_list_line_count: None,
            masks: vec!["?1".to_string()],
            custom_charsets: no_custom(),
            increment: None,
        };
        assert!(matches!(total_keyspace(&input), Err(KeyspaceError::UnknownCustomCharset(1))));
    }

    #[test]
    fn slice_range_covers_exactly_with_clean_division() {
        let slices = slice_range(100, 25).unwrap();
        assert_eq!(slices.len(), 4);
        assert_eq!(slices.iter().map(|s| s.limit).sum::<u128>(), 100);
        for (i, s) in slices.iter().enumerate() {
            assert_eq!(s.skip, i as u128 * 25);
            assert_eq!(s.limit, 25);
        }
    }

    #[test]
    fn slice_range_last_slice_absorbs_remainder() {
        let slices = slice_range(107, 25).unwrap();
        assert_eq!(slices.len(), 4);
        assert_eq!(slices.last().unwrap().limit, 25 + 7);
        assert_eq!(slices.iter().map(|s| s.limit).sum::<u128>(), 107);
        // no overlap, contiguous coverage
        let mut expect_skip = 0u128;
        for s in &slices {
            assert_eq!(s.skip, expect_skip);
            expect_skip += s.limit;
        }
    }

    #[test]
    fn slice_range_smaller_than_target_yields_one_slice() {
        let slices = slice_range(10, 1_000).unwrap();
        assert_eq!(slices, vec![Slice { skip: 0, limit: 10 }]);
    }

    #[test]
    fn slice_range_rejects_zero_target() {
        assert!(matches!(slice_range(10, 0), Err(KeyspaceError::ZeroSliceSize)));
    }

    #[test]
    fn increment_phases_never_span_a_boundary() {
        let input = AttackInput {
            mode: AttackMode::Mask,
            word_list_line_count: None,
            rule_list_line_count: None,
            masks: vec!["?d?d?d".to_string()],
            custom_charsets: no_custom(),
            increment: Some(IncrementRange { min: 1, max: 3 }),
        };
        let p = plan(&input, 5).unwrap();
        assert_eq!(p.phases.len(), 3);
        assert_eq!(p.phases[0].keyspace, 10);
        assert_eq!(p.phases[1].keyspace, 100);
        assert_eq!(p.phases[2].keyspace, 1_000);
        assert_eq!(p.total, 1_110);
        for phase in &p.phases {
            for s in &phase.slices {
                assert!(s.limit <= phase.keyspace.max(1));
            }
        }
    }

    #[test]
    fn increment_max_beyond_mask_length_is_an_error() {
        let input = AttackInput {
            mode: AttackMode::Mask,
            word_list_line_count: None,
            rule_list_line_count: None,
            masks: vec!["?d?d".to_string()],
            custom_charsets: no_custom(),
            increment: Some(IncrementRange { min: 1, max: 5 }),
        };
        assert!(matches!(plan(&input, 10), Err(KeyspaceError::InvalidMask { .. })));
    }

    proptest::proptest! {
        #[test]
        fn slices_always_cover_total_exactly(total in 0u64..10_000_000, target in 1u64..100_000) {
            let slices = slice_range(total as u128, target as u128).unwrap();
            let covered: u128 = slices.iter().map(|s| s.limit).sum();
            proptest::prop_assert_eq!(covered, total as u128);
            let mut expect_skip = 0u128;
            for s in &slices {
                proptest::prop_assert_eq!(s.skip, expect_skip);
                expect_skip += s.limit;
            }
        }
    }
}
