// verity-core/src/comparator.rs
// ============================================================================
// Module: Comparator & Entity-Name Matcher (C)
// Description: Numeric/string relational operators, field extraction, and
//              the heuristic linking a human-facing entity name to a change.
// Purpose: Shared primitives used by every evaluator in (D)-(H).
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`matches_entity`] is the load-bearing heuristic of the whole crate: the
//! manifest only ever carries numeric `EntityId`s, but intents are authored
//! against human names (`"ball"`, `"paddle"`). Its four branches are pinned
//! by tests and must not be reordered or merged — each exists to resolve a
//! specific ambiguity the simulator's free-form `reason_detail` text leaves.

use serde_json::Value;

use crate::model::identifiers::EntityId;

// ============================================================================
// SECTION: Operator
// ============================================================================

/// A relational operator parsed from the intent DSL or the invariant
/// condition grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Operator {
    /// Parses the canonical two-or-less-character operator token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    /// Returns the canonical token for this operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Evaluates a numeric relation. `NaN` on either side yields `false` for
/// every operator, including `!=`.
#[must_use]
pub fn compare_numeric(op: Operator, lhs: f64, rhs: f64) -> bool {
    if lhs.is_nan() || rhs.is_nan() {
        return false;
    }
    match op {
        Operator::Eq => (lhs - rhs).abs() == 0.0,
        Operator::Ne => lhs != rhs,
        Operator::Lt => lhs < rhs,
        Operator::Le => lhs <= rhs,
        Operator::Gt => lhs > rhs,
        Operator::Ge => lhs >= rhs,
    }
}

/// Evaluates a string relation. Only `Eq`/`Ne` are meaningful for strings;
/// every other operator yields `false`.
#[must_use]
pub fn compare_string(op: Operator, lhs: &str, rhs: &str) -> bool {
    match op {
        Operator::Eq => lhs == rhs,
        Operator::Ne => lhs != rhs,
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => false,
    }
}

// ============================================================================
// SECTION: Field extraction
// ============================================================================

/// Extracts `field` from a structured value: an empty field name returns
/// the value itself; a mapping returns `value[field]`; anything else
/// returns `None`.
#[must_use]
pub fn extract_field<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    if field.is_empty() {
        return Some(value);
    }
    value.as_object().and_then(|map| map.get(field))
}

// ============================================================================
// SECTION: Entity-name matcher
// ============================================================================

/// Resolves whether `name` (a human-facing role or entity name from an
/// intent) plausibly refers to `entity_id`, given the free-form
/// `reason_detail` text accompanying the observed change.
///
/// Branches, in order — preserve exactly:
/// 1. `name` parses as an integer: require an exact `entity_id` match.
/// 2. Case-insensitive substring match of `name` in `reason_detail`: a hit
///    returns `true` immediately.
/// 3. `reason_detail` contains a colon (an `"a:b"` role-pair convention)
///    and step 2 missed: return `false` — the detail names specific
///    entities and ours isn't one of them.
/// 4. Otherwise: return `true`, permissively, so simulators that omit
///    identifying detail don't produce false negatives.
#[must_use]
pub fn matches_entity(entity_id: EntityId, reason_detail: &str, name: &str) -> bool {
    if let Ok(parsed) = name.parse::<u64>() {
        return entity_id.value() == parsed;
    }
    if reason_detail.to_lowercase().contains(&name.to_lowercase()) {
        return true;
    }
    if reason_detail.contains(':') {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::Operator;
    use super::compare_numeric;
    use super::compare_string;
    use super::extract_field;
    use super::matches_entity;
    use crate::model::identifiers::EntityId;

    #[test]
    fn numeric_nan_yields_false_for_every_operator() {
        for op in [
            Operator::Eq,
            Operator::Ne,
            Operator::Lt,
            Operator::Le,
            Operator::Gt,
            Operator::Ge,
        ] {
            assert!(!compare_numeric(op, f64::NAN, 1.0));
            assert!(!compare_numeric(op, 1.0, f64::NAN));
        }
    }

    #[test]
    fn numeric_operators_match_standard_relations() {
        assert!(compare_numeric(Operator::Gt, 5.0, 1.0));
        assert!(compare_numeric(Operator::Le, 1.0, 1.0));
        assert!(!compare_numeric(Operator::Lt, 1.0, 1.0));
    }

    #[test]
    fn string_comparator_only_supports_eq_and_ne() {
        assert!(compare_string(Operator::Eq, "won", "won"));
        assert!(compare_string(Operator::Ne, "won", "lost"));
        assert!(!compare_string(Operator::Gt, "a", "b"));
    }

    #[test]
    fn extract_field_returns_value_itself_on_empty_field() {
        let value = serde_json::json!(42);
        assert_eq!(extract_field(&value, ""), Some(&value));
    }

    #[test]
    fn extract_field_indexes_mappings() {
        let value = serde_json::json!({"dx": 5.0});
        assert_eq!(extract_field(&value, "dx"), Some(&serde_json::json!(5.0)));
        assert_eq!(extract_field(&value, "dy"), None);
    }

    #[test]
    fn extract_field_returns_none_for_non_mapping_with_named_field() {
        let value = serde_json::json!(42);
        assert_eq!(extract_field(&value, "dx"), None);
    }

    #[test]
    fn matcher_branch_one_requires_exact_id_when_name_is_numeric() {
        assert!(matches_entity(EntityId::new(7), "anything", "7"));
        assert!(!matches_entity(EntityId::new(7), "anything", "8"));
    }

    #[test]
    fn matcher_branch_two_substring_hit_returns_true() {
        assert!(matches_entity(EntityId::new(1), "ball:brick", "ball"));
        assert!(matches_entity(EntityId::new(1), "BALL:BRICK", "ball"));
    }

    #[test]
    fn matcher_branch_three_colon_detail_without_hit_returns_false() {
        assert!(!matches_entity(EntityId::new(1), "paddle:wall", "ball"));
    }

    #[test]
    fn matcher_branch_four_permissive_fallback_returns_true() {
        assert!(matches_entity(EntityId::new(1), "no identifying detail here", "ball"));
    }
}
