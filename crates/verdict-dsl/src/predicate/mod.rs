//! # Predicate Library
//!
//! Pure boolean functions over resolved JSON values. Every predicate is
//! total: comparison of incompatible types, malformed regex patterns,
//! unparseable quantities, and broken URLs all evaluate to `false`, never an
//! error. The only fallible functions in this module tree are the unit
//! parsers [`units::parse_bytes`] and [`units::parse_seconds`], and their
//! callers fold the failure to `false`.

pub mod compare;
pub mod domain;
pub mod tags;
pub mod units;

use serde_json::Value;

pub use tags::TagSet;
pub use units::{parse_bytes, parse_seconds, UnitParseError};

/// The predicates the compiler can bind. Resolved from rule text once at
/// compile time, so evaluation never does string dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Substring / element / key containment.
    Contains,
    /// Loose equality with numeric coercion.
    Equals,
    /// Numeric greater-than; non-numeric operands are false.
    GreaterThan,
    /// Numeric less-than; non-numeric operands are false.
    LessThan,
    /// Regex match; invalid patterns are false.
    Matches,
    /// Null, empty string, empty array, or empty object.
    IsEmpty,
    /// Negation of [`PredicateKind::IsEmpty`].
    IsPresent,
    /// True unless the value is an explicit affirmative consent marker.
    LacksConsent,
    /// Exact canonical domain equality.
    DomainIs,
    /// Registrable-domain suffix match.
    DomainEtld1,
    /// Byte-quantity bound; missing parameter passes, unparseable fails.
    ParamBytesLte,
    /// Duration bound; missing parameter passes, unparseable fails.
    ParamSecondsLte,
    /// Tag-set membership.
    HasTag,
    /// Tag-set category membership via the built-in taxonomy.
    HasCategory,
    /// Tag present with at least the given confidence.
    TagConfidence,
    /// Two or more sensitive categories present at once.
    HighRiskTagCombination,
}

impl PredicateKind {
    /// Resolve a predicate name from rule text.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "contains" => Self::Contains,
            "equals" => Self::Equals,
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            "matches" => Self::Matches,
            "is_empty" => Self::IsEmpty,
            "is_present" => Self::IsPresent,
            "lacks_consent" => Self::LacksConsent,
            "domain_is" => Self::DomainIs,
            "domain_etld1" => Self::DomainEtld1,
            "param_bytes_lte" => Self::ParamBytesLte,
            "param_seconds_lte" => Self::ParamSecondsLte,
            "has_tag" => Self::HasTag,
            "has_category" => Self::HasCategory,
            "tag_confidence" => Self::TagConfidence,
            "high_risk_tag_combination" => Self::HighRiskTagCombination,
            _ => return None,
        })
    }

    /// The predicate name as it appears in rule text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Matches => "matches",
            Self::IsEmpty => "is_empty",
            Self::IsPresent => "is_present",
            Self::LacksConsent => "lacks_consent",
            Self::DomainIs => "domain_is",
            Self::DomainEtld1 => "domain_etld1",
            Self::ParamBytesLte => "param_bytes_lte",
            Self::ParamSecondsLte => "param_seconds_lte",
            Self::HasTag => "has_tag",
            Self::HasCategory => "has_category",
            Self::TagConfidence => "tag_confidence",
            Self::HighRiskTagCombination => "high_risk_tag_combination",
        }
    }

    /// The number of arguments this predicate takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::IsEmpty
            | Self::IsPresent
            | Self::LacksConsent
            | Self::HighRiskTagCombination => 1,
            Self::TagConfidence => 3,
            _ => 2,
        }
    }
}

impl std::fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluate a predicate over resolved argument values.
///
/// `args` has already been arity-checked at compile time; a mismatch here
/// would be an internal bug, and the function answers `false` rather than
/// panicking.
pub fn eval(kind: PredicateKind, args: &[&Value]) -> bool {
    if args.len() != kind.arity() {
        return false;
    }
    match kind {
        PredicateKind::Contains => compare::contains(args[0], args[1]),
        PredicateKind::Equals => compare::equals(args[0], args[1]),
        PredicateKind::GreaterThan => compare::greater_than(args[0], args[1]),
        PredicateKind::LessThan => compare::less_than(args[0], args[1]),
        PredicateKind::Matches => compare::matches(args[0], args[1]),
        PredicateKind::IsEmpty => compare::is_empty(args[0]),
        PredicateKind::IsPresent => compare::is_present(args[0]),
        PredicateKind::LacksConsent => compare::lacks_consent(args[0]),
        PredicateKind::DomainIs => domain::domain_is(args[0], args[1]),
        PredicateKind::DomainEtld1 => domain::domain_etld1(args[0], args[1]),
        PredicateKind::ParamBytesLte => units::param_bytes_lte(args[0], args[1]),
        PredicateKind::ParamSecondsLte => units::param_seconds_lte(args[0], args[1]),
        PredicateKind::HasTag => tags::has_tag(args[0], args[1]),
        PredicateKind::HasCategory => tags::has_category(args[0], args[1]),
        PredicateKind::TagConfidence => tags::tag_confidence(args[0], args[1], args[2]),
        PredicateKind::HighRiskTagCombination => tags::high_risk_tag_combination(args[0]),
    }
}
