//! The tagged-union value type used for all request/reply payload data.
//!
//! A [`Variant`] holds exactly one live value at a time. Cloning performs a
//! deep copy for the owned payloads (`String`, `List`, `Map`, `Node`);
//! scalars copy by value. [`Variant::Invalid`] is the default, empty state
//! and the safe fallback for every conversion that is not representable.
//!
//! Equality is type-aware rather than coercing: values compare equal only
//! within their category (numeric, string, boolean). In particular a string
//! never equals a non-string, even when the textual forms match — reply
//! inspection code relies on this.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::ProtoError;
use crate::node::Node;

/// Ordered key-to-value mapping of variants.
///
/// Lookup by key is the contract; iteration order is sorted by key, not the
/// order the wire document used.
pub type VariantMap = BTreeMap<String, Variant>;

/// Append-ordered list of variants.
pub type VariantList = Vec<Variant>;

static EMPTY_MAP: VariantMap = VariantMap::new();
static EMPTY_LIST: VariantList = VariantList::new();
static EMPTY_NODE: Node = Node::empty();

/// Absolute tolerance used when comparing floating point values.
///
/// Accumulated formatting/parsing error is usually larger than a single
/// epsilon, so the comparison is deliberately more liberal.
const FUZZY_TOLERANCE: f64 = 10.0 * f64::EPSILON;

/// A dynamically-typed value: scalar, string, list, map or node.
#[derive(Debug, Clone, Default)]
pub enum Variant {
    /// The empty state; every conversion on it yields the caller's default.
    #[default]
    Invalid,
    /// Signed integer.
    Int(i64),
    /// Unsigned integer, used for counters and timestamps.
    UnsignedLong(u64),
    /// Floating point number.
    Double(f64),
    /// Boolean.
    Bool(bool),
    /// Owned string.
    String(String),
    /// Append-ordered list of variants.
    List(VariantList),
    /// Key-to-value mapping with unique string keys.
    Map(VariantMap),
    /// A cluster node object (property mapping with typed accessors).
    Node(Node),
}

impl Variant {
    /// Name of the live variant, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Int(_) => "int",
            Self::UnsignedLong(_) => "ulonglong",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Node(_) => "node",
        }
    }

    /// True for the empty state.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// True when the live variant is a string.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// True when the live variant is numeric (`Int`, `UnsignedLong` or
    /// `Double`).
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::UnsignedLong(_) | Self::Double(_))
    }

    /// True when the live variant is a map.
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// True when the live variant is a list.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The value converted to a signed integer.
    ///
    /// Strings are parsed with leading-integer semantics (whitespace and an
    /// optional sign, then digits; an empty string yields `default`, a
    /// non-numeric one yields 0). Doubles truncate, booleans map to 0/1.
    /// Aggregates and `Invalid` yield `default`.
    #[must_use]
    pub fn to_int(&self, default: i64) -> i64 {
        match self {
            Self::Invalid | Self::List(_) | Self::Map(_) | Self::Node(_) => default,
            Self::Int(value) => *value,
            // Narrowing: large counters lose data here, callers that care
            // use to_unsigned_long().
            Self::UnsignedLong(value) => *value as i64,
            Self::Double(value) => *value as i64,
            Self::Bool(value) => i64::from(*value),
            Self::String(text) => {
                if text.is_empty() {
                    default
                } else {
                    parse_leading_int(text)
                }
            }
        }
    }

    /// The value converted to an unsigned integer.
    ///
    /// Strings are parsed with base auto-detection: `0x` means hexadecimal,
    /// a leading zero means octal, anything else decimal. An empty string
    /// yields `default`, a non-numeric one yields 0.
    #[must_use]
    pub fn to_unsigned_long(&self, default: u64) -> u64 {
        match self {
            Self::Invalid | Self::List(_) | Self::Map(_) | Self::Node(_) => default,
            Self::UnsignedLong(value) => *value,
            Self::Int(value) => *value as u64,
            Self::Double(value) => *value as u64,
            Self::Bool(value) => u64::from(*value),
            Self::String(text) => {
                if text.trim().is_empty() {
                    default
                } else {
                    parse_unsigned_auto(text)
                }
            }
        }
    }

    /// The value converted to a double.
    ///
    /// A string that does not parse as a float yields `default`.
    #[must_use]
    pub fn to_double(&self, default: f64) -> f64 {
        match self {
            Self::Invalid | Self::List(_) | Self::Map(_) | Self::Node(_) => default,
            Self::Double(value) => *value,
            Self::Int(value) => *value as f64,
            Self::UnsignedLong(value) => *value as f64,
            Self::Bool(value) => {
                if *value {
                    1.0
                } else {
                    0.0
                }
            }
            Self::String(text) => text.trim().parse().unwrap_or(default),
        }
    }

    /// The value converted to a boolean.
    ///
    /// Recognizes the usual spellings (`yes`/`true`/`on`/`t` and their
    /// negative counterparts, case-insensitive, whitespace trimmed);
    /// otherwise a numeric string is true when non-zero. An empty string
    /// yields `default`.
    #[must_use]
    pub fn to_boolean(&self, default: bool) -> bool {
        match self {
            Self::Invalid | Self::List(_) | Self::Map(_) | Self::Node(_) => default,
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::UnsignedLong(value) => *value != 0,
            Self::Double(value) => *value != 0.0,
            Self::String(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return default;
                }

                if trimmed.eq_ignore_ascii_case("yes")
                    || trimmed.eq_ignore_ascii_case("true")
                    || trimmed.eq_ignore_ascii_case("on")
                    || trimmed.eq_ignore_ascii_case("t")
                {
                    return true;
                }

                if trimmed.eq_ignore_ascii_case("no")
                    || trimmed.eq_ignore_ascii_case("false")
                    || trimmed.eq_ignore_ascii_case("off")
                    || trimmed.eq_ignore_ascii_case("f")
                {
                    return false;
                }

                parse_leading_int(trimmed) != 0
            }
        }
    }

    /// The mapping held in the variant, or an empty mapping for every other
    /// variant. A node exposes its property mapping here.
    #[must_use]
    pub fn to_variant_map(&self) -> &VariantMap {
        match self {
            Self::Map(map) => map,
            Self::Node(node) => node.to_variant_map(),
            _ => &EMPTY_MAP,
        }
    }

    /// The list held in the variant, or an empty list for every other
    /// variant.
    #[must_use]
    pub fn to_variant_list(&self) -> &VariantList {
        match self {
            Self::List(list) => list,
            _ => &EMPTY_LIST,
        }
    }

    /// The node held in the variant, or an empty node for every other
    /// variant.
    #[must_use]
    pub fn to_node(&self) -> &Node {
        match self {
            Self::Node(node) => node,
            _ => &EMPTY_NODE,
        }
    }

    /// Builds a variant from a literal string, sniffing the usual typed
    /// spellings: a value that looks boolean is stored as `Bool`, one that
    /// looks like an integer as `Int`, anything else as `String`.
    #[must_use]
    pub fn from_literal(text: &str) -> Self {
        let trimmed = text.trim();

        if trimmed.eq_ignore_ascii_case("true")
            || trimmed.eq_ignore_ascii_case("yes")
            || trimmed.eq_ignore_ascii_case("on")
        {
            return Self::Bool(true);
        }

        if trimmed.eq_ignore_ascii_case("false")
            || trimmed.eq_ignore_ascii_case("no")
            || trimmed.eq_ignore_ascii_case("off")
        {
            return Self::Bool(false);
        }

        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::Int(value);
        }

        Self::String(text.to_owned())
    }

    /// Bridges a decoded JSON document into the variant model.
    ///
    /// Numbers map to `Int` when they fit a signed 64-bit value, to
    /// `UnsignedLong` when they only fit unsigned, otherwise to `Double`.
    /// `null` maps to `Invalid`.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Invalid,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(number) => {
                if let Some(i) = number.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = number.as_u64() {
                    Self::UnsignedLong(u)
                } else {
                    Self::Double(number.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(fields) => Self::Map(
                fields
                    .iter()
                    .map(|(key, val)| (key.clone(), Self::from_json(val)))
                    .collect(),
            ),
        }
    }

    /// Renders the variant back into a JSON document.
    ///
    /// `Invalid` (and a non-finite double) renders as `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Invalid => Value::Null,
            Self::Int(value) => Value::from(*value),
            Self::UnsignedLong(value) => Value::from(*value),
            Self::Double(value) => {
                serde_json::Number::from_f64(*value).map_or(Value::Null, Value::Number)
            }
            Self::Bool(value) => Value::from(*value),
            Self::String(text) => Value::from(text.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => map_to_json(map),
            Self::Node(node) => map_to_json(node.to_variant_map()),
        }
    }

    /// Decodes one complete record body into a variant.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::Decoding`] when the bytes are not valid JSON.
    pub fn parse_document(bytes: &[u8]) -> Result<Self, ProtoError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| ProtoError::Decoding(e.to_string()))?;
        Ok(Self::from_json(&value))
    }

    /// Decodes one complete record body whose top level must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::Decoding`] for invalid JSON and
    /// [`ProtoError::UnexpectedType`] when the document is not an object.
    pub fn parse_object(bytes: &[u8]) -> Result<VariantMap, ProtoError> {
        match Self::parse_document(bytes)? {
            Self::Map(map) => Ok(map),
            _ => Err(ProtoError::UnexpectedType("object")),
        }
    }
}

/// Renders a variant mapping as a JSON object value.
#[must_use]
pub fn map_to_json(map: &VariantMap) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

impl fmt::Display for Variant {
    /// The short, one-line textual form: excellent for messages and logs,
    /// not a full serialization. Aggregates render empty; use
    /// [`Variant::to_json`] for those.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid | Self::List(_) | Self::Map(_) | Self::Node(_) => Ok(()),
            Self::Int(value) => write!(f, "{value}"),
            Self::UnsignedLong(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{}", if *value { "true" } else { "false" }),
            Self::String(text) => write!(f, "{text}"),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UnsignedLong(a), Self::UnsignedLong(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            // Mixed numeric categories compare through the double form.
            _ if self.is_number() && other.is_number() => {
                fuzzy_compare(self.to_double(0.0), other.to_double(0.0))
            }
            // A string never equals a non-string, even when the textual
            // forms match. Comparing "1" equal to 1 would be rather
            // counterintuitive for reply inspection.
            _ => false,
        }
    }
}

impl PartialOrd for Variant {
    /// Ordering follows the same category restriction as equality;
    /// cross-category comparison yields `None`, so `<` is simply false.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::UnsignedLong(a), Self::UnsignedLong(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            _ if self.is_number() && other.is_number() => {
                self.to_double(0.0).partial_cmp(&other.to_double(0.0))
            }
            _ => None,
        }
    }
}

fn fuzzy_compare(first: f64, second: f64) -> bool {
    (first - second).abs() < FUZZY_TOLERANCE
}

/// `atoi`-style parse: leading whitespace, optional sign, then digits.
/// No digits at all yields 0.
fn parse_leading_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let magnitude: i64 = digits.parse().unwrap_or(0);

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// `strtoull`-style parse with base auto-detection: `0x` prefix is
/// hexadecimal, a leading zero octal, anything else decimal. Parses the
/// leading run of valid digits; none at all yields 0.
fn parse_unsigned_auto(text: &str) -> u64 {
    let trimmed = text.trim();

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        let digits: String = hex.chars().take_while(char::is_ascii_hexdigit).collect();
        return u64::from_str_radix(&digits, 16).unwrap_or(0);
    }

    if trimmed.len() > 1 && trimmed.starts_with('0') {
        let digits: String = trimmed
            .chars()
            .take_while(|c| ('0'..='7').contains(c))
            .collect();
        return u64::from_str_radix(&digits, 8).unwrap_or(0);
    }

    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Variant {
    fn from(value: u64) -> Self {
        Self::UnsignedLong(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<VariantList> for Variant {
    fn from(value: VariantList) -> Self {
        Self::List(value)
    }
}

impl From<VariantMap> for Variant {
    fn from(value: VariantMap) -> Self {
        Self::Map(value)
    }
}

impl From<Node> for Variant {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("42", 42; "plain decimal")]
    #[test_case("  17 trailing", 17; "leading whitespace and trailing junk")]
    #[test_case("-8", -8; "negative")]
    #[test_case("+3", 3; "explicit positive")]
    #[test_case("abc", 0; "non numeric")]
    fn to_int_parses_leading_integer(text: &str, expected: i64) {
        assert_eq!(Variant::from(text).to_int(-1), expected);
    }

    #[test]
    fn to_int_defaults() {
        assert_eq!(Variant::from("").to_int(7), 7);
        assert_eq!(Variant::Invalid.to_int(7), 7);
        assert_eq!(Variant::Map(VariantMap::new()).to_int(7), 7);
        assert_eq!(Variant::List(VariantList::new()).to_int(7), 7);
    }

    #[test]
    fn to_int_converts_scalars() {
        assert_eq!(Variant::from(3.9).to_int(0), 3);
        assert_eq!(Variant::from(true).to_int(0), 1);
        assert_eq!(Variant::from(false).to_int(9), 0);
        assert_eq!(Variant::from(42u64).to_int(0), 42);
    }

    #[test_case("0x1f", 31; "hex prefix")]
    #[test_case("0X10", 16; "capital hex prefix")]
    #[test_case("0755", 493; "octal leading zero")]
    #[test_case("1234", 1234; "decimal")]
    #[test_case("junk", 0; "non numeric")]
    fn to_unsigned_long_auto_detects_base(text: &str, expected: u64) {
        assert_eq!(Variant::from(text).to_unsigned_long(99), expected);
    }

    #[test]
    fn to_unsigned_long_defaults_on_empty() {
        assert_eq!(Variant::from("").to_unsigned_long(99), 99);
        assert_eq!(Variant::Invalid.to_unsigned_long(99), 99);
    }

    #[test]
    fn to_double_parses_and_defaults() {
        assert!((Variant::from("2.5").to_double(0.0) - 2.5).abs() < 1e-12);
        assert!((Variant::from("nope").to_double(1.5) - 1.5).abs() < 1e-12);
        assert!((Variant::from(true).to_double(0.0) - 1.0).abs() < 1e-12);
        assert!((Variant::from(3i64).to_double(0.0) - 3.0).abs() < 1e-12);
    }

    #[test_case("YES"; "capital yes")]
    #[test_case("On"; "mixed case on")]
    #[test_case("t"; "single t")]
    #[test_case(" true "; "padded true")]
    #[test_case("1"; "numeric one")]
    fn to_boolean_true_spellings(text: &str) {
        assert!(Variant::from(text).to_boolean(false));
    }

    #[test_case("no"; "no")]
    #[test_case("OFF"; "capital off")]
    #[test_case("F"; "capital f")]
    #[test_case("0"; "numeric zero")]
    fn to_boolean_false_spellings(text: &str) {
        assert!(!Variant::from(text).to_boolean(true));
    }

    #[test]
    fn to_boolean_empty_returns_default() {
        assert!(Variant::from("").to_boolean(true));
        assert!(!Variant::from("  ").to_boolean(false));
    }

    #[test]
    fn display_short_form() {
        assert_eq!(Variant::from(true).to_string(), "true");
        assert_eq!(Variant::from(-12i64).to_string(), "-12");
        assert_eq!(Variant::from(7u64).to_string(), "7");
        assert_eq!(Variant::from("text").to_string(), "text");
        assert_eq!(Variant::Invalid.to_string(), "");
        assert_eq!(Variant::Map(VariantMap::new()).to_string(), "");
    }

    #[test]
    fn equality_is_category_restricted() {
        assert_ne!(Variant::from("1"), Variant::from(1i64));
        assert_ne!(Variant::from(1i64), Variant::from("1"));
        assert_eq!(Variant::from(1i64), Variant::from(1.0));
        assert_eq!(Variant::from(5u64), Variant::from(5i64));
        assert_eq!(Variant::from("a"), Variant::from("a"));
        assert_ne!(Variant::from(true), Variant::from(1i64));
    }

    #[test]
    fn ordering_is_category_restricted() {
        assert!(Variant::from(1i64) < Variant::from(2i64));
        assert!(Variant::from(1.5) < Variant::from(2i64));
        assert!(Variant::from("abc") < Variant::from("abd"));
        // Cross-category comparison is false, not an error.
        assert!(!(Variant::from("1") < Variant::from(2i64)));
        assert!(!(Variant::from(2i64) < Variant::from("3")));
    }

    #[test]
    fn clone_is_deep() {
        let mut map = VariantMap::new();
        map.insert("key".into(), Variant::from("original"));
        let original = Variant::Map(map);

        let mut copy = original.clone();
        if let Variant::Map(inner) = &mut copy {
            inner.insert("key".into(), Variant::from("mutated"));
        }

        assert_eq!(
            original.to_variant_map().get("key"),
            Some(&Variant::from("original"))
        );
        assert_eq!(original.to_string(), original.clone().to_string());
    }

    #[test]
    fn from_literal_sniffs_types() {
        assert_eq!(Variant::from_literal("true"), Variant::Bool(true));
        assert_eq!(Variant::from_literal("Off"), Variant::Bool(false));
        assert_eq!(Variant::from_literal("42"), Variant::Int(42));
        assert_eq!(Variant::from_literal("-7"), Variant::Int(-7));
        assert_eq!(
            Variant::from_literal("10.20.30.40"),
            Variant::from("10.20.30.40")
        );
    }

    #[test]
    fn json_bridge_maps_number_types() {
        let doc = br#"{"int": -3, "big": 18446744073709551615, "dbl": 2.5,
                       "flag": true, "name": "alpha", "list": [1, 2],
                       "nothing": null}"#;
        let map = Variant::parse_object(doc).unwrap();

        assert_eq!(map.get("int"), Some(&Variant::Int(-3)));
        assert_eq!(
            map.get("big"),
            Some(&Variant::UnsignedLong(18_446_744_073_709_551_615))
        );
        assert_eq!(map.get("dbl"), Some(&Variant::Double(2.5)));
        assert_eq!(map.get("flag"), Some(&Variant::Bool(true)));
        assert_eq!(map.get("name"), Some(&Variant::from("alpha")));
        assert_eq!(map.get("list").map(|v| v.to_variant_list().len()), Some(2));
        assert!(map.get("nothing").is_some_and(Variant::is_invalid));
    }

    #[test]
    fn parse_object_rejects_non_objects() {
        assert!(matches!(
            Variant::parse_object(b"[1, 2, 3]"),
            Err(ProtoError::UnexpectedType("object"))
        ));
        assert!(matches!(
            Variant::parse_object(b"not json"),
            Err(ProtoError::Decoding(_))
        ));
    }

    #[test]
    fn to_json_round_trips_a_request_payload() {
        let mut payload = VariantMap::new();
        payload.insert("operation".into(), Variant::from("ping"));
        payload.insert("cluster_id".into(), Variant::from(1i64));

        let rendered = map_to_json(&payload).to_string();
        let reparsed = Variant::parse_object(rendered.as_bytes()).unwrap();
        assert_eq!(reparsed, payload);
    }
}
