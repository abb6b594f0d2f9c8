//! Grammar field types shared by every identifier.
//!
//! Identifiers are built from validated fields only, so an identifier value
//! that exists always formats back to a string that satisfies the grammar.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::IdError;

// =============================================================================
// Entity Kind
// =============================================================================

/// The entity an identifier names. The leading character of an identifier
/// selects the kind, and the kind fixes the total width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Job,
    Application,
    Booking,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 3] = [EntityKind::Job, EntityKind::Application, EntityKind::Booking];

    /// The leading character used in identifiers of this kind.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            EntityKind::Job => 'J',
            EntityKind::Application => 'A',
            EntityKind::Booking => 'B',
        }
    }

    /// Total identifier width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            EntityKind::Job | EntityKind::Booking => 10,
            EntityKind::Application => 13,
        }
    }

    /// Resolves a kind from its leading character.
    #[must_use]
    pub const fn from_prefix(c: char) -> Option<Self> {
        match c {
            'J' => Some(EntityKind::Job),
            'A' => Some(EntityKind::Application),
            'B' => Some(EntityKind::Booking),
            _ => None,
        }
    }

    /// Lowercase noun used in human-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Job => "job",
            EntityKind::Application => "application",
            EntityKind::Booking => "booking",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Two-letter Code
// =============================================================================

/// A two-letter ASCII uppercase code (category, city or area).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code([u8; 2]);

impl Code {
    /// Builds a code from a literal. Invalid literals fail const evaluation.
    #[must_use]
    pub const fn literal(bytes: &[u8; 2]) -> Self {
        assert!(
            bytes[0].is_ascii_uppercase() && bytes[1].is_ascii_uppercase(),
            "code literal must be two uppercase ASCII letters"
        );
        Self(*bytes)
    }

    /// Builds a code from raw bytes, returning `None` unless both bytes are
    /// ASCII uppercase letters.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 2]) -> Option<Self> {
        if bytes[0].is_ascii_uppercase() && bytes[1].is_ascii_uppercase() {
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Derives a code from free text: the first two ASCII letters,
    /// uppercased, padded with `X` when fewer than two letters exist.
    #[must_use]
    pub fn derive(text: &str) -> Self {
        let mut bytes = [b'X'; 2];
        let letters = text
            .bytes()
            .filter(u8::is_ascii_alphabetic)
            .map(|b| b.to_ascii_uppercase())
            .take(2);
        for (slot, letter) in bytes.iter_mut().zip(letters) {
            *slot = letter;
        }
        Self(bytes)
    }

    /// Parses a code from a two-character string.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        parse_code(s.as_bytes(), "code")
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(char::from(self.0[0]))?;
        f.write_char(char::from(self.0[1]))
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({self})")
    }
}

impl std::str::FromStr for Code {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Code {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Sequence
// =============================================================================

/// A 1-based sequence number that fits three zero-padded digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sequence(u16);

impl Sequence {
    /// The first sequence number in any scope.
    pub const FIRST: Self = Self(1);

    /// The largest representable sequence number.
    pub const MAX: Self = Self(999);

    /// Creates a sequence, returning `None` outside `1..=999`.
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value >= 1 && value <= Self::MAX.0 as u64 {
            Some(Self(value as u16))
        } else {
            None
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns the following sequence number, or `None` past 999.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        Self::new(self.0 as u64 + 1)
    }

    /// Parses a three-digit sequence field.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        parse_sequence(s.as_bytes(), "sequence")
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl Serialize for Sequence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Locality
// =============================================================================

/// The six-character body shared by every identifier: category, city and
/// area codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locality {
    pub category: Code,
    pub city: Code,
    pub area: Code,
}

impl Locality {
    /// Width of the encoded locality.
    pub const WIDTH: usize = 6;

    #[must_use]
    pub const fn new(category: Code, city: Code, area: Code) -> Self {
        Self {
            category,
            city,
            area,
        }
    }

    pub(crate) fn parse_bytes(bytes: &[u8]) -> Result<Self, IdError> {
        Ok(Self {
            category: parse_code(&bytes[0..2], "category")?,
            city: parse_code(&bytes[2..4], "city")?,
            area: parse_code(&bytes[4..6], "area")?,
        })
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.category, self.city, self.area)
    }
}

// =============================================================================
// Field parsing helpers
// =============================================================================

pub(crate) fn parse_code(bytes: &[u8], field: &'static str) -> Result<Code, IdError> {
    let invalid = || IdError::InvalidCode {
        field,
        value: String::from_utf8_lossy(bytes).into_owned(),
    };
    match bytes {
        [a, b] => Code::from_bytes([*a, *b]).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

pub(crate) fn parse_sequence(bytes: &[u8], field: &'static str) -> Result<Sequence, IdError> {
    let invalid = || IdError::InvalidSequence {
        field,
        value: String::from_utf8_lossy(bytes).into_owned(),
    };
    if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let value = bytes
        .iter()
        .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));
    Sequence::new(value).ok_or_else(invalid)
}

/// Reads the entity kind from the leading character and checks the width.
pub(crate) fn leading_kind(s: &str) -> Result<EntityKind, IdError> {
    let first = s.chars().next().ok_or(IdError::Empty)?;
    let kind = EntityKind::from_prefix(first).ok_or(IdError::UnknownKind { found: first })?;
    if s.len() != kind.width() {
        return Err(IdError::InvalidLength {
            kind,
            expected: kind.width(),
            actual: s.len(),
        });
    }
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_derive_pads_and_skips_non_letters() {
        assert_eq!(Code::derive("pallikaranai").to_string(), "PA");
        assert_eq!(Code::derive("1st block").to_string(), "ST");
        assert_eq!(Code::derive("x").to_string(), "XX");
        assert_eq!(Code::derive("").to_string(), "XX");
        assert_eq!(Code::derive("é9q").to_string(), "QX");
    }

    #[test]
    fn test_locality_width_matches_encoding() {
        let locality = Locality::new(
            Code::literal(b"CO"),
            Code::literal(b"BA"),
            Code::literal(b"PA"),
        );
        let text = locality.to_string();
        assert_eq!(text.len(), Locality::WIDTH);
        assert_eq!(Locality::parse_bytes(text.as_bytes()).unwrap(), locality);
        assert_eq!(
            EntityKind::Job.width(),
            1 + Locality::WIDTH + Sequence::FIRST.to_string().len()
        );
    }

    #[test]
    fn test_code_rejects_lowercase() {
        assert!(Code::parse("pl").is_err());
        assert!(Code::parse("P").is_err());
        assert_eq!(Code::parse("PL").unwrap(), Code::literal(b"PL"));
    }

    #[test]
    fn test_sequence_bounds() {
        assert_eq!(Sequence::new(0), None);
        assert_eq!(Sequence::new(1), Some(Sequence::FIRST));
        assert_eq!(Sequence::new(999), Some(Sequence::MAX));
        assert_eq!(Sequence::new(1000), None);
        assert_eq!(Sequence::MAX.next(), None);
    }

    #[test]
    fn test_sequence_formats_zero_padded() {
        assert_eq!(Sequence::new(7).unwrap().to_string(), "007");
        assert_eq!(Sequence::new(42).unwrap().to_string(), "042");
        assert_eq!(Sequence::MAX.to_string(), "999");
    }

    #[test]
    fn test_sequence_parse_rejects_zero_and_signs() {
        assert!(Sequence::parse("000").is_err());
        assert!(Sequence::parse("+01").is_err());
        assert!(Sequence::parse("01").is_err());
        assert_eq!(Sequence::parse("010").unwrap().value(), 10);
    }

    #[test]
    fn test_sequence_json_is_padded_string() {
        let json = serde_json::to_string(&Sequence::new(5).unwrap()).unwrap();
        assert_eq!(json, "\"005\"");
    }

    #[test]
    fn test_entity_kind_prefix_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(EntityKind::from_prefix('X'), None);
    }
}
