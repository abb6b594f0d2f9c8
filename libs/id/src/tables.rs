//! Category and city code tables.
//!
//! Tables are built once per process and never mutated. Lookups normalize
//! the input (trim, collapse whitespace, lowercase) before matching. Inputs
//! without an entry resolve to a fallback code; fallbacks are logged and
//! counted because two distinct unmapped names can share a fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::Serialize;
use tracing::warn;

use crate::Code;

/// Code used for categories that have no table entry ("Playing").
pub const DEFAULT_CATEGORY: Code = Code::literal(b"PL");

/// Name returned by reverse lookups for codes with no table entry, and the
/// city and area of an empty location.
pub const UNKNOWN: &str = "Unknown";

/// Code for the [`UNKNOWN`] city or area. Not a fallback.
pub const UNKNOWN_CODE: Code = Code::literal(b"UN");

/// (canonical name, extra aliases, code)
type Entry = (&'static str, &'static [&'static str], Code);

const CATEGORIES: &[Entry] = &[
    ("Playing", &["player", "play"], Code::literal(b"PL")),
    ("Coach", &["coaching"], Code::literal(b"CO")),
    ("Umpire", &["umpiring"], Code::literal(b"UM")),
    ("Referee", &[], Code::literal(b"RE")),
    ("Scorer", &["scoring"], Code::literal(b"SC")),
    ("Physio", &["physiotherapist"], Code::literal(b"PH")),
    ("Trainer", &["fitness trainer"], Code::literal(b"TR")),
    ("Groundsman", &["curator"], Code::literal(b"GR")),
    ("Commentator", &["commentary"], Code::literal(b"CM")),
    ("Analyst", &["video analyst"], Code::literal(b"AN")),
    ("Photographer", &["photography"], Code::literal(b"PG")),
    ("Venue", &["ground booking"], Code::literal(b"VE")),
];

const CITIES: &[Entry] = &[
    ("Chennai", &["madras"], Code::literal(b"CH")),
    ("Bangalore", &["bengaluru"], Code::literal(b"BA")),
    ("Mumbai", &["bombay"], Code::literal(b"MU")),
    ("Delhi", &["new delhi"], Code::literal(b"DE")),
    ("Hyderabad", &[], Code::literal(b"HY")),
    ("Kolkata", &["calcutta"], Code::literal(b"KO")),
    ("Pune", &[], Code::literal(b"PU")),
    ("Coimbatore", &["kovai"], Code::literal(b"CB")),
    ("Madurai", &[], Code::literal(b"MA")),
    ("Kochi", &["cochin"], Code::literal(b"KC")),
    ("Ahmedabad", &[], Code::literal(b"AH")),
    ("Jaipur", &[], Code::literal(b"JA")),
];

static CATEGORY_FALLBACKS: AtomicU64 = AtomicU64::new(0);
static CITY_FALLBACKS: AtomicU64 = AtomicU64::new(0);

struct CodeTable {
    by_name: HashMap<String, Code>,
    by_code: HashMap<Code, &'static str>,
}

impl CodeTable {
    fn build(entries: &[Entry]) -> Self {
        let mut by_name = HashMap::new();
        let mut by_code = HashMap::new();
        for (name, aliases, code) in entries {
            by_name.insert(normalize(name), *code);
            for alias in *aliases {
                by_name.insert(normalize(alias), *code);
            }
            by_code.entry(*code).or_insert(*name);
        }
        Self { by_name, by_code }
    }

    fn lookup(&self, name: &str) -> Option<Code> {
        self.by_name.get(&normalize(name)).copied()
    }

    fn name(&self, code: Code) -> &'static str {
        self.by_code.get(&code).copied().unwrap_or(UNKNOWN)
    }
}

struct Tables {
    categories: CodeTable,
    cities: CodeTable,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| Tables {
        categories: CodeTable::build(CATEGORIES),
        cities: CodeTable::build(CITIES),
    })
}

/// Trims, collapses internal whitespace and lowercases.
pub(crate) fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns the code for a category name, falling back to
/// [`DEFAULT_CATEGORY`] for unmapped names.
pub fn category_code(name: &str) -> Code {
    if let Some(code) = tables().categories.lookup(name) {
        return code;
    }
    CATEGORY_FALLBACKS.fetch_add(1, Ordering::Relaxed);
    warn!(
        category = %name.trim(),
        fallback = %DEFAULT_CATEGORY,
        "unmapped category, using default code"
    );
    DEFAULT_CATEGORY
}

/// Returns the code for a city name, falling back to the first two letters
/// of the normalized name for unmapped cities.
pub fn city_code(name: &str) -> Code {
    if let Some(code) = tables().cities.lookup(name) {
        return code;
    }
    let fallback = Code::derive(&normalize(name));
    CITY_FALLBACKS.fetch_add(1, Ordering::Relaxed);
    warn!(
        city = %name.trim(),
        fallback = %fallback,
        "unmapped city, deriving code from name"
    );
    fallback
}

/// Returns the code for an area: its first two letters. Areas have no table.
pub fn area_code(name: &str) -> Code {
    Code::derive(&normalize(name))
}

/// Reports whether `name` (or one of its aliases) is in the category table.
pub fn is_known_category(name: &str) -> bool {
    tables().categories.lookup(name).is_some()
}

/// Reports whether `name` (or one of its aliases) is in the city table.
pub fn is_known_city(name: &str) -> bool {
    tables().cities.lookup(name).is_some()
}

/// Canonical category names with their codes, in table order.
pub fn categories() -> impl Iterator<Item = (&'static str, Code)> {
    CATEGORIES.iter().map(|(name, _, code)| (*name, *code))
}

/// Canonical city names with their codes, in table order.
pub fn cities() -> impl Iterator<Item = (&'static str, Code)> {
    CITIES.iter().map(|(name, _, code)| (*name, *code))
}

/// Reverse lookup of a category code; [`UNKNOWN`] if absent.
pub fn category_from_code(code: Code) -> &'static str {
    tables().categories.name(code)
}

/// Reverse lookup of a city code; [`UNKNOWN`] if absent.
pub fn city_from_code(code: Code) -> &'static str {
    tables().cities.name(code)
}

/// Process-wide count of fallback codes handed out so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FallbackCounts {
    pub category: u64,
    pub city: u64,
}

/// Snapshot of the fallback counters.
pub fn fallback_counts() -> FallbackCounts {
    FallbackCounts {
        category: CATEGORY_FALLBACKS.load(Ordering::Relaxed),
        city: CITY_FALLBACKS.load(Ordering::Relaxed),
    }
}
