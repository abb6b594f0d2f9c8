//! Typed identifiers for Jobs, Bookings and Applications.
//!
//! Jobs and Bookings share one layout; Applications extend their parent
//! Job's layout with a per-job sequence:
//!
//! ```text
//! J PL CH VE 001          Job          (10)
//! B PL CH VE 001          Booking      (10)
//! A PL CH VE 001 001      Application  (13)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tables::{category_from_code, city_from_code};
use crate::types::{leading_kind, parse_sequence};
use crate::macros::define_local_id;
use crate::{Code, EntityKind, IdError, Locality, Scope, Sequence};

define_local_id!(JobId, EntityKind::Job);
define_local_id!(BookingId, EntityKind::Booking);

// =============================================================================
// Application
// =============================================================================

/// An Application identifier. Characters `[1..10)` are the parent Job's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApplicationId {
    locality: Locality,
    job_sequence: Sequence,
    app_sequence: Sequence,
}

impl ApplicationId {
    /// The entity kind named by this ID type.
    pub const KIND: EntityKind = EntityKind::Application;

    /// Composes an Application ID under `parent`.
    #[must_use]
    pub const fn new(parent: &JobId, app_sequence: Sequence) -> Self {
        Self {
            locality: parent.locality(),
            job_sequence: parent.sequence(),
            app_sequence,
        }
    }

    #[must_use]
    pub const fn locality(&self) -> Locality {
        self.locality
    }

    /// Sequence of the parent Job within its category.
    #[must_use]
    pub const fn job_sequence(&self) -> Sequence {
        self.job_sequence
    }

    /// Sequence of this Application within its parent Job.
    #[must_use]
    pub const fn app_sequence(&self) -> Sequence {
        self.app_sequence
    }

    /// Returns the parent Job ID. No existence check is made.
    #[must_use]
    pub const fn parent_job_id(&self) -> JobId {
        JobId::new(self.locality, self.job_sequence)
    }

    /// Returns the scope this ID's sequence was allocated in.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::job(self.parent_job_id())
    }

    /// Parses an Application ID from a thirteen-character string.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let kind = leading_kind(s)?;
        if kind != Self::KIND {
            return Err(IdError::WrongKind {
                expected: Self::KIND,
                actual: kind,
            });
        }

        let (body, sequences) = s.as_bytes()[1..].split_at(Locality::WIDTH);
        let (job_sequence, app_sequence) = sequences.split_at(sequences.len() / 2);
        Ok(Self {
            locality: Locality::parse_bytes(body)?,
            job_sequence: parse_sequence(job_sequence, "job sequence")?,
            app_sequence: parse_sequence(app_sequence, "application sequence")?,
        })
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            Self::KIND.prefix(),
            self.locality,
            self.job_sequence,
            self.app_sequence
        )
    }
}

impl std::str::FromStr for ApplicationId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ApplicationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Any identifier
// =============================================================================

/// Any identifier, tagged by the entity kind its leading character names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnyId {
    Job(JobId),
    Application(ApplicationId),
    Booking(BookingId),
}

impl AnyId {
    /// Parses any identifier, dispatching on the leading character.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        match leading_kind(s)? {
            EntityKind::Job => JobId::parse(s).map(AnyId::Job),
            EntityKind::Application => ApplicationId::parse(s).map(AnyId::Application),
            EntityKind::Booking => BookingId::parse(s).map(AnyId::Booking),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            AnyId::Job(_) => EntityKind::Job,
            AnyId::Application(_) => EntityKind::Application,
            AnyId::Booking(_) => EntityKind::Booking,
        }
    }

    #[must_use]
    pub const fn locality(&self) -> Locality {
        match self {
            AnyId::Job(id) => id.locality(),
            AnyId::Application(id) => id.locality(),
            AnyId::Booking(id) => id.locality(),
        }
    }

    #[must_use]
    pub const fn category_code(&self) -> Code {
        self.locality().category
    }

    #[must_use]
    pub const fn city_code(&self) -> Code {
        self.locality().city
    }

    #[must_use]
    pub const fn area_code(&self) -> Code {
        self.locality().area
    }

    /// The single sequence of a Job or Booking; `None` for Applications.
    #[must_use]
    pub const fn sequence(&self) -> Option<Sequence> {
        match self {
            AnyId::Job(id) => Some(id.sequence()),
            AnyId::Booking(id) => Some(id.sequence()),
            AnyId::Application(_) => None,
        }
    }

    /// The parent Job's sequence; `Some` only for Applications.
    #[must_use]
    pub const fn job_sequence(&self) -> Option<Sequence> {
        match self {
            AnyId::Application(id) => Some(id.job_sequence()),
            _ => None,
        }
    }

    /// The per-job sequence; `Some` only for Applications.
    #[must_use]
    pub const fn app_sequence(&self) -> Option<Sequence> {
        match self {
            AnyId::Application(id) => Some(id.app_sequence()),
            _ => None,
        }
    }

    /// Returns the scope the final sequence field was allocated in.
    #[must_use]
    pub fn scope(&self) -> Scope {
        match self {
            AnyId::Job(id) => id.scope(),
            AnyId::Application(id) => id.scope(),
            AnyId::Booking(id) => id.scope(),
        }
    }

    /// Flattens the identifier into a decoded record.
    #[must_use]
    pub fn decode(&self) -> Decoded {
        let locality = self.locality();
        Decoded {
            kind: self.kind(),
            category_code: locality.category,
            city_code: locality.city,
            area_code: locality.area,
            sequence: self.sequence(),
            job_sequence: self.job_sequence(),
            app_sequence: self.app_sequence(),
        }
    }

    /// Renders a human description using the reverse code tables, e.g.
    /// `Coach application #001 for job #001 in Bangalore (PA)`.
    #[must_use]
    pub fn describe(&self) -> String {
        let locality = self.locality();
        let category = category_from_code(locality.category);
        let city = city_from_code(locality.city);
        match self {
            AnyId::Job(id) => format!(
                "{category} job #{} in {city} ({})",
                id.sequence(),
                locality.area
            ),
            AnyId::Booking(id) => format!(
                "{category} booking #{} in {city} ({})",
                id.sequence(),
                locality.area
            ),
            AnyId::Application(id) => format!(
                "{category} application #{} for job #{} in {city} ({})",
                id.app_sequence(),
                id.job_sequence(),
                locality.area
            ),
        }
    }
}

impl fmt::Display for AnyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyId::Job(id) => fmt::Display::fmt(id, f),
            AnyId::Application(id) => fmt::Display::fmt(id, f),
            AnyId::Booking(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl std::str::FromStr for AnyId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<JobId> for AnyId {
    fn from(id: JobId) -> Self {
        AnyId::Job(id)
    }
}

impl From<ApplicationId> for AnyId {
    fn from(id: ApplicationId) -> Self {
        AnyId::Application(id)
    }
}

impl From<BookingId> for AnyId {
    fn from(id: BookingId) -> Self {
        AnyId::Booking(id)
    }
}

impl Serialize for AnyId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Flat decoded view of an identifier, for display and JSON consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoded {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub category_code: Code,
    pub city_code: Code,
    pub area_code: Code,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Sequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_sequence: Option<Sequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_sequence: Option<Sequence>,
}

// =============================================================================
// String-level entry points
// =============================================================================

/// Parses any identifier string.
pub fn parse_id(s: &str) -> Result<AnyId, IdError> {
    AnyId::parse(s)
}

/// Reports whether `s` is a well-formed identifier of any kind.
#[must_use]
pub fn is_valid_id(s: &str) -> bool {
    AnyId::parse(s).is_ok()
}

/// Slices the parent Job ID out of an Application ID string.
///
/// Returns `None` unless `s` starts with `A` and is long enough to hold a
/// parent. The result is not validated and may name a Job that does not
/// exist.
#[must_use]
pub fn get_parent_job_id(s: &str) -> Option<String> {
    if !s.starts_with(EntityKind::Application.prefix()) {
        return None;
    }
    let body = s.get(1..EntityKind::Job.width())?;
    Some(format!("{}{body}", EntityKind::Job.prefix()))
}
