//! # pitchside-id
//!
//! Compact, human-legible identifiers for Jobs, Applications and Bookings.
//!
//! ## Design Principles
//!
//! - IDs are fixed-width strings whose fields can be read by position
//! - Every field is validated, so a typed ID always formats to a valid string
//! - IDs support roundtrip serialization (parse → format → parse)
//! - An Application ID embeds its parent Job ID, so parentage needs no lookup
//!
//! ## ID Format
//!
//! ```text
//! J + category(2) + city(2) + area(2) + seq(3)                 Job          10
//! B + category(2) + city(2) + area(2) + seq(3)                 Booking      10
//! A + category(2) + city(2) + area(2) + jobSeq(3) + appSeq(3)  Application  13
//! ```
//!
//! Examples:
//! - `JCOBAPA001`: first Coach job, Bangalore, Pallikaranai
//! - `ACOBAPA001001`: first application to that job
//! - `BPLCHVE004`: fourth Playing booking, Chennai, Velachery
//!
//! Sequences are allocated per scope: `J`/`B` plus category for Jobs and
//! Bookings, the parent Job ID for Applications.

mod allocator;
mod error;
mod ids;
mod issuer;
mod location;
mod macros;
pub mod tables;
mod types;

pub use allocator::{CountingAllocator, MemoryAllocator, PrefixCounter, Scope, SequenceAllocator};
pub use error::{AllocError, BoxError, IdError, IssueError};
pub use ids::{
    get_parent_job_id, is_valid_id, parse_id, AnyId, ApplicationId, BookingId, Decoded, JobId,
};
pub use issuer::IdIssuer;
pub use location::{parse_location, Location};
pub use tables::{area_code, category_code, city_code, FallbackCounts};
pub use types::{Code, EntityKind, Locality, Sequence};
