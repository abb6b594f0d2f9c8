//! Identifier issuance.
//!
//! The issuer resolves codes, asks its allocator for the next sequence in
//! the right scope and composes the identifier. It never retries: overflow
//! and invalid parents go straight back to the caller, which knows whether a
//! retry makes sense.

use tracing::debug;

use crate::location::parse_location;
use crate::{
    ApplicationId, BookingId, EntityKind, IssueError, JobId, Locality, Scope, SequenceAllocator,
};

/// Issues Job, Booking and Application identifiers from an allocator.
#[derive(Debug, Clone, Default)]
pub struct IdIssuer<A> {
    allocator: A,
}

impl<A: SequenceAllocator> IdIssuer<A> {
    #[must_use]
    pub fn new(allocator: A) -> Self {
        Self { allocator }
    }

    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Issues a Job ID for a category and free-text location.
    pub async fn compose_job_id(&self, category: &str, location: &str) -> Result<JobId, IssueError> {
        let locality = parse_location(location).locality(category);
        self.job_at(locality).await
    }

    /// Issues a Booking ID for a category and free-text location.
    pub async fn compose_booking_id(
        &self,
        category: &str,
        location: &str,
    ) -> Result<BookingId, IssueError> {
        let locality = parse_location(location).locality(category);
        self.booking_at(locality).await
    }

    /// Issues a Booking ID for already resolved codes.
    pub async fn booking_at(&self, locality: Locality) -> Result<BookingId, IssueError> {
        let scope = Scope::category(EntityKind::Booking, locality.category);
        let sequence = self.allocator.next_sequence(&scope).await?;
        let id = BookingId::new(locality, sequence);
        debug!(kind = %EntityKind::Booking, %scope, %id, "issued id");
        Ok(id)
    }

    /// Issues a Job ID for already resolved codes.
    pub async fn job_at(&self, locality: Locality) -> Result<JobId, IssueError> {
        let scope = Scope::category(EntityKind::Job, locality.category);
        let sequence = self.allocator.next_sequence(&scope).await?;
        let id = JobId::new(locality, sequence);
        debug!(kind = %EntityKind::Job, %scope, %id, "issued id");
        Ok(id)
    }

    /// Issues an Application ID under a parent Job ID string.
    ///
    /// The parent is validated before any sequence is allocated.
    pub async fn compose_application_id(
        &self,
        parent_job_id: &str,
    ) -> Result<ApplicationId, IssueError> {
        let parent = JobId::parse(parent_job_id).map_err(|source| IssueError::InvalidParentId {
            id: parent_job_id.to_string(),
            source,
        })?;
        self.application_for(&parent).await
    }

    /// Issues an Application ID under a typed parent Job ID.
    pub async fn application_for(&self, parent: &JobId) -> Result<ApplicationId, IssueError> {
        let scope = Scope::job(*parent);
        let sequence = self.allocator.next_sequence(&scope).await?;
        let id = ApplicationId::new(parent, sequence);
        debug!(kind = %EntityKind::Application, %scope, %id, "issued id");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_parent_job_id, parse_id, AllocError, IdError, MemoryAllocator, Sequence};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn issuer() -> IdIssuer<MemoryAllocator> {
        IdIssuer::new(MemoryAllocator::new())
    }

    #[tokio::test]
    async fn test_coach_job_and_first_application() {
        let issuer = issuer();
        let job = issuer
            .compose_job_id("Coach", "Bangalore, Pallikaranai")
            .await
            .unwrap();
        assert_eq!(job.to_string(), "JCOBAPA001");

        let app = issuer.compose_application_id("JCOBAPA001").await.unwrap();
        assert_eq!(app.to_string(), "ACOBAPA001001");
        assert_eq!(
            get_parent_job_id(&app.to_string()).as_deref(),
            Some("JCOBAPA001")
        );
    }

    #[tokio::test]
    async fn test_sequences_are_per_category_not_per_locality() {
        let issuer = issuer();
        let a = issuer.compose_job_id("Playing", "Chennai Velachery").await.unwrap();
        let b = issuer.compose_job_id("playing", "Mumbai, Bandra").await.unwrap();
        let c = issuer.compose_job_id("Coach", "Chennai Velachery").await.unwrap();
        assert_eq!(a.to_string(), "JPLCHVE001");
        assert_eq!(b.to_string(), "JPLMUBA002");
        assert_eq!(c.to_string(), "JCOCHVE001");

        let playing = Scope::category(EntityKind::Job, a.locality().category);
        assert_eq!(issuer.allocator().last(&playing).map(|s| s.value()), Some(2));
    }

    #[tokio::test]
    async fn test_bookings_and_jobs_have_separate_scopes() {
        let issuer = issuer();
        issuer.compose_job_id("Umpire", "Pune").await.unwrap();
        let booking = issuer.compose_booking_id("Umpire", "Pune").await.unwrap();
        assert_eq!(booking.to_string(), "BUMPUPU001");
    }

    #[tokio::test]
    async fn test_applications_count_per_parent() {
        let issuer = issuer();
        let first = issuer.compose_job_id("Coach", "Kochi, Fort").await.unwrap();
        let second = issuer.compose_job_id("Coach", "Kochi, Fort").await.unwrap();

        for expected in 1..=3u16 {
            let app = issuer.application_for(&first).await.unwrap();
            assert_eq!(app.app_sequence().value(), expected);
            assert_eq!(app.parent_job_id(), first);
        }
        let other = issuer.application_for(&second).await.unwrap();
        assert_eq!(other.to_string(), "ACOKCFO002001");
    }

    #[tokio::test]
    async fn test_issued_ids_roundtrip() {
        let issuer = issuer();
        let job = issuer.compose_job_id("Scorer", "Hyderabad Gachibowli").await.unwrap();
        let parsed = parse_id(&job.to_string()).unwrap();
        assert_eq!(parsed.to_string(), job.to_string());
        assert_eq!(parsed.category_code(), job.locality().category);
        assert_eq!(parsed.city_code(), job.locality().city);
        assert_eq!(parsed.area_code(), job.locality().area);
    }

    /// Allocator that records how often it was asked.
    #[derive(Default)]
    struct Tally(AtomicUsize);

    #[async_trait]
    impl SequenceAllocator for Tally {
        async fn next_sequence(&self, _scope: &Scope) -> Result<Sequence, AllocError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Sequence::FIRST)
        }
    }

    #[tokio::test]
    async fn test_invalid_parent_allocates_nothing() {
        let allocator = Arc::new(Tally::default());
        let issuer = IdIssuer::new(Arc::clone(&allocator));

        for bad in ["", "BCOBAPA001", "ACOBAPA001001", "JCOBAPA000", "J12"] {
            let err = issuer.compose_application_id(bad).await.unwrap_err();
            assert!(
                matches!(err, IssueError::InvalidParentId { ref id, .. } if id == bad),
                "unexpected error for {bad:?}: {err}"
            );
        }
        assert_eq!(allocator.0.load(Ordering::SeqCst), 0);

        let err = issuer.compose_application_id("BCOBAPA001").await.unwrap_err();
        let IssueError::InvalidParentId { source, .. } = err else {
            panic!("expected InvalidParentId");
        };
        assert!(matches!(source, IdError::WrongKind { .. }));
    }

    #[tokio::test]
    async fn test_overflow_surfaces_as_issue_error() {
        let allocator = MemoryAllocator::new();
        let parent: JobId = "JCOBAPA001".parse().unwrap();
        allocator.resume(Scope::job(parent), Sequence::MAX);
        let issuer = IdIssuer::new(allocator);

        let err = issuer.application_for(&parent).await.unwrap_err();
        assert!(matches!(err, IssueError::SequenceOverflow { ref scope } if scope == "JCOBAPA001"));
        assert_eq!(issuer.allocator().last(&Scope::job(parent)), Some(Sequence::MAX));
    }

    #[tokio::test]
    async fn test_concurrent_issuance_yields_distinct_ids() {
        let issuer = Arc::new(issuer());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let issuer = Arc::clone(&issuer);
            handles.push(tokio::spawn(async move {
                issuer
                    .compose_job_id("Physio", "Delhi, Dwarka")
                    .await
                    .unwrap()
                    .to_string()
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 50);
    }
}
