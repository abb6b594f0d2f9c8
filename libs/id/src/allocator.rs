//! Per-scope sequence allocation.
//!
//! Jobs and Bookings draw sequences from a type+category scope (`"JPL"`);
//! Applications draw from their parent Job's scope (`"JPLCHVE001"`).
//!
//! Two allocation strategies are provided:
//! - [`MemoryAllocator`] keeps an atomic counter per scope.
//! - [`CountingAllocator`] counts previously issued identifiers sharing the
//!   scope prefix and returns `count + 1`. Two concurrent callers can observe
//!   the same count, so it is only safe behind a store that rejects duplicate
//!   identifiers and a caller that retries on that rejection.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::{AllocError, Code, EntityKind, JobId, Sequence};

/// The key a sequence is allocated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Top-level scope for Jobs and Bookings: kind prefix plus category.
    Category { kind: EntityKind, category: Code },
    /// Nested scope for Applications: the full parent Job ID.
    Job(JobId),
}

impl Scope {
    #[must_use]
    pub const fn category(kind: EntityKind, category: Code) -> Self {
        Scope::Category { kind, category }
    }

    #[must_use]
    pub const fn job(parent: JobId) -> Self {
        Scope::Job(parent)
    }

    /// The kind of identifier issued from this scope.
    #[must_use]
    pub const fn issued_kind(&self) -> EntityKind {
        match self {
            Scope::Category { kind, .. } => *kind,
            Scope::Job(_) => EntityKind::Application,
        }
    }

    /// The string prefix every identifier issued in this scope starts with.
    ///
    /// Applications issued under a Job start with `A`, so a `Job` scope
    /// matches on the parent ID with its leading `J` swapped for `A`.
    #[must_use]
    pub fn issued_prefix(&self) -> String {
        match self {
            Scope::Category { kind, category } => format!("{}{category}", kind.prefix()),
            Scope::Job(parent) => format!(
                "{}{}{}",
                EntityKind::Application.prefix(),
                parent.locality(),
                parent.sequence()
            ),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Category { kind, category } => write!(f, "{}{category}", kind.prefix()),
            Scope::Job(parent) => write!(f, "{parent}"),
        }
    }
}

/// Hands out the next sequence number in a scope.
///
/// Implementations must never return a value outside `1..=999`; the 1000th
/// allocation in a scope fails with [`AllocError::Overflow`].
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    async fn next_sequence(&self, scope: &Scope) -> Result<Sequence, AllocError>;
}

#[async_trait]
impl<T: SequenceAllocator + ?Sized> SequenceAllocator for Arc<T> {
    async fn next_sequence(&self, scope: &Scope) -> Result<Sequence, AllocError> {
        (**self).next_sequence(scope).await
    }
}

#[async_trait]
impl<T: SequenceAllocator + ?Sized> SequenceAllocator for &T {
    async fn next_sequence(&self, scope: &Scope) -> Result<Sequence, AllocError> {
        (**self).next_sequence(scope).await
    }
}

// =============================================================================
// In-memory counters
// =============================================================================

/// Atomic per-scope counters held in process memory.
#[derive(Debug, Default)]
pub struct MemoryAllocator {
    last: Mutex<HashMap<Scope, u16>>,
}

impl MemoryAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the last issued sequence for a scope, e.g. when resuming from
    /// persisted state.
    pub fn resume(&self, scope: Scope, last: Sequence) {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scope, last.value());
    }

    /// Returns the last issued sequence for a scope.
    #[must_use]
    pub fn last(&self, scope: &Scope) -> Option<Sequence> {
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        last.get(scope).and_then(|v| Sequence::new(u64::from(*v)))
    }
}

#[async_trait]
impl SequenceAllocator for MemoryAllocator {
    async fn next_sequence(&self, scope: &Scope) -> Result<Sequence, AllocError> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let current = last.get(scope).copied().unwrap_or(0);
        let next = Sequence::new(u64::from(current) + 1).ok_or_else(|| AllocError::Overflow {
            scope: scope.to_string(),
        })?;
        last.insert(*scope, next.value());
        Ok(next)
    }
}

// =============================================================================
// Count-based allocation
// =============================================================================

/// Counts previously issued identifiers that start with a prefix.
#[async_trait]
pub trait PrefixCounter: Send + Sync {
    async fn count_with_prefix(&self, kind: EntityKind, prefix: &str) -> Result<u64, AllocError>;
}

/// Allocates `count + 1`, where `count` is the number of identifiers already
/// issued in the scope.
#[derive(Debug, Clone)]
pub struct CountingAllocator<C> {
    counter: C,
}

impl<C: PrefixCounter> CountingAllocator<C> {
    #[must_use]
    pub fn new(counter: C) -> Self {
        Self { counter }
    }
}

#[async_trait]
impl<C: PrefixCounter> SequenceAllocator for CountingAllocator<C> {
    async fn next_sequence(&self, scope: &Scope) -> Result<Sequence, AllocError> {
        let count = self
            .counter
            .count_with_prefix(scope.issued_kind(), &scope.issued_prefix())
            .await?;
        Sequence::new(count.saturating_add(1)).ok_or_else(|| AllocError::Overflow {
            scope: scope.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn coach_jobs() -> Scope {
        Scope::category(EntityKind::Job, Code::literal(b"CO"))
    }

    #[test]
    fn test_scope_strings() {
        assert_eq!(coach_jobs().to_string(), "JCO");
        assert_eq!(coach_jobs().issued_prefix(), "JCO");

        let parent: JobId = "JCOBAPA001".parse().unwrap();
        let nested = Scope::job(parent);
        assert_eq!(nested.to_string(), "JCOBAPA001");
        assert_eq!(nested.issued_prefix(), "ACOBAPA001");
        assert_eq!(nested.issued_kind(), EntityKind::Application);
    }

    #[tokio::test]
    async fn test_memory_allocator_is_monotonic_per_scope() {
        let allocator = MemoryAllocator::new();
        let bookings = Scope::category(EntityKind::Booking, Code::literal(b"CO"));

        for expected in 1..=5u16 {
            let seq = allocator.next_sequence(&coach_jobs()).await.unwrap();
            assert_eq!(seq.value(), expected);
        }
        assert_eq!(
            allocator.next_sequence(&bookings).await.unwrap(),
            Sequence::FIRST
        );
        assert_eq!(allocator.last(&coach_jobs()), Sequence::new(5));
    }

    #[tokio::test]
    async fn test_memory_allocator_overflow_does_not_advance() {
        let allocator = MemoryAllocator::new();
        allocator.resume(coach_jobs(), Sequence::new(998).unwrap());

        assert_eq!(
            allocator.next_sequence(&coach_jobs()).await.unwrap(),
            Sequence::MAX
        );
        let err = allocator.next_sequence(&coach_jobs()).await.unwrap_err();
        assert!(matches!(err, AllocError::Overflow { ref scope } if scope == "JCO"));
        assert_eq!(allocator.last(&coach_jobs()), Some(Sequence::MAX));
    }

    #[tokio::test]
    async fn test_memory_allocator_concurrent_callers_get_distinct_values() {
        let allocator = Arc::new(MemoryAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let allocator = Arc::clone(&allocator);
            handles.push(tokio::spawn(async move {
                allocator.next_sequence(&coach_jobs()).await.unwrap().value()
            }));
        }

        let mut seen = BTreeSet::new();
        for handle in handles {
            seen.insert(handle.await.unwrap());
        }
        assert_eq!(seen, (1..=64).collect::<BTreeSet<u16>>());
    }

    struct FixedCount(u64);

    #[async_trait]
    impl PrefixCounter for FixedCount {
        async fn count_with_prefix(
            &self,
            _kind: EntityKind,
            _prefix: &str,
        ) -> Result<u64, AllocError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_counting_allocator_returns_count_plus_one() {
        let allocator = CountingAllocator::new(FixedCount(0));
        assert_eq!(
            allocator.next_sequence(&coach_jobs()).await.unwrap(),
            Sequence::FIRST
        );

        let allocator = CountingAllocator::new(FixedCount(41));
        assert_eq!(allocator.next_sequence(&coach_jobs()).await.unwrap().value(), 42);
    }

    #[tokio::test]
    async fn test_counting_allocator_overflows_instead_of_truncating() {
        let allocator = CountingAllocator::new(FixedCount(999));
        let err = allocator.next_sequence(&coach_jobs()).await.unwrap_err();
        assert!(matches!(err, AllocError::Overflow { .. }));
    }
}
