//! Macros for defining the ten-character identifier types.

/// Macro to define a ten-character identifier for a given entity kind.
///
/// This generates a struct holding a [`Locality`](crate::Locality) and a
/// [`Sequence`](crate::Sequence) with:
/// - A `KIND` constant
/// - `new()` to compose from fields
/// - `parse()` to parse from string, rejecting other kinds
/// - `scope()` returning the type+category allocation scope
/// - `Display` and `FromStr` implementations
/// - `Serialize` and `Deserialize` implementations
///
/// # Example
///
/// ```ignore
/// define_local_id!(JobId, EntityKind::Job);
///
/// let id: JobId = "JPLCHVE001".parse()?;
/// assert_eq!(id.sequence().value(), 1);
/// ```
macro_rules! define_local_id {
    ($name:ident, $kind:expr) => {
        /// A fixed-width identifier: prefix, category, city, area, sequence.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            locality: $crate::Locality,
            sequence: $crate::Sequence,
        }

        impl $name {
            /// The entity kind named by this ID type.
            pub const KIND: $crate::EntityKind = $kind;

            /// Composes an ID from its fields.
            #[must_use]
            pub const fn new(locality: $crate::Locality, sequence: $crate::Sequence) -> Self {
                Self { locality, sequence }
            }

            /// Returns the category, city and area codes.
            #[must_use]
            pub const fn locality(&self) -> $crate::Locality {
                self.locality
            }

            /// Returns the sequence number within the category scope.
            #[must_use]
            pub const fn sequence(&self) -> $crate::Sequence {
                self.sequence
            }

            /// Returns the scope this ID's sequence was allocated in.
            #[must_use]
            pub fn scope(&self) -> $crate::Scope {
                $crate::Scope::category(Self::KIND, self.locality.category)
            }

            /// Parses an ID from a string.
            ///
            /// The string must be exactly ten characters: the kind prefix,
            /// three two-letter codes and a three-digit sequence.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                let kind = $crate::types::leading_kind(s)?;
                if kind != Self::KIND {
                    return Err($crate::IdError::WrongKind {
                        expected: Self::KIND,
                        actual: kind,
                    });
                }

                let (body, sequence) = s.as_bytes()[1..].split_at($crate::Locality::WIDTH);
                let locality = $crate::Locality::parse_bytes(body)?;
                let sequence = $crate::types::parse_sequence(sequence, "sequence")?;

                Ok(Self { locality, sequence })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}{}", Self::KIND.prefix(), self.locality, self.sequence)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use define_local_id;
