use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw numeric identifier.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// The raw numeric value.
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// The identifier immediately following this one.
            pub const fn next(&self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            /// Accepts either the bare number or the prefixed form (`b:7`).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.trim();
                let digits = digits.strip_prefix($prefix).unwrap_or(digits);
                digits.parse::<u64>().map(Self).map_err(|_| TypeError::InvalidId {
                    kind: $kind,
                    input: s.to_string(),
                })
            }
        }
    };
}

numeric_id!(
    /// Identifier of a bucket, the namespace that groups catalog objects.
    BucketId,
    "bucket",
    "b:"
);

numeric_id!(
    /// System-wide identifier of a catalog object.
    CatalogObjectId,
    "catalog object",
    "o:"
);

numeric_id!(
    /// Identifier of one revision within a catalog object.
    ///
    /// Revision ids increase monotonically per object and are never reissued.
    RevisionId,
    "revision",
    "r:"
);
