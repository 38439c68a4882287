//! Strongly-typed record identifiers.
//!
//! Every catalog table uses an auto-increment integer primary key. The newtypes
//! keep a `ProductId` from being passed where a `VariantId` is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! define_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = i64::from_str(s.trim())
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                if raw <= 0 {
                    return Err(DomainError::invalid_id(format!("{}: must be positive", $name)));
                }
                Ok(Self(raw))
            }
        }
    };
}

define_id!(CategoryId, "CategoryId");
define_id!(VendorId, "VendorId");
define_id!(BrandId, "BrandId");
define_id!(AttributeId, "AttributeId");
define_id!(AttributeValueId, "AttributeValueId");
define_id!(ProductId, "ProductId");
define_id!(VariantId, "VariantId");
define_id!(ImageId, "ImageId");
define_id!(
    /// Identifier of a user account owned by the external auth system.
    UserId,
    "UserId"
);
