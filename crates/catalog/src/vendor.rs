//! Vendors: the selling party behind products, one per user account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainResult, Entity, UserId, VendorId};

use crate::form::{self, Cleaned};

pub const NAME_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    /// Owning account. At most one vendor exists per user.
    pub user_id: UserId,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Vendor {
    pub fn new(id: VendorId, form: Cleaned<VendorForm>, now: DateTime<Utc>) -> Self {
        let form = form.into_inner();
        Self {
            id,
            user_id: form.user_id,
            name: form.name,
            is_active: form.is_active,
            created_at: now,
        }
    }

    pub fn apply(&mut self, form: Cleaned<VendorForm>) {
        let form = form.into_inner();
        self.user_id = form.user_id;
        self.name = form.name;
        self.is_active = form.is_active;
    }
}

impl Entity for Vendor {
    type Id = VendorId;
    const MODEL: &'static str = "vendor";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Vendor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorForm {
    pub user_id: UserId,
    pub name: String,
    /// New vendors start inactive until an operator approves them.
    #[serde(default)]
    pub is_active: bool,
}

impl VendorForm {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            is_active: false,
        }
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    pub fn clean(self) -> DomainResult<Cleaned<Self>> {
        Ok(Cleaned::new(Self {
            user_id: self.user_id,
            name: form::required("name", &self.name, NAME_MAX_LEN)?,
            is_active: self.is_active,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_vendors_default_to_inactive() {
        assert!(!VendorForm::new(UserId::new(1), "Acme").is_active);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(VendorForm::new(UserId::new(1), "  ").clean().is_err());
    }

    #[test]
    fn apply_keeps_created_at() {
        let t0 = Utc::now();
        let mut vendor = Vendor::new(
            VendorId::new(1),
            VendorForm::new(UserId::new(1), "Acme").clean().unwrap(),
            t0,
        );
        vendor.apply(VendorForm::new(UserId::new(1), " Acme Ltd ").active().clean().unwrap());
        assert_eq!(vendor.created_at, t0);
        assert_eq!(vendor.name, "Acme Ltd");
        assert!(vendor.is_active);
        assert_eq!(vendor.to_string(), "Acme Ltd");
    }
}
