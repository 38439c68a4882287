//! Field cleaning shared by the catalog forms.
//!
//! Forms arrive from the admin surface as loosely-typed input. `clean()` on each
//! form trims text, enforces maximum lengths and fills in derived values, so the
//! store only ever persists cleaned data.

use rust_decimal::Decimal;

use storefront_core::slug::{is_valid_slug, slugify};
use storefront_core::{DomainError, DomainResult};

/// Maximum digits (integer + fractional) accepted for money columns.
pub const MONEY_MAX_DIGITS: u32 = 10;
/// Fractional digits kept for money columns.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// A form that passed `clean()`.
///
/// Record constructors only accept cleaned forms, so unvalidated input can't
/// reach storage by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleaned<F>(F);

impl<F> Cleaned<F> {
    pub(crate) fn new(form: F) -> Self {
        Self(form)
    }

    pub fn into_inner(self) -> F {
        self.0
    }
}

impl<F> core::ops::Deref for Cleaned<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

pub(crate) fn required(field: &str, value: &str, max_len: usize) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    check_len(field, value, max_len)?;
    Ok(value.to_string())
}

pub(crate) fn optional(
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> DomainResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            check_len(field, v, max_len)?;
            Ok(Some(v.to_string()))
        }
    }
}

/// Keep an operator-supplied slug as-is, or derive one from `source` when blank.
pub(crate) fn slug_or_derived(
    field: &str,
    slug: &str,
    source: &str,
    max_len: usize,
) -> DomainResult<String> {
    let supplied = slug.trim();
    let slug = if supplied.is_empty() {
        let derived = slugify(source);
        if derived.is_empty() {
            return Err(DomainError::validation(format!(
                "{field} could not be derived from {source:?}; supply one explicitly"
            )));
        }
        derived
    } else {
        if !is_valid_slug(supplied) {
            return Err(DomainError::validation(format!(
                "{field} may only contain letters, digits, hyphens and underscores"
            )));
        }
        supplied.to_string()
    };
    check_len(field, &slug, max_len)?;
    Ok(slug)
}

pub(crate) fn non_negative(field: &str, value: i32) -> DomainResult<i32> {
    if value < 0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(value)
}

/// Validate a money amount against `NUMERIC(10,2)` and normalize its scale.
pub(crate) fn money(field: &str, value: Decimal) -> DomainResult<Decimal> {
    let mut value = value.normalize();
    if value.scale() > MONEY_DECIMAL_PLACES {
        return Err(DomainError::validation(format!(
            "{field} allows at most {MONEY_DECIMAL_PLACES} decimal places"
        )));
    }
    value.rescale(MONEY_DECIMAL_PLACES);
    let limit = Decimal::from(10i64.pow(MONEY_MAX_DIGITS - MONEY_DECIMAL_PLACES));
    if value.abs() >= limit {
        return Err(DomainError::validation(format!(
            "{field} allows at most {} digits before the decimal point",
            MONEY_MAX_DIGITS - MONEY_DECIMAL_PLACES
        )));
    }
    Ok(value)
}

fn check_len(field: &str, value: &str, max_len: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(DomainError::validation(format!(
            "{field} is {len} characters long; at most {max_len} allowed"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Phones ", 10).unwrap(), "Phones");
        assert!(matches!(required("name", "   ", 10), Err(DomainError::Validation(_))));
        assert!(matches!(required("name", "abcdefghijk", 10), Err(DomainError::Validation(_))));
    }

    #[test]
    fn optional_maps_blank_to_none() {
        assert_eq!(optional("icon", Some("  ".into()), 5).unwrap(), None);
        assert_eq!(optional("icon", None, 5).unwrap(), None);
        assert_eq!(optional("icon", Some(" fa ".into()), 5).unwrap(), Some("fa".into()));
    }

    #[test]
    fn slug_is_derived_only_when_blank() {
        assert_eq!(slug_or_derived("slug", "", "Akıllı Saat", 60).unwrap(), "akll-saat");
        assert_eq!(slug_or_derived("slug", "My_Slug", "ignored", 60).unwrap(), "My_Slug");
        assert!(slug_or_derived("slug", "bad slug", "x", 60).is_err());
        assert!(slug_or_derived("slug", "", "???", 60).is_err());
    }

    #[test]
    fn money_is_rescaled_to_cents() {
        let v = money("price", "12.5".parse().unwrap()).unwrap();
        assert_eq!(v.to_string(), "12.50");
        let v = money("price", "3.100".parse().unwrap()).unwrap();
        assert_eq!(v.to_string(), "3.10");
        assert!(money("price", "1.005".parse().unwrap()).is_err());
        assert!(money("price", "100000000".parse().unwrap()).is_err());
        assert!(money("price", "99999999.99".parse().unwrap()).is_ok());
    }
}
