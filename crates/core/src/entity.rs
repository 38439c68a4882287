//! Entity trait: identity + continuity across edits.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Human-facing model key (e.g. `"category"`), used in logs and errors.
    const MODEL: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
