//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Licenses and users are both stored as whole collections; lookups by id go
/// through this trait so the store can treat them uniformly.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Index of the entity with `id` in `items`, if present.
pub fn position_of<E: Entity>(items: &[E], id: &E::Id) -> Option<usize> {
    items.iter().position(|e| e.id() == id)
}
