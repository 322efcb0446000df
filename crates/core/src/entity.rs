//! Entity trait: identity + continuity across state changes.

/// Something with a stable key that outlives any single state change.
///
/// Accounts are keyed by their owner; transaction records by their id.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
