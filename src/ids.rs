//! Identifier newtypes used throughout the engine.
//!
//! Battlers are referenced by stable per-battle ids, never by owning pointers:
//! a tag that needs its originating battler stores a `BattlerId` and resolves
//! it through the battle context at use time. A stale id means the link is
//! severed, not an error.

/// Stable battler identifier, assigned by the battle context arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BattlerId(pub u32);

/// Move identifier, references static move data in the [`MoveDex`].
///
/// [`MoveDex`]: crate::moves::MoveDex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MoveId(pub u16);

/// Ability identifier. The engine never interprets abilities directly; it
/// consults the ability-hook dispatcher with the holder's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AbilityId(pub u16);

impl BattlerId {
    /// Create a battler id from a raw index (for when you need explicit control).
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MoveId {
    pub fn from_raw(id: u16) -> Self {
        Self(id)
    }
}

impl AbilityId {
    pub fn from_raw(id: u16) -> Self {
        Self(id)
    }
}
