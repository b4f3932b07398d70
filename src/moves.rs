//! Move registry collaborator.
//!
//! The engine never resolves moves itself; it only queries static move data
//! (category, flags, name key) to evaluate restrictions and interception. The
//! dex is built once by the host and is read-only afterwards.

use std::collections::HashMap;
use std::ops::BitOr;

use crate::ids::MoveId;
use crate::types::{ElementType, MoveCategory};

/// Move property flags, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MoveFlags(u16);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    pub const MAKES_CONTACT: MoveFlags = MoveFlags(1 << 0);
    pub const SOUND_BASED: MoveFlags = MoveFlags(1 << 1);
    pub const HEAL_MOVE: MoveFlags = MoveFlags(1 << 2);
    pub const IGNORES_SUBSTITUTE: MoveFlags = MoveFlags(1 << 3);
    pub const IGNORES_PROTECT: MoveFlags = MoveFlags(1 << 4);
    pub const HITS_SEMI_INVULNERABLE: MoveFlags = MoveFlags(1 << 5);

    pub fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MoveFlags {
    type Output = MoveFlags;

    fn bitor(self, rhs: MoveFlags) -> MoveFlags {
        MoveFlags(self.0 | rhs.0)
    }
}

/// Static data for a single move.
#[derive(Debug, Clone)]
pub struct MoveData {
    pub id: MoveId,
    /// Text key for the move's name, resolved by the presentation layer.
    pub name_key: String,
    pub category: MoveCategory,
    pub element: ElementType,
    pub power: u32,
    pub flags: MoveFlags,
}

impl MoveData {
    pub fn new(
        id: MoveId,
        name_key: impl Into<String>,
        category: MoveCategory,
        element: ElementType,
        power: u32,
        flags: MoveFlags,
    ) -> Self {
        Self {
            id,
            name_key: name_key.into(),
            category,
            element,
            power,
            flags,
        }
    }
}

/// Read-only lookup table from move id to move data.
#[derive(Debug, Clone, Default)]
pub struct MoveDex {
    moves: HashMap<MoveId, MoveData>,
}

impl MoveDex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, data: MoveData) {
        self.moves.insert(data.id, data);
    }

    pub fn get(&self, id: MoveId) -> Option<&MoveData> {
        self.moves.get(&id)
    }

    /// Name key for a move, or a placeholder for unknown ids so message
    /// construction never fails.
    pub fn name_key(&self, id: MoveId) -> &str {
        self.get(id).map(|m| m.name_key.as_str()).unwrap_or("move.unknown")
    }

    pub fn is_status(&self, id: MoveId) -> bool {
        self.get(id)
            .is_some_and(|m| m.category == MoveCategory::Status)
    }

    pub fn makes_contact(&self, id: MoveId) -> bool {
        self.has_flag(id, MoveFlags::MAKES_CONTACT)
    }

    pub fn is_sound_based(&self, id: MoveId) -> bool {
        self.has_flag(id, MoveFlags::SOUND_BASED)
    }

    pub fn is_heal_move(&self, id: MoveId) -> bool {
        self.has_flag(id, MoveFlags::HEAL_MOVE)
    }

    pub fn has_flag(&self, id: MoveId, flags: MoveFlags) -> bool {
        self.get(id).is_some_and(|m| m.flags.contains(flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_queries() {
        let mut dex = MoveDex::new();
        dex.register(MoveData::new(
            MoveId(1),
            "move.tackle",
            MoveCategory::Physical,
            ElementType::Normal,
            40,
            MoveFlags::MAKES_CONTACT,
        ));
        dex.register(MoveData::new(
            MoveId(2),
            "move.hyper_voice",
            MoveCategory::Special,
            ElementType::Normal,
            90,
            MoveFlags::SOUND_BASED | MoveFlags::IGNORES_SUBSTITUTE,
        ));

        assert!(dex.makes_contact(MoveId(1)));
        assert!(!dex.is_sound_based(MoveId(1)));
        assert!(dex.is_sound_based(MoveId(2)));
        assert!(dex.has_flag(MoveId(2), MoveFlags::IGNORES_SUBSTITUTE));
    }

    #[test]
    fn test_unknown_move_is_inert() {
        let dex = MoveDex::new();
        assert!(!dex.is_status(MoveId(99)));
        assert!(!dex.makes_contact(MoveId(99)));
        assert_eq!(dex.name_key(MoveId(99)), "move.unknown");
    }
}
