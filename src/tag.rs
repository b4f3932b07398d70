//! The tag base protocol: common state, lifecycle hooks, persistence record.
//!
//! A tag is a transient effect attached to one battler. Its common fields live
//! in [`TagState`]; variant-specific fields live in the behavior struct behind
//! the [`TagBehavior`] trait object. The registry in [`crate::tags`] is the
//! kind -> constructor dispatch table.
//!
//! Lifecycle: constructed by the registry, vetted by `can_attach`, installed
//! with `on_attach`, lapsed zero or more times at its registered checkpoints,
//! and removed (firing `on_detach`) when a lapse returns `false` or an external
//! operation detaches it. Every operation completes and returns a value; no
//! errors cross the tag/engine boundary.

use std::fmt;

use crate::battle::BattleContext;
use crate::battler::Battler;
use crate::checkpoint::{Checkpoint, TriggerSet};
use crate::ids::{BattlerId, MoveId};
use crate::messages::MessageEvent;
use crate::moves::MoveDex;
use crate::types::Stat;

/// The closed set of tag kinds.
///
/// Families share behavior structs (every damaging trap is one behavior
/// parameterized by kind), but the kind is what identifies a tag for lookup,
/// duplicate detection, and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    // Damaging traps
    Bind,
    Wrap,
    FireSpin,
    Whirlpool,
    Clamp,
    SandTomb,
    MagmaStorm,
    SnapTrap,
    ThunderCage,
    Infestation,
    Octolocked,
    // Self-damaging / action-denying
    Confused,
    Infatuated,
    Nightmare,
    Flinched,
    Interrupted,
    Powder,
    // Move restrictions
    Disabled,
    Taunted,
    ThroatChopped,
    Imprisoned,
    Tormented,
    HealBlocked,
    Encored,
    CursedBodyLink,
    // Protection
    Protected,
    SpikyShield,
    KingsShield,
    Obstruct,
    SilkTrap,
    BanefulBunker,
    BurningBulwark,
    Enduring,
    SturdyEndure,
    // Draining / chip damage
    Seeded,
    Cursed,
    SaltCured,
    // Substitute and stacking
    Substitute,
    Stockpiling,
    // Semi-invulnerable
    Flying,
    Underground,
    Underwater,
    Hidden,
    // Ability-linked
    SlowStart,
    Truant,
    Unburden,
    Protosynthesis,
    QuarkDrive,
    // Linked / cached
    Commanded,
    // Healing / rooting
    AquaRing,
    Ingrain,
    Roosted,
    Grounded,
    Floating,
    Telekinesis,
    SmackedDown,
    // Countdown effects
    Drowsy,
    PerishSong,
    // Crit manipulation
    FocusEnergy,
    DragonCheer,
    AlwaysCrit,
    LaserFocus,
    // Markers and one-turn states
    Minimized,
    AlwaysGetHit,
    ReceiveDoubleDamage,
    Charging,
    ShellTrap,
    BeakBlastCharging,
    CenterOfAttention,
    Charged,
    HelpingHand,
    Rage,
    DestinyBond,
    Grudge,
    MagicCoat,
    TarShot,
    SyrupBomb,
    Autotomized,
    Whiplash,
    /// Generic fallback for unrecognized persisted kinds.
    None,
}

impl TagKind {
    /// Stable string form used in persistence records.
    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::Bind => "BIND",
            TagKind::Wrap => "WRAP",
            TagKind::FireSpin => "FIRE_SPIN",
            TagKind::Whirlpool => "WHIRLPOOL",
            TagKind::Clamp => "CLAMP",
            TagKind::SandTomb => "SAND_TOMB",
            TagKind::MagmaStorm => "MAGMA_STORM",
            TagKind::SnapTrap => "SNAP_TRAP",
            TagKind::ThunderCage => "THUNDER_CAGE",
            TagKind::Infestation => "INFESTATION",
            TagKind::Octolocked => "OCTOLOCKED",
            TagKind::Confused => "CONFUSED",
            TagKind::Infatuated => "INFATUATED",
            TagKind::Nightmare => "NIGHTMARE",
            TagKind::Flinched => "FLINCHED",
            TagKind::Interrupted => "INTERRUPTED",
            TagKind::Powder => "POWDER",
            TagKind::Disabled => "DISABLED",
            TagKind::Taunted => "TAUNTED",
            TagKind::ThroatChopped => "THROAT_CHOPPED",
            TagKind::Imprisoned => "IMPRISONED",
            TagKind::Tormented => "TORMENTED",
            TagKind::HealBlocked => "HEAL_BLOCKED",
            TagKind::Encored => "ENCORED",
            TagKind::CursedBodyLink => "CURSED_BODY_LINK",
            TagKind::Protected => "PROTECTED",
            TagKind::SpikyShield => "SPIKY_SHIELD",
            TagKind::KingsShield => "KINGS_SHIELD",
            TagKind::Obstruct => "OBSTRUCT",
            TagKind::SilkTrap => "SILK_TRAP",
            TagKind::BanefulBunker => "BANEFUL_BUNKER",
            TagKind::BurningBulwark => "BURNING_BULWARK",
            TagKind::Enduring => "ENDURING",
            TagKind::SturdyEndure => "STURDY_ENDURE",
            TagKind::Seeded => "SEEDED",
            TagKind::Cursed => "CURSED",
            TagKind::SaltCured => "SALT_CURED",
            TagKind::Substitute => "SUBSTITUTE",
            TagKind::Stockpiling => "STOCKPILING",
            TagKind::Flying => "FLYING",
            TagKind::Underground => "UNDERGROUND",
            TagKind::Underwater => "UNDERWATER",
            TagKind::Hidden => "HIDDEN",
            TagKind::SlowStart => "SLOW_START",
            TagKind::Truant => "TRUANT",
            TagKind::Unburden => "UNBURDEN",
            TagKind::Protosynthesis => "PROTOSYNTHESIS",
            TagKind::QuarkDrive => "QUARK_DRIVE",
            TagKind::Commanded => "COMMANDED",
            TagKind::AquaRing => "AQUA_RING",
            TagKind::Ingrain => "INGRAIN",
            TagKind::Roosted => "ROOSTED",
            TagKind::Grounded => "GROUNDED",
            TagKind::Floating => "FLOATING",
            TagKind::Telekinesis => "TELEKINESIS",
            TagKind::SmackedDown => "SMACKED_DOWN",
            TagKind::Drowsy => "DROWSY",
            TagKind::PerishSong => "PERISH_SONG",
            TagKind::FocusEnergy => "FOCUS_ENERGY",
            TagKind::DragonCheer => "DRAGON_CHEER",
            TagKind::AlwaysCrit => "ALWAYS_CRIT",
            TagKind::LaserFocus => "LASER_FOCUS",
            TagKind::Minimized => "MINIMIZED",
            TagKind::AlwaysGetHit => "ALWAYS_GET_HIT",
            TagKind::ReceiveDoubleDamage => "RECEIVE_DOUBLE_DAMAGE",
            TagKind::Charging => "CHARGING",
            TagKind::ShellTrap => "SHELL_TRAP",
            TagKind::BeakBlastCharging => "BEAK_BLAST_CHARGING",
            TagKind::CenterOfAttention => "CENTER_OF_ATTENTION",
            TagKind::Charged => "CHARGED",
            TagKind::HelpingHand => "HELPING_HAND",
            TagKind::Rage => "RAGE",
            TagKind::DestinyBond => "DESTINY_BOND",
            TagKind::Grudge => "GRUDGE",
            TagKind::MagicCoat => "MAGIC_COAT",
            TagKind::TarShot => "TAR_SHOT",
            TagKind::SyrupBomb => "SYRUP_BOMB",
            TagKind::Autotomized => "AUTOTOMIZED",
            TagKind::Whiplash => "WHIPLASH",
            TagKind::None => "NONE",
        }
    }

    /// Parse the stable string form. Unknown strings return `None` so the
    /// registry can apply its generic-fallback policy.
    pub fn parse(s: &str) -> Option<TagKind> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    pub const ALL: [TagKind; 80] = [
        TagKind::Bind,
        TagKind::Wrap,
        TagKind::FireSpin,
        TagKind::Whirlpool,
        TagKind::Clamp,
        TagKind::SandTomb,
        TagKind::MagmaStorm,
        TagKind::SnapTrap,
        TagKind::ThunderCage,
        TagKind::Infestation,
        TagKind::Octolocked,
        TagKind::Confused,
        TagKind::Infatuated,
        TagKind::Nightmare,
        TagKind::Flinched,
        TagKind::Interrupted,
        TagKind::Powder,
        TagKind::Disabled,
        TagKind::Taunted,
        TagKind::ThroatChopped,
        TagKind::Imprisoned,
        TagKind::Tormented,
        TagKind::HealBlocked,
        TagKind::Encored,
        TagKind::CursedBodyLink,
        TagKind::Protected,
        TagKind::SpikyShield,
        TagKind::KingsShield,
        TagKind::Obstruct,
        TagKind::SilkTrap,
        TagKind::BanefulBunker,
        TagKind::BurningBulwark,
        TagKind::Enduring,
        TagKind::SturdyEndure,
        TagKind::Seeded,
        TagKind::Cursed,
        TagKind::SaltCured,
        TagKind::Substitute,
        TagKind::Stockpiling,
        TagKind::Flying,
        TagKind::Underground,
        TagKind::Underwater,
        TagKind::Hidden,
        TagKind::SlowStart,
        TagKind::Truant,
        TagKind::Unburden,
        TagKind::Protosynthesis,
        TagKind::QuarkDrive,
        TagKind::Commanded,
        TagKind::AquaRing,
        TagKind::Ingrain,
        TagKind::Roosted,
        TagKind::Grounded,
        TagKind::Floating,
        TagKind::Telekinesis,
        TagKind::SmackedDown,
        TagKind::Drowsy,
        TagKind::PerishSong,
        TagKind::FocusEnergy,
        TagKind::DragonCheer,
        TagKind::AlwaysCrit,
        TagKind::LaserFocus,
        TagKind::Minimized,
        TagKind::AlwaysGetHit,
        TagKind::ReceiveDoubleDamage,
        TagKind::Charging,
        TagKind::ShellTrap,
        TagKind::BeakBlastCharging,
        TagKind::CenterOfAttention,
        TagKind::Charged,
        TagKind::HelpingHand,
        TagKind::Rage,
        TagKind::DestinyBond,
        TagKind::Grudge,
        TagKind::MagicCoat,
        TagKind::TarShot,
        TagKind::SyrupBomb,
        TagKind::Autotomized,
        TagKind::Whiplash,
        TagKind::None,
    ];
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common fields shared by every tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagState {
    pub kind: TagKind,
    pub trigger_set: TriggerSet,
    /// Countdown semantics vary by variant: most decrement per matching lapse,
    /// turn-count-agnostic tags hold a sentinel `1` and never decrement.
    pub remaining_turns: i32,
    /// The move that created this tag, for flavor text and restriction checks.
    pub source_move: Option<MoveId>,
    /// Weak back-reference to the originating battler, resolved by id at use
    /// time. Absent or stale means the link is severed.
    pub source_id: Option<BattlerId>,
    /// Whether the tag survives a baton-pass-style swap.
    pub carried_on_switch: bool,
}

impl TagState {
    pub fn new(
        kind: TagKind,
        trigger_set: TriggerSet,
        remaining_turns: i32,
        source_move: Option<MoveId>,
        source_id: Option<BattlerId>,
    ) -> Self {
        Self {
            kind,
            trigger_set,
            remaining_turns,
            source_move,
            source_id,
            carried_on_switch: false,
        }
    }

    /// Default countdown: decrement, persist while positive.
    pub fn count_down(&mut self) -> bool {
        self.remaining_turns -= 1;
        self.remaining_turns > 0
    }
}

/// The restriction sub-protocol for tags that forbid selecting or executing
/// moves. Both predicates are pure: the same tag is consulted at selection
/// time (to grey out moves) and at the pre-move checkpoint (to cancel an
/// already-queued move).
pub trait MoveRestriction {
    fn is_move_restricted(&self, move_id: MoveId, user: &Battler, ctx: &BattleContext) -> bool;

    /// Secondary predicate for moves whose restriction depends on the chosen
    /// target.
    fn is_target_restricted(&self, _move_id: MoveId, _user: &Battler, _target: &Battler) -> bool {
        false
    }

    /// Message shown when selection of a restricted move is denied.
    fn selection_denied_text(&self, user: &Battler, move_id: MoveId, dex: &MoveDex)
    -> MessageEvent;

    /// Message shown when a queued move is cancelled at the pre-move
    /// checkpoint. `None` cancels silently.
    fn interrupted_text(
        &self,
        _user: &Battler,
        _move_id: MoveId,
        _dex: &MoveDex,
    ) -> Option<MessageEvent> {
        None
    }
}

/// The base protocol every concrete variant implements.
///
/// Defaults give the "plain countdown marker" behavior; variants override only
/// what they need. Hooks receive the holder by id and the battle context by
/// mutable reference — the tag itself is temporarily detached from the
/// holder's list while a hook runs, so the list the hook observes is
/// consistent.
pub trait TagBehavior: fmt::Debug {
    /// Pre-condition check. No side effects.
    fn can_attach(&self, _state: &TagState, _ctx: &BattleContext, _battler: BattlerId) -> bool {
        true
    }

    /// One-time effect when installed.
    fn on_attach(&mut self, _state: &mut TagState, _ctx: &mut BattleContext, _battler: BattlerId) {}

    /// One-time effect when removed.
    fn on_detach(&mut self, _state: &mut TagState, _ctx: &mut BattleContext, _battler: BattlerId) {}

    /// Invoked on the existing instance when a duplicate attach is attempted.
    fn on_overlap(&mut self, _state: &mut TagState, _ctx: &mut BattleContext, _battler: BattlerId) {
    }

    /// Per-checkpoint behavior. Returns `true` if the tag persists.
    fn lapse(
        &mut self,
        state: &mut TagState,
        _ctx: &mut BattleContext,
        _battler: BattlerId,
        _checkpoint: Checkpoint,
    ) -> bool {
        state.count_down()
    }

    /// Short descriptor key used by UI/messaging.
    fn descriptor_key(&self) -> &'static str {
        ""
    }

    /// Whether the originating battler leaving the field cascade-removes this
    /// tag.
    fn is_linked_to_source(&self) -> bool {
        false
    }

    /// Multiplier this tag applies to the holder's effective stat.
    fn stat_multiplier(&self, _state: &TagState, _holder: &Battler, _stat: Stat) -> f64 {
        1.0
    }

    /// Critical-stage bonus this tag grants the holder.
    fn crit_stage_bonus(&self, _state: &TagState) -> u32 {
        0
    }

    /// The restriction sub-protocol, if this tag implements it.
    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        None
    }

    /// Persist variant-specific fields into the record's extra map.
    #[cfg(feature = "serialization")]
    fn save_extra(&self, _extra: &mut serde_json::Map<String, serde_json::Value>) {}

    /// Restore variant-specific fields from a persisted record. Missing or
    /// wrong-typed fields keep their defaults.
    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, _extra: &serde_json::Map<String, serde_json::Value>) {}

    fn clone_box(&self) -> Box<dyn TagBehavior>;
}

/// A live tag: common state plus the variant behavior.
#[derive(Debug)]
pub struct Tag {
    pub state: TagState,
    behavior: Box<dyn TagBehavior>,
}

impl Clone for Tag {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            behavior: self.behavior.clone_box(),
        }
    }
}

impl Tag {
    pub fn new(state: TagState, behavior: Box<dyn TagBehavior>) -> Self {
        Self { state, behavior }
    }

    pub fn kind(&self) -> TagKind {
        self.state.kind
    }

    pub fn trigger_set(&self) -> TriggerSet {
        self.state.trigger_set
    }

    pub fn can_attach(&self, ctx: &BattleContext, battler: BattlerId) -> bool {
        self.behavior.can_attach(&self.state, ctx, battler)
    }

    pub fn on_attach(&mut self, ctx: &mut BattleContext, battler: BattlerId) {
        self.behavior.on_attach(&mut self.state, ctx, battler);
    }

    pub fn on_detach(&mut self, ctx: &mut BattleContext, battler: BattlerId) {
        self.behavior.on_detach(&mut self.state, ctx, battler);
    }

    pub fn on_overlap(&mut self, ctx: &mut BattleContext, battler: BattlerId) {
        self.behavior.on_overlap(&mut self.state, ctx, battler);
    }

    pub fn lapse(
        &mut self,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        self.behavior.lapse(&mut self.state, ctx, battler, checkpoint)
    }

    pub fn descriptor_key(&self) -> &'static str {
        self.behavior.descriptor_key()
    }

    pub fn is_linked_to_source(&self) -> bool {
        self.behavior.is_linked_to_source()
    }

    pub fn stat_multiplier(&self, holder: &Battler, stat: Stat) -> f64 {
        self.behavior.stat_multiplier(&self.state, holder, stat)
    }

    pub fn crit_stage_bonus(&self) -> u32 {
        self.behavior.crit_stage_bonus(&self.state)
    }

    pub fn restriction(&self) -> Option<&dyn MoveRestriction> {
        self.behavior.as_restriction()
    }

    /// Name key of the originating move, if the dex still knows it.
    pub fn source_move_name<'a>(&self, dex: &'a MoveDex) -> Option<&'a str> {
        self.state.source_move.map(|id| dex.name_key(id))
    }

    /// Direct access to the behavior, for variant-specific queries.
    pub fn behavior(&self) -> &dyn TagBehavior {
        &*self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut dyn TagBehavior {
        &mut *self.behavior
    }

    /// Serialize to the plain persistence record.
    #[cfg(feature = "serialization")]
    pub fn save(&self) -> TagRecord {
        let mut extra = serde_json::Map::new();
        self.behavior.save_extra(&mut extra);
        TagRecord {
            kind: self.state.kind.as_str().to_string(),
            trigger_set: self.state.trigger_set,
            remaining_turns: self.state.remaining_turns,
            source_move: self.state.source_move,
            source_id: self.state.source_id,
            carried_on_switch: self.state.carried_on_switch,
            extra,
        }
    }
}

/// Plain keyed record a tag serializes to for save/resume.
///
/// The kind is stored as its stable string so records written by a newer
/// roster still load (unknown kinds fall back to a generic tag).
#[cfg(feature = "serialization")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TagRecord {
    pub kind: String,
    #[serde(default)]
    pub trigger_set: TriggerSet,
    #[serde(default)]
    pub remaining_turns: i32,
    #[serde(default)]
    pub source_move: Option<MoveId>,
    #[serde(default)]
    pub source_id: Option<BattlerId>,
    #[serde(default)]
    pub carried_on_switch: bool,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Reconstruction failure for a genuinely unrecoverable record. Unknown kinds
/// are not an error: the registry falls back to a generic tag.
#[cfg(feature = "serialization")]
#[derive(Debug, thiserror::Error)]
pub enum TagLoadError {
    #[error("malformed tag record: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in TagKind::ALL {
            assert_eq!(TagKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_kind_string() {
        assert_eq!(TagKind::parse("SOME_FUTURE_TAG"), None);
    }

    #[test]
    fn test_count_down() {
        let mut state = TagState::new(TagKind::None, TriggerSet::EMPTY, 2, None, None);
        assert!(state.count_down());
        assert!(!state.count_down());
    }
}
