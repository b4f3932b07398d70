//! The tag registry: kind -> behavior construction, family predicates, and
//! record reconstruction.
//!
//! Construction is the only place that knows which behavior struct and which
//! trigger set a kind gets. Everything downstream (the dispatcher, persistence)
//! works through [`crate::tag::Tag`].

mod ability_linked;
mod confusion;
mod misc;
mod protection;
mod restriction;
mod seeding;
mod semi_invulnerable;
mod stockpile;
mod substitute;
mod trapping;

pub use ability_linked::{BoostCondition, HighestStatBoostTag, SlowStartTag, TruantTag, UnburdenTag};
pub use confusion::{ConfusedTag, InfatuatedTag, NightmareTag};
pub use misc::{
    AutotomizedTag, BeakBlastChargingTag, CommandedTag, CritBoostTag, DestinyBondTag, DrowsyTag,
    FlinchedTag, GrudgeTag, InterruptedTag, MarkerTag, PerishSongTag, PowderTag, RageTag,
    RoostedTag, RootedHealTag, ShellTrapTag, SmackedDownTag, SyrupBombTag, TelekinesisTag,
};
pub use protection::{ContactPunish, EnduringTag, ProtectedTag};
pub use restriction::{
    DisabledTag, EncoredTag, HealBlockedTag, ImprisonedTag, TauntedTag, ThroatChoppedTag,
    TormentedTag,
};
pub use seeding::{CursedTag, SaltCuredTag, SeededTag};
pub use semi_invulnerable::SemiInvulnerableTag;
pub use stockpile::{StockpilingTag, MAX_STOCKPILE_STACKS};
pub use substitute::SubstituteTag;
pub use trapping::{DamagingTrapTag, OctolockedTag};

use crate::checkpoint::{Checkpoint, TriggerSet};
use crate::ids::{BattlerId, MoveId};
use crate::tag::{Tag, TagBehavior, TagKind, TagState};
use crate::types::{Stat, StatusCondition};

#[cfg(feature = "serialization")]
use crate::tag::{TagLoadError, TagRecord};

/// Whether a kind belongs to the damaging-trap family (mutually exclusive,
/// switch-pinning, turn-end chip damage).
pub fn is_damaging_trap(kind: TagKind) -> bool {
    matches!(
        kind,
        TagKind::Bind
            | TagKind::Wrap
            | TagKind::FireSpin
            | TagKind::Whirlpool
            | TagKind::Clamp
            | TagKind::SandTomb
            | TagKind::MagmaStorm
            | TagKind::SnapTrap
            | TagKind::ThunderCage
            | TagKind::Infestation
    )
}

/// Whether a kind takes the holder off the field mid-move.
pub fn is_semi_invulnerable(kind: TagKind) -> bool {
    matches!(
        kind,
        TagKind::Flying | TagKind::Underground | TagKind::Underwater | TagKind::Hidden
    )
}

const SWEEP_RESTRICTION: TriggerSet =
    TriggerSet::of(&[Checkpoint::PreMove, Checkpoint::TurnEnd]);
const SWEEP_TURN_END: TriggerSet = TriggerSet::of(&[Checkpoint::TurnEnd]);
const SWEEP_PROTECTION: TriggerSet = TriggerSet::of(&[Checkpoint::Custom, Checkpoint::TurnEnd]);

/// Construct a live tag for `kind`.
///
/// `turns` is the initial countdown; variants that never self-expire ignore
/// it. The trigger set assigned here is the complete list of checkpoints the
/// kind reacts to.
pub fn new_tag(
    kind: TagKind,
    turns: i32,
    source_move: Option<MoveId>,
    source_id: Option<BattlerId>,
) -> Tag {
    let (behavior, triggers): (Box<dyn TagBehavior>, TriggerSet) = match kind {
        TagKind::Bind
        | TagKind::Wrap
        | TagKind::FireSpin
        | TagKind::Whirlpool
        | TagKind::Clamp
        | TagKind::SandTomb
        | TagKind::MagmaStorm
        | TagKind::SnapTrap
        | TagKind::ThunderCage
        | TagKind::Infestation => (Box::new(DamagingTrapTag::new(kind)), SWEEP_TURN_END),
        TagKind::Octolocked => (Box::new(OctolockedTag), SWEEP_TURN_END),

        TagKind::Confused => (
            Box::new(ConfusedTag),
            TriggerSet::of(&[Checkpoint::Move]),
        ),
        TagKind::Infatuated => (
            Box::new(InfatuatedTag),
            TriggerSet::of(&[Checkpoint::Move]),
        ),
        TagKind::Nightmare => (Box::new(NightmareTag), SWEEP_TURN_END),
        TagKind::Flinched => (
            Box::new(FlinchedTag),
            TriggerSet::of(&[Checkpoint::PreMove, Checkpoint::TurnEnd]),
        ),
        TagKind::Interrupted => (
            Box::new(InterruptedTag),
            TriggerSet::of(&[Checkpoint::PreMove, Checkpoint::TurnEnd]),
        ),
        TagKind::Powder => (
            Box::new(PowderTag),
            TriggerSet::of(&[Checkpoint::PreMove, Checkpoint::TurnEnd]),
        ),

        TagKind::Disabled | TagKind::CursedBodyLink => {
            (Box::new(DisabledTag::default()), SWEEP_RESTRICTION)
        }
        TagKind::Taunted => (Box::new(TauntedTag), SWEEP_RESTRICTION),
        TagKind::ThroatChopped => (Box::new(ThroatChoppedTag), SWEEP_RESTRICTION),
        TagKind::Imprisoned => (Box::new(ImprisonedTag::default()), SWEEP_RESTRICTION),
        TagKind::Tormented => (
            Box::new(TormentedTag),
            TriggerSet::of(&[Checkpoint::PreMove]),
        ),
        TagKind::HealBlocked => (Box::new(HealBlockedTag), SWEEP_RESTRICTION),
        TagKind::Encored => (Box::new(EncoredTag::default()), SWEEP_RESTRICTION),

        TagKind::Protected => (
            Box::new(ProtectedTag::new(kind, ContactPunish::None)),
            SWEEP_PROTECTION,
        ),
        TagKind::SpikyShield => (
            Box::new(ProtectedTag::new(kind, ContactPunish::Recoil { denominator: 8 })),
            SWEEP_PROTECTION,
        ),
        TagKind::KingsShield => (
            Box::new(ProtectedTag::new(
                kind,
                ContactPunish::StatDrop {
                    drops: vec![(Stat::Atk, -1)],
                },
            )),
            SWEEP_PROTECTION,
        ),
        TagKind::Obstruct => (
            Box::new(ProtectedTag::new(
                kind,
                ContactPunish::StatDrop {
                    drops: vec![(Stat::Def, -2)],
                },
            )),
            SWEEP_PROTECTION,
        ),
        TagKind::SilkTrap => (
            Box::new(ProtectedTag::new(
                kind,
                ContactPunish::StatDrop {
                    drops: vec![(Stat::Spd, -1)],
                },
            )),
            SWEEP_PROTECTION,
        ),
        TagKind::BanefulBunker => (
            Box::new(ProtectedTag::new(
                kind,
                ContactPunish::Status(StatusCondition::Poison),
            )),
            SWEEP_PROTECTION,
        ),
        TagKind::BurningBulwark => (
            Box::new(ProtectedTag::new(
                kind,
                ContactPunish::Status(StatusCondition::Burn),
            )),
            SWEEP_PROTECTION,
        ),
        TagKind::Enduring => (Box::new(EnduringTag::new(false)), SWEEP_PROTECTION),
        TagKind::SturdyEndure => (Box::new(EnduringTag::new(true)), SWEEP_PROTECTION),

        TagKind::Seeded => (Box::new(SeededTag), SWEEP_TURN_END),
        TagKind::Cursed => (Box::new(CursedTag), SWEEP_TURN_END),
        TagKind::SaltCured => (Box::new(SaltCuredTag), SWEEP_TURN_END),

        TagKind::Substitute => (
            Box::new(SubstituteTag::default()),
            TriggerSet::of(&[Checkpoint::PreMove, Checkpoint::AfterMove, Checkpoint::Hit]),
        ),
        TagKind::Stockpiling => (Box::new(StockpilingTag::default()), TriggerSet::EMPTY),

        TagKind::Flying | TagKind::Underground | TagKind::Underwater | TagKind::Hidden => (
            Box::new(SemiInvulnerableTag),
            TriggerSet::of(&[Checkpoint::MoveEffect]),
        ),

        TagKind::SlowStart => (Box::new(SlowStartTag::default()), SWEEP_TURN_END),
        TagKind::Truant => (
            Box::new(TruantTag::default()),
            TriggerSet::of(&[Checkpoint::Move]),
        ),
        TagKind::Unburden => (Box::new(UnburdenTag::default()), SWEEP_TURN_END),
        TagKind::Protosynthesis => (
            Box::new(HighestStatBoostTag::new(BoostCondition::Sunlight)),
            TriggerSet::of(&[Checkpoint::Custom]),
        ),
        TagKind::QuarkDrive => (
            Box::new(HighestStatBoostTag::new(BoostCondition::ElectricTerrain)),
            TriggerSet::of(&[Checkpoint::Custom]),
        ),

        TagKind::Commanded => (
            Box::new(CommandedTag::default()),
            TriggerSet::of(&[Checkpoint::Custom]),
        ),

        TagKind::AquaRing => (Box::new(RootedHealTag::new("tag.aqua_ring")), SWEEP_TURN_END),
        TagKind::Ingrain => (Box::new(RootedHealTag::new("tag.ingrain")), SWEEP_TURN_END),
        TagKind::Roosted => (Box::new(RoostedTag::default()), SWEEP_TURN_END),
        TagKind::Grounded => (Box::new(MarkerTag::new("tag.grounded")), TriggerSet::EMPTY),
        TagKind::Floating => (Box::new(MarkerTag::new("tag.floating")), TriggerSet::EMPTY),
        TagKind::Telekinesis => (Box::new(TelekinesisTag), SWEEP_TURN_END),
        TagKind::SmackedDown => (Box::new(SmackedDownTag), TriggerSet::EMPTY),

        TagKind::Drowsy => (Box::new(DrowsyTag), SWEEP_TURN_END),
        TagKind::PerishSong => (Box::new(PerishSongTag), SWEEP_TURN_END),

        TagKind::FocusEnergy => (
            Box::new(CritBoostTag::new(2, "tag.focus_energy")),
            TriggerSet::EMPTY,
        ),
        TagKind::DragonCheer => (
            Box::new(CritBoostTag::new(1, "tag.dragon_cheer")),
            TriggerSet::EMPTY,
        ),
        TagKind::AlwaysCrit => (
            Box::new(CritBoostTag::new(3, "tag.always_crit")),
            TriggerSet::EMPTY,
        ),
        TagKind::LaserFocus => (
            Box::new(CritBoostTag::new(3, "tag.laser_focus")),
            SWEEP_TURN_END,
        ),

        TagKind::Minimized => (Box::new(MarkerTag::new("tag.minimized")), TriggerSet::EMPTY),
        TagKind::AlwaysGetHit => (
            Box::new(MarkerTag::new("tag.always_get_hit")),
            TriggerSet::of(&[Checkpoint::PreMove]),
        ),
        TagKind::ReceiveDoubleDamage => (
            Box::new(MarkerTag::new("tag.receive_double_damage")),
            TriggerSet::of(&[Checkpoint::PreMove]),
        ),
        TagKind::Charging => (Box::new(MarkerTag::new("tag.charging")), TriggerSet::EMPTY),
        TagKind::ShellTrap => (
            Box::new(ShellTrapTag::default()),
            TriggerSet::of(&[Checkpoint::Hit, Checkpoint::TurnEnd]),
        ),
        TagKind::BeakBlastCharging => (
            Box::new(BeakBlastChargingTag),
            TriggerSet::of(&[Checkpoint::Hit, Checkpoint::TurnEnd]),
        ),
        TagKind::CenterOfAttention => (
            Box::new(MarkerTag::new("tag.center_of_attention")),
            SWEEP_TURN_END,
        ),
        TagKind::Charged => (Box::new(MarkerTag::new("tag.charged")), TriggerSet::EMPTY),
        TagKind::HelpingHand => (
            Box::new(MarkerTag::new("tag.helping_hand")),
            SWEEP_TURN_END,
        ),
        TagKind::Rage => (
            Box::new(RageTag),
            TriggerSet::of(&[Checkpoint::AfterHit]),
        ),
        TagKind::DestinyBond => (Box::new(DestinyBondTag), SWEEP_PROTECTION),
        TagKind::Grudge => (Box::new(GrudgeTag), SWEEP_PROTECTION),
        TagKind::MagicCoat => (Box::new(MarkerTag::new("tag.magic_coat")), SWEEP_TURN_END),
        TagKind::TarShot => (Box::new(MarkerTag::new("tag.tar_shot")), TriggerSet::EMPTY),
        TagKind::SyrupBomb => (Box::new(SyrupBombTag), SWEEP_TURN_END),
        TagKind::Autotomized => (Box::new(AutotomizedTag), TriggerSet::EMPTY),
        TagKind::Whiplash => (Box::new(MarkerTag::new("tag.whiplash")), SWEEP_TURN_END),
        TagKind::None => (Box::new(MarkerTag::new("tag.none")), TriggerSet::EMPTY),
    };

    let mut state = TagState::new(kind, triggers, turns, source_move, source_id);
    state.carried_on_switch = carried_on_switch(kind);
    Tag::new(state, behavior)
}

/// Kinds that survive a baton-pass-style swap.
fn carried_on_switch(kind: TagKind) -> bool {
    matches!(
        kind,
        TagKind::Substitute
            | TagKind::AquaRing
            | TagKind::Ingrain
            | TagKind::FocusEnergy
            | TagKind::DragonCheer
            | TagKind::Seeded
            | TagKind::Cursed
            | TagKind::PerishSong
            | TagKind::Confused
    )
}

/// Reconstruct a tag from a persisted record.
///
/// An unknown kind string is not an error: the record is noted and a generic
/// inert tag stands in, so a save written by a newer roster still loads.
#[cfg(feature = "serialization")]
pub fn load_tag(record: &TagRecord) -> Tag {
    let Some(kind) = TagKind::parse(&record.kind) else {
        tracing::warn!(kind = %record.kind, "unknown tag kind in record, using generic tag");
        let mut tag = new_tag(TagKind::None, record.remaining_turns, record.source_move, record.source_id);
        tag.state.carried_on_switch = record.carried_on_switch;
        return tag;
    };
    let mut tag = new_tag(kind, record.remaining_turns, record.source_move, record.source_id);
    if !record.trigger_set.is_empty() {
        tag.state.trigger_set = record.trigger_set;
    }
    tag.state.carried_on_switch = record.carried_on_switch;
    tag.behavior_mut().load_extra(&record.extra);
    tag
}

/// Reconstruct a tag from a raw JSON value.
#[cfg(feature = "serialization")]
pub fn load_tag_value(value: serde_json::Value) -> Result<Tag, TagLoadError> {
    let record: TagRecord = serde_json::from_value(value)?;
    Ok(load_tag(&record))
}
