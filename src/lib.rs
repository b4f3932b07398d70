//! A volatile-status engine for turn-based battles.
//!
//! Battlers accumulate *tags* — transient effects such as traps, confusion,
//! protection, move restrictions, or a substitute decoy. Each tag registers
//! the checkpoints it reacts to; the dispatcher sweeps a battler's tags at
//! each checkpoint and a tag decides, per lapse, whether it persists. Tags
//! reference other battlers only by id, so a departed source simply severs
//! the link.
//!
//! The crate is an engine library: move resolution, parties, and presentation
//! are the host's job. The host feeds checkpoints and the in-flight move
//! phase in; the engine hands messages, animation requests, and scheduled
//! phases back.

pub mod abilities;
pub mod battle;
pub mod battler;
pub mod checkpoint;
pub mod damage;
pub mod dispatcher;
pub mod ids;
pub mod messages;
pub mod moves;
pub mod rng;
pub mod tag;
pub mod tags;
pub mod types;

#[cfg(test)]
mod tests;

pub use abilities::{AbilityHook, AbilityHookTable, AbilityHooks, HookOut};
pub use battle::{BattleContext, MovePhase, ScheduledPhase};
pub use battler::Battler;
pub use checkpoint::{Checkpoint, TriggerSet};
pub use dispatcher::{
    attach_tag, check_move_selectable, handle_faint, handle_switch_out, hits_substitute,
    is_target_restricted, is_trapped, is_untargetable, lapse_tag, lapse_tags, remove_tag,
};
pub use ids::{AbilityId, BattlerId, MoveId};
pub use messages::{AnimationEvent, AnimationKind, MessageEvent, PresentationQueue};
pub use moves::{MoveData, MoveDex, MoveFlags};
pub use rng::BattleRng;
pub use tag::{MoveRestriction, Tag, TagBehavior, TagKind, TagState};
#[cfg(feature = "serialization")]
pub use tag::{TagLoadError, TagRecord};
pub use tags::new_tag;
#[cfg(feature = "serialization")]
pub use tags::{load_tag, load_tag_value};
pub use types::{
    ElementType, Gender, MoveCategory, Stat, StatusCondition, TerrainKind, WeatherKind,
};
