//! Self-damaging and action-denying tags: confusion, infatuation, nightmare.
//!
//! All rolls go through the battle-scoped RNG so outcomes replay under a
//! fixed seed. Confusion self-hits use the standard physical formula at a
//! fixed base power, computed from the holder's own Attack into its own
//! Defense.

use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::damage::{fraction_of_max_hp, standard_physical_damage};
use crate::ids::BattlerId;
use crate::messages::MessageEvent;
use crate::tag::{TagBehavior, TagState};
use crate::types::Stat;

const CONFUSION_SELF_HIT_POWER: u32 = 40;
const CONFUSION_SELF_HIT_CHANCE: u32 = 50;
const INFATUATION_IMMOBILIZE_CHANCE: u32 = 50;

#[derive(Debug, Clone, Default)]
pub struct ConfusedTag;

impl TagBehavior for ConfusedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.confused.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::Move {
            return state.count_down();
        }
        if !state.count_down() {
            enqueue_holder_message(ctx, battler, "tag.confused.removed");
            return false;
        }
        enqueue_holder_message(ctx, battler, "tag.confused.active");
        if ctx.rng.chance(CONFUSION_SELF_HIT_CHANCE) {
            let roll = ctx.rng.range(85, 100);
            let Some(holder) = ctx.battler(battler) else {
                return true;
            };
            let damage = standard_physical_damage(
                holder.level,
                CONFUSION_SELF_HIT_POWER,
                holder.effective_stat(Stat::Atk),
                holder.effective_stat(Stat::Def),
                roll,
            );
            ctx.cancel_current_move();
            if let Some(holder) = ctx.battler_mut(battler) {
                holder.apply_damage(damage);
            }
            enqueue_holder_message(ctx, battler, "tag.confused.self_hit");
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.confused"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Infatuation: gender-gated on attach, linked to its source, and
/// turn-count-agnostic — it only ends when the source leaves the field.
#[derive(Debug, Clone, Default)]
pub struct InfatuatedTag;

impl TagBehavior for InfatuatedTag {
    fn can_attach(&self, state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        let (Some(holder), Some(source)) = (
            ctx.battler(battler),
            state.source_id.and_then(|id| ctx.active_battler(id)),
        ) else {
            return false;
        };
        holder.gender.is_opposite(source.gender)
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.infatuated.added");
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.infatuated.removed");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::Move {
            return true;
        }
        // A severed link ends the infatuation rather than erroring.
        if state
            .source_id
            .and_then(|id| ctx.active_battler(id))
            .is_none()
        {
            return false;
        }
        enqueue_holder_message(ctx, battler, "tag.infatuated.active");
        if ctx.rng.chance(INFATUATION_IMMOBILIZE_CHANCE) {
            ctx.cancel_current_move();
            enqueue_holder_message(ctx, battler, "tag.infatuated.immobilized");
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.infatuated"
    }

    fn is_linked_to_source(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Nightmare: chips a quarter of max HP every turn end while the holder
/// sleeps; ends the moment the holder wakes.
#[derive(Debug, Clone, Default)]
pub struct NightmareTag;

impl TagBehavior for NightmareTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler).is_some_and(|b| b.is_asleep())
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.nightmare.added");
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::TurnEnd {
            return true;
        }
        let Some(holder) = ctx.battler(battler) else {
            return false;
        };
        if !holder.is_asleep() {
            return false;
        }
        let max_hp = holder.max_hp;
        let dealt = ctx.apply_indirect_damage(battler, fraction_of_max_hp(max_hp, 4));
        if dealt > 0 {
            enqueue_holder_message(ctx, battler, "tag.nightmare.hurt");
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.nightmare"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

fn enqueue_holder_message(ctx: &mut BattleContext, battler: BattlerId, key: &str) {
    let Some(holder) = ctx.battler(battler) else {
        return;
    };
    let message = MessageEvent::new(key, vec![holder.name_key.clone()]);
    ctx.queue.enqueue(message);
}
