//! The remaining tag families: one-turn interrupts, countdown effects, crit
//! boosts, rooting heals, form/weight changes, and plain markers.
//!
//! Markers carry no behavior of their own; their lifetime comes entirely from
//! the trigger set and turn count the registry assigns. Anything with real
//! logic gets its own behavior struct.

use crate::abilities::AbilityHook;
use crate::battle::{BattleContext, ScheduledPhase};
use crate::checkpoint::Checkpoint;
use crate::damage::fraction_of_max_hp;
use crate::ids::BattlerId;
use crate::messages::MessageEvent;
use crate::tag::{TagBehavior, TagKind, TagState};
use crate::types::{ElementType, Stat, StatusCondition};

/// A tag with no behavior beyond its registered lifetime.
#[derive(Debug, Clone)]
pub struct MarkerTag {
    key: &'static str,
}

impl MarkerTag {
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl TagBehavior for MarkerTag {
    fn descriptor_key(&self) -> &'static str {
        self.key
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Flinching: the next move this turn is cancelled. An on-flinch ability hook
/// (steadfast-style) turns the lost turn into a Speed boost.
#[derive(Debug, Clone, Default)]
pub struct FlinchedTag;

impl TagBehavior for FlinchedTag {
    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        match checkpoint {
            Checkpoint::PreMove => {
                ctx.cancel_current_move();
                enqueue_holder_message(ctx, battler, "tag.flinched.active");
                if ctx.apply_ability_hook(AbilityHook::OnFlinch, battler)
                    && let Some(holder) = ctx.battler_mut(battler)
                {
                    holder.change_stat_stage(Stat::Spd, 1);
                }
                false
            }
            Checkpoint::TurnEnd => false,
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.flinched"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Powder: coats the holder for the turn; igniting a Fire-type move backfires
/// for a quarter of max HP instead of executing.
#[derive(Debug, Clone, Default)]
pub struct PowderTag;

impl TagBehavior for PowderTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.powder.added");
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        match checkpoint {
            Checkpoint::PreMove => {
                let is_fire = ctx
                    .current_move()
                    .and_then(|phase| ctx.dex.get(phase.move_id))
                    .is_some_and(|data| data.element == ElementType::Fire);
                if is_fire {
                    ctx.cancel_current_move();
                    let Some(max_hp) = ctx.battler(battler).map(|b| b.max_hp) else {
                        return false;
                    };
                    ctx.apply_indirect_damage(battler, fraction_of_max_hp(max_hp, 4));
                    enqueue_holder_message(ctx, battler, "tag.powder.ignited");
                }
                true
            }
            Checkpoint::TurnEnd => false,
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.powder"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Commanding pair: the holder is steered by an ally riding it. All battle
/// stats jump two stages on attach; the pairing dissolves when the commander
/// leaves the field.
#[derive(Debug, Clone, Default)]
pub struct CommandedTag {
    form_key: String,
}

impl CommandedTag {
    pub fn form_key(&self) -> &str {
        &self.form_key
    }
}

impl TagBehavior for CommandedTag {
    fn on_attach(&mut self, state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        self.form_key = state
            .source_id
            .and_then(|id| ctx.battler(id))
            .map(|b| b.name_key.clone())
            .unwrap_or_default();
        if let Some(holder) = ctx.battler_mut(battler) {
            for stat in Stat::BATTLE {
                holder.change_stat_stage(stat, 2);
            }
        }
        enqueue_holder_message(ctx, battler, "tag.commanded.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        _battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::Custom {
            return true;
        }
        state
            .source_id
            .and_then(|id| ctx.active_battler(id))
            .is_some()
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.commanded"
    }

    fn is_linked_to_source(&self) -> bool {
        true
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("formKey".into(), self.form_key.clone().into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(key) = extra.get("formKey").and_then(|v| v.as_str()) {
            self.form_key = key.to_string();
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Raised critical-hit stage (focus energy and friends). Lifetime comes from
/// the registry's trigger set; the behavior only contributes the bonus.
#[derive(Debug, Clone)]
pub struct CritBoostTag {
    stages: u32,
    key: &'static str,
}

impl CritBoostTag {
    pub fn new(stages: u32, key: &'static str) -> Self {
        Self { stages, key }
    }
}

impl TagBehavior for CritBoostTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.crit_boost.added");
    }

    fn descriptor_key(&self) -> &'static str {
        self.key
    }

    fn crit_stage_bonus(&self, _state: &TagState) -> u32 {
        self.stages
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Aqua ring / ingrain: restores a sixteenth of max HP at every turn end.
/// Ingrain additionally pins the holder (the dispatcher's trap query keys on
/// the kind).
#[derive(Debug, Clone)]
pub struct RootedHealTag {
    key: &'static str,
}

impl RootedHealTag {
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl TagBehavior for RootedHealTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        let message =
            MessageEvent::new(format!("{}.added", self.key), vec![holder.name_key.clone()]);
        ctx.queue.enqueue(message);
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
        let Some(holder) = ctx.battler_mut(battler) else {
            return false;
        };
        let amount = fraction_of_max_hp(holder.max_hp, 16);
        if holder.heal(amount) > 0 {
            let message =
                MessageEvent::new(format!("{}.healed", self.key), vec![holder.name_key.clone()]);
            ctx.queue.enqueue(message);
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        self.key
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Drowsiness: two turn ends later, the holder falls asleep. The sleep itself
/// is a scheduled phase so status application never reenters a lapse pass.
#[derive(Debug, Clone, Default)]
pub struct DrowsyTag;

impl TagBehavior for DrowsyTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.drowsy.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::TurnEnd {
            return true;
        }
        if state.count_down() {
            return true;
        }
        ctx.schedule_phase(ScheduledPhase::ApplyStatus {
            battler,
            status: StatusCondition::Sleep,
        });
        false
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.drowsy"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Perish song: counts down aloud each turn end and schedules the holder's
/// faint when it reaches zero.
#[derive(Debug, Clone, Default)]
pub struct PerishSongTag;

impl TagBehavior for PerishSongTag {
    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::TurnEnd {
            return true;
        }
        let persists = state.count_down();
        if let Some(holder) = ctx.battler(battler) {
            let message = MessageEvent::new(
                "tag.perish_song.count",
                vec![
                    holder.name_key.clone(),
                    state.remaining_turns.max(0).to_string(),
                ],
            );
            ctx.queue.enqueue(message);
        }
        if !persists {
            ctx.schedule_phase(ScheduledPhase::Faint { battler });
        }
        persists
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.perish_song"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Roosting: the holder lands for the turn, shedding its Flying type until
/// the tag lifts at turn end.
#[derive(Debug, Clone, Default)]
pub struct RoostedTag {
    removed_flying: bool,
}

impl TagBehavior for RoostedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        if let Some(holder) = ctx.battler_mut(battler) {
            self.removed_flying = holder.remove_type(ElementType::Flying);
        }
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        if self.removed_flying
            && let Some(holder) = ctx.battler_mut(battler)
        {
            holder.add_type(ElementType::Flying);
        }
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        _ctx: &mut BattleContext,
        _battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        checkpoint != Checkpoint::TurnEnd
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.roosted"
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("removedFlying".into(), self.removed_flying.into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(flag) = extra.get("removedFlying").and_then(|v| v.as_bool()) {
            self.removed_flying = flag;
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Smack down: grounds the holder, knocking it out of airborne states.
#[derive(Debug, Clone, Default)]
pub struct SmackedDownTag;

impl TagBehavior for SmackedDownTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        crate::dispatcher::find_and_remove_tags(ctx, battler, |t| {
            matches!(t.kind(), TagKind::Flying | TagKind::Telekinesis | TagKind::Floating)
        });
        enqueue_holder_message(ctx, battler, "tag.smacked_down.added");
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.smacked_down"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

const MIN_WEIGHT_KG: f32 = 0.1;

/// Autotomize: each application sheds 100 kg, to a floor.
#[derive(Debug, Clone, Default)]
pub struct AutotomizedTag;

impl AutotomizedTag {
    fn shed(&self, ctx: &mut BattleContext, battler: BattlerId) {
        if let Some(holder) = ctx.battler_mut(battler) {
            holder.weight_kg = (holder.weight_kg - 100.0).max(MIN_WEIGHT_KG);
        }
        enqueue_holder_message(ctx, battler, "tag.autotomized.added");
    }
}

impl TagBehavior for AutotomizedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        self.shed(ctx, battler);
    }

    fn on_overlap(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        self.shed(ctx, battler);
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.autotomized"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Shell trap: a primed counterattack. Taking a hit promotes the holder's
/// pending move to run immediately next.
#[derive(Debug, Clone, Default)]
pub struct ShellTrapTag {
    sprung: bool,
}

impl TagBehavior for ShellTrapTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.shell_trap.added");
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        match checkpoint {
            Checkpoint::Hit => {
                if !self.sprung {
                    self.sprung = true;
                    ctx.promote_pending_move(battler);
                }
                true
            }
            Checkpoint::TurnEnd => false,
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.shell_trap"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Beak blast charge: contact with the heated beak burns the attacker. The
/// burn is a scheduled phase, applied after the current hit resolves.
#[derive(Debug, Clone, Default)]
pub struct BeakBlastChargingTag;

impl TagBehavior for BeakBlastChargingTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.beak_blast.charging");
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        _battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        match checkpoint {
            Checkpoint::Hit => {
                if let Some(phase) = ctx.current_move()
                    && ctx.dex.makes_contact(phase.move_id)
                {
                    let attacker = phase.user;
                    ctx.schedule_phase(ScheduledPhase::ApplyStatus {
                        battler: attacker,
                        status: StatusCondition::Burn,
                    });
                }
                true
            }
            Checkpoint::TurnEnd => false,
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.beak_blast"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Destiny bond: if the holder is felled by a direct hit this turn, the
/// attacker goes down with it (as a scheduled faint).
#[derive(Debug, Clone, Default)]
pub struct DestinyBondTag;

impl TagBehavior for DestinyBondTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.destiny_bond.added");
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        match checkpoint {
            Checkpoint::Custom => {
                if let Some(phase) = ctx.current_move()
                    && phase.user != battler
                {
                    let attacker = phase.user;
                    ctx.schedule_phase(ScheduledPhase::Faint { battler: attacker });
                    enqueue_holder_message(ctx, battler, "tag.destiny_bond.triggered");
                }
                false
            }
            Checkpoint::TurnEnd => false,
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.destiny_bond"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Grudge: announces the felling move so the presentation layer can exact its
/// price; the engine itself does not track PP.
#[derive(Debug, Clone, Default)]
pub struct GrudgeTag;

impl TagBehavior for GrudgeTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.grudge.added");
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        match checkpoint {
            Checkpoint::Custom => {
                if let Some(phase) = ctx.current_move()
                    && phase.user != battler
                {
                    let move_key = ctx.dex.name_key(phase.move_id).to_string();
                    let params = match ctx.battler(battler) {
                        Some(holder) => vec![holder.name_key.clone(), move_key],
                        None => vec![move_key],
                    };
                    ctx.queue
                        .enqueue(MessageEvent::new("tag.grudge.triggered", params));
                }
                false
            }
            Checkpoint::TurnEnd => false,
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.grudge"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Rage: every hit taken while raging feeds the holder's Attack.
#[derive(Debug, Clone, Default)]
pub struct RageTag;

impl TagBehavior for RageTag {
    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::AfterHit {
            return true;
        }
        if let Some(holder) = ctx.battler_mut(battler)
            && holder.change_stat_stage(Stat::Atk, 1)
        {
            let message = MessageEvent::new("tag.rage.building", vec![holder.name_key.clone()]);
            ctx.queue.enqueue(message);
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.rage"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Syrup bomb: the holder's Speed drips away each turn end while the thrower
/// remains on the field.
#[derive(Debug, Clone, Default)]
pub struct SyrupBombTag;

impl TagBehavior for SyrupBombTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.syrup_bomb.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::TurnEnd {
            return true;
        }
        if state
            .source_id
            .and_then(|id| ctx.active_battler(id))
            .is_none()
        {
            return false;
        }
        if let Some(holder) = ctx.battler_mut(battler) {
            holder.change_stat_stage(Stat::Spd, -1);
        }
        enqueue_holder_message(ctx, battler, "tag.syrup_bomb.dripping");
        state.count_down()
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.syrup_bomb"
    }

    fn is_linked_to_source(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// A charge-up move knocked out of the holder mid-wind-up: the queued action
/// is cancelled silently and the charge marker is cleared.
#[derive(Debug, Clone, Default)]
pub struct InterruptedTag;

impl TagBehavior for InterruptedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        crate::dispatcher::find_and_remove_tags(ctx, battler, |t| t.kind() == TagKind::Charging);
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        _battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        match checkpoint {
            Checkpoint::PreMove => {
                ctx.cancel_current_move();
                false
            }
            Checkpoint::TurnEnd => false,
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.interrupted"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Telekinesis: the holder floats helplessly and every move connects while it
/// hangs there.
#[derive(Debug, Clone, Default)]
pub struct TelekinesisTag;

impl TagBehavior for TelekinesisTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler)
            .is_some_and(|b| !b.has_tag(TagKind::Ingrain) && !b.has_tag(TagKind::SmackedDown))
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.telekinesis.added");
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.telekinesis"
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
