//! The substitute: a decoy with its own HP pool that intercepts direct hits.
//!
//! Creation costs a quarter of max HP, which becomes the decoy's pool. While
//! the decoy stands, the hit checkpoint routes the pending damage of the
//! in-flight move into the pool instead of the holder; the pool running dry
//! removes the tag. Sound-based moves, flagged bypass moves, and the bypass
//! ability hook skip the decoy entirely (see the dispatcher's interception
//! query).

use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::damage::fraction_of_max_hp;
use crate::ids::BattlerId;
use crate::messages::{AnimationKind, MessageEvent};
use crate::tag::{TagBehavior, TagState};
use crate::tags::is_damaging_trap;

#[derive(Debug, Clone, Default)]
pub struct SubstituteTag {
    hp: u32,
    in_focus: bool,
}

impl SubstituteTag {
    /// Remaining HP of the decoy.
    pub fn remaining_hp(&self) -> u32 {
        self.hp
    }

    /// Whether the decoy is foregrounded for the in-flight move's visuals.
    pub fn in_focus(&self) -> bool {
        self.in_focus
    }
}

impl TagBehavior for SubstituteTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler)
            .is_some_and(|b| b.hp > fraction_of_max_hp(b.max_hp, 4))
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler_mut(battler) else {
            return;
        };
        let cost = fraction_of_max_hp(holder.max_hp, 4);
        holder.apply_damage(cost);
        self.hp = cost;
        let name = holder.name_key.clone();
        // The decoy frees its holder from any damaging trap.
        crate::dispatcher::find_and_remove_tags(ctx, battler, |t| is_damaging_trap(t.kind()));
        ctx.queue
            .enqueue(MessageEvent::new("tag.substitute.added", vec![name]));
        ctx.queue.enqueue_animation(
            AnimationKind::TagIntro(crate::tag::TagKind::Substitute),
            vec![battler],
        );
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        let message = MessageEvent::new("tag.substitute.faded", vec![holder.name_key.clone()]);
        ctx.queue.enqueue(message);
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
                self.in_focus = true;
                ctx.queue
                    .enqueue_animation(AnimationKind::SubstituteFocus(true), vec![battler]);
                true
            }
            Checkpoint::AfterMove => {
                self.in_focus = false;
                ctx.queue
                    .enqueue_animation(AnimationKind::SubstituteFocus(false), vec![battler]);
                true
            }
            Checkpoint::Hit => {
                let absorbed = ctx
                    .current_move_mut()
                    .map(|phase| std::mem::take(&mut phase.pending_damage))
                    .unwrap_or(0);
                if absorbed == 0 {
                    return true;
                }
                self.hp = self.hp.saturating_sub(absorbed);
                ctx.queue
                    .enqueue_animation(AnimationKind::SubstituteHit, vec![battler]);
                if let Some(holder) = ctx.battler(battler) {
                    let message =
                        MessageEvent::new("tag.substitute.hit", vec![holder.name_key.clone()]);
                    ctx.queue.enqueue(message);
                }
                self.hp > 0
            }
            _ => true,
        }
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.substitute"
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("hp".into(), self.hp.into());
        extra.insert("inFocus".into(), self.in_focus.into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(hp) = extra.get("hp").and_then(|v| v.as_u64()) {
            self.hp = hp as u32;
        }
        if let Some(focus) = extra.get("inFocus").and_then(|v| v.as_bool()) {
            self.in_focus = focus;
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}
