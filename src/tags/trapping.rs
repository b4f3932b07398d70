//! Damaging traps.
//!
//! One behavior serves the whole family; the kind selects the flavor text.
//! A trap cannot coexist with another trap or with a substitute holder, deals
//! one eighth of max HP at every turn-end lapse while it persists (subject to
//! the indirect-damage ability veto), and is freed when its own counter
//! expires or its source leaves the field.

use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::damage::fraction_of_max_hp;
use crate::ids::BattlerId;
use crate::messages::{AnimationKind, MessageEvent};
use crate::tag::{TagBehavior, TagKind, TagState};
use crate::tags::is_damaging_trap;
use crate::types::Stat;

const TRAP_DAMAGE_DENOMINATOR: u32 = 8;

#[derive(Debug, Clone)]
pub struct DamagingTrapTag {
    kind: TagKind,
}

impl DamagingTrapTag {
    pub fn new(kind: TagKind) -> Self {
        Self { kind }
    }

    fn text_key(&self, suffix: &str) -> String {
        format!("{}.{}", descriptor(self.kind), suffix)
    }
}

fn descriptor(kind: TagKind) -> &'static str {
    match kind {
        TagKind::Bind => "tag.bind",
        TagKind::Wrap => "tag.wrap",
        TagKind::FireSpin => "tag.fire_spin",
        TagKind::Whirlpool => "tag.whirlpool",
        TagKind::Clamp => "tag.clamp",
        TagKind::SandTomb => "tag.sand_tomb",
        TagKind::MagmaStorm => "tag.magma_storm",
        TagKind::SnapTrap => "tag.snap_trap",
        TagKind::ThunderCage => "tag.thunder_cage",
        TagKind::Infestation => "tag.infestation",
        _ => "tag.trap",
    }
}

impl TagBehavior for DamagingTrapTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler).is_some_and(|holder| {
            !holder.has_tag(TagKind::Substitute)
                && !holder.tags.iter().any(|t| is_damaging_trap(t.kind()))
        })
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        let message = MessageEvent::new(self.text_key("added"), vec![holder.name_key.clone()]);
        ctx.queue.enqueue(message);
        ctx.queue
            .enqueue_animation(AnimationKind::TagIntro(self.kind), vec![battler]);
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        let message = MessageEvent::new(self.text_key("removed"), vec![holder.name_key.clone()]);
        ctx.queue.enqueue(message);
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::TurnEnd {
            return state.count_down();
        }
        let persists = state.count_down();
        if !persists {
            return false;
        }
        let Some(max_hp) = ctx.battler(battler).map(|b| b.max_hp) else {
            return false;
        };
        let dealt =
            ctx.apply_indirect_damage(battler, fraction_of_max_hp(max_hp, TRAP_DAMAGE_DENOMINATOR));
        if dealt > 0
            && let Some(holder) = ctx.battler(battler)
        {
            let message =
                MessageEvent::new(self.text_key("hurt"), vec![holder.name_key.clone()]);
            ctx.queue.enqueue(message);
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        descriptor(self.kind)
    }

    fn is_linked_to_source(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Octolock: a non-damaging trap that grinds down the holder's defenses at
/// every turn end for as long as its source stays on the field.
#[derive(Debug, Clone)]
pub struct OctolockedTag;

impl TagBehavior for OctolockedTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler)
            .is_some_and(|holder| !holder.has_tag(TagKind::Substitute))
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
            holder.change_stat_stage(Stat::Def, -1);
            holder.change_stat_stage(Stat::SpDef, -1);
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.octolocked"
    }

    fn is_linked_to_source(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::Battler;
    use crate::dispatcher::{attach_tag, handle_faint, lapse_tags};
    use crate::tag::TagKind;

    fn test_context() -> (BattleContext, BattlerId, BattlerId) {
        let mut ctx = BattleContext::new(5);
        let holder = ctx.add_battler(|id| Battler::new(id, "species.prey", 50, 100));
        let source = ctx.add_battler(|id| Battler::new(id, "species.trapper", 50, 100));
        (ctx, holder, source)
    }

    #[test]
    fn test_trap_deals_eighth_per_turn_end() {
        let (mut ctx, holder, source) = test_context();
        assert!(attach_tag(&mut ctx, holder, TagKind::Wrap, 4, None, Some(source)));

        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(holder).unwrap().hp, 88);
        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(holder).unwrap().hp, 76);
    }

    #[test]
    fn test_trap_expires_after_counter() {
        let (mut ctx, holder, source) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Bind, 2, None, Some(source));

        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert!(ctx.battler(holder).unwrap().has_tag(TagKind::Bind));
        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert!(!ctx.battler(holder).unwrap().has_tag(TagKind::Bind));
        // The expiring lapse frees the holder without a final chip hit.
        assert_eq!(ctx.battler(holder).unwrap().hp, 88);
        assert!(ctx
            .queue
            .messages()
            .iter()
            .any(|m| m.text_key == "tag.bind.removed"));
    }

    #[test]
    fn test_traps_do_not_stack() {
        let (mut ctx, holder, source) = test_context();
        assert!(attach_tag(&mut ctx, holder, TagKind::Wrap, 4, None, Some(source)));
        assert!(!attach_tag(&mut ctx, holder, TagKind::FireSpin, 4, None, Some(source)));
        assert!(ctx.battler(holder).unwrap().has_tag(TagKind::Wrap));
        assert!(!ctx.battler(holder).unwrap().has_tag(TagKind::FireSpin));
    }

    #[test]
    fn test_trap_blocked_by_substitute() {
        let (mut ctx, holder, source) = test_context();
        assert!(attach_tag(&mut ctx, holder, TagKind::Substitute, 1, None, None));
        assert!(!attach_tag(&mut ctx, holder, TagKind::Clamp, 4, None, Some(source)));
    }

    #[test]
    fn test_trap_freed_when_source_faints() {
        let (mut ctx, holder, source) = test_context();
        attach_tag(&mut ctx, holder, TagKind::MagmaStorm, 5, None, Some(source));

        ctx.battler_mut(source).unwrap().apply_damage(100);
        handle_faint(&mut ctx, source);
        assert!(!ctx.battler(holder).unwrap().has_tag(TagKind::MagmaStorm));
    }

    #[test]
    fn test_octolock_drops_defenses_while_source_active() {
        let (mut ctx, holder, source) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Octolocked, 1, None, Some(source));

        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(holder).unwrap().stat_stage(Stat::Def), -1);
        assert_eq!(ctx.battler(holder).unwrap().stat_stage(Stat::SpDef), -1);

        ctx.battler_mut(source).unwrap().active = false;
        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert!(!ctx.battler(holder).unwrap().has_tag(TagKind::Octolocked));
        assert_eq!(ctx.battler(holder).unwrap().stat_stage(Stat::Def), -1);
    }
}
