//! Semi-invulnerable states: the holder is off the field mid-move (flying up,
//! underground, underwater, vanished) and most moves cannot target it. The
//! targeting exemption itself lives in the dispatcher; this behavior drives
//! the sprite visibility and clears when the two-turn move resolves.

use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::ids::BattlerId;
use crate::messages::AnimationKind;
use crate::tag::{TagBehavior, TagState};

#[derive(Debug, Clone)]
pub struct SemiInvulnerableTag;

impl TagBehavior for SemiInvulnerableTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        ctx.queue.enqueue_animation(AnimationKind::Hide, vec![battler]);
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        ctx.queue.enqueue_animation(AnimationKind::Show, vec![battler]);
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        _ctx: &mut BattleContext,
        _battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        // Cleared when the charged move's effect resolves.
        checkpoint != Checkpoint::MoveEffect
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.semi_invulnerable"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::Battler;
    use crate::dispatcher::{attach_tag, is_untargetable, lapse_tags};
    use crate::ids::MoveId;
    use crate::moves::{MoveData, MoveFlags};
    use crate::tag::TagKind;
    use crate::types::{ElementType, MoveCategory};

    fn test_context() -> (BattleContext, BattlerId) {
        let mut ctx = BattleContext::new(4);
        let id = ctx.add_battler(|id| Battler::new(id, "species.diver", 50, 100));
        (ctx, id)
    }

    #[test]
    fn test_hides_then_shows() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::Underground, 1, None, None);
        assert!(ctx
            .queue
            .animations()
            .iter()
            .any(|a| a.kind == AnimationKind::Hide));

        lapse_tags(&mut ctx, id, Checkpoint::MoveEffect);
        assert!(!ctx.battler(id).unwrap().has_tag(TagKind::Underground));
        assert!(ctx
            .queue
            .animations()
            .iter()
            .any(|a| a.kind == AnimationKind::Show));
    }

    #[test]
    fn test_untargetable_unless_move_reaches() {
        let (mut ctx, id) = test_context();
        ctx.dex.register(MoveData::new(
            MoveId(30),
            "move.quake",
            MoveCategory::Physical,
            ElementType::Ground,
            100,
            MoveFlags::HITS_SEMI_INVULNERABLE,
        ));
        ctx.dex.register(MoveData::new(
            MoveId(31),
            "move.jab",
            MoveCategory::Physical,
            ElementType::Normal,
            60,
            MoveFlags::MAKES_CONTACT,
        ));
        attach_tag(&mut ctx, id, TagKind::Underground, 1, None, None);

        assert!(is_untargetable(&ctx, id, MoveId(31)));
        assert!(!is_untargetable(&ctx, id, MoveId(30)));
    }

    #[test]
    fn test_turn_end_leaves_it_in_place() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::Flying, 1, None, None);
        lapse_tags(&mut ctx, id, Checkpoint::TurnEnd);
        assert!(ctx.battler(id).unwrap().has_tag(TagKind::Flying));
    }
}
