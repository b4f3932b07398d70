//! Stockpiling: up to three stacks, each raising Defense and Special Defense
//! by one stage. Removal gives back exactly the stages that actually moved —
//! a raise swallowed by the +6 cap is not reversed.

use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::ids::BattlerId;
use crate::messages::MessageEvent;
use crate::tag::{TagBehavior, TagState};
use crate::types::Stat;

pub const MAX_STOCKPILE_STACKS: u32 = 3;

#[derive(Debug, Clone, Default)]
pub struct StockpilingTag {
    stacks: u32,
    def_raised: u8,
    sp_def_raised: u8,
}

impl StockpilingTag {
    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    fn add_stack(&mut self, ctx: &mut BattleContext, battler: BattlerId) {
        if self.stacks >= MAX_STOCKPILE_STACKS {
            return;
        }
        self.stacks += 1;
        if let Some(holder) = ctx.battler_mut(battler) {
            if holder.change_stat_stage(Stat::Def, 1) {
                self.def_raised += 1;
            }
            if holder.change_stat_stage(Stat::SpDef, 1) {
                self.sp_def_raised += 1;
            }
            let message = MessageEvent::new(
                "tag.stockpiling.added",
                vec![holder.name_key.clone(), self.stacks.to_string()],
            );
            ctx.queue.enqueue(message);
        }
    }
}

impl TagBehavior for StockpilingTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        self.add_stack(ctx, battler);
    }

    fn on_overlap(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        self.add_stack(ctx, battler);
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        if let Some(holder) = ctx.battler_mut(battler) {
            holder.change_stat_stage(Stat::Def, -(self.def_raised as i8));
            holder.change_stat_stage(Stat::SpDef, -(self.sp_def_raised as i8));
            let message =
                MessageEvent::new("tag.stockpiling.removed", vec![holder.name_key.clone()]);
            ctx.queue.enqueue(message);
        }
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        _ctx: &mut BattleContext,
        _battler: BattlerId,
        _checkpoint: Checkpoint,
    ) -> bool {
        // Never self-expires; spit-up/swallow style consumers remove it.
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.stockpiling"
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("stacks".into(), self.stacks.into());
        extra.insert("defRaised".into(), self.def_raised.into());
        extra.insert("spDefRaised".into(), self.sp_def_raised.into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(stacks) = extra.get("stacks").and_then(|v| v.as_u64()) {
            self.stacks = (stacks as u32).min(MAX_STOCKPILE_STACKS);
        }
        if let Some(n) = extra.get("defRaised").and_then(|v| v.as_u64()) {
            self.def_raised = n as u8;
        }
        if let Some(n) = extra.get("spDefRaised").and_then(|v| v.as_u64()) {
            self.sp_def_raised = n as u8;
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::Battler;
    use crate::dispatcher::{attach_tag, remove_tag};
    use crate::tag::TagKind;

    fn test_context() -> (BattleContext, BattlerId) {
        let mut ctx = BattleContext::new(9);
        let id = ctx.add_battler(|id| Battler::new(id, "species.hoarder", 50, 100));
        (ctx, id)
    }

    #[test]
    fn test_stacks_raise_defenses() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::Stockpiling, 1, None, None);
        attach_tag(&mut ctx, id, TagKind::Stockpiling, 1, None, None);

        let holder = ctx.battler(id).unwrap();
        assert_eq!(holder.stat_stage(Stat::Def), 2);
        assert_eq!(holder.stat_stage(Stat::SpDef), 2);
    }

    #[test]
    fn test_caps_at_three_stacks() {
        let (mut ctx, id) = test_context();
        for _ in 0..5 {
            attach_tag(&mut ctx, id, TagKind::Stockpiling, 1, None, None);
        }
        assert_eq!(ctx.battler(id).unwrap().stat_stage(Stat::Def), 3);
    }

    #[test]
    fn test_removal_reverses_exactly_what_was_applied() {
        let (mut ctx, id) = test_context();
        // Defense already near the cap: the third stack's Def raise is
        // swallowed and must not be reversed.
        ctx.battler_mut(id).unwrap().change_stat_stage(Stat::Def, 4);
        for _ in 0..3 {
            attach_tag(&mut ctx, id, TagKind::Stockpiling, 1, None, None);
        }
        assert_eq!(ctx.battler(id).unwrap().stat_stage(Stat::Def), 6);
        assert_eq!(ctx.battler(id).unwrap().stat_stage(Stat::SpDef), 3);

        remove_tag(&mut ctx, id, TagKind::Stockpiling);
        let holder = ctx.battler(id).unwrap();
        assert_eq!(holder.stat_stage(Stat::Def), 4);
        assert_eq!(holder.stat_stage(Stat::SpDef), 0);
    }
}
