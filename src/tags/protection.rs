//! Protection tags.
//!
//! Protection lapses only at the `Custom` checkpoint the turn engine fires
//! when the protected battler is targeted — never from a generic sweep. A
//! block cancels the incoming move and truncates any remaining multi-hit
//! sub-phases; the specialized variants additionally punish attackers whose
//! move made contact. The whole family expires in the turn-end sweep.

use crate::abilities::AbilityHook;
use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::damage::fraction_of_max_hp;
use crate::ids::BattlerId;
use crate::messages::{AnimationKind, MessageEvent};
use crate::moves::MoveFlags;
use crate::tag::{TagBehavior, TagKind, TagState};
use crate::types::{Stat, StatusCondition};

/// Counter-effect a protection variant inflicts on a contact attacker.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactPunish {
    None,
    /// Recoil of `1/denominator` of the attacker's max HP.
    Recoil { denominator: u32 },
    /// Stat-stage drops applied to the attacker.
    StatDrop { drops: Vec<(Stat, i8)> },
    /// A non-volatile status inflicted on the attacker.
    Status(StatusCondition),
}

#[derive(Debug, Clone)]
pub struct ProtectedTag {
    kind: TagKind,
    punish: ContactPunish,
}

impl ProtectedTag {
    pub fn new(kind: TagKind, punish: ContactPunish) -> Self {
        Self { kind, punish }
    }

    fn apply_punish(&self, ctx: &mut BattleContext, attacker: BattlerId) {
        match &self.punish {
            ContactPunish::None => {}
            ContactPunish::Recoil { denominator } => {
                let Some(max_hp) = ctx.battler(attacker).map(|b| b.max_hp) else {
                    return;
                };
                let dealt =
                    ctx.apply_indirect_damage(attacker, fraction_of_max_hp(max_hp, *denominator));
                if dealt > 0
                    && let Some(b) = ctx.battler(attacker)
                {
                    let message =
                        MessageEvent::new("tag.protected.recoil", vec![b.name_key.clone()]);
                    ctx.queue.enqueue(message);
                }
            }
            ContactPunish::StatDrop { drops } => {
                if let Some(b) = ctx.battler_mut(attacker) {
                    for (stat, delta) in drops {
                        b.change_stat_stage(*stat, *delta);
                    }
                }
            }
            ContactPunish::Status(status) => {
                if let Some(b) = ctx.battler_mut(attacker)
                    && b.status == StatusCondition::None
                {
                    b.status = *status;
                }
            }
        }
    }
}

impl TagBehavior for ProtectedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        let message = MessageEvent::new("tag.protected.added", vec![holder.name_key.clone()]);
        ctx.queue.enqueue(message);
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::Custom {
            // Turn-end sweep: protection never outlives the turn.
            return false;
        }
        let Some(phase) = ctx.current_move() else {
            return true;
        };
        let (attacker, move_id) = (phase.user, phase.move_id);
        if ctx.dex.has_flag(move_id, MoveFlags::IGNORES_PROTECT)
            || ctx.apply_ability_hook(AbilityHook::BypassProtect, attacker)
        {
            return true;
        }

        ctx.cancel_current_move();
        ctx.truncate_hits();
        ctx.queue
            .enqueue_animation(AnimationKind::ProtectBlock, vec![battler]);
        if let Some(holder) = ctx.battler(battler) {
            let message = MessageEvent::new("tag.protected.blocked", vec![holder.name_key.clone()]);
            ctx.queue.enqueue(message);
        }
        if ctx.dex.makes_contact(move_id) {
            self.apply_punish(ctx, attacker);
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        match self.kind {
            TagKind::SpikyShield => "tag.spiky_shield",
            TagKind::KingsShield => "tag.kings_shield",
            TagKind::Obstruct => "tag.obstruct",
            TagKind::SilkTrap => "tag.silk_trap",
            TagKind::BanefulBunker => "tag.baneful_bunker",
            TagKind::BurningBulwark => "tag.burning_bulwark",
            _ => "tag.protected",
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Endure: the holder survives a would-faint hit at 1 HP. The turn engine
/// lapses this at its own `Custom` call site inside damage resolution; the
/// sturdy-style variant is one-shot.
#[derive(Debug, Clone)]
pub struct EnduringTag {
    one_shot: bool,
}

impl EnduringTag {
    pub fn new(one_shot: bool) -> Self {
        Self { one_shot }
    }
}

impl TagBehavior for EnduringTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        if self.one_shot {
            return;
        }
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        let message = MessageEvent::new("tag.enduring.added", vec![holder.name_key.clone()]);
        ctx.queue.enqueue(message);
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::Custom {
            return false;
        }
        if let Some(holder) = ctx.battler(battler) {
            let message = MessageEvent::new("tag.enduring.endured", vec![holder.name_key.clone()]);
            ctx.queue.enqueue(message);
        }
        !self.one_shot
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.enduring"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityHookTable;
    use crate::battle::MovePhase;
    use crate::battler::Battler;
    use crate::dispatcher::{attach_tag, lapse_tag, lapse_tags};
    use crate::ids::{AbilityId, MoveId};
    use crate::moves::MoveData;
    use crate::types::{ElementType, MoveCategory};

    const TACKLE: MoveId = MoveId(1);
    const SWIFT: MoveId = MoveId(2);
    const FEINT: MoveId = MoveId(3);

    fn test_context() -> (BattleContext, BattlerId, BattlerId) {
        let mut ctx = BattleContext::new(3);
        ctx.dex.register(MoveData::new(
            TACKLE,
            "move.tackle",
            MoveCategory::Physical,
            ElementType::Normal,
            40,
            MoveFlags::MAKES_CONTACT,
        ));
        ctx.dex.register(MoveData::new(
            SWIFT,
            "move.swift",
            MoveCategory::Special,
            ElementType::Normal,
            60,
            MoveFlags::NONE,
        ));
        ctx.dex.register(MoveData::new(
            FEINT,
            "move.feint",
            MoveCategory::Physical,
            ElementType::Normal,
            30,
            MoveFlags::IGNORES_PROTECT,
        ));
        let holder = ctx.add_battler(|id| Battler::new(id, "species.shield", 50, 100));
        let attacker = ctx.add_battler(|id| Battler::new(id, "species.striker", 50, 80));
        (ctx, holder, attacker)
    }

    fn incoming(ctx: &mut BattleContext, attacker: BattlerId, holder: BattlerId, move_id: MoveId) {
        let mut phase = MovePhase::new(attacker, move_id, vec![holder]);
        phase.hits_remaining = 3;
        ctx.begin_move_phase(phase);
    }

    #[test]
    fn test_protect_blocks_and_truncates_hits() {
        let (mut ctx, holder, attacker) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Protected, 1, None, None);

        incoming(&mut ctx, attacker, holder, SWIFT);
        assert!(lapse_tag(&mut ctx, holder, TagKind::Protected, Checkpoint::Custom));

        let phase = ctx.current_move().unwrap();
        assert!(phase.cancelled);
        assert_eq!(phase.hits_remaining, 0);
        assert!(ctx.battler(holder).unwrap().has_tag(TagKind::Protected));
    }

    #[test]
    fn test_protect_expires_at_turn_end() {
        let (mut ctx, holder, _) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Protected, 1, None, None);
        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert!(!ctx.battler(holder).unwrap().has_tag(TagKind::Protected));
    }

    #[test]
    fn test_protect_ignored_by_flagged_move() {
        let (mut ctx, holder, attacker) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Protected, 1, None, None);

        incoming(&mut ctx, attacker, holder, FEINT);
        lapse_tag(&mut ctx, holder, TagKind::Protected, Checkpoint::Custom);
        assert!(!ctx.current_move().unwrap().cancelled);
    }

    #[test]
    fn test_protect_bypassed_by_ability_hook() {
        let mut table = AbilityHookTable::new();
        table.register(AbilityId(9), AbilityHook::BypassProtect);
        let mut ctx = BattleContext::new(3).with_hooks(table);
        ctx.dex.register(MoveData::new(
            TACKLE,
            "move.tackle",
            MoveCategory::Physical,
            ElementType::Normal,
            40,
            MoveFlags::MAKES_CONTACT,
        ));
        let holder = ctx.add_battler(|id| Battler::new(id, "species.shield", 50, 100));
        let attacker = ctx.add_battler(|id| {
            Battler::new(id, "species.striker", 50, 80).with_ability(AbilityId(9))
        });
        attach_tag(&mut ctx, holder, TagKind::Protected, 1, None, None);

        incoming(&mut ctx, attacker, holder, TACKLE);
        lapse_tag(&mut ctx, holder, TagKind::Protected, Checkpoint::Custom);
        assert!(!ctx.current_move().unwrap().cancelled);
    }

    #[test]
    fn test_spiky_shield_recoils_contact_attacker() {
        let (mut ctx, holder, attacker) = test_context();
        attach_tag(&mut ctx, holder, TagKind::SpikyShield, 1, None, None);

        incoming(&mut ctx, attacker, holder, TACKLE);
        lapse_tag(&mut ctx, holder, TagKind::SpikyShield, Checkpoint::Custom);
        // 80 max HP -> 10 recoil.
        assert_eq!(ctx.battler(attacker).unwrap().hp, 70);
    }

    #[test]
    fn test_spiky_shield_spares_non_contact() {
        let (mut ctx, holder, attacker) = test_context();
        attach_tag(&mut ctx, holder, TagKind::SpikyShield, 1, None, None);

        incoming(&mut ctx, attacker, holder, SWIFT);
        lapse_tag(&mut ctx, holder, TagKind::SpikyShield, Checkpoint::Custom);
        assert_eq!(ctx.battler(attacker).unwrap().hp, 80);
        assert!(ctx.current_move().unwrap().cancelled);
    }

    #[test]
    fn test_kings_shield_drops_attack_on_contact() {
        let (mut ctx, holder, attacker) = test_context();
        attach_tag(&mut ctx, holder, TagKind::KingsShield, 1, None, None);

        incoming(&mut ctx, attacker, holder, TACKLE);
        lapse_tag(&mut ctx, holder, TagKind::KingsShield, Checkpoint::Custom);
        assert_eq!(ctx.battler(attacker).unwrap().stat_stage(Stat::Atk), -1);
    }

    #[test]
    fn test_baneful_bunker_poisons_contact_attacker() {
        let (mut ctx, holder, attacker) = test_context();
        attach_tag(&mut ctx, holder, TagKind::BanefulBunker, 1, None, None);

        incoming(&mut ctx, attacker, holder, TACKLE);
        lapse_tag(&mut ctx, holder, TagKind::BanefulBunker, Checkpoint::Custom);
        assert_eq!(
            ctx.battler(attacker).unwrap().status,
            StatusCondition::Poison
        );
    }

    #[test]
    fn test_burning_bulwark_burns_contact_attacker() {
        let (mut ctx, holder, attacker) = test_context();
        attach_tag(&mut ctx, holder, TagKind::BurningBulwark, 1, None, None);

        incoming(&mut ctx, attacker, holder, TACKLE);
        lapse_tag(&mut ctx, holder, TagKind::BurningBulwark, Checkpoint::Custom);
        assert_eq!(ctx.battler(attacker).unwrap().status, StatusCondition::Burn);
    }

    #[test]
    fn test_endure_leaves_survivor_and_sturdy_is_one_shot() {
        let (mut ctx, holder, _) = test_context();
        attach_tag(&mut ctx, holder, TagKind::SturdyEndure, 1, None, None);

        lapse_tag(&mut ctx, holder, TagKind::SturdyEndure, Checkpoint::Custom);
        assert!(!ctx.battler(holder).unwrap().has_tag(TagKind::SturdyEndure));

        attach_tag(&mut ctx, holder, TagKind::Enduring, 1, None, None);
        lapse_tag(&mut ctx, holder, TagKind::Enduring, Checkpoint::Custom);
        assert!(ctx.battler(holder).unwrap().has_tag(TagKind::Enduring));
    }
}
