//! Draining and chip-damage tags: leech seed, curse, salt cure.
//!
//! Drain variants look up their source by cached id at every lapse — the
//! battler that planted the seed may have been replaced, and a severed link
//! simply skips the transfer. The reversed-drain ability hook turns the heal
//! into damage for the drainer.

use crate::abilities::AbilityHook;
use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::damage::fraction_of_max_hp;
use crate::ids::BattlerId;
use crate::messages::MessageEvent;
use crate::tag::{TagBehavior, TagState};
use crate::types::ElementType;

#[derive(Debug, Clone, Default)]
pub struct SeededTag;

impl TagBehavior for SeededTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler)
            .is_some_and(|b| !b.has_type(ElementType::Grass))
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.seeded.added");
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
        // Drain is skipped when the source id no longer resolves to an active
        // battler; the seed itself stays planted.
        let Some(source) = state
            .source_id
            .and_then(|id| ctx.active_battler(id))
            .map(|b| b.id)
        else {
            return true;
        };
        let Some(max_hp) = ctx.battler(battler).map(|b| b.max_hp) else {
            return false;
        };
        let drained = ctx.apply_indirect_damage(battler, fraction_of_max_hp(max_hp, 8));
        if drained == 0 {
            return true;
        }
        enqueue_holder_message(ctx, battler, "tag.seeded.drained");
        if ctx.apply_ability_hook(AbilityHook::ReverseDrain, battler) {
            if let Some(b) = ctx.battler_mut(source) {
                b.apply_damage(drained);
            }
            enqueue_holder_message(ctx, source, "tag.seeded.reversed");
        } else if let Some(b) = ctx.battler_mut(source) {
            b.heal(drained);
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.seeded"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CursedTag;

impl TagBehavior for CursedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.cursed.added");
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
        let Some(max_hp) = ctx.battler(battler).map(|b| b.max_hp) else {
            return false;
        };
        if ctx.apply_indirect_damage(battler, fraction_of_max_hp(max_hp, 4)) > 0 {
            enqueue_holder_message(ctx, battler, "tag.cursed.hurt");
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.cursed"
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Salt cure: chips an eighth of max HP, a quarter for Water or Steel types.
#[derive(Debug, Clone, Default)]
pub struct SaltCuredTag;

impl TagBehavior for SaltCuredTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.salt_cured.added");
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
        let denominator =
            if holder.has_type(ElementType::Water) || holder.has_type(ElementType::Steel) {
                4
            } else {
                8
            };
        let max_hp = holder.max_hp;
        if ctx.apply_indirect_damage(battler, fraction_of_max_hp(max_hp, denominator)) > 0 {
            enqueue_holder_message(ctx, battler, "tag.salt_cured.hurt");
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.salt_cured"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityHookTable;
    use crate::battler::Battler;
    use crate::dispatcher::{attach_tag, lapse_tags};
    use crate::ids::AbilityId;
    use crate::tag::TagKind;

    fn test_context() -> (BattleContext, BattlerId, BattlerId) {
        let mut ctx = BattleContext::new(23);
        let holder = ctx.add_battler(|id| Battler::new(id, "species.host", 50, 100));
        let source = ctx.add_battler(|id| Battler::new(id, "species.seeder", 50, 100));
        ctx.battler_mut(source).unwrap().apply_damage(40);
        (ctx, holder, source)
    }

    #[test]
    fn test_seed_drains_into_source() {
        let (mut ctx, holder, source) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Seeded, 1, None, Some(source));

        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(holder).unwrap().hp, 88);
        assert_eq!(ctx.battler(source).unwrap().hp, 72);
    }

    #[test]
    fn test_seed_skips_drain_when_source_gone() {
        let (mut ctx, holder, source) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Seeded, 1, None, Some(source));

        ctx.battler_mut(source).unwrap().active = false;
        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        // Link severed: no drain, but the seed stays planted.
        assert_eq!(ctx.battler(holder).unwrap().hp, 100);
        assert!(ctx.battler(holder).unwrap().has_tag(TagKind::Seeded));
    }

    #[test]
    fn test_seed_rejects_grass_types() {
        let (mut ctx, _, source) = test_context();
        let grass = ctx.add_battler(|id| {
            Battler::new(id, "species.sprout", 50, 100).with_types(vec![ElementType::Grass])
        });
        assert!(!attach_tag(&mut ctx, grass, TagKind::Seeded, 1, None, Some(source)));
    }

    #[test]
    fn test_reversed_drain_damages_source() {
        let mut table = AbilityHookTable::new();
        table.register(AbilityId(2), AbilityHook::ReverseDrain);
        let mut ctx = BattleContext::new(23).with_hooks(table);
        let holder = ctx.add_battler(|id| {
            Battler::new(id, "species.ooze", 50, 100).with_ability(AbilityId(2))
        });
        let source = ctx.add_battler(|id| Battler::new(id, "species.seeder", 50, 100));
        attach_tag(&mut ctx, holder, TagKind::Seeded, 1, None, Some(source));

        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(holder).unwrap().hp, 88);
        assert_eq!(ctx.battler(source).unwrap().hp, 88);
    }

    #[test]
    fn test_curse_chips_quarter() {
        let (mut ctx, holder, source) = test_context();
        attach_tag(&mut ctx, holder, TagKind::Cursed, 1, None, Some(source));

        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(holder).unwrap().hp, 50);
        assert!(ctx.battler(holder).unwrap().has_tag(TagKind::Cursed));
    }

    #[test]
    fn test_salt_cure_doubles_on_water_and_steel() {
        let (mut ctx, holder, _) = test_context();
        attach_tag(&mut ctx, holder, TagKind::SaltCured, 1, None, None);
        lapse_tags(&mut ctx, holder, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(holder).unwrap().hp, 88);

        let fish = ctx.add_battler(|id| {
            Battler::new(id, "species.fish", 50, 100).with_types(vec![ElementType::Water])
        });
        attach_tag(&mut ctx, fish, TagKind::SaltCured, 1, None, None);
        lapse_tags(&mut ctx, fish, Checkpoint::TurnEnd);
        assert_eq!(ctx.battler(fish).unwrap().hp, 75);
    }
}
