//! Integration scenarios that exercise whole turn sequences through the
//! public dispatcher surface, the way a host turn engine would drive them.

use crate::abilities::AbilityHookTable;
use crate::battle::{BattleContext, MovePhase, ScheduledPhase};
use crate::battler::Battler;
use crate::checkpoint::Checkpoint;
use crate::dispatcher::{
    attach_tag, check_move_selectable, handle_faint, handle_switch_out, hits_substitute,
    lapse_tag, lapse_tags,
};
use crate::ids::{BattlerId, MoveId};
use crate::moves::{MoveData, MoveFlags};
use crate::tag::TagKind;
use crate::types::{ElementType, Gender, MoveCategory, Stat, StatusCondition};

const TACKLE: MoveId = MoveId(1);
const GROWL: MoveId = MoveId(2);
const HYPER_VOICE: MoveId = MoveId(3);

fn new_test_battle() -> (BattleContext, BattlerId, BattlerId) {
    let mut ctx = BattleContext::new(42);
    ctx.dex.register(MoveData::new(
        TACKLE,
        "move.tackle",
        MoveCategory::Physical,
        ElementType::Normal,
        40,
        MoveFlags::MAKES_CONTACT,
    ));
    ctx.dex.register(MoveData::new(
        GROWL,
        "move.growl",
        MoveCategory::Status,
        ElementType::Normal,
        0,
        MoveFlags::SOUND_BASED,
    ));
    ctx.dex.register(MoveData::new(
        HYPER_VOICE,
        "move.hyper_voice",
        MoveCategory::Special,
        ElementType::Normal,
        90,
        MoveFlags::SOUND_BASED,
    ));
    let ally = ctx.add_battler(|id| {
        Battler::new(id, "species.ally", 50, 100)
            .with_stats(100, 100, 80, 80, 90)
            .with_gender(Gender::Male)
            .with_moveset(vec![TACKLE, GROWL])
    });
    let foe = ctx.add_battler(|id| {
        Battler::new(id, "species.foe", 50, 100)
            .with_stats(90, 90, 90, 90, 100)
            .with_gender(Gender::Female)
            .with_moveset(vec![TACKLE, HYPER_VOICE])
    });
    (ctx, ally, foe)
}

/// Runs the turn-end sweep for every battler, oldest first.
fn end_turn(ctx: &mut BattleContext) {
    for id in ctx.battler_ids() {
        lapse_tags(ctx, id, Checkpoint::TurnEnd);
    }
}

#[test]
fn test_trap_lifecycle_over_turns() {
    let (mut ctx, ally, foe) = new_test_battle();
    assert!(attach_tag(&mut ctx, ally, TagKind::Bind, 3, Some(TACKLE), Some(foe)));
    assert!(crate::dispatcher::is_trapped(&ctx, ally));

    end_turn(&mut ctx);
    end_turn(&mut ctx);
    assert_eq!(ctx.battler(ally).unwrap().hp, 76);
    assert!(ctx.battler(ally).unwrap().has_tag(TagKind::Bind));

    end_turn(&mut ctx);
    assert!(!ctx.battler(ally).unwrap().has_tag(TagKind::Bind));
    assert!(!crate::dispatcher::is_trapped(&ctx, ally));
    // Freed on the expiring lapse without a third chip hit.
    assert_eq!(ctx.battler(ally).unwrap().hp, 76);
}

#[test]
fn test_taunt_denies_selection_and_cancels_queued_move() {
    let (mut ctx, ally, _) = new_test_battle();
    attach_tag(&mut ctx, ally, TagKind::Taunted, 3, None, None);

    let denial = check_move_selectable(&ctx, ally, GROWL);
    assert!(denial.is_some());
    assert_eq!(denial.unwrap().text_key, "tag.taunted.denied");
    assert!(check_move_selectable(&ctx, ally, TACKLE).is_none());

    // A status move that slipped into the queue is cancelled at pre-move.
    ctx.begin_move_phase(MovePhase::new(ally, GROWL, vec![]));
    lapse_tags(&mut ctx, ally, Checkpoint::PreMove);
    assert!(ctx.end_move_phase().unwrap().cancelled);
}

#[test]
fn test_faint_cascades_linked_tags_across_field() {
    let (mut ctx, ally, foe) = new_test_battle();
    attach_tag(&mut ctx, ally, TagKind::Infatuated, 1, None, Some(foe));
    attach_tag(&mut ctx, ally, TagKind::Wrap, 5, None, Some(foe));
    attach_tag(&mut ctx, ally, TagKind::Taunted, 3, None, Some(foe));

    ctx.battler_mut(foe).unwrap().apply_damage(100);
    handle_faint(&mut ctx, foe);

    let holder = ctx.battler(ally).unwrap();
    assert!(!holder.has_tag(TagKind::Infatuated));
    assert!(!holder.has_tag(TagKind::Wrap));
    // Taunt is not source-linked and stays.
    assert!(holder.has_tag(TagKind::Taunted));
}

#[test]
fn test_substitute_intercepts_until_broken() {
    let (mut ctx, ally, foe) = new_test_battle();
    attach_tag(&mut ctx, ally, TagKind::Substitute, 1, None, None);
    assert_eq!(ctx.battler(ally).unwrap().hp, 75);

    assert!(hits_substitute(&ctx, ally, foe, TACKLE));
    // Sound moves go straight through the decoy.
    assert!(!hits_substitute(&ctx, ally, foe, HYPER_VOICE));

    for _ in 0..2 {
        ctx.begin_move_phase(MovePhase::new(foe, TACKLE, vec![ally]));
        ctx.current_move_mut().unwrap().pending_damage = 11;
        lapse_tags(&mut ctx, ally, Checkpoint::Hit);
        ctx.end_move_phase();
    }
    assert!(ctx.battler(ally).unwrap().has_tag(TagKind::Substitute));

    ctx.begin_move_phase(MovePhase::new(foe, TACKLE, vec![ally]));
    ctx.current_move_mut().unwrap().pending_damage = 11;
    lapse_tags(&mut ctx, ally, Checkpoint::Hit);
    ctx.end_move_phase();

    assert!(!ctx.battler(ally).unwrap().has_tag(TagKind::Substitute));
    assert_eq!(ctx.battler(ally).unwrap().hp, 75);
}

#[test]
fn test_protection_blocks_and_expires_same_turn() {
    let (mut ctx, ally, foe) = new_test_battle();
    attach_tag(&mut ctx, ally, TagKind::SpikyShield, 1, None, None);

    ctx.begin_move_phase(MovePhase::new(foe, TACKLE, vec![ally]));
    lapse_tag(&mut ctx, ally, TagKind::SpikyShield, Checkpoint::Custom);
    assert!(ctx.current_move().unwrap().cancelled);
    // Contact recoil: an eighth of the attacker's 100 max HP.
    assert_eq!(ctx.battler(foe).unwrap().hp, 88);
    ctx.end_move_phase();

    end_turn(&mut ctx);
    assert!(!ctx.battler(ally).unwrap().has_tag(TagKind::SpikyShield));
}

#[test]
fn test_switch_out_drops_uncarried_and_severs_links() {
    let (mut ctx, ally, foe) = new_test_battle();
    attach_tag(&mut ctx, ally, TagKind::AquaRing, 1, None, None);
    attach_tag(&mut ctx, ally, TagKind::Taunted, 3, None, None);
    attach_tag(&mut ctx, foe, TagKind::Infatuated, 1, None, Some(ally));

    handle_switch_out(&mut ctx, ally);

    let holder = ctx.battler(ally).unwrap();
    assert!(holder.has_tag(TagKind::AquaRing));
    assert!(!holder.has_tag(TagKind::Taunted));
    // The foe's crush on the departed battler dissolves.
    assert!(!ctx.battler(foe).unwrap().has_tag(TagKind::Infatuated));
}

#[test]
fn test_perish_song_faints_through_scheduled_phase() {
    let (mut ctx, ally, _) = new_test_battle();
    attach_tag(&mut ctx, ally, TagKind::PerishSong, 3, None, None);

    end_turn(&mut ctx);
    end_turn(&mut ctx);
    end_turn(&mut ctx);

    assert!(!ctx.battler(ally).unwrap().has_tag(TagKind::PerishSong));
    assert!(matches!(
        ctx.take_scheduled(),
        Some(ScheduledPhase::Faint { battler }) if battler == ally
    ));
}

#[test]
fn test_stockpile_reverses_only_applied_stages() {
    let (mut ctx, ally, _) = new_test_battle();
    ctx.battler_mut(ally).unwrap().change_stat_stage(Stat::SpDef, 5);
    for _ in 0..3 {
        attach_tag(&mut ctx, ally, TagKind::Stockpiling, 1, None, None);
    }
    // SpDef capped after one stack; Def took all three.
    assert_eq!(ctx.battler(ally).unwrap().stat_stage(Stat::SpDef), 6);
    assert_eq!(ctx.battler(ally).unwrap().stat_stage(Stat::Def), 3);

    crate::dispatcher::remove_tag(&mut ctx, ally, TagKind::Stockpiling);
    assert_eq!(ctx.battler(ally).unwrap().stat_stage(Stat::SpDef), 5);
    assert_eq!(ctx.battler(ally).unwrap().stat_stage(Stat::Def), 0);
}

#[test]
fn test_confusion_turn_sequence_is_seed_stable() {
    let run = |seed: u64| {
        let mut ctx = BattleContext::new(seed);
        let id = ctx.add_battler(|id| {
            Battler::new(id, "species.subject", 50, 100).with_stats(100, 100, 80, 80, 90)
        });
        attach_tag(&mut ctx, id, TagKind::Confused, 4, None, None);
        let mut hp_trace = Vec::new();
        for _ in 0..3 {
            ctx.begin_move_phase(MovePhase::new(id, TACKLE, vec![]));
            lapse_tags(&mut ctx, id, Checkpoint::Move);
            ctx.end_move_phase();
            hp_trace.push(ctx.battler(id).unwrap().hp);
        }
        hp_trace
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn test_flinch_then_status_the_same_turn() {
    let (mut ctx, ally, foe) = new_test_battle();
    attach_tag(&mut ctx, ally, TagKind::Flinched, 1, None, None);
    attach_tag(&mut ctx, ally, TagKind::Drowsy, 2, None, Some(foe));

    ctx.begin_move_phase(MovePhase::new(ally, TACKLE, vec![foe]));
    lapse_tags(&mut ctx, ally, Checkpoint::PreMove);
    assert!(ctx.end_move_phase().unwrap().cancelled);

    end_turn(&mut ctx);
    end_turn(&mut ctx);
    assert!(matches!(
        ctx.take_scheduled(),
        Some(ScheduledPhase::ApplyStatus {
            status: StatusCondition::Sleep,
            ..
        })
    ));
}

#[test]
fn test_ability_hook_blocks_every_indirect_source() {
    use crate::abilities::AbilityHook;
    use crate::ids::AbilityId;

    let mut table = AbilityHookTable::new();
    table.register(AbilityId(1), AbilityHook::BlockNonDirectDamage);
    let mut ctx = BattleContext::new(8).with_hooks(table);
    let guarded = ctx.add_battler(|id| {
        Battler::new(id, "species.guarded", 50, 100).with_ability(AbilityId(1))
    });
    let foe = ctx.add_battler(|id| Battler::new(id, "species.foe", 50, 100));

    attach_tag(&mut ctx, guarded, TagKind::Wrap, 4, None, Some(foe));
    attach_tag(&mut ctx, guarded, TagKind::SaltCured, 1, None, Some(foe));
    end_turn(&mut ctx);
    end_turn(&mut ctx);
    assert_eq!(ctx.battler(guarded).unwrap().hp, 100);
}

#[cfg(feature = "serialization")]
mod persistence {
    use super::*;
    use crate::tags::{load_tag, load_tag_value};

    #[test]
    fn test_battler_tags_round_trip() {
        let (mut ctx, ally, foe) = new_test_battle();
        ctx.battler_mut(ally).unwrap().push_move_used(TACKLE);
        attach_tag(&mut ctx, ally, TagKind::Disabled, 4, Some(GROWL), Some(foe));
        attach_tag(&mut ctx, ally, TagKind::Seeded, 1, None, Some(foe));
        attach_tag(&mut ctx, ally, TagKind::Stockpiling, 1, None, None);
        end_turn(&mut ctx);

        let records: Vec<_> = ctx
            .battler(ally)
            .unwrap()
            .tags
            .iter()
            .map(|t| t.save())
            .collect();
        let restored: Vec<_> = records.iter().map(load_tag).collect();

        assert_eq!(restored.len(), 3);
        let kinds: Vec<_> = restored.iter().map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![TagKind::Disabled, TagKind::Seeded, TagKind::Stockpiling]
        );
        // The disable still knows which move it locked.
        let mut extra = serde_json::Map::new();
        restored[0].behavior().save_extra(&mut extra);
        assert_eq!(
            extra.get("moveId").and_then(|v| v.as_u64()),
            Some(TACKLE.0 as u64)
        );
        // Countdown progress survives the trip.
        assert_eq!(restored[0].state.remaining_turns, 3);
    }

    #[test]
    fn test_record_json_shape_is_stable() {
        let tag = crate::tags::new_tag(TagKind::FireSpin, 4, Some(TACKLE), Some(BattlerId(1)));
        let json = serde_json::to_value(tag.save()).unwrap();
        assert_eq!(json["kind"], "FIRE_SPIN");
        assert_eq!(json["remaining_turns"], 4);

        let reloaded = load_tag_value(json).unwrap();
        assert_eq!(reloaded.kind(), TagKind::FireSpin);
        assert_eq!(reloaded.state.source_id, Some(BattlerId(1)));
    }
}
