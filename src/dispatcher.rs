//! The lapse dispatcher and tag attach/detach operations.
//!
//! All tag-list mutation goes through these operations. While a hook runs, the
//! tag is taken out of the holder's list and the rest of the context is handed
//! to it mutably, so the list a hook observes is always consistent and a tag
//! never aliases its own holder.
//!
//! Iteration is insertion order, oldest first. A lapse returning `false`
//! detaches the tag immediately — before the next tag in the same pass is
//! visited — so later tags see the updated list, and a cancelled move is
//! visible to every tag lapsed after the one that cancelled it.

use tracing::debug;

use crate::abilities::AbilityHook;
use crate::battle::BattleContext;
use crate::checkpoint::Checkpoint;
use crate::ids::{BattlerId, MoveId};
use crate::messages::MessageEvent;
use crate::moves::MoveFlags;
use crate::tag::{Tag, TagKind};
use crate::tags;

/// Attach a new tag of `kind` to a battler.
///
/// A duplicate kind fires `on_overlap` on the existing instance instead of
/// installing a second one. A `can_attach` veto is a normal negative result.
/// Returns whether a new tag was installed.
pub fn attach_tag(
    ctx: &mut BattleContext,
    battler: BattlerId,
    kind: TagKind,
    turns: i32,
    source_move: Option<MoveId>,
    source_id: Option<BattlerId>,
) -> bool {
    let Some(holder) = ctx.battler(battler) else {
        return false;
    };
    if holder.has_tag(kind) {
        with_tag_removed(ctx, battler, kind, |tag, ctx| tag.on_overlap(ctx, battler));
        return false;
    }

    let mut tag = tags::new_tag(kind, turns, source_move, source_id);
    if !tag.can_attach(ctx, battler) {
        return false;
    }
    tag.on_attach(ctx, battler);
    debug!(kind = %kind, battler = battler.0, "tag attached");
    if let Some(holder) = ctx.battler_mut(battler) {
        holder.tags.push(tag);
    }
    true
}

/// Run a generic lapse pass over a battler's tags for `checkpoint`.
///
/// `Custom` is never swept generically; use [`lapse_tag`] from the specific
/// call site instead.
pub fn lapse_tags(ctx: &mut BattleContext, battler: BattlerId, checkpoint: Checkpoint) {
    if checkpoint == Checkpoint::Custom {
        return;
    }
    let mut i = 0;
    loop {
        let Some(holder) = ctx.battler_mut(battler) else {
            return;
        };
        if i >= holder.tags.len() {
            break;
        }
        if !holder.tags[i].trigger_set().contains(checkpoint) {
            i += 1;
            continue;
        }
        let mut tag = holder.tags.remove(i);
        let persists = tag.lapse(ctx, battler, checkpoint);
        if persists {
            if let Some(holder) = ctx.battler_mut(battler) {
                let at = i.min(holder.tags.len());
                holder.tags.insert(at, tag);
            }
            i += 1;
        } else {
            detach(ctx, battler, tag);
        }
    }
}

/// Explicitly lapse a single tag kind, for `Custom` checkpoints invoked by
/// name from specific call sites. Returns whether the tag was present before
/// the call.
pub fn lapse_tag(
    ctx: &mut BattleContext,
    battler: BattlerId,
    kind: TagKind,
    checkpoint: Checkpoint,
) -> bool {
    let Some(pos) = ctx
        .battler(battler)
        .and_then(|b| b.tags.iter().position(|t| t.kind() == kind))
    else {
        return false;
    };
    let Some(mut tag) = ctx.battler_mut(battler).map(|b| b.tags.remove(pos)) else {
        return false;
    };
    if tag.lapse(ctx, battler, checkpoint) {
        if let Some(holder) = ctx.battler_mut(battler) {
            let at = pos.min(holder.tags.len());
            holder.tags.insert(at, tag);
        }
    } else {
        detach(ctx, battler, tag);
    }
    true
}

/// Forcibly remove a tag by kind, firing `on_detach`. Returns whether a tag
/// was removed.
pub fn remove_tag(ctx: &mut BattleContext, battler: BattlerId, kind: TagKind) -> bool {
    let Some(pos) = ctx
        .battler(battler)
        .and_then(|b| b.tags.iter().position(|t| t.kind() == kind))
    else {
        return false;
    };
    let Some(tag) = ctx.battler_mut(battler).map(|b| b.tags.remove(pos)) else {
        return false;
    };
    detach(ctx, battler, tag);
    true
}

/// Remove every tag matching the predicate, firing `on_detach` for each.
pub fn find_and_remove_tags(
    ctx: &mut BattleContext,
    battler: BattlerId,
    predicate: impl Fn(&Tag) -> bool,
) {
    let kinds: Vec<TagKind> = ctx
        .battler(battler)
        .map(|b| {
            b.tags
                .iter()
                .filter(|t| predicate(t))
                .map(|t| t.kind())
                .collect()
        })
        .unwrap_or_default();
    for kind in kinds {
        remove_tag(ctx, battler, kind);
    }
}

/// Faint resolution: lapse the fainted battler's `Faint`-checkpoint tags, then
/// cascade-remove source-linked tags across the field whose originating
/// battler was the one that fainted.
pub fn handle_faint(ctx: &mut BattleContext, fainted: BattlerId) {
    let mut i = 0;
    loop {
        let Some(holder) = ctx.battler_mut(fainted) else {
            return;
        };
        if i >= holder.tags.len() {
            break;
        }
        if !holder.tags[i].trigger_set().contains(Checkpoint::Faint) {
            i += 1;
            continue;
        }
        let mut tag = holder.tags.remove(i);
        if tag.lapse(ctx, fainted, Checkpoint::Faint) {
            if let Some(holder) = ctx.battler_mut(fainted) {
                let at = i.min(holder.tags.len());
                holder.tags.insert(at, tag);
            }
            i += 1;
        } else {
            detach(ctx, fainted, tag);
        }
    }

    for id in ctx.battler_ids() {
        if id == fainted {
            continue;
        }
        find_and_remove_tags(ctx, id, |tag| {
            tag.is_linked_to_source() && tag.state.source_id == Some(fainted)
        });
    }
}

/// Selection-time restriction check: the denial message of the first attached
/// restriction tag that forbids the move, or `None` if it may be selected.
pub fn check_move_selectable(
    ctx: &BattleContext,
    battler: BattlerId,
    move_id: MoveId,
) -> Option<MessageEvent> {
    let user = ctx.battler(battler)?;
    for tag in &user.tags {
        if let Some(restriction) = tag.restriction()
            && restriction.is_move_restricted(move_id, user, ctx)
        {
            return Some(restriction.selection_denied_text(user, move_id, &ctx.dex));
        }
    }
    None
}

/// Whether any of the user's restriction tags forbids the chosen target.
pub fn is_target_restricted(
    ctx: &BattleContext,
    battler: BattlerId,
    move_id: MoveId,
    target: BattlerId,
) -> bool {
    let (Some(user), Some(target)) = (ctx.battler(battler), ctx.battler(target)) else {
        return false;
    };
    user.tags.iter().any(|tag| {
        tag.restriction()
            .is_some_and(|r| r.is_target_restricted(move_id, user, target))
    })
}

/// Whether an incoming move is intercepted by the target's substitute.
pub fn hits_substitute(
    ctx: &BattleContext,
    target: BattlerId,
    attacker: BattlerId,
    move_id: MoveId,
) -> bool {
    let Some(holder) = ctx.battler(target) else {
        return false;
    };
    holder.has_tag(TagKind::Substitute)
        && !ctx.dex.is_sound_based(move_id)
        && !ctx.dex.has_flag(move_id, MoveFlags::IGNORES_SUBSTITUTE)
        && !ctx.apply_ability_hook(AbilityHook::BypassSubstitute, attacker)
}

/// Whether a battler is untargetable because it is semi-invulnerable.
pub fn is_untargetable(ctx: &BattleContext, battler: BattlerId, move_id: MoveId) -> bool {
    let Some(holder) = ctx.battler(battler) else {
        return false;
    };
    holder
        .tags
        .iter()
        .any(|t| tags::is_semi_invulnerable(t.kind()))
        && !ctx.dex.has_flag(move_id, MoveFlags::HITS_SEMI_INVULNERABLE)
}

/// Whether a battler is prevented from switching out.
pub fn is_trapped(ctx: &BattleContext, battler: BattlerId) -> bool {
    ctx.battler(battler).is_some_and(|b| {
        b.tags.iter().any(|t| {
            tags::is_damaging_trap(t.kind())
                || matches!(t.kind(), TagKind::Ingrain | TagKind::Octolocked)
        })
    })
}

/// Handle a battler switching out: drop every tag not carried on switch,
/// firing `on_detach`, and sever links held by other battlers' tags whose
/// source left the field.
pub fn handle_switch_out(ctx: &mut BattleContext, battler: BattlerId) {
    find_and_remove_tags(ctx, battler, |tag| !tag.state.carried_on_switch);
    for id in ctx.battler_ids() {
        if id == battler {
            continue;
        }
        find_and_remove_tags(ctx, id, |tag| {
            tag.is_linked_to_source() && tag.state.source_id == Some(battler)
        });
    }
}

fn detach(ctx: &mut BattleContext, battler: BattlerId, mut tag: Tag) {
    tag.on_detach(ctx, battler);
    debug!(kind = %tag.kind(), battler = battler.0, "tag detached");
}

fn with_tag_removed<R>(
    ctx: &mut BattleContext,
    battler: BattlerId,
    kind: TagKind,
    f: impl FnOnce(&mut Tag, &mut BattleContext) -> R,
) -> Option<R> {
    let pos = ctx
        .battler(battler)?
        .tags
        .iter()
        .position(|t| t.kind() == kind)?;
    let mut tag = ctx.battler_mut(battler)?.tags.remove(pos);
    let result = f(&mut tag, ctx);
    if let Some(holder) = ctx.battler_mut(battler) {
        let at = pos.min(holder.tags.len());
        holder.tags.insert(at, tag);
    }
    Some(result)
}
