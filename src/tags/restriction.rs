//! Move-restriction tags.
//!
//! These differ only in the restriction predicate and in how the restricted
//! move set is captured: at attach time from the holder's move history
//! (disable, encore), or dynamically from another battler's current moveset
//! (imprison). The shared pre-move lapse cancels an already-queued restricted
//! move; all other checkpoints fall back to the base countdown.

use crate::battle::BattleContext;
use crate::battler::Battler;
use crate::checkpoint::Checkpoint;
use crate::ids::{BattlerId, MoveId};
use crate::messages::MessageEvent;
use crate::moves::MoveDex;
use crate::tag::{MoveRestriction, TagBehavior, TagState};

/// Shared pre-move lapse for restriction tags: if the in-flight move belongs
/// to the holder and is restricted, cancel it and emit the interruption text.
/// Other checkpoints count down.
pub(crate) fn lapse_restricted<R: MoveRestriction + ?Sized>(
    restriction: &R,
    state: &mut TagState,
    ctx: &mut BattleContext,
    battler: BattlerId,
    checkpoint: Checkpoint,
) -> bool {
    if checkpoint != Checkpoint::PreMove {
        return state.count_down();
    }
    let Some(phase) = ctx.current_move() else {
        return true;
    };
    if phase.user != battler || phase.cancelled {
        return true;
    }
    let move_id = phase.move_id;
    let message = {
        let Some(user) = ctx.battler(battler) else {
            return true;
        };
        if !restriction.is_move_restricted(move_id, user, ctx) {
            return true;
        }
        restriction.interrupted_text(user, move_id, &ctx.dex)
    };
    ctx.cancel_current_move();
    if let Some(message) = message {
        ctx.queue.enqueue(message);
    }
    true
}

fn restriction_message(
    key: &str,
    user: &Battler,
    move_id: MoveId,
    dex: &MoveDex,
) -> MessageEvent {
    MessageEvent::new(
        key,
        vec![user.name_key.clone(), dex.name_key(move_id).to_string()],
    )
}

/// Single-move lock: the move to disable is captured from the holder's move
/// history when the tag attaches.
#[derive(Debug, Clone, Default)]
pub struct DisabledTag {
    pub move_id: Option<MoveId>,
}

impl MoveRestriction for DisabledTag {
    fn is_move_restricted(&self, move_id: MoveId, _user: &Battler, _ctx: &BattleContext) -> bool {
        // No captured move means the effect fizzles; the tag still expires on
        // its own schedule.
        self.move_id == Some(move_id)
    }

    fn selection_denied_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> MessageEvent {
        restriction_message("tag.disabled.denied", user, move_id, dex)
    }

    fn interrupted_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> Option<MessageEvent> {
        Some(restriction_message("tag.disabled.interrupted", user, move_id, dex))
    }
}

impl TagBehavior for DisabledTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler)
            .is_some_and(|b| !b.last_moves(1).is_empty())
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        let Some(&captured) = holder.last_moves(1).first() else {
            return;
        };
        self.move_id = Some(captured);
        let message = restriction_message("tag.disabled.added", holder, captured, &ctx.dex);
        ctx.queue.enqueue(message);
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some((holder, move_id)) = ctx.battler(battler).zip(self.move_id) else {
            return;
        };
        let message = restriction_message("tag.disabled.removed", holder, move_id, &ctx.dex);
        ctx.queue.enqueue(message);
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        lapse_restricted(self, state, ctx, battler, checkpoint)
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.disabled"
    }

    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        Some(self)
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        if let Some(move_id) = self.move_id {
            extra.insert("moveId".into(), serde_json::json!(move_id.0));
        }
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        self.move_id = extra
            .get("moveId")
            .and_then(|v| v.as_u64())
            .map(|v| MoveId(v as u16));
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Status-move ban.
#[derive(Debug, Clone, Default)]
pub struct TauntedTag;

impl MoveRestriction for TauntedTag {
    fn is_move_restricted(&self, move_id: MoveId, _user: &Battler, ctx: &BattleContext) -> bool {
        ctx.dex.is_status(move_id)
    }

    fn selection_denied_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> MessageEvent {
        restriction_message("tag.taunted.denied", user, move_id, dex)
    }

    fn interrupted_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> Option<MessageEvent> {
        Some(restriction_message("tag.taunted.interrupted", user, move_id, dex))
    }
}

impl TagBehavior for TauntedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_added(ctx, battler, "tag.taunted.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        lapse_restricted(self, state, ctx, battler, checkpoint)
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.taunted"
    }

    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        Some(self)
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Sound-move ban.
#[derive(Debug, Clone, Default)]
pub struct ThroatChoppedTag;

impl MoveRestriction for ThroatChoppedTag {
    fn is_move_restricted(&self, move_id: MoveId, _user: &Battler, ctx: &BattleContext) -> bool {
        ctx.dex.is_sound_based(move_id)
    }

    fn selection_denied_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> MessageEvent {
        restriction_message("tag.throat_chopped.denied", user, move_id, dex)
    }

    fn interrupted_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> Option<MessageEvent> {
        Some(restriction_message(
            "tag.throat_chopped.interrupted",
            user,
            move_id,
            dex,
        ))
    }
}

impl TagBehavior for ThroatChoppedTag {
    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        lapse_restricted(self, state, ctx, battler, checkpoint)
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.throat_chopped"
    }

    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        Some(self)
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Shared-moveset ban: moves known by the tag's source are forbidden. The
/// restricted set is read dynamically from the source's current moveset; a
/// stale source restricts nothing.
#[derive(Debug, Clone, Default)]
pub struct ImprisonedTag {
    pub source: Option<BattlerId>,
}

impl MoveRestriction for ImprisonedTag {
    fn is_move_restricted(&self, move_id: MoveId, _user: &Battler, ctx: &BattleContext) -> bool {
        self.source
            .and_then(|id| ctx.active_battler(id))
            .is_some_and(|source| source.moveset.contains(&move_id))
    }

    fn selection_denied_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> MessageEvent {
        restriction_message("tag.imprisoned.denied", user, move_id, dex)
    }

    fn interrupted_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> Option<MessageEvent> {
        Some(restriction_message("tag.imprisoned.interrupted", user, move_id, dex))
    }
}

impl TagBehavior for ImprisonedTag {
    fn on_attach(&mut self, state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        self.source = state.source_id;
        enqueue_added(ctx, battler, "tag.imprisoned.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint == Checkpoint::PreMove {
            return lapse_restricted(self, state, ctx, battler, checkpoint);
        }
        // Persists as long as the source stays on the field.
        self.source.is_some_and(|id| ctx.active_battler(id).is_some())
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.imprisoned"
    }

    fn is_linked_to_source(&self) -> bool {
        true
    }

    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        Some(self)
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        if let Some(source) = self.source {
            extra.insert("source".into(), serde_json::json!(source.0));
        }
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        self.source = extra
            .get("source")
            .and_then(|v| v.as_u64())
            .map(|v| BattlerId(v as u32));
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Last-move-repeat ban.
#[derive(Debug, Clone, Default)]
pub struct TormentedTag;

impl MoveRestriction for TormentedTag {
    fn is_move_restricted(&self, move_id: MoveId, user: &Battler, _ctx: &BattleContext) -> bool {
        user.last_moves(1).first() == Some(&move_id)
    }

    fn selection_denied_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> MessageEvent {
        restriction_message("tag.tormented.denied", user, move_id, dex)
    }
}

impl TagBehavior for TormentedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_added(ctx, battler, "tag.tormented.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        // Torment never expires on its own; the pre-move arm still cancels
        // (silently — no interruption text is configured).
        if checkpoint == Checkpoint::PreMove {
            return lapse_restricted(self, state, ctx, battler, checkpoint);
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.tormented"
    }

    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        Some(self)
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Heal-move ban.
#[derive(Debug, Clone, Default)]
pub struct HealBlockedTag;

impl MoveRestriction for HealBlockedTag {
    fn is_move_restricted(&self, move_id: MoveId, _user: &Battler, ctx: &BattleContext) -> bool {
        ctx.dex.is_heal_move(move_id)
    }

    fn selection_denied_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> MessageEvent {
        restriction_message("tag.heal_blocked.denied", user, move_id, dex)
    }

    fn interrupted_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> Option<MessageEvent> {
        Some(restriction_message(
            "tag.heal_blocked.interrupted",
            user,
            move_id,
            dex,
        ))
    }
}

impl TagBehavior for HealBlockedTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_added(ctx, battler, "tag.heal_blocked.added");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        lapse_restricted(self, state, ctx, battler, checkpoint)
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.heal_blocked"
    }

    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        Some(self)
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Locked to repeating one move: everything except the captured move is
/// restricted, and the holder's pending action is rewritten to the captured
/// move when the tag attaches.
#[derive(Debug, Clone, Default)]
pub struct EncoredTag {
    pub move_id: Option<MoveId>,
}

impl MoveRestriction for EncoredTag {
    fn is_move_restricted(&self, move_id: MoveId, _user: &Battler, _ctx: &BattleContext) -> bool {
        self.move_id.is_some_and(|locked| locked != move_id)
    }

    fn selection_denied_text(
        &self,
        user: &Battler,
        move_id: MoveId,
        dex: &MoveDex,
    ) -> MessageEvent {
        restriction_message("tag.encored.denied", user, move_id, dex)
    }
}

impl TagBehavior for EncoredTag {
    fn can_attach(&self, _state: &TagState, ctx: &BattleContext, battler: BattlerId) -> bool {
        ctx.battler(battler)
            .is_some_and(|b| !b.last_moves(1).is_empty())
    }

    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(captured) = ctx
            .battler(battler)
            .and_then(|b| b.last_moves(1).first().copied())
        else {
            return;
        };
        self.move_id = Some(captured);
        ctx.retarget_pending_move(battler, captured);
        enqueue_added(ctx, battler, "tag.encored.added");
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_added(ctx, battler, "tag.encored.removed");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        lapse_restricted(self, state, ctx, battler, checkpoint)
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.encored"
    }

    fn as_restriction(&self) -> Option<&dyn MoveRestriction> {
        Some(self)
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        if let Some(move_id) = self.move_id {
            extra.insert("moveId".into(), serde_json::json!(move_id.0));
        }
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        self.move_id = extra
            .get("moveId")
            .and_then(|v| v.as_u64())
            .map(|v| MoveId(v as u16));
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

fn enqueue_added(ctx: &mut BattleContext, battler: BattlerId, key: &str) {
    let Some(holder) = ctx.battler(battler) else {
        return;
    };
    let message = MessageEvent::new(key, vec![holder.name_key.clone()]);
    ctx.queue.enqueue(message);
}
