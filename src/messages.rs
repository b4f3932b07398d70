//! Presentation queues: messages and animation requests.
//!
//! Fire-and-forget from the engine's perspective. Tags enqueue what should be
//! shown; nothing in the engine reads the queues back (tests do). Text is
//! represented as a key plus ordered params — formatting is the presentation
//! layer's job.

use crate::ids::BattlerId;
use crate::tag::TagKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub text_key: String,
    pub params: Vec<String>,
    pub delay_ms: Option<u32>,
}

impl MessageEvent {
    pub fn new(text_key: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            text_key: text_key.into(),
            params,
            delay_ms: None,
        }
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

/// What a requested animation depicts. Playback is entirely external.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// A tag's signature intro animation (trap coils, substitute doll, ...).
    TagIntro(TagKind),
    /// A protection effect blocked an incoming move.
    ProtectBlock,
    /// The substitute doll absorbed a hit.
    SubstituteHit,
    /// The substitute doll shifts in or out of focus.
    SubstituteFocus(bool),
    /// The battler's sprite is hidden (semi-invulnerable entry).
    Hide,
    /// The battler's sprite is shown again.
    Show,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationEvent {
    pub kind: AnimationKind,
    pub participants: Vec<BattlerId>,
}

/// Ordered queues of presentation requests for the current phase.
#[derive(Debug, Clone, Default)]
pub struct PresentationQueue {
    messages: Vec<MessageEvent>,
    animations: Vec<AnimationEvent>,
}

impl PresentationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_message(&mut self, text_key: impl Into<String>, params: Vec<String>) {
        self.messages.push(MessageEvent::new(text_key, params));
    }

    pub fn enqueue(&mut self, message: MessageEvent) {
        self.messages.push(message);
    }

    pub fn enqueue_animation(&mut self, kind: AnimationKind, participants: Vec<BattlerId>) {
        self.animations.push(AnimationEvent { kind, participants });
    }

    pub fn messages(&self) -> &[MessageEvent] {
        &self.messages
    }

    pub fn animations(&self) -> &[AnimationEvent] {
        &self.animations
    }

    /// Hand the queued messages to the presentation layer.
    pub fn drain_messages(&mut self) -> Vec<MessageEvent> {
        std::mem::take(&mut self.messages)
    }

    pub fn drain_animations(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.animations)
    }
}
