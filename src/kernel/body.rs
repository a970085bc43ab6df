use std::any::Any;
use std::borrow::Borrow;
use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key of a body inside a roster. Assigned at creation, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ActorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Who drives a body. The turn processor branches on this tag in its
/// observation phase; every body otherwise has the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    AiControlled,
}

/// Opaque slot owned by the AI collaborator. The kernel only moves it around.
#[derive(Default)]
pub struct AiState {
    slot: Option<Box<dyn Any + Send>>,
}

impl AiState {
    pub fn set<T: Any + Send>(&mut self, value: T) {
        self.slot = Some(Box::new(value));
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.slot.as_ref().and_then(|s| s.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.slot.as_mut().and_then(|s| s.downcast_mut::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

impl fmt::Debug for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiState")
            .field("initialized", &self.slot.is_some())
            .finish()
    }
}

/// A participant in the session: health, identity and pending commands.
#[derive(Debug)]
pub struct Body {
    id: ActorId,
    role: Role,
    health: i32,
    max_health: i32,
    queue: VecDeque<String>,
    pub ai: AiState,
}

impl Body {
    pub fn new(id: ActorId, role: Role, max_health: i32) -> Self {
        Self {
            id,
            role,
            health: max_health,
            max_health,
            queue: VecDeque::new(),
            ai: AiState::default(),
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Knocked out is exactly `health <= 0`; no other threshold exists.
    pub fn is_active(&self) -> bool {
        self.health > 0
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health;
    }

    pub fn damage(&mut self, amount: u32) {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.health = self.health.saturating_sub(amount);
    }

    /// Heals up to `max_health`. Does not lower health already above the cap.
    pub fn restore(&mut self, amount: u32) {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        if self.health < self.max_health {
            self.health = self.health.saturating_add(amount).min(self.max_health);
        }
    }

    /// Payloads are opaque; interpretation belongs to the command handler.
    pub fn enqueue_command(&mut self, text: impl Into<String>) {
        self.queue.push_back(text.into());
    }

    pub fn has_pending_command(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending_commands(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn pop_command(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Drops the whole backlog without running any of it. Returns how many
    /// commands were dropped.
    pub fn discard_all_commands(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }
}
