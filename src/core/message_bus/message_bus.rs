//=========================================================================
// Message Bus
//=========================================================================
//
// Type-keyed, frame-scoped message queues shared by systems and scenes.
//
// Architecture:
//   Systems/Scenes → push<M>() → HashMap<TypeId, Vec<M>>
//                                      ↓
//   Multiple consumers ← read<M>() / latest<M>()
//                                      ↓
//   Engine ───────────→ clear_all() at tick start
//
// Carries actions, scene transitions, scene payloads (score handed from
// Game to GameOver) and feedback cues.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashMap;

use log::error;

//=== Internal Dependencies ===============================================

use super::message_queue::MessageQueue;

//=== Public API ==========================================================

/// Marker trait for types that can travel on the bus.
pub trait Message: Send + 'static {}

impl<T: Send + 'static> Message for T {}

//=========================================================================

/// Per-type message queues.
pub struct MessageBus {
    queues: HashMap<TypeId, Box<dyn MessageQueue>>,
}

impl MessageBus {
    pub fn new() -> Self {
        MessageBus {
            queues: HashMap::new(),
        }
    }

    //--- Message Operations -----------------------------------------------

    /// Pushes a message onto the queue for its type.
    pub fn push<M: Message>(&mut self, msg: M) {
        let queue = self
            .queues
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Vec::<M>::new()));

        match queue.as_any_mut().downcast_mut::<Vec<M>>() {
            Some(queue) => queue.push(msg),
            None => error!(
                target: "message_bus",
                "Message queue for {} holds a different type",
                std::any::type_name::<M>()
            ),
        }
    }

    /// All queued messages of type `M`, oldest first.
    pub fn read<M: Message>(&self) -> &[M] {
        self.queue::<M>().map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Most recently pushed message of type `M`.
    pub fn latest<M: Message>(&self) -> Option<&M> {
        self.queue::<M>().and_then(|v| v.last())
    }

    /// Removes and returns all messages of type `M`, keeping capacity.
    pub fn drain<M: Message>(&mut self) -> Vec<M> {
        self.queues
            .get_mut(&TypeId::of::<M>())
            .and_then(|q| q.as_any_mut().downcast_mut::<Vec<M>>())
            .map(|v| v.drain(..).collect())
            .unwrap_or_default()
    }

    //--- Query API --------------------------------------------------------

    pub fn has_messages<M: Message>(&self) -> bool {
        self.count::<M>() > 0
    }

    pub fn count<M: Message>(&self) -> usize {
        self.queue::<M>().map(|v| v.len()).unwrap_or(0)
    }

    /// Clears all messages of type `M`, preserving capacity.
    pub fn clear<M: Message>(&mut self) {
        if let Some(queue) = self.queues.get_mut(&TypeId::of::<M>()) {
            queue.clear_queue();
        }
    }

    /// Clears every queue, preserving map entries and capacity.
    pub fn clear_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear_queue();
        }
    }

    /// Total number of queued messages across all types.
    pub fn total_len(&self) -> usize {
        self.queues.values().map(|q| q.len()).sum()
    }

    fn queue<M: Message>(&self) -> Option<&Vec<M>> {
        self.queues
            .get(&TypeId::of::<M>())
            .and_then(|q| q.as_any().downcast_ref::<Vec<M>>())
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
