//! Typed event channel for load-progress notifications.

/// A generic, typed event channel.
///
/// The bus is generic over the event type `T` so this crate stays decoupled
/// from the event enums defined by higher-level crates. Backed by an
/// unbounded flume channel; publishing never blocks.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Create a new bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Send an event, logging an error if the receiver is disconnected.
    pub fn publish(&self, event: T) {
        if self.sender.send(event).is_err() {
            log::error!("failed to publish event: receiver disconnected");
        }
    }

    /// A clone of the sender end, for handing to producers.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// The receiver end, for the owner of the bus to process events.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Drain every event currently queued.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
