//! In-process event bus backed by a tokio broadcast channel.
//!
//! Rule events are advisory: a slow subscriber loses the oldest events
//! instead of slowing the engine down, and the gap is logged.

use std::future::Future;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use minifence_domain::error::MiniFenceError;
use minifence_domain::event::Event;

use crate::ports::EventPublisher;

/// Fan-out of rule events to every live [`EventSubscription`].
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// A bus retaining at most `capacity` undelivered events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
            missed: 0,
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), MiniFenceError>> + Send {
        let (id, event_type) = (event.id, event.event_type);
        // zero subscribers is not an error
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(%id, %event_type, delivered, "event published");
        async { Ok(()) }
    }
}

/// One subscriber's view of the bus.
pub struct EventSubscription {
    receiver: broadcast::Receiver<Event>,
    missed: u64,
}

impl EventSubscription {
    /// The next event, or `None` once the bus is dropped.
    ///
    /// When this subscriber fell behind, the overwritten events are counted
    /// in [`missed`](Self::missed) and delivery resumes with the oldest
    /// event still retained.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber fell behind");
                    self.missed += skipped;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Events lost to lagging since the subscription was created.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }
}
