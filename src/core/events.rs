use crate::domain::model::RunEvent;
use crate::domain::ports::{EventSource, EventStream};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug)]
struct Subscriber {
    event_name: String,
    sender: mpsc::Sender<RunEvent>,
}

/// In-process event source for a single run.
///
/// Each subscription owns a bounded queue. `emit` waits while a matching
/// subscriber's queue is full, so a slow listener slows the producer down
/// instead of losing events. Events emitted before a subscription exists are
/// not replayed to it. Dropping the last `EventBus` clone closes all
/// subscriptions.
#[derive(Debug, Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
        }
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers the event to every subscription for its name, waiting for
    /// queue space. Returns how many subscriptions received it.
    pub async fn emit(&self, event: RunEvent) -> usize {
        let name = event.name();
        let senders: Vec<mpsc::Sender<RunEvent>> = self
            .subscribers()
            .iter()
            .filter(|s| s.event_name == name)
            .map(|s| s.sender.clone())
            .collect();

        let mut delivered = 0;
        for sender in &senders {
            if sender.send(event.clone()).await.is_ok() {
                delivered += 1;
            }
        }

        if delivered < senders.len() {
            self.subscribers().retain(|s| !s.sender.is_closed());
        }
        if delivered == 0 {
            tracing::debug!("No subscribers for '{}' event", name);
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers()
            .iter()
            .filter(|s| !s.sender.is_closed())
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, event_name: &str) -> Box<dyn EventStream> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        self.subscribers().push(Subscriber {
            event_name: event_name.to_string(),
            sender,
        });
        Box::new(Subscription { receiver })
    }
}

pub struct Subscription {
    receiver: mpsc::Receiver<RunEvent>,
}

#[async_trait]
impl EventStream for Subscription {
    async fn next(&mut self) -> Option<RunEvent> {
        self.receiver.recv().await
    }
}
