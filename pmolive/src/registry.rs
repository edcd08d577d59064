//! Subscriber registry
//!
//! Owns the set of connected push clients and the delivery primitives
//! ([`SubscriberRegistry::send_to`], [`SubscriberRegistry::broadcast`]).
//!
//! Membership lives in a `tokio::sync::RwLock<HashMap<..>>`. No lock is held
//! across a transport write: delivery works on cloned transport handles, so
//! an eviction during a broadcast pass never invalidates the iteration.
//!
//! Every write is bounded by the delivery timeout. A peer that stops reading
//! fails with [`TransportError::TimedOut`] and is treated like any other
//! failed delivery.
//!
//! Membership changes are published as [`RegistryEvent`]s.

use crate::error::{LiveError, Result, TransportError};
use crate::transport::PushTransport;
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Longest time one write may take before the subscriber is dropped
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Registered subscriber with its transport
pub type Member = (SubscriberId, Arc<dyn PushTransport>);

/// Process-unique identity of one push client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for SubscriberId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to an admitted subscriber
pub type Subscriber = SubscriberId;

/// Membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    Admitted(SubscriberId),
    Evicted(SubscriberId),
}

/// Outcome of one broadcast pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: Vec<SubscriberId>,
    pub evicted: Vec<SubscriberId>,
}

/// Set of live push subscribers
pub struct SubscriberRegistry {
    members: RwLock<HashMap<SubscriberId, Arc<dyn PushTransport>>>,
    next_id: AtomicU64,
    events: broadcast::Sender<RegistryEvent>,
    delivery_timeout: Duration,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::with_delivery_timeout(DEFAULT_DELIVERY_TIMEOUT)
    }

    pub fn with_delivery_timeout(delivery_timeout: Duration) -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            delivery_timeout,
        }
    }

    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    /// Handshakes with the transport and registers it
    ///
    /// Nothing is registered when the handshake fails.
    pub async fn admit(&self, transport: Arc<dyn PushTransport>) -> Result<Subscriber> {
        transport.accept().await.map_err(LiveError::Handshake)?;

        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let count = {
            let mut members = self.members.write().await;
            members.insert(id, transport);
            members.len()
        };

        info!(subscriber = %id, subscribers = count, "Subscriber admitted");
        let _ = self.events.send(RegistryEvent::Admitted(id));
        Ok(id)
    }

    /// Removes a subscriber
    ///
    /// Returns `false` when the subscriber was not a member; evicting twice
    /// is harmless.
    pub async fn evict(&self, subscriber: &Subscriber) -> bool {
        let (removed, count) = {
            let mut members = self.members.write().await;
            (members.remove(subscriber).is_some(), members.len())
        };

        if removed {
            info!(subscriber = %subscriber, subscribers = count, "Subscriber evicted");
            let _ = self.events.send(RegistryEvent::Evicted(*subscriber));
        } else {
            debug!(subscriber = %subscriber, "Evicting unknown subscriber, ignored");
        }
        removed
    }

    /// Delivers one message to one subscriber
    ///
    /// Fails with [`LiveError::DeliveryFailed`] when the write fails or the
    /// subscriber is no longer registered. The caller evicts.
    pub async fn send_to(&self, subscriber: &Subscriber, payload: &str) -> Result<()> {
        let transport = self.members.read().await.get(subscriber).cloned();
        let Some(transport) = transport else {
            return Err(LiveError::delivery_failed(
                *subscriber,
                TransportError::Closed,
            ));
        };

        self.deliver(transport.as_ref(), payload)
            .await
            .map_err(|e| LiveError::delivery_failed(*subscriber, e))
    }

    /// Delivers to every member concurrently and evicts the ones that fail
    pub async fn broadcast(&self, payload: &str) -> BroadcastReport {
        let members = self.members().await;
        self.broadcast_to(members, payload).await
    }

    /// Current members, cloned out of the lock
    pub async fn members(&self) -> Vec<Member> {
        self.members
            .read()
            .await
            .iter()
            .map(|(id, transport)| (*id, transport.clone()))
            .collect()
    }

    /// Like [`broadcast`](Self::broadcast), over a membership taken earlier
    ///
    /// Members evicted in the meantime are skipped.
    pub async fn broadcast_to(&self, members: Vec<Member>, payload: &str) -> BroadcastReport {
        let mut live = Vec::with_capacity(members.len());
        for member in members {
            if self.contains(&member.0).await {
                live.push(member);
            }
        }

        let results = join_all(live.into_iter().map(|(id, transport)| async move {
            (id, self.deliver(transport.as_ref(), payload).await)
        }))
        .await;

        let mut report = BroadcastReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.delivered.push(id),
                Err(e) => {
                    warn!(subscriber = %id, "Broadcast delivery failed: {}", e);
                    if self.evict(&id).await {
                        report.evicted.push(id);
                    }
                }
            }
        }
        report
    }

    async fn deliver(
        &self,
        transport: &dyn PushTransport,
        payload: &str,
    ) -> std::result::Result<(), TransportError> {
        match tokio::time::timeout(self.delivery_timeout, transport.send_text(payload)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::TimedOut(self.delivery_timeout)),
        }
    }

    pub async fn contains(&self, subscriber: &Subscriber) -> bool {
        self.members.read().await.contains_key(subscriber)
    }

    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Stream of membership changes
    pub fn subscribe_events(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Resolves once `subscriber` is no longer a member
    pub async fn wait_evicted(&self, subscriber: &Subscriber) {
        let mut events = self.subscribe_events();
        loop {
            if !self.contains(subscriber).await {
                return;
            }
            match events.recv().await {
                Ok(RegistryEvent::Evicted(id)) if id == *subscriber => return,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }

    /// Resolves once the registry has at least one member
    pub async fn wait_non_empty(&self) {
        let mut events = self.subscribe_events();
        loop {
            if !self.is_empty().await {
                return;
            }
            if let Err(broadcast::error::RecvError::Closed) = events.recv().await {
                return;
            }
        }
    }
}
