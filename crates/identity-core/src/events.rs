//! In-process lifecycle events.
//!
//! Services publish after successful persistence; delivery is best-effort
//! broadcast and never fails the publishing operation.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::now_unix_millis;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle events emitted by the hub services.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum HubEvent {
    ParticipantContextCreated {
        participant_context_id: String,
    },
    ParticipantContextUpdated {
        participant_context_id: String,
    },
    ParticipantContextDeleted {
        participant_context_id: String,
    },
    KeyPairAdded {
        participant_context_id: String,
        key_id: String,
    },
    KeyPairActivated {
        participant_context_id: String,
        key_id: String,
    },
    KeyPairRotated {
        participant_context_id: String,
        key_id: String,
    },
    KeyPairRevoked {
        participant_context_id: String,
        key_id: String,
    },
    CredentialStored {
        participant_context_id: String,
        credential_id: String,
    },
    CredentialDeleted {
        participant_context_id: String,
        credential_id: String,
    },
}

impl HubEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HubEvent::ParticipantContextCreated { .. } => "participantcontext.created",
            HubEvent::ParticipantContextUpdated { .. } => "participantcontext.updated",
            HubEvent::ParticipantContextDeleted { .. } => "participantcontext.deleted",
            HubEvent::KeyPairAdded { .. } => "keypair.added",
            HubEvent::KeyPairActivated { .. } => "keypair.activated",
            HubEvent::KeyPairRotated { .. } => "keypair.rotated",
            HubEvent::KeyPairRevoked { .. } => "keypair.revoked",
            HubEvent::CredentialStored { .. } => "credential.stored",
            HubEvent::CredentialDeleted { .. } => "credential.deleted",
        }
    }
}

/// An event with its capture timestamp (epoch millis).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventEnvelope {
    pub at: i64,
    pub event: HubEvent,
}

/// Broadcast bus connecting services to in-process subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: HubEvent) {
        let envelope = EventEnvelope {
            at: now_unix_millis(),
            event,
        };

        // A send error only means nobody is listening right now.
        if self.sender.send(envelope.clone()).is_err() {
            tracing::trace!(event = envelope.event.name(), "event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}
