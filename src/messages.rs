//! Typed command messages passed between browsing contexts.
//!
//! Contexts never share state directly. A frame's ruler, the control panel
//! and the page's own lifecycle code all talk to a ruler by posting a
//! [`Command`] into that context's [`Mailbox`]. Payloads travel as JSON
//! [`Envelope`]s tagged with [`MESSAGE_GUARD`]; anything else that shows up
//! in a mailbox is dropped on decode.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::MESSAGE_GUARD;
use crate::geometry::Rectangle;
use crate::preferences::PreferenceSnapshot;

/// Identity of a browsing context (the top page, an embedded frame, or the
/// control panel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(pub u32);

impl ContextId {
    pub const TOP: ContextId = ContextId(0);
    pub const CONTROL_PANEL: ContextId = ContextId(u32::MAX);
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ContextId::TOP => write!(f, "top"),
            ContextId::CONTROL_PANEL => write!(f, "control-panel"),
            ContextId(id) => write!(f, "frame#{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Transient show, sent on focus gain or click.
    Activate,
    /// Transient hide, sent on focus loss or pointer exit.
    Deactivate,
    Options(PreferenceSnapshot),
    Show,
    Hide,
    Stash,
    /// Frame-relative rectangle computed by a frame's ruler.
    PositionAt { rect: Rectangle },
}

impl Command {
    /// Commands relayed from a frame's proxy visualizer to its parent.
    pub fn is_frame_relay(&self) -> bool {
        matches!(
            self,
            Command::Show | Command::Hide | Command::Stash | Command::PositionAt { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    #[serde(flatten)]
    pub command: Command,
}

impl Envelope {
    pub fn new(command: Command) -> Self {
        Self {
            guard: Some(MESSAGE_GUARD.to_string()),
            command,
        }
    }

    pub fn encode(&self) -> String {
        // Serializing plain data with string keys cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parses a payload, returning `None` for foreign or malformed traffic.
    pub fn decode(payload: &str) -> Option<Self> {
        let envelope: Envelope = serde_json::from_str(payload).ok()?;
        if envelope.guard.as_deref() == Some(MESSAGE_GUARD) {
            Some(envelope)
        } else {
            None
        }
    }
}

/// A raw payload as delivered, stamped with the sending context.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub source: ContextId,
    pub payload: String,
}

/// A decoded command together with the context that sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub source: ContextId,
    pub command: Command,
}

/// Receiving end of a context's message channel.
#[derive(Debug)]
pub struct Mailbox {
    owner: ContextId,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl Mailbox {
    pub fn new(owner: ContextId) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { owner, tx, rx }
    }

    pub fn owner(&self) -> ContextId {
        self.owner
    }

    /// A sender that posts into this mailbox on behalf of `source`.
    pub fn sender_from(&self, source: ContextId) -> MessageSender {
        MessageSender {
            source,
            target: self.owner,
            tx: self.tx.clone(),
        }
    }

    /// Takes every pending delivery, decoding and filtering as it goes.
    pub fn drain(&self) -> Vec<Inbound> {
        let mut out = Vec::new();
        while let Ok(delivery) = self.rx.try_recv() {
            match Envelope::decode(&delivery.payload) {
                Some(envelope) => out.push(Inbound {
                    source: delivery.source,
                    command: envelope.command,
                }),
                None => trace!(
                    owner = %self.owner,
                    source = %delivery.source,
                    "dropping unrecognized message"
                ),
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct MessageSender {
    source: ContextId,
    target: ContextId,
    tx: Sender<Delivery>,
}

impl MessageSender {
    pub fn source(&self) -> ContextId {
        self.source
    }

    pub fn target(&self) -> ContextId {
        self.target
    }

    pub fn send(&self, command: Command) {
        self.send_raw(Envelope::new(command).encode());
    }

    /// Posts an arbitrary payload; the receiving mailbox decides whether it
    /// is one of ours.
    pub fn send_raw(&self, payload: String) {
        let delivery = Delivery {
            source: self.source,
            payload,
        };
        if self.tx.send(delivery).is_err() {
            trace!(target_context = %self.target, "mailbox closed; message dropped");
        }
    }
}

/// Fans one command out to several mailboxes.
#[derive(Debug, Clone, Default)]
pub struct Broadcaster {
    senders: Vec<MessageSender>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sender: MessageSender) {
        self.senders.push(sender);
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn broadcast(&self, command: &Command) {
        for sender in &self.senders {
            sender.send(command.clone());
        }
    }
}
