//! Port Registry
//!
//! Tracks the ports of currently connected tabs in the order they
//! connected. Membership changes only through explicit register and
//! unregister calls; a dead transport does not remove its port.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use tabmux_protocol::Reply;

/// Unique port identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(u64);

impl PortId {
    pub(crate) fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Port({})", self.0)
    }
}

/// A connected tab's port: its identity plus the channel replies are
/// queued on
#[derive(Clone)]
pub struct Port {
    id: PortId,
    replies: mpsc::Sender<Reply>,
}

impl Port {
    pub(crate) fn new(id: PortId, replies: mpsc::Sender<Reply>) -> Self {
        Self { id, replies }
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    /// Queue a reply without blocking the broker loop
    ///
    /// Returns `true` if the reply was queued. A closed or full channel
    /// drops the reply with a log line; the port stays registered either
    /// way, since only `DELETE-PORT` changes membership.
    pub fn deliver(&self, reply: Reply) -> bool {
        match self.replies.try_send(reply) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Closed(reply)) => {
                warn!("{} channel closed, dropping {}", self.id, reply.type_name());
                false
            }
            Err(mpsc::error::TrySendError::Full(reply)) => {
                warn!("{} channel full, dropping {}", self.id, reply.type_name());
                false
            }
        }
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id)
            .field("replies_closed", &self.replies.is_closed())
            .finish()
    }
}

/// Registry tracking all connected ports in insertion order
///
/// Owned exclusively by the broker event loop; single-task access is
/// what makes every mutation atomic relative to every other.
pub struct PortRegistry {
    ports: Vec<Port>,
}

impl Default for PortRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PortRegistry {
    /// Create a new empty port registry
    pub fn new() -> Self {
        Self { ports: Vec::new() }
    }

    /// Add a port to the registry
    ///
    /// No de-duplication: registering the same port twice makes it a
    /// relay target twice.
    pub fn register(&mut self, port: Port) {
        debug!("Registered {}", port.id());
        self.ports.push(port);
    }

    /// Remove a port by identity
    ///
    /// At most one entry is removed even when duplicates exist. A port
    /// that is not registered is a no-op.
    pub fn unregister(&mut self, id: PortId) {
        if let Some(pos) = self.ports.iter().position(|p| p.id() == id) {
            self.ports.remove(pos);
            debug!("Unregistered {}", id);
        }
    }

    /// Iterate over currently registered ports, in connection order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    /// Get the number of registered ports
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
