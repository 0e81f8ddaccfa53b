//! Message Router
//!
//! The broker event loop: interprets commands from connected tabs and
//! dispatches them to the Port Registry and Status Store, or relays a
//! payload to the registered ports. All shared state lives here and is
//! touched by exactly one task, which is what makes each command atomic
//! relative to every other.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use tabmux_protocol::{Command, Reply};
use tabmux_utils::{Result, TabmuxError};

use crate::registry::{Port, PortId, PortRegistry};
use crate::status::StatusStore;

/// Events consumed by the broker loop
pub enum BrokerEvent {
    /// A new tab connected; its port joins the registry before any of
    /// its commands are dispatched
    Connect { port: Port },
    /// A command from a connected tab
    Command { port: Port, command: Command },
}

/// The shared connection broker
///
/// Constructed once at startup; tests construct as many independent
/// instances as they need.
pub struct Broker {
    registry: PortRegistry,
    status: StatusStore,
    events: mpsc::Receiver<BrokerEvent>,
}

/// Cloneable front for connection tasks to reach the broker loop
#[derive(Clone)]
pub struct BrokerHandle {
    events: mpsc::Sender<BrokerEvent>,
    next_port_id: Arc<AtomicU64>,
}

impl Broker {
    /// Create a broker and the handle used to feed it events
    pub fn new(event_queue_depth: usize) -> (Self, BrokerHandle) {
        let (tx, rx) = mpsc::channel(event_queue_depth);

        let broker = Self {
            registry: PortRegistry::new(),
            status: StatusStore::new(),
            events: rx,
        };
        let handle = BrokerHandle {
            events: tx,
            next_port_id: Arc::new(AtomicU64::new(1)),
        };

        (broker, handle)
    }

    /// Spawn the event loop onto the runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the event loop until every handle is dropped
    pub async fn run(mut self) {
        info!("Broker event loop started");
        while let Some(event) = self.events.recv().await {
            // One event runs to completion before the next is received
            self.handle_event(event);
        }
        info!("Broker event loop stopped");
    }

    fn handle_event(&mut self, event: BrokerEvent) {
        match event {
            BrokerEvent::Connect { port } => self.registry.register(port),
            BrokerEvent::Command { port, command } => self.dispatch(port, command),
        }
    }

    fn dispatch(&mut self, port: Port, command: Command) {
        debug!("{} -> {}", port.id(), command.type_name());

        match command {
            Command::CheckWebsocket => {
                // Replies go over the requesting port's own channel, not
                // through the registry: a port that already sent
                // DELETE-PORT still gets its answer.
                port.deliver(Reply::Status {
                    is_websocket_connected: self.status.is_active(),
                });
            }
            Command::UpdateWebsocket { is_active } => {
                self.status.set_active(is_active);
            }
            Command::SendMessagesTabs(payload) => {
                // Sender-inclusive: the originating tab hears its own relay
                let mut delivered = 0;
                for target in self.registry.ports() {
                    if target.deliver(Reply::Relay {
                        message: payload.clone(),
                    }) {
                        delivered += 1;
                    }
                }
                debug!("Relayed payload from {} to {} ports", port.id(), delivered);
            }
            Command::DeletePort => {
                self.registry.unregister(port.id());
            }
        }
    }
}

impl BrokerHandle {
    /// Register a new tab and return its port
    ///
    /// The registration event is queued ahead of any command the caller
    /// forwards afterwards, so the port is in the registry before its
    /// first command is dispatched.
    pub async fn connect(&self, replies: mpsc::Sender<Reply>) -> Result<Port> {
        let id = PortId::from_raw(self.next_port_id.fetch_add(1, Ordering::SeqCst));
        let port = Port::new(id, replies);

        self.events
            .send(BrokerEvent::Connect { port: port.clone() })
            .await
            .map_err(|_| TabmuxError::ConnectionClosed)?;

        Ok(port)
    }

    /// Forward a command from a tab to the broker loop
    pub async fn send(&self, port: &Port, command: Command) -> Result<()> {
        self.events
            .send(BrokerEvent::Command {
                port: port.clone(),
                command,
            })
            .await
            .map_err(|_| TabmuxError::ConnectionClosed)
    }
}
