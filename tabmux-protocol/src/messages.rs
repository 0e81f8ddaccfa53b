//! Tab-broker message types
//!
//! Commands travel from a tab to the broker as `{ "cmd": ..., "data": ... }`
//! envelopes; replies travel back as bare JSON objects. The serde attributes
//! below pin the wire shapes exactly, including the command strings and the
//! camelCase field spelling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands sent from a tab to the broker
///
/// Serialized as an adjacently tagged envelope: the variant name is the
/// `cmd` string and the variant payload is the `data` field. Adding a
/// variant here forces the router's dispatch match to be extended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", content = "data")]
pub enum Command {
    /// Ask the broker whether a websocket connection is active anywhere
    #[serde(rename = "CHECK-WEBSOCKET")]
    CheckWebsocket,

    /// Report that this tab opened or closed the live websocket connection
    #[serde(rename = "UPDATE-WEBSOCKET")]
    UpdateWebsocket {
        #[serde(rename = "isActive")]
        is_active: bool,
    },

    /// Relay an arbitrary payload to every registered tab
    #[serde(rename = "SEND-MESSAGES-TABS")]
    SendMessagesTabs(Value),

    /// Withdraw the sending tab's port from the relay set
    #[serde(rename = "DELETE-PORT")]
    DeletePort,
}

impl Command {
    /// Return the wire command string for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::CheckWebsocket => "CHECK-WEBSOCKET",
            Command::UpdateWebsocket { .. } => "UPDATE-WEBSOCKET",
            Command::SendMessagesTabs(_) => "SEND-MESSAGES-TABS",
            Command::DeletePort => "DELETE-PORT",
        }
    }
}

/// Replies sent from the broker to a tab
///
/// Untagged: each variant already has a distinguishing field name, so the
/// wire carries the bare object with no envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    /// Answer to `CHECK-WEBSOCKET`, sent to the requesting tab only
    Status {
        #[serde(rename = "isWebsocketConnected")]
        is_websocket_connected: bool,
    },

    /// A payload relayed via `SEND-MESSAGES-TABS`
    Relay { message: Value },
}

impl Reply {
    /// Return the reply type name for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            Reply::Status { .. } => "Status",
            Reply::Relay { .. } => "Relay",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_websocket_wire_shape() {
        let msg = Command::CheckWebsocket;
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(wire, json!({ "cmd": "CHECK-WEBSOCKET" }));
    }

    #[test]
    fn test_check_websocket_parses() {
        let msg: Command = serde_json::from_value(json!({ "cmd": "CHECK-WEBSOCKET" })).unwrap();
        assert_eq!(msg, Command::CheckWebsocket);
    }

    #[test]
    fn test_update_websocket_wire_shape() {
        let msg = Command::UpdateWebsocket { is_active: true };
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            wire,
            json!({ "cmd": "UPDATE-WEBSOCKET", "data": { "isActive": true } })
        );
    }

    #[test]
    fn test_update_websocket_parses() {
        let msg: Command = serde_json::from_value(json!({
            "cmd": "UPDATE-WEBSOCKET",
            "data": { "isActive": false }
        }))
        .unwrap();
        assert_eq!(msg, Command::UpdateWebsocket { is_active: false });
    }

    #[test]
    fn test_send_messages_tabs_carries_arbitrary_payload() {
        let payloads = vec![
            json!("hello"),
            json!(42),
            json!({ "nested": { "deep": [1, 2, 3] } }),
            json!(null),
        ];

        for payload in payloads {
            let msg = Command::SendMessagesTabs(payload.clone());
            let wire = serde_json::to_value(&msg).unwrap();
            assert_eq!(wire, json!({ "cmd": "SEND-MESSAGES-TABS", "data": payload }));

            let parsed: Command = serde_json::from_value(wire).unwrap();
            assert_eq!(parsed, msg);
        }
    }

    #[test]
    fn test_delete_port_wire_shape() {
        let msg = Command::DeletePort;
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(wire, json!({ "cmd": "DELETE-PORT" }));
    }

    #[test]
    fn test_unknown_cmd_rejected() {
        // Unknown commands fail to parse; the connection layer logs and skips them
        let result = serde_json::from_value::<Command>(json!({ "cmd": "SELF-DESTRUCT" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_websocket_missing_is_active_rejected() {
        let result = serde_json::from_value::<Command>(json!({
            "cmd": "UPDATE-WEBSOCKET",
            "data": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_without_cmd_rejected() {
        let result = serde_json::from_value::<Command>(json!({ "data": 1 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_command_type_names() {
        assert_eq!(Command::CheckWebsocket.type_name(), "CHECK-WEBSOCKET");
        assert_eq!(
            Command::UpdateWebsocket { is_active: true }.type_name(),
            "UPDATE-WEBSOCKET"
        );
        assert_eq!(
            Command::SendMessagesTabs(json!(1)).type_name(),
            "SEND-MESSAGES-TABS"
        );
        assert_eq!(Command::DeletePort.type_name(), "DELETE-PORT");
    }

    #[test]
    fn test_status_reply_wire_shape() {
        let reply = Reply::Status {
            is_websocket_connected: false,
        };
        let wire = serde_json::to_value(&reply).unwrap();
        assert_eq!(wire, json!({ "isWebsocketConnected": false }));
    }

    #[test]
    fn test_relay_reply_wire_shape() {
        let reply = Reply::Relay {
            message: json!("hello"),
        };
        let wire = serde_json::to_value(&reply).unwrap();
        assert_eq!(wire, json!({ "message": "hello" }));
    }

    #[test]
    fn test_reply_parses_back_to_correct_variant() {
        let status: Reply = serde_json::from_value(json!({ "isWebsocketConnected": true })).unwrap();
        assert_eq!(
            status,
            Reply::Status {
                is_websocket_connected: true
            }
        );

        let relay: Reply = serde_json::from_value(json!({ "message": { "k": "v" } })).unwrap();
        assert_eq!(
            relay,
            Reply::Relay {
                message: json!({ "k": "v" })
            }
        );
    }

    #[test]
    fn test_reply_type_names() {
        let status = Reply::Status {
            is_websocket_connected: true,
        };
        let relay = Reply::Relay {
            message: json!(null),
        };
        assert_eq!(status.type_name(), "Status");
        assert_eq!(relay.type_name(), "Relay");
    }
}
