//! Transaction layer between the bridge and the Unreal Editor plugin.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐          TCP 9000           ┌─────────────────────┐
//! │  unreal-bridge  │  ◄────────────────────────► │  Unreal Editor      │
//! │ (BridgeClient)  │   JSON request / reply      │  socket plugin      │
//! └─────────────────┘                             └─────────────────────┘
//! ```
//!
//! # Protocol
//!
//! A request is one JSON object written in a single send:
//!
//! ```text
//! {"command": "get_actors", "params": {}}
//! ```
//!
//! The plugin does not frame its replies. A reply is whatever one bounded
//! read returns, run through [`decode`] to undo the plugin's redundant
//! quoting. A reply larger than one read, or split across TCP segments,
//! therefore decodes as a malformed reply. [`FramingMode::ContentLength`]
//! switches both directions to LSP-style `Content-Length` framing for
//! endpoints that support it.
//!
//! [`FramingMode::ContentLength`]: crate::config::FramingMode::ContentLength
//!
//! # Usage
//!
//! ```ignore
//! use unreal_bridge::ipc::BridgeClient;
//! use serde_json::json;
//!
//! let mut client = BridgeClient::new(config);
//! let reply = client.execute("get_actor_details", json!({"actor_name": "Floor"})).await;
//! ```

mod client;
mod connection;
mod decoder;
mod framing;

pub use client::{BridgeClient, Request, MAX_RETRIES};
pub use connection::{Connection, ConnectionManager};
pub use decoder::{decode, normalize};
pub use framing::{read_chunk, read_message, write_message, write_raw, MAX_MESSAGE_SIZE};
