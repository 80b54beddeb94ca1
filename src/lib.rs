//! Unreal Bridge Library
//!
//! This library exposes a running Unreal Editor (with the socket plugin
//! loaded) as a set of callable operations over one persistent TCP
//! connection:
//!
//! - `ipc` - connection management, reply decoding and the transaction client
//! - `reply` - the tagged `Reply` type and its error taxonomy
//! - `config` - endpoint and transport settings
//! - `operations` - the editor operation catalogue and tool dispatch
//!
//! # Usage
//!
//! ```ignore
//! use unreal_bridge::{BridgeClient, BridgeConfig};
//! use serde_json::json;
//!
//! let mut client = BridgeClient::new(BridgeConfig::from_env());
//! client.connect_on_startup().await;
//! let reply = client.execute("get_actors", json!({})).await;
//! ```

pub mod config;
pub mod ipc;
pub mod operations;
pub mod reply;

pub use config::{BridgeConfig, FramingMode};
pub use ipc::BridgeClient;
pub use reply::{BridgeError, Reply};
