//! Transaction client for the Unreal Editor plugin.
//!
//! This module provides `BridgeClient`, which runs one request/reply
//! transaction at a time over the connection held by its
//! [`ConnectionManager`] and always hands back a [`Reply`].

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{BridgeConfig, FramingMode};
use crate::ipc::connection::{Connection, ConnectionManager};
use crate::ipc::decoder::decode;
use crate::ipc::framing::{read_chunk, read_message, write_message, write_raw};
use crate::reply::{BridgeError, Reply};

/// Full retries of a transaction after a communication fault.
pub const MAX_RETRIES: u32 = 1;

/// A single request as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request<'a> {
    pub command: &'a str,
    pub params: Value,
}

impl<'a> Request<'a> {
    /// Build a request; `null` params are sent as an empty object.
    pub fn new(command: &'a str, params: Value) -> Self {
        let params = match params {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        Self { command, params }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("Failed to serialize request")
    }
}

/// Client for the editor plugin.
///
/// Owns its connection; `execute` takes `&mut self`, so transactions on one
/// client are strictly sequential.
///
/// # Example
///
/// ```ignore
/// use unreal_bridge::{BridgeClient, BridgeConfig, Reply};
/// use serde_json::json;
///
/// let mut client = BridgeClient::new(BridgeConfig::default());
/// match client.execute("get_actors", json!({})).await {
///     Reply::Success(actors) => println!("{actors}"),
///     Reply::Error(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug)]
pub struct BridgeClient {
    config: BridgeConfig,
    connection: ConnectionManager,
}

impl BridgeClient {
    /// Create a client; no connection is opened yet.
    pub fn new(config: BridgeConfig) -> Self {
        let connection = ConnectionManager::new(config.endpoint(), config.connect_timeout());
        Self { config, connection }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// The one connection attempt made when the bridge starts.
    ///
    /// Failure is not fatal: the first transaction will try again.
    pub async fn connect_on_startup(&mut self) -> bool {
        let connected = self.connection.connect().await;
        if !connected {
            warn!(
                "Not connected to Unreal Engine at {}. Make sure the plugin is running.",
                self.connection.endpoint()
            );
        }
        connected
    }

    /// Drop the current connection, if any.
    pub fn disconnect(&mut self) {
        self.connection.invalidate();
    }

    /// Run one transaction: send `command` with `params`, return the reply.
    ///
    /// Never fails: connection problems, malformed replies and remote
    /// failures all come back as [`Reply::Error`]. A communication fault
    /// drops the connection and the whole transaction is retried at most
    /// [`MAX_RETRIES`] times.
    pub async fn execute(&mut self, command: &str, params: Value) -> Reply {
        let request = Request::new(command, params);
        let payload = match request.encode() {
            Ok(payload) => payload,
            Err(e) => return Reply::Error(BridgeError::Communication(format!("{e:#}"))),
        };

        debug!("-> {} ({} bytes)", command, payload.len());

        let mut attempt: u32 = 0;
        let mut last_fault: Option<anyhow::Error> = None;
        loop {
            if !self.connection.is_connected() && !self.connection.connect().await {
                let reason = self
                    .connection
                    .last_error()
                    .unwrap_or("connection failed")
                    .to_string();
                let endpoint = self.connection.endpoint().to_string();
                return Reply::Error(match last_fault {
                    None => BridgeError::NotConnected { endpoint, reason },
                    Some(fault) => BridgeError::Communication(format!(
                        "{fault:#} (reconnect to {endpoint} failed: {reason})"
                    )),
                });
            }

            match self.send_receive(&payload).await {
                Ok(raw) => {
                    debug!("<- {} ({} bytes)", command, raw.len());
                    return decode(&raw);
                }
                Err(fault) => {
                    warn!("Error sending command '{}' to Unreal: {:#}", command, fault);
                    self.connection.invalidate();
                    if attempt >= MAX_RETRIES {
                        return Reply::Error(BridgeError::Communication(format!("{fault:#}")));
                    }
                    attempt += 1;
                    last_fault = Some(fault);
                }
            }
        }
    }

    /// Write one request and read one reply on the held connection.
    async fn send_receive(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let io_timeout = self.config.io_timeout();
        let framing = self.config.framing;
        let max_len = self.config.recv_buffer_size;

        let conn = self
            .connection
            .connection_mut()
            .ok_or_else(|| anyhow!("Not connected"))?;

        with_timeout(io_timeout, send(conn, framing, payload)).await?;
        with_timeout(io_timeout, receive(conn, framing, max_len)).await
    }
}

async fn send(conn: &mut Connection, framing: FramingMode, payload: &[u8]) -> Result<()> {
    match framing {
        FramingMode::Unframed => write_raw(&mut conn.writer, payload).await,
        FramingMode::ContentLength => write_message(&mut conn.writer, payload).await,
    }
}

async fn receive(conn: &mut Connection, framing: FramingMode, max_len: usize) -> Result<Vec<u8>> {
    match framing {
        FramingMode::Unframed => read_chunk(&mut conn.reader, max_len).await,
        FramingMode::ContentLength => read_message(&mut conn.reader).await,
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("Timed out after {}ms", limit.as_millis())),
    }
}
