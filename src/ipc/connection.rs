//! Ownership of the single editor connection.

use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{info, warn};

/// An open connection to the editor plugin.
#[derive(Debug)]
pub struct Connection {
    /// Buffered reader for incoming replies.
    pub reader: BufReader<OwnedReadHalf>,
    /// Writer for outgoing requests.
    pub writer: OwnedWriteHalf,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        // Requests are small and written in one go.
        let _ = stream.set_nodelay(true);
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }
}

/// Holds at most one [`Connection`] to a fixed endpoint.
///
/// Connections are opened on demand and dropped on the first sign of
/// trouble; liveness is never probed, so a dead socket is only noticed when
/// the next transaction uses it.
#[derive(Debug)]
pub struct ConnectionManager {
    endpoint: String,
    connect_timeout: Duration,
    connection: Option<Connection>,
    last_error: Option<String>,
}

impl ConnectionManager {
    pub fn new(endpoint: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout,
            connection: None,
            last_error: None,
        }
    }

    /// Open a fresh connection, replacing any existing one.
    ///
    /// Never fails loudly: on error the slot is left empty, the cause is
    /// logged and kept in [`last_error`](Self::last_error).
    pub async fn connect(&mut self) -> bool {
        self.connection = None;

        let result = timeout(self.connect_timeout, TcpStream::connect(&self.endpoint)).await;
        let error = match result {
            Ok(Ok(stream)) => {
                info!("Connected to Unreal Engine on {}", self.endpoint);
                self.connection = Some(Connection::new(stream));
                self.last_error = None;
                return true;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "connect timed out after {}ms",
                self.connect_timeout.as_millis()
            ),
        };

        warn!("Failed to connect to Unreal Engine at {}: {}", self.endpoint, error);
        self.last_error = Some(error);
        false
    }

    /// Drop the current connection without reporting anything.
    pub fn invalidate(&mut self) {
        self.connection = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection_mut(&mut self) -> Option<&mut Connection> {
        self.connection.as_mut()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Cause of the most recent failed [`connect`](Self::connect).
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
