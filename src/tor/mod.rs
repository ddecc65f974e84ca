//! Control-channel collaborator for the anonymizing network
//!
//! The monitor never talks to the control port mid-run. It is used only
//! to verify the transport is up before starting, and to request identity
//! rotation (a new circuit) between runs. Both operations speak the plain
//! line-oriented control protocol over TCP.

use crate::{Result, WatchError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the network's control channel
pub struct TorController {
    control_addr: String,
}

impl TorController {
    pub fn new(control_addr: &str) -> Self {
        Self {
            control_addr: control_addr.to_string(),
        }
    }

    /// Checks whether the control channel accepts connections
    ///
    /// A reachable control port is taken as evidence the transport is
    /// bootstrapped; failures are reported, not raised.
    pub async fn is_running(&self) -> bool {
        match tokio::time::timeout(CONTROL_TIMEOUT, TcpStream::connect(&self.control_addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::warn!("Control channel {} unreachable: {}", self.control_addr, e);
                false
            }
            Err(_) => {
                tracing::warn!("Control channel {} connect timed out", self.control_addr);
                false
            }
        }
    }

    /// Requests a new circuit (SIGNAL NEWNYM)
    ///
    /// Assumes cookie-less authentication on the control port. Called
    /// between runs only; the scan loop itself never rotates identity.
    pub async fn rotate_identity(&self) -> Result<()> {
        let stream = tokio::time::timeout(CONTROL_TIMEOUT, TcpStream::connect(&self.control_addr))
            .await
            .map_err(|_| WatchError::Control("connect timed out".to_string()))?
            .map_err(|e| WatchError::Control(format!("connect failed: {}", e)))?;

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        write_half.write_all(b"AUTHENTICATE \"\"\r\n").await?;
        expect_250(&mut reader, "AUTHENTICATE").await?;

        write_half.write_all(b"SIGNAL NEWNYM\r\n").await?;
        expect_250(&mut reader, "SIGNAL NEWNYM").await?;

        let _ = write_half.write_all(b"QUIT\r\n").await;

        tracing::info!("Identity rotation requested");
        Ok(())
    }
}

async fn expect_250<R>(reader: &mut BufReader<R>, command: &str) -> Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    tokio::time::timeout(CONTROL_TIMEOUT, reader.read_line(&mut line))
        .await
        .map_err(|_| WatchError::Control(format!("{}: reply timed out", command)))?
        .map_err(|e| WatchError::Control(format!("{}: read failed: {}", command, e)))?;

    if line.starts_with("250") {
        Ok(())
    } else {
        Err(WatchError::Control(format!(
            "{} rejected: {}",
            command,
            line.trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_is_running_false_when_nothing_listens() {
        let controller = TorController::new("127.0.0.1:1");
        assert!(!controller.is_running().await);
    }

    #[tokio::test]
    async fn test_is_running_true_when_port_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let controller = TorController::new(&addr.to_string());
        assert!(controller.is_running().await);
    }

    #[tokio::test]
    async fn test_rotate_identity_protocol_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Minimal control-port stand-in: 250 to everything
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];

            let n = socket.read(&mut buf).await.unwrap();
            assert!(String::from_utf8_lossy(&buf[..n]).starts_with("AUTHENTICATE"));
            socket.write_all(b"250 OK\r\n").await.unwrap();

            let n = socket.read(&mut buf).await.unwrap();
            assert!(String::from_utf8_lossy(&buf[..n]).starts_with("SIGNAL NEWNYM"));
            socket.write_all(b"250 OK\r\n").await.unwrap();
        });

        let controller = TorController::new(&addr.to_string());
        controller.rotate_identity().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_rotate_identity_rejected_auth() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(b"515 Bad authentication\r\n").await.unwrap();
        });

        let controller = TorController::new(&addr.to_string());
        let result = controller.rotate_identity().await;
        assert!(matches!(result, Err(WatchError::Control(_))));
    }
}
