//! Send command implementation
//!
//! This module implements the `send` command: a client utility that pushes
//! a JSON file of records to a running stream front end and prints the
//! returned result line.

use crate::domain::record::ResultRecord;
use crate::server::codec::FrameCodec;
use clap::Args;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// JSON file containing an array of records
    #[arg(short, long)]
    pub file: String,

    /// Address of the stream front end
    #[arg(short, long, default_value = "127.0.0.1:7010")]
    pub addr: String,
}

impl SendArgs {
    /// Execute the send command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file, addr = %self.addr, "Sending record batch");

        let payload = match std::fs::read_to_string(&self.file) {
            Ok(payload) => payload,
            Err(e) => {
                eprintln!("Failed to read {}: {e}", self.file);
                return Ok(2);
            }
        };

        // Parse locally first so an unusable file never reaches the wire
        let records: Vec<ResultRecord> = match serde_json::from_str(payload.trim()) {
            Ok(records) => records,
            Err(e) => {
                eprintln!("{} is not a JSON record array: {e}", self.file);
                return Ok(2);
            }
        };

        let socket = match TcpStream::connect(&self.addr).await {
            Ok(socket) => socket,
            Err(e) => {
                eprintln!("Failed to connect to {}: {e}", self.addr);
                return Ok(4); // Connection error exit code
            }
        };

        let mut framed = Framed::new(socket, FrameCodec);
        if let Err(e) = framed.send(payload.trim().to_string()).await {
            eprintln!("Failed to send batch: {e}");
            return Ok(4);
        }
        println!("📤 Sent {} records to {}", records.len(), self.addr);

        match framed.next().await {
            Some(Ok(frame)) => {
                let reply = String::from_utf8_lossy(&frame).to_string();
                println!("{reply}");
                Ok(reply_exit_code(&reply))
            }
            Some(Err(e)) => {
                eprintln!("Connection failed: {e}");
                Ok(4)
            }
            None => {
                eprintln!("Connection closed before a reply arrived");
                Ok(4)
            }
        }
    }
}

/// Map a server reply line to a process exit code
fn reply_exit_code(reply: &str) -> i32 {
    if reply.starts_with("error:") {
        return 4;
    }

    let failed = reply
        .split_whitespace()
        .find_map(|part| part.strip_prefix("failed="))
        .and_then(|count| count.parse::<u32>().ok())
        .unwrap_or(0);

    if failed > 0 {
        1 // Partial success
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_args_defaults() {
        let args = SendArgs {
            file: "records.json".to_string(),
            addr: "127.0.0.1:7010".to_string(),
        };

        assert_eq!(args.file, "records.json");
        assert_eq!(args.addr, "127.0.0.1:7010");
    }

    #[test]
    fn test_reply_exit_code_success() {
        assert_eq!(reply_exit_code("written=3 silent=1 failed=0"), 0);
    }

    #[test]
    fn test_reply_exit_code_partial_failure() {
        assert_eq!(reply_exit_code("written=4 silent=0 failed=1"), 1);
    }

    #[test]
    fn test_reply_exit_code_error_line() {
        assert_eq!(reply_exit_code("error: payload is not a JSON record array"), 4);
    }

    #[test]
    fn test_reply_exit_code_unrecognized_reply() {
        assert_eq!(reply_exit_code("ok"), 0);
    }
}
