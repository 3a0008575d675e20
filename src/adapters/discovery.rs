//! Local API discovery
//!
//! Fallback used only when no local API endpoint is configured anywhere:
//! a probe is multicast on the clinic network and the responding host's
//! machine name is used to construct the endpoint URL.

use crate::config::DiscoverySettings;
use crate::domain::{CourierError, Result};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Discover the local API endpoint over multicast
///
/// Sends one probe and waits for a single response carrying the API
/// host's machine name, NUL-padded.
///
/// # Errors
///
/// Returns [`CourierError::Discovery`] when the probe cannot be sent or
/// no usable response arrives within the configured timeout. Callers
/// treat this as "endpoint not discovered" and fall back to the default.
pub async fn discover_local_endpoint(
    settings: &DiscoverySettings,
    api_port: u16,
) -> Result<String> {
    let group: Ipv4Addr = settings.multicast_address.parse().map_err(|e| {
        CourierError::Discovery(format!(
            "Invalid multicast address {}: {e}",
            settings.multicast_address
        ))
    })?;

    let socket = UdpSocket::bind(("0.0.0.0", settings.multicast_port))
        .await
        .map_err(|e| CourierError::Discovery(format!("Failed to bind discovery socket: {e}")))?;
    socket
        .join_multicast_v4(group, Ipv4Addr::UNSPECIFIED)
        .map_err(|e| CourierError::Discovery(format!("Failed to join multicast group: {e}")))?;

    socket
        .send_to(&[1], (group, settings.target_port))
        .await
        .map_err(|e| CourierError::Discovery(format!("Failed to send discovery probe: {e}")))?;

    let mut buf = [0u8; 256];
    let (len, peer) = timeout(
        Duration::from_secs(settings.timeout_seconds),
        socket.recv_from(&mut buf),
    )
    .await
    .map_err(|_| CourierError::Discovery("No discovery response within timeout".to_string()))?
    .map_err(|e| CourierError::Discovery(format!("Failed to receive discovery response: {e}")))?;

    let endpoint = endpoint_from_response(&buf[..len], api_port)?;
    tracing::info!(endpoint = %endpoint, peer = %peer, "Discovered local API endpoint");
    Ok(endpoint)
}

/// Build the endpoint URL from a discovery response payload
fn endpoint_from_response(payload: &[u8], api_port: u16) -> Result<String> {
    let host = String::from_utf8_lossy(payload);
    let host = host.trim_matches(char::from(0)).trim();
    if host.is_empty() {
        return Err(CourierError::Discovery(
            "Discovery response carried no host name".to_string(),
        ));
    }
    Ok(format!("https://{host}:{api_port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_host_becomes_endpoint() {
        let endpoint = endpoint_from_response(b"SURGERY-01", 5100).unwrap();
        assert_eq!(endpoint, "https://SURGERY-01:5100");
    }

    #[test]
    fn test_nul_padding_is_trimmed() {
        let endpoint = endpoint_from_response(b"SURGERY-01\0\0\0\0\0\0", 5100).unwrap();
        assert_eq!(endpoint, "https://SURGERY-01:5100");

        let endpoint = endpoint_from_response(b"  SURGERY-01 \0\0", 5100).unwrap();
        assert_eq!(endpoint, "https://SURGERY-01:5100");
    }

    #[test]
    fn test_empty_response_is_an_error() {
        assert!(endpoint_from_response(b"", 5100).is_err());
        assert!(endpoint_from_response(b"\0\0\0", 5100).is_err());
    }

    #[test]
    fn test_invalid_multicast_address_is_an_error() {
        let settings = DiscoverySettings {
            multicast_address: "not-an-address".to_string(),
            ..Default::default()
        };

        let err = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(discover_local_endpoint(&settings, 5100))
            .unwrap_err();
        assert!(matches!(err, CourierError::Discovery(_)));
    }

    #[tokio::test]
    async fn test_discovery_degrades_without_responder() {
        let settings = DiscoverySettings {
            multicast_port: 0,
            timeout_seconds: 1,
            ..Default::default()
        };

        // No responder on the group; the probe either times out or the
        // network refuses it, both of which surface as Discovery errors.
        assert!(discover_local_endpoint(&settings, 5100).await.is_err());
    }
}
