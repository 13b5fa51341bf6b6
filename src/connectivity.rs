use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;
use url::{Host, Url};

/// Pre-flight check: can a TCP connection to the URL's host be opened?
pub async fn is_online(url: &str, timeout: Duration) -> bool {
    let Ok(url) = Url::parse(url) else {
        return false;
    };
    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return false,
    };
    let Some(port) = url.port_or_known_default() else {
        return false;
    };

    match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("Connectivity check to {}:{} failed: {}", host, port, e);
            false
        }
        Err(_) => {
            debug!("Connectivity check to {}:{} timed out", host, port);
            false
        }
    }
}
