//! Address liveness probing
//!
//! Administratively free addresses in the appliance may still be live on the
//! network (out-of-band assignments the IPAM does not know about). Before
//! handing out a "next available" address the client probes it and only
//! returns candidates that do not answer. Best effort: packet loss can make
//! a live host look free, and an ICMP-filtering host looks free too.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

/// Reachability check for a single IPv4 address.
///
/// Injectable so allocation paths can be tested without touching the
/// network, and so the shell-out default can be swapped for a native
/// ICMP implementation.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Returns true when the address answered within `timeout`
    async fn is_reachable(&self, addr: Ipv4Addr, timeout: Duration) -> bool;
}

/// Default probe: one ICMP echo via the system `ping` binary.
///
/// Avoids the raw-socket privileges a native ICMP probe would need.
#[derive(Debug, Default, Clone, Copy)]
pub struct PingProbe;

#[async_trait]
impl LivenessProbe for PingProbe {
    async fn is_reachable(&self, addr: Ipv4Addr, timeout: Duration) -> bool {
        let secs = timeout.as_secs().max(1);
        let result = Command::new("ping")
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(secs.to_string())
            .arg(addr.to_string())
            .output()
            .await;
        match result {
            Ok(output) => {
                debug!("ping {} exited with {}", addr, output.status);
                output.status.success()
            }
            Err(e) => {
                // Cannot tell either way; report reachable so the
                // allocator skips the candidate rather than handing out
                // an address that might be live.
                warn!("liveness probe for {} failed to run: {}", addr, e);
                true
            }
        }
    }
}
