//! Infoblox WAPI Client
//!
//! A Rust client library for the Infoblox IPAM appliance REST API (WAPI).
//! Provides network lookup, next-available-IP allocation with an optional
//! liveness cross-check, host record lifecycle and DNS alias management.
//!
//! # Example
//!
//! ```no_run
//! use infoblox_client::{ClientConfig, InfobloxClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(
//!     "gm.example.com",
//!     "admin",
//!     "secret",
//!     "2.10",
//!     "default",
//!     "default",
//!     true,
//! );
//! let client = InfobloxClient::new(config)?;
//!
//! // Allocate an address from a network and bind it to a host record
//! let bound = client.create_host_record("10.0.0.0/24", "web01.example.com").await?;
//! println!("bound {bound}");
//!
//! // Search host records by pattern
//! let hosts = client.search_hosts("web.*\\.example\\.com").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod probe;

pub use client::{InfobloxClient, PROBE_BATCH, PROBE_TIMEOUT};
pub use config::ClientConfig;
pub use error::InfobloxError;
pub use models::*;
pub use probe::{LivenessProbe, PingProbe};
