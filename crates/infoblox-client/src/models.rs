//! Infoblox WAPI wire types
//!
//! These models match the JSON shapes returned by the WAPI object endpoints
//! (`network`, `record:host`) and the `next_available_ip` function call.

use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InfobloxError;

/// A network object as returned by a `network?network=...` lookup.
///
/// The appliance issues the `_ref` identifier; the client never constructs
/// one. All other returned fields are kept as an opaque map since the set
/// depends on `_return_fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkObject {
    #[serde(rename = "_ref")]
    pub reference: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// A DNS host record row from a `record:host` lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(rename = "_ref")]
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub ipv4addrs: Vec<HostIpv4Addr>,
}

/// One address binding inside a host record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostIpv4Addr {
    pub ipv4addr: String,
    #[serde(default)]
    pub configure_for_dhcp: bool,
}

/// Response body of the `_function=next_available_ip` call
#[derive(Debug, Clone, Deserialize)]
pub struct NextAvailableIp {
    pub ips: Vec<String>,
}

/// Structured WAPI error body (`text` plus optional machine `code`)
#[derive(Debug, Clone, Deserialize)]
pub struct WapiError {
    pub text: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Error code the appliance uses to signal address-space exhaustion
pub const EXHAUSTION_CODE: &str = "Client.Ibap.Data";

/// An address specifier accepted by host record creation: either a literal
/// IPv4 address, or an IPv4 network in CIDR notation to allocate from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSpec {
    Literal(Ipv4Addr),
    Network(String),
}

impl FromStr for AddressSpec {
    type Err = InfobloxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((addr, prefix)) = s.split_once('/') {
            let parsed_addr = addr.parse::<Ipv4Addr>();
            let parsed_prefix = prefix.parse::<u8>();
            match (parsed_addr, parsed_prefix) {
                (Ok(_), Ok(len)) if len <= 32 => Ok(AddressSpec::Network(s.to_string())),
                _ => Err(InfobloxError::BadInput(format!(
                    "expected IP or NET address in CIDR format, got '{s}'"
                ))),
            }
        } else {
            s.parse::<Ipv4Addr>()
                .map(AddressSpec::Literal)
                .map_err(|_| {
                    InfobloxError::BadInput(format!(
                        "expected IP or NET address in CIDR format, got '{s}'"
                    ))
                })
        }
    }
}

/// Extract the FQDN embedded in a host record reference.
///
/// References have the shape `record:host/<opaque>:<fqdn>/<view>`. Returns
/// `None` if the reference does not follow that shape. Used to verify that
/// a looked-up record really is the requested one before mutating it, since
/// WAPI name filters can match more loosely than intended.
pub fn host_name_from_ref(reference: &str) -> Option<&str> {
    let rest = reference.strip_prefix("record:host/")?;
    let (opaque, _view) = rest.rsplit_once('/')?;
    let (_, name) = opaque.split_once(':')?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_spec_parses_cidr() {
        let spec = "10.0.0.0/24".parse::<AddressSpec>().expect("valid CIDR");
        assert_eq!(spec, AddressSpec::Network("10.0.0.0/24".to_string()));
    }

    #[test]
    fn address_spec_parses_literal() {
        let spec = "192.168.1.15".parse::<AddressSpec>().expect("valid IP");
        assert_eq!(
            spec,
            AddressSpec::Literal(Ipv4Addr::new(192, 168, 1, 15))
        );
    }

    #[test]
    fn address_spec_rejects_garbage() {
        for bad in ["host.example.com", "10.0.0.0/", "10.0.0/24", "10.0.0.0/99", ""] {
            let err = bad.parse::<AddressSpec>().expect_err("should fail");
            assert!(matches!(err, InfobloxError::BadInput(_)), "input: {bad}");
        }
    }

    #[test]
    fn host_ref_name_extraction() {
        let r = "record:host/ZG5zLmhvc3QkLl9kZWZhdWx0:web01.example.com/default";
        assert_eq!(host_name_from_ref(r), Some("web01.example.com"));
    }

    #[test]
    fn host_ref_rejects_foreign_shapes() {
        assert_eq!(host_name_from_ref("network/ZG5z:10.0.0.0/default"), None);
        assert_eq!(host_name_from_ref("record:host/noname"), None);
        assert_eq!(host_name_from_ref("record:host/abc:/default"), None);
    }

    #[test]
    fn host_record_deserializes_without_aliases() {
        let record: HostRecord = serde_json::from_str(
            r#"{"_ref":"record:host/abc:h1.example.com/default","name":"h1.example.com"}"#,
        )
        .expect("valid host record");
        assert!(record.aliases.is_empty());
        assert!(record.ipv4addrs.is_empty());
    }
}
