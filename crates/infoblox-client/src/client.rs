//! Infoblox WAPI client
//!
//! Implements the WAPI REST calls for network lookup, next-available-IP
//! allocation, host record lifecycle and alias management. Every operation
//! is a short sequence of dependent HTTP calls: a lookup yields an
//! appliance-issued `_ref`, and the follow-up request is addressed to that
//! reference. Nothing is cached or retried.

use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::InfobloxError;
use crate::models::{
    host_name_from_ref, AddressSpec, HostRecord, NetworkObject, NextAvailableIp, WapiError,
    EXHAUSTION_CODE,
};
use crate::probe::{LivenessProbe, PingProbe};

/// Candidate batch size for liveness-checked allocation
pub const PROBE_BATCH: u32 = 5;

/// Per-candidate liveness probe timeout
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Response shape of host record creation with `_return_fields=ipv4addrs`
#[derive(Debug, serde::Deserialize)]
struct CreatedHostRecord {
    #[serde(default)]
    ipv4addrs: Vec<crate::models::HostIpv4Addr>,
}

/// Infoblox WAPI client
pub struct InfobloxClient {
    client: Client,
    config: ClientConfig,
    probe: Box<dyn LivenessProbe>,
}

impl InfobloxClient {
    /// Create a client with the default ping-based liveness probe
    pub fn new(config: ClientConfig) -> Result<Self, InfobloxError> {
        Self::with_probe(config, Box::new(PingProbe))
    }

    /// Create a client with an injected liveness probe
    pub fn with_probe(
        config: ClientConfig,
        probe: Box<dyn LivenessProbe>,
    ) -> Result<Self, InfobloxError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(InfobloxError::Http)?;

        Ok(Self {
            client,
            config,
            probe,
        })
    }

    /// Connection parameters this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a WAPI URL for `resource` with encoded query parameters.
    ///
    /// `resource` may be an object type (`network`, `record:host`) or an
    /// appliance-issued `_ref`, which embeds its own path segments.
    fn url(&self, resource: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}", self.config.wapi_base(), resource);
        if !params.is_empty() {
            let query: Vec<String> = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect();
            url = format!("{}?{}", url, query.join("&"));
        }
        url
    }

    /// Map a non-2xx response to the error taxonomy.
    ///
    /// A structured WAPI body (`text`, optional `code`) becomes an
    /// application-level error, with the exhaustion code singled out since
    /// running out of addresses is an expected, recoverable condition.
    /// Anything else is surfaced raw as a status error.
    async fn error_from(&self, response: reqwest::Response) -> InfobloxError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<WapiError>(&body) {
            Ok(err) => match err.code.as_deref() {
                Some(EXHAUSTION_CODE) => InfobloxError::NoIpAvailable(err.text),
                _ => InfobloxError::Api(err.text),
            },
            Err(_) => InfobloxError::Status { status, body },
        }
    }

    /// GET a WAPI list endpoint and deserialize the JSON array
    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, InfobloxError> {
        let url = self.url(resource, params);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        Ok(response.json().await?)
    }

    /// Look up a network by CIDR in the configured network view.
    ///
    /// Returns the appliance reference plus whatever fields the lookup
    /// returned. Zero matches is `NotFound`, distinct from transport or
    /// appliance errors.
    pub async fn get_network(&self, network: &str) -> Result<NetworkObject, InfobloxError> {
        let rows: Vec<NetworkObject> = self
            .get_list(
                "network",
                &[
                    ("network", network),
                    ("network_view", &self.config.network_view),
                ],
            )
            .await?;

        rows.into_iter().next().ok_or_else(|| {
            InfobloxError::NotFound(format!("no requested network found: {network}"))
        })
    }

    /// Request `num` next-available addresses from a network.
    ///
    /// Resolves the network reference first, then issues the
    /// `next_available_ip` function call against it. Candidates come back
    /// in appliance order.
    pub async fn next_available_ips(
        &self,
        network: &str,
        num: u32,
    ) -> Result<Vec<String>, InfobloxError> {
        let net = self.get_network(network).await?;

        let url = format!(
            "{}/{}?_function=next_available_ip&num={}",
            self.config.wapi_base(),
            net.reference,
            num
        );
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let result: NextAvailableIp = response.json().await?;
        Ok(result.ips)
    }

    /// Allocate one address, cross-checked against the live network.
    ///
    /// Fetches a batch of candidates and probes them in order, returning
    /// the first one that does not answer. An address the appliance
    /// considers free can still be in use out of band; the probe is a best
    /// effort safety net, not a guarantee. When every candidate in the
    /// batch answers, the batch is treated as exhausted and the caller
    /// gets `NoIpAvailable` — retrying against a healthier network or a
    /// larger batch is the caller's decision.
    pub async fn next_available_ip(&self, network: &str) -> Result<String, InfobloxError> {
        let candidates = self.next_available_ips(network, PROBE_BATCH).await?;

        for ip in &candidates {
            let addr: Ipv4Addr = ip.parse().map_err(|_| {
                InfobloxError::Api(format!("appliance returned a non-IPv4 candidate: {ip}"))
            })?;
            if self.probe.is_reachable(addr, PROBE_TIMEOUT).await {
                debug!("{} answered liveness probe, skipping", ip);
            } else {
                debug!("{} free and down", ip);
                return Ok(ip.clone());
            }
        }

        Err(InfobloxError::NoIpAvailable(format!(
            "all {} candidates in {} answered the liveness probe",
            candidates.len(),
            network
        )))
    }

    /// Create a host record binding an address to `fqdn` in the configured
    /// DNS view.
    ///
    /// `address` is either a literal IPv4 address or a network in CIDR
    /// form; the latter routes through liveness-checked allocation. Returns
    /// the address actually bound, read back from the response rather than
    /// echoed from the input.
    pub async fn create_host_record(
        &self,
        address: &str,
        fqdn: &str,
    ) -> Result<String, InfobloxError> {
        let ipv4addr = match address.parse::<AddressSpec>()? {
            AddressSpec::Literal(addr) => addr.to_string(),
            AddressSpec::Network(cidr) => self.next_available_ip(&cidr).await?,
        };

        let url = self.url("record:host", &[("_return_fields", "ipv4addrs")]);
        let body = json!({
            "ipv4addrs": [{"configure_for_dhcp": false, "ipv4addr": ipv4addr}],
            "name": fqdn,
            "view": self.config.dns_view,
        });
        debug!("POST {} for {}", url, fqdn);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let created: CreatedHostRecord = response.json().await?;
        created
            .ipv4addrs
            .into_iter()
            .next()
            .map(|binding| binding.ipv4addr)
            .ok_or_else(|| {
                InfobloxError::Api(format!(
                    "host record {fqdn} was created without an address binding"
                ))
            })
    }

    /// Look up a host record by exact name and verify that the reference
    /// the appliance handed back really names the requested record.
    ///
    /// WAPI name filters can match more loosely than intended, so a
    /// mismatch between the requested FQDN and the name embedded in the
    /// returned `_ref` aborts the operation before anything is mutated.
    async fn lookup_host(
        &self,
        fqdn: &str,
        return_fields: Option<&str>,
    ) -> Result<HostRecord, InfobloxError> {
        let mut params = vec![("name", fqdn), ("view", self.config.dns_view.as_str())];
        if let Some(fields) = return_fields {
            params.push(("_return_fields", fields));
        }

        let rows: Vec<HostRecord> = self.get_list("record:host", &params).await?;
        let record = rows.into_iter().next().ok_or_else(|| {
            InfobloxError::NotFound(format!("no requested host found: {fqdn}"))
        })?;

        match host_name_from_ref(&record.reference) {
            Some(name) if name == fqdn => Ok(record),
            _ => Err(InfobloxError::Api(format!(
                "received unexpected host reference: {}",
                record.reference
            ))),
        }
    }

    /// Delete the host record named `fqdn` in the configured DNS view
    pub async fn delete_host_record(&self, fqdn: &str) -> Result<(), InfobloxError> {
        let record = self.lookup_host(fqdn, None).await?;

        let url = format!("{}/{}", self.config.wapi_base(), record.reference);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        Ok(())
    }

    /// Add an alias FQDN to an existing host record.
    ///
    /// The alias set has no partial update on the wire; the current set is
    /// read, extended and rewritten wholesale. Idempotent: an alias that is
    /// already present leaves the record untouched.
    pub async fn add_host_alias(
        &self,
        host_fqdn: &str,
        alias_fqdn: &str,
    ) -> Result<(), InfobloxError> {
        let record = self.lookup_host(host_fqdn, Some("name,aliases")).await?;

        if record.aliases.iter().any(|alias| alias == alias_fqdn) {
            debug!("alias {} already present on {}", alias_fqdn, host_fqdn);
            return Ok(());
        }

        let mut aliases = record.aliases;
        aliases.push(alias_fqdn.to_string());

        let url = format!("{}/{}", self.config.wapi_base(), record.reference);
        debug!("PUT {} aliases {:?}", url, aliases);

        let response = self
            .client
            .put(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&json!({ "aliases": aliases }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        Ok(())
    }

    /// Search host records by name pattern (`name~=`, the WAPI regex
    /// filter). Returns matched FQDNs in appliance response order.
    pub async fn search_hosts(&self, pattern: &str) -> Result<Vec<String>, InfobloxError> {
        let rows: Vec<HostRecord> = self
            .get_list(
                "record:host",
                &[("name~", pattern), ("view", &self.config.dns_view)],
            )
            .await?;

        if rows.is_empty() {
            return Err(InfobloxError::NotFound(format!(
                "no hosts found for pattern: {pattern}"
            )));
        }

        Ok(rows.into_iter().map(|record| record.name).collect())
    }

    /// Fetch selected fields of a network object.
    ///
    /// Defaults to `network,netmask` when no field list is given. Returns
    /// the fields of the first match as a key/value map.
    pub async fn get_network_fields(
        &self,
        network: &str,
        fields: Option<&[&str]>,
    ) -> Result<serde_json::Map<String, serde_json::Value>, InfobloxError> {
        let joined = fields
            .map(|names| names.join(","))
            .unwrap_or_else(|| "network,netmask".to_string());

        let rows: Vec<NetworkObject> = self
            .get_list(
                "network",
                &[
                    ("network", network),
                    ("network_view", &self.config.network_view),
                    ("_return_fields", &joined),
                ],
            )
            .await?;

        rows.into_iter().next().map(|net| net.fields).ok_or_else(|| {
            InfobloxError::NotFound(format!("no requested network found: {network}"))
        })
    }
}
