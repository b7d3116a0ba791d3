//! Infoblox WAPI command-line adapter
//!
//! Translates a `state` selector plus connection parameters into library
//! calls and prints the result as JSON on stdout. Any library error becomes
//! a failure message and a non-zero exit; no recovery is attempted here.

use anyhow::{bail, Context, Result};
use clap::Parser;
use infoblox_client::{ClientConfig, InfobloxClient};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "infoblox-cli", about = "Query and manage Infoblox IPAM records")]
struct Args {
    /// Desired state: present, add, delete, alias, search or allocate
    #[arg(long)]
    state: String,

    /// Appliance management address
    #[arg(long)]
    host: String,

    /// WAPI username
    #[arg(long)]
    username: String,

    /// WAPI password
    #[arg(long, env = "INFOBLOX_PASSWORD", hide_env_values = true)]
    password: String,

    /// WAPI version
    #[arg(long, default_value = "2.10")]
    wapi_version: String,

    /// DNS view for record operations
    #[arg(long, default_value = "default")]
    dns_view: String,

    /// Network view for network operations
    #[arg(long, default_value = "default")]
    network_view: String,

    /// Disable TLS certificate validation
    #[arg(long)]
    no_verify_ssl: bool,

    /// Network in CIDR notation
    #[arg(long)]
    network: Option<String>,

    /// Host record FQDN
    #[arg(long)]
    fqdn: Option<String>,

    /// Literal IPv4 address or network in CIDR form
    #[arg(long)]
    address: Option<String>,

    /// Existing host record FQDN for alias operations
    #[arg(long)]
    host_fqdn: Option<String>,

    /// Alias FQDN to attach
    #[arg(long)]
    alias_fqdn: Option<String>,

    /// Host name search pattern (literal or WAPI regex)
    #[arg(long)]
    pattern: Option<String>,

    /// Number of addresses for bulk allocation
    #[arg(long, default_value_t = 10)]
    num: u32,

    /// Comma-separated network fields for the present query
    #[arg(long)]
    fields: Option<String>,
}

/// One resolved library call, decoupled from the argument surface
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Present {
        network: String,
        fields: Option<Vec<String>>,
    },
    Add {
        address: String,
        fqdn: String,
    },
    Delete {
        fqdn: String,
    },
    Alias {
        host_fqdn: String,
        alias_fqdn: String,
    },
    Search {
        pattern: String,
    },
    Allocate {
        network: String,
        num: u32,
    },
}

impl Action {
    fn from_args(args: &Args) -> Result<Self> {
        fn required(value: &Option<String>, name: &str, state: &str) -> Result<String> {
            value
                .clone()
                .with_context(|| format!("--{name} is required when state is '{state}'"))
        }

        match args.state.as_str() {
            "present" => Ok(Action::Present {
                network: required(&args.network, "network", "present")?,
                fields: args
                    .fields
                    .as_ref()
                    .map(|f| f.split(',').map(str::to_string).collect()),
            }),
            "add" => Ok(Action::Add {
                address: required(&args.address, "address", "add")?,
                fqdn: required(&args.fqdn, "fqdn", "add")?,
            }),
            "delete" => Ok(Action::Delete {
                fqdn: required(&args.fqdn, "fqdn", "delete")?,
            }),
            "alias" => Ok(Action::Alias {
                host_fqdn: required(&args.host_fqdn, "host-fqdn", "alias")?,
                alias_fqdn: required(&args.alias_fqdn, "alias-fqdn", "alias")?,
            }),
            "search" => Ok(Action::Search {
                pattern: required(&args.pattern, "pattern", "search")?,
            }),
            "allocate" => Ok(Action::Allocate {
                network: required(&args.network, "network", "allocate")?,
                num: args.num,
            }),
            other => bail!(
                "the state must be 'present', 'add', 'delete', 'alias', 'search' or \
                 'allocate' but instead we found '{other}'"
            ),
        }
    }
}

async fn run(client: &InfobloxClient, action: Action) -> Result<serde_json::Value> {
    let output = match action {
        Action::Present { network, fields } => {
            let names: Option<Vec<&str>> = fields
                .as_ref()
                .map(|f| f.iter().map(String::as_str).collect());
            let fields = client
                .get_network_fields(&network, names.as_deref())
                .await?;
            serde_json::Value::Object(fields)
        }
        Action::Add { address, fqdn } => {
            let bound = client.create_host_record(&address, &fqdn).await?;
            serde_json::json!({ "fqdn": fqdn, "ipv4addr": bound })
        }
        Action::Delete { fqdn } => {
            client.delete_host_record(&fqdn).await?;
            serde_json::json!({ "deleted": fqdn })
        }
        Action::Alias {
            host_fqdn,
            alias_fqdn,
        } => {
            client.add_host_alias(&host_fqdn, &alias_fqdn).await?;
            serde_json::json!({ "host_fqdn": host_fqdn, "alias_fqdn": alias_fqdn })
        }
        Action::Search { pattern } => {
            let hosts = client.search_hosts(&pattern).await?;
            serde_json::json!(hosts)
        }
        Action::Allocate { network, num } => {
            let ips = client.next_available_ips(&network, num).await?;
            serde_json::json!(ips)
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let action = Action::from_args(&args)?;

    info!("Connecting to Infoblox appliance at {}", args.host);

    let config = ClientConfig::new(
        &args.host,
        &args.username,
        &args.password,
        &args.wapi_version,
        &args.dns_view,
        &args.network_view,
        !args.no_verify_ssl,
    );
    let client = InfobloxClient::new(config)?;

    let output = run(&client, action).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let base = [
            "infoblox-cli",
            "--host",
            "gm.example.com",
            "--username",
            "admin",
            "--password",
            "secret",
        ];
        Args::try_parse_from(base.into_iter().chain(argv.iter().copied()))
            .expect("argument parsing")
    }

    #[test]
    fn present_state_requires_network() {
        let args = parse(&["--state", "present"]);
        let err = Action::from_args(&args).expect_err("missing network");
        assert!(err.to_string().contains("--network"));

        let args = parse(&["--state", "present", "--network", "10.0.0.0/24"]);
        assert_eq!(
            Action::from_args(&args).expect("valid"),
            Action::Present {
                network: "10.0.0.0/24".to_string(),
                fields: None
            }
        );
    }

    #[test]
    fn add_state_maps_address_and_fqdn() {
        let args = parse(&[
            "--state",
            "add",
            "--address",
            "10.0.0.0/24",
            "--fqdn",
            "web01.example.com",
        ]);
        assert_eq!(
            Action::from_args(&args).expect("valid"),
            Action::Add {
                address: "10.0.0.0/24".to_string(),
                fqdn: "web01.example.com".to_string()
            }
        );
    }

    #[test]
    fn alias_state_requires_both_fqdns() {
        let args = parse(&["--state", "alias", "--host-fqdn", "db01.example.com"]);
        let err = Action::from_args(&args).expect_err("missing alias fqdn");
        assert!(err.to_string().contains("--alias-fqdn"));
    }

    #[test]
    fn unknown_state_is_rejected_with_message() {
        let args = parse(&["--state", "absent"]);
        let err = Action::from_args(&args).expect_err("unknown state");
        assert!(err.to_string().contains("'absent'"), "message: {err}");
    }

    #[test]
    fn present_state_splits_field_list() {
        let args = parse(&[
            "--state",
            "present",
            "--network",
            "10.0.0.0/24",
            "--fields",
            "network,comment",
        ]);
        match Action::from_args(&args).expect("valid") {
            Action::Present { fields, .. } => {
                assert_eq!(
                    fields,
                    Some(vec!["network".to_string(), "comment".to_string()])
                );
            }
            other => panic!("expected Present, got {other:?}"),
        }
    }
}
