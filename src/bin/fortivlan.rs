use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fortivlan::api::FortiClient;
use fortivlan::config::{Config, Overrides};
use fortivlan::runner;

/// Bulk-provision VLAN interfaces and DHCP servers on a FortiGate
#[derive(Parser)]
#[clap(name = "fortivlan", author, version, about)]
struct Cli {
    /// FortiGate IP address
    #[clap(long, short = 'f')]
    fortigate_ip: Option<String>,

    /// FortiGate API key
    #[clap(long, short = 'k')]
    api_key: Option<String>,

    /// Starting VLAN ID (e.g. 100)
    #[clap(long, visible_alias = "vs")]
    starting_vlan: Option<u16>,

    /// Number of VLANs to create (e.g. 10)
    #[clap(long, visible_alias = "va")]
    vlan_amount: Option<u16>,

    /// DHCP range start (e.g. 20)
    #[clap(long, visible_alias = "ds")]
    dhcp_start: Option<u8>,

    /// DHCP range end (e.g. 240)
    #[clap(long, visible_alias = "de")]
    dhcp_end: Option<u8>,

    /// Base IP format for VLANs (e.g. 10.10{}.{}.1/24)
    #[clap(long, visible_alias = "ip")]
    base_ip: Option<String>,

    /// Interface name (e.g. "fortilink" or "lan")
    #[clap(long, short = 'i')]
    interface: Option<String>,

    /// Use the VLAN ID for the DHCP server ID
    #[clap(long, visible_alias = "uvd")]
    use_vlan_id_for_dhcp: bool,

    /// Allow ping on the interface
    #[clap(long, visible_alias = "ap")]
    allow_ping: bool,

    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on verbosity
    let log_level = if cli.verbose { "debug" } else { "info" };
    std::env::set_var("RUST_LOG", log_level);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set default subscriber")?;

    let config = Config::resolve(Overrides {
        fortigate_ip: cli.fortigate_ip,
        api_key: cli.api_key,
        starting_vlan: cli.starting_vlan,
        vlan_amount: cli.vlan_amount,
        dhcp_start: cli.dhcp_start,
        dhcp_end: cli.dhcp_end,
        base_ip: cli.base_ip,
        interface: cli.interface,
        use_vlan_id_for_dhcp: cli.use_vlan_id_for_dhcp,
        allow_ping: cli.allow_ping,
    });

    // Validation happens before any network activity
    if let Err(err) = config.validate() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let client = FortiClient::new(&config)?;
    runner::run(&config, &client).await
}
