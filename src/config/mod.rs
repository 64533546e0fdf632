use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Finalized provisioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// FortiGate management address
    pub fortigate_ip: String,
    /// REST API bearer token
    pub api_key: String,
    /// First VLAN ID to create
    pub starting_vlan: u16,
    /// Number of VLANs to create
    pub vlan_amount: u16,
    /// DHCP range start (final octet)
    pub dhcp_start: u8,
    /// DHCP range end (final octet)
    pub dhcp_end: u8,
    /// Base address template with two `{}` slots, e.g. "10.10{}.{}.1/24"
    pub base_ip: String,
    /// Physical interface the VLANs attach to
    pub interface: String,
    /// Use the VLAN ID as the DHCP server ID
    pub use_vlan_id_for_dhcp: bool,
    /// Permit ping on the created interfaces
    pub allow_ping: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fortigate_ip: String::new(),
            api_key: String::new(),
            starting_vlan: 100,
            vlan_amount: 10,
            dhcp_start: 20,
            dhcp_end: 240,
            base_ip: "10.10{}.{}.1/24".to_string(),
            interface: "fortilink".to_string(),
            use_vlan_id_for_dhcp: false,
            allow_ping: false,
        }
    }
}

/// CLI-provided values applied on top of the defaults
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub fortigate_ip: Option<String>,
    pub api_key: Option<String>,
    pub starting_vlan: Option<u16>,
    pub vlan_amount: Option<u16>,
    pub dhcp_start: Option<u8>,
    pub dhcp_end: Option<u8>,
    pub base_ip: Option<String>,
    pub interface: Option<String>,
    pub use_vlan_id_for_dhcp: bool,
    pub allow_ping: bool,
}

impl Config {
    /// Merge CLI overrides into the default configuration
    pub fn resolve(overrides: Overrides) -> Self {
        let mut config = Self::default();

        if let Some(fortigate_ip) = overrides.fortigate_ip {
            config.fortigate_ip = fortigate_ip;
        }
        if let Some(api_key) = overrides.api_key {
            config.api_key = api_key;
        }
        if let Some(starting_vlan) = overrides.starting_vlan {
            config.starting_vlan = starting_vlan;
        }
        if let Some(vlan_amount) = overrides.vlan_amount {
            config.vlan_amount = vlan_amount;
        }
        if let Some(dhcp_start) = overrides.dhcp_start {
            config.dhcp_start = dhcp_start;
        }
        if let Some(dhcp_end) = overrides.dhcp_end {
            config.dhcp_end = dhcp_end;
        }
        if let Some(base_ip) = overrides.base_ip {
            config.base_ip = base_ip;
        }
        if let Some(interface) = overrides.interface {
            config.interface = interface;
        }
        config.use_vlan_id_for_dhcp |= overrides.use_vlan_id_for_dhcp;
        config.allow_ping |= overrides.allow_ping;

        config
    }

    /// Validate the configuration before any network activity.
    ///
    /// Every required field must be non-empty/non-zero and the base address
    /// template must carry a prefix of at least 24, so that DHCP ranges can
    /// be carved from the final octet.
    pub fn validate(&self) -> Result<()> {
        if self.fortigate_ip.is_empty() {
            anyhow::bail!(
                "fortigate_ip must have a value. Set it using the --fortigate-ip or -f argument."
            );
        }
        if self.api_key.is_empty() {
            anyhow::bail!("api_key must have a value. Set it using the --api-key or -k argument.");
        }
        if self.starting_vlan == 0 {
            anyhow::bail!(
                "starting_vlan must have a value. Set it using the --starting-vlan or -vs argument."
            );
        }
        if self.vlan_amount == 0 {
            anyhow::bail!(
                "vlan_amount must have a value. Set it using the --vlan-amount or -va argument."
            );
        }
        if self.dhcp_start == 0 {
            anyhow::bail!(
                "dhcp_start must have a value. Set it using the --dhcp-start or -ds argument."
            );
        }
        if self.dhcp_end == 0 {
            anyhow::bail!("dhcp_end must have a value. Set it using the --dhcp-end or -de argument.");
        }
        if self.base_ip.is_empty() {
            anyhow::bail!("base_ip must have a value. Set it using the --base-ip or -ip argument.");
        }
        if self.interface.is_empty() {
            anyhow::bail!("interface must have a value. Set it using the --interface or -i argument.");
        }

        let Some((_, prefix)) = self.base_ip.split_once('/') else {
            anyhow::bail!("base_ip must contain a netmask (e.g., '10.10{{}}.{{}}.1/24').");
        };
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| anyhow::anyhow!("base_ip netmask must be a number (got '{}').", prefix))?;
        if prefix < 24 {
            anyhow::bail!("base_ip netmask must be at least 24.");
        }

        if self.base_ip.matches("{}").count() != 2 {
            anyhow::bail!("base_ip must contain exactly two {{}} slots (e.g., '10.10{{}}.{{}}.1/24').");
        }

        Ok(())
    }
}
