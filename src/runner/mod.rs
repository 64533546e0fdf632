//! Sequential provisioning loop.

use anyhow::Result;
use tracing::{info, warn};

use crate::api::{ApplianceApi, DHCP_NETMASK};
use crate::config::Config;
use crate::plan::VlanPlan;

/// Provision every VLAN in the configured range.
///
/// VLAN IDs are walked in ascending order, one at a time; appliance APIs are
/// order-sensitive and effectively single-threaded, so nothing is dispatched
/// in parallel. The DHCP server for a VLAN is only attempted once its
/// interface exists. Failed iterations are reported and skipped; the run
/// itself always completes.
pub async fn run(config: &Config, api: &impl ApplianceApi) -> Result<()> {
    let end = config.starting_vlan.saturating_add(config.vlan_amount);
    info!(
        "provisioning VLANs {}..{} on {}",
        config.starting_vlan, end, config.fortigate_ip
    );

    for vlan_id in config.starting_vlan..end {
        let plan = VlanPlan::new(vlan_id, &config.base_ip);

        match api.create_interface(&plan).await {
            Ok(result) if result.success => {
                println!("Successfully created VLAN {} with IP {}", vlan_id, plan.subnet);
            }
            Ok(result) => {
                println!(
                    "Failed to create VLAN {}: {}",
                    vlan_id,
                    result.failure_message(&plan.subnet, plan.prefix())
                );
                continue;
            }
            Err(err) => {
                warn!("VLAN {vlan_id}: {err}");
                println!("Failed to create VLAN {vlan_id}: {err}");
                continue;
            }
        }

        match api.create_dhcp_server(&plan).await {
            Ok(result) if result.success => {
                println!("Successfully created DHCP server for VLAN {vlan_id}");
            }
            Ok(result) => {
                println!(
                    "Failed to create DHCP server for VLAN {}: {}",
                    vlan_id,
                    result.failure_message(plan.gateway(), DHCP_NETMASK)
                );
            }
            Err(err) => {
                warn!("DHCP server for VLAN {vlan_id}: {err}");
                println!("Failed to create DHCP server for VLAN {vlan_id}: {err}");
            }
        }
    }

    Ok(())
}
