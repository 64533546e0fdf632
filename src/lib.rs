//! FortiGate VLAN provisioning tool
//!
//! This implementation provisions a run of VLAN interfaces on a FortiGate
//! appliance through its management REST API:
//! - Derives each VLAN's subnet from a numbered base-address template
//! - Creates the VLAN interface on a configured physical interface
//! - Creates a matching DHCP server once the interface exists
//! - Reports per-VLAN failures and keeps going

pub mod api;
pub mod config;
pub mod plan;
pub mod runner;

// Re-export commonly used items
pub use api::{ApiResult, ApplianceApi, ClientError, FortiClient};
pub use config::{Config, Overrides};
pub use plan::VlanPlan;
pub use runner::run;
