//! FortiGate management API client.
//!
//! Two endpoints are involved per VLAN: interface creation under
//! `/api/v2/cmdb/system/interface` and DHCP server creation under
//! `/api/v2/cmdb/system.dhcp/server`. Rejections carry a numeric `error`
//! field with appliance-specific semantics, mapped here to readable text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::plan::VlanPlan;

/// Netmask sent with every DHCP scope; ranges are carved from the final
/// octet, which config validation guarantees is free.
pub const DHCP_NETMASK: &str = "255.255.255.0";

/// Administrative domain every object is created in
const VDOM: &str = "root";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Rejection codes the appliance returns in the `error` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplianceErrorCode {
    InvalidLength,
    IndexOutOfRange,
    EntryNotFound,
    MaximumEntries,
    DuplicateEntry,
    InvalidIpAddress,
    InvalidNetmask,
    InvalidGateway,
    PermissionDenied,
    DuplicateEntryAlt,
    BlankAddress,
}

impl ApplianceErrorCode {
    /// Map a raw appliance code to its known meaning
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::InvalidLength),
            -2 => Some(Self::IndexOutOfRange),
            -3 => Some(Self::EntryNotFound),
            -4 => Some(Self::MaximumEntries),
            -5 => Some(Self::DuplicateEntry),
            -8 => Some(Self::InvalidIpAddress),
            -9 => Some(Self::InvalidNetmask),
            -10 => Some(Self::InvalidGateway),
            -14 => Some(Self::PermissionDenied),
            -15 => Some(Self::DuplicateEntryAlt),
            -16 => Some(Self::BlankAddress),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidLength => "Invalid length of value.",
            Self::IndexOutOfRange => "Index out of range.",
            Self::EntryNotFound => "Entry not found.",
            Self::MaximumEntries => "Maximum number of entries has been reached.",
            Self::DuplicateEntry => "A duplicate entry already exists.",
            Self::InvalidIpAddress => "Invalid IP Address.",
            Self::InvalidNetmask => "Invalid IP Netmask.",
            Self::InvalidGateway => "Invalid gateway address.",
            Self::PermissionDenied => "Permission denied. Insufficient privileges.",
            Self::DuplicateEntryAlt => "Duplicate entry found.",
            Self::BlankAddress => "Blank or incorrect address entry.",
        }
    }
}

/// Failures that prevent a call from reaching an appliance verdict at all
/// (timeout, refused connection, TLS handshake). Non-fatal to the run.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Outcome of a single appliance call
#[derive(Debug, Clone)]
pub struct ApiResult {
    /// Whether the appliance accepted the request (HTTP 200)
    pub success: bool,
    /// Numeric code from the error body, when one could be parsed
    pub error_code: Option<i64>,
    /// Response body text, kept for fallback diagnostics
    pub raw_body: String,
}

impl ApiResult {
    /// Accepted request
    pub fn ok() -> Self {
        Self {
            success: true,
            error_code: None,
            raw_body: String::new(),
        }
    }

    /// Rejected request. The body is parsed for the numeric `error` field;
    /// malformed JSON leaves the code unset and the raw text as fallback.
    pub fn rejected(body: String) -> Self {
        let error_code = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.error);
        Self {
            success: false,
            error_code,
            raw_body: body,
        }
    }

    /// Human-readable failure classification.
    ///
    /// `address` and `netmask` name the values the appliance would have
    /// rejected, so the invalid-address and invalid-netmask codes can echo
    /// them back. Unknown codes and unparseable bodies fall back to the raw
    /// response text.
    pub fn failure_message(&self, address: &str, netmask: &str) -> String {
        match self.error_code {
            Some(code) => match ApplianceErrorCode::from_code(code) {
                Some(ApplianceErrorCode::InvalidIpAddress) => {
                    format!("Error code {code}: Invalid IP Address: {address}")
                }
                Some(ApplianceErrorCode::InvalidNetmask) => {
                    format!("Error code {code}: Invalid IP Netmask: {netmask}")
                }
                Some(known) => known.description().to_string(),
                None => format!("Error code {code}: {}", self.raw_body),
            },
            None => self.raw_body.clone(),
        }
    }
}

/// Error envelope the appliance returns on rejected requests
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<i64>,
}

/// Body for POST /api/v2/cmdb/system/interface
#[derive(Debug, Serialize)]
pub struct InterfaceRequest {
    pub name: String,
    pub vlanid: u16,
    pub interface: String,
    pub ip: String,
    pub vdom: String,
    pub allowaccess: String,
}

/// Body for POST /api/v2/cmdb/system.dhcp/server
#[derive(Debug, Serialize)]
pub struct DhcpServerRequest {
    pub vdom: String,
    #[serde(rename = "default-gateway")]
    pub default_gateway: String,
    #[serde(rename = "dns-service")]
    pub dns_service: String,
    pub interface: String,
    pub netmask: String,
    #[serde(rename = "ip-range")]
    pub ip_range: Vec<IpRange>,
    /// Only sent when the VLAN ID doubles as the DHCP server ID; omitted
    /// otherwise so the appliance assigns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u16>,
}

#[derive(Debug, Serialize)]
pub struct IpRange {
    #[serde(rename = "start-ip")]
    pub start_ip: String,
    #[serde(rename = "end-ip")]
    pub end_ip: String,
}

/// Seam over the two provisioning endpoints, so the runner can be driven
/// against a fake in tests
#[async_trait]
pub trait ApplianceApi {
    async fn create_interface(&self, plan: &VlanPlan) -> Result<ApiResult, ClientError>;
    async fn create_dhcp_server(&self, plan: &VlanPlan) -> Result<ApiResult, ClientError>;
}

/// REST client for the FortiGate management API
pub struct FortiClient {
    client: Client,
    interface_url: String,
    dhcp_url: String,
    api_key: String,
    physical_interface: String,
    allow_ping: bool,
    dhcp_start: u8,
    dhcp_end: u8,
    use_vlan_id_for_dhcp: bool,
}

impl FortiClient {
    /// Build a client from the run configuration.
    ///
    /// Certificate validation is disabled: the management interface ships a
    /// self-signed certificate on most appliances.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            interface_url: format!(
                "https://{}/api/v2/cmdb/system/interface",
                config.fortigate_ip
            ),
            dhcp_url: format!(
                "https://{}/api/v2/cmdb/system.dhcp/server",
                config.fortigate_ip
            ),
            api_key: config.api_key.clone(),
            physical_interface: config.interface.clone(),
            allow_ping: config.allow_ping,
            dhcp_start: config.dhcp_start,
            dhcp_end: config.dhcp_end,
            use_vlan_id_for_dhcp: config.use_vlan_id_for_dhcp,
        })
    }

    async fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<ApiResult, ClientError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if response.status() == StatusCode::OK {
            return Ok(ApiResult::ok());
        }

        let status = response.status();
        let body = response.text().await?;
        debug!("appliance rejected request: status={status} body={body}");
        Ok(ApiResult::rejected(body))
    }
}

#[async_trait]
impl ApplianceApi for FortiClient {
    async fn create_interface(&self, plan: &VlanPlan) -> Result<ApiResult, ClientError> {
        let request = InterfaceRequest {
            name: plan.interface_name(),
            vlanid: plan.vlan_id,
            interface: self.physical_interface.clone(),
            ip: plan.subnet.clone(),
            vdom: VDOM.to_string(),
            allowaccess: if self.allow_ping { "ping" } else { "" }.to_string(),
        };

        debug!("creating interface {} with ip {}", request.name, request.ip);
        self.post(&self.interface_url, &request).await
    }

    async fn create_dhcp_server(&self, plan: &VlanPlan) -> Result<ApiResult, ClientError> {
        let (start_ip, end_ip) = plan.dhcp_range(self.dhcp_start, self.dhcp_end);
        let request = DhcpServerRequest {
            vdom: VDOM.to_string(),
            default_gateway: plan.gateway().to_string(),
            dns_service: "default".to_string(),
            interface: plan.interface_name(),
            netmask: DHCP_NETMASK.to_string(),
            ip_range: vec![IpRange { start_ip, end_ip }],
            id: self.use_vlan_id_for_dhcp.then_some(plan.vlan_id),
        };

        debug!("creating DHCP server for {}", request.interface);
        self.post(&self.dhcp_url, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_their_descriptions() {
        let cases = [
            (-1, "Invalid length of value."),
            (-2, "Index out of range."),
            (-3, "Entry not found."),
            (-4, "Maximum number of entries has been reached."),
            (-5, "A duplicate entry already exists."),
            (-8, "Invalid IP Address."),
            (-9, "Invalid IP Netmask."),
            (-10, "Invalid gateway address."),
            (-14, "Permission denied. Insufficient privileges."),
            (-15, "Duplicate entry found."),
            (-16, "Blank or incorrect address entry."),
        ];
        for (code, description) in cases {
            let parsed = ApplianceErrorCode::from_code(code).expect("known code");
            assert_eq!(parsed.description(), description);
        }
        assert!(ApplianceErrorCode::from_code(-6).is_none());
        assert!(ApplianceErrorCode::from_code(0).is_none());
    }

    #[test]
    fn rejected_body_yields_parsed_code() {
        let result = ApiResult::rejected(r#"{"error": -8}"#.to_string());
        assert!(!result.success);
        assert_eq!(result.error_code, Some(-8));
    }

    #[test]
    fn malformed_body_falls_back_to_raw_text() {
        let result = ApiResult::rejected("<html>gateway timeout</html>".to_string());
        assert_eq!(result.error_code, None);
        assert_eq!(
            result.failure_message("10.10.1.1/24", "24"),
            "<html>gateway timeout</html>"
        );
    }

    #[test]
    fn invalid_address_message_names_the_address() {
        let result = ApiResult::rejected(r#"{"error": -8}"#.to_string());
        assert_eq!(
            result.failure_message("10.10.1.1/24", "24"),
            "Error code -8: Invalid IP Address: 10.10.1.1/24"
        );
    }

    #[test]
    fn invalid_netmask_message_names_the_netmask() {
        let result = ApiResult::rejected(r#"{"error": -9}"#.to_string());
        assert_eq!(
            result.failure_message("10.10.1.1", "255.255.255.0"),
            "Error code -9: Invalid IP Netmask: 255.255.255.0"
        );
    }

    #[test]
    fn unknown_code_message_carries_the_body() {
        let result = ApiResult::rejected(r#"{"error": -42, "status": "error"}"#.to_string());
        let message = result.failure_message("10.10.1.1/24", "24");
        assert!(message.starts_with("Error code -42: "));
        assert!(message.contains(r#""status": "error""#));
    }

    #[test]
    fn dhcp_request_uses_hyphenated_field_names() {
        let request = DhcpServerRequest {
            vdom: "root".to_string(),
            default_gateway: "10.101.5.1".to_string(),
            dns_service: "default".to_string(),
            interface: "vlan105".to_string(),
            netmask: DHCP_NETMASK.to_string(),
            ip_range: vec![IpRange {
                start_ip: "10.101.5.20".to_string(),
                end_ip: "10.101.5.240".to_string(),
            }],
            id: Some(105),
        };

        let value = serde_json::to_value(&request).expect("serializable");
        assert_eq!(value["default-gateway"], "10.101.5.1");
        assert_eq!(value["dns-service"], "default");
        assert_eq!(value["ip-range"][0]["start-ip"], "10.101.5.20");
        assert_eq!(value["ip-range"][0]["end-ip"], "10.101.5.240");
        assert_eq!(value["id"], 105);
    }

    #[test]
    fn dhcp_request_omits_id_unless_requested() {
        let request = DhcpServerRequest {
            vdom: "root".to_string(),
            default_gateway: "10.101.5.1".to_string(),
            dns_service: "default".to_string(),
            interface: "vlan105".to_string(),
            netmask: DHCP_NETMASK.to_string(),
            ip_range: vec![IpRange {
                start_ip: "10.101.5.20".to_string(),
                end_ip: "10.101.5.240".to_string(),
            }],
            id: None,
        };

        let value = serde_json::to_value(&request).expect("serializable");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn interface_request_serializes_flat_fields() {
        let request = InterfaceRequest {
            name: "vlan105".to_string(),
            vlanid: 105,
            interface: "fortilink".to_string(),
            ip: "10.101.5.1/24".to_string(),
            vdom: "root".to_string(),
            allowaccess: "ping".to_string(),
        };

        let value = serde_json::to_value(&request).expect("serializable");
        assert_eq!(value["name"], "vlan105");
        assert_eq!(value["vlanid"], 105);
        assert_eq!(value["interface"], "fortilink");
        assert_eq!(value["ip"], "10.101.5.1/24");
        assert_eq!(value["vdom"], "root");
        assert_eq!(value["allowaccess"], "ping");
    }
}
