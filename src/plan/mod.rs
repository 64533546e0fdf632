/// Subnet plan for a single VLAN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanPlan {
    /// VLAN ID being provisioned
    pub vlan_id: u16,
    /// Interface address in CIDR notation
    pub subnet: String,
}

impl VlanPlan {
    /// Derive the subnet for a VLAN ID from the base address template.
    ///
    /// The template's two `{}` slots receive `id / 100` and `id % 100` in
    /// that order, so VLAN 314 under "10.10{}.{}.1/24" lands on
    /// 10.103.14.1/24. The template shape is checked once by config
    /// validation, never here.
    pub fn new(vlan_id: u16, template: &str) -> Self {
        let x = vlan_id / 100;
        let y = vlan_id % 100;
        let subnet = template
            .replacen("{}", &x.to_string(), 1)
            .replacen("{}", &y.to_string(), 1);
        Self { vlan_id, subnet }
    }

    /// Name of the logical interface on the appliance
    pub fn interface_name(&self) -> String {
        format!("vlan{}", self.vlan_id)
    }

    /// Host portion of the subnet, used as the DHCP default gateway
    pub fn gateway(&self) -> &str {
        self.subnet
            .split_once('/')
            .map(|(host, _)| host)
            .unwrap_or(&self.subnet)
    }

    /// Prefix length portion of the subnet
    pub fn prefix(&self) -> &str {
        self.subnet.split_once('/').map(|(_, p)| p).unwrap_or("")
    }

    /// DHCP lease boundaries, replacing the gateway's final octet with the
    /// configured offsets. Only valid because config validation requires a
    /// prefix of at least 24.
    pub fn dhcp_range(&self, start: u8, end: u8) -> (String, String) {
        let gateway = self.gateway();
        let net = gateway.rsplit_once('.').map(|(head, _)| head).unwrap_or(gateway);
        (format!("{net}.{start}"), format!("{net}.{end}"))
    }
}
