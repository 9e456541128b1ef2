use std::net::{IpAddr, Ipv4Addr};

pub const FALLBACK_HOST: &str = "localhost";

/// Address other devices on the LAN can use to reach this machine.
///
/// First non-loopback IPv4 address across all interfaces, else `localhost`.
pub fn resolve() -> String {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => first_lan_ipv4(interfaces.iter().map(|iface| iface.ip()))
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| FALLBACK_HOST.to_string()),
        Err(e) => {
            tracing::debug!("Could not enumerate network interfaces: {}", e);
            FALLBACK_HOST.to_string()
        }
    }
}

pub fn first_lan_ipv4<I>(addrs: I) -> Option<Ipv4Addr>
where
    I: IntoIterator<Item = IpAddr>,
{
    addrs.into_iter().find_map(|ip| match ip {
        IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
        _ => None,
    })
}
