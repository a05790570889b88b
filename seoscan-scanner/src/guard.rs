// Request-time SSRF protection

use crate::error::{Result, ScanError};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tracing::{debug, warn};
use url::{Host, Url};

/// True for addresses an auditor must never connect to.
pub fn is_forbidden_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_forbidden_v4(v4),
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_forbidden_v4(mapped);
            }
            is_forbidden_v6(v6)
        }
    }
}

fn is_forbidden_v4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_multicast()
        // 0.0.0.0/8 "this network"
        || octets[0] == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
        // 240.0.0.0/4 reserved
        || octets[0] >= 240
}

fn is_forbidden_v6(ip: Ipv6Addr) -> bool {
    let segments = ip.segments();
    let first = segments[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
        || nat64_embedded(&segments).is_some_and(is_forbidden_v4)
}

/// IPv4 address carried in the well-known NAT64 prefix 64:ff9b::/96.
fn nat64_embedded(segments: &[u16; 8]) -> Option<Ipv4Addr> {
    if segments[..6] != [0x64, 0xff9b, 0, 0, 0, 0] {
        return None;
    }
    let [a, b] = segments[6].to_be_bytes();
    let [c, d] = segments[7].to_be_bytes();
    Some(Ipv4Addr::new(a, b, c, d))
}

fn is_local_hostname(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == "localhost" || host.ends_with(".localhost")
}

/// Checks the parts of a URL that can be judged without DNS.
///
/// Returns the reason the URL is blocked, if any.
pub fn blocked_without_dns(url: &Url) -> Option<String> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Some(format!("unsupported scheme '{}'", other)),
    }

    match url.host() {
        None => Some("missing host".to_string()),
        Some(Host::Ipv4(ip)) if is_forbidden_ip(IpAddr::V4(ip)) => {
            Some(format!("private or loopback address {}", ip))
        }
        Some(Host::Ipv6(ip)) if is_forbidden_ip(IpAddr::V6(ip)) => {
            Some(format!("private or loopback address {}", ip))
        }
        Some(Host::Domain(domain)) if is_local_hostname(domain) => {
            Some(format!("local hostname {}", domain))
        }
        _ => None,
    }
}

/// Dispatch-time SSRF check run before every outbound request.
#[derive(Debug, Clone, Copy)]
pub struct SsrfGuard {
    allow_private: bool,
}

impl SsrfGuard {
    pub fn new(allow_private: bool) -> Self {
        Self { allow_private }
    }

    pub async fn check(&self, url: &Url) -> Result<()> {
        if self.allow_private {
            return Ok(());
        }

        if let Some(reason) = blocked_without_dns(url) {
            warn!("Blocked request to {}: {}", url, reason);
            return Err(ScanError::Blocked(reason));
        }

        let Some(Host::Domain(domain)) = url.host() else {
            return Ok(());
        };

        let port = url.port_or_known_default().unwrap_or(80);
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((domain, port))
            .await
            .map_err(|_| ScanError::Dns(domain.to_string()))?
            .collect();

        if let Some(addr) = addrs.iter().find(|addr| is_forbidden_ip(addr.ip())) {
            warn!("Blocked request to {}: resolves to {}", url, addr.ip());
            return Err(ScanError::Blocked(format!(
                "{} resolves to private address {}",
                domain,
                addr.ip()
            )));
        }

        debug!("SSRF check passed for {}", url);
        Ok(())
    }
}

/// DNS resolver for the HTTP client that drops forbidden addresses at
/// connect time, covering redirects and rebinding between check and connect.
#[derive(Debug, Default)]
pub struct GuardedResolver;

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            let resolved: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
                .await?
                .collect();
            let allowed: Vec<SocketAddr> = resolved
                .into_iter()
                .filter(|addr| !is_forbidden_ip(addr.ip()))
                .collect();

            if allowed.is_empty() {
                let err = ScanError::Blocked(format!("{} has no public address", host));
                return Err(Box::new(err) as Box<dyn std::error::Error + Send + Sync>);
            }

            let addrs: Addrs = Box::new(allowed.into_iter());
            Ok::<Addrs, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}
