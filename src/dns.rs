use anyhow::{Context, Result};
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver as AsyncResolver;
use tracing::{debug, warn};

use crate::core::SensorLookup;

pub struct DnsResolver {
    resolver: AsyncResolver,
}

impl DnsResolver {
    /// Creates a resolver from the host's system configuration
    ///
    /// Falls back to the library default upstreams when the system
    /// configuration cannot be read (e.g. no `/etc/resolv.conf`), so this
    /// never fails today; the `Result` keeps the constructor signature in
    /// line with [`crate::http::HttpClient::new`].
    pub fn new() -> Result<Self> {
        let resolver = match AsyncResolver::tokio_from_system_conf() {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to read system DNS configuration, using defaults: {}", e);
                AsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };

        Ok(Self { resolver })
    }

    pub async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>> {
        debug!("Resolving DNS for domain: {}", domain);

        let lookup = self
            .resolver
            .lookup_ip(domain)
            .await
            .with_context(|| format!("DNS resolution failed for {}", domain))?;

        let ips: Vec<IpAddr> = lookup.iter().collect();

        if ips.is_empty() {
            return Err(anyhow::anyhow!("No IP addresses found for domain: {}", domain));
        }

        debug!("Resolved {} IP addresses for {}", ips.len(), domain);
        Ok(ips)
    }

    /// Reports whether `target` resolves to at least one address
    ///
    /// NXDOMAIN, timeouts, server failures and malformed names all count as
    /// "not found"; the reason is only logged.
    pub async fn sensor_exists(&self, target: &str) -> bool {
        match self.resolve(target).await {
            Ok(_) => true,
            Err(e) => {
                debug!("No MDI instance at {}: {:#}", target, e);
                false
            }
        }
    }
}

impl SensorLookup for DnsResolver {
    async fn sensor_exists(&self, target: &str) -> bool {
        DnsResolver::sensor_exists(self, target).await
    }
}
