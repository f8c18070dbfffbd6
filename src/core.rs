//! Core pipeline for tenant discovery and MDI detection
//!
//! A check is a single straight-line pass:
//! 1. Build the federation request for the input domain
//! 2. Send it to the Autodiscover endpoint
//! 3. Extract the federated domains from the response
//! 4. Derive the tenant name from the `onmicrosoft.com` domain
//! 5. Resolve the tenant's MDI sensor hostname in DNS
//!
//! Transport and sensor lookup sit behind small traits so the pipeline can be
//! driven with the real network components or with in-process stand-ins.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    dns::DnsResolver,
    error::CheckError,
    http::{Cloud, HttpClient},
    xml::{create_federation_request, parse_federation_response},
};

/// Substring identifying the tenant's default directory domain
pub const TENANT_MARKER: &str = "onmicrosoft.com";

/// DNS suffix under which an MDI sensor instance is published
pub const MDI_SUFFIX: &str = ".atp.azure.com";

/// Information retrieved from the federation autodiscover response
///
/// # Examples
///
/// ```
/// use mdi_check::core::FederationInfo;
///
/// let info = FederationInfo {
///     domains: vec!["example.com".to_string(), "example.onmicrosoft.com".to_string()],
/// };
///
/// assert_eq!(info.domains.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederationInfo {
    /// Federated domains in response document order, duplicates included
    pub domains: Vec<String>,
}

/// Outcome of a completed check
///
/// Serializes with the fields in declaration order: `domains`, `tenant`, `mdi`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// All domains federated with the queried domain
    pub domains: Vec<String>,
    /// Tenant name, empty when no `onmicrosoft.com` domain was returned
    pub tenant: String,
    /// Whether the tenant's MDI sensor hostname resolved
    pub mdi: bool,
}

impl CheckReport {
    /// Hostname that was (or would have been) looked up for this report's tenant
    pub fn sensor_hostname(&self) -> String {
        sensor_hostname(&self.tenant)
    }
}

/// Sends a federation request and returns the raw response body
#[allow(async_fn_in_trait)]
pub trait FederationTransport {
    async fn fetch_federation(&self, body: &str) -> Result<String, CheckError>;
}

/// Existence check for a DNS name
///
/// Implementations never fail: any resolution problem means "not found".
#[allow(async_fn_in_trait)]
pub trait SensorLookup {
    async fn sensor_exists(&self, target: &str) -> bool;
}

/// Extracts the tenant name from the federated domains
///
/// Scans every domain in order; each one containing `onmicrosoft.com`
/// replaces the previous candidate, so the last match wins. The tenant is the
/// part of that domain before its first `.`.
///
/// # Examples
///
/// ```
/// use mdi_check::core::extract_tenant;
///
/// let domains = vec!["contoso.com".to_string(), "contoso.onmicrosoft.com".to_string()];
/// assert_eq!(extract_tenant(&domains), "contoso");
/// assert_eq!(extract_tenant(&[]), "");
/// ```
pub fn extract_tenant(domains: &[String]) -> String {
    domains
        .iter()
        .rev()
        .find(|d| d.contains(TENANT_MARKER))
        .and_then(|d| d.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// Builds the MDI sensor hostname for a tenant
pub fn sensor_hostname(tenant: &str) -> String {
    format!("{}{}", tenant, MDI_SUFFIX)
}

/// Orchestrates one tenant discovery and MDI check
///
/// # Examples
///
/// ```no_run
/// use mdi_check::core::MdiChecker;
/// use mdi_check::http::Cloud;
///
/// # async fn example() -> anyhow::Result<()> {
/// let checker = MdiChecker::new(Cloud::Commercial)?;
/// let report = checker.check_domain("example.com").await?;
/// println!("Tenant: {}", report.tenant);
/// # Ok(())
/// # }
/// ```
pub struct MdiChecker<T = HttpClient, P = DnsResolver> {
    transport: T,
    sensor: P,
}

impl MdiChecker<HttpClient, DnsResolver> {
    /// Creates a checker using the HTTP client for `cloud` and the system DNS resolver
    pub fn new(cloud: Cloud) -> Result<Self> {
        Ok(Self::with_components(HttpClient::new(cloud)?, DnsResolver::new()?))
    }
}

impl<T, P> MdiChecker<T, P>
where
    T: FederationTransport,
    P: SensorLookup,
{
    /// Creates a checker from any transport and sensor lookup implementation
    pub fn with_components(transport: T, sensor: P) -> Self {
        Self { transport, sensor }
    }

    /// Runs the full check for one domain
    ///
    /// Returns as soon as the federation request or the response parse fails;
    /// neither tenant extraction nor the DNS lookup runs in that case. When no
    /// tenant is found the lookup is skipped and `mdi` is `false`.
    pub async fn check_domain(&self, domain: &str) -> Result<CheckReport, CheckError> {
        debug!("Starting check for domain: {}", domain);

        let federation_info = self.get_federation_info(domain).await?;
        info!("Found {} federated domains", federation_info.domains.len());

        let tenant = extract_tenant(&federation_info.domains);
        let mdi = self.check_mdi_instance(&tenant).await;

        Ok(CheckReport {
            domains: federation_info.domains,
            tenant,
            mdi,
        })
    }

    async fn get_federation_info(&self, domain: &str) -> Result<FederationInfo, CheckError> {
        let soap_body = create_federation_request(domain);
        let response_xml = self.transport.fetch_federation(&soap_body).await?;
        parse_federation_response(&response_xml)
    }

    async fn check_mdi_instance(&self, tenant: &str) -> bool {
        let target = sensor_hostname(tenant);
        if tenant.is_empty() {
            debug!("No tenant found, skipping lookup of {}", target);
            return false;
        }

        let found = self.sensor.sensor_exists(&target).await;
        info!("MDI lookup for {}: {}", target, if found { "found" } else { "not found" });
        found
    }
}
