//! HTTP transport for the Microsoft Autodiscover service
//!
//! One POST per run to either the commercial or the government cloud
//! endpoint. No retry, rate limiting or explicit timeout is applied; any
//! failure is reported once as [`CheckError::Request`].

use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, error};

use crate::core::FederationTransport;
use crate::error::CheckError;

pub const COMMERCIAL_AUTODISCOVER_URL: &str =
    "https://autodiscover-s.outlook.com/autodiscover/autodiscover.svc";
pub const GOVERNMENT_AUTODISCOVER_URL: &str =
    "https://autodiscover-s.office365.us/autodiscover/autodiscover.svc";

const USER_AGENT: &str = "AutodiscoverClient";
const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Cloud environment hosting the Autodiscover endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cloud {
    #[default]
    Commercial,
    Government,
}

impl Cloud {
    pub fn from_gov_flag(gov: bool) -> Self {
        if gov {
            Self::Government
        } else {
            Self::Commercial
        }
    }

    /// Autodiscover SOAP endpoint for this cloud
    ///
    /// # Examples
    ///
    /// ```
    /// use mdi_check::http::Cloud;
    ///
    /// assert!(Cloud::Government.autodiscover_url().contains("office365.us"));
    /// ```
    pub fn autodiscover_url(self) -> &'static str {
        match self {
            Self::Commercial => COMMERCIAL_AUTODISCOVER_URL,
            Self::Government => GOVERNMENT_AUTODISCOVER_URL,
        }
    }
}

/// HTTP client for the federation information request
///
/// # Examples
///
/// ```no_run
/// use mdi_check::http::{Cloud, HttpClient};
/// use mdi_check::xml::create_federation_request;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = HttpClient::new(Cloud::Commercial)?;
/// let response = client
///     .post_soap_request(&create_federation_request("example.com"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpClient {
    client: Client,
    autodiscover_url: String,
}

impl HttpClient {
    /// Creates a client targeting the Autodiscover endpoint of `cloud`
    pub fn new(cloud: Cloud) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            autodiscover_url: cloud.autodiscover_url().to_string(),
        })
    }

    /// Points the client at a different endpoint URL
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.autodiscover_url = url.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.autodiscover_url
    }

    /// Sends a SOAP request to the autodiscover endpoint
    ///
    /// Connection failures, TLS failures, non-2xx statuses and unreadable
    /// bodies all map to [`CheckError::Request`]; the cause is logged and kept
    /// as the error source.
    pub async fn post_soap_request(&self, body: &str) -> Result<String, CheckError> {
        debug!("Sending SOAP request to {}", self.autodiscover_url);

        let response = self
            .client
            .post(&self.autodiscover_url)
            .header(reqwest::header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                error!("Federation request to {} failed: {}", self.autodiscover_url, e);
                CheckError::request(e)
            })?;

        let response_text = response.text().await.map_err(|e| {
            error!("Failed to read federation response body: {}", e);
            CheckError::request(e)
        })?;

        debug!("Received SOAP response ({} bytes)", response_text.len());
        Ok(response_text)
    }
}

impl FederationTransport for HttpClient {
    async fn fetch_federation(&self, body: &str) -> Result<String, CheckError> {
        self.post_soap_request(body).await
    }
}
