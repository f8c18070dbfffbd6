//! XML processing for the Autodiscover federation exchange
//!
//! This module owns both ends of the single SOAP round trip:
//! - Generation of the `GetFederationInformation` request envelope
//! - Namespace-aware extraction of `Domain` elements from the response
//!
//! The response is read with a streaming, namespace-resolving reader so that
//! `Domain` elements are matched on their resolved namespace URI rather than
//! on whatever prefix the server happened to choose.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;

use crate::core::FederationInfo;
use crate::error::CheckError;

/// Namespace of the Autodiscover request body and of the returned `Domain` elements
pub const AUTODISCOVER_NAMESPACE: &str = "http://schemas.microsoft.com/exchange/2010/Autodiscover";

/// Local name of the repeated element carrying one federated domain
pub const DOMAIN_ELEMENT: &str = "Domain";

const MESSAGE_ID: &str = "urn:uuid:6389558d-9e05-465e-ade9-aae14c4bcd10";
const ACTION: &str =
    "http://schemas.microsoft.com/exchange/2010/Autodiscover/Autodiscover/GetFederationInformation";
const TO: &str = "https://autodiscover.byfcxu-dom.extest.microsoft.com/autodiscover/autodiscover.svc";

/// Creates a federation information request SOAP envelope
///
/// Every header value is a protocol constant; the domain is the only
/// substitution point. The domain is XML-escaped, so a value containing
/// markup stays inside the `<Domain>` element instead of altering the
/// envelope structure.
///
/// # Examples
///
/// ```
/// use mdi_check::xml::create_federation_request;
///
/// let request = create_federation_request("example.com");
/// assert!(request.contains("<Domain>example.com</Domain>"));
/// ```
pub fn create_federation_request(domain: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:exm="http://schemas.microsoft.com/exchange/services/2006/messages"
    xmlns:ext="http://schemas.microsoft.com/exchange/services/2006/types"
    xmlns:a="http://www.w3.org/2005/08/addressing"
    xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema">
<soap:Header>
    <a:RequestedServerVersion>Exchange2010</a:RequestedServerVersion>
    <a:MessageID>{MESSAGE_ID}</a:MessageID>
    <a:Action soap:mustUnderstand="1">{ACTION}</a:Action>
    <a:To soap:mustUnderstand="1">{TO}</a:To>
    <a:ReplyTo>
        <a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address>
    </a:ReplyTo>
</soap:Header>
<soap:Body>
    <GetFederationInformationRequestMessage xmlns="{AUTODISCOVER_NAMESPACE}">
        <Request>
            <Domain>{}</Domain>
        </Request>
    </GetFederationInformationRequestMessage>
</soap:Body>
</soap:Envelope>"#,
        escape(domain)
    )
}

/// Parses a federation response and collects the federated domain names
///
/// Every element in the Autodiscover namespace with local name `Domain`
/// contributes its leading text (the text before its first child element),
/// in document order. Values are neither trimmed, validated nor
/// deduplicated; an empty element contributes an empty string.
///
/// # Errors
///
/// Returns [`CheckError::MalformedResponse`] when the input is not a
/// well-formed XML document: no root or several roots, unbalanced tags,
/// character data outside the root, or an undeclared namespace prefix.
pub fn parse_federation_response(xml_content: &str) -> Result<FederationInfo, CheckError> {
    debug!("Parsing federation response XML ({} bytes)", xml_content.len());

    let mut reader = NsReader::from_str(xml_content);
    let mut domains = Vec::new();
    // Text of the Domain element currently being read, until its first child or end tag
    let mut current: Option<String> = None;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| CheckError::malformed(e.to_string()))?;
        if let ResolveResult::Unknown(prefix) = &ns {
            return Err(CheckError::malformed(format!(
                "undeclared namespace prefix '{}'",
                String::from_utf8_lossy(prefix)
            )));
        }
        let in_autodiscover_ns =
            matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == AUTODISCOVER_NAMESPACE.as_bytes());

        match event {
            Event::Start(e) => {
                if let Some(text) = current.take() {
                    domains.push(text);
                }
                if depth == 0 && saw_root {
                    return Err(CheckError::malformed("multiple root elements"));
                }
                saw_root = true;
                depth += 1;
                if in_autodiscover_ns && e.local_name().as_ref() == DOMAIN_ELEMENT.as_bytes() {
                    current = Some(String::new());
                }
            }
            Event::Empty(e) => {
                if let Some(text) = current.take() {
                    domains.push(text);
                }
                if depth == 0 && saw_root {
                    return Err(CheckError::malformed("multiple root elements"));
                }
                saw_root = true;
                if in_autodiscover_ns && e.local_name().as_ref() == DOMAIN_ELEMENT.as_bytes() {
                    domains.push(String::new());
                }
            }
            Event::End(_) => {
                if let Some(text) = current.take() {
                    domains.push(text);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) => {
                if depth == 0 && !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(CheckError::malformed("text outside the root element"));
                }
                if let Some(text) = current.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| CheckError::malformed(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if depth == 0 {
                    return Err(CheckError::malformed("CDATA outside the root element"));
                }
                if let Some(text) = current.as_mut() {
                    let raw = e.into_inner();
                    let value = std::str::from_utf8(&raw)
                        .map_err(|e| CheckError::malformed(e.to_string()))?;
                    text.push_str(value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(CheckError::malformed("no root element"));
    }
    if depth != 0 {
        return Err(CheckError::malformed("unexpected end of document"));
    }

    debug!("Parsed {} domains from federation response", domains.len());
    Ok(FederationInfo { domains })
}
