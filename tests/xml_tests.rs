use anyhow::Result;
use mdi_check::error::CheckError;
use mdi_check::xml::{create_federation_request, parse_federation_response};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Reads a document to the end and returns the text of every `<Domain>` element
fn well_formed_domain_texts(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut in_domain = false;
    let mut texts = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"Domain" => in_domain = true,
            Event::End(e) if e.local_name().as_ref() == b"Domain" => in_domain = false,
            Event::Text(e) if in_domain => texts.push(e.unescape()?.into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(texts)
}

fn federation_response(domain_elements: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" xmlns:a="http://www.w3.org/2005/08/addressing">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://schemas.microsoft.com/exchange/2010/Autodiscover/Autodiscover/GetFederationInformationResponse</a:Action>
  </s:Header>
  <s:Body>
    <GetFederationInformationResponseMessage xmlns="http://schemas.microsoft.com/exchange/2010/Autodiscover">
      <Response xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
        <ErrorCode>NoError</ErrorCode>
        <ApplicationUri>outlook.com</ApplicationUri>
        <Domains>
          {domain_elements}
        </Domains>
      </Response>
    </GetFederationInformationResponseMessage>
  </s:Body>
</s:Envelope>"#
    )
}

#[test]
fn test_federation_request_structure() {
    let request = create_federation_request("contoso.com");

    assert!(request.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
    assert!(request.contains("<a:RequestedServerVersion>Exchange2010</a:RequestedServerVersion>"));
    assert!(request.contains("<a:MessageID>urn:uuid:6389558d-9e05-465e-ade9-aae14c4bcd10</a:MessageID>"));
    assert!(request.contains(
        "http://schemas.microsoft.com/exchange/2010/Autodiscover/Autodiscover/GetFederationInformation</a:Action>"
    ));
    assert!(request.contains("<a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address>"));
    assert!(request.contains(
        r#"<GetFederationInformationRequestMessage xmlns="http://schemas.microsoft.com/exchange/2010/Autodiscover">"#
    ));
}

#[test]
fn test_federation_request_contains_domain_once() -> Result<()> {
    let request = create_federation_request("contoso.com");

    assert_eq!(request.matches("contoso.com").count(), 1);
    assert_eq!(well_formed_domain_texts(&request)?, vec!["contoso.com"]);

    Ok(())
}

#[test]
fn test_federation_request_is_deterministic() {
    assert_eq!(
        create_federation_request("fabrikam.com"),
        create_federation_request("fabrikam.com")
    );
}

#[test]
fn test_federation_request_escapes_markup() -> Result<()> {
    let hostile = "x</Domain><Injected/><Domain>y & z";
    let request = create_federation_request(hostile);

    assert!(!request.contains("<Injected/>"));
    assert_eq!(well_formed_domain_texts(&request)?, vec![hostile]);

    Ok(())
}

#[test]
fn test_parse_federation_response_document_order() -> Result<()> {
    let response = federation_response(
        "<Domain>contoso.com</Domain>\
         <Domain>contoso.onmicrosoft.com</Domain>\
         <Domain>contoso.mail.onmicrosoft.com</Domain>",
    );

    let info = parse_federation_response(&response)?;

    assert_eq!(
        info.domains,
        vec![
            "contoso.com",
            "contoso.onmicrosoft.com",
            "contoso.mail.onmicrosoft.com"
        ]
    );

    Ok(())
}

#[test]
fn test_parse_federation_response_keeps_duplicates() -> Result<()> {
    let response = federation_response(
        "<Domain>a.com</Domain><Domain>b.com</Domain><Domain>a.com</Domain>",
    );

    let info = parse_federation_response(&response)?;

    assert_eq!(info.domains, vec!["a.com", "b.com", "a.com"]);

    Ok(())
}

#[test]
fn test_parse_federation_response_matches_resolved_namespace() -> Result<()> {
    // Same namespace through a prefix counts; a Domain in another namespace does not
    let response = r#"
    <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
        <soap:Body>
            <Response xmlns:auto="http://schemas.microsoft.com/exchange/2010/Autodiscover"
                      xmlns="http://example.com/other">
                <auto:Domain>contoso.com</auto:Domain>
                <Domain>ignored.com</Domain>
                <auto:Domain>contoso.onmicrosoft.com</auto:Domain>
            </Response>
        </soap:Body>
    </soap:Envelope>
    "#;

    let info = parse_federation_response(response)?;

    assert_eq!(info.domains, vec!["contoso.com", "contoso.onmicrosoft.com"]);

    Ok(())
}

#[test]
fn test_parse_federation_response_without_namespace_ignored() -> Result<()> {
    let info = parse_federation_response("<Domains><Domain>plain.com</Domain></Domains>")?;

    assert!(info.domains.is_empty());

    Ok(())
}

#[test]
fn test_parse_federation_response_no_domains() -> Result<()> {
    let info = parse_federation_response(&federation_response(""))?;

    assert!(info.domains.is_empty());

    Ok(())
}

#[test]
fn test_parse_federation_response_text_is_verbatim() -> Result<()> {
    let response = federation_response(
        "<Domain> spaced.com </Domain><Domain>a&amp;b.com</Domain>\
         <Domain><![CDATA[cdata.com]]></Domain><Domain/><Domain></Domain>",
    );

    let info = parse_federation_response(&response)?;

    assert_eq!(
        info.domains,
        vec![" spaced.com ", "a&b.com", "cdata.com", "", ""]
    );

    Ok(())
}

#[test]
fn test_parse_federation_response_whitespace_around_root() -> Result<()> {
    let response = "\n  <a xmlns=\"http://schemas.microsoft.com/exchange/2010/Autodiscover\"><Domain>x.com</Domain></a>\n\n";

    let info = parse_federation_response(response)?;

    assert_eq!(info.domains, vec!["x.com"]);

    Ok(())
}

#[test]
fn test_parse_federation_response_nested_domain_preorder() -> Result<()> {
    let response = "<a xmlns=\"http://schemas.microsoft.com/exchange/2010/Autodiscover\">\
                    <Domain>o<Domain>i</Domain>tail</Domain></a>";

    let info = parse_federation_response(response)?;

    assert_eq!(info.domains, vec!["o", "i"]);

    Ok(())
}

#[test]
fn test_parse_federation_response_malformed() {
    let cases = [
        "",
        "not xml at all",
        "<a xmlns=\"http://schemas.microsoft.com/exchange/2010/Autodiscover\"><Domain>x.com</a>",
        "<a><b></b>",
        "<a></a><b></b>",
        "junk<a xmlns=\"http://schemas.microsoft.com/exchange/2010/Autodiscover\"><Domain>x</Domain></a>",
        "<a xmlns=\"http://schemas.microsoft.com/exchange/2010/Autodiscover\"><Domain>x.com</Domain></a>junk after root",
        "<a><x:Domain>x.com</x:Domain></a>",
        "<![CDATA[x.com]]><a></a>",
    ];

    for case in cases {
        let result = parse_federation_response(case);
        assert!(
            matches!(result, Err(CheckError::MalformedResponse(_))),
            "expected malformed response error for {:?}",
            case
        );
    }
}
