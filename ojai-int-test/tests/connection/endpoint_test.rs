use ojai::connection::Endpoint;
use ojai::errors::ErrorKind;

#[test]
fn test_parse_minimal_endpoint() {
    let endpoint = Endpoint::parse("ojai:mem:").unwrap();
    assert_eq!(endpoint.driver(), "mem");
    assert!(endpoint.hosts().is_empty());
    assert!(endpoint.options().is_empty());
}

#[test]
fn test_parse_hosts_and_options() {
    let endpoint: Endpoint = "ojai:mapr://node1:5678,node2?auth=basic&ssl=true".parse().unwrap();
    assert_eq!(endpoint.hosts().len(), 2);
    assert_eq!(endpoint.hosts()[1].to_string(), "node2");
    assert_eq!(endpoint.option("ssl"), Some("true"));
    assert_eq!(endpoint.to_string(), "ojai:mapr://node1:5678,node2?auth=basic&ssl=true");
}

#[test]
fn test_parse_invalid_endpoints() {
    for url in ["", "ojai", "ojai:", "http:mem:", "ojai:mem:localhost", "ojai:mem://node:port"] {
        let err = Endpoint::parse(url).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEndpoint, "{}", url);
    }
}
