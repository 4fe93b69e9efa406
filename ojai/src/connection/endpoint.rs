use crate::common::{HOST_SEPARATOR, OJAI_SCHEME, OPTION_SEPARATORS};
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One `host[:port]` entry of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostAddress {
    host: String,
    port: Option<u16>,
}

impl HostAddress {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl Display for HostAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// A parsed connection URL of the form
/// `ojai:<driver>:[//host[:port][,host[:port]...]][?key=value[;key=value...]]`.
///
/// The driver selects the backend; hosts and options are handed to it.
/// Options may be separated by `;` or `&`.
///
/// ```rust
/// use ojai::connection::Endpoint;
///
/// let endpoint = Endpoint::parse("ojai:mapr://node1:5678,node2?auth=basic;timeout=500").unwrap();
/// assert_eq!(endpoint.driver(), "mapr");
/// assert_eq!(endpoint.hosts().len(), 2);
/// assert_eq!(endpoint.hosts()[0].port(), Some(5678));
/// assert_eq!(endpoint.option("auth"), Some("basic"));
///
/// assert!(Endpoint::parse("jdbc:mapr:").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    driver: String,
    hosts: Vec<HostAddress>,
    options: IndexMap<String, String>,
}

impl Endpoint {
    /// Parses an endpoint URL.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::InvalidEndpoint] if the scheme is not `ojai`,
    /// the driver is missing, or a host, port or option is malformed.
    pub fn parse(url: &str) -> OjaiResult<Endpoint> {
        let url = url.trim();

        let (scheme, rest) = url
            .split_once(':')
            .ok_or_else(|| invalid(url, "missing scheme"))?;
        if scheme != OJAI_SCHEME {
            return Err(invalid(url, &format!("unsupported scheme '{}'", scheme)));
        }

        let (driver, rest) = rest
            .split_once(':')
            .ok_or_else(|| invalid(url, "missing driver"))?;
        if driver.is_empty() {
            return Err(invalid(url, "missing driver"));
        }
        if !driver
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid(url, &format!("invalid driver name '{}'", driver)));
        }

        let (authority, query) = match rest.split_once('?') {
            Some((authority, query)) => (authority, Some(query)),
            None => (rest, None),
        };

        let hosts = parse_hosts(url, authority)?;
        let options = match query {
            Some(query) => parse_options(url, query)?,
            None => IndexMap::new(),
        };

        Ok(Endpoint {
            url: url.to_string(),
            driver: driver.to_string(),
            hosts,
            options,
        })
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Cluster hosts. Empty means the driver default.
    pub fn hosts(&self) -> &[HostAddress] {
        &self.hosts
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Options in the order they appear in the URL.
    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

fn invalid(url: &str, reason: &str) -> OjaiError {
    log::error!("Invalid endpoint '{}': {}", url, reason);
    OjaiError::new(
        &format!("Invalid endpoint '{}': {}", url, reason),
        ErrorKind::InvalidEndpoint,
    )
}

fn parse_hosts(url: &str, authority: &str) -> OjaiResult<Vec<HostAddress>> {
    if authority.is_empty() {
        return Ok(Vec::new());
    }

    let list = authority
        .strip_prefix("//")
        .ok_or_else(|| invalid(url, "host list must start with '//'"))?;
    if list.is_empty() {
        return Ok(Vec::new());
    }

    list.split(HOST_SEPARATOR)
        .map(|entry| {
            let (host, port) = match entry.rsplit_once(':') {
                Some((host, port)) => {
                    let port = port
                        .parse::<u16>()
                        .map_err(|_| invalid(url, &format!("invalid port '{}'", port)))?;
                    (host, Some(port))
                }
                None => (entry, None),
            };
            if host.is_empty() {
                return Err(invalid(url, "empty host name"));
            }
            Ok(HostAddress {
                host: host.to_string(),
                port,
            })
        })
        .collect()
}

fn parse_options(url: &str, query: &str) -> OjaiResult<IndexMap<String, String>> {
    let mut options = IndexMap::new();
    for pair in query.split(&OPTION_SEPARATORS[..]) {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| invalid(url, &format!("option '{}' has no value", pair)))?;
        if key.is_empty() {
            return Err(invalid(url, "option with empty name"));
        }
        options.insert(key.to_string(), value.to_string());
    }
    Ok(options)
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl FromStr for Endpoint {
    type Err = OjaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::parse(s)
    }
}
