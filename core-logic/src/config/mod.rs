use crate::error::{ConfigError, CoreError};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Wallet identity as supplied by the account file.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Account {
    #[serde(default)]
    pub address: String,
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

impl Account {
    pub fn new(address: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("private_key", &"***REDACTED***")
            .finish()
    }
}

/// Proxy protocol, taken from the URI scheme.
///
/// SOCKS4 and SOCKS4a are not accepted: the socks connector in the HTTP
/// client only speaks SOCKS5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    Http,
    Https,
    Socks5,
    /// SOCKS5 with hostname resolution on the proxy side.
    Socks5h,
}

impl ProxyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Https => "https",
            ProxyScheme::Socks5 => "socks5",
            ProxyScheme::Socks5h => "socks5h",
        }
    }

    pub fn is_socks(&self) -> bool {
        matches!(self, ProxyScheme::Socks5 | ProxyScheme::Socks5h)
    }
}

impl FromStr for ProxyScheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(ProxyScheme::Http),
            "https" => Ok(ProxyScheme::Https),
            "socks" | "socks5" => Ok(ProxyScheme::Socks5),
            "socks5h" => Ok(ProxyScheme::Socks5h),
            _ => Err(()),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub scheme: ProxyScheme,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .finish()
    }
}

impl ProxyConfig {
    /// Parses one proxy entry.
    ///
    /// Accepts `scheme://[user:pass@]host:port` for http, https, socks5 and
    /// socks5h, or the bare `host:port[:user:pass]` form, which is treated
    /// as an HTTP proxy.
    pub fn parse(line: &str) -> Result<Self, ConfigError> {
        let line = line.trim();
        if line.contains("://") {
            Self::parse_uri(line)
        } else {
            Self::parse_colon_form(line)
        }
    }

    fn parse_uri(uri: &str) -> Result<Self, ConfigError> {
        let parsed = url::Url::parse(uri).map_err(|_| ConfigError::InvalidUrl {
            url: uri.to_string(),
        })?;

        let scheme = parsed.scheme().parse::<ProxyScheme>().map_err(|_| {
            ConfigError::UnsupportedProxyScheme {
                scheme: parsed.scheme().to_string(),
                uri: uri.to_string(),
            }
        })?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::InvalidUrl {
                url: uri.to_string(),
            })?
            .to_string();

        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "proxy".to_string(),
                reason: format!("missing port in '{}'", uri),
            })?;

        let username = Some(parsed.username())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        let password = parsed.password().map(str::to_string);

        Ok(Self {
            scheme,
            host,
            port,
            username,
            password,
        })
    }

    fn parse_colon_form(line: &str) -> Result<Self, ConfigError> {
        // ip:port:user:pass -> 4 parts
        // ip:port -> 2 parts
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 2 && parts.len() != 4 {
            return Err(ConfigError::InvalidValue {
                field: "proxy".to_string(),
                reason: format!("expected host:port[:user:pass], got '{}'", line),
            });
        }

        let port = parts[1]
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "proxy".to_string(),
                reason: format!("bad port '{}': {}", parts[1], e),
            })?;

        let (username, password) = if parts.len() == 4 {
            (Some(parts[2].to_string()), Some(parts[3].to_string()))
        } else {
            (None, None)
        };

        Ok(Self {
            scheme: ProxyScheme::Http,
            host: parts[0].to_string(),
            port,
            username,
            password,
        })
    }

    /// Proxy URL without credentials.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }

    /// Builds the reqwest proxy for this entry.
    ///
    /// HTTP-family proxies authenticate with a `Proxy-Authorization` header.
    /// The socks connector only reads credentials from the URL userinfo, so
    /// SOCKS-family proxies get them embedded instead.
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy, CoreError> {
        let proxy = match self.scheme {
            ProxyScheme::Http | ProxyScheme::Https => {
                let proxy = reqwest::Proxy::all(self.url()).map_err(|e| self.build_error(e))?;
                match self.basic_auth() {
                    Some((u, p)) => proxy.basic_auth(u, p),
                    None => proxy,
                }
            }
            ProxyScheme::Socks5 | ProxyScheme::Socks5h => {
                reqwest::Proxy::all(self.socks_url()?.as_str()).map_err(|e| self.build_error(e))?
            }
        };

        Ok(proxy)
    }

    /// Username and password for `Proxy-Authorization`. A username without
    /// a password authenticates with an empty password.
    fn basic_auth(&self) -> Option<(&str, &str)> {
        self.username
            .as_deref()
            .map(|u| (u, self.password.as_deref().unwrap_or("")))
    }

    /// Proxy URL with credentials in the userinfo.
    fn socks_url(&self) -> Result<url::Url, ConfigError> {
        let invalid = || ConfigError::InvalidUrl { url: self.url() };
        let mut url = url::Url::parse(&self.url()).map_err(|_| invalid())?;
        if let Some(u) = &self.username {
            url.set_username(u).map_err(|_| invalid())?;
            url.set_password(self.password.as_deref())
                .map_err(|_| invalid())?;
        }
        Ok(url)
    }

    fn build_error(&self, e: reqwest::Error) -> CoreError {
        ConfigError::InvalidValue {
            field: "proxy".to_string(),
            reason: format!("{}: {}", self.url(), e),
        }
        .into()
    }
}
