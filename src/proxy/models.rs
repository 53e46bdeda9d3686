//! Proxy data models

use std::fmt;

/// Protocol a proxy is probed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    Http,
    Socks5,
}

impl ProxyType {
    /// Every protocol, in probe order
    pub const ALL: [ProxyType; 2] = [ProxyType::Http, ProxyType::Socks5];

    pub fn scheme(self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Socks5 => "socks5",
        }
    }

    /// URL scheme used to configure the tunneling client
    ///
    /// SOCKS5 uses `socks5h` so the proxy resolves the target host.
    pub fn proxy_scheme(self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Socks5 => "socks5h",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// A single proxy endpoint and the protocols it was found to support
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxyRecord {
    pub host: String,
    pub port: u16,
    pub login: Option<String>,
    pub password: Option<String>,
    http: bool,
    socks5: bool,
}

impl ProxyRecord {
    /// Create a new proxy without authentication
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Create a new proxy with credentials. Empty values count as absent.
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        Self {
            host: host.into(),
            port,
            login: non_empty(login.into()),
            password: non_empty(password.into()),
            ..Default::default()
        }
    }

    /// Both login and password are present
    pub fn has_auth(&self) -> bool {
        self.login.is_some() && self.password.is_some()
    }

    /// Credentials to hand to the tunneling client, if complete
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.login, &self.password) {
            (Some(login), Some(password)) => Some((login.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// Host is set and port is non-zero
    pub fn is_probeable(&self) -> bool {
        !self.host.is_empty() && self.port != 0
    }

    /// Get the proxy string in HOST:PORT format
    pub fn to_simple_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Proxy URL for the given protocol, without credentials
    pub fn url(&self, protocol: ProxyType) -> String {
        format!("{}://{}:{}", protocol.proxy_scheme(), self.host, self.port)
    }

    pub fn http(&self) -> bool {
        self.http
    }

    pub fn socks5(&self) -> bool {
        self.socks5
    }

    pub fn is_available(&self, protocol: ProxyType) -> bool {
        match protocol {
            ProxyType::Http => self.http,
            ProxyType::Socks5 => self.socks5,
        }
    }

    /// Record a successful probe. Flags only ever go from false to true.
    pub fn mark_available(&mut self, protocol: ProxyType) {
        match protocol {
            ProxyType::Http => self.http = true,
            ProxyType::Socks5 => self.socks5 = true,
        }
    }
}

impl fmt::Display for ProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.login {
            Some(login) if self.has_auth() => {
                write!(f, "{}:***@{}:{}", login, self.host, self.port)
            }
            _ => write!(f, "{}:{}", self.host, self.port),
        }
    }
}
