//! Proxy parser module for normalizing raw proxy strings

use crate::error::{Error, ParseErrorKind};
use crate::proxy::models::ProxyRecord;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, warn, Span};

/// Matches a field made only of ASCII digits
static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("Invalid numeric regex"));

/// Proxy parser for parsing proxies from strings and files
///
/// Accepted token formats, with `:` and `@` interchangeable:
/// - LOGIN:PASS:HOST:PORT (numeric last field)
/// - HOST:PORT:LOGIN:PASS (numeric second field)
///
/// The last field is checked first, so a purely numeric password in the
/// HOST:PORT:LOGIN:PASS order is read as a port.
#[derive(Debug, Clone)]
pub struct ProxyParser {
    span: Span,
}

impl ProxyParser {
    pub fn new() -> Self {
        Self::with_span(tracing::info_span!("proxy_parser"))
    }

    /// Create a parser that logs inside the given span
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// Parse a single proxy token
    pub fn parse(&self, raw: &str) -> Result<ProxyRecord> {
        let fail = |kind| Error::Parse {
            input: raw.to_string(),
            kind,
        };

        let fields: Vec<&str> = raw.split([':', '@']).collect();
        let &[a, b, c, d] = fields.as_slice() else {
            return Err(fail(ParseErrorKind::FieldCount(fields.len())));
        };

        let (login, password, host, port) = if NUMERIC_REGEX.is_match(d) {
            (a, b, c, d)
        } else if NUMERIC_REGEX.is_match(b) {
            (c, d, a, b)
        } else {
            return Err(fail(ParseErrorKind::NoNumericField));
        };

        let port: u16 = port
            .parse()
            .map_err(|_| fail(ParseErrorKind::InvalidPort(port.to_string())))?;

        Ok(ProxyRecord::with_auth(host, port, login, password))
    }

    /// Parse a single token, logging and dropping it on failure
    pub fn parse_line(&self, raw: &str) -> Option<ProxyRecord> {
        let _enter = self.span.enter();
        match self.parse(raw) {
            Ok(proxy) => {
                debug!("proxy format passed: {}", raw);
                Some(proxy)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Parse every whitespace-separated token of a document
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse_string(&self, content: &str) -> Vec<ProxyRecord> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .flat_map(str::split_whitespace)
            .filter_map(|token| self.parse_line(token))
            .collect()
    }

    /// Parse proxies from a file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ProxyRecord>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse_string(&content))
    }
}

impl Default for ProxyParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ProxyParser {
        ProxyParser::new()
    }

    #[test]
    fn test_parse_login_first_format() {
        let proxy = parser().parse("user:pass:1.2.3.4:8080").unwrap();
        assert_eq!(proxy.host, "1.2.3.4");
        assert_eq!(proxy.port, 8080);
        assert_eq!(proxy.login.as_deref(), Some("user"));
        assert_eq!(proxy.password.as_deref(), Some("pass"));
        assert!(proxy.has_auth());
    }

    #[test]
    fn test_parse_host_first_format() {
        let proxy = parser().parse("1.2.3.4:8080:user:pass").unwrap();
        assert_eq!(proxy, parser().parse("user:pass:1.2.3.4:8080").unwrap());
    }

    #[test]
    fn test_parse_at_separator() {
        let proxy = parser().parse("user:pass@1.2.3.4:8080").unwrap();
        assert_eq!(proxy.host, "1.2.3.4");
        assert_eq!(proxy.port, 8080);
        assert!(proxy.has_auth());

        let proxy = parser().parse("1.2.3.4:8080@user:pass").unwrap();
        assert_eq!(proxy.login.as_deref(), Some("user"));
    }

    #[test]
    fn test_numeric_last_field_wins() {
        // Both candidates match; the last field takes priority.
        let proxy = parser().parse("1.2.3.4:8080:user:1234").unwrap();
        assert_eq!(proxy.host, "user");
        assert_eq!(proxy.port, 1234);
        assert_eq!(proxy.login.as_deref(), Some("1.2.3.4"));
        assert_eq!(proxy.password.as_deref(), Some("8080"));
    }

    #[test]
    fn test_parse_wrong_field_count() {
        for input in ["1.2.3.4:8080", "1.2.3.4", "a:b:c", "a:b:c:d:5", ""] {
            let err = parser().parse(input).unwrap_err();
            assert!(
                matches!(err, Error::Parse { kind: ParseErrorKind::FieldCount(_), .. }),
                "{input} -> {err}"
            );
            assert!(parser().parse_line(input).is_none());
        }
    }

    #[test]
    fn test_parse_no_numeric_field() {
        let err = parser().parse("user:pass:host:port").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse { kind: ParseErrorKind::NoNumericField, .. }
        ));
    }

    #[test]
    fn test_parse_port_out_of_range() {
        let err = parser().parse("user:pass:1.2.3.4:70000").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse { kind: ParseErrorKind::InvalidPort(ref p), .. } if p == "70000"
        ));
    }

    #[test]
    fn test_non_ascii_digits_are_not_numeric() {
        assert!(parser().parse("user:pass:1.2.3.4:٨٠").is_err());
    }

    #[test]
    fn test_parse_keeps_zero_port() {
        let proxy = parser().parse("user:pass:1.2.3.4:0").unwrap();
        assert_eq!(proxy.port, 0);
        assert!(!proxy.is_probeable());
    }

    #[test]
    fn test_parse_string() {
        let content = r#"
user:pass:192.168.1.1:8080 192.168.1.2:3128:user:pass
# This is a comment
broken-entry

10.0.0.1:1080:alice:secret
"#;
        let proxies = parser().parse_string(content);
        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies[0].host, "192.168.1.1");
        assert_eq!(proxies[1].port, 3128);
        assert_eq!(proxies[2].login.as_deref(), Some("alice"));
    }

    #[test]
    fn test_parse_missing_file() {
        let path = std::env::temp_dir().join("proxy-pulse-does-not-exist.txt");
        let err = parser().parse_file(&path).unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[test]
    fn test_parse_file() {
        let path = std::env::temp_dir().join(format!(
            "proxy-pulse-parser-{}.txt",
            std::process::id()
        ));
        fs::write(&path, "user:pass:1.2.3.4:8080\n5.6.7.8:1080:u:p\n").unwrap();
        let proxies = parser().parse_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[1].host, "5.6.7.8");
    }
}
