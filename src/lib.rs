//! Proxy Pulse - Proxy availability checker
//!
//! Parses proxy strings in either `login:password:host:port` or
//! `host:port:login:password` order and probes every proxy over both
//! HTTP and SOCKS5 against a test URL.

pub mod error;
pub mod proxy;
pub mod report;

pub use error::{Error, ParseErrorKind, Result};
pub use proxy::*;
pub use report::ProxyTable;

use tracing_subscriber::EnvFilter;

/// Install the console logger.
///
/// `RUST_LOG` wins when set. Otherwise only errors are shown, or everything
/// from this crate at debug level when `debug` is true. Calling this more
/// than once keeps the first subscriber.
pub fn init_logger(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug))
        .with_target(true)
        .try_init();
}

fn log_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            concat!(env!("CARGO_CRATE_NAME"), "=debug")
        } else {
            "error"
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_prefers_rust_log() {
        std::env::set_var("RUST_LOG", "warn");
        assert_eq!(log_filter(true).to_string(), "warn");
        assert_eq!(log_filter(false).to_string(), "warn");

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter(true).to_string(), "proxy_pulse=debug");
        assert_eq!(log_filter(false).to_string(), "error");
    }
}
