//! Proxy module for parsing and checking proxies
//!
//! This module provides functionality for:
//! - Parsing proxies in `login:password:host:port` and `host:port:login:password` order
//! - Probing each proxy over HTTP and SOCKS5 concurrently
//! - Recording which protocols each proxy supports

pub mod checker;
pub mod models;
pub mod parser;

pub use checker::{
    CheckSummary, CheckerConfig, Probe, ProbeClient, ProbeCoordinator, ProbeOutcome,
    DEFAULT_TEST_URL,
};
pub use models::{ProxyRecord, ProxyType};
pub use parser::ProxyParser;
