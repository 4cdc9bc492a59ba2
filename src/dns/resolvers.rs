//! Discovery of the system's configured DNS resolvers
//!
//! The failover controller only needs an ordered list of server address
//! strings; on unix that list comes from the `nameserver` lines of
//! /etc/resolv.conf, in file order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const RESOLV_CONF: &str = "/etc/resolv.conf";

/// The resolvers configured for this host, possibly none.
pub fn system_resolvers() -> Vec<String> {
    resolvers_from(Path::new(RESOLV_CONF))
}

fn resolvers_from(path: &Path) -> Vec<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut servers = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };

        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let mut parts = line.split_whitespace();
        if parts.next() == Some("nameserver") {
            if let Some(addr) = parts.next() {
                servers.push(addr.to_string());
            }
        }
    }

    servers
}
