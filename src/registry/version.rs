//! Version token parsing
//!
//! The first line of the IANA registry file embeds a timestamp-like
//! version, e.g. `# Version 2023090100, Last Updated ...`. The version is
//! the first run of digits following the `Version` marker.

use crate::registry::{RegistryError, Result};

const VERSION_MARKER: &str = "Version";

/// Parse the version number out of a registry header line.
pub fn parse_version(header: &str) -> Result<u64> {
    let after_marker = match header.find(VERSION_MARKER) {
        Some(idx) => &header[idx + VERSION_MARKER.len()..],
        None => return Err(RegistryError::Version(header.to_string())),
    };

    let digits: String = after_marker
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits
        .parse::<u64>()
        .map_err(|_| RegistryError::Version(header.to_string()))
}
