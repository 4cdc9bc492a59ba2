//! Registry Snapshot Pipeline
//!
//! Offline companion to the query engine: downloads the authoritative IANA
//! TLD list, verifies its published digest, and keeps a versioned in-memory
//! snapshot that answers existence queries without touching the network.
//!
//! # Module Structure
//!
//! * `version` - Version token parsing from the registry header line
//! * `snapshot` - In-memory snapshot with load / persist / membership
//! * `refresh` - Download, integrity check and version-gated adoption

use derive_more::{Display, Error, From};

/// Version token parsing from the registry header
pub mod version;

/// In-memory snapshot of the registry
pub mod snapshot;

/// Download and replacement pipeline
pub mod refresh;

#[derive(Debug, Display, From, Error)]
pub enum RegistryError {
    Io(std::io::Error),
    Fetch(reqwest::Error),
    #[display(fmt = "Could not download TLD data from IANA web site")]
    Integrity,
    #[display(fmt = "Registry file is empty, no header line")]
    MissingHeader,
    #[display(fmt = "Unable to parse registry version from header: {}", _0)]
    Version(#[error(not(source))] String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
