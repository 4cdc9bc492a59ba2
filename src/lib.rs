//! TLD Verify
//!
//! Verifies whether a string is a currently registered top-level domain,
//! by two independent paths: a live SOA query against the DNS root zone
//! infrastructure, and an offline check against a previously fetched
//! snapshot of the IANA TLD registry.
//!
//! # Features
//!
//! * Hand-rolled DNS message codec over UDP and TCP
//! * Sequential failover across the system's resolvers with a bounded
//!   per-server wait budget
//! * Versioned registry snapshots with MD5 integrity checking and atomic
//!   on-disk replacement
//!
//! # Architecture
//!
//! The crate is divided into two main modules:
//! * `dns` - Query engine: codec, transports, failover, interpretation
//! * `registry` - Snapshot pipeline: download, verify, version gate, persist

/// DNS query engine
pub mod dns;

/// Registry snapshot pipeline
pub mod registry;

/// Domain name label helpers
pub mod domain_name;

/// High-level verification facade
pub mod verify;
