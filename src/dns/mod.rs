//! DNS Query Engine
//!
//! Hand-rolled construction and parsing of DNS messages, sent over UDP or
//! TCP with bounded-time failover across the configured name servers.
//!
//! # Module Structure
//!
//! * `buffer` - Low-level packet buffer operations
//! * `protocol` - Message codec: header and question handling
//! * `outcome` - Tri-state query outcome and response interpretation
//! * `transport` - One-shot UDP and TCP exchanges
//! * `lookup` - Sequential failover across candidate servers
//! * `resolvers` - System resolver discovery

/// Low-level buffer operations for DNS message handling
pub mod buffer;

/// DNS message codec definitions
pub mod protocol;

/// Query outcome and response code interpretation
pub mod outcome;

/// One-shot network transports
pub mod transport;

/// Failover controller for queries
pub mod lookup;

/// System resolver discovery
pub mod resolvers;
