//! Verification facade
//!
//! `TldVerifier` ties the two independent paths together: a live SOA query
//! against the configured resolvers, and the offline check against the
//! held registry snapshot. The snapshot is owned here behind a mutex;
//! only the refresh path ever writes it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use derive_more::{Display, Error, From};

use crate::dns::lookup::LookupClient;
use crate::dns::outcome::FailureReason;
use crate::dns::protocol::{Proto, QueryType};
use crate::dns::resolvers::system_resolvers;
use crate::domain_name::top_level_domain;
use crate::registry::refresh::{HttpFetch, RefreshOutcome, RefreshPipeline};
use crate::registry::snapshot::TldSnapshot;

/// Default location for the persisted registry snapshot, the file name
/// IANA publishes the list under.
pub const DEFAULT_SNAPSHOT_FILE: &str = "tlds-alpha-by-domain.txt";

#[derive(Debug, Display, From, Error)]
pub enum VerifyError {
    Query(FailureReason),
    Registry(crate::registry::RegistryError),
    PoisonedLock,
}

type Result<T> = std::result::Result<T, VerifyError>;

pub struct TldVerifier {
    lookup: LookupClient,
    pipeline: RefreshPipeline<HttpFetch>,
    snapshot_file: PathBuf,

    /// Explicit resolver list; discovered from the system when empty.
    pub servers: Vec<String>,

    /// Single-writer cache: replaced only by a refresh, read everywhere
    /// else.
    cache: Mutex<Option<TldSnapshot>>,
}

impl Default for TldVerifier {
    fn default() -> TldVerifier {
        TldVerifier::new()
    }
}

impl TldVerifier {
    pub fn new() -> TldVerifier {
        TldVerifier {
            lookup: LookupClient::new(),
            pipeline: RefreshPipeline::new(),
            snapshot_file: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            servers: Vec::new(),
            cache: Mutex::new(None),
        }
    }

    pub fn with_snapshot_file(mut self, path: &Path) -> TldVerifier {
        self.snapshot_file = path.to_path_buf();
        self
    }

    /// Verify a top-level domain exists by querying the DNS root zone
    /// infrastructure for its SOA record.
    ///
    /// The argument may be a full domain name or a bare TLD; only the top
    /// label is queried. `false` means the zone was authoritatively absent
    /// (NXDOMAIN or no answer records); every other non-answer is an error.
    pub fn verify(&self, domain_name: &str, proto: Proto) -> Result<bool> {
        let tld = top_level_domain(domain_name);

        let servers = if self.servers.is_empty() {
            system_resolvers()
        } else {
            self.servers.clone()
        };

        let outcome = self.lookup.lookup(tld, QueryType::Soa, proto, &servers);
        outcome.into_bool().map_err(VerifyError::Query)
    }

    /// Verify a top-level domain against the held registry snapshot,
    /// refreshing from IANA first if nothing is held yet.
    pub fn verify_offline(&self, domain_name: &str) -> Result<bool> {
        let tld = top_level_domain(domain_name);

        {
            let cache = self.cache.lock().map_err(|_| VerifyError::PoisonedLock)?;
            if let Some(snapshot) = cache.as_ref() {
                return Ok(snapshot.contains(tld));
            }
        }

        self.refresh()?;

        let cache = self.cache.lock().map_err(|_| VerifyError::PoisonedLock)?;
        match cache.as_ref() {
            Some(snapshot) => Ok(snapshot.contains(tld)),
            // a refresh over an empty cache either adopts or errors out
            // above, it never leaves the cache empty
            None => unreachable!("refresh populated the cache"),
        }
    }

    /// Verify against a previously stored snapshot file. The file is
    /// loaded and, if strictly newer than anything held, adopted.
    pub fn verify_offline_with(&self, domain_name: &str, snapshot_path: &Path) -> Result<bool> {
        let tld = top_level_domain(domain_name);
        let loaded = TldSnapshot::load(snapshot_path)?;

        let mut cache = self.cache.lock().map_err(|_| VerifyError::PoisonedLock)?;
        let stale = match cache.as_ref() {
            Some(held) => held.version() >= loaded.version(),
            None => false,
        };
        if !stale {
            *cache = Some(loaded);
        }

        match cache.as_ref() {
            Some(snapshot) => Ok(snapshot.contains(tld)),
            None => unreachable!("cache was just populated"),
        }
    }

    /// Download the official TLD list from IANA, verify it and store it at
    /// the configured snapshot location.
    pub fn refresh(&self) -> Result<RefreshOutcome> {
        let mut cache = self.cache.lock().map_err(|_| VerifyError::PoisonedLock)?;
        let outcome = self.pipeline.refresh(&mut cache, &self.snapshot_file)?;
        Ok(outcome)
    }
}
