//! Download and replacement of the registry snapshot
//!
//! The pipeline fetches the live registry file and its published MD5
//! digest, verifies integrity, and replaces the held snapshot only when the
//! downloaded version is strictly newer. A download that is current or
//! older is discarded silently; that is a documented no-op, not an error.

use std::fs;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use crate::registry::snapshot::TldSnapshot;
use crate::registry::{RegistryError, Result};

pub const REGISTRY_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt";
pub const DIGEST_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt.md5";

/// Published digests are the first 32 hex characters of the digest file.
const DIGEST_LEN: usize = 32;

/// The "fetch a URL to bytes" capability the pipeline needs, kept behind a
/// trait so tests can stub the network away.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetch;

impl Fetch for HttpFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = reqwest::blocking::get(url)?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

/// What a successful refresh did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A strictly newer registry was adopted and persisted.
    Updated,
    /// The held snapshot is as new or newer; nothing changed.
    Current,
}

pub struct RefreshPipeline<F: Fetch> {
    fetch: F,
    registry_url: String,
    digest_url: String,
}

impl RefreshPipeline<HttpFetch> {
    pub fn new() -> RefreshPipeline<HttpFetch> {
        RefreshPipeline::with_fetch(HttpFetch, REGISTRY_URL, DIGEST_URL)
    }
}

impl Default for RefreshPipeline<HttpFetch> {
    fn default() -> RefreshPipeline<HttpFetch> {
        RefreshPipeline::new()
    }
}

impl<F: Fetch> RefreshPipeline<F> {
    pub fn with_fetch(fetch: F, registry_url: &str, digest_url: &str) -> RefreshPipeline<F> {
        RefreshPipeline {
            fetch,
            registry_url: registry_url.to_string(),
            digest_url: digest_url.to_string(),
        }
    }

    /// Run one full refresh cycle against `current`, persisting to `dest`
    /// on adoption. An integrity failure aborts the cycle before any state
    /// change; a stale or equal download returns `Current` untouched.
    pub fn refresh(
        &self,
        current: &mut Option<TldSnapshot>,
        dest: &Path,
    ) -> Result<RefreshOutcome> {
        let body = self.fetch.fetch(&self.registry_url)?;

        let tmp_path = download_sibling(dest);
        fs::write(&tmp_path, &body)?;

        let res = self.verify_and_adopt(&body, &tmp_path, current, dest);
        let _ = fs::remove_file(&tmp_path);
        res
    }

    fn verify_and_adopt(
        &self,
        body: &[u8],
        tmp_path: &Path,
        current: &mut Option<TldSnapshot>,
        dest: &Path,
    ) -> Result<RefreshOutcome> {
        let published = self.published_digest()?;
        let computed = md5_hex(body);

        if !computed.eq_ignore_ascii_case(&published) {
            log::warn!(
                "Registry digest mismatch: published {}, computed {}",
                published,
                computed
            );
            return Err(RegistryError::Integrity);
        }

        let candidate = TldSnapshot::load(tmp_path)?;

        if let Some(held) = current.as_ref() {
            if held.version() >= candidate.version() {
                log::info!(
                    "Held registry version {} is current, discarding downloaded version {}",
                    held.version(),
                    candidate.version()
                );
                return Ok(RefreshOutcome::Current);
            }
        }

        candidate.persist(dest)?;
        log::info!(
            "Adopted registry version {} with {} entries",
            candidate.version(),
            candidate.entries().len()
        );
        *current = Some(candidate);

        Ok(RefreshOutcome::Updated)
    }

    fn published_digest(&self) -> Result<String> {
        let body = self.fetch.fetch(&self.digest_url)?;
        let text = String::from_utf8_lossy(&body);

        let first_line = text.lines().next().unwrap_or("").trim();

        // Too short, or byte 32 inside a multibyte char from a corrupt
        // download: either way the digest file is unusable.
        first_line
            .get(..DIGEST_LEN)
            .map(|digest| digest.to_string())
            .ok_or(RegistryError::Integrity)
    }
}

fn md5_hex(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn download_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".download");
    path.with_file_name(name)
}
