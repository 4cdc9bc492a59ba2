//! Failover controller for root zone queries
//!
//! Tries each candidate name server in the order it was discovered, one at
//! a time, until a server produces a decodable response or the list is
//! exhausted. Each attempt runs the blocking exchange on a worker thread
//! while the controller polls a channel in short fixed intervals up to the
//! attempt budget; a timed-out attempt is abandoned, never joined and never
//! forcibly terminated. A late reply from an abandoned worker lands in a
//! dropped channel and is discarded.

use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread::Builder;
use std::time::Duration;

use crate::dns::outcome::{interpret, FailureReason, QueryOutcome};
use crate::dns::protocol::{decode_response, encode_query, Proto, QueryType};
use crate::dns::transport::{Exchange, NetTransport, TransportError};

pub const DEFAULT_PORT: u16 = 53;

/// Per-server wait budget, polled in `DEFAULT_POLL_INTERVAL` steps.
pub const DEFAULT_ATTEMPT_BUDGET: Duration = Duration::from_secs(6);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct LookupClient {
    transport: Arc<dyn Exchange>,
    pub port: u16,
    pub attempt_budget: Duration,
    pub poll_interval: Duration,
}

impl Default for LookupClient {
    fn default() -> LookupClient {
        LookupClient::new()
    }
}

impl LookupClient {
    pub fn new() -> LookupClient {
        LookupClient::with_transport(Arc::new(NetTransport))
    }

    pub fn with_transport(transport: Arc<dyn Exchange>) -> LookupClient {
        LookupClient {
            transport,
            port: DEFAULT_PORT,
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Run one query against the supplied servers, strictly in order.
    ///
    /// The first decodable response, whatever its response code, ends the
    /// iteration. A transport failure moves on to the next server at once;
    /// a silent server is given the full attempt budget before being
    /// abandoned. Worst case wall clock is `servers.len()` times the
    /// budget. An empty server list, like full exhaustion, yields
    /// `Failed(NoResponse)`.
    pub fn lookup(
        &self,
        qname: &str,
        qtype: QueryType,
        proto: Proto,
        servers: &[String],
    ) -> QueryOutcome {
        let message = match encode_query(qname, qtype, proto) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("Could not encode query for {}: {}", qname, e);
                return QueryOutcome::Failed(FailureReason::MalformedQuery);
            }
        };

        for server in servers {
            match self.attempt(server, proto, &message) {
                Some(Ok(bytes)) => {
                    let summary = match decode_response(&bytes, proto) {
                        Ok(summary) => summary,
                        Err(e) => {
                            log::warn!("Undecodable response from {}: {}", server, e);
                            return QueryOutcome::Failed(FailureReason::InvalidResponse);
                        }
                    };

                    return interpret(&summary);
                }
                Some(Err(e)) => {
                    log::warn!("Transport failure at {}: {}, trying next server", server, e);
                }
                None => {
                    log::info!(
                        "No answer from {} within {:?}, abandoning attempt",
                        server,
                        self.attempt_budget
                    );
                }
            }
        }

        QueryOutcome::Failed(FailureReason::NoResponse)
    }

    /// One bounded attempt against a single server. `None` means the
    /// budget elapsed with the worker still in flight.
    fn attempt(
        &self,
        server: &str,
        proto: Proto,
        message: &[u8],
    ) -> Option<std::result::Result<Vec<u8>, TransportError>> {
        let (tx, rx) = channel();
        let transport = self.transport.clone();
        let server = server.to_string();
        let port = self.port;
        let budget = self.attempt_budget;
        let message = message.to_vec();

        let spawned = Builder::new()
            .name(format!("lookup-{}", server))
            .spawn(move || {
                let res = transport.exchange(&server, port, proto, &message, budget);
                // Fails when the controller has already moved on; the
                // late result is intentionally discarded.
                let _ = tx.send(res);
            });

        if let Err(e) = spawned {
            log::warn!("Could not spawn lookup worker: {}", e);
            return Some(Err(TransportError::Io(e)));
        }

        let mut polls_left = (self.attempt_budget.as_millis()
            / self.poll_interval.as_millis().max(1)) as u32;

        while polls_left > 0 {
            match rx.recv_timeout(self.poll_interval) {
                Ok(res) => return Some(res),
                Err(RecvTimeoutError::Timeout) => polls_left -= 1,
                Err(RecvTimeoutError::Disconnected) => {
                    return Some(Err(TransportError::Timeout));
                }
            }
        }

        None
    }
}
