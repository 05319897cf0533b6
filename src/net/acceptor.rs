//! Listen-spec processing.
//!
//! # Data Flow
//! ```text
//! "-a [name=]endpoint[,transport]"
//!     → parse (label, transport lookup)
//!     → resolver (endpoint → candidate addresses)
//!     → per candidate: collision check against the whole table,
//!       then bind via the binder
//!     → table + spec both record the new socket, in insertion order
//! ```
//!
//! A spec that ends with zero bound sockets fails the whole operation;
//! either the full listener set is established or startup does not
//! proceed.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::jail::Jail;
use crate::net::binder::{self, open_socket, BindOutcome};
use crate::net::inherit::InheritedFds;
use crate::net::resolver::{resolve_endpoint, ResolveError};
use crate::net::table::{ListenSocket, ListenTable};
use crate::transport::{self, Transport};

/// Errors that abort listener acquisition.
///
/// All of these are fatal configuration errors during startup; none is
/// retried.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Too many sub-arguments in listen spec '{0}'")]
    TooManyParts(String),

    #[error("Unknown protocol '{0}'")]
    UnknownTransport(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Listen arguments '{existing}' and '{new}' have the same address ({addr})")]
    DuplicateAddress {
        existing: String,
        new: String,
        addr: SocketAddr,
    },

    #[error("Could not get socket {endpoint}: {source}")]
    Bind {
        endpoint: String,
        source: io::Error,
    },

    #[error("Got no socket(s) for '{0}'")]
    NoSockets(String),
}

/// One operator-supplied listen argument and the table entries it produced.
///
/// Immutable after resolution completes. Sockets are referenced by stable
/// table index; the table owns their lifetime.
#[derive(Debug)]
pub struct ListenSpec {
    endpoint: String,
    name: String,
    transport: &'static Transport,
    sockets: Vec<usize>,
}

impl ListenSpec {
    /// Endpoint text as given by the operator.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Unique short name, operator-given or auto-generated.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> &'static Transport {
        self.transport
    }

    /// Table indices of the sockets this spec produced, in bind order.
    pub fn sockets(&self) -> &[usize] {
        &self.sockets
    }
}

/// Orchestrates listen-spec creation and owns the socket table.
#[derive(Debug, Default)]
pub struct AcceptorManager {
    table: ListenTable,
    specs: Vec<ListenSpec>,
    auto_seq: u32,
    default_port: u16,
}

impl AcceptorManager {
    pub fn new(default_port: u16) -> Self {
        Self {
            table: ListenTable::new(),
            specs: Vec::new(),
            auto_seq: 0,
            default_port,
        }
    }

    /// Process one listen argument: parse, resolve, bind every candidate.
    pub fn add_spec(
        &mut self,
        raw: &str,
        jail: &dyn Jail,
        fds: &mut InheritedFds,
    ) -> Result<(), SpecError> {
        let parsed = parse_spec(raw)?;

        let transport = match parsed.transport {
            Some(name) => transport::find(name)
                .ok_or_else(|| SpecError::UnknownTransport(name.to_string()))?,
            None => transport::default_transport(),
        };

        let name = match parsed.name {
            Some(n) => n.to_string(),
            None => {
                let n = format!("a{}", self.auto_seq);
                self.auto_seq += 1;
                n
            }
        };

        let addrs = resolve_endpoint(parsed.endpoint, self.default_port)?;
        let spec = ListenSpec {
            endpoint: parsed.endpoint.to_string(),
            name,
            transport,
            sockets: Vec::new(),
        };
        self.bind_candidates(spec, addrs, jail, fds)
    }

    fn bind_candidates(
        &mut self,
        mut spec: ListenSpec,
        addrs: Vec<SocketAddr>,
        jail: &dyn Jail,
        fds: &mut InheritedFds,
    ) -> Result<(), SpecError> {
        for addr in addrs {
            // Cross-spec collision check, against every entry so far.
            if let Some(existing) = self.table.find_conflict(&addr) {
                return Err(SpecError::DuplicateAddress {
                    existing: existing.endpoint().to_string(),
                    new: spec.endpoint.clone(),
                    addr,
                });
            }

            let mut ls = ListenSocket::new(addr, &spec.endpoint, &spec.name, spec.transport);
            match open_socket(&mut ls, jail, fds) {
                Ok(BindOutcome::Bound) => {
                    spec.sockets.push(self.table.push(ls));
                }
                Ok(BindOutcome::Unsupported) => {
                    tracing::debug!(
                        endpoint = %spec.endpoint,
                        %addr,
                        "Skipping unsupported address family"
                    );
                }
                Err(e) => {
                    return Err(SpecError::Bind {
                        endpoint: spec.endpoint.clone(),
                        source: e,
                    });
                }
            }
        }

        if spec.sockets.is_empty() {
            return Err(SpecError::NoSockets(spec.endpoint));
        }

        tracing::debug!(
            name = %spec.name,
            endpoint = %spec.endpoint,
            sockets = spec.sockets.len(),
            "Listen spec resolved"
        );
        self.specs.push(spec);
        Ok(())
    }

    /// Rebind every table entry; returns the highest OS error code seen.
    pub fn reopen_all(&mut self, jail: &dyn Jail, fds: &mut InheritedFds) -> i32 {
        binder::reopen_all(&mut self.table, jail, fds)
    }

    pub fn table(&self) -> &ListenTable {
        &self.table
    }

    pub fn specs(&self) -> &[ListenSpec] {
        &self.specs
    }
}

#[derive(Debug)]
struct ParsedSpec<'a> {
    name: Option<&'a str>,
    endpoint: &'a str,
    transport: Option<&'a str>,
}

/// Split `[name=]endpoint[,transport]`.
fn parse_spec(raw: &str) -> Result<ParsedSpec<'_>, SpecError> {
    let (name, rest) = match raw.split_once('=') {
        Some((head, tail)) if is_label(head) => (Some(head), tail),
        _ => (None, raw),
    };

    let mut parts = rest.split(',');
    let endpoint = parts.next().unwrap_or("");
    let transport = parts.next();
    if parts.next().is_some() {
        return Err(SpecError::TooManyParts(raw.to_string()));
    }

    Ok(ParsedSpec {
        name,
        endpoint,
        transport,
    })
}

fn is_label(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jail::NullJail;

    #[test]
    fn parse_plain_endpoint() {
        let p = parse_spec("127.0.0.1:8080").unwrap();
        assert!(p.name.is_none());
        assert_eq!(p.endpoint, "127.0.0.1:8080");
        assert!(p.transport.is_none());
    }

    #[test]
    fn parse_named_spec_with_transport() {
        let p = parse_spec("adm=127.0.0.1:8080,proxy").unwrap();
        assert_eq!(p.name, Some("adm"));
        assert_eq!(p.endpoint, "127.0.0.1:8080");
        assert_eq!(p.transport, Some("proxy"));
    }

    #[test]
    fn ipv6_endpoint_is_not_a_name() {
        let p = parse_spec("[::1]:8080").unwrap();
        assert!(p.name.is_none());
        assert_eq!(p.endpoint, "[::1]:8080");
    }

    #[test]
    fn too_many_sub_arguments() {
        let err = parse_spec("127.0.0.1:8080,http,extra").unwrap_err();
        assert!(matches!(err, SpecError::TooManyParts(_)));
    }

    #[test]
    fn unknown_transport_is_fatal() {
        let jail = NullJail;
        let mut fds = InheritedFds::new();
        let mut mgr = AcceptorManager::new(80);
        let err = mgr.add_spec("127.0.0.1:0,gopher", &jail, &mut fds).unwrap_err();
        assert!(matches!(err, SpecError::UnknownTransport(ref n) if n == "gopher"));
        assert!(mgr.table().is_empty());
    }

    #[test]
    fn labels_auto_sequence_only_when_generated() {
        let jail = NullJail;
        let mut fds = InheritedFds::new();
        let mut mgr = AcceptorManager::new(80);
        mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();
        mgr.add_spec("adm=127.0.0.1:0", &jail, &mut fds).unwrap();
        mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();

        let names: Vec<&str> = mgr.specs().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a0", "adm", "a1"]);
    }

    #[test]
    fn fatal_bind_error_leaves_table_unchanged() {
        let jail = NullJail;
        let mut fds = InheritedFds::new();
        let mut mgr = AcceptorManager::new(80);
        let err = mgr.add_spec("192.0.2.1:4711", &jail, &mut fds).unwrap_err();
        assert!(matches!(err, SpecError::Bind { .. }));
        assert!(mgr.table().is_empty());
        assert!(mgr.specs().is_empty());
        assert!(fds.is_empty());
    }

    #[test]
    fn zero_candidates_means_no_sockets() {
        let jail = NullJail;
        let mut fds = InheritedFds::new();
        let mut mgr = AcceptorManager::new(80);
        let spec = ListenSpec {
            endpoint: "empty.example".to_string(),
            name: "a0".to_string(),
            transport: crate::transport::default_transport(),
            sockets: Vec::new(),
        };
        let err = mgr
            .bind_candidates(spec, Vec::new(), &jail, &mut fds)
            .unwrap_err();
        assert!(matches!(err, SpecError::NoSockets(_)));
        assert!(mgr.table().is_empty());
    }

    #[test]
    fn duplicate_address_names_both_endpoints() {
        let jail = NullJail;
        let mut fds = InheritedFds::new();
        let mut mgr = AcceptorManager::new(80);
        mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();
        let port = mgr.table().get(0).unwrap().addr().port();

        let dup = format!("127.0.0.1:{port}");
        let err = mgr.add_spec(&dup, &jail, &mut fds).unwrap_err();
        match err {
            SpecError::DuplicateAddress { existing, new, .. } => {
                assert_eq!(existing, format!("127.0.0.1:{port}"));
                assert_eq!(new, dup);
            }
            other => panic!("expected DuplicateAddress, got {other:?}"),
        }
        assert_eq!(mgr.table().len(), 1);
    }
}
