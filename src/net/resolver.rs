//! Endpoint resolution for listen specifications.
//!
//! Turns the textual endpoint of a listen spec into concrete socket
//! addresses. One spec may yield several candidates (a hostname resolving
//! to multiple families, or the wildcard host on a dual-stack machine);
//! candidates the host cannot bind are dropped later by the binder's
//! family-skip rule.
//!
//! Accepted forms: `""`, `"*"`, `"host"`, `"host:port"`, `":port"`,
//! `"port"`, `"[v6addr]"`, `"[v6addr]:port"`, and a bare IPv6 address.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use thiserror::Error;

/// Error type for endpoint resolution.
///
/// A name-service failure is distinct from a successful resolution to
/// zero addresses; the latter is `Ok(vec![])` and becomes a fatal
/// "no sockets" error at the call site.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid listen endpoint '{endpoint}': {reason}")]
    Malformed {
        endpoint: String,
        reason: &'static str,
    },

    #[error("Could not resolve '{endpoint}': {source}")]
    Lookup {
        endpoint: String,
        source: std::io::Error,
    },
}

/// Resolve a listen endpoint into candidate addresses.
///
/// `default_port` applies when the endpoint does not name a port. The
/// wildcard host expands to both the IPv6 and IPv4 unspecified addresses,
/// in that order.
pub fn resolve_endpoint(
    endpoint: &str,
    default_port: u16,
) -> Result<Vec<SocketAddr>, ResolveError> {
    let (host, port) = split_endpoint(endpoint)?;
    let port = match port {
        Some(p) => parse_port(endpoint, p)?,
        None => default_port,
    };

    if host.is_empty() || host == "*" {
        return Ok(vec![
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        ]);
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::from((ip, port))]);
    }

    match (host, port).to_socket_addrs() {
        Ok(addrs) => Ok(addrs.collect()),
        Err(e) => Err(ResolveError::Lookup {
            endpoint: endpoint.to_string(),
            source: e,
        }),
    }
}

/// Split an endpoint into host and optional port text.
fn split_endpoint(endpoint: &str) -> Result<(&str, Option<&str>), ResolveError> {
    let malformed = |reason| ResolveError::Malformed {
        endpoint: endpoint.to_string(),
        reason,
    };

    if let Some(rest) = endpoint.strip_prefix('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| malformed("unterminated '[' in address"))?;
        let host = &rest[..close];
        return match &rest[close + 1..] {
            "" => Ok((host, None)),
            tail => match tail.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(malformed("garbage after ']'")),
            },
        };
    }

    // More than one ':' without brackets is a bare IPv6 address.
    if endpoint.matches(':').count() > 1 {
        return Ok((endpoint, None));
    }

    match endpoint.split_once(':') {
        Some((host, port)) => Ok((host, Some(port))),
        None => {
            // A pure-numeric endpoint is a port on the wildcard host.
            if !endpoint.is_empty() && endpoint.bytes().all(|b| b.is_ascii_digit()) {
                Ok(("", Some(endpoint)))
            } else {
                Ok((endpoint, None))
            }
        }
    }
}

fn parse_port(endpoint: &str, text: &str) -> Result<u16, ResolveError> {
    text.parse::<u16>().map_err(|_| ResolveError::Malformed {
        endpoint: endpoint.to_string(),
        reason: "port must be a number between 0 and 65535",
    })
}
