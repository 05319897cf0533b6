//! Registry of known listener transports.
//!
//! A listen spec may carry an optional protocol suffix (`endpoint,proto`).
//! The suffix must name a transport registered here; an unknown name is a
//! fatal configuration error caught at spec-parse time.

/// Descriptor for one wire transport a listen socket can speak.
#[derive(Debug)]
pub struct Transport {
    /// Logical protocol identifier used in listen specs.
    pub name: &'static str,
}

static TRANSPORTS: [Transport; 2] = [
    Transport { name: "http" },
    Transport { name: "proxy" },
];

/// Look up a transport by its protocol name.
pub fn find(name: &str) -> Option<&'static Transport> {
    TRANSPORTS.iter().find(|t| t.name == name)
}

/// The transport assumed when a listen spec has no protocol suffix.
pub fn default_transport() -> &'static Transport {
    &TRANSPORTS[0]
}
