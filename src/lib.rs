//! CAS Bridge - pluggable certificate authority service
//!
//! Issues, renews and revokes certificates and creates authorities through
//! interchangeable backends: a locally held signing key or a remote managed CA

// Foundational layer
pub mod error;
pub mod types;
pub mod telemetry;
pub mod config;

// Core layer
pub mod crypto;
pub mod cas;

// Public key types
pub use crate::error::{Error, ErrorKind};
pub use crate::types::Result;
pub use crate::cas::{
    builtin_backends, get_certificate_authority, CasType, CertificateAuthorityGetter,
    CertificateAuthorityService, Options, Registry,
};
pub use crate::crypto::{Certificate, CertificateTemplate};
