//! Correlation extension embedded in every certificate a backend issues.
//!
//! The remote service addresses certificates by its own identifier, so the
//! identifier travels inside the certificate as
//! `SEQUENCE { INTEGER backendID, UTF8String certificateID }`.

use der::{Decode, Encode, Sequence};

use crate::cas::options::CasType;
use crate::crypto::{Certificate, CertificateTemplate, Extension};
use crate::error::Error;
use crate::types::Result;

/// 1.3.6.1.4.1.37476.9000.64.2
pub const CERTIFICATE_AUTHORITY_EXTENSION_OID: &[u64] = &[1, 3, 6, 1, 4, 1, 37476, 9000, 64, 2];

/// Decoded correlation extension value
#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
pub struct CertificateAuthorityExtension {
    pub backend_id: u32,
    pub certificate_id: String,
}

impl CertificateAuthorityExtension {
    pub fn new(cas_type: CasType, certificate_id: impl Into<String>) -> Self {
        Self {
            backend_id: cas_type.backend_id(),
            certificate_id: certificate_id.into(),
        }
    }

    /// Backend that issued the certificate, if known
    pub fn cas_type(&self) -> Option<CasType> {
        CasType::from_backend_id(self.backend_id)
    }
}

/// DER encoding of the extension value
pub fn encode(backend_id: u32, certificate_id: &str) -> Result<Vec<u8>> {
    CertificateAuthorityExtension {
        backend_id,
        certificate_id: certificate_id.to_string(),
    }
    .to_der()
    .map_err(|e| Error::decode_with("error encoding certificate authority extension", e))
}

pub fn decode(value: &[u8]) -> Result<CertificateAuthorityExtension> {
    CertificateAuthorityExtension::from_der(value)
        .map_err(|e| Error::decode_with("error decoding certificate authority extension", e))
}

/// Build the non-critical extension for a template
pub fn create_certificate_authority_extension(cas_type: CasType, certificate_id: &str) -> Result<Extension> {
    let value = encode(cas_type.backend_id(), certificate_id)?;
    Ok(Extension::new(CERTIFICATE_AUTHORITY_EXTENSION_OID, false, value))
}

/// Scan a certificate for the correlation extension
pub fn find_certificate_authority_extension(cert: &Certificate) -> Result<Option<Extension>> {
    Ok(cert
        .extensions()?
        .into_iter()
        .find(|ext| ext.has_oid(CERTIFICATE_AUTHORITY_EXTENSION_OID)))
}

/// Drop any correlation extension from the template; safe to repeat
pub fn remove_certificate_authority_extension(template: &mut CertificateTemplate) -> usize {
    template.remove_extension(CERTIFICATE_AUTHORITY_EXTENSION_OID)
}

/// Replace the template's correlation extension with a fresh one
pub fn tag_template(template: &mut CertificateTemplate, cas_type: CasType, certificate_id: &str) -> Result<()> {
    let extension = create_certificate_authority_extension(cas_type, certificate_id)?;
    remove_certificate_authority_extension(template);
    template.add_extension(extension);
    Ok(())
}
