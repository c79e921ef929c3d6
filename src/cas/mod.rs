pub mod types;
pub mod options;
pub mod provider;
pub mod registry;
pub mod extension;
pub mod softcas;
pub mod cloudcas;

use std::sync::Arc;

use crate::types::Result;

// Re-export key types
pub use types::{
    CertificateAuthorityType, CreateCertificateAuthorityRequest, CreateCertificateAuthorityResponse,
    CreateCertificateRequest, CreateCertificateResponse, CreateKeyOptions, GetCertificateAuthorityRequest,
    GetCertificateAuthorityResponse, ParentAuthority, RenewCertificateRequest, RenewCertificateResponse,
    RevocationReason, RevokeCertificateRequest, RevokeCertificateResponse, SignatureAlgorithm,
};
pub use options::{CasType, Options};
pub use provider::{get_certificate_authority, CertificateAuthorityGetter, CertificateAuthorityService};
pub use registry::{CasConstructor, Registry};
pub use softcas::{SoftCas, SoftIssuer};
pub use cloudcas::CloudCas;

/// Constructors of the backends shipped with the crate
pub fn builtin_backends() -> Vec<(&'static str, CasConstructor)> {
    let softcas: CasConstructor =
        Arc::new(|options: &Options| -> Result<Arc<dyn CertificateAuthorityService>> {
            Ok(Arc::new(SoftCas::new(options)?))
        });
    let cloudcas: CasConstructor =
        Arc::new(|options: &Options| -> Result<Arc<dyn CertificateAuthorityService>> {
            Ok(Arc::new(CloudCas::new(options)?))
        });

    vec![
        (CasType::SoftCas.as_str(), softcas),
        (CasType::CloudCas.as_str(), cloudcas),
    ]
}
