use async_trait::async_trait;

use crate::cas::options::CasType;
use crate::cas::types::{
    CreateCertificateAuthorityRequest, CreateCertificateAuthorityResponse,
    CreateCertificateRequest, CreateCertificateResponse, GetCertificateAuthorityRequest,
    GetCertificateAuthorityResponse, RenewCertificateRequest, RenewCertificateResponse,
    RevokeCertificateRequest, RevokeCertificateResponse,
};
use crate::error::Error;
use crate::types::Result;

/// Certificate authority service interface
#[async_trait]
pub trait CertificateAuthorityService: Send + Sync {
    /// Backend kind of this instance
    fn cas_type(&self) -> CasType;

    /// Sign a new certificate
    async fn create_certificate(&self, req: CreateCertificateRequest) -> Result<CreateCertificateResponse>;

    /// Renew a certificate
    async fn renew_certificate(&self, req: RenewCertificateRequest) -> Result<RenewCertificateResponse>;

    /// Revoke a certificate
    async fn revoke_certificate(&self, req: RevokeCertificateRequest) -> Result<RevokeCertificateResponse>;

    /// Create a root or intermediate authority
    async fn create_certificate_authority(
        &self,
        req: CreateCertificateAuthorityRequest,
    ) -> Result<CreateCertificateAuthorityResponse>;

    /// Root retrieval capability, if the backend has one
    fn certificate_authority_getter(&self) -> Option<&dyn CertificateAuthorityGetter> {
        None
    }
}

/// Backends that can return the root of an existing authority
#[async_trait]
pub trait CertificateAuthorityGetter: Send + Sync {
    async fn get_certificate_authority(
        &self,
        req: GetCertificateAuthorityRequest,
    ) -> Result<GetCertificateAuthorityResponse>;
}

/// Fetch the root through the capability, failing when the backend has none
pub async fn get_certificate_authority(
    cas: &dyn CertificateAuthorityService,
    req: GetCertificateAuthorityRequest,
) -> Result<GetCertificateAuthorityResponse> {
    match cas.certificate_authority_getter() {
        Some(getter) => getter.get_certificate_authority(req).await,
        None => Err(Error::Unsupported(format!(
            "{} does not support retrieving the certificate authority root",
            cas.cas_type()
        ))),
    }
}
