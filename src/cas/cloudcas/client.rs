use async_trait::async_trait;

use crate::cas::cloudcas::api;
use crate::cas::cloudcas::operation::Operation;
use crate::error::ClientError;

/// Calls the remote certificate authority service exposes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateAuthorityClient: Send + Sync {
    async fn create_certificate(
        &self,
        req: api::CreateCertificateRequest,
    ) -> Result<api::Certificate, ClientError>;

    async fn revoke_certificate(
        &self,
        req: api::RevokeCertificateRequest,
    ) -> Result<api::Certificate, ClientError>;

    async fn get_certificate_authority(
        &self,
        req: api::GetCertificateAuthorityRequest,
    ) -> Result<api::CertificateAuthority, ClientError>;

    /// Starts creation; the returned operation yields the new authority
    async fn create_certificate_authority(
        &self,
        req: api::CreateCertificateAuthorityRequest,
    ) -> Result<Operation, ClientError>;

    async fn fetch_certificate_authority_csr(
        &self,
        req: api::FetchCertificateAuthorityCsrRequest,
    ) -> Result<api::FetchCertificateAuthorityCsrResponse, ClientError>;

    /// Starts activation of a subordinate
    async fn activate_certificate_authority(
        &self,
        req: api::ActivateCertificateAuthorityRequest,
    ) -> Result<Operation, ClientError>;
}
