use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::crypto::{Certificate, CertificateTemplate};

/// Request to sign a new certificate
#[derive(Debug, Clone, Default)]
pub struct CreateCertificateRequest {
    /// Certificate to issue; `None` is rejected
    pub template: Option<CertificateTemplate>,
    /// Validity period; zero is rejected
    pub lifetime: Duration,
    /// Idempotency key forwarded to the backend
    pub request_id: String,
}

/// Signed certificate and its issuer chain
#[derive(Debug, Clone)]
pub struct CreateCertificateResponse {
    pub certificate: Certificate,
    pub certificate_chain: Vec<Certificate>,
}

/// Request to renew a certificate; same shape as creation
#[derive(Debug, Clone, Default)]
pub struct RenewCertificateRequest {
    pub template: Option<CertificateTemplate>,
    pub lifetime: Duration,
    pub request_id: String,
}

#[derive(Debug, Clone)]
pub struct RenewCertificateResponse {
    pub certificate: Certificate,
    pub certificate_chain: Vec<Certificate>,
}

/// Request to revoke an issued certificate
#[derive(Debug, Clone, Default)]
pub struct RevokeCertificateRequest {
    pub certificate: Option<Certificate>,
    /// Serial number, informational for backends that revoke by identifier
    pub serial_number: String,
    /// Free text reason
    pub reason: String,
    /// RFC 5280 reason code
    pub reason_code: i32,
    pub request_id: String,
}

#[derive(Debug, Clone)]
pub struct RevokeCertificateResponse {
    pub certificate: Certificate,
    pub certificate_chain: Vec<Certificate>,
}

/// Kind of authority to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateAuthorityType {
    /// Self-signed root
    Root,
    /// Subordinate signed by a parent authority
    Intermediate,
}

/// Signature algorithm requested for a new authority key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    #[default]
    Unspecified,
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
    Sha256WithRsaPss,
    Sha384WithRsaPss,
    Sha512WithRsaPss,
    EcdsaWithSha256,
    EcdsaWithSha384,
    EcdsaWithSha512,
    PureEd25519,
}

/// Key parameters for a new authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateKeyOptions {
    pub signature_algorithm: SignatureAlgorithm,
    /// Key size for RSA algorithms; 0 selects the default
    pub bits: u32,
}

/// Authority that signs a new intermediate
#[derive(Debug, Clone, Default)]
pub struct ParentAuthority {
    /// Backend resource name of the parent
    pub name: String,
    pub certificate: Option<Certificate>,
}

impl From<CreateCertificateAuthorityResponse> for ParentAuthority {
    fn from(resp: CreateCertificateAuthorityResponse) -> Self {
        Self {
            name: resp.name,
            certificate: Some(resp.certificate),
        }
    }
}

/// Request to create a root or intermediate authority
#[derive(Debug, Clone)]
pub struct CreateCertificateAuthorityRequest {
    /// Requested authority identifier; empty generates one
    pub name: String,
    pub r#type: CertificateAuthorityType,
    pub template: Option<CertificateTemplate>,
    pub lifetime: Duration,
    /// Required for intermediates
    pub parent: Option<ParentAuthority>,
    pub create_key: Option<CreateKeyOptions>,
    pub request_id: String,
}

#[derive(Debug, Clone)]
pub struct CreateCertificateAuthorityResponse {
    /// Backend resource name of the new authority
    pub name: String,
    pub certificate: Certificate,
    pub certificate_chain: Vec<Certificate>,
}

/// Request for an authority's root; an empty name means the configured one
#[derive(Debug, Clone, Default)]
pub struct GetCertificateAuthorityRequest {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct GetCertificateAuthorityResponse {
    pub root_certificate: Certificate,
}

/// RFC 5280 revocation reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationReason {
    /// Unspecified
    Unspecified = 0,
    /// Key compromise
    KeyCompromise = 1,
    /// CA compromise
    CACompromise = 2,
    /// Affiliation changed
    AffiliationChanged = 3,
    /// Superseded
    Superseded = 4,
    /// Cessation of operation
    CessationOfOperation = 5,
    /// Certificate hold
    CertificateHold = 6,
    /// Removed from CRL
    RemoveFromCRL = 8,
    /// Privilege withdrawn
    PrivilegeWithdrawn = 9,
    /// AA compromise
    AACompromise = 10,
}

impl RevocationReason {
    /// Look up a reason code; 7 is unassigned
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Unspecified),
            1 => Some(Self::KeyCompromise),
            2 => Some(Self::CACompromise),
            3 => Some(Self::AffiliationChanged),
            4 => Some(Self::Superseded),
            5 => Some(Self::CessationOfOperation),
            6 => Some(Self::CertificateHold),
            8 => Some(Self::RemoveFromCRL),
            9 => Some(Self::PrivilegeWithdrawn),
            10 => Some(Self::AACompromise),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Convert to string
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::KeyCompromise => "keyCompromise",
            Self::CACompromise => "cACompromise",
            Self::AffiliationChanged => "affiliationChanged",
            Self::Superseded => "superseded",
            Self::CessationOfOperation => "cessationOfOperation",
            Self::CertificateHold => "certificateHold",
            Self::RemoveFromCRL => "removeFromCRL",
            Self::PrivilegeWithdrawn => "privilegeWithdrawn",
            Self::AACompromise => "aACompromise",
        }
    }
}
