//! Request and resource shapes of the remote certificate authority API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Issued certificate resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certificate {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Request by CSR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pem_csr: Option<String>,
    /// Request by explicit configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<CertificateConfig>,
    /// Duration such as `"3600s"`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lifetime: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pem_certificate: String,
    /// Issuer chain, closest issuer first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pem_certificate_chain: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_details: Option<RevocationDetails>,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevocationDetails {
    pub revocation_state: Option<RevocationReason>,
    pub revocation_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateConfig {
    pub subject_config: SubjectConfig,
    pub reusable_config: ReusableConfigWrapper,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfig {
    pub subject: Subject,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub common_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject_alt_name: Option<SubjectAltNames>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subject {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organizational_unit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub locality: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub province: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub street_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectAltNames {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReusableConfigWrapper {
    pub reusable_config_values: ReusableConfigValues,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReusableConfigValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_usage: Option<KeyUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_options: Option<CaOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policy_ids: Vec<ObjectId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aia_ocsp_servers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_extensions: Vec<X509Extension>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyUsage {
    pub base_key_usage: KeyUsageOptions,
    pub extended_key_usage: ExtendedKeyUsageOptions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_extended_key_usages: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyUsageOptions {
    pub digital_signature: bool,
    pub content_commitment: bool,
    pub key_encipherment: bool,
    pub data_encipherment: bool,
    pub key_agreement: bool,
    pub cert_sign: bool,
    pub crl_sign: bool,
    pub encipher_only: bool,
    pub decipher_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedKeyUsageOptions {
    pub server_auth: bool,
    pub client_auth: bool,
    pub code_signing: bool,
    pub email_protection: bool,
    pub time_stamping: bool,
    pub ocsp_signing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaOptions {
    pub is_ca: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_issuer_path_length: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectId {
    pub object_id_path: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Extension {
    pub object_id: ObjectId,
    #[serde(default)]
    pub critical: bool,
    /// Base64 of the DER value
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicKeyType {
    PemRsaKey,
    PemEcKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    pub r#type: PublicKeyType,
    /// Base64 of the PEM encoded key
    pub key: String,
}

/// Certificate authority resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateAuthority {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<CertificateAuthorityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<CertificateConfig>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lifetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_spec: Option<KeyVersionSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_options: Option<IssuingOptions>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    /// The authority's certificate followed by its issuers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pem_ca_certificates: Vec<String>,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateAuthorityType {
    TypeUnspecified,
    SelfSigned,
    Subordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Enterprise,
    Devops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuingOptions {
    pub include_ca_cert_url: bool,
    pub include_crl_access_url: bool,
}

/// Remote key algorithm for a new authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignHashAlgorithm {
    #[serde(rename = "RSA_PSS_2048_SHA256")]
    RsaPss2048Sha256,
    #[serde(rename = "RSA_PSS_3072_SHA256")]
    RsaPss3072Sha256,
    #[serde(rename = "RSA_PSS_4096_SHA256")]
    RsaPss4096Sha256,
    #[serde(rename = "RSA_PKCS1_2048_SHA256")]
    RsaPkcs12048Sha256,
    #[serde(rename = "RSA_PKCS1_3072_SHA256")]
    RsaPkcs13072Sha256,
    #[serde(rename = "RSA_PKCS1_4096_SHA256")]
    RsaPkcs14096Sha256,
    EcP256Sha256,
    EcP384Sha384,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVersionSpec {
    pub algorithm: SignHashAlgorithm,
}

/// Remote revocation reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevocationReason {
    RevocationReasonUnspecified,
    KeyCompromise,
    CertificateAuthorityCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    PrivilegeWithdrawn,
    AttributeAuthorityCompromise,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCertificateRequest {
    /// Issuing authority resource name
    pub parent: String,
    pub certificate_id: String,
    pub certificate: Certificate,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeCertificateRequest {
    #[serde(skip)]
    pub name: String,
    pub reason: RevocationReason,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetCertificateAuthorityRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCertificateAuthorityRequest {
    /// `projects/{p}/locations/{l}`
    pub parent: String,
    pub certificate_authority_id: String,
    pub certificate_authority: CertificateAuthority,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchCertificateAuthorityCsrRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchCertificateAuthorityCsrResponse {
    pub pem_csr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateCertificateAuthorityRequest {
    #[serde(skip)]
    pub name: String,
    pub pem_ca_certificate: String,
    pub subordinate_config: SubordinateConfig,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubordinateConfig {
    pub pem_issuer_chain: PemIssuerChain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PemIssuerChain {
    pub pem_certificates: Vec<String>,
}

/// Long-running operation resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub name: String,
    pub done: bool,
    pub error: Option<Status>,
    pub response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Status {
    pub code: i32,
    pub message: String,
}
