use std::net::IpAddr;

use rustls_pemfile::Item;
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::prelude::FromDer;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::error::Error;
use crate::types::Result;

/// rsaEncryption
pub const OID_RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 1];
/// id-ecPublicKey
pub const OID_EC_PUBLIC_KEY: &[u64] = &[1, 2, 840, 10045, 2, 1];
/// id-Ed25519
pub const OID_ED25519: &[u64] = &[1, 3, 101, 112];

/// Dotted representation of an object identifier
pub fn oid_to_string(arcs: &[u64]) -> String {
    arcs.iter()
        .map(|arc| arc.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// A raw X.509 extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Object identifier arcs
    pub oid: Vec<u64>,
    /// Criticality flag
    pub critical: bool,
    /// DER encoded extension value
    pub value: Vec<u8>,
}

impl Extension {
    pub fn new(oid: &[u64], critical: bool, value: Vec<u8>) -> Self {
        Self {
            oid: oid.to_vec(),
            critical,
            value,
        }
    }

    pub fn has_oid(&self, oid: &[u64]) -> bool {
        self.oid == oid
    }
}

/// Subject distinguished name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub common_name: String,
    pub country: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub locality: Option<String>,
    pub province: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    DigitalSignature,
    ContentCommitment,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    CertSign,
    CrlSign,
    EncipherOnly,
    DecipherOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedKeyUsage {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
    /// Any other usage, by object identifier
    Other(Vec<u64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    /// Maximum number of intermediate CAs below this one
    pub max_path_len: Option<u8>,
}

/// Public key algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Ec,
    Ed25519,
}

/// DER encoded SubjectPublicKeyInfo of the key being certified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKey {
    algorithm: KeyAlgorithm,
    der: Vec<u8>,
}

impl SubjectPublicKey {
    /// Parse a DER encoded SubjectPublicKeyInfo
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        let (_, spki) = SubjectPublicKeyInfo::from_der(&der)
            .map_err(|e| Error::decode_with("error parsing public key", e))?;

        let oid = spki.algorithm.algorithm.to_id_string();
        let algorithm = if oid == oid_to_string(OID_RSA_ENCRYPTION) {
            KeyAlgorithm::Rsa
        } else if oid == oid_to_string(OID_EC_PUBLIC_KEY) {
            KeyAlgorithm::Ec
        } else if oid == oid_to_string(OID_ED25519) {
            KeyAlgorithm::Ed25519
        } else {
            return Err(Error::Unsupported(format!("public key algorithm {}", oid)));
        };

        Ok(Self { algorithm, der })
    }

    /// Parse a PEM encoded `PUBLIC KEY` block
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let block = pem::parse(pem_str)
            .map_err(|e| Error::decode_with("error decoding public key", e))?;
        if block.tag() != "PUBLIC KEY" {
            return Err(Error::decode(format!(
                "expected PUBLIC KEY block, found {}",
                block.tag()
            )));
        }
        Self::from_der(block.into_contents())
    }

    /// Take the public key out of a PEM encoded certificate signing request
    pub fn from_csr_pem(csr_pem: &str) -> Result<Self> {
        let mut reader = csr_pem.as_bytes();
        let csr_der = match rustls_pemfile::read_one(&mut reader)
            .map_err(|e| Error::decode_with("error decoding certificate request", e))?
        {
            Some(Item::Csr(der)) => der,
            _ => {
                return Err(Error::decode(
                    "error decoding certificate request: not a valid PEM encoded block",
                ))
            }
        };

        let (_, csr) = X509CertificationRequest::from_der(csr_der.as_ref())
            .map_err(|e| Error::decode_with("error parsing certificate request", e))?;
        Self::from_der(csr.certification_request_info.subject_pki.raw.to_vec())
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new("PUBLIC KEY", self.der.clone()))
    }
}

/// Description of a certificate to be issued.
///
/// `extra_extensions` is the only mutable extension list; backends append to
/// it (after removing their own previous entry) before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateTemplate {
    pub subject: Subject,
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    pub uris: Vec<String>,
    pub key_usage: Vec<KeyUsage>,
    pub extended_key_usage: Vec<ExtendedKeyUsage>,
    pub basic_constraints: Option<BasicConstraints>,
    pub policy_identifiers: Vec<Vec<u64>>,
    pub ocsp_servers: Vec<String>,
    pub public_key: Option<SubjectPublicKey>,
    pub extra_extensions: Vec<Extension>,
}

impl CertificateTemplate {
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            subject: Subject {
                common_name: common_name.into(),
                ..Subject::default()
            },
            ..Self::default()
        }
    }

    pub fn find_extension(&self, oid: &[u64]) -> Option<&Extension> {
        self.extra_extensions.iter().find(|ext| ext.has_oid(oid))
    }

    /// Remove every extra extension with the given identifier.
    ///
    /// Returns the number of removed entries; a second call returns 0.
    pub fn remove_extension(&mut self, oid: &[u64]) -> usize {
        let before = self.extra_extensions.len();
        self.extra_extensions.retain(|ext| !ext.has_oid(oid));
        before - self.extra_extensions.len()
    }

    pub fn add_extension(&mut self, extension: Extension) {
        self.extra_extensions.push(extension);
    }
}
