//! Certificate authority service signing with a locally held key.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use der::asn1::{Ia5String as DerIa5String, ObjectIdentifier};
use der::{Encode, Sequence};
use rcgen::string::Ia5String;
use rcgen::{
    BasicConstraints as RcgenBasicConstraints, CertificateParams, CustomExtension, DnType, ExtendedKeyUsagePurpose,
    IsCa, Issuer, KeyPair, KeyUsagePurpose, PublicKeyData, SanType, SerialNumber, SignatureAlgorithm,
};
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;
use x509_parser::prelude::FromDer;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::cas::extension::tag_template;
use crate::cas::options::{CasType, Options};
use crate::cas::provider::CertificateAuthorityService;
use crate::cas::types::{
    CreateCertificateAuthorityRequest, CreateCertificateAuthorityResponse, CreateCertificateRequest,
    CreateCertificateResponse, RenewCertificateRequest, RenewCertificateResponse, RevokeCertificateRequest,
    RevokeCertificateResponse,
};
use crate::crypto::template::oid_to_string;
use crate::crypto::{
    parse_bundle, Certificate, CertificateTemplate, ExtendedKeyUsage, KeyAlgorithm, KeyUsage, SubjectPublicKey,
};
use crate::error::Error;
use crate::types::Result;

const OID_CERTIFICATE_POLICIES: &[u64] = &[2, 5, 29, 32];
const OID_AUTHORITY_INFO_ACCESS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 1];
const OID_AD_OCSP: &str = "1.3.6.1.5.5.7.48.1";
const OID_STREET_ADDRESS: &[u64] = &[2, 5, 4, 9];
const OID_POSTAL_CODE: &[u64] = &[2, 5, 4, 17];
const OID_SECP256R1: &str = "1.2.840.10045.3.1.7";
const OID_SECP384R1: &str = "1.3.132.0.34";

/// Signing material of the local backend
#[derive(Clone)]
pub struct SoftIssuer {
    /// Issuer certificate followed by its own issuers
    chain: Vec<Certificate>,
    key: Arc<KeyPair>,
}

impl SoftIssuer {
    pub fn new(chain: Vec<Certificate>, key: KeyPair) -> Result<Self> {
        if chain.is_empty() {
            return Err(Error::Config("softCAS issuer certificate cannot be empty".into()));
        }
        Ok(Self {
            chain,
            key: Arc::new(key),
        })
    }

    /// Load from a PEM certificate bundle and a PEM private key
    pub fn from_pem(certificate_pem: &str, key_pem: &str) -> Result<Self> {
        let chain = parse_bundle(certificate_pem)?;
        let key = KeyPair::from_pem(key_pem)
            .map_err(|e| Error::Config(format!("softCAS error parsing issuer key: {}", e)))?;
        Self::new(chain, key)
    }

    pub fn certificate(&self) -> &Certificate {
        &self.chain[0]
    }

    pub fn chain(&self) -> &[Certificate] {
        &self.chain
    }
}

impl fmt::Debug for SoftIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftIssuer")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Public key of the certificate being issued
struct TemplatePublicKey {
    raw: Vec<u8>,
    algorithm: &'static SignatureAlgorithm,
}

impl TemplatePublicKey {
    fn new(key: &SubjectPublicKey) -> Result<Self> {
        let (_, spki) = SubjectPublicKeyInfo::from_der(key.der())
            .map_err(|e| Error::decode_with("error parsing public key", e))?;

        let algorithm = match key.algorithm() {
            KeyAlgorithm::Rsa => &rcgen::PKCS_RSA_SHA256,
            KeyAlgorithm::Ed25519 => &rcgen::PKCS_ED25519,
            KeyAlgorithm::Ec => {
                let curve = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .and_then(|p| p.as_oid().ok())
                    .map(|oid| oid.to_id_string())
                    .unwrap_or_default();
                match curve.as_str() {
                    OID_SECP256R1 => &rcgen::PKCS_ECDSA_P256_SHA256,
                    OID_SECP384R1 => &rcgen::PKCS_ECDSA_P384_SHA384,
                    other => return Err(Error::Unsupported(format!("elliptic curve '{}'", other))),
                }
            }
        };

        Ok(Self {
            raw: spki.subject_public_key.data.to_vec(),
            algorithm,
        })
    }
}

impl PublicKeyData for TemplatePublicKey {
    fn der_bytes(&self) -> &[u8] {
        &self.raw
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        self.algorithm
    }
}

#[derive(Sequence)]
struct PolicyInformation {
    policy_identifier: ObjectIdentifier,
}

#[derive(Sequence)]
struct AccessDescription {
    access_method: ObjectIdentifier,
    #[asn1(context_specific = "6", tag_mode = "IMPLICIT")]
    access_location: DerIa5String,
}

/// Local signing backend
#[derive(Debug, Clone)]
pub struct SoftCas {
    issuer: SoftIssuer,
}

impl SoftCas {
    pub fn new(options: &Options) -> Result<Self> {
        let issuer = match (&options.issuer, &options.issuer_certificate, &options.issuer_key) {
            (Some(issuer), _, _) => issuer.clone(),
            (None, Some(cert_path), Some(key_path)) => {
                let certificate_pem = std::fs::read_to_string(cert_path).map_err(|e| {
                    Error::Config(format!("error reading {}: {}", cert_path.display(), e))
                })?;
                let key_pem = std::fs::read_to_string(key_path).map_err(|e| {
                    Error::Config(format!("error reading {}: {}", key_path.display(), e))
                })?;
                SoftIssuer::from_pem(&certificate_pem, &key_pem)?
            }
            _ => {
                return Err(Error::Config(
                    "softCAS requires an issuer certificate and key".into(),
                ))
            }
        };

        info!("Using local issuer {}", issuer.certificate().subject()?);
        Ok(Self { issuer })
    }

    fn sign(
        &self,
        template: Option<CertificateTemplate>,
        lifetime: Duration,
        request: &str,
    ) -> Result<(Certificate, Vec<Certificate>)> {
        let mut template =
            template.ok_or_else(|| Error::Validation(format!("{} 'template' cannot be empty", request)))?;
        if lifetime.is_zero() {
            return Err(Error::Validation(format!("{} 'lifetime' cannot be 0", request)));
        }
        let public_key = template
            .public_key
            .as_ref()
            .ok_or_else(|| Error::Validation("certificate template public key is required".into()))
            .and_then(TemplatePublicKey::new)?;

        let id = Uuid::new_v4().to_string();
        tag_template(&mut template, CasType::SoftCas, &id)?;
        let params = certificate_params(&template, lifetime)?;

        let issuer = Issuer::from_ca_cert_pem(&self.issuer.certificate().to_pem(), self.issuer.key.as_ref())?;
        let signed = params.signed_by(&public_key, &issuer)?;
        debug!("Signed certificate {} for '{}'", id, template.subject.common_name);

        Ok((Certificate::from_der(signed.der().to_vec())?, self.issuer.chain.clone()))
    }
}

#[async_trait]
impl CertificateAuthorityService for SoftCas {
    fn cas_type(&self) -> CasType {
        CasType::SoftCas
    }

    async fn create_certificate(&self, req: CreateCertificateRequest) -> Result<CreateCertificateResponse> {
        let (certificate, certificate_chain) = self.sign(req.template, req.lifetime, "createCertificateRequest")?;
        Ok(CreateCertificateResponse {
            certificate,
            certificate_chain,
        })
    }

    async fn renew_certificate(&self, req: RenewCertificateRequest) -> Result<RenewCertificateResponse> {
        let (certificate, certificate_chain) = self.sign(req.template, req.lifetime, "renewCertificateRequest")?;
        Ok(RenewCertificateResponse {
            certificate,
            certificate_chain,
        })
    }

    /// Revocation state lives with the caller; the certificate is returned unchanged
    async fn revoke_certificate(&self, req: RevokeCertificateRequest) -> Result<RevokeCertificateResponse> {
        let certificate = req
            .certificate
            .ok_or_else(|| Error::Validation("revokeCertificateRequest 'certificate' cannot be empty".into()))?;
        Ok(RevokeCertificateResponse {
            certificate,
            certificate_chain: self.issuer.chain.clone(),
        })
    }

    async fn create_certificate_authority(
        &self,
        _req: CreateCertificateAuthorityRequest,
    ) -> Result<CreateCertificateAuthorityResponse> {
        Err(Error::Unsupported(
            "softCAS does not support creating certificate authorities".into(),
        ))
    }
}

fn certificate_params(template: &CertificateTemplate, lifetime: Duration) -> Result<CertificateParams> {
    let mut params = CertificateParams::default();

    let subject = &template.subject;
    let dn = &mut params.distinguished_name;
    dn.push(DnType::CommonName, subject.common_name.as_str());
    let optional = [
        (DnType::CountryName, &subject.country),
        (DnType::OrganizationName, &subject.organization),
        (DnType::OrganizationalUnitName, &subject.organizational_unit),
        (DnType::LocalityName, &subject.locality),
        (DnType::StateOrProvinceName, &subject.province),
        (DnType::CustomDnType(OID_STREET_ADDRESS.to_vec()), &subject.street_address),
        (DnType::CustomDnType(OID_POSTAL_CODE.to_vec()), &subject.postal_code),
    ];
    for (ty, value) in optional {
        if let Some(value) = value {
            dn.push(ty, value.as_str());
        }
    }

    let ia5 = |value: &str| {
        Ia5String::try_from(value.to_string())
            .map_err(|e| Error::Validation(format!("invalid subject alternative name '{}': {}", value, e)))
    };
    for name in &template.dns_names {
        params.subject_alt_names.push(SanType::DnsName(ia5(name)?));
    }
    for email in &template.email_addresses {
        params.subject_alt_names.push(SanType::Rfc822Name(ia5(email)?));
    }
    for uri in &template.uris {
        params.subject_alt_names.push(SanType::URI(ia5(uri)?));
    }
    for ip in &template.ip_addresses {
        params.subject_alt_names.push(SanType::IpAddress(*ip));
    }

    params.key_usages = template
        .key_usage
        .iter()
        .map(|ku| match ku {
            KeyUsage::DigitalSignature => KeyUsagePurpose::DigitalSignature,
            KeyUsage::ContentCommitment => KeyUsagePurpose::ContentCommitment,
            KeyUsage::KeyEncipherment => KeyUsagePurpose::KeyEncipherment,
            KeyUsage::DataEncipherment => KeyUsagePurpose::DataEncipherment,
            KeyUsage::KeyAgreement => KeyUsagePurpose::KeyAgreement,
            KeyUsage::CertSign => KeyUsagePurpose::KeyCertSign,
            KeyUsage::CrlSign => KeyUsagePurpose::CrlSign,
            KeyUsage::EncipherOnly => KeyUsagePurpose::EncipherOnly,
            KeyUsage::DecipherOnly => KeyUsagePurpose::DecipherOnly,
        })
        .collect();

    params.extended_key_usages = template
        .extended_key_usage
        .iter()
        .map(|eku| match eku {
            ExtendedKeyUsage::ServerAuth => ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsage::ClientAuth => ExtendedKeyUsagePurpose::ClientAuth,
            ExtendedKeyUsage::CodeSigning => ExtendedKeyUsagePurpose::CodeSigning,
            ExtendedKeyUsage::EmailProtection => ExtendedKeyUsagePurpose::EmailProtection,
            ExtendedKeyUsage::TimeStamping => ExtendedKeyUsagePurpose::TimeStamping,
            ExtendedKeyUsage::OcspSigning => ExtendedKeyUsagePurpose::OcspSigning,
            ExtendedKeyUsage::Other(oid) => ExtendedKeyUsagePurpose::Other(oid.clone()),
        })
        .collect();

    params.is_ca = match template.basic_constraints {
        Some(bc) if bc.is_ca => match bc.max_path_len {
            Some(len) => IsCa::Ca(RcgenBasicConstraints::Constrained(len)),
            None => IsCa::Ca(RcgenBasicConstraints::Unconstrained),
        },
        Some(_) => IsCa::ExplicitNoCa,
        None => IsCa::NoCa,
    };

    if !template.policy_identifiers.is_empty() {
        let policies = template
            .policy_identifiers
            .iter()
            .map(|oid| Ok(PolicyInformation { policy_identifier: object_identifier(oid)? }))
            .collect::<Result<Vec<_>>>()?;
        params
            .custom_extensions
            .push(CustomExtension::from_oid_content(OID_CERTIFICATE_POLICIES, to_der(&policies)?));
    }

    if !template.ocsp_servers.is_empty() {
        let method = ObjectIdentifier::new(OID_AD_OCSP)
            .map_err(|e| Error::Validation(format!("invalid object identifier: {}", e)))?;
        let access = template
            .ocsp_servers
            .iter()
            .map(|server| {
                let access_location = DerIa5String::new(server)
                    .map_err(|e| Error::Validation(format!("invalid OCSP server '{}': {}", server, e)))?;
                Ok(AccessDescription {
                    access_method: method,
                    access_location,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        params
            .custom_extensions
            .push(CustomExtension::from_oid_content(OID_AUTHORITY_INFO_ACCESS, to_der(&access)?));
    }

    for ext in &template.extra_extensions {
        let mut custom = CustomExtension::from_oid_content(&ext.oid, ext.value.clone());
        custom.set_criticality(ext.critical);
        params.custom_extensions.push(custom);
    }

    let lifetime = time::Duration::try_from(lifetime)
        .map_err(|e| Error::Validation(format!("invalid lifetime: {}", e)))?;
    let now = OffsetDateTime::now_utc();
    params.not_before = now - time::Duration::minutes(1);
    params.not_after = now
        .checked_add(lifetime)
        .ok_or_else(|| Error::Validation("lifetime is out of range".into()))?;

    let mut serial = *Uuid::new_v4().as_bytes();
    serial[0] &= 0x7f;
    params.serial_number = Some(SerialNumber::from_slice(&serial));

    Ok(params)
}

fn object_identifier(arcs: &[u64]) -> Result<ObjectIdentifier> {
    let dotted = oid_to_string(arcs);
    ObjectIdentifier::new(&dotted)
        .map_err(|e| Error::Validation(format!("invalid object identifier {}: {}", dotted, e)))
}

fn to_der<T: Encode>(value: &T) -> Result<Vec<u8>> {
    value
        .to_der()
        .map_err(|e| Error::decode_with("error encoding extension", e))
}
