//! Translation of certificate templates into remote certificate configs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::cas::cloudcas::api;
use crate::crypto::{CertificateTemplate, ExtendedKeyUsage, KeyAlgorithm, KeyUsage, SubjectPublicKey};
use crate::error::Error;
use crate::types::Result;

/// Config for an issued certificate; the template must carry a public key
pub fn create_certificate_config(template: &CertificateTemplate) -> Result<api::CertificateConfig> {
    let key = template
        .public_key
        .as_ref()
        .ok_or_else(|| Error::Validation("certificate template public key is required".into()))?;

    let mut config = create_authority_config(template);
    config.public_key = Some(create_public_key(key)?);
    Ok(config)
}

/// Config without a public key, used for authorities whose key is generated remotely
pub fn create_authority_config(template: &CertificateTemplate) -> api::CertificateConfig {
    api::CertificateConfig {
        subject_config: create_subject_config(template),
        reusable_config: api::ReusableConfigWrapper {
            reusable_config_values: create_reusable_config(template),
        },
        public_key: None,
    }
}

fn create_subject_config(template: &CertificateTemplate) -> api::SubjectConfig {
    let subject = &template.subject;
    let value = |v: &Option<String>| v.clone().unwrap_or_default();

    let has_sans = !template.dns_names.is_empty()
        || !template.uris.is_empty()
        || !template.email_addresses.is_empty()
        || !template.ip_addresses.is_empty();

    api::SubjectConfig {
        subject: api::Subject {
            country_code: value(&subject.country),
            organization: value(&subject.organization),
            organizational_unit: value(&subject.organizational_unit),
            locality: value(&subject.locality),
            province: value(&subject.province),
            street_address: value(&subject.street_address),
            postal_code: value(&subject.postal_code),
        },
        common_name: subject.common_name.clone(),
        subject_alt_name: has_sans.then(|| api::SubjectAltNames {
            dns_names: template.dns_names.clone(),
            uris: template.uris.clone(),
            email_addresses: template.email_addresses.clone(),
            ip_addresses: template.ip_addresses.iter().map(|ip| ip.to_string()).collect(),
        }),
    }
}

fn create_reusable_config(template: &CertificateTemplate) -> api::ReusableConfigValues {
    api::ReusableConfigValues {
        key_usage: create_key_usage(template),
        ca_options: template.basic_constraints.map(|bc| api::CaOptions {
            is_ca: bc.is_ca,
            max_issuer_path_length: bc.max_path_len.map(i32::from),
        }),
        policy_ids: template
            .policy_identifiers
            .iter()
            .map(|oid| object_id(oid))
            .collect(),
        aia_ocsp_servers: template.ocsp_servers.clone(),
        additional_extensions: template
            .extra_extensions
            .iter()
            .map(|ext| api::X509Extension {
                object_id: object_id(&ext.oid),
                critical: ext.critical,
                value: STANDARD.encode(&ext.value),
            })
            .collect(),
    }
}

fn create_key_usage(template: &CertificateTemplate) -> Option<api::KeyUsage> {
    if template.key_usage.is_empty() && template.extended_key_usage.is_empty() {
        return None;
    }

    let mut usage = api::KeyUsage::default();
    let base = &mut usage.base_key_usage;
    for ku in &template.key_usage {
        match ku {
            KeyUsage::DigitalSignature => base.digital_signature = true,
            KeyUsage::ContentCommitment => base.content_commitment = true,
            KeyUsage::KeyEncipherment => base.key_encipherment = true,
            KeyUsage::DataEncipherment => base.data_encipherment = true,
            KeyUsage::KeyAgreement => base.key_agreement = true,
            KeyUsage::CertSign => base.cert_sign = true,
            KeyUsage::CrlSign => base.crl_sign = true,
            KeyUsage::EncipherOnly => base.encipher_only = true,
            KeyUsage::DecipherOnly => base.decipher_only = true,
        }
    }

    for eku in &template.extended_key_usage {
        let extended = &mut usage.extended_key_usage;
        match eku {
            ExtendedKeyUsage::ServerAuth => extended.server_auth = true,
            ExtendedKeyUsage::ClientAuth => extended.client_auth = true,
            ExtendedKeyUsage::CodeSigning => extended.code_signing = true,
            ExtendedKeyUsage::EmailProtection => extended.email_protection = true,
            ExtendedKeyUsage::TimeStamping => extended.time_stamping = true,
            ExtendedKeyUsage::OcspSigning => extended.ocsp_signing = true,
            ExtendedKeyUsage::Other(oid) => usage.unknown_extended_key_usages.push(object_id(oid)),
        }
    }

    Some(usage)
}

fn create_public_key(key: &SubjectPublicKey) -> Result<api::PublicKey> {
    let key_type = match key.algorithm() {
        KeyAlgorithm::Rsa => api::PublicKeyType::PemRsaKey,
        KeyAlgorithm::Ec => api::PublicKeyType::PemEcKey,
        other => {
            return Err(Error::Unsupported(format!(
                "{:?} public keys are not supported by the remote service",
                other
            )))
        }
    };

    Ok(api::PublicKey {
        r#type: key_type,
        key: STANDARD.encode(key.to_pem()),
    })
}

fn object_id(oid: &[u64]) -> api::ObjectId {
    api::ObjectId {
        object_id_path: oid.to_vec(),
    }
}
