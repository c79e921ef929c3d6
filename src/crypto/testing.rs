//! Certificate fixtures shared by unit tests

use rcgen::{
    BasicConstraints, CertificateParams, CustomExtension, DnType, IsCa, KeyPair, KeyUsagePurpose,
};

fn params(common_name: &str) -> CertificateParams {
    let mut params = CertificateParams::new(vec![format!("{}.example.com", common_name)]).unwrap();
    params.distinguished_name.push(DnType::CommonName, common_name);
    params
}

/// Self-signed end-entity certificate
pub(crate) fn self_signed(common_name: &str) -> (String, KeyPair) {
    let key = KeyPair::generate().unwrap();
    let cert = params(common_name).self_signed(&key).unwrap();
    (cert.pem(), key)
}

/// Self-signed CA certificate
pub(crate) fn ca(common_name: &str) -> (String, KeyPair) {
    let key = KeyPair::generate().unwrap();
    let mut params = params(common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    let cert = params.self_signed(&key).unwrap();
    (cert.pem(), key)
}

/// Self-signed certificate carrying one custom extension
pub(crate) fn with_extension(common_name: &str, oid: &[u64], value: Vec<u8>) -> String {
    let key = KeyPair::generate().unwrap();
    let mut params = params(common_name);
    params
        .custom_extensions
        .push(CustomExtension::from_oid_content(oid, value));
    params.self_signed(&key).unwrap().pem()
}

/// Certificate signing request and its key
pub(crate) fn csr(common_name: &str) -> (String, KeyPair) {
    let key = KeyPair::generate().unwrap();
    let csr = params(common_name).serialize_request(&key).unwrap();
    (csr.pem().unwrap(), key)
}
