pub mod template;
pub mod x509;

#[cfg(test)]
pub(crate) mod testing;

pub use template::{
    BasicConstraints, CertificateTemplate, ExtendedKeyUsage, Extension, KeyAlgorithm, KeyUsage,
    Subject, SubjectPublicKey,
};
pub use x509::{parse_bundle, parse_certificate, parse_chain, Certificate};
