use std::fmt;

use rustls_pemfile::Item;
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::crypto::template::Extension;
use crate::error::Error;
use crate::types::Result;

/// A parsed X.509 certificate.
///
/// Holds the DER bytes; construction guarantees they parse.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    /// Wrap DER bytes after checking they hold a certificate
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        X509Certificate::from_der(&der)
            .map_err(|e| Error::decode_with("error parsing certificate", e))?;
        Ok(Self { der })
    }

    /// Parse the first PEM block, which must be a certificate
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        parse_certificate(pem_str)
    }

    fn parsed(&self) -> Result<X509Certificate<'_>> {
        X509Certificate::from_der(&self.der)
            .map(|(_, cert)| cert)
            .map_err(|e| Error::decode_with("error parsing certificate", e))
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new("CERTIFICATE", self.der.clone()))
    }

    pub fn subject(&self) -> Result<String> {
        Ok(self.parsed()?.subject().to_string())
    }

    pub fn issuer(&self) -> Result<String> {
        Ok(self.parsed()?.issuer().to_string())
    }

    /// Serial number as colon separated hex
    pub fn serial_number(&self) -> Result<String> {
        Ok(self.parsed()?.raw_serial_as_string())
    }

    pub fn is_ca(&self) -> Result<bool> {
        Ok(self.parsed()?.is_ca())
    }

    /// Every extension of the certificate, in encoding order.
    ///
    /// Extensions whose identifier arcs do not fit in `u64` are skipped.
    pub fn extensions(&self) -> Result<Vec<Extension>> {
        let cert = self.parsed()?;
        Ok(cert
            .extensions()
            .iter()
            .filter_map(|ext| {
                let oid: Vec<u64> = ext.oid.iter()?.collect();
                Some(Extension {
                    oid,
                    critical: ext.critical,
                    value: ext.value.to_vec(),
                })
            })
            .collect())
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject().unwrap_or_default())
            .field("serial", &self.serial_number().unwrap_or_default())
            .finish()
    }
}

/// Parse a single PEM encoded certificate
pub fn parse_certificate(pem_str: &str) -> Result<Certificate> {
    let mut reader = pem_str.as_bytes();
    match rustls_pemfile::read_one(&mut reader)
        .map_err(|e| Error::decode_with("error decoding certificate", e))?
    {
        Some(Item::X509Certificate(der)) => Certificate::from_der(der.as_ref().to_vec()),
        Some(_) => Err(Error::decode(
            "error decoding certificate: PEM block is not a certificate",
        )),
        None => Err(Error::decode(
            "error decoding certificate: not a valid PEM encoded block",
        )),
    }
}

/// Parse a list of PEM certificates, keeping the order they were given in
pub fn parse_chain<S: AsRef<str>>(pems: &[S]) -> Result<Vec<Certificate>> {
    pems.iter()
        .map(|pem_str| parse_certificate(pem_str.as_ref()))
        .collect()
}

/// Parse every certificate in a concatenated PEM bundle
pub fn parse_bundle(pem_str: &str) -> Result<Vec<Certificate>> {
    let mut reader = pem_str.as_bytes();
    let certs = rustls_pemfile::certs(&mut reader)
        .map(|der| {
            der.map_err(|e| Error::decode_with("error decoding certificate bundle", e))
                .and_then(|der| Certificate::from_der(der.as_ref().to_vec()))
        })
        .collect::<Result<Vec<_>>>()?;

    if certs.is_empty() {
        return Err(Error::decode("certificate bundle contains no certificates"));
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing;

    #[test]
    fn test_parse_certificate() {
        let (pem_str, _) = testing::self_signed("leaf");
        let cert = parse_certificate(&pem_str).unwrap();

        assert!(cert.subject().unwrap().contains("CN=leaf"));
        assert!(!cert.is_ca().unwrap());
        assert_eq!(Certificate::from_pem(&cert.to_pem()).unwrap(), cert);
    }

    #[test]
    fn test_parse_certificate_rejects_garbage() {
        let err = parse_certificate("not a certificate").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);

        let (csr_pem, _) = testing::csr("leaf");
        assert!(parse_certificate(&csr_pem).is_err());

        let broken = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(parse_certificate(broken).is_err());
    }

    #[test]
    fn test_parse_chain_preserves_order() {
        let (a, _) = testing::self_signed("a");
        let (b, _) = testing::ca("b");
        let (c, _) = testing::ca("c");

        let chain = parse_chain(&[a, b, c]).unwrap();
        let subjects: Vec<String> = chain.iter().map(|c| c.subject().unwrap()).collect();
        assert_eq!(subjects, vec!["CN=a", "CN=b", "CN=c"]);
    }

    #[test]
    fn test_parse_chain_fails_on_any_bad_entry() {
        let (a, _) = testing::self_signed("a");
        assert!(parse_chain(&[a.as_str(), "junk"]).is_err());
    }

    #[test]
    fn test_parse_bundle() {
        let (a, _) = testing::ca("a");
        let (b, _) = testing::ca("b");
        let bundle = format!("{}\n{}", a, b);

        let certs = parse_bundle(&bundle).unwrap();
        assert_eq!(certs.len(), 2);
        assert!(certs[1].is_ca().unwrap());
        assert!(parse_bundle("").is_err());
    }

    #[test]
    fn test_extensions_include_custom() {
        let pem_str = testing::with_extension("leaf", &[1, 2, 3, 4], vec![0x05, 0x00]);
        let cert = parse_certificate(&pem_str).unwrap();

        let ext = cert
            .extensions()
            .unwrap()
            .into_iter()
            .find(|ext| ext.has_oid(&[1, 2, 3, 4]))
            .unwrap();
        assert_eq!(ext.value, vec![0x05, 0x00]);
        assert!(!ext.critical);
    }
}
