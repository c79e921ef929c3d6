use crate::cas::cloudcas::api::{KeyVersionSpec, SignHashAlgorithm};
use crate::cas::types::SignatureAlgorithm;
use crate::error::Error;
use crate::types::Result;

/// Pick the remote key algorithm for a requested signature algorithm and size.
///
/// RSA sizes default to 3072, EC curves follow the hash size.
pub fn negotiate(algorithm: SignatureAlgorithm, bits: u32) -> Result<KeyVersionSpec> {
    use SignHashAlgorithm::*;
    use SignatureAlgorithm as S;

    let selected = match (algorithm, bits) {
        (S::Unspecified, _) => EcP256Sha256,
        (S::EcdsaWithSha256, 0 | 256) => EcP256Sha256,
        (S::EcdsaWithSha384, 0 | 384) => EcP384Sha384,
        (S::Sha256WithRsa, 0 | 3072) => RsaPkcs13072Sha256,
        (S::Sha256WithRsa, 2048) => RsaPkcs12048Sha256,
        (S::Sha256WithRsa, 4096) => RsaPkcs14096Sha256,
        (S::Sha256WithRsaPss, 0 | 3072) => RsaPss3072Sha256,
        (S::Sha256WithRsaPss, 2048) => RsaPss2048Sha256,
        (S::Sha256WithRsaPss, 4096) => RsaPss4096Sha256,
        (S::Sha256WithRsa | S::Sha256WithRsaPss, bits) => {
            return Err(Error::Unsupported(format!(
                "{} bit keys are not supported for {:?}",
                bits, algorithm
            )))
        }
        (S::EcdsaWithSha256 | S::EcdsaWithSha384, bits) => {
            return Err(Error::Unsupported(format!(
                "{} bit keys are not supported for {:?}",
                bits, algorithm
            )))
        }
        (other, _) => {
            return Err(Error::Unsupported(format!(
                "signature algorithm {:?} is not supported",
                other
            )))
        }
    };

    Ok(KeyVersionSpec { algorithm: selected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_negotiate_supported() {
        use SignHashAlgorithm::*;
        use SignatureAlgorithm as S;

        let cases = [
            (S::Unspecified, 0, EcP256Sha256),
            (S::Unspecified, 4096, EcP256Sha256),
            (S::EcdsaWithSha256, 0, EcP256Sha256),
            (S::EcdsaWithSha256, 256, EcP256Sha256),
            (S::EcdsaWithSha384, 0, EcP384Sha384),
            (S::EcdsaWithSha384, 384, EcP384Sha384),
            (S::Sha256WithRsa, 0, RsaPkcs13072Sha256),
            (S::Sha256WithRsa, 2048, RsaPkcs12048Sha256),
            (S::Sha256WithRsa, 3072, RsaPkcs13072Sha256),
            (S::Sha256WithRsa, 4096, RsaPkcs14096Sha256),
            (S::Sha256WithRsaPss, 0, RsaPss3072Sha256),
            (S::Sha256WithRsaPss, 2048, RsaPss2048Sha256),
            (S::Sha256WithRsaPss, 3072, RsaPss3072Sha256),
            (S::Sha256WithRsaPss, 4096, RsaPss4096Sha256),
        ];

        for (algorithm, bits, expected) in cases {
            assert_eq!(negotiate(algorithm, bits).unwrap().algorithm, expected, "{:?}/{}", algorithm, bits);
        }
    }

    #[test]
    fn test_negotiate_unsupported() {
        use SignatureAlgorithm as S;

        let cases = [
            (S::Sha256WithRsa, 1024),
            (S::Sha256WithRsaPss, 8192),
            (S::EcdsaWithSha256, 384),
            (S::EcdsaWithSha384, 256),
            (S::EcdsaWithSha512, 0),
            (S::Sha384WithRsa, 0),
            (S::Sha512WithRsaPss, 4096),
            (S::PureEd25519, 0),
        ];

        for (algorithm, bits) in cases {
            let err = negotiate(algorithm, bits).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unsupported, "{:?}/{}", algorithm, bits);
        }
    }
}
