use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cas::softcas::SoftIssuer;
use crate::error::Error;
use crate::types::Result;

/// Built-in backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CasType {
    /// Locally held signing key
    SoftCas,
    /// Remote managed certificate authority service
    CloudCas,
}

impl CasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CasType::SoftCas => "softcas",
            CasType::CloudCas => "cloudcas",
        }
    }

    /// Tag written into the correlation extension of issued certificates
    pub fn backend_id(&self) -> u32 {
        match self {
            CasType::SoftCas => 0,
            CasType::CloudCas => 1,
        }
    }

    pub fn from_backend_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(CasType::SoftCas),
            1 => Some(CasType::CloudCas),
            _ => None,
        }
    }
}

impl fmt::Display for CasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CasType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_provider_name(s).as_str() {
            "softcas" => Ok(CasType::SoftCas),
            "cloudcas" => Ok(CasType::CloudCas),
            other => Err(Error::UnknownBackend(other.to_string())),
        }
    }
}

/// Canonical registry key for a provider name; empty selects `softcas`
pub fn normalize_provider_name(name: &str) -> String {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        CasType::SoftCas.as_str().to_string()
    } else {
        name
    }
}

/// Backend selection and provider-scoped settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Provider name
    #[serde(rename = "type", default)]
    pub cas_type: String,

    /// File holding the bearer token for the remote API
    pub credentials_file: Option<PathBuf>,

    /// `projects/{p}/locations/{l}/certificateAuthorities/{id}`
    pub certificate_authority: Option<String>,

    /// Project for new authorities
    pub project: Option<String>,

    /// Location for new authorities
    pub location: Option<String>,

    /// The instance will be used to create authorities
    #[serde(default)]
    pub is_creator: bool,

    /// Remote API base URL override
    pub endpoint: Option<String>,

    /// Deadline for immediate remote calls
    pub request_timeout_secs: Option<u64>,

    /// Deadline for calls waiting on remote operations
    pub operation_timeout_secs: Option<u64>,

    /// PEM issuer certificate (and chain) for the local backend
    pub issuer_certificate: Option<PathBuf>,

    /// PEM issuer private key for the local backend
    pub issuer_key: Option<PathBuf>,

    /// In-memory issuer for the local backend; takes precedence over the paths
    #[serde(skip)]
    pub issuer: Option<SoftIssuer>,
}

impl Options {
    /// Registry key of the selected provider
    pub fn provider_name(&self) -> String {
        normalize_provider_name(&self.cas_type)
    }

    pub fn is(&self, cas_type: CasType) -> bool {
        self.provider_name() == cas_type.as_str()
    }
}

/// Components of a remote authority resource name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateAuthorityName {
    pub project: String,
    pub location: String,
    pub id: String,
}

impl CertificateAuthorityName {
    /// `projects/{p}/locations/{l}` of the authority
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.location)
    }
}

impl FromStr for CertificateAuthorityName {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.split('/').collect();
        match parts.as_slice() {
            ["projects", project, "locations", location, "certificateAuthorities", id]
                if !project.is_empty() && !location.is_empty() && !id.is_empty() =>
            {
                Ok(Self {
                    project: project.to_string(),
                    location: location.to_string(),
                    id: id.to_string(),
                })
            }
            _ => Err(Error::Config(format!(
                "'{}' is not a valid certificate authority resource",
                name
            ))),
        }
    }
}

impl fmt::Display for CertificateAuthorityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/certificateAuthorities/{}", self.parent(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name_defaults_to_softcas() {
        let options = Options::default();
        assert_eq!(options.provider_name(), "softcas");
        assert!(options.is(CasType::SoftCas));

        let options = Options {
            cas_type: " CloudCAS ".into(),
            ..Options::default()
        };
        assert!(options.is(CasType::CloudCas));
        assert_eq!("CloudCAS".parse::<CasType>().unwrap(), CasType::CloudCas);
        assert!("stepcas".parse::<CasType>().is_err());
    }

    #[test]
    fn test_authority_name_parse() {
        let name: CertificateAuthorityName = "projects/acme/locations/us-west1/certificateAuthorities/issuer"
            .parse()
            .unwrap();
        assert_eq!(name.project, "acme");
        assert_eq!(name.location, "us-west1");
        assert_eq!(name.id, "issuer");
        assert_eq!(name.parent(), "projects/acme/locations/us-west1");
        assert_eq!(
            name.to_string(),
            "projects/acme/locations/us-west1/certificateAuthorities/issuer"
        );
    }

    #[test]
    fn test_authority_name_rejects_malformed() {
        for bad in [
            "",
            "issuer",
            "projects/acme/locations/us-west1",
            "projects//locations/us-west1/certificateAuthorities/issuer",
            "projects/acme/locations/us-west1/certificateAuthorities/issuer/extra",
            "project/acme/locations/us-west1/certificateAuthorities/issuer",
        ] {
            let err = bad.parse::<CertificateAuthorityName>().unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Config, "{}", bad);
        }
    }

    #[test]
    fn test_options_from_json() {
        let options: Options = serde_json::from_str(
            r#"{"type": "cloudcas", "certificate_authority": "projects/p/locations/l/certificateAuthorities/c", "is_creator": false}"#,
        )
        .unwrap();
        assert!(options.is(CasType::CloudCas));
        assert!(options.project.is_none());
        assert!(options.issuer.is_none());
    }
}
