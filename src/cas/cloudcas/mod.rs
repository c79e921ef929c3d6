//! Certificate authority service backed by a remote managed CA.

pub mod api;
pub mod certificate;
pub mod client;
pub mod http;
pub mod keyspec;
pub mod operation;
pub mod revocation;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cas::extension::{decode, find_certificate_authority_extension, tag_template};
use crate::cas::options::{CasType, CertificateAuthorityName, Options};
use crate::cas::provider::{CertificateAuthorityGetter, CertificateAuthorityService};
use crate::cas::types::{
    CertificateAuthorityType, CreateCertificateAuthorityRequest, CreateCertificateAuthorityResponse,
    CreateCertificateRequest, CreateCertificateResponse, CreateKeyOptions, GetCertificateAuthorityRequest,
    GetCertificateAuthorityResponse, RenewCertificateRequest, RenewCertificateResponse,
    RevokeCertificateRequest, RevokeCertificateResponse,
};
use crate::crypto::{parse_certificate, parse_chain, Certificate, CertificateTemplate};
use crate::error::{ClientError, Error};
use crate::types::Result;

pub use client::CertificateAuthorityClient;
pub use http::HttpClient;
pub use operation::{Operation, OperationPoller};

/// Deadline for immediate request/response calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Deadline for calls that wait on a long-running operation
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-call deadlines of a remote adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub request: Duration,
    pub operation: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST_TIMEOUT,
            operation: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl Deadlines {
    fn from_options(options: &Options) -> Self {
        let defaults = Self::default();
        Self {
            request: options
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request),
            operation: options
                .operation_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.operation),
        }
    }
}

/// Remote certificate authority adapter
pub struct CloudCas {
    client: Arc<dyn CertificateAuthorityClient>,
    certificate_authority: String,
    project: String,
    location: String,
    deadlines: Deadlines,
}

impl CloudCas {
    /// Create an adapter talking to the remote API over HTTP
    pub fn new(options: &Options) -> Result<Self> {
        let (certificate_authority, project, location) = Self::validate(options)?;
        let client = HttpClient::new(options.endpoint.as_deref(), options.credentials_file.as_deref())?;
        info!(
            "Using remote certificate authority service at {}",
            client.base_url()
        );
        Ok(Self {
            client: Arc::new(client),
            certificate_authority,
            project,
            location,
            deadlines: Deadlines::from_options(options),
        })
    }

    /// Create an adapter over an existing client
    pub fn with_client(options: &Options, client: Arc<dyn CertificateAuthorityClient>) -> Result<Self> {
        let (certificate_authority, project, location) = Self::validate(options)?;
        Ok(Self {
            client,
            certificate_authority,
            project,
            location,
            deadlines: Deadlines::from_options(options),
        })
    }

    pub fn with_deadlines(mut self, deadlines: Deadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    pub fn certificate_authority(&self) -> &str {
        &self.certificate_authority
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn deadlines(&self) -> Deadlines {
        self.deadlines
    }

    fn validate(options: &Options) -> Result<(String, String, String)> {
        let mut project = options.project.clone().unwrap_or_default();
        let mut location = options.location.clone().unwrap_or_default();
        let certificate_authority = options.certificate_authority.clone().unwrap_or_default();

        if options.is_creator {
            if project.is_empty() {
                return Err(Error::Config("cloudCAS 'project' cannot be empty".into()));
            }
            if location.is_empty() {
                return Err(Error::Config("cloudCAS 'location' cannot be empty".into()));
            }
        } else {
            if certificate_authority.is_empty() {
                return Err(Error::Config(
                    "cloudCAS 'certificate_authority' cannot be empty".into(),
                ));
            }
            let name: CertificateAuthorityName = certificate_authority.parse()?;
            if project.is_empty() {
                project = name.project;
            }
            if location.is_empty() {
                location = name.location;
            }
        }

        Ok((certificate_authority, project, location))
    }

    async fn create_certificate_inner(
        &self,
        template: Option<CertificateTemplate>,
        lifetime: Duration,
        request_id: String,
        request: &str,
    ) -> Result<(Certificate, Vec<Certificate>)> {
        let mut template =
            template.ok_or_else(|| Error::Validation(format!("{} 'template' cannot be empty", request)))?;
        if lifetime.is_zero() {
            return Err(Error::Validation(format!("{} 'lifetime' cannot be 0", request)));
        }

        let id = create_certificate_id();
        tag_template(&mut template, CasType::CloudCas, &id)?;
        let config = certificate::create_certificate_config(&template)?;

        debug!(
            "Creating certificate {} for '{}' under {}",
            id, template.subject.common_name, self.certificate_authority
        );
        let cert = call_with_deadline(
            "CreateCertificate",
            self.deadlines.request,
            self.client.create_certificate(api::CreateCertificateRequest {
                parent: self.certificate_authority.clone(),
                certificate_id: id,
                certificate: api::Certificate {
                    config: Some(config),
                    lifetime: format_duration(lifetime),
                    ..Default::default()
                },
                request_id,
            }),
        )
        .await?;

        get_certificate_and_chain(&cert)
    }

    async fn sign_intermediate(
        &self,
        name: &str,
        req: &CreateCertificateAuthorityRequest,
        parent_name: &str,
    ) -> Result<api::CertificateAuthority> {
        let deadline = self.deadlines.operation;

        debug!("Fetching CSR of subordinate {}", name);
        let csr = call_with_deadline(
            "FetchCertificateAuthorityCsr",
            deadline,
            self.client
                .fetch_certificate_authority_csr(api::FetchCertificateAuthorityCsrRequest {
                    name: name.to_string(),
                }),
        )
        .await?;

        debug!("Signing subordinate {} with {}", name, parent_name);
        let signed = call_with_deadline(
            "CreateCertificate",
            deadline,
            self.client.create_certificate(api::CreateCertificateRequest {
                parent: parent_name.to_string(),
                certificate_id: create_certificate_id(),
                certificate: api::Certificate {
                    pem_csr: Some(csr.pem_csr),
                    lifetime: format_duration(req.lifetime),
                    ..Default::default()
                },
                request_id: req.request_id.clone(),
            }),
        )
        .await?;

        debug!("Activating subordinate {}", name);
        let op = call_with_deadline(
            "ActivateCertificateAuthority",
            deadline,
            self.client
                .activate_certificate_authority(api::ActivateCertificateAuthorityRequest {
                    name: name.to_string(),
                    pem_ca_certificate: signed.pem_certificate,
                    subordinate_config: api::SubordinateConfig {
                        pem_issuer_chain: api::PemIssuerChain {
                            pem_certificates: signed.pem_certificate_chain,
                        },
                    },
                    request_id: req.request_id.clone(),
                }),
        )
        .await?;

        op.wait("ActivateCertificateAuthority", deadline).await
    }
}

#[async_trait]
impl CertificateAuthorityService for CloudCas {
    fn cas_type(&self) -> CasType {
        CasType::CloudCas
    }

    async fn create_certificate(&self, req: CreateCertificateRequest) -> Result<CreateCertificateResponse> {
        let (certificate, certificate_chain) = self
            .create_certificate_inner(req.template, req.lifetime, req.request_id, "createCertificateRequest")
            .await?;
        Ok(CreateCertificateResponse {
            certificate,
            certificate_chain,
        })
    }

    /// The remote service has no renew call; a new certificate is issued
    async fn renew_certificate(&self, req: RenewCertificateRequest) -> Result<RenewCertificateResponse> {
        let (certificate, certificate_chain) = self
            .create_certificate_inner(req.template, req.lifetime, req.request_id, "renewCertificateRequest")
            .await?;
        Ok(RenewCertificateResponse {
            certificate,
            certificate_chain,
        })
    }

    async fn revoke_certificate(&self, req: RevokeCertificateRequest) -> Result<RevokeCertificateResponse> {
        let reason = revocation::map_reason(req.reason_code).ok_or_else(|| {
            Error::Unsupported(format!(
                "revokeCertificate 'reason_code={}' is invalid or not supported",
                req.reason_code
            ))
        })?;
        let certificate = req
            .certificate
            .as_ref()
            .ok_or_else(|| Error::Validation("revokeCertificateRequest 'certificate' cannot be empty".into()))?;

        let ext = find_certificate_authority_extension(certificate)?.ok_or_else(|| {
            Error::MissingCorrelation(
                "error revoking certificate: certificate authority extension was not found".into(),
            )
        })?;
        let cae = decode(&ext.value)?;

        let name = format!("{}/certificates/{}", self.certificate_authority, cae.certificate_id);
        info!("Revoking certificate {} ({:?})", name, reason);
        let cert = call_with_deadline(
            "RevokeCertificate",
            self.deadlines.request,
            self.client.revoke_certificate(api::RevokeCertificateRequest {
                name,
                reason,
                request_id: req.request_id,
            }),
        )
        .await?;

        let (certificate, certificate_chain) = get_certificate_and_chain(&cert)?;
        Ok(RevokeCertificateResponse {
            certificate,
            certificate_chain,
        })
    }

    async fn create_certificate_authority(
        &self,
        req: CreateCertificateAuthorityRequest,
    ) -> Result<CreateCertificateAuthorityResponse> {
        if self.project.is_empty() {
            return Err(Error::Config("cloudCAS 'project' cannot be empty".into()));
        }
        if self.location.is_empty() {
            return Err(Error::Config("cloudCAS 'location' cannot be empty".into()));
        }
        let mut template = req.template.clone().ok_or_else(|| {
            Error::Validation("createCertificateAuthorityRequest 'template' cannot be empty".into())
        })?;
        if req.lifetime.is_zero() {
            return Err(Error::Validation(
                "createCertificateAuthorityRequest 'lifetime' cannot be 0".into(),
            ));
        }
        let parent_name = match req.r#type {
            CertificateAuthorityType::Root => None,
            CertificateAuthorityType::Intermediate => {
                let parent = req.parent.as_ref().ok_or_else(|| {
                    Error::Validation("createCertificateAuthorityRequest 'parent' cannot be empty".into())
                })?;
                if parent.name.is_empty() {
                    return Err(Error::Validation(
                        "createCertificateAuthorityRequest 'parent.name' cannot be empty".into(),
                    ));
                }
                Some(parent.name.clone())
            }
        };

        let key = req.create_key.unwrap_or_default();
        let key_spec = negotiate_key(key)?;

        let mut id = normalize_certificate_authority_name(&req.name);
        if id.is_empty() {
            id = create_certificate_id();
        }

        tag_template(&mut template, CasType::CloudCas, &id)?;

        let authority_type = match req.r#type {
            CertificateAuthorityType::Root => api::CertificateAuthorityType::SelfSigned,
            CertificateAuthorityType::Intermediate => api::CertificateAuthorityType::Subordinate,
        };
        let parent = format!("projects/{}/locations/{}", self.project, self.location);

        info!("Creating {:?} certificate authority {} in {}", req.r#type, id, parent);
        let op = call_with_deadline(
            "CreateCertificateAuthority",
            self.deadlines.request,
            self.client
                .create_certificate_authority(api::CreateCertificateAuthorityRequest {
                    parent,
                    certificate_authority_id: id,
                    certificate_authority: api::CertificateAuthority {
                        r#type: Some(authority_type),
                        tier: Some(api::Tier::Enterprise),
                        config: Some(certificate::create_authority_config(&template)),
                        lifetime: format_duration(req.lifetime),
                        key_spec: Some(key_spec),
                        issuing_options: Some(api::IssuingOptions {
                            include_ca_cert_url: true,
                            include_crl_access_url: true,
                        }),
                        ..Default::default()
                    },
                    request_id: req.request_id.clone(),
                }),
        )
        .await?;

        let mut ca = op
            .wait("CreateCertificateAuthority", self.deadlines.operation)
            .await?;

        if let Some(parent_name) = parent_name {
            ca = self.sign_intermediate(&ca.name, &req, &parent_name).await?;
        }

        let (first, rest) = ca
            .pem_ca_certificates
            .split_first()
            .ok_or_else(|| Error::EmptyChain("cloudCAS CreateCertificateAuthority".into()))?;

        Ok(CreateCertificateAuthorityResponse {
            name: ca.name.clone(),
            certificate: parse_certificate(first)?,
            certificate_chain: parse_chain(rest)?,
        })
    }

    fn certificate_authority_getter(&self) -> Option<&dyn CertificateAuthorityGetter> {
        Some(self)
    }
}

#[async_trait]
impl CertificateAuthorityGetter for CloudCas {
    async fn get_certificate_authority(
        &self,
        req: GetCertificateAuthorityRequest,
    ) -> Result<GetCertificateAuthorityResponse> {
        let name = if req.name.is_empty() {
            self.certificate_authority.clone()
        } else {
            req.name
        };

        debug!("Fetching certificate authority {}", name);
        let ca = call_with_deadline(
            "GetCertificateAuthority",
            self.deadlines.request,
            self.client
                .get_certificate_authority(api::GetCertificateAuthorityRequest { name }),
        )
        .await?;

        // Last certificate in the chain is the root.
        let root = ca
            .pem_ca_certificates
            .last()
            .ok_or_else(|| Error::EmptyChain("cloudCAS GetCertificateAuthority".into()))?;

        Ok(GetCertificateAuthorityResponse {
            root_certificate: parse_certificate(root)?,
        })
    }
}

fn negotiate_key(key: CreateKeyOptions) -> Result<api::KeyVersionSpec> {
    keyspec::negotiate(key.signature_algorithm, key.bits).map_err(|e| match e {
        Error::Unsupported(msg) => Error::Unsupported(format!(
            "createCertificateAuthorityRequest 'create_key' is not valid: {}",
            msg
        )),
        other => other,
    })
}

/// Run a remote call under `deadline`
async fn call_with_deadline<T, F>(operation: &str, deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, ClientError>>,
{
    match timeout(deadline, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Error::remote(format!("cloudCAS {} failed", operation), e)),
        Err(_) => Err(Error::OperationTimeout {
            operation: operation.to_string(),
            deadline,
        }),
    }
}

/// Random identifier for certificates and authorities
pub fn create_certificate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Map every character outside `[A-Za-z0-9_-]` to `-`
pub fn normalize_certificate_authority_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Leaf and issuer chain of an issued certificate; the root closing the
/// remote chain is dropped
fn get_certificate_and_chain(cert: &api::Certificate) -> Result<(Certificate, Vec<Certificate>)> {
    let leaf = parse_certificate(&cert.pem_certificate)?;
    let chain = &cert.pem_certificate_chain;
    let chain = parse_chain(&chain[..chain.len().saturating_sub(1)])?;
    Ok((leaf, chain))
}

/// Remote duration encoding, e.g. `"3600s"` or `"1.500000000s"`
fn format_duration(d: Duration) -> String {
    match d.subsec_nanos() {
        0 => format!("{}s", d.as_secs()),
        nanos => format!("{}.{:09}s", d.as_secs(), nanos),
    }
}
