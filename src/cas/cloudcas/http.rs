//! REST transport for the remote certificate authority service.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::cas::cloudcas::api;
use crate::cas::cloudcas::client::CertificateAuthorityClient;
use crate::cas::cloudcas::operation::{Operation, OperationPoller};
use crate::error::{ClientError, Error};
use crate::types::Result;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://privateca.googleapis.com/v1beta1/";

const INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(5);

type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
struct Transport {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl Transport {
    fn create_auth_headers(&self) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ClientError::InvalidResponse(format!("invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ClientResult<Response> {
        trace!("{} {}", method, url);
        let mut request = self
            .client
            .request(method, url)
            .headers(self.create_auth_headers()?)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(response)
    }

    async fn call<B, T>(&self, method: Method, path: &str, query: &[(&str, &str)], body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self.send(method, url, query, body).await?;
        Ok(response.json().await?)
    }

    async fn start_operation<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> ClientResult<Operation> {
        let op: api::Operation = self.call(Method::POST, path, query, Some(body)).await?;
        debug!("Started remote operation {}", op.name);
        let name = op.name.clone();
        let poller = HttpOperationPoller {
            transport: self.clone(),
            current: op,
            interval: INITIAL_POLL_INTERVAL,
        };
        Ok(Operation::new(name, Box::new(poller)))
    }
}

/// Polls `GET {operation}` until the operation reports `done`
struct HttpOperationPoller {
    transport: Transport,
    current: api::Operation,
    interval: Duration,
}

#[async_trait]
impl OperationPoller for HttpOperationPoller {
    async fn poll_until_done(&mut self) -> ClientResult<api::CertificateAuthority> {
        while !self.current.done {
            tokio::time::sleep(self.interval).await;
            self.interval = next_interval(self.interval);
            self.current = self
                .transport
                .call::<(), _>(Method::GET, &self.current.name, &[], None)
                .await?;
        }
        operation_result(&self.current)
    }
}

fn next_interval(interval: Duration) -> Duration {
    interval.mul_f64(1.5).min(MAX_POLL_INTERVAL)
}

/// Authority carried by a finished operation
fn operation_result(op: &api::Operation) -> ClientResult<api::CertificateAuthority> {
    if let Some(status) = &op.error {
        return Err(ClientError::Operation {
            operation: op.name.clone(),
            code: status.code,
            message: status.message.clone(),
        });
    }
    match &op.response {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Err(ClientError::InvalidResponse(format!(
            "operation {} finished without a response",
            op.name
        ))),
    }
}

/// reqwest based client for the remote API
#[derive(Debug, Clone)]
pub struct HttpClient {
    transport: Transport,
}

impl HttpClient {
    /// Build a client for `endpoint` (or the default), reading an optional
    /// bearer token from `credentials_file`
    pub fn new(endpoint: Option<&str>, credentials_file: Option<&Path>) -> Result<Self> {
        let mut base = endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {}", base, e)))?;

        let token = match credentials_file {
            Some(path) => {
                let token = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("error reading credentials file {}: {}", path.display(), e))
                })?;
                Some(token.trim().to_string())
            }
            None => None,
        };

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            transport: Transport {
                client,
                base_url,
                token,
            },
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.transport.base_url
    }
}

#[async_trait]
impl CertificateAuthorityClient for HttpClient {
    async fn create_certificate(&self, req: api::CreateCertificateRequest) -> ClientResult<api::Certificate> {
        let path = format!("{}/certificates", req.parent);
        let query = [
            ("certificateId", req.certificate_id.as_str()),
            ("requestId", req.request_id.as_str()),
        ];
        self.transport
            .call(Method::POST, &path, &query, Some(&req.certificate))
            .await
    }

    async fn revoke_certificate(&self, req: api::RevokeCertificateRequest) -> ClientResult<api::Certificate> {
        let path = format!("{}:revoke", req.name);
        self.transport.call(Method::POST, &path, &[], Some(&req)).await
    }

    async fn get_certificate_authority(
        &self,
        req: api::GetCertificateAuthorityRequest,
    ) -> ClientResult<api::CertificateAuthority> {
        self.transport.call::<(), _>(Method::GET, &req.name, &[], None).await
    }

    async fn create_certificate_authority(
        &self,
        req: api::CreateCertificateAuthorityRequest,
    ) -> ClientResult<Operation> {
        let path = format!("{}/certificateAuthorities", req.parent);
        let query = [
            ("certificateAuthorityId", req.certificate_authority_id.as_str()),
            ("requestId", req.request_id.as_str()),
        ];
        self.transport
            .start_operation(&path, &query, &req.certificate_authority)
            .await
    }

    async fn fetch_certificate_authority_csr(
        &self,
        req: api::FetchCertificateAuthorityCsrRequest,
    ) -> ClientResult<api::FetchCertificateAuthorityCsrResponse> {
        let path = format!("{}:fetch", req.name);
        self.transport.call::<(), _>(Method::GET, &path, &[], None).await
    }

    async fn activate_certificate_authority(
        &self,
        req: api::ActivateCertificateAuthorityRequest,
    ) -> ClientResult<Operation> {
        let path = format!("{}:activate", req.name);
        self.transport.start_operation(&path, &[], &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUTHORITY: &str = "projects/p/locations/l/certificateAuthorities/c";

    fn client_for(server: &MockServer) -> HttpClient {
        HttpClient::new(Some(format!("{}/v1beta1", server.uri()).as_str()), None).unwrap()
    }

    #[test]
    fn test_endpoint_and_paths() {
        let client = HttpClient::new(Some("http://localhost:8080/v1beta1"), None).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/v1beta1/");

        let url = client
            .transport
            .url("projects/p/locations/l/certificateAuthorities/c:fetch")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1beta1/projects/p/locations/l/certificateAuthorities/c:fetch"
        );

        let client = HttpClient::new(None, None).unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_ENDPOINT);
        assert!(HttpClient::new(Some("not a url"), None).is_err());
    }

    #[test]
    fn test_token_from_credentials_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  secret-token  ").unwrap();

        let client = HttpClient::new(None, Some(file.path())).unwrap();
        let headers = client.transport.create_auth_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret-token");

        let missing = HttpClient::new(None, Some(Path::new("/nonexistent/credentials")));
        assert_eq!(missing.unwrap_err().kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn test_poll_interval_backoff() {
        let mut interval = INITIAL_POLL_INTERVAL;
        interval = next_interval(interval);
        assert_eq!(interval, Duration::from_millis(750));
        for _ in 0..20 {
            interval = next_interval(interval);
        }
        assert_eq!(interval, MAX_POLL_INTERVAL);
    }

    #[test]
    fn test_operation_result() {
        let op: api::Operation = serde_json::from_str(
            r#"{"name": "operations/1", "done": true, "response": {"@type": "x", "name": "projects/p/locations/l/certificateAuthorities/c", "pemCaCertificates": ["pem"]}}"#,
        )
        .unwrap();
        let ca = operation_result(&op).unwrap();
        assert_eq!(ca.pem_ca_certificates, vec!["pem"]);

        let failed: api::Operation = serde_json::from_str(
            r#"{"name": "operations/2", "done": true, "error": {"code": 7, "message": "permission denied"}}"#,
        )
        .unwrap();
        match operation_result(&failed).unwrap_err() {
            ClientError::Operation { code, message, .. } => {
                assert_eq!(code, 7);
                assert_eq!(message, "permission denied");
            }
            other => panic!("unexpected error: {}", other),
        }

        let empty = api::Operation {
            name: "operations/3".into(),
            done: true,
            ..Default::default()
        };
        assert!(matches!(operation_result(&empty), Err(ClientError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_create_certificate_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1beta1/{}/certificates", AUTHORITY)))
            .and(query_param("certificateId", "cert-1"))
            .and(query_param("requestId", "req-1"))
            .and(header("authorization", "Bearer t0ken"))
            .and(body_partial_json(json!({"pemCsr": "CSR", "lifetime": "3600s"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": format!("{}/certificates/cert-1", AUTHORITY),
                "pemCertificate": "LEAF",
                "pemCertificateChain": ["ISSUER", "ROOT"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut token = NamedTempFile::new().unwrap();
        writeln!(token, "t0ken").unwrap();
        let client = HttpClient::new(Some(format!("{}/v1beta1", server.uri()).as_str()), Some(token.path())).unwrap();

        let cert = client
            .create_certificate(api::CreateCertificateRequest {
                parent: AUTHORITY.into(),
                certificate_id: "cert-1".into(),
                certificate: api::Certificate {
                    pem_csr: Some("CSR".into()),
                    lifetime: "3600s".into(),
                    ..Default::default()
                },
                request_id: "req-1".into(),
            })
            .await
            .unwrap();
        assert_eq!(cert.pem_certificate, "LEAF");
        assert_eq!(cert.pem_certificate_chain, vec!["ISSUER", "ROOT"]);
    }

    #[tokio::test]
    async fn test_revoke_certificate_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1beta1/{}/certificates/cert-1:revoke", AUTHORITY)))
            .and(body_json(json!({"reason": "KEY_COMPROMISE", "requestId": "req-2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pemCertificate": "LEAF",
                "revocationDetails": {"revocationState": "KEY_COMPROMISE"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cert = client_for(&server)
            .revoke_certificate(api::RevokeCertificateRequest {
                name: format!("{}/certificates/cert-1", AUTHORITY),
                reason: api::RevocationReason::KeyCompromise,
                request_id: "req-2".into(),
            })
            .await
            .unwrap();
        assert_eq!(
            cert.revocation_details.and_then(|d| d.revocation_state),
            Some(api::RevocationReason::KeyCompromise)
        );
    }

    #[tokio::test]
    async fn test_get_and_fetch_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1beta1/{}", AUTHORITY)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": AUTHORITY,
                "pemCaCertificates": ["ISSUER", "ROOT"],
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1beta1/{}:fetch", AUTHORITY)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pemCsr": "CSR"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let ca = client
            .get_certificate_authority(api::GetCertificateAuthorityRequest {
                name: AUTHORITY.into(),
            })
            .await
            .unwrap();
        assert_eq!(ca.pem_ca_certificates, vec!["ISSUER", "ROOT"]);

        let csr = client
            .fetch_certificate_authority_csr(api::FetchCertificateAuthorityCsrRequest {
                name: AUTHORITY.into(),
            })
            .await
            .unwrap();
        assert_eq!(csr.pem_csr, "CSR");
    }

    #[tokio::test]
    async fn test_create_authority_polls_until_done() {
        let server = MockServer::start().await;
        let operation = "projects/p/locations/l/operations/op-1";
        Mock::given(method("POST"))
            .and(path("/v1beta1/projects/p/locations/l/certificateAuthorities"))
            .and(query_param("certificateAuthorityId", "sub"))
            .and(query_param("requestId", "req-3"))
            .and(body_partial_json(json!({"type": "SUBORDINATE", "tier": "ENTERPRISE"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": operation, "done": false})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1beta1/{}", operation)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": operation, "done": false})))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1beta1/{}", operation)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": operation,
                "done": true,
                "response": {"name": "projects/p/locations/l/certificateAuthorities/sub"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let op = client_for(&server)
            .create_certificate_authority(api::CreateCertificateAuthorityRequest {
                parent: "projects/p/locations/l".into(),
                certificate_authority_id: "sub".into(),
                certificate_authority: api::CertificateAuthority {
                    r#type: Some(api::CertificateAuthorityType::Subordinate),
                    tier: Some(api::Tier::Enterprise),
                    ..Default::default()
                },
                request_id: "req-3".into(),
            })
            .await
            .unwrap();
        assert_eq!(op.name(), operation);

        let ca = op
            .wait("CreateCertificateAuthority", Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(ca.name, "projects/p/locations/l/certificateAuthorities/sub");
    }

    #[tokio::test]
    async fn test_activate_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1beta1/{}:activate", AUTHORITY)))
            .and(body_json(json!({
                "pemCaCertificate": "SUB",
                "subordinateConfig": {"pemIssuerChain": {"pemCertificates": ["ROOT"]}},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/p/locations/l/operations/op-2",
                "done": true,
                "response": {"name": AUTHORITY, "pemCaCertificates": ["SUB", "ROOT"]},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let op = client_for(&server)
            .activate_certificate_authority(api::ActivateCertificateAuthorityRequest {
                name: AUTHORITY.into(),
                pem_ca_certificate: "SUB".into(),
                subordinate_config: api::SubordinateConfig {
                    pem_issuer_chain: api::PemIssuerChain {
                        pem_certificates: vec!["ROOT".into()],
                    },
                },
                request_id: String::new(),
            })
            .await
            .unwrap();
        let ca = op
            .wait("ActivateCertificateAuthority", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(ca.pem_ca_certificates, vec!["SUB", "ROOT"]);
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_certificate_authority(api::GetCertificateAuthorityRequest {
                name: AUTHORITY.into(),
            })
            .await
            .unwrap_err();
        match err {
            ClientError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
