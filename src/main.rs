use anyhow::{Context, Result};
use cas_bridge::{
    builtin_backends, cas::GetCertificateAuthorityRequest, config::Settings, get_certificate_authority,
    telemetry, CertificateAuthorityService, Registry,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration, with .env overrides
    dotenvy::dotenv().ok();
    let settings = Settings::load().context("Failed to load configuration")?;

    // 2. Initialize logging
    telemetry::init_logging(&settings.general)?;
    info!("Starting {}...", settings.general.app_name);

    // 3. Build the configured backend
    let registry = Registry::with_backends(builtin_backends());
    let cas = registry
        .construct(&settings.authority)
        .with_context(|| format!("Failed to initialize '{}' backend", settings.authority.provider_name()))?;
    info!("Certificate authority backend '{}' initialized", cas.cas_type());

    // 4. Print the root when the backend can provide it
    if cas.certificate_authority_getter().is_none() {
        warn!(
            "Backend '{}' cannot retrieve its root; a locally generated root is required",
            cas.cas_type()
        );
        return Ok(());
    }

    let resp = get_certificate_authority(cas.as_ref(), GetCertificateAuthorityRequest::default())
        .await
        .context("Failed to retrieve the root certificate")?;
    info!("Root certificate: {}", resp.root_certificate.subject()?);
    print!("{}", resp.root_certificate.to_pem());

    Ok(())
}
