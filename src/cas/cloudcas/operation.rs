//! Handle for long-running remote operations.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;

use crate::cas::cloudcas::api;
use crate::error::{ClientError, Error};
use crate::types::Result;

/// Drives an operation to completion and yields the authority it produced
#[async_trait]
pub trait OperationPoller: Send {
    async fn poll_until_done(&mut self) -> std::result::Result<api::CertificateAuthority, ClientError>;
}

/// Poller for an operation that already finished
struct Completed(Option<api::CertificateAuthority>);

#[async_trait]
impl OperationPoller for Completed {
    async fn poll_until_done(&mut self) -> std::result::Result<api::CertificateAuthority, ClientError> {
        self.0
            .take()
            .ok_or_else(|| ClientError::InvalidResponse("operation result already taken".into()))
    }
}

/// Pending remote operation returned by create and activate calls
pub struct Operation {
    name: String,
    poller: Box<dyn OperationPoller>,
}

impl Operation {
    pub fn new(name: impl Into<String>, poller: Box<dyn OperationPoller>) -> Self {
        Self {
            name: name.into(),
            poller,
        }
    }

    /// Operation whose result is already known
    pub fn completed(name: impl Into<String>, authority: api::CertificateAuthority) -> Self {
        Self::new(name, Box::new(Completed(Some(authority))))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the operation under `deadline`
    pub async fn wait(mut self, context: &str, deadline: Duration) -> Result<api::CertificateAuthority> {
        debug!("Waiting on operation {} for {}", self.name, context);
        let outcome = timeout(deadline, self.poller.poll_until_done()).await;
        match outcome {
            Ok(Ok(authority)) => Ok(authority),
            Ok(Err(e)) => Err(Error::remote(
                format!("cloudCAS {} operation {} failed", context, self.name),
                e,
            )),
            Err(_) => Err(Error::OperationTimeout {
                operation: context.to_string(),
                deadline,
            }),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish()
    }
}
