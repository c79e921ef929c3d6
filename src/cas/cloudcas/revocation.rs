use crate::cas::cloudcas::api;
use crate::cas::types::RevocationReason;

/// Remote reason for an RFC 5280 code; `None` for codes the remote service
/// cannot express.
pub fn map_reason(code: i32) -> Option<api::RevocationReason> {
    let reason = match RevocationReason::from_code(code)? {
        RevocationReason::Unspecified => api::RevocationReason::RevocationReasonUnspecified,
        RevocationReason::KeyCompromise => api::RevocationReason::KeyCompromise,
        RevocationReason::CACompromise => api::RevocationReason::CertificateAuthorityCompromise,
        RevocationReason::AffiliationChanged => api::RevocationReason::AffiliationChanged,
        RevocationReason::Superseded => api::RevocationReason::Superseded,
        RevocationReason::CessationOfOperation => api::RevocationReason::CessationOfOperation,
        RevocationReason::CertificateHold => api::RevocationReason::CertificateHold,
        RevocationReason::PrivilegeWithdrawn => api::RevocationReason::PrivilegeWithdrawn,
        RevocationReason::AACompromise => api::RevocationReason::AttributeAuthorityCompromise,
        RevocationReason::RemoveFromCRL => return None,
    };
    Some(reason)
}
