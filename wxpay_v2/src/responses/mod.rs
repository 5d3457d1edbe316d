//! Inbound gateway replies.
//!
//! Every reply carries two status layers. `return_code` says whether the gateway understood the call at all; only when
//! it is `SUCCESS` does `result_code` report the business outcome. A reply that fails either check keeps its domain
//! fields at their zero defaults and is never signed by the gateway, so [`ResponseStatus`] is the only thing worth
//! looking at.

mod error_codes;
mod refund;
mod unified_order;

use log::debug;
pub use error_codes::{refund_message, unified_order_message, UNKNOWN_ERROR_MESSAGE};
pub use refund::RefundResponse;
pub use unified_order::{AppPayParams, JsApiPayParams, MiniProgramPayParams, UnifiedOrderResponse};

use crate::{
    errors::{PayError, Result},
    signature::{self, SignAlgorithm},
    value::ParameterMap,
    xml_codec,
};

pub const SUCCESS: &str = "SUCCESS";
pub const RETURN_CODE_KEY: &str = "return_code";
pub const RESULT_CODE_KEY: &str = "result_code";
/// Error code reported for a unified order business failure that came without an `err_code`.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
const COMMUNICATION_FAILED: &str = "communication failed";

/// How a business failure's code and message are derived. The two endpoints disagree when the gateway omits details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCodePolicy {
    /// Missing `err_code` becomes [`UNKNOWN_ERROR_CODE`]; an unmapped code without a description reads
    /// [`UNKNOWN_ERROR_MESSAGE`].
    UnifiedOrder,
    /// Missing `err_code` falls back to the `result_code`; an unmapped code without a description reads as the code.
    Refund,
}

impl ErrorCodePolicy {
    fn lookup(&self, code: &str) -> Option<&'static str> {
        match self {
            ErrorCodePolicy::UnifiedOrder => unified_order_message(code),
            ErrorCodePolicy::Refund => refund_message(code),
        }
    }
}

//-------------------------------------------  ResponseStatus  -------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseStatus {
    success: bool,
    transport_ok: bool,
    error_code: String,
    error_message: String,
}

impl ResponseStatus {
    pub(crate) fn classify(fields: &ParameterMap, policy: ErrorCodePolicy) -> Self {
        let return_code = fields.string(RETURN_CODE_KEY);
        if return_code != SUCCESS {
            let message = Some(fields.string("return_msg")).filter(|m| !m.is_empty());
            let error_message = message.unwrap_or_else(|| COMMUNICATION_FAILED.to_string());
            debug!("🧾️ Gateway returned {return_code}: {error_message}");
            return Self { success: false, transport_ok: false, error_code: return_code, error_message };
        }
        let result_code = fields.string(RESULT_CODE_KEY);
        if result_code != SUCCESS {
            let err_code = Some(fields.string("err_code")).filter(|c| !c.is_empty());
            let description = Some(fields.string("err_code_des")).filter(|d| !d.is_empty());
            let error_code = match (err_code, policy) {
                (Some(code), _) => code,
                (None, ErrorCodePolicy::UnifiedOrder) => UNKNOWN_ERROR_CODE.to_string(),
                (None, ErrorCodePolicy::Refund) => result_code,
            };
            let error_message = match (policy.lookup(&error_code), description) {
                (Some(mapped), Some(des)) if des != mapped => format!("{mapped}({des})"),
                (Some(mapped), _) => mapped.to_string(),
                (None, Some(des)) => des,
                (None, None) => match policy {
                    ErrorCodePolicy::UnifiedOrder => UNKNOWN_ERROR_MESSAGE.to_string(),
                    ErrorCodePolicy::Refund => error_code.clone(),
                },
            };
            debug!("🧾️ Business failure {error_code}: {error_message}");
            return Self { success: false, transport_ok: true, error_code, error_message };
        }
        Self { success: true, transport_ok: true, ..Default::default() }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// True if the gateway rejected the call before any business processing happened.
    pub fn is_transport_failure(&self) -> bool {
        !self.transport_ok
    }

    /// Empty on success.
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// Empty on success.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

//-------------------------------------------      helpers      ------------------------------------------------------
pub(crate) fn decode_reply(raw: &str, context: &str) -> Result<ParameterMap> {
    if raw.trim().is_empty() {
        return Err(PayError::configuration("empty response"));
    }
    xml_codec::decode(raw).map_err(|e| e.with_context(context))
}

/// Failures are unsigned, so they pass. Successes must carry a matching `sign`.
pub(crate) fn verify_reply(
    status: &ResponseStatus,
    fields: &ParameterMap,
    key: &str,
    algorithm: SignAlgorithm,
) -> Result<bool> {
    if !status.is_success() {
        return Ok(true);
    }
    signature::verify_signature(fields, key, algorithm)
}
