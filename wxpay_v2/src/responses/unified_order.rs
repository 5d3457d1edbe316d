use chrono::Utc;
use log::{debug, trace};
use serde::Serialize;

use super::{decode_reply, verify_reply, ErrorCodePolicy, ResponseStatus};
use crate::{
    errors::{PayError, Result},
    signature::{generate_nonce, generate_signature, SignAlgorithm, DEFAULT_NONCE_LENGTH},
    value::ParameterMap,
};

/// Parameters for `wx.requestPayment` (mini programs) and `WeixinJSBridge` (JSAPI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsApiPayParams {
    pub app_id: String,
    pub time_stamp: String,
    pub nonce_str: String,
    pub package: String,
    pub sign_type: String,
    pub pay_sign: String,
}

/// Mini programs take exactly the JSAPI parameter set.
pub type MiniProgramPayParams = JsApiPayParams;

/// Parameters for the native app SDK's `PayReq`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppPayParams {
    pub appid: String,
    pub partnerid: String,
    pub prepayid: String,
    pub package: String,
    pub noncestr: String,
    pub timestamp: String,
    pub sign: String,
}

/// A parsed `/pay/unifiedorder` reply.
#[derive(Debug, Clone)]
pub struct UnifiedOrderResponse {
    fields: ParameterMap,
    status: ResponseStatus,
    app_id: String,
    mch_id: String,
    prepay_id: String,
    trade_type: String,
    code_url: String,
    mweb_url: String,
}

impl UnifiedOrderResponse {
    pub fn from_xml(raw: &str) -> Result<Self> {
        let fields = decode_reply(raw, "unified order reply")?;
        let status = ResponseStatus::classify(&fields, ErrorCodePolicy::UnifiedOrder);
        let field = |key: &str| if status.is_success() { fields.string(key) } else { String::new() };
        let response = Self {
            app_id: field("appid"),
            mch_id: field("mch_id"),
            prepay_id: field("prepay_id"),
            trade_type: field("trade_type"),
            code_url: field("code_url"),
            mweb_url: field("mweb_url"),
            status,
            fields,
        };
        trace!("🧾️ Unified order reply parsed. Success: {}", response.is_success());
        Ok(response)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> &ResponseStatus {
        &self.status
    }

    pub fn error_code(&self) -> &str {
        self.status.error_code()
    }

    pub fn error_message(&self) -> &str {
        self.status.error_message()
    }

    /// Every field of the reply as decoded, including `sign`.
    pub fn raw_fields(&self) -> &ParameterMap {
        &self.fields
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn mch_id(&self) -> &str {
        &self.mch_id
    }

    pub fn prepay_id(&self) -> &str {
        &self.prepay_id
    }

    /// As sent by the gateway, so H5 orders read `MWEB`.
    pub fn trade_type(&self) -> &str {
        &self.trade_type
    }

    /// QR code content for NATIVE orders.
    pub fn code_url(&self) -> &str {
        &self.code_url
    }

    /// Redirect target for H5 orders.
    pub fn mweb_url(&self) -> &str {
        &self.mweb_url
    }

    pub fn verify_signature(&self, key: &str, algorithm: SignAlgorithm) -> Result<bool> {
        verify_reply(&self.status, &self.fields, key, algorithm)
    }

    pub fn generate_mini_program_pay_params(&self, key: &str, algorithm: SignAlgorithm) -> Result<MiniProgramPayParams> {
        self.generate_jsapi_pay_params(key, algorithm)
    }

    pub fn generate_jsapi_pay_params(&self, key: &str, algorithm: SignAlgorithm) -> Result<JsApiPayParams> {
        self.jsapi_pay_params_with(key, algorithm, &timestamp(), &generate_nonce(DEFAULT_NONCE_LENGTH)?)
    }

    pub fn generate_app_pay_params(&self, key: &str, algorithm: SignAlgorithm) -> Result<AppPayParams> {
        self.app_pay_params_with(key, algorithm, &timestamp(), &generate_nonce(DEFAULT_NONCE_LENGTH)?)
    }

    fn jsapi_pay_params_with(
        &self,
        key: &str,
        algorithm: SignAlgorithm,
        time_stamp: &str,
        nonce: &str,
    ) -> Result<JsApiPayParams> {
        self.ensure_payable()?;
        let package = format!("prepay_id={}", self.prepay_id);
        let parameters = ParameterMap::new()
            .with("appId", &self.app_id)
            .with("timeStamp", time_stamp)
            .with("nonceStr", nonce)
            .with("package", &package)
            .with("signType", algorithm.as_str());
        let pay_sign = generate_signature(&parameters, key, algorithm)?;
        debug!("🔐️ Client pay parameters signed for prepay id {}", self.prepay_id);
        Ok(JsApiPayParams {
            app_id: self.app_id.clone(),
            time_stamp: time_stamp.to_string(),
            nonce_str: nonce.to_string(),
            package,
            sign_type: algorithm.as_str().to_string(),
            pay_sign,
        })
    }

    fn app_pay_params_with(&self, key: &str, algorithm: SignAlgorithm, timestamp: &str, nonce: &str) -> Result<AppPayParams> {
        self.ensure_payable()?;
        let package = "Sign=WXPay";
        let parameters = ParameterMap::new()
            .with("appid", &self.app_id)
            .with("partnerid", &self.mch_id)
            .with("prepayid", &self.prepay_id)
            .with("package", package)
            .with("noncestr", nonce)
            .with("timestamp", timestamp);
        let sign = generate_signature(&parameters, key, algorithm)?;
        debug!("🔐️ App pay parameters signed for prepay id {}", self.prepay_id);
        Ok(AppPayParams {
            appid: self.app_id.clone(),
            partnerid: self.mch_id.clone(),
            prepayid: self.prepay_id.clone(),
            package: package.to_string(),
            noncestr: nonce.to_string(),
            timestamp: timestamp.to_string(),
            sign,
        })
    }

    fn ensure_payable(&self) -> Result<()> {
        if !self.is_success() {
            return Err(PayError::configuration(format!(
                "Cannot create pay parameters from a failed order. {}: {}",
                self.error_code(),
                self.error_message()
            )));
        }
        if self.prepay_id.is_empty() {
            return Err(PayError::configuration("Cannot create pay parameters without a prepay_id"));
        }
        Ok(())
    }
}

fn timestamp() -> String {
    Utc::now().timestamp().to_string()
}
