use std::{env, time::Duration};

use log::*;
use wxp_common::{helpers::env_flag, Secret};

use crate::{
    certificates::{CertificateSource, MaterialKind},
    signature::SignAlgorithm,
};

pub const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";
pub const SANDBOX_PATH_PREFIX: &str = "/sandboxnew";
pub const UNIFIED_ORDER_PATH: &str = "/pay/unifiedorder";
pub const REFUND_PATH: &str = "/secapi/pay/refund";
/// Content type for every request body sent to the gateway.
pub const WIRE_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

//-------------------------------------------  MerchantConfig  -------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct MerchantConfig {
    /// The app id of the official account, mini program or mobile app the payment is made from.
    pub app_id: String,
    pub mch_id: String,
    /// The 32 character API key set in the merchant platform. Used for both MD5 and HMAC-SHA256 signatures.
    pub api_key: Secret<String>,
    pub sign_algorithm: SignAlgorithm,
    /// Where the gateway posts asynchronous payment results.
    pub notify_url: String,
    /// The API certificate, either a path to a PEM file or the PEM text itself.
    pub cert: Option<Secret<String>>,
    /// The API private key, either a path to a PEM file or the PEM text itself.
    pub key: Option<Secret<String>>,
}

impl MerchantConfig {
    pub fn new(app_id: &str, mch_id: &str, api_key: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            mch_id: mch_id.to_string(),
            api_key: Secret::from(api_key),
            ..Default::default()
        }
    }

    pub fn from_env_or_default() -> Self {
        let app_id = env::var("WXPAY_APP_ID").ok().unwrap_or_else(|| {
            error!("🪛️ WXPAY_APP_ID is not set. Please set it to the app id bound to your merchant account.");
            String::default()
        });
        let mch_id = env::var("WXPAY_MCH_ID").ok().unwrap_or_else(|| {
            error!("🪛️ WXPAY_MCH_ID is not set. Please set it to your merchant id.");
            String::default()
        });
        let api_key = env::var("WXPAY_API_KEY").ok().unwrap_or_else(|| {
            error!("🪛️ WXPAY_API_KEY is not set. Requests cannot be signed without it.");
            String::default()
        });
        let sign_algorithm = match env::var("WXPAY_SIGN_TYPE") {
            Ok(s) => s.parse::<SignAlgorithm>().unwrap_or_else(|e| {
                warn!("🪛️ Invalid value for WXPAY_SIGN_TYPE. {e}. Using MD5 instead.");
                SignAlgorithm::Md5
            }),
            Err(_) => {
                info!("🪛️ WXPAY_SIGN_TYPE is not set. Using MD5 signatures.");
                SignAlgorithm::Md5
            },
        };
        let notify_url = env::var("WXPAY_NOTIFY_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ WXPAY_NOTIFY_URL is not set. Unified orders will need a notify url set explicitly.");
            String::default()
        });
        let cert = optional_secret("WXPAY_CERT");
        let key = optional_secret("WXPAY_KEY");
        if cert.is_none() || key.is_none() {
            info!("🪛️ WXPAY_CERT and/or WXPAY_KEY are not set. Refunds will not be possible.");
        }
        Self { app_id, mch_id, api_key: Secret::new(api_key), sign_algorithm, notify_url, cert, key }
    }

    pub fn with_sign_algorithm(mut self, algorithm: SignAlgorithm) -> Self {
        self.sign_algorithm = algorithm;
        self
    }

    pub fn with_notify_url(mut self, url: &str) -> Self {
        self.notify_url = url.to_string();
        self
    }

    pub fn with_certificates(mut self, cert: &str, key: &str) -> Self {
        self.cert = Some(Secret::from(cert));
        self.key = Some(Secret::from(key));
        self
    }
}

fn optional_secret(name: &str) -> Option<Secret<String>> {
    env::var(name).ok().filter(|s| !s.trim().is_empty()).map(Secret::new)
}

impl CertificateSource for MerchantConfig {
    fn material(&self, kind: MaterialKind) -> Option<String> {
        let material = match kind {
            MaterialKind::Cert => self.cert.as_ref(),
            MaterialKind::Key => self.key.as_ref(),
        };
        material.map(|s| s.reveal().clone())
    }
}

//-------------------------------------------   GatewayConfig   ------------------------------------------------------
/// Settings for the HTTP transport. This crate performs no I/O itself; these are handed to whichever client sends the
/// XML.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Route every call through the gateway's sandbox environment.
    pub sandbox: bool,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), sandbox: false, timeout: DEFAULT_TIMEOUT }
    }
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = env::var("WXPAY_BASE_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let sandbox = env_flag("WXPAY_SANDBOX", false);
        if sandbox {
            warn!("🚨️ WXPAY_SANDBOX is enabled. Payments will not be real.");
        }
        let timeout = env::var("WXPAY_TIMEOUT_SECS")
            .map_err(|_| trace!("🪛️ WXPAY_TIMEOUT_SECS is not set. Using {}s.", DEFAULT_TIMEOUT.as_secs()))
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for WXPAY_TIMEOUT_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { base_url, sandbox, timeout }
    }

    pub fn endpoint(&self, path: &str) -> String {
        let prefix = if self.sandbox { SANDBOX_PATH_PREFIX } else { "" };
        format!("{}{prefix}{path}", self.base_url)
    }

    pub fn unified_order_url(&self) -> String {
        self.endpoint(UNIFIED_ORDER_PATH)
    }

    pub fn refund_url(&self) -> String {
        self.endpoint(REFUND_PATH)
    }

    /// Endpoints under `/secapi` refuse connections without the merchant's client certificate.
    pub fn requires_client_certificate(path: &str) -> bool {
        path.starts_with("/secapi/")
    }
}
