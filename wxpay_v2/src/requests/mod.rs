//! Outbound requests.
//!
//! Each request goes through three stages:
//!
//! 1. a builder collects fields through a fluent API (nothing escapes it half-built);
//! 2. `build()` validates the fields and returns the immutable request;
//! 3. `sign()` produces a [`SignedRequest`]: the wire parameters plus `sign` (and `sign_type` for HMAC-SHA256),
//!    ready to be serialized with `to_xml()`.

mod refund;
mod unified_order;

use std::{fmt::Display, str::FromStr};

pub use refund::{RefundAccount, RefundBuilder, RefundRequest};
pub use unified_order::{UnifiedOrderBuilder, UnifiedOrderRequest};

use crate::{
    errors::{PayError, Result},
    signature::{self, SignAlgorithm},
    value::{ParameterMap, SIGN_KEY},
    xml_codec::{self, ROOT_ELEMENT},
};

//-------------------------------------------     TradeType     ------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    /// In-browser payment inside the WeChat client. Mini programs use this trade type too.
    JsApi,
    /// QR code payment.
    Native,
    /// Payment from a native mobile app.
    App,
    /// Payment from a mobile browser outside WeChat. Sent on the wire as `MWEB`.
    H5,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::JsApi => "JSAPI",
            TradeType::Native => "NATIVE",
            TradeType::App => "APP",
            TradeType::H5 => "H5",
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            TradeType::H5 => "MWEB",
            other => other.as_str(),
        }
    }
}

impl Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = PayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JSAPI" => Ok(TradeType::JsApi),
            "NATIVE" => Ok(TradeType::Native),
            "APP" => Ok(TradeType::App),
            "H5" | "MWEB" => Ok(TradeType::H5),
            other => Err(PayError::validation(format!("tradeType must be one of JSAPI, NATIVE, APP or H5, not {other}"))),
        }
    }
}

//-------------------------------------------    WireRequest    ------------------------------------------------------
pub trait WireRequest {
    /// Check every field-level rule. Idempotent.
    fn validate(&self) -> Result<()>;

    /// The request under its snake_case wire keys, without blank values and without a signature.
    fn to_wire_map(&self) -> ParameterMap;

    /// Unsigned XML. The gateway rejects this; use [`WireRequest::sign`] for anything that is actually sent.
    fn to_xml(&self) -> String {
        xml_codec::encode(&self.to_wire_map(), ROOT_ELEMENT)
    }

    fn sign(&self, key: &str, algorithm: SignAlgorithm) -> Result<SignedRequest> {
        self.validate()?;
        SignedRequest::new(self.to_wire_map(), key, algorithm)
    }
}

//-------------------------------------------   SignedRequest   ------------------------------------------------------
/// A validated request together with its signature. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    parameters: ParameterMap,
    algorithm: SignAlgorithm,
}

impl SignedRequest {
    fn new(parameters: ParameterMap, key: &str, algorithm: SignAlgorithm) -> Result<Self> {
        let parameters = signature::sign_parameters(parameters, key, algorithm)?;
        Ok(Self { parameters, algorithm })
    }

    pub fn signature(&self) -> String {
        self.parameters.string(SIGN_KEY)
    }

    pub fn algorithm(&self) -> SignAlgorithm {
        self.algorithm
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    /// The wire parameters including `sign`.
    pub fn to_wire_map(&self) -> ParameterMap {
        self.parameters.clone()
    }

    pub fn to_xml(&self) -> String {
        xml_codec::encode(&self.parameters, ROOT_ELEMENT)
    }
}

//-------------------------------------------    validation     ------------------------------------------------------
fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(PayError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn max_chars(value: &str, max: usize, field: &str) -> Result<()> {
    if value.chars().count() > max {
        Err(PayError::validation(format!("{field} must be at most {max} characters")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trade_types() {
        assert_eq!("jsapi".parse::<TradeType>().unwrap(), TradeType::JsApi);
        assert_eq!("MWEB".parse::<TradeType>().unwrap(), TradeType::H5);
        assert_eq!("H5".parse::<TradeType>().unwrap(), TradeType::H5);
        assert_eq!(TradeType::H5.wire_name(), "MWEB");
        assert_eq!(TradeType::Native.wire_name(), "NATIVE");
        assert_eq!(TradeType::App.to_string(), "APP");
        let err = "MICROPAY".parse::<TradeType>().unwrap_err();
        assert!(matches!(err, PayError::ValidationError(ref m) if m.contains("tradeType")));
    }

    #[test]
    fn validation_helpers() {
        assert!(require("x", "body").is_ok());
        assert_eq!(require("  ", "body").unwrap_err(), PayError::validation("body is required"));
        assert!(max_chars("腾讯充值", 4, "body").is_ok());
        assert_eq!(max_chars("12345", 4, "body").unwrap_err(), PayError::validation("body must be at most 4 characters"));
    }
}
