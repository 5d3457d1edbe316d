//! # Parameter signatures
//!
//! Every V2 message is signed over its own parameters. The canonical signing string is built by
//!
//! 1. dropping the `sign` entry and every blank (null or empty string) value,
//! 2. sorting the remaining keys in ascending byte order,
//! 3. joining them as `k1=v1&k2=v2...` using the same value stringification as the XML codec,
//! 4. appending `&key=<api key>`.
//!
//! The digest of that string is either MD5 or HMAC-SHA256 (keyed with the same API key), rendered as upper-case hex.
//! Incoming signatures are compared case-insensitively and in constant time.

use std::{fmt::Display, str::FromStr};

use hmac::{Hmac, Mac};
use log::{debug, trace};
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;

use crate::{
    errors::{PayError, Result},
    value::{ParameterMap, Value, SIGN_KEY},
};

pub const NONCE_KEY: &str = "nonce_str";
pub const SIGN_TYPE_KEY: &str = "sign_type";
pub const DEFAULT_NONCE_LENGTH: usize = 32;

type HmacSha256 = Hmac<Sha256>;

//-------------------------------------------   SignAlgorithm   ------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignAlgorithm {
    /// The gateway default. Requests signed this way do not carry a `sign_type` field.
    #[default]
    Md5,
    HmacSha256,
}

impl SignAlgorithm {
    /// The name used in the `sign_type` field and the `signType` client parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignAlgorithm::Md5 => "MD5",
            SignAlgorithm::HmacSha256 => "HMAC-SHA256",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == SignAlgorithm::default()
    }
}

impl Display for SignAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignAlgorithm {
    type Err = PayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MD5" => Ok(SignAlgorithm::Md5),
            "HMAC-SHA256" => Ok(SignAlgorithm::HmacSha256),
            other => Err(PayError::configuration(format!("Unsupported signature algorithm: {other}"))),
        }
    }
}

//-------------------------------------------   SigningContext   -----------------------------------------------------
/// Everything needed to compute one digest. The parameters are filtered on construction.
pub struct SigningContext<'a> {
    parameters: Vec<(&'a String, &'a Value)>,
    key: &'a str,
    algorithm: SignAlgorithm,
}

impl<'a> SigningContext<'a> {
    pub fn new(parameters: &'a ParameterMap, key: &'a str, algorithm: SignAlgorithm) -> Result<Self> {
        if key.is_empty() {
            return Err(PayError::configuration("The API key used for signing is empty"));
        }
        // ParameterMap iterates in key order already, which is the order the gateway wants
        let parameters = parameters.signable().collect::<Vec<_>>();
        if parameters.is_empty() {
            return Err(PayError::configuration("There are no parameters to sign"));
        }
        Ok(Self { parameters, key, algorithm })
    }

    /// The `k=v&...` string, without the trailing secret. Safe to log.
    pub fn canonical_string(&self) -> String {
        self.parameters.iter().map(|(k, v)| format!("{k}={}", v.to_wire_string())).collect::<Vec<_>>().join("&")
    }

    pub fn algorithm(&self) -> SignAlgorithm {
        self.algorithm
    }

    pub fn digest(&self) -> Result<String> {
        let canonical = self.canonical_string();
        trace!("🔐️ Signing string ({}): {canonical}", self.algorithm);
        let message = format!("{canonical}&key={}", self.key);
        let digest = match self.algorithm {
            SignAlgorithm::Md5 => md5::compute(message.as_bytes()).0.to_vec(),
            SignAlgorithm::HmacSha256 => {
                let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
                    .map_err(|e| PayError::configuration(format!("Invalid HMAC key. {e}")))?;
                mac.update(message.as_bytes());
                mac.finalize().into_bytes().to_vec()
            },
        };
        Ok(hex::encode_upper(digest))
    }
}

/// Compute the upper-case hex signature of `parameters`.
pub fn generate_signature(parameters: &ParameterMap, key: &str, algorithm: SignAlgorithm) -> Result<String> {
    SigningContext::new(parameters, key, algorithm)?.digest()
}

/// Check the `sign` entry of `parameters` against a freshly computed signature.
///
/// A missing signature or a mismatch is `Ok(false)`. Errors are only returned for the configuration problems that
/// [`generate_signature`] reports.
pub fn verify_signature(parameters: &ParameterMap, key: &str, algorithm: SignAlgorithm) -> Result<bool> {
    let provided = match parameters.get(SIGN_KEY) {
        Some(v) if !v.is_blank() => v.to_wire_string(),
        _ => {
            debug!("🔐️ No signature present. Verification fails.");
            return Ok(false);
        },
    };
    let expected = generate_signature(parameters, key, algorithm)?;
    let valid = constant_time_eq_ignore_case(provided.as_bytes(), expected.as_bytes());
    if valid {
        trace!("🔐️ Signature check ✅️");
    } else {
        debug!("🔐️ Signature mismatch ({algorithm})");
    }
    Ok(valid)
}

/// Add a nonce (if there isn't one), a `sign_type` (for non-default algorithms) and the `sign` itself.
pub fn sign_parameters(mut parameters: ParameterMap, key: &str, algorithm: SignAlgorithm) -> Result<ParameterMap> {
    if !parameters.has_value(NONCE_KEY) {
        parameters.insert(NONCE_KEY, generate_nonce(DEFAULT_NONCE_LENGTH)?);
    }
    if !algorithm.is_default() {
        parameters.insert(SIGN_TYPE_KEY, algorithm.as_str());
    }
    let sign = generate_signature(&parameters, key, algorithm)?;
    parameters.insert(SIGN_KEY, sign);
    Ok(parameters)
}

/// A random alphanumeric string, for `nonce_str` and client-side pay parameters.
pub fn generate_nonce(length: usize) -> Result<String> {
    if length == 0 {
        return Err(PayError::configuration("Nonce length must be greater than zero"));
    }
    let nonce = rand::thread_rng().sample_iter(&Alphanumeric).take(length).map(char::from).collect();
    Ok(nonce)
}

fn constant_time_eq_ignore_case(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x.to_ascii_uppercase() ^ y.to_ascii_uppercase())) == 0
}
