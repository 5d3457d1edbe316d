//! # WeChat Pay V2 wire protocol
//!
//! The codec and signing layer for the gateway's legacy XML API. It builds signed unified order and refund requests,
//! parses and verifies replies and payment notifications, and turns certificate material into files that an HTTP
//! client can load for the mutually-authenticated refund endpoint.
//!
//! This crate performs no network I/O. The transport (and its retry and timeout policy) belongs to the caller, who
//! finds the endpoint URLs and content type in [`config`].
//!
//! ```no_run
//! use wxpay_v2::{MerchantConfig, TradeType, UnifiedOrderBuilder, UnifiedOrderResponse, WireRequest};
//!
//! # fn main() -> wxpay_v2::Result<()> {
//! let merchant = MerchantConfig::from_env_or_default();
//! let order = UnifiedOrderBuilder::for_merchant(&merchant)?
//!     .body("Coffee")
//!     .out_trade_no("20240501-0001")
//!     .total_fee(1500)
//!     .client_ip("127.0.0.1")
//!     .trade_type(TradeType::Native)
//!     .product_id("latte")
//!     .build()?;
//! let xml = order.sign(merchant.api_key.reveal(), merchant.sign_algorithm)?.to_xml();
//! # let reply = xml;
//! let response = UnifiedOrderResponse::from_xml(&reply)?;
//! if response.verify_signature(merchant.api_key.reveal(), merchant.sign_algorithm)? && response.is_success() {
//!     println!("Scan {}", response.code_url());
//! }
//! # Ok(())
//! # }
//! ```

pub mod certificates;
pub mod config;
mod errors;
pub mod notify;
pub mod requests;
pub mod responses;
pub mod signature;
pub mod value;
pub mod xml_codec;

pub use certificates::{CertificateCache, CertificateManager, CertificateSource, InMemoryCertificateCache, MaterialKind};
pub use config::{GatewayConfig, MerchantConfig};
pub use errors::{PayError, Result};
pub use notify::{notify_reply, NotifyAck, PaymentNotification};
pub use requests::{
    RefundAccount,
    RefundBuilder,
    RefundRequest,
    SignedRequest,
    TradeType,
    UnifiedOrderBuilder,
    UnifiedOrderRequest,
    WireRequest,
};
pub use responses::{AppPayParams, JsApiPayParams, RefundResponse, ResponseStatus, UnifiedOrderResponse};
pub use signature::SignAlgorithm;
pub use value::{ParameterMap, Value};
pub use wxp_common::{Fen, Secret};
