//! Asynchronous payment result notifications.
//!
//! After a payment completes, the gateway POSTs a signed XML document to the order's `notify_url` and keeps retrying
//! until the merchant answers with [`notify_reply`]. The document is only trustworthy once
//! [`PaymentNotification::verify_signature`] passes, and the amount should be checked against the merchant's own order
//! before anything is fulfilled.

use log::{debug, info, warn};
use wxp_common::Fen;

use crate::{
    errors::Result,
    responses::{decode_reply, ErrorCodePolicy, ResponseStatus},
    signature::{self, SignAlgorithm},
    value::ParameterMap,
    xml_codec::{self, ROOT_ELEMENT},
};

#[derive(Debug, Clone, Default)]
pub struct PaymentNotification {
    fields: ParameterMap,
    status: ResponseStatus,
    pub app_id: String,
    pub mch_id: String,
    pub open_id: String,
    pub trade_type: String,
    pub bank_type: String,
    pub transaction_id: String,
    pub out_trade_no: String,
    pub attach: String,
    pub fee_type: String,
    /// Beijing time, `yyyyMMddHHmmss`.
    pub time_end: String,
    pub total_fee: Fen,
    pub cash_fee: Fen,
}

impl PaymentNotification {
    pub fn from_xml(raw: &str) -> Result<Self> {
        let fields = decode_reply(raw, "payment notification")?;
        let status = ResponseStatus::classify(&fields, ErrorCodePolicy::UnifiedOrder);
        if !status.is_success() {
            warn!("🧾️ Payment notification reports a failure. {}: {}", status.error_code(), status.error_message());
            return Ok(Self { fields, status, ..Default::default() });
        }
        let notification = Self {
            app_id: fields.string("appid"),
            mch_id: fields.string("mch_id"),
            open_id: fields.string("openid"),
            trade_type: fields.string("trade_type"),
            bank_type: fields.string("bank_type"),
            transaction_id: fields.string("transaction_id"),
            out_trade_no: fields.string("out_trade_no"),
            attach: fields.string("attach"),
            fee_type: fields.string("fee_type"),
            time_end: fields.string("time_end"),
            total_fee: Fen::from(fields.i64_or_zero("total_fee")),
            cash_fee: Fen::from(fields.i64_or_zero("cash_fee")),
            status,
            fields,
        };
        info!("🧾️ Payment notification for order {} ({})", notification.out_trade_no, notification.total_fee);
        Ok(notification)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> &ResponseStatus {
        &self.status
    }

    pub fn raw_fields(&self) -> &ParameterMap {
        &self.fields
    }

    /// Unlike request replies, a notification is never exempt: a missing `sign` fails, whatever the status.
    pub fn verify_signature(&self, key: &str, algorithm: SignAlgorithm) -> Result<bool> {
        let valid = signature::verify_signature(&self.fields, key, algorithm)?;
        if !valid {
            debug!("🚨️ Payment notification for order '{}' failed signature verification", self.out_trade_no);
        }
        Ok(valid)
    }
}

//-------------------------------------------     NotifyAck      -----------------------------------------------------
/// The merchant's answer to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyAck {
    /// Processed. The gateway stops retrying.
    Received,
    /// Not processed. The gateway will deliver the notification again later.
    Rejected(String),
}

pub fn notify_reply(ack: &NotifyAck) -> String {
    let (code, message) = match ack {
        NotifyAck::Received => ("SUCCESS", "OK"),
        NotifyAck::Rejected(reason) => ("FAIL", reason.as_str()),
    };
    let reply = ParameterMap::new().with("return_code", code).with("return_msg", message);
    xml_codec::encode(&reply, ROOT_ELEMENT)
}
