use log::trace;
use wxp_common::Fen;

use super::{decode_reply, verify_reply, ErrorCodePolicy, ResponseStatus};
use crate::{errors::Result, signature::SignAlgorithm, value::ParameterMap};

/// A parsed `/secapi/pay/refund` reply. Amounts are in fen and read as zero when absent.
#[derive(Debug, Clone, Default)]
pub struct RefundResponse {
    fields: ParameterMap,
    status: ResponseStatus,
    pub refund_id: String,
    pub transaction_id: String,
    pub out_trade_no: String,
    pub out_refund_no: String,
    pub fee_type: String,
    pub refund_fee: Fen,
    pub settlement_refund_fee: Fen,
    pub total_fee: Fen,
    pub settlement_total_fee: Fen,
    pub cash_fee: Fen,
    pub cash_refund_fee: Fen,
    pub coupon_refund_fee: Fen,
    pub coupon_refund_count: i64,
}

impl RefundResponse {
    pub fn from_xml(raw: &str) -> Result<Self> {
        let fields = decode_reply(raw, "refund reply")?;
        let status = ResponseStatus::classify(&fields, ErrorCodePolicy::Refund);
        if !status.is_success() {
            trace!("🧾️ Refund reply is a failure. {}", status.error_code());
            return Ok(Self { fields, status, ..Default::default() });
        }
        let fee = |key: &str| Fen::from(fields.i64_or_zero(key));
        let response = Self {
            refund_id: fields.string("refund_id"),
            transaction_id: fields.string("transaction_id"),
            out_trade_no: fields.string("out_trade_no"),
            out_refund_no: fields.string("out_refund_no"),
            fee_type: fields.string("fee_type"),
            refund_fee: fee("refund_fee"),
            settlement_refund_fee: fee("settlement_refund_fee"),
            total_fee: fee("total_fee"),
            settlement_total_fee: fee("settlement_total_fee"),
            cash_fee: fee("cash_fee"),
            cash_refund_fee: fee("cash_refund_fee"),
            coupon_refund_fee: fee("coupon_refund_fee"),
            coupon_refund_count: fields.i64_or_zero("coupon_refund_count"),
            status,
            fields,
        };
        trace!("🧾️ Refund {} accepted for {}", response.refund_id, response.refund_fee);
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

    pub fn raw_fields(&self) -> &ParameterMap {
        &self.fields
    }

    pub fn verify_signature(&self, key: &str, algorithm: SignAlgorithm) -> Result<bool> {
        verify_reply(&self.status, &self.fields, key, algorithm)
    }
}
