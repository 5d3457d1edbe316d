use std::{fmt::Display, str::FromStr};

use log::trace;
use wxp_common::Fen;

use super::{max_chars, require, WireRequest};
use crate::{
    config::MerchantConfig,
    errors::{PayError, Result},
    signature::{generate_nonce, DEFAULT_NONCE_LENGTH},
    value::ParameterMap,
};

//-------------------------------------------   RefundAccount   ------------------------------------------------------
/// Which balance the refund is paid out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefundAccount {
    UnsettledFunds,
    RechargeFunds,
}

impl RefundAccount {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundAccount::UnsettledFunds => "REFUND_SOURCE_UNSETTLED_FUNDS",
            RefundAccount::RechargeFunds => "REFUND_SOURCE_RECHARGE_FUNDS",
        }
    }
}

impl Display for RefundAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundAccount {
    type Err = PayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REFUND_SOURCE_UNSETTLED_FUNDS" | "UNSETTLED" => Ok(RefundAccount::UnsettledFunds),
            "REFUND_SOURCE_RECHARGE_FUNDS" | "RECHARGE" => Ok(RefundAccount::RechargeFunds),
            other => Err(PayError::validation(format!("refundAccount is not a known refund source: {other}"))),
        }
    }
}

//-------------------------------------------   RefundRequest   ------------------------------------------------------
/// A validated refund (`/secapi/pay/refund`) request. The endpoint requires the merchant's client certificate.
#[derive(Debug, Clone)]
pub struct RefundRequest {
    fields: RefundFields,
}

#[derive(Debug, Clone, Default)]
struct RefundFields {
    app_id: String,
    mch_id: String,
    nonce: String,
    transaction_id: String,
    out_trade_no: String,
    out_refund_no: String,
    total_fee: Fen,
    refund_fee: Fen,
    refund_fee_type: String,
    refund_desc: String,
    refund_account: Option<RefundAccount>,
    notify_url: String,
}

impl RefundRequest {
    pub fn builder() -> RefundBuilder {
        RefundBuilder::default()
    }

    pub fn out_refund_no(&self) -> &str {
        &self.fields.out_refund_no
    }

    pub fn refund_fee(&self) -> Fen {
        self.fields.refund_fee
    }

    pub fn total_fee(&self) -> Fen {
        self.fields.total_fee
    }

    /// What is left of the order total once this refund has gone through, given the refunds made before it.
    pub fn remaining_after<I: IntoIterator<Item = Fen>>(&self, earlier_refunds: I) -> Fen {
        let mut remaining = self.fields.total_fee - earlier_refunds.into_iter().sum::<Fen>();
        remaining -= self.fields.refund_fee;
        remaining
    }
}

impl WireRequest for RefundRequest {
    fn validate(&self) -> Result<()> {
        self.fields.validate()
    }

    fn to_wire_map(&self) -> ParameterMap {
        self.fields.to_wire_map()
    }
}

impl RefundFields {
    fn validate(&self) -> Result<()> {
        require(&self.app_id, "appId")?;
        require(&self.mch_id, "mchId")?;
        require(&self.nonce, "nonce")?;
        require(&self.out_refund_no, "outRefundNo")?;
        if !self.total_fee.is_positive() {
            return Err(PayError::validation("totalFee must be greater than 0"));
        }
        if !self.refund_fee.is_positive() {
            return Err(PayError::validation("refundFee must be greater than 0"));
        }
        if self.transaction_id.trim().is_empty() && self.out_trade_no.trim().is_empty() {
            return Err(PayError::validation("transactionId or outTradeNo must be provided"));
        }
        if self.refund_fee > self.total_fee {
            return Err(PayError::validation("refundFee must not exceed totalFee"));
        }
        max_chars(&self.out_refund_no, 64, "outRefundNo")?;
        max_chars(&self.out_trade_no, 32, "outTradeNo")?;
        max_chars(&self.refund_desc, 80, "refundDesc")?;
        trace!("🧾️ Refund {} of {} passed validation", self.out_refund_no, self.refund_fee);
        Ok(())
    }

    fn to_wire_map(&self) -> ParameterMap {
        ParameterMap::new()
            .with("appid", &self.app_id)
            .with("mch_id", &self.mch_id)
            .with("nonce_str", &self.nonce)
            .with("transaction_id", &self.transaction_id)
            .with("out_trade_no", &self.out_trade_no)
            .with("out_refund_no", &self.out_refund_no)
            .with("total_fee", self.total_fee)
            .with("refund_fee", self.refund_fee)
            .with("refund_fee_type", &self.refund_fee_type)
            .with("refund_desc", &self.refund_desc)
            .with("refund_account", self.refund_account.map(|a| a.as_str()))
            .with("notify_url", &self.notify_url)
            .without_blanks()
    }
}

//-------------------------------------------   RefundBuilder   ------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct RefundBuilder {
    fields: RefundFields,
}

impl RefundBuilder {
    /// A builder pre-filled with the merchant's app id and merchant id, and a fresh nonce.
    pub fn for_merchant(config: &MerchantConfig) -> Result<Self> {
        Ok(Self::default().app_id(&config.app_id).mch_id(&config.mch_id).nonce(generate_nonce(DEFAULT_NONCE_LENGTH)?))
    }

    pub fn app_id<S: Into<String>>(mut self, app_id: S) -> Self {
        self.fields.app_id = app_id.into();
        self
    }

    pub fn mch_id<S: Into<String>>(mut self, mch_id: S) -> Self {
        self.fields.mch_id = mch_id.into();
        self
    }

    pub fn nonce<S: Into<String>>(mut self, nonce: S) -> Self {
        self.fields.nonce = nonce.into();
        self
    }

    /// The gateway's own transaction id. Takes precedence over `out_trade_no` when both are given.
    pub fn transaction_id<S: Into<String>>(mut self, transaction_id: S) -> Self {
        self.fields.transaction_id = transaction_id.into();
        self
    }

    pub fn out_trade_no<S: Into<String>>(mut self, out_trade_no: S) -> Self {
        self.fields.out_trade_no = out_trade_no.into();
        self
    }

    /// The merchant's refund number. Repeating it makes the refund request idempotent on the gateway side.
    pub fn out_refund_no<S: Into<String>>(mut self, out_refund_no: S) -> Self {
        self.fields.out_refund_no = out_refund_no.into();
        self
    }

    pub fn total_fee<F: Into<Fen>>(mut self, total_fee: F) -> Self {
        self.fields.total_fee = total_fee.into();
        self
    }

    pub fn refund_fee<F: Into<Fen>>(mut self, refund_fee: F) -> Self {
        self.fields.refund_fee = refund_fee.into();
        self
    }

    pub fn refund_fee_type<S: Into<String>>(mut self, refund_fee_type: S) -> Self {
        self.fields.refund_fee_type = refund_fee_type.into();
        self
    }

    /// Shown to the payer in the refund message.
    pub fn refund_desc<S: Into<String>>(mut self, refund_desc: S) -> Self {
        self.fields.refund_desc = refund_desc.into();
        self
    }

    pub fn refund_account(mut self, refund_account: RefundAccount) -> Self {
        self.fields.refund_account = Some(refund_account);
        self
    }

    pub fn notify_url<S: Into<String>>(mut self, notify_url: S) -> Self {
        self.fields.notify_url = notify_url.into();
        self
    }

    pub fn build(self) -> Result<RefundRequest> {
        self.fields.validate()?;
        Ok(RefundRequest { fields: self.fields })
    }
}
