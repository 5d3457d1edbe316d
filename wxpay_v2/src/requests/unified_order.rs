use chrono::NaiveDateTime;
use log::trace;
use wxp_common::Fen;

use super::{max_chars, require, TradeType, WireRequest};
use crate::{
    config::MerchantConfig,
    errors::{PayError, Result},
    signature::{generate_nonce, DEFAULT_NONCE_LENGTH},
    value::{ParameterMap, Value},
};

/// Timestamps on the wire are Beijing time in this format.
const WIRE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// A validated unified order (`/pay/unifiedorder`) request. Construct one with [`UnifiedOrderRequest::builder`].
#[derive(Debug, Clone)]
pub struct UnifiedOrderRequest {
    fields: OrderFields,
}

/// The fields of an order while it is still being built. Only a validated set becomes a request.
#[derive(Debug, Clone, Default)]
struct OrderFields {
    app_id: String,
    mch_id: String,
    nonce: String,
    body: String,
    out_trade_no: String,
    total_fee: Fen,
    client_ip: String,
    notify_url: String,
    trade_type: Option<TradeType>,
    open_id: String,
    product_id: String,
    scene_info: ParameterMap,
    device_info: String,
    detail: Value,
    attach: String,
    fee_type: String,
    time_start: Option<NaiveDateTime>,
    time_expire: Option<NaiveDateTime>,
    goods_tag: String,
    limit_pay: String,
    receipt: Option<bool>,
}

impl UnifiedOrderRequest {
    pub fn builder() -> UnifiedOrderBuilder {
        UnifiedOrderBuilder::default()
    }

    pub fn out_trade_no(&self) -> &str {
        &self.fields.out_trade_no
    }

    pub fn total_fee(&self) -> Fen {
        self.fields.total_fee
    }

    pub fn trade_type(&self) -> Option<TradeType> {
        self.fields.trade_type
    }

    pub fn nonce(&self) -> &str {
        &self.fields.nonce
    }
}

impl WireRequest for UnifiedOrderRequest {
    fn validate(&self) -> Result<()> {
        self.fields.validate()
    }

    fn to_wire_map(&self) -> ParameterMap {
        self.fields.to_wire_map()
    }
}

impl OrderFields {
    fn validate(&self) -> Result<()> {
        require(&self.app_id, "appId")?;
        require(&self.mch_id, "mchId")?;
        require(&self.nonce, "nonce")?;
        require(&self.body, "body")?;
        require(&self.out_trade_no, "outTradeNo")?;
        if !self.total_fee.is_positive() {
            return Err(PayError::validation("totalFee must be greater than 0"));
        }
        require(&self.client_ip, "clientIp")?;
        require(&self.notify_url, "notifyUrl")?;
        let trade_type = self.trade_type.ok_or_else(|| PayError::validation("tradeType is required"))?;
        match trade_type {
            TradeType::JsApi if self.open_id.trim().is_empty() => {
                return Err(PayError::validation("openId must be provided for JSAPI"));
            },
            TradeType::Native if self.product_id.trim().is_empty() => {
                return Err(PayError::validation("productId must be provided for NATIVE"));
            },
            TradeType::H5 if self.scene_info.is_empty() => {
                return Err(PayError::validation("sceneInfo must be provided for H5"));
            },
            _ => {},
        }
        max_chars(&self.out_trade_no, 32, "outTradeNo")?;
        max_chars(&self.body, 128, "body")?;
        max_chars(&self.attach, 127, "attach")?;
        if let (Some(start), Some(expire)) = (self.time_start, self.time_expire) {
            if expire <= start {
                return Err(PayError::validation("timeExpire must be later than timeStart"));
            }
        }
        trace!("🧾️ Unified order {} passed validation", self.out_trade_no);
        Ok(())
    }

    fn to_wire_map(&self) -> ParameterMap {
        let scene_info = if self.scene_info.is_empty() { Value::Null } else { Value::Map(self.scene_info.clone()) };
        ParameterMap::new()
            .with("appid", &self.app_id)
            .with("mch_id", &self.mch_id)
            .with("nonce_str", &self.nonce)
            .with("body", &self.body)
            .with("out_trade_no", &self.out_trade_no)
            .with("total_fee", self.total_fee)
            .with("spbill_create_ip", &self.client_ip)
            .with("notify_url", &self.notify_url)
            .with("trade_type", self.trade_type.map(|t| t.wire_name()))
            .with("openid", &self.open_id)
            .with("product_id", &self.product_id)
            .with("scene_info", scene_info)
            .with("device_info", &self.device_info)
            .with("detail", self.detail.clone())
            .with("attach", &self.attach)
            .with("fee_type", &self.fee_type)
            .with("time_start", self.time_start.map(|t| t.format(WIRE_TIME_FORMAT).to_string()))
            .with("time_expire", self.time_expire.map(|t| t.format(WIRE_TIME_FORMAT).to_string()))
            .with("goods_tag", &self.goods_tag)
            .with("limit_pay", &self.limit_pay)
            .with("receipt", self.receipt)
            .without_blanks()
    }
}

//-------------------------------------------UnifiedOrderBuilder------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct UnifiedOrderBuilder {
    fields: OrderFields,
}

impl UnifiedOrderBuilder {
    /// A builder pre-filled with the merchant's app id, merchant id and notify url, and a fresh nonce.
    pub fn for_merchant(config: &MerchantConfig) -> Result<Self> {
        Ok(Self::default()
            .app_id(&config.app_id)
            .mch_id(&config.mch_id)
            .notify_url(&config.notify_url)
            .nonce(generate_nonce(DEFAULT_NONCE_LENGTH)?))
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

    pub fn body<S: Into<String>>(mut self, body: S) -> Self {
        self.fields.body = body.into();
        self
    }

    pub fn out_trade_no<S: Into<String>>(mut self, out_trade_no: S) -> Self {
        self.fields.out_trade_no = out_trade_no.into();
        self
    }

    pub fn total_fee<F: Into<Fen>>(mut self, total_fee: F) -> Self {
        self.fields.total_fee = total_fee.into();
        self
    }

    pub fn client_ip<S: Into<String>>(mut self, client_ip: S) -> Self {
        self.fields.client_ip = client_ip.into();
        self
    }

    pub fn notify_url<S: Into<String>>(mut self, notify_url: S) -> Self {
        self.fields.notify_url = notify_url.into();
        self
    }

    pub fn trade_type(mut self, trade_type: TradeType) -> Self {
        self.fields.trade_type = Some(trade_type);
        self
    }

    pub fn open_id<S: Into<String>>(mut self, open_id: S) -> Self {
        self.fields.open_id = open_id.into();
        self
    }

    pub fn product_id<S: Into<String>>(mut self, product_id: S) -> Self {
        self.fields.product_id = product_id.into();
        self
    }

    /// Required for H5 payments, e.g. `{"h5_info": {"type": "Wap", "wap_url": ..., "wap_name": ...}}`.
    pub fn scene_info(mut self, scene_info: ParameterMap) -> Self {
        self.fields.scene_info = scene_info;
        self
    }

    pub fn device_info<S: Into<String>>(mut self, device_info: S) -> Self {
        self.fields.device_info = device_info.into();
        self
    }

    /// Goods detail. Structured values are sent as JSON.
    pub fn detail<V: Into<Value>>(mut self, detail: V) -> Self {
        self.fields.detail = detail.into();
        self
    }

    pub fn attach<S: Into<String>>(mut self, attach: S) -> Self {
        self.fields.attach = attach.into();
        self
    }

    pub fn fee_type<S: Into<String>>(mut self, fee_type: S) -> Self {
        self.fields.fee_type = fee_type.into();
        self
    }

    pub fn time_start(mut self, beijing_time: NaiveDateTime) -> Self {
        self.fields.time_start = Some(beijing_time);
        self
    }

    pub fn time_expire(mut self, beijing_time: NaiveDateTime) -> Self {
        self.fields.time_expire = Some(beijing_time);
        self
    }

    pub fn goods_tag<S: Into<String>>(mut self, goods_tag: S) -> Self {
        self.fields.goods_tag = goods_tag.into();
        self
    }

    /// `no_credit` disables credit card payment for this order.
    pub fn limit_pay<S: Into<String>>(mut self, limit_pay: S) -> Self {
        self.fields.limit_pay = limit_pay.into();
        self
    }

    pub fn receipt(mut self, receipt: bool) -> Self {
        self.fields.receipt = Some(receipt);
        self
    }

    pub fn build(self) -> Result<UnifiedOrderRequest> {
        self.fields.validate()?;
        Ok(UnifiedOrderRequest { fields: self.fields })
    }
}
