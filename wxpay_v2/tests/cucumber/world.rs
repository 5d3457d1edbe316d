use cucumber::World;
use wxpay_v2::{
    ParameterMap,
    PayError,
    RefundResponse,
    TradeType,
    UnifiedOrderBuilder,
    UnifiedOrderRequest,
    UnifiedOrderResponse,
};

pub const TEST_KEY: &str = "192006250b4c09247ec02edce69f6a2d";

#[derive(Default, Debug, World)]
pub struct WireWorld {
    pub key: String,
    pub parameters: ParameterMap,
    pub signature: String,
    pub order: Option<UnifiedOrderBuilder>,
    pub built: Option<Result<UnifiedOrderRequest, PayError>>,
    pub order_reply: Option<UnifiedOrderResponse>,
    pub refund_reply: Option<RefundResponse>,
    pub decoded: Option<ParameterMap>,
}

impl WireWorld {
    pub fn key(&self) -> &str {
        if self.key.is_empty() {
            TEST_KEY
        } else {
            &self.key
        }
    }

    pub fn order_reply(&self) -> &UnifiedOrderResponse {
        self.order_reply.as_ref().expect("No unified order reply has been received")
    }

    pub fn refund_reply(&self) -> &RefundResponse {
        self.refund_reply.as_ref().expect("No refund reply has been received")
    }
}

/// Everything a unified order needs except the trade-type-specific fields.
pub fn order_template(total_fee: i64, trade_type: TradeType) -> UnifiedOrderBuilder {
    UnifiedOrderRequest::builder()
        .app_id("wx2421b1c4370ec43b")
        .mch_id("10000100")
        .nonce("5K8264ILTKCH16CQ2502SI8ZNMTM67VS")
        .body("腾讯充值中心-QQ会员充值")
        .out_trade_no("20150806125346")
        .total_fee(total_fee)
        .client_ip("123.12.12.123")
        .notify_url("https://pay.example.com/wxpay/notify")
        .trade_type(trade_type)
}
