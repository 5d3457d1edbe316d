//! Human-readable text for the gateway's business error codes, per endpoint.

/// Fallback text when neither the table nor the gateway describe a unified order failure.
pub const UNKNOWN_ERROR_MESSAGE: &str = "未知错误";

pub fn unified_order_message(code: &str) -> Option<&'static str> {
    let msg = match code {
        "NOAUTH" => "商户未开通此接口权限",
        "NOTENOUGH" => "用户账号余额不足",
        "ORDERPAID" => "商户订单已支付，无需重复操作",
        "ORDERCLOSED" => "当前订单已关闭，无法支付",
        "SYSTEMERROR" => "系统超时，请用相同参数再次调用",
        "APPID_NOT_EXIST" => "参数中缺少APPID",
        "MCHID_NOT_EXIST" => "参数中缺少MCHID",
        "APPID_MCHID_NOT_MATCH" => "appid和mch_id不匹配",
        "LACK_PARAMS" => "缺少必要的请求参数",
        "OUT_TRADE_NO_USED" => "同一笔交易不能多次提交",
        "SIGNERROR" => "参数签名结果不正确",
        "XML_FORMAT_ERROR" => "XML格式错误",
        "REQUIRE_POST_METHOD" => "未使用post传递参数",
        "POST_DATA_EMPTY" => "post数据不能为空",
        "NOT_UTF8" => "未使用指定编码格式",
        "INVALID_REQUEST" => "参数错误",
        "TRADE_ERROR" => "业务错误，请确认交易状态",
        _ => return None,
    };
    Some(msg)
}

pub fn refund_message(code: &str) -> Option<&'static str> {
    let msg = match code {
        "SYSTEMERROR" => "系统超时，请用相同参数再次调用",
        "BIZERR_NEED_RETRY" => "并发情况下，业务被拒绝，请用相同参数再次调用",
        "TRADE_OVERDUE" => "订单已经超过可退款的最大期限",
        "ERROR" => "申请退款业务发生错误",
        "USER_ACCOUNT_ABNORMAL" => "用户帐号注销",
        "INVALID_REQ_TOO_MUCH" => "连续错误请求数过多被系统短暂屏蔽",
        "NOTENOUGH" => "商户可用退款余额不足",
        "INVALID_TRANSACTIONID" => "无效transaction_id",
        "PARAM_ERROR" => "请求参数错误",
        "APPID_NOT_EXIST" => "参数中缺少APPID",
        "MCHID_NOT_EXIST" => "参数中缺少MCHID",
        "REQUIRE_POST_METHOD" => "请使用post方法",
        "SIGNERROR" => "参数签名结果不正确",
        "XML_FORMAT_ERROR" => "XML格式错误",
        "FREQUENCY_LIMITED" => "频率限制，请降低频率后重试",
        "NOAUTH" => "商户未开通此接口权限",
        "CERT_ERROR" => "证书校验错误",
        "REFUND_FEE_MISMATCH" => "订单金额或退款金额与之前请求不一致",
        "ORDER_NOT_READY" => "订单处理中，暂时无法退款",
        _ => return None,
    };
    Some(msg)
}
