use anyhow::Result;
use log::*;
use wxp_common::Fen;
use wxpay_v2::{
    CertificateManager,
    GatewayConfig,
    MerchantConfig,
    ParameterMap,
    RefundBuilder,
    SignedRequest,
    UnifiedOrderBuilder,
    WireRequest,
};

use crate::{RefundParams, UnifiedOrderParams};

pub fn print_unified_order(config: &MerchantConfig, params: UnifiedOrderParams) -> Result<()> {
    let mut builder = UnifiedOrderBuilder::for_merchant(config)?
        .body(params.body)
        .out_trade_no(params.out_trade_no)
        .total_fee(Fen::from(params.total_fee))
        .client_ip(params.client_ip)
        .trade_type(params.trade_type);
    if let Some(open_id) = params.open_id {
        builder = builder.open_id(open_id);
    }
    if let Some(product_id) = params.product_id {
        builder = builder.product_id(product_id);
    }
    if let Some(scene) = params.scene_info {
        builder = builder.scene_info(ParameterMap::from_json(&scene)?);
    }
    if let Some(attach) = params.attach {
        builder = builder.attach(attach);
    }
    let request = builder.build()?;
    info!("🧾️ Unified order {} for {} built", request.out_trade_no(), request.total_fee());
    let signed = request.sign(config.api_key.reveal(), config.sign_algorithm)?;
    let gateway = GatewayConfig::from_env_or_default();
    print_request("Unified Order", &gateway.unified_order_url(), &signed);
    Ok(())
}

pub fn print_refund(config: &MerchantConfig, params: RefundParams) -> Result<()> {
    let mut builder = RefundBuilder::for_merchant(config)?
        .out_refund_no(params.out_refund_no)
        .total_fee(Fen::from(params.total_fee))
        .refund_fee(Fen::from(params.refund_fee));
    if let Some(out_trade_no) = params.out_trade_no {
        builder = builder.out_trade_no(out_trade_no);
    }
    if let Some(transaction_id) = params.transaction_id {
        builder = builder.transaction_id(transaction_id);
    }
    if let Some(desc) = params.refund_desc {
        builder = builder.refund_desc(desc);
    }
    let request = builder.build()?;
    let signed = request.sign(config.api_key.reveal(), config.sign_algorithm)?;
    let gateway = GatewayConfig::from_env_or_default();
    print_request("Refund", &gateway.refund_url(), &signed);
    let certificates = CertificateManager::in_temp_dir();
    match (certificates.resolve_cert_path(config)?, certificates.resolve_key_path(config)?) {
        (Some(cert), Some(key)) => {
            println!("Client certificate: {}", cert.display());
            println!("Client key        : {}", key.display());
        },
        _ => warn!("🚨️ The refund endpoint needs WXPAY_CERT and WXPAY_KEY. The request will be refused without them."),
    }
    Ok(())
}

fn print_request(title: &str, url: &str, signed: &SignedRequest) {
    println!("----------------------------- {title} -----------------------------");
    println!("POST {url}");
    println!("Content-Type: {}", wxpay_v2::config::WIRE_CONTENT_TYPE);
    println!();
    println!("{}", signed.to_xml());
    println!("------------------------------------------------------------------------");
}
