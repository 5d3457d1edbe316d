use clap::{Args, Parser, Subcommand};
use log::*;
use wxpay_v2::{MerchantConfig, SignAlgorithm, TradeType};

mod certs;
mod messages;
mod orders;

use crate::{
    certs::print_certificate_paths,
    messages::{print_decoded, print_nonce, print_notify_reply, print_signature, print_verification},
    orders::{print_refund, print_unified_order},
};

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "WeChat Pay V2 message tools")]
pub struct Arguments {
    /// The API key. Defaults to WXPAY_API_KEY
    #[arg(short = 'k', long = "key", global = true)]
    key: Option<String>,
    /// MD5 or HMAC-SHA256. Defaults to WXPAY_SIGN_TYPE
    #[arg(short = 'a', long = "algorithm", global = true)]
    algorithm: Option<SignAlgorithm>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "sign", about = "Sign a set of key=value parameters and print the request XML")]
    Sign(SignParams),
    #[clap(name = "verify", about = "Verify the signature of an XML message")]
    Verify(XmlInput),
    #[clap(name = "decode", about = "Print an XML message as JSON")]
    Decode(XmlInput),
    #[clap(name = "nonce", about = "Generate a random nonce")]
    Nonce {
        #[arg(short = 'l', long = "length", default_value = "32")]
        length: usize,
    },
    #[clap(name = "order", about = "Build and sign a unified order request")]
    UnifiedOrder(UnifiedOrderParams),
    #[clap(name = "refund", about = "Build and sign a refund request")]
    Refund(RefundParams),
    #[clap(name = "cert", about = "Materialize the configured certificate and key and print their paths")]
    Certificates {
        /// Where PEM content is written. Defaults to the system temp directory
        #[arg(short = 'd', long = "dir")]
        directory: Option<String>,
    },
    #[clap(name = "reply", about = "Print the reply to a payment notification")]
    NotifyReply {
        /// Reject the notification with this reason instead of acknowledging it
        #[arg(short = 'r', long = "reject")]
        reject: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SignParams {
    /// Parameters in the form key=value
    #[arg(required_unless_present = "json")]
    params: Vec<String>,
    /// A JSON object of parameters, instead of key=value pairs
    #[arg(short = 'j', long = "json")]
    json: Option<String>,
}

#[derive(Debug, Args)]
pub struct XmlInput {
    /// An XML document, or a path to one. Reads stdin when absent
    input: Option<String>,
}

#[derive(Debug, Args)]
pub struct UnifiedOrderParams {
    #[arg(short = 'b', long = "body")]
    body: String,
    #[arg(short = 'o', long = "order")]
    out_trade_no: String,
    /// The amount, in fen
    #[arg(short = 'f', long = "fee")]
    total_fee: i64,
    #[arg(short = 't', long = "trade-type", default_value = "NATIVE")]
    trade_type: TradeType,
    #[arg(short = 'i', long = "ip", default_value = "127.0.0.1")]
    client_ip: String,
    /// Required for JSAPI orders
    #[arg(long = "openid")]
    open_id: Option<String>,
    /// Required for NATIVE orders
    #[arg(short = 'p', long = "product")]
    product_id: Option<String>,
    /// Scene info as a JSON object. Required for H5 orders
    #[arg(short = 's', long = "scene")]
    scene_info: Option<String>,
    #[arg(long = "attach")]
    attach: Option<String>,
}

#[derive(Debug, Args)]
pub struct RefundParams {
    #[arg(short = 'o', long = "order")]
    out_trade_no: Option<String>,
    #[arg(short = 'x', long = "transaction")]
    transaction_id: Option<String>,
    #[arg(short = 'r', long = "refund-no")]
    out_refund_no: String,
    /// The order total, in fen
    #[arg(short = 't', long = "total")]
    total_fee: i64,
    /// The amount to refund, in fen
    #[arg(short = 'f', long = "fee")]
    refund_fee: i64,
    #[arg(short = 'd', long = "desc")]
    refund_desc: Option<String>,
}

/// The merchant settings from the environment, with command-line overrides applied.
pub fn merchant(args: &Arguments) -> MerchantConfig {
    let mut config = MerchantConfig::from_env_or_default();
    if let Some(key) = &args.key {
        config.api_key = key.as_str().into();
    }
    if let Some(algorithm) = args.algorithm {
        config = config.with_sign_algorithm(algorithm);
    }
    config
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let config = merchant(&cli);
    let result = match cli.command {
        Command::Sign(params) => print_signature(&config, params),
        Command::Verify(input) => print_verification(&config, input),
        Command::Decode(input) => print_decoded(input),
        Command::Nonce { length } => print_nonce(length),
        Command::UnifiedOrder(params) => print_unified_order(&config, params),
        Command::Refund(params) => print_refund(&config, params),
        Command::Certificates { directory } => print_certificate_paths(&config, directory),
        Command::NotifyReply { reject } => {
            print_notify_reply(reject);
            Ok(())
        },
    };
    if let Err(e) = result {
        error!("🚨️ {e}");
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
