use std::{fs, io::Read, path::Path};

use anyhow::{anyhow, Result};
use wxpay_v2::{
    notify_reply,
    signature::{generate_nonce, sign_parameters, verify_signature},
    xml_codec,
    MerchantConfig,
    NotifyAck,
    ParameterMap,
};

use crate::{SignParams, XmlInput};

pub fn print_signature(config: &MerchantConfig, params: SignParams) -> Result<()> {
    let parameters = match params.json {
        Some(json) => ParameterMap::from_json(&json)?,
        None => parse_pairs(&params.params)?,
    };
    let signed = sign_parameters(parameters, config.api_key.reveal(), config.sign_algorithm)?;
    println!("----------------------------- Signed Request -----------------------------");
    println!("Algorithm: {}", config.sign_algorithm);
    println!("sign     : {}", signed.string("sign"));
    println!("{}", xml_codec::encode(&signed, xml_codec::ROOT_ELEMENT));
    println!("--------------------------------------------------------------------------");
    Ok(())
}

pub fn print_verification(config: &MerchantConfig, input: XmlInput) -> Result<()> {
    let parameters = xml_codec::decode(&read_xml(input)?)?;
    let valid = verify_signature(&parameters, config.api_key.reveal(), config.sign_algorithm)?;
    if valid {
        println!("✅️ Signature is valid ({})", config.sign_algorithm);
        Ok(())
    } else {
        Err(anyhow!("Signature is missing or does not match ({})", config.sign_algorithm))
    }
}

pub fn print_decoded(input: XmlInput) -> Result<()> {
    let parameters = xml_codec::decode(&read_xml(input)?)?;
    println!("{}", serde_json::to_string_pretty(&parameters)?);
    Ok(())
}

pub fn print_nonce(length: usize) -> Result<()> {
    println!("{}", generate_nonce(length)?);
    Ok(())
}

pub fn print_notify_reply(reject: Option<String>) {
    let ack = reject.map(NotifyAck::Rejected).unwrap_or(NotifyAck::Received);
    println!("{}", notify_reply(&ack));
}

fn parse_pairs(pairs: &[String]) -> Result<ParameterMap> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("Parameters must be in the form key=value, not '{pair}'"))
        })
        .collect()
}

fn read_xml(input: XmlInput) -> Result<String> {
    match input.input {
        Some(s) if s.trim_start().starts_with('<') => Ok(s),
        Some(path) if Path::new(&path).is_file() => Ok(fs::read_to_string(path)?),
        Some(other) => Err(anyhow!("'{other}' is neither an XML document nor a file")),
        None => {
            let mut xml = String::new();
            std::io::stdin().read_to_string(&mut xml)?;
            Ok(xml)
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_value_pairs() {
        let pairs = vec!["appid=wxd930ea5d5a258f4f".to_string(), "body=a=b".to_string()];
        let map = parse_pairs(&pairs).unwrap();
        assert_eq!(map.string("appid"), "wxd930ea5d5a258f4f");
        assert_eq!(map.string("body"), "a=b");
        assert!(parse_pairs(&["body".to_string()]).is_err());
    }

    #[test]
    fn inline_xml_is_read_directly() {
        let xml = read_xml(XmlInput { input: Some("<xml><a>1</a></xml>".to_string()) }).unwrap();
        assert_eq!(xml, "<xml><a>1</a></xml>");
        assert!(read_xml(XmlInput { input: Some("/definitely/not/here.xml".to_string()) }).is_err());
    }
}
