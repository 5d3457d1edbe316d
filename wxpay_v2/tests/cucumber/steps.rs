use cucumber::{gherkin::Step, given, then, when};
use wxpay_v2::{
    signature::{generate_signature, verify_signature},
    xml_codec,
    PayError,
    RefundResponse,
    SignAlgorithm,
    TradeType,
    UnifiedOrderResponse,
    Value,
    WireRequest,
};

use crate::cucumber::world::{order_template, WireWorld};

//-------------------------------------------    signatures     ------------------------------------------------------
#[given(expr = "the API key {string}")]
fn api_key(world: &mut WireWorld, key: String) {
    world.key = key;
}

#[given("the parameters")]
fn parameters(world: &mut WireWorld, step: &Step) {
    let table = step.table.as_ref().expect("The parameters step needs a table");
    for row in table.rows.iter().skip(1) {
        world.parameters.insert(row[0].as_str(), row[1].as_str());
    }
}

#[given(expr = "the parameter {word} is blank")]
fn blank_parameter(world: &mut WireWorld, key: String) {
    world.parameters.insert(key, "");
}

#[when(expr = "I sign the parameters with {word}")]
fn sign_parameters(world: &mut WireWorld, algorithm: String) {
    let algorithm = algorithm.parse::<SignAlgorithm>().expect("Unknown algorithm");
    world.signature = generate_signature(&world.parameters, world.key(), algorithm).expect("Signing failed");
}

#[when("I attach the signature")]
fn attach_signature(world: &mut WireWorld) {
    let signature = world.signature.clone();
    world.parameters.insert("sign", signature);
}

#[when(expr = "I change the parameter {word} to {string}")]
fn change_parameter(world: &mut WireWorld, key: String, value: String) {
    world.parameters.insert(key, value);
}

#[then(expr = "the signature is {word}")]
fn signature_is(world: &mut WireWorld, expected: String) {
    assert_eq!(world.signature, expected);
}

#[then(expr = "the parameters verify with {word}")]
fn parameters_verify(world: &mut WireWorld, algorithm: String) {
    let algorithm = algorithm.parse::<SignAlgorithm>().expect("Unknown algorithm");
    assert!(verify_signature(&world.parameters, world.key(), algorithm).unwrap());
}

#[then(expr = "the parameters do not verify with {word}")]
fn parameters_do_not_verify(world: &mut WireWorld, algorithm: String) {
    let algorithm = algorithm.parse::<SignAlgorithm>().expect("Unknown algorithm");
    assert!(!verify_signature(&world.parameters, world.key(), algorithm).unwrap());
}

//-------------------------------------------     requests      ------------------------------------------------------
#[given(expr = "a unified order for {int} fen with trade type {word}")]
fn unified_order(world: &mut WireWorld, total_fee: i64, trade_type: String) {
    let trade_type = trade_type.parse::<TradeType>().expect("Unknown trade type");
    world.order = Some(order_template(total_fee, trade_type));
}

#[given(expr = "the order has product id {word}")]
fn order_product_id(world: &mut WireWorld, product_id: String) {
    let order = world.order.take().expect("No order has been started");
    world.order = Some(order.product_id(product_id));
}

#[given(expr = "the order has open id {word}")]
fn order_open_id(world: &mut WireWorld, open_id: String) {
    let order = world.order.take().expect("No order has been started");
    world.order = Some(order.open_id(open_id));
}

#[when("I build the order")]
fn build_order(world: &mut WireWorld) {
    let order = world.order.clone().expect("No order has been started");
    world.built = Some(order.build());
}

#[then(expr = "the build fails with {string}")]
fn build_fails(world: &mut WireWorld, message: String) {
    match world.built.as_ref().expect("The order has not been built") {
        Err(PayError::ValidationError(msg)) => assert_eq!(msg, &message),
        other => panic!("Expected a validation error, got {other:?}"),
    }
}

#[then(expr = "the signed order XML contains {string}")]
fn signed_order_contains(world: &mut WireWorld, fragment: String) {
    let request = world.built.clone().expect("The order has not been built").expect("The order is not valid");
    let signed = request.sign(world.key(), SignAlgorithm::Md5).unwrap();
    let xml = signed.to_xml();
    assert!(xml.contains(&fragment), "{fragment} not found in {xml}");
    let decoded = xml_codec::decode(&xml).unwrap();
    assert!(verify_signature(&decoded, world.key(), SignAlgorithm::Md5).unwrap());
}

//-------------------------------------------      replies      ------------------------------------------------------
#[when("the gateway replies to the unified order with")]
fn unified_order_reply(world: &mut WireWorld, step: &Step) {
    let xml = step.docstring.as_ref().expect("The reply step needs a docstring");
    world.order_reply = Some(UnifiedOrderResponse::from_xml(xml.trim()).expect("Could not parse the reply"));
}

#[when("the gateway replies to the refund with")]
fn refund_reply(world: &mut WireWorld, step: &Step) {
    let xml = step.docstring.as_ref().expect("The reply step needs a docstring");
    world.refund_reply = Some(RefundResponse::from_xml(xml.trim()).expect("Could not parse the reply"));
}

#[when(expr = "the gateway sends a signed unified order reply with prepay id {word}")]
fn signed_unified_order_reply(world: &mut WireWorld, prepay_id: String) {
    let fields = [
        ("return_code", "SUCCESS"),
        ("result_code", "SUCCESS"),
        ("appid", "wx2421b1c4370ec43b"),
        ("mch_id", "10000100"),
        ("nonce_str", "IITRi8Iabbblz1Jc"),
        ("trade_type", "JSAPI"),
        ("prepay_id", prepay_id.as_str()),
    ]
    .into_iter()
    .collect();
    let signed = wxpay_v2::signature::sign_parameters(fields, world.key(), SignAlgorithm::Md5).unwrap();
    let xml = xml_codec::encode(&signed, xml_codec::ROOT_ELEMENT);
    world.order_reply = Some(UnifiedOrderResponse::from_xml(&xml).unwrap());
}

#[then(expr = "the order reply is a failure with code {word} and message {string}")]
fn order_failure(world: &mut WireWorld, code: String, message: String) {
    let reply = world.order_reply();
    assert!(!reply.is_success());
    assert_eq!(reply.error_code(), code);
    assert_eq!(reply.error_message(), message);
}

#[then(expr = "the refund reply is a failure with code {word} and message {string}")]
fn refund_failure(world: &mut WireWorld, code: String, message: String) {
    let reply = world.refund_reply();
    assert!(!reply.is_success());
    assert_eq!(reply.error_code(), code);
    assert_eq!(reply.error_message(), message);
}

#[then("the prepay id is empty")]
fn prepay_id_empty(world: &mut WireWorld) {
    assert_eq!(world.order_reply().prepay_id(), "");
}

#[then("the order reply verifies")]
fn order_reply_verifies(world: &mut WireWorld) {
    assert!(world.order_reply().verify_signature(world.key(), SignAlgorithm::Md5).unwrap());
}

#[then(expr = "the JSAPI pay parameters carry the package {string}")]
fn jsapi_package(world: &mut WireWorld, package: String) {
    let params = world.order_reply().generate_jsapi_pay_params(world.key(), SignAlgorithm::Md5).unwrap();
    assert_eq!(params.package, package);
    assert_eq!(params.sign_type, "MD5");
    assert_eq!(params.pay_sign.len(), 32);
}

#[then("no pay parameters can be generated")]
fn no_pay_params(world: &mut WireWorld) {
    let err = world.order_reply().generate_app_pay_params(world.key(), SignAlgorithm::Md5).unwrap_err();
    assert!(matches!(err, PayError::ConfigurationError(_)));
}

//-------------------------------------------     decoding      ------------------------------------------------------
#[when(expr = "I decode {string}")]
fn decode(world: &mut WireWorld, xml: String) {
    world.decoded = Some(xml_codec::decode(&xml).expect("Could not decode"));
}

#[then(expr = "{word} decodes to the list {string}")]
fn decodes_to_list(world: &mut WireWorld, key: String, items: String) {
    let decoded = world.decoded.as_ref().expect("Nothing has been decoded");
    let expected = items.split(',').map(|s| Value::from(s.trim())).collect::<Vec<_>>();
    assert_eq!(decoded.get(&key), Some(&Value::List(expected)));
}
