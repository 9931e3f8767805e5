//! Encoding and decoding contract calls, offchain queries and events.
//!
//! The ABI is loaded once from its JSON description; every member can then
//! be looked up by name, by the selector of incoming call data or by the
//! first topic of a log entry.

use rustc_hex::ToHex;
use vite_devkit::abi::{Abi, Signature, SolidityType, Value};
use vite_devkit::{Address, TokenId, H256, U256};

fn demo_abi() {
    let code = std::fs::read_to_string("data/token.abi").expect("Must exist");
    let token_abi: Abi = code.parse().expect("Should be loadable");

    let owner: Address = "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87a"
        .parse()
        .expect("Valid address");
    let receiver: Address = "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bb2825d85785"
        .parse()
        .expect("Valid address");
    let vite: TokenId = "tti_5649544520544f4b454e6e40"
        .parse()
        .expect("Valid token id");

    let transfer = token_abi
        .find_function_by_name("transfer")
        .expect("Exists");
    println!("Function signature: {}", transfer.format_signature());
    println!("Function selector: {:02x?}", transfer.encode_signature());

    let inputs = vec![receiver.into(), vite.into(), Value::from(10_000u64)];
    let encoded = transfer.encode(&inputs).expect("Should be encodable");
    println!(
        "Encoded data for transfer call: {}",
        encoded.to_hex::<String>()
    );

    // Incoming call data is dispatched by its selector.
    let called = token_abi
        .find_function_by_data(&encoded)
        .expect("Selector matches");
    assert_eq!(called.name, "transfer");
    let decoded = token_abi.decode_function(&encoded).expect("Should parse");
    assert_eq!(
        decoded,
        vec![
            Value::Address(receiver),
            Value::TokenId(vite),
            Value::Uint(U256::new(10_000)),
        ]
    );

    let query = token_abi
        .encode_offchain("balanceOf", &[owner.into(), vite.into()])
        .expect("Should be encodable");
    println!("Offchain query: {}", query.to_hex::<String>());
    let balance = token_abi
        .decode_offchain_output("balanceOf", &[0x01; 32])
        .expect("Should parse");
    assert_eq!(
        balance,
        vec![Value::Uint(U256::from_be_bytes([0x01u8; 32]))]
    );

    let event = token_abi.find_event_by_name("Transfer").expect("Exists");
    let address_topic = |address: Address| {
        let word = SolidityType::Address
            .encode(&address.into())
            .expect("Should be encodable");
        H256::from_slice(&word)
    };
    let topics = [
        event.encode_signature(),
        address_topic(owner),
        address_topic(receiver),
    ];
    let data = SolidityType::Uint(256)
        .encode(&Value::from(10_000u64))
        .expect("Should be encodable");
    let log = token_abi.decode_event(&data, &topics).expect("Should parse");
    println!(
        "{} log: {}",
        event.name,
        log.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    assert_eq!(log[0], Value::Address(owner));
}

#[test]
fn test_run() {
    demo_abi();
}

fn main() {
    demo_abi();
}
