use hex_literal::hex;
use rand::Rng;
use vite_devkit::abi::{AbiError, SolidityType, Value, WORD};
use vite_devkit::{Address, AddressType, Gid, TokenId, I256, U256};

fn ty(name: &str) -> SolidityType {
    name.parse().unwrap()
}

fn assert_roundtrip(ty: &SolidityType, value: Value) {
    let encoded = ty.encode(&value).unwrap();
    assert_eq!(encoded.len() % WORD, 0, "{ty} is not word aligned");
    if !ty.is_dynamic() {
        assert_eq!(encoded.len(), ty.fixed_size(), "{ty} has wrong static size");
    }
    assert_eq!(ty.decode(&encoded, 0).unwrap(), value, "{ty} roundtrip");
}

#[test]
fn test_type_names() {
    let names = [
        ("uint", "uint256"),
        ("int", "int256"),
        ("uint8", "uint8"),
        ("int64", "int64"),
        ("bytes", "bytes"),
        ("bytes32", "bytes32"),
        ("tokenId", "tokenId"),
        ("gid", "gid"),
        ("address[3]", "address[3]"),
        ("uint[][2]", "uint256[][2]"),
        ("string[]", "string[]"),
        ("function", "function"),
    ];
    names.into_iter().for_each(|(name, canonical)| {
        assert_eq!(ty(name).to_string(), canonical);
    });
}

#[test]
fn test_unknown_types() {
    [
        "uint7",
        "int264",
        "bytes0",
        "bytes33",
        "address[0]",
        "foo[]",
        "tuple",
        "uint[",
        "",
        "uint+8",
        "bytes+3",
        "uint256[+3]",
        "uint256[ 3]",
        "uint256[1000000000000000000]",
        "uint8[4294967296][4294967296]",
    ]
    .into_iter()
        .for_each(|name| {
            assert!(
                matches!(name.parse::<SolidityType>(), Err(AbiError::UnknownType(ref n)) if n == name),
                "{name} must be rejected"
            );
        });
}

#[test]
fn test_dynamic_and_size() {
    assert!(!ty("uint256").is_dynamic());
    assert!(!ty("address[3]").is_dynamic());
    assert!(ty("bytes").is_dynamic());
    assert!(ty("string[2]").is_dynamic());
    assert!(ty("uint8[]").is_dynamic());

    assert_eq!(ty("address[3]").fixed_size(), 96);
    assert_eq!(ty("uint8[2][3]").fixed_size(), 192);
    assert_eq!(ty("string[2]").fixed_size(), WORD);
    assert_eq!(ty("bytes").fixed_size(), WORD);
}

#[test]
fn test_random_roundtrips() {
    let mut rng = rand::thread_rng();
    for _ in 0..32 {
        assert_roundtrip(&ty("uint256"), Value::Uint(U256::from_be_bytes(rng.gen())));
        assert_roundtrip(&ty("int256"), Value::Int(I256::from_be_bytes(rng.gen())));
        assert_roundtrip(&ty("uint64"), Value::from(rng.gen::<u64>()));
        assert_roundtrip(&ty("int64"), Value::from(rng.gen::<i64>()));
        assert_roundtrip(&ty("bool"), Value::Bool(rng.gen()));
        assert_roundtrip(&ty("bytes32"), Value::FixedBytes(rng.gen::<[u8; 32]>().to_vec()));
        assert_roundtrip(&ty("bytes7"), Value::FixedBytes(rng.gen::<[u8; 7]>().to_vec()));
        assert_roundtrip(&ty("function"), Value::FixedBytes(rng.gen::<[u8; 24]>().to_vec()));
        assert_roundtrip(
            &ty("address"),
            Value::Address(Address::new(rng.gen(), AddressType::Contract)),
        );
        assert_roundtrip(&ty("tokenId"), Value::TokenId(TokenId::from(rng.gen::<[u8; 10]>())));
        assert_roundtrip(&ty("gid"), Value::Gid(Gid::from(rng.gen::<[u8; 10]>())));

        let len = rng.gen_range(0..100);
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        assert_roundtrip(&ty("bytes"), Value::Bytes(bytes));
        let text: String = (0..len).map(|_| rng.gen::<char>()).collect();
        assert_roundtrip(&ty("string"), Value::String(text));

        let items = (0..rng.gen_range(0..8))
            .map(|_| Value::from(rng.gen::<u32>()))
            .collect::<Vec<_>>();
        assert_roundtrip(&ty("uint32[]"), Value::Array(items));
    }
}

#[test]
fn test_array_roundtrips() {
    assert_roundtrip(
        &ty("bool[3]"),
        Value::Array(vec![true.into(), false.into(), true.into()]),
    );
    assert_roundtrip(
        &ty("string[2]"),
        Value::Array(vec!["vite".into(), "".into()]),
    );
    assert_roundtrip(
        &ty("bytes[]"),
        Value::Array(vec![vec![1u8, 2].into(), vec![0u8; 40].into()]),
    );
    assert_roundtrip(
        &ty("uint8[2][]"),
        Value::Array(vec![
            Value::Array(vec![1u8.into(), 2u8.into()]),
            Value::Array(vec![3u8.into(), 4u8.into()]),
        ]),
    );
    assert_roundtrip(
        &ty("string[][]"),
        Value::Array(vec![
            Value::Array(vec!["a".into()]),
            Value::Array(vec![]),
            Value::Array(vec!["b".into(), "c".into()]),
        ]),
    );
}

#[test]
fn test_nested_dynamic_array_layout() {
    let value = Value::Array(vec![
        Value::Array(vec![1u8.into()]),
        Value::Array(vec![2u8.into(), 3u8.into()]),
    ]);
    let encoded = ty("uint256[][]").encode(&value).unwrap();
    // Inner pointers are relative to the word after the outer length.
    let expected = hex!(
        "0000000000000000000000000000000000000000000000000000000000000002"
        "0000000000000000000000000000000000000000000000000000000000000040"
        "0000000000000000000000000000000000000000000000000000000000000080"
        "0000000000000000000000000000000000000000000000000000000000000001"
        "0000000000000000000000000000000000000000000000000000000000000001"
        "0000000000000000000000000000000000000000000000000000000000000002"
        "0000000000000000000000000000000000000000000000000000000000000002"
        "0000000000000000000000000000000000000000000000000000000000000003"
    );
    assert_eq!(encoded, expected.to_vec());
    assert_eq!(ty("uint256[][]").decode(&encoded, 0).unwrap(), value);
}

#[test]
fn test_word_placement() {
    let address: Address = "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87a"
        .parse()
        .unwrap();
    assert_eq!(
        ty("address").encode(&address.into()).unwrap(),
        hex!("0000000000000000000000ab24ef68b84e642c0ddca06beec81c9acb1977bb00").to_vec()
    );

    let token: TokenId = "tti_5649544520544f4b454e6e40".parse().unwrap();
    assert_eq!(
        ty("tokenId").encode(&token.into()).unwrap(),
        hex!("000000000000000000000000000000000000000000005649544520544f4b454e").to_vec()
    );

    let gid: Gid = "00000000000000000001".parse().unwrap();
    assert_eq!(
        ty("gid").encode(&gid.into()).unwrap(),
        hex!("0000000000000000000100000000000000000000000000000000000000000000").to_vec()
    );

    assert_eq!(
        ty("bytes2").encode(&Value::FixedBytes(vec![0xab, 0xcd])).unwrap(),
        hex!("abcd000000000000000000000000000000000000000000000000000000000000").to_vec()
    );

    assert_eq!(
        ty("int8").encode(&Value::from(-1i8)).unwrap(),
        vec![0xff; 32]
    );
}

#[test]
fn test_string_layout() {
    assert_eq!(
        ty("string").encode(&"ab".into()).unwrap(),
        hex!(
            "0000000000000000000000000000000000000000000000000000000000000002"
            "6162000000000000000000000000000000000000000000000000000000000000"
        )
        .to_vec()
    );
    assert_eq!(ty("bytes").encode(&Value::Bytes(vec![])).unwrap(), vec![0; 32]);
}

#[test]
fn test_coercions() {
    let uint = ty("uint256");
    let expected = uint.encode(&Value::from(123u8)).unwrap();
    assert_eq!(uint.encode(&"123".into()).unwrap(), expected);
    assert_eq!(uint.encode(&"0x7b".into()).unwrap(), expected);
    assert_eq!(uint.encode(&"7b".into()).unwrap(), expected);
    assert_eq!(uint.encode(&Value::from(123i64)).unwrap(), expected);

    assert_eq!(
        ty("int16").encode(&"-300".into()).unwrap(),
        ty("int16").encode(&Value::from(-300i16)).unwrap()
    );
    assert_eq!(
        ty("bool").encode(&"true".into()).unwrap(),
        ty("bool").encode(&true.into()).unwrap()
    );
    assert_eq!(
        ty("bytes").encode(&"0xdead".into()).unwrap(),
        ty("bytes").encode(&Value::Bytes(vec![0xde, 0xad])).unwrap()
    );
    assert_eq!(
        ty("bytes").encode(&"hi".into()).unwrap(),
        ty("bytes").encode(&Value::Bytes(b"hi".to_vec())).unwrap()
    );
    assert_eq!(
        ty("bytes4").encode(&"0a0b".into()).unwrap(),
        ty("bytes4").encode(&Value::FixedBytes(vec![0x0a, 0x0b])).unwrap()
    );
    assert_eq!(
        ty("address")
            .encode(&"vite_ab24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87a".into())
            .unwrap()[11..31],
        hex!("ab24ef68b84e642c0ddca06beec81c9acb1977bb")
    );
}

#[test]
fn test_encode_rejects_invalid_values() {
    let cases: Vec<(&str, Value)> = vec![
        ("uint8", 256u16.into()),
        ("uint256", (-1i8).into()),
        ("int8", 128u8.into()),
        ("int8", (-129i16).into()),
        ("uint256", "12z".into()),
        ("bool", "yes".into()),
        ("bool", 1u8.into()),
        ("bytes2", Value::FixedBytes(vec![1, 2, 3])),
        ("function", Value::FixedBytes(vec![0; 20])),
        ("address", "vite_00".into()),
        ("tokenId", Value::Bytes(vec![0; 9])),
        ("string", Value::Bytes(vec![0xff, 0xfe])),
        ("uint8[2]", Value::Array(vec![1u8.into()])),
        ("uint8[]", 1u8.into()),
    ];
    cases.into_iter().for_each(|(name, value)| {
        let err = ty(name).encode(&value).unwrap_err();
        assert!(
            matches!(err, AbiError::InvalidValue { ty: ref target, .. } if *target == ty(name)),
            "{name} must reject {value}"
        );
    });
}

#[test]
fn test_decode_errors() {
    assert!(matches!(
        ty("uint256").decode(&[0; 31], 0).unwrap_err(),
        AbiError::OutOfRange {
            offset: 0,
            needed: 32,
            len: 31
        }
    ));

    // Declared length runs past the end of data.
    let mut data = vec![0u8; 64];
    data[31] = 100;
    assert!(matches!(
        ty("bytes").decode(&data, 0).unwrap_err(),
        AbiError::OutOfRange { offset: 32, needed: 100, .. }
    ));

    // Array count larger than the available words.
    data[31] = 3;
    assert!(matches!(
        ty("uint256[]").decode(&data, 0).unwrap_err(),
        AbiError::OutOfRange { .. }
    ));

    let mut invalid_utf8 = vec![0u8; 64];
    invalid_utf8[31] = 2;
    invalid_utf8[32] = 0xff;
    invalid_utf8[33] = 0xfe;
    assert!(matches!(
        ty("string").decode(&invalid_utf8, 0).unwrap_err(),
        AbiError::InvalidData(_)
    ));

    let mut bad_address = [0u8; 32];
    bad_address[31] = 2;
    assert!(matches!(
        ty("address").decode(&bad_address, 0).unwrap_err(),
        AbiError::InvalidData(_)
    ));
}

#[test]
fn test_large_static_array() {
    // Addressable but far larger than any real value.
    let large = ty("uint256[1125899906842624]");
    assert_eq!(large.fixed_size(), 1 << 55);
    assert!(matches!(
        large.encode(&Value::Array(vec![1u8.into()])).unwrap_err(),
        AbiError::InvalidValue { .. }
    ));
    assert!(matches!(
        large.decode(&[0; 32], 0).unwrap_err(),
        AbiError::OutOfRange { offset: 32, .. }
    ));
    // Dynamic elements are stored by pointer, so any count is addressable.
    assert_eq!(ty("string[1000000000000000000]").fixed_size(), WORD);
}
