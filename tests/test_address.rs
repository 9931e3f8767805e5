use rustc_hex::FromHex;
use vite_devkit::{Address, AddressType, Gid, IdentifierError, TokenId};

fn decode_hex(hex: &str) -> Vec<u8> {
    hex.from_hex().unwrap()
}

const USER: &str = "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87a";
const CONTRACT: &str = "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bb2825d85785";
const TOKEN: &str = "tti_5649544520544f4b454e6e40";

#[test]
fn test_user_address_roundtrip() {
    let address: Address = USER.parse().unwrap();
    assert_eq!(address.kind(), AddressType::User);
    assert_eq!(
        address.core(),
        &decode_hex("ab24ef68b84e642c0ddca06beec81c9acb1977bb")[..]
    );
    assert_eq!(address[20], 0);
    assert_eq!(address.to_string(), USER);
}

#[test]
fn test_contract_address_roundtrip() {
    let address: Address = CONTRACT.parse().unwrap();
    assert!(address.is_contract());
    assert_eq!(address[20], 1);
    assert_eq!(address.to_string(), CONTRACT);

    let user: Address = USER.parse().unwrap();
    assert_eq!(user.core(), address.core());
    assert_ne!(user, address);
}

#[test]
fn test_address_from_raw() {
    let raw = decode_hex("ab24ef68b84e642c0ddca06beec81c9acb1977bb00");
    let address = Address::from_slice(&raw).unwrap();
    assert_eq!(address.to_string(), USER);
    assert_eq!(
        Address::from_slice(&raw[..20]).unwrap_err(),
        IdentifierError::InvalidLength {
            expected: 21,
            got: 20
        }
    );
}

#[test]
fn test_address_parse_errors() {
    assert_eq!(
        "0xab24ef68b84e642c0ddca06beec81c9acb1977bb"
            .parse::<Address>()
            .unwrap_err(),
        IdentifierError::InvalidPrefix { expected: "vite_" }
    );
    assert!(matches!(
        "vite_ab24".parse::<Address>().unwrap_err(),
        IdentifierError::InvalidLength { expected: 50, .. }
    ));
    assert_eq!(
        "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87b"
            .parse::<Address>()
            .unwrap_err(),
        IdentifierError::InvalidChecksum
    );
    assert!(matches!(
        "vite_zz24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87a"
            .parse::<Address>()
            .unwrap_err(),
        IdentifierError::InvalidHex(_)
    ));
}

#[test]
fn test_token_id() {
    let token: TokenId = TOKEN.parse().unwrap();
    assert_eq!(&token[..], b"VITE TOKEN");
    assert_eq!(token.to_string(), TOKEN);
    assert_eq!(
        "tti_5649544520544f4b454e6e41"
            .parse::<TokenId>()
            .unwrap_err(),
        IdentifierError::InvalidChecksum
    );
    assert_eq!(
        "vite_5649544520544f4b454e6e40"
            .parse::<TokenId>()
            .unwrap_err(),
        IdentifierError::InvalidPrefix { expected: "tti_" }
    );
    assert_eq!(TokenId::from(*b"VITE TOKEN"), token);
}

#[test]
fn test_gid() {
    let gid: Gid = "00000000000000000001".parse().unwrap();
    assert_eq!(gid[9], 1);
    assert_eq!(gid.to_string(), "00000000000000000001");
    assert_eq!(Gid::from([0; 10]).to_string(), "00000000000000000000");
    assert!(matches!(
        "0001".parse::<Gid>().unwrap_err(),
        IdentifierError::InvalidLength { expected: 20, .. }
    ));
}

#[test]
fn test_serde_as_strings() {
    let address: Address = USER.parse().unwrap();
    let json = serde_json::to_string(&address).unwrap();
    assert_eq!(json, format!("\"{USER}\""));
    assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);

    let token: TokenId = serde_json::from_str(&format!("\"{TOKEN}\"")).unwrap();
    assert_eq!(token.to_string(), TOKEN);
    assert!(serde_json::from_str::<TokenId>("\"tti_00\"").is_err());
}
