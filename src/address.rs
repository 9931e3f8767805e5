//! Vite identifiers: account addresses, token ids and consensus group ids.
//!
//! All three are fixed-width byte strings with a canonical text form:
//!
//! | type        | raw width | text form                                         |
//! |-------------|-----------|---------------------------------------------------|
//! | [`Address`] | 21 bytes  | `vite_` + hex(20-byte core) + hex(5-byte checksum) |
//! | [`TokenId`] | 10 bytes  | `tti_` + hex(10 bytes) + hex(2-byte checksum)     |
//! | [`Gid`]     | 10 bytes  | hex(10 bytes)                                     |
//!
//! The last raw byte of an address is its type: `0x00` for user accounts and
//! `0x01` for contracts. A contract checksum is the bitwise complement of the
//! user checksum over the same core, so the text form alone tells them apart.

use blake2::{
    digest::consts::{U2, U5},
    Blake2b, Digest,
};
use rustc_hex::{FromHex, ToHex};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, ops::Deref, str::FromStr};

/// Errors that may occur while parsing or building an identifier.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum IdentifierError {
    /// Text form does not start with the expected prefix.
    #[error("expected `{expected}` prefix")]
    InvalidPrefix {
        /// Prefix for this identifier kind
        expected: &'static str,
    },
    /// Text or raw form has the wrong length.
    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Actual length
        got: usize,
    },
    /// Text form contains non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// Checksum does not match the identifier body.
    #[error("checksum mismatch")]
    InvalidChecksum,
    /// Address type byte is neither user (0) nor contract (1).
    #[error("invalid address type byte {0:#04x}")]
    InvalidType(u8),
}

fn parse_hex_body<const N: usize>(body: &str) -> Result<[u8; N], IdentifierError> {
    if body.len() != N * 2 {
        return Err(IdentifierError::InvalidLength {
            expected: N * 2,
            got: body.len(),
        });
    }
    let raw: Vec<u8> = body
        .from_hex()
        .map_err(|e| IdentifierError::InvalidHex(e.to_string()))?;
    let mut out = [0u8; N];
    out.copy_from_slice(&raw);
    Ok(out)
}

fn fixed_slice<const N: usize>(bytes: &[u8]) -> Result<[u8; N], IdentifierError> {
    bytes
        .try_into()
        .map_err(|_| IdentifierError::InvalidLength {
            expected: N,
            got: bytes.len(),
        })
}

/// Kind of account an [`Address`] points to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Externally owned account
    User = 0,
    /// Contract account
    Contract = 1,
}

/// Vite address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Address([u8; 21]);

impl Deref for Address {
    type Target = [u8; 21];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Address {
    /// Size of underlying array in bytes.
    pub const WIDTH: usize = 21;
    /// Size of the address core (without type byte).
    pub const CORE_WIDTH: usize = 20;
    /// Text prefix.
    pub const PREFIX: &'static str = "vite_";

    pub fn new(core: [u8; 20], kind: AddressType) -> Self {
        //! Build an address from its core and type.
        let mut raw = [0u8; 21];
        raw[..Self::CORE_WIDTH].copy_from_slice(&core);
        raw[Self::CORE_WIDTH] = kind as u8;
        Self(raw)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
        //! Build an address from its 21 raw bytes, validating the type byte.
        let raw = fixed_slice::<21>(bytes)?;
        match raw[Self::CORE_WIDTH] {
            0 | 1 => Ok(Self(raw)),
            other => Err(IdentifierError::InvalidType(other)),
        }
    }

    pub fn core(&self) -> &[u8] {
        //! Address body without the type byte.
        &self.0[..Self::CORE_WIDTH]
    }

    pub fn kind(&self) -> AddressType {
        //! Whether this address belongs to a user or a contract.
        if self.0[Self::CORE_WIDTH] == 1 {
            AddressType::Contract
        } else {
            AddressType::User
        }
    }

    pub fn is_contract(&self) -> bool {
        //! Shorthand for `kind() == AddressType::Contract`.
        self.kind() == AddressType::Contract
    }

    pub fn checksum(&self) -> [u8; 5] {
        //! Checksum used in the text form.
        let mut sum = [0u8; 5];
        sum.copy_from_slice(&Blake2b::<U5>::digest(self.core()));
        if self.is_contract() {
            sum.iter_mut().for_each(|b| *b = !*b);
        }
        sum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::PREFIX)?;
        f.write_str(&self.core().to_hex::<String>())?;
        f.write_str(&self.checksum().to_hex::<String>())
    }
}

impl FromStr for Address {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(Self::PREFIX).ok_or(IdentifierError::InvalidPrefix {
            expected: Self::PREFIX,
        })?;
        let raw = parse_hex_body::<25>(body)?;
        let mut core = [0u8; 20];
        core.copy_from_slice(&raw[..Self::CORE_WIDTH]);
        let checksum = &raw[Self::CORE_WIDTH..];

        [AddressType::User, AddressType::Contract]
            .into_iter()
            .map(|kind| Self::new(core, kind))
            .find(|candidate| candidate.checksum()[..] == *checksum)
            .ok_or(IdentifierError::InvalidChecksum)
    }
}

/// Vite token identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct TokenId([u8; 10]);

impl Deref for TokenId {
    type Target = [u8; 10];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; 10]> for TokenId {
    fn from(raw: [u8; 10]) -> Self {
        Self(raw)
    }
}

impl TokenId {
    /// Size of underlying array in bytes.
    pub const WIDTH: usize = 10;
    /// Text prefix.
    pub const PREFIX: &'static str = "tti_";

    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
        //! Build a token id from its 10 raw bytes.
        fixed_slice(bytes).map(Self)
    }

    pub fn checksum(&self) -> [u8; 2] {
        //! Checksum used in the text form.
        let mut sum = [0u8; 2];
        sum.copy_from_slice(&Blake2b::<U2>::digest(self.0));
        sum
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::PREFIX)?;
        f.write_str(&self.0.to_hex::<String>())?;
        f.write_str(&self.checksum().to_hex::<String>())
    }
}

impl FromStr for TokenId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(Self::PREFIX).ok_or(IdentifierError::InvalidPrefix {
            expected: Self::PREFIX,
        })?;
        let raw = parse_hex_body::<12>(body)?;
        let id = Self::from_slice(&raw[..Self::WIDTH])?;
        if id.checksum()[..] != raw[Self::WIDTH..] {
            return Err(IdentifierError::InvalidChecksum);
        }
        Ok(id)
    }
}

/// Consensus group identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Gid([u8; 10]);

impl Deref for Gid {
    type Target = [u8; 10];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; 10]> for Gid {
    fn from(raw: [u8; 10]) -> Self {
        Self(raw)
    }
}

impl Gid {
    /// Size of underlying array in bytes.
    pub const WIDTH: usize = 10;

    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
        //! Build a group id from its 10 raw bytes.
        fixed_slice(bytes).map(Self)
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex::<String>())
    }
}

impl FromStr for Gid {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_body(s).map(Self)
    }
}
