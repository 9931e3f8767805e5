//! Native values handed to and produced by the ABI codec.

use crate::address::{Address, Gid, TokenId};
use ethnum::{I256, U256};
use itertools::Itertools;
use rustc_hex::ToHex;
use std::fmt;

/// A value of any ABI type.
///
/// Encoding is lenient: a [`SolidityType`](super::SolidityType) accepts
/// several variants for the same type (for example a `uint256` can be encoded
/// from [`Value::Uint`], a non-negative [`Value::Int`] or a numeric
/// [`Value::String`]). Decoding always produces the canonical variant of the
/// type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `uint<N>`
    Uint(U256),
    /// `int<N>`
    Int(I256),
    /// `bytes<N>` and `function`
    FixedBytes(Vec<u8>),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
    /// `address`
    Address(Address),
    /// `tokenId`
    TokenId(TokenId),
    /// `gid`
    Gid(Gid),
    /// `T[k]` and `T[]`
    Array(Vec<Value>),
}

impl Value {
    pub fn as_uint(&self) -> Option<U256> {
        //! Unsigned integer payload, if this is a [`Value::Uint`].
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        //! Signed integer payload, if this is a [`Value::Int`].
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        //! Address payload, if this is a [`Value::Address`].
        match self {
            Self::Address(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        //! String payload, if this is a [`Value::String`].
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        //! Elements, if this is a [`Value::Array`].
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::FixedBytes(v) | Self::Bytes(v) => write!(f, "0x{}", v.to_hex::<String>()),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Address(v) => write!(f, "{v}"),
            Self::TokenId(v) => write!(f, "{v}"),
            Self::Gid(v) => write!(f, "{v}"),
            Self::Array(items) => write!(f, "[{}]", items.iter().join(", ")),
        }
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::Uint(U256::from(value))
                }
            }
        )+
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::Int(I256::from(value))
                }
            }
        )+
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128, U256);
impl_from_signed!(i8, i16, i32, i64, i128, I256);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<TokenId> for Value {
    fn from(value: TokenId) -> Self {
        Self::TokenId(value)
    }
}

impl From<Gid> for Value {
    fn from(value: Gid) -> Self {
        Self::Gid(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}
