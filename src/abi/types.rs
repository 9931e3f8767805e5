//! ABI types and their binary layout.
//!
//! Every value is encoded as a sequence of 32-byte words. Static types are
//! stored in place; dynamic types (`bytes`, `string`, `T[]`, and `T[k]` with
//! dynamic `T`) are stored by reference: the containing tuple holds a pointer
//! word with the offset of the payload relative to the start of the tuple,
//! and the payload itself follows all in-place words.
//!
//! ```txt
//! f(uint256 a, string b, bool c) with (1, "ab", true)
//!
//! 0x00  0000…0001   a
//! 0x20  0000…0060   pointer to b
//! 0x40  0000…0001   c
//! 0x60  0000…0002   len(b)
//! 0x80  6162…0000   b, right-padded
//! ```

use super::{AbiError, AbiResult, Value};
use crate::address::{Address, Gid, TokenId};
use crate::utils::decode_hex;
use ethnum::{I256, U256};
use std::{fmt, str::FromStr};

/// Size of a single ABI word.
pub const WORD: usize = 32;

/// A Solidity-like ABI type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SolidityType {
    /// `bool`
    Bool,
    /// `int<bits>`
    Int(usize),
    /// `uint<bits>`
    Uint(usize),
    /// `bytes<n>`, `1 <= n <= 32`
    FixedBytes(usize),
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `address`
    Address,
    /// `tokenId`
    TokenId,
    /// `gid`
    Gid,
    /// `function` (24 raw bytes)
    Function,
    /// `T[k]`
    StaticArray(Box<SolidityType>, usize),
    /// `T[]`
    DynamicArray(Box<SolidityType>),
}

impl fmt::Display for SolidityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::FixedBytes(size) => write!(f, "bytes{size}"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Address => f.write_str("address"),
            Self::TokenId => f.write_str("tokenId"),
            Self::Gid => f.write_str("gid"),
            Self::Function => f.write_str("function"),
            Self::StaticArray(elem, size) => write!(f, "{elem}[{size}]"),
            Self::DynamicArray(elem) => write!(f, "{elem}[]"),
        }
    }
}

/// Plain decimal digits only: no sign, no whitespace.
fn parse_digits(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_bits(digits: &str) -> Option<usize> {
    if digits.is_empty() {
        return Some(256);
    }
    let bits = parse_digits(digits)?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

impl FromStr for SolidityType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || AbiError::UnknownType(s.to_owned());

        if let Some(head) = s.strip_suffix(']') {
            let (elem, size) = head.rsplit_once('[').ok_or_else(unknown)?;
            let elem = Box::new(elem.parse::<Self>().map_err(|_| unknown())?);
            return if size.is_empty() {
                Ok(Self::DynamicArray(elem))
            } else {
                let size = parse_digits(size).filter(|&size| size > 0).ok_or_else(unknown)?;
                // Static layouts must stay addressable.
                if !elem.is_dynamic() {
                    elem.fixed_size().checked_mul(size).ok_or_else(unknown)?;
                }
                Ok(Self::StaticArray(elem, size))
            };
        }

        let parsed = match s {
            "bool" => Self::Bool,
            "bytes" => Self::Bytes,
            "string" => Self::String,
            "address" => Self::Address,
            "tokenId" => Self::TokenId,
            "gid" => Self::Gid,
            "function" => Self::Function,
            _ => {
                if let Some(digits) = s.strip_prefix("uint") {
                    Self::Uint(parse_bits(digits).ok_or_else(unknown)?)
                } else if let Some(digits) = s.strip_prefix("int") {
                    Self::Int(parse_bits(digits).ok_or_else(unknown)?)
                } else if let Some(digits) = s.strip_prefix("bytes") {
                    match parse_digits(digits) {
                        Some(size) if (1..=WORD).contains(&size) => Self::FixedBytes(size),
                        _ => return Err(unknown()),
                    }
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(parsed)
    }
}

impl SolidityType {
    pub fn is_dynamic(&self) -> bool {
        //! Whether values of this type are stored by reference.
        match self {
            Self::Bytes | Self::String | Self::DynamicArray(_) => true,
            Self::StaticArray(elem, _) => elem.is_dynamic(),
            _ => false,
        }
    }

    pub fn fixed_size(&self) -> usize {
        //! Number of bytes this type occupies in place within a tuple.
        //!
        //! For dynamic types this is the size of the pointer word.
        match self {
            Self::StaticArray(elem, size) if !elem.is_dynamic() => elem.fixed_size() * size,
            _ => WORD,
        }
    }

    pub fn encode(&self, value: &Value) -> AbiResult<Vec<u8>> {
        //! Encode a single value of this type.
        //!
        //! The result length is a multiple of 32 bytes; for static types
        //! it is exactly [`SolidityType::fixed_size`].
        let mismatch = || AbiError::InvalidValue {
            ty: self.clone(),
            value: value.to_string(),
        };

        let encoded = match self {
            Self::Bool => {
                let flag = match value {
                    Value::Bool(flag) => *flag,
                    Value::String(text) => text.parse().map_err(|_| mismatch())?,
                    _ => return Err(mismatch()),
                };
                encode_word(U256::from(flag as u8).to_be_bytes())
            }
            Self::Uint(bits) => {
                let number = to_u256(value).ok_or_else(mismatch)?;
                if number.leading_zeros() < (256 - *bits) as u32 {
                    return Err(mismatch());
                }
                encode_word(number.to_be_bytes())
            }
            Self::Int(bits) => {
                let number = to_i256(value).ok_or_else(mismatch)?;
                let high = number >> (*bits as u32 - 1);
                if high != I256::ZERO && high != I256::MINUS_ONE {
                    return Err(mismatch());
                }
                encode_word(number.to_be_bytes())
            }
            Self::FixedBytes(size) => match value {
                Value::Uint(number) => encode_word(number.to_be_bytes()),
                Value::Int(number) => encode_word(number.to_be_bytes()),
                _ => {
                    let bytes = to_bytes(value, true).ok_or_else(mismatch)?;
                    if bytes.len() > *size {
                        return Err(mismatch());
                    }
                    encode_left(&bytes)
                }
            },
            Self::Function => {
                let bytes = to_bytes(value, false).ok_or_else(mismatch)?;
                if bytes.len() != 24 {
                    return Err(mismatch());
                }
                encode_left(&bytes)
            }
            Self::Address => {
                let address = match value {
                    Value::Address(address) => *address,
                    Value::String(text) => text.parse().map_err(|_| mismatch())?,
                    Value::Bytes(raw) | Value::FixedBytes(raw) => {
                        Address::from_slice(raw).map_err(|_| mismatch())?
                    }
                    _ => return Err(mismatch()),
                };
                encode_right(&address[..])
            }
            Self::TokenId => {
                let token = match value {
                    Value::TokenId(token) => *token,
                    Value::String(text) => text.parse().map_err(|_| mismatch())?,
                    Value::Bytes(raw) | Value::FixedBytes(raw) => {
                        TokenId::from_slice(raw).map_err(|_| mismatch())?
                    }
                    _ => return Err(mismatch()),
                };
                encode_right(&token[..])
            }
            Self::Gid => {
                let gid = match value {
                    Value::Gid(gid) => *gid,
                    Value::String(text) => text.parse().map_err(|_| mismatch())?,
                    Value::Bytes(raw) | Value::FixedBytes(raw) => {
                        Gid::from_slice(raw).map_err(|_| mismatch())?
                    }
                    _ => return Err(mismatch()),
                };
                encode_left(&gid[..])
            }
            Self::Bytes => encode_dynamic_bytes(&to_bytes(value, false).ok_or_else(mismatch)?),
            Self::String => {
                let text = match value {
                    Value::String(text) => text.as_bytes(),
                    Value::Bytes(raw) => std::str::from_utf8(raw).map_err(|_| mismatch())?.as_bytes(),
                    _ => return Err(mismatch()),
                };
                encode_dynamic_bytes(text)
            }
            Self::StaticArray(elem, size) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                if items.len() != *size {
                    return Err(mismatch());
                }
                encode_tuple(items.iter().map(|item| (&**elem, item)))?
            }
            Self::DynamicArray(elem) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                let mut out = encode_usize(items.len());
                out.extend(encode_tuple(items.iter().map(|item| (&**elem, item)))?);
                out
            }
        };
        Ok(encoded)
    }

    pub fn decode(&self, data: &[u8], offset: usize) -> AbiResult<Value> {
        //! Decode a value of this type starting at `offset`.
        //!
        //! For dynamic types `offset` must point at the payload (the
        //! length word for `bytes`, `string` and `T[]`), not at the pointer.
        let value = match self {
            Self::Bool => Value::Bool(read_word(data, offset)?.iter().any(|&b| b != 0)),
            Self::Uint(_) => Value::Uint(U256::from_be_bytes(*read_word(data, offset)?)),
            Self::Int(_) => Value::Int(I256::from_be_bytes(*read_word(data, offset)?)),
            Self::FixedBytes(size) => Value::FixedBytes(read_word(data, offset)?[..*size].to_vec()),
            Self::Function => Value::FixedBytes(read_word(data, offset)?[..24].to_vec()),
            Self::Address => {
                let word = read_word(data, offset)?;
                Value::Address(
                    Address::from_slice(&word[WORD - Address::WIDTH..])
                        .map_err(|e| AbiError::InvalidData(e.to_string()))?,
                )
            }
            Self::TokenId => {
                let word = read_word(data, offset)?;
                Value::TokenId(
                    TokenId::from_slice(&word[WORD - TokenId::WIDTH..])
                        .map_err(|e| AbiError::InvalidData(e.to_string()))?,
                )
            }
            Self::Gid => {
                let word = read_word(data, offset)?;
                Value::Gid(
                    Gid::from_slice(&word[..Gid::WIDTH])
                        .map_err(|e| AbiError::InvalidData(e.to_string()))?,
                )
            }
            Self::Bytes => Value::Bytes(read_dynamic_bytes(data, offset)?.to_vec()),
            Self::String => {
                let raw = read_dynamic_bytes(data, offset)?;
                Value::String(
                    String::from_utf8(raw.to_vec())
                        .map_err(|e| AbiError::InvalidData(e.to_string()))?,
                )
            }
            Self::StaticArray(elem, size) => {
                Value::Array(decode_tuple(std::iter::repeat(&**elem).take(*size), data, offset)?)
            }
            Self::DynamicArray(elem) => {
                let count = read_usize(data, offset)?;
                let start = checked_offset(offset, WORD)?;
                let needed = count
                    .checked_mul(elem.fixed_size())
                    .ok_or_else(|| AbiError::InvalidData(format!("array length {count} is too large")))?;
                ensure_available(data, start, needed)?;
                Value::Array(decode_tuple(std::iter::repeat(&**elem).take(count), data, start)?)
            }
        };
        Ok(value)
    }
}

/// Encode a sequence of typed values with the head/tail tuple layout.
///
/// Pointers to dynamic payloads are relative to the start of the tuple.
pub(crate) fn encode_tuple<'a, I>(items: I) -> AbiResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a SolidityType, &'a Value)>,
    I::IntoIter: Clone,
{
    let items = items.into_iter();
    let head_size = items
        .clone()
        .try_fold(0usize, |acc, (ty, _)| acc.checked_add(ty.fixed_size()))
        .ok_or_else(|| AbiError::InvalidData("tuple head size overflows".into()))?;
    let mut head = vec![];
    let mut tail = vec![];

    for (ty, value) in items {
        let encoded = ty.encode(value)?;
        if ty.is_dynamic() {
            head.extend(encode_usize(head_size + tail.len()));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }
    head.extend(tail);
    Ok(head)
}

/// Decode a tuple that starts at `start`.
///
/// Each element advances the cursor by its [`SolidityType::fixed_size`];
/// dynamic elements are read through a pointer relative to `start`.
pub(crate) fn decode_tuple<'a, I>(types: I, data: &[u8], start: usize) -> AbiResult<Vec<Value>>
where
    I: IntoIterator<Item = &'a SolidityType>,
{
    let mut offset = start;
    types
        .into_iter()
        .map(|ty| {
            let value = if ty.is_dynamic() {
                let pointer = read_usize(data, offset)?;
                ty.decode(data, checked_offset(start, pointer)?)?
            } else {
                ty.decode(data, offset)?
            };
            offset = checked_offset(offset, ty.fixed_size())?;
            Ok(value)
        })
        .collect()
}

fn encode_word(word: [u8; WORD]) -> Vec<u8> {
    word.to_vec()
}

fn encode_usize(value: usize) -> Vec<u8> {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word.to_vec()
}

/// Place bytes at the start of a zeroed word.
fn encode_left(bytes: &[u8]) -> Vec<u8> {
    let mut word = [0u8; WORD];
    word[..bytes.len()].copy_from_slice(bytes);
    word.to_vec()
}

/// Place bytes at the end of a zeroed word.
fn encode_right(bytes: &[u8]) -> Vec<u8> {
    let mut word = [0u8; WORD];
    word[WORD - bytes.len()..].copy_from_slice(bytes);
    word.to_vec()
}

fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = encode_usize(bytes.len());
    out.extend_from_slice(bytes);
    out.resize(WORD + bytes.len().div_ceil(WORD) * WORD, 0);
    out
}

fn checked_offset(base: usize, delta: usize) -> AbiResult<usize> {
    base.checked_add(delta)
        .ok_or_else(|| AbiError::InvalidData(format!("offset {base} + {delta} overflows")))
}

fn ensure_available(data: &[u8], offset: usize, needed: usize) -> AbiResult<()> {
    match offset.checked_add(needed) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(AbiError::OutOfRange {
            offset,
            needed,
            len: data.len(),
        }),
    }
}

fn read_word(data: &[u8], offset: usize) -> AbiResult<&[u8; WORD]> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .and_then(|word| word.try_into().ok())
        .ok_or(AbiError::OutOfRange {
            offset,
            needed: WORD,
            len: data.len(),
        })
}

/// Read a length or pointer word.
fn read_usize(data: &[u8], offset: usize) -> AbiResult<usize> {
    let word = read_word(data, offset)?;
    let too_large = || {
        AbiError::InvalidData(format!(
            "length or offset {} at {offset} is too large",
            U256::from_be_bytes(*word)
        ))
    };
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(too_large());
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| too_large())
}

fn read_dynamic_bytes(data: &[u8], offset: usize) -> AbiResult<&[u8]> {
    let len = read_usize(data, offset)?;
    let start = checked_offset(offset, WORD)?;
    ensure_available(data, start, len)?;
    Ok(&data[start..start + len])
}

/// Split a numeric string into its sign and magnitude.
///
/// Hex is recognised by a `0x` prefix or by any of the digits `a-f`.
fn parse_number(text: &str) -> Option<(bool, U256)> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        U256::from_str_radix(hex, 16).ok()?
    } else if digits.chars().any(|c| c.is_ascii_hexdigit() && !c.is_ascii_digit()) {
        U256::from_str_radix(digits, 16).ok()?
    } else {
        U256::from_str_radix(digits, 10).ok()?
    };
    Some((negative, magnitude))
}

fn to_u256(value: &Value) -> Option<U256> {
    match value {
        Value::Uint(number) => Some(*number),
        Value::Int(number) if !number.is_negative() => Some(number.as_u256()),
        Value::String(text) => match parse_number(text)? {
            (false, magnitude) => Some(magnitude),
            (true, magnitude) if magnitude == U256::ZERO => Some(magnitude),
            _ => None,
        },
        _ => None,
    }
}

fn to_i256(value: &Value) -> Option<I256> {
    let (negative, magnitude) = match value {
        Value::Int(number) => return Some(*number),
        Value::Uint(number) => (false, *number),
        Value::String(text) => parse_number(text)?,
        _ => return None,
    };
    let min_magnitude = I256::MIN.as_u256();
    match (negative, magnitude) {
        (false, m) if m <= I256::MAX.as_u256() => Some(m.as_i256()),
        (true, m) if m < min_magnitude => Some(-m.as_i256()),
        (true, m) if m == min_magnitude => Some(I256::MIN),
        _ => None,
    }
}

/// Raw bytes of a byte-like value.
///
/// Strings are hex-decoded when prefixed with `0x` (or always, with
/// `hex_only`); otherwise their UTF-8 bytes are used.
fn to_bytes(value: &Value, hex_only: bool) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(raw) | Value::FixedBytes(raw) => Some(raw.clone()),
        Value::String(text) if hex_only || text.starts_with("0x") || text.starts_with("0X") => {
            decode_hex(text).ok()
        }
        Value::String(text) => Some(text.as_bytes().to_vec()),
        _ => None,
    }
}
