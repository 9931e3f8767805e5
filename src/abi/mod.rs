//! Contract ABI interfacing.
//!
//! An [`Abi`] is loaded once from its JSON description and then queried for
//! members by name, by call-data selector or by event topic. Every member
//! knows how to encode its arguments and decode its inputs, outputs or log
//! entries.
//!
//! ```rust
//! use vite_devkit::abi::{Abi, Value};
//!
//! let abi: Abi = r#"[
//!     {"type": "function", "name": "send", "inputs": [{"name": "amount", "type": "uint256"}]}
//! ]"#.parse().expect("Valid ABI");
//!
//! let data = abi.encode_function("send", &[Value::from(123u64)]).expect("Encodable");
//! assert_eq!(&data[..4], &[0xd6, 0xf4, 0x7d, 0x63]);
//! assert_eq!(abi.decode_function(&data).expect("Decodable"), vec![Value::from(123u64)]);
//! ```
//!
//! Lookups return [`Option`]; the convenience `encode_*`/`decode_*` methods
//! report a missing member as [`AbiError::NotFound`], so callers can tell
//! "no such member" apart from malformed arguments or data.

mod entry;
mod types;
mod value;

pub use entry::{
    decode_list, encode_arguments, Constructor, Entry, EntryKind, Event, Fallback, Function,
    Offchain, Param, Signature, SELECTOR_SIZE,
};
pub use types::{SolidityType, WORD};
pub use value::Value;

use entry::RawEntry;
use ethereum_types::H256;
use std::{ops::Deref, str::FromStr};

/// Errors of ABI loading, lookup, encoding and decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AbiError {
    /// ABI JSON is malformed, has an unknown member type or parameter type.
    #[error("malformed ABI definition: {0}")]
    Definition(#[from] serde_json::Error),
    /// Type name is not a known ABI type.
    #[error("unknown ABI type `{0}`")]
    UnknownType(String),
    /// No member matches the requested name, selector or topic.
    #[error("{kind} `{key}` not found")]
    NotFound {
        /// Kind of member looked up
        kind: EntryKind,
        /// Name, selector or topic (hex) used for lookup
        key: String,
    },
    /// Value cannot be represented as the given type.
    #[error("cannot encode {value} as `{ty}`")]
    InvalidValue {
        /// Target type
        ty: SolidityType,
        /// Offending value
        value: String,
    },
    /// More positional arguments than parameters.
    #[error("too many arguments: expected at most {expected}, got {got}")]
    TooManyArguments {
        /// Number of parameters
        expected: usize,
        /// Number of arguments
        got: usize,
    },
    /// Data ends before the declared layout does.
    #[error("data too short: {needed} bytes required at offset {offset}, got {len} bytes total")]
    OutOfRange {
        /// Read position
        offset: usize,
        /// Bytes required from `offset`
        needed: usize,
        /// Buffer length
        len: usize,
    },
    /// Data is long enough but its content is not valid for the type.
    #[error("invalid ABI data: {0}")]
    InvalidData(String),
    /// Not enough topics for the indexed event parameters.
    #[error("expected at least {expected} topics, got {got}")]
    MissingTopics {
        /// Required number of topics
        expected: usize,
        /// Provided number of topics
        got: usize,
    },
}

/// Convenience alias for a result of ABI operations.
pub type AbiResult<T> = Result<T, AbiError>;

fn not_found<T: ToString>(kind: EntryKind, key: T) -> AbiError {
    let key = key.to_string();
    tracing::trace!(%kind, %key, "ABI member not found");
    AbiError::NotFound { kind, key }
}

/// Contract ABI: an immutable, ordered list of members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Abi(Vec<Entry>);

impl Deref for Abi {
    type Target = [Entry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Abi {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

impl From<Vec<Entry>> for Abi {
    fn from(entries: Vec<Entry>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a Abi {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Abi {
    pub fn from_json(text: &str) -> AbiResult<Self> {
        //! Parse a JSON array of member descriptions.
        //!
        //! Unknown member types and unknown parameter types are rejected here,
        //! never later during encoding or decoding.
        let raw: Vec<RawEntry> = serde_json::from_str(text)?;
        let abi = Self(raw.into_iter().map(Entry::from).collect());
        tracing::debug!(entries = abi.len(), "loaded ABI definition");
        Ok(abi)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        //! All functions in declaration order.
        self.iter().filter_map(|entry| match entry {
            Entry::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        //! All events in declaration order.
        self.iter().filter_map(|entry| match entry {
            Entry::Event(event) => Some(event),
            _ => None,
        })
    }

    pub fn offchains(&self) -> impl Iterator<Item = &Offchain> {
        //! All offchain methods in declaration order.
        self.iter().filter_map(|entry| match entry {
            Entry::Offchain(offchain) => Some(offchain),
            _ => None,
        })
    }

    pub fn find_constructor(&self) -> Option<&Constructor> {
        //! The first constructor, if any.
        self.iter().find_map(|entry| match entry {
            Entry::Constructor(constructor) => Some(constructor),
            _ => None,
        })
    }

    pub fn find_fallback(&self) -> Option<&Fallback> {
        //! The first fallback function, if any.
        self.iter().find_map(|entry| match entry {
            Entry::Fallback(fallback) => Some(fallback),
            _ => None,
        })
    }

    pub fn find_function_by_name(&self, name: &str) -> Option<&Function> {
        //! First function with the given name.
        self.functions().find(|f| f.name == name)
    }

    pub fn find_function_by_data(&self, data: &[u8]) -> Option<&Function> {
        //! Function whose selector matches the first 4 bytes of call data.
        let selector = data.get(..SELECTOR_SIZE)?;
        self.functions().find(|f| f.encode_signature() == selector)
    }

    pub fn find_event_by_name(&self, name: &str) -> Option<&Event> {
        //! First event with the given name.
        self.events().find(|e| e.name == name)
    }

    pub fn find_event_by_topic(&self, topics: &[H256]) -> Option<&Event> {
        //! Non-anonymous event whose id equals the first topic.
        let topic0 = topics.first()?;
        self.events().find(|e| e.topic0().as_ref() == Some(topic0))
    }

    pub fn find_offchain_by_name(&self, name: &str) -> Option<&Offchain> {
        //! First offchain method with the given name.
        self.offchains().find(|o| o.name == name)
    }

    pub fn encode_constructor(&self, args: &[Value]) -> AbiResult<Vec<u8>> {
        //! Encode constructor arguments.
        self.find_constructor()
            .ok_or_else(|| not_found(EntryKind::Constructor, ""))?
            .encode(args)
    }

    pub fn decode_constructor(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode constructor arguments.
        self.find_constructor()
            .ok_or_else(|| not_found(EntryKind::Constructor, ""))?
            .decode(data)
    }

    pub fn encode_function(&self, name: &str, args: &[Value]) -> AbiResult<Vec<u8>> {
        //! Encode call data for the named function.
        self.find_function_by_name(name)
            .ok_or_else(|| not_found(EntryKind::Function, name))?
            .encode(args)
    }

    pub fn decode_function(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode call data inputs, resolving the function by selector.
        self.find_function_by_data(data)
            .ok_or_else(|| not_found(EntryKind::Function, hex_prefix(data)))?
            .decode(data)
    }

    pub fn decode_function_output(&self, name: &str, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode values returned by the named function.
        self.find_function_by_name(name)
            .ok_or_else(|| not_found(EntryKind::Function, name))?
            .decode_output(data)
    }

    pub fn encode_offchain(&self, name: &str, args: &[Value]) -> AbiResult<Vec<u8>> {
        //! Encode query data for the named offchain method.
        self.find_offchain_by_name(name)
            .ok_or_else(|| not_found(EntryKind::Offchain, name))?
            .encode(args)
    }

    pub fn decode_offchain_output(&self, name: &str, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode values returned by the named offchain method.
        self.find_offchain_by_name(name)
            .ok_or_else(|| not_found(EntryKind::Offchain, name))?
            .decode_output(data)
    }

    pub fn decode_event(&self, data: &[u8], topics: &[H256]) -> AbiResult<Vec<Value>> {
        //! Decode a log entry, resolving the event by its first topic.
        //!
        //! Anonymous events cannot be resolved this way, use
        //! [`Abi::decode_event_by_name`] instead.
        self.find_event_by_topic(topics)
            .ok_or_else(|| {
                let key = topics.first().map(|t| format!("{t:?}")).unwrap_or_default();
                not_found(EntryKind::Event, key)
            })?
            .decode(data, topics)
    }

    pub fn decode_event_by_name(
        &self,
        name: &str,
        data: &[u8],
        topics: &[H256],
    ) -> AbiResult<Vec<Value>> {
        //! Decode a log entry of the named event.
        self.find_event_by_name(name)
            .ok_or_else(|| not_found(EntryKind::Event, name))?
            .decode(data, topics)
    }
}

fn hex_prefix(data: &[u8]) -> String {
    use rustc_hex::ToHex;
    format!(
        "0x{}",
        data[..data.len().min(SELECTOR_SIZE)].to_hex::<String>()
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unknown_entry_type() {
        let err = Abi::from_json(r#"[{"type": "callback", "name": "f"}]"#).unwrap_err();
        assert!(matches!(err, AbiError::Definition(_)));
    }

    #[test]
    fn test_unknown_param_type() {
        let err = Abi::from_json(
            r#"[{"type": "function", "name": "f", "inputs": [{"name": "a", "type": "uint7"}]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, AbiError::Definition(_)));
        assert!(err.to_string().contains("uint7"));
    }

    #[test]
    fn test_defaults_and_unknown_fields() {
        let abi = Abi::from_json(
            r#"[
                {"type": "fallback", "payable": true, "stateMutability": "payable"},
                {"type": "constructor"}
            ]"#,
        )
        .unwrap();
        assert_eq!(abi.len(), 2);
        assert_eq!(abi.find_fallback(), Some(&Fallback { payable: true }));
        assert!(abi.find_constructor().unwrap().inputs.is_empty());
    }

    #[test]
    fn test_short_data_finds_nothing() {
        let abi: Abi = r#"[{"type": "function", "name": "f"}]"#.parse().unwrap();
        assert!(abi.find_function_by_data(&[0x01]).is_none());
        assert!(matches!(
            abi.decode_function(&[0x01]).unwrap_err(),
            AbiError::NotFound {
                kind: EntryKind::Function,
                ..
            }
        ));
    }

    #[test]
    fn test_abi_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Abi>();
    }
}
