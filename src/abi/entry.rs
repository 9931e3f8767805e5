//! Members of a contract ABI and their signatures.

use super::types::{decode_tuple, encode_tuple, WORD};
use super::{AbiError, AbiResult, SolidityType, Value};
use crate::utils::blake2_256;
use ethereum_types::H256;
use itertools::Itertools;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::fmt;

/// Size of a function selector in bytes.
pub const SELECTOR_SIZE: usize = 4;

/// A single named and typed parameter.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Param {
    /// Parameter name, may be empty.
    #[serde(default)]
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    #[serde_as(as = "DisplayFromStr")]
    pub ty: SolidityType,
    /// Whether this event parameter is stored in a topic.
    #[serde(default)]
    pub indexed: bool,
}

impl Param {
    pub fn new<S: Into<String>>(name: S, ty: SolidityType) -> Self {
        //! Create a non-indexed parameter.
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    #[must_use]
    pub fn indexed(mut self) -> Self {
        //! Mark this parameter as indexed (event topics only).
        self.indexed = true;
        self
    }
}

/// Kind tag of an ABI member, as spelled in the JSON `type` field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Contract constructor
    Constructor,
    /// Callable function
    Function,
    /// Emitted event
    Event,
    /// Read-only method executed off chain
    Offchain,
    /// Fallback function
    Fallback,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constructor => "constructor",
            Self::Function => "function",
            Self::Event => "event",
            Self::Offchain => "offchain",
            Self::Fallback => "fallback",
        })
    }
}

/// Signature formatting and hashing shared by all named members.
pub trait Signature {
    /// Member name.
    fn name(&self) -> &str;
    /// Ordered input parameters.
    fn inputs(&self) -> &[Param];

    fn format_signature(&self) -> String {
        //! Canonical signature: `name(type1,type2,...)`.
        //!
        //! Parameter names do not participate.
        format!(
            "{}({})",
            self.name(),
            self.inputs().iter().map(|p| &p.ty).join(",")
        )
    }

    fn fingerprint_signature(&self) -> H256 {
        //! 32-byte blake2b digest of the canonical signature.
        H256(blake2_256(&[self.format_signature()]))
    }
}

/// Encode positional arguments with the tuple layout of `inputs`.
///
/// Fewer arguments than inputs encode a prefix of the parameter list;
/// more arguments than inputs is an error.
pub fn encode_arguments(inputs: &[Param], args: &[Value]) -> AbiResult<Vec<u8>> {
    if args.len() > inputs.len() {
        return Err(AbiError::TooManyArguments {
            expected: inputs.len(),
            got: args.len(),
        });
    }
    encode_tuple(inputs.iter().map(|p| &p.ty).zip(args))
}

/// Decode values of `params` laid out from the start of `data`.
pub fn decode_list(params: &[Param], data: &[u8]) -> AbiResult<Vec<Value>> {
    decode_tuple(params.iter().map(|p| &p.ty), data, 0)
}

fn split_selector(data: &[u8]) -> AbiResult<(&[u8], &[u8])> {
    if data.len() < SELECTOR_SIZE {
        return Err(AbiError::OutOfRange {
            offset: 0,
            needed: SELECTOR_SIZE,
            len: data.len(),
        });
    }
    Ok(data.split_at(SELECTOR_SIZE))
}

fn selector_of<T: Signature + ?Sized>(member: &T) -> [u8; SELECTOR_SIZE] {
    let mut selector = [0u8; SELECTOR_SIZE];
    selector.copy_from_slice(&member.fingerprint_signature().as_bytes()[..SELECTOR_SIZE]);
    selector
}

fn prefixed(selector: [u8; SELECTOR_SIZE], arguments: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(SELECTOR_SIZE + arguments.len());
    out.extend_from_slice(&selector);
    out.extend(arguments);
    out
}

/// Contract constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constructor {
    /// Constructor arguments.
    pub inputs: Vec<Param>,
    /// Accepts a transfer together with deployment.
    pub payable: bool,
}

impl Constructor {
    pub fn encode(&self, args: &[Value]) -> AbiResult<Vec<u8>> {
        //! Encode constructor arguments (no selector).
        encode_arguments(&self.inputs, args)
    }

    pub fn decode(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode constructor arguments.
        decode_list(&self.inputs, data)
    }
}

/// Callable contract function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// Input parameters.
    pub inputs: Vec<Param>,
    /// Output parameters.
    pub outputs: Vec<Param>,
    /// Accepts a transfer together with the call.
    pub payable: bool,
}

impl Signature for Function {
    fn name(&self) -> &str {
        &self.name
    }
    fn inputs(&self) -> &[Param] {
        &self.inputs
    }
}

impl Function {
    pub fn encode_signature(&self) -> [u8; SELECTOR_SIZE] {
        //! Function selector: first 4 bytes of the signature fingerprint.
        selector_of(self)
    }

    pub fn encode(&self, args: &[Value]) -> AbiResult<Vec<u8>> {
        //! Encode call data: selector followed by arguments.
        Ok(prefixed(
            self.encode_signature(),
            encode_arguments(&self.inputs, args)?,
        ))
    }

    pub fn decode(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode call data inputs, skipping the selector.
        let (_, arguments) = split_selector(data)?;
        decode_list(&self.inputs, arguments)
    }

    pub fn decode_output(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode returned values.
        decode_list(&self.outputs, data)
    }
}

/// Read-only method executed by a node without a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offchain {
    /// Method name.
    pub name: String,
    /// Input parameters.
    pub inputs: Vec<Param>,
    /// Output parameters.
    pub outputs: Vec<Param>,
    /// Accepts a transfer together with the query.
    pub payable: bool,
}

impl Signature for Offchain {
    fn name(&self) -> &str {
        &self.name
    }
    fn inputs(&self) -> &[Param] {
        &self.inputs
    }
}

impl Offchain {
    pub fn encode_signature(&self) -> [u8; SELECTOR_SIZE] {
        //! Method selector: first 4 bytes of the signature fingerprint.
        selector_of(self)
    }

    pub fn encode(&self, args: &[Value]) -> AbiResult<Vec<u8>> {
        //! Encode query data: selector followed by arguments.
        Ok(prefixed(
            self.encode_signature(),
            encode_arguments(&self.inputs, args)?,
        ))
    }

    pub fn decode(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode query inputs, skipping the selector.
        let (_, arguments) = split_selector(data)?;
        decode_list(&self.inputs, arguments)
    }

    pub fn decode_output(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        //! Decode returned values.
        decode_list(&self.outputs, data)
    }
}

/// Contract event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Event parameters, indexed and not.
    pub inputs: Vec<Param>,
    /// Anonymous events do not emit their signature as the first topic.
    pub anonymous: bool,
}

impl Signature for Event {
    fn name(&self) -> &str {
        &self.name
    }
    fn inputs(&self) -> &[Param] {
        &self.inputs
    }
}

impl Event {
    pub fn encode_signature(&self) -> H256 {
        //! Event id: the full signature fingerprint.
        self.fingerprint_signature()
    }

    pub fn topic0(&self) -> Option<H256> {
        //! First topic emitted with this event, absent for anonymous events.
        (!self.anonymous).then(|| self.encode_signature())
    }

    pub fn decode(&self, data: &[u8], topics: &[H256]) -> AbiResult<Vec<Value>> {
        //! Decode event parameters from log data and topics.
        //!
        //! Indexed parameters take one topic each (after the event id for
        //! non-anonymous events); the rest are decoded from `data`. The result
        //! follows declaration order.
        let (indexed, plain): (Vec<_>, Vec<_>) =
            self.inputs.iter().cloned().partition(|p| p.indexed);

        let argument_topics = if self.anonymous {
            topics
        } else {
            topics.get(1..).unwrap_or_default()
        };
        let expected = indexed.len() + usize::from(!self.anonymous);
        if topics.len() < expected {
            return Err(AbiError::MissingTopics {
                expected,
                got: topics.len(),
            });
        }
        tracing::trace!(
            event = %self.name,
            indexed = indexed.len(),
            plain = plain.len(),
            "decoding event"
        );

        let mut indexed_values = indexed
            .iter()
            .zip(argument_topics)
            .map(|(param, topic)| decode_topic(&param.ty, topic))
            .collect::<AbiResult<Vec<_>>>()?
            .into_iter();
        let mut plain_values = decode_list(&plain, data)?.into_iter();

        self.inputs
            .iter()
            .map(|param| {
                let next = if param.indexed {
                    indexed_values.next()
                } else {
                    plain_values.next()
                };
                next.ok_or_else(|| AbiError::InvalidData("event parameter count mismatch".into()))
            })
            .collect()
    }
}

/// Decode a single indexed parameter.
///
/// Values that do not fit in one word are hashed on chain, so the topic
/// itself is returned.
fn decode_topic(ty: &SolidityType, topic: &H256) -> AbiResult<Value> {
    if ty.is_dynamic() || ty.fixed_size() != WORD {
        return Ok(Value::FixedBytes(topic.as_bytes().to_vec()));
    }
    ty.decode(topic.as_bytes(), 0)
}

/// Fallback function, invoked when no selector matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fallback {
    /// Accepts plain transfers.
    pub payable: bool,
}

/// Any member of a contract ABI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Constructor
    Constructor(Constructor),
    /// Function
    Function(Function),
    /// Event
    Event(Event),
    /// Offchain method
    Offchain(Offchain),
    /// Fallback
    Fallback(Fallback),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        //! Tag of this member.
        match self {
            Self::Constructor(_) => EntryKind::Constructor,
            Self::Function(_) => EntryKind::Function,
            Self::Event(_) => EntryKind::Event,
            Self::Offchain(_) => EntryKind::Offchain,
            Self::Fallback(_) => EntryKind::Fallback,
        }
    }

    pub fn name(&self) -> Option<&str> {
        //! Member name, absent for constructor and fallback.
        match self {
            Self::Function(f) => Some(&f.name),
            Self::Event(e) => Some(&e.name),
            Self::Offchain(o) => Some(&o.name),
            Self::Constructor(_) | Self::Fallback(_) => None,
        }
    }

    pub fn inputs(&self) -> &[Param] {
        //! Input parameters (empty for fallback).
        match self {
            Self::Constructor(c) => &c.inputs,
            Self::Function(f) => &f.inputs,
            Self::Event(e) => &e.inputs,
            Self::Offchain(o) => &o.inputs,
            Self::Fallback(_) => &[],
        }
    }
}

/// JSON form of a single ABI member.
#[derive(Deserialize)]
pub(crate) struct RawEntry {
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<Param>,
    #[serde(default)]
    outputs: Vec<Param>,
    #[serde(default)]
    payable: bool,
    #[serde(default)]
    anonymous: bool,
}

impl From<RawEntry> for Entry {
    fn from(raw: RawEntry) -> Self {
        let RawEntry {
            kind,
            name,
            inputs,
            outputs,
            payable,
            anonymous,
        } = raw;
        match kind {
            EntryKind::Constructor => Self::Constructor(Constructor { inputs, payable }),
            EntryKind::Function => Self::Function(Function {
                name,
                inputs,
                outputs,
                payable,
            }),
            EntryKind::Event => Self::Event(Event {
                name,
                inputs,
                anonymous,
            }),
            EntryKind::Offchain => Self::Offchain(Offchain {
                name,
                inputs,
                outputs,
                payable,
            }),
            EntryKind::Fallback => Self::Fallback(Fallback { payable }),
        }
    }
}
