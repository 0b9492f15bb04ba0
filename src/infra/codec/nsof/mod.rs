//! Newton Streamed Object Format.
//!
//! A stream is a version byte (`2`) followed by one tagged object. Immediates
//! and aggregates (frames, arrays, binaries, strings, symbols, rects) are
//! registered in an object table as soon as their tag is read, so later
//! `Precedent` tags can point back at them. That makes shared and cyclic
//! structures expressible, which is why decoded objects live in an arena
//! ([`ObjectStream`]) and refer to their children through [`ObjectRef`]
//! indices.
//!
//! [`Value`] is the owned, tree-shaped view used by callers: it is what the
//! encoder consumes and what [`ObjectStream::to_value`] produces.
use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

use crate::error::NsofError;

pub mod engine;
pub mod traits;

pub use engine::{decode, decode_all, decode_versioned, encode, encode_versioned, Decoded};
pub use traits::{FromNsof, ToNsof};

//==================================================================================Constants

/// Version byte leading every NSOF stream.
pub const NSOF_VERSION: u8 = 2;

/// Deepest nesting the decoder follows before giving up.
pub const MAX_DEPTH: usize = 256;

/// Largest tree [`ObjectStream::to_value`] builds. Precedents let a short
/// stream describe a tree exponentially larger than itself.
pub const MAX_EXPANDED_NODES: usize = 1 << 16;

/// Object tags.
pub mod tag {
    pub const IMMEDIATE: u8 = 0;
    pub const CHARACTER: u8 = 1;
    pub const UNICODE_CHARACTER: u8 = 2;
    pub const BINARY_OBJECT: u8 = 3;
    pub const ARRAY: u8 = 4;
    pub const PLAIN_ARRAY: u8 = 5;
    pub const FRAME: u8 = 6;
    pub const SYMBOL: u8 = 7;
    pub const STRING: u8 = 8;
    pub const PRECEDENT: u8 = 9;
    pub const NIL: u8 = 10;
    pub const SMALL_RECT: u8 = 11;
    pub const LARGE_BINARY: u8 = 12;
}

/// Immediate encodings of the constants.
pub mod immediate {
    pub const TRUE: i32 = 0x1A;
    pub const NIL: i32 = 0x02;
}

//==================================================================================Object arena

/// Index of an object inside an [`ObjectStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmallRect {
    pub top: u8,
    pub left: u8,
    pub bottom: u8,
    pub right: u8,
}

/// Key/value pair of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub key: ObjectRef,
    pub value: ObjectRef,
}

/// One decoded node. Children are arena indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Integer(i32),
    Character(u16),
    UnicodeCharacter(u16),
    True,
    Nil,
    MagicPointer(u32),
    Symbol(String),
    String(String),
    Frame(Vec<SlotRef>),
    PlainArray(Vec<ObjectRef>),
    Array {
        class: ObjectRef,
        items: Vec<ObjectRef>,
    },
    SmallRect(SmallRect),
    Binary {
        class: ObjectRef,
        data: Vec<u8>,
    },
}

/// Arena of decoded objects plus the precedent table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStream {
    /// Every node, in creation order.
    nodes: Vec<Object>,
    /// Nodes addressable by `Precedent`, in registration order.
    registered: Vec<ObjectRef>,
    /// Top-level objects, in stream order.
    roots: Vec<ObjectRef>,
}

impl ObjectStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: ObjectRef) -> Option<&Object> {
        self.nodes.get(reference.0)
    }

    /// Top-level objects decoded so far.
    pub fn roots(&self) -> &[ObjectRef] {
        &self.roots
    }

    /// Objects reachable through `Precedent`, in registration order.
    pub fn registered(&self) -> &[ObjectRef] {
        &self.registered
    }

    /// Resolve a precedent index.
    pub fn precedent(&self, index: usize) -> Option<ObjectRef> {
        self.registered.get(index).copied()
    }

    /// Total number of nodes, registered or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look a slot up by symbol name when `frame` is a frame.
    pub fn slot(&self, frame: ObjectRef, name: &str) -> Option<ObjectRef> {
        match self.get(frame)? {
            Object::Frame(slots) => slots.iter().find_map(|slot| match self.get(slot.key) {
                Some(Object::Symbol(key)) if key.eq_ignore_ascii_case(name) => Some(slot.value),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Owned tree view of `root`.
    ///
    /// Shared but acyclic objects are expanded at every use, up to
    /// [`MAX_EXPANDED_NODES`] nodes in total. A back-reference to an ancestor
    /// becomes [`Value::Precedent`], numbered the way [`encode`] registers
    /// the returned tree, so encoding it reproduces the cycle.
    pub fn to_value(&self, root: ObjectRef) -> Result<Value, NsofError> {
        self.value_of(root, &mut Expansion::default())
    }

    /// Owned views of every root.
    pub fn values(&self) -> Result<Vec<Value>, NsofError> {
        self.roots.iter().map(|&root| self.to_value(root)).collect()
    }

    pub(crate) fn push(&mut self, object: Object) -> ObjectRef {
        self.nodes.push(object);
        ObjectRef(self.nodes.len() - 1)
    }

    pub(crate) fn register(&mut self, object: Object) -> ObjectRef {
        let reference = self.push(object);
        self.registered.push(reference);
        reference
    }

    pub(crate) fn replace(&mut self, reference: ObjectRef, object: Object) {
        if let Some(slot) = self.nodes.get_mut(reference.0) {
            *slot = object;
        }
    }

    pub(crate) fn add_root(&mut self, reference: ObjectRef) {
        self.roots.push(reference);
    }

    fn value_of(
        &self,
        reference: ObjectRef,
        expansion: &mut Expansion,
    ) -> Result<Value, NsofError> {
        if let Some(&(_, index)) = expansion
            .ancestors
            .iter()
            .find(|(ancestor, _)| *ancestor == reference)
        {
            return Ok(Value::Precedent(index));
        }
        expansion.nodes += 1;
        if expansion.nodes > MAX_EXPANDED_NODES {
            return Err(NsofError::ExpansionLimit(MAX_EXPANDED_NODES));
        }
        let Some(object) = self.get(reference) else {
            return Ok(Value::Nil);
        };
        if object.registers_when_encoded() {
            expansion.ancestors.push((reference, expansion.registered));
            expansion.registered += 1;
        }
        let value = match object {
            Object::Integer(v) => Value::Integer(*v),
            Object::Character(c) => Value::Character(*c),
            Object::UnicodeCharacter(c) => Value::UnicodeCharacter(*c),
            Object::True => Value::True,
            Object::Nil => Value::Nil,
            Object::MagicPointer(p) => Value::MagicPointer(*p),
            Object::Symbol(s) => Value::Symbol(s.clone()),
            Object::String(s) => Value::String(s.clone()),
            Object::Frame(slots) => {
                // Keys first, then values: the order the encoder writes them.
                let keys = slots
                    .iter()
                    .map(|slot| self.value_of(slot.key, expansion))
                    .collect::<Result<Vec<_>, _>>()?;
                let values = slots
                    .iter()
                    .map(|slot| self.value_of(slot.value, expansion))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::Frame(keys.into_iter().zip(values).collect())
            }
            Object::PlainArray(items) => Value::PlainArray(self.values_of(items, expansion)?),
            Object::Array { class, items } => Value::Array {
                class: Box::new(self.value_of(*class, expansion)?),
                items: self.values_of(items, expansion)?,
            },
            Object::SmallRect(rect) => Value::SmallRect(*rect),
            Object::Binary { class, data } => Value::Binary {
                class: Box::new(self.value_of(*class, expansion)?),
                data: data.clone(),
            },
        };
        if expansion
            .ancestors
            .last()
            .is_some_and(|(ancestor, _)| *ancestor == reference)
        {
            expansion.ancestors.pop();
        }
        Ok(value)
    }

    fn values_of(
        &self,
        items: &[ObjectRef],
        expansion: &mut Expansion,
    ) -> Result<Vec<Value>, NsofError> {
        items
            .iter()
            .map(|&item| self.value_of(item, expansion))
            .collect()
    }
}

/// Bookkeeping for one [`ObjectStream::to_value`] walk.
#[derive(Default)]
struct Expansion {
    /// Objects being expanded, with the index the encoder will register
    /// them under.
    ancestors: Vec<(ObjectRef, usize)>,
    /// Registrations the encoder performs for the tree built so far.
    registered: usize,
    /// Tree nodes produced so far.
    nodes: usize,
}

impl Object {
    /// Whether the encoder's output for this object takes a precedent slot.
    /// Nil is written with its own tag and characters as immediates, so the
    /// answer can differ from how the object was read.
    fn registers_when_encoded(&self) -> bool {
        !matches!(self, Object::Nil | Object::UnicodeCharacter(_))
    }
}

//==================================================================================Value tree

/// Owned NSOF value.
///
/// `Integer` carries 30 significant bits on the wire; larger magnitudes wrap.
/// `Character` is encoded as an immediate, `UnicodeCharacter` with its own tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i32),
    Character(u16),
    UnicodeCharacter(u16),
    True,
    Nil,
    MagicPointer(u32),
    Symbol(String),
    String(String),
    Frame(Vec<(Value, Value)>),
    PlainArray(Vec<Value>),
    Array {
        class: Box<Value>,
        items: Vec<Value>,
    },
    SmallRect(SmallRect),
    Binary {
        class: Box<Value>,
        data: Vec<u8>,
    },
    /// Back-reference to the n-th registered object of the stream.
    Precedent(usize),
}

impl Value {
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(name.into())
    }

    pub fn string(text: &str) -> Self {
        Value::String(text.into())
    }

    /// Frame whose keys are symbols.
    pub fn frame<'a>(slots: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::Frame(
            slots
                .into_iter()
                .map(|(key, value)| (Value::symbol(key), value))
                .collect(),
        )
    }

    /// Slot value of a frame, matching symbol keys case-insensitively.
    pub fn slot(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Frame(slots) => slots.iter().find_map(|(key, value)| match key {
                Value::Symbol(key) if key.eq_ignore_ascii_case(name) => Some(value),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Text of a string or symbol.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Items of a plain or classed array.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::PlainArray(items) | Value::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Character(c) | Value::UnicodeCharacter(c) => {
                match char::from_u32(u32::from(*c)) {
                    Some(ch) => write!(f, "$\\{ch}"),
                    None => write!(f, "$\\u{c:04X}"),
                }
            }
            Value::True => f.write_str("true"),
            Value::Nil => f.write_str("nil"),
            Value::MagicPointer(p) => write!(f, "@{p}"),
            Value::Symbol(s) => write!(f, "'{s}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Frame(slots) => {
                f.write_str("{")?;
                for (i, (key, value)) in slots.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match key {
                        Value::Symbol(name) => write!(f, "{name}: {value}")?,
                        other => write!(f, "{other}: {value}")?,
                    }
                }
                f.write_str("}")
            }
            Value::PlainArray(items) => write_items(f, items),
            Value::Array { class, items } => {
                write!(f, "[{class}: ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::SmallRect(r) => write!(
                f,
                "{{top: {}, left: {}, bottom: {}, right: {}}}",
                r.top, r.left, r.bottom, r.right
            ),
            Value::Binary { class, data } => write!(f, "<{class}, {} bytes>", data.len()),
            Value::Precedent(index) => write!(f, "#{index}"),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        if value {
            Value::True
        } else {
            Value::Nil
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}
