//! Conversion traits between Rust types and NSOF values. They let session and
//! application code build and read Newton payloads without matching on
//! [`Value`] by hand.
use alloc::{string::String, vec::Vec};

use super::{decode_versioned, encode_versioned, Value};
use crate::error::NsofError;

//==================================================================================TO_NSOF
/// Types that have an NSOF representation.
pub trait ToNsof {
    fn to_nsof(&self) -> Value;

    /// Versioned stream ready to be placed in a Dock payload.
    fn to_nsof_bytes(&self) -> Vec<u8> {
        encode_versioned(&self.to_nsof())
    }
}

//==================================================================================FROM_NSOF
/// Types that can be read back from an NSOF value.
pub trait FromNsof: Sized {
    fn from_nsof(value: &Value) -> Result<Self, NsofError>;

    /// Decode the first versioned stream of `bytes`.
    fn from_nsof_bytes(bytes: &[u8]) -> Result<Self, NsofError> {
        let stream = decode_versioned(bytes)?;
        let root = stream
            .roots()
            .first()
            .copied()
            .ok_or(NsofError::UnexpectedValue("an object"))?;
        Self::from_nsof(&stream.to_value(root)?)
    }
}

impl ToNsof for Value {
    fn to_nsof(&self) -> Value {
        self.clone()
    }
}

impl FromNsof for Value {
    fn from_nsof(value: &Value) -> Result<Self, NsofError> {
        Ok(value.clone())
    }
}

impl ToNsof for i32 {
    fn to_nsof(&self) -> Value {
        Value::Integer(*self)
    }
}

impl FromNsof for i32 {
    fn from_nsof(value: &Value) -> Result<Self, NsofError> {
        value
            .as_integer()
            .ok_or(NsofError::UnexpectedValue("an integer"))
    }
}

impl ToNsof for bool {
    fn to_nsof(&self) -> Value {
        Value::from(*self)
    }
}

impl FromNsof for bool {
    /// Anything but `nil` is true.
    fn from_nsof(value: &Value) -> Result<Self, NsofError> {
        Ok(!value.is_nil())
    }
}

impl ToNsof for str {
    fn to_nsof(&self) -> Value {
        Value::string(self)
    }
}

impl ToNsof for String {
    fn to_nsof(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromNsof for String {
    /// Accepts strings and symbols.
    fn from_nsof(value: &Value) -> Result<Self, NsofError> {
        value
            .as_str()
            .map(String::from)
            .ok_or(NsofError::UnexpectedValue("a string"))
    }
}

impl<T: ToNsof> ToNsof for [T] {
    fn to_nsof(&self) -> Value {
        Value::PlainArray(self.iter().map(ToNsof::to_nsof).collect())
    }
}

impl<T: ToNsof> ToNsof for Vec<T> {
    fn to_nsof(&self) -> Value {
        self.as_slice().to_nsof()
    }
}

impl<T: FromNsof> FromNsof for Vec<T> {
    /// Accepts plain and classed arrays.
    fn from_nsof(value: &Value) -> Result<Self, NsofError> {
        value
            .as_items()
            .ok_or(NsofError::UnexpectedValue("an array"))?
            .iter()
            .map(T::from_nsof)
            .collect()
    }
}
