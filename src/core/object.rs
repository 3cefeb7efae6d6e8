//! Resolved PDF values.
//!
//! Font dictionaries reach this crate already fetched, decrypted and
//! decoded by the document layer. [`PDFObject`] is the value model they
//! arrive in; indirect references are expected to have been resolved, and
//! a [`PDFObject::Ref`] found where a concrete value is required is treated
//! as malformed input.

use std::collections::HashMap;

/// A resolved PDF object.
#[derive(Debug, Clone, PartialEq)]
pub enum PDFObject {
    /// Null value
    Null,

    /// Boolean value
    Boolean(bool),

    /// Numeric value (integers and reals)
    Number(f64),

    /// String value (from literal strings like (hello))
    String(Vec<u8>),

    /// Hex string value (from hex strings like <48656c6c6f>)
    HexString(Vec<u8>),

    /// Name value (from /Name)
    Name(String),

    /// Array of objects
    Array(Vec<PDFObject>),

    /// Dictionary (key-value pairs)
    Dictionary(HashMap<String, PDFObject>),

    /// Stream object (dictionary + decoded data)
    Stream {
        dict: HashMap<String, PDFObject>,
        data: Vec<u8>,
    },

    /// Unresolved indirect object reference (like "5 0 R")
    Ref { num: u32, generation: u32 },
}

impl PDFObject {
    /// Returns the numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PDFObject::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the name without its leading slash, if this is a name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PDFObject::Name(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns the array members, if this is an array.
    pub fn as_array(&self) -> Option<&[PDFObject]> {
        match self {
            PDFObject::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the dictionary entries of a dictionary or of a stream.
    pub fn as_dict(&self) -> Option<&HashMap<String, PDFObject>> {
        match self {
            PDFObject::Dictionary(dict) => Some(dict),
            PDFObject::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Returns the decoded stream payload, if this is a stream.
    pub fn stream_data(&self) -> Option<&[u8]> {
        match self {
            PDFObject::Stream { data, .. } => Some(data.as_slice()),
            _ => None,
        }
    }

    /// Decodes a literal or hex string as text.
    ///
    /// Registry and ordering strings are plain ASCII in practice, so bytes
    /// are mapped through lossy UTF-8.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PDFObject::String(bytes) | PDFObject::HexString(bytes) => {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
            _ => None,
        }
    }

    /// Looks up `key` in a dictionary or stream dictionary.
    pub fn get(&self, key: &str) -> Option<&PDFObject> {
        self.as_dict().and_then(|dict| dict.get(key))
    }
}
