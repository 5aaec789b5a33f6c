//! Element-type classification for method signatures.
//!
//! The handler predicates never look at concrete types, only at the leading element type
//! of each signature entry (ECMA-335 II.23.1.16). [`TypeClass`] is that classification.
//! `System.Object` has its own element type (`OBJECT`, 0x1c) and is therefore *not*
//! [`TypeClass::Class`]; a parameter typed `object` does not satisfy a class constraint.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

#[allow(non_snake_case, dead_code, missing_docs)]
/// Possible bytes that represent various 'Types' for a signature - from coreclr
pub mod ELEMENT_TYPE {
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    // type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    // Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // Followed by full method signature
    pub const FNPTR: u8 = 0x1b;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter in a generic method definition,represented as number
    pub const MVAR: u8 = 0x1e;
}

/// Coarse classification of a parameter or return type.
///
/// Each variant corresponds to one leading `ELEMENT_TYPE_*` byte. Anything the upstream
/// parser could not classify ends up as [`TypeClass::Unknown`], which never satisfies a
/// shape constraint.
///
/// The serialized form is the lowercase variant name (`"class"`, `"boolean"`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    EnumCount,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TypeClass {
    #[default]
    /// Not defined
    Unknown,
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// System.String
    String,
    /// A pointer to a type
    Ptr,
    /// Type by reference
    ByRef,
    /// CIL value-type
    ValueType,
    /// CIL class
    Class,
    /// Generic type parameter
    Var,
    /// Multi-dimensional array
    Array,
    /// Generic type instantiation
    GenericInst,
    /// Type is referenced during runtime
    TypedByRef,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// Function pointer
    FnPtr,
    /// System.Object
    Object,
    /// Single dimension array
    SzArray,
    /// Generic method parameter
    MVar,
}

impl TypeClass {
    /// Classifies a raw leading element-type byte.
    ///
    /// Modifier, sentinel and pinned bytes are not valid leading element types of a
    /// parameter and map to [`TypeClass::Unknown`], as does any undefined value.
    #[must_use]
    pub fn from_element_type(element_type: u8) -> Self {
        match element_type {
            ELEMENT_TYPE::VOID => TypeClass::Void,
            ELEMENT_TYPE::BOOLEAN => TypeClass::Boolean,
            ELEMENT_TYPE::CHAR => TypeClass::Char,
            ELEMENT_TYPE::I1 => TypeClass::I1,
            ELEMENT_TYPE::U1 => TypeClass::U1,
            ELEMENT_TYPE::I2 => TypeClass::I2,
            ELEMENT_TYPE::U2 => TypeClass::U2,
            ELEMENT_TYPE::I4 => TypeClass::I4,
            ELEMENT_TYPE::U4 => TypeClass::U4,
            ELEMENT_TYPE::I8 => TypeClass::I8,
            ELEMENT_TYPE::U8 => TypeClass::U8,
            ELEMENT_TYPE::R4 => TypeClass::R4,
            ELEMENT_TYPE::R8 => TypeClass::R8,
            ELEMENT_TYPE::STRING => TypeClass::String,
            ELEMENT_TYPE::PTR => TypeClass::Ptr,
            ELEMENT_TYPE::BYREF => TypeClass::ByRef,
            ELEMENT_TYPE::VALUETYPE => TypeClass::ValueType,
            ELEMENT_TYPE::CLASS => TypeClass::Class,
            ELEMENT_TYPE::VAR => TypeClass::Var,
            ELEMENT_TYPE::ARRAY => TypeClass::Array,
            ELEMENT_TYPE::GENERICINST => TypeClass::GenericInst,
            ELEMENT_TYPE::TYPEDBYREF => TypeClass::TypedByRef,
            ELEMENT_TYPE::I => TypeClass::I,
            ELEMENT_TYPE::U => TypeClass::U,
            ELEMENT_TYPE::FNPTR => TypeClass::FnPtr,
            ELEMENT_TYPE::OBJECT => TypeClass::Object,
            ELEMENT_TYPE::SZARRAY => TypeClass::SzArray,
            ELEMENT_TYPE::MVAR => TypeClass::MVar,
            _ => TypeClass::Unknown,
        }
    }

    /// Returns the `ELEMENT_TYPE_*` byte of this class, `None` for [`TypeClass::Unknown`].
    #[must_use]
    pub fn element_type(self) -> Option<u8> {
        let value = match self {
            TypeClass::Unknown => return None,
            TypeClass::Void => ELEMENT_TYPE::VOID,
            TypeClass::Boolean => ELEMENT_TYPE::BOOLEAN,
            TypeClass::Char => ELEMENT_TYPE::CHAR,
            TypeClass::I1 => ELEMENT_TYPE::I1,
            TypeClass::U1 => ELEMENT_TYPE::U1,
            TypeClass::I2 => ELEMENT_TYPE::I2,
            TypeClass::U2 => ELEMENT_TYPE::U2,
            TypeClass::I4 => ELEMENT_TYPE::I4,
            TypeClass::U4 => ELEMENT_TYPE::U4,
            TypeClass::I8 => ELEMENT_TYPE::I8,
            TypeClass::U8 => ELEMENT_TYPE::U8,
            TypeClass::R4 => ELEMENT_TYPE::R4,
            TypeClass::R8 => ELEMENT_TYPE::R8,
            TypeClass::String => ELEMENT_TYPE::STRING,
            TypeClass::Ptr => ELEMENT_TYPE::PTR,
            TypeClass::ByRef => ELEMENT_TYPE::BYREF,
            TypeClass::ValueType => ELEMENT_TYPE::VALUETYPE,
            TypeClass::Class => ELEMENT_TYPE::CLASS,
            TypeClass::Var => ELEMENT_TYPE::VAR,
            TypeClass::Array => ELEMENT_TYPE::ARRAY,
            TypeClass::GenericInst => ELEMENT_TYPE::GENERICINST,
            TypeClass::TypedByRef => ELEMENT_TYPE::TYPEDBYREF,
            TypeClass::I => ELEMENT_TYPE::I,
            TypeClass::U => ELEMENT_TYPE::U,
            TypeClass::FnPtr => ELEMENT_TYPE::FNPTR,
            TypeClass::Object => ELEMENT_TYPE::OBJECT,
            TypeClass::SzArray => ELEMENT_TYPE::SZARRAY,
            TypeClass::MVar => ELEMENT_TYPE::MVAR,
        };
        Some(value)
    }
}
