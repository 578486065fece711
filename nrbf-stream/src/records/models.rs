/*!
 Data structures and models used by the record-stream parser.
*/

/// Record tags that can appear at the top level of a stream or nested in a member position
///
/// The discriminants are the exact wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    SerializationHeader = 0,
    ClassWithId = 1,
    SystemClassWithMembers = 2,
    SystemClassWithMembersAndTypes = 4,
    ClassWithMembersAndTypes = 5,
    BinaryObjectString = 6,
    BinaryArray = 7,
    MemberPrimitiveTyped = 8,
    MemberReference = 9,
    ObjectNull = 10,
    MessageEnd = 11,
    BinaryLibrary = 12,
    ObjectNullMultiple256 = 13,
    ArraySinglePrimitive = 15,
    ArraySingleObject = 16,
    ArraySingleString = 17,
}

impl RecordTag {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::SerializationHeader),
            1 => Some(Self::ClassWithId),
            2 => Some(Self::SystemClassWithMembers),
            4 => Some(Self::SystemClassWithMembersAndTypes),
            5 => Some(Self::ClassWithMembersAndTypes),
            6 => Some(Self::BinaryObjectString),
            7 => Some(Self::BinaryArray),
            8 => Some(Self::MemberPrimitiveTyped),
            9 => Some(Self::MemberReference),
            10 => Some(Self::ObjectNull),
            11 => Some(Self::MessageEnd),
            12 => Some(Self::BinaryLibrary),
            13 => Some(Self::ObjectNullMultiple256),
            15 => Some(Self::ArraySinglePrimitive),
            16 => Some(Self::ArraySingleObject),
            17 => Some(Self::ArraySingleString),
            _ => None,
        }
    }
}

/// Primitive value kinds, with their exact wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Boolean = 1,
    Byte = 2,
    Char = 3,
    Decimal = 5,
    Double = 6,
    Int16 = 7,
    Int32 = 8,
    Int64 = 9,
    SByte = 10,
    Single = 11,
    TimeSpan = 12,
    DateTime = 13,
    UInt16 = 14,
    UInt32 = 15,
    UInt64 = 16,
    Null = 17,
    String = 18,
}

impl PrimitiveKind {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Boolean),
            2 => Some(Self::Byte),
            3 => Some(Self::Char),
            5 => Some(Self::Decimal),
            6 => Some(Self::Double),
            7 => Some(Self::Int16),
            8 => Some(Self::Int32),
            9 => Some(Self::Int64),
            10 => Some(Self::SByte),
            11 => Some(Self::Single),
            12 => Some(Self::TimeSpan),
            13 => Some(Self::DateTime),
            14 => Some(Self::UInt16),
            15 => Some(Self::UInt32),
            16 => Some(Self::UInt64),
            17 => Some(Self::Null),
            18 => Some(Self::String),
            _ => None,
        }
    }

    /// The kind's name as written by the producing runtime, used as a node type label
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Char => "Char",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::SByte => "SByte",
            Self::Single => "Single",
            Self::TimeSpan => "TimeSpan",
            Self::DateTime => "DateTime",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Null => "Null",
            Self::String => "String",
        }
    }
}

/// The declared type of a class member or array element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryTypeKind {
    Primitive = 0,
    String = 1,
    Object = 2,
    SystemClass = 3,
    Class = 4,
    ObjectArray = 5,
    StringArray = 6,
    PrimitiveArray = 7,
}

impl BinaryTypeKind {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Primitive),
            1 => Some(Self::String),
            2 => Some(Self::Object),
            3 => Some(Self::SystemClass),
            4 => Some(Self::Class),
            5 => Some(Self::ObjectArray),
            6 => Some(Self::StringArray),
            7 => Some(Self::PrimitiveArray),
            _ => None,
        }
    }
}

/// The shape of a general `BinaryArray` record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryArrayShape {
    Single = 0,
    Jagged = 1,
    Rectangular = 2,
    SingleOffset = 3,
    JaggedOffset = 4,
    RectangularOffset = 5,
}

impl BinaryArrayShape {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Single),
            1 => Some(Self::Jagged),
            2 => Some(Self::Rectangular),
            3 => Some(Self::SingleOffset),
            4 => Some(Self::JaggedOffset),
            5 => Some(Self::RectangularOffset),
            _ => None,
        }
    }

    /// Offset shapes carry one lower bound per dimension after the lengths
    pub(crate) fn has_lower_bounds(&self) -> bool {
        matches!(
            self,
            Self::SingleOffset | Self::JaggedOffset | Self::RectangularOffset
        )
    }
}

/// A class's identity and member names, common to all class records that carry metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// The id later records use to reference this object
    pub object_id: i32,
    /// The class name as written by the producer
    pub name: String,
    /// Member names, in declaration order
    pub member_names: Vec<String>,
}

impl ClassInfo {
    pub fn member_count(&self) -> usize {
        self.member_names.len()
    }
}

/// Identifies a class defined in a specific library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeInfo {
    pub library_name: String,
    pub library_id: i32,
}

/// Extra type detail attached to a member whose [`BinaryTypeKind`] requires it
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalTypeInfo {
    /// The kind of a `Primitive` or `PrimitiveArray` member
    Primitive(PrimitiveKind),
    /// The class name of a `SystemClass` member
    SystemClass(String),
    /// The class and library of a `Class` member
    Class(ClassTypeInfo),
}

/// Parallel per-member type descriptors for a class layout
///
/// Both vectors have exactly one entry per member; `additional_info` is
/// `None` for kinds that carry no extra detail.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberTypeInfo {
    pub bin_types: Vec<BinaryTypeKind>,
    pub additional_info: Vec<Option<AdditionalTypeInfo>>,
}

/// A reusable class layout: how to read instances sharing a metadata id
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLayout {
    pub class_info: ClassInfo,
    pub member_type_info: MemberTypeInfo,
}

/// The id and element count common to the single-dimension array records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayInfo {
    pub object_id: i32,
    pub length: i32,
}

/// A single decoded primitive value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// `Byte`, `Char`, and `SByte` are all decoded as the raw byte
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    /// UTF-8 text; `Decimal` values are kept in their textual form
    String(String),
    /// The contents of a byte array
    Bytes(Vec<u8>),
    /// Raw bytes this decoder deliberately does not interpret, such as timestamps
    Opaque(Vec<u8>),
}

/// A class member or array element as stored on its owning record
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    /// A nested record read through the dispatcher
    Record(Box<Record>),
    /// A primitive value read inline, for members declared `Primitive`
    Primitive(Value),
}

/// The payload of an `ArraySinglePrimitive` record
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArrayContents {
    /// `Byte` arrays keep their raw contents so embedded payloads stay addressable
    Bytes(Vec<u8>),
    /// Any other kind is unpacked value by value
    Values(Vec<Value>),
}

/// A parsed record with its payload retained verbatim for graph assembly
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    SerializationHeader {
        root_id: i32,
        header_id: i32,
        major_version: i32,
        minor_version: i32,
    },
    /// An instance of a class whose layout was registered by an earlier record;
    /// carries the resolved layout so assembly does not need the registry
    ClassWithId {
        object_id: i32,
        metadata_id: i32,
        layout: ClassLayout,
        members: Vec<MemberValue>,
    },
    /// Metadata-only system class variant without member types or values
    SystemClassWithMembers { class_info: ClassInfo },
    SystemClassWithMembersAndTypes {
        class_info: ClassInfo,
        member_type_info: MemberTypeInfo,
        members: Vec<MemberValue>,
    },
    ClassWithMembersAndTypes {
        class_info: ClassInfo,
        member_type_info: MemberTypeInfo,
        library_id: i32,
        members: Vec<MemberValue>,
    },
    BinaryObjectString { object_id: i32, value: String },
    BinaryArray {
        object_id: i32,
        shape: BinaryArrayShape,
        rank: i32,
        lengths: Vec<i32>,
        lower_bounds: Vec<i32>,
        type_kind: BinaryTypeKind,
        additional_info: Option<AdditionalTypeInfo>,
        elements: Vec<MemberValue>,
    },
    MemberPrimitiveTyped { kind: PrimitiveKind, value: Value },
    MemberReference { id_ref: i32 },
    ObjectNull,
    MessageEnd,
    BinaryLibrary { library_id: i32, library_name: String },
    /// Stands for `count` consecutive nulls in an array context
    ObjectNullMultiple256 { count: u8 },
    ArraySinglePrimitive {
        array_info: ArrayInfo,
        kind: PrimitiveKind,
        contents: PrimitiveArrayContents,
    },
    ArraySingleObject {
        array_info: ArrayInfo,
        elements: Vec<MemberValue>,
    },
    ArraySingleString {
        array_info: ArrayInfo,
        elements: Vec<MemberValue>,
    },
}
