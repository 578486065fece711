/*!
 Logic used to deserialize a record stream into an object graph.

 Record layouts reverse engineered against the published format specification:
   - [`[MS-NRBF]`](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-nrbf/75b9fe09-be15-475f-85b8-ae7b7558cfe5)
*/

use std::collections::HashMap;

use crate::{
    error::nrbf::NrbfError,
    graph::builder::ObjectGraph,
    records::{
        cursor::ByteCursor,
        models::{
            AdditionalTypeInfo, ArrayInfo, BinaryArrayShape, BinaryTypeKind, ClassInfo,
            ClassLayout, ClassTypeInfo, MemberTypeInfo, MemberValue, PrimitiveArrayContents,
            PrimitiveKind, Record, RecordTag,
        },
    },
};

/// Shortest byte array that can hold a serialization header plus a terminator
const NESTED_PROBE_MIN_LEN: usize = 18;

/// Where the main loop is in the stream's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// The first record has not been read yet and must be a serialization header
    AwaitHeader,
    /// Records are being dispatched and offered to the graph
    Streaming,
    /// A message-end record or the end of the stream was reached
    Ended,
}

/// Class layouts registered during one parse, keyed by the declaring object id
///
/// Later `ClassWithId` records reuse a layout to read their members. The registry
/// lives exactly as long as its parse; a nested payload gets a fresh one.
#[derive(Debug, Default)]
pub struct ClassLayoutRegistry {
    layouts: HashMap<i32, ClassLayout>,
}

impl ClassLayoutRegistry {
    pub(crate) fn new() -> Self {
        Self {
            layouts: HashMap::new(),
        }
    }

    /// Insert a layout exactly once
    pub(crate) fn register(&mut self, id: i32, layout: ClassLayout) -> Result<(), NrbfError> {
        if self.layouts.contains_key(&id) {
            return Err(NrbfError::DuplicateClassMetadata(id));
        }
        self.layouts.insert(id, layout);
        Ok(())
    }

    /// Because record parsing mutates the reader while a layout is in use, we hand
    /// out a clone of the stored layout rather than a reference into the table.
    pub(crate) fn lookup(&self, id: i32) -> Result<ClassLayout, NrbfError> {
        self.layouts
            .get(&id)
            .cloned()
            .ok_or(NrbfError::UnknownClassMetadata(id))
    }
}

/// Everything one parse produced: the root id from the header, the assembled
/// graph, and one entry per serialized payload found nested in a byte array.
#[derive(Debug)]
pub struct ParsedStream {
    /// The logical payload root named by the stream header
    pub root_id: i32,
    pub graph: ObjectGraph,
    /// Graphs decoded from byte arrays that carried their own serialization header
    pub nested: Vec<ParsedStream>,
}

/// Contains logic and data used to deserialize a record stream.
///
/// A stream begins with a serialization header, continues with tagged records, and
/// ends with a message-end record. Each record is parsed into a [`Record`] and
/// offered to the [`ObjectGraph`]; id references are resolved as they are seen.
#[derive(Debug)]
pub struct NrbfReader<'a> {
    /// The stream we want to parse
    cursor: ByteCursor<'a>,
    /// Class layouts seen so far, for `ClassWithId` back-references
    registry: ClassLayoutRegistry,
    /// The graph under assembly
    graph: ObjectGraph,
    /// Payloads decoded out of primitive byte arrays
    nested: Vec<ParsedStream>,
    state: ParseState,
}

impl<'a> NrbfReader<'a> {
    /// Given a stream, construct a reader instance to parse it.
    ///
    /// # Example:
    ///
    /// ```
    /// use nrbf_stream::records::parser::NrbfReader;
    ///
    /// let bytes: Vec<u8> = vec![]; // Example stream
    /// let reader = NrbfReader::from(&bytes);
    /// ```
    pub fn from(stream: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::from(stream),
            registry: ClassLayoutRegistry::new(),
            graph: ObjectGraph::new(),
            nested: vec![],
            state: ParseState::AwaitHeader,
        }
    }

    /// Attempt to decode the stream into an object graph.
    ///
    /// The first record must be a serialization header. Records are then dispatched
    /// until a message-end record or the end of the stream; bytes after the end
    /// record are ignored.
    ///
    /// # Example:
    ///
    /// ```
    /// use nrbf_stream::records::parser::NrbfReader;
    ///
    /// let bytes: Vec<u8> = vec![]; // Example stream
    /// let result = NrbfReader::from(&bytes).parse();
    /// ```
    pub fn parse(mut self) -> Result<ParsedStream, NrbfError> {
        let root_id = self.read_header()?;

        while self.state == ParseState::Streaming && self.cursor.has_remaining() {
            let record = self.next_record()?;
            if let Record::MessageEnd = record {
                self.state = ParseState::Ended;
                break;
            }
            self.graph.add_record(&record)?;
        }
        self.state = ParseState::Ended;

        Ok(ParsedStream {
            root_id,
            graph: self.graph,
            nested: self.nested,
        })
    }

    /// Read the mandatory serialization header and return the root id it names.
    fn read_header(&mut self) -> Result<i32, NrbfError> {
        if !self.cursor.has_remaining() || self.cursor.peek()? != RecordTag::SerializationHeader as u8
        {
            return Err(NrbfError::MissingHeader);
        }
        match self.next_record()? {
            Record::SerializationHeader { root_id, .. } => {
                self.state = ParseState::Streaming;
                Ok(root_id)
            }
            _ => Err(NrbfError::MissingHeader),
        }
    }

    /// Dispatch on the next record's tag byte.
    ///
    /// The tag is only peeked here; the variant parser re-reads it and asserts it
    /// got the record it expects.
    pub(crate) fn next_record(&mut self) -> Result<Record, NrbfError> {
        let pos = self.cursor.position();
        let tag_byte = self.cursor.peek()?;
        let tag =
            RecordTag::from_byte(tag_byte).ok_or(NrbfError::UnknownRecord(tag_byte, pos))?;
        match tag {
            RecordTag::SerializationHeader => self.read_serialization_header(),
            RecordTag::ClassWithId => self.read_class_with_id(),
            RecordTag::SystemClassWithMembers => self.read_system_class_with_members(),
            RecordTag::SystemClassWithMembersAndTypes => {
                self.read_system_class_with_members_and_types()
            }
            RecordTag::ClassWithMembersAndTypes => self.read_class_with_members_and_types(),
            RecordTag::BinaryObjectString => self.read_binary_object_string(),
            RecordTag::BinaryArray => self.read_binary_array(),
            RecordTag::MemberPrimitiveTyped => self.read_member_primitive_typed(),
            RecordTag::MemberReference => self.read_member_reference(),
            RecordTag::ObjectNull => self.read_object_null(),
            RecordTag::MessageEnd => self.read_message_end(),
            RecordTag::BinaryLibrary => self.read_binary_library(),
            RecordTag::ObjectNullMultiple256 => self.read_object_null_multiple_256(),
            RecordTag::ArraySinglePrimitive => self.read_array_single_primitive(),
            RecordTag::ArraySingleObject => self.read_array_single_object(),
            RecordTag::ArraySingleString => self.read_array_single_string(),
        }
    }

    /// Consume the tag byte a variant parser expects to be positioned on.
    fn expect_tag(&mut self, expected: RecordTag) -> Result<(), NrbfError> {
        let pos = self.cursor.position();
        let got = self.cursor.read_u8()?;
        if got != expected as u8 {
            return Err(NrbfError::RecordTagMismatch(expected as u8, got, pos));
        }
        Ok(())
    }

    fn read_serialization_header(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::SerializationHeader)?;
        let root_id = self.cursor.read_i32()?;
        let header_id = self.cursor.read_i32()?;
        let major_version = self.cursor.read_i32()?;
        let minor_version = self.cursor.read_i32()?;
        Ok(Record::SerializationHeader {
            root_id,
            header_id,
            major_version,
            minor_version,
        })
    }

    fn read_class_with_id(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::ClassWithId)?;
        let object_id = self.cursor.read_i32()?;
        let metadata_id = self.cursor.read_i32()?;
        let layout = self.registry.lookup(metadata_id)?;
        let members = self.read_members(&layout.member_type_info)?;
        Ok(Record::ClassWithId {
            object_id,
            metadata_id,
            layout,
            members,
        })
    }

    fn read_system_class_with_members(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::SystemClassWithMembers)?;
        let class_info = self.read_class_info()?;
        Ok(Record::SystemClassWithMembers { class_info })
    }

    fn read_system_class_with_members_and_types(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::SystemClassWithMembersAndTypes)?;
        let class_info = self.read_class_info()?;
        let member_type_info = self.read_member_type_info(class_info.member_count())?;
        self.registry.register(
            class_info.object_id,
            ClassLayout {
                class_info: class_info.clone(),
                member_type_info: member_type_info.clone(),
            },
        )?;
        let members = self.read_members(&member_type_info)?;
        Ok(Record::SystemClassWithMembersAndTypes {
            class_info,
            member_type_info,
            members,
        })
    }

    fn read_class_with_members_and_types(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::ClassWithMembersAndTypes)?;
        let class_info = self.read_class_info()?;
        let member_type_info = self.read_member_type_info(class_info.member_count())?;
        let library_id = self.cursor.read_i32()?;
        self.registry.register(
            class_info.object_id,
            ClassLayout {
                class_info: class_info.clone(),
                member_type_info: member_type_info.clone(),
            },
        )?;
        let members = self.read_members(&member_type_info)?;
        Ok(Record::ClassWithMembersAndTypes {
            class_info,
            member_type_info,
            library_id,
            members,
        })
    }

    fn read_binary_object_string(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::BinaryObjectString)?;
        let object_id = self.cursor.read_i32()?;
        let value = self.cursor.read_var_string()?;
        Ok(Record::BinaryObjectString { object_id, value })
    }

    fn read_binary_array(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::BinaryArray)?;
        let object_id = self.cursor.read_i32()?;
        let shape_pos = self.cursor.position();
        let shape_byte = self.cursor.read_u8()?;
        let shape = BinaryArrayShape::from_byte(shape_byte).ok_or_else(|| {
            NrbfError::UnsupportedFeature(format!(
                "array shape {shape_byte:#04x} at {shape_pos:x}"
            ))
        })?;
        let rank = self.cursor.read_i32()?;
        let mut lengths = Vec::with_capacity(rank.max(0) as usize);
        for _ in 0..rank {
            lengths.push(self.cursor.read_i32()?);
        }
        let mut lower_bounds = vec![];
        if shape.has_lower_bounds() {
            for _ in 0..rank {
                lower_bounds.push(self.cursor.read_i32()?);
            }
        }
        let type_kind = self.read_binary_type_kind()?;
        let additional_info = self.read_additional_info(type_kind)?;

        // Total element count is the product across dimensions; the historical
        // decoder summed them, which undercounts rectangular arrays.
        let count: i64 = lengths.iter().map(|length| i64::from(*length)).product();
        if count < 0 {
            return Err(NrbfError::UnsupportedFeature(format!(
                "array of negative extent {count}"
            )));
        }
        let elements =
            self.read_element_values(count as usize, type_kind, additional_info.as_ref())?;

        Ok(Record::BinaryArray {
            object_id,
            shape,
            rank,
            lengths,
            lower_bounds,
            type_kind,
            additional_info,
            elements,
        })
    }

    fn read_member_primitive_typed(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::MemberPrimitiveTyped)?;
        let kind = self.read_primitive_kind()?;
        let value = self.cursor.read_primitive(kind)?;
        Ok(Record::MemberPrimitiveTyped { kind, value })
    }

    fn read_member_reference(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::MemberReference)?;
        let id_ref = self.cursor.read_i32()?;
        Ok(Record::MemberReference { id_ref })
    }

    fn read_object_null(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::ObjectNull)?;
        Ok(Record::ObjectNull)
    }

    fn read_message_end(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::MessageEnd)?;
        Ok(Record::MessageEnd)
    }

    fn read_binary_library(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::BinaryLibrary)?;
        let library_id = self.cursor.read_i32()?;
        let library_name = self.cursor.read_var_string()?;
        Ok(Record::BinaryLibrary {
            library_id,
            library_name,
        })
    }

    fn read_object_null_multiple_256(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::ObjectNullMultiple256)?;
        let count = self.cursor.read_u8()?;
        Ok(Record::ObjectNullMultiple256 { count })
    }

    fn read_array_single_primitive(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::ArraySinglePrimitive)?;
        let array_info = self.read_array_info()?;
        let kind = self.read_primitive_kind()?;
        let length = array_info.length.max(0) as usize;
        let contents = if kind == PrimitiveKind::Byte {
            let bytes = self.cursor.read_exact_bytes(length)?.to_vec();
            self.probe_nested(&bytes);
            PrimitiveArrayContents::Bytes(bytes)
        } else {
            let mut values = Vec::with_capacity(length);
            for _ in 0..length {
                values.push(self.cursor.read_primitive(kind)?);
            }
            PrimitiveArrayContents::Values(values)
        };
        Ok(Record::ArraySinglePrimitive {
            array_info,
            kind,
            contents,
        })
    }

    fn read_array_single_object(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::ArraySingleObject)?;
        let array_info = self.read_array_info()?;
        let elements = self.read_element_values(
            array_info.length.max(0) as usize,
            BinaryTypeKind::Object,
            None,
        )?;
        Ok(Record::ArraySingleObject {
            array_info,
            elements,
        })
    }

    fn read_array_single_string(&mut self) -> Result<Record, NrbfError> {
        self.expect_tag(RecordTag::ArraySingleString)?;
        let array_info = self.read_array_info()?;
        let elements = self.read_element_values(
            array_info.length.max(0) as usize,
            BinaryTypeKind::String,
            None,
        )?;
        Ok(Record::ArraySingleString {
            array_info,
            elements,
        })
    }

    fn read_array_info(&mut self) -> Result<ArrayInfo, NrbfError> {
        let object_id = self.cursor.read_i32()?;
        let length = self.cursor.read_i32()?;
        Ok(ArrayInfo { object_id, length })
    }

    fn read_class_info(&mut self) -> Result<ClassInfo, NrbfError> {
        let object_id = self.cursor.read_i32()?;
        let name = self.cursor.read_var_string()?;
        let member_count = self.cursor.read_i32()?;
        let mut member_names = Vec::with_capacity(member_count.max(0) as usize);
        for _ in 0..member_count {
            member_names.push(self.cursor.read_var_string()?);
        }
        Ok(ClassInfo {
            object_id,
            name,
            member_names,
        })
    }

    /// Read the per-member type descriptors: all binary type kinds first, then the
    /// additional info each kind calls for.
    fn read_member_type_info(&mut self, count: usize) -> Result<MemberTypeInfo, NrbfError> {
        let mut bin_types = Vec::with_capacity(count);
        for _ in 0..count {
            bin_types.push(self.read_binary_type_kind()?);
        }
        let mut additional_info = Vec::with_capacity(count);
        for bin_type in &bin_types {
            additional_info.push(self.read_additional_info(*bin_type)?);
        }
        Ok(MemberTypeInfo {
            bin_types,
            additional_info,
        })
    }

    fn read_binary_type_kind(&mut self) -> Result<BinaryTypeKind, NrbfError> {
        let pos = self.cursor.position();
        let byte = self.cursor.read_u8()?;
        BinaryTypeKind::from_byte(byte).ok_or_else(|| {
            NrbfError::UnsupportedFeature(format!("binary type {byte:#04x} at {pos:x}"))
        })
    }

    fn read_primitive_kind(&mut self) -> Result<PrimitiveKind, NrbfError> {
        let pos = self.cursor.position();
        let byte = self.cursor.read_u8()?;
        PrimitiveKind::from_byte(byte).ok_or(NrbfError::BadPrimitive(byte, pos))
    }

    fn read_additional_info(
        &mut self,
        bin_type: BinaryTypeKind,
    ) -> Result<Option<AdditionalTypeInfo>, NrbfError> {
        match bin_type {
            BinaryTypeKind::Primitive | BinaryTypeKind::PrimitiveArray => {
                Ok(Some(AdditionalTypeInfo::Primitive(self.read_primitive_kind()?)))
            }
            BinaryTypeKind::SystemClass => Ok(Some(AdditionalTypeInfo::SystemClass(
                self.cursor.read_var_string()?,
            ))),
            BinaryTypeKind::Class => {
                let library_name = self.cursor.read_var_string()?;
                let library_id = self.cursor.read_i32()?;
                Ok(Some(AdditionalTypeInfo::Class(ClassTypeInfo {
                    library_name,
                    library_id,
                })))
            }
            _ => Ok(None),
        }
    }

    /// Read one value per member of a class layout.
    fn read_members(&mut self, type_info: &MemberTypeInfo) -> Result<Vec<MemberValue>, NrbfError> {
        let mut members = Vec::with_capacity(type_info.bin_types.len());
        for (bin_type, info) in type_info.bin_types.iter().zip(&type_info.additional_info) {
            members.push(self.read_member_value(*bin_type, info.as_ref())?);
        }
        Ok(members)
    }

    /// Read one member value: primitives inline, everything else as a nested record.
    fn read_member_value(
        &mut self,
        bin_type: BinaryTypeKind,
        info: Option<&AdditionalTypeInfo>,
    ) -> Result<MemberValue, NrbfError> {
        match bin_type {
            BinaryTypeKind::Primitive => {
                let kind = match info {
                    Some(AdditionalTypeInfo::Primitive(kind)) => *kind,
                    _ => {
                        return Err(NrbfError::UnsupportedFeature(
                            "primitive member without a declared kind".to_string(),
                        ))
                    }
                };
                Ok(MemberValue::Primitive(self.cursor.read_primitive(kind)?))
            }
            _ => Ok(MemberValue::Record(Box::new(self.next_record()?))),
        }
    }

    /// Fill `count` element slots. A null-run record occupies as many slots as its
    /// count; every other record occupies one.
    fn read_element_values(
        &mut self,
        count: usize,
        bin_type: BinaryTypeKind,
        info: Option<&AdditionalTypeInfo>,
    ) -> Result<Vec<MemberValue>, NrbfError> {
        let mut elements = Vec::with_capacity(count.min(1024));
        let mut filled = 0usize;
        while filled < count {
            if bin_type == BinaryTypeKind::Primitive {
                elements.push(self.read_member_value(bin_type, info)?);
                filled += 1;
                continue;
            }
            let record = self.next_record()?;
            filled += match &record {
                Record::ObjectNullMultiple256 { count } => (*count).max(1) as usize,
                _ => 1,
            };
            elements.push(MemberValue::Record(Box::new(record)));
        }
        Ok(elements)
    }

    /// Speculatively decode a byte array that may carry a serialized payload.
    ///
    /// The array must be long enough to hold a header and must start with the
    /// header tag byte. The header is probed first; only if it parses is a fresh
    /// reader (fresh registry, fresh graph) run over the whole inner buffer. Any
    /// failure leaves the bytes opaque and the outer parse untouched.
    fn probe_nested(&mut self, bytes: &[u8]) {
        if bytes.len() < NESTED_PROBE_MIN_LEN || bytes.first() != Some(&0u8) {
            return;
        }
        let mut probe = NrbfReader::from(bytes);
        if probe.read_header().is_err() {
            return;
        }
        if let Ok(inner) = NrbfReader::from(bytes).parse() {
            self.nested.push(inner);
        }
    }
}
