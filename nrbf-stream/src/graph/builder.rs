/*!
 Assembles parsed records into a rooted object graph.

 A synthetic ROOT node owns every declared library and every top-level system class;
 libraries own the classes declared against their id. All other nodes are reachable
 through member slots and id references.
*/

use std::collections::HashMap;

use crate::{
    error::nrbf::NrbfError,
    graph::models::{NodeId, ObjectNode},
    records::models::{
        AdditionalTypeInfo, BinaryTypeKind, ClassInfo, MemberTypeInfo, MemberValue,
        PrimitiveArrayContents, Record, Value,
    },
};

/// Type label of the synthetic root node
const ROOT: &str = "ROOT";

/// The object graph assembled from one parse
///
/// Nodes are stored in an arena and addressed by [`NodeId`]; a node referenced from
/// several member slots is shared, preserving referential identity.
#[derive(Debug)]
pub struct ObjectGraph {
    nodes: Vec<ObjectNode>,
    /// Wire object id to arena handle
    ids: HashMap<i32, NodeId>,
    /// Declared libraries, for later class attachment
    libraries: HashMap<i32, NodeId>,
    root: NodeId,
}

impl ObjectGraph {
    pub(crate) fn new() -> Self {
        let mut root = ObjectNode::new();
        root.node_type = Some(ROOT.to_string());
        Self {
            nodes: vec![root],
            ids: HashMap::new(),
            libraries: HashMap::new(),
            root: 0,
        }
    }

    /// The synthetic root node's handle
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ObjectNode {
        &self.nodes[id]
    }

    /// The number of nodes in the arena, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a wire object id to its node, if one was referenced or defined
    pub fn node_by_object_id(&self, object_id: i32) -> Option<NodeId> {
        self.ids.get(&object_id).copied()
    }

    /// Resolve a library id to its node
    pub fn library(&self, library_id: i32) -> Option<NodeId> {
        self.libraries.get(&library_id).copied()
    }

    fn alloc(&mut self, node: ObjectNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Return the node registered under a wire object id, creating an
    /// unresolved placeholder on first sight.
    pub(crate) fn node_for(&mut self, object_id: i32) -> NodeId {
        if let Some(&idx) = self.ids.get(&object_id) {
            return idx;
        }
        let idx = self.alloc(ObjectNode::unresolved(object_id));
        self.ids.insert(object_id, idx);
        idx
    }

    fn attach_to_root(&mut self, idx: NodeId) {
        self.nodes[self.root].members.push(idx);
    }

    /// Absorb one top-level record into the graph.
    pub(crate) fn add_record(&mut self, record: &Record) -> Result<(), NrbfError> {
        self.record_node(record).map(|_| ())
    }

    /// Materialize the node a record describes, creating or resolving as needed.
    ///
    /// Header, end, and null-run records have no node of their own.
    fn record_node(&mut self, record: &Record) -> Result<Option<NodeId>, NrbfError> {
        match record {
            Record::SerializationHeader { .. }
            | Record::MessageEnd
            | Record::ObjectNullMultiple256 { .. } => Ok(None),
            Record::BinaryLibrary {
                library_id,
                library_name,
            } => {
                if self.libraries.contains_key(library_id) {
                    return Err(NrbfError::DuplicateClassMetadata(*library_id));
                }
                let idx = self.node_for(*library_id);
                self.nodes[idx].node_type = Some(library_name.clone());
                self.libraries.insert(*library_id, idx);
                self.attach_to_root(idx);
                Ok(Some(idx))
            }
            Record::SystemClassWithMembers { class_info } => {
                // Metadata-only variant; the node merely exists
                Ok(Some(self.node_for(class_info.object_id)))
            }
            Record::SystemClassWithMembersAndTypes {
                class_info,
                member_type_info,
                members,
            } => {
                let idx =
                    self.class_node(class_info.object_id, class_info, member_type_info, members)?;
                self.attach_to_root(idx);
                Ok(Some(idx))
            }
            Record::ClassWithMembersAndTypes {
                class_info,
                member_type_info,
                library_id,
                members,
            } => {
                let idx =
                    self.class_node(class_info.object_id, class_info, member_type_info, members)?;
                let library = *self
                    .libraries
                    .get(library_id)
                    .ok_or(NrbfError::UnknownLibrary(*library_id))?;
                self.nodes[library].members.push(idx);
                Ok(Some(idx))
            }
            Record::ClassWithId {
                object_id,
                layout,
                members,
                ..
            } => Ok(Some(self.class_node(
                *object_id,
                &layout.class_info,
                &layout.member_type_info,
                members,
            )?)),
            Record::BinaryObjectString { object_id, value } => {
                let idx = self.node_for(*object_id);
                self.nodes[idx].node_type = Some("String".to_string());
                self.nodes[idx].value = Some(Value::String(value.clone()));
                Ok(Some(idx))
            }
            Record::MemberReference { id_ref } => Ok(Some(self.node_for(*id_ref))),
            Record::ObjectNull => Ok(Some(self.null_node(None, None))),
            Record::MemberPrimitiveTyped { kind, value } => {
                let mut node = ObjectNode::new();
                node.node_type = Some(kind.name().to_string());
                node.value = Some(value.clone());
                Ok(Some(self.alloc(node)))
            }
            Record::BinaryArray {
                object_id,
                type_kind,
                additional_info,
                elements,
                ..
            } => {
                let idx = self.node_for(*object_id);
                let element_type = element_type_label(*type_kind, additional_info.as_ref());
                self.nodes[idx].node_type = Some(format!("{element_type}[]"));
                self.nodes[idx].members.clear();
                self.array_children(idx, elements, Some(element_type))?;
                Ok(Some(idx))
            }
            Record::ArraySinglePrimitive {
                array_info,
                kind,
                contents,
            } => {
                let idx = self.node_for(array_info.object_id);
                self.nodes[idx].node_type = Some(format!("{}[]", kind.name()));
                match contents {
                    PrimitiveArrayContents::Bytes(bytes) => {
                        self.nodes[idx].value = Some(Value::Bytes(bytes.clone()));
                    }
                    PrimitiveArrayContents::Values(values) => {
                        for (slot, value) in values.iter().enumerate() {
                            let mut node = ObjectNode::new();
                            node.node_type = Some(kind.name().to_string());
                            node.name = Some(slot.to_string());
                            node.value = Some(value.clone());
                            let child = self.alloc(node);
                            self.nodes[idx].members.push(child);
                        }
                    }
                }
                Ok(Some(idx))
            }
            Record::ArraySingleObject {
                array_info,
                elements,
            } => {
                let idx = self.node_for(array_info.object_id);
                self.nodes[idx].node_type = Some("Object[]".to_string());
                self.nodes[idx].members.clear();
                self.array_children(idx, elements, None)?;
                Ok(Some(idx))
            }
            Record::ArraySingleString {
                array_info,
                elements,
            } => {
                let idx = self.node_for(array_info.object_id);
                self.nodes[idx].node_type = Some("String[]".to_string());
                self.nodes[idx].members.clear();
                self.array_children(idx, elements, Some("String".to_string()))?;
                Ok(Some(idx))
            }
        }
    }

    /// Resolve a class instance node and materialize its member slots.
    fn class_node(
        &mut self,
        object_id: i32,
        class_info: &ClassInfo,
        type_info: &MemberTypeInfo,
        members: &[MemberValue],
    ) -> Result<NodeId, NrbfError> {
        let idx = self.node_for(object_id);
        self.nodes[idx].node_type = Some(class_info.name.clone());
        self.nodes[idx].members.clear();
        for (slot, member) in members.iter().enumerate() {
            let name = class_info.member_names.get(slot).cloned();
            let declared = declared_type(type_info, slot);
            let children = self.member_nodes(member, name, declared)?;
            self.nodes[idx].members.extend(children);
        }
        Ok(idx)
    }

    /// Materialize array element slots, naming each child by its final index.
    fn array_children(
        &mut self,
        idx: NodeId,
        elements: &[MemberValue],
        declared: Option<String>,
    ) -> Result<(), NrbfError> {
        let mut slot = 0usize;
        for element in elements {
            let children = self.member_nodes(element, None, declared.clone())?;
            for child in children {
                self.nodes[child].name = Some(slot.to_string());
                self.nodes[idx].members.push(child);
                slot += 1;
            }
        }
        Ok(())
    }

    /// Materialize one member slot; null runs expand to several children.
    fn member_nodes(
        &mut self,
        member: &MemberValue,
        name: Option<String>,
        declared: Option<String>,
    ) -> Result<Vec<NodeId>, NrbfError> {
        match member {
            MemberValue::Primitive(value) => {
                let mut node = ObjectNode::new();
                node.node_type = declared;
                node.name = name;
                node.value = Some(value.clone());
                Ok(vec![self.alloc(node)])
            }
            MemberValue::Record(record) => match record.as_ref() {
                Record::ObjectNull => Ok(vec![self.null_node(name, declared)]),
                Record::ObjectNullMultiple256 { count } => {
                    let mut out = Vec::with_capacity(*count as usize);
                    for _ in 0..*count {
                        out.push(self.null_node(name.clone(), declared.clone()));
                    }
                    Ok(out)
                }
                nested => match self.record_node(nested)? {
                    Some(idx) => {
                        if name.is_some() {
                            self.nodes[idx].name = name;
                        }
                        Ok(vec![idx])
                    }
                    None => Ok(vec![]),
                },
            },
        }
    }

    fn null_node(&mut self, name: Option<String>, declared: Option<String>) -> NodeId {
        let mut node = ObjectNode::new();
        node.node_type = Some(declared.unwrap_or_else(|| "Null".to_string()));
        node.name = name;
        node.value = Some(Value::Null);
        self.alloc(node)
    }
}

/// The declared type label of a member slot, where the layout provides one
fn declared_type(type_info: &MemberTypeInfo, slot: usize) -> Option<String> {
    match type_info.additional_info.get(slot)? {
        Some(AdditionalTypeInfo::Primitive(kind)) => Some(kind.name().to_string()),
        Some(AdditionalTypeInfo::SystemClass(name)) => Some(name.clone()),
        Some(AdditionalTypeInfo::Class(info)) => Some(info.library_name.clone()),
        None => match type_info.bin_types.get(slot)? {
            BinaryTypeKind::String => Some("String".to_string()),
            _ => None,
        },
    }
}

/// The element type label of a general binary array
fn element_type_label(type_kind: BinaryTypeKind, info: Option<&AdditionalTypeInfo>) -> String {
    match info {
        Some(AdditionalTypeInfo::Primitive(kind)) => kind.name().to_string(),
        Some(AdditionalTypeInfo::SystemClass(name)) => name.clone(),
        Some(AdditionalTypeInfo::Class(info)) => info.library_name.clone(),
        None => match type_kind {
            BinaryTypeKind::String | BinaryTypeKind::StringArray => "String".to_string(),
            _ => "Object".to_string(),
        },
    }
}
