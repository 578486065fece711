use std::io::Write;

use base64::{prelude::BASE64_STANDARD, Engine};
use json::{object, JsonValue};

use nrbf_stream::{
    graph::{
        builder::ObjectGraph,
        models::{NodeId, NO_OBJECT_ID},
    },
    records::{models::Value, parser::ParsedStream},
};

use crate::{
    app::{error::RuntimeError, runtime::Config},
    renderers::renderer::Renderer,
};

/// How deep the pretty printer indents each level
const INDENT: u16 = 2;

pub struct Json<'a> {
    /// Data that is setup from the application's runtime
    pub config: &'a Config,
    /// Handle to the output we want to write the graph to
    out: Box<dyn Write>,
}

impl<'a> Renderer<'a> for Json<'a> {
    fn new(config: &'a Config) -> Result<Self, RuntimeError> {
        Ok(Json {
            config,
            out: config.writer()?,
        })
    }

    fn render(&mut self) -> Result<(), RuntimeError> {
        let config = self.config;
        self.render_stream(&config.stream)?;
        self.out.flush().map_err(RuntimeError::DiskError)
    }
}

impl Json<'_> {
    /// Write one document per graph: the stream's own graph first, then every
    /// payload decoded out of its byte arrays.
    fn render_stream(&mut self, stream: &ParsedStream) -> Result<(), RuntimeError> {
        let document = node_json(&stream.graph, stream.graph.root(), &mut vec![]);
        writeln!(self.out, "{}", json::stringify_pretty(document, INDENT))
            .map_err(RuntimeError::DiskError)?;
        for nested in &stream.nested {
            self.render_stream(nested)?;
        }
        Ok(())
    }
}

/// Serialize one node, fields omitted when empty, cycles cut with a reference marker
fn node_json(graph: &ObjectGraph, idx: NodeId, visiting: &mut Vec<NodeId>) -> JsonValue {
    let node = graph.node(idx);
    if visiting.contains(&idx) {
        return object! { Id: node.id, Ref: true };
    }

    let mut out = JsonValue::new_object();
    if node.id != NO_OBJECT_ID {
        out["Id"] = node.id.into();
    }
    if let Some(node_type) = &node.node_type {
        out["Type"] = node_type.clone().into();
    }
    if let Some(name) = &node.name {
        out["Name"] = name.clone().into();
    }
    if let Some(value) = &node.value {
        out["Value"] = value_json(value);
    }
    if !node.members.is_empty() {
        visiting.push(idx);
        let members: Vec<JsonValue> = node
            .members
            .iter()
            .map(|member| node_json(graph, *member, visiting))
            .collect();
        visiting.pop();
        out["Members"] = members.into();
    }
    out
}

fn value_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => "Null".into(),
        Value::Bool(value) => (*value).into(),
        Value::Byte(value) => (*value).into(),
        Value::Int16(value) => (*value).into(),
        Value::Int32(value) => (*value).into(),
        Value::Int64(value) => (*value).into(),
        Value::UInt16(value) => (*value).into(),
        Value::UInt32(value) => (*value).into(),
        Value::UInt64(value) => (*value).into(),
        Value::Float32(value) => (*value).into(),
        Value::Float64(value) => (*value).into(),
        Value::String(value) => value.clone().into(),
        Value::Bytes(bytes) | Value::Opaque(bytes) => BASE64_STANDARD.encode(bytes).into(),
    }
}

#[cfg(test)]
mod tests {
    use nrbf_stream::records::parser::NrbfReader;

    use crate::renderers::json::node_json;

    fn var_string(text: &str) -> Vec<u8> {
        let mut out = vec![text.len() as u8];
        out.extend_from_slice(text.as_bytes());
        out
    }

    fn header(root_id: i32) -> Vec<u8> {
        let mut out = vec![0x00];
        out.extend(root_id.to_le_bytes());
        out.extend((-1i32).to_le_bytes());
        out.extend(1i32.to_le_bytes());
        out.extend(0i32.to_le_bytes());
        out
    }

    #[test]
    fn can_serialize_a_class_node() {
        let mut bytes = header(1);
        bytes.push(0x04); // SystemClassWithMembersAndTypes
        bytes.extend(1i32.to_le_bytes());
        bytes.extend(var_string("Pair"));
        bytes.extend(2i32.to_le_bytes());
        bytes.extend(var_string("a"));
        bytes.extend(var_string("b"));
        bytes.extend([0x00, 0x00]);
        bytes.extend([0x08, 0x08]);
        bytes.extend(7i32.to_le_bytes());
        bytes.extend(42i32.to_le_bytes());
        bytes.push(0x0b);

        let result = NrbfReader::from(&bytes).parse().unwrap();
        let document = node_json(&result.graph, result.graph.root(), &mut vec![]);

        assert_eq!(document["Type"], "ROOT");
        assert!(document["Id"].is_null()); // the root has no wire id
        let pair = &document["Members"][0];
        assert_eq!(pair["Id"], 1);
        assert_eq!(pair["Type"], "Pair");
        assert_eq!(pair["Members"][0]["Name"], "a");
        assert_eq!(pair["Members"][0]["Value"], 7);
        assert_eq!(pair["Members"][1]["Name"], "b");
        assert_eq!(pair["Members"][1]["Value"], 42);
    }

    #[test]
    fn cycles_are_cut_with_a_reference_marker() {
        let mut bytes = header(1);
        // Two classes that reference each other
        for (object_id, other) in [(1i32, 2i32), (2, 1)] {
            bytes.push(0x04);
            bytes.extend(object_id.to_le_bytes());
            bytes.extend(var_string(if object_id == 1 { "A" } else { "B" }));
            bytes.extend(1i32.to_le_bytes());
            bytes.extend(var_string("next"));
            bytes.push(0x02); // Object
            bytes.push(0x09); // MemberReference
            bytes.extend(other.to_le_bytes());
        }
        bytes.push(0x0b);

        let result = NrbfReader::from(&bytes).parse().unwrap();
        let document = node_json(&result.graph, result.graph.root(), &mut vec![]);

        // A -> B -> A stops at the marker instead of recursing
        let a = &document["Members"][0];
        let b = &a["Members"][0];
        assert_eq!(b["Type"], "B");
        let marker = &b["Members"][0];
        assert_eq!(marker["Id"], 1);
        assert_eq!(marker["Ref"], true);
    }
}
