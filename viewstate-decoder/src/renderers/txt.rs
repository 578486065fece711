use std::io::Write;

use base64::{prelude::BASE64_STANDARD, Engine};

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

pub struct Txt<'a> {
    /// Data that is setup from the application's runtime
    pub config: &'a Config,
    /// Handle to the output we want to write the graph to
    out: Box<dyn Write>,
}

impl<'a> Renderer<'a> for Txt<'a> {
    fn new(config: &'a Config) -> Result<Self, RuntimeError> {
        Ok(Txt {
            config,
            out: config.writer()?,
        })
    }

    fn render(&mut self) -> Result<(), RuntimeError> {
        let config = self.config;
        self.render_stream(&config.stream, true)?;
        self.out.flush().map_err(RuntimeError::DiskError)
    }
}

impl Txt<'_> {
    fn render_stream(&mut self, stream: &ParsedStream, outer: bool) -> Result<(), RuntimeError> {
        if !outer {
            writeln!(self.out).map_err(RuntimeError::DiskError)?;
            writeln!(self.out, "Embedded payload:").map_err(RuntimeError::DiskError)?;
        }
        self.render_node(&stream.graph, stream.graph.root(), 0, &mut vec![])?;
        for nested in &stream.nested {
            self.render_stream(nested, false)?;
        }
        Ok(())
    }

    /// Write one `Type name = value` line per node, children indented below it
    fn render_node(
        &mut self,
        graph: &ObjectGraph,
        idx: NodeId,
        depth: usize,
        visiting: &mut Vec<NodeId>,
    ) -> Result<(), RuntimeError> {
        let indent = "  ".repeat(depth);
        let node = graph.node(idx);

        if visiting.contains(&idx) {
            return writeln!(self.out, "{indent}-> {}", node.id).map_err(RuntimeError::DiskError);
        }

        let mut line = format!("{indent}{}", node.node_type.as_deref().unwrap_or("?"));
        if let Some(name) = &node.name {
            line.push_str(&format!(" {name}"));
        }
        if node.id != NO_OBJECT_ID {
            line.push_str(&format!(" #{}", node.id));
        }
        if let Some(value) = &node.value {
            line.push_str(&format!(" = {}", value_text(value)));
        }
        writeln!(self.out, "{line}").map_err(RuntimeError::DiskError)?;

        visiting.push(idx);
        for member in &node.members {
            self.render_node(graph, *member, depth + 1, visiting)?;
        }
        visiting.pop();
        Ok(())
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "Null".to_string(),
        Value::Bool(value) => value.to_string(),
        Value::Byte(value) => value.to_string(),
        Value::Int16(value) => value.to_string(),
        Value::Int32(value) => value.to_string(),
        Value::Int64(value) => value.to_string(),
        Value::UInt16(value) => value.to_string(),
        Value::UInt32(value) => value.to_string(),
        Value::UInt64(value) => value.to_string(),
        Value::Float32(value) => value.to_string(),
        Value::Float64(value) => value.to_string(),
        Value::String(value) => format!("{value:?}"),
        Value::Bytes(bytes) | Value::Opaque(bytes) => BASE64_STANDARD.encode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use nrbf_stream::records::models::Value;

    use crate::renderers::txt::value_text;

    #[test]
    fn strings_are_quoted() {
        assert_eq!(value_text(&Value::String("hi".to_string())), "\"hi\"");
    }

    #[test]
    fn nulls_are_spelled_out() {
        assert_eq!(value_text(&Value::Null), "Null");
    }

    #[test]
    fn bytes_render_as_base64() {
        assert_eq!(value_text(&Value::Bytes(vec![0, 1, 2, 3])), "AAECAw==");
    }
}
