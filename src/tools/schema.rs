//! Tool argument schemas
//!
//! A small typed description of a tool's arguments. It renders to the JSON
//! Schema advertised to the model and checks incoming arguments before a tool
//! ever sees them.

use serde_json::{json, Map, Value};

/// JSON type of a single argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Number,
    Integer,
    Boolean,
}

impl ArgType {
    /// JSON Schema type name
    pub fn json_type(self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Number => "number",
            ArgType::Integer => "integer",
            ArgType::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ArgType::String => value.is_string(),
            ArgType::Number => value.is_number(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
            ArgType::Boolean => value.is_boolean(),
        }
    }
}

/// One named argument
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: String,
    pub kind: ArgType,
    pub description: String,
    pub required: bool,
}

/// Ordered set of arguments accepted by a tool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSchema {
    args: Vec<ArgSpec>,
}

impl ArgSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required argument
    pub fn required(self, name: &str, kind: ArgType, description: &str) -> Self {
        self.push(name, kind, description, true)
    }

    /// Add an optional argument
    pub fn optional(self, name: &str, kind: ArgType, description: &str) -> Self {
        self.push(name, kind, description, false)
    }

    fn push(mut self, name: &str, kind: ArgType, description: &str, required: bool) -> Self {
        self.args.retain(|a| a.name != name);
        self.args.push(ArgSpec {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required,
        });
        self
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    /// Render as an object JSON Schema
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for arg in &self.args {
            properties.insert(
                arg.name.clone(),
                json!({
                    "type": arg.kind.json_type(),
                    "description": arg.description,
                }),
            );
        }

        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check call arguments. Unknown keys are tolerated.
    pub fn validate(&self, arguments: &Value) -> std::result::Result<(), String> {
        let object = arguments
            .as_object()
            .ok_or_else(|| "arguments must be a JSON object".to_string())?;

        for arg in &self.args {
            match object.get(&arg.name) {
                None | Some(Value::Null) if arg.required => {
                    return Err(format!("missing required argument '{}'", arg.name));
                }
                None | Some(Value::Null) => {}
                Some(value) if !arg.kind.accepts(value) => {
                    return Err(format!(
                        "argument '{}' must be a {}",
                        arg.name,
                        arg.kind.json_type()
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}
