//! Conjunctive equality filters over document fields.

use serde_json::{Map, Value};

use assetdesk_core::DocumentId;

/// Equality conditions that must all hold, optionally excluding one document.
///
/// Paths are field names; a dot descends into nested objects (`specs.os`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
    exclude: Option<DocumentId>,
}

impl Filter {
    /// Matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((path.into(), value.into()));
        self
    }

    /// Add the condition only when a value is given (optional query parameters).
    pub fn eq_opt<V: Into<Value>>(self, path: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.eq(path, value),
            None => self,
        }
    }

    pub fn excluding(mut self, id: impl Into<DocumentId>) -> Self {
        self.exclude = Some(id.into());
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn excluded(&self) -> Option<DocumentId> {
        self.exclude
    }

    pub fn matches(&self, id: DocumentId, body: &Value) -> bool {
        if self.exclude == Some(id) {
            return false;
        }
        self.conditions
            .iter()
            .all(|(path, expected)| body.pointer(&pointer(path)) == Some(expected))
    }

    /// The conditions as one nested object, suitable for JSONB containment (`@>`).
    pub fn to_containment(&self) -> Value {
        let mut root = Map::new();
        for (path, expected) in &self.conditions {
            let segments: Vec<&str> = path.split('.').collect();
            insert_path(&mut root, &segments, expected.clone());
        }
        Value::Object(root)
    }
}

fn insert_path(node: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            node.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = node
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

fn pointer(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('.') {
        out.push('/');
        out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    out
}
