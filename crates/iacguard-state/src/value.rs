use iacguard_types::{Range, SourcePath};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue, json};

/// Position metadata retained from the parsed template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub range: Range,
    /// `false` when the value was filled in from a platform default rather than read from the
    /// template.
    pub explicit: bool,
}

impl Metadata {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            explicit: true,
        }
    }

    pub fn defaulted(range: Range) -> Self {
        Self {
            range,
            explicit: false,
        }
    }

    pub fn filename(&self) -> &SourcePath {
        &self.range.filename
    }

    pub(crate) fn rego_fields(&self) -> Map<String, JsonValue> {
        let mut m = Map::new();
        m.insert("filepath".into(), json!(self.range.filename.as_str()));
        m.insert("startline".into(), json!(self.range.start_line));
        m.insert("endline".into(), json!(self.range.end_line));
        m.insert("explicit".into(), json!(self.explicit));
        m
    }
}

/// A scalar attribute plus where it came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Value<T> {
    pub value: T,
    pub metadata: Metadata,
}

pub type BoolValue = Value<bool>;
pub type IntValue = Value<i64>;
pub type StringValue = Value<String>;

impl<T> Value<T> {
    pub fn new(value: T, metadata: Metadata) -> Self {
        Self { value, metadata }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn is_explicit(&self) -> bool {
        self.metadata.explicit
    }
}

impl BoolValue {
    pub fn is_true(&self) -> bool {
        self.value
    }

    pub fn is_false(&self) -> bool {
        !self.value
    }
}

impl StringValue {
    pub fn equals_ignore_case(&self, other: &str) -> bool {
        self.value.eq_ignore_ascii_case(other)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Export to the serialized fact format consumed by the policy engine.
pub trait ToRego {
    fn to_rego(&self) -> JsonValue;
}

impl<T: Serialize> ToRego for Value<T> {
    fn to_rego(&self) -> JsonValue {
        let mut m = self.metadata.rego_fields();
        m.insert(
            "value".into(),
            serde_json::to_value(&self.value).unwrap_or(JsonValue::Null),
        );
        JsonValue::Object(m)
    }
}

impl<T: ToRego> ToRego for Vec<T> {
    fn to_rego(&self) -> JsonValue {
        JsonValue::Array(self.iter().map(ToRego::to_rego).collect())
    }
}

/// Build a resource object: its own metadata under `__metadata` plus the given attributes.
pub(crate) fn resource_object(metadata: &Metadata, fields: Vec<(&str, JsonValue)>) -> JsonValue {
    let mut m = Map::new();
    m.insert(
        "__metadata".into(),
        JsonValue::Object(metadata.rego_fields()),
    );
    for (k, v) in fields {
        m.insert(k.to_string(), v);
    }
    JsonValue::Object(m)
}
