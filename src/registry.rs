//! Named signature registries.
//!
//! A signature file is a flat JSON object mapping names to type
//! expressions:
//!
//! ```json
//! {
//!     "user.ids": "Array[Integer]",
//!     "user.tags": "Set[String]",
//!     "event.payload": "Map[String, Untyped]"
//! }
//! ```
//!
//! Declaration order is preserved so reports list signatures the way the
//! file does. Deserialization goes through `serde_path_to_error` to keep
//! the JSON path in malformed-file diagnostics.

use indexmap::IndexMap;
use thiserror::Error;

use crate::descriptor::Descriptor;
use crate::expr::{self, TypeExprError};

#[derive(Clone, Debug, Default)]
pub struct Signatures {
    entries: IndexMap<String, Descriptor>,
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("malformed signature file at {path}: {source}")]
    Json {
        /// JSON path to the offending node, e.g. `user.ids`.
        path: String,
        source: serde_json::Error,
    },
    #[error("signature `{name}`: {source}")]
    Type { name: String, source: TypeExprError },
}

impl Signatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a signature file. Every value must be a well-formed type
    /// expression; the first bad one aborts with its signature name.
    pub fn from_json(src: &str) -> Result<Self, SignatureError> {
        let de = &mut serde_json::Deserializer::from_str(src);
        let raw: IndexMap<String, String> = serde_path_to_error::deserialize(de)
            .map_err(|err| {
                let path = err.path().to_string();
                SignatureError::Json { path, source: err.into_inner() }
            })?;
        let mut out = Self { entries: IndexMap::with_capacity(raw.len()) };
        for (name, text) in raw {
            let descriptor = expr::parse_type(&text)
                .map_err(|source| SignatureError::Type { name: name.clone(), source })?;
            out.entries.insert(name, descriptor);
        }
        Ok(out)
    }

    /// Register or replace a signature programmatically.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: Descriptor) {
        self.entries.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.entries.get(name)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn parses_a_signature_file_in_declaration_order() {
        let src = r#"{
            "user.ids": "Array[Integer]",
            "user.tags": "Set[String]",
            "event.payload": "Map[String, Untyped]"
        }"#;
        let sigs = Signatures::from_json(src).unwrap();
        assert_eq!(sigs.len(), 3);
        assert_eq!(
            sigs.names().collect::<Vec<_>>(),
            vec!["user.ids", "user.tags", "event.payload"]
        );
        assert_eq!(sigs.get("user.ids"), Some(&Descriptor::array_of(Descriptor::integer())));
        assert!(sigs.get("missing").is_none());
    }

    #[test]
    fn looked_up_descriptors_validate_values() {
        let sigs = Signatures::from_json(r#"{"xs": "Array[Union[Integer, Nil]]"}"#).unwrap();
        let d = sigs.get("xs").unwrap();
        assert!(d.validate(&Value::Array(vec![Value::Int(1), Value::Nil])));
        assert!(!d.validate(&Value::Array(vec![Value::str("no")])));
    }

    #[test]
    fn bad_type_expression_reports_the_signature_name() {
        let err = Signatures::from_json(r#"{"ok": "Integer", "bad": "Array[Wat]"}"#).unwrap_err();
        match err {
            SignatureError::Type { name, source } => {
                assert_eq!(name, "bad");
                assert_eq!(source, TypeExprError::UnknownType { name: "Wat".to_string(), pos: 6 });
            }
            other => panic!("expected a type error, got: {other}"),
        }
    }

    #[test]
    fn non_string_entry_reports_the_json_path() {
        let err = Signatures::from_json(r#"{"user.ids": ["Array[Integer]"]}"#).unwrap_err();
        match err {
            SignatureError::Json { path, .. } => assert_eq!(path, "user.ids"),
            other => panic!("expected a json error, got: {other}"),
        }
    }

    #[test]
    fn insert_replaces_without_reordering() {
        let mut sigs = Signatures::new();
        sigs.insert("a", Descriptor::integer());
        sigs.insert("b", Descriptor::string());
        sigs.insert("a", Descriptor::untyped_array());
        assert_eq!(sigs.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(sigs.get("a"), Some(&Descriptor::untyped_array()));
    }
}
