//! The domain object contract
//!
//! Views never own domain objects: the storage collaborator hands them over for
//! the duration of one request, and the views only read their JSON projection,
//! their attributes (for URL synthesis) and their optional links.

use crate::core::field::FieldValue;
use serde_json::{Map, Value};

/// An entity exposed through the HAL views
///
/// # Example
///
/// ```rust,ignore
/// impl DomainObject for Workout {
///     fn json(&self) -> Map<String, Value> {
///         let mut map = Map::new();
///         map.insert("id".into(), self.id.into());
///         map.insert("score".into(), self.score.into());
///         map.insert("title".into(), self.name.clone().into());
///         map
///     }
///
///     fn attribute(&self, name: &str) -> Option<FieldValue> {
///         match name {
///             "id" => Some(FieldValue::from(self.id)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait DomainObject: Send + Sync + 'static {
    /// Public JSON projection of the object
    fn json(&self) -> Map<String, Value>;

    /// Look up an attribute by name
    ///
    /// Route resolution reads path parameters through this method. The default
    /// reads scalar entries of the JSON projection; override it when a path
    /// parameter is not part of the public projection.
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        self.json().get(name).and_then(FieldValue::from_json)
    }

    /// Object-level HAL links merged into the resource `_links`
    fn links(&self) -> Option<Map<String, Value>> {
        None
    }
}

impl DomainObject for Map<String, Value> {
    fn json(&self) -> Map<String, Value> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Tagged {
        id: i64,
        secret: String,
    }

    impl DomainObject for Tagged {
        fn json(&self) -> Map<String, Value> {
            let mut map = Map::new();
            map.insert("id".to_string(), json!(self.id));
            map
        }

        fn attribute(&self, name: &str) -> Option<FieldValue> {
            match name {
                "secret" => Some(FieldValue::from(self.secret.as_str())),
                other => self.json().get(other).and_then(FieldValue::from_json),
            }
        }
    }

    #[test]
    fn test_default_attribute_reads_projection() {
        let object = json!({"id": 7, "name": "run"})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(object.attribute("id"), Some(FieldValue::Integer(7)));
        assert_eq!(object.attribute("missing"), None);
        assert!(object.links().is_none());
    }

    #[test]
    fn test_attribute_override_reaches_hidden_fields() {
        let tagged = Tagged {
            id: 1,
            secret: "s3cr3t".to_string(),
        };
        assert!(!tagged.json().contains_key("secret"));
        assert_eq!(
            tagged.attribute("secret"),
            Some(FieldValue::String("s3cr3t".to_string()))
        );
        assert_eq!(tagged.attribute("id"), Some(FieldValue::Integer(1)));
    }
}
