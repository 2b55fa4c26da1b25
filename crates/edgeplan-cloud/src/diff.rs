//! Attribute-level diff between desired configuration and recorded state

use crate::schema::ResourceSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single top-level attribute that differs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub attribute: String,

    /// Normalized recorded value, `None` when unset
    pub before: Option<Value>,

    /// Normalized desired value, `None` when unset
    pub after: Option<Value>,

    /// Whether the change forces a replacement
    pub force_new: bool,
}

impl std::fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: &Option<Value>| match v {
            Some(v) => v.to_string(),
            None => "(unset)".to_string(),
        };
        write!(
            f,
            "{}: {} -> {}{}",
            self.attribute,
            show(&self.before),
            show(&self.after),
            if self.force_new {
                " (forces replacement)"
            } else {
                ""
            }
        )
    }
}

/// Compare `desired` against `recorded` attribute by attribute.
///
/// Both sides are normalized with the schema first, so reordering a set
/// attribute never produces a change while reordering a list does.
pub fn diff(schema: &ResourceSchema, desired: &Value, recorded: &Value) -> Vec<AttributeChange> {
    schema
        .attributes
        .iter()
        .filter(|a| !a.computed)
        .filter_map(|attribute| {
            let after = attribute.normalized_in(desired);
            let before = attribute.normalized_in(recorded);
            if after == before {
                return None;
            }
            tracing::trace!(attribute = attribute.name, "attribute differs");
            Some(AttributeChange {
                attribute: attribute.name.to_string(),
                before,
                after,
                force_new: attribute.force_new,
            })
        })
        .collect()
}

/// Whether any change in `changes` requires replacing the resource
pub fn requires_replace(changes: &[AttributeChange]) -> bool {
    changes.iter().any(|c| c.force_new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeKind};
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new(vec![
            Attribute::value("id").computed(),
            Attribute::value("domain").force_new(),
            Attribute::value("name"),
            Attribute::set(
                "assignment",
                AttributeKind::Block(vec![
                    Attribute::value("datacenter_id"),
                    Attribute::set("countries", AttributeKind::Value),
                ]),
            ),
            Attribute::list("sequence", AttributeKind::Value),
            Attribute::value("wait_on_complete").with_default(json!(true)),
        ])
    }

    fn recorded() -> Value {
        json!({
            "id": "example.net:map",
            "domain": "example.net",
            "name": "map",
            "assignment": [
                {"datacenter_id": 1, "countries": ["GB", "PL"]},
                {"datacenter_id": 2, "countries": ["AU"]},
            ],
            "sequence": ["a", "b"],
            "wait_on_complete": true,
        })
    }

    #[test]
    fn test_reordered_set_has_no_changes() {
        let desired = json!({
            "domain": "example.net",
            "name": "map",
            "assignment": [
                {"datacenter_id": 2, "countries": ["AU"]},
                {"datacenter_id": 1, "countries": ["PL", "GB"]},
            ],
            "sequence": ["a", "b"],
        });
        assert!(diff(&schema(), &desired, &recorded()).is_empty());
    }

    #[test]
    fn test_reordered_list_changes() {
        let mut desired = recorded();
        desired["sequence"] = json!(["b", "a"]);
        let changes = diff(&schema(), &desired, &recorded());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].attribute, "sequence");
        assert!(!requires_replace(&changes));
    }

    #[test]
    fn test_only_changed_attribute_is_reported() {
        let mut desired = recorded();
        desired["name"] = json!("renamed");
        desired["assignment"] = json!([
            {"datacenter_id": 2, "countries": ["AU"]},
            {"datacenter_id": 1, "countries": ["PL", "GB"]},
        ]);
        let changes = diff(&schema(), &desired, &recorded());
        let names: Vec<_> = changes.iter().map(|c| c.attribute.as_str()).collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_force_new_attribute() {
        let mut desired = recorded();
        desired["domain"] = json!("other.net");
        let changes = diff(&schema(), &desired, &recorded());
        assert!(requires_replace(&changes));
        assert_eq!(
            changes[0].to_string(),
            "domain: \"example.net\" -> \"other.net\" (forces replacement)"
        );
    }

    #[test]
    fn test_default_matches_recorded_value() {
        let mut desired = recorded();
        desired.as_object_mut().unwrap().remove("wait_on_complete");
        assert!(diff(&schema(), &desired, &recorded()).is_empty());

        desired["wait_on_complete"] = json!(false);
        let changes = diff(&schema(), &desired, &recorded());
        assert_eq!(changes[0].attribute, "wait_on_complete");
    }
}
