//! Rule tree document, in the property API's JSON form

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Option bag of a behavior or criterion
pub type RuleOptionsMap = Map<String, Value>;

/// A node of the rule tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_override: Option<String>,

    #[serde(default)]
    pub behaviors: Vec<RuleBehavior>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Rules>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<RuleBehavior>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub criteria_locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_must_satisfy: Option<CriteriaMustSatisfy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_override: Option<RuleCustomOverride>,

    #[serde(default, skip_serializing_if = "RuleOptions::is_empty")]
    pub options: RuleOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_link: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<RuleVariable>,
}

/// Behavior or criterion entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBehavior {
    pub name: String,

    #[serde(default)]
    pub options: RuleOptionsMap,

    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_uuid: Option<String>,
}

/// Whether all or any criteria must match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriteriaMustSatisfy {
    All,
    Any,
}

impl std::str::FromStr for CriteriaMustSatisfy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(CriteriaMustSatisfy::All),
            "any" => Ok(CriteriaMustSatisfy::Any),
            other => Err(format!("expected 'all' or 'any', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCustomOverride {
    pub name: String,
    pub override_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOptions {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_secure: bool,
}

impl RuleOptions {
    fn is_empty(&self) -> bool {
        !self.is_secure
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleVariable {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub sensitive: bool,
}

/// Envelope used when a rule tree is sent to, or embedded as, a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    pub rules: Rules,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rules_json_shape() {
        let rules = Rules {
            name: "default".to_string(),
            behaviors: vec![RuleBehavior {
                name: "origin".to_string(),
                options: json!({"hostname": "example.com"})
                    .as_object()
                    .cloned()
                    .unwrap(),
                ..Default::default()
            }],
            options: RuleOptions { is_secure: true },
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&rules).unwrap(),
            json!({
                "name": "default",
                "behaviors": [{"name": "origin", "options": {"hostname": "example.com"}}],
                "options": {"is_secure": true},
            })
        );
    }

    #[test]
    fn test_criteria_must_satisfy_parse() {
        assert_eq!("ALL".parse(), Ok(CriteriaMustSatisfy::All));
        assert_eq!("any".parse(), Ok(CriteriaMustSatisfy::Any));
        assert!("some".parse::<CriteriaMustSatisfy>().is_err());
    }

    #[test]
    fn test_decode_api_document() {
        let update: RulesUpdate = serde_json::from_value(json!({
            "rules": {
                "name": "Compression",
                "criteriaMustSatisfy": "any",
                "criteria": [{"name": "contentType", "options": {"values": ["text/*"]}}],
                "behaviors": [{"name": "gzipResponse", "options": {"behavior": "ALWAYS"}, "locked": true}],
            }
        }))
        .unwrap();

        assert_eq!(update.rules.name, "Compression");
        assert_eq!(
            update.rules.criteria_must_satisfy,
            Some(CriteriaMustSatisfy::Any)
        );
        assert!(update.rules.behaviors[0].locked);
    }
}
