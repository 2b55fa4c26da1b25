//! Field extraction from a rules configuration block

use crate::error::{Result, RuleError};
use crate::mappings::format_from_key;
use crate::rules::{RuleCustomOverride, RuleVariable};
use serde::Deserialize;
use serde_json::{Map, Value};

pub(crate) const NAME: &str = "name";
pub(crate) const COMMENTS: &str = "comments";
pub(crate) const UUID: &str = "uuid";
pub(crate) const TEMPLATE_UUID: &str = "template_uuid";
pub(crate) const TEMPLATE_LINK: &str = "template_link";
pub(crate) const IS_SECURE: &str = "is_secure";
pub(crate) const ADVANCED_OVERRIDE: &str = "advanced_override";
pub(crate) const CRITERIA_LOCKED: &str = "criteria_locked";
pub(crate) const CRITERIA_MUST_SATISFY: &str = "criteria_must_satisfy";
pub(crate) const CUSTOM_OVERRIDE: &str = "custom_override";
pub(crate) const VARIABLE: &str = "variable";
pub(crate) const BEHAVIOR: &str = "behavior";
pub(crate) const CRITERION: &str = "criterion";
pub(crate) const CHILDREN: &str = "children";

/// A behavior or criterion as written in the configuration: its snake_case
/// name and its raw option map
#[derive(Debug, Clone, PartialEq)]
pub struct RuleItem {
    pub name: String,
    pub item: Map<String, Value>,
}

/// Reads typed fields out of the single `rules_<format>` block of a
/// configuration object.
///
/// Absent, null and zero-valued fields (`""`, `false`, `[]`, `{}`) are all
/// reported as [`RuleError::NotFound`], which is how the configuration
/// framework reports unset optional attributes.
#[derive(Debug)]
pub struct RulesSchemaReader<'a> {
    format: String,
    block: &'a Map<String, Value>,
}

impl<'a> RulesSchemaReader<'a> {
    pub fn new(config: &'a Value) -> Result<Self> {
        let root = config.as_object().ok_or_else(|| RuleError::UnexpectedType {
            path: "(root)".to_string(),
            expected: "object",
        })?;

        let mut blocks: Vec<(&String, String)> = root
            .keys()
            .filter_map(|k| format_from_key(k).map(|f| (k, f)))
            .collect();

        let (key, format) = match blocks.len() {
            0 => return Err(RuleError::MissingRuleFormat),
            1 => blocks.remove(0),
            _ => {
                return Err(RuleError::MultipleRuleFormats(
                    blocks.into_iter().map(|(k, _)| k.clone()).collect(),
                ));
            }
        };

        let block = single_object(&root[key.as_str()], key)?;
        Ok(Self { format, block })
    }

    /// Rule format version, e.g. `v2023-01-05`
    pub fn rule_format(&self) -> &str {
        &self.format
    }

    fn get(&self, key: &str) -> Result<&'a Value> {
        self.block
            .get(key)
            .filter(|v| !is_unset(v))
            .ok_or_else(|| RuleError::NotFound(key.to_string()))
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| unexpected(key, "string"))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)?
            .as_bool()
            .ok_or_else(|| unexpected(key, "bool"))
    }

    fn get_list(&self, key: &str) -> Result<&'a Vec<Value>> {
        self.get(key)?
            .as_array()
            .ok_or_else(|| unexpected(key, "list"))
    }

    pub fn variables(&self) -> Result<Vec<RuleVariable>> {
        self.get_list(VARIABLE)?
            .iter()
            .enumerate()
            .map(|(index, v)| -> Result<RuleVariable> {
                let path = format!("{}.{}", VARIABLE, index);
                let fields = v
                    .as_object()
                    .ok_or_else(|| unexpected(&path, "object"))?;
                serde_json::from_value(Value::Object(without_nulls(fields))).map_err(|e| {
                    RuleError::InvalidValue {
                        path,
                        message: e.to_string(),
                    }
                })
            })
            .collect()
    }

    pub fn custom_override(&self) -> Result<RuleCustomOverride> {
        #[derive(Deserialize)]
        struct CustomOverrideBlock {
            name: String,
            override_id: String,
        }

        let fields = single_object(self.get(CUSTOM_OVERRIDE)?, CUSTOM_OVERRIDE)?;
        let block: CustomOverrideBlock = serde_json::from_value(Value::Object(without_nulls(
            fields,
        )))
        .map_err(|e| RuleError::InvalidValue {
            path: CUSTOM_OVERRIDE.to_string(),
            message: e.to_string(),
        })?;

        Ok(RuleCustomOverride {
            name: block.name,
            override_id: block.override_id,
        })
    }

    pub fn behaviors(&self) -> Result<Vec<RuleItem>> {
        self.items(BEHAVIOR)
    }

    pub fn criteria(&self) -> Result<Vec<RuleItem>> {
        self.items(CRITERION)
    }

    /// Each list entry names exactly one item: `{ "<name>": [ {options} ] }`
    fn items(&self, kind: &'static str) -> Result<Vec<RuleItem>> {
        let mut items = Vec::new();

        for (index, entry) in self.get_list(kind)?.iter().enumerate() {
            let path = format!("{}.{}", kind, index);
            let entry = entry
                .as_object()
                .ok_or_else(|| unexpected(&path, "object"))?;

            let set: Vec<(&String, &Value)> = entry.iter().filter(|(_, v)| !is_unset(v)).collect();
            if set.len() != 1 {
                return Err(RuleError::AmbiguousItem {
                    kind,
                    index,
                    found: set.len(),
                });
            }

            let (name, value) = set[0];
            let options = single_object(value, &format!("{}.{}", path, name))?;
            items.push(RuleItem {
                name: name.clone(),
                item: options.clone(),
            });
        }

        Ok(items)
    }

    /// Serialized child rule documents
    pub fn children(&self) -> Result<Vec<&'a str>> {
        self.get_list(CHILDREN)?
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.as_str()
                    .ok_or_else(|| unexpected(&format!("{}.{}", CHILDREN, index), "string"))
            })
            .collect()
    }
}

/// A block given either as an object or as a list holding one object
fn single_object<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) => match items.as_slice() {
            [Value::Object(map)] => Ok(map),
            [_] | [] => Err(unexpected(path, "single object")),
            many => Err(RuleError::FlattenMultiple {
                path: path.to_string(),
                len: many.len(),
            }),
        },
        _ => Err(unexpected(path, "object")),
    }
}

fn without_nulls(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn unexpected(path: &str, expected: &'static str) -> RuleError {
    RuleError::UnexpectedType {
        path: path.to_string(),
        expected,
    }
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}
