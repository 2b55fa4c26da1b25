//! Rule document builder
//!
//! Turns a `rules_<format>` configuration block into a [`Rules`] document.
//! The root rule is the one named `default`; some fields are only allowed on
//! it and some only below it.

use crate::case::to_lower_camel;
use crate::error::{OptionalField, Result, RuleError};
use crate::mappings::{Conversion, RuleFormat};
use crate::reader::{self, RuleItem, RulesSchemaReader};
use crate::rules::{
    CriteriaMustSatisfy, RuleBehavior, RuleCustomOverride, RuleOptions, RuleOptionsMap,
    RuleVariable, Rules, RulesUpdate,
};
use serde_json::{Map, Value};

/// Name of the root rule
pub const DEFAULT_RULE: &str = "default";

const LOCKED: &str = "locked";
const ITEM_UUID: &str = "uuid";
const ITEM_TEMPLATE_UUID: &str = "template_uuid";

pub struct RulesBuilder<'a> {
    reader: RulesSchemaReader<'a>,
    format: &'a RuleFormat,
}

impl<'a> RulesBuilder<'a> {
    /// Builder for the rules block of `config`, using the mapping tables of
    /// the block's rule format
    pub fn new(config: &'a Value) -> Result<Self> {
        let reader = RulesSchemaReader::new(config)?;
        let format = RuleFormat::lookup(reader.rule_format());
        Ok(Self { reader, format })
    }

    /// Use `format`'s mapping tables instead of the block's own
    pub fn with_format(mut self, format: &'a RuleFormat) -> Self {
        self.format = format;
        self
    }

    pub fn rule_format(&self) -> &str {
        self.reader.rule_format()
    }

    pub fn build(&self) -> Result<Rules> {
        let name = self.reader.get_string(reader::NAME)?;
        let is_default = name == DEFAULT_RULE;

        tracing::debug!(
            rule = %name,
            format = %self.reader.rule_format(),
            "building rules"
        );

        let variables = self.rule_variables(is_default)?;
        let criteria_must_satisfy = self.rule_criteria_must_satisfy(is_default)?;
        let criteria_locked = self.rule_criteria_locked(is_default)?;
        let is_secure = self.rule_is_secure(is_default)?;
        let advanced_override = self.rule_advanced_override(is_default)?;
        let custom_override = self.rule_custom_override(is_default)?;
        let criteria = self.rule_criteria(is_default)?;
        let behaviors = self.rule_behaviors()?;
        let children = self.rule_children()?;

        let optional_string = |key: &str| self.reader.get_string(key).optional();

        Ok(Rules {
            name,
            advanced_override,
            behaviors,
            children,
            comments: optional_string(reader::COMMENTS)?,
            criteria,
            criteria_locked,
            criteria_must_satisfy,
            custom_override,
            options: RuleOptions { is_secure },
            uuid: optional_string(reader::UUID)?,
            template_uuid: optional_string(reader::TEMPLATE_UUID)?,
            template_link: optional_string(reader::TEMPLATE_LINK)?,
            variables,
        })
    }

    fn rule_variables(&self, is_default: bool) -> Result<Vec<RuleVariable>> {
        let variables = self.reader.variables().optional()?;
        Ok(only_for_default(is_default, reader::VARIABLE, variables)?.unwrap_or_default())
    }

    fn rule_criteria_must_satisfy(&self, is_default: bool) -> Result<Option<CriteriaMustSatisfy>> {
        let value = self
            .reader
            .get_string(reader::CRITERIA_MUST_SATISFY)
            .optional()?;
        let value = not_for_default(is_default, reader::CRITERIA_MUST_SATISFY, value)?;

        value
            .map(|s| {
                s.parse().map_err(|message| RuleError::InvalidValue {
                    path: reader::CRITERIA_MUST_SATISFY.to_string(),
                    message,
                })
            })
            .transpose()
    }

    fn rule_criteria_locked(&self, is_default: bool) -> Result<bool> {
        let locked = self.reader.get_bool(reader::CRITERIA_LOCKED).optional()?;
        Ok(not_for_default(is_default, reader::CRITERIA_LOCKED, locked)?.unwrap_or(false))
    }

    fn rule_is_secure(&self, is_default: bool) -> Result<bool> {
        let secure = self.reader.get_bool(reader::IS_SECURE).optional()?;
        Ok(only_for_default(is_default, reader::IS_SECURE, secure)?.unwrap_or(false))
    }

    fn rule_advanced_override(&self, is_default: bool) -> Result<Option<String>> {
        let value = self
            .reader
            .get_string(reader::ADVANCED_OVERRIDE)
            .optional()?;
        only_for_default(is_default, reader::ADVANCED_OVERRIDE, value)
    }

    fn rule_custom_override(&self, is_default: bool) -> Result<Option<RuleCustomOverride>> {
        let value = self.reader.custom_override().optional()?;
        only_for_default(is_default, reader::CUSTOM_OVERRIDE, value)
    }

    fn rule_criteria(&self, is_default: bool) -> Result<Vec<RuleBehavior>> {
        let items = self.reader.criteria().optional()?;
        match not_for_default(is_default, reader::CRITERION, items)? {
            Some(items) => self.build_rule_behaviors(items),
            None => Ok(Vec::new()),
        }
    }

    fn rule_behaviors(&self) -> Result<Vec<RuleBehavior>> {
        match self.reader.behaviors().optional()? {
            Some(items) => self.build_rule_behaviors(items),
            None => Ok(Vec::new()),
        }
    }

    fn rule_children(&self) -> Result<Vec<Rules>> {
        let Some(children) = self.reader.children().optional()? else {
            return Ok(Vec::new());
        };

        children
            .iter()
            .enumerate()
            .map(|(index, document)| {
                serde_json::from_str::<RulesUpdate>(document)
                    .map(|update| update.rules)
                    .map_err(|source| RuleError::InvalidChild { index, source })
            })
            .collect()
    }

    fn build_rule_behaviors(&self, items: Vec<RuleItem>) -> Result<Vec<RuleBehavior>> {
        items
            .into_iter()
            .map(|RuleItem { name, item: mut options }| -> Result<RuleBehavior> {
                let path = name.clone();
                let locked = take_bool(&mut options, LOCKED, &path)?;
                let uuid = take_string(&mut options, ITEM_UUID, &path)?;
                let template_uuid = take_string(&mut options, ITEM_TEMPLATE_UUID, &path)?;

                let name = self.format.map_name(to_lower_camel(&name));
                let options = self.map_keys_to_camel_case(options);
                let options = self.remap_option_values(&name, options)?;

                tracing::trace!(behavior = %name, options = options.len(), "built rule item");

                Ok(RuleBehavior {
                    name,
                    options,
                    locked,
                    uuid,
                    template_uuid,
                })
            })
            .collect()
    }

    fn map_keys_to_camel_case(&self, options: Map<String, Value>) -> RuleOptionsMap {
        options
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(key, value)| {
                let value = match value {
                    Value::Object(nested) => Value::Object(self.map_keys_to_camel_case(nested)),
                    Value::Array(items) => Value::Array(
                        items
                            .into_iter()
                            .map(|item| match item {
                                Value::Object(nested) => {
                                    Value::Object(self.map_keys_to_camel_case(nested))
                                }
                                other => other,
                            })
                            .collect(),
                    ),
                    other => other,
                };
                (self.format.map_name(to_lower_camel(&key)), value)
            })
            .collect()
    }

    /// Apply the format's conversions to every option under `prefix`
    fn remap_option_values(&self, prefix: &str, options: RuleOptionsMap) -> Result<RuleOptionsMap> {
        let mut remapped = Map::new();

        for (option, value) in options {
            let path = format!("{}.{}", prefix, option);

            let value = match self.format.conversion(&path, &value) {
                Conversion::Identity => Some(value),
                Conversion::Replace(literal) => Some(literal.to_value()),
                Conversion::FlattenSingle => flatten_single(&path, value)?,
            };

            let Some(value) = value else {
                continue;
            };

            let value = match value {
                Value::Object(nested) => Value::Object(self.remap_option_values(&path, nested)?),
                other => other,
            };
            remapped.insert(option, value);
        }

        Ok(remapped)
    }
}

/// Build the rule document of `config`
pub fn build_rules(config: &Value) -> Result<Rules> {
    RulesBuilder::new(config)?.build()
}

fn flatten_single(path: &str, value: Value) -> Result<Option<Value>> {
    let Value::Array(mut items) = value else {
        return Err(RuleError::UnexpectedType {
            path: path.to_string(),
            expected: "list",
        });
    };

    match items.len() {
        0 | 1 => Ok(items.pop()),
        len => Err(RuleError::FlattenMultiple {
            path: path.to_string(),
            len,
        }),
    }
}

fn only_for_default<T>(is_default: bool, field: &'static str, value: Option<T>) -> Result<Option<T>> {
    if !is_default && value.is_some() {
        return Err(RuleError::OnlyForDefault(field));
    }
    Ok(value)
}

fn not_for_default<T>(is_default: bool, field: &'static str, value: Option<T>) -> Result<Option<T>> {
    if is_default && value.is_some() {
        return Err(RuleError::NotForDefault(field));
    }
    Ok(value)
}

fn take_bool(options: &mut Map<String, Value>, key: &str, item: &str) -> Result<bool> {
    match options.remove(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(_) => Err(RuleError::UnexpectedType {
            path: format!("{}.{}", item, key),
            expected: "bool",
        }),
    }
}

fn take_string(options: &mut Map<String, Value>, key: &str, item: &str) -> Result<Option<String>> {
    match options.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(RuleError::UnexpectedType {
            path: format!("{}.{}", item, key),
            expected: "string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_metadata_is_lifted() {
        let config = json!({"rules_v2023_01_05": [{
            "name": "default",
            "behavior": [{"cp_code": [{
                "locked": true,
                "uuid": "b-1",
                "template_uuid": "",
                "value": [{"id": 12345, "description": null}],
            }]}],
        }]});

        let rules = build_rules(&config).unwrap();
        let behavior = &rules.behaviors[0];
        assert_eq!(behavior.name, "cpCode");
        assert!(behavior.locked);
        assert_eq!(behavior.uuid.as_deref(), Some("b-1"));
        assert_eq!(behavior.template_uuid, None);
        assert_eq!(json!(behavior.options), json!({"value": {"id": 12345}}));
    }

    #[test]
    fn test_nested_keys_are_camel_cased_and_mapped() {
        let config = json!({"rules_latest": {
            "name": "default",
            "behavior": [{"verify_json_web_token": [{
                "enable_es256": true,
                "jwt_claims": [{"claim_name": "sub"}],
            }]}],
        }});

        let rules = build_rules(&config).unwrap();
        assert_eq!(rules.behaviors[0].name, "verifyJsonWebToken");
        assert_eq!(
            json!(rules.behaviors[0].options),
            json!({"enableES256": true, "jwtClaims": [{"claimName": "sub"}]})
        );
    }

    #[test]
    fn test_replacement_in_nested_object() {
        let config = json!({"rules_v2023_01_05": {
            "name": "default",
            "behavior": [{"site_shield": [{
                "ssmap": [{"value": "ss.example.com", "has_mixed_hosts": "true"}],
            }]}],
        }});

        let rules = build_rules(&config).unwrap();
        assert_eq!(
            json!(rules.behaviors[0].options),
            json!({"ssmap": {"value": "ss.example.com", "hasMixedHosts": true}})
        );
    }

    #[test]
    fn test_flatten_non_list_is_unexpected_type() {
        let config = json!({"rules_v2023_01_05": {
            "name": "default",
            "behavior": [{"origin": [{"net_storage": "not-a-list"}]}],
        }});

        match build_rules(&config) {
            Err(RuleError::UnexpectedType { path, expected }) => {
                assert_eq!(path, "origin.netStorage");
                assert_eq!(expected, "list");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_must_satisfy() {
        let config = json!({"rules_latest": {"name": "child", "criteria_must_satisfy": "most"}});
        assert!(matches!(
            build_rules(&config),
            Err(RuleError::InvalidValue { .. })
        ));
    }
}
