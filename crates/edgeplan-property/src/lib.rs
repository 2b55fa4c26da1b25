//! edgeplan property rules
//!
//! Builds the rule tree document sent to the property API from a declarative
//! `rules_<format>` block.
//!
//! ```text
//! config (snake_case, nested lists)
//!     │  RulesSchemaReader   field extraction, NotFound for unset fields
//!     ▼
//! RulesBuilder               root / non-root constraints, children
//!     │  case + mappings     lowerCamel keys, per-format conversions
//!     ▼
//! Rules (camelCase JSON)
//! ```
//!
//! The per-format tables in [`mappings`] replace any guessing about option
//! shapes: an option is flattened or replaced only when the table for its
//! `<behavior>.<option>` path says so.

pub mod builder;
pub mod case;
pub mod error;
pub mod mappings;
pub mod reader;
pub mod rules;

// Re-exports
pub use builder::{DEFAULT_RULE, RulesBuilder, build_rules};
pub use error::{Result, RuleError};
pub use mappings::{Conversion, Literal, RuleFormat};
pub use reader::{RuleItem, RulesSchemaReader};
pub use rules::{
    CriteriaMustSatisfy, RuleBehavior, RuleCustomOverride, RuleOptions, RuleOptionsMap,
    RuleVariable, Rules, RulesUpdate,
};
