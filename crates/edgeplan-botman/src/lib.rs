//! edgeplan bot manager resources
//!
//! `botman_content_protection_rule_sequence` keeps the evaluation order of
//! the content protection rules of a security policy. Unlike the GTM sets,
//! the rule id list is ordered: reordering it plans an update.

pub mod client;
pub mod error;
pub mod mock;
pub mod sequence;

// Re-exports
pub use client::Botman;
pub use error::{BotmanError, Result};
pub use mock::MockBotman;
pub use sequence::{
    CONTENT_PROTECTION_RULE_SEQUENCE_TYPE, ContentProtectionRuleSequence,
    content_protection_rule_sequence_schema,
};
