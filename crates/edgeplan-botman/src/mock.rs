//! In-memory [`Botman`] client driven by call expectations

use crate::client::*;
use async_trait::async_trait;
use edgeplan_cloud::mock::{MockCalls, assert_no_problems};

pub struct MockBotman {
    pub get_content_protection_rule_sequence:
        MockCalls<GetContentProtectionRuleSequenceRequest, ContentProtectionRuleUuidSequence>,
    pub update_content_protection_rule_sequence:
        MockCalls<UpdateContentProtectionRuleSequenceRequest, ContentProtectionRuleUuidSequence>,
    pub modifiable_config_version: MockCalls<ConfigVersionRequest, i64>,
    pub latest_config_version: MockCalls<ConfigVersionRequest, i64>,
}

impl Default for MockBotman {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBotman {
    pub fn new() -> Self {
        Self {
            get_content_protection_rule_sequence: MockCalls::new(
                "GetContentProtectionRuleSequence",
            ),
            update_content_protection_rule_sequence: MockCalls::new(
                "UpdateContentProtectionRuleSequence",
            ),
            modifiable_config_version: MockCalls::new("ModifiableConfigVersion"),
            latest_config_version: MockCalls::new("LatestConfigVersion"),
        }
    }

    /// Answer every version lookup of `config_id` with `version`
    pub fn with_config_version(self, config_id: i64, version: i64) -> Self {
        let request = ConfigVersionRequest { config_id };
        self.modifiable_config_version
            .expect(Some(request.clone()), Ok(version));
        self.latest_config_version.expect(Some(request), Ok(version));
        self
    }

    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        problems.extend(self.get_content_protection_rule_sequence.problems());
        problems.extend(self.update_content_protection_rule_sequence.problems());
        problems
    }

    /// Version lookups are not checked; they are incidental to every call
    pub fn assert_expectations(&self) {
        assert_no_problems(self.problems());
    }
}

#[async_trait]
impl Botman for MockBotman {
    async fn get_content_protection_rule_sequence(
        &self,
        request: GetContentProtectionRuleSequenceRequest,
    ) -> ApiResult<ContentProtectionRuleUuidSequence> {
        self.get_content_protection_rule_sequence.call(request)
    }

    async fn update_content_protection_rule_sequence(
        &self,
        request: UpdateContentProtectionRuleSequenceRequest,
    ) -> ApiResult<ContentProtectionRuleUuidSequence> {
        self.update_content_protection_rule_sequence.call(request)
    }

    async fn modifiable_config_version(&self, request: ConfigVersionRequest) -> ApiResult<i64> {
        self.modifiable_config_version.call(request)
    }

    async fn latest_config_version(&self, request: ConfigVersionRequest) -> ApiResult<i64> {
        self.latest_config_version.call(request)
    }
}
