use edgeplan_botman::client::*;
use edgeplan_botman::{CONTENT_PROTECTION_RULE_SEQUENCE_TYPE, ContentProtectionRuleSequence, MockBotman};
use edgeplan_cloud::{ActionType, ApiError, CloudError, Engine, ResourceConfig, ResourceSet, StateManager};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

const CONFIG_ID: i64 = 43253;
const VERSION: i64 = 15;
const POLICY: &str = "AAAA_81230";
const ADDRESS: &str = "botman_content_protection_rule_sequence.test";

const CREATE_IDS: [&str; 3] = [
    "fake3f89-e179-4892-89cf-d5e623ba9dc7",
    "fake85df-e399-43e8-bb0f-c0d980a88e4f",
    "fake09b8-4fd5-430e-a061-1c61df1d2ac2",
];

const UPDATE_IDS: [&str; 3] = [
    "fake85df-e399-43e8-bb0f-c0d980a88e4f",
    "fake3f89-e179-4892-89cf-d5e623ba9dc7",
    "fake09b8-4fd5-430e-a061-1c61df1d2ac2",
];

fn engine(client: &Arc<MockBotman>, dir: &TempDir) -> Engine {
    Engine::new(StateManager::new(dir.path()))
        .register(Arc::new(ContentProtectionRuleSequence::new(client.clone())))
}

fn desired(config: Value) -> ResourceSet {
    ResourceSet::new().with(ResourceConfig::new(
        CONTENT_PROTECTION_RULE_SEQUENCE_TYPE,
        "test",
        config,
    ))
}

fn config(ids: &[&str]) -> Value {
    json!({
        "config_id": CONFIG_ID,
        "security_policy_id": POLICY,
        "content_protection_rule_ids": ids,
    })
}

fn update_request(ids: &[&str]) -> Option<UpdateContentProtectionRuleSequenceRequest> {
    Some(UpdateContentProtectionRuleSequenceRequest {
        config_id: CONFIG_ID,
        version: VERSION,
        security_policy_id: POLICY.to_string(),
        content_protection_rule_sequence: ContentProtectionRuleUuidSequence::new(ids.iter().copied()),
    })
}

fn get_request() -> Option<GetContentProtectionRuleSequenceRequest> {
    Some(GetContentProtectionRuleSequenceRequest {
        config_id: CONFIG_ID,
        version: VERSION,
        security_policy_id: POLICY.to_string(),
    })
}

fn recorded_ids(attributes: &Value) -> Vec<&str> {
    attributes["content_protection_rule_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_then_reorder() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockBotman::new().with_config_version(CONFIG_ID, VERSION));
    client
        .update_content_protection_rule_sequence
        .expect(
            update_request(&CREATE_IDS),
            Ok(ContentProtectionRuleUuidSequence::new(CREATE_IDS)),
        )
        .once();
    client
        .get_content_protection_rule_sequence
        .expect(get_request(), Ok(ContentProtectionRuleUuidSequence::new(CREATE_IDS)))
        .times(2);
    client
        .update_content_protection_rule_sequence
        .expect(
            update_request(&UPDATE_IDS),
            Ok(ContentProtectionRuleUuidSequence::new(UPDATE_IDS)),
        )
        .once();
    client
        .get_content_protection_rule_sequence
        .expect(get_request(), Ok(ContentProtectionRuleUuidSequence::new(UPDATE_IDS)))
        .once();

    let engine = engine(&client, &dir);
    let result = engine.apply(&desired(config(&CREATE_IDS))).await.unwrap();
    assert!(result.is_success(), "{:?}", result.errors());

    let state = engine.state_manager().load().await.unwrap();
    let recorded = state.get_resource(ADDRESS).unwrap();
    assert_eq!(recorded.id, "43253:AAAA_81230");
    assert_eq!(recorded_ids(&recorded.attributes), CREATE_IDS.to_vec());

    let plan = engine.plan(&desired(config(&UPDATE_IDS))).await.unwrap();
    assert_eq!(
        plan.action_for(ADDRESS).map(|a| a.action_type),
        Some(ActionType::Update)
    );

    let result = engine.apply(&desired(config(&UPDATE_IDS))).await.unwrap();
    assert!(result.is_success(), "{:?}", result.errors());

    let plan = engine.plan(&desired(config(&UPDATE_IDS))).await.unwrap();
    assert!(!plan.has_changes);

    let state = engine.state_manager().load().await.unwrap();
    let recorded = state.get_resource(ADDRESS).unwrap();
    assert_eq!(recorded.id, "43253:AAAA_81230");
    assert_eq!(recorded_ids(&recorded.attributes), UPDATE_IDS.to_vec());

    client.assert_expectations();
}

#[tokio::test]
async fn test_missing_required_fields() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockBotman::new());
    let engine = engine(&client, &dir);

    let mut missing_config_id = config(&CREATE_IDS);
    missing_config_id.as_object_mut().unwrap().remove("config_id");
    let err = engine.apply(&desired(missing_config_id)).await.unwrap_err();
    assert!(matches!(err, CloudError::MissingRequiredArgument(_)));
    assert_eq!(err.to_string(), "Missing required argument: config_id");

    let mut missing_policy = config(&CREATE_IDS);
    missing_policy.as_object_mut().unwrap().remove("security_policy_id");
    let err = engine.apply(&desired(missing_policy)).await.unwrap_err();
    assert_eq!(err.to_string(), "Missing required argument: security_policy_id");

    client.assert_expectations();
}

#[tokio::test]
async fn test_api_error_surfaces_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockBotman::new().with_config_version(CONFIG_ID, VERSION));
    client
        .update_content_protection_rule_sequence
        .expect(
            update_request(&CREATE_IDS),
            Err(ApiError::new(500, "Internal Server Error")
                .with_type("internal_error")
                .with_detail("Error fetching data")),
        )
        .once();

    let engine = engine(&client, &dir);
    let result = engine.apply(&desired(config(&CREATE_IDS))).await.unwrap();

    assert!(!result.is_success());
    assert_eq!(
        result.errors(),
        vec!["Title: Internal Server Error; Type: internal_error; Detail: Error fetching data"]
    );
    assert!(engine.state_manager().load().await.unwrap().get_resource(ADDRESS).is_none());
    client.assert_expectations();
}

#[tokio::test]
async fn test_destroy_only_forgets() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockBotman::new().with_config_version(CONFIG_ID, VERSION));
    client.update_content_protection_rule_sequence.expect(
        update_request(&CREATE_IDS),
        Ok(ContentProtectionRuleUuidSequence::new(CREATE_IDS)),
    );
    client
        .get_content_protection_rule_sequence
        .expect(get_request(), Ok(ContentProtectionRuleUuidSequence::new(CREATE_IDS)));

    let engine = engine(&client, &dir);
    engine.apply(&desired(config(&CREATE_IDS))).await.unwrap();

    let result = engine.destroy().await.unwrap();
    assert!(result.is_success());
    assert!(engine.state_manager().load().await.unwrap().resources.is_empty());
    assert_eq!(client.update_content_protection_rule_sequence.received().len(), 1);
}

#[tokio::test]
async fn test_import() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockBotman::new().with_config_version(CONFIG_ID, VERSION));
    client
        .get_content_protection_rule_sequence
        .expect(get_request(), Ok(ContentProtectionRuleUuidSequence::new(CREATE_IDS)));

    let engine = engine(&client, &dir);
    let imported = engine
        .import(CONTENT_PROTECTION_RULE_SEQUENCE_TYPE, "test", "43253:AAAA_81230")
        .await
        .unwrap();
    assert_eq!(imported.attributes["config_id"], json!(CONFIG_ID));
    assert_eq!(imported.attributes["security_policy_id"], json!(POLICY));
    assert_eq!(recorded_ids(&imported.attributes), CREATE_IDS.to_vec());

    let plan = engine.plan(&desired(config(&CREATE_IDS))).await.unwrap();
    assert!(!plan.has_changes);

    let err = engine
        .import(CONTENT_PROTECTION_RULE_SEQUENCE_TYPE, "other", "AAAA_81230")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid resource ID: AAAA_81230");
}
