use edgeplan_cloud::{ActionType, ApiError, Engine, ResourceConfig, ResourceSet, StateManager};
use edgeplan_gtm::MockGtm;
use edgeplan_gtm::client::*;
use edgeplan_gtm::{GtmResource, RESOURCE_TYPE, StatusPoll};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const DOMAIN: &str = "test_domain";
const NAME: &str = "tfexample_resource_1";
const ADDRESS: &str = "gtm_resource.tfexample_resource_1";

fn engine(client: &Arc<MockGtm>, dir: &TempDir) -> Engine {
    let poll = StatusPoll {
        interval: Duration::from_millis(1),
        max_polls: 3,
    };
    Engine::new(StateManager::new(dir.path()))
        .register(Arc::new(GtmResource::new(client.clone()).with_status_poll(poll)))
}

fn desired(config: Value) -> ResourceSet {
    ResourceSet::new().with(ResourceConfig::new(RESOURCE_TYPE, NAME, config))
}

fn status(propagation: &str, message: &str) -> ResponseStatus {
    ResponseStatus {
        message: message.to_string(),
        propagation_status: propagation.to_string(),
        passing_validation: propagation != "DENIED",
        ..Default::default()
    }
}

fn complete() -> ResponseStatus {
    status(
        "COMPLETE",
        "Current configuration has been propagated to all GTM nameservers",
    )
}

fn instance(datacenter_id: i64, load_object: &str, servers: &[&str]) -> ResourceInstance {
    ResourceInstance {
        datacenter_id,
        use_default_load_object: false,
        load_object: LoadObject {
            load_object: load_object.to_string(),
            load_object_port: 80,
            load_servers: servers.iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn remote(instances: Vec<ResourceInstance>) -> Resource {
    Resource {
        name: NAME.to_string(),
        resource_type: "XML load object via HTTP".to_string(),
        aggregation_type: "latest".to_string(),
        resource_instances: instances,
        ..Default::default()
    }
}

fn basic_remote() -> Resource {
    remote(vec![instance(3131, "/test1", &["1.2.3.4", "1.2.3.5", "1.2.3.6"])])
}

fn config(instances: Value) -> Value {
    json!({
        "domain": DOMAIN,
        "name": NAME,
        "type": "XML load object via HTTP",
        "aggregation_type": "latest",
        "resource_instance": instances,
        "wait_on_complete": true,
    })
}

fn basic_config() -> Value {
    config(json!([{
        "datacenter_id": 3131,
        "load_object": "/test1",
        "load_object_port": 80,
        "load_servers": ["1.2.3.4", "1.2.3.5", "1.2.3.6"],
    }]))
}

fn get_request() -> Option<GetResourceRequest> {
    Some(GetResourceRequest {
        domain_name: DOMAIN.to_string(),
        resource_name: NAME.to_string(),
    })
}

fn mock_create(client: &MockGtm, returned: Resource) {
    client.get_resource.expect(get_request(), Err(ApiError::not_found())).once();
    client
        .create_resource
        .expect(
            None,
            Ok(CreateResourceResponse {
                resource: returned,
                status: complete(),
            }),
        )
        .once();
    client.get_domain_status.expect(None, Ok(complete()));
}

#[tokio::test]
async fn test_create_and_update() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    mock_create(&client, basic_remote());
    client.get_resource.expect(get_request(), Ok(basic_remote())).once();

    let updated = remote(vec![instance(3131, "/test2", &["1.2.3.4", "1.2.3.5", "1.2.3.6"])]);
    client
        .update_resource
        .expect(
            Some(UpdateResourceRequest {
                domain_name: DOMAIN.to_string(),
                resource: updated.clone(),
            }),
            Ok(StatusResponse { status: complete() }),
        )
        .once();

    let engine = engine(&client, &dir);
    let result = engine.apply(&desired(basic_config())).await.unwrap();
    assert!(result.is_success(), "{:?}", result.errors());

    let recorded = engine.state_manager().load().await.unwrap();
    let recorded = recorded.get_resource(ADDRESS).unwrap();
    assert_eq!(recorded.attributes["name"], json!(NAME));
    assert_eq!(recorded.attributes["aggregation_type"], json!("latest"));

    let update = config(json!([{
        "datacenter_id": 3131,
        "load_object": "/test2",
        "load_object_port": 80,
        "load_servers": ["1.2.3.4", "1.2.3.5", "1.2.3.6"],
    }]));
    let result = engine.apply(&desired(update)).await.unwrap();
    assert!(result.is_success(), "{:?}", result.errors());
    assert_eq!(result.succeeded.len(), 1);

    client.assert_expectations();
}

#[tokio::test]
async fn test_removed_outside_plans_create() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    mock_create(&client, basic_remote());
    client.get_resource.expect(get_request(), Err(ApiError::not_found())).once();

    let engine = engine(&client, &dir);
    engine.apply(&desired(basic_config())).await.unwrap();

    let plan = engine.plan(&desired(basic_config())).await.unwrap();
    assert_eq!(plan.summary().create, 1);
    client.assert_expectations();
}

#[tokio::test]
async fn test_create_failed() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    client.get_resource.expect(get_request(), Err(ApiError::not_found())).once();
    client
        .create_resource
        .expect(None, Err(ApiError::new(400, "Bad Request")));

    let result = engine(&client, &dir)
        .apply(&desired(basic_config()))
        .await
        .unwrap();

    assert_eq!(
        result.errors(),
        vec!["resource create error: Title: Bad Request; Type: ; Detail: "]
    );
    client.assert_expectations();
}

#[tokio::test]
async fn test_create_failed_already_exists() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    client.get_resource.expect(get_request(), Ok(basic_remote())).once();

    let result = engine(&client, &dir)
        .apply(&desired(basic_config()))
        .await
        .unwrap();

    assert_eq!(result.errors(), vec!["resource already exists error"]);
    client.assert_expectations();
}

#[tokio::test]
async fn test_create_denied() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    client.get_resource.expect(get_request(), Err(ApiError::not_found())).once();
    client.create_resource.expect(
        None,
        Ok(CreateResourceResponse {
            resource: basic_remote(),
            status: status("DENIED", "Request could not be completed. Invalid credentials."),
        }),
    );

    let result = engine(&client, &dir)
        .apply(&desired(basic_config()))
        .await
        .unwrap();

    assert!(result.errors()[0].contains("Request could not be completed. Invalid credentials."));
    assert!(client.get_domain_status.received().is_empty());
    client.assert_expectations();
}

fn order_remote() -> Resource {
    remote(vec![
        instance(3131, "/test1", &["1.2.3.4", "1.2.3.5", "1.2.3.6"]),
        instance(3132, "/test2", &["1.2.3.7", "1.2.3.8", "1.2.3.9", "1.2.3.10"]),
    ])
}

fn order_config(first: Value, second: Value, reversed: bool) -> Value {
    let instances = if reversed {
        json!([second, first])
    } else {
        json!([first, second])
    };
    config(instances)
}

fn dc1(servers: &[&str]) -> Value {
    json!({"datacenter_id": 3131, "load_object": "/test1", "load_object_port": 80, "load_servers": servers})
}

fn dc2(servers: &[&str]) -> Value {
    json!({"datacenter_id": 3132, "load_object": "/test2", "load_object_port": 80, "load_servers": servers})
}

async fn plan_after_order_create(update: Value) -> Option<ActionType> {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    mock_create(&client, order_remote());
    client.get_resource.expect(get_request(), Ok(order_remote()));

    let engine = engine(&client, &dir);
    let create = order_config(
        dc1(&["1.2.3.4", "1.2.3.5", "1.2.3.6"]),
        dc2(&["1.2.3.7", "1.2.3.8", "1.2.3.9", "1.2.3.10"]),
        false,
    );
    let result = engine.apply(&desired(create)).await.unwrap();
    assert!(result.is_success(), "{:?}", result.errors());

    let plan = engine.plan(&desired(update)).await.unwrap();
    client.assert_expectations();
    plan.action_for(ADDRESS).map(|a| a.action_type)
}

#[tokio::test]
async fn test_reordered_load_servers_no_diff() {
    let update = order_config(
        dc1(&["1.2.3.6", "1.2.3.4", "1.2.3.5"]),
        dc2(&["1.2.3.10", "1.2.3.9", "1.2.3.8", "1.2.3.7"]),
        false,
    );
    assert_eq!(plan_after_order_create(update).await, Some(ActionType::NoOp));
}

#[tokio::test]
async fn test_reordered_resource_instance_no_diff() {
    let update = order_config(
        dc1(&["1.2.3.4", "1.2.3.5", "1.2.3.6"]),
        dc2(&["1.2.3.7", "1.2.3.8", "1.2.3.9", "1.2.3.10"]),
        true,
    );
    assert_eq!(plan_after_order_create(update).await, Some(ActionType::NoOp));
}

#[tokio::test]
async fn test_reordered_resource_instance_and_load_servers_no_diff() {
    let update = order_config(
        dc1(&["1.2.3.5", "1.2.3.6", "1.2.3.4"]),
        dc2(&["1.2.3.8", "1.2.3.7", "1.2.3.10", "1.2.3.9"]),
        true,
    );
    assert_eq!(plan_after_order_create(update).await, Some(ActionType::NoOp));
}

#[tokio::test]
async fn test_changed_name_forces_replacement() {
    let mut update = order_config(
        dc1(&["1.2.3.4", "1.2.3.5", "1.2.3.6"]),
        dc2(&["1.2.3.7", "1.2.3.8", "1.2.3.9", "1.2.3.10"]),
        false,
    );
    update["name"] = json!("tfexample_resource_2");
    assert_eq!(plan_after_order_create(update).await, Some(ActionType::Replace));
}

#[tokio::test]
async fn test_reordered_and_changed_load_servers_is_update() {
    let update = order_config(
        dc1(&["1.2.3.6", "1.2.3.4", "1.2.3.99"]),
        dc2(&["1.2.3.7", "1.2.3.8", "1.2.3.9", "1.2.3.10"]),
        true,
    );
    assert_eq!(plan_after_order_create(update).await, Some(ActionType::Update));
}

fn imported_remote() -> Resource {
    Resource {
        name: NAME.to_string(),
        resource_type: "XML load object via HTTP".to_string(),
        host_header: "test host".to_string(),
        least_squares_decay: 1.0,
        description: "test description".to_string(),
        leader_string: "test string".to_string(),
        constrained_property: "test property".to_string(),
        aggregation_type: "latest".to_string(),
        load_imbalance_percentage: 1.0,
        upper_bound: 5,
        max_u_multiplicative_increment: 10.0,
        decay_rate: 1.0,
        resource_instances: vec![instance(3131, "/test1", &["1.2.3.4", "1.2.3.5", "1.2.3.6"])],
        links: Vec::new(),
    }
}

#[tokio::test]
async fn test_import() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    client.get_resource.expect(get_request(), Ok(imported_remote()));

    let engine = engine(&client, &dir);
    let imported = engine
        .import(RESOURCE_TYPE, NAME, &format!("{}:{}", DOMAIN, NAME))
        .await
        .unwrap();

    let attributes = &imported.attributes;
    assert_eq!(attributes["domain"], json!(DOMAIN));
    assert_eq!(attributes["name"], json!(NAME));
    assert_eq!(attributes["type"], json!("XML load object via HTTP"));
    assert_eq!(attributes["host_header"], json!("test host"));
    assert_eq!(attributes["description"], json!("test description"));
    assert_eq!(attributes["leader_string"], json!("test string"));
    assert_eq!(attributes["constrained_property"], json!("test property"));
    assert_eq!(attributes["aggregation_type"], json!("latest"));
    assert_eq!(attributes["upper_bound"], json!(5));
    assert_eq!(attributes["max_u_multiplicative_increment"], json!(10.0));
    assert_eq!(attributes["resource_instance"][0]["datacenter_id"], json!(3131));
    assert_eq!(
        attributes["resource_instance"][0]["use_default_load_object"],
        json!(false)
    );
    assert_eq!(attributes["resource_instance"][0]["load_object"], json!("/test1"));
    assert_eq!(attributes["resource_instance"][0]["load_object_port"], json!(80));
    assert_eq!(
        attributes["resource_instance"][0]["load_servers"],
        json!(["1.2.3.4", "1.2.3.5", "1.2.3.6"])
    );
    assert_eq!(attributes["wait_on_complete"], json!(true));

    let config = json!({
        "domain": DOMAIN,
        "name": NAME,
        "type": "XML load object via HTTP",
        "host_header": "test host",
        "least_squares_decay": 1,
        "description": "test description",
        "leader_string": "test string",
        "constrained_property": "test property",
        "aggregation_type": "latest",
        "load_imbalance_percentage": 1,
        "upper_bound": 5,
        "max_u_multiplicative_increment": 10,
        "decay_rate": 1,
        "resource_instance": [{
            "datacenter_id": 3131,
            "load_object": "/test1",
            "load_object_port": 80,
            "load_servers": ["1.2.3.6", "1.2.3.5", "1.2.3.4"],
        }],
    });
    let plan = engine.plan(&desired(config)).await.unwrap();
    assert!(!plan.has_changes);
    client.assert_expectations();
}

#[tokio::test]
async fn test_import_invalid_ids() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    let engine = engine(&client, &dir);

    let err = engine
        .import(RESOURCE_TYPE, NAME, &format!(":{}", NAME))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid resource ID: :tfexample_resource_1");

    let err = engine
        .import(RESOURCE_TYPE, NAME, "test_domain:")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid resource ID: test_domain:");
}

#[tokio::test]
async fn test_import_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGtm::new());
    client
        .get_resource
        .expect(get_request(), Err(ApiError::new(500, "get failed")))
        .once();

    let err = engine(&client, &dir)
        .import(RESOURCE_TYPE, NAME, &format!("{}:{}", DOMAIN, NAME))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("get failed"));
    client.assert_expectations();
}
