//! Acceptance scenarios for `vault_aws_secret_backend_role`
//!
//! The built-in scenarios (basic, import, nested) run against the in-process
//! mock Vault. `test_live_vault` runs the full suite against the Vault named by
//! `VAULT_ADDR` / `VAULT_TOKEN` when `VAULT_ACC=1` is set.

mod common;

use common::{init_rustls, start_mock_vault};
use std::sync::Arc;
use vault_role_provider::acceptance::fixtures::{self, FixtureNames};
use vault_role_provider::acceptance::{run_suite, Phase, ScenarioRunner};
use vault_role_provider::config::{AcceptanceConfig, VaultClientConfig};
use vault_role_provider::provider::{MountClient, VaultRoleClient};
use vault_role_provider::reconciler::Reconciler;

fn acceptance_config() -> AcceptanceConfig {
    AcceptanceConfig {
        aws_access_key_id: "AKIAEXAMPLE".to_string(),
        aws_secret_access_key: "example-secret".to_string().into(),
        ..AcceptanceConfig::default()
    }
}

#[tokio::test]
async fn test_aws_secret_backend_role_basic() {
    let (server, client) = start_mock_vault().await;
    let names = FixtureNames::random("tf-test-aws");
    let scenario = fixtures::basic_scenario(&names, &acceptance_config());

    let mut runner = ScenarioRunner::new(Reconciler::new(client.clone())).with_mounts(client);
    let report = runner.run(&scenario).await.unwrap();

    assert_eq!(runner.phase(), Phase::Destroyed);
    assert_eq!(report.steps, 2);
    assert_eq!(report.destroyed.len(), 3);
    assert!(report
        .destroyed
        .iter()
        .all(|id| id.starts_with(&format!("{}/roles/{}-", names.backend, names.name))));

    // Backend was unmounted as part of teardown
    assert!(server.store().mounts().await.is_empty());
}

#[tokio::test]
async fn test_aws_secret_backend_role_import() {
    let (server, client) = start_mock_vault().await;
    let names = FixtureNames::random("tf-test-aws");
    let scenario = fixtures::import_scenario(&names, &acceptance_config());

    let mut runner = ScenarioRunner::new(Reconciler::new(client.clone())).with_mounts(client);
    let report = runner.run(&scenario).await.unwrap();

    assert_eq!(report.steps, 4);
    assert!(server.store().mounts().await.is_empty());
}

#[tokio::test]
async fn test_aws_secret_backend_role_nested() {
    let (_server, client) = start_mock_vault().await;
    let names = FixtureNames::random_nested("tf-test-aws");
    assert!(names.backend.starts_with("tf-test-aws/nested-"));
    let scenario = fixtures::nested_scenario(&names, &acceptance_config());

    let mut runner = ScenarioRunner::new(Reconciler::new(client.clone())).with_mounts(client);
    let report = runner.run(&scenario).await.unwrap();

    assert!(report
        .destroyed
        .iter()
        .all(|id| id.starts_with("tf-test-aws/nested-")));
}

#[tokio::test]
async fn test_update_keeps_identifiers() {
    let (server, client) = start_mock_vault().await;
    let names = FixtureNames::random("tf-test-aws");
    client
        .mount(&vault_role_provider::provider::BackendMount::new(
            &names.backend,
            "AKIAEXAMPLE",
            "example-secret",
            "us-east-1",
        ))
        .await
        .unwrap();
    let reconciler = Reconciler::new(client.clone());

    let mut before = Vec::new();
    for (_, config) in fixtures::basic_resources(&names) {
        before.push(reconciler.apply(&config).await.unwrap().id);
    }
    let mut after = Vec::new();
    for (_, config) in fixtures::updated_resources(&names) {
        after.push(reconciler.apply(&config).await.unwrap().id);
    }
    assert_eq!(before, after);

    let mut listed = client.list_roles(&names.backend).await.unwrap();
    listed.sort();
    assert_eq!(
        listed,
        vec![
            format!("{}-policy-arn", names.name),
            format!("{}-policy-inline", names.name),
            format!("{}-role-arns", names.name),
        ]
    );

    client.unmount(&names.backend).await.unwrap();
    assert!(server.store().mounts().await.is_empty());
}

#[tokio::test]
async fn test_suite_runs_scenarios_concurrently() {
    let (server, client) = start_mock_vault().await;
    let config = AcceptanceConfig {
        max_concurrent_scenarios: 3,
        ..acceptance_config()
    };

    let report = run_suite(
        &Reconciler::new(client.clone()),
        client,
        fixtures::all_scenarios(&config),
        config.max_concurrent_scenarios,
    )
    .await;

    assert!(report.is_success(), "failures: {:?}", report.failed);
    let mut passed: Vec<_> = report.passed.iter().map(|r| r.scenario.as_str()).collect();
    passed.sort_unstable();
    assert_eq!(passed, ["basic", "import", "nested"]);
    assert!(server.store().mounts().await.is_empty());
}

#[tokio::test]
async fn test_live_vault() {
    let config = AcceptanceConfig::from_env();
    if !config.enabled {
        eprintln!("Skipping live acceptance run: set VAULT_ACC=1 to enable");
        return;
    }
    init_rustls();

    let client = Arc::new(
        VaultRoleClient::new(&VaultClientConfig::from_env().unwrap())
            .expect("Failed to create Vault client"),
    );
    let report = run_suite(
        &Reconciler::new(client.clone()),
        client as Arc<dyn MountClient>,
        fixtures::all_scenarios(&config),
        config.max_concurrent_scenarios,
    )
    .await;

    assert!(report.is_success(), "failures: {:?}", report.failed);
}
