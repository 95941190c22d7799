//! Common test utilities for integration tests
//!
//! - rustls crypto provider setup
//! - an in-process mock Vault on an ephemeral port
//! - [`RecordingClient`], an in-memory role and mount client with fault injection

#![allow(dead_code, reason = "each test binary uses a different subset")]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Once};
use vault_mock_server::{AppState, RunningServer};
use vault_role_provider::config::VaultClientConfig;
use vault_role_provider::provider::{BackendMount, MountClient, RoleClient, VaultRoleClient};
use vault_role_provider::reconciler::ValidatedRole;
use vault_role_provider::resource::{RemoteRoleState, RoleId};

pub const ROOT_TOKEN: &str = "test-root-token";

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` to ensure it's only called once across all tests.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

/// Start a mock Vault and a client pointed at it
pub async fn start_mock_vault() -> (RunningServer, Arc<VaultRoleClient>) {
    init_rustls();
    let server = vault_mock_server::spawn(AppState::new(ROOT_TOKEN))
        .await
        .expect("Failed to start mock Vault");
    let client = client_for(&server.url(), ROOT_TOKEN);
    (server, client)
}

pub fn client_for(address: &str, token: &str) -> Arc<VaultRoleClient> {
    init_rustls();
    Arc::new(
        VaultRoleClient::new(&VaultClientConfig::new(address, token))
            .expect("Failed to create Vault client"),
    )
}

/// Behaviour switches for [`RecordingClient`]
#[derive(Debug, Default, Clone)]
pub struct Faults {
    /// `write` fails with this message
    pub fail_writes: Option<String>,
    /// `write` reports success but nothing is stored
    pub lose_writes: bool,
    /// `delete` reports success but the role stays
    pub ignore_deletes: bool,
    /// `read` appends this ARN to `policy_arns`
    pub extra_policy_arn: Option<String>,
}

/// In-memory client that records every call as `"<op> <target>"`
#[derive(Debug, Default)]
pub struct RecordingClient {
    roles: Mutex<BTreeMap<RoleId, RemoteRoleState>>,
    calls: Mutex<Vec<String>>,
    faults: Mutex<Faults>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_faults(faults: Faults) -> Arc<Self> {
        Arc::new(Self {
            faults: Mutex::new(faults),
            ..Self::default()
        })
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<RoleId> {
        self.roles.lock().unwrap().keys().cloned().collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn faults(&self) -> Faults {
        self.faults.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoleClient for RecordingClient {
    async fn write(&self, id: &RoleId, role: &ValidatedRole) -> Result<RemoteRoleState> {
        self.record(format!("write {id}"));
        let faults = self.faults();
        if let Some(message) = faults.fail_writes {
            anyhow::bail!(message);
        }

        let spec = role.spec();
        let state = RemoteRoleState {
            id: id.clone(),
            name: role.name().to_string(),
            backend: role.backend().to_string(),
            credential_type: spec.credential_type(),
            policy_document: spec.policy_document().cloned(),
            policy_arns: spec.policy_arns().to_vec(),
            role_arns: spec.role_arns().to_vec(),
        };
        if !faults.lose_writes {
            self.roles.lock().unwrap().insert(id.clone(), state.clone());
        }
        Ok(state)
    }

    async fn read(&self, id: &RoleId) -> Result<Option<RemoteRoleState>> {
        self.record(format!("read {id}"));
        let extra = self.faults().extra_policy_arn;
        Ok(self.roles.lock().unwrap().get(id).cloned().map(|mut state| {
            state.policy_arns.extend(extra);
            state
        }))
    }

    async fn delete(&self, id: &RoleId) -> Result<()> {
        self.record(format!("delete {id}"));
        if !self.faults().ignore_deletes {
            self.roles.lock().unwrap().remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl MountClient for RecordingClient {
    async fn mount(&self, mount: &BackendMount) -> Result<()> {
        self.record(format!("mount {}", mount.path));
        Ok(())
    }

    async fn unmount(&self, path: &str) -> Result<()> {
        self.record(format!("unmount {path}"));
        Ok(())
    }

    async fn list_roles(&self, path: &str) -> Result<Vec<String>> {
        self.record(format!("list {path}"));
        Ok(self
            .roles
            .lock()
            .unwrap()
            .keys()
            .filter(|id| id.backend() == path)
            .map(|id| id.name().to_string())
            .collect())
    }
}
