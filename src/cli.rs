//! # VROLECTL CLI
//!
//! Command-line interface for Vault AWS secrets engine roles.
//!
//! ## Usage
//!
//! ```bash
//! # Create or update every role defined in a YAML/JSON file
//! vrolectl apply --file roles.yaml
//!
//! # Show the remote state of a role
//! vrolectl read aws/roles/deploy
//!
//! # Reconstruct the configuration of an existing role
//! vrolectl import aws/roles/deploy
//!
//! # Delete a role
//! vrolectl destroy aws/roles/deploy
//!
//! # List roles under a backend
//! vrolectl list aws
//!
//! # Run the acceptance scenarios (requires VAULT_ACC=1)
//! vrolectl acceptance --scenario basic --scenario import
//! ```
//!
//! Connection settings come from `VAULT_ADDR`, `VAULT_TOKEN` and
//! `VAULT_NAMESPACE`; `--address` overrides `VAULT_ADDR`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vault_role_provider::acceptance::{fixtures, run_suite};
use vault_role_provider::config::{AcceptanceConfig, VaultClientConfig};
use vault_role_provider::observability::{gather_metrics, init_tracing, register_metrics};
use vault_role_provider::provider::{MountClient, VaultRoleClient};
use vault_role_provider::reconciler::{ReconcileError, Reconciler};
use vault_role_provider::resource::{load_role_configs, RoleId};

/// Vault AWS secrets engine role CLI
#[derive(Parser)]
#[command(name = "vrolectl", version)]
#[command(
    about = "Manage Vault AWS secrets engine roles",
    long_about = None,
    after_help = "\
Role identifiers have the form <backend>/roles/<name>.

Examples:
  vrolectl apply --file roles.yaml
  vrolectl import aws/roles/deploy --output yaml
  vrolectl list team/aws
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vault address (overrides VAULT_ADDR)
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// Print Prometheus metrics after the command completes
    #[arg(long, global = true)]
    metrics: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the roles defined in a file
    Apply {
        /// YAML or JSON file with one role or a list of roles
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Show the remote state of a role
    Read {
        /// Role identifier (<backend>/roles/<name>)
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Reconstruct the configuration of an existing role
    Import {
        /// Role identifier (<backend>/roles/<name>)
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Delete a role
    Destroy {
        /// Role identifier (<backend>/roles/<name>)
        #[arg(value_name = "ID")]
        id: String,
    },
    /// List the roles under a backend
    List {
        /// Backend mount path
        #[arg(value_name = "BACKEND")]
        backend: String,
    },
    /// Run the acceptance scenarios against the configured Vault
    Acceptance {
        /// Scenario to run (repeatable; defaults to all)
        #[arg(short, long, value_enum)]
        scenario: Vec<ScenarioName>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioName {
    Basic,
    Import,
    Nested,
}

impl ScenarioName {
    fn as_str(self) -> &'static str {
        match self {
            Self::Basic => fixtures::SCENARIO_BASIC,
            Self::Import => fixtures::SCENARIO_IMPORT,
            Self::Nested => fixtures::SCENARIO_NESTED,
        }
    }
}

fn render<T: serde::Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn parse_id(id: &str) -> Result<RoleId> {
    RoleId::parse(id).map_err(Into::into)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ring is the only crypto provider compiled in; install it before any TLS use
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let acceptance_config = AcceptanceConfig::from_env();
    init_tracing(&acceptance_config.log_level);
    register_metrics()?;

    let cli = Cli::parse();
    tracing::debug!("vrolectl {}", vault_role_provider::version_string());

    let mut client_config = VaultClientConfig::from_env()?;
    if let Some(address) = cli.address {
        client_config.address = address;
    }
    let client = Arc::new(VaultRoleClient::new(&client_config)?);
    let reconciler = Reconciler::new(Arc::<VaultRoleClient>::clone(&client));

    let result = match cli.command {
        Commands::Apply { file } => apply_command(&reconciler, &file, cli.output).await,
        Commands::Read { id } => read_command(&reconciler, &id, cli.output).await,
        Commands::Import { id } => import_command(&reconciler, &id, cli.output).await,
        Commands::Destroy { id } => destroy_command(&reconciler, &id).await,
        Commands::List { backend } => list_command(client.as_ref(), &backend, cli.output).await,
        Commands::Acceptance { scenario } => {
            acceptance_command(&reconciler, client, &acceptance_config, &scenario).await
        }
    };

    if cli.metrics {
        print!("{}", gather_metrics()?);
    }
    result
}

async fn apply_command(reconciler: &Reconciler, file: &Path, output: OutputFormat) -> Result<()> {
    let configs = load_role_configs(file)?;
    let mut states = Vec::with_capacity(configs.len());
    for config in &configs {
        let state = reconciler
            .apply(config)
            .await
            .with_context(|| format!("Failed to apply role {:?}", config.name))?;
        states.push(state);
    }
    render(output, &states)
}

async fn read_command(reconciler: &Reconciler, id: &str, output: OutputFormat) -> Result<()> {
    let id = parse_id(id)?;
    match reconciler.refresh(&id).await? {
        Some(state) => render(output, &state),
        None => Err(ReconcileError::NotFound(id).into()),
    }
}

async fn import_command(reconciler: &Reconciler, id: &str, output: OutputFormat) -> Result<()> {
    let config = reconciler.import(id).await?;
    render(output, &config)
}

async fn destroy_command(reconciler: &Reconciler, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    reconciler.destroy(&id).await?;
    println!("Destroyed {id}");
    Ok(())
}

async fn list_command(client: &VaultRoleClient, backend: &str, output: OutputFormat) -> Result<()> {
    let names = client.list_roles(backend).await?;
    render(output, &names)
}

async fn acceptance_command(
    reconciler: &Reconciler,
    client: Arc<VaultRoleClient>,
    config: &AcceptanceConfig,
    selected: &[ScenarioName],
) -> Result<()> {
    if !config.enabled {
        anyhow::bail!(
            "Acceptance scenarios create and delete Vault mounts; set VAULT_ACC=1 to run them"
        );
    }
    if !config.has_aws_credentials() {
        tracing::warn!(
            "AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY not set; backends get empty root credentials"
        );
    }

    let scenarios: Vec<_> = fixtures::all_scenarios(config)
        .into_iter()
        .filter(|scenario| {
            selected.is_empty() || selected.iter().any(|name| name.as_str() == scenario.name)
        })
        .collect();

    let report = run_suite(
        reconciler,
        client as Arc<dyn MountClient>,
        scenarios,
        config.max_concurrent_scenarios,
    )
    .await;

    for passed in &report.passed {
        println!("PASS {} ({} steps)", passed.scenario, passed.steps);
    }
    for failed in &report.failed {
        println!("FAIL {failed}");
    }
    if !report.is_success() {
        anyhow::bail!(
            "{} of {} scenarios failed",
            report.failed.len(),
            report.failed.len() + report.passed.len()
        );
    }
    Ok(())
}
