//! `nccms`: command line dashboard for the NexusCouncil CMS
//!
//! Logs in against the CMS token endpoint, keeps the session on disk and
//! drives the hero and dashboard views from the terminal.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod render;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use nccms_client::views::{Dashboard, HeroForm, HeroListView, load_hero_detail, parse_hero_id};
use nccms_client::{ClientError, CmsClient};
use nccms_core::{BgType, Config, ResourceKind, SystemClock};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};

/// Command line interface for the CMS admin
#[derive(Parser)]
#[command(
    name = "nccms",
    version = env!("CARGO_PKG_VERSION"),
    about = "NexusCouncil CMS admin",
    long_about = "Manage NexusCouncil marketing content from the terminal: log in, review the dashboard and edit hero sections."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the configuration
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Obtain and store a token pair
    Login {
        /// Account name
        username: String,

        /// Password; prompted for when omitted
        #[arg(long, env = "NCCMS_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Remember the username for the next login
        #[arg(long)]
        remember: bool,
    },

    /// Forget the stored tokens
    Logout,

    /// Show the stored session
    Status {
        /// Try to refresh the access token first
        #[arg(long)]
        refresh: bool,
    },

    /// Record counts and freshness of every collection
    Dashboard,

    /// Manage hero sections
    Hero {
        /// Hero subcommand
        #[command(subcommand)]
        action: HeroCommands,
    },

    /// Raw access to any CMS collection
    Resource {
        /// Resource subcommand
        #[command(subcommand)]
        action: ResourceCommands,
    },

    /// Validate or print the configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration
        #[arg(short, long)]
        validate: bool,
    },
}

/// Hero management commands
#[derive(Subcommand)]
enum HeroCommands {
    /// List hero sections
    List,

    /// Show one hero section
    Show {
        /// Hero id
        id: String,
    },

    /// Create a hero section
    Create {
        /// Field values
        #[command(flatten)]
        fields: HeroFields,
    },

    /// Edit a hero section; omitted fields keep their value
    Edit {
        /// Hero id
        id: String,

        /// Field values
        #[command(flatten)]
        fields: HeroFields,
    },

    /// Make a hero the only active one
    Activate {
        /// Hero id
        id: String,
    },

    /// Delete a hero section
    Delete {
        /// Hero id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Hero form fields; an empty string clears an optional field
#[derive(Args)]
struct HeroFields {
    /// Headline
    #[arg(long)]
    title: Option<String>,

    /// Sub-headline
    #[arg(long)]
    subtitle: Option<String>,

    /// Primary call-to-action label
    #[arg(long)]
    cta_primary_label: Option<String>,

    /// Primary call-to-action link
    #[arg(long)]
    cta_primary_href: Option<String>,

    /// Secondary call-to-action label
    #[arg(long)]
    cta_secondary_label: Option<String>,

    /// Secondary call-to-action link
    #[arg(long)]
    cta_secondary_href: Option<String>,

    /// Background style (pattern, image, solid)
    #[arg(long)]
    bg_type: Option<BgType>,

    /// Active flag
    #[arg(long)]
    active: Option<bool>,
}

impl HeroFields {
    fn apply(self, form: &mut HeroForm) {
        let draft = &mut form.draft;
        let assign = |target: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *target = value;
            }
        };

        assign(&mut draft.title, self.title);
        assign(&mut draft.subtitle, self.subtitle);
        assign(&mut draft.cta_primary_label, self.cta_primary_label);
        assign(&mut draft.cta_primary_href, self.cta_primary_href);
        assign(&mut draft.cta_secondary_label, self.cta_secondary_label);
        assign(&mut draft.cta_secondary_href, self.cta_secondary_href);
        if let Some(bg_type) = self.bg_type {
            draft.bg_type = bg_type;
        }
        if let Some(active) = self.active {
            draft.is_active = active;
        }
    }
}

/// Raw collection commands
#[derive(Subcommand)]
enum ResourceCommands {
    /// Print a collection as JSON
    List {
        /// Collection, e.g. faq-items
        kind: ResourceKind,
    },

    /// Print one record as JSON
    Show {
        /// Collection, e.g. faq-items
        kind: ResourceKind,
        /// Record id
        id: i64,
    },

    /// Delete one record
    Delete {
        /// Collection, e.g. faq-items
        kind: ResourceKind,
        /// Record id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    nccms_core::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "nccms starting"
    );

    if let Commands::Config { show, validate } = cli.command {
        return handle_config_command(&config, show, validate);
    }

    let client = CmsClient::from_config(&config)?;
    let outcome = match cli.command {
        Commands::Login {
            username,
            password,
            remember,
        } => login(&client, &username, password, remember).await,
        Commands::Logout => {
            client.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Status { refresh } => show_status(&client, refresh).await,
        Commands::Dashboard => {
            let dashboard = Dashboard::load(&client, &SystemClock).await;
            print!("{}", render::dashboard(&dashboard));
            Ok(())
        }
        Commands::Hero { action } => handle_hero_command(&client, action).await,
        Commands::Resource { action } => handle_resource_command(&client, action).await,
        Commands::Config { .. } => Ok(()),
    };

    outcome.map_err(|e| match e.downcast::<ClientError>() {
        Ok(client_error) => {
            error!(error = %client_error, "Command failed");
            anyhow::anyhow!(client_error.user_message())
        }
        Err(other) => other,
    })
}

/// Ask a yes/no question on stderr
fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;

    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

async fn login(
    client: &CmsClient,
    username: &str,
    password: Option<String>,
    remember: bool,
) -> Result<()> {
    let password = password.map_or_else(prompt_password, Ok)?;

    client.login(username, &password, remember).await?;
    println!("Logged in as {username}.");
    Ok(())
}

async fn show_status(client: &CmsClient, refresh: bool) -> Result<()> {
    if refresh {
        let outcome = client.refresh_session().await?;
        println!("Refresh: {outcome}");
    }
    print!("{}", render::session_status(&client.store().session()));
    println!("CMS: {}", client.api().collection_url(""));
    Ok(())
}

/// Handle hero management commands
///
/// # Errors
///
/// Returns error if the hero operation fails
async fn handle_hero_command(client: &CmsClient, action: HeroCommands) -> Result<()> {
    match action {
        HeroCommands::List => {
            let mut view = HeroListView::new(client.clone());
            view.load().await?;
            print!("{}", render::hero_table(view.heroes()));
            if view.is_read_only() {
                println!("\nRead-only mode. Log in to modify hero blocks.");
            }
        }
        HeroCommands::Show { id } => {
            let hero = load_hero_detail(client, &id).await?;
            print!("{}", render::hero_detail(&hero));
        }
        HeroCommands::Create { fields } => {
            let mut form = HeroForm::create();
            fields.apply(&mut form);
            let hero = form.submit(client).await?;
            println!("Created hero {} ({}).", hero.id, hero.display_title());
        }
        HeroCommands::Edit { id, fields } => {
            let hero = load_hero_detail(client, &id).await?;
            let mut form = HeroForm::edit(&hero);
            fields.apply(&mut form);
            let hero = form.submit(client).await?;
            println!("Updated hero {} ({}).", hero.id, hero.display_title());
        }
        HeroCommands::Activate { id } => {
            let id = parse_hero_id(&id)?;
            let mut view = loaded_hero_list(client).await?;
            view.activate(id).await?;
            println!("Hero {id} is now active.");
        }
        HeroCommands::Delete { id, yes } => {
            let id = parse_hero_id(&id)?;
            let mut view = loaded_hero_list(client).await?;
            if !yes && !confirm("Delete this hero block?")? {
                println!("Cancelled.");
                return Ok(());
            }
            view.delete(id).await?;
            println!("Deleted hero {id}.");
        }
    }
    Ok(())
}

async fn loaded_hero_list(client: &CmsClient) -> Result<HeroListView> {
    let mut view = HeroListView::new(client.clone());
    view.load().await?;
    Ok(view)
}

/// Handle raw collection commands
///
/// # Errors
///
/// Returns error if the request fails
async fn handle_resource_command(client: &CmsClient, action: ResourceCommands) -> Result<()> {
    match action {
        ResourceCommands::List { kind } => {
            let data = client.list(kind).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        ResourceCommands::Show { kind, id } => {
            let data = client.fetch(kind, id).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        ResourceCommands::Delete { kind, id, yes } => {
            if !client.is_authenticated() {
                bail!(ClientError::read_only(kind.title()));
            }
            if !yes && !confirm(&format!("Delete {} record {id}?", kind.title()))? {
                println!("Cancelled.");
                return Ok(());
            }
            client.delete(kind, id).await?;
            println!("Deleted {kind} {id}.");
        }
    }
    Ok(())
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if configuration is invalid or cannot be serialized
fn handle_config_command(config: &Config, show: bool, validate: bool) -> Result<()> {
    if validate {
        config.validate()?;
        println!("Configuration is valid.");
    }

    if show || !validate {
        let config_toml =
            toml::to_string_pretty(config).context("Failed to serialize configuration")?;
        println!("{config_toml}");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hero_create() {
        let cli = Cli::try_parse_from([
            "nccms",
            "--json",
            "hero",
            "create",
            "--title",
            "Open budget",
            "--bg-type",
            "solid",
            "--active",
            "true",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Hero {
            action: HeroCommands::Create { fields },
        } = cli.command
        else {
            panic!("expected hero create");
        };

        let mut form = HeroForm::create();
        fields.apply(&mut form);
        assert_eq!(form.draft.title, "Open budget");
        assert_eq!(form.draft.bg_type, BgType::Solid);
        assert!(form.draft.is_active);
    }

    #[test]
    fn test_parse_resource_kind() {
        let cli = Cli::try_parse_from(["nccms", "resource", "show", "faq_items", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Resource {
                action: ResourceCommands::Show {
                    kind: ResourceKind::FaqItems,
                    id: 3
                }
            }
        ));

        assert!(Cli::try_parse_from(["nccms", "resource", "list", "blog"]).is_err());
    }
}
