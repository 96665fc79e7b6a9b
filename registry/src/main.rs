use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use registry::admin::{AdminState, admin_router};
use registry::auth::Auth;
use registry::settings::{Settings, redact_db_url};
use registry::source_store::SourceStore;
use sea_orm::Database;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "registry", about = "Source registry: data-source configurations per organization")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the admin API (default)
    Serve,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user in an organization
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        org: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env first so a RUST_LOG set there reaches the filter
    tracing_subscriber::fmt().with_env_filter(load_env(None)).init();

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(database = %redact_db_url(&settings.database_url), "connecting to database");

    let db = Database::connect(&settings.database_url).await?;
    Migrator::up(&db, None).await?;

    tracing::info!("database initialized");

    let auth = Arc::new(Auth::new(db.clone()));

    match cli.command {
        None | Some(Commands::Serve) => {
            let sources = SourceStore::new(db, settings.master_key);
            serve(auth, sources, settings).await?;
        }
        Some(Commands::User { action }) => {
            handle_user_action(auth, action).await?;
        }
    }

    Ok(())
}

async fn serve(
    auth: Arc<Auth>,
    sources: SourceStore,
    settings: Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    // Auto-seed the first user if none exist
    if auth.count_users().await? == 0 {
        let seed = &settings.seed_user;
        let Some(password) = seed.password.as_deref() else {
            eprintln!(
                "FATAL: REGISTRY_ADMIN_PASSWORD is not set. \
                 Set this environment variable to a strong password before starting."
            );
            std::process::exit(1);
        };

        tracing::warn!(
            username = %seed.username,
            org_id = %seed.org_id,
            "No users found, seeding initial user."
        );
        auth.create_user(&seed.username, password, &seed.org_id)
            .await?;
    }

    let state = AdminState {
        auth,
        sources,
        jwt_secret: settings.jwt_secret.clone(),
        jwt_expiry_hours: settings.jwt_expiry_hours,
    };

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "Admin API online");

    axum::serve(listener, admin_router(state, &settings.cors_allowed_origins)).await?;
    Ok(())
}

async fn handle_user_action(
    auth: Arc<Auth>,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::Create {
            username,
            password,
            org,
        } => {
            auth.create_user(&username, &password, &org).await?;
            tracing::info!(username = %username, org_id = %org, "Created user");
        }
    }
    Ok(())
}

/// Load `env_file` (or the nearest `.env`) into the process environment, then build the
/// log filter from it. Defaults to `info` when RUST_LOG is unset.
fn load_env(env_file: Option<&Path>) -> EnvFilter {
    match env_file {
        Some(path) => dotenvy::from_path(path).ok(),
        None => dotenvy::dotenv().ok().map(|_| ()),
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}
