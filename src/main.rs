use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{fmt, EnvFilter};

use noteplane::authz::types::AdminRole;
use noteplane::{settings, storage, web};

#[derive(Parser, Debug)]
#[command(name = "noteplane", version, about = "Multi-tenant notes backend")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database) and bring the schema up to date
    let db = storage::init(&settings.database).await?;
    migration::Migrator::up(&db, None).await.into_diagnostic()?;

    // ensure a platform admin exists so the instance is administrable
    ensure_platform_admin(&db).await?;

    // start web server
    web::serve(settings, db).await?;
    Ok(())
}

async fn ensure_platform_admin(db: &sea_orm::DatabaseConnection) -> Result<()> {
    if storage::get_admin_by_email(db, "admin@example.com")
        .await
        .into_diagnostic()?
        .is_none()
    {
        storage::create_admin(
            db,
            storage::NewAdmin {
                first_name: "Platform".to_string(),
                last_name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                phone: String::new(),
                password: "password123".to_string(),
                role: AdminRole::PlatformAdmin,
            },
        )
        .await
        .into_diagnostic()?;
        tracing::info!("Created default platform admin (email: admin@example.com, password: password123)");
    }
    Ok(())
}
