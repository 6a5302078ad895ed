use clap::Parser;
use poker_league::admin::{
    repository::PostgresAdminRepository,
    service::{AdminService, UpsertOutcome},
};
use sqlx::postgres::PgPoolOptions;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "seed-admin")]
#[command(about = "Create the first admin account, or reset its password")]
struct Args {
    #[arg(long, default_value = "admin@pokerleague.com")]
    email: String,

    #[arg(long, default_value = "admin123")]
    password: String,

    #[arg(long, default_value = "Administrator")]
    name: String,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Apply pending migrations before seeding
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter("seed_admin=info,poker_league=info,sqlx=warn")
        .init();

    let args = Args::parse();

    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(&args.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Could not connect to the database");
            return ExitCode::FAILURE;
        }
    };

    if args.migrate {
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            error!(error = %e, "Migrations failed");
            return ExitCode::FAILURE;
        }
    }

    let service = AdminService::new(Arc::new(PostgresAdminRepository::new(pool)));
    match service
        .upsert_admin(&args.name, &args.email, &args.password)
        .await
    {
        Ok((admin, UpsertOutcome::Created)) => {
            info!(admin_id = admin.id, email = %admin.email, "Admin created");
            ExitCode::SUCCESS
        }
        Ok((admin, UpsertOutcome::PasswordUpdated)) => {
            info!(admin_id = admin.id, email = %admin.email, "Admin already existed, password updated");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Seeding admin failed");
            ExitCode::FAILURE
        }
    }
}
