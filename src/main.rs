use clap::Parser;
use tradeplan_sync::application::{apply_distribution, InitializeUseCase, SyncUseCase};
use tradeplan_sync::domain::error::{AppError, Result};
use tradeplan_sync::infrastructure::backup::{create_backup, BackupConfig};
use tradeplan_sync::infrastructure::config::Config;
use tradeplan_sync::infrastructure::csv::PlanReader;
use tradeplan_sync::infrastructure::db;
use tradeplan_sync::interfaces::cli::Args;
use tradeplan_sync::interfaces::prompt::get_accounts;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    if let Err(err) = run(args).await {
        error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(db_path) = args.db {
        config.db_path = db_path;
    }
    if let Some(csv_path) = args.csv {
        config.csv_path = csv_path;
    }

    // Back up before the first write; the archive is the only recovery
    // mechanism for a bad run.
    let backup = create_backup(
        &config.db_path,
        &BackupConfig {
            backup_dir: config.backup_dir.clone(),
            max_backups: config.max_backups,
        },
    )?;
    info!(archive = %backup.archive_path.display(), "Database backed up");

    let pool = db::connect(&config.db_path).await?;

    if args.initialize || args.force_initialize.is_some() {
        let force = args.force_initialize.is_some();
        let plan_count = args.force_initialize.unwrap_or(1);
        let accounts = get_accounts()?;
        InitializeUseCase::new(pool)
            .run(plan_count, force, &accounts)
            .await?;
        return Ok(());
    }

    let mut rows = PlanReader::new().read_file(&config.csv_path)?;
    if rows.is_empty() {
        return Err(AppError::ValidationError(format!(
            "No rows found in {}",
            config.csv_path.display()
        )));
    }

    if let Some(qty) = args.qty {
        if qty < 1 {
            return Err(AppError::ValidationError(
                "--qty must be at least 1".to_string(),
            ));
        }
        for row in &mut rows {
            row.qty = qty;
        }
    }
    if args.distribution {
        apply_distribution(&mut rows)?;
    }

    SyncUseCase::new(pool).run(&rows).await?;
    Ok(())
}
