use lab_core::model::{AppSettingsDraft, LabId};
use services::{AppServices, Clock};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod lab_runner;
mod render;

use args::{Args, Command, prepare_sqlite_file, print_usage};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PROMPTLAB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, &parsed.assets_dir, Clock::system()).await?;
    info!(db_url = %parsed.db_url, assets = %parsed.assets_dir.display(), "prompt lab ready");

    match parsed.command {
        Command::Course => {
            let report = services.progress().report().await?;
            render::course(services.catalog(), &report.progress, &report.summary);
        }
        Command::Lab(requested) => {
            let lab_id = match requested {
                Some(id) => id,
                None => first_unfinished(&services).await?,
            };
            lab_runner::run(&services.lab_sessions(), lab_id, services.ai_configured()).await?;
        }
        Command::Results => {
            let progress = services.progress();
            let report = progress.report().await?;
            let diagnostic = progress.diagnostic(&report).await;
            render::summary(&report.summary, &diagnostic);
        }
        Command::Reset => {
            services.progress().reset().await?;
            println!("Progress cleared. Start again with `promptlab lab`.");
        }
        Command::Settings(update) => {
            let settings_service = services.app_settings();
            let current = settings_service.load().await?;
            let settings = match update {
                Some(update) => {
                    let saved = settings_service
                        .save(update.apply(AppSettingsDraft::from_settings(&current)))
                        .await?;
                    println!("Settings saved.");
                    saved
                }
                None => current,
            };
            render::settings(&settings);
        }
        Command::TestApi => match services.app_settings().test_connection().await? {
            Ok(()) => println!("API key is valid."),
            Err(err) => {
                println!("Connection test failed: {err}");
                return Err(err.into());
            }
        },
        Command::Help => {}
    }
    Ok(())
}

/// First lab in course order without a stored result, else the first lab.
async fn first_unfinished(services: &AppServices) -> Result<LabId, Box<dyn std::error::Error>> {
    let catalog = services.catalog();
    let progress = services.progress().load().await?;
    catalog
        .tracks()
        .flat_map(|track| track.labs().iter().copied())
        .find(|id| !progress.is_completed(*id))
        .or_else(|| catalog.first_lab_id())
        .ok_or_else(|| "the lab catalog is empty".into())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
