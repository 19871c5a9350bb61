use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use left_or_right::app::{
    first_product_id, DisplayConfig, LocalSource, ProductSource, RemoteSource, SessionController,
};
use left_or_right::catalog::CatalogDb;
use left_or_right::engine::SERVER_SESSION_ID;
use left_or_right::infra::{init_logging, AppConfig};
use left_or_right::{server, ui};

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = std::env::args().collect();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("failed to load configuration: {error}");
            return ExitCode::from(1);
        }
    };

    let command = parse_command(&args);
    match run_command(command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            print_usage();
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

#[derive(Debug, Clone)]
enum Command {
    Serve,
    Seed { file: PathBuf },
    List,
    Check,
    Decisions,
    Client { page_url: Option<String> },
    Local {
        file: PathBuf,
        page_url: Option<String>,
    },
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

impl CommandError {
    fn runtime(context: &str, error: impl Display) -> Self {
        Self::Runtime(format!("{context}: {error}"))
    }
}

fn parse_command(args: &[String]) -> Result<Command, CommandError> {
    if args.len() <= 1 {
        return Ok(Command::Serve);
    }

    match args[1].as_str() {
        "serve" => Ok(Command::Serve),
        "seed" => {
            if args.len() < 3 {
                return Err(CommandError::Usage("missing products file".to_string()));
            }
            Ok(Command::Seed {
                file: PathBuf::from(&args[2]),
            })
        }
        "list" => Ok(Command::List),
        "check" => Ok(Command::Check),
        "decisions" => Ok(Command::Decisions),
        "client" => Ok(Command::Client {
            page_url: args.get(2).cloned(),
        }),
        "local" => {
            if args.len() < 3 {
                return Err(CommandError::Usage("missing products file".to_string()));
            }
            Ok(Command::Local {
                file: PathBuf::from(&args[2]),
                page_url: args.get(3).cloned(),
            })
        }
        other => Err(CommandError::Usage(format!("unknown command: {other}"))),
    }
}

fn run_command(
    command: Result<Command, CommandError>,
    config: AppConfig,
) -> Result<(), CommandError> {
    match command? {
        Command::Serve => {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|error| CommandError::runtime("failed to start runtime", error))?;
            runtime
                .block_on(server::start_server(config))
                .map_err(|error| CommandError::runtime("server failed", error))
        }
        Command::Seed { file } => {
            let catalog = open_catalog(&config)?;
            let report = catalog
                .seed_from_json(&file)
                .map_err(|error| CommandError::runtime("seed failed", error))?;
            println!(
                "seed finished: read={}, newly_inserted={}",
                report.read_products, report.newly_inserted
            );
            Ok(())
        }
        Command::List => {
            let products = open_catalog(&config)?
                .list_products()
                .map_err(|error| CommandError::runtime("list failed", error))?;
            if products.is_empty() {
                println!("no products in catalog");
                return Ok(());
            }
            for product in products {
                println!(
                    "{}\t{}\t{}\t{}",
                    product.id, product.image_file, product.url, product.description
                );
            }
            Ok(())
        }
        Command::Check => {
            let images_dir = config.images_dir();
            let missing = open_catalog(&config)?
                .find_missing_images(&images_dir)
                .map_err(|error| CommandError::runtime("check failed", error))?;
            if missing.is_empty() {
                println!("all product images present under {}", images_dir.display());
                return Ok(());
            }
            for product in &missing {
                println!("{}\t{}", product.id, product.image_file);
            }
            Err(CommandError::Runtime(format!(
                "{} product images missing",
                missing.len()
            )))
        }
        Command::Decisions => {
            let decisions = open_catalog(&config)?
                .list_decisions(SERVER_SESSION_ID)
                .map_err(|error| CommandError::runtime("decisions failed", error))?;
            if decisions.is_empty() {
                println!("no decisions recorded");
                return Ok(());
            }
            for decision in decisions {
                println!(
                    "{}\t{}\t{}\t{}",
                    decision.id, decision.decided_at, decision.product_id, decision.label
                );
            }
            Ok(())
        }
        Command::Client { page_url } => {
            let source = RemoteSource::new(&config.server_url)
                .map_err(|error| CommandError::runtime("client setup failed", error))?;
            let display = DisplayConfig {
                image_base: format!("{}/static/images", config.server_url.trim_end_matches('/')),
                link_base: config.link_base.clone(),
            };
            run_widget(Arc::new(source), display, page_url, &config)
        }
        Command::Local { file, page_url } => {
            let source = LocalSource::from_json(&file)
                .map_err(|error| CommandError::runtime("failed to read products", error))?;
            let display = DisplayConfig {
                image_base: config.local_images_dir.to_string_lossy().into_owned(),
                link_base: config.link_base.clone(),
            };
            run_widget(Arc::new(source), display, page_url, &config)
        }
    }
}

fn open_catalog(config: &AppConfig) -> Result<CatalogDb, CommandError> {
    let catalog = CatalogDb::new(config.catalog_path.clone());
    catalog
        .initialize()
        .map_err(|error| CommandError::runtime("failed to open catalog", error))?;
    Ok(catalog)
}

fn run_widget(
    source: Arc<dyn ProductSource>,
    display: DisplayConfig,
    page_url: Option<String>,
    config: &AppConfig,
) -> Result<(), CommandError> {
    let first_id = first_product_id(page_url.as_deref(), config.first_product_id);
    let controller = SessionController::new(source, display);
    ui::launch_window(controller, first_id)
        .map_err(|error| CommandError::Runtime(error.to_string()))
}

fn print_usage() {
    println!("usage:");
    println!("  left-or-right serve");
    println!("  left-or-right seed <products.json>");
    println!("  left-or-right list");
    println!("  left-or-right check");
    println!("  left-or-right decisions");
    println!("  left-or-right client [page-url]");
    println!("  left-or-right local <products.json> [page-url]");
}
