use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use programas_core::catalog::{departments, HttpCatalogLoader, DEFAULT_CATALOG_PATH};
use programas_core::config::{ResolverConfig, StalePolicy, DEFAULT_ENDPOINT, DEFAULT_MANUAL_SEARCH_URL};
use programas_core::lifecycle::{PageLifecycle, TabState};
use programas_core::resolver::{BulkResolver, RunOutcome};
use programas_core::source::HttpProgramSource;

mod terminal_page;
use terminal_page::TerminalPage;

#[derive(Parser)]
#[command(name = "programas", about = "Bulk programa link resolver")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve programa download links for a set of subjects
    Resolve {
        /// Subject ids (id_materia), in page order
        #[arg(required = true)]
        subjects: Vec<String>,

        /// Bulk lookup endpoint
        #[arg(short, long, env = "PROGRAMAS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Manual search page used as fallback link
        #[arg(long, default_value = DEFAULT_MANUAL_SEARCH_URL)]
        manual_url: String,

        /// Delay before the initial lookup, in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// apply | discard
        #[arg(long, default_value = "discard")]
        stale_policy: StalePolicy,

        /// Print slot markup instead of a table
        #[arg(long)]
        html: bool,
    },
    /// List areas of a department, or orientations of one of its areas
    Catalog {
        /// Portal base URL
        #[arg(short, long, env = "PROGRAMAS_BASE_URL", default_value = "http://127.0.0.1:5000")]
        base_url: String,

        department: String,
        area: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Resolve {
            subjects,
            endpoint,
            manual_url,
            delay_ms,
            timeout_secs,
            stale_policy,
            html,
        } => {
            let config = ResolverConfig::builder(endpoint)
                .with_manual_search_url(manual_url)
                .with_initial_delay(Duration::from_millis(delay_ms))
                .with_request_timeout(Duration::from_secs(timeout_secs))
                .with_stale_policy(stale_policy)
                .build();
            resolve(subjects, config, html).await;
        }
        Command::Catalog {
            base_url,
            department,
            area,
        } => catalog(base_url, department, area).await,
    }
}

async fn resolve(subjects: Vec<String>, config: ResolverConfig, html: bool) {
    let source = match HttpProgramSource::new(&config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to set up HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let page = Arc::new(TerminalPage::new(&subjects));
    let resolver = Arc::new(BulkResolver::new(Arc::new(source), &config));
    let lifecycle = PageLifecycle::new(resolver, page.clone(), config.initial_delay);

    println!("Resolving {} subjects via {}", subjects.len(), config.endpoint);
    let start = Instant::now();

    let Some(handle) = lifecycle.on_load(TabState::Absent) else {
        return;
    };
    match handle.await {
        Ok(RunOutcome::Applied { missing, .. }) if !missing.is_empty() => {
            eprintln!("No result for: {}", missing.join(", "));
        }
        Ok(RunOutcome::Failed(e)) => eprintln!("Lookup failed: {}", e),
        Ok(_) => {}
        Err(e) => eprintln!("Resolver task failed: {}", e),
    }
    log::info!("Finished in {:.2}s", start.elapsed().as_secs_f64());

    for line in page.summary(html) {
        println!("{}", line);
    }
}

async fn catalog(base_url: String, department: String, area: Option<String>) {
    let loader = HttpCatalogLoader::from_url(format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        DEFAULT_CATALOG_PATH
    ));

    let catalog = match departments().load(&loader).await {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Failed to load department catalog: {}", e);
            std::process::exit(1);
        }
    };

    let values = match &area {
        Some(area) => catalog.orientations(&department, area),
        None => catalog.areas(&department),
    };
    for value in values {
        println!("{}", value);
    }
}
