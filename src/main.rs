//! wake-yield entry point: CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;
use wake_yield::cli::{CliOptions, DEFAULT_DEMO_SEED, parse_args};
use wake_yield::config::EngineConfig;
use wake_yield::demo::demo_project;
use wake_yield::io::export::export_csv;
use wake_yield::project::ProjectDocument;
use wake_yield::runner::run_project;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

/// Loads the configuration: `--config` takes priority, then `--preset`, then the reference.
fn load_config(cli: &CliOptions) -> EngineConfig {
    let loaded = if let Some(path) = &cli.config {
        EngineConfig::from_toml_file(path)
    } else if let Some(name) = &cli.preset {
        EngineConfig::from_preset(name)
    } else {
        Ok(EngineConfig::reference())
    };
    let mut config = loaded.unwrap_or_else(|e| fail(e));

    if let Some(radii) = cli.max_wake_distance {
        config.wake.max_wake_distance = radii;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn load_project(cli: &CliOptions) -> ProjectDocument {
    match &cli.project {
        Some(path) => ProjectDocument::from_json_file(path).unwrap_or_else(|e| fail(e)),
        None => {
            let seed = cli.demo_seed.unwrap_or(DEFAULT_DEMO_SEED);
            tracing::info!(seed, "generating demo project");
            demo_project(seed)
        }
    }
}

fn write_project(doc: &ProjectDocument, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(doc).map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| format!("cannot write \"{}\": {e}", path.display()))
}

fn main() {
    init_tracing();
    let cli = parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        wake_yield::cli::print_usage();
        process::exit(1);
    });

    let config = load_config(&cli);
    let mut doc = load_project(&cli);

    let run = run_project(&doc, &config, cli.assign_ground_areas).unwrap_or_else(|e| fail(e));
    println!("{}", run.report);

    if let Some(path) = &cli.results_out {
        if let Err(e) = export_csv(&run.report, path) {
            fail(format_args!("failed to write CSV: {e}"));
        }
        eprintln!("Results written to {}", path.display());
    }

    if let Some(path) = &cli.project_out {
        doc.apply_results(&run.fleet.turbines);
        if let Err(e) = write_project(&doc, path) {
            fail(e);
        }
        eprintln!("Project written to {}", path.display());
    }

    if cli.serve {
        serve(config, run.report, cli.port);
    }
}

#[cfg(feature = "api")]
fn serve(config: EngineConfig, report: wake_yield::report::YieldReport, port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(wake_yield::api::AppState { config, report });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| fail(format_args!("failed to create tokio runtime: {e}")));
    if let Err(e) = rt.block_on(wake_yield::api::serve(state, addr)) {
        fail(format_args!("API server stopped: {e}"));
    }
}

#[cfg(not(feature = "api"))]
fn serve(_config: EngineConfig, _report: wake_yield::report::YieldReport, _port: u16) {
    fail("--serve requires building with the `api` feature");
}
