use std::env;
use std::path::PathBuf;

/// Port the REST API binds to unless `--port` is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Seed of the demo wind farm unless `--demo-seed` is given.
pub const DEFAULT_DEMO_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub project: Option<PathBuf>,
    pub demo_seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub max_wake_distance: Option<f64>,
    pub assign_ground_areas: bool,
    pub results_out: Option<PathBuf>,
    pub project_out: Option<PathBuf>,
    pub serve: bool,
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions {
        project: None,
        demo_seed: None,
        config: None,
        preset: None,
        max_wake_distance: None,
        assign_ground_areas: false,
        results_out: None,
        project_out: None,
        serve: false,
        port: DEFAULT_PORT,
    };

    while i < args.len() {
        match args[i].as_str() {
            "--project" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --project (expected a JSON file path)")?;
                if opts.project.replace(PathBuf::from(path)).is_some() {
                    return Err("--project provided more than once".to_string());
                }
            }
            "--demo-seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --demo-seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--demo-seed value \"{raw}\" is not a valid u64"))?;
                opts.demo_seed = Some(seed);
            }
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--max-wake-distance" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --max-wake-distance (expected rotor radii)",
                )?;
                let radii = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .ok_or_else(|| format!("--max-wake-distance value \"{raw}\" must be a number > 0"))?;
                opts.max_wake_distance = Some(radii);
            }
            "--assign-ground-areas" => opts.assign_ground_areas = true,
            "--results-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --results-out (expected a file path)")?;
                if opts.results_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--results-out provided more than once".to_string());
                }
            }
            "--project-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --project-out (expected a file path)")?;
                if opts.project_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--project-out provided more than once".to_string());
                }
            }
            "--serve" => opts.serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.project.is_some() && opts.demo_seed.is_some() {
        return Err(
            "arguments `--project` and `--demo-seed` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("wake-yield: annual energy yield of a wind farm with and without wake losses");
    eprintln!();
    eprintln!("Usage: wake-yield [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --project <path>            Load a JSON project document");
    eprintln!("  --demo-seed <u64>           Seed of the generated demo farm (default {DEFAULT_DEMO_SEED})");
    eprintln!("  --config <path>             Load engine configuration from TOML");
    eprintln!("  --preset <name>             Use a built-in preset (reference, simplified, offshore)");
    eprintln!("  --max-wake-distance <f64>   Wake cutoff in upstream rotor radii");
    eprintln!("  --assign-ground-areas       Assign turbines to the ground area containing them");
    eprintln!("  --results-out <path>        Export per-turbine results to CSV");
    eprintln!("  --project-out <path>        Write the project with computed power back as JSON");
    eprintln!("  --serve                     Start the REST API after computing (feature `api`)");
    eprintln!("  --port <u16>                API server port (default {DEFAULT_PORT})");
    eprintln!("  --help                      Show this help message");
    eprintln!();
    eprintln!("Without --project a seeded demo farm is generated.");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_project_cli() {
        let opts = parse_args_from(args(&["--project", "farm.json", "--preset", "offshore"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.project.as_deref().and_then(|p| p.to_str()),
            Some("farm.json")
        );
        assert_eq!(opts.preset.as_deref(), Some("offshore"));
        assert!(opts.demo_seed.is_none());
        assert!(!opts.serve);
    }

    #[test]
    fn defaults_without_arguments() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert!(opts.project.is_none());
        assert!(opts.config.is_none());
        assert_eq!(opts.port, super::DEFAULT_PORT);
    }

    #[test]
    fn parses_numbers_and_flags() {
        let opts = parse_args_from(args(&[
            "--demo-seed",
            "7",
            "--max-wake-distance",
            "15",
            "--assign-ground-areas",
            "--serve",
            "--port",
            "8080",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.demo_seed, Some(7));
        assert_eq!(opts.max_wake_distance, Some(15.0));
        assert!(opts.assign_ground_areas);
        assert!(opts.serve);
        assert_eq!(opts.port, 8080);
    }

    #[test]
    fn rejects_conflicts_and_bad_values() {
        assert!(parse_args_from(args(&["--project", "a.json", "--demo-seed", "1"])).is_err());
        assert!(parse_args_from(args(&["--config", "a.toml", "--preset", "reference"])).is_err());
        assert!(parse_args_from(args(&["--max-wake-distance", "-3"])).is_err());
        assert!(parse_args_from(args(&["--port", "70000"])).is_err());
        assert!(parse_args_from(args(&["--project"])).is_err());
        assert!(parse_args_from(args(&["--bogus"])).is_err());
    }
}
