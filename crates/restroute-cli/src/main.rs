//! restroute CLI.
//!
//! Resolves REST routing documents into flat route tables and validates
//! them without printing the result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use restroute::{LoaderConfig, RouteCollection, RouteError, YamlRouteLoader};
use restroute_telemetry::{init_logging, log_load_failed, LogFormat, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "restroute", about = "REST routing document resolver", version)]
struct Cli {
    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (pretty or json).
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a routing document and print the resulting routes.
    Resolve {
        /// Routing document to load.
        #[arg(short, long)]
        file: String,

        #[command(flatten)]
        loader: LoaderArgs,

        /// Output format (text, json or yaml).
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Validate routing documents without printing routes.
    Validate {
        /// Routing documents to load.
        #[arg(short, long, required = true, num_args = 1..)]
        file: Vec<String>,

        #[command(flatten)]
        loader: LoaderArgs,

        /// Show route counts for valid documents.
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Args, Debug)]
struct LoaderArgs {
    /// Loader config file (YAML).
    #[arg(long, env = "RESTROUTE_CONFIG")]
    config: Option<PathBuf>,

    /// Extra directory searched for routing documents. Repeatable.
    #[arg(long = "path")]
    paths: Vec<PathBuf>,

    /// Type tag of the top-level document; when given it must be "rest".
    #[arg(long = "type")]
    resource_type: Option<String>,

    /// Do not append `.{_format}` to route paths.
    #[arg(long)]
    no_include_format: bool,

    /// Known formats, comma separated (e.g. json,xml).
    #[arg(long, value_delimiter = ',')]
    formats: Vec<String>,

    /// Default value for the `_format` parameter.
    #[arg(long)]
    default_format: Option<String>,
}

impl LoaderArgs {
    /// Merge the config file (if any) with command-line overrides.
    fn loader_config(&self) -> anyhow::Result<LoaderConfig> {
        let mut config = match &self.config {
            Some(path) => LoaderConfig::load(path)
                .with_context(|| format!("cannot use config {}", path.display()))?,
            None => LoaderConfig::default(),
        };

        config.paths.extend(self.paths.iter().cloned());
        if self.no_include_format {
            config.format.include_format = false;
        }
        if !self.formats.is_empty() {
            config.format.formats = self.formats.clone();
        }
        if let Some(default_format) = &self.default_format {
            config.format.default_format = Some(default_format.clone());
        }
        Ok(config)
    }

    fn build(&self, file: &str) -> anyhow::Result<YamlRouteLoader> {
        let loader = YamlRouteLoader::from_config(&self.loader_config()?);
        if let Some(resource_type) = &self.resource_type {
            if !loader.supports(file, Some(resource_type)) {
                bail!(
                    "resource \"{}\" with type \"{}\" is not a REST routing document",
                    file,
                    resource_type
                );
            }
        }
        Ok(loader)
    }
}

/// JSON/YAML output shape.
#[derive(Serialize)]
struct ResolvedOutput<'a> {
    routes: &'a RouteCollection,
    resources: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_format = LogFormat::parse(&cli.log_format).unwrap_or_default();
    let telemetry = TelemetryConfig::new()
        .with_log_level(cli.log_level.clone())
        .with_log_format(log_format);
    if let Err(e) = init_logging(&telemetry) {
        eprintln!("warning: {}", e);
    }

    match cli.command {
        Command::Resolve {
            file,
            loader,
            output,
        } => {
            let loader = match loader.build(&file) {
                Ok(loader) => loader,
                Err(e) => {
                    eprintln!("error: {:#}", e);
                    return ExitCode::from(EXIT_USAGE);
                }
            };

            let routes = match loader.load(&file) {
                Ok(routes) => routes,
                Err(e) => return ExitCode::from(report_load_error(&file, &e)),
            };

            match render(&routes, &output) {
                Ok(rendered) => {
                    print!("{}", rendered);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {:#}", e);
                    ExitCode::from(EXIT_USAGE)
                }
            }
        }

        Command::Validate {
            file: files,
            loader,
            verbose,
        } => {
            // Every file is reported; the most severe failure decides the exit code.
            let mut exit: u8 = 0;

            for file in &files {
                let loader = match loader.build(file) {
                    Ok(loader) => loader,
                    Err(e) => {
                        eprintln!("error: {:#}", e);
                        exit = exit.max(EXIT_USAGE);
                        continue;
                    }
                };

                match loader.load(file) {
                    Ok(routes) => {
                        if verbose {
                            println!("{} - OK ({} routes)", file, routes.len());
                        } else {
                            println!("{} - OK", file);
                        }
                    }
                    Err(e) => exit = exit.max(report_load_error(file, &e)),
                }
            }

            ExitCode::from(exit)
        }
    }
}

/// Routing document is invalid.
const EXIT_INVALID: u8 = 1;
/// Configuration or usage error.
const EXIT_USAGE: u8 = 2;
/// I/O failure or missing file.
const EXIT_IO: u8 = 3;

/// Print a load failure and map it to an exit code.
fn report_load_error(file: &str, error: &RouteError) -> u8 {
    log_load_failed!(file = %file, error = %error);
    eprintln!("error: {}", error);

    if error.is_io() {
        EXIT_IO
    } else {
        EXIT_INVALID
    }
}

fn render(routes: &RouteCollection, output: &str) -> anyhow::Result<String> {
    let resolved = ResolvedOutput {
        routes,
        resources: routes
            .resources()
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    };

    match output {
        "json" => Ok(serde_json::to_string_pretty(&resolved)? + "\n"),
        "yaml" => Ok(serde_yaml::to_string(&resolved)?),
        "text" => Ok(render_table(routes)),
        other => bail!("unknown output format \"{}\" (expected text, json or yaml)", other),
    }
}

/// Render routes as an aligned table: name, methods, scheme/host, path.
fn render_table(routes: &RouteCollection) -> String {
    let rows: Vec<[String; 4]> = routes
        .iter()
        .map(|(name, route)| {
            let methods = if route.methods.is_empty() {
                "ANY".to_string()
            } else {
                route.methods.join("|")
            };
            let host = match (&route.host, route.schemes.is_empty()) {
                (Some(host), true) => host.clone(),
                (Some(host), false) => format!("{}://{}", route.schemes.join("|"), host),
                (None, false) => format!("{}://", route.schemes.join("|")),
                (None, true) => "ANY".to_string(),
            };
            [name.to_string(), methods, host, route.path.clone()]
        })
        .collect();

    let header = [
        "Name".to_string(),
        "Method".to_string(),
        "Host".to_string(),
        "Path".to_string(),
    ];
    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(&format!("{} route(s)\n", routes.len()));
    out
}
