use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use mje_engine::{ExportReport, Exporter, ExporterConfig};
use mje_jenkins::HttpJenkinsClient;
use mje_maestro::{DryRunMaestroClient, HttpMaestroClient, MaestroConnection};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Command::new("mje")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exports a Jenkins view/job hierarchy into Maestro")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("export")
                .about("Run one export pass against the configured servers")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .default_value("mje.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Path to the TOML configuration file"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Traverse and map without writing to Maestro or Jenkins"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("export", args)) => {
            let config_path = args
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("mje.toml"));
            let dry_run = args.get_flag("dry-run");

            match run_export(&config_path, dry_run).await {
                Ok(report) => {
                    println!("Export finished.");
                    println!("  Groups:       {}", report.groups);
                    println!("  Projects:     {}", report.projects);
                    println!("  Compositions: {}", report.compositions);
                    println!("  Orphans:      {}", report.orphans);
                }
                Err(e) => {
                    eprintln!("export failed: {e:#}");
                    std::process::exit(1);
                }
            }
        }
        _ => unreachable!("subcommand is required"),
    }
}

async fn run_export(config_path: &Path, dry_run: bool) -> anyhow::Result<ExportReport> {
    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading config file '{}'", config_path.display()))?;
    let config: ExporterConfig = toml::from_str(&raw)
        .with_context(|| format!("parsing config file '{}'", config_path.display()))?;

    let jenkins = HttpJenkinsClient::new(&config.jenkins.connection())
        .context("building the jenkins client")?;

    if dry_run {
        info!("dry-run: no group, project, composition or config.xml writes");
        let exporter = Exporter::new(jenkins, DryRunMaestroClient::new(), config, true);
        return Ok(exporter.export().await?);
    }

    let maestro = HttpMaestroClient::new(&MaestroConnection {
        base_url: config.maestro.base_url.clone(),
        api_path: config.maestro.api_path.clone(),
        username: config.maestro.username.clone(),
        password: config.maestro.password.clone(),
    })
    .context("building the maestro client")?;
    let exporter = Exporter::new(jenkins, maestro, config, false);
    Ok(exporter.export().await?)
}
