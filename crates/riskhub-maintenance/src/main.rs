use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use riskhub_maintenance::{jobs, RunOptions, RunReport, Runner, VERSION};
use riskhub_store::{BaasConfig, PostgrestStore};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

fn cli() -> Command {
    let dry_run = Arg::new("dry-run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Print the planned changes without writing");

    Command::new("riskhub-maintenance")
        .version(VERSION)
        .about("Versioned data maintenance jobs for RiskHub")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List registered jobs"))
        .subcommand(Command::new("status").about("Show the last applied run of every job"))
        .subcommand(
            Command::new("run")
                .about("Run one job")
                .arg(Arg::new("job").required(true).help("Job id, see `list`"))
                .arg(dry_run.clone())
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Run even if this version was already applied"),
                ),
        )
        .subcommand(
            Command::new("run-pending")
                .about("Run every job not yet applied at its current version")
                .arg(dry_run),
        )
}

fn baas_from_env() -> anyhow::Result<BaasConfig> {
    let var = |name: &str| {
        std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("missing required environment variable {name}"))
    };
    let service_key = var("SUPABASE_SERVICE_ROLE_KEY")?;
    let anon_key = var("SUPABASE_ANON_KEY").unwrap_or_else(|_| service_key.clone());
    let timeout_ms = match std::env::var("RISKHUB_HTTP_TIMEOUT_MS") {
        Ok(v) => v
            .trim()
            .parse()
            .with_context(|| format!("invalid RISKHUB_HTTP_TIMEOUT_MS {v:?}"))?,
        Err(_) => DEFAULT_HTTP_TIMEOUT_MS,
    };
    Ok(BaasConfig::new(var("SUPABASE_URL")?, anon_key, service_key)
        .with_timeout(Duration::from_millis(timeout_ms)))
}

fn print_report(report: &RunReport) {
    if report.skipped {
        println!(
            "{} v{}: already applied, use --force to run again",
            report.job_id, report.version
        );
        return;
    }
    for change in &report.changes {
        println!("  {change}");
    }
    if report.dry_run {
        println!(
            "{} v{}: {} change(s) planned (dry run)",
            report.job_id,
            report.version,
            report.changes.len()
        );
    } else {
        println!(
            "{} v{}: {} row(s) written",
            report.job_id, report.version, report.written
        );
    }
}

async fn execute(matches: &ArgMatches) -> anyhow::Result<()> {
    if let Some(("list", _)) = matches.subcommand() {
        for job in jobs::all() {
            println!("{:<26} v{}  {}", job.id(), job.version(), job.description());
        }
        return Ok(());
    }

    let store = PostgrestStore::new(baas_from_env()?).context("building row store client")?;
    let runner = Runner::new(Arc::new(store));

    match matches.subcommand() {
        Some(("status", _)) => {
            for status in runner.status().await? {
                let state = match &status.last_run {
                    Some(run) => format!("applied {} ({} rows)", run.applied_at, run.changes),
                    None => "pending".to_string(),
                };
                println!("{:<26} v{}  {state}", status.id, status.version);
            }
        }
        Some(("run", args)) => {
            let job = args
                .get_one::<String>("job")
                .context("job id is required")?;
            let options = RunOptions {
                dry_run: args.get_flag("dry-run"),
                force: args.get_flag("force"),
            };
            print_report(&runner.run(job, options).await?);
        }
        Some(("run-pending", args)) => {
            let options = RunOptions {
                dry_run: args.get_flag("dry-run"),
                force: false,
            };
            let reports = runner.run_pending(options).await?;
            if reports.is_empty() {
                println!("nothing pending");
            }
            for report in &reports {
                print_report(report);
            }
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match execute(&cli().get_matches()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
