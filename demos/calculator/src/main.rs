//! Command-line runner for the calculator scenarios.
//! Each invocation starts a fresh session with its own dependency registry.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::process::ExitCode;
use std::sync::Arc;

mod logging;

use calculator_demo::SampleHooks;
use clap::Parser;
use eyre::{Result, WrapErr, bail};
use scenario_deps::{DependencyPlugin, DependencyRegistry, RacePolicy, diagnostics};
use scenario_deps_harness::{
    GroupDefinition, SessionReport, TestSession, find_registered_group, registered_groups,
    report::json,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Worker threads; defaults to `SCENARIO_DEPS_WORKERS` or the CPU count.
    #[arg(long)]
    workers: Option<NonZeroUsize>,
    /// Behaviour when a dependency is running on another worker (`wait` or
    /// `skip`); defaults to `SCENARIO_DEPS_RACE_POLICY` or `wait`.
    #[arg(long)]
    race_policy: Option<RacePolicy>,
    /// Structural name of a group to run; repeatable. Runs every registered
    /// group when omitted.
    #[arg(long = "group", value_name = "NAME")]
    groups: Vec<String>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
    /// Print the dependency registry after the run.
    #[arg(long)]
    dump_registry: bool,
    /// Log filter directives for stderr; defaults to `SCENARIO_DEPS_LOG` or
    /// `info`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn selected_groups(names: &[String]) -> Result<Vec<&'static GroupDefinition>> {
    if names.is_empty() {
        return Ok(registered_groups());
    }
    names
        .iter()
        .map(|name| match find_registered_group(name) {
            Some(group) => Ok(group),
            None => bail!("unknown group '{name}'"),
        })
        .collect()
}

fn print_report(out: &mut impl Write, report: &SessionReport) -> io::Result<()> {
    for record in report.records() {
        write!(
            out,
            "{:>7} {}.{}",
            record.status().label(),
            record.group_title(),
            record.scenario_title()
        )?;
        let arguments = record.metadata().arguments();
        if !arguments.is_empty() {
            let row: Vec<_> = arguments
                .iter()
                .map(|(column, value)| format!("{column}={value}"))
                .collect();
            write!(out, " [{}]", row.join(", "))?;
        }
        writeln!(out)?;
        for line in record.status().failure_chain() {
            writeln!(out, "        {line}")?;
        }
    }
    writeln!(
        out,
        "{} passed, {} skipped, {} failed",
        report.passed(),
        report.skipped(),
        report.failed()
    )
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());
    let groups = selected_groups(&cli.groups)?;

    let registry = Arc::new(DependencyRegistry::new());
    let mut plugin = DependencyPlugin::new(Arc::clone(&registry));
    if let Some(race) = cli.race_policy {
        plugin = plugin.with_race_policy(race);
    }
    let mut builder = plugin.install(TestSession::builder()).hook(SampleHooks);
    if let Some(workers) = cli.workers {
        builder = builder.workers(workers);
    }
    let report = builder.build().run(&groups);

    let mut out = io::stdout().lock();
    if cli.json {
        json::write(&mut out, &report).wrap_err("failed to write the JSON report")?;
        writeln!(out)?;
    } else {
        print_report(&mut out, &report)?;
    }
    if cli.dump_registry {
        diagnostics::write_registry(&mut out, &registry)
            .wrap_err("failed to write the registry")?;
        writeln!(out)?;
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
