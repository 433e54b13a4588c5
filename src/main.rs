use anyhow::{Context, Result};
use clap::Parser;
use regionstats::debug_ui;
use regionstats::desc::load_structure_csv;
use regionstats::level::compute_level_stats;
use regionstats::report::write_report;
use regionstats::vol::{load_label_npz, load_signal_npz};
use regionstats::viz::scatter_points;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const VIZ_FLAG: &str = "-v";
const N_REQUIRED_ARGS: usize = 4;

// Any fifth argument, `-h` and `--help` included, goes to the viz check, so clap's
// own help flag is off.
#[derive(Parser, Debug)]
#[command(name = "regionstats", disable_help_flag = true)]
#[command(about = "Sum signal per annotated region and summarize the sums by tree depth")]
struct Cli {
    /// Signal volume (.npz holding one 3D float array)
    #[arg(allow_hyphen_values = true)]
    signal_file: PathBuf,
    /// Annotation volume (.npz holding one 3D integer array, same shape)
    #[arg(allow_hyphen_values = true)]
    annotation_file: PathBuf,
    /// Structure table (.csv with `id` and `structure_id_path` columns)
    #[arg(allow_hyphen_values = true)]
    structure_file: PathBuf,
    /// Report destination (overwritten)
    #[arg(allow_hyphen_values = true)]
    outgoing_file: PathBuf,
    /// Pass `-v` to show scatter plots of both volumes before aggregating
    #[arg(allow_hyphen_values = true)]
    viz_flag: Option<String>,
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    extra: Vec<String>,
}

enum Invocation {
    Usage,
    Run(Cli),
}

#[derive(Debug, PartialEq, Eq)]
enum VizRequest {
    Skip,
    Show,
    BadFlag,
}

fn print_usage() {
    println!("Usage: [signal.npz] [annotation.npz] [structures.csv] [outgoing.csv]");
    println!("For visualization: add -v as a 5th argument");
}

/// `args` includes the program name, as `std::env::args_os` yields it.
fn parse_invocation<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() < N_REQUIRED_ARGS + 1 {
        return Ok(Invocation::Usage);
    }
    Cli::try_parse_from(args).map(Invocation::Run)
}

/// The flag is only checked when it is the last of exactly five arguments.
fn viz_request(cli: &Cli) -> VizRequest {
    match (&cli.viz_flag, cli.extra.is_empty()) {
        (Some(flag), true) if flag == VIZ_FLAG => VizRequest::Show,
        (Some(_), true) => VizRequest::BadFlag,
        _ => VizRequest::Skip,
    }
}

/// Loads the three inputs, handles the viz flag, then computes and writes the report.
fn run(cli: &Cli) -> Result<()> {
    let signal_vol = load_signal_npz(&cli.signal_file)
        .with_context(|| format!("reading signal volume {}", cli.signal_file.display()))?;
    let label_vol = load_label_npz(&cli.annotation_file)
        .with_context(|| format!("reading annotation volume {}", cli.annotation_file.display()))?;
    let structures = load_structure_csv(&cli.structure_file)
        .with_context(|| format!("reading structure table {}", cli.structure_file.display()))?;

    match viz_request(cli) {
        VizRequest::Skip => {}
        VizRequest::BadFlag => println!("Error: For Visualization use -v as 5th argument."),
        VizRequest::Show => {
            debug_ui::init("regionstats");
            debug_ui::add_scatter("signal", &scatter_points(&signal_vol)?);
            debug_ui::add_scatter("annotation", &scatter_points(&label_vol)?);
            debug_ui::show().map_err(regionstats::Error::Display)?;
        }
    }

    let stats = compute_level_stats(&signal_vol, &label_vol, &structures);

    write_report(&cli.outgoing_file, &stats)
        .with_context(|| format!("writing report {}", cli.outgoing_file.display()))?;

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("regionstats=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match parse_invocation(std::env::args_os()) {
        Ok(Invocation::Usage) => {
            print_usage();
            Ok(())
        }
        Ok(Invocation::Run(cli)) => run(&cli),
        Err(e) => e.exit(),
    }
}
