// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as AnyhowContext;
use anyhow::Result;
use argh::FromArgs;

use media_fits::config::Config;
use media_fits::context::RealContext;
use media_fits::media::Media;
use media_fits::runner::run_all;
use media_fits::suite::enumerate;
use media_fits::suite::filter;
use media_fits::suite::Specs;

#[derive(Debug, FromArgs)]
/// Conformance and regression runner for hardware media pipelines.
struct Args {
    /// path to a JSON configuration file; every field is optional
    #[argh(option)]
    config: Option<PathBuf>,

    /// directory holding the test specifications
    #[argh(option)]
    spec_dir: Option<PathBuf>,

    /// only keep tests whose ID contains this pattern (repeatable)
    #[argh(option)]
    filter: Vec<String>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    List(ListArgs),
    Run(RunArgs),
}

#[derive(Debug, FromArgs)]
/// Print the IDs of the selected tests.
#[argh(subcommand, name = "list")]
struct ListArgs {}

#[derive(Debug, FromArgs)]
/// Run the selected tests.
#[argh(subcommand, name = "run")]
struct RunArgs {
    /// directory receiving output media and command logs
    #[argh(option)]
    artifact_dir: Option<PathBuf>,

    /// baseline file to compare metrics against
    #[argh(option)]
    baseline: Option<PathBuf>,

    /// record metrics into a new baseline written to this path instead of
    /// comparing them
    #[argh(option)]
    rebase_output: Option<PathBuf>,

    /// where to write the JSON results
    #[argh(option)]
    results: Option<PathBuf>,

    /// platform tag of the device under test, e.g. TGL
    #[argh(option)]
    platform: Option<String>,

    /// run count of run-to-run tests whose case does not set one
    #[argh(option)]
    r2r_runs: Option<u32>,

    /// accepted PSNR difference against the baseline
    #[argh(option)]
    tolerance: Option<f64>,

    /// do not log command output to the artifact directory
    #[argh(switch)]
    no_command_logs: bool,
}

impl RunArgs {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.artifact_dir {
            config.artifact_dir = dir;
        }
        if self.baseline.is_some() {
            config.baseline = self.baseline;
        }
        if self.rebase_output.is_some() {
            config.rebase_output = self.rebase_output;
        }
        if self.results.is_some() {
            config.results = self.results;
        }
        if self.platform.is_some() {
            config.platform = self.platform;
        }
        if let Some(runs) = self.r2r_runs {
            config.r2r_runs = runs;
        }
        if let Some(tolerance) = self.tolerance {
            config.psnr_tolerance = tolerance;
        }
        if self.no_command_logs {
            config.command_logs = false;
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let mut config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = args.spec_dir {
        config.spec_dir = dir;
    }

    let specs = Specs::load(&config.spec_dir).context("Failed to load test specs")?;
    let cases = filter(enumerate(&specs), &args.filter);

    let run_args = match args.command {
        Command::List(_) => {
            for case in &cases {
                println!("{}", case);
            }
            return Ok(true);
        }
        Command::Run(run_args) => run_args,
    };
    run_args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let results_path = config.results.clone();
    let media = Media::new(config).context("Failed to set up the run")?;
    let mut ctx = RealContext::new(media);
    log::info!("Running {} tests", cases.len());
    let report = run_all(&mut ctx, &specs, &cases).context("Failed to finish the run")?;

    if let Some(path) = results_path {
        report
            .write(&path)
            .with_context(|| format!("Failed to write results to {:?}", path))?;
    }
    for failed in report.failed() {
        println!("FAILED {}", failed.id);
    }
    println!("{}", report.summary);
    Ok(!report.has_failures())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{:?}", err);
            ExitCode::from(2)
        }
    }
}
