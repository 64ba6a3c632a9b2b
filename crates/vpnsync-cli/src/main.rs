// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod args;
mod report;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use console::style;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vpnsync_actuator::PivpnCli;
use vpnsync_config::load_config;
use vpnsync_directory::LdapDirectory;
use vpnsync_runner::{CancellationToken, ExitStatus, RunSettings, SyncRunner};

use args::Args;
use report::{print_header, ConsoleReporter};

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	let builder = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr);

	if json {
		builder.json().init();
	} else {
		builder.init();
	}
}

fn fatal(message: impl std::fmt::Display) -> ExitCode {
	eprintln!("{} {message}", style("✖").red().bold());
	exit_code(ExitStatus::Fatal)
}

fn exit_code(status: ExitStatus) -> ExitCode {
	ExitCode::from(status.code() as u8)
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();
	init_tracing(args.log_json);

	let config = match load_config(args.overrides(), args.config.as_deref()) {
		Ok(config) => config,
		Err(e) => {
			error!(error = %e, "invalid configuration");
			return fatal(format!("configuration error: {e}"));
		}
	};

	print_header(&config);

	let cancel = CancellationToken::new();
	{
		let cancel = cancel.clone();
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				warn!("interrupt received, letting in-flight operations finish");
				eprintln!(
					"\n{} Interrupted, waiting for running operations...",
					style("→").yellow()
				);
				cancel.cancel();
			}
		});
	}

	let tool = Arc::new(PivpnCli::from_settings(&config.tool));
	let runner = SyncRunner::new(
		Arc::new(LdapDirectory::new(config.directory.clone())),
		tool.clone(),
		tool,
		RunSettings::from_config(&config),
	);
	let mut reporter = ConsoleReporter::new(config.storage.extension.clone());

	match runner.run(&mut reporter, &cancel).await {
		Ok(report) => {
			let status = report.summary.exit_status();
			info!(status = ?status, "run finished");
			exit_code(status)
		}
		Err(e) => {
			error!(error = %e, configuration = e.is_configuration(), "run aborted");
			fatal(e)
		}
	}
}
