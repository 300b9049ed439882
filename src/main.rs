//! Command-line entry point for composer-symlinks.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use composer_symlinks::cli::{self, Command};
use composer_symlinks::commands::{self, Host, install::Hook};
use composer_symlinks::logging::{self, Logger};

fn main() -> Result<ExitCode> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);

    let log = Logger::new();
    let host = Host::system(&log);
    let global = &args.global;

    match &args.command {
        Command::Install => commands::install::run(global, Hook::Install, &host).map(|_| ()),
        Command::Update => commands::install::run(global, Hook::Update, &host).map(|_| ()),
        Command::Refresh(opts) => commands::refresh::run(global, opts, &host).map(|_| ()),
        Command::Uninstall => commands::uninstall::run(global, &host).map(|_| ()),
        Command::Status(opts) => {
            let passed = commands::status::run(global, opts, &host);
            return Ok(if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Command::Version => {
            commands::version::run(&log);
            Ok(())
        }
    }?;

    Ok(ExitCode::SUCCESS)
}
