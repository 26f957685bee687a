use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::Level;

use gidremap::cli::{Cli, Invocation, USAGE};
use gidremap::logging::{
    AuditSink, ConsoleSink, FactsEmitter, FileFactsSink, JsonlSink, SyslogSink, Tee,
};
use gidremap::api::errors::EXIT_FAILURE;
use gidremap::Remapper;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_FAILURE),
            };
        }
    };

    let audit = Tee(
        ConsoleSink {
            verbose: cli.verbose,
        },
        SyslogSink::system(),
    );

    let invocation = match cli.invocation() {
        Ok(Invocation::Help) => {
            let _ = Cli::command().print_help();
            return ExitCode::SUCCESS;
        }
        Ok(inv) => inv,
        Err(e) => {
            audit.log(Level::Error, &e.to_string());
            eprintln!("usage: {USAGE}");
            return ExitCode::from(e.exit_code());
        }
    };

    let facts: Box<dyn FactsEmitter> = match &cli.facts {
        Some(path) => match FileFactsSink::open(path) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                audit.log(
                    Level::Error,
                    &format!("cannot open facts file {}: {e}", path.display()),
                );
                return ExitCode::from(EXIT_FAILURE);
            }
        },
        None => Box::new(JsonlSink),
    };

    let mode = cli.mode();
    let api = Remapper::new(facts, audit, cli.policy());
    let out = match invocation {
        Invocation::Remap { group, target } => api.remap(&group, target, mode).map(|_| ()),
        Invocation::Repair { group, source } => api.repair(&group, source, mode).map(|_| ()),
        Invocation::Resume => api.resume(mode).map(|_| ()),
        Invocation::Help => Ok(()),
    };
    match out {
        Ok(()) => ExitCode::SUCCESS,
        // Already logged by the facade.
        Err(e) => ExitCode::from(e.exit_code()),
    }
}
