//! Try a usage text against a command line.
//!
//! ```sh
//! genopts --dump 'commit [-a | --patch] [-m <msg>]' -- commit -a -m hello
//! ```
use std::ffi::OsString;
use std::process::ExitCode;

use genopts::{Cli, Matches, Outcome, ParseOptions, Schema, codegen};
use tracing_subscriber::EnvFilter;

const DEFAULT_PROGRAM: &str = "prog";

#[derive(Debug, Cli)]
#[cli(usage = "[--no-validate] [--quiet] [--emit-rust | --dump] [--name <program>] <usage> [<args>...]")]
struct Driver {
    no_validate: bool,
    quiet: bool,
    emit_rust: bool,
    dump: bool,
    program: Option<String>,
    usage: String,
    args: Vec<OsString>,
}

fn main() -> ExitCode {
    setup_logging();
    let driver = Driver::parse();
    tracing::debug!(?driver, "starting");
    match driver.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            // -1 as seen by the parent process.
            ExitCode::from(255)
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_env("GENOPTS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

impl Driver {
    fn run(self) -> genopts::Result<()> {
        let schema = Schema::compile(&self.usage)?;
        if self.emit_rust {
            print!("{}", codegen::render_struct(&schema, "Args"));
            return Ok(());
        }

        let program = self.program.as_deref().unwrap_or(DEFAULT_PROGRAM);
        let options = ParseOptions::default().validate(!self.no_validate).usage(!self.quiet);
        match schema.run(program, self.args, options)? {
            Outcome::Parsed(matches) => {
                tracing::info!(line = ?matches.line(), "accepted");
                if self.dump {
                    dump(&matches);
                }
            }
            Outcome::Help { usage } => {
                print!("{}", usage.unwrap_or_else(|| schema.usage(program)));
            }
        }
        Ok(())
    }
}

fn dump(matches: &Matches) {
    for (field, values) in matches.iter() {
        if values.is_empty() {
            println!("{field}=true");
        }
        for value in values {
            println!("{field}={}", value.to_string_lossy());
        }
    }
}
