use std::io::{self, IsTerminal};

use clap::Parser;
use color_eyre::Result;

mod cli;
mod dispatch;
mod output;
mod prompt;
mod style;

use cli::PenvCli;
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = PenvCli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let style = Style::new(cli.no_color, io::stdout().is_terminal());
    let code = match dispatch::run(&cli) {
        Ok(outcome) => output::emit(&cli, &style, &outcome)?,
        Err(err) => output::emit_error(&cli, &style, &err)?,
    };

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = format!("penv={level},penv_cli={level},penv_domain={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
