use color_eyre::Result;
use penv_domain::PenvError;
use serde_json::json;

use crate::{cli::PenvCli, dispatch::Outcome, style::Style};

fn status_label(code: i32) -> &'static str {
    match code {
        0 => "ok",
        2 => "warning",
        _ => "error",
    }
}

pub fn emit(cli: &PenvCli, style: &Style, outcome: &Outcome) -> Result<i32> {
    if cli.json {
        let payload = json!({
            "status": status_label(outcome.code),
            "message": outcome.message,
            "details": outcome.details,
            "hint": outcome.hint,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        for check in &outcome.checks {
            let line = format!("{}: {}", check.subject, check.message);
            println!("{}", style.status(check.level, &line));
        }
        if outcome.checks.is_empty() {
            println!("{}", outcome.message);
        } else {
            println!("{}", style.info(&outcome.message));
        }
        if let Some(hint) = &outcome.hint {
            println!("{}", style.hint(hint));
        }
    }
    Ok(outcome.code)
}

/// Prints a failed command and returns its exit code.
pub fn emit_error(cli: &PenvCli, style: &Style, err: &anyhow::Error) -> Result<i32> {
    let domain = err.downcast_ref::<PenvError>();
    let code = domain.map_or(1, PenvError::exit_code);
    let message = match domain {
        Some(err) => err.to_string(),
        None => format!("{err:#}"),
    };
    if cli.json {
        let payload = json!({
            "status": "error",
            "code": domain.map(PenvError::code),
            "message": message,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        match domain {
            Some(err) => eprintln!("{} {message}", style.error_code(err.code())),
            None => eprintln!("{message}"),
        }
    }
    Ok(code)
}
