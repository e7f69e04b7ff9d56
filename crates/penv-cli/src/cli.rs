use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const PENV_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const PENV_BEFORE_HELP: &str = concat!(
    "penv ",
    env!("CARGO_PKG_VERSION"),
    " – Project environment resolution\n\n",
    "\x1b[1;36mResolve\x1b[0m\n",
    "  backend          Show which environment backend the project uses.\n",
    "  name             Show the managed environment name (--check validates it).\n",
    "  lock             Check environment.yml against conda-lock.yml.\n\n",
    "\x1b[1;36mReconcile\x1b[0m\n",
    "  gitignore        Merge the standard ignore block into .gitignore.\n",
    "  gitignore-clean  Remove the backend's ignore patterns from .gitignore.\n",
    "  validate         Report whether the project matches its stored config.\n",
    "  config           Read or update .penv/config.\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = PENV_BEFORE_HELP,
    help_template = PENV_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct PenvCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Emit {status,message,details} JSON envelopes", global = true)]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        help = "Never prompt; behave as if stdin were not a terminal",
        global = true
    )]
    pub no_input: bool,
    #[arg(
        short = 'C',
        long = "project",
        value_name = "DIR",
        help = "Run against DIR instead of the current directory",
        global = true
    )]
    pub project: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(about = "Resolve the environment backend for the project")]
    Backend(BackendArgs),
    #[command(about = "Resolve the managed environment name")]
    Name(NameArgs),
    #[command(about = "Check the environment lock file against its descriptor")]
    Lock(LockArgs),
    #[command(about = "Reconcile .gitignore with the standard template")]
    Gitignore(BackendArgs),
    #[command(
        name = "gitignore-clean",
        about = "Remove backend-specific patterns from .gitignore"
    )]
    GitignoreClean(BackendArgs),
    #[command(about = "Validate the project against its stored configuration")]
    Validate,
    #[command(subcommand, about = "Read or update project configuration")]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Default)]
pub struct BackendArgs {
    #[arg(
        long,
        value_name = "BACKEND",
        help = "Override the backend (venv, managed-environment or auto)"
    )]
    pub backend: Option<String>,
}

#[derive(Args, Debug)]
pub struct NameArgs {
    #[arg(long = "env-name", value_name = "NAME", help = "Use NAME instead of resolving one")]
    pub env_name: Option<String>,
    #[arg(long, help = "Fail when the resolved name is not usable for a new environment")]
    pub check: bool,
}

#[derive(Args, Debug)]
pub struct LockArgs {
    #[arg(
        long,
        env = "PENV_STRICT",
        value_parser = clap::builder::FalseyValueParser::new(),
        help = "Fail on a missing or stale lock file instead of continuing"
    )]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    #[command(about = "Print a stored value (KEY or SECTION.KEY)")]
    Get(ConfigGetArgs),
    #[command(about = "Store a value and save the config file")]
    Set(ConfigSetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    #[arg(value_name = "KEY")]
    pub key: String,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    #[arg(value_name = "KEY")]
    pub key: String,
    #[arg(value_name = "VALUE")]
    pub value: String,
}
