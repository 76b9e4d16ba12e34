use clap::{Args, Parser, Subcommand, ValueEnum};
use mastery_kernel::RemedialTrigger;

#[derive(Parser)]
#[command(
    name = "mastery",
    about = "Mastery: score-driven gating over a tiered curriculum",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the curriculum a session would be seeded from
    Curriculum {
        #[command(flatten)]
        source: CurriculumArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a script of session commands and report every step
    Replay {
        /// Script path (one command per line, `#` starts a comment)
        script: String,

        #[command(flatten)]
        source: CurriculumArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drive a session interactively from stdin
    Repl {
        #[command(flatten)]
        source: CurriculumArgs,
    },

    /// Serve one session over HTTP
    Serve {
        #[command(flatten)]
        source: CurriculumArgs,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1:43180")]
        bind: String,
    },
}

#[derive(Args, Clone, Debug)]
pub struct CurriculumArgs {
    /// Curriculum TOML path (defaults to the embedded curriculum)
    #[arg(long)]
    pub curriculum: Option<String>,

    /// Override the curriculum's remedial trigger
    #[arg(long, value_enum)]
    pub remedial_trigger: Option<RemedialTriggerArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RemedialTriggerArg {
    #[value(name = "first_failure")]
    FirstFailure,
    #[value(name = "all_foundational_attempted")]
    AllFoundationalAttempted,
}

impl From<RemedialTriggerArg> for RemedialTrigger {
    fn from(arg: RemedialTriggerArg) -> Self {
        match arg {
            RemedialTriggerArg::FirstFailure => RemedialTrigger::FirstFailure,
            RemedialTriggerArg::AllFoundationalAttempted => {
                RemedialTrigger::AllFoundationalAttempted
            }
        }
    }
}
