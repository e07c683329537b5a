use crate::score::{run_score, ScoreArgs};
use crate::server;
use assessment_scoring::assessments::{AssessmentKind, SubjectId};
use assessment_scoring::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Assessment Scoring Service",
    about = "Validate and score personality and aptitude assessment submissions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an answer file offline against the standard question bank
    Score {
        #[command(subcommand)]
        assessment: ScoreCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ScoreCommand {
    /// Score a 50-item personality inventory answer file
    Personality(ScoreArgs),
    /// Score a 30-item aptitude answer file
    Aptitude(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed an in-memory session as TOKEN=SUBJECT (repeatable)
    #[arg(long = "session", value_parser = crate::infra::parse_session)]
    pub(crate) sessions: Vec<(String, SubjectId)>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score {
            assessment: ScoreCommand::Personality(args),
        } => run_score(AssessmentKind::Personality, args),
        Command::Score {
            assessment: ScoreCommand::Aptitude(args),
        } => run_score(AssessmentKind::Aptitude, args),
    }
}
