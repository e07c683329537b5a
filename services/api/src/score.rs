use crate::infra::InMemoryAssessmentStore;
use assessment_scoring::assessments::{
    AssessmentKind, AptitudeScore, QuestionBank, RequestCredentials, SubjectId,
    SubmissionPipeline, TraitScores,
};
use assessment_scoring::error::AppError;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

const LOCAL_TOKEN: &str = "offline";
const LOCAL_SUBJECT: &str = "local";

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding the submission body: {"answers": {"<question id>": <value>}}
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Print the stored record as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(kind: AssessmentKind, args: ScoreArgs) -> Result<(), AppError> {
    let body = std::fs::read(&args.answers)?;

    let store = InMemoryAssessmentStore::seeded(&QuestionBank::standard())
        .with_session(LOCAL_TOKEN, SubjectId(LOCAL_SUBJECT.to_string()));
    let pipeline = SubmissionPipeline::new(Arc::new(store));
    let credentials = RequestCredentials::bearer(LOCAL_TOKEN);

    let record = match kind {
        AssessmentKind::Personality => {
            let outcome = pipeline.submit_personality(&credentials, &body)?;
            if !args.json {
                render_traits(&outcome.score);
            }
            outcome.record
        }
        AssessmentKind::Aptitude => {
            let outcome = pipeline.submit_aptitude(&credentials, &body)?;
            if !args.json {
                render_aptitude(&outcome.score);
            }
            outcome.record
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Record unavailable: {err}"),
        }
    }

    Ok(())
}

fn render_traits(scores: &TraitScores) {
    println!("Personality profile (0-100 per trait)");
    for (item, score) in &scores.0 {
        println!("- {:<18} {:>6.2}", item.label(), score);
    }
}

fn render_aptitude(score: &AptitudeScore) {
    println!(
        "Aptitude result: {} correct ({}%)",
        score.score_total, score.percentage
    );
    println!("Breakdown:");
    for (category, correct) in &score.breakdown {
        println!("  - {}: {}", category.label(), correct);
    }
}
