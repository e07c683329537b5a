mod answers;
mod output;

pub use answers::{
    decode_body, AnswerRejection, AnswerSheet, ChoiceScale, LikertScale, ResponseScale,
    ValidatedAnswers,
};
pub use output::{verify_trait_scores, OutputFault, VerifiedScores};
