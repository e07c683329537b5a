use super::domain::{AssessmentKind, QuestionRow};

/// Question rows shipped with the service, used by the in-memory store and offline scoring.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    personality: Vec<QuestionRow>,
    aptitude: Vec<QuestionRow>,
}

impl QuestionBank {
    pub fn standard() -> Self {
        Self {
            personality: personality_rows(),
            aptitude: aptitude_rows(),
        }
    }

    pub fn rows(&self, kind: AssessmentKind) -> &[QuestionRow] {
        match kind {
            AssessmentKind::Personality => &self.personality,
            AssessmentKind::Aptitude => &self.aptitude,
        }
    }
}

// Public-domain Big Five markers, administered in the usual E/A/C/N/O rotation.
// Neuroticism items are keyed toward instability.
const PERSONALITY_ITEMS: [(&str, &str, i64); 50] = [
    ("extraversion", "Am the life of the party.", 1),
    ("agreeableness", "Feel little concern for others.", -1),
    ("conscientiousness", "Am always prepared.", 1),
    ("neuroticism", "Get stressed out easily.", 1),
    ("openness", "Have a rich vocabulary.", 1),
    ("extraversion", "Don't talk a lot.", -1),
    ("agreeableness", "Am interested in people.", 1),
    ("conscientiousness", "Leave my belongings around.", -1),
    ("neuroticism", "Am relaxed most of the time.", -1),
    ("openness", "Have difficulty understanding abstract ideas.", -1),
    ("extraversion", "Feel comfortable around people.", 1),
    ("agreeableness", "Insult people.", -1),
    ("conscientiousness", "Pay attention to details.", 1),
    ("neuroticism", "Worry about things.", 1),
    ("openness", "Have a vivid imagination.", 1),
    ("extraversion", "Keep in the background.", -1),
    ("agreeableness", "Sympathize with others' feelings.", 1),
    ("conscientiousness", "Make a mess of things.", -1),
    ("neuroticism", "Seldom feel blue.", -1),
    ("openness", "Am not interested in abstract ideas.", -1),
    ("extraversion", "Start conversations.", 1),
    ("agreeableness", "Am not interested in other people's problems.", -1),
    ("conscientiousness", "Get chores done right away.", 1),
    ("neuroticism", "Am easily disturbed.", 1),
    ("openness", "Have excellent ideas.", 1),
    ("extraversion", "Have little to say.", -1),
    ("agreeableness", "Have a soft heart.", 1),
    ("conscientiousness", "Often forget to put things back in their proper place.", -1),
    ("neuroticism", "Get upset easily.", 1),
    ("openness", "Do not have a good imagination.", -1),
    ("extraversion", "Talk to a lot of different people at parties.", 1),
    ("agreeableness", "Am not really interested in others.", -1),
    ("conscientiousness", "Like order.", 1),
    ("neuroticism", "Change my mood a lot.", 1),
    ("openness", "Am quick to understand things.", 1),
    ("extraversion", "Don't like to draw attention to myself.", -1),
    ("agreeableness", "Take time out for others.", 1),
    ("conscientiousness", "Shirk my duties.", -1),
    ("neuroticism", "Have frequent mood swings.", 1),
    ("openness", "Use difficult words.", 1),
    ("extraversion", "Don't mind being the center of attention.", 1),
    ("agreeableness", "Feel others' emotions.", 1),
    ("conscientiousness", "Follow a schedule.", 1),
    ("neuroticism", "Get irritated easily.", 1),
    ("openness", "Spend time reflecting on things.", 1),
    ("extraversion", "Am quiet around strangers.", -1),
    ("agreeableness", "Make people feel at ease.", 1),
    ("conscientiousness", "Am exacting in my work.", 1),
    ("neuroticism", "Often feel blue.", 1),
    ("openness", "Am full of ideas.", 1),
];

const APTITUDE_ITEMS: [(&str, &str, &str); 30] = [
    ("numerical", "What is 15% of 240? (A) 32 (B) 36 (C) 40 (D) 42", "B"),
    ("numerical", "Next in the series 3, 9, 27, 81, ...? (A) 162 (B) 216 (C) 243 (D) 324", "C"),
    ("numerical", "A shirt costs 40 after a 20% discount. Original price? (A) 48 (B) 50 (C) 52 (D) 60", "B"),
    ("numerical", "Average of 12, 18, 24 and 30? (A) 19 (B) 20 (C) 21 (D) 22", "C"),
    ("numerical", "A train covers 180 km in 2.5 hours. Speed in km/h? (A) 64 (B) 70 (C) 72 (D) 75", "C"),
    ("numerical", "Simplify 3/4 + 5/8. (A) 11/8 (B) 9/8 (C) 8/12 (D) 13/8", "A"),
    ("numerical", "If 6 workers finish a job in 10 days, 15 workers need? (A) 3 (B) 4 (C) 5 (D) 6", "B"),
    ("numerical", "Next in the series 2, 6, 12, 20, 30, ...? (A) 40 (B) 42 (C) 44 (D) 48", "B"),
    ("numerical", "Ratio 3:5 split of 64 gives the larger part? (A) 36 (B) 38 (C) 40 (D) 44", "C"),
    ("numerical", "Simple interest on 2000 at 5% for 3 years? (A) 250 (B) 300 (C) 350 (D) 400", "B"),
    ("verbal", "Synonym of 'candid': (A) frank (B) sweet (C) hidden (D) brief", "A"),
    ("verbal", "Antonym of 'scarce': (A) rare (B) plentiful (C) thin (D) costly", "B"),
    ("verbal", "Book is to reading as fork is to: (A) drawing (B) writing (C) eating (D) stirring", "C"),
    ("verbal", "Odd one out: (A) violin (B) cello (C) flute (D) viola", "C"),
    ("verbal", "Correct spelling: (A) recieve (B) receive (C) receeve (D) riceive", "B"),
    ("verbal", "Synonym of 'meticulous': (A) careless (B) hasty (C) thorough (D) vague", "C"),
    ("verbal", "Antonym of 'benevolent': (A) kind (B) generous (C) gentle (D) malicious", "D"),
    ("verbal", "Doctor is to hospital as teacher is to: (A) school (B) book (C) student (D) lesson", "A"),
    ("verbal", "Best word for 'She spoke ___ to calm the child.': (A) harshly (B) softly (C) loudly (D) rarely", "B"),
    ("verbal", "Odd one out: (A) apple (B) carrot (C) banana (D) mango", "B"),
    ("logical", "All roses are flowers; some flowers fade fast. Then: (A) all roses fade fast (B) some roses may fade fast (C) no rose fades (D) flowers are roses", "B"),
    ("logical", "Next letter pair: AB, DE, GH, ...? (A) IJ (B) JK (C) KL (D) HI", "B"),
    ("logical", "If CAT is coded 3-1-20, DOG is: (A) 4-15-7 (B) 4-14-7 (C) 3-15-7 (D) 4-15-8", "A"),
    ("logical", "Tom is taller than Sam; Sam is taller than Lee. Shortest? (A) Tom (B) Sam (C) Lee (D) cannot tell", "C"),
    ("logical", "A clock shows 3:15. Angle between hands? (A) 0 (B) 7.5 (C) 15 (D) 30", "B"),
    ("logical", "Which does not belong: 2, 3, 5, 9, 11? (A) 2 (B) 3 (C) 9 (D) 11", "C"),
    ("logical", "Facing north, turn right twice then left once. Now facing? (A) north (B) east (C) south (D) west", "B"),
    ("logical", "If some A are B and all B are C, then: (A) all A are C (B) some A are C (C) no A is C (D) all C are A", "B"),
    ("logical", "Next in the series 1, 1, 2, 3, 5, 8, ...? (A) 11 (B) 12 (C) 13 (D) 14", "C"),
    ("logical", "Monday is two days after the day before yesterday. Today is? (A) Sunday (B) Monday (C) Tuesday (D) Wednesday", "B"),
];

fn personality_rows() -> Vec<QuestionRow> {
    PERSONALITY_ITEMS
        .iter()
        .enumerate()
        .map(|(index, (category, prompt, polarity))| QuestionRow {
            id: format!("bf-{:02}", index + 1),
            category: (*category).to_string(),
            prompt: (*prompt).to_string(),
            polarity: Some(*polarity),
            correct_option: None,
        })
        .collect()
}

fn aptitude_rows() -> Vec<QuestionRow> {
    APTITUDE_ITEMS
        .iter()
        .enumerate()
        .map(|(index, (category, prompt, correct))| QuestionRow {
            id: format!("apt-{:02}", index + 1),
            category: (*category).to_string(),
            prompt: (*prompt).to_string(),
            polarity: None,
            correct_option: Some((*correct).to_string()),
        })
        .collect()
}
