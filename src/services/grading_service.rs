//! Scoring rules shared by the session engine and the result deriver.

use crate::models::question::{Question, QuestionType};
use crate::models::result::Grade;
use crate::models::session::{Answer, Score};
use crate::models::test::Test;
use serde_json::Value as JsonValue;

pub struct GradingService;

impl GradingService {
    /// Returns `(is_correct, awarded_marks)`.
    ///
    /// Only `mcq` questions are scored: the answer must be a string equal to
    /// the text of the first option flagged correct. Everything else scores 0.
    pub fn evaluate_answer(question: &Question, answer: &JsonValue) -> (bool, i32) {
        match question.question_type {
            QuestionType::Mcq => {
                let is_correct = match (question.correct_option(), answer.as_str()) {
                    (Some(option), Some(given)) => option.option_text == given,
                    _ => false,
                };
                let awarded = if is_correct { question.marks } else { 0 };
                (is_correct, awarded)
            }
            QuestionType::Other(_) => (false, 0),
        }
    }

    /// Builds the session score. `percentage` is not guarded against a zero
    /// `total_marks`.
    pub fn compute_score(test: &Test, answers: &[Answer]) -> Score {
        let attempted = answers.len() as i32;
        let correct = answers.iter().filter(|a| a.is_correct).count() as i32;
        let obtained_marks: i32 = answers.iter().map(|a| a.score).sum();
        let percentage = (obtained_marks as f64 / test.total_marks as f64) * 100.0;

        Score {
            total_questions: test.questions.len() as i32,
            attempted,
            correct,
            incorrect: attempted - correct,
            total_marks: test.total_marks,
            obtained_marks,
            percentage,
        }
    }

    /// Closed-below thresholds. NaN falls through to F.
    pub fn grade_for(percentage: f64) -> Grade {
        if percentage >= 90.0 {
            Grade::APlus
        } else if percentage >= 80.0 {
            Grade::A
        } else if percentage >= 70.0 {
            Grade::B
        } else if percentage >= 60.0 {
            Grade::C
        } else if percentage >= 50.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn passed(percentage: f64, passing_score: f64) -> bool {
        percentage >= passing_score
    }
}

/// Two-decimal rounding used by every aggregate.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
