use itertools::Itertools;
use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::model::{max_magnitude, Operator, OptionSet, Question, CORRECT_MESSAGES};

const DISTRACTOR_COUNT: usize = OptionSet::FULL_SIZE - 1;
const BACKFILL_SPREAD: i64 = 10;

/// Wrong answers modelled on common sign mistakes, in priority order and
/// before de-duplication.
fn candidate_distractors(question: &Question) -> Vec<i64> {
    let Question {
        operand_a: a,
        operand_b: b,
        operator,
        correct_result,
    } = *question;

    // add instead of subtract (or the reverse)
    let mut candidates = vec![operator.opposite().apply(a, b)];

    // signs dropped: everything collapses to one sign
    if question.has_negative_operand() {
        let unsigned_sum = a.abs() + b.abs();
        candidates.push(match operator {
            Operator::Add => -unsigned_sum,
            Operator::Subtract => unsigned_sum,
        });
    }

    // right magnitude, wrong sign
    candidates.push(-correct_result);
    candidates
}

/// Up to three distinct distractors, never equal to the correct result.
pub fn distractors(question: &Question) -> Vec<i64> {
    candidate_distractors(question)
        .into_iter()
        .unique()
        .filter(|value| *value != question.correct_result)
        .take(DISTRACTOR_COUNT)
        .collect()
}

pub struct QuestionGenerator {
    rng: StdRng,
    seed: u64,
    backfill_options: bool,
}

impl QuestionGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            backfill_options: false,
        }
    }

    /// Pad option sets with random nearby values when the sign heuristics collide.
    pub fn with_backfill(mut self, backfill_options: bool) -> Self {
        self.backfill_options = backfill_options;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generate_question(&mut self, level: u32) -> Question {
        let max = max_magnitude(level);
        let operators = Operator::all();
        let operator = operators[self.rng.random_range(0..operators.len())];
        let operand_a = self.rng.random_range(-max..=max);
        let operand_b = self.rng.random_range(-max..=max);

        let question = Question::new(operand_a, operator, operand_b);
        trace!(target: "generator", "Level {} (±{}): {}", level, max, question.prompt());
        question
    }

    pub fn generate_options(&mut self, question: &Question) -> OptionSet {
        let mut options = vec![question.correct_result];
        options.extend(distractors(question));

        if self.backfill_options {
            while options.len() < OptionSet::FULL_SIZE {
                let offset = self.rng.random_range(1..=BACKFILL_SPREAD);
                let value = if self.rng.random_bool(0.5) {
                    question.correct_result + offset
                } else {
                    question.correct_result - offset
                };
                if !options.contains(&value) {
                    options.push(value);
                }
            }
        }

        options.shuffle(&mut self.rng);
        trace!(target: "generator", "Options for {}: {:?}", question, options);
        OptionSet::from_shuffled(options)
    }

    pub fn praise(&mut self) -> &'static str {
        CORRECT_MESSAGES[self.rng.random_range(0..CORRECT_MESSAGES.len())]
    }
}
