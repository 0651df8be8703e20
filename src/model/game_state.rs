use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoringRules {
    pub questions_per_level: u32,
    pub points_per_level: u64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            questions_per_level: 5,
            points_per_level: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub score: u64,
    pub level: u32,
    pub correct_count: u32,
    pub questions_answered: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            correct_count: 0,
            questions_answered: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub state: GameState,
    pub is_correct: bool,
    pub leveled_up: bool,
    pub points_awarded: u64,
}

impl GameState {
    /// Counter transition for one answered question. Points use the level the
    /// question was answered at; the level-up happens afterwards.
    pub fn answered(self, is_correct: bool, rules: &ScoringRules) -> AnswerOutcome {
        let mut state = self;
        let mut points_awarded = 0;
        if is_correct {
            points_awarded = rules.points_per_level * state.level as u64;
            state.correct_count += 1;
            state.score += points_awarded;
        }
        state.questions_answered += 1;

        let leveled_up = rules.questions_per_level > 0
            && state.questions_answered % rules.questions_per_level == 0;
        if leveled_up {
            state.level += 1;
        }

        AnswerOutcome {
            state,
            is_correct,
            leveled_up,
            points_awarded,
        }
    }

    pub fn restarted(self) -> GameState {
        GameState::default()
    }
}
