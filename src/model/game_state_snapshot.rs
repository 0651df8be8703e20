use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GameState, OptionSet, Question};

/// Everything a front end needs to draw the current question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateSnapshot {
    pub session_id: Uuid,
    pub state: GameState,
    pub question: Question,
    pub options: OptionSet,
    /// Set once the current question has been answered
    pub selected: Option<i64>,
    pub history_unsaved: bool,
}

impl GameStateSnapshot {
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }
}
