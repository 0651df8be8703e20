use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u64,
    #[serde(alias = "dateTime")]
    pub timestamp: String,
    #[serde(alias = "question")]
    pub question_text: String,
    #[serde(alias = "userAnswer")]
    pub user_answer: i64,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: i64,
    #[serde(alias = "isCorrect")]
    pub is_correct: bool,
    pub level: u32,
}

impl HistoryEntry {
    pub fn new(
        id: u64,
        timestamp: String,
        question_text: String,
        user_answer: i64,
        correct_answer: i64,
        level: u32,
    ) -> Self {
        Self {
            id,
            timestamp,
            question_text,
            user_answer,
            correct_answer,
            is_correct: user_answer == correct_answer,
            level,
        }
    }

    pub fn result_label(&self) -> &'static str {
        if self.is_correct {
            "Correcto"
        } else {
            "Incorrecto"
        }
    }

    pub fn result_mark(&self) -> &'static str {
        if self.is_correct {
            "✅"
        } else {
            "❌"
        }
    }
}

/// What the caller knows about an answer before the ledger stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInputs {
    pub question_text: String,
    pub user_answer: i64,
    pub correct_answer: i64,
    pub level: u32,
}
