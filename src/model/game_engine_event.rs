use super::{Feedback, GameState, GameStateSnapshot, HistoryEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedHistory {
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug)]
pub enum GameEngineEvent {
    QuestionChanged(GameStateSnapshot),
    AnswerEvaluated {
        selected: i64,
        feedback: Feedback,
    },
    StatsChanged(GameState),
    LevelUp(u32),
    HistoryChanged(Vec<HistoryEntry>),
    HistoryExported(ExportedHistory),
    OperationFailed(String),
}
