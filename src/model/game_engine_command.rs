#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEngineCommand {
    NewQuestion,
    SelectAnswer(i64),
    Restart,
    ClearHistory { confirmed: bool },
    ExportHistory,
}
