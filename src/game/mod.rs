pub mod csv_export;
pub mod error;
pub mod game_engine;
pub mod history_ledger;
pub mod history_store;
pub mod question_generator;
pub mod settings;

pub use error::{QuizError, StoreError};
pub use game_engine::{AnswerResult, GameEngine};
pub use history_ledger::HistoryLedger;
pub use history_store::{FileStore, HistoryStore, MemoryStore, HISTORY_KEY};
pub use question_generator::QuestionGenerator;
pub use settings::Settings;
