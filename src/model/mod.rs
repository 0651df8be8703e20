mod feedback;
mod game_engine_command;
mod game_engine_event;
pub mod game_state;
pub mod game_state_snapshot;
mod history_entry;
mod operator;
mod option_set;
pub mod question;

pub use feedback::{error_details, ErrorCategory, Feedback, CORRECT_MESSAGES};
pub use game_engine_command::GameEngineCommand;
pub use game_engine_event::{ExportedHistory, GameEngineEvent};
pub use game_state::{AnswerOutcome, GameState, ScoringRules};
pub use game_state_snapshot::GameStateSnapshot;
pub use history_entry::{EntryInputs, HistoryEntry};
pub use operator::Operator;
pub use option_set::OptionSet;
pub use question::{max_magnitude, Question};
