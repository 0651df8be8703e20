use log::{error, info, trace, warn};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

use super::csv_export::export_file_name_today;
use super::error::{QuizError, Result};
use super::history_ledger::HistoryLedger;
use super::history_store::HistoryStore;
use super::question_generator::QuestionGenerator;
use super::settings::Settings;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    AnswerOutcome, EntryInputs, ExportedHistory, Feedback, GameEngineCommand, GameEngineEvent,
    GameState, GameStateSnapshot, HistoryEntry, OptionSet, Question, ScoringRules,
};

/// What a front end needs after an answer: the classification to show and the
/// counters after the transition.
#[derive(Debug)]
pub struct AnswerResult {
    pub feedback: Feedback,
    pub outcome: AnswerOutcome,
    pub entry: HistoryEntry,
    /// The answer counted, but the ledger could not be saved
    pub history_error: Option<QuizError>,
}

pub struct GameEngine {
    session_id: Uuid,
    state: GameState,
    rules: ScoringRules,
    generator: QuestionGenerator,
    ledger: HistoryLedger,
    question: Question,
    options: OptionSet,
    selected: Option<i64>,
    history_unsaved: bool,
    game_engine_event_emitter: Option<EventEmitter<GameEngineEvent>>,
    subscription: Option<Unsubscriber<GameEngineCommand>>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.game_engine_event_emitter = None;
    }
}

impl GameEngine {
    pub fn new(
        rules: ScoringRules,
        mut generator: QuestionGenerator,
        ledger: HistoryLedger,
    ) -> Self {
        let state = GameState::default();
        let question = generator.generate_question(state.level);
        let options = generator.generate_options(&question);
        info!(
            target: "game_engine",
            "New session; seed: {}; {} history entries",
            generator.seed(),
            ledger.len()
        );
        Self {
            session_id: Uuid::new_v4(),
            state,
            rules,
            generator,
            ledger,
            question,
            options,
            selected: None,
            history_unsaved: false,
            game_engine_event_emitter: None,
            subscription: None,
        }
    }

    /// Builds an engine from settings, failing if the stored history is unusable.
    pub fn from_settings(
        settings: &Settings,
        store: Box<dyn HistoryStore>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let ledger = HistoryLedger::open(store)?.with_limit(settings.history_limit);
        let generator = QuestionGenerator::new(seed).with_backfill(settings.backfill_options);
        Ok(Self::new(settings.scoring_rules(), generator, ledger))
    }

    /// Moves the engine behind the command channel: every command observed is
    /// handled and its results published as events.
    pub fn attach(
        self,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
    ) -> Rc<RefCell<Self>> {
        let engine = Rc::new(RefCell::new(self));
        engine.borrow_mut().game_engine_event_emitter = Some(game_engine_event_emitter);
        GameEngine::wire_subscription(engine.clone(), game_engine_command_observer);
        engine
    }

    fn wire_subscription(
        engine: Rc<RefCell<Self>>,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) {
        let engine_handler = engine.clone();
        let subscription = game_engine_command_observer.subscribe(move |command| {
            let mut engine = engine_handler.borrow_mut();
            engine.handle_command(command.clone());
        });
        engine.borrow_mut().subscription = Some(subscription);
    }

    fn emit(&self, event: GameEngineEvent) {
        if let Some(emitter) = &self.game_engine_event_emitter {
            emitter.emit(event);
        }
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        let result = match command {
            GameEngineCommand::NewQuestion => {
                self.request_new_question();
                Ok(())
            }
            GameEngineCommand::SelectAnswer(value) => self.select_answer(value).map(|_| ()),
            GameEngineCommand::Restart => {
                self.restart();
                Ok(())
            }
            GameEngineCommand::ClearHistory { confirmed } => {
                self.clear_history(confirmed).map(|_| ())
            }
            GameEngineCommand::ExportHistory => self.export_history().map(|_| ()),
        };
        if let Err(err) = result {
            error!(target: "game_engine", "{}", err);
            self.emit(GameEngineEvent::OperationFailed(err.to_string()));
        }
    }

    /// Announces the current question, counters and history to listeners.
    pub fn sync_display(&self) {
        self.emit(GameEngineEvent::QuestionChanged(self.snapshot()));
        self.emit(GameEngineEvent::StatsChanged(self.state));
        self.emit(GameEngineEvent::HistoryChanged(self.ledger.entries().to_vec()));
    }

    fn next_question(&mut self) {
        self.question = self.generator.generate_question(self.state.level);
        self.options = self.generator.generate_options(&self.question);
        self.selected = None;
        self.emit(GameEngineEvent::QuestionChanged(self.snapshot()));
    }

    /// Replaces the question; counters are untouched.
    pub fn request_new_question(&mut self) -> GameStateSnapshot {
        self.next_question();
        self.snapshot()
    }

    pub fn select_answer(&mut self, value: i64) -> Result<AnswerResult> {
        if self.selected.is_some() || !self.options.contains(value) {
            return Err(QuizError::InvalidSelection { value });
        }
        let is_correct = value == self.question.correct_result;
        let inputs = EntryInputs {
            question_text: self.question.to_string(),
            user_answer: value,
            correct_answer: self.question.correct_result,
            level: self.state.level,
        };
        let entry = self.ledger.stamp(inputs)?;
        self.selected = Some(value);

        let history_error = match self.ledger.insert(entry.clone()) {
            Ok(()) => {
                self.history_unsaved = false;
                None
            }
            Err(err) => {
                warn!(target: "game_engine", "History not saved this session: {}", err);
                self.history_unsaved = true;
                Some(err)
            }
        };

        let feedback = if is_correct {
            Feedback::Correct {
                message: self.generator.praise(),
            }
        } else {
            Feedback::incorrect(&self.question)
        };

        let outcome = self.state.answered(is_correct, &self.rules);
        self.state = outcome.state;
        if outcome.leveled_up {
            info!(target: "game_engine", "Level up: {}", self.state.level);
        }

        self.emit(GameEngineEvent::AnswerEvaluated {
            selected: value,
            feedback: feedback.clone(),
        });
        self.emit(GameEngineEvent::StatsChanged(self.state));
        if outcome.leveled_up {
            self.emit(GameEngineEvent::LevelUp(self.state.level));
        }
        self.emit(GameEngineEvent::HistoryChanged(self.ledger.entries().to_vec()));
        if let Some(err) = &history_error {
            self.emit(GameEngineEvent::OperationFailed(err.to_string()));
        }

        Ok(AnswerResult {
            feedback,
            outcome,
            entry,
            history_error,
        })
    }

    /// Resets the counters and starts a new session; history is kept.
    pub fn restart(&mut self) -> GameStateSnapshot {
        self.state = self.state.restarted();
        self.session_id = Uuid::new_v4();
        info!(target: "game_engine", "Restarted; session: {}", self.session_id);
        self.emit(GameEngineEvent::StatsChanged(self.state));
        self.next_question();
        self.snapshot()
    }

    pub fn clear_history(&mut self, confirmed: bool) -> Result<bool> {
        let cleared = self.ledger.clear(confirmed)?;
        if cleared {
            self.history_unsaved = false;
            self.emit(GameEngineEvent::HistoryChanged(Vec::new()));
        }
        Ok(cleared)
    }

    pub fn export_history(&self) -> Result<ExportedHistory> {
        let exported = ExportedHistory {
            file_name: export_file_name_today(),
            contents: self.ledger.export_csv()?,
        };
        self.emit(GameEngineEvent::HistoryExported(exported.clone()));
        Ok(exported)
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        GameStateSnapshot {
            session_id: self.session_id,
            state: self.state,
            question: self.question,
            options: self.options.clone(),
            selected: self.selected,
            history_unsaved: self.history_unsaved,
        }
    }

    pub fn get_state(&self) -> GameState {
        self.state
    }

    pub fn get_question(&self) -> &Question {
        &self.question
    }

    pub fn get_options(&self) -> &OptionSet {
        &self.options
    }

    pub fn get_history(&self) -> &[HistoryEntry] {
        self.ledger.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::game::history_store::{MemoryStore, HISTORY_KEY};
    use crate::model::Operator;
    use crate::tests::UsingLogger;
    use test_context::test_context;

    fn engine_with(store: &MemoryStore, seed: u64) -> GameEngine {
        GameEngine::from_settings(&Settings::default(), Box::new(store.clone()), Some(seed))
            .unwrap()
    }

    fn wrong_option(engine: &GameEngine) -> Option<i64> {
        let correct = engine.get_question().correct_result;
        engine
            .get_options()
            .values()
            .iter()
            .copied()
            .find(|v| *v != correct)
    }

    /// Answers the current question and moves on.
    fn answer(engine: &mut GameEngine, correct: bool) -> AnswerResult {
        while !correct && wrong_option(engine).is_none() {
            engine.request_new_question();
        }
        let value = if correct {
            engine.get_question().correct_result
        } else {
            wrong_option(engine).unwrap()
        };
        let result = engine.select_answer(value).unwrap();
        engine.request_new_question();
        result
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_correct_answer_scores_and_records(_: &mut UsingLogger) {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 1);
        let question = *engine.get_question();

        let result = engine.select_answer(question.correct_result).unwrap();
        assert!(result.feedback.is_correct());
        assert!(result.history_error.is_none());
        assert_eq!(engine.get_state().score, 10);
        assert_eq!(engine.get_state().correct_count, 1);
        assert_eq!(result.entry.question_text, question.to_string());
        assert!(result.entry.is_correct);
        assert_eq!(engine.get_history()[0], result.entry);
        assert!(store.raw().is_some());
    }

    #[test]
    fn test_incorrect_answer_explains() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 2);
        let result = answer(&mut engine, false);
        assert!(!result.feedback.is_correct());
        assert!(!result.entry.is_correct);
        assert_eq!(engine.get_state().score, 0);
        assert_eq!(engine.get_state().questions_answered, 1);
    }

    #[test]
    fn test_selection_must_be_an_open_option() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 3);
        let not_offered = engine.get_options().values().iter().max().unwrap() + 1;
        assert!(matches!(
            engine.select_answer(not_offered),
            Err(QuizError::InvalidSelection { value }) if value == not_offered
        ));

        let correct = engine.get_question().correct_result;
        engine.select_answer(correct).unwrap();
        assert!(engine.snapshot().is_answered());
        assert!(matches!(
            engine.select_answer(correct),
            Err(QuizError::InvalidSelection { .. })
        ));
        assert_eq!(engine.get_state().questions_answered, 1);
        assert_eq!(engine.get_history().len(), 1);
    }

    #[test]
    fn test_levels_and_score_over_a_session() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 4);
        for _ in 0..4 {
            answer(&mut engine, true);
        }
        assert_eq!(engine.get_state().level, 1);
        let fifth = answer(&mut engine, true);
        assert!(fifth.outcome.leveled_up);
        assert_eq!(fifth.outcome.points_awarded, 10);
        assert_eq!(engine.get_state().level, 2);
        assert_eq!(engine.get_state().score, 50);

        let sixth = answer(&mut engine, true);
        assert_eq!(sixth.outcome.points_awarded, 20);
        assert_eq!(sixth.entry.level, 2);
        for _ in 0..4 {
            answer(&mut engine, false);
        }
        assert_eq!(engine.get_state().level, 3);
        assert_eq!(engine.get_state().score, 70);

        let max = crate::model::max_magnitude(3);
        let question = engine.get_question();
        assert!(question.operand_a.abs() <= max && question.operand_b.abs() <= max);
    }

    #[test]
    fn test_new_question_leaves_counters() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 5);
        answer(&mut engine, true);
        let before = engine.get_state();
        let snapshot = engine.request_new_question();
        assert_eq!(snapshot.state, before);
        assert!(!snapshot.is_answered());
    }

    #[test]
    fn test_restart_keeps_history() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 6);
        for n in 0..4 {
            answer(&mut engine, n != 2);
        }
        let session = engine.snapshot().session_id;
        let snapshot = engine.restart();
        assert_eq!(snapshot.state, GameState::default());
        assert_ne!(snapshot.session_id, session);
        assert_eq!(engine.get_history().len(), 4);
    }

    #[test]
    fn test_history_survives_restart_of_process() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 7);
        let result = answer(&mut engine, true);
        drop(engine);

        let reopened = engine_with(&store, 8);
        assert_eq!(reopened.get_history()[0], result.entry);
        assert_eq!(reopened.get_state(), GameState::default());
    }

    #[test]
    fn test_unsaved_history_does_not_stop_play() {
        let store = MemoryStore::new(HISTORY_KEY).with_quota(0);
        let mut engine = engine_with(&store, 9);
        let result = answer(&mut engine, true);
        assert!(matches!(result.history_error, Some(QuizError::Persistence(_))));
        assert!(engine.snapshot().history_unsaved);
        assert_eq!(engine.get_state().score, 10);
        assert_eq!(engine.get_history().len(), 1);
    }

    #[test]
    fn test_unsaved_flag_clears_after_store_recovers() {
        let store = MemoryStore::new(HISTORY_KEY).with_quota(0);
        let mut engine = engine_with(&store, 9);
        assert!(answer(&mut engine, true).history_error.is_some());
        assert!(engine.snapshot().history_unsaved);

        store.set_quota(None);
        assert!(answer(&mut engine, false).history_error.is_none());
        assert!(!engine.snapshot().history_unsaved);
        let saved: Vec<HistoryEntry> = serde_json::from_slice(&store.raw().unwrap()).unwrap();
        assert_eq!(saved.len(), 2);
    }

    #[test]
    fn test_exhausted_ids_leave_question_open() {
        let store = MemoryStore::new(HISTORY_KEY);
        let stored = format!(
            r#"[{{"id":{},"timestamp":"t","question_text":"1 + 1","user_answer":2,"correct_answer":2,"is_correct":true,"level":1}}]"#,
            u64::MAX
        );
        store.put_raw(stored.as_bytes());
        let mut engine = engine_with(&store, 12);
        let correct = engine.get_question().correct_result;

        let result = engine.select_answer(correct);
        assert!(matches!(result, Err(QuizError::IdsExhausted { .. })));
        assert_eq!(engine.get_state().questions_answered, 0);
        assert_eq!(engine.get_history().len(), 1);
        assert_eq!(engine.snapshot().selected, None);
    }

    #[test]
    fn test_clear_and_export() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 10);
        assert!(matches!(engine.export_history(), Err(QuizError::EmptyExport)));

        answer(&mut engine, true);
        let exported = engine.export_history().unwrap();
        assert!(exported.file_name.starts_with("historial_matematicas_"));
        assert!(exported.file_name.ends_with(".csv"));
        assert_eq!(String::from_utf8(exported.contents).unwrap().lines().count(), 2);

        assert!(!engine.clear_history(false).unwrap());
        assert_eq!(engine.get_history().len(), 1);
        assert!(engine.clear_history(true).unwrap());
        assert!(engine.get_history().is_empty());
        assert_eq!(store.raw(), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_malformed_store_fails_to_open() {
        let store = MemoryStore::new(HISTORY_KEY);
        store.put_raw(b"[{\"id\":");
        let result = GameEngine::from_settings(&Settings::default(), Box::new(store), Some(1));
        assert!(matches!(result, Err(err) if err.is_persistence()));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_commands_publish_events(_: &mut UsingLogger) {
        let (command_emitter, command_observer) = Channel::<GameEngineCommand>::new();
        let (event_emitter, event_observer) = Channel::<GameEngineEvent>::new();
        let events = Rc::new(RefCell::new(Vec::<String>::new()));
        let events_clone = events.clone();
        event_observer.subscribe(move |event| {
            let name = match event {
                GameEngineEvent::QuestionChanged(_) => "question",
                GameEngineEvent::AnswerEvaluated { .. } => "answer",
                GameEngineEvent::StatsChanged(_) => "stats",
                GameEngineEvent::LevelUp(_) => "level",
                GameEngineEvent::HistoryChanged(_) => "history",
                GameEngineEvent::HistoryExported(_) => "exported",
                GameEngineEvent::OperationFailed(_) => "failed",
            };
            events_clone.borrow_mut().push(name.to_string());
        });

        let store = MemoryStore::new(HISTORY_KEY);
        let engine = engine_with(&store, 11).attach(command_observer, event_emitter);

        command_emitter.emit(GameEngineCommand::ExportHistory);
        let correct = engine.borrow().get_question().correct_result;
        command_emitter.emit(GameEngineCommand::SelectAnswer(correct));
        command_emitter.emit(GameEngineCommand::NewQuestion);
        command_emitter.emit(GameEngineCommand::ExportHistory);
        assert_eq!(
            *events.borrow(),
            vec!["failed", "answer", "stats", "history", "question", "exported"]
        );

        engine.borrow_mut().destroy();
        command_emitter.emit(GameEngineCommand::Restart);
        assert_eq!(events.borrow().len(), 6);
        assert_eq!(engine.borrow().get_state().questions_answered, 1);
    }

    #[test]
    fn test_question_text_in_history() {
        let store = MemoryStore::new(HISTORY_KEY);
        let mut engine = engine_with(&store, 12);
        let question = *engine.get_question();
        engine.select_answer(question.correct_result).unwrap();
        let expected = format!(
            "{} {} {}",
            question.operand_a,
            match question.operator {
                Operator::Add => "+",
                Operator::Subtract => "-",
            },
            question.operand_b
        );
        assert_eq!(engine.get_history()[0].question_text, expected);
    }
}
