use log::{info, warn};
use std::cell::RefCell;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::game::history_ledger::EMPTY_HISTORY_MESSAGE;
use crate::model::{
    ErrorCategory, ExportedHistory, GameEngineCommand, GameEngineEvent, GameStateSnapshot,
    HistoryEntry,
};

const HELP: &str = "\
1-4  responder        n  siguiente pregunta   r  reiniciar
h    ver historial    c  limpiar historial    e  exportar CSV
d    errores comunes  ?  ayuda                q  salir";

#[derive(Default)]
struct ViewState {
    snapshot: Option<GameStateSnapshot>,
    history: Vec<HistoryEntry>,
    pending_export: Option<ExportedHistory>,
    outbox: Vec<String>,
}

/// Line-oriented front end: renders engine events, turns typed keys into
/// commands.
pub struct TerminalUi {
    commands: EventEmitter<GameEngineCommand>,
    view: Rc<RefCell<ViewState>>,
    subscription: Option<Unsubscriber<GameEngineEvent>>,
    export_dir: PathBuf,
}

impl TerminalUi {
    pub fn new(
        commands: EventEmitter<GameEngineCommand>,
        events: EventObserver<GameEngineEvent>,
        export_dir: PathBuf,
        debug_mode: bool,
    ) -> Self {
        let view = Rc::new(RefCell::new(ViewState::default()));
        let view_handler = view.clone();
        let subscription = events.subscribe(move |event| {
            view_handler.borrow_mut().handle_event(event, debug_mode);
        });
        Self {
            commands,
            view,
            subscription: Some(subscription),
            export_dir,
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> std::io::Result<()> {
        writeln!(output, "{}", HELP)?;
        self.flush(output)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next() {
            let line = line?;
            match line.trim() {
                "q" => break,
                "n" => self.commands.emit(GameEngineCommand::NewQuestion),
                "r" => self.commands.emit(GameEngineCommand::Restart),
                "e" => self.commands.emit(GameEngineCommand::ExportHistory),
                "h" => self.render_history(),
                "d" => self.render_error_categories(),
                "?" => self.view.borrow_mut().outbox.push(HELP.to_string()),
                "c" => {
                    writeln!(
                        output,
                        "¿Estás seguro de que quieres limpiar todo el historial? (s/n)"
                    )?;
                    let confirmed = match lines.next() {
                        Some(answer) => answer?.trim().eq_ignore_ascii_case("s"),
                        None => false,
                    };
                    self.commands
                        .emit(GameEngineCommand::ClearHistory { confirmed });
                }
                "" => (),
                other => self.select(other),
            }
            self.write_pending_export()?;
            self.flush(output)?;
        }
        Ok(())
    }

    fn option_at(&self, key: &str) -> Option<i64> {
        let position = key.parse::<usize>().ok()?.checked_sub(1)?;
        let view = self.view.borrow();
        view.snapshot.as_ref()?.options.get(position)
    }

    fn select(&mut self, key: &str) {
        match self.option_at(key) {
            Some(value) => self.commands.emit(GameEngineCommand::SelectAnswer(value)),
            None => self
                .view
                .borrow_mut()
                .outbox
                .push(format!("Opción desconocida: {}", key)),
        }
    }

    fn render_history(&self) {
        let mut view = self.view.borrow_mut();
        if view.history.is_empty() {
            view.outbox.push(EMPTY_HISTORY_MESSAGE.to_string());
            return;
        }
        let rows: Vec<String> = view
            .history
            .iter()
            .map(|entry| {
                format!(
                    "{}  {:<10} {:>5} {:>5}  {}",
                    entry.timestamp,
                    entry.question_text,
                    entry.user_answer,
                    entry.correct_answer,
                    entry.result_mark()
                )
            })
            .collect();
        view.outbox.extend(rows);
    }

    fn render_error_categories(&self) {
        let mut view = self.view.borrow_mut();
        for category in ErrorCategory::all() {
            view.outbox
                .push(format!("{}: {}", category.key(), category.details()));
        }
    }

    fn write_pending_export(&self) -> std::io::Result<()> {
        let pending = self.view.borrow_mut().pending_export.take();
        if let Some(exported) = pending {
            fs::create_dir_all(&self.export_dir)?;
            let path = self.export_dir.join(&exported.file_name);
            fs::write(&path, &exported.contents)?;
            info!(target: "ui", "Exported history to {:?}", path);
            self.view
                .borrow_mut()
                .outbox
                .push(format!("Historial exportado a {}", path.display()));
        }
        Ok(())
    }

    fn flush<W: Write>(&self, output: &mut W) -> std::io::Result<()> {
        let lines: Vec<String> = self.view.borrow_mut().outbox.drain(..).collect();
        for line in lines {
            writeln!(output, "{}", line)?;
        }
        output.flush()
    }

    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl ViewState {
    fn handle_event(&mut self, event: &GameEngineEvent, debug_mode: bool) {
        match event {
            GameEngineEvent::QuestionChanged(snapshot) => {
                let mut text = format!("\n{}", snapshot.question.prompt());
                for (i, option) in snapshot.options.values().iter().enumerate() {
                    text.push_str(&format!("\n  {}) {}", i + 1, option));
                }
                if debug_mode {
                    text.push_str(&format!("\n  [{}]", snapshot.question.correct_result));
                }
                self.outbox.push(text);
                self.snapshot = Some(snapshot.clone());
            }
            GameEngineEvent::AnswerEvaluated { feedback, .. } => {
                self.outbox.push(feedback.to_string());
            }
            GameEngineEvent::StatsChanged(state) => {
                self.outbox.push(format!(
                    "Puntos: {}  Nivel: {}  Correctas: {}",
                    state.score, state.level, state.correct_count
                ));
            }
            GameEngineEvent::LevelUp(level) => {
                self.outbox.push(format!("¡Nivel {}!", level));
            }
            GameEngineEvent::HistoryChanged(history) => {
                self.history = history.clone();
            }
            GameEngineEvent::HistoryExported(exported) => {
                self.pending_export = Some(exported.clone());
            }
            GameEngineEvent::OperationFailed(message) => {
                warn!(target: "ui", "{}", message);
                self.outbox.push(format!("⚠ {}", message));
            }
        }
    }
}
