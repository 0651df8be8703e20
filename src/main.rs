use log::{error, warn};
use std::io;
use std::process;

use signos::events::Channel;
use signos::game::{FileStore, GameEngine, HistoryLedger, QuestionGenerator, Settings};
use signos::model::{GameEngineCommand, GameEngineEvent};
use signos::ui::TerminalUi;
use signos::Destroyable;

fn init_logging() {
    env_logger::init();
}

fn main() {
    init_logging();

    let data_dir = match Settings::data_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err);
            process::exit(1);
        }
    };
    let settings = Settings::load(&data_dir);

    let (ledger, load_error) = HistoryLedger::open_or_empty(Box::new(FileStore::history(data_dir)));
    if let Some(err) = load_error {
        warn!("{}", err);
        eprintln!("⚠ {}", err);
    }
    let generator = QuestionGenerator::new(Settings::seed_from_env())
        .with_backfill(settings.backfill_options);
    let engine = GameEngine::new(
        settings.scoring_rules(),
        generator,
        ledger.with_limit(settings.history_limit),
    );

    let (command_emitter, command_observer) = Channel::<GameEngineCommand>::new();
    let (event_emitter, event_observer) = Channel::<GameEngineEvent>::new();
    let export_dir = std::env::current_dir().unwrap_or_default();
    let mut ui = TerminalUi::new(
        command_emitter,
        event_observer,
        export_dir,
        Settings::is_debug_mode(),
    );
    let engine = engine.attach(command_observer, event_emitter);
    engine.borrow().sync_display();

    let stdin = io::stdin();
    let result = ui.run(stdin.lock(), &mut io::stdout());

    ui.detach();
    engine.borrow_mut().destroy();
    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}
