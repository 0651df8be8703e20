use chrono::{NaiveDate, Utc};

use super::error::Result;
use crate::model::HistoryEntry;

pub const CSV_HEADER: &str = "Fecha y Hora,Pregunta,Tu Respuesta,Respuesta Correcta,Resultado,Nivel";

/// Header line unquoted, every record field quoted, `\n` line endings.
pub fn render(entries: &[HistoryEntry]) -> Result<Vec<u8>> {
    let buffer = format!("{}\n", CSV_HEADER).into_bytes();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buffer);

    for entry in entries {
        writer.write_record([
            entry.timestamp.clone(),
            entry.question_text.clone(),
            entry.user_answer.to_string(),
            entry.correct_answer.to_string(),
            entry.result_label().to_string(),
            entry.level.to_string(),
        ])?;
    }

    let contents = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(contents)
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("historial_matematicas_{}.csv", date.format("%Y-%m-%d"))
}

pub fn export_file_name_today() -> String {
    export_file_name(Utc::now().date_naive())
}
