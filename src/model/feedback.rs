use std::fmt::Display;

use super::{Operator, Question};

pub const CORRECT_MESSAGES: [&str; 5] = [
    "¡Excelente! 🎉",
    "¡Correcto! 👍",
    "¡Muy bien! 🌟",
    "¡Perfecto! ⭐",
    "¡Genial! 🚀",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct {
        message: &'static str,
    },
    Incorrect {
        correct_answer: i64,
        explanation: Option<&'static str>,
    },
}

impl Feedback {
    pub fn incorrect(question: &Question) -> Self {
        Feedback::Incorrect {
            correct_answer: question.correct_result,
            explanation: explanation_for(question),
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct { .. })
    }
}

fn explanation_for(question: &Question) -> Option<&'static str> {
    match question.operator {
        Operator::Add if question.operand_a < 0 && question.operand_b < 0 => {
            Some("Recuerda: números negativos se suman y el resultado es negativo.")
        }
        Operator::Add if question.has_negative_operand() => Some(
            "Con signos diferentes, resta los valores absolutos y usa el signo del mayor.",
        ),
        Operator::Add => None,
        Operator::Subtract => {
            Some("En la resta, cambia el signo del segundo número y aplica la regla de suma.")
        }
    }
}

impl Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feedback::Correct { message } => write!(f, "{}", message),
            Feedback::Incorrect {
                correct_answer,
                explanation,
            } => {
                write!(
                    f,
                    "❌ Incorrecto. La respuesta correcta es {}.",
                    correct_answer
                )?;
                if let Some(explanation) = explanation {
                    write!(f, "\n{}", explanation)?;
                }
                Ok(())
            }
        }
    }
}

/// Sign-rule mistakes with a reference explanation the UI can show on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    SumWithDifferentSigns,
    NegativeSubtraction,
    MultiplicationSigns,
    DivisionSigns,
}

impl ErrorCategory {
    pub fn all() -> Vec<ErrorCategory> {
        vec![
            ErrorCategory::SumWithDifferentSigns,
            ErrorCategory::NegativeSubtraction,
            ErrorCategory::MultiplicationSigns,
            ErrorCategory::DivisionSigns,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            ErrorCategory::SumWithDifferentSigns => "suma-signos-diferentes",
            ErrorCategory::NegativeSubtraction => "resta-negativa",
            ErrorCategory::MultiplicationSigns => "multiplicacion-signos",
            ErrorCategory::DivisionSigns => "division-signos",
        }
    }

    pub fn from_key(key: &str) -> Option<ErrorCategory> {
        Self::all().into_iter().find(|category| category.key() == key)
    }

    pub fn details(&self) -> &'static str {
        match self {
            ErrorCategory::SumWithDifferentSigns => "Cuando sumas números con signos diferentes, debes restar el menor del mayor y usar el signo del número con mayor valor absoluto.",
            ErrorCategory::NegativeSubtraction => "En la resta, recuerda cambiar el signo del sustraendo y luego aplicar las reglas de suma.",
            ErrorCategory::MultiplicationSigns => "En multiplicación: mismo signo = positivo, diferente signo = negativo.",
            ErrorCategory::DivisionSigns => "En división se aplican las mismas reglas que en multiplicación.",
        }
    }
}

pub const GENERIC_ERROR_DETAILS: &str = "Error común en operaciones con números negativos.";

pub fn error_details(key: &str) -> &'static str {
    ErrorCategory::from_key(key)
        .map(|category| category.details())
        .unwrap_or(GENERIC_ERROR_DETAILS)
}
