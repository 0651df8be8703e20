use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::Operator;

/// Levels start at 1 and widen the operand range by this much per level.
pub const BASE_MAGNITUDE: i64 = 10;
pub const MAGNITUDE_STEP: i64 = 5;

pub fn max_magnitude(level: u32) -> i64 {
    BASE_MAGNITUDE + (level.max(1) as i64 - 1) * MAGNITUDE_STEP
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub operand_a: i64,
    pub operand_b: i64,
    pub operator: Operator,
    pub correct_result: i64,
}

impl Question {
    pub fn new(operand_a: i64, operator: Operator, operand_b: i64) -> Self {
        Self {
            operand_a,
            operand_b,
            operator,
            correct_result: operator.apply(operand_a, operand_b),
        }
    }

    pub fn has_negative_operand(&self) -> bool {
        self.operand_a < 0 || self.operand_b < 0
    }

    /// Text shown while the question is open, e.g. `-5 + 3 = ?`
    pub fn prompt(&self) -> String {
        format!("{} = ?", self)
    }
}

/// Text stored in the ledger, e.g. `-5 + 3`
impl Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.operand_a, self.operator, self.operand_b)
    }
}
