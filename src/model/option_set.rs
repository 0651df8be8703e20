use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Shuffled answer choices for one question; values are distinct and contain the
/// correct result exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct OptionSet {
    options: Vec<i64>,
}

impl OptionSet {
    pub const FULL_SIZE: usize = 4;

    pub(crate) fn from_shuffled(options: Vec<i64>) -> Self {
        Self { options }
    }

    pub fn values(&self) -> &[i64] {
        &self.options
    }

    pub fn contains(&self, value: i64) -> bool {
        self.options.contains(&value)
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.options.get(index).copied()
    }
}

impl TryFrom<Vec<i64>> for OptionSet {
    type Error = String;

    fn try_from(options: Vec<i64>) -> Result<Self, Self::Error> {
        if options.is_empty() || options.len() > Self::FULL_SIZE {
            return Err(format!(
                "expected 1 to {} options, got {}",
                Self::FULL_SIZE,
                options.len()
            ));
        }
        if options.iter().unique().count() != options.len() {
            return Err(format!("duplicate options in {:?}", options));
        }
        Ok(Self { options })
    }
}

impl From<OptionSet> for Vec<i64> {
    fn from(set: OptionSet) -> Self {
        set.options
    }
}
