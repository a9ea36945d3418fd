//! Challenge model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CHALLENGE_TIME_LIMIT_SECS;

/// Challenge difficulty label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single input / expected output pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Catalog entry describing a coding problem
///
/// Rooms embed a copy of the challenge, so catalog reloads never touch battles in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub test_cases: Vec<TestCase>,
    /// Starter template per language identifier
    #[serde(default)]
    pub starter_code: BTreeMap<String, String>,
    /// Battle time budget in seconds
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u64,
}

fn default_time_limit_secs() -> u64 {
    DEFAULT_CHALLENGE_TIME_LIMIT_SECS
}

impl Challenge {
    /// Starter template for a language, if the challenge ships one
    pub fn starter_for(&self, language: &str) -> Option<&str> {
        self.starter_code.get(language).map(String::as_str)
    }
}
