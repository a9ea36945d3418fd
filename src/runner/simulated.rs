//! Simulated runner
//!
//! Never executes anything. Each test case passes with a fixed probability,
//! which is enough to exercise the battle flow in development.

use async_trait::async_trait;
use rand::Rng;

use crate::{
    error::AppResult,
    models::{RunOutcome, TestCase},
};

use super::CodeRunner;

#[derive(Debug, Clone)]
pub struct SimulatedRunner {
    pass_rate: f64,
}

impl SimulatedRunner {
    pub fn new(pass_rate: f64) -> Self {
        Self {
            pass_rate: pass_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl CodeRunner for SimulatedRunner {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn run(
        &self,
        _language: &str,
        _source: &str,
        test_case: &TestCase,
    ) -> AppResult<RunOutcome> {
        let mut rng = rand::rng();
        let passed = rng.random_bool(self.pass_rate);
        let duration_ms = rng.random_range(5.0..200.0);

        let stdout = if passed {
            test_case.expected_output.clone()
        } else {
            format!("{}?", test_case.expected_output)
        };

        Ok(RunOutcome {
            stdout,
            stderr: String::new(),
            exit_code: 0,
            duration_ms,
            timed_out: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestVerdict;

    #[tokio::test]
    async fn test_extreme_pass_rates_are_deterministic() {
        let case = TestCase::new("1 2", "3");

        let always = SimulatedRunner::new(1.0);
        let never = SimulatedRunner::new(0.0);

        for _ in 0..10 {
            let outcome = always.run("python", "", &case).await.unwrap();
            assert_eq!(TestVerdict::judge(&outcome, "3"), TestVerdict::Passed);

            let outcome = never.run("python", "", &case).await.unwrap();
            assert_eq!(TestVerdict::judge(&outcome, "3"), TestVerdict::WrongAnswer);
        }
    }

    #[test]
    fn test_pass_rate_is_clamped() {
        assert_eq!(SimulatedRunner::new(4.0).pass_rate, 1.0);
        assert_eq!(SimulatedRunner::new(-1.0).pass_rate, 0.0);
    }
}
