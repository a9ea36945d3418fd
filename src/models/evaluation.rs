//! Submission evaluation models

use serde::{Deserialize, Serialize};

use super::{ParticipantId, TestCase};

/// What the sandbox reports for one run of a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
    pub duration_ms: f64,
    pub timed_out: bool,
}

/// Verdict for a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestVerdict {
    Passed,
    WrongAnswer,
    TimeLimitExceeded,
    RuntimeError,
}

impl TestVerdict {
    /// Judge a run against the expected output
    pub fn judge(outcome: &RunOutcome, expected_output: &str) -> Self {
        if outcome.timed_out {
            Self::TimeLimitExceeded
        } else if outcome.exit_code != 0 {
            Self::RuntimeError
        } else if normalize_output(&outcome.stdout) == normalize_output(expected_output) {
            Self::Passed
        } else {
            Self::WrongAnswer
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Strip trailing whitespace per line and trailing blank lines
pub fn normalize_output(output: &str) -> String {
    let lines: Vec<&str> = output.lines().map(str::trim_end).collect();
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |idx| idx + 1);
    lines[..end].join("\n")
}

/// Result of running one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub index: usize,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub verdict: TestVerdict,
    pub passed: bool,
    pub execution_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestCaseResult {
    pub fn from_outcome(index: usize, test_case: &TestCase, outcome: RunOutcome) -> Self {
        let verdict = TestVerdict::judge(&outcome, &test_case.expected_output);
        let error = match verdict {
            TestVerdict::TimeLimitExceeded => Some("Time limit exceeded".to_string()),
            TestVerdict::RuntimeError if outcome.stderr.is_empty() => {
                Some(format!("Exited with code {}", outcome.exit_code))
            }
            TestVerdict::RuntimeError => Some(outcome.stderr),
            _ => None,
        };

        Self {
            index,
            input: test_case.input.clone(),
            expected_output: test_case.expected_output.clone(),
            actual_output: outcome.stdout,
            verdict,
            passed: verdict.is_passed(),
            execution_time_ms: outcome.duration_ms,
            error,
        }
    }
}

/// Outcome of a whole submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub test_results: Vec<TestCaseResult>,
    pub all_passed: bool,
    /// Milliseconds between battle start and this submission
    pub completion_time: i64,
    pub winner: Option<ParticipantId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(stdout: &str, exit_code: i64, timed_out: bool) -> RunOutcome {
        RunOutcome {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code,
            duration_ms: 1.0,
            timed_out,
        }
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("1 2  \n3\n\n\n"), "1 2\n3");
        assert_eq!(normalize_output("\r\nabc\r\n"), "\nabc");
        assert_eq!(normalize_output(""), "");
        assert_eq!(normalize_output("\n\n"), "");
    }

    #[test]
    fn test_judge() {
        assert_eq!(TestVerdict::judge(&outcome("42\n", 0, false), "42"), TestVerdict::Passed);
        assert_eq!(
            TestVerdict::judge(&outcome("41", 0, false), "42"),
            TestVerdict::WrongAnswer
        );
        assert_eq!(
            TestVerdict::judge(&outcome("42", 1, false), "42"),
            TestVerdict::RuntimeError
        );
        assert_eq!(
            TestVerdict::judge(&outcome("42", 124, true), "42"),
            TestVerdict::TimeLimitExceeded
        );
    }

    #[test]
    fn test_runtime_error_message_falls_back_to_exit_code() {
        let case = TestCase::new("1", "1");
        let result = TestCaseResult::from_outcome(0, &case, outcome("", 3, false));
        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some("Exited with code 3"));
    }
}
