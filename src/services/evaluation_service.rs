//! Submission evaluation service
//!
//! Runs a submission against every test case of the battle's challenge and
//! declares the submitter the winner when all of them pass. The room is read
//! before the (slow) runs; the final write goes through the store's
//! compare-and-set, so two winning submissions cannot both win.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{ParticipantId, SubmissionReport, TestCaseResult},
    runner::CodeRunner,
    utils::{
        elapsed_ms, now_utc, time::format_milliseconds, validate_language, validate_source_code,
    },
};

use super::RoomService;

/// A participant's solution attempt
#[derive(Debug, Clone)]
pub struct Submission {
    pub battle_id: String,
    pub participant: ParticipantId,
    /// Falls back to the configured default language
    pub language: Option<String>,
    pub source: String,
}

#[derive(Clone)]
pub struct EvaluationService {
    rooms: RoomService,
    runner: Arc<dyn CodeRunner>,
    default_language: String,
    max_source_bytes: usize,
}

impl EvaluationService {
    pub fn new(
        rooms: RoomService,
        runner: Arc<dyn CodeRunner>,
        default_language: impl Into<String>,
        max_source_bytes: usize,
    ) -> Self {
        Self {
            rooms,
            runner,
            default_language: default_language.into(),
            max_source_bytes,
        }
    }

    pub async fn submit(&self, submission: Submission) -> AppResult<SubmissionReport> {
        let language = submission
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_language)
            .to_lowercase();

        validate_language(&language).map_err(|e| AppError::InvalidInput(e.to_string()))?;
        validate_source_code(&submission.source, self.max_source_bytes)
            .map_err(AppError::InvalidInput)?;

        let room = self.rooms.get(&submission.battle_id).await?;

        if !room.has_participant(&submission.participant) {
            return Err(AppError::Forbidden(
                "You are not a participant in this battle".to_string(),
            ));
        }

        if room.is_completed() {
            return Err(AppError::AlreadyCompleted);
        }

        tracing::info!(
            battle_id = %room.id,
            participant = %submission.participant,
            language = %language,
            runner = self.runner.name(),
            test_cases = room.challenge.test_cases.len(),
            "Evaluating submission"
        );

        let mut test_results = Vec::with_capacity(room.challenge.test_cases.len());
        for (index, test_case) in room.challenge.test_cases.iter().enumerate() {
            let outcome = self
                .runner
                .run(&language, &submission.source, test_case)
                .await?;
            test_results.push(TestCaseResult::from_outcome(index, test_case, outcome));
        }

        let all_passed = !test_results.is_empty() && test_results.iter().all(|r| r.passed);
        let completion_time = elapsed_ms(room.started_at, now_utc());

        let winner = if all_passed {
            let completed = self
                .rooms
                .record_result(&room.id, &submission.participant)
                .await?;
            tracing::info!(
                battle_id = %room.id,
                winner = %submission.participant,
                completion = %format_milliseconds(completion_time),
                "Submission solved the challenge"
            );
            completed.winner
        } else {
            tracing::debug!(
                battle_id = %room.id,
                participant = %submission.participant,
                passed = test_results.iter().filter(|r| r.passed).count(),
                "Submission did not pass every test case"
            );
            None
        };

        Ok(SubmissionReport {
            test_results,
            all_passed,
            completion_time,
            winner,
        })
    }
}
