//! Battle request DTOs

use serde::Deserialize;
use validator::Validate;

/// Query string of `GET /battle`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleQuery {
    pub action: Option<String>,
    pub battle_id: Option<String>,
}

/// Body of `POST /battle`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BattleActionRequest {
    #[validate(length(min = 1, max = 32))]
    pub action: String,

    #[validate(length(min = 1, max = 128))]
    pub battle_id: Option<String>,

    /// Source code; size is checked against the configured limit by the evaluator
    pub code: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub language: Option<String>,
}
