use judging::criteria::{DEFAULT_MAX_SCORE, validate_criterion, validate_total_weight};
use serde::Deserialize;

use super::shared::double_option;
use crate::error::AppError;

/// A criterion as sent by the organizer (create, whole-list replace, or add).
#[derive(Deserialize, Clone, PartialEq, Debug, utoipa::ToSchema)]
pub struct CriterionInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Percentage weight; omitted means an effective weight of 1.
    pub weight: Option<f64>,
    /// Defaults to 10.
    pub max_score: Option<i32>,
}

impl CriterionInput {
    pub fn max_score(&self) -> i32 {
        self.max_score.unwrap_or(DEFAULT_MAX_SCORE)
    }
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCriterionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `null` clears the weight (effective weight 1).
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Option<f64>>,
    pub max_score: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReorderCriteriaRequest {
    /// Ordered list of criterion IDs. Positions assigned 0, 1, 2… by array index.
    /// Must contain exactly the criteria currently attached to the hackathon.
    pub criterion_ids: Vec<i32>,
}

/// Validate a complete criteria list: every entry, the plan limit, and the total weight.
pub fn validate_criteria_list(
    criteria: &[CriterionInput],
    max_criteria: u64,
) -> Result<(), AppError> {
    if criteria.len() as u64 > max_criteria {
        return Err(AppError::PlanLimitReached(format!(
            "Your plan allows at most {max_criteria} judging criteria per hackathon"
        )));
    }
    for c in criteria {
        validate_criterion(&c.name, &c.description, c.weight, c.max_score())?;
    }
    validate_total_weight(criteria.iter().map(|c| c.weight))?;
    Ok(())
}
