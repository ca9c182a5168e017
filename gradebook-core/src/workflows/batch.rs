use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::update_score_by_student_number;
use crate::client::{ApiClient, Transport};
use crate::types::{ScoreField, ScoreValue};

/// One requested edit: a student number and the value to store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub student_number: String,
    pub score_value: ScoreValue,
}

impl ScoreUpdate {
    pub fn new(student_number: impl Into<String>, score_value: impl Into<ScoreValue>) -> Self {
        Self {
            student_number: student_number.into(),
            score_value: score_value.into(),
        }
    }
}

/// Outcome of a single entry in the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub student_number: String,
    pub success: bool,
    pub error: Option<String>,
    pub code: Option<u16>,
}

/// Tally of a batch run. `results` follows input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub results: Vec<BatchEntry>,
}

impl BatchOutcome {
    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.results.iter().filter(|entry| !entry.success)
    }
}

/// Apply `updates` to `field` one at a time, in order. A failing entry is
/// recorded and the run moves on; the batch itself never fails.
pub async fn batch_update_scores<T: Transport>(
    client: &ApiClient<T>,
    updates: &[ScoreUpdate],
    field: ScoreField,
) -> BatchOutcome {
    info!("Batch update of {} for {} students", field, updates.len());

    let mut outcome = BatchOutcome {
        total: updates.len(),
        results: Vec::with_capacity(updates.len()),
        ..Default::default()
    };

    for update in updates {
        let result = update_score_by_student_number(
            client,
            &update.student_number,
            field,
            update.score_value.clone(),
        )
        .await;

        match result {
            Ok(_) => {
                outcome.success += 1;
                outcome.results.push(BatchEntry {
                    student_number: update.student_number.clone(),
                    success: true,
                    error: None,
                    code: None,
                });
            }
            Err(e) => {
                warn!("Failed to update score for {}: {}", update.student_number, e);
                outcome.failed += 1;
                outcome.results.push(BatchEntry {
                    student_number: update.student_number.clone(),
                    success: false,
                    error: Some(e.to_string()),
                    code: Some(e.code()),
                });
            }
        }
    }

    info!(
        "Batch complete: {} total, {} succeeded, {} failed",
        outcome.total, outcome.success, outcome.failed
    );
    outcome
}
