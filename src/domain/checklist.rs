//! Onboarding checklist steps and progress math.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStep {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ChecklistStep {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            required: true,
            completed: false,
            completed_at: None,
            notes: None,
        }
    }
}

/// Default 7-step onboarding template. The first step is seeded
/// pre-completed: a lease only enters onboarding once its application
/// has been approved, so that precondition is already satisfied.
pub static DEFAULT_CHECKLIST_STEPS: Lazy<Vec<ChecklistStep>> = Lazy::new(|| {
    let mut steps = vec![
        ChecklistStep::new("application_approved", "Application approved"),
        ChecklistStep::new("lease_terms_defined", "Lease terms defined"),
        ChecklistStep::new("lease_document_generated", "Lease document generated"),
        ChecklistStep::new("lease_signed", "Lease signed by all parties"),
        ChecklistStep::new("deposit_collected", "Security deposit collected"),
        ChecklistStep::new("unit_inspection_passed", "Move-in inspection passed"),
        ChecklistStep::new("move_in_scheduled", "Move-in date scheduled"),
    ];
    steps[0].completed = true;
    steps
});

pub fn completed_count(steps: &[ChecklistStep]) -> i32 {
    steps.iter().filter(|s| s.completed).count() as i32
}

pub fn missing_required_count(steps: &[ChecklistStep]) -> usize {
    steps.iter().filter(|s| s.required && !s.completed).count()
}

/// Completion percentage with standard rounding (0.5 rounds up).
/// Zero total means zero percent, not a division error.
pub fn calculate_progress(completed: i32, total: i32) -> u32 {
    if total <= 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_shape() {
        let steps = DEFAULT_CHECKLIST_STEPS.clone();
        assert_eq!(steps.len(), 7);
        assert!(steps.iter().all(|s| s.required));
        assert_eq!(steps[0].id, "application_approved");
        assert!(steps[0].completed);
        assert_eq!(completed_count(&steps), 1);
        assert_eq!(missing_required_count(&steps), 6);
    }

    #[test]
    fn progress_rounding() {
        assert_eq!(calculate_progress(1, 3), 33);
        assert_eq!(calculate_progress(7, 10), 70);
        assert_eq!(calculate_progress(1, 7), 14);
        assert_eq!(calculate_progress(2, 7), 29);
        assert_eq!(calculate_progress(7, 7), 100);
        assert_eq!(calculate_progress(1, 2), 50);
        // 0.5 rounds up
        assert_eq!(calculate_progress(1, 8), 13);
        assert_eq!(calculate_progress(3, 8), 38);
    }

    #[test]
    fn progress_with_zero_total_is_zero() {
        assert_eq!(calculate_progress(0, 0), 0);
        assert_eq!(calculate_progress(5, 0), 0);
    }

    #[test]
    fn steps_serialize_camel_case() {
        let mut step = ChecklistStep::new("lease_signed", "Lease signed by all parties");
        step.completed = true;
        step.completed_at = Some("2026-01-01T00:00:00Z".to_string());
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["completedAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["id"], "lease_signed");
    }
}
