//! Annotation table quality checks.

use crate::detection::{list_files, ClassMap};
use crate::types::{
    DatasetResult, DatasetSummary, ValidationOutcome, ValidationReport, ValidationThresholds,
};
use data_contracts::AnnotationTable;
use std::path::Path;

fn apply_thresholds(
    label: &str,
    count: usize,
    ratio: f32,
    max_count: Option<usize>,
    max_ratio: Option<f32>,
    outcome: &mut ValidationOutcome,
    reasons: &mut Vec<String>,
) {
    if let Some(max) = max_count {
        if count > max {
            *outcome = ValidationOutcome::Fail;
            reasons.push(format!("{label}: {count} exceeds max {max}"));
        }
    }
    if let Some(max_r) = max_ratio {
        if ratio > max_r {
            *outcome = ValidationOutcome::Fail;
            reasons.push(format!(
                "{label}: ratio {:.3} exceeds max {:.3}",
                ratio, max_r
            ));
        }
    }
    if count > 0 {
        if *outcome == ValidationOutcome::Pass {
            *outcome = ValidationOutcome::Warn;
        }
        reasons.push(format!("{label}: {count} observed"));
    }
}

/// Count images, rows, invalid rows, images with no file under `image_dir` and
/// rows whose label is missing from `classes`. Without a class map every label is
/// accepted and `classes` counts the distinct labels plus background.
pub fn summarize_detection_table(
    table: &AnnotationTable,
    image_dir: &Path,
    classes: Option<&ClassMap>,
) -> DatasetResult<DatasetSummary> {
    let files = list_files(image_dir)?;
    let names: Vec<&str> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|s| s.to_str()))
        .collect();
    let image_ids = table.image_ids();
    let missing_images = image_ids
        .iter()
        .filter(|id| !names.iter().any(|name| name.contains(*id)))
        .count();
    let invalid_rows = table
        .rows()
        .iter()
        .filter(|row| row.validate().is_err())
        .count();
    let (unknown_labels, class_count) = match classes {
        Some(map) => (
            table
                .rows()
                .iter()
                .filter(|row| map.index_of(&row.label_name).is_none())
                .count(),
            map.len(),
        ),
        None => (0, ClassMap::from_table(table).len()),
    };
    Ok(DatasetSummary {
        images: image_ids.len(),
        rows: table.len(),
        invalid_rows,
        missing_images,
        unknown_labels,
        classes: class_count,
    })
}

pub fn validate_summary(
    summary: DatasetSummary,
    thresholds: &ValidationThresholds,
) -> ValidationReport {
    let mut outcome = ValidationOutcome::Pass;
    let mut reasons = Vec::new();

    apply_thresholds(
        "missing images",
        summary.missing_images,
        summary.missing_images as f32 / summary.images.max(1) as f32,
        thresholds.max_missing,
        thresholds.max_missing_ratio,
        &mut outcome,
        &mut reasons,
    );
    apply_thresholds(
        "invalid rows",
        summary.invalid_rows,
        summary.invalid_rows as f32 / summary.rows.max(1) as f32,
        thresholds.max_invalid,
        thresholds.max_invalid_ratio,
        &mut outcome,
        &mut reasons,
    );
    // Unknown labels fail regardless of thresholds.
    if summary.unknown_labels > 0 {
        outcome = ValidationOutcome::Fail;
        reasons.push(format!(
            "unknown labels: {} rows reference classes outside the class map",
            summary.unknown_labels
        ));
    }

    ValidationReport {
        outcome,
        reasons,
        summary,
    }
}

pub fn summarize_with_thresholds(
    table: &AnnotationTable,
    image_dir: &Path,
    classes: Option<&ClassMap>,
    thresholds: &ValidationThresholds,
) -> DatasetResult<ValidationReport> {
    let summary = summarize_detection_table(table, image_dir, classes)?;
    Ok(validate_summary(summary, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> DatasetSummary {
        DatasetSummary {
            images: 10,
            rows: 20,
            ..Default::default()
        }
    }

    #[test]
    fn clean_summary_passes() {
        let report = validate_summary(summary(), &ValidationThresholds::default());
        assert_eq!(report.outcome, ValidationOutcome::Pass);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn observed_problems_warn_without_thresholds() {
        let s = DatasetSummary {
            invalid_rows: 1,
            ..summary()
        };
        let report = validate_summary(s, &ValidationThresholds::default());
        assert_eq!(report.outcome, ValidationOutcome::Warn);
        assert_eq!(report.reasons, vec!["invalid rows: 1 observed".to_string()]);
    }

    #[test]
    fn ratio_threshold_fails() {
        let s = DatasetSummary {
            missing_images: 3,
            ..summary()
        };
        let thresholds = ValidationThresholds {
            max_missing_ratio: Some(0.2),
            ..Default::default()
        };
        let report = validate_summary(s, &thresholds);
        assert_eq!(report.outcome, ValidationOutcome::Fail);
        assert!(report.reasons[0].contains("ratio 0.300"));
    }

    #[test]
    fn unknown_labels_always_fail() {
        let s = DatasetSummary {
            unknown_labels: 1,
            ..summary()
        };
        let report = validate_summary(s, &ValidationThresholds::default());
        assert_eq!(report.outcome, ValidationOutcome::Fail);
    }
}
