use data_contracts::{AnnotationTable, ContractError, DetectionAnnotation};
use std::fs;

fn row(image_id: &str, label: &str, bbox: [f32; 4]) -> DetectionAnnotation {
    DetectionAnnotation {
        image_id: image_id.into(),
        label_name: label.into(),
        x_min: bbox[0],
        y_min: bbox[1],
        x_max: bbox[2],
        y_max: bbox[3],
    }
}

#[test]
fn invalid_bbox_rejected() {
    let err = row("img", "Bus", [0.8, 0.2, 0.1, 0.9]).validate().unwrap_err();
    assert!(matches!(err, ContractError::InvalidBbox { .. }));
}

#[test]
fn out_of_range_bbox_rejected() {
    let err = row("img", "Bus", [0.0, 0.0, 1.2, 0.5]).validate().unwrap_err();
    assert!(matches!(err, ContractError::InvalidBbox { .. }));
}

#[test]
fn empty_label_rejected() {
    let err = row("img", " ", [0.0, 0.0, 0.5, 0.5]).validate().unwrap_err();
    assert!(matches!(err, ContractError::EmptyLabel { .. }));
}

#[test]
fn valid_bbox_passes() {
    assert!(row("img", "Bus", [0.1, 0.1, 0.2, 0.2]).validate().is_ok());
}

#[test]
fn loads_table_from_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("annotations.csv");
    fs::write(
        &path,
        "ImageID,LabelName,XMin,YMin,XMax,YMax\nimg_1,Bus,0.1,0.1,0.4,0.4\n",
    )?;
    let table = AnnotationTable::from_csv_path(&path)?;
    assert_eq!(table.image_ids(), vec!["img_1"]);
    Ok(())
}

#[test]
fn missing_table_is_io_error() {
    let err = AnnotationTable::from_csv_path(std::path::Path::new("/nonexistent/table.csv"))
        .unwrap_err();
    assert!(matches!(err, ContractError::Io { .. }));
}
