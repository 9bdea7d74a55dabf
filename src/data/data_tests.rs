use super::*;

fn row(pairs: &[(&str, RawValue)]) -> Sample {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

#[test]
fn test_raw_value_parsing() {
    assert_eq!(RawValue::Number(1.5).as_f64(), Some(1.5));
    assert_eq!(RawValue::Number(f64::NAN).as_f64(), None);
    assert_eq!(RawValue::Number(f64::INFINITY).as_f64(), None);
    assert_eq!(RawValue::from("3.25").as_f64(), Some(3.25));
    assert_eq!(RawValue::from("  -4e2 ").as_f64(), Some(-400.0));
    assert_eq!(RawValue::from("n.d.").as_f64(), None);
    assert_eq!(RawValue::from("").as_f64(), None);
    assert_eq!(RawValue::from("inf").as_f64(), None);
    assert_eq!(RawValue::Missing.as_f64(), None);
}

#[test]
fn test_raw_value_deserializes_untagged() {
    let values: Vec<RawValue> =
        serde_json::from_str(r#"[1.5, "2.0", null, "bdl"]"#).expect("valid json");
    assert_eq!(values[0], RawValue::Number(1.5));
    assert_eq!(values[1], RawValue::Text("2.0".to_string()));
    assert_eq!(values[2], RawValue::Missing);
    assert_eq!(values[3].as_f64(), None);
}

#[test]
fn test_sample_matrix_from_json_rows() {
    let json = r#"[{"Fe": 1.0, "Mn": "0.2"}, {"Fe": null, "Mn": 0.4}]"#;
    let samples: SampleMatrix = serde_json::from_str(json).expect("valid json");
    assert_eq!(samples.len(), 2);
    assert_eq!(samples.value(0, "Mn"), Some(0.2));
    assert_eq!(samples.value(1, "Fe"), None);
}

#[test]
fn test_column_marks_missing_as_nan() {
    let samples = SampleMatrix::new(vec![
        row(&[("Cu", RawValue::from(10.0))]),
        row(&[("Cu", RawValue::from("<5"))]),
        row(&[]),
    ]);
    let col = samples.column("Cu");
    assert_eq!(col.len(), 3);
    assert!((col[0] - 10.0).abs() < 1e-12);
    assert!(col[1].is_nan());
    assert!(col[2].is_nan());
    assert_eq!(samples.valid_count("Cu"), 1);
    assert!(samples.has_variable("Cu"));
    assert!(!samples.has_variable("Zn"));
}

#[test]
fn test_ratio_column_drops_zero_denominator() {
    let samples = SampleMatrix::from_columns(&[
        ("Zr", vec![10.0, 20.0, 30.0, f64::NAN]),
        ("Hf", vec![2.0, 0.0, 3.0, 1.0]),
    ]);
    let ratio = samples.ratio_column("Zr", "Hf");
    assert!((ratio[0] - 5.0).abs() < 1e-12);
    assert!(ratio[1].is_nan());
    assert!((ratio[2] - 10.0).abs() < 1e-12);
    assert!(ratio[3].is_nan());
}

#[test]
fn test_column_mean_ignores_unparseable() {
    let samples = SampleMatrix::from_columns(&[("Ni", vec![1.0, f64::NAN, 3.0])]);
    assert_eq!(samples.column_mean("Ni"), Some(2.0));
    assert_eq!(samples.column_mean("Co"), None);
}

#[test]
fn test_parsed_fields_counts_selected_variables() {
    let samples = SampleMatrix::from_columns(&[
        ("A", vec![1.0, f64::NAN]),
        ("B", vec![2.0, f64::NAN]),
        ("C", vec![f64::NAN, 3.0]),
    ]);
    let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    assert_eq!(samples.parsed_fields(0, &names), 2);
    assert_eq!(samples.parsed_fields(1, &names), 1);
}
