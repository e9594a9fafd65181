use formstack_model::{FieldConfig, FieldPatch, InputType, ValidationError, validate_field_list};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

// ── FieldConfig constructors ─────────────────────────────────────

#[test]
fn text_field_defaults() {
    let f = FieldConfig::text("f1", "title", "Title");
    assert_eq!(f.id, "f1");
    assert_eq!(f.name, "title");
    assert_eq!(f.input_type, InputType::Text);
    assert!(f.options.is_empty());
    assert!(f.is_required());
}

#[test]
fn select_field_keeps_option_order() {
    let f = FieldConfig::select("f2", "examType", "Exam type", ["Midterm", "Final", "Quiz"]);
    assert_eq!(f.input_type, InputType::Select);
    assert_eq!(f.options, vec!["Midterm", "Final", "Quiz"]);
}

#[test]
fn builder_helpers() {
    let f = FieldConfig::file("f3", "examPaper", "Exam paper")
        .with_description("PDF or image")
        .optional();
    assert_eq!(f.description.as_deref(), Some("PDF or image"));
    assert!(f.optional);
    assert!(!f.is_required());
}

// ── Wire format ──────────────────────────────────────────────────

#[test]
fn field_config_serializes_camel_case() {
    let f = FieldConfig::select("f1", "examType", "Exam type", ["Final"]);
    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(
        json,
        json!({
            "id": "f1",
            "name": "examType",
            "label": "Exam type",
            "inputType": "select",
            "options": ["Final"]
        })
    );
}

#[test]
fn field_config_deserializes_without_optional_keys() {
    let f: FieldConfig = serde_json::from_value(json!({
        "id": "a",
        "name": "fee",
        "label": "Fee",
        "inputType": "number"
    }))
    .unwrap();
    assert_eq!(f, FieldConfig::number("a", "fee", "Fee"));
}

#[test]
fn unknown_input_type_is_rejected() {
    let result: Result<FieldConfig, _> = serde_json::from_value(json!({
        "id": "a",
        "name": "x",
        "label": "X",
        "inputType": "checkbox"
    }));
    assert!(result.is_err());
}

// ── Validation ───────────────────────────────────────────────────

#[test]
fn select_without_options_is_invalid() {
    let f = FieldConfig::select("f1", "level", "Level", Vec::<String>::new());
    let err = f.validate().unwrap_err();
    assert_eq!(err.field.as_deref(), Some("level"));
}

#[test]
fn options_on_non_select_are_invalid() {
    let mut f = FieldConfig::text("f1", "title", "Title");
    f.options = vec!["a".into()];
    assert!(f.validate().is_err());
}

#[test]
fn empty_name_or_id_is_invalid() {
    assert!(FieldConfig::text("f1", " ", "Blank").validate().is_err());
    assert!(FieldConfig::text("", "title", "Title").validate().is_err());
}

#[test]
fn duplicate_names_rejected() {
    let fields = vec![
        FieldConfig::text("f1", "title", "Title"),
        FieldConfig::number("f2", "title", "Also title"),
    ];
    let err = validate_field_list(&fields).unwrap_err();
    assert_eq!(err, ValidationError::field("title", "duplicate field name"));
}

#[test]
fn duplicate_ids_rejected() {
    let fields = vec![
        FieldConfig::text("f1", "title", "Title"),
        FieldConfig::number("f1", "fee", "Fee"),
    ];
    assert!(validate_field_list(&fields).is_err());
}

#[test]
fn valid_list_passes() {
    let fields = vec![
        FieldConfig::text("f1", "title", "Title"),
        FieldConfig::number("f2", "fee", "Fee"),
        FieldConfig::select("f3", "level", "Level", ["Beginner", "Advanced"]),
    ];
    assert!(validate_field_list(&fields).is_ok());
    assert!(validate_field_list(&[]).is_ok());
}

// ── FieldPatch ───────────────────────────────────────────────────

#[test]
fn patch_merges_only_supplied_keys() {
    let mut f = FieldConfig::text("f1", "title", "Title");
    f.apply(&FieldPatch {
        label: Some("Course title".into()),
        ..FieldPatch::default()
    });
    assert_eq!(f.label, "Course title");
    assert_eq!(f.name, "title");
    assert_eq!(f.id, "f1");
}

#[test]
fn patch_switching_away_from_select_clears_options() {
    let mut f = FieldConfig::select("f1", "level", "Level", ["A", "B"]);
    f.apply(&FieldPatch {
        input_type: Some(InputType::Text),
        ..FieldPatch::default()
    });
    assert_eq!(f.input_type, InputType::Text);
    assert!(f.options.is_empty());
    assert!(f.validate().is_ok());
}

#[test]
fn patch_empty_description_clears_it() {
    let mut f = FieldConfig::text("f1", "title", "Title").with_description("help");
    f.apply(&FieldPatch {
        description: Some(String::new()),
        ..FieldPatch::default()
    });
    assert_eq!(f.description, None);
}

#[test]
fn patch_deserializes_partial_json() {
    let patch: FieldPatch =
        serde_json::from_value(json!({"inputType": "select", "options": ["x"]})).unwrap();
    assert_eq!(patch.input_type, Some(InputType::Select));
    assert_eq!(patch.options, Some(vec!["x".to_string()]));
    assert_eq!(patch.name, None);
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    /// A list of length >= 2 containing a repeated name is always rejected.
    #[test]
    fn any_duplicate_name_is_rejected(
        names in prop::collection::hash_set("[a-z]{1,8}", 1..8),
        dup_from in any::<prop::sample::Index>(),
        insert_at in any::<prop::sample::Index>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut fields: Vec<FieldConfig> = names
            .iter()
            .enumerate()
            .map(|(i, name)| FieldConfig::text(&format!("id{i}"), name, name))
            .collect();
        let dup_name = names[dup_from.index(names.len())].clone();
        let at = insert_at.index(fields.len() + 1);
        fields.insert(at, FieldConfig::number("dup-id", &dup_name, "dup"));

        let err = validate_field_list(&fields).unwrap_err();
        prop_assert_eq!(err.field.as_deref(), Some(dup_name.as_str()));
    }
}
