use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    form::FormSnapshot,
    schema::{
        EXPENSE_SUBGROUP, FieldKind, FieldSpec, SchemaError, ValidationSchema, invoice_schema,
        login_schema, parse_validation_schema,
    },
};

#[test]
fn invoice_schema_declares_three_tabs_in_order() {
    let schema = invoice_schema().unwrap();
    let tabs: Vec<(&str, &str, usize)> = schema
        .sections()
        .iter()
        .map(|section| (section.id.as_str(), section.title.as_str(), section.ordinal))
        .collect();
    assert_eq!(
        tabs,
        vec![
            ("vendor", "Vendor Details", 0),
            ("invoice", "Invoice Details", 1),
            ("comments", "Comments", 2),
        ]
    );
    assert_eq!(schema.section("comments").unwrap().fields, vec!["comments"]);
}

#[test]
fn invoice_schema_field_kinds_and_defaults() {
    let schema = invoice_schema().unwrap();
    assert_eq!(schema.len(), 13);
    assert_eq!(schema.field("totalAmount").unwrap().kind, FieldKind::Number);
    assert_eq!(schema.field("lineAmount").unwrap().kind, FieldKind::Number);
    assert_eq!(schema.field("invoiceDate").unwrap().kind, FieldKind::Date);
    assert_eq!(schema.field("dueDate").unwrap().kind, FieldKind::Date);
    assert_eq!(schema.field("vendor").unwrap().kind, FieldKind::Text);
    assert!(!schema.field("comments").unwrap().required);

    let initial = schema.initial_snapshot();
    assert_eq!(initial.text("vendorAddress"), Some("100 Main St, Lynn"));
    assert_eq!(initial.len(), 13);
}

#[test]
fn choices_and_subgroups_are_loaded() {
    let schema = invoice_schema().unwrap();
    let vendor = schema.field("vendor").unwrap();
    assert_eq!(vendor.choice_label("vendor2"), Some("B & B Services"));
    assert_eq!(vendor.choice_label("vendor9"), None);

    let expense: Vec<&str> = schema
        .fields()
        .filter(|spec| spec.subgroup.as_deref() == Some(EXPENSE_SUBGROUP))
        .map(|spec| spec.name.as_str())
        .collect();
    assert_eq!(
        expense,
        vec!["description", "lineAmount", "department", "location"]
    );
}

#[test]
fn choices_do_not_constrain_values() {
    let schema = invoice_schema().unwrap();
    let snapshot = FormSnapshot::new().with("vendor", "someone else");
    assert!(!schema.validate(&snapshot).contains("vendor"));
}

#[test]
fn login_schema_requires_both_credentials() {
    let schema = login_schema().unwrap();
    let result = schema.validate(&FormSnapshot::new());
    assert_eq!(result.get("username"), Some("Username is required"));
    assert_eq!(result.get("password"), Some("Password is required"));
}

#[test]
fn ungrouped_fields_land_in_general_section() {
    let schema = parse_validation_schema(&json!({
        "type": "object",
        "required": ["host"],
        "properties": {
            "host": {"type": "string"},
            "port": {"type": "integer"},
            "since": {"type": "string", "format": "date"}
        }
    }))
    .unwrap();
    assert_eq!(schema.sections().len(), 1);
    assert_eq!(schema.sections()[0].id, "general");
    assert_eq!(schema.field("host").unwrap().error_message, "Host is required");
    assert_eq!(schema.field("port").unwrap().kind, FieldKind::Number);
    assert_eq!(schema.field("since").unwrap().kind, FieldKind::Date);
}

#[test]
fn fields_may_belong_to_several_sections() {
    let schema = parse_validation_schema(&json!({
        "type": "object",
        "properties": {
            "a": {"type": "string", "x-group": "one"},
            "shared": {"type": "string", "x-group": ["one", "two"]}
        }
    }))
    .unwrap();
    assert_eq!(schema.section("one").unwrap().fields, vec!["a", "shared"]);
    assert_eq!(schema.section("two").unwrap().fields, vec!["shared"]);
}

#[test]
fn rejects_unsupported_documents() {
    assert!(parse_validation_schema(&json!("nope")).is_err());
    assert!(parse_validation_schema(&json!({"type": "array", "items": {}})).is_err());
    assert!(
        parse_validation_schema(&json!({
            "type": "object",
            "properties": {"flag": {"type": "boolean"}}
        }))
        .is_err()
    );
    assert!(
        parse_validation_schema(&json!({
            "type": "object",
            "properties": {"n": {"type": "number", "minimum": "zero"}}
        }))
        .is_err(),
        "documents that do not compile as JSON Schema are rejected"
    );
}

#[test]
fn builder_enforces_schema_invariants() {
    let duplicate = ValidationSchema::builder()
        .field(FieldSpec::text("a"))
        .field(FieldSpec::number("a"))
        .build();
    assert_eq!(
        duplicate.unwrap_err(),
        SchemaError::DuplicateField("a".into())
    );

    let silent = ValidationSchema::builder()
        .field(FieldSpec::text("a").required(""))
        .build();
    assert_eq!(
        silent.unwrap_err(),
        SchemaError::MissingErrorMessage("a".into())
    );

    let dangling = ValidationSchema::builder()
        .field(FieldSpec::text("a"))
        .section("main", "Main", ["a", "b"])
        .build();
    assert_eq!(
        dangling.unwrap_err(),
        SchemaError::UnknownSectionField {
            section: "main".into(),
            field: "b".into()
        }
    );
}

#[test]
fn typed_document_parses_values_and_passes_the_json_schema() {
    let schema = invoice_schema().unwrap();
    let snapshot = FormSnapshot::new()
        .with("vendor", "vendor1")
        .with("vendorAddress", "100 Main St, Lynn")
        .with("purchaseOrder", "po1")
        .with("invoiceNumber", "INV-7")
        .with("totalAmount", "120.50")
        .with("invoiceDate", "2024-01-05")
        .with("dueDate", "2024-02-04")
        .with("paymentTerms", "net30")
        .with("description", "Cleaning")
        .with("lineAmount", "120.5")
        .with("department", "it")
        .with("location", "Lynn");
    let document = schema.typed_document(&snapshot);
    assert_eq!(document["totalAmount"], json!(120.5));
    assert_eq!(document["invoiceDate"], json!("2024-01-05"));
    assert!(document.get("comments").is_none());
    assert!(schema.check_document(&document).is_ok());

    let mut broken = document.clone();
    broken["totalAmount"] = json!("lots");
    let issues = schema.check_document(&broken).unwrap_err();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].starts_with("/totalAmount"));
}
