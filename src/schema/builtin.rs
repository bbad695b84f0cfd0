use anyhow::Result;
use serde_json::{Value, json};

use super::{ValidationSchema, parse_validation_schema};

/// Collapsible block of the invoice section holding the expense coding fields.
pub const EXPENSE_SUBGROUP: &str = "expense";

const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

pub fn invoice_schema_document() -> Value {
    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "title": "Create New Invoice",
        "type": "object",
        "required": [
            "vendor",
            "vendorAddress",
            "purchaseOrder",
            "invoiceNumber",
            "totalAmount",
            "invoiceDate",
            "dueDate",
            "paymentTerms",
            "description",
            "lineAmount",
            "department",
            "location"
        ],
        "properties": {
            "vendor": {
                "type": "string",
                "title": "Vendor",
                "x-choices": [
                    {"value": "vendor1", "title": "A - 1 Cleaners"},
                    {"value": "vendor2", "title": "B & B Services"}
                ],
                "x-group": "vendor",
                "x-group-title": "Vendor Details",
                "x-error-message": "Vendor is required"
            },
            "vendorAddress": {
                "type": "string",
                "title": "Vendor Address",
                "default": "100 Main St, Lynn",
                "x-group": "vendor",
                "x-error-message": "Vendor address is required"
            },
            "purchaseOrder": {
                "type": "string",
                "title": "Purchase Order Number",
                "x-choices": [
                    {"value": "po1", "title": "PO-2024-001"},
                    {"value": "po2", "title": "PO-2024-002"}
                ],
                "x-group": "invoice",
                "x-group-title": "Invoice Details",
                "x-error-message": "Purchase order is required"
            },
            "invoiceNumber": {
                "type": "string",
                "title": "Invoice Number",
                "x-group": "invoice",
                "x-error-message": "Invoice number is required"
            },
            "totalAmount": {
                "type": "number",
                "title": "Total Amount",
                "x-group": "invoice",
                "x-error-message": "Total amount is required"
            },
            "invoiceDate": {
                "type": "string",
                "format": "date",
                "title": "Invoice Date",
                "x-group": "invoice",
                "x-error-message": "Invoice date is required"
            },
            "dueDate": {
                "type": "string",
                "format": "date",
                "title": "Due Date",
                "x-group": "invoice",
                "x-error-message": "Due date is required"
            },
            "paymentTerms": {
                "type": "string",
                "title": "Payment Terms",
                "x-choices": [
                    {"value": "net30", "title": "Net 30"},
                    {"value": "net60", "title": "Net 60"}
                ],
                "x-group": "invoice",
                "x-error-message": "Payment terms are required"
            },
            "description": {
                "type": "string",
                "title": "Description",
                "x-group": "invoice",
                "x-subgroup": EXPENSE_SUBGROUP,
                "x-error-message": "Description is required"
            },
            "lineAmount": {
                "type": "number",
                "title": "Line Amount",
                "x-group": "invoice",
                "x-subgroup": EXPENSE_SUBGROUP,
                "x-error-message": "Line amount is required"
            },
            "department": {
                "type": "string",
                "title": "Department",
                "x-choices": [
                    {"value": "it", "title": "IT"},
                    {"value": "hr", "title": "HR"},
                    {"value": "finance", "title": "Finance"}
                ],
                "x-group": "invoice",
                "x-subgroup": EXPENSE_SUBGROUP,
                "x-error-message": "Department is required"
            },
            "location": {
                "type": "string",
                "title": "Location",
                "x-group": "invoice",
                "x-subgroup": EXPENSE_SUBGROUP,
                "x-error-message": "Location is required"
            },
            "comments": {
                "type": "string",
                "title": "Comments",
                "description": "Add a comment and use @name to tag someone",
                "x-group": "comments",
                "x-group-title": "Comments"
            }
        }
    })
}

pub fn login_schema_document() -> Value {
    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "title": "Login",
        "type": "object",
        "required": ["username", "password"],
        "properties": {
            "username": {
                "type": "string",
                "title": "Username",
                "x-group": "login",
                "x-error-message": "Username is required"
            },
            "password": {
                "type": "string",
                "title": "Password",
                "x-group": "login",
                "x-error-message": "Password is required"
            }
        }
    })
}

pub fn invoice_schema() -> Result<ValidationSchema> {
    parse_validation_schema(&invoice_schema_document())
}

pub fn login_schema() -> Result<ValidationSchema> {
    parse_validation_schema(&login_schema_document())
}
