use pretty_assertions::assert_eq;

use crate::{
    app::{
        DeskError, DeskOptions, FileHandle, InvoiceDesk, Landing, LoginOutcome, SubmitOutcome,
    },
    form::{FieldValue, FormSnapshot},
    route::Screen,
    session::{AuthError, AuthProvider, Credentials, SessionStore},
};

const VALID_INVOICE: [(&str, &str); 11] = [
    ("vendor", "vendor1"),
    ("purchaseOrder", "po1"),
    ("invoiceNumber", "INV-100"),
    ("totalAmount", "250.00"),
    ("invoiceDate", "2024-04-01"),
    ("dueDate", "2024-05-01"),
    ("paymentTerms", "net30"),
    ("description", "Quarterly cleaning"),
    ("lineAmount", "250"),
    ("department", "finance"),
    ("location", "Lynn"),
];

fn logged_in_desk(options: DeskOptions) -> InvoiceDesk {
    let mut desk = InvoiceDesk::in_memory(options).unwrap();
    desk.navigate("/").unwrap();
    desk.login("alice", "secret").unwrap();
    desk
}

fn fill(desk: &mut InvoiceDesk) {
    for (name, value) in VALID_INVOICE {
        assert_eq!(desk.set_field(name, value).unwrap(), None, "{name}");
    }
}

#[test]
fn anonymous_invoice_request_lands_on_login() {
    let mut desk = InvoiceDesk::in_memory(DeskOptions::default()).unwrap();
    let landing = desk.navigate("/invoice").unwrap();
    assert_eq!(
        landing,
        Landing::Redirected {
            requested: "/invoice".into(),
            to: Screen::Login
        }
    );
    assert_eq!(desk.screen(), Some(Screen::Login));
}

#[test]
fn login_opens_the_session_and_moves_to_the_invoice() {
    let mut desk = InvoiceDesk::in_memory(DeskOptions::default()).unwrap();
    desk.navigate("/").unwrap();
    let outcome = desk.login("alice", "pw").unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::LoggedIn {
            actor: "alice".into()
        }
    );
    assert_eq!(desk.screen(), Some(Screen::Invoice));
    assert!(desk.session().is_authenticated());
    assert_eq!(desk.session().actor_name().as_deref(), Some("alice"));

    let back_home = desk.navigate("/").unwrap();
    assert_eq!(back_home.screen(), Some(Screen::Invoice));
}

#[test]
fn empty_credentials_are_rejected_with_field_errors() {
    let mut desk = InvoiceDesk::in_memory(DeskOptions::default()).unwrap();
    desk.navigate("/").unwrap();
    let LoginOutcome::Rejected(errors) = desk.login("", "").unwrap() else {
        panic!("login should have been rejected");
    };
    assert_eq!(errors.get("username"), Some("Username is required"));
    assert_eq!(errors.get("password"), Some("Password is required"));
    assert!(!desk.session().is_authenticated());
    assert_eq!(desk.screen(), Some(Screen::Login));
}

#[derive(Debug)]
struct DenyAll;

impl AuthProvider for DenyAll {
    fn authenticate(&self, credentials: &Credentials) -> Result<String, AuthError> {
        Err(AuthError::Rejected(credentials.username.clone()))
    }
}

#[test]
fn provider_rejections_propagate() {
    let options = DeskOptions::default().with_auth_provider(DenyAll);
    let mut desk = InvoiceDesk::in_memory(options).unwrap();
    desk.navigate("/").unwrap();
    let err = desk.login("mallory", "pw").unwrap_err();
    assert!(matches!(err, DeskError::Auth(AuthError::Rejected(_))));
    assert!(!desk.session().is_authenticated());
}

#[test]
fn screen_operations_require_their_screen() {
    let mut desk = InvoiceDesk::in_memory(DeskOptions::default()).unwrap();
    assert!(matches!(
        desk.set_field("vendor", "vendor1"),
        Err(DeskError::ScreenInactive {
            expected: Screen::Invoice
        })
    ));
    assert!(matches!(
        desk.login("a", "b"),
        Err(DeskError::ScreenInactive {
            expected: Screen::Login
        })
    ));
}

#[test]
fn unknown_routes_are_reported_for_signed_in_actors() {
    let mut desk = logged_in_desk(DeskOptions::default());
    assert!(matches!(
        desk.navigate("/reports"),
        Err(DeskError::UnknownRoute(path)) if path == "/reports"
    ));
    assert_eq!(
        desk.navigate("/api/ping").unwrap(),
        Landing::Passthrough("/api/ping".into())
    );
    assert_eq!(desk.screen(), Some(Screen::Invoice));
}

#[test]
fn blocked_submit_persists_nothing_and_reveals_every_error() {
    let mut desk = logged_in_desk(DeskOptions::default());
    desk.set_field("vendor", "vendor1").unwrap();
    let SubmitOutcome::Blocked(errors) = desk.submit().unwrap() else {
        panic!("submit should have been blocked");
    };
    assert_eq!(errors.len(), 10);
    assert_eq!(desk.session().committed().unwrap(), None);
    assert_eq!(desk.screen(), Some(Screen::Invoice));
    assert_eq!(desk.status(), "10 issue(s) remaining");
    assert_eq!(desk.hidden_error_count(), 10);

    desk.activate_section("invoice").unwrap();
    assert_eq!(desk.visible_errors().len(), 10);
}

#[test]
fn valid_submit_commits_the_form_values_and_confirms() {
    let mut desk = logged_in_desk(DeskOptions::default());
    fill(&mut desk);
    let SubmitOutcome::Committed(record) = desk.submit().unwrap() else {
        panic!("submit should have committed");
    };
    assert_eq!(record.text("totalAmount"), Some("250.00"));
    assert_eq!(record.text("vendorAddress"), Some("100 Main St, Lynn"));
    assert_eq!(desk.screen(), Some(Screen::Confirmation));
    assert_eq!(desk.status(), "Invoice submitted");

    assert_eq!(desk.session().committed().unwrap(), Some(record.clone()));
    let typed = record.coerce(desk.invoice_schema());
    assert_eq!(typed.get("totalAmount"), Some(&FieldValue::Number(250.0)));
}

#[test]
fn section_switches_do_not_change_the_form() {
    let mut desk = logged_in_desk(DeskOptions::default());
    desk.set_field("vendor", "vendor2").unwrap();
    let before = desk.invoice_form().snapshot().clone();
    desk.activate_section("comments").unwrap();
    desk.next_section(1).unwrap();
    assert_eq!(desk.sections().active_id(), Some("vendor"));
    assert_eq!(desk.invoice_form().snapshot(), &before);
    assert!(matches!(
        desk.activate_section("taxes"),
        Err(DeskError::Form(_))
    ));
}

#[test]
fn drafts_round_trip_through_the_session() {
    let mut desk = logged_in_desk(DeskOptions::default());
    desk.set_field("vendor", "vendor1").unwrap();
    desk.set_field("totalAmount", "abc").unwrap();
    desk.save_draft().unwrap();
    assert_eq!(desk.status(), "Draft saved successfully!");
    let saved = desk.invoice_form().snapshot().clone();

    desk.set_field("vendor", "vendor2").unwrap();
    assert!(desk.load_draft().unwrap());
    assert_eq!(desk.invoice_form().snapshot(), &saved);
    assert_eq!(
        desk.invoice_form().field_error("totalAmount").as_deref(),
        Some("Total Amount must be a number")
    );
}

#[test]
fn load_draft_without_a_draft_reports_it() {
    let mut desk = logged_in_desk(DeskOptions::default());
    assert!(!desk.load_draft().unwrap());
    assert_eq!(desk.status(), "No draft saved yet");
}

#[test]
fn entering_the_invoice_screen_starts_fresh_unless_restoring() {
    let mut session = SessionStore::in_memory();
    session.login("alice").unwrap();
    session
        .save_draft(&FormSnapshot::new().with("invoiceNumber", "INV-9"))
        .unwrap();

    let mut plain = InvoiceDesk::new(session.clone(), DeskOptions::default()).unwrap();
    plain.navigate("/invoice").unwrap();
    assert_eq!(plain.invoice_form().value("invoiceNumber"), Some(&FieldValue::Absent));

    let options = DeskOptions::default().with_restore_draft(true);
    let mut restoring = InvoiceDesk::new(session, options).unwrap();
    restoring.navigate("/invoice").unwrap();
    assert_eq!(
        restoring.invoice_form().snapshot().text("invoiceNumber"),
        Some("INV-9")
    );
    assert_eq!(restoring.status(), "Draft loaded");
}

#[test]
fn expense_toggle_hides_fields_but_keeps_the_gate() {
    let mut desk = logged_in_desk(DeskOptions::default().with_expense_details(false));
    assert!(!desk.sections().is_subgroup_visible("expense"));
    assert_eq!(desk.expense_summary(), "$0.00 / $0.00");

    assert!(desk.toggle_expense_details().unwrap());
    desk.set_field("lineAmount", "12.5").unwrap();
    assert_eq!(desk.expense_summary(), "$12.5 / $0.00");

    assert!(!desk.toggle_expense_details().unwrap());
    let SubmitOutcome::Blocked(errors) = desk.submit().unwrap() else {
        panic!("submit should have been blocked");
    };
    assert!(errors.contains("location"));
}

#[test]
fn attachments_are_recorded_and_flagged_by_type() {
    let mut desk = logged_in_desk(DeskOptions::default());
    let pdf = desk
        .attach_file(FileHandle::new("invoice.PDF", vec![1, 2, 3]))
        .unwrap();
    assert!(pdf.accepted);
    assert_eq!(pdf.size, 3);
    assert_eq!(desk.status(), "Uploaded: invoice.PDF");

    let image = desk
        .attach_file(FileHandle::new("scan.png", Vec::new()))
        .unwrap();
    assert!(!image.accepted);
    assert_eq!(desk.upload(), Some(&image));
}

#[test]
fn invalid_bypass_patterns_fail_construction() {
    let options = DeskOptions::default().with_bypass_pattern("(");
    assert!(InvoiceDesk::in_memory(options).is_err());
}
