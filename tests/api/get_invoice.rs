use crate::helpers::expect_failure;
use crate::invoice_service::{
    OWNER_ID, SimulatedInvoiceService, TOKEN, Vulnerabilities, invoice,
};
use crate::test_app::{spawn_app, spawn_app_with, spawn_bare_app, spawn_safe_app};
use claims::{assert_matches, assert_ok};
use invoice_sqli_probe::checks::Violation;
use invoice_sqli_probe::payloads;
use invoice_sqli_probe::suite::ProbeCase;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn get_invoice_fetches_the_first_listed_invoice() {
    let app = spawn_safe_app().await;
    let suite = app.suite().await;

    assert_ok!(suite.run_case(ProbeCase::GetInvoiceWorksNormally).await);

    assert_eq!(app.fetched_invoice_ids().await, vec!["1".to_string()]);
}

#[tokio::test]
async fn get_invoice_passes_when_there_is_nothing_to_fetch() {
    let app = spawn_app_with(SimulatedInvoiceService::with_invoices(
        vec![],
        Vulnerabilities::default(),
    ))
    .await;
    let suite = app.suite().await;

    assert_ok!(suite.run_case(ProbeCase::GetInvoiceWorksNormally).await);

    assert!(app.fetched_invoice_ids().await.is_empty());
}

#[tokio::test]
async fn get_invoice_fails_when_the_first_invoice_has_no_id() {
    let app = spawn_app_with(SimulatedInvoiceService::with_invoices(
        vec![serde_json::json!({"userId": 42, "status": "paid"})],
        Vulnerabilities::default(),
    ))
    .await;
    let suite = app.suite().await;

    let (payload, violation) =
        expect_failure(suite.run_case(ProbeCase::GetInvoiceWorksNormally).await);

    assert_eq!(payload, None);
    assert_matches!(violation, Violation::MissingInvoiceId(_));
    assert!(app.fetched_invoice_ids().await.is_empty());
}

#[tokio::test]
async fn get_invoice_fails_when_the_listing_is_not_json() {
    // Arrange
    let app = spawn_bare_app().await;
    Mock::given(method("GET"))
        .and(path("/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&app.invoice_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&app.invoice_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": TOKEN,
                "userId": OWNER_ID,
            })),
        )
        .mount(&app.invoice_server)
        .await;
    let suite = app.suite().await;

    // Act
    let (payload, violation) =
        expect_failure(suite.run_case(ProbeCase::GetInvoiceWorksNormally).await);

    // Assert
    assert_eq!(payload, None);
    assert_matches!(violation, Violation::UnreadableBody(_));
    assert!(app.fetched_invoice_ids().await.is_empty());
}

#[tokio::test]
async fn get_invoice_accepts_string_ids() {
    let app = spawn_app_with(SimulatedInvoiceService::with_invoices(
        vec![serde_json::json!({"id": "inv-9", "userId": 42, "status": "paid"})],
        Vulnerabilities::default(),
    ))
    .await;
    let suite = app.suite().await;

    // The simulated service only knows numeric ids, so this one is a 404
    assert_ok!(suite.run_case(ProbeCase::GetInvoiceWorksNormally).await);

    assert_eq!(app.fetched_invoice_ids().await, vec!["inv-9".to_string()]);
}

#[tokio::test]
async fn id_payloads_are_contained_by_a_safe_service() {
    let app = spawn_safe_app().await;
    let suite = app.suite().await;

    assert_ok!(suite.run_case(ProbeCase::InvoiceIdInjectionIsContained).await);

    assert_eq!(
        app.fetched_invoice_ids().await,
        vec![
            "1'%20OR%20'1'='1".to_string(),
            "1'%20UNION%20SELECT%20*%20FROM%20users--".to_string(),
            "1';%20DROP%20TABLE%20invoices--".to_string(),
        ]
    );
}

#[tokio::test]
async fn user_row_returned_for_an_id_is_a_sensitive_field_leak() {
    let suite = spawn_app(Vulnerabilities {
        expose_user_on_path: true,
        ..Default::default()
    })
    .await
    .suite()
    .await;

    let (payload, violation) =
        expect_failure(suite.run_case(ProbeCase::InvoiceIdInjectionIsContained).await);

    assert_eq!(payload, Some(payloads::INVOICE_ID[1]));
    assert_matches!(violation, Violation::SensitiveFieldLeak("username"));
}

#[tokio::test]
async fn foreign_invoice_returned_for_an_id_is_an_authorization_leak() {
    let suite = spawn_app(Vulnerabilities {
        leak_on_tautology: true,
        ..Default::default()
    })
    .await
    .suite()
    .await;

    let (payload, violation) =
        expect_failure(suite.run_case(ProbeCase::InvoiceIdInjectionIsContained).await);

    assert_eq!(payload, Some(payloads::INVOICE_ID[0]));
    assert_matches!(violation, Violation::AuthorizationLeak { .. });
}

#[tokio::test]
async fn dropped_table_is_reported_as_unavailable_collection() {
    let suite = spawn_app(Vulnerabilities {
        drop_on_path: true,
        ..Default::default()
    })
    .await
    .suite()
    .await;

    let (payload, violation) =
        expect_failure(suite.run_case(ProbeCase::InvoiceIdInjectionIsContained).await);

    assert_eq!(payload, Some(payloads::INVOICE_ID[2]));
    assert_matches!(violation, Violation::CollectionUnavailable(status) if status == 500);
}

#[tokio::test]
async fn server_errors_on_the_id_are_tolerated_by_default() {
    let suite = spawn_app(Vulnerabilities {
        server_error_on_path: true,
        ..Default::default()
    })
    .await
    .suite()
    .await;

    assert_ok!(suite.run_case(ProbeCase::InvoiceIdInjectionIsContained).await);
}

#[tokio::test]
async fn server_errors_on_the_id_fail_under_the_strict_policy() {
    let suite = spawn_app(Vulnerabilities {
        server_error_on_path: true,
        ..Default::default()
    })
    .await
    .with_strict_path_policy()
    .suite()
    .await;

    let (payload, violation) =
        expect_failure(suite.run_case(ProbeCase::InvoiceIdInjectionIsContained).await);

    assert_eq!(payload, Some(payloads::INVOICE_ID[0]));
    assert_matches!(
        violation,
        Violation::UnexpectedStatus { status, .. } if status == 500
    );
}

#[tokio::test]
async fn own_invoice_fetched_by_id_passes_the_ownership_check() {
    let app = spawn_app_with(SimulatedInvoiceService::with_invoices(
        vec![invoice(5, 42, "unpaid")],
        Vulnerabilities::default(),
    ))
    .await;
    let suite = app.suite().await;

    assert_ok!(suite.run_case(ProbeCase::GetInvoiceWorksNormally).await);
}
