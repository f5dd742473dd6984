//! Verification flow tests against mocked authentication endpoints.
//!
//! The mock server runs on a manually driven tokio runtime; the client under
//! test stays blocking, as in a real run.

use authcheck::api::AuthApi;
use authcheck::commands::verify::run_verification;
use authcheck::credentials::Credentials;
use authcheck::report::{
    Outcome, RunReport, STEP_GET_ORGANIZATIONS, STEP_LOGIN_EMAIL, STEP_LOGIN_TOKEN,
    STEP_REFRESH_TOKEN, STEP_USE_REFRESH_TOKEN,
};
use serde_json::json;
use tokio::runtime::Runtime;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "pat-key";
const EMAIL: &str = "user@example.com";
const PASSWORD: &str = "secret";
const SESSION_TOKEN: &str = "session-token";
const EMAIL_TOKEN: &str = "email-session-token";
const REFRESH_TOKEN: &str = "org-refresh-token";

fn start_server() -> (Runtime, MockServer) {
    let rt = Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    (rt, server)
}

fn credentials(organization_uuid: Option<Uuid>) -> Credentials {
    Credentials {
        api_key: API_KEY.to_string(),
        email: EMAIL.to_string(),
        password: PASSWORD.to_string(),
        organization_uuid,
        base_url: None,
    }
}

fn outcomes(report: &RunReport) -> Vec<(&'static str, Outcome)> {
    report
        .results()
        .iter()
        .map(|r| (r.name, r.outcome))
        .collect()
}

/// 200 with a token header and a truthy success flag.
fn login_ok(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("x-auth-token", token)
        .set_body_json(json!({ "success": true }))
}

fn grid_ok(records: &[(&str, Uuid)]) -> ResponseTemplate {
    let grid: Vec<_> = records
        .iter()
        .map(|(name, uuid)| json!({ "name": name, "uuid": uuid }))
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "response": { "grid": grid }
    }))
}

async fn mount_token_login(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/login/token"))
        .and(body_json(json!({ "personal-access-token": API_KEY })))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_email_login(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .and(body_json(json!({ "email": EMAIL, "password": PASSWORD })))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_organizations(server: &MockServer, template: ResponseTemplate) {
    let bearer = format!("Bearer {SESSION_TOKEN}");
    Mock::given(method("GET"))
        .and(path("/v1/organizations"))
        .and(header("x-auth-token", bearer.as_str()))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_refresh(server: &MockServer, organization: &Uuid, template: ResponseTemplate) {
    let bearer = format!("Bearer {SESSION_TOKEN}");
    let organization = organization.to_string();
    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh-token"))
        .and(header("x-auth-token", bearer.as_str()))
        .and(header("organizationUuid", organization.as_str()))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_workspaces(server: &MockServer, template: ResponseTemplate) {
    let bearer = format!("Bearer {REFRESH_TOKEN}");
    Mock::given(method("GET"))
        .and(path("/v1/clients/client-organizations"))
        .and(header("x-auth-token", bearer.as_str()))
        .respond_with(template)
        .mount(server)
        .await;
}

#[test]
fn happy_path_records_five_passes() {
    let (rt, server) = start_server();
    let org = Uuid::new_v4();
    rt.block_on(async {
        mount_token_login(&server, login_ok(SESSION_TOKEN)).await;
        mount_email_login(&server, login_ok(EMAIL_TOKEN)).await;
        mount_organizations(&server, grid_ok(&[("Acme", org)])).await;
        mount_refresh(&server, &org, login_ok(REFRESH_TOKEN)).await;
        mount_workspaces(&server, grid_ok(&[("Showroom", Uuid::new_v4())])).await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(None));

    assert_eq!(
        outcomes(&report),
        vec![
            (STEP_LOGIN_TOKEN, Outcome::Pass),
            (STEP_LOGIN_EMAIL, Outcome::Pass),
            (STEP_GET_ORGANIZATIONS, Outcome::Pass),
            (STEP_REFRESH_TOKEN, Outcome::Pass),
            (STEP_USE_REFRESH_TOKEN, Outcome::Pass),
        ]
    );
    assert!(report.core_verified());
    assert_eq!(report.passed(), 5);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.skipped(), 0);
}

#[test]
fn failed_token_login_short_circuits_downstream_steps() {
    let (rt, server) = start_server();
    rt.block_on(async {
        mount_token_login(
            &server,
            ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "errors": [{ "message": "Invalid personal access token" }]
            })),
        )
        .await;
        mount_email_login(&server, login_ok(EMAIL_TOKEN)).await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(None));

    assert_eq!(
        outcomes(&report),
        vec![
            (STEP_LOGIN_TOKEN, Outcome::Fail),
            (STEP_LOGIN_EMAIL, Outcome::Pass),
        ]
    );
    assert!(!report.core_verified());
}

#[test]
fn login_success_without_token_header_is_a_failure() {
    let (rt, server) = start_server();
    rt.block_on(async {
        // 200 + success, but the session token header is missing.
        mount_token_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
        )
        .await;
        mount_email_login(
            &server,
            ResponseTemplate::new(401).set_body_json(json!({ "success": false })),
        )
        .await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(None));

    assert_eq!(
        outcomes(&report),
        vec![
            (STEP_LOGIN_TOKEN, Outcome::Fail),
            (STEP_LOGIN_EMAIL, Outcome::Fail),
        ]
    );
}

#[test]
fn non_json_login_body_is_a_failure() {
    let (rt, server) = start_server();
    rt.block_on(async {
        mount_token_login(
            &server,
            ResponseTemplate::new(200)
                .insert_header("x-auth-token", SESSION_TOKEN)
                .set_body_string("<html>gateway error</html>"),
        )
        .await;
        mount_email_login(
            &server,
            ResponseTemplate::new(401).set_body_json(json!({ "success": false })),
        )
        .await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(None));

    assert_eq!(report.outcome_of(STEP_LOGIN_TOKEN), Some(Outcome::Fail));
    assert_eq!(report.results().len(), 2);
}

#[test]
fn forbidden_workspace_listing_is_indeterminate() {
    let (rt, server) = start_server();
    let org = Uuid::new_v4();
    rt.block_on(async {
        mount_token_login(&server, login_ok(SESSION_TOKEN)).await;
        mount_email_login(&server, login_ok(EMAIL_TOKEN)).await;
        mount_organizations(&server, grid_ok(&[("Acme", org)])).await;
        mount_refresh(&server, &org, login_ok(REFRESH_TOKEN)).await;
        mount_workspaces(
            &server,
            ResponseTemplate::new(403).set_body_json(json!({ "success": false })),
        )
        .await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(None));

    assert_eq!(report.outcome_of(STEP_USE_REFRESH_TOKEN), Some(Outcome::Skip));
    assert_eq!(report.passed(), 4);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.skipped(), 1);
    assert!(report.core_verified());
}

#[test]
fn workspace_listing_failure_does_not_flip_core_verdict() {
    let (rt, server) = start_server();
    let org = Uuid::new_v4();
    rt.block_on(async {
        mount_token_login(&server, login_ok(SESSION_TOKEN)).await;
        mount_email_login(&server, login_ok(EMAIL_TOKEN)).await;
        mount_organizations(&server, grid_ok(&[("Acme", org)])).await;
        mount_refresh(&server, &org, login_ok(REFRESH_TOKEN)).await;
        mount_workspaces(
            &server,
            ResponseTemplate::new(500).set_body_json(json!({ "success": false })),
        )
        .await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(None));

    assert_eq!(report.outcome_of(STEP_USE_REFRESH_TOKEN), Some(Outcome::Fail));
    assert_eq!(report.failed(), 1);
    assert!(report.core_verified());
}

#[test]
fn organization_listing_failure_fails_core_even_with_configured_org() {
    let (rt, server) = start_server();
    let configured = Uuid::new_v4();
    rt.block_on(async {
        mount_token_login(&server, login_ok(SESSION_TOKEN)).await;
        mount_email_login(&server, login_ok(EMAIL_TOKEN)).await;
        mount_organizations(
            &server,
            ResponseTemplate::new(500).set_body_json(json!({ "success": false })),
        )
        .await;
        mount_refresh(&server, &configured, login_ok(REFRESH_TOKEN)).await;
        mount_workspaces(&server, grid_ok(&[("Showroom", Uuid::new_v4())])).await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(Some(configured)));

    // The configured UUID still lets the refresh check run.
    assert_eq!(report.outcome_of(STEP_GET_ORGANIZATIONS), Some(Outcome::Fail));
    assert_eq!(report.outcome_of(STEP_REFRESH_TOKEN), Some(Outcome::Pass));
    assert_eq!(report.outcome_of(STEP_USE_REFRESH_TOKEN), Some(Outcome::Pass));
    assert!(!report.core_verified());
}

#[test]
fn configured_organization_uuid_takes_precedence_over_discovered() {
    let (rt, server) = start_server();
    let discovered = Uuid::new_v4();
    let configured = Uuid::new_v4();
    rt.block_on(async {
        mount_token_login(&server, login_ok(SESSION_TOKEN)).await;
        mount_email_login(&server, login_ok(EMAIL_TOKEN)).await;
        mount_organizations(&server, grid_ok(&[("Acme", discovered)])).await;
        // Only the configured organization is mocked; a request for the
        // discovered one would find no matching mock.
        mount_refresh(&server, &configured, login_ok(REFRESH_TOKEN)).await;
        mount_workspaces(&server, grid_ok(&[])).await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(Some(configured)));

    assert_eq!(report.outcome_of(STEP_REFRESH_TOKEN), Some(Outcome::Pass));
    assert!(report.core_verified());
}

#[test]
fn empty_organization_list_without_config_stops_before_refresh() {
    let (rt, server) = start_server();
    rt.block_on(async {
        mount_token_login(&server, login_ok(SESSION_TOKEN)).await;
        mount_email_login(&server, login_ok(EMAIL_TOKEN)).await;
        mount_organizations(&server, grid_ok(&[])).await;
    });

    let api = AuthApi::new(server.uri()).expect("client");
    let report = run_verification(&api, &credentials(None));

    assert_eq!(
        outcomes(&report),
        vec![
            (STEP_LOGIN_TOKEN, Outcome::Pass),
            (STEP_LOGIN_EMAIL, Outcome::Pass),
            (STEP_GET_ORGANIZATIONS, Outcome::Fail),
        ]
    );
    assert!(!report.core_verified());
}
