use super::{report_text, IntegrationHarness, StaticService};
use marketbrief::acquisition::AcquisitionState;
use marketbrief::credentials::{Credential, CredentialStore};
use std::fs;

#[test]
fn submitted_key_survives_restart() {
    let harness = IntegrationHarness::new();
    let mut first_run = harness.machine(None);
    assert!(first_run.start(None).is_none());
    first_run.submit_credential("  AIza-typed \n").unwrap();
    assert_eq!(
        fs::read_to_string(harness.credential_path()).unwrap(),
        "AIza-typed"
    );

    let mut second_run = harness.machine(None);
    let attempt = second_run.start(None).expect("stored key should start loading");
    assert_eq!(attempt.request().credential.expose(), "AIza-typed");
}

#[test]
fn stored_key_beats_environment() {
    let harness = IntegrationHarness::new();
    harness
        .store()
        .set(&Credential::new("AIza-stored").unwrap())
        .unwrap();
    let mut machine = harness.machine(Some("AIza-env"));
    let attempt = machine.start(None).unwrap();
    assert_eq!(attempt.request().credential.expose(), "AIza-stored");
}

#[test]
fn explicit_key_replaces_stored_one() {
    let harness = IntegrationHarness::new();
    harness
        .store()
        .set(&Credential::new("AIza-old").unwrap())
        .unwrap();
    let mut machine = harness.machine(None);
    let attempt = machine.start(Some("AIza-new")).unwrap();
    assert_eq!(attempt.request().credential.expose(), "AIza-new");
    assert_eq!(
        harness.store().get().unwrap().unwrap().expose(),
        "AIza-new"
    );
}

#[tokio::test]
async fn rejected_key_stays_stored_until_cleared() {
    let harness = IntegrationHarness::new();
    let mut machine = harness.machine(None);
    let attempt = machine.start(Some("AIza-revoked")).unwrap();
    machine.settle(attempt, &StaticService::rejecting()).await;
    assert_eq!(machine.state(), &AcquisitionState::NeedsCredential);
    assert!(harness.store().get().unwrap().is_some());

    let retry = machine.submit_credential("AIza-fresh").unwrap();
    let state = machine
        .settle(retry, &StaticService::text(&report_text("2024-06-03", 9, "fine")))
        .await;
    assert!(state.report().is_some());
    assert_eq!(
        harness.store().get().unwrap().unwrap().expose(),
        "AIza-fresh"
    );
}
