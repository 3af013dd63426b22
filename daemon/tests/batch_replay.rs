// Batch replay tests
//
// Replays JSON batch files the way the daemon does and checks the report.

use std::io::Write;

use salis_common::{
    config::{COIN_VALUE, SECONDS_PER_DAY},
    crypto::Address,
    time::ManualClock,
    token::{LedgerError, LedgerEvent, SharedTokenService, TokenParams, TokenService},
};
use salis_daemon::batch::{build_report, run_steps, BatchReport, Step};

const START: u64 = 1_700_000_000;

fn addr(label: &str) -> String {
    Address::from_label(label).to_hex()
}

fn load_steps(json: &str) -> Vec<Step> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    let reader = std::io::BufReader::new(std::fs::File::open(file.path()).unwrap());
    serde_json::from_reader(reader).unwrap()
}

async fn replay(json: &str) -> BatchReport {
    let steps = load_steps(json);
    let clock = ManualClock::new(START);
    let (service, deployment) =
        TokenService::new(TokenParams::default(), Address::from_label("owner"), clock.clone())
            .unwrap();
    let service = SharedTokenService::new(service);
    let reports = run_steps(&service, &clock, &steps).await;
    build_report(&service, deployment, &steps, reports).await
}

#[tokio::test]
async fn test_locked_distribution_replay() {
    let json = format!(
        r#"[
            {{"caller": "{owner}", "call": {{"mint": {{"to": "{u1}", "amount": 1000000000000000000000}}}}}},
            {{"caller": "{owner}", "call": {{"distribute_locked": {{"to": "{u1}", "amount": 100000000000000000000, "lock_days": 30}}}}}},
            {{"caller": "{u1}", "call": {{"transfer": {{"to": "{u2}", "amount": 1050000000000000000000}}}}}},
            {{"caller": "{u1}", "call": {{"transfer": {{"to": "{u2}", "amount": 500000000000000000000}}}}}}
        ]"#,
        owner = addr("owner"),
        u1 = addr("user1"),
        u2 = addr("user2"),
    );
    let report = replay(&json).await;

    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected, 1);
    let failed = report.steps[2].error.as_ref().unwrap();
    assert_eq!(failed.kind, "InsufficientTransferable");
    assert_eq!(
        failed.code,
        LedgerError::InsufficientTransferable {
            account: Address::zero(),
            need: 0,
            have: 0
        }
        .to_code()
    );

    let u1 = Address::from_label("user1");
    let account = report.accounts.iter().find(|a| a.address == u1).unwrap();
    assert_eq!(account.info.balance, 600 * COIN_VALUE);
    assert_eq!(account.info.locked, 100 * COIN_VALUE);
    assert_eq!(account.info.transferable, 500 * COIN_VALUE);
    assert_eq!(account.info.release_time, START + 30 * SECONDS_PER_DAY);
}

#[tokio::test]
async fn test_clock_advances_between_steps() {
    let json = format!(
        r#"[
            {{"caller": "{owner}", "call": {{"distribute_locked": {{"to": "{u1}", "amount": 100, "lock_days": 1}}}}}},
            {{"caller": "{owner}", "call": {{"unlock_expired": {{"account": "{u1}"}}}}}},
            {{"caller": "{owner}", "advance_secs": 86400, "call": {{"unlock_expired": {{"account": "{u1}"}}}}}}
        ]"#,
        owner = addr("owner"),
        u1 = addr("user1"),
    );
    let report = replay(&json).await;

    assert_eq!(report.steps[1].error.as_ref().unwrap().kind, "LockNotExpired");
    assert_eq!(report.steps[2].timestamp, START + SECONDS_PER_DAY);
    assert_eq!(
        report.steps[2].events,
        Some(vec![LedgerEvent::Unlocked {
            to: Address::from_label("user1"),
            amount: 100
        }])
    );
    assert_eq!(report.timestamp, START + SECONDS_PER_DAY);
}

#[tokio::test]
async fn test_huge_clock_advance_saturates() {
    let json = format!(
        r#"[
            {{"caller": "{owner}", "call": {{"distribute_locked": {{"to": "{u1}", "amount": 100, "lock_days": 1}}}}}},
            {{"caller": "{owner}", "advance_secs": 18446744073709551615, "call": {{"unlock_expired": {{"account": "{u1}"}}}}}},
            {{"caller": "{u1}", "advance_secs": 1, "call": {{"transfer": {{"to": "{owner}", "amount": 100}}}}}}
        ]"#,
        owner = addr("owner"),
        u1 = addr("user1"),
    );
    let report = replay(&json).await;

    assert_eq!(report.rejected, 0);
    assert_eq!(report.steps[0].timestamp, START);
    assert_eq!(report.steps[1].timestamp, u64::MAX);
    assert_eq!(report.steps[2].timestamp, u64::MAX);
    assert_eq!(report.timestamp, u64::MAX);
    assert_eq!(
        report.steps[1].events,
        Some(vec![LedgerEvent::Unlocked {
            to: Address::from_label("user1"),
            amount: 100
        }])
    );
}

#[tokio::test]
async fn test_admin_calls_and_pauses() {
    let json = format!(
        r#"[
            {{"caller": "{u1}", "call": "pause"}},
            {{"caller": "{owner}", "call": "pause"}},
            {{"caller": "{owner}", "call": {{"transfer": {{"to": "{u1}", "amount": 1}}}}}},
            {{"caller": "{owner}", "call": "unpause"}},
            {{"caller": "{owner}", "call": "pause_minting"}},
            {{"caller": "{owner}", "call": {{"mint": {{"to": "{u1}", "amount": 1}}}}}},
            {{"caller": "{owner}", "call": {{"set_blacklist_batch": {{"accounts": ["{u1}", "{u2}"], "flag": true}}}}}},
            {{"caller": "{owner}", "call": {{"transfer_ownership": {{"new_owner": "{u3}"}}}}}}
        ]"#,
        owner = addr("owner"),
        u1 = addr("user1"),
        u2 = addr("user2"),
        u3 = addr("user3"),
    );
    let report = replay(&json).await;

    let kinds: Vec<Option<&str>> = report
        .steps
        .iter()
        .map(|s| s.error.as_ref().map(|e| e.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some("Unauthorized"),
            None,
            Some("TransfersPaused"),
            None,
            None,
            Some("MintingPaused"),
            None,
            None
        ]
    );
    assert!(!report.paused);
    assert!(report.minting_paused);
    assert_eq!(report.blacklist_count, 2);
    assert_eq!(report.owner, Address::from_label("user3"));
}

#[tokio::test]
async fn test_report_serializes_large_amounts() {
    let report = replay("[]").await;
    assert_eq!(report.steps.len(), 0);
    assert_eq!(report.deployment.len(), 2);

    let json = serde_json::to_string_pretty(&report).unwrap();
    assert!(json.contains(&(10_000_000 * COIN_VALUE).to_string()));
    assert!(json.contains("\"tokens_minted\""));
}
