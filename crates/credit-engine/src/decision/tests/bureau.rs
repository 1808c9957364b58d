use std::time::Duration;

use tokio::time::Instant;

use super::common::*;
use crate::decision::bureau::{BureauError, BureauGateway, SimulatedBureau, StaticBureau};
use crate::decision::domain::BureauSnapshot;

#[tokio::test]
async fn static_bureau_serves_canned_snapshots() {
    let snapshot = BureauSnapshot {
        blacklisted: false,
        historical_score: Some(780),
        active_credit_lines: 3,
        recent_delinquency: false,
    };
    let bureau = StaticBureau::default().with_snapshot(document("doc-b1"), snapshot.clone());

    let found = bureau.lookup(&document("doc-b1")).await.expect("lookup");
    assert_eq!(found, snapshot);
}

#[tokio::test]
async fn static_bureau_treats_unknown_documents_as_clean() {
    let bureau = StaticBureau::default();
    let snapshot = bureau.lookup(&document("doc-b2")).await.expect("lookup");
    assert_eq!(snapshot, BureauSnapshot::clean());
}

#[tokio::test]
async fn unreachable_bureau_fails_every_lookup() {
    let bureau = StaticBureau::unreachable();
    match bureau.lookup(&document("doc-b3")).await {
        Err(BureauError::ServiceUnavailable(_)) => {}
        other => panic!("expected outage, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn simulated_bureau_fans_the_four_reads_out_concurrently() {
    let latency = Duration::from_millis(40);
    let bureau = SimulatedBureau::new(latency).with_file(
        document("doc-b4"),
        BureauSnapshot {
            blacklisted: false,
            historical_score: Some(705),
            active_credit_lines: 2,
            recent_delinquency: true,
        },
    );

    let started = Instant::now();
    let snapshot = bureau.lookup(&document("doc-b4")).await.expect("lookup");
    let elapsed = started.elapsed();

    assert_eq!(snapshot.historical_score, Some(705));
    assert!(snapshot.recent_delinquency);
    // four sequential reads would take 160ms of virtual time
    assert!(
        elapsed < latency * 2,
        "reads did not overlap: {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn simulated_bureau_retries_a_transient_fault_once() {
    let bureau = SimulatedBureau::new(Duration::from_millis(5))
        .with_file(document("doc-b5"), clean_snapshot(640))
        .with_glitch(document("doc-b5"));

    let snapshot = bureau.lookup(&document("doc-b5")).await.expect("retry succeeds");
    assert_eq!(snapshot.historical_score, Some(640));
}

#[tokio::test(start_paused = true)]
async fn simulated_bureau_merges_all_four_indicators() {
    let bureau = SimulatedBureau::new(Duration::from_millis(1)).with_file(
        document("doc-b6"),
        BureauSnapshot {
            blacklisted: true,
            historical_score: None,
            active_credit_lines: 7,
            recent_delinquency: false,
        },
    );

    let snapshot = bureau.lookup(&document("doc-b6")).await.expect("lookup");
    assert!(snapshot.blacklisted);
    assert_eq!(snapshot.historical_score, None);
    assert_eq!(snapshot.active_credit_lines, 7);
    assert!(!snapshot.recent_delinquency);
}
