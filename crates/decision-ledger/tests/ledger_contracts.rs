//! Contract tests for DecisionLedger.
//!
//! Every check is written once against `&dyn DecisionLedger` and run for both
//! the in-memory ledger and the SurrealDB ledger (`mem://`). Any conforming
//! implementation must pass these.

use decision_ledger::{
    DecisionDraft, DecisionLedger, LedgerError, MemoryDecisionLedger, Submitter,
    SurrealDecisionLedger, ValidationError,
};

fn draft(db: &str, exp: &str, decision: &str, participant_id: i128) -> DecisionDraft {
    DecisionDraft::new(db, exp, decision, participant_id)
}

// ===========================================================================
// Shared contract checks
// ===========================================================================

async fn indices_are_sequential_per_submitter(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xseq");
    for expected in 0..5u64 {
        let index = ledger
            .store_decision(&s, draft("QmDB", "QmExp", "Eligible", expected as i128))
            .await
            .unwrap();
        assert_eq!(index, expected);
    }
    assert_eq!(ledger.record_count(&s).await.unwrap(), 5);
}

async fn get_record_returns_fields_verbatim(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xverbatim");
    ledger
        .store_decision(&s, draft("QmA", "QmB", "Eligible", 1))
        .await
        .unwrap();
    ledger
        .store_decision(&s, draft("QmC", "QmD", "Not Eligible", 0))
        .await
        .unwrap();

    let first = ledger.get_record(&s, 0).await.unwrap();
    assert_eq!(first.fields(), ("QmA", "QmB", "Eligible", 1));
    assert_eq!(first.submitter, s);
    assert_eq!(first.index, 0);

    let second = ledger.get_record(&s, 1).await.unwrap();
    assert_eq!(second.fields(), ("QmC", "QmD", "Not Eligible", 0));
    assert_eq!(second.index, 1);
}

async fn unknown_submitter_is_out_of_range(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xnobody");
    for index in [0, 1, u64::MAX] {
        let err = ledger.get_record(&s, index).await.unwrap_err();
        assert!(
            matches!(err, LedgerError::OutOfRange { count: 0, .. }),
            "unexpected error: {err:?}"
        );
    }
    assert_eq!(ledger.record_count(&s).await.unwrap(), 0);
    assert!(ledger.list_records(&s).await.unwrap().is_empty());
}

async fn index_past_end_is_out_of_range(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xpastend");
    ledger
        .store_decision(&s, draft("QmDB", "QmExp", "Eligible", 9))
        .await
        .unwrap();

    let err = ledger.get_record(&s, 1).await.unwrap_err();
    match err {
        LedgerError::OutOfRange {
            submitter,
            index,
            count,
        } => {
            assert_eq!(submitter, "0xpastend");
            assert_eq!(index, 1);
            assert_eq!(count, 1);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

async fn rejected_append_leaves_sequence_unchanged(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xreject");
    ledger
        .store_decision(&s, draft("QmDB", "QmExp", "Eligible", 1))
        .await
        .unwrap();

    let empty_decision = ledger
        .store_decision(&s, draft("QmDB", "QmExp", "", 1))
        .await
        .unwrap_err();
    assert!(matches!(
        empty_decision,
        LedgerError::Validation(ValidationError::EmptyField { field: "decision" })
    ));

    let negative = ledger
        .store_decision(&s, draft("QmDB", "QmExp", "Eligible", -1))
        .await
        .unwrap_err();
    assert!(matches!(
        negative,
        LedgerError::Validation(ValidationError::ParticipantOutOfRange { value: -1 })
    ));

    let empty_cid = ledger
        .store_decision(&s, draft("", "QmExp", "Eligible", 1))
        .await
        .unwrap_err();
    assert!(empty_cid.is_ledger_rejection());

    assert_eq!(ledger.record_count(&s).await.unwrap(), 1);

    // The next valid append still gets the next index.
    let index = ledger
        .store_decision(&s, draft("QmDB", "QmExp", "Eligible", 2))
        .await
        .unwrap();
    assert_eq!(index, 1);
}

async fn empty_submitter_is_rejected(ledger: &dyn DecisionLedger) {
    let err = ledger
        .store_decision(&Submitter::new(""), draft("QmDB", "QmExp", "Eligible", 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::EmptySubmitter)
    ));
}

async fn submitters_do_not_share_numbering(ledger: &dyn DecisionLedger) {
    let a = Submitter::new("0xaaaa");
    let b = Submitter::new("0xbbbb");

    let a0 = ledger.store_decision(&a, draft("a0", "e", "Eligible", 1)).await.unwrap();
    let a1 = ledger.store_decision(&a, draft("a1", "e", "Eligible", 1)).await.unwrap();
    let b0 = ledger.store_decision(&b, draft("b0", "e", "Ineligible", 1)).await.unwrap();
    let a2 = ledger.store_decision(&a, draft("a2", "e", "Eligible", 1)).await.unwrap();

    assert_eq!((a0, a1, a2), (0, 1, 2));
    assert_eq!(b0, 0);

    let a_records = ledger.list_records(&a).await.unwrap();
    let a_cids: Vec<&str> = a_records.iter().map(|r| r.database_cid.as_str()).collect();
    assert_eq!(a_cids, vec!["a0", "a1", "a2"]);
    assert_eq!(ledger.get_record(&b, 0).await.unwrap().database_cid, "b0");
    assert!(ledger.get_record(&b, 1).await.is_err());

    let submitters = ledger.submitters().await.unwrap();
    assert!(submitters.contains(&a));
    assert!(submitters.contains(&b));
}

async fn duplicate_participants_are_legal(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xdup");
    for _ in 0..2 {
        ledger
            .store_decision(&s, draft("QmDB", "QmExp", "Eligible", 0))
            .await
            .unwrap();
    }
    let records = ledger.list_records(&s).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.participant_id == 0));
}

async fn full_u64_participant_range_round_trips(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xwide");
    ledger
        .store_decision(&s, draft("QmDB", "QmExp", "Eligible", u64::MAX as i128))
        .await
        .unwrap();
    assert_eq!(ledger.get_record(&s, 0).await.unwrap().participant_id, u64::MAX);
}

async fn eligibility_scenario(ledger: &dyn DecisionLedger) {
    let s = Submitter::new("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    let i0 = ledger
        .store_decision(&s, draft("QmDB1", "QmExp1", "Eligible", 42))
        .await
        .unwrap();
    assert_eq!(i0, 0);
    assert_eq!(
        ledger.get_record(&s, 0).await.unwrap().fields(),
        ("QmDB1", "QmExp1", "Eligible", 42)
    );

    let i1 = ledger
        .store_decision(&s, draft("QmDB2", "QmExp2", "Ineligible", 7))
        .await
        .unwrap();
    assert_eq!(i1, 1);
    assert_eq!(
        ledger.get_record(&s, 1).await.unwrap().fields(),
        ("QmDB2", "QmExp2", "Ineligible", 7)
    );

    assert!(matches!(
        ledger.get_record(&s, 2).await.unwrap_err(),
        LedgerError::OutOfRange { .. }
    ));
}

// ===========================================================================
// MemoryDecisionLedger
// ===========================================================================

mod memory_ledger_tests {
    use super::*;

    #[tokio::test]
    async fn indices_are_sequential() {
        indices_are_sequential_per_submitter(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn get_record_is_verbatim() {
        get_record_returns_fields_verbatim(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn unknown_submitter() {
        unknown_submitter_is_out_of_range(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn past_end() {
        index_past_end_is_out_of_range(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn rejected_append() {
        rejected_append_leaves_sequence_unchanged(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn empty_submitter() {
        empty_submitter_is_rejected(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn independent_submitters() {
        submitters_do_not_share_numbering(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn duplicate_participants() {
        duplicate_participants_are_legal(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn wide_participant_ids() {
        full_u64_participant_range_round_trips(&MemoryDecisionLedger::new()).await;
    }

    #[tokio::test]
    async fn scenario() {
        eligibility_scenario(&MemoryDecisionLedger::new()).await;
    }
}

// ===========================================================================
// SurrealDecisionLedger (mirrors the memory tests above)
// ===========================================================================

mod surreal_ledger_tests {
    use super::*;

    async fn ledger() -> SurrealDecisionLedger {
        SurrealDecisionLedger::in_memory()
            .await
            .expect("in_memory() failed")
    }

    #[tokio::test]
    async fn indices_are_sequential() {
        indices_are_sequential_per_submitter(&ledger().await).await;
    }

    #[tokio::test]
    async fn get_record_is_verbatim() {
        get_record_returns_fields_verbatim(&ledger().await).await;
    }

    #[tokio::test]
    async fn unknown_submitter() {
        unknown_submitter_is_out_of_range(&ledger().await).await;
    }

    #[tokio::test]
    async fn past_end() {
        index_past_end_is_out_of_range(&ledger().await).await;
    }

    #[tokio::test]
    async fn rejected_append() {
        rejected_append_leaves_sequence_unchanged(&ledger().await).await;
    }

    #[tokio::test]
    async fn empty_submitter() {
        empty_submitter_is_rejected(&ledger().await).await;
    }

    #[tokio::test]
    async fn independent_submitters() {
        submitters_do_not_share_numbering(&ledger().await).await;
    }

    #[tokio::test]
    async fn duplicate_participants() {
        duplicate_participants_are_legal(&ledger().await).await;
    }

    #[tokio::test]
    async fn wide_participant_ids() {
        full_u64_participant_range_round_trips(&ledger().await).await;
    }

    #[tokio::test]
    async fn scenario() {
        eligibility_scenario(&ledger().await).await;
    }

    #[tokio::test]
    async fn local_store_accepts_appends() {
        let dir = tempfile::tempdir().unwrap();
        let config = decision_ledger::LedgerConfig::local(dir.path().join("db"));
        let ledger = SurrealDecisionLedger::connect(&config).await.unwrap();

        eligibility_scenario(&ledger).await;
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let ledger = ledger().await;
        let s = Submitter::new("0xidem");
        ledger
            .store_decision(&s, draft("QmDB", "QmExp", "Eligible", 1))
            .await
            .unwrap();

        // Re-running deploy must not wipe or duplicate existing state.
        ledger.deploy().await.unwrap();
        ledger.deploy().await.unwrap();

        assert_eq!(ledger.record_count(&s).await.unwrap(), 1);
    }
}
