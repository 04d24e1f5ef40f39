//! End-to-end lifecycle of a single credit, driven through the named
//! operations against both bundled ledgers.

use lc_chaincode::{
    ChaincodeError, ContractError, CreditContract, CreditStatus, HistoryEntry, LifecyclePolicy,
};
use lc_store::{FileLedger, InMemoryLedger, Ledger, SyncMode, WalConfig};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn run_full_lifecycle<L: Ledger>(contract: &CreditContract<L>) {
    contract
        .invoke("RegisterCredit", &args(&["C1", "alice", "FL100", "20", "500"]))
        .unwrap();
    contract
        .invoke("TransferCredit", &args(&["C1", "bob"]))
        .unwrap();
    contract.invoke("VerifyCredit", &args(&["C1"])).unwrap();
    contract.invoke("ExecuteCredit", &args(&["C1"])).unwrap();
}

fn assert_final_state<L: Ledger>(contract: &CreditContract<L>) {
    let credit = contract.read_credit("C1").unwrap();
    assert_eq!(credit.owner, "bob");
    assert_eq!(credit.flight_id, "FL100");
    assert_eq!(credit.weight, 20);
    assert_eq!(credit.price, 500);
    assert!(credit.is(CreditStatus::Excuted));

    let payload = contract
        .invoke("GetCreditHistory", &args(&["C1"]))
        .unwrap();
    let history: Vec<HistoryEntry> = serde_json::from_slice(&payload).unwrap();
    let statuses: Vec<_> = history.iter().map(|e| e.record.status).collect();
    assert_eq!(
        statuses,
        vec![
            Some(CreditStatus::Registered),
            Some(CreditStatus::Transfered),
            Some(CreditStatus::Verified),
            Some(CreditStatus::Excuted),
        ]
    );
    assert_eq!(history[0].record.owner, "alice");
    assert!(history[1..].iter().all(|e| e.record.owner == "bob"));
    assert!(history.iter().all(|e| !e.is_delete));
    assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(contract.ledger().open_cursors(), 0);
}

#[test]
fn credit_lifecycle_in_memory() {
    let contract = CreditContract::new(InMemoryLedger::new(), LifecyclePolicy::default());
    run_full_lifecycle(&contract);
    assert_final_state(&contract);

    let err = contract
        .invoke("RegisterCredit", &args(&["C1", "carol", "FL200", "1", "1"]))
        .unwrap_err();
    assert!(matches!(
        err,
        ContractError::Chaincode(ChaincodeError::AlreadyExists(_))
    ));
    assert_eq!(contract.ledger().version_count("C1").unwrap(), 4);
}

#[test]
fn credit_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.wal");
    let config = WalConfig {
        sync_mode: SyncMode::EveryWrite,
    };

    {
        let ledger = FileLedger::open(&path, config.clone()).unwrap();
        let contract = CreditContract::new(ledger, LifecyclePolicy::default());
        run_full_lifecycle(&contract);
        assert_final_state(&contract);
    }

    let ledger = FileLedger::open(&path, config).unwrap();
    assert_eq!(ledger.version_count("C1").unwrap(), 4);
    let contract = CreditContract::new(ledger, LifecyclePolicy::default());
    assert_final_state(&contract);
}

#[test]
fn enforced_policy_walks_the_same_path() {
    let contract = CreditContract::new(InMemoryLedger::new(), LifecyclePolicy::strict());
    run_full_lifecycle(&contract);
    assert_final_state(&contract);

    let err = contract.verify_credit("C1").unwrap_err();
    assert!(matches!(
        err,
        ContractError::Chaincode(ChaincodeError::InvalidTransition { .. })
    ));
    assert_eq!(contract.ledger().version_count("C1").unwrap(), 4);
}

#[test]
fn operations_on_unknown_credit_fail_without_writes() {
    let contract = CreditContract::new(InMemoryLedger::new(), LifecyclePolicy::default());
    for (function, call_args) in [
        ("ReadCredit", args(&["C404"])),
        ("TransferCredit", args(&["C404", "bob"])),
        ("VerifyCredit", args(&["C404"])),
        ("ExecuteCredit", args(&["C404"])),
    ] {
        let err = contract.invoke(function, &call_args).unwrap_err();
        assert!(
            matches!(err, ContractError::Chaincode(ChaincodeError::NotFound(ref id)) if id == "C404"),
            "{function}: {err}"
        );
    }
    assert!(contract.ledger().is_empty().unwrap());
}
