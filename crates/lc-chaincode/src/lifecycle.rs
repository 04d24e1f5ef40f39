use lc_store::LedgerState;
use lc_types::Credit;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::{DecodePolicy, LifecyclePolicy};
use crate::error::{ChaincodeError, ChaincodeResult};
use crate::transition::{Operation, TransitionTable};

/// The credit lifecycle state machine.
///
/// Every method runs against the [`LedgerState`] of one unit of work and
/// reads a fresh copy of the record; nothing is cached between calls.
/// Mutators follow one template: existence check, read and decode, resolve
/// the next status, mutate, encode, and a single `put_state`. Every failure
/// returns before the write, so a failed call leaves no new version.
#[derive(Clone, Debug, Default)]
pub struct CreditLifecycle {
    policy: LifecyclePolicy,
}

impl CreditLifecycle {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Create a credit in `registered` status.
    ///
    /// Fails with `AlreadyExists` if any value is stored under `credit_id`.
    pub fn register_credit<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        credit_id: &str,
        owner: &str,
        flight_id: &str,
        weight: i64,
        price: i64,
    ) -> ChaincodeResult<Credit> {
        debug!(credit_id, owner, flight_id, weight, price, "register credit");

        if state.get_state(credit_id)?.is_some() {
            return Err(ChaincodeError::AlreadyExists(credit_id.to_string()));
        }
        let status = TransitionTable::check(
            self.policy.transitions,
            credit_id,
            None,
            Operation::Register,
        )?;

        let mut credit = Credit::register(credit_id, owner, flight_id, weight, price);
        credit.status = Some(status);
        state.put_state(credit_id, codec::encode(&credit)?)?;

        info!(credit_id, owner, "credit registered");
        Ok(credit)
    }

    /// Fetch and decode the current record. Side-effect free.
    pub fn read_credit<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        credit_id: &str,
    ) -> ChaincodeResult<Credit> {
        debug!(credit_id, "read credit");
        let payload = state
            .get_state(credit_id)?
            .ok_or_else(|| ChaincodeError::NotFound(credit_id.to_string()))?;
        codec::decode(&payload)
    }

    /// Hand the credit to `new_owner` and mark it `transfered`.
    pub fn transfer_credit<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        credit_id: &str,
        new_owner: &str,
    ) -> ChaincodeResult<Credit> {
        self.apply(state, credit_id, Operation::Transfer, |credit| {
            credit.owner = new_owner.to_string();
        })
    }

    /// Mark the credit `verified`; no other field changes.
    pub fn verify_credit<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        credit_id: &str,
    ) -> ChaincodeResult<Credit> {
        self.apply(state, credit_id, Operation::Verify, |_| {})
    }

    /// Mark the credit `excuted`; no other field changes.
    pub fn execute_credit<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        credit_id: &str,
    ) -> ChaincodeResult<Credit> {
        self.apply(state, credit_id, Operation::Execute, |_| {})
    }

    fn apply<S, F>(
        &self,
        state: &S,
        credit_id: &str,
        operation: Operation,
        mutate: F,
    ) -> ChaincodeResult<Credit>
    where
        S: LedgerState + ?Sized,
        F: FnOnce(&mut Credit),
    {
        debug!(credit_id, %operation, "apply credit operation");

        let payload = state
            .get_state(credit_id)?
            .ok_or_else(|| ChaincodeError::NotFound(credit_id.to_string()))?;

        let mut credit = match codec::decode(&payload) {
            Ok(credit) => credit,
            Err(e) if self.policy.decode_failures == DecodePolicy::Lenient => {
                warn!(credit_id, %operation, error = %e, "stored credit undecodable; keeping readable fields");
                codec::decode_lenient(&payload)
            }
            Err(e) => return Err(e),
        };

        let previous = credit.status;
        let next = TransitionTable::check(self.policy.transitions, credit_id, previous, operation)?;

        mutate(&mut credit);
        credit.status = Some(next);
        state.put_state(credit_id, codec::encode(&credit)?)?;

        info!(
            credit_id,
            %operation,
            from = previous.map_or("<unset>", |s| s.as_str()),
            to = next.as_str(),
            "credit updated"
        );
        Ok(credit)
    }
}
