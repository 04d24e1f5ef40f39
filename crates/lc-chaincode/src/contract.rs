use std::fmt;
use std::str::FromStr;

use lc_store::{CommitReceipt, Ledger, LedgerTransaction};
use lc_types::Credit;
use tracing::{info, warn};

use crate::config::LifecyclePolicy;
use crate::error::{ChaincodeResult, ContractError, ContractResult};
use crate::history::{HistoryEntry, HistoryReconstructor};
use crate::lifecycle::CreditLifecycle;

/// The fixed set of named operations invokers can call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    RegisterCredit,
    ReadCredit,
    TransferCredit,
    VerifyCredit,
    ExecuteCredit,
    GetCreditHistory,
}

impl Function {
    pub const ALL: [Function; 6] = [
        Self::RegisterCredit,
        Self::ReadCredit,
        Self::TransferCredit,
        Self::VerifyCredit,
        Self::ExecuteCredit,
        Self::GetCreditHistory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::RegisterCredit => "RegisterCredit",
            Self::ReadCredit => "ReadCredit",
            Self::TransferCredit => "TransferCredit",
            Self::VerifyCredit => "VerifyCredit",
            Self::ExecuteCredit => "ExecuteCredit",
            Self::GetCreditHistory => "GetCreditHistory",
        }
    }

    /// Names of the positional arguments.
    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            Self::RegisterCredit => &["creditid", "owner", "flightid", "weight", "price"],
            Self::TransferCredit => &["creditid", "newOwner"],
            Self::ReadCredit
            | Self::VerifyCredit
            | Self::ExecuteCredit
            | Self::GetCreditHistory => &["creditid"],
        }
    }

    /// Queries are evaluated and never commit.
    pub fn is_query(self) -> bool {
        matches!(self, Self::ReadCredit | Self::GetCreditHistory)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Deployed clients still call the execute operation by its legacy misspelling.
        if s == "ExcuteCredit" {
            return Ok(Self::ExecuteCredit);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

/// Binds the lifecycle engine to a ledger and exposes each operation by name.
///
/// Every call runs in its own ledger transaction: submitted operations commit
/// on success and are rolled back on failure; queries never commit.
pub struct CreditContract<L: Ledger> {
    ledger: L,
    lifecycle: CreditLifecycle,
}

impl<L: Ledger> CreditContract<L> {
    pub fn new(ledger: L, policy: LifecyclePolicy) -> Self {
        Self {
            ledger,
            lifecycle: CreditLifecycle::new(policy),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn lifecycle(&self) -> &CreditLifecycle {
        &self.lifecycle
    }

    /// Invoke an operation by name with string arguments.
    ///
    /// Returns the JSON payload of queries; submitted operations return an
    /// empty payload.
    pub fn invoke(&self, function: &str, args: &[String]) -> ContractResult<Vec<u8>> {
        let function: Function = function.parse()?;
        let expected = function.parameters().len();
        if args.len() != expected {
            return Err(ContractError::ArgumentCount {
                function: function.name(),
                expected,
                actual: args.len(),
            });
        }

        match function {
            Function::RegisterCredit => {
                let weight = parse_int("weight", &args[3])?;
                let price = parse_int("price", &args[4])?;
                self.register_credit(&args[0], &args[1], &args[2], weight, price)?;
                Ok(Vec::new())
            }
            Function::ReadCredit => to_json(&self.read_credit(&args[0])?),
            Function::TransferCredit => {
                self.transfer_credit(&args[0], &args[1])?;
                Ok(Vec::new())
            }
            Function::VerifyCredit => {
                self.verify_credit(&args[0])?;
                Ok(Vec::new())
            }
            Function::ExecuteCredit => {
                self.execute_credit(&args[0])?;
                Ok(Vec::new())
            }
            Function::GetCreditHistory => to_json(&self.get_credit_history(&args[0])?),
        }
    }

    pub fn register_credit(
        &self,
        credit_id: &str,
        owner: &str,
        flight_id: &str,
        weight: i64,
        price: i64,
    ) -> ContractResult<CommitReceipt> {
        self.submit(Function::RegisterCredit, |tx| {
            self.lifecycle
                .register_credit(tx, credit_id, owner, flight_id, weight, price)
        })
    }

    pub fn read_credit(&self, credit_id: &str) -> ContractResult<Credit> {
        self.evaluate(|tx| self.lifecycle.read_credit(tx, credit_id))
    }

    pub fn transfer_credit(&self, credit_id: &str, new_owner: &str) -> ContractResult<CommitReceipt> {
        self.submit(Function::TransferCredit, |tx| {
            self.lifecycle.transfer_credit(tx, credit_id, new_owner)
        })
    }

    pub fn verify_credit(&self, credit_id: &str) -> ContractResult<CommitReceipt> {
        self.submit(Function::VerifyCredit, |tx| {
            self.lifecycle.verify_credit(tx, credit_id)
        })
    }

    pub fn execute_credit(&self, credit_id: &str) -> ContractResult<CommitReceipt> {
        self.submit(Function::ExecuteCredit, |tx| {
            self.lifecycle.execute_credit(tx, credit_id)
        })
    }

    pub fn get_credit_history(&self, credit_id: &str) -> ContractResult<Vec<HistoryEntry>> {
        self.evaluate(|tx| HistoryReconstructor::credit_history(tx, credit_id))
    }

    fn submit<T>(
        &self,
        function: Function,
        operation: impl FnOnce(&LedgerTransaction<'_, L>) -> ChaincodeResult<T>,
    ) -> ContractResult<CommitReceipt> {
        let tx = self.ledger.begin();
        match operation(&tx) {
            Ok(_) => {
                let receipt = tx.commit().map_err(ContractError::Commit)?;
                info!(%function, tx_id = %receipt.tx_id, "transaction submitted");
                Ok(receipt)
            }
            Err(e) => {
                warn!(%function, error = %e, "transaction rejected");
                tx.rollback();
                Err(e.into())
            }
        }
    }

    fn evaluate<T>(
        &self,
        query: impl FnOnce(&LedgerTransaction<'_, L>) -> ChaincodeResult<T>,
    ) -> ContractResult<T> {
        let tx = self.ledger.begin();
        let result = query(&tx);
        tx.rollback();
        Ok(result?)
    }
}

fn parse_int(name: &'static str, value: &str) -> ContractResult<i64> {
    value
        .parse::<i64>()
        .map_err(|e| ContractError::InvalidArgument {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn to_json<T: serde::Serialize>(value: &T) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| ContractError::Serialization(e.to_string()))
}
