use thiserror::Error;

pub type Result<T> = std::result::Result<T, StakeClientError>;

/// Every error is raised at the point of violation and is never retried
/// inside this crate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StakeClientError {
    #[error("{schema} schema mismatch: {detail}")]
    SchemaMismatch { schema: &'static str, detail: String },

    #[error("Invalid share price {price}")]
    InvalidSharePrice { price: u128 },

    #[error("Insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: u128, available: u128 },

    #[error("Not eligible for withdraw until {eligible_at} (now {now})")]
    IneligibleForWithdraw { now: i64, eligible_at: i64 },

    #[error("No pending unstake for {operation}")]
    NoPendingUnstake { operation: &'static str },

    #[error("Unstake of {pending} tokens is already pending")]
    UnstakeAlreadyPending { pending: u64 },

    #[error("No valid bump found for {seed_tag} address")]
    AddressSpaceExhausted { seed_tag: String },

    #[error("Invalid seeds for {seed_tag} address: {reason}")]
    InvalidSeeds { seed_tag: String, reason: String },

    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    #[error("Invalid {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    #[error("Stake amount {amount} is below the minimum of {minimum}")]
    BelowMinimumStake { amount: u64, minimum: u64 },

    #[error("Account {address} not found")]
    AccountNotFound { address: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl StakeClientError {
    pub(crate) fn overflow(operation: &'static str) -> Self {
        StakeClientError::ArithmeticOverflow { operation }
    }

    pub(crate) fn schema(schema: &'static str, detail: impl Into<String>) -> Self {
        StakeClientError::SchemaMismatch {
            schema,
            detail: detail.into(),
        }
    }
}
