use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("insufficient allowance from {owner}: need {needed}, have {available}")]
    InsufficientAllowance {
        owner: String,
        needed: u128,
        available: u128,
    },

    #[error("asset operation rejected: {0}")]
    Rejected(String),

    #[error("arithmetic overflow in asset ledger")]
    Overflow,
}
