//! Abstract asset interfaces consumed by the farm.
//!
//! The farm never implements token ledgers itself. It custodies stake
//! through a [`StakeAsset`] and pays rewards by minting through a
//! [`RewardAsset`]. Every backend (an on-chain token bridge, an in-memory
//! ledger for tests) implements these traits; the farm depends only on them.

pub mod error;
pub mod reward;
pub mod stake;

pub use error::AssetError;
pub use reward::RewardAsset;
pub use stake::StakeAsset;
