pub mod account_structs;
/// # guardian stake client - Staking Program Protocol Layer
///
/// ## Business Process Flow
///
/// 1. Deployment (external, read-only here):
///    - Admin initializes the stake config singleton with the staking token,
///      the vault, a minimum stake and a cooldown duration
///    - The program owns the vault and every user stake record
///
/// 2. User Staking Flow:
///    a. Stake:
///       - User deposits raw token units into the vault
///       - Program credits shares at the current share price
///       - The user stake record is created on the first stake
///
/// 3. Withdrawal Flow:
///    a. Unstake:
///       - User earmarks shares; their token value at the current price is
///         moved into the pending unstake amount and the timestamp recorded
///       - Only one pending unstake may exist at a time
///
///    b. Cooldown:
///       - The pending amount is locked until `unstake_timestamp + cooldown`
///       - User may cancel at any time while the amount is pending
///
///    c. Withdraw:
///       - After the cooldown expires the pending amount is paid out
///       - The record stays behind with zeroed pending fields
///
/// This crate never executes any of the above. It derives the addresses,
/// decodes the records, does the share arithmetic, classifies where a user
/// is in the flow and builds the instruction the program expects. Fetching
/// bytes, signing and sending belong to the caller's [`transport::Transport`].
pub mod accounting;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod lifecycle;
pub mod pda;
pub mod processor;
pub mod state;
pub mod transport;
pub mod wide;

use anchor_lang::prelude::*;

pub use error::{Result, StakeClientError};
pub use wide::WideU128;

declare_id!("2KM3XETUkVk5CvTGjRph4J9RLSiQHs3qwgiQt5rhFqG7");
