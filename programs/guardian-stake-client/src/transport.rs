use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;

use crate::error::Result;

/// What this crate needs from the network, implemented by the caller.
///
/// Implementations report their failures as `StakeClientError::Transport`.
/// Retries, timeouts, signing and fee payment all live behind this trait.
pub trait Transport {
    /// Raw account data, `None` if no account exists at `address`.
    fn fetch_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// The ledger's notion of now, in unix seconds.
    fn current_unix_time(&self) -> Result<i64>;

    /// Signs, sends and confirms a single instruction.
    fn submit(&self, instruction: Instruction) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        (**self).fetch_bytes(address)
    }

    fn current_unix_time(&self) -> Result<i64> {
        (**self).current_unix_time()
    }

    fn submit(&self, instruction: Instruction) -> Result<()> {
        (**self).submit(instruction)
    }
}
