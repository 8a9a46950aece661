//! Instruction payloads and the builders that pair them with account lists.
//!
//! Payload layout: 8-byte discriminator, then the arguments little-endian
//! with no padding.
//!
//! | instruction      | arguments     |
//! |------------------|---------------|
//! | `stake`          | `amount: u64` |
//! | `unstake`        | `shares: u128`|
//! | `cancel_unstake` | none          |
//! | `withdraw`       | none          |

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::system_program;
use anchor_lang::ToAccountMetas;
use log::debug;

use crate::account_structs::{self, EventCpi, StakeAccounts, TokenTransfer};
use crate::codec::{Reader, Writer};
use crate::config::ClientConfig;
use crate::constants::{Operation, DISCRIMINATOR_LEN};
use crate::error::{Result, StakeClientError};
use crate::wide::WideU128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeInstruction {
    /// Deposit raw token units; the program credits shares at the current price.
    Stake { amount: u64 },
    /// Earmark shares for withdrawal and start the cooldown.
    Unstake { shares: WideU128 },
    /// Return the pending amount to shares.
    CancelUnstake,
    /// Pay out the pending amount once the cooldown has elapsed.
    Withdraw,
}

impl StakeInstruction {
    pub fn operation(&self) -> Operation {
        match self {
            StakeInstruction::Stake { .. } => Operation::Stake,
            StakeInstruction::Unstake { .. } => Operation::Unstake,
            StakeInstruction::CancelUnstake => Operation::CancelUnstake,
            StakeInstruction::Withdraw => Operation::Withdraw,
        }
    }

    fn packed_len(operation: Operation) -> usize {
        DISCRIMINATOR_LEN
            + match operation {
                Operation::Stake => 8,
                Operation::Unstake => 16,
                Operation::CancelUnstake | Operation::Withdraw => 0,
            }
    }

    pub fn pack(&self) -> Vec<u8> {
        let operation = self.operation();
        let mut writer =
            Writer::with_discriminator(&operation.discriminator(), Self::packed_len(operation));
        match self {
            StakeInstruction::Stake { amount } => {
                writer.u64(*amount);
            }
            StakeInstruction::Unstake { shares } => {
                writer.wide(*shares);
            }
            StakeInstruction::CancelUnstake | StakeInstruction::Withdraw => {}
        }
        writer.into_bytes()
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let tag = data.get(..DISCRIMINATOR_LEN).ok_or_else(|| {
            StakeClientError::schema(
                "StakeInstruction",
                format!("{} bytes is shorter than a discriminator", data.len()),
            )
        })?;
        let operation = Operation::from_discriminator(tag).ok_or_else(|| {
            StakeClientError::schema(
                "StakeInstruction",
                format!("unknown discriminator {}", hex::encode(tag)),
            )
        })?;
        let expected = Self::packed_len(operation);
        if data.len() != expected {
            return Err(StakeClientError::schema(
                "StakeInstruction",
                format!(
                    "{} payload is {} bytes, expected {}",
                    operation.name(),
                    data.len(),
                    expected
                ),
            ));
        }
        let reader = Reader::new("StakeInstruction", data, &operation.discriminator(), expected)?;
        Ok(match operation {
            Operation::Stake => StakeInstruction::Stake {
                amount: reader.u64(DISCRIMINATOR_LEN)?,
            },
            Operation::Unstake => StakeInstruction::Unstake {
                shares: reader.wide(DISCRIMINATOR_LEN)?,
            },
            Operation::CancelUnstake => StakeInstruction::CancelUnstake,
            Operation::Withdraw => StakeInstruction::Withdraw,
        })
    }
}

fn finish(
    config: &ClientConfig,
    instruction: StakeInstruction,
    accounts: &impl ToAccountMetas,
) -> Instruction {
    let ix = Instruction {
        program_id: config.program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction.pack(),
    };
    debug!(
        "built {} instruction: {} accounts, data {}",
        instruction.operation().name(),
        ix.accounts.len(),
        hex::encode(&ix.data)
    );
    ix
}

/// Creates a `stake` instruction. The user signs and pays rent if this is
/// their first stake in `guardian_pool`.
pub fn stake(
    config: &ClientConfig,
    user: &Pubkey,
    guardian_pool: &Pubkey,
    user_token_account: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    let accounts = account_structs::Stake {
        common: StakeAccounts::resolve(config, user, guardian_pool)?,
        transfer: TokenTransfer::resolve(config, user_token_account)?,
        system_program: system_program::ID,
        event_cpi: EventCpi::resolve(config)?,
    };
    Ok(finish(config, StakeInstruction::Stake { amount }, &accounts))
}

/// Creates an `unstake` instruction for `shares` of the user's balance.
pub fn unstake(
    config: &ClientConfig,
    user: &Pubkey,
    guardian_pool: &Pubkey,
    shares: WideU128,
) -> Result<Instruction> {
    let accounts = account_structs::Unstake {
        common: StakeAccounts::resolve(config, user, guardian_pool)?,
        event_cpi: EventCpi::resolve(config)?,
    };
    Ok(finish(config, StakeInstruction::Unstake { shares }, &accounts))
}

pub fn cancel_unstake(config: &ClientConfig, user: &Pubkey, guardian_pool: &Pubkey) -> Result<Instruction> {
    let accounts = account_structs::CancelUnstake {
        common: StakeAccounts::resolve(config, user, guardian_pool)?,
        event_cpi: EventCpi::resolve(config)?,
    };
    Ok(finish(config, StakeInstruction::CancelUnstake, &accounts))
}

pub fn withdraw(
    config: &ClientConfig,
    user: &Pubkey,
    guardian_pool: &Pubkey,
    user_token_account: &Pubkey,
) -> Result<Instruction> {
    let accounts = account_structs::Withdraw {
        common: StakeAccounts::resolve(config, user, guardian_pool)?,
        transfer: TokenTransfer::resolve(config, user_token_account)?,
        event_cpi: EventCpi::resolve(config)?,
    };
    Ok(finish(config, StakeInstruction::Withdraw, &accounts))
}
