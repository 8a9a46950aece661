//! Where a user's stake sits in the stake / unstake / withdraw flow.
//!
//! ```text
//!   NoStake --stake--> Staked --unstake--> Cooldown --(time)--> Withdrawable
//!              Staked <--cancel_unstake-- Cooldown | Withdrawable
//!   Staked | NoStake <--withdraw-- Withdrawable
//! ```
//!
//! Classification is a pure function of the fetched record, the config's
//! cooldown and the caller's clock. Nothing here talks to the network.

use log::warn;
use num_traits::Zero;

use crate::constants::Operation;
use crate::error::{Result, StakeClientError};
use crate::instruction::StakeInstruction;
use crate::state::UserStake;
use crate::wide::WideU128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeState {
    /// No record at the derived address, or an emptied one.
    NoStake,
    Staked,
    Cooldown { eligible_at: i64 },
    Withdrawable { eligible_at: i64 },
}

impl StakeState {
    /// Operations the program would accept from this state.
    pub fn allowed_operations(&self) -> &'static [Operation] {
        match self {
            StakeState::NoStake => &[Operation::Stake],
            StakeState::Staked => &[Operation::Stake, Operation::Unstake],
            StakeState::Cooldown { .. } => &[Operation::Stake, Operation::CancelUnstake],
            StakeState::Withdrawable { .. } => &[
                Operation::Stake,
                Operation::CancelUnstake,
                Operation::Withdraw,
            ],
        }
    }

    pub fn allows(&self, operation: Operation) -> bool {
        self.allowed_operations().contains(&operation)
    }
}

/// `unstake_timestamp + cooldown_seconds`, checked.
pub fn eligible_at(unstake_timestamp: i64, cooldown_seconds: u64) -> Result<i64> {
    i64::try_from(cooldown_seconds)
        .ok()
        .and_then(|cooldown| unstake_timestamp.checked_add(cooldown))
        .ok_or(StakeClientError::overflow("eligible_at"))
}

pub fn classify(record: Option<&UserStake>, cooldown_seconds: u64, now: i64) -> Result<StakeState> {
    let Some(record) = record else {
        return Ok(StakeState::NoStake);
    };
    if record.has_pending_unstake() {
        let eligible_at = eligible_at(record.unstake_timestamp, cooldown_seconds)?;
        return Ok(if now < eligible_at {
            StakeState::Cooldown { eligible_at }
        } else {
            StakeState::Withdrawable { eligible_at }
        });
    }
    if record.shares > WideU128::ZERO {
        Ok(StakeState::Staked)
    } else {
        Ok(StakeState::NoStake)
    }
}

/// A user's record in one guardian pool together with the cooldown it is
/// subject to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakePosition {
    pub record: Option<UserStake>,
    pub cooldown_seconds: u64,
}

impl StakePosition {
    pub fn new(record: Option<UserStake>, cooldown_seconds: u64) -> Self {
        StakePosition {
            record,
            cooldown_seconds,
        }
    }

    pub fn state(&self, now: i64) -> Result<StakeState> {
        classify(self.record.as_ref(), self.cooldown_seconds, now)
    }

    pub fn shares(&self) -> WideU128 {
        self.record
            .as_ref()
            .map(|r| r.shares)
            .unwrap_or(WideU128::ZERO)
    }

    pub fn pending_amount(&self) -> u64 {
        self.record
            .as_ref()
            .map(|r| r.unstaking_amount)
            .unwrap_or(0)
    }

    /// When the pending unstake becomes withdrawable, `None` if nothing is pending.
    pub fn eligible_at(&self) -> Result<Option<i64>> {
        match &self.record {
            Some(record) if record.has_pending_unstake() => Ok(Some(eligible_at(
                record.unstake_timestamp,
                self.cooldown_seconds,
            )?)),
            _ => Ok(None),
        }
    }

    /// Zero once withdrawable, `None` if nothing is pending.
    pub fn seconds_until_withdrawable(&self, now: i64) -> Result<Option<u64>> {
        Ok(self
            .eligible_at()?
            .map(|at| at.saturating_sub(now).max(0) as u64))
    }

    /// Refuses instructions the program would reject given this position.
    ///
    /// Cancelling is allowed whenever an unstake is pending, including after
    /// the cooldown has elapsed.
    pub fn check(&self, instruction: &StakeInstruction, now: i64) -> Result<()> {
        let result = self.check_inner(instruction, now);
        if let Err(err) = &result {
            warn!("refusing to build {}: {}", instruction.operation().name(), err);
        }
        result
    }

    fn check_inner(&self, instruction: &StakeInstruction, now: i64) -> Result<()> {
        match instruction {
            StakeInstruction::Stake { amount } => {
                if *amount == 0 {
                    return Err(StakeClientError::InvalidAmount {
                        field: "amount",
                        reason: "stake amount must be greater than zero".to_string(),
                    });
                }
                Ok(())
            }
            StakeInstruction::Unstake { shares } => {
                if shares.is_zero() {
                    return Err(StakeClientError::InvalidAmount {
                        field: "shares",
                        reason: "unstake shares must be greater than zero".to_string(),
                    });
                }
                let pending = self.pending_amount();
                if pending > 0 {
                    return Err(StakeClientError::UnstakeAlreadyPending { pending });
                }
                let available = self.shares();
                if *shares > available {
                    return Err(StakeClientError::InsufficientShares {
                        requested: u128::from(*shares),
                        available: u128::from(available),
                    });
                }
                Ok(())
            }
            StakeInstruction::CancelUnstake => {
                if self.pending_amount() == 0 {
                    return Err(StakeClientError::NoPendingUnstake {
                        operation: Operation::CancelUnstake.name(),
                    });
                }
                Ok(())
            }
            StakeInstruction::Withdraw => match self.state(now)? {
                StakeState::Withdrawable { .. } => Ok(()),
                StakeState::Cooldown { eligible_at } => {
                    Err(StakeClientError::IneligibleForWithdraw { now, eligible_at })
                }
                StakeState::NoStake | StakeState::Staked => Err(StakeClientError::NoPendingUnstake {
                    operation: Operation::Withdraw.name(),
                }),
            },
        }
    }
}
