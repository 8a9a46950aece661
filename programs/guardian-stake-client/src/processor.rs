use crate::accounting::{self, PositionValue};
use crate::config::ClientConfig;
use crate::error::*;
use crate::instruction::{self, StakeInstruction};
use crate::lifecycle::{StakePosition, StakeState};
use crate::state::{StakeConfig, UserStake};
use crate::transport::Transport;
use crate::wide::WideU128;
use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use log::{debug, info};

/*
# Reading before building

Every operation below follows the same shape:

1. fetch the stake config and the user's stake record through the transport
2. read the clock
3. classify the position and refuse anything the program would reject,
   including amounts the share math cannot convert at the fetched price
4. build the instruction and hand it to the transport

The share price is always taken from the config fetched in step 1 of the
same call. A price that moved between fetch and execution only changes how
many shares the program credits; the program does its own math on chain and
never trusts the client's numbers. Nothing is cached between calls.
*/

/// The user, guardian pool and token account an operation acts for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeRequest {
    pub user: Pubkey,
    pub guardian_pool: Pubkey,
    pub user_token_account: Pubkey,
}

impl StakeRequest {
    /// Uses the user's associated token account for the staking mint.
    pub fn new(config: &ClientConfig, user: Pubkey, guardian_pool: Pubkey) -> Self {
        StakeRequest {
            user_token_account: config.user_token_account(&user),
            user,
            guardian_pool,
        }
    }

    pub fn with_user_token_account(mut self, user_token_account: Pubkey) -> Self {
        self.user_token_account = user_token_account;
        self
    }
}

/// Builds `instruction` after checking it against the user's position and
/// the deployment's minimum stake. Pure: no transport involved.
pub fn build_checked(
    config: &ClientConfig,
    request: &StakeRequest,
    stake_config: &StakeConfig,
    position: &StakePosition,
    instruction: StakeInstruction,
    now: i64,
) -> Result<Instruction> {
    position.check(&instruction, now)?;
    match instruction {
        StakeInstruction::Stake { amount } => {
            if amount < stake_config.min_stake {
                return Err(StakeClientError::BelowMinimumStake {
                    amount,
                    minimum: stake_config.min_stake,
                });
            }
            instruction::stake(
                config,
                &request.user,
                &request.guardian_pool,
                &request.user_token_account,
                amount,
            )
        }
        StakeInstruction::Unstake { shares } => {
            instruction::unstake(config, &request.user, &request.guardian_pool, shares)
        }
        StakeInstruction::CancelUnstake => {
            instruction::cancel_unstake(config, &request.user, &request.guardian_pool)
        }
        StakeInstruction::Withdraw => instruction::withdraw(
            config,
            &request.user,
            &request.guardian_pool,
            &request.user_token_account,
        ),
    }
}

pub fn fetch_config<T: Transport>(transport: &T, config: &ClientConfig) -> Result<StakeConfig> {
    let address = config.stake_config_address()?;
    let data = transport
        .fetch_bytes(&address)?
        .ok_or_else(|| StakeClientError::AccountNotFound {
            address: address.to_string(),
        })?;
    StakeConfig::try_from_bytes(&data)
}

/// `None` until the user's first stake in this pool.
pub fn fetch_user_stake<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    user: &Pubkey,
    guardian_pool: &Pubkey,
) -> Result<Option<UserStake>> {
    let address = config.user_stake_address(user, guardian_pool)?;
    match transport.fetch_bytes(&address)? {
        Some(data) => Ok(Some(UserStake::try_from_bytes(&data)?)),
        None => {
            debug!("no user stake at {}", address);
            Ok(None)
        }
    }
}

/// A decoded snapshot of one user's stake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeStatus {
    pub stake_config: StakeConfig,
    pub position: StakePosition,
    pub state: StakeState,
    pub now: i64,
    /// `None` without a record.
    pub value: Option<PositionValue>,
}

pub fn fetch_status<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    user: &Pubkey,
    guardian_pool: &Pubkey,
) -> Result<StakeStatus> {
    let stake_config = fetch_config(transport, config)?;
    let record = fetch_user_stake(transport, config, user, guardian_pool)?;
    let now = transport.current_unix_time()?;

    let position = StakePosition::new(record, stake_config.cooldown_seconds);
    let state = position.state(now)?;
    let value = match &position.record {
        Some(record) => Some(accounting::value_of_position(record, stake_config.share_price)?),
        None => None,
    };
    debug!("{} in pool {} is {:?}", user, guardian_pool, state);

    Ok(StakeStatus {
        stake_config,
        position,
        state,
        now,
        value,
    })
}

/// A transport plus the deployment and user every call acts for.
pub struct Session<T: Transport> {
    pub transport: T,
    pub config: ClientConfig,
    pub request: StakeRequest,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: ClientConfig, user: Pubkey, guardian_pool: Pubkey) -> Self {
        let request = StakeRequest::new(&config, user, guardian_pool);
        Session {
            transport,
            config,
            request,
        }
    }

    pub fn status(&self) -> Result<StakeStatus> {
        fetch_status(
            &self.transport,
            &self.config,
            &self.request.user,
            &self.request.guardian_pool,
        )
    }

    /// Checks and builds `instruction` against `status` without sending it.
    fn build(&self, status: &StakeStatus, instruction: StakeInstruction) -> Result<Instruction> {
        build_checked(
            &self.config,
            &self.request,
            &status.stake_config,
            &status.position,
            instruction,
            status.now,
        )
    }

    fn submit(&self, ix: &Instruction) -> Result<()> {
        self.transport.submit(ix.clone())
    }
}

/// Deposits `amount` raw token units. Returns the submitted instruction and
/// the shares it should mint at the price read just before building it.
pub fn stake<T: Transport>(session: &Session<T>, amount: u64) -> Result<(Instruction, WideU128)> {
    let status = session.status()?;
    let ix = session.build(&status, StakeInstruction::Stake { amount })?;
    let expected_shares = accounting::tokens_to_shares(amount, status.stake_config.share_price)?;
    session.submit(&ix)?;
    info!(
        "staked {} tokens for ~{} shares at price {}",
        accounting::raw_to_display(amount),
        expected_shares,
        status.stake_config.share_price
    );
    Ok((ix, expected_shares))
}

/// Like [`stake`] with a human-readable amount such as `"100.5"`.
pub fn stake_display<T: Transport>(session: &Session<T>, display: &str) -> Result<(Instruction, WideU128)> {
    stake(session, accounting::display_to_raw(display)?)
}

/// Starts the cooldown for `shares`. Returns the submitted instruction and the
/// raw token amount the program should record as pending.
pub fn unstake<T: Transport>(session: &Session<T>, shares: WideU128) -> Result<(Instruction, u64)> {
    let status = session.status()?;
    unstake_at(session, &status, shares)
}

/// Unstakes however many shares `tokens` raw units are worth at the current
/// price, rounded down.
pub fn unstake_tokens<T: Transport>(session: &Session<T>, tokens: u64) -> Result<(Instruction, u64)> {
    let status = session.status()?;
    let shares = accounting::tokens_to_shares(tokens, status.stake_config.share_price)?;
    unstake_at(session, &status, shares)
}

fn unstake_at<T: Transport>(
    session: &Session<T>,
    status: &StakeStatus,
    shares: WideU128,
) -> Result<(Instruction, u64)> {
    let ix = session.build(status, StakeInstruction::Unstake { shares })?;
    let pending = accounting::unstake_amount(shares, status.stake_config.share_price)?;
    session.submit(&ix)?;
    info!(
        "unstaking {} shares (~{} tokens), withdrawable after {}s",
        shares,
        accounting::raw_to_display(pending),
        status.stake_config.cooldown_seconds
    );
    Ok((ix, pending))
}

pub fn cancel_unstake<T: Transport>(session: &Session<T>) -> Result<Instruction> {
    let status = session.status()?;
    let ix = session.build(&status, StakeInstruction::CancelUnstake)?;
    session.submit(&ix)?;
    info!(
        "cancelled pending unstake of {} tokens",
        accounting::raw_to_display(status.position.pending_amount())
    );
    Ok(ix)
}

/// Withdraws the pending amount. Refused with `IneligibleForWithdraw` while
/// the cooldown is running.
pub fn withdraw<T: Transport>(session: &Session<T>) -> Result<(Instruction, u64)> {
    let status = session.status()?;
    let ix = session.build(&status, StakeInstruction::Withdraw)?;
    session.submit(&ix)?;
    let amount = status.position.pending_amount();
    info!("withdrawing {} tokens", accounting::raw_to_display(amount));
    Ok((ix, amount))
}
