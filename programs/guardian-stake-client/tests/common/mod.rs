#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use guardian_stake_client::accounting;
use guardian_stake_client::config::ClientConfig;
use guardian_stake_client::instruction::StakeInstruction;
use guardian_stake_client::state::{StakeConfig, UserStake};
use guardian_stake_client::transport::Transport;
use guardian_stake_client::{Result, StakeClientError, WideU128};

pub const START: i64 = 1_700_000_000;
pub const ONE_TO_ONE: u128 = 1_000_000_000;

/// In-memory ledger that applies submitted instructions the way the staking
/// program does, closely enough to walk the stake lifecycle.
pub struct MockLedger {
    pub accounts: RefCell<HashMap<Pubkey, Vec<u8>>>,
    pub now: Cell<i64>,
    pub submitted: RefCell<Vec<Instruction>>,
    pub fetches: Cell<usize>,
}

impl MockLedger {
    pub fn new() -> Self {
        MockLedger {
            accounts: RefCell::new(HashMap::new()),
            now: Cell::new(START),
            submitted: RefCell::new(Vec::new()),
            fetches: Cell::new(0),
        }
    }

    pub fn advance(&self, seconds: i64) {
        self.now.set(self.now.get() + seconds);
    }

    pub fn put(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts.borrow_mut().insert(address, data);
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.borrow().len()
    }

    fn config_at(&self, address: &Pubkey) -> Result<StakeConfig> {
        let accounts = self.accounts.borrow();
        let data = accounts.get(address).ok_or_else(|| StakeClientError::AccountNotFound {
            address: address.to_string(),
        })?;
        StakeConfig::try_from_bytes(data)
    }

    fn user_stake_at(&self, address: &Pubkey) -> Result<Option<UserStake>> {
        match self.accounts.borrow().get(address) {
            Some(data) => Ok(Some(UserStake::try_from_bytes(data)?)),
            None => Ok(None),
        }
    }

    fn rejected(reason: &str) -> StakeClientError {
        StakeClientError::Transport(format!("program rejected instruction: {reason}"))
    }

    fn apply(&self, ix: &Instruction) -> Result<()> {
        let config_address = ix.accounts[0].pubkey;
        let user_stake_address = ix.accounts[1].pubkey;
        let mut config = self.config_at(&config_address)?;
        let existing = self.user_stake_at(&user_stake_address)?;
        let price = config.share_price;
        let now = self.now.get();

        let mut record = match (StakeInstruction::unpack(&ix.data)?, existing) {
            (StakeInstruction::Stake { amount }, existing) => {
                let mut record = existing.unwrap_or(UserStake {
                    bump: 255,
                    config: config_address,
                    user: ix.accounts[3].pubkey,
                    guardian_pool: ix.accounts[2].pubkey,
                    shares: WideU128::ZERO,
                    cost_basis: WideU128::ZERO,
                    commission_accumulator: WideU128::ZERO,
                    unstaking_amount: 0,
                    unstake_timestamp: 0,
                });
                let shares = accounting::tokens_to_shares(amount, price)?;
                record.shares = record.shares + shares;
                record.cost_basis = record.cost_basis + WideU128::from(amount);
                config.total_shares = config.total_shares + shares;
                record
            }
            (_, None) => return Err(Self::rejected("account not initialized")),
            (StakeInstruction::Unstake { shares }, Some(mut record)) => {
                if record.unstaking_amount > 0 || shares > record.shares {
                    return Err(Self::rejected("unstake"));
                }
                record.shares = record.shares - shares;
                record.unstaking_amount = accounting::unstake_amount(shares, price)?;
                record.unstake_timestamp = now;
                config.total_shares = config.total_shares - shares;
                record
            }
            (StakeInstruction::CancelUnstake, Some(mut record)) => {
                if record.unstaking_amount == 0 {
                    return Err(Self::rejected("nothing pending"));
                }
                let shares = accounting::tokens_to_shares(record.unstaking_amount, price)?;
                record.shares = record.shares + shares;
                record.unstaking_amount = 0;
                record.unstake_timestamp = 0;
                config.total_shares = config.total_shares + shares;
                record
            }
            (StakeInstruction::Withdraw, Some(mut record)) => {
                let eligible_at = record.unstake_timestamp + config.cooldown_seconds as i64;
                if record.unstaking_amount == 0 || now < eligible_at {
                    return Err(Self::rejected("cooldown"));
                }
                record.unstaking_amount = 0;
                record.unstake_timestamp = 0;
                record
            }
        };
        record.bump = 255;
        self.put(config_address, config.to_bytes());
        self.put(user_stake_address, record.to_bytes());
        Ok(())
    }
}

impl Transport for MockLedger {
    fn fetch_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.fetches.set(self.fetches.get() + 1);
        Ok(self.accounts.borrow().get(address).cloned())
    }

    fn current_unix_time(&self) -> Result<i64> {
        Ok(self.now.get())
    }

    fn submit(&self, instruction: Instruction) -> Result<()> {
        self.apply(&instruction)?;
        self.submitted.borrow_mut().push(instruction);
        Ok(())
    }
}

/// Reads through to a [`MockLedger`] but accepts every submission without
/// applying it, like an RPC node that has not executed the call yet.
pub struct AcceptAll<'a>(pub &'a MockLedger);

impl Transport for AcceptAll<'_> {
    fn fetch_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.0.fetch_bytes(address)
    }

    fn current_unix_time(&self) -> Result<i64> {
        self.0.current_unix_time()
    }

    fn submit(&self, instruction: Instruction) -> Result<()> {
        self.0.submitted.borrow_mut().push(instruction);
        Ok(())
    }
}

pub fn stake_config(config: &ClientConfig, share_price: u128, min_stake: u64) -> StakeConfig {
    StakeConfig {
        bump: 254,
        authority: Pubkey::new_unique(),
        token_mint: config.token_mint,
        vault: config.vault_address().unwrap(),
        min_stake,
        cooldown_seconds: 172_800,
        total_shares: WideU128::ZERO,
        share_price: WideU128::from(share_price),
    }
}

/// A ledger holding a stake config at `share_price`.
pub fn setup(share_price: u128, min_stake: u64) -> (MockLedger, ClientConfig) {
    let config = ClientConfig::new(Pubkey::new_unique());
    let ledger = MockLedger::new();
    ledger.put(
        config.stake_config_address().unwrap(),
        stake_config(&config, share_price, min_stake).to_bytes(),
    );
    (ledger, config)
}

pub fn set_share_price(ledger: &MockLedger, config: &ClientConfig, share_price: u128) {
    let address = config.stake_config_address().unwrap();
    let mut stake_config = ledger.config_at(&address).unwrap();
    stake_config.share_price = WideU128::from(share_price);
    ledger.put(address, stake_config.to_bytes());
}

/// Writes a user stake record holding `shares` with nothing pending.
pub fn put_user_stake(
    ledger: &MockLedger,
    config: &ClientConfig,
    user: &Pubkey,
    guardian_pool: &Pubkey,
    shares: WideU128,
) {
    let address = config.user_stake_address(user, guardian_pool).unwrap();
    let record = UserStake {
        bump: 255,
        config: config.stake_config_address().unwrap(),
        user: *user,
        guardian_pool: *guardian_pool,
        shares,
        cost_basis: WideU128::ZERO,
        commission_accumulator: WideU128::ZERO,
        unstaking_amount: 0,
        unstake_timestamp: 0,
    };
    ledger.put(address, record.to_bytes());
}
