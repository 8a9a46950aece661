//! Account lists for each instruction, in the order and with the flags the
//! program's account validation expects. Any deviation is rejected on chain.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::AccountMeta;
use anchor_lang::ToAccountMetas;

use crate::config::ClientConfig;
use crate::pda;

/// Accounts shared by every instruction: the config singleton, the user's
/// stake record, its guardian pool and the signing user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeAccounts {
    pub stake_config: Pubkey,
    pub user_stake: Pubkey,
    pub guardian_pool: Pubkey,
    pub user: Pubkey,
}

impl StakeAccounts {
    pub fn resolve(config: &ClientConfig, user: &Pubkey, guardian_pool: &Pubkey) -> crate::Result<Self> {
        let (stake_config, _) = pda::find_stake_config_address(&config.program_id)?;
        let (user_stake, _) =
            pda::find_user_stake_address(&config.program_id, &stake_config, user, guardian_pool)?;
        Ok(StakeAccounts {
            stake_config,
            user_stake,
            guardian_pool: *guardian_pool,
            user: *user,
        })
    }

    fn metas(&self, is_signer: Option<bool>, user_writable: bool) -> Vec<AccountMeta> {
        let signer = is_signer.unwrap_or(true);
        vec![
            AccountMeta::new(self.stake_config, false),
            AccountMeta::new(self.user_stake, false),
            AccountMeta::new_readonly(self.guardian_pool, false),
            if user_writable {
                AccountMeta::new(self.user, signer)
            } else {
                AccountMeta::new_readonly(self.user, signer)
            },
        ]
    }
}

/// Trailing accounts Anchor's event CPI needs: the event authority and the
/// program itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventCpi {
    pub event_authority: Pubkey,
    pub program: Pubkey,
}

impl EventCpi {
    pub fn resolve(config: &ClientConfig) -> crate::Result<Self> {
        let (event_authority, _) = pda::find_event_authority_address(&config.program_id)?;
        Ok(EventCpi {
            event_authority,
            program: config.program_id,
        })
    }

    fn metas(&self) -> [AccountMeta; 2] {
        [
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(self.program, false),
        ]
    }
}

/// Token movement between the user and the vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenTransfer {
    pub user_token_account: Pubkey,
    pub stake_vault: Pubkey,
    pub token_mint: Pubkey,
    pub token_program: Pubkey,
}

impl TokenTransfer {
    pub fn resolve(config: &ClientConfig, user_token_account: &Pubkey) -> crate::Result<Self> {
        Ok(TokenTransfer {
            user_token_account: *user_token_account,
            stake_vault: config.vault_address()?,
            token_mint: config.token_mint,
            token_program: config.token_program,
        })
    }

    fn metas(&self) -> [AccountMeta; 4] {
        [
            AccountMeta::new(self.user_token_account, false),
            AccountMeta::new(self.stake_vault, false),
            AccountMeta::new_readonly(self.token_mint, false),
            AccountMeta::new_readonly(self.token_program, false),
        ]
    }
}

/// The user pays rent for the stake record on first stake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stake {
    pub common: StakeAccounts,
    pub transfer: TokenTransfer,
    pub system_program: Pubkey,
    pub event_cpi: EventCpi,
}

impl ToAccountMetas for Stake {
    fn to_account_metas(&self, is_signer: Option<bool>) -> Vec<AccountMeta> {
        let mut metas = self.common.metas(is_signer, true);
        metas.extend(self.transfer.metas());
        metas.push(AccountMeta::new_readonly(self.system_program, false));
        metas.extend(self.event_cpi.metas());
        metas
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unstake {
    pub common: StakeAccounts,
    pub event_cpi: EventCpi,
}

impl ToAccountMetas for Unstake {
    fn to_account_metas(&self, is_signer: Option<bool>) -> Vec<AccountMeta> {
        let mut metas = self.common.metas(is_signer, false);
        metas.extend(self.event_cpi.metas());
        metas
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CancelUnstake {
    pub common: StakeAccounts,
    pub event_cpi: EventCpi,
}

impl ToAccountMetas for CancelUnstake {
    fn to_account_metas(&self, is_signer: Option<bool>) -> Vec<AccountMeta> {
        let mut metas = self.common.metas(is_signer, false);
        metas.extend(self.event_cpi.metas());
        metas
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Withdraw {
    pub common: StakeAccounts,
    pub transfer: TokenTransfer,
    pub event_cpi: EventCpi,
}

impl ToAccountMetas for Withdraw {
    fn to_account_metas(&self, is_signer: Option<bool>) -> Vec<AccountMeta> {
        let mut metas = self.common.metas(is_signer, true);
        metas.extend(self.transfer.metas());
        metas.extend(self.event_cpi.metas());
        metas
    }
}
