use anchor_lang::prelude::Pubkey;

use crate::error::Result;
use crate::pda;
use crate::state::StakeConfig;

/// Which deployment the builders target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub program_id: Pubkey,
    pub token_mint: Pubkey,
    pub token_program: Pubkey,
    /// Vault token account; derived from `["stake_vault", config]` when unset.
    pub vault: Option<Pubkey>,
}

impl ClientConfig {
    /// Targets the deployed program with the classic SPL token program.
    pub fn new(token_mint: Pubkey) -> Self {
        ClientConfig {
            program_id: crate::ID,
            token_mint,
            token_program: anchor_spl::token::ID,
            vault: None,
        }
    }

    /// Takes the mint and vault recorded in a fetched stake config.
    pub fn from_stake_config(stake_config: &StakeConfig) -> Self {
        ClientConfig {
            vault: Some(stake_config.vault),
            ..ClientConfig::new(stake_config.token_mint)
        }
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_token_program(mut self, token_program: Pubkey) -> Self {
        self.token_program = token_program;
        self
    }

    pub fn stake_config_address(&self) -> Result<Pubkey> {
        Ok(pda::find_stake_config_address(&self.program_id)?.0)
    }

    pub fn vault_address(&self) -> Result<Pubkey> {
        match self.vault {
            Some(vault) => Ok(vault),
            None => {
                let stake_config = self.stake_config_address()?;
                Ok(pda::find_stake_vault_address(&self.program_id, &stake_config)?.0)
            }
        }
    }

    pub fn user_stake_address(&self, user: &Pubkey, guardian_pool: &Pubkey) -> Result<Pubkey> {
        let stake_config = self.stake_config_address()?;
        Ok(pda::find_user_stake_address(&self.program_id, &stake_config, user, guardian_pool)?.0)
    }

    /// The user's associated token account for the staking mint.
    pub fn user_token_account(&self, user: &Pubkey) -> Pubkey {
        pda::user_token_account(user, &self.token_mint, &self.token_program)
    }
}
