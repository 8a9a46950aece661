use anchor_lang::prelude::*;
use anchor_lang::error::ErrorCode;
use log::debug;

use crate::codec::{Reader, Writer};
use crate::constants::{STAKE_CONFIG_DISCRIMINATOR, USER_STAKE_DISCRIMINATOR};
use crate::error::StakeClientError;
use crate::wide::WideU128;

/// Deployment-wide singleton at `["stake_config"]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeConfig {
    pub bump: u8,
    pub authority: Pubkey,
    pub token_mint: Pubkey,
    pub vault: Pubkey,
    pub min_stake: u64,
    pub cooldown_seconds: u64,
    pub total_shares: WideU128,
    /// Tokens per share, scaled by 1e9.
    pub share_price: WideU128,
}

impl StakeConfig {
    pub const LEN: usize = 8 +  // discriminator
        1 +                     // bump
        32 +                    // authority
        32 +                    // token_mint
        32 +                    // vault
        8 +                     // min_stake
        8 +                     // cooldown_seconds
        16 +                    // total_shares
        16; // share_price

    const BUMP: usize = 8;
    const AUTHORITY: usize = 9;
    const TOKEN_MINT: usize = 41;
    const VAULT: usize = 73;
    const MIN_STAKE: usize = 105;
    const COOLDOWN_SECONDS: usize = 113;
    const TOTAL_SHARES: usize = 121;
    const SHARE_PRICE: usize = 137;

    pub fn try_from_bytes(data: &[u8]) -> crate::Result<Self> {
        let reader = Reader::new("StakeConfig", data, &STAKE_CONFIG_DISCRIMINATOR, Self::LEN)?;
        let config = StakeConfig {
            bump: reader.u8(Self::BUMP)?,
            authority: reader.pubkey(Self::AUTHORITY)?,
            token_mint: reader.pubkey(Self::TOKEN_MINT)?,
            vault: reader.pubkey(Self::VAULT)?,
            min_stake: reader.u64(Self::MIN_STAKE)?,
            cooldown_seconds: reader.u64(Self::COOLDOWN_SECONDS)?,
            total_shares: reader.wide(Self::TOTAL_SHARES)?,
            share_price: reader.wide(Self::SHARE_PRICE)?,
        };
        debug!(
            "decoded StakeConfig: price {} total_shares {} cooldown {}s",
            config.share_price, config.total_shares, config.cooldown_seconds
        );
        Ok(config)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::with_discriminator(&STAKE_CONFIG_DISCRIMINATOR, Self::LEN);
        writer
            .u8(self.bump)
            .pubkey(&self.authority)
            .pubkey(&self.token_mint)
            .pubkey(&self.vault)
            .u64(self.min_stake)
            .u64(self.cooldown_seconds)
            .wide(self.total_shares)
            .wide(self.share_price);
        writer.into_bytes()
    }
}

/// One per (user, guardian pool), at `["user_stake", config, user, guardian_pool]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserStake {
    pub bump: u8,
    pub config: Pubkey,
    pub user: Pubkey,
    pub guardian_pool: Pubkey,
    pub shares: WideU128,
    /// Raw token units deposited.
    pub cost_basis: WideU128,
    /// Maintained by the program for guardian commission; not interpreted here.
    pub commission_accumulator: WideU128,
    /// Raw token amount of the pending unstake, zero when none is pending.
    pub unstaking_amount: u64,
    /// Unix seconds the pending unstake started. Meaningless while
    /// `unstaking_amount == 0`.
    pub unstake_timestamp: i64,
}

impl UserStake {
    pub const LEN: usize = 8 +  // discriminator
        1 +                     // bump
        32 +                    // config
        32 +                    // user
        32 +                    // guardian_pool
        16 +                    // shares
        16 +                    // cost_basis
        16 +                    // commission_accumulator
        8 +                     // unstaking_amount
        8; // unstake_timestamp

    const BUMP: usize = 8;
    const CONFIG: usize = 9;
    const USER: usize = 41;
    const GUARDIAN_POOL: usize = 73;
    const SHARES: usize = 105;
    const COST_BASIS: usize = 121;
    const COMMISSION_ACCUMULATOR: usize = 137;
    const UNSTAKING_AMOUNT: usize = 153;
    const UNSTAKE_TIMESTAMP: usize = 161;

    pub fn try_from_bytes(data: &[u8]) -> crate::Result<Self> {
        let reader = Reader::new("UserStake", data, &USER_STAKE_DISCRIMINATOR, Self::LEN)?;
        let record = UserStake {
            bump: reader.u8(Self::BUMP)?,
            config: reader.pubkey(Self::CONFIG)?,
            user: reader.pubkey(Self::USER)?,
            guardian_pool: reader.pubkey(Self::GUARDIAN_POOL)?,
            shares: reader.wide(Self::SHARES)?,
            cost_basis: reader.wide(Self::COST_BASIS)?,
            commission_accumulator: reader.wide(Self::COMMISSION_ACCUMULATOR)?,
            unstaking_amount: reader.u64(Self::UNSTAKING_AMOUNT)?,
            unstake_timestamp: reader.i64(Self::UNSTAKE_TIMESTAMP)?,
        };
        debug!(
            "decoded UserStake for {}: shares {} pending {}",
            record.user, record.shares, record.unstaking_amount
        );
        Ok(record)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::with_discriminator(&USER_STAKE_DISCRIMINATOR, Self::LEN);
        writer
            .u8(self.bump)
            .pubkey(&self.config)
            .pubkey(&self.user)
            .pubkey(&self.guardian_pool)
            .wide(self.shares)
            .wide(self.cost_basis)
            .wide(self.commission_accumulator)
            .u64(self.unstaking_amount)
            .i64(self.unstake_timestamp);
        writer.into_bytes()
    }

    pub fn has_pending_unstake(&self) -> bool {
        self.unstaking_amount > 0
    }
}

/// Anchor's checks in Anchor's order: tag present, tag matches, body decodes.
fn anchor_decode<T>(
    buf: &mut &[u8],
    discriminator: &[u8],
    len: usize,
    decode: fn(&[u8]) -> crate::error::Result<T>,
) -> anchor_lang::Result<T> {
    let data: &[u8] = *buf;
    if data.len() < discriminator.len() {
        return Err(ErrorCode::AccountDiscriminatorNotFound.into());
    }
    if &data[..discriminator.len()] != discriminator {
        return Err(ErrorCode::AccountDiscriminatorMismatch.into());
    }
    let value = decode(data).map_err(|err| {
        debug!("anchor decode failed: {}", err);
        ErrorCode::AccountDidNotDeserialize
    })?;
    *buf = &data[len..];
    Ok(value)
}

impl anchor_lang::Discriminator for StakeConfig {
    const DISCRIMINATOR: &'static [u8] = &STAKE_CONFIG_DISCRIMINATOR;
}

impl anchor_lang::Discriminator for UserStake {
    const DISCRIMINATOR: &'static [u8] = &USER_STAKE_DISCRIMINATOR;
}

impl anchor_lang::Owner for StakeConfig {
    fn owner() -> Pubkey {
        crate::ID
    }
}

impl anchor_lang::Owner for UserStake {
    fn owner() -> Pubkey {
        crate::ID
    }
}

// Lets Anchor RPC clients fetch and decode the records directly.
impl AccountDeserialize for StakeConfig {
    fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        anchor_decode(
            buf,
            &STAKE_CONFIG_DISCRIMINATOR,
            StakeConfig::LEN,
            StakeConfig::try_from_bytes,
        )
    }
}

impl AccountDeserialize for UserStake {
    fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        anchor_decode(buf, &USER_STAKE_DISCRIMINATOR, UserStake::LEN, UserStake::try_from_bytes)
    }
}
