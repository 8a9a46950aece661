use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::pubkey::{MAX_SEEDS, MAX_SEED_LEN};
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use log::trace;

use crate::constants::{EVENT_AUTHORITY_SEED, STAKE_CONFIG_SEED, STAKE_VAULT_SEED, USER_STAKE_SEED};
use crate::error::{Result, StakeClientError};

/// Derives a program address from a domain tag followed by `seeds`, in order.
///
/// Fails with `InvalidSeeds` if the tag plus seeds plus the bump exceed
/// `MAX_SEEDS` or any seed is longer than `MAX_SEED_LEN`, and with
/// `AddressSpaceExhausted` if no bump in 255..=1 yields an off-curve address.
pub fn derive(domain_tag: &[u8], seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_with(domain_tag, seeds, program_id, Pubkey::try_find_program_address)
}

fn derive_with(
    domain_tag: &[u8],
    seeds: &[&[u8]],
    program_id: &Pubkey,
    find: impl Fn(&[&[u8]], &Pubkey) -> Option<(Pubkey, u8)>,
) -> Result<(Pubkey, u8)> {
    let seed_tag = || String::from_utf8_lossy(domain_tag).into_owned();

    let mut all_seeds: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
    all_seeds.push(domain_tag);
    all_seeds.extend_from_slice(seeds);

    // the bump takes one slot
    if all_seeds.len() + 1 > MAX_SEEDS {
        return Err(StakeClientError::InvalidSeeds {
            seed_tag: seed_tag(),
            reason: format!(
                "{} seeds plus bump exceeds the limit of {}",
                all_seeds.len(),
                MAX_SEEDS
            ),
        });
    }
    if let Some((index, seed)) = all_seeds
        .iter()
        .enumerate()
        .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
        return Err(StakeClientError::InvalidSeeds {
            seed_tag: seed_tag(),
            reason: format!(
                "seed {} is {} bytes, limit is {}",
                index,
                seed.len(),
                MAX_SEED_LEN
            ),
        });
    }

    let (address, bump) = find(all_seeds.as_slice(), program_id)
        .ok_or_else(|| StakeClientError::AddressSpaceExhausted { seed_tag: seed_tag() })?;
    trace!(
        "derived {} address {} (bump {})",
        String::from_utf8_lossy(domain_tag),
        address,
        bump
    );
    Ok((address, bump))
}

pub fn find_stake_config_address(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(STAKE_CONFIG_SEED, &[], program_id)
}

pub fn find_stake_vault_address(program_id: &Pubkey, stake_config: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(STAKE_VAULT_SEED, &[stake_config.as_ref()], program_id)
}

/// Signer the program uses to self-invoke when emitting events.
pub fn find_event_authority_address(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(EVENT_AUTHORITY_SEED, &[], program_id)
}

/// Seed order is part of the program contract: config, user, guardian pool.
pub fn find_user_stake_address(
    program_id: &Pubkey,
    stake_config: &Pubkey,
    user: &Pubkey,
    guardian_pool: &Pubkey,
) -> Result<(Pubkey, u8)> {
    derive(
        USER_STAKE_SEED,
        &[stake_config.as_ref(), user.as_ref(), guardian_pool.as_ref()],
        program_id,
    )
}

/// The default guardian pool, which most users stake under.
pub fn default_guardian_pool() -> Pubkey {
    Pubkey::default()
}

/// The user's associated token account for the staking mint.
pub fn user_token_account(user: &Pubkey, token_mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(user, token_mint, token_program)
}
