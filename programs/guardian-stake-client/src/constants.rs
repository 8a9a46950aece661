//! Fixed protocol constants shared with the deployed staking program.

pub const STAKE_CONFIG_SEED: &[u8] = b"stake_config";
pub const STAKE_VAULT_SEED: &[u8] = b"stake_vault";
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";
pub const USER_STAKE_SEED: &[u8] = b"user_stake";

/// Decimal places of the staking token.
pub const TOKEN_DECIMALS: u8 = 6;
pub const COOLDOWN_SECONDS_DEFAULT: u64 = 172_800; // 2 days in seconds

/// Share prices are fixed-point, scaled by 1e9.
/// Example: if 1 share = 1.5 tokens, price is 1_500_000_000
pub const SHARE_PRICE_SCALE: u64 = 1_000_000_000;

pub const DISCRIMINATOR_LEN: usize = 8;
pub type Discriminator = [u8; DISCRIMINATOR_LEN];

pub const STAKE_CONFIG_DISCRIMINATOR: Discriminator = [238, 151, 43, 3, 11, 151, 63, 176];
pub const USER_STAKE_DISCRIMINATOR: Discriminator = [102, 53, 163, 107, 9, 138, 87, 153];

/// Operations understood by the staking program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Stake,
    Unstake,
    CancelUnstake,
    Withdraw,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Stake,
        Operation::Unstake,
        Operation::CancelUnstake,
        Operation::Withdraw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Stake => "stake",
            Operation::Unstake => "unstake",
            Operation::CancelUnstake => "cancel_unstake",
            Operation::Withdraw => "withdraw",
        }
    }

    /// Instruction discriminator, fixed by the deployed program.
    pub const fn discriminator(self) -> Discriminator {
        match self {
            Operation::Stake => [206, 176, 202, 18, 200, 209, 179, 108],
            Operation::Unstake => [90, 95, 107, 42, 205, 124, 50, 225],
            Operation::CancelUnstake => [64, 65, 53, 227, 125, 153, 3, 167],
            Operation::Withdraw => [183, 18, 70, 156, 148, 109, 161, 34],
        }
    }

    pub fn from_discriminator(discriminator: &[u8]) -> Option<Operation> {
        Operation::ALL
            .into_iter()
            .find(|op| op.discriminator().as_slice() == discriminator)
    }
}
