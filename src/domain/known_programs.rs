//! Known Program Addresses
//!
//! Constants for the Bags launchpad programs, the Meteora dynamic bonding
//! curve program, and the seed list of previously observed Bags token mints.
//! Used as defaults by the configuration and the on-chain discovery source.

/// Bags token launch/creation program
pub const BAGS_CREATOR_PROGRAM: &str = "BAGSB9TpGrZxQbEsrEznv5jXXdwyP6AXerN8aVRiAmcv";

/// Meteora dynamic bonding curve program (where graduated Bags tokens trade)
pub const METEORA_DBC_PROGRAM: &str = "dbcij3LWUppWqq96dh6gJWwBifmcGfLSB5D4DuSMaqN";

/// Wrapped SOL mint
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Previously observed Bags token mints, always resolved by the known-address source
pub const SEED_TOKEN_ADDRESSES: &[&str] = &[
    "CxWPdDBqxVo3fnTMRTvNuSrd4gkp78udSrFvkVDBAGS",
    "DEHoLKtoFGvLZeA29jsUHxS14MZhjokD52SABiMfBAGS",
    "BdzqtaLRenyWMntL6Mj5KLVuPehYFrK3PxiBsVnNBAGS",
    "5mwsQcoZVWMYEcG6HzC2jR8QRmyiPvHNzvMaVbQpBAGS",
    "7pskt3A1Zsjhngazam7vHWjWHnfgiRump916Xj7ABAGS",
    "Gj4TowizfdkRJNsTgBEkj2WpBZZmGE7o9nN8q6RhBAGS",
];

/// Search terms used by the keyword search source
pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "bags",
    "BAGS",
    "meteora bags",
    "solana bags",
    "meme bags",
    "token bags",
    "coin bags",
];

/// Common meme name fragments used by the fallback search source
pub const DEFAULT_COMMON_NAMES: &[&str] = &[
    "pepe", "doge", "shib", "wojak", "chad", "mog", "cat", "dog", "frog", "moon",
    "ai", "gpt", "elon", "trump", "biden", "based", "degen", "ape", "monkey",
];

/// Returns the program addresses whose transaction history is mined for new mints
pub fn discovery_programs() -> [&'static str; 2] {
    [BAGS_CREATOR_PROGRAM, METEORA_DBC_PROGRAM]
}
