//! Domain Layer - Core token discovery logic
//!
//! Pure types and functions with no I/O. All upstream interactions happen
//! through the ports layer.
//!
//! - `token`: canonical token record and age bucketing
//! - `suffix`: naming-suffix predicate and address shape check
//! - `normalizer`: raw pair record to canonical token
//! - `ranking`: sort fields, views and the stable ranker
//! - `address_book`: shared known-address list
//! - `fees`: launchpad creator, claim and fee recipient shaping
//! - `format`: display formatting
//! - `known_programs`: program ids and seed lists

pub mod address_book;
pub mod fees;
pub mod format;
pub mod known_programs;
pub mod normalizer;
pub mod ranking;
pub mod suffix;
pub mod token;

pub use address_book::KnownAddressBook;
pub use fees::{ClaimStat, CreatorRecord, FeeRecipient, LifetimeFees, TokenDetails};
pub use normalizer::normalize;
pub use ranking::{filter_tokens, rank_tokens, RankingParseError, SortDirection, SortField, View};
pub use suffix::{is_valid_address, SuffixFilter};
pub use token::{format_age, Social, Token, TxnCount, Website};
