//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{MoneyError, from_minor, round_money, to_minor};
pub use pagination::{PageRequest, PageResponse};
