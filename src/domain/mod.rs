pub mod account;
pub mod error;
pub mod plan;
pub mod schedule;
