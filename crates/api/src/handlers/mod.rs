pub mod account;
pub mod activity;
pub mod contact;
pub mod deal;
