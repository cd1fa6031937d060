pub mod currency;
pub mod error;
pub mod expense;
pub mod group;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod payment;
pub mod settlement;
