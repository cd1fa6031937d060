pub mod audit;
pub mod balances;
