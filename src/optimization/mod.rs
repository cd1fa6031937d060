pub mod settle_up;
