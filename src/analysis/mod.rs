pub mod fairness;
pub mod spending;
