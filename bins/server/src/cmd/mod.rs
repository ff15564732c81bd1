pub mod provision;
pub mod seed;
pub mod serve;
