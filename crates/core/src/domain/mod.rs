pub mod contract;
pub mod listing;
