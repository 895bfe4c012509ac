pub mod reputation;
pub mod state;
pub mod toggle;
