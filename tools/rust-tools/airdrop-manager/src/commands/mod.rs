mod command;

pub mod claim;
pub mod network;
pub mod token;
pub mod vault;
pub mod wallet;

pub use command::Command;
