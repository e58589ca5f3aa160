pub mod network;
pub mod port;
