mod client;
pub use client::*;

mod server;
pub use server::*;
