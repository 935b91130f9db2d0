pub mod admin;
pub mod avm;
pub mod health;
pub mod keystore;
pub mod platform;
