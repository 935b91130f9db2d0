pub const ADMIN: &str = "/ext/admin";
pub const HEALTH: &str = "/ext/health";
pub const KEYSTORE: &str = "/ext/keystore";
pub const PLATFORM: &str = "/ext/P";

pub const X_CHAIN_ALIAS: &str = "X";

#[must_use]
pub fn blockchain(chain: &str) -> String {
    format!("/ext/bc/{chain}")
}
