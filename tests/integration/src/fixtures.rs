//! Test fixtures
//!
//! The identities every test gateway starts with.

use dm_core::{Snowflake, User};

/// Secret shared by the test gateway and the tokens minted for it
pub const TEST_JWT_SECRET: &str = "integration-test-secret-key";

pub fn alice() -> User {
    User::new(Snowflake::new(1), "alice", "Alice Liddell")
}

pub fn bob() -> User {
    User::new(Snowflake::new(2), "bob", "Bob Builder")
}

pub fn dave() -> User {
    User::new(Snowflake::new(3), "dave", "Dave Bowman").with_profile_image("dave.png")
}

/// Known to nobody: tokens for this user fail to resolve
pub fn mallory() -> User {
    User::new(Snowflake::new(66), "mallory", "Mallory")
}

pub fn known_users() -> Vec<User> {
    vec![alice(), bob(), dave()]
}
