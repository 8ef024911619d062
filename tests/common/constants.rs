//! Shared constants for end-to-end tests

// ============================================================================
// Seed set
// ============================================================================

/// Ids of the seed notifications, in seed order
pub const SEED_IDS: [&str; 7] = [
    "n-001", "n-002", "n-003", "n-004", "n-005", "n-006", "n-007",
];

/// Number of unread entries in the seed set
pub const SEED_UNREAD: usize = 4;

// ============================================================================
// Backend data
// ============================================================================

/// Test user scoping backend requests
pub const TEST_USER_ID: &str = "user-17";

/// Remote notification ids served by the test backend by default
pub const REMOTE_ID_1: &str = "srv-101";
pub const REMOTE_ID_2: &str = "srv-102";
