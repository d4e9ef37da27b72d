//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of the
//! shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range | Domain    | Description                              |
//! |-------|-----------|------------------------------------------|
//! | 0     | Universal | Success                                  |
//! | 1     | Universal | General error (unspecified)              |
//! | 2     | Universal | CLI usage error (bad args, missing file) |
//! | 3-9   | receive   | Reconciliation session codes             |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - failure with no more specific code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, such as a config path that does not exist.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Receive (3-9)
// =============================================================================

/// Validation blocks submission: unaccounted quantities, over-limit buckets,
/// or missing issue notes on a selected group.
pub const EXIT_RECEIVE_BLOCKED: u8 = 3;

/// Session config failed to parse or references unknown groups/buckets.
pub const EXIT_RECEIVE_INVALID_CONFIG: u8 = 4;

/// Runtime failure: unreadable input files, bad CSV rows, write errors.
pub const EXIT_RECEIVE_RUNTIME: u8 = 5;
