//! CLI exit code registry.
//!
//! Single source of truth for exit codes. They are part of the shell
//! contract and follow the `diff(1)` convention: 0 means the sides agree,
//! 1 means they differ, 2 and up are errors.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success; `compare` found no differences        |
//! | 1    | `compare` found differences                    |
//! | 2    | Usage error (bad arguments, bad profile)       |
//! | 3    | Ingest error (unreadable or undecodable input) |
//! | 4    | Export error (workbook build or write failed)  |

/// Command completed; for `compare`, the sides reconciled fully.
pub const EXIT_SUCCESS: u8 = 0;

/// `compare` found differences: any not-found, cross-matched or
/// quantity-mismatch row on either side.
pub const EXIT_DIFFS: u8 = 1;

/// Bad arguments or an unreadable/invalid column profile.
/// Matches clap's own exit code for argument errors.
pub const EXIT_USAGE: u8 = 2;

/// An input document could not be read or decoded.
pub const EXIT_INGEST: u8 = 3;

/// Workbook rendering or writing the output file failed.
pub const EXIT_EXPORT: u8 = 4;
