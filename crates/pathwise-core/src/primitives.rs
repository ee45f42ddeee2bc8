//! # Engine Primitives
//!
//! Hardcoded constants for the Pathwise sequencing engine.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! Gate-specific thresholds live in each unit's `GateConfig`; the values
//! here apply where no per-unit configuration exists.

/// Mastery every taught node must reach before a skippable unit is skipped.
///
/// Gate mastery thresholds do NOT apply to skipping.
pub const SKIP_MASTERY_THRESHOLD: f64 = 0.7;

/// Human-readable form of [`SKIP_MASTERY_THRESHOLD`], used in skip reasons.
pub const SKIP_THRESHOLD_LABEL: &str = "70%";

/// Number of questions in an injected practice entry.
pub const DEFAULT_PRACTICE_QUESTION_COUNT: u32 = 5;

/// `max_retries` sentinel meaning "retry forever".
pub const UNLIMITED_RETRIES: i32 = -1;

// =============================================================================
// GATE DEFAULTS (used by catalog adapters when a record omits a field)
// =============================================================================

/// Default gate mastery threshold.
pub const DEFAULT_GATE_MASTERY_THRESHOLD: f64 = 0.8;

/// Default minimum number of questions in a gate assessment.
pub const DEFAULT_GATE_MIN_QUESTIONS: u32 = 5;

/// Default number of attempts allowed before the fail strategy applies.
pub const DEFAULT_GATE_MAX_RETRIES: i32 = 3;

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// Magic bytes for the binary session snapshot header ("Pathwise SessioN").
pub const MAGIC_BYTES: &[u8; 4] = b"PWSN";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

/// Length of the snapshot header (magic + version).
pub const HEADER_LEN: usize = 5;

/// Maximum accepted size of an encoded session snapshot (16 MB).
///
/// Validated before any decoding is attempted.
pub const MAX_SNAPSHOT_SIZE: usize = 16 * 1024 * 1024;
