//! # pathwise-core
//!
//! The deterministic adaptive playlist engine for Pathwise.
//!
//! Given a course's ordered learning units, a learner's mastery of knowledge
//! nodes and their gate attempt history, the engine decides what the learner
//! sees next: advance, complete, hold at a gate, retry it, skip mastered
//! content, or inject remediation (practice or review) after a failed gate.
//!
//! ## Layout
//!
//! - `types`: domain model and decision vocabulary
//! - `strategy`: the three sequencing policies (static, guided, full)
//! - `engine`: the per-learner session orchestrator
//! - `catalog`: adapters from external course/unit records
//! - `formats` / `storage`: snapshot encoding and the persistence boundary
//!
//! ## Architectural Constraints
//!
//! - Decision functions are total: every context yields exactly one decision
//! - Deterministic: ordered collections only, no randomness, no clocks
//! - The engine performs no I/O and never calls a store
//! - No async, no network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod engine;
pub mod formats;
pub mod primitives;
pub mod storage;
pub mod strategy;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AdaptiveConfig, AdaptiveMode, AdaptiveProfile, DisplayEntry, EnrollmentId, EntryKind,
    FailStrategy, GateConfig, GateResult, InjectedPractice, InjectedReview, LearnerModuleSession,
    LearningUnitId, ModuleId, NodeId, NodeProgress, PathwiseError, PersistedSession,
    PlaylistContext, PlaylistDecision, PlaylistEntry, StaticLearningUnit, UnitType,
};

// =============================================================================
// RE-EXPORTS: Sequencing
// =============================================================================

pub use engine::PlaylistEngine;
pub use strategy::{
    FullStrategy, GuidedStrategy, SequencingStrategy, StaticStrategy, strategy_for_mode,
};

// =============================================================================
// RE-EXPORTS: Adapters, Formats and Storage
// =============================================================================

pub use catalog::{
    CatalogAdaptive, CatalogGate, CatalogRecord, CourseRecord, adaptive_config_from_course,
    units_from_catalog,
};
pub use formats::{PersistenceHeader, session_from_bytes, session_to_bytes};
pub use storage::{MemorySessionStore, RedbSessionStore, SessionStore};

// =============================================================================
// RE-EXPORTS: Primitives
// =============================================================================

pub use primitives::{
    DEFAULT_PRACTICE_QUESTION_COUNT, SKIP_MASTERY_THRESHOLD, UNLIMITED_RETRIES,
};
