//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::manifest::CourseManifest;
use pathwise_core::{
    EnrollmentId, GateResult, LearningUnitId, ModuleId, NodeId, NodeProgress, PathwiseError,
    PersistedSession, PlaylistDecision, PlaylistEngine, PlaylistEntry, RedbSessionStore,
    SessionStore, primitives::DEFAULT_GATE_MASTERY_THRESHOLD,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for session import (16 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), PathwiseError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| PathwiseError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(PathwiseError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path: symlinks and ".." are resolved, and the target
/// must be a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, PathwiseError> {
    let canonical = path.canonicalize().map_err(|e| {
        PathwiseError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(PathwiseError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, PathwiseError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        PathwiseError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(PathwiseError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| PathwiseError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// COMMAND CONTEXT
// =============================================================================

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub database: PathBuf,
    pub manifest: PathBuf,
    pub enrollment: EnrollmentId,
    pub json_mode: bool,
}

/// Arguments of the `gate` command.
#[derive(Debug, Clone)]
pub struct GateArgs {
    pub score: f64,
    pub unit: Option<String>,
    pub passed: Option<bool>,
    pub failed: Vec<String>,
    pub attempt: Option<u32>,
}

/// A stored session restored into an engine, plus what is needed to save it.
struct Loaded {
    manifest: CourseManifest,
    store: RedbSessionStore,
    engine: PlaylistEngine,
    revision: u64,
}

impl Loaded {
    fn open(ctx: &CommandContext) -> Result<Self, PathwiseError> {
        let manifest = CourseManifest::load(&ctx.manifest)?;
        let store = RedbSessionStore::open(&ctx.database)?;
        let persisted = store.load_required(&ctx.enrollment, &manifest.module_id())?;
        let revision = persisted.revision;
        let engine = PlaylistEngine::restore(manifest.adaptive_config(), manifest.units()?, persisted);
        Ok(Self {
            manifest,
            store,
            engine,
            revision,
        })
    }

    fn save(&mut self) -> Result<PersistedSession, PathwiseError> {
        let persisted = self.store.save(&self.engine.session())?;
        self.revision = persisted.revision;
        Ok(persisted)
    }
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn describe_decision(decision: &PlaylistDecision) -> String {
    match decision {
        PlaylistDecision::Advance => "advance".to_string(),
        PlaylistDecision::Complete => "complete".to_string(),
        PlaylistDecision::Hold { message } => format!("hold: {}", message),
        PlaylistDecision::Retry { lu_id } => format!("retry gate {}", lu_id),
        PlaylistDecision::Skip { reason } => format!("skip: {}", reason),
        PlaylistDecision::Inject { entries } => {
            let titles: Vec<String> = entries.iter().map(PlaylistEntry::title).collect();
            format!("inject {} entr(ies): {}", entries.len(), titles.join("; "))
        }
    }
}

fn describe_position(engine: &PlaylistEngine) -> String {
    let session = engine.session();
    if session.is_complete {
        return "Module complete".to_string();
    }
    match engine.current_entry() {
        Some(entry) => format!(
            "Now at [{}/{}] {}",
            session.current_index,
            session.playlist.len(),
            entry.title()
        ),
        None => format!("Past the last entry ({} entries)", session.playlist.len()),
    }
}

fn position_json(engine: &PlaylistEngine, revision: u64) -> serde_json::Value {
    let session = engine.session();
    serde_json::json!({
        "current_index": session.current_index,
        "current_entry": engine.current_entry().map(PlaylistEntry::id),
        "entries": session.playlist.len(),
        "is_complete": session.is_complete,
        "revision": revision,
    })
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Start a new session for the enrollment.
pub fn cmd_init(ctx: &CommandContext, force: bool) -> Result<(), PathwiseError> {
    let manifest = CourseManifest::load(&ctx.manifest)?;
    let module_id = manifest.module_id();
    let mut store = RedbSessionStore::open(&ctx.database)?;

    if store.load(&ctx.enrollment, &module_id)?.is_some() {
        if !force {
            return Err(PathwiseError::InvalidArgument(format!(
                "Session {}/{} already exists. Use --force to replace it.",
                ctx.enrollment, module_id
            )));
        }
        store.remove(&ctx.enrollment, &module_id)?;
        tracing::info!(enrollment = %ctx.enrollment, module = %module_id, "replaced existing session");
    }

    let engine = PlaylistEngine::new(
        manifest.adaptive_config(),
        manifest.units()?,
        ctx.enrollment.clone(),
        module_id,
        None,
    );
    let persisted = store.save(&engine.session())?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "enrollment": ctx.enrollment,
            "module": persisted.module_id,
            "strategy": engine.strategy_name(),
            "position": position_json(&engine, persisted.revision),
        }));
        return Ok(());
    }

    println!(
        "Initialized session {}/{} ({}, {} strategy)",
        ctx.enrollment,
        persisted.module_id,
        manifest.title(),
        engine.strategy_name()
    );
    println!("{}", describe_position(&engine));
    Ok(())
}

// =============================================================================
// DECISION COMMANDS
// =============================================================================

/// Show the next decision without applying it.
pub fn cmd_next(ctx: &CommandContext) -> Result<(), PathwiseError> {
    let loaded = Loaded::open(ctx)?;
    let decision = loaded.engine.resolve_next();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "decision": decision,
            "position": position_json(&loaded.engine, loaded.revision),
        }));
        return Ok(());
    }

    println!("Next: {}", describe_decision(&decision));
    println!("{}", describe_position(&loaded.engine));
    Ok(())
}

/// Resolve and apply the next decision.
pub fn cmd_step(ctx: &CommandContext) -> Result<(), PathwiseError> {
    let mut loaded = Loaded::open(ctx)?;
    let (decision, _) = loaded.engine.step();
    let persisted = loaded.save()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "decision": decision,
            "position": position_json(&loaded.engine, persisted.revision),
        }));
        return Ok(());
    }

    println!("Applied: {}", describe_decision(&decision));
    println!("{}", describe_position(&loaded.engine));
    Ok(())
}

// =============================================================================
// RECORDING COMMANDS
// =============================================================================

/// Record a gate attempt.
pub fn cmd_gate(ctx: &CommandContext, args: &GateArgs) -> Result<(), PathwiseError> {
    if !args.score.is_finite() {
        return Err(PathwiseError::InvalidArgument(format!(
            "score must be a finite number, got {}",
            args.score
        )));
    }

    let mut loaded = Loaded::open(ctx)?;
    let unit_id = match &args.unit {
        Some(id) => LearningUnitId::new(id.clone()),
        None => loaded
            .engine
            .current_entry()
            .and_then(PlaylistEntry::as_static)
            .filter(|unit| unit.is_gate())
            .map(|unit| unit.id.clone())
            .ok_or_else(|| {
                PathwiseError::InvalidArgument(
                    "the current entry is not a gate; pass --unit".to_string(),
                )
            })?,
    };

    let unit = loaded
        .engine
        .static_sequence()
        .iter()
        .find(|unit| unit.id == unit_id);
    if unit.is_none() {
        tracing::warn!(unit = %unit_id, "recording a result for a unit not in the manifest");
    }
    let threshold = unit
        .and_then(|unit| unit.gate_config())
        .map_or(DEFAULT_GATE_MASTERY_THRESHOLD, |config| config.mastery_threshold);

    let passed = args.passed.unwrap_or(args.score >= threshold);
    let attempt = args.attempt.unwrap_or_else(|| {
        let used = loaded
            .engine
            .session()
            .gate_results
            .get(&unit_id)
            .map_or(0, Vec::len);
        u32::try_from(used).unwrap_or(u32::MAX).saturating_add(1)
    });

    let result = if passed {
        GateResult::passed(unit_id, args.score, attempt)
    } else {
        let failed = args.failed.iter().map(|id| NodeId::new(id.as_str())).collect();
        GateResult::failed(unit_id, args.score, attempt, failed)
    };
    let recorded = result.clone();
    loaded.engine.record_gate_result(result);
    let persisted = loaded.save()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "result": recorded,
            "next": loaded.engine.resolve_next(),
            "revision": persisted.revision,
        }));
        return Ok(());
    }

    println!(
        "Recorded attempt {} for gate {}: {} (score {})",
        recorded.attempt_number,
        recorded.lu_id,
        if recorded.passed { "passed" } else { "failed" },
        recorded.score
    );
    println!("Next: {}", describe_decision(&loaded.engine.resolve_next()));
    Ok(())
}

/// Record mastery of a knowledge node.
pub fn cmd_mastery(
    ctx: &CommandContext,
    node: &str,
    mastery: f64,
    attempts: u32,
) -> Result<(), PathwiseError> {
    if node.trim().is_empty() {
        return Err(PathwiseError::InvalidArgument(
            "node id must not be empty".to_string(),
        ));
    }

    let mut loaded = Loaded::open(ctx)?;
    let session = loaded
        .engine
        .update_node_progress(NodeId::new(node), NodeProgress::new(mastery, attempts));
    let stored = session
        .node_progress
        .get(&NodeId::new(node))
        .copied()
        .unwrap_or_default();
    let persisted = loaded.save()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "node": node,
            "progress": stored,
            "revision": persisted.revision,
        }));
        return Ok(());
    }

    println!(
        "Node {}: mastery {} after {} attempt(s)",
        node, stored.mastery, stored.attempts
    );
    Ok(())
}

// =============================================================================
// NAVIGATION COMMANDS
// =============================================================================

/// Jump to a playlist entry.
pub fn cmd_goto(ctx: &CommandContext, index: usize) -> Result<(), PathwiseError> {
    let mut loaded = Loaded::open(ctx)?;
    let len = loaded.engine.session().playlist.len();
    if index >= len {
        return Err(PathwiseError::InvalidArgument(format!(
            "index {} is out of range (playlist has {} entries)",
            index, len
        )));
    }

    let session = loaded.engine.go_to_index(index);
    let reached = session.current_index;
    let persisted = loaded.save()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "requested": index,
            "position": position_json(&loaded.engine, persisted.revision),
        }));
        return Ok(());
    }

    if reached != index {
        println!(
            "Cannot move to {}: stopped at {} (navigation limit {})",
            index,
            reached,
            loaded.engine.navigation_limit()
        );
    }
    println!("{}", describe_position(&loaded.engine));
    Ok(())
}

/// Show the playlist.
pub fn cmd_show(ctx: &CommandContext) -> Result<(), PathwiseError> {
    let loaded = Loaded::open(ctx)?;
    let rows = loaded.engine.display_entries();

    if ctx.json_mode {
        print_json(&serde_json::json!({ "entries": rows }));
        return Ok(());
    }

    println!("{}", loaded.manifest.title());
    println!("{}", "=".repeat(loaded.manifest.title().chars().count().max(8)));
    for row in &rows {
        let marker = if row.is_current {
            ">"
        } else if row.is_completed {
            "x"
        } else if row.is_locked {
            "#"
        } else {
            " "
        };
        let gate = if row.is_gate { " [gate]" } else { "" };
        println!("{} {:>3}  {}{}", marker, row.index, row.title, gate);
    }
    Ok(())
}

/// Show session status.
pub fn cmd_status(ctx: &CommandContext) -> Result<(), PathwiseError> {
    let loaded = Loaded::open(ctx)?;
    let session = loaded.engine.session();
    let attempts: usize = session.gate_results.values().map(Vec::len).sum();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "database": ctx.database.to_string_lossy(),
            "enrollment": session.enrollment_id,
            "module": session.module_id,
            "strategy": loaded.engine.strategy_name(),
            "injected_entries": session.injected_count(),
            "nodes_tracked": session.node_progress.len(),
            "gate_attempts": attempts,
            "position": position_json(&loaded.engine, loaded.revision),
        }));
        return Ok(());
    }

    println!("Pathwise Session Status");
    println!("=======================");
    println!("Database:   {:?}", ctx.database);
    println!("Course:     {}", loaded.manifest.title());
    println!("Session:    {}/{}", session.enrollment_id, session.module_id);
    println!("Strategy:   {}", loaded.engine.strategy_name());
    println!("Revision:   {}", loaded.revision);
    println!();
    println!("Entries:        {}", session.playlist.len());
    println!("Injected:       {}", session.injected_count());
    println!("Nodes tracked:  {}", session.node_progress.len());
    println!("Gate attempts:  {}", attempts);
    println!("{}", describe_position(&loaded.engine));
    Ok(())
}

// =============================================================================
// EXPORT / IMPORT / RESET
// =============================================================================

/// Export the session as JSON.
pub fn cmd_export(ctx: &CommandContext, output: &Path) -> Result<(), PathwiseError> {
    let validated_output = validate_output_path(output)?;
    let loaded = Loaded::open(ctx)?;

    let persisted = PersistedSession {
        revision: loaded.revision,
        ..loaded.engine.to_persisted()
    };
    let data = serde_json::to_vec_pretty(&persisted)
        .map_err(|e| PathwiseError::SerializationError(e.to_string()))?;

    std::fs::write(&validated_output, &data)
        .map_err(|e| PathwiseError::IoError(format!("Write file: {}", e)))?;

    println!("Exported {} bytes to {:?}", data.len(), validated_output);
    Ok(())
}

/// Import a session from JSON.
///
/// The snapshot must belong to the manifest's module. It is stored under
/// its own enrollment id.
pub fn cmd_import(ctx: &CommandContext, input: &Path) -> Result<(), PathwiseError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| PathwiseError::IoError(format!("Read file: {}", e)))?;
    let persisted: PersistedSession = serde_json::from_slice(&data)
        .map_err(|e| PathwiseError::DeserializationError(e.to_string()))?;

    let manifest = CourseManifest::load(&ctx.manifest)?;
    let module_id: ModuleId = manifest.module_id();
    if persisted.session.module_id != module_id {
        return Err(PathwiseError::InvalidArgument(format!(
            "snapshot belongs to module {}, manifest describes {}",
            persisted.session.module_id, module_id
        )));
    }

    let engine = PlaylistEngine::restore(manifest.adaptive_config(), manifest.units()?, persisted);
    let mut store = RedbSessionStore::open(&ctx.database)?;
    let saved = store.save(&engine.session())?;

    println!(
        "Imported session {}/{}: {} entries, revision {}",
        saved.enrollment_id,
        saved.module_id,
        saved.session.playlist.len(),
        saved.revision
    );
    Ok(())
}

/// Rebuild the playlist from the manifest, keeping mastery and gate history.
pub fn cmd_reset(ctx: &CommandContext) -> Result<(), PathwiseError> {
    let mut loaded = Loaded::open(ctx)?;
    let dropped = loaded.engine.session().injected_count();
    loaded.engine.initialize_playlist();
    let persisted = loaded.save()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "dropped_injected_entries": dropped,
            "position": position_json(&loaded.engine, persisted.revision),
        }));
        return Ok(());
    }

    println!("Playlist rebuilt; {} injected entr(ies) dropped", dropped);
    println!("{}", describe_position(&loaded.engine));
    Ok(())
}
