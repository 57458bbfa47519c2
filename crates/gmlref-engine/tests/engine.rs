//! End-to-end tests for the refactoring engine over fake collaborators
//!
//! The project index stands in for the language frontend and an in-memory
//! workspace stands in for the disk, exactly the seams the engine is built
//! against. Occurrence offsets are byte offsets into the seeded sources.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gmlref_core::WorkspaceEdit;
use gmlref_engine::{
    ApplyOptions, ApplyStatus, ExecuteOptions, RefactorEngine, RefactorError, RenameRequest,
};
use gmlref_semantic::{
    DiskWorkspace, MemoryWorkspace, Occurrence, OccurrenceRole, ProjectIndex, Symbol, SymbolId,
    SymbolKind, TranspileError, Transpiler, WorkspaceIo,
};

const FILE_A: &str = "scripts/scr_main.gml";
const FILE_B: &str = "objects/obj_player.gml";

/// `scr_old` defined in FILE_A at 9..16 and referenced in FILE_B at 13..20
fn seeded_workspace() -> MemoryWorkspace {
    let io = MemoryWorkspace::new();
    io.insert(FILE_A, "function scr_old() {\n    return 1;\n}\n");
    io.insert(FILE_B, "var result = scr_old();\n");
    io
}

/// Index describing the seeded project for whichever name the script
/// currently has
fn seeded_index(name: &str) -> ProjectIndex {
    let mut index = ProjectIndex::new();
    let id = SymbolId::new(format!("gml/script/{name}"));
    index
        .add_symbol(Symbol {
            id: id.clone(),
            name: name.to_string(),
            kind: SymbolKind::Script,
            file_path: FILE_A.into(),
            scope: index.global_scope(),
        })
        .unwrap();
    index
        .add_occurrence(Occurrence {
            symbol_id: id.clone(),
            file_path: FILE_A.into(),
            start_offset: 9,
            end_offset: 16,
            role: OccurrenceRole::Definition,
            scope: index.global_scope(),
        })
        .unwrap();
    index
        .add_occurrence(Occurrence {
            symbol_id: id,
            file_path: FILE_B.into(),
            start_offset: 13,
            end_offset: 20,
            role: OccurrenceRole::Reference,
            scope: index.global_scope(),
        })
        .unwrap();
    index
}

fn engine(index: ProjectIndex, io: Arc<MemoryWorkspace>) -> RefactorEngine {
    let index = Arc::new(index);
    RefactorEngine::new(index.clone(), index, io)
}

struct FakeTranspiler;

#[async_trait::async_trait]
impl Transpiler for FakeTranspiler {
    async fn transpile(&self, path: &Path, source: &str) -> Result<String, TranspileError> {
        if source.contains("@syntax-error@") {
            return Err(TranspileError::new(path, "unexpected token"));
        }
        Ok(format!("vm[{}]", source))
    }
}

/// Wrapper that counts writes, for dry-run purity assertions
struct CountingIo {
    inner: Arc<MemoryWorkspace>,
    writes: AtomicUsize,
}

#[async_trait::async_trait]
impl WorkspaceIo for CountingIo {
    async fn read_file(&self, path: &Path) -> std::io::Result<String> {
        self.inner.read_file(path).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_file(path, contents).await
    }
}

#[test]
fn plan_rename_replaces_each_occurrence_span() {
    let io = Arc::new(seeded_workspace());
    let engine = engine(seeded_index("scr_old"), io);

    let workspace = engine
        .plan_rename(&RenameRequest::new("gml/script/scr_old", "scr_new"))
        .unwrap();

    assert_eq!(workspace.len(), 2);
    for edit in workspace.edits() {
        assert_eq!(edit.span_len(), 7);
        assert_eq!(edit.new_text, "scr_new");
    }
}

#[tokio::test]
async fn rename_round_trip_restores_sources() {
    let io = Arc::new(seeded_workspace());
    let original = io.snapshot();

    let forward = engine(seeded_index("scr_old"), io.clone());
    forward
        .execute_rename(
            &RenameRequest::new("gml/script/scr_old", "scr_new"),
            &ExecuteOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        io.contents(Path::new(FILE_A)).unwrap(),
        "function scr_new() {\n    return 1;\n}\n"
    );

    // Occurrences are stale after the edit; the frontend re-analyzes and
    // produces a fresh index for the renamed symbol
    let backward = engine(seeded_index("scr_new"), io.clone());
    backward
        .execute_rename(
            &RenameRequest::new("gml/script/scr_new", "scr_old"),
            &ExecuteOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(io.snapshot(), original);
}

#[tokio::test]
async fn batch_with_invalid_request_applies_nothing() {
    let io = Arc::new(seeded_workspace());
    let before = io.snapshot();
    let engine = engine(seeded_index("scr_old"), io.clone());

    let requests = [
        RenameRequest::new("gml/script/scr_old", "scr_new"),
        RenameRequest::new("gml/script/does_not_exist", "scr_other"),
    ];
    let err = engine
        .execute_batch_rename(&requests, &ExecuteOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RefactorError::SymbolNotFound { .. }));
    assert_eq!(io.snapshot(), before);
}

#[tokio::test]
async fn execute_prepares_updates_and_patches() {
    let io = Arc::new(seeded_workspace());
    let index = Arc::new(seeded_index("scr_old"));
    let engine = RefactorEngine::new(index.clone(), index, io.clone())
        .with_transpiler(Arc::new(FakeTranspiler));

    let outcome = engine
        .execute_rename(
            &RenameRequest::new("gml/script/scr_old", "scr_new"),
            &ExecuteOptions {
                prepare_hot_reload: true,
                check_transpiler: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // One update per (symbol, file): the definition's file and the
    // referencing file both changed
    assert_eq!(outcome.hot_reload.len(), 2);
    assert_eq!(outcome.patches.len(), 2);
    // Patches are transpiled from the post-edit sources
    for patch in &outcome.patches {
        assert!(patch.patch.contains("scr_new"), "stale patch: {:?}", patch);
    }
    assert!(outcome
        .apply_results
        .iter()
        .all(|r| r.status == ApplyStatus::Applied));
}

#[tokio::test]
async fn hot_reload_validation_is_data_not_error() {
    let io = Arc::new(seeded_workspace());
    let mut index = ProjectIndex::new();
    let id = SymbolId::from("gml/macro/MAX_HP");
    index
        .add_symbol(Symbol {
            id: id.clone(),
            name: "MAX_HP".to_string(),
            kind: SymbolKind::Macro,
            file_path: FILE_A.into(),
            scope: index.global_scope(),
        })
        .unwrap();
    index
        .add_occurrence(Occurrence {
            symbol_id: id,
            file_path: FILE_A.into(),
            start_offset: 9,
            end_offset: 15,
            role: OccurrenceRole::Definition,
            scope: index.global_scope(),
        })
        .unwrap();
    let engine = engine(index, io);

    let mut workspace = WorkspaceEdit::new();
    workspace
        .add_edit(gmlref_core::TextEdit::new(FILE_A, 9, 15, "HP_CAP").unwrap())
        .unwrap();

    let report = engine
        .validate_hot_reload_compatibility(&workspace, false)
        .await;
    assert!(!report.valid);
    assert!(report.errors[0].contains("restart"));

    // The composed execute path surfaces the same report as a typed error
    let err = engine
        .execute_rename(
            &RenameRequest::new("gml/macro/MAX_HP", "HP_CAP"),
            &ExecuteOptions {
                prepare_hot_reload: true,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RefactorError::HotReloadIncompatible { .. }));
}

#[tokio::test]
async fn dry_run_never_writes() {
    let inner = Arc::new(seeded_workspace());
    let counting = Arc::new(CountingIo {
        inner: inner.clone(),
        writes: AtomicUsize::new(0),
    });
    let index = Arc::new(seeded_index("scr_old"));
    let engine = RefactorEngine::new(index.clone(), index, counting.clone());

    let outcome = engine
        .execute_rename(
            &RenameRequest::new("gml/script/scr_old", "scr_new"),
            &ExecuteOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(counting.writes.load(Ordering::SeqCst), 0);
    assert!(outcome
        .apply_results
        .iter()
        .all(|r| r.status == ApplyStatus::Skipped));
    assert_eq!(inner.contents(Path::new(FILE_B)).unwrap(), "var result = scr_old();\n");
}

#[tokio::test]
async fn apply_failure_is_isolated_per_file() {
    let io = Arc::new(seeded_workspace());
    let mut index = seeded_index("scr_old");
    let global = index.global_scope();
    // A third occurrence in a file the workspace does not contain
    index
        .add_occurrence(Occurrence {
            symbol_id: SymbolId::from("gml/script/scr_old"),
            file_path: "rooms/rm_title.gml".into(),
            start_offset: 0,
            end_offset: 7,
            role: OccurrenceRole::Reference,
            scope: global,
        })
        .unwrap();
    let engine = engine(index, io.clone());

    let workspace = engine
        .plan_rename(&RenameRequest::new("gml/script/scr_old", "scr_new"))
        .unwrap();
    let results = engine
        .apply_workspace_edit(&workspace, &ApplyOptions::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.status == ApplyStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].file_path, Path::new("rooms/rm_title.gml"));
    // The readable files were still renamed
    assert!(io
        .contents(Path::new(FILE_A))
        .unwrap()
        .contains("scr_new"));
}

#[tokio::test]
async fn validate_rename_detects_stale_edits() {
    let io = Arc::new(seeded_workspace());
    let stale_engine = engine(seeded_index("scr_old"), io.clone());
    let workspace = stale_engine
        .plan_rename(&RenameRequest::new("gml/script/scr_old", "scr_new"))
        .unwrap();

    // Same symbol, but the frontend now reports the reference eight bytes
    // further along (someone edited FILE_B since planning)
    let mut moved = ProjectIndex::new();
    let id = SymbolId::from("gml/script/scr_old");
    moved
        .add_symbol(Symbol {
            id: id.clone(),
            name: "scr_old".to_string(),
            kind: SymbolKind::Script,
            file_path: FILE_A.into(),
            scope: moved.global_scope(),
        })
        .unwrap();
    moved
        .add_occurrence(Occurrence {
            symbol_id: id.clone(),
            file_path: FILE_A.into(),
            start_offset: 9,
            end_offset: 16,
            role: OccurrenceRole::Definition,
            scope: moved.global_scope(),
        })
        .unwrap();
    moved
        .add_occurrence(Occurrence {
            symbol_id: id,
            file_path: FILE_B.into(),
            start_offset: 21,
            end_offset: 28,
            role: OccurrenceRole::Reference,
            scope: moved.global_scope(),
        })
        .unwrap();
    let fresh_engine = engine(moved, io);

    let err = fresh_engine
        .validate_rename(
            &RenameRequest::new("gml/script/scr_old", "scr_new"),
            &workspace,
        )
        .unwrap_err();
    match err {
        RefactorError::StaleEdit { file, offset } => {
            assert_eq!(file, Path::new(FILE_B));
            assert_eq!(offset, 13);
        }
        other => panic!("expected stale edit, got {other:?}"),
    }
}

#[tokio::test]
async fn disk_workspace_applies_to_real_files() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    let objects = dir.path().join("objects");
    std::fs::create_dir_all(&scripts).unwrap();
    std::fs::create_dir_all(&objects).unwrap();
    std::fs::write(
        dir.path().join(FILE_A),
        "function scr_old() {\n    return 1;\n}\n",
    )
    .unwrap();
    std::fs::write(dir.path().join(FILE_B), "var result = scr_old();\n").unwrap();

    let io = Arc::new(DiskWorkspace::new(dir.path()));
    let index = Arc::new(seeded_index("scr_old"));
    let engine = RefactorEngine::new(index.clone(), index, io);

    let outcome = engine
        .execute_rename(
            &RenameRequest::new("gml/script/scr_old", "scr_new"),
            &ExecuteOptions::default(),
        )
        .await
        .unwrap();

    assert!(outcome
        .apply_results
        .iter()
        .all(|r| r.status == ApplyStatus::Applied));
    let on_disk = std::fs::read_to_string(dir.path().join(FILE_A)).unwrap();
    assert_eq!(on_disk, "function scr_new() {\n    return 1;\n}\n");
}
