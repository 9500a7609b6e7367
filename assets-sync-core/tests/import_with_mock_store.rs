use assets_sync_core::config::ImportRoot;
use assets_sync_core::contract::{AssetRecord, ContentRef, Folder, MockAssetStore, Stage};
use assets_sync_core::error::ImportError;
use assets_sync_core::importer::Importer;
use assets_sync_core::report::FileOutcome;
use chrono::Utc;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn folder(path: &str) -> Folder {
    Folder {
        id: path.split('/').count() as i64,
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        parent_id: 0,
    }
}

fn draft(name: &str) -> AssetRecord {
    AssetRecord {
        id: None,
        name: name.to_string(),
        parent_id: None,
        content: ContentRef {
            hash: "abc123".to_string(),
            size: 3,
            location: format!(".protected/abc123/{name}"),
        },
        stage: Stage::Draft,
        created: Utc::now(),
        last_edited: Utc::now(),
    }
}

fn import_tree(base: &Path, files: &[&str]) {
    for file in files {
        let path = base.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"abc").unwrap();
    }
}

fn expect_happy_writes(store: &mut MockAssetStore, times: usize) {
    let mut next_id = 100;
    store.expect_write().times(times).returning(move |mut r: AssetRecord| {
        next_id += 1;
        r.id = Some(next_id);
        Ok(r)
    });
    store.expect_publish().times(times).returning(|r: &AssetRecord| {
        assert!(r.id.is_some(), "publish must only see written records");
        assert!(r.parent_id.is_some(), "publish must only see parented records");
        let mut live = r.clone();
        live.stage = Stage::Live;
        Ok(live)
    });
}

#[tokio::test]
async fn a_failing_file_does_not_stop_the_others() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("import");
    import_tree(&base, &["a.txt", "b.txt", "c.txt"]);

    let mut store = MockAssetStore::new();
    store
        .expect_find_or_make_folder()
        .returning(|path: &str| Ok(folder(path)));
    store.expect_find_first().returning(|_: &str, _: i64| Ok(None));
    store
        .expect_create_from_local_file()
        .times(3)
        .returning(|_: &Path, name: &str| {
            if name == "b.txt" {
                Err("disk full".into())
            } else {
                Ok(draft(name))
            }
        });
    expect_happy_writes(&mut store, 2);

    let root = ImportRoot::new(&base, "import").unwrap();
    let report = Importer::new(&root, &store).import_all().await.unwrap();

    assert_eq!(report.imported(), 2);
    assert_eq!(report.errors(), 1);
    assert_eq!(report.skipped(), 0);
    let failed = report
        .files
        .iter()
        .find(|f| matches!(f.outcome, FileOutcome::Errored { .. }))
        .unwrap();
    assert_eq!(failed.file_name, "b.txt");
    assert_eq!(
        failed.outcome,
        FileOutcome::Errored {
            message: "disk full".to_string()
        }
    );
}

#[tokio::test]
async fn existing_names_are_skipped_without_creating_anything() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("import");
    import_tree(&base, &["dup.txt", "new.txt"]);

    let mut store = MockAssetStore::new();
    store
        .expect_find_or_make_folder()
        .returning(|path: &str| Ok(folder(path)));
    store
        .expect_find_first()
        .returning(|name: &str, parent_id: i64| {
            if name == "dup.txt" {
                let mut existing = draft(name);
                existing.id = Some(42);
                existing.parent_id = Some(parent_id);
                Ok(Some(existing))
            } else {
                Ok(None)
            }
        });
    store
        .expect_create_from_local_file()
        .times(1)
        .returning(|_: &Path, name: &str| {
            assert_eq!(name, "new.txt");
            Ok(draft(name))
        });
    expect_happy_writes(&mut store, 1);

    let root = ImportRoot::new(&base, "import").unwrap();
    let report = Importer::new(&root, &store).import_all().await.unwrap();

    assert_eq!(report.imported(), 1);
    assert_eq!(report.skipped(), 1);
    let skipped = report.files.iter().find(|f| f.file_name == "dup.txt").unwrap();
    assert_eq!(skipped.outcome, FileOutcome::Skipped { existing_id: 42 });
    assert_eq!(skipped.target_folder_path, "import");
}

#[tokio::test]
async fn folder_resolution_failures_count_as_errors() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("import");
    import_tree(&base, &["broken/x.txt", "ok/y.txt"]);

    let mut store = MockAssetStore::new();
    store.expect_find_or_make_folder().returning(|path: &str| {
        if path == "import/broken" {
            Err("folder table locked".into())
        } else {
            Ok(folder(path))
        }
    });
    store.expect_find_first().returning(|_: &str, _: i64| Ok(None));
    store
        .expect_create_from_local_file()
        .times(1)
        .returning(|_: &Path, name: &str| Ok(draft(name)));
    expect_happy_writes(&mut store, 1);

    let root = ImportRoot::new(&base, "import").unwrap();
    let report = Importer::new(&root, &store).import_all().await.unwrap();

    assert_eq!(report.imported(), 1);
    assert_eq!(report.errors(), 1);
    let broken = report.files.iter().find(|f| f.file_name == "x.txt").unwrap();
    assert_eq!(broken.target_folder_path, "import/broken");
}

#[tokio::test]
async fn missing_source_directory_touches_nothing() {
    let tmp = tempdir().unwrap();
    // No expectations: any store call would panic.
    let store = MockAssetStore::new();

    let root = ImportRoot::new(tmp.path().join("import"), "import").unwrap();
    let err = Importer::new(&root, &store).import_all().await.unwrap_err();

    assert!(matches!(err, ImportError::SourceMissing(_)));
    assert!(err.to_string().contains("Directory does not exist"));
}

#[tokio::test]
async fn a_file_as_source_is_rejected() {
    let tmp = tempdir().unwrap();
    let not_a_dir = tmp.path().join("import");
    fs::write(&not_a_dir, b"oops").unwrap();
    let store = MockAssetStore::new();

    let root = ImportRoot::new(&not_a_dir, "import").unwrap();
    let err = Importer::new(&root, &store).import_all().await.unwrap_err();

    assert!(matches!(err, ImportError::NotADirectory(_)));
}

#[tokio::test]
async fn target_folder_failure_is_fatal() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("import");
    import_tree(&base, &["a.txt"]);

    let mut store = MockAssetStore::new();
    store
        .expect_find_or_make_folder()
        .times(1)
        .returning(|_: &str| Err("store offline".into()));

    let root = ImportRoot::new(&base, "import").unwrap();
    let err = Importer::new(&root, &store).prepare().await.unwrap_err();

    assert!(matches!(err, ImportError::TargetFolder { .. }));
}

#[tokio::test]
async fn run_reports_each_file_as_it_finishes() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("import");
    import_tree(&base, &["2024/event.jpg", "photo.jpg"]);

    let mut store = MockAssetStore::new();
    store
        .expect_find_or_make_folder()
        .returning(|path: &str| Ok(folder(path)));
    store.expect_find_first().returning(|_: &str, _: i64| Ok(None));
    store
        .expect_create_from_local_file()
        .returning(|_: &Path, name: &str| Ok(draft(name)));
    expect_happy_writes(&mut store, 2);

    let root = ImportRoot::new(&base, "import").unwrap();
    let importer = Importer::new(&root, &store);
    let prepared = importer.prepare().await.unwrap();
    assert_eq!(prepared.files.len(), 2);
    assert_eq!(prepared.target.path, "import");

    let mut lines = Vec::new();
    let report = importer
        .run(&prepared, |file| lines.push(file.to_string()))
        .await;

    assert_eq!(report.imported(), 2);
    assert_eq!(
        lines,
        vec![
            "✓ IMPORTED: import/2024/event.jpg (ID: 101)".to_string(),
            "✓ IMPORTED: import/photo.jpg (ID: 102)".to_string(),
        ]
    );
}

#[tokio::test]
async fn a_failing_write_is_counted_and_the_next_file_still_runs() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("import");
    import_tree(&base, &["a.txt", "b.txt"]);

    let mut store = MockAssetStore::new();
    store
        .expect_find_or_make_folder()
        .returning(|path: &str| Ok(folder(path)));
    store.expect_find_first().returning(|_: &str, _: i64| Ok(None));
    store
        .expect_create_from_local_file()
        .times(2)
        .returning(|_: &Path, name: &str| Ok(draft(name)));
    store
        .expect_write()
        .times(2)
        .returning(|mut r: AssetRecord| {
            if r.name == "a.txt" {
                Err("constraint violation".into())
            } else {
                r.id = Some(7);
                Ok(r)
            }
        });
    store.expect_publish().times(1).returning(|r: &AssetRecord| {
        assert_eq!(r.name, "b.txt");
        let mut live = r.clone();
        live.stage = Stage::Live;
        Ok(live)
    });

    let root = ImportRoot::new(&base, "import").unwrap();
    let report = Importer::new(&root, &store).import_all().await.unwrap();

    assert_eq!(report.imported(), 1);
    assert_eq!(report.errors(), 1);
    assert_eq!(report.files[0].file_name, "a.txt");
    assert_eq!(
        report.files[0].outcome,
        FileOutcome::Errored {
            message: "constraint violation".to_string()
        }
    );
    assert_eq!(report.files[1].outcome, FileOutcome::Imported { record_id: 7 });
}

#[tokio::test]
async fn a_failing_publish_is_counted_and_the_next_file_still_runs() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("import");
    import_tree(&base, &["a.txt", "b.txt"]);

    let mut store = MockAssetStore::new();
    store
        .expect_find_or_make_folder()
        .returning(|path: &str| Ok(folder(path)));
    store.expect_find_first().returning(|_: &str, _: i64| Ok(None));
    store
        .expect_create_from_local_file()
        .times(2)
        .returning(|_: &Path, name: &str| Ok(draft(name)));
    let mut next_id = 0;
    store
        .expect_write()
        .times(2)
        .returning(move |mut r: AssetRecord| {
            next_id += 1;
            r.id = Some(next_id);
            Ok(r)
        });
    store.expect_publish().times(2).returning(|r: &AssetRecord| {
        if r.name == "a.txt" {
            Err("live stage unavailable".into())
        } else {
            let mut live = r.clone();
            live.stage = Stage::Live;
            Ok(live)
        }
    });

    let root = ImportRoot::new(&base, "import").unwrap();
    let report = Importer::new(&root, &store).import_all().await.unwrap();

    assert_eq!(report.imported(), 1);
    assert_eq!(report.errors(), 1);
    assert_eq!(report.skipped(), 0);
    assert_eq!(
        report.files[0].outcome,
        FileOutcome::Errored {
            message: "live stage unavailable".to_string()
        }
    );
    assert_eq!(report.files[1].outcome, FileOutcome::Imported { record_id: 2 });
}
