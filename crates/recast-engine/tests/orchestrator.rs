use recast_engine::{
    BatchOptions, Destination, EngineConfig, Instruction, Orchestrator, Outcome, Pathway, Recipe,
    Result, Stage, TransformerRegistry,
};
use std::fs;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn orchestrator(config: EngineConfig) -> Orchestrator {
    Orchestrator::new(TransformerRegistry::discover(), config)
}

fn bump_ten() -> Pathway {
    Pathway::Recipe(Recipe::new(vec![Instruction::substitution(10, 20, "global")]))
}

#[tokio::test]
async fn test_apply_recipe_to_explicit_destination() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("main.py");
    let target = dir.path().join("out").join("main.py");
    fs::write(&source, "x = 10; output(x)\n")?;

    let report = orchestrator(EngineConfig::default())
        .apply_recipe(&source, &Destination::Path(target.clone()), &bump_ten())
        .await;

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(fs::read_to_string(&target)?, "x = 20; output(x)\n");
    assert_eq!(fs::read_to_string(&source)?, "x = 10; output(x)\n");
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("out"))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_batch_isolates_malformed_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut files = Vec::new();
    for i in 0..4 {
        let path = dir.path().join(format!("good_{}.py", i));
        fs::write(&path, format!("limit = 10\nprint(limit + {})\n", i))?;
        files.push(path);
    }
    let malformed = dir.path().join("bad.py");
    let malformed_bytes = b"def broken(:\n    return 10\n";
    fs::write(&malformed, malformed_bytes)?;
    files.insert(2, malformed.clone());

    let report = orchestrator(EngineConfig::default())
        .apply_batch(&files, &bump_ten(), BatchOptions::new().with_workers(3))
        .await;

    assert_eq!(report.files.len(), 5);
    assert_eq!(report.success_count(), 4);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.files[2].path, malformed);
    assert_eq!(report.files[2].failed_stage, Some(Stage::Analyze));
    assert_eq!(fs::read(&malformed)?, malformed_bytes);
    assert!(!dir.path().join("bad_transformed.py").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("good_3_transformed.py"))?,
        "limit = 20\nprint(limit + 3)\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_batch_in_place_keeps_backups() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let backups = dir.path().join("backups");
    let source = dir.path().join("settings.py");
    fs::write(&source, "import os\nroot = os.path.dirname(__file__)\n")?;

    let config = EngineConfig {
        backup_dir: Some(backups.clone()),
        ..EngineConfig::default()
    };
    let report = orchestrator(config)
        .apply_batch(
            &[source.clone()],
            &Pathway::Transformer("pathlib".to_string()),
            BatchOptions::new().in_place(true),
        )
        .await;

    assert!(report.is_success(), "{:?}", report.files[0].error);
    assert_eq!(
        fs::read_to_string(&source)?,
        "from pathlib import Path\nroot = Path(__file__).parent\n"
    );
    let backup = report.files[0]
        .backup
        .clone()
        .ok_or_else(|| recast_engine::EngineError::Other("no backup recorded".into()))?;
    assert!(backup.starts_with(&backups));
    assert_eq!(
        fs::read_to_string(backup)?,
        "import os\nroot = os.path.dirname(__file__)\n"
    );
    assert_eq!(report.total_modifications(), 3);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_batch_reports_every_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let files: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("f{}.py", i))).collect();
    for file in &files {
        fs::write(file, "x = 10\n")?;
    }

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = orchestrator(EngineConfig::default())
        .apply_batch(&files, &bump_ten(), BatchOptions::new().with_cancel(cancel))
        .await;

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.failure_count(), 3);
    for file in &files {
        assert_eq!(fs::read_to_string(file)?, "x = 10\n");
    }
    assert_eq!(fs::read_dir(dir.path())?.count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_report_json_export() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("a.py");
    fs::write(&source, "x = 10\n")?;

    let report = orchestrator(EngineConfig::default())
        .apply_batch(&[source], &bump_ten(), BatchOptions::new())
        .await;
    let json = report.to_json()?;
    assert!(json.contains("\"outcome\": \"success\""));
    assert!(json.contains("\"modification_count\": 1"));
    Ok(())
}
