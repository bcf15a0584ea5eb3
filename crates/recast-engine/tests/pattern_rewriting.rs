use recast_engine::{PathlibRules, PatternRewriter, PrintToLoggingRules, Result, Transformer};

fn pathlib(source: &str) -> Result<String> {
    PatternRewriter::new(PathlibRules).apply(source)
}

const PATH_IMPORT: &str = "from pathlib import Path";

#[test]
fn test_three_argument_join_retires_unused_import() -> Result<()> {
    let output = pathlib("import os\n\nconfig = os.path.join(base, 'etc', name)\n")?;
    assert_eq!(output, "from pathlib import Path\n\nconfig = Path(base) / 'etc' / name\n");
    assert_eq!(output.matches(PATH_IMPORT).count(), 1);
    Ok(())
}

#[test]
fn test_import_added_only_when_a_rule_fires() -> Result<()> {
    let untouched = "import os.path\nsep = os.path.sep\n";
    assert_eq!(pathlib(untouched)?, untouched);

    let output = pathlib("import os.path\nif os.path.exists(p):\n    q = os.path.abspath(p)\n")?;
    assert_eq!(output.matches(PATH_IMPORT).count(), 1);
    assert_eq!(output, "from pathlib import Path\nif Path(p).exists():\n    q = Path(p).resolve()\n");
    Ok(())
}

#[test]
fn test_existing_modern_import_is_reused() -> Result<()> {
    let output = pathlib("from pathlib import Path\nimport os\np = os.path.join(a, b)\n")?;
    assert_eq!(output, "from pathlib import Path\np = Path(a) / b\n");
    Ok(())
}

#[test]
fn test_conditional_modern_import_is_reused() -> Result<()> {
    let source = "import os\ntry:\n    from pathlib import Path\nexcept ImportError:\n    pass\nx = os.path.exists(p)\n";
    let output = pathlib(source)?;
    assert_eq!(output.matches(PATH_IMPORT).count(), 1);
    assert!(output.contains("    from pathlib import Path\nexcept ImportError:"));
    assert!(output.ends_with("x = Path(p).exists()\n"));
    Ok(())
}

#[test]
fn test_fstring_calls_keep_legacy_import() -> Result<()> {
    let output = pathlib("import os\nx = os.path.exists(p)\ns = f\"{os.path.basename(p)}\"\n")?;
    assert_eq!(
        output,
        "import os\nfrom pathlib import Path\nx = Path(p).exists()\ns = f\"{os.path.basename(p)}\"\n"
    );
    Ok(())
}

#[test]
fn test_legacy_import_kept_while_still_referenced() -> Result<()> {
    let output = pathlib("import os\np = os.path.join(a, b)\ncwd = os.getcwd()\n")?;
    assert_eq!(
        output,
        "import os\nfrom pathlib import Path\np = Path(a) / b\ncwd = os.getcwd()\n"
    );
    Ok(())
}

#[test]
fn test_legacy_import_kept_for_unconverted_calls() -> Result<()> {
    let output = pathlib("import os\na = os.path.join(x, y)\nb = os.path.splitext(x)\n")?;
    assert_eq!(
        output,
        "import os\nfrom pathlib import Path\na = Path(x) / y\nb = os.path.splitext(x)\n"
    );
    Ok(())
}

#[test]
fn test_print_and_pathlib_are_separate_passes() -> Result<()> {
    let source = "import os\nprint(os.path.basename(f))\n";
    let first = pathlib(source)?;
    assert_eq!(first, "from pathlib import Path\nprint(Path(f).name)\n");

    let second = PatternRewriter::new(PrintToLoggingRules).apply(&first)?;
    assert_eq!(
        second,
        "from pathlib import Path\nimport logging\nlogging.info(Path(f).name)\n"
    );
    Ok(())
}
