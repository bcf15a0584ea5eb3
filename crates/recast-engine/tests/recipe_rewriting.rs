use proptest::prelude::*;
use recast_engine::{
    InsertPosition, Instruction, Recipe, RecipeExporter, RecipeTransformer, Result,
    ScopeAwareRewriter, Transformer,
};
use recast_parsers::{CodeGenerator, PythonParser};

fn apply(source: &str, instructions: Vec<Instruction>) -> Result<String> {
    RecipeTransformer::new("test", Recipe::new(instructions))?.apply(source)
}

#[test]
fn test_assignment_value_changes_but_reference_stays() -> Result<()> {
    let output = apply(
        "x = 10; output(x)\n",
        vec![Instruction::substitution(10, 20, "global")],
    )?;
    assert_eq!(output, "x = 20; output(x)\n");
    Ok(())
}

#[test]
fn test_scope_fencing() -> Result<()> {
    let source = "\
def foo():
    a = 1
    def bar():
        b = 1
    return 1

def bar():
    c = 1

x = 1
";
    let output = apply(source, vec![Instruction::substitution(1, 2, "foo")])?;
    assert_eq!(
        output,
        "\
def foo():
    a = 2
    def bar():
        b = 1
    return 2

def bar():
    c = 1

x = 1
"
    );
    Ok(())
}

#[test]
fn test_first_match_wins() -> Result<()> {
    let output = apply(
        "x = 1\ny = 2\n",
        vec![
            Instruction::substitution(1, 2, "global"),
            Instruction::substitution(1, 3, "global"),
            Instruction::substitution(2, 5, "global"),
        ],
    )?;
    assert_eq!(output, "x = 2\ny = 5\n");

    let output = apply(
        "def f():\n    return 1\n\ny = 1\n",
        vec![
            Instruction::substitution(1, 7, "f"),
            Instruction::substitution(1, 9, "global"),
        ],
    )?;
    assert_eq!(output, "def f():\n    return 7\n\ny = 9\n");
    Ok(())
}

#[test]
fn test_unusable_first_match_is_not_skipped() -> Result<()> {
    let recipe = Recipe::new(vec![
        Instruction::substitution("x", 5, "global"),
        Instruction::substitution("x", "z", "global"),
    ]);
    let tree = PythonParser::new().parse("a = x\n")?;
    let rewrite = ScopeAwareRewriter::new(&recipe).rewrite(tree);

    assert_eq!(CodeGenerator::new().generate(&rewrite.tree), "a = x\n");
    assert!(rewrite.modifications.is_empty());
    assert_eq!(rewrite.diagnostics.len(), 1);
    assert!(rewrite.diagnostics[0].message.contains("instruction #0"));
    Ok(())
}

#[test]
fn test_rename_reaches_fstring_interpolations() -> Result<()> {
    let output = apply(
        "x = 1\nprint(f\"{x}\")\n",
        vec![Instruction::substitution("x", "y", "global")],
    )?;
    assert_eq!(output, "y = 1\nprint(f\"{y}\")\n");

    let source = "def show(v):\n    return f'{v:>{width}} {v!r}'\n\nmsg = f'{width}'\n";
    let output = apply(source, vec![Instruction::substitution("width", "w", "show")])?;
    assert_eq!(
        output,
        "def show(v):\n    return f'{v:>{w}} {v!r}'\n\nmsg = f'{width}'\n"
    );
    Ok(())
}

#[test]
fn test_unparsable_insertion_is_recorded_and_skipped() -> Result<()> {
    let recipe = Recipe::new(vec![
        Instruction::insertion("def (:", InsertPosition::Start, "f"),
        Instruction::substitution(1, 2, "f"),
    ]);
    let tree = PythonParser::new().parse("def f():\n    return 1\n")?;
    let rewrite = ScopeAwareRewriter::new(&recipe).rewrite(tree);

    assert_eq!(CodeGenerator::new().generate(&rewrite.tree), "def f():\n    return 2\n");
    assert_eq!(rewrite.modifications.len(), 1);
    assert_eq!(rewrite.diagnostics.len(), 1);
    assert!(rewrite.diagnostics[0].message.contains("Instruction #0 failed"));
    Ok(())
}

#[test]
fn test_recipe_file_drives_transformer() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bump.yaml");
    RecipeExporter::save(
        &Recipe::new(vec![Instruction::substitution("DEBUG", "INFO", "global")]),
        &path,
    )?;

    let transformer = RecipeTransformer::from_file(&path)?;
    assert_eq!(transformer.describe().name, "bump");
    assert_eq!(transformer.apply("level = DEBUG\n")?, "level = INFO\n");
    Ok(())
}

fn program(a: i64, b: i64) -> String {
    format!(
        "x = {a}\n\ndef f(n):\n    if n > {b}:\n        return n * {a}\n    return {b}\n\nprint(f(x), 'done')\n"
    )
}

proptest! {
    #[test]
    fn test_apply_is_deterministic(a in 0i64..100, b in 0i64..100, c in 0i64..100) {
        let source = program(a, b);
        let instructions = || vec![
            Instruction::substitution(a, c, "f"),
            Instruction::substitution(b, a, "global"),
        ];
        let first = apply(&source, instructions()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let second = apply(&source, instructions()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&first, &second);
        prop_assert!(PythonParser::new().check(&first).is_ok());
    }

    #[test]
    fn test_unmatched_recipe_is_identity(a in 0i64..100, b in 0i64..100) {
        let source = program(a, b);
        let output = apply(&source, vec![Instruction::substitution(1000, 1, "global")])
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(output, source);
    }
}
