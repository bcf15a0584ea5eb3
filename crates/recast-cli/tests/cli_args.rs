use clap::Parser;
use recast_cli::{Cli, Commands, PathwayArgs, RecipeAction};
use recast_engine::Pathway;
use std::path::PathBuf;

#[test]
fn test_apply_with_transformer_and_output() {
    let cli = Cli::try_parse_from(["recast", "apply", "app.py", "--transformer", "pathlib", "-o", "out.py"])
        .expect("valid arguments");
    match cli.command {
        Commands::Apply {
            source,
            pathway,
            output,
            in_place,
        } => {
            assert_eq!(source, PathBuf::from("app.py"));
            assert_eq!(pathway.transformer.as_deref(), Some("pathlib"));
            assert_eq!(output, Some(PathBuf::from("out.py")));
            assert!(!in_place);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_pathway_is_required_and_exclusive() {
    assert!(Cli::try_parse_from(["recast", "apply", "app.py"]).is_err());
    assert!(Cli::try_parse_from([
        "recast", "apply", "app.py", "--recipe", "r.yaml", "--transformer", "pathlib"
    ])
    .is_err());
}

#[test]
fn test_output_conflicts_with_in_place() {
    assert!(Cli::try_parse_from([
        "recast", "apply", "app.py", "-t", "pathlib", "-o", "out.py", "--in-place"
    ])
    .is_err());
    assert!(Cli::try_parse_from([
        "recast", "batch", "a.py", "-t", "pathlib", "--output-dir", "out", "--in-place"
    ])
    .is_err());
}

#[test]
fn test_batch_options_and_global_flags() {
    let cli = Cli::try_parse_from([
        "recast", "-vv", "batch", "a.py", "b.py", "--recipe", "bump.json", "--workers", "3", "--json",
        "--config", "recast.yaml",
    ])
    .expect("valid arguments");
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("recast.yaml")));
    match cli.command {
        Commands::Batch {
            files,
            workers,
            json,
            in_place,
            ..
        } => {
            assert_eq!(files, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
            assert_eq!(workers, Some(3));
            assert!(json);
            assert!(!in_place);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_recipe_check() {
    let cli = Cli::try_parse_from(["recast", "recipe", "check", "bump.yaml"]).expect("valid arguments");
    assert!(matches!(
        cli.command,
        Commands::Recipe { action: RecipeAction::Check { file } } if file == PathBuf::from("bump.yaml")
    ));
}

#[test]
fn test_pathway_args_load() {
    let args = PathwayArgs {
        recipe: None,
        transformer: Some("print-to-logging".to_string()),
    };
    assert_eq!(
        args.load().expect("transformer pathway"),
        Pathway::Transformer("print-to-logging".to_string())
    );

    let missing = PathwayArgs {
        recipe: Some(PathBuf::from("/nonexistent/recipe.yaml")),
        transformer: None,
    };
    assert!(missing.load().is_err());
}
