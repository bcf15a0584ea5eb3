//! Turning a finished rewrite into source text

use crate::error::Result;
use crate::patterns::ImportEditor;
use crate::providers::Rewrite;
use recast_parsers::{CodeGenerator, Diagnostic};
use tracing::debug;

/// Generated text with the complete audit trail of the rewrite that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSource {
    pub text: String,
    pub modifications: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Applies pending import work and generates text
#[derive(Clone, Default)]
pub struct SourceGenerator {
    imports: ImportEditor,
    generator: CodeGenerator,
}

impl SourceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject the required import and retire unused legacy imports, then generate
    ///
    /// Import work only happens when the rewrite says a rule fired.
    pub fn finalize(&self, rewrite: Rewrite) -> Result<GeneratedSource> {
        let Rewrite {
            mut tree,
            mut modifications,
            diagnostics,
            imports,
        } = rewrite;

        if let Some(directive) = imports.filter(|directive| directive.required) {
            let requirement = &directive.plan.requirement;
            let (with_import, added) = self.imports.inject(tree, requirement)?;
            if added {
                modifications.push(format!("added `{}`", requirement.statement()));
            }
            tree = with_import;

            if let Some(legacy) = &directive.plan.legacy {
                let (retired, removed) = self.imports.retire(tree, legacy);
                for statement in removed {
                    modifications.push(format!("removed unused `{}`", statement));
                }
                tree = retired;
            }
        }

        let text = self.generator.generate(&tree);
        debug!(bytes = text.len(), modifications = modifications.len(), "generated source");
        Ok(GeneratedSource {
            text,
            modifications,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{ImportPlan, ImportRequirement, LegacyImport};
    use crate::providers::ImportDirective;
    use recast_parsers::PythonParser;

    fn directive(required: bool) -> ImportDirective {
        ImportDirective {
            plan: ImportPlan::new(ImportRequirement::from_import("pathlib", "Path"))
                .retiring(LegacyImport::new("os.path")),
            required,
        }
    }

    #[test]
    fn test_unfired_plan_changes_nothing() -> Result<()> {
        let source = "import os\nx = 1\n";
        let mut rewrite = Rewrite::unchanged(PythonParser::new().parse(source)?);
        rewrite.imports = Some(directive(false));
        let generated = SourceGenerator::new().finalize(rewrite)?;
        assert_eq!(generated.text, source);
        assert!(generated.modifications.is_empty());
        Ok(())
    }

    #[test]
    fn test_fired_plan_records_import_changes() -> Result<()> {
        let mut rewrite = Rewrite::unchanged(PythonParser::new().parse("import os\nx = Path('a')\n")?);
        rewrite.imports = Some(directive(true));
        let generated = SourceGenerator::new().finalize(rewrite)?;
        assert_eq!(generated.text, "from pathlib import Path\nx = Path('a')\n");
        assert_eq!(
            generated.modifications,
            vec![
                "added `from pathlib import Path`".to_string(),
                "removed unused `import os`".to_string()
            ]
        );
        Ok(())
    }
}
