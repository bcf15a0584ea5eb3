// Transform a single file

use super::{Command, Context};
use crate::error::{CliError, CliResult};
use crate::router::PathwayArgs;
use recast_engine::Destination;
use std::path::PathBuf;

pub struct ApplyCommand {
    pub source: PathBuf,
    pub pathway: PathwayArgs,
    pub output: Option<PathBuf>,
    pub in_place: bool,
}

impl ApplyCommand {
    pub fn new(source: PathBuf, pathway: PathwayArgs, output: Option<PathBuf>, in_place: bool) -> Self {
        Self {
            source,
            pathway,
            output,
            in_place,
        }
    }

    pub fn destination(&self) -> Destination {
        match (&self.output, self.in_place) {
            (_, true) => Destination::InPlace,
            (Some(path), false) => Destination::Path(path.clone()),
            (None, false) => Destination::Derived,
        }
    }
}

#[async_trait::async_trait]
impl Command for ApplyCommand {
    async fn execute(&self, context: &Context) -> CliResult<()> {
        let pathway = self.pathway.load()?;
        let report = context
            .orchestrator
            .apply_recipe(&self.source, &self.destination(), &pathway)
            .await;

        println!("{}", context.style.file_report(&report, context.verbose));
        if report.is_success() {
            Ok(())
        } else {
            Err(CliError::FilesFailed { failed: 1, total: 1 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(output: Option<&str>, in_place: bool) -> ApplyCommand {
        ApplyCommand::new(
            PathBuf::from("a.py"),
            PathwayArgs {
                recipe: None,
                transformer: Some("pathlib".to_string()),
            },
            output.map(PathBuf::from),
            in_place,
        )
    }

    #[test]
    fn test_destination() {
        assert_eq!(command(None, false).destination(), Destination::Derived);
        assert_eq!(
            command(Some("b.py"), false).destination(),
            Destination::Path(PathBuf::from("b.py"))
        );
        assert_eq!(command(None, true).destination(), Destination::InPlace);
    }
}
