pub mod rsync;
pub mod tar;

use crate::config::BackupMethod;
use anyhow::Result;
use std::path::Path;

pub use rsync::RsyncStrategy;
pub use tar::TarStrategy;

/// A fully expanded external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn args_as_str(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

/// Trait for backup strategies
pub trait BackupStrategy: Send + Sync {
    /// Method this strategy implements
    fn method(&self) -> BackupMethod;

    /// Template used when the configuration provides none
    fn default_template(&self) -> &'static str;

    /// Whether the strategy produces a directory rather than a single file
    fn produces_directory(&self) -> bool;

    /// Expand a template into the command that materializes one artifact
    fn build_command(&self, template: &str, source: &Path, destination: &Path) -> Result<CommandSpec> {
        render_template(template, source, destination)
    }

    /// Get strategy name (for logging)
    fn name(&self) -> &'static str;
}

/// Strategy for a configured method
pub fn for_method(method: BackupMethod) -> Box<dyn BackupStrategy> {
    match method {
        BackupMethod::Tar => Box::new(TarStrategy::new()),
        BackupMethod::Rsync => Box::new(RsyncStrategy::new()),
    }
}

/// Split a template on whitespace and substitute `{source}` and
/// `{destination}` inside each token.
pub fn render_template(template: &str, source: &Path, destination: &Path) -> Result<CommandSpec> {
    let source = source.display().to_string();
    let destination = destination.display().to_string();

    let mut tokens = template.split_whitespace().map(|token| {
        token
            .replace("{source}", &source)
            .replace("{destination}", &destination)
    });

    let program = tokens
        .next()
        .ok_or_else(|| anyhow::anyhow!("Command template is empty"))?;

    Ok(CommandSpec {
        program,
        args: tokens.collect(),
    })
}
