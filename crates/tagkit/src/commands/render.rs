//! `tagkit render` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use serde_json::Value;
use tagkit_config::{CliSettings, Config};
use tagkit_renderer::directive::{
    ConditionDirective, ConditionalPartialDirective, FsPartialResolver, IfDirective,
    PartialDirective, PartialResolver,
};
use tagkit_renderer::{DirectiveProcessor, DirectiveProcessorConfig, Scope};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the template file.
    template: PathBuf,

    /// JSON file bound as `Model`.
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Scope variable as KEY=VALUE (VALUE is parsed as JSON, else kept as a string).
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, Value)>,

    /// Path to configuration file (default: auto-discover tagkit.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Partials root directory (overrides config).
    #[arg(long, env = "TAGKIT_PARTIALS")]
    partials: Option<PathBuf>,

    /// Maximum partial nesting depth (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input files or rendering fail.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            partials_root: self.partials,
            max_depth: self.max_depth,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if let Some(path) = &config.config_path {
            tracing::info!(config = %path.display(), "Loaded configuration");
        }
        tracing::info!(
            partials = %config.partials_resolved.root.display(),
            max_depth = config.partials_resolved.max_depth,
            "Partials"
        );

        let processor = build_processor(&config);

        let mut scope = Scope::new();
        if let Some(path) = &self.model {
            scope = scope.with_model(load_model(path)?);
        }
        for (name, value) in self.vars {
            scope.set_var(name, value);
        }

        let template = read_file(&self.template)?;
        let result = processor
            .render(&template, &scope)
            .map_err(|source| CliError::Render {
                path: self.template.clone(),
                source,
            })?;

        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html)?;
                output.success(&format!(
                    "Rendered {} -> {}",
                    self.template.display(),
                    path.display()
                ));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(result.html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

/// Build a processor with the standard directives under the configured names.
fn build_processor(config: &Config) -> DirectiveProcessor {
    let names = &config.directives;
    let partials = &config.partials_resolved;

    let resolver: Arc<dyn PartialResolver> = Arc::new(
        FsPartialResolver::new(&partials.root).with_extension(&partials.extension),
    );
    let processor_config =
        DirectiveProcessorConfig::new().with_max_partial_depth(partials.max_depth);

    DirectiveProcessor::with_config(processor_config)
        .with_directive(ConditionDirective::new(&names.condition_attribute))
        .with_directive(IfDirective::new(&names.if_tag))
        .with_directive(PartialDirective::new(
            &names.partial_tag,
            Arc::clone(&resolver),
        ))
        .with_directive(ConditionalPartialDirective::new(
            &names.conditional_partial_tag,
            resolver,
        ))
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_model(path: &Path) -> Result<Value, CliError> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Model {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `KEY=VALUE`, reading VALUE as JSON and falling back to a string.
fn parse_var(arg: &str) -> Result<(String, Value), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{arg}'"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_var_json_values() {
        assert_eq!(parse_var("Admin=true").unwrap(), ("Admin".to_owned(), json!(true)));
        assert_eq!(parse_var("Count=3").unwrap(), ("Count".to_owned(), json!(3)));
        assert_eq!(
            parse_var(r#"User={"Name":"ada"}"#).unwrap(),
            ("User".to_owned(), json!({"Name": "ada"}))
        );
    }

    #[test]
    fn test_parse_var_string_fallback() {
        assert_eq!(
            parse_var("Title=Hello world").unwrap(),
            ("Title".to_owned(), json!("Hello world"))
        );
        assert_eq!(parse_var("Empty=").unwrap(), ("Empty".to_owned(), json!("")));
    }

    #[test]
    fn test_parse_var_keeps_equals_in_value() {
        assert_eq!(
            parse_var("Query=a=b").unwrap(),
            ("Query".to_owned(), json!("a=b"))
        );
    }

    #[test]
    fn test_parse_var_errors() {
        assert!(parse_var("NoEquals").is_err());
        assert!(parse_var("=1").is_err());
    }

    #[test]
    fn test_build_processor_uses_configured_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("_nav.html"), "<nav />").unwrap();

        let mut config = Config::default();
        config.directives.condition_attribute = "visible".to_owned();
        config.directives.if_tag = "when".to_owned();
        config.partials_resolved.root = dir.path().to_path_buf();

        let processor = build_processor(&config);
        let scope = Scope::new().with_var("On", false);
        let result = processor
            .render(
                r#"<p visible="On">a</p><when is="!On">b</when><partial name="_nav" />"#,
                &scope,
            )
            .unwrap();

        assert_eq!(result.html, "b<nav />");
    }

    #[test]
    fn test_load_model_reports_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, CliError::Model { .. }));
        assert!(err.to_string().contains("model.json"));
    }
}
