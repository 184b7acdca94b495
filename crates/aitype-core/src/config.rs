use crate::errors::{CheckerError, Result};
use crate::stdlib::build_std_scope;
use crate::typechecker::Scope;
use crate::types::parse_type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default configuration file name looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "aitype.yaml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options that control checking and reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerOptions {
    /// Seed the root scope with the standard library (default: true)
    #[serde(default = "default_true")]
    pub stdlib: bool,

    /// Colorize rendered diagnostics (default: true)
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Diagnostic output format (default: text)
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_true() -> bool {
    true
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            stdlib: true,
            pretty: true,
            format: OutputFormat::Text,
        }
    }
}

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerConfig {
    #[serde(default)]
    pub compiler_options: CheckerOptions,

    /// Host-provided variables, written in type-expression syntax
    #[serde(default)]
    pub globals: IndexMap<String, String>,

    /// Extra type aliases, written in type-expression syntax
    #[serde(default)]
    pub types: IndexMap<String, String>,

    /// Syntax-tree files to check (glob patterns)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Files to skip (glob patterns)
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    vec!["**/*.is.json".to_string()]
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            compiler_options: CheckerOptions::default(),
            globals: IndexMap::new(),
            types: IndexMap::new(),
            include: default_include(),
            exclude: Vec::new(),
        }
    }
}

/// Flags given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub stdlib: Option<bool>,
    pub pretty: Option<bool>,
    pub format: Option<OutputFormat>,
}

impl CheckerConfig {
    /// Load configuration from a YAML (or JSON) file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the default configuration to `path`
    pub fn init_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::default().to_yaml()?)?;
        Ok(())
    }

    pub fn merge(&mut self, overrides: &CliOverrides) {
        let options = &mut self.compiler_options;
        if let Some(stdlib) = overrides.stdlib {
            options.stdlib = stdlib;
        }
        if let Some(pretty) = overrides.pretty {
            options.pretty = pretty;
        }
        if let Some(format) = overrides.format {
            options.format = format;
        }
    }

    /// Build the scope every checked file starts from
    pub fn root_scope(&self) -> Result<Scope> {
        let mut scope = if self.compiler_options.stdlib {
            build_std_scope()
        } else {
            Scope::new()
        };

        for (name, text) in &self.types {
            scope.set_type(name.clone(), parse_entry(name, text)?);
        }
        for (name, text) in &self.globals {
            scope.set_variable(name.clone(), parse_entry(name, text)?);
        }

        debug!(
            stdlib = self.compiler_options.stdlib,
            globals = self.globals.len(),
            types = self.types.len(),
            "built root scope"
        );
        Ok(scope)
    }
}

fn parse_entry(name: &str, text: &str) -> Result<crate::types::Type> {
    parse_type(text).map_err(|error| CheckerError::TypeSyntax {
        name: name.to_string(),
        text: text.to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;
    use indoc::indoc;

    #[test]
    fn test_default_config() {
        let config = CheckerConfig::default();
        assert!(config.compiler_options.stdlib);
        assert!(config.compiler_options.pretty);
        assert_eq!(config.compiler_options.format, OutputFormat::Text);
        assert_eq!(config.include, ["**/*.is.json"]);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config = CheckerConfig::from_yaml_str(indoc! {r#"
            compilerOptions:
              pretty: false
              format: json
            globals:
              "Mk:dialog": "@(str, str, str): null"
            types:
              id: str
        "#})
        .unwrap();

        assert!(config.compiler_options.stdlib);
        assert!(!config.compiler_options.pretty);
        assert_eq!(config.compiler_options.format, OutputFormat::Json);
        assert_eq!(config.include, ["**/*.is.json"]);

        let scope = config.root_scope().unwrap();
        assert_eq!(scope.get_local_type("id"), Some(&Type::str()));
        assert_eq!(
            scope.get_local_variable("Mk:dialog"),
            Some(&Type::signature([Type::str(), Type::str(), Type::str()], Type::null()))
        );
        assert!(scope.get_local_variable("Core:add").is_some());
    }

    #[test]
    fn test_json_is_accepted() {
        let config =
            CheckerConfig::from_yaml_str(r#"{ "compilerOptions": { "stdlib": false } }"#).unwrap();
        assert!(!config.compiler_options.stdlib);
        let scope = config.root_scope().unwrap();
        assert!(scope.get_local_variable("Core:add").is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = CheckerConfig::from_yaml_str("\n").unwrap();
        assert!(config.compiler_options.stdlib);
    }

    #[test]
    fn test_bad_type_expression_is_an_error() {
        let config = CheckerConfig::from_yaml_str("globals:\n  broken: \"@(num\"\n").unwrap();
        let err = config.root_scope().unwrap_err();
        assert!(matches!(err, CheckerError::TypeSyntax { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = CheckerConfig::default();
        config.merge(&CliOverrides {
            stdlib: Some(false),
            pretty: None,
            format: Some(OutputFormat::Json),
        });
        assert!(!config.compiler_options.stdlib);
        assert!(config.compiler_options.pretty);
        assert_eq!(config.compiler_options.format, OutputFormat::Json);
    }

    #[test]
    fn test_init_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        CheckerConfig::init_file(&path).unwrap();

        let loaded = CheckerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.include, CheckerConfig::default().include);
        assert!(loaded.compiler_options.pretty);
    }
}
