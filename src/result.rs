use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::cli::Cli;
use crate::model::{Arg, Opt};
use crate::scanner::RawMatches;

/// A validation finding recorded against a parse result.
///
/// Violations never abort the parse; they accumulate on the
/// [`CommandLine`] so that every problem is reported at once.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required option never appeared and has no default value.
    #[error("required option '{0}' is missing")]
    MissingOption(String),

    /// A required argument never appeared and has no default value.
    #[error("required argument '{0}' is missing")]
    MissingArgument(String),

    /// A single-valued option was supplied more than once.
    #[error("option '{0}' accepts a single value")]
    TooManyValues(String),

    /// A supplied value is outside the option's declared choices.
    #[error("value '{value}' is not allowed for option '{name}'")]
    InvalidValue {
        /// The option's display key.
        name: String,
        /// The rejected value.
        value: String,
    },
}

/// A query against a [`CommandLine`] named an option or argument that the
/// definition never declared.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No option with this long or short name exists.
    #[error("option '{0}' is not declared")]
    UndeclaredOption(String),

    /// No argument at this index exists.
    #[error("argument at index {0} is not declared")]
    UndeclaredArgument(usize),

    /// No argument with this name exists.
    #[error("argument '{0}' is not declared")]
    UndeclaredArgumentName(String),
}

/// The outcome of a parse: matched values plus the validity verdict.
///
/// Accessors return `Result` so that a typo'd lookup name is distinguished
/// from an option that is declared but absent.
#[derive(Debug)]
pub struct CommandLine<'a> {
    cli: &'a Cli,
    options: HashMap<String, Vec<String>>,
    arguments: BTreeMap<usize, Vec<String>>,
    valid: bool,
    asking_for_help: bool,
    violations: Vec<ValidationError>,
    extras: Vec<String>,
    unmatched: Vec<String>,
}

impl<'a> CommandLine<'a> {
    pub(crate) fn assemble(
        cli: &'a Cli,
        matches: RawMatches,
        valid: bool,
        violations: Vec<ValidationError>,
    ) -> Self {
        Self {
            cli,
            options: matches.options,
            arguments: matches.arguments,
            valid,
            asking_for_help: matches.help_requested,
            violations,
            extras: matches.extras,
            unmatched: matches.unmatched,
        }
    }

    /// Whether the parse satisfied every declared requirement.
    ///
    /// `false` whenever violations were recorded, and also whenever a help
    /// option was seen, so that callers check for help before acting.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether a help option appeared among the tokens.
    pub fn is_asking_for_help(&self) -> bool {
        self.asking_for_help
    }

    /// The validation findings, in the order they were detected.
    pub fn violations(&self) -> &[ValidationError] {
        &self.violations
    }

    /// Whether the named option appeared (or carries a default value).
    /// For flags this is the "enabled" test.
    pub fn is_flag_enabled(&self, name: &str) -> Result<bool, LookupError> {
        let opt = self.resolve(name)?;
        Ok(self.options.contains_key(&opt.key()))
    }

    /// The first value of the named option, or `None` when absent.
    pub fn option_value(&self, name: &str) -> Result<Option<&str>, LookupError> {
        let opt = self.resolve(name)?;
        Ok(self
            .options
            .get(&opt.key())
            .and_then(|values| values.first())
            .map(String::as_str))
    }

    /// Every value of the named option, in encounter order. Empty when the
    /// option is absent.
    pub fn option_values(&self, name: &str) -> Result<&[String], LookupError> {
        let opt = self.resolve(name)?;
        Ok(self
            .options
            .get(&opt.key())
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// The key/value pairs of the named property option, split at the first
    /// `=`. A pair without `=` yields an empty value.
    pub fn properties(&self, name: &str) -> Result<Vec<(&str, &str)>, LookupError> {
        let values = self.option_values(name)?;
        Ok(values
            .iter()
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key, value),
                None => (pair.as_str(), ""),
            })
            .collect())
    }

    /// The first value of the argument at `index`, or `None` when absent.
    pub fn argument_value(&self, index: usize) -> Result<Option<&str>, LookupError> {
        let index = self.resolve_index(index)?;
        Ok(self
            .arguments
            .get(&index)
            .and_then(|values| values.first())
            .map(String::as_str))
    }

    /// Every value of the argument at `index`. Empty when absent.
    pub fn argument_values(&self, index: usize) -> Result<&[String], LookupError> {
        let index = self.resolve_index(index)?;
        Ok(self
            .arguments
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// The first value of the named argument, or `None` when absent.
    pub fn argument_value_by_name(&self, name: &str) -> Result<Option<&str>, LookupError> {
        let index = self.resolve_name(name)?;
        Ok(self
            .arguments
            .get(&index)
            .and_then(|values| values.first())
            .map(String::as_str))
    }

    /// Every value of the named argument. Empty when absent.
    pub fn argument_values_by_name(&self, name: &str) -> Result<&[String], LookupError> {
        let index = self.resolve_name(name)?;
        Ok(self
            .arguments
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Positional tokens beyond the declared arguments, in encounter order.
    pub fn extra_arguments(&self) -> &[String] {
        &self.extras
    }

    /// Option-like tokens skipped in permissive mode, in encounter order.
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    fn resolve(&self, name: &str) -> Result<&Opt, LookupError> {
        if let Some(opt) = self.cli.find_long(name) {
            return Ok(opt);
        }

        let mut singles = name.chars();

        if let (Some(single), None) = (singles.next(), singles.next()) {
            if let Some(opt) = self.cli.find_short(single) {
                return Ok(opt);
            }
        }

        Err(LookupError::UndeclaredOption(name.to_string()))
    }

    fn resolve_index(&self, index: usize) -> Result<usize, LookupError> {
        self.find_argument(|arg| arg.declared_index() == Some(index))
            .ok_or(LookupError::UndeclaredArgument(index))
    }

    fn resolve_name(&self, name: &str) -> Result<usize, LookupError> {
        self.find_argument(|arg| arg.arg_name() == Some(name))
            .ok_or_else(|| LookupError::UndeclaredArgumentName(name.to_string()))
    }

    fn find_argument(&self, predicate: impl Fn(&Arg) -> bool) -> Option<usize> {
        self.cli
            .arguments()
            .iter()
            .find(|arg| predicate(arg))
            .and_then(Arg::declared_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arg, Opt};

    fn copy_cli() -> Cli {
        Cli::build("copy")
            .option(Opt::new().long("directory").short('R').flag())
            .option(Opt::new().long("exclude").short('x').multi_valued())
            .option(Opt::new().short('D').property())
            .argument(Arg::new().name("source"))
            .argument(Arg::new().name("target"))
            .build()
            .unwrap()
    }

    #[test]
    fn flag_enabled_by_long_and_short() {
        let cli = copy_cli();

        let line = cli.parse(["-R", "a.txt", "b.txt"]).unwrap();

        assert!(line.is_flag_enabled("directory").unwrap());
        assert!(line.is_flag_enabled("R").unwrap());
    }

    #[test]
    fn flag_absent_is_disabled() {
        let cli = copy_cli();

        let line = cli.parse(["a.txt", "b.txt"]).unwrap();

        assert!(!line.is_flag_enabled("directory").unwrap());
    }

    #[test]
    fn option_value_absent_is_none() {
        let cli = copy_cli();

        let line = cli.parse(["a.txt", "b.txt"]).unwrap();

        assert_eq!(line.option_value("exclude").unwrap(), None);
        assert!(line.option_values("exclude").unwrap().is_empty());
    }

    #[test]
    fn option_lookup_undeclared() {
        let cli = copy_cli();

        let line = cli.parse(["a.txt", "b.txt"]).unwrap();

        assert_matches!(
            line.option_value("colour"),
            Err(LookupError::UndeclaredOption(name)) if name == "colour"
        );
    }

    #[test]
    fn multi_valued_values_in_order() {
        let cli = copy_cli();

        let line = cli
            .parse(["-x", "*.log", "-x", "*.tmp", "a.txt", "b.txt"])
            .unwrap();

        assert_eq!(line.option_values("exclude").unwrap(), &["*.log", "*.tmp"]);
        assert_eq!(line.option_value("exclude").unwrap(), Some("*.log"));
    }

    #[test]
    fn properties_split_at_first_equals() {
        let cli = copy_cli();

        let line = cli
            .parse(["-Dmode=a=b", "-D", "verbose", "a.txt", "b.txt"])
            .unwrap();

        assert_eq!(
            line.properties("D").unwrap(),
            vec![("mode", "a=b"), ("verbose", "")]
        );
    }

    #[test]
    fn argument_by_index_and_name() {
        let cli = copy_cli();

        let line = cli.parse(["a.txt", "b.txt"]).unwrap();

        assert_eq!(line.argument_value(0).unwrap(), Some("a.txt"));
        assert_eq!(line.argument_value(1).unwrap(), Some("b.txt"));
        assert_eq!(line.argument_value_by_name("source").unwrap(), Some("a.txt"));
        assert_eq!(line.argument_value_by_name("target").unwrap(), Some("b.txt"));
    }

    #[test]
    fn argument_lookup_undeclared() {
        let cli = copy_cli();

        let line = cli.parse(["a.txt", "b.txt"]).unwrap();

        assert_matches!(
            line.argument_value(5),
            Err(LookupError::UndeclaredArgument(5))
        );
        assert_matches!(
            line.argument_value_by_name("destination"),
            Err(LookupError::UndeclaredArgumentName(name)) if name == "destination"
        );
    }

    #[test]
    fn extras_preserved_in_order() {
        let cli = copy_cli();

        let line = cli.parse(["a.txt", "b.txt", "c.txt", "d.txt"]).unwrap();

        assert_eq!(line.extra_arguments(), &["c.txt", "d.txt"]);
    }
}
