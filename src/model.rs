use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while building a command line definition.
/// Always fatal to the build step; never raised during parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The command line name is empty.
    #[error("the command line name must not be empty.")]
    EmptyName,

    /// An option carries neither a long nor a short name.
    #[error("an option must carry a long name or a short name.")]
    UnnamedOption,

    /// Two options collide on their long name.
    #[error("cannot duplicate the option '{0}'.")]
    DuplicateOption(String),

    /// Two options collide on their short name.
    #[error("cannot duplicate the short option '{0}'.")]
    DuplicateShortOption(char),

    /// A one-character long name shadows a short name, which would make
    /// short-cluster syntax ambiguous.
    #[error("the one-character long name '{0}' collides with the short option '{0}'.")]
    AmbiguousName(char),

    /// Two arguments collide on their index.
    #[error("cannot duplicate the argument index {0}.")]
    DuplicateArgumentIndex(usize),

    /// A multi-valued argument is not the final argument.
    #[error("only the final argument may be multi-valued ('{0}' is not last).")]
    MisplacedMultiValued(String),

    /// A flag was declared multi-valued.
    #[error("the flag option '{0}' cannot be multi-valued.")]
    FlagMultiValued(String),

    /// A flag was declared with a default value.
    #[error("the flag option '{0}' cannot carry a default value.")]
    FlagWithDefault(String),

    /// A property option was declared without the short name that forms its
    /// `-Xkey=value` prefix.
    #[error("the property option '{0}' must carry a short name.")]
    PropertyWithoutShort(String),

    /// A definition could not be constructed from JSON.
    #[error("malformed json definition: {0}.")]
    MalformedJson(String),
}

/// A named command line option.
///
/// Options are identified by a long name (`--color`), a short name (`-c`), or
/// both; at least one must be set by the time the definition is built.
/// The various modes (`flag`, `multi_valued`, `required`, etc.) default to
/// off; invalid combinations are rejected by
/// [`CliBuilder::build`](crate::CliBuilder::build).
///
/// ### Example
/// ```
/// use clidef::Opt;
///
/// let color = Opt::new()
///     .long("color")
///     .short('c')
///     .description("The color to paint with.")
///     .default_value("green")
///     .choices(["blue", "red", "green"]);
/// assert_eq!(color.long_name(), Some("color"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Opt {
    long_name: Option<String>,
    short_name: Option<char>,
    description: Option<String>,
    flag: bool,
    multi_valued: bool,
    required: bool,
    default_value: Option<String>,
    hidden: bool,
    help: bool,
    property: bool,
    choices: BTreeSet<String>,
}

impl Opt {
    /// Create an empty option; name it via [`Opt::long`] and/or [`Opt::short`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the long name (matched by `--name` and `-name` syntax).
    pub fn long(mut self, name: impl Into<String>) -> Self {
        self.long_name.replace(name.into());
        self
    }

    /// Set the single-character short name (matched by `-x` syntax).
    pub fn short(mut self, name: char) -> Self {
        self.short_name.replace(name);
        self
    }

    /// Document this option for the usage message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Mark as a flag: zero values, presence is the signal.
    pub fn flag(mut self) -> Self {
        self.flag = true;
        self
    }

    /// Allow an unbounded number of values, accumulated across occurrences.
    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    /// Require this option to be matched (or defaulted) for a valid parse.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the value injected when the option is never matched.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value.replace(value.into());
        self
    }

    /// Exclude from the usage message while remaining fully parseable.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark as the help escape hatch: its presence sets aside validation
    /// errors and flips [`CommandLine::is_asking_for_help`](crate::CommandLine::is_asking_for_help).
    pub fn help(mut self) -> Self {
        self.help = true;
        self
    }

    /// Accept `-Xkey=value` property syntax, where `X` is this option's short
    /// name. Property options accumulate every `key=value` pair.
    pub fn property(mut self) -> Self {
        self.property = true;
        self
    }

    /// Constrain values to the given set.
    pub fn choices<I, T>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// The long name, if set.
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// The short name, if set.
    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    /// The usage description, if set.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether this option takes zero values.
    pub fn is_flag(&self) -> bool {
        self.flag
    }

    /// Whether this option accumulates unbounded values.
    /// Property options are implicitly multi-valued.
    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued || self.property
    }

    /// Whether this option must be matched for a valid parse.
    /// Help options are implicitly non-required.
    pub fn is_required(&self) -> bool {
        self.required && !self.help
    }

    /// The default value, if set.
    pub fn default_text(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Whether this option is excluded from the usage message.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether this option is the help escape hatch.
    pub fn is_help(&self) -> bool {
        self.help
    }

    /// Whether this option receives `-Xkey=value` property syntax.
    pub fn is_property(&self) -> bool {
        self.property
    }

    /// The acceptable values, empty when unconstrained.
    pub fn choice_set(&self) -> &BTreeSet<String> {
        &self.choices
    }

    /// The canonical identity used in value maps and error messages:
    /// the long name when set, otherwise the short name.
    pub(crate) fn key(&self) -> String {
        match (&self.long_name, self.short_name) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::default(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), DefinitionError> {
        if self.long_name.is_none() && self.short_name.is_none() {
            return Err(DefinitionError::UnnamedOption);
        }

        if self.flag {
            if self.multi_valued {
                return Err(DefinitionError::FlagMultiValued(self.key()));
            }

            if self.default_value.is_some() {
                return Err(DefinitionError::FlagWithDefault(self.key()));
            }
        }

        if self.property && self.short_name.is_none() {
            return Err(DefinitionError::PropertyWithoutShort(self.key()));
        }

        Ok(())
    }
}

/// A positional command line argument, identified by its index.
///
/// Indices are contiguous from `0`; an argument declared without an index is
/// auto-assigned the next free index in declaration order. Only the
/// highest-index argument may be multi-valued.
///
/// ### Example
/// ```
/// use clidef::Arg;
///
/// let source = Arg::new().name("source").description("The file to copy.").required();
/// assert_eq!(source.arg_name(), Some("source"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Arg {
    index: Option<usize>,
    arg_name: Option<String>,
    description: Option<String>,
    required: bool,
    default_value: Option<String>,
    multi_valued: bool,
    hidden: bool,
}

impl Arg {
    /// Create an argument with no explicit index (auto-assigned at build).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin this argument to an explicit index.
    pub fn index(mut self, index: usize) -> Self {
        self.index.replace(index);
        self
    }

    /// Set the display label used in the usage message.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.arg_name.replace(name.into());
        self
    }

    /// Document this argument for the usage message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Require a value at this position (or a default) for a valid parse.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the value injected when the position is never filled.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value.replace(value.into());
        self
    }

    /// Collect every remaining positional value into this argument.
    /// Only valid on the final argument.
    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    /// Exclude from the usage message while remaining fully parseable.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// The explicit index, if pinned.
    pub fn declared_index(&self) -> Option<usize> {
        self.index
    }

    /// The display label, if set.
    pub fn arg_name(&self) -> Option<&str> {
        self.arg_name.as_deref()
    }

    /// The usage description, if set.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether this position must be filled for a valid parse.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The default value, if set.
    pub fn default_text(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Whether this argument collects every remaining positional value.
    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }

    /// Whether this argument is excluded from the usage message.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The display name: the label when set, otherwise `arg{index}`.
    pub(crate) fn display_name(&self, index: usize) -> String {
        match &self.arg_name {
            Some(name) => name.clone(),
            None => format!("arg{index}"),
        }
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index.replace(index);
        self
    }
}
