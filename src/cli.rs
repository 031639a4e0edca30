use std::collections::HashSet;
use std::fmt;

use terminal_size::{terminal_size, Width};

use crate::model::{Arg, DefinitionError, Opt};
use crate::result::{CommandLine, ValidationError};
use crate::scanner::{RawMatches, ScanError, TokenScanner};
use crate::usage::{UsageFormatter, DEFAULT_WIDTH};

/// An immutable command line definition: the schema that tokens are parsed
/// against, built once via [`Cli::build`] and reused across parses.
///
/// ### Example
/// ```
/// use clidef::{Arg, Cli, Opt};
///
/// let cli = Cli::build("copy")
///     .summary("Copy files.")
///     .option(Opt::new().long("directory").short('R').flag())
///     .argument(Arg::new().name("source"))
///     .argument(Arg::new().name("target"))
///     .build()
///     .unwrap();
///
/// let line = cli.parse(["-R", "a.txt", "b.txt"]).unwrap();
/// assert!(line.is_flag_enabled("directory").unwrap());
/// assert_eq!(line.argument_value(0).unwrap(), Some("a.txt"));
/// assert_eq!(line.argument_value(1).unwrap(), Some("b.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct Cli {
    name: String,
    summary: Option<String>,
    description: Option<String>,
    permissive: bool,
    options: Vec<Opt>,
    arguments: Vec<Arg>,
}

impl Cli {
    /// Start building a definition for the tool `name`.
    pub fn build(name: impl Into<String>) -> CliBuilder {
        CliBuilder {
            name: name.into(),
            summary: None,
            description: None,
            permissive: false,
            options: Vec::default(),
            arguments: Vec::default(),
        }
    }

    /// The tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The one-line summary, if set.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The long description, if set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The declared options, in declaration order.
    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    /// The declared arguments, ordered by index.
    pub fn arguments(&self) -> &[Arg] {
        &self.arguments
    }

    /// Whether unrecognized option tokens are skipped rather than fatal.
    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// Parse the tokens and validate the result.
    ///
    /// The scan aborts with a [`ScanError`] on unknown options and missing
    /// values; validation findings (missing required fields, rejected
    /// choices) never abort and are reported on the returned
    /// [`CommandLine`].
    pub fn parse<I, T>(&self, tokens: I) -> Result<CommandLine<'_>, ScanError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.run(tokens, true)
    }

    /// Parse the tokens, skipping validation: the result reports
    /// `is_valid() == true` with no violations, regardless of required
    /// fields and choices.
    pub fn parse_lenient<I, T>(&self, tokens: I) -> Result<CommandLine<'_>, ScanError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.run(tokens, false)
    }

    fn run<I, T>(&self, tokens: I, validate: bool) -> Result<CommandLine<'_>, ScanError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut scanner = TokenScanner::new(self);

        for token in tokens {
            scanner.feed(token.as_ref())?;
        }

        let mut matches = scanner.finish()?;
        self.inject_defaults(&mut matches);

        let (valid, violations) = if validate {
            let violations = self.validate_matches(&matches);
            (violations.is_empty() && !matches.help_requested, violations)
        } else {
            (true, Vec::default())
        };

        Ok(CommandLine::assemble(self, matches, valid, violations))
    }

    /// Render the usage message into `out` at the default width.
    /// Deterministic for a given definition.
    pub fn usage(&self, out: &mut impl fmt::Write) -> fmt::Result {
        self.usage_with_width(out, DEFAULT_WIDTH)
    }

    /// Render the usage message into `out`, wrapping descriptions at `width`.
    pub fn usage_with_width(&self, out: &mut impl fmt::Write, width: usize) -> fmt::Result {
        UsageFormatter::new(self, width).render(out)
    }

    /// The usage message as a `String`, at the default width.
    pub fn usage_string(&self) -> String {
        let mut out = String::default();
        self.usage(&mut out)
            .expect("internal error - writing to a String cannot fail");
        out
    }

    /// Print the usage message to stdout, wrapped to the sensed terminal
    /// width (the default width when no terminal is attached).
    pub fn print_usage(&self) {
        let width = match terminal_size() {
            Some((Width(w), _)) => w as usize,
            None => DEFAULT_WIDTH,
        };
        let mut out = String::default();
        self.usage_with_width(&mut out, width)
            .expect("internal error - writing to a String cannot fail");
        print!("{out}");
    }

    pub(crate) fn find_long(&self, name: &str) -> Option<&Opt> {
        self.options.iter().find(|opt| opt.long_name() == Some(name))
    }

    pub(crate) fn find_short(&self, name: char) -> Option<&Opt> {
        self.options.iter().find(|opt| opt.short_name() == Some(name))
    }

    fn inject_defaults(&self, matches: &mut RawMatches) {
        for opt in &self.options {
            if let Some(default) = opt.default_text() {
                matches
                    .options
                    .entry(opt.key())
                    .or_insert_with(|| vec![default.to_string()]);
            }
        }

        for arg in &self.arguments {
            let index = arg
                .declared_index()
                .expect("internal error - indices are assigned at build");

            if let Some(default) = arg.default_text() {
                matches
                    .arguments
                    .entry(index)
                    .or_insert_with(|| vec![default.to_string()]);
            }
        }
    }

    fn validate_matches(&self, matches: &RawMatches) -> Vec<ValidationError> {
        let mut violations = Vec::default();

        for opt in &self.options {
            let key = opt.key();

            match matches.options.get(&key) {
                Some(values) => {
                    if !opt.is_multi_valued() && values.len() > 1 {
                        violations.push(ValidationError::TooManyValues(key.clone()));
                    }

                    if !opt.choice_set().is_empty() {
                        for value in values {
                            if !opt.choice_set().contains(value) {
                                violations.push(ValidationError::InvalidValue {
                                    name: key.clone(),
                                    value: value.clone(),
                                });
                            }
                        }
                    }
                }
                None => {
                    if opt.is_required() {
                        violations.push(ValidationError::MissingOption(key));
                    }
                }
            };
        }

        for arg in &self.arguments {
            let index = arg
                .declared_index()
                .expect("internal error - indices are assigned at build");

            if arg.is_required() && !matches.arguments.contains_key(&index) {
                violations.push(ValidationError::MissingArgument(arg.display_name(index)));
            }
        }

        violations
    }
}

/// Builder for a [`Cli`] definition.
///
/// Definition mistakes (name collisions, a flag with a default value, a
/// misplaced multi-valued argument) are reported by [`CliBuilder::build`];
/// the fluent methods themselves never fail.
#[derive(Debug)]
pub struct CliBuilder {
    name: String,
    summary: Option<String>,
    description: Option<String>,
    permissive: bool,
    options: Vec<Opt>,
    arguments: Vec<Arg>,
}

impl CliBuilder {
    /// Set the one-line summary shown in the usage message.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary.replace(summary.into());
        self
    }

    /// Set the long description shown in the usage message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Skip unrecognized option tokens during the scan, preserving them via
    /// [`CommandLine::unmatched`], instead of aborting.
    pub fn permissive(mut self) -> Self {
        self.permissive = true;
        self
    }

    /// Append an option. Declaration order is the usage display order.
    pub fn option(mut self, opt: Opt) -> Self {
        self.options.push(opt);
        self
    }

    /// Add an argument. Without an explicit index, the next free index is
    /// assigned in declaration order.
    pub fn argument(mut self, arg: Arg) -> Self {
        self.arguments.push(arg);
        self
    }

    /// Validate the definition and freeze it into a [`Cli`].
    pub fn build(self) -> Result<Cli, DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }

        let mut longs = HashSet::new();
        let mut shorts = HashSet::new();

        for opt in &self.options {
            opt.validate()?;

            if let Some(long) = opt.long_name() {
                if !longs.insert(long.to_string()) {
                    return Err(DefinitionError::DuplicateOption(long.to_string()));
                }
            }

            if let Some(short) = opt.short_name() {
                if !shorts.insert(short) {
                    return Err(DefinitionError::DuplicateShortOption(short));
                }
            }
        }

        // A one-character long name equal to another option's short name
        // would make `-x` match two different options.
        for opt in &self.options {
            if let Some(long) = opt.long_name() {
                let mut singles = long.chars();

                if let (Some(single), None) = (singles.next(), singles.next()) {
                    if opt.short_name() != Some(single) && shorts.contains(&single) {
                        return Err(DefinitionError::AmbiguousName(single));
                    }
                }
            }
        }

        let mut used: HashSet<usize> = HashSet::default();
        let mut arguments = Vec::with_capacity(self.arguments.len());

        for arg in self.arguments {
            let index = match arg.declared_index() {
                Some(index) => {
                    if !used.insert(index) {
                        return Err(DefinitionError::DuplicateArgumentIndex(index));
                    }
                    index
                }
                None => {
                    let index = used.iter().max().map(|max| max + 1).unwrap_or(0);
                    used.insert(index);
                    index
                }
            };

            arguments.push(arg.with_index(index));
        }

        arguments.sort_by_key(Arg::declared_index);

        if let Some((_, head)) = arguments.split_last() {
            for arg in head {
                if arg.is_multi_valued() {
                    let index = arg
                        .declared_index()
                        .expect("internal error - indices were just assigned");
                    return Err(DefinitionError::MisplacedMultiValued(
                        arg.display_name(index),
                    ));
                }
            }
        }

        Ok(Cli {
            name: self.name,
            summary: self.summary,
            description: self.description,
            permissive: self.permissive,
            options: self.options,
            arguments,
        })
    }
}
