use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::cli::Cli;
use crate::model::Opt;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Errors that abort a scan immediately: resuming after any of these would
/// leave the remaining tokens ambiguous.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// A `--name` token does not match any declared long name.
    #[error("option '--{0}' does not exist.")]
    UnknownOption(String),

    /// A short-cluster character does not match any declared short name.
    #[error("short option '-{0}' does not exist.")]
    UnknownShortOption(char),

    /// A value-taking option reached the end of input, or ran into another
    /// option token, before receiving its value.
    #[error("missing value for option '{0}'.")]
    MissingValue(String),

    /// A flag was given an `=`-attached value.
    #[error("the flag '{0}' does not accept a value.")]
    FlagAcceptsNoValue(String),
}

/// The raw outcome of a scan: string values keyed by option identity and
/// argument index, before default injection and validation.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RawMatches {
    pub(crate) options: HashMap<String, Vec<String>>,
    pub(crate) arguments: BTreeMap<usize, Vec<String>>,
    pub(crate) extras: Vec<String>,
    pub(crate) unmatched: Vec<String>,
    pub(crate) help_requested: bool,
}

/// Single left-to-right scan over the caller's tokens.
///
/// Each token is classified by precedence: the `--` terminator, a value owed
/// to the previous option, `--name[=value]` long syntax, single-hyphen syntax
/// (`-Xkey=value` property, `-name[=value]` long, `-abc`/`-O2` cluster), and
/// finally positional. Within a cluster, characters match greedily
/// left-to-right and the first value-taking character claims the rest of the
/// token.
pub(crate) struct TokenScanner<'a> {
    cli: &'a Cli,
    only_positional: bool,
    pending: Option<&'a Opt>,
    cursor: usize,
    matches: RawMatches,
}

impl<'a> TokenScanner<'a> {
    pub(crate) fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            only_positional: false,
            pending: None,
            cursor: 0,
            matches: RawMatches::default(),
        }
    }

    pub(crate) fn feed(&mut self, token: &str) -> Result<(), ScanError> {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("feed: '{token}'");
        }

        if self.only_positional {
            self.match_positional(token);
            return Ok(());
        }

        if let Some(opt) = self.pending.take() {
            if looks_like_option(token) {
                return Err(ScanError::MissingValue(opt.key()));
            }

            self.record_value(opt, token);
            return Ok(());
        }

        if token == "--" {
            self.only_positional = true;
            return Ok(());
        }

        if let Some(body) = token.strip_prefix("--") {
            return self.match_long(token, body);
        }

        if token.len() > 1 {
            if let Some(body) = token.strip_prefix('-') {
                return self.match_dash(token, body);
            }
        }

        self.match_positional(token);
        Ok(())
    }

    /// Close the scan. A still-pending option never received its value.
    pub(crate) fn finish(self) -> Result<RawMatches, ScanError> {
        if let Some(opt) = self.pending {
            return Err(ScanError::MissingValue(opt.key()));
        }

        Ok(self.matches)
    }

    fn match_long(&mut self, token: &str, body: &str) -> Result<(), ScanError> {
        let cli = self.cli;
        let (name, attached) = split_equals(body);

        match cli.find_long(name) {
            Some(opt) => self.match_named(opt, attached),
            None => self.unknown(token, ScanError::UnknownOption(name.to_string())),
        }
    }

    fn match_dash(&mut self, token: &str, body: &str) -> Result<(), ScanError> {
        let cli = self.cli;

        // Property syntax: -Xkey=value, where X is a property option's short name.
        if let Some((head, value)) = body.split_once('=') {
            if head.len() > 1 {
                let prefix = head
                    .chars()
                    .next()
                    .expect("internal error - a non-empty head must have a first character");

                if let Some(opt) = cli.find_short(prefix).filter(|opt| opt.is_property()) {
                    let key = &head[prefix.len_utf8()..];
                    self.record_value(opt, format!("{key}={value}"));
                    return Ok(());
                }
            }
        }

        // Single-hyphen long syntax: -name or -name=value.
        let (name, attached) = split_equals(body);
        if let Some(opt) = cli.find_long(name) {
            return self.match_named(opt, attached);
        }

        // A lone short name with an attached value: -c=red.
        if attached.is_some() {
            let mut singles = name.chars();

            if let (Some(single), None) = (singles.next(), singles.next()) {
                if let Some(opt) = cli.find_short(single) {
                    return self.match_named(opt, attached);
                }
            }
        }

        self.match_cluster(token, body)
    }

    fn match_named(&mut self, opt: &'a Opt, attached: Option<&str>) -> Result<(), ScanError> {
        if opt.is_flag() {
            if attached.is_some() {
                return Err(ScanError::FlagAcceptsNoValue(opt.key()));
            }

            self.record_presence(opt);
            return Ok(());
        }

        match attached {
            Some(value) => self.record_value(opt, value),
            None => {
                self.pending.replace(opt);
            }
        };

        Ok(())
    }

    fn match_cluster(&mut self, token: &str, body: &str) -> Result<(), ScanError> {
        let cli = self.cli;

        // Verify up to the first value-taking character before recording, so
        // a permissive skip does not leave half the cluster applied.
        for single in body.chars() {
            match cli.find_short(single) {
                Some(opt) if opt.is_flag() => continue,
                Some(_) => break,
                None => {
                    return self.unknown(token, ScanError::UnknownShortOption(single));
                }
            }
        }

        for (at, single) in body.char_indices() {
            let opt = cli
                .find_short(single)
                .expect("internal error - the cluster was verified above");

            if opt.is_flag() {
                self.record_presence(opt);
                continue;
            }

            // The first value-taking character claims the rest of the token;
            // with nothing left, the value arrives as the next token.
            let rest = &body[at + single.len_utf8()..];
            if rest.is_empty() {
                self.pending.replace(opt);
            } else {
                self.record_value(opt, rest.strip_prefix('=').unwrap_or(rest));
            }

            return Ok(());
        }

        Ok(())
    }

    fn match_positional(&mut self, token: &str) {
        match self.cli.arguments().get(self.cursor) {
            Some(arg) => {
                let index = arg
                    .declared_index()
                    .expect("internal error - indices are assigned at build");
                self.matches
                    .arguments
                    .entry(index)
                    .or_default()
                    .push(token.to_string());

                if !arg.is_multi_valued() {
                    self.cursor += 1;
                }
            }
            None => {
                self.matches.extras.push(token.to_string());
            }
        };
    }

    fn record_value(&mut self, opt: &Opt, value: impl Into<String>) {
        if opt.is_help() {
            self.matches.help_requested = true;
        }

        let values = self.matches.options.entry(opt.key()).or_default();

        if !opt.is_multi_valued() {
            // A repeated single-valued option is not an error: last one wins.
            values.clear();
        }

        values.push(value.into());
    }

    fn record_presence(&mut self, opt: &Opt) {
        if opt.is_help() {
            self.matches.help_requested = true;
        }

        self.matches.options.entry(opt.key()).or_default();
    }

    fn unknown(&mut self, token: &str, error: ScanError) -> Result<(), ScanError> {
        if self.cli.is_permissive() {
            self.matches.unmatched.push(token.to_string());
            Ok(())
        } else {
            Err(error)
        }
    }
}

fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

fn split_equals(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}
