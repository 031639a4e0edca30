use std::fmt;

use crate::cli::Cli;
use crate::model::{Arg, Opt};

/// The wrap width used when no terminal width is supplied or sensed.
pub(crate) const DEFAULT_WIDTH: usize = 80;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
const MINIMUM_DESCRIPTION_WIDTH: usize = 17;

const INDENT: usize = 2;
const COLUMN_PADDING: usize = 2;
const SYNOPSIS_HANG: usize = 8;

/// Renders the usage message for a definition.
///
/// The output depends only on the definition and the wrap width: hidden
/// fields are excluded, options appear in declaration order, arguments in
/// index order, and choices are listed in sorted order.
pub(crate) struct UsageFormatter<'a> {
    cli: &'a Cli,
    width: usize,
}

impl<'a> UsageFormatter<'a> {
    pub(crate) fn new(cli: &'a Cli, width: usize) -> Self {
        // Below the minimum there is no room to wrap anything sensibly.
        Self {
            cli,
            width: std::cmp::max(width, MINIMUM_DESCRIPTION_WIDTH),
        }
    }

    pub(crate) fn render(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for line in self.synopsis_lines() {
            writeln!(out, "{line}")?;
        }

        if let Some(summary) = self.cli.summary() {
            writeln!(out)?;
            for line in chunk(summary, self.width) {
                writeln!(out, "{line}")?;
            }
        }

        if let Some(description) = self.cli.description() {
            writeln!(out)?;
            for line in chunk(description, self.width) {
                writeln!(out, "{line}")?;
            }
        }

        let options: Vec<(String, String)> = self
            .cli
            .options()
            .iter()
            .filter(|opt| !opt.is_hidden())
            .map(|opt| (option_cell(opt), option_paragraph(opt)))
            .collect();

        if !options.is_empty() {
            writeln!(out)?;
            writeln!(out, "Options:")?;
            self.render_table(out, &options)?;
        }

        let arguments: Vec<(String, String)> = self
            .cli
            .arguments()
            .iter()
            .filter(|arg| !arg.is_hidden())
            .map(|arg| (argument_cell(arg), argument_paragraph(arg)))
            .collect();

        if !arguments.is_empty() {
            writeln!(out)?;
            writeln!(out, "Arguments:")?;
            self.render_table(out, &arguments)?;
        }

        Ok(())
    }

    fn synopsis_lines(&self) -> Vec<String> {
        let mut terms = Vec::default();

        for opt in self.cli.options() {
            if !opt.is_hidden() {
                terms.push(option_term(opt));
            }
        }

        for arg in self.cli.arguments() {
            if !arg.is_hidden() {
                terms.push(argument_term(arg));
            }
        }

        let mut lines = Vec::default();
        let mut current = format!("Usage: {}", self.cli.name());

        for term in terms {
            if current.len() + 1 + term.len() <= self.width {
                current.push(' ');
                current.push_str(&term);
            } else {
                lines.push(current);
                current = format!("{:SYNOPSIS_HANG$}{term}", "");
            }
        }

        lines.push(current);
        lines
    }

    fn render_table(&self, out: &mut impl fmt::Write, rows: &[(String, String)]) -> fmt::Result {
        let left_width = rows
            .iter()
            .map(|(left, _)| left.len())
            .max()
            .unwrap_or_default();
        let description_width = std::cmp::max(
            self.width
                .saturating_sub(INDENT + left_width + COLUMN_PADDING),
            MINIMUM_DESCRIPTION_WIDTH,
        );

        for (left, paragraph) in rows {
            let parts = chunk(paragraph, description_width);

            if parts.is_empty() {
                writeln!(out, "{:INDENT$}{left}", "")?;
                continue;
            }

            for (i, part) in parts.iter().enumerate() {
                if i == 0 {
                    writeln!(out, "{:INDENT$}{left:left_width$}{:COLUMN_PADDING$}{part}", "", "")?;
                } else {
                    writeln!(out, "{:INDENT$}{:left_width$}{:COLUMN_PADDING$}{part}", "", "", "")?;
                }
            }
        }

        Ok(())
    }
}

fn option_term(opt: &Opt) -> String {
    let name = match opt.short_name() {
        Some(short) => format!("-{short}"),
        None => format!(
            "--{}",
            opt.long_name()
                .expect("internal error - options are named at build")
        ),
    };

    let grammar = if opt.is_property() {
        format!("{name}<key=value>")
    } else if opt.is_flag() {
        name
    } else {
        format!("{name} <{}>", opt.key())
    };

    let grammar = if opt.is_required() {
        grammar
    } else {
        format!("[{grammar}]")
    };

    if opt.is_multi_valued() {
        format!("{grammar}...")
    } else {
        grammar
    }
}

fn option_cell(opt: &Opt) -> String {
    let names = match (opt.short_name(), opt.long_name()) {
        (Some(short), Some(long)) => format!("-{short}, --{long}"),
        (Some(short), None) => format!("-{short}"),
        (None, Some(long)) => format!("--{long}"),
        (None, None) => String::default(),
    };

    if opt.is_property() {
        format!("{names}<key=value>")
    } else if opt.is_flag() {
        names
    } else {
        format!("{names} <{}>", opt.key())
    }
}

fn option_paragraph(opt: &Opt) -> String {
    let mut parts = Vec::default();

    if !opt.choice_set().is_empty() {
        let choices: Vec<&str> = opt.choice_set().iter().map(String::as_str).collect();
        parts.push(format!("{{{}}}", choices.join(", ")));
    }

    if let Some(description) = opt.description_text() {
        parts.push(description.to_string());
    }

    if !opt.is_flag() {
        if let Some(default) = opt.default_text() {
            parts.push(format!("(default: {default})"));
        }
    }

    parts.join(" ")
}

// Arguments render bare in the synopsis; brackets are an option-only notation.
fn argument_term(arg: &Arg) -> String {
    let index = arg
        .declared_index()
        .expect("internal error - indices are assigned at build");
    let grammar = format!("<{}>", arg.display_name(index));

    if arg.is_multi_valued() {
        format!("{grammar}...")
    } else {
        grammar
    }
}

fn argument_cell(arg: &Arg) -> String {
    let index = arg
        .declared_index()
        .expect("internal error - indices are assigned at build");
    arg.display_name(index)
}

fn argument_paragraph(arg: &Arg) -> String {
    let mut parts = Vec::default();

    if let Some(description) = arg.description_text() {
        parts.push(description.to_string());
    }

    if let Some(default) = arg.default_text() {
        parts.push(format!("(default: {default})"));
    }

    parts.join(" ")
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if !word.is_empty() {
            if current.is_empty() {
                hyphenate(width, &mut lines, &mut current, word);
            } else if current.len() + word.len() + 1 <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = String::default();
                hyphenate(width, &mut lines, &mut current, word);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let increment = width - 1;
    let mut remaining = word;

    // Cut at character boundaries, never raw byte offsets.
    while remaining.chars().count() > width {
        let cut = remaining
            .char_indices()
            .nth(increment)
            .map(|(at, _)| at)
            .unwrap_or(remaining.len());
        lines.push(format!("{}-", &remaining[..cut]));
        remaining = &remaining[cut..];
    }

    current.push_str(remaining);
}
