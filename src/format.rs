//! Conservative source reformatting for fenced code blocks.
//!
//! Code blocks arrive entity-decoded but with whatever indentation survived
//! the export round trip. This module normalizes them per language profile:
//! brace-structured languages are reindented from scratch, markup-like
//! languages only get whitespace normalization. Every transformation is
//! idempotent, so re-running a migration on its own output is a no-op.
//!
//! An unknown language tag or an unbalanced block is reported as an error;
//! the caller decides what to do with the original text (the code-block
//! pass keeps it and records a diagnostic).

use std::fmt;

/// Formatting profile, resolved from the fence's language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// `js` / `javascript`: brace reindent.
    Script,
    /// `ts` / `typescript`: brace reindent.
    TypedScript,
    /// `css` / `less` / `scss`: brace reindent.
    Style,
    /// `graphql`: brace reindent.
    Graphql,
    /// `html` / `vue` / `angular` / `lwc`: whitespace normalization only.
    Markup,
    /// `markdown` / `mdx`: whitespace normalization only.
    Markdown,
    /// `yaml`: whitespace normalization only (indentation is syntax).
    Yaml,
}

impl Profile {
    /// Resolves a language tag to a profile. Unknown tags are an error so
    /// the caller can fall back without touching the code.
    pub fn from_tag(tag: &str) -> Result<Self, FormatError> {
        match tag {
            "js" | "javascript" => Ok(Profile::Script),
            "ts" | "typescript" => Ok(Profile::TypedScript),
            "css" | "less" | "scss" => Ok(Profile::Style),
            "graphql" => Ok(Profile::Graphql),
            "html" | "vue" | "angular" | "lwc" => Ok(Profile::Markup),
            "markdown" | "mdx" => Ok(Profile::Markdown),
            "yaml" => Ok(Profile::Yaml),
            other => Err(FormatError::UnsupportedLanguage(other.to_string())),
        }
    }

    fn reindents(self) -> bool {
        matches!(
            self,
            Profile::Script | Profile::TypedScript | Profile::Style | Profile::Graphql
        )
    }
}

/// Why a block could not be formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The language tag maps to no profile.
    UnsupportedLanguage(String),
    /// The source fails the structural sanity check.
    Syntax(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnsupportedLanguage(tag) => write!(f, "unsupported language: {tag}"),
            FormatError::Syntax(message) => write!(f, "syntax error: {message}"),
        }
    }
}

impl std::error::Error for FormatError {}

const INDENT: &str = "  ";

/// Formats `source` according to `profile`.
pub fn format_source(profile: Profile, source: &str) -> Result<String, FormatError> {
    if profile.reindents() {
        check_balance(source)?;
        Ok(normalize_whitespace(&reindent(source)))
    } else {
        Ok(normalize_whitespace(source))
    }
}

/// Verifies that brackets are balanced outside of string literals and line
/// comments. Catches blocks the exporter truncated mid-statement.
fn check_balance(source: &str) -> Result<(), FormatError> {
    let mut stack = Vec::new();
    for line in source.lines() {
        for token in structural_tokens(line) {
            match token {
                '{' | '(' | '[' => stack.push(token),
                '}' | ')' | ']' => {
                    let expected = match token {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    if stack.pop() != Some(expected) {
                        return Err(FormatError::Syntax(format!("unmatched `{token}`")));
                    }
                }
                _ => {}
            }
        }
    }
    if let Some(open) = stack.pop() {
        return Err(FormatError::Syntax(format!("unclosed `{open}`")));
    }
    Ok(())
}

/// Reindents brace-structured source. Existing indentation is discarded and
/// rebuilt from nesting depth, which is what makes the pass idempotent.
fn reindent(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut depth: usize = 0;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push('\n');
            continue;
        }

        // Closers at the start of a line dedent the line they sit on.
        let leading_closers = trimmed
            .chars()
            .take_while(|c| matches!(c, '}' | ')' | ']'))
            .count();
        let line_depth = depth.saturating_sub(leading_closers);

        for _ in 0..line_depth {
            out.push_str(INDENT);
        }
        out.push_str(trimmed);
        out.push('\n');

        for token in structural_tokens(trimmed) {
            match token {
                '{' | '(' | '[' => depth += 1,
                '}' | ')' | ']' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    out
}

/// Yields bracket characters that sit outside string literals and `//`
/// comments on a single line.
fn structural_tokens(line: &str) -> impl Iterator<Item = char> + '_ {
    let mut in_string: Option<char> = None;
    let mut prev = '\0';
    let mut in_comment = false;
    line.chars().filter(move |&c| {
        if in_comment {
            return false;
        }
        match in_string {
            Some(quote) => {
                if c == quote && prev != '\\' {
                    in_string = None;
                }
                prev = c;
                false
            }
            None => {
                if c == '"' || c == '\'' || c == '`' {
                    in_string = Some(c);
                    prev = c;
                    return false;
                }
                if c == '/' && prev == '/' {
                    in_comment = true;
                    prev = c;
                    return false;
                }
                prev = c;
                matches!(c, '{' | '}' | '(' | ')' | '[' | ']')
            }
        }
    })
}

/// Strips trailing whitespace, collapses runs of blank lines to one, and
/// ends the block with exactly one newline.
fn normalize_whitespace(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = 0usize;
    for line in source.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    if out == "\n" {
        out.clear();
    }
    out
}
