//! Declarative command-line option grammar.
//!
//! Options are declared as a table of human-readable definition strings, the
//! same strings that are printed in the help text:
//!
//! ```text
//! -h, --help          :  help
//! -o FILE             :  output file
//! --format=NAME       :  output format
//! ```
//!
//! [`OptionParser::new`] turns that table into a parser, and
//! [`OptionParser::parse`] drains leading option tokens from an argument list,
//! leaving the positional arguments in place.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

static SHORT_AND_LONG: LazyLock<Regex> =
    LazyLock::new(|| literal_pattern(r"^-(\w), --(\w[-\w]*)(?:=(\S+))?\s*:\s*(\S.*)?$"));
static SHORT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| literal_pattern(r"^-(\w)(?:\s+(\S+))?\s*:\s*(\S.*)?$"));
static LONG_ONLY: LazyLock<Regex> =
    LazyLock::new(|| literal_pattern(r"^--(\w[-\w]*)(?:=(\S+))?\s*:\s*(\S.*)?$"));
static LONG_TOKEN: LazyLock<Regex> = LazyLock::new(|| literal_pattern(r"^--([-\w]+)(?:=(.*))?$"));

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals exercised by the unit tests"
)]
fn literal_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("option grammar pattern must compile")
}

/// A definition string matched none of the accepted shapes.
///
/// This is a programming error in the option table rather than a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected option definition: {definition}")]
pub struct OptionDefinitionError {
    /// The offending definition string.
    pub definition: String,
}

/// Errors caused by command-line misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// The option is not declared in the option table.
    #[error("{option}: unknown option.")]
    UnknownOption {
        /// The option as written, including its dashes.
        option: String,
    },

    /// The option requires an argument and none was supplied.
    #[error("{option}: argument required.")]
    MissingArgument {
        /// The option as written, including its dashes.
        option: String,
    },

    /// A boolean long option was given an `=value`.
    #[error("{option}: unexpected argument.")]
    UnexpectedArgument {
        /// The full token as written.
        option: String,
    },

    /// A `--` token that is not shaped like `--name` or `--name=value`.
    #[error("{token}: invalid option format.")]
    InvalidOptionFormat {
        /// The full token as written.
        token: String,
    },
}

/// One declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Single-character flag, used as `-x`.
    pub short: Option<char>,
    /// Long name, used as `--name`.
    pub long: Option<String>,
    /// Placeholder name of the argument, when the option takes one.
    pub param: Option<String>,
    /// Human-readable description.
    pub description: String,
}

impl OptionSpec {
    /// Parses a single definition string.
    ///
    /// # Errors
    ///
    /// Returns [`OptionDefinitionError`] when the string matches none of the
    /// `-x, --long=PARAM : desc`, `-x PARAM : desc` or `--long=PARAM : desc`
    /// shapes.
    ///
    /// # Examples
    ///
    /// ```
    /// use boilerpl8::option::OptionSpec;
    ///
    /// let spec = OptionSpec::parse("-o, --output=FILE : output file")?;
    /// assert_eq!(spec.short, Some('o'));
    /// assert_eq!(spec.long.as_deref(), Some("output"));
    /// assert!(spec.takes_argument());
    /// # Ok::<(), boilerpl8::option::OptionDefinitionError>(())
    /// ```
    pub fn parse(definition: &str) -> Result<Self, OptionDefinitionError> {
        let trimmed = definition.trim();
        let capture = |caps: &regex::Captures<'_>, index: usize| {
            caps.get(index).map(|m| m.as_str().to_owned())
        };
        let short_flag = |caps: &regex::Captures<'_>| {
            caps.get(1).and_then(|m| m.as_str().chars().next())
        };

        let spec = if let Some(caps) = SHORT_AND_LONG.captures(trimmed) {
            Self {
                short: short_flag(&caps),
                long: capture(&caps, 2),
                param: capture(&caps, 3),
                description: capture(&caps, 4).unwrap_or_default(),
            }
        } else if let Some(caps) = SHORT_ONLY.captures(trimmed) {
            Self {
                short: short_flag(&caps),
                long: None,
                param: capture(&caps, 2),
                description: capture(&caps, 3).unwrap_or_default(),
            }
        } else if let Some(caps) = LONG_ONLY.captures(trimmed) {
            Self {
                short: None,
                long: capture(&caps, 1),
                param: capture(&caps, 2),
                description: capture(&caps, 3).unwrap_or_default(),
            }
        } else {
            return Err(OptionDefinitionError {
                definition: definition.to_owned(),
            });
        };

        if spec.short.is_none() && spec.long.is_none() {
            return Err(OptionDefinitionError {
                definition: definition.to_owned(),
            });
        }
        Ok(spec)
    }

    /// Returns true when the option consumes an argument.
    #[must_use]
    pub fn takes_argument(&self) -> bool {
        self.param.is_some()
    }

    /// The key under which parsed values are stored: the long name when
    /// present, otherwise the short flag.
    #[must_use]
    pub fn key(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// The value recorded for a parsed option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A boolean flag was present.
    Flag,
    /// An argument-taking option and its argument.
    Value(String),
}

/// Options resolved from one command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: HashMap<String, OptionValue>,
}

impl ParsedOptions {
    /// Builds a set of options directly, mostly useful in tests.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = (String, OptionValue)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Returns true when the option was given at all.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the raw value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Returns the argument of an argument-taking option.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptionValue::Value(value)) => Some(value),
            Some(OptionValue::Flag) | None => None,
        }
    }

    /// Number of distinct options recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no option was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, spec: &OptionSpec, value: OptionValue) {
        self.values.insert(spec.key(), value);
    }
}

/// Parser built from a table of option definitions.
#[derive(Debug, Clone)]
pub struct OptionParser {
    definitions: Vec<String>,
    specs: Vec<OptionSpec>,
}

impl OptionParser {
    /// Builds a parser from definition strings.
    ///
    /// # Errors
    ///
    /// Returns [`OptionDefinitionError`] for the first malformed definition.
    pub fn new<S: AsRef<str>>(definitions: &[S]) -> Result<Self, OptionDefinitionError> {
        let specs = definitions
            .iter()
            .map(|definition| OptionSpec::parse(definition.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            definitions: definitions
                .iter()
                .map(|definition| definition.as_ref().to_owned())
                .collect(),
            specs,
        })
    }

    /// Renders the option table for help output, one definition per line.
    #[must_use]
    pub fn help_lines(&self) -> String {
        self.definitions
            .iter()
            .map(|definition| format!("  {}\n", definition.trim()))
            .collect()
    }

    /// Consumes leading option tokens from `args`.
    ///
    /// Parsing stops at the first token that does not start with `-`; that
    /// token and everything after it stay in `args`.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError`] for unknown options, missing arguments and
    /// unexpected arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use boilerpl8::option::{OptionParser, OptionValue};
    ///
    /// let parser = OptionParser::new(&["-B : no suffix"])?;
    /// let mut args = vec!["-B".to_owned(), "github:alice/tmpl".to_owned()];
    /// let options = parser.parse(&mut args)?;
    /// assert_eq!(options.get("B"), Some(&OptionValue::Flag));
    /// assert_eq!(args, ["github:alice/tmpl"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(&self, args: &mut Vec<String>) -> Result<ParsedOptions, OptionError> {
        let mut options = ParsedOptions::default();
        while args.first().is_some_and(|arg| arg.starts_with('-')) {
            let token = args.remove(0);
            if token.starts_with("--") {
                self.parse_long(&token, &mut options)?;
            } else {
                self.parse_short_cluster(&token, args, &mut options)?;
            }
        }
        Ok(options)
    }

    fn parse_long(&self, token: &str, options: &mut ParsedOptions) -> Result<(), OptionError> {
        let caps = LONG_TOKEN
            .captures(token)
            .ok_or_else(|| OptionError::InvalidOptionFormat {
                token: token.to_owned(),
            })?;
        let name = caps.get(1).map_or("", |m| m.as_str());
        let value = caps.get(2).map(|m| m.as_str().to_owned());

        let spec = self
            .find_long(name)
            .ok_or_else(|| OptionError::UnknownOption {
                option: format!("--{name}"),
            })?;

        match (spec.takes_argument(), value) {
            (true, Some(value)) => options.insert(spec, OptionValue::Value(value)),
            (true, None) => {
                return Err(OptionError::MissingArgument {
                    option: token.to_owned(),
                });
            }
            (false, Some(_)) => {
                return Err(OptionError::UnexpectedArgument {
                    option: token.to_owned(),
                });
            }
            (false, None) => options.insert(spec, OptionValue::Flag),
        }
        Ok(())
    }

    fn parse_short_cluster(
        &self,
        token: &str,
        rest: &mut Vec<String>,
        options: &mut ParsedOptions,
    ) -> Result<(), OptionError> {
        let flags = token.strip_prefix('-').unwrap_or(token);
        for (offset, flag) in flags.char_indices() {
            let spec = self
                .find_short(flag)
                .ok_or_else(|| OptionError::UnknownOption {
                    option: format!("-{flag}"),
                })?;

            if !spec.takes_argument() {
                options.insert(spec, OptionValue::Flag);
                continue;
            }

            let attached = flags.get(offset + flag.len_utf8()..).unwrap_or_default();
            let argument = if attached.is_empty() {
                if rest.is_empty() {
                    return Err(OptionError::MissingArgument {
                        option: format!("-{flag}"),
                    });
                }
                rest.remove(0)
            } else {
                attached.to_owned()
            };
            options.insert(spec, OptionValue::Value(argument));
            break;
        }
        Ok(())
    }

    fn find_long(&self, name: &str) -> Option<&OptionSpec> {
        self.specs
            .iter()
            .find(|spec| spec.long.as_deref() == Some(name))
    }

    fn find_short(&self, flag: char) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.short == Some(flag))
    }
}

#[cfg(test)]
#[path = "option_tests.rs"]
mod tests;
