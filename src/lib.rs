//! Command-line parsing driven by git-style usage patterns.
//!
//! ```text
//! commit [-a | --interactive | --patch] [-F <file> | -m <msg>] [--reset-author]
//! ```
//!
//! A usage text is compiled into a [`Schema`], which parses arguments into a [`Matches`] record,
//! validates it, and renders usage. `#[derive(Cli)]` binds a struct to a usage text at compile
//! time.
#![forbid(unsafe_code)]
use std::ffi::OsString;
use std::path::PathBuf;

pub mod codegen;
mod error;
mod matches;
pub mod pattern;
mod runtime;
mod schema;
mod validate;
mod values;

#[cfg(feature = "help")]
mod help;

#[cfg(feature = "derive")]
pub use genopts_derive::Cli;

pub use crate::error::{Error, ErrorKind};
pub use crate::matches::Matches;
pub use crate::pattern::PatternError;
pub use crate::schema::Schema;
pub use crate::validate::validate;
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Not public API. Only for proc-macro internal use.
// To scan all usages:
// ```sh
// rg --only-matching --no-filename '\b__rt::\w+' | LC_COLLATE=C sort --unique
// ```
#[doc(hidden)]
pub mod __private {
    pub use {Ok, Option, Vec, bool, str};

    // Used by `arg_value_info!`
    pub use crate::arg_value_info;
    pub use crate::values::{ArgValueInfo, InferValueParser};
    pub use std::marker::PhantomData;

    use crate::ErrorKind;
    pub use crate::{Cli, Matches, Result, Schema};

    pub fn flag(m: &Matches, field: &str) -> bool {
        m.is_present(field)
    }

    pub fn optional_value<T, P: ArgValueInfo<T>>(
        m: &Matches,
        field: &'static str,
        _: P,
    ) -> Result<Option<T>> {
        m.value_os(field).map(|v| P::parse(v).map_err(|err| err.with_arg(field))).transpose()
    }

    pub fn required_value<T, P: ArgValueInfo<T>>(
        m: &Matches,
        field: &'static str,
        info: P,
    ) -> Result<T> {
        optional_value(m, field, info)?
            .ok_or_else(|| ErrorKind::MissingRequiredArgument.with_arg(field))
    }

    pub fn many_values<T, P: ArgValueInfo<T>>(
        m: &Matches,
        field: &'static str,
        _: P,
    ) -> Result<Vec<T>> {
        m.values_os(field).iter().map(|v| P::parse(v).map_err(|err| err.with_arg(field))).collect()
    }
}

/// Runtime switches of [`Schema::run`] and [`Cli::try_parse_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    validate: bool,
    usage: bool,
}

impl Default for ParseOptions {
    /// Validate, and attach usage to errors and help.
    fn default() -> Self {
        Self { validate: true, usage: true }
    }
}

impl ParseOptions {
    /// Parse only. Validation and usage rendering are left to the caller.
    pub const fn bare() -> Self {
        Self { validate: false, usage: false }
    }

    #[must_use]
    pub const fn validate(mut self, on: bool) -> Self {
        self.validate = on;
        self
    }

    /// Attach the rendered usage to errors and to [`Outcome::Help`].
    ///
    /// Without the `help` feature, there is nothing to attach.
    #[must_use]
    pub const fn usage(mut self, on: bool) -> Self {
        self.usage = on;
        self
    }

    pub const fn validates(&self) -> bool {
        self.validate
    }

    pub const fn shows_usage(&self) -> bool {
        self.usage
    }
}

/// A successful run: either a record, or a help request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Parsed(T),
    Help { usage: Option<String> },
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Parsed(v) => Outcome::Parsed(f(v)),
            Self::Help { usage } => Outcome::Help { usage },
        }
    }

    /// The parsed record, or `None` on help.
    pub fn parsed(self) -> Option<T> {
        match self {
            Self::Parsed(v) => Some(v),
            Self::Help { .. } => None,
        }
    }
}

/// A struct bound to a usage text. Use `#[derive(Cli)]` to implement it.
pub trait Cli: Sized + 'static {
    const USAGE: &'static str;

    /// Build from a parsed record.
    fn from_matches(m: &Matches) -> Result<Self>;

    fn schema() -> Result<Schema> {
        Schema::compile(Self::USAGE)
    }

    /// Parse `std::env::args_os()`. On help, print usage and exit 0. On error, print it and
    /// exit -1.
    fn parse() -> Self {
        match Self::try_parse_from(std::env::args_os()) {
            Ok(Outcome::Parsed(v)) => v,
            Ok(Outcome::Help { usage }) => {
                print!("{}", usage.unwrap_or_default());
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(-1);
            }
        }
    }

    /// Parse the full argument vector, including the program name, with default options.
    fn try_parse_from<I, T>(iter: I) -> Result<Outcome<Self>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_with(iter, ParseOptions::default())
    }

    fn try_parse_with<I, T>(iter: I, options: ParseOptions) -> Result<Outcome<Self>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut iter = iter.into_iter().map(Into::<OsString>::into);
        let arg0 = PathBuf::from(iter.next().ok_or(ErrorKind::MissingArg0)?);
        // A non-UTF8 program name does not matter in usage.
        let program_name = arg0.file_name().unwrap_or(arg0.as_ref()).to_string_lossy();
        let outcome = Self::schema()?.run(&program_name, iter, options)?;
        match outcome {
            Outcome::Parsed(m) => Self::from_matches(&m).map(Outcome::Parsed),
            Outcome::Help { usage } => Ok(Outcome::Help { usage }),
        }
    }

    #[cfg(feature = "help")]
    fn render_usage(program: &str) -> Result<String> {
        Ok(Self::schema()?.usage(program))
    }
}
