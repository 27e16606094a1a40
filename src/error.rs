use std::ffi::OsString;
use std::fmt;

use crate::pattern::PatternError;

pub(crate) type DynStdError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub struct Error(Box<Inner>);

#[cfg(test)]
struct _AssertErrorIsSendSync
where
    Error: Send + Sync;

struct Inner {
    kind: ErrorKind,

    /// The option, positional or group the error is about, in usage syntax.
    /// For unknown arguments or subcommands, this is `None`.
    arg: Option<String>,
    /// The unexpected raw input, when the error occurs.
    /// For validation errors, this is `None`.
    input: Option<OsString>,
    /// The underlying source error, if there is any.
    source: Option<DynStdError>,
    /// Rendered usage, attached on request of the caller.
    usage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    // Input parsing errors.
    MissingArg0,
    InvalidUtf8,
    UnknownNamedArgument,
    UnknownSubcommand,
    DuplicatedNamedArgument,
    ExtraUnnamedArgument,
    UnexpectedInlineValue,
    MissingValue,
    MissingEq,
    InvalidValue,

    // Validation errors.
    MissingCommand,
    NotInUsage,
    MissingRequiredArgument,
    Conflict,

    // The usage text itself is malformed.
    InvalidPattern,

    // User errors.
    Custom,
}

impl ErrorKind {
    /// Is this a semantic error found by validation, rather than a malformed input?
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::MissingCommand | Self::NotInUsage | Self::MissingRequiredArgument | Self::Conflict
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source.as_ref().map(|err| &**err as _)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &*self.0;
        f.debug_struct("Error")
            .field("kind", &e.kind)
            .field("arg", &e.arg)
            .field("input", &e.input)
            .field("source", &e.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &*self.0;

        let opt_input = |f: &mut fmt::Formatter<'_>| {
            if let Some(input) = &e.input {
                f.write_str(" '")?;
                f.write_str(&input.to_string_lossy())?;
                f.write_str("'")?;
            }
            Ok(())
        };
        let opt_arg = |f: &mut fmt::Formatter<'_>, with_for: bool| {
            if let Some(arg) = &e.arg {
                f.write_str(if with_for { " for '" } else { " '" })?;
                f.write_str(arg)?;
                f.write_str("'")?;
            }
            Ok(())
        };
        let opt_for_arg = |f: &mut fmt::Formatter<'_>| opt_arg(f, true);

        match e.kind {
            ErrorKind::MissingArg0 => f.write_str("missing executable argument (argv[0])"),
            ErrorKind::InvalidUtf8 => {
                f.write_str("invalid UTF-8")?;
                opt_input(f)
            }
            ErrorKind::UnknownNamedArgument | ErrorKind::ExtraUnnamedArgument => {
                f.write_str("unexpected argument")?;
                opt_input(f)
            }
            ErrorKind::UnknownSubcommand => {
                f.write_str("unrecognized subcommand")?;
                opt_input(f)
            }
            ErrorKind::DuplicatedNamedArgument => {
                f.write_str("the argument")?;
                opt_arg(f, false)?;
                f.write_str(" cannot be used multiple times")
            }
            ErrorKind::UnexpectedInlineValue => {
                f.write_str("unexpected value")?;
                opt_input(f)?;
                opt_for_arg(f)
            }
            ErrorKind::MissingValue => {
                f.write_str("a value is required")?;
                opt_for_arg(f)?;
                f.write_str(" but none was supplied")
            }
            ErrorKind::MissingEq => {
                f.write_str("equal sign is needed when assigning values")?;
                opt_for_arg(f)
            }
            ErrorKind::InvalidValue => {
                f.write_str("invalid value")?;
                opt_input(f)?;
                opt_for_arg(f)?;
                if let Some(source) = &e.source {
                    write!(f, ": {source}")?;
                }
                Ok(())
            }

            ErrorKind::MissingCommand => f.write_str("a command is required but not provided"),
            ErrorKind::NotInUsage => {
                f.write_str("the argument")?;
                opt_arg(f, false)?;
                f.write_str(" cannot be used here")
            }
            ErrorKind::MissingRequiredArgument => {
                f.write_str("argument")?;
                opt_arg(f, false)?;
                f.write_str(" is required but not provided")
            }
            ErrorKind::Conflict => {
                f.write_str("only one of ")?;
                f.write_str(e.arg.as_deref().unwrap_or_default())?;
                f.write_str(" may be given")
            }

            ErrorKind::InvalidPattern => {
                f.write_str("invalid usage pattern")?;
                if let Some(source) = &e.source {
                    write!(f, " {source}")?;
                }
                Ok(())
            }

            ErrorKind::Custom => match &e.source {
                Some(source) => source.fmt(f),
                None => f.write_str("unknown error"),
            },
        }?;

        if let Some(usage) = &e.usage {
            f.write_str("\n\n")?;
            f.write_str(usage.trim_end())?;
        }
        Ok(())
    }
}

impl Error {
    fn new(kind: ErrorKind, arg: Option<String>, input: Option<OsString>) -> Self {
        Self(Box::new(Inner { kind, arg, input, source: None, usage: None }))
    }

    /// Create an custom error with given reason.
    pub fn custom(reason: impl Into<String>) -> Self {
        let source = reason.into().into();
        Self::new(ErrorKind::Custom, None, None).with_source(source)
    }

    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }

    /// See [`ErrorKind::is_validation`].
    pub fn is_validation(&self) -> bool {
        self.0.kind.is_validation()
    }

    /// The usage text attached to this error, if requested at parse time.
    pub fn usage(&self) -> Option<&str> {
        self.0.usage.as_deref()
    }

    pub(crate) fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.0.arg = Some(arg.into());
        self
    }

    pub(crate) fn with_source(mut self, source: DynStdError) -> Self {
        self.0.source = Some(source);
        self
    }

    pub(crate) fn with_usage(mut self, usage: String) -> Self {
        self.0.usage = Some(usage);
        self
    }
}

impl From<ErrorKind> for Error {
    #[cold]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None, None)
    }
}

impl From<PatternError> for Error {
    #[cold]
    fn from(err: PatternError) -> Self {
        Self::new(ErrorKind::InvalidPattern, None, None).with_source(Box::new(err))
    }
}

impl ErrorKind {
    #[cold]
    pub(crate) fn with_input(self, input: impl Into<OsString>) -> Error {
        Error::new(self, None, Some(input.into()))
    }

    #[cold]
    pub(crate) fn with_arg(self, arg: impl Into<String>) -> Error {
        Error::new(self, Some(arg.into()), None)
    }

    #[cold]
    pub(crate) fn with_arg_input(self, arg: impl Into<String>, input: impl Into<OsString>) -> Error {
        Error::new(self, Some(arg.into()), Some(input.into()))
    }
}
