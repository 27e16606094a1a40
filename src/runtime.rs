use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::num::NonZero;
use std::ops::Range;

use os_str_bytes::OsStrBytesExt;

use crate::error::ErrorKind;
use crate::pattern::ElementKind;
use crate::schema::{Line, Schema, Slot};
use crate::{Matches, Outcome, ParseOptions, Result};

impl Schema {
    /// Parse arguments, excluding the program name, into a record.
    ///
    /// Only malformed input fails here. Semantic checks are left to [`Schema::validate`].
    /// If help is requested the record has [`Matches::help`] set and nothing else.
    ///
    /// Any argument equal to `-h` or `--help` before `--` requests help, even where it would be
    /// the value of an option (`-m --help`), unless the usage defines these tokens itself.
    pub fn parse<I, T>(&self, args: I) -> Result<Matches>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = args.into_iter().map(Into::into).collect::<Vec<OsString>>();
        let mut matches = Matches::default();

        if !self.defines_help() && wants_help(&args) {
            tracing::debug!("help requested");
            matches.set_help();
            return Ok(matches);
        }

        let mut iter = args.into_iter();
        let mut args = ArgsIter::new(&mut iter);
        let mut words = Vec::new();
        while let Some(arg) = args.cache_next_arg()? {
            match arg {
                Arg::DashDash => words.extend(&mut *args.iter),
                Arg::Unnamed(word) => words.push(word),
                Arg::Long(token) => {
                    let Some(idx) = self.lookup_named(token) else {
                        return Err(ErrorKind::UnknownNamedArgument.with_input(token));
                    };
                    self.feed_named(idx, &mut args, &mut matches)?;
                }
                Arg::Short(c) => {
                    let token = format!("-{c}");
                    let Some(idx) = self.lookup_named(&token) else {
                        return Err(ErrorKind::UnknownNamedArgument.with_input(token));
                    };
                    self.feed_named(idx, &mut args, &mut matches)?;
                }
            }
        }

        self.bind(words, &mut matches)?;
        Ok(matches)
    }

    /// Parse, then validate and render usage as requested by `options`.
    ///
    /// `program` is only used for the usage text.
    pub fn run<I, T>(&self, program: &str, args: I, options: ParseOptions) -> Result<Outcome<Matches>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let ret = self.parse(args).and_then(|matches| {
            if options.validates() {
                self.validate(&matches)?;
            }
            Ok(matches)
        });
        match ret {
            Ok(matches) if matches.help() => {
                Ok(Outcome::Help { usage: self.usage_if(program, options) })
            }
            Ok(matches) => Ok(Outcome::Parsed(matches)),
            Err(err) => {
                tracing::debug!(kind = ?err.kind(), "rejected command line");
                match self.usage_if(program, options) {
                    Some(usage) => Err(err.with_usage(usage)),
                    None => Err(err),
                }
            }
        }
    }

    #[cfg(feature = "help")]
    fn usage_if(&self, program: &str, options: ParseOptions) -> Option<String> {
        options.shows_usage().then(|| self.usage(program))
    }

    #[cfg(not(feature = "help"))]
    fn usage_if(&self, _program: &str, _options: ParseOptions) -> Option<String> {
        None
    }

    fn feed_named(&self, idx: usize, args: &mut ArgsIter<'_>, matches: &mut Matches) -> Result<()> {
        let element = self.element(idx);
        tracing::trace!(token = %element.token, "named argument");
        let values = match element.kind {
            ElementKind::Value { require_eq: false } => vec![args.take_value(&element.token)?.into_owned()],
            ElementKind::Value { require_eq: true } => {
                vec![args.take_value_after_eq(&element.token)?.to_os_string()]
            }
            _ => {
                args.check_no_value(&element.token)?;
                Vec::new()
            }
        };
        if !matches.insert(&element.field, values) {
            return Err(ErrorKind::DuplicatedNamedArgument.with_arg(&element.token));
        }
        Ok(())
    }

    /// Bind words to the usage line that fits them best.
    ///
    /// A line fits when its command words match and no word is left over. Among fitting lines,
    /// the first one accepting every option given and filling every required positional wins.
    /// Accepting the options counts more than filling positionals, so that validation can report
    /// the missing one against the intended line.
    fn bind(&self, words: Vec<OsString>, matches: &mut Matches) -> Result<()> {
        let mut best: Option<(usize, Bound, (bool, bool))> = None;
        let mut extra = None;
        let mut unknown = None;
        for (i, line) in self.lines().iter().enumerate() {
            match self.bind_line(line, &words) {
                Ok(bound) => {
                    let rank = (self.accepts_named(line, matches), bound.complete);
                    tracing::trace!(line = i, ?rank, "usage line fits");
                    if best.as_ref().is_none_or(|(_, _, best_rank)| rank > *best_rank) {
                        best = Some((i, bound, rank));
                    }
                }
                Err(Mismatch::Exhausted) => {}
                Err(Mismatch::Word(pos)) => {
                    unknown.get_or_insert(pos);
                }
                Err(Mismatch::Extra(pos)) => {
                    extra.get_or_insert(pos);
                }
            }
        }

        if let Some((i, bound, _)) = best {
            tracing::debug!(line = i, words = words.len(), "bound usage line");
            matches.set_line(i);
            for (idx, range) in bound.slots {
                let element = self.element(idx);
                if !matches.insert(&element.field, words[range].to_vec()) {
                    return Err(ErrorKind::DuplicatedNamedArgument.with_arg(&element.token));
                }
            }
            return Ok(());
        }
        if let Some(pos) = extra {
            return Err(ErrorKind::ExtraUnnamedArgument.with_input(words[pos].clone()));
        }
        if let Some(pos) = unknown {
            return Err(ErrorKind::UnknownSubcommand.with_input(words[pos].clone()));
        }
        // Words ran out before a command word. Validation reports it.
        tracing::debug!(words = words.len(), "no usage line selected");
        Ok(())
    }

    /// Are all options given so far allowed on `line`?
    fn accepts_named(&self, line: &Line, matches: &Matches) -> bool {
        self.elements().iter().enumerate().all(|(idx, elem)| {
            !elem.kind.is_named() || !matches.is_present(&elem.field) || line.named.contains(&idx)
        })
    }

    fn bind_line(&self, line: &Line, words: &[OsString]) -> Result<Bound, Mismatch> {
        let is_word = |idx: usize, pos: usize| {
            words[pos].as_os_str() == OsStr::new(&self.element(idx).token)
        };

        let mut bound = Bound { slots: Vec::new(), complete: true };
        let mut pos = 0;
        for (slot, &need_after) in line.slots.iter().zip(&line.need_after) {
            let remaining = words.len() - pos;
            let take = match slot {
                Slot::Word(idx) => {
                    if remaining == 0 {
                        return Err(Mismatch::Exhausted);
                    }
                    if !is_word(*idx, pos) {
                        return Err(Mismatch::Word(pos));
                    }
                    bound.slots.push((*idx, pos..pos));
                    pos += 1;
                    continue;
                }
                Slot::Words(alts) => {
                    if remaining > need_after {
                        if let Some(&idx) = alts.iter().find(|&&idx| is_word(idx, pos)) {
                            bound.slots.push((idx, pos..pos));
                            pos += 1;
                        }
                    }
                    continue;
                }
                Slot::Arg { variadic: true, .. } => remaining.saturating_sub(need_after),
                Slot::Arg { required: true, .. } => remaining.min(1),
                Slot::Arg { required: false, .. } => usize::from(remaining > need_after),
            };
            if let Slot::Arg { element, required, .. } = slot {
                if take != 0 {
                    bound.slots.push((*element, pos..pos + take));
                    pos += take;
                } else if *required {
                    bound.complete = false;
                }
            }
        }

        if pos < words.len() {
            return Err(Mismatch::Extra(pos));
        }
        Ok(bound)
    }
}

/// Words bound to one usage line.
struct Bound {
    /// Element and the range of words it takes. Command words take an empty range.
    slots: Vec<(usize, Range<usize>)>,
    /// Did every required positional get a word?
    complete: bool,
}

/// Why a usage line could not take the given words.
enum Mismatch {
    /// Words ran out before a required command word.
    Exhausted,
    /// The word at this position is not the command word expected.
    Word(usize),
    /// Words from this position on have no slot.
    Extra(usize),
}

/// `-h` or `--help` anywhere before `--`.
fn wants_help(args: &[OsString]) -> bool {
    args.iter().take_while(|arg| *arg != "--").any(|arg| arg == "-h" || arg == "--help")
}

pub(crate) struct ArgsIter<'a> {
    iter: &'a mut dyn Iterator<Item = OsString>,
    cur_input_arg: OsString,
    state: ArgsState,
}

#[derive(Debug)]
enum ArgsState {
    Unnamed,
    Long { eq_pos: Option<NonZero<usize>> },
    Short { next_pos: usize },
}

#[derive(Debug)]
enum Arg<'a> {
    DashDash,
    /// `--long`, including the dashes.
    Long(&'a str),
    /// One character of a short cluster, without the dash.
    Short(&'a str),
    Unnamed(OsString),
}

impl<'a> ArgsIter<'a> {
    pub(crate) fn new(iter: &'a mut dyn Iterator<Item = OsString>) -> Self {
        Self { iter, cur_input_arg: OsString::new(), state: ArgsState::Unnamed }
    }

    fn check_no_value(&mut self, token: &str) -> Result<()> {
        // This only fail for long arguments with joined value: `--long=[..]`.
        if let ArgsState::Long { eq_pos: Some(pos) } = self.state {
            Err(ErrorKind::UnexpectedInlineValue
                .with_arg_input(token, self.cur_input_arg.index(pos.get() + 1..)))
        } else {
            Ok(())
        }
    }

    /// Retrieve the value for the current named argument after a mandatory `=`.
    fn take_value_after_eq(&mut self, token: &str) -> Result<&'_ OsStr> {
        match self.state {
            ArgsState::Long { eq_pos: Some(pos) } => Ok(self.cur_input_arg.index(pos.get() + 1..)),
            ArgsState::Short { next_pos }
                if self.cur_input_arg.as_encoded_bytes().get(next_pos) == Some(&b'=') =>
            {
                // Don't traverse the rest.
                self.state = ArgsState::Unnamed;
                Ok(self.cur_input_arg.index(next_pos + 1..))
            }
            _ => Err(ErrorKind::MissingEq.with_arg(token)),
        }
    }

    /// Retrieve the value for the current named argument, either after `=`, the rest of a short
    /// cluster, or the next input argument.
    fn take_value(&mut self, token: &str) -> Result<Cow<'_, OsStr>> {
        match self.state {
            ArgsState::Long { eq_pos: Some(pos) } => {
                Ok(Cow::Borrowed(self.cur_input_arg.index(pos.get() + 1..)))
            }
            ArgsState::Short { next_pos } if next_pos < self.cur_input_arg.len() => {
                let pos = if self.cur_input_arg.as_encoded_bytes()[next_pos] == b'=' {
                    next_pos + 1
                } else {
                    next_pos
                };
                // Don't traverse the rest.
                self.state = ArgsState::Unnamed;
                Ok(Cow::Borrowed(self.cur_input_arg.index(pos..)))
            }
            _ => {
                let Some(arg) = self.iter.next() else {
                    return Err(ErrorKind::MissingValue.with_arg(token));
                };
                Ok(Cow::Owned(arg))
            }
        }
    }

    /// Cache the next logical argument (short or long).
    fn cache_next_arg(&mut self) -> Result<Option<Arg<'_>>> {
        // Iterate the next short argument if we are inside a group of it.
        match self.state {
            ArgsState::Short { next_pos } if next_pos != self.cur_input_arg.len() => {
                let rest = &self.cur_input_arg.as_encoded_bytes()[next_pos..];
                // UTF-8 char has encoded length 1..=4
                for len in 1..=rest.len().min(4) {
                    match std::str::from_utf8(&rest[..len]) {
                        Ok(s) => {
                            // Invariant: `next_pos..next_pos+len` is checked to be valid UTF-8.
                            self.state = ArgsState::Short { next_pos: next_pos + len };
                            return Ok(Some(Arg::Short(s)));
                        }
                        // Incomplete encoding.
                        Err(e) if e.error_len().is_none() => {}
                        Err(_) => break,
                    }
                }
                return Err(ErrorKind::InvalidUtf8
                    .with_input(self.cur_input_arg.index(next_pos..).to_os_string()));
            }
            _ => {}
        }

        // Otherwise, fetch the next input argument.
        let Some(s) = self.iter.next() else {
            return Ok(None);
        };
        tracing::trace!(arg = ?s, "input argument");
        self.cur_input_arg = s;
        let argb = self.cur_input_arg.as_encoded_bytes();
        self.state = ArgsState::Unnamed;

        Ok(Some(if argb == b"-" {
            Arg::Unnamed(std::mem::take(&mut self.cur_input_arg))
        } else if argb == b"--" {
            Arg::DashDash
        } else if argb.starts_with(b"--") {
            let end = if let Some(pos) = argb.iter().position(|&b| b == b'=') {
                self.state = ArgsState::Long { eq_pos: NonZero::new(pos) };
                pos
            } else {
                self.state = ArgsState::Long { eq_pos: None };
                argb.len()
            };
            let s = self.cur_input_arg.index(..end);
            Arg::Long(s.to_str().ok_or_else(|| ErrorKind::InvalidUtf8.with_input(s))?)
        } else if argb.starts_with(b"-") {
            self.state = ArgsState::Short { next_pos: 1 };
            return self.cache_next_arg();
        } else {
            Arg::Unnamed(std::mem::take(&mut self.cur_input_arg))
        }))
    }
}
