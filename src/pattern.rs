//! The usage pattern language.
//!
//! A template is one or more usage lines in the style of git manual pages:
//!
//! ```text
//! commit [-a | --interactive | --patch] [-F <file> | -m <msg>] [--reset-author]
//! ```
//!
//! NB. This file is shared between library and proc-macro crates. It may only depend on `std`
//! and on crates both of them depend on.

use std::fmt;

/// One or more usage lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub patterns: Vec<Pattern>,
}

/// A single usage line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A required command word, flag, or `--long=<arg>` option.
    Command(Opt),
    /// A required positional argument.
    Arg(Arg),
    /// A group of mutually exclusive alternatives, all optional.
    Optional(Optional),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optional {
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative {
    Opt(Opt),
    Arg(Arg),
}

/// A named token: a command word (`commit`) or an option (`-a`, `--file <file>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opt {
    pub name: String,
    /// The name of the value this option takes, if any.
    pub arg: Option<String>,
    /// The value must be attached with `=`.
    pub require_eq: bool,
}

/// A positional argument, `<name>` or `<name>...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// Byte offset into the template text, if the error has a location.
    pub offset: Option<usize>,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    EmptyToken,
    StrayChar(char),
    UnterminatedGroup,
    EmptyGroup,
    EmptyAlternative,
    NestedGroup,
    UnterminatedArg,
    EmptyArg,
    VariadicValue,
    ValueOnWord(String),
    ShorthandOutsideGroup(String),
    AlternationInShorthand,
    UnterminatedShorthand,
    FieldConflict { field: String, first: String, second: String },
    KindConflict(String),
    RepeatedToken(String),
}

impl std::error::Error for PatternError {}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(offset) = self.offset {
            write!(f, "at offset {offset}: ")?;
        }
        match &self.reason {
            Reason::EmptyToken => f.write_str("expected a token"),
            Reason::StrayChar(c) => write!(f, "unexpected '{c}'"),
            Reason::UnterminatedGroup => f.write_str("unterminated '['"),
            Reason::EmptyGroup => f.write_str("empty '[]' group"),
            Reason::EmptyAlternative => f.write_str("empty alternative in '[...]' group"),
            Reason::NestedGroup => f.write_str("'[...]' groups cannot be nested"),
            Reason::UnterminatedArg => f.write_str("unterminated '<'"),
            Reason::EmptyArg => f.write_str("empty argument name '<>'"),
            Reason::VariadicValue => f.write_str("an option value cannot be variadic"),
            Reason::ValueOnWord(word) => write!(f, "command word '{word}' cannot take a value"),
            Reason::ShorthandOutsideGroup(token) => {
                write!(f, "shorthand '{token}' is only allowed inside '[...]'")
            }
            Reason::AlternationInShorthand => f.write_str("'|' is not allowed inside a shorthand"),
            Reason::UnterminatedShorthand => f.write_str("unterminated shorthand '['"),
            Reason::FieldConflict { field, first, second } => {
                write!(f, "'{first}' and '{second}' both map to the field '{field}'")
            }
            Reason::KindConflict(token) => {
                write!(f, "'{token}' is used with different meanings")
            }
            Reason::RepeatedToken(token) => {
                write!(f, "'{token}' appears more than once in one usage line")
            }
        }
    }
}

impl PatternError {
    fn at(offset: usize, reason: Reason) -> Self {
        Self { offset: Some(offset), reason }
    }
}

type PResult<T> = Result<T, PatternError>;

impl Template {
    /// Parse a template. Each non-blank line is a usage line.
    pub fn parse(text: &str) -> PResult<Self> {
        let mut patterns = Vec::new();
        let mut base = 0;
        for line in text.split('\n') {
            if !line.trim().is_empty() {
                patterns.push(Cursor::new(line, base).pattern()?);
            }
            base += line.len() + 1;
        }
        Ok(Self { patterns })
    }

    /// The flat table of elements, in order of first appearance.
    ///
    /// The same token used in several lines is one element. A token repeated within one line,
    /// two different tokens mapping to one field, or one token used with two meanings are
    /// rejected.
    pub fn elements(&self) -> PResult<Vec<ElementDecl>> {
        let mut out: Vec<ElementDecl> = Vec::new();
        for pattern in &self.patterns {
            let mut seen = Vec::new();
            for decl in pattern.declarations() {
                let decl = decl?;
                if seen.contains(&decl.token) {
                    return Err(PatternError {
                        offset: None,
                        reason: Reason::RepeatedToken(decl.to_string()),
                    });
                }
                seen.push(decl.token.clone());
                Self::add_element(&mut out, decl)?;
            }
        }
        Ok(out)
    }

    fn add_element(out: &mut Vec<ElementDecl>, decl: ElementDecl) -> PResult<()> {
        if let Some(prev) = out.iter().find(|e| e.token == decl.token) {
            if *prev != decl {
                return Err(PatternError {
                    offset: None,
                    reason: Reason::KindConflict(decl.token),
                });
            }
            return Ok(());
        }
        if let Some(prev) = out.iter().find(|e| e.field == decl.field) {
            return Err(PatternError {
                offset: None,
                reason: Reason::FieldConflict {
                    field: decl.field,
                    first: prev.token.clone(),
                    second: decl.token,
                },
            });
        }
        out.push(decl);
        Ok(())
    }
}

impl Pattern {
    pub fn parse(line: &str) -> PResult<Self> {
        Cursor::new(line, 0).pattern()
    }

    fn declarations(&self) -> impl Iterator<Item = PResult<ElementDecl>> + '_ {
        self.items.iter().flat_map(|item| -> Vec<PResult<ElementDecl>> {
            match item {
                Item::Command(opt) => vec![ElementDecl::of_opt(opt, true)],
                Item::Arg(arg) => vec![Ok(ElementDecl::of_arg(arg))],
                Item::Optional(group) => group
                    .alternatives
                    .iter()
                    .map(|alt| match alt {
                        Alternative::Opt(opt) => ElementDecl::of_opt(opt, false),
                        Alternative::Arg(arg) => Ok(ElementDecl::of_arg(arg)),
                    })
                    .collect(),
            }
        })
    }
}

/// A named thing in a template, with the field it is recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    /// `-a`, `--file`, `commit`, or `<path>` for positionals.
    pub token: String,
    pub field: String,
    pub kind: ElementKind,
    /// Display name of the value, for options taking one.
    pub value_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Flag,
    Value { require_eq: bool },
    Positional { variadic: bool },
    Word,
}

impl ElementKind {
    pub fn is_named(self) -> bool {
        matches!(self, Self::Flag | Self::Value { .. })
    }
}

impl ElementDecl {
    fn of_opt(opt: &Opt, top_level: bool) -> PResult<Self> {
        if !is_option(&opt.name) {
            if opt.arg.is_some() {
                return Err(PatternError {
                    offset: None,
                    reason: Reason::ValueOnWord(opt.name.clone()),
                });
            }
            return Ok(Self {
                token: opt.name.clone(),
                field: field_name(&opt.name),
                kind: ElementKind::Word,
                value_name: None,
            });
        }
        Ok(match &opt.arg {
            Some(arg) => Self {
                token: opt.name.clone(),
                field: field_name(arg),
                kind: ElementKind::Value { require_eq: opt.require_eq || top_level },
                value_name: Some(arg.clone()),
            },
            None => Self {
                token: opt.name.clone(),
                field: field_name(&opt.name),
                kind: ElementKind::Flag,
                value_name: None,
            },
        })
    }

    fn of_arg(arg: &Arg) -> Self {
        Self {
            token: arg.token(),
            field: field_name(&arg.name),
            kind: ElementKind::Positional { variadic: arg.variadic },
            value_name: None,
        }
    }
}

impl fmt::Display for ElementDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)?;
        match (self.kind, &self.value_name) {
            (ElementKind::Value { require_eq: true }, Some(v)) => write!(f, "=<{v}>"),
            (ElementKind::Value { require_eq: false }, Some(v)) => write!(f, " <{v}>"),
            (ElementKind::Positional { variadic: true }, _) => f.write_str("..."),
            _ => Ok(()),
        }
    }
}

impl Arg {
    pub fn token(&self) -> String {
        format!("<{}>", self.name)
    }
}

/// Options start with `-`. A lone `-` is a word.
pub fn is_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// `--reset-author` => `reset_author`, `-N` => `N`.
pub fn field_name(token: &str) -> String {
    token.trim_start_matches('-').replace('-', "_")
}

/// The Rust identifier (without `r#`) a field is exposed as in generated structs.
pub fn rust_ident(field: &str) -> String {
    use heck::ToSnakeCase;

    let mut ident = field.to_snake_case();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if matches!(ident.as_str(), "self" | "Self" | "super" | "crate" | "_") {
        ident.push('_');
    }
    ident
}

pub fn is_rust_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "gen"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "yield"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "try"
            | "typeof"
            | "unsized"
            | "virtual"
    )
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, base: usize) -> Self {
        Self { src, pos: 0, base }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn err(&self, reason: Reason) -> PatternError {
        PatternError::at(self.base + self.pos, reason)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.pos += 1;
        }
    }

    fn pattern(&mut self) -> PResult<Pattern> {
        let mut items = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                None => break,
                Some(b'[') => items.push(Item::Optional(self.optional()?)),
                Some(b'<') => items.push(Item::Arg(self.arg()?)),
                Some(c @ (b']' | b'|')) => return Err(self.err(Reason::StrayChar(c.into()))),
                Some(_) => {
                    let start = self.pos;
                    let mut names = self.names()?;
                    if names.len() != 1 {
                        let token = self.src[start..self.pos].to_owned();
                        return Err(PatternError::at(
                            self.base + start,
                            Reason::ShorthandOutsideGroup(token),
                        ));
                    }
                    let name = names.swap_remove(0);
                    let mut opt = Opt { name, arg: None, require_eq: false };
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        opt.arg = Some(self.value()?);
                        opt.require_eq = true;
                    }
                    items.push(Item::Command(opt));
                }
            }
        }
        Ok(Pattern { items })
    }

    fn optional(&mut self) -> PResult<Optional> {
        let open = self.pos;
        self.pos += 1;
        let mut alternatives = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                None => return Err(PatternError::at(self.base + open, Reason::UnterminatedGroup)),
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(b'|') => return Err(self.err(Reason::EmptyAlternative)),
                Some(b'[') => return Err(self.err(Reason::NestedGroup)),
                Some(b'<') => alternatives.push(Alternative::Arg(self.arg()?)),
                Some(_) => {
                    let mut names = self.names()?;
                    if names.len() > 1 {
                        if self.peek() == Some(b'=') {
                            return Err(self.err(Reason::StrayChar('=')));
                        }
                        alternatives.extend(names.into_iter().map(|name| {
                            Alternative::Opt(Opt { name, arg: None, require_eq: false })
                        }));
                    } else {
                        let name = names.swap_remove(0);
                        let opt = self.option_value(name)?;
                        alternatives.push(Alternative::Opt(opt));
                    }
                }
            }

            self.skip_spaces();
            if self.peek() == Some(b'|') {
                self.pos += 1;
                self.skip_spaces();
                if matches!(self.peek(), Some(b'|' | b']')) {
                    return Err(self.err(Reason::EmptyAlternative));
                }
            }
        }
        if alternatives.is_empty() {
            return Err(PatternError::at(self.base + open, Reason::EmptyGroup));
        }
        Ok(Optional { alternatives })
    }

    /// The value following an option inside a group: `=<arg>`, ` <arg>`, or nothing.
    fn option_value(&mut self, name: String) -> PResult<Opt> {
        if self.peek() == Some(b'=') {
            self.pos += 1;
            let arg = self.value()?;
            return Ok(Opt { name, arg: Some(arg), require_eq: true });
        }
        let save = self.pos;
        self.skip_spaces();
        if self.peek() == Some(b'<') {
            if !is_option(&name) {
                return Err(self.err(Reason::ValueOnWord(name)));
            }
            let arg = self.value()?;
            return Ok(Opt { name, arg: Some(arg), require_eq: false });
        }
        self.pos = save;
        Ok(Opt { name, arg: None, require_eq: false })
    }

    fn value(&mut self) -> PResult<String> {
        if self.peek() != Some(b'<') {
            return Err(self.err(Reason::EmptyArg));
        }
        let arg = self.arg()?;
        if arg.variadic {
            return Err(self.err(Reason::VariadicValue));
        }
        Ok(arg.name)
    }

    fn arg(&mut self) -> PResult<Arg> {
        let open = self.pos;
        let Some(len) = self.rest()[1..].find('>') else {
            return Err(PatternError::at(self.base + open, Reason::UnterminatedArg));
        };
        if len == 0 {
            return Err(PatternError::at(self.base + open, Reason::EmptyArg));
        }
        let name = self.rest()[1..1 + len].to_owned();
        self.pos += len + 2;
        let variadic = self.rest().starts_with("...");
        if variadic {
            self.pos += 3;
        }
        Ok(Arg { name, variadic })
    }

    /// Read a token, expanding shorthand segments like `--[no-]verify`.
    ///
    /// Variants omitting a segment come before variants including it.
    fn names(&mut self) -> PResult<Vec<String>> {
        let src = self.src;
        let start = self.pos;
        // (is_optional, text)
        let mut segments: Vec<(bool, &str)> = Vec::new();
        let mut seg_start = self.pos;
        while let Some(c) = self.peek() {
            match c {
                b' ' | b'\t' | b'\r' | b'|' | b']' | b'=' | b'<' => break,
                b'[' if self.pos == start => break,
                b'[' => {
                    segments.push((false, &src[seg_start..self.pos]));
                    let open = self.pos;
                    let Some(len) = self.rest()[1..].find(|c: char| matches!(c, ']' | '|' | '[' | ' '))
                    else {
                        return Err(PatternError::at(self.base + open, Reason::UnterminatedShorthand));
                    };
                    match self.rest().as_bytes()[1 + len] {
                        b']' => {}
                        b'|' => return Err(self.err(Reason::AlternationInShorthand)),
                        _ => {
                            return Err(PatternError::at(
                                self.base + open,
                                Reason::UnterminatedShorthand,
                            ));
                        }
                    }
                    segments.push((true, &self.rest()[1..1 + len]));
                    self.pos += len + 2;
                    seg_start = self.pos;
                }
                _ => self.pos += 1,
            }
        }
        segments.push((false, &src[seg_start..self.pos]));
        if self.pos == start {
            return Err(self.err(Reason::EmptyToken));
        }

        let mut names = vec![String::new()];
        for (optional, text) in segments {
            if optional {
                names = names
                    .into_iter()
                    .flat_map(|prefix| [prefix.clone(), prefix + text])
                    .collect();
            } else {
                names.iter_mut().for_each(|name| name.push_str(text));
            }
        }
        Ok(names)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            pattern.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            match item {
                Item::Command(opt) => opt.fmt(f)?,
                Item::Arg(arg) => arg.fmt(f)?,
                Item::Optional(group) => {
                    f.write_str("[")?;
                    for (j, alt) in group.alternatives.iter().enumerate() {
                        if j != 0 {
                            f.write_str(" | ")?;
                        }
                        match alt {
                            Alternative::Opt(opt) => opt.fmt(f)?,
                            Alternative::Arg(arg) => arg.fmt(f)?,
                        }
                    }
                    f.write_str("]")?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match &self.arg {
            Some(arg) if self.require_eq => write!(f, "=<{arg}>"),
            Some(arg) => write!(f, " <{arg}>"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name)?;
        if self.variadic {
            f.write_str("...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(name: &str) -> Alternative {
        Alternative::Opt(Opt { name: name.into(), arg: None, require_eq: false })
    }

    fn single_group(line: &str) -> Vec<Alternative> {
        let pattern = Pattern::parse(line).unwrap();
        assert_eq!(pattern.items.len(), 1, "{pattern:?}");
        match &pattern.items[0] {
            Item::Optional(group) => group.alternatives.clone(),
            item => panic!("not a group: {item:?}"),
        }
    }

    #[test]
    fn command_token() {
        let pattern = Pattern::parse("cmd1 --option").unwrap();
        assert_eq!(
            pattern.items,
            [
                Item::Command(Opt { name: "cmd1".into(), arg: None, require_eq: false }),
                Item::Command(Opt { name: "--option".into(), arg: None, require_eq: false }),
            ]
        );
        assert_eq!(Pattern::parse("cmd").unwrap().items.len(), 1);
    }

    #[test]
    fn optional_simple() {
        assert_eq!(single_group("[--option]"), [opt("--option")]);
    }

    #[test]
    fn optional_mutually_exclusive() {
        assert_eq!(single_group("[--option|--no-option]"), [opt("--option"), opt("--no-option")]);
        assert_eq!(
            single_group("[ -a | --interactive | --patch ]"),
            [opt("-a"), opt("--interactive"), opt("--patch")]
        );
    }

    #[test]
    fn optional_shorthand() {
        assert_eq!(single_group("[--[no-]option]"), [opt("--option"), opt("--no-option")]);
        assert_eq!(
            single_group("[-f | --[no-]recommend-shallow]"),
            [opt("-f"), opt("--recommend-shallow"), opt("--no-recommend-shallow")]
        );
    }

    #[test]
    fn optional_with_values() {
        assert_eq!(
            single_group("[-F <file> | -m <msg> | --author=<author>]"),
            [
                Alternative::Opt(Opt { name: "-F".into(), arg: Some("file".into()), require_eq: false }),
                Alternative::Opt(Opt { name: "-m".into(), arg: Some("msg".into()), require_eq: false }),
                Alternative::Opt(Opt {
                    name: "--author".into(),
                    arg: Some("author".into()),
                    require_eq: true
                }),
            ]
        );
    }

    #[test]
    fn varargs() {
        assert_eq!(
            single_group("[<pathspec>...]"),
            [Alternative::Arg(Arg { name: "pathspec".into(), variadic: true })]
        );
    }

    #[test]
    fn pattern_with_arg() {
        let pattern = Pattern::parse("add <file>").unwrap();
        assert_eq!(pattern.items[1], Item::Arg(Arg { name: "file".into(), variadic: false }));
    }

    #[test]
    fn mandatory_flag_and_option() {
        let pattern = Pattern::parse("branch -d <branchname>").unwrap();
        assert_eq!(pattern.items.len(), 3);
        assert_eq!(
            pattern.items[1],
            Item::Command(Opt { name: "-d".into(), arg: None, require_eq: false })
        );

        let pattern = Pattern::parse("branch --set-upstream-to=<upstream>").unwrap();
        assert_eq!(
            pattern.items[1],
            Item::Command(Opt {
                name: "--set-upstream-to".into(),
                arg: Some("upstream".into()),
                require_eq: true
            })
        );

        // Without `=`, the argument is a separate positional.
        let pattern = Pattern::parse("branch --set-upstream-to <upstream>").unwrap();
        assert_eq!(pattern.items[2], Item::Arg(Arg { name: "upstream".into(), variadic: false }));
    }

    #[test]
    fn display_roundtrip() {
        let text = "submodule [--quiet] update [--init] [-N | --no-fetch] \
                    [--recommend-shallow | --no-recommend-shallow] [--rebase | --merge]";
        let template =
            Template::parse("submodule [--quiet] update [--init] [-N|--no-fetch] [--[no-]recommend-shallow] [--rebase|--merge]")
                .unwrap();
        assert_eq!(template.to_string(), text);
        assert_eq!(Template::parse(text).unwrap(), template);
    }

    #[test]
    fn multiple_lines() {
        let template = Template::parse(
            "[--common-option] cmd1 [--same] [--cmd1-option]\n\n[--common-option] cmd2 [--same] [--cmd2-option]\n",
        )
        .unwrap();
        assert_eq!(template.patterns.len(), 2);

        let tokens = template.elements().unwrap().into_iter().map(|e| e.token).collect::<Vec<_>>();
        assert_eq!(
            tokens,
            ["--common-option", "cmd1", "--same", "--cmd1-option", "cmd2", "--cmd2-option"]
        );
    }

    #[test]
    fn element_fields() {
        let template =
            Template::parse("commit [-a | --interactive] [-F <file> | -m <msg>] [--reset-author] [<pathspec>...]")
                .unwrap();
        let elements = template.elements().unwrap();
        let fields = elements.iter().map(|e| (e.field.as_str(), e.kind)).collect::<Vec<_>>();
        assert_eq!(
            fields,
            [
                ("commit", ElementKind::Word),
                ("a", ElementKind::Flag),
                ("interactive", ElementKind::Flag),
                ("file", ElementKind::Value { require_eq: false }),
                ("msg", ElementKind::Value { require_eq: false }),
                ("reset_author", ElementKind::Flag),
                ("pathspec", ElementKind::Positional { variadic: true }),
            ]
        );
        assert_eq!(elements[3].to_string(), "-F <file>");
        assert_eq!(elements[6].to_string(), "<pathspec>...");
    }

    #[test]
    fn element_conflicts() {
        let err = Template::parse("[-a] [--a]").unwrap().elements().unwrap_err();
        assert_eq!(
            err.reason,
            Reason::FieldConflict { field: "a".into(), first: "-a".into(), second: "--a".into() }
        );

        let err = Template::parse("[-F <file>]\n[-F]").unwrap().elements().unwrap_err();
        assert_eq!(err.reason, Reason::KindConflict("-F".into()));

        let err = Template::parse("[add <file>]").unwrap_err();
        assert_eq!(err.reason, Reason::ValueOnWord("add".into()));

        let err = Template::parse("diff <path> <path>").unwrap().elements().unwrap_err();
        assert_eq!(err.reason, Reason::RepeatedToken("<path>".into()));
        assert_eq!(err.to_string(), "'<path>' appears more than once in one usage line");
        let err = Template::parse("[-v] [-v]").unwrap().elements().unwrap_err();
        assert_eq!(err.reason, Reason::RepeatedToken("-v".into()));
        // Across lines a token is shared.
        let elements = Template::parse("diff <path>\nshow <path>").unwrap().elements().unwrap();
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn grammar_errors() {
        let reason = |s: &str| Template::parse(s).unwrap_err();
        assert_eq!(reason("cmd [-a"), PatternError::at(4, Reason::UnterminatedGroup));
        assert_eq!(reason("cmd []"), PatternError::at(4, Reason::EmptyGroup));
        assert_eq!(reason("[-a | | -b]"), PatternError::at(6, Reason::EmptyAlternative));
        assert_eq!(reason("[-a [-b]]"), PatternError::at(4, Reason::NestedGroup));
        assert_eq!(reason("cmd <file"), PatternError::at(4, Reason::UnterminatedArg));
        assert_eq!(reason("cmd <>"), PatternError::at(4, Reason::EmptyArg));
        assert_eq!(reason("cmd ]"), PatternError::at(4, Reason::StrayChar(']')));
        assert_eq!(
            reason("--[no-]verify"),
            PatternError::at(0, Reason::ShorthandOutsideGroup("--[no-]verify".into()))
        );
        assert_eq!(reason("[--[no|x]-verify]"), PatternError::at(3, Reason::AlternationInShorthand));
        // Offsets count from the start of the template.
        assert_eq!(reason("ok\ncmd ]"), PatternError::at(7, Reason::StrayChar(']')));
    }

    #[test]
    fn names() {
        assert_eq!(field_name("--reset-author"), "reset_author");
        assert_eq!(field_name("-N"), "N");
        assert_eq!(rust_ident("N"), "n");
        assert_eq!(rust_ident("no_fetch"), "no_fetch");
        assert_eq!(rust_ident("1"), "_1");
        assert_eq!(rust_ident("self"), "self_");
        assert!(is_rust_keyword("type"));
        assert!(!is_option("-"));
        assert!(is_option("-a"));
    }
}
