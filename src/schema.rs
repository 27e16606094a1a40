use std::collections::HashMap;

use crate::Result;
use crate::pattern::{Alternative, ElementDecl, Item, Pattern, Template, is_option};

/// A compiled usage template.
///
/// Compilation resolves every token to an element once, so parsing and validation only deal
/// with element indices.
#[derive(Debug, Clone)]
pub struct Schema {
    template: Template,
    elements: Vec<ElementDecl>,
    by_token: HashMap<String, usize>,
    lines: Vec<Line>,
}

/// One usage line, resolved.
#[derive(Debug, Clone, Default)]
pub(crate) struct Line {
    /// Word-consuming slots in order.
    pub(crate) slots: Vec<Slot>,
    /// For each slot, the number of words the slots after it cannot do without.
    pub(crate) need_after: Vec<usize>,
    /// Options accepted on this line.
    pub(crate) named: Vec<usize>,
    /// Options that must be given on this line.
    pub(crate) required: Vec<usize>,
    /// Mutually exclusive alternatives, one entry per `[...]` group of two or more.
    pub(crate) groups: Vec<Vec<usize>>,
}

#[derive(Debug, Clone)]
pub(crate) enum Slot {
    /// A required command word.
    Word(usize),
    /// Optional command words of one group.
    Words(Vec<usize>),
    Arg { element: usize, required: bool, variadic: bool },
}

impl Slot {
    fn need(&self) -> usize {
        match self {
            Slot::Word(_) | Slot::Arg { required: true, .. } => 1,
            Slot::Words(_) | Slot::Arg { required: false, .. } => 0,
        }
    }
}

impl Schema {
    /// Compile a usage template, one usage line per text line.
    pub fn compile(usage: &str) -> Result<Self> {
        Self::from_template(Template::parse(usage)?)
    }

    pub fn from_template(template: Template) -> Result<Self> {
        let elements = template.elements()?;
        let by_token: HashMap<String, usize> =
            elements.iter().enumerate().map(|(i, e)| (e.token.clone(), i)).collect();

        let mut lines =
            template.patterns.iter().map(|p| Line::resolve(p, &by_token)).collect::<Vec<_>>();
        // An empty template accepts an empty command line.
        if lines.is_empty() {
            lines.push(Line::default());
        }
        tracing::trace!(elements = elements.len(), lines = lines.len(), "compiled usage template");

        Ok(Self { template, elements, by_token, lines })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn elements(&self) -> &[ElementDecl] {
        &self.elements
    }

    /// Does the template define `-h` or `--help` itself? Then they are not help requests.
    pub fn defines_help(&self) -> bool {
        self.by_token.contains_key("-h") || self.by_token.contains_key("--help")
    }

    pub(crate) fn element(&self, idx: usize) -> &ElementDecl {
        &self.elements[idx]
    }

    pub(crate) fn lookup_named(&self, token: &str) -> Option<usize> {
        self.by_token.get(token).copied().filter(|&i| self.elements[i].kind.is_named())
    }

    pub(crate) fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Does any usage line start with, or contain, command words?
    pub(crate) fn has_words(&self) -> bool {
        self.lines.iter().any(|line| line.slots.iter().any(|s| matches!(s, Slot::Word(_))))
    }
}

impl Line {
    fn resolve(pattern: &Pattern, by_token: &HashMap<String, usize>) -> Self {
        // Every token was declared by `Template::elements`.
        let idx = |token: &str| by_token[token];

        let mut line = Line::default();
        for item in &pattern.items {
            match item {
                Item::Command(opt) if is_option(&opt.name) => {
                    let e = idx(&opt.name);
                    line.add_named(e);
                    line.required.push(e);
                }
                Item::Command(opt) => line.slots.push(Slot::Word(idx(&opt.name))),
                Item::Arg(arg) => line.slots.push(Slot::Arg {
                    element: idx(&arg.token()),
                    required: true,
                    variadic: arg.variadic,
                }),
                Item::Optional(group) => {
                    let mut members = Vec::new();
                    let mut words = Vec::new();
                    for alt in &group.alternatives {
                        match alt {
                            Alternative::Opt(opt) => {
                                let e = idx(&opt.name);
                                if is_option(&opt.name) {
                                    line.add_named(e);
                                } else {
                                    words.push(e);
                                }
                                members.push(e);
                            }
                            Alternative::Arg(arg) => {
                                if !words.is_empty() {
                                    line.slots.push(Slot::Words(std::mem::take(&mut words)));
                                }
                                let e = idx(&arg.token());
                                line.slots.push(Slot::Arg {
                                    element: e,
                                    required: false,
                                    variadic: arg.variadic,
                                });
                                members.push(e);
                            }
                        }
                    }
                    if !words.is_empty() {
                        line.slots.push(Slot::Words(words));
                    }
                    members.dedup();
                    if members.len() > 1 {
                        line.groups.push(members);
                    }
                }
            }
        }

        let mut need = 0;
        line.need_after = vec![0; line.slots.len()];
        for (k, slot) in line.slots.iter().enumerate().rev() {
            line.need_after[k] = need;
            need += slot.need();
        }
        line
    }

    fn add_named(&mut self, e: usize) {
        if !self.named.contains(&e) {
            self.named.push(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots() {
        let schema = Schema::compile("branch [-f] [<oldbranch>] <newbranch> [<rest>...]").unwrap();
        let line = &schema.lines()[0];
        assert_eq!(line.slots.len(), 4);
        assert_eq!(line.need_after, [1, 1, 0, 0]);
        assert_eq!(line.named, [schema.lookup_named("-f").unwrap()]);
        assert!(line.required.is_empty());
        assert!(line.groups.is_empty());
        assert!(schema.has_words());
    }

    #[test]
    fn groups_and_required() {
        let schema = Schema::compile("[-a | --interactive | --patch] --set-upstream-to=<upstream>")
            .unwrap();
        let line = &schema.lines()[0];
        assert_eq!(line.groups.len(), 1);
        assert_eq!(line.groups[0].len(), 3);
        assert_eq!(line.required, [schema.lookup_named("--set-upstream-to").unwrap()]);
        assert_eq!(schema.elements()[line.required[0]].field, "upstream");
        assert!(!schema.has_words());
        assert!(!schema.defines_help());
    }

    #[test]
    fn empty_template() {
        let schema = Schema::compile("").unwrap();
        assert_eq!(schema.lines().len(), 1);
        assert!(schema.elements().is_empty());
    }

    #[test]
    fn positionals_are_not_named() {
        let schema = Schema::compile("cmd <file> [-v]").unwrap();
        assert_eq!(schema.lookup_named("<file>"), None);
        assert_eq!(schema.lookup_named("cmd"), None);
        assert!(schema.lookup_named("-v").is_some());
    }
}
