use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// The configuration record filled by parsing.
///
/// Fields are keyed by their field name (`--reset-author` => `reset_author`, `-F <file>` =>
/// `file`). An absent field is unset; flags and command words are present without values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    help: bool,
    line: Option<usize>,
    fields: BTreeMap<String, Vec<OsString>>,
}

impl Matches {
    /// Was `-h` or `--help` given?
    pub fn help(&self) -> bool {
        self.help
    }

    /// The index of the usage line the arguments were bound to.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn is_present(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Alias of [`Matches::is_present`] reading better for flags.
    pub fn flag(&self, field: &str) -> bool {
        self.is_present(field)
    }

    pub fn value_os(&self, field: &str) -> Option<&OsStr> {
        self.values_os(field).first().map(OsString::as_os_str)
    }

    /// The first value of `field`, if it is present and valid UTF-8.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.value_os(field).and_then(OsStr::to_str)
    }

    pub fn values_os(&self, field: &str) -> &[OsString] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Present fields in field name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OsString])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub(crate) fn set_help(&mut self) {
        self.help = true;
    }

    pub(crate) fn set_line(&mut self, line: usize) {
        self.line = Some(line);
    }

    /// Mark `field` present. Returns `false` if it already was.
    pub(crate) fn insert(&mut self, field: &str, values: Vec<OsString>) -> bool {
        if self.fields.contains_key(field) {
            return false;
        }
        self.fields.insert(field.to_owned(), values);
        true
    }
}
