use crate::Matches;
use crate::pattern::Pattern;
use crate::schema::Schema;

#[inline(never)]
fn push_str(out: &mut String, s: &str) {
    out.push_str(s);
}

impl Schema {
    /// Render usage lines and the option list for `program`.
    pub fn usage(&self, program: &str) -> String {
        let mut out = String::new();
        render_usage_into(&mut out, self, program, &self.template().patterns);
        out
    }

    /// Like [`Schema::usage`], but only showing the usage line `matches` was bound to.
    pub fn usage_for(&self, program: &str, matches: &Matches) -> String {
        let patterns = &self.template().patterns;
        let selected = match matches.line() {
            Some(i) if i < patterns.len() => std::slice::from_ref(&patterns[i]),
            _ => patterns.as_slice(),
        };
        let mut out = String::new();
        render_usage_into(&mut out, self, program, selected);
        out
    }
}

#[cold]
fn render_usage_into(out: &mut String, schema: &Schema, program: &str, patterns: &[Pattern]) {
    macro_rules! w {
        ($($e:expr),*) => {{
            $(push_str(out, $e);)*
        }};
    }

    // Usage lines, aligned under the first one.

    w!("Usage:");
    if patterns.is_empty() {
        w!(" ", program, "\n");
    }
    for (i, pattern) in patterns.iter().enumerate() {
        w!(if i == 0 { " " } else { "       " }, program);
        let line = pattern.to_string();
        if !line.is_empty() {
            w!(" ", &line);
        }
        w!("\n");
    }

    // List of named arguments, in the order they first appear.

    w!("\nOptions:\n");
    for elem in schema.elements().iter().filter(|e| e.kind.is_named()) {
        w!("  ", &elem.to_string(), "\n");
    }
    if !schema.defines_help() {
        w!("  -h, --help  Print help\n");
    }
}
