use crate::error::ErrorKind;
use crate::pattern::ElementKind;
use crate::schema::{Schema, Slot};
use crate::{Matches, Result};

/// Check a parsed record against the usage line it was bound to.
///
/// This never mutates the record, so calling it twice gives the same answer. A record asking
/// for help is always valid.
pub fn validate(schema: &Schema, matches: &Matches) -> Result<()> {
    if matches.help() {
        return Ok(());
    }

    let Some(line) = matches.line().and_then(|i| schema.lines().get(i)) else {
        if schema.has_words() {
            return Err(ErrorKind::MissingCommand.into());
        }
        // Words always bind when there is no command word, so this is unreachable for records
        // produced by `Schema::parse`.
        return Ok(());
    };
    tracing::debug!(line = ?matches.line(), "validating");

    for (idx, elem) in schema.elements().iter().enumerate() {
        if elem.kind.is_named() && matches.is_present(&elem.field) && !line.named.contains(&idx) {
            return Err(ErrorKind::NotInUsage.with_arg(&elem.token));
        }
    }

    for &idx in &line.required {
        let elem = schema.element(idx);
        if !matches.is_present(&elem.field) {
            return Err(ErrorKind::MissingRequiredArgument.with_arg(elem.to_string()));
        }
    }

    for slot in &line.slots {
        if let Slot::Arg { element, required: true, .. } = *slot {
            let elem = schema.element(element);
            if !matches.is_present(&elem.field) {
                return Err(ErrorKind::MissingRequiredArgument.with_arg(elem.to_string()));
            }
        }
    }

    for group in &line.groups {
        let given = group
            .iter()
            .map(|&idx| schema.element(idx))
            .filter(|elem| matches.is_present(&elem.field))
            .collect::<Vec<_>>();
        if given.len() > 1 {
            let names = given
                .iter()
                .map(|elem| match elem.kind {
                    ElementKind::Positional { .. } => elem.to_string(),
                    _ => elem.token.clone(),
                })
                .collect::<Vec<_>>();
            return Err(ErrorKind::Conflict.with_arg(names.join(", ")));
        }
    }

    Ok(())
}

impl Schema {
    /// See [`validate`].
    pub fn validate(&self, matches: &Matches) -> Result<()> {
        validate(self, matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(usage: &str, args: &[&str]) -> Result<()> {
        let schema = Schema::compile(usage).unwrap();
        let matches = schema.parse(args).unwrap();
        let ret = schema.validate(&matches);
        // Idempotent.
        assert_eq!(
            ret.as_ref().map_err(|e| e.to_string()),
            schema.validate(&matches).as_ref().map_err(|e| e.to_string()),
        );
        ret
    }

    fn kind(usage: &str, args: &[&str]) -> ErrorKind {
        check(usage, args).unwrap_err().kind()
    }

    #[test]
    fn accepts() {
        let commit = "commit [-a | --interactive | --patch] [-F <file> | -m <msg>] [--reset-author]";
        check(commit, &["commit"]).unwrap();
        check(commit, &["commit", "-a", "-m", "msg", "--reset-author"]).unwrap();
        check("[-v]", &[]).unwrap();
        check("", &[]).unwrap();
    }

    #[test]
    fn conflict() {
        let commit = "commit [-a | --interactive | --patch] [-F <file> | -m <msg>]";
        let err = check(commit, &["commit", "-F", "f", "-m", "msg"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "only one of -F, -m may be given");

        let err = check(commit, &["commit", "--patch", "-a"]).unwrap_err();
        assert_eq!(err.to_string(), "only one of -a, --patch may be given");

        // Shorthand members exclude each other too.
        assert_eq!(kind("[--[no-]edit]", &["--edit", "--no-edit"]), ErrorKind::Conflict);
    }

    #[test]
    fn missing() {
        let git = "add [-n] <pathspec>...\nstatus [-s]";
        let err = check(git, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCommand);
        assert!(err.is_validation());

        let err = check(git, &["add"]).unwrap_err();
        assert_eq!(err.to_string(), "argument '<pathspec>...' is required but not provided");

        let err = check("--set-upstream-to=<upstream> [-q]", &["-q"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "argument '--set-upstream-to=<upstream>' is required but not provided",
        );
    }

    #[test]
    fn not_in_usage() {
        let git = "add [-n] <pathspec>...\nstatus [-s]";
        let err = check(git, &["status", "-n"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInUsage);
        assert_eq!(err.to_string(), "the argument '-n' cannot be used here");
        check(git, &["add", "-n", "a", "b"]).unwrap();
    }

    #[test]
    fn help_is_valid() {
        let schema = Schema::compile("commit --amend").unwrap();
        let matches = schema.parse(["--help"]).unwrap();
        assert!(matches.help());
        validate(&schema, &matches).unwrap();
    }
}
