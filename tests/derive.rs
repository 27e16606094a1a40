#![cfg(feature = "derive")]
use std::ffi::OsString;
use std::fmt::Debug;
use std::path::PathBuf;

use expect_test::{Expect, expect};
use genopts::{Cli, Outcome, ParseOptions};

#[track_caller]
fn check<P: Cli + Debug + PartialEq>(
    args: impl IntoIterator<Item = impl Into<OsString>>,
    expect: &P,
) {
    let got = P::try_parse_from(args).unwrap().parsed().unwrap();
    assert_eq!(got, *expect);
}

#[track_caller]
fn check_err<P: Cli + Debug>(args: impl IntoIterator<Item = impl Into<OsString>>, expect: Expect) {
    let ret = P::try_parse_with(args, ParseOptions::default().usage(false)).unwrap_err();
    expect.assert_eq(&ret.to_string());
}

#[derive(Debug, PartialEq, Cli)]
#[cli(usage = "commit [-a | --interactive | --patch] [-F <file> | -m <msg>] [--reset-author]")]
struct Commit {
    a: bool,
    interactive: bool,
    patch: bool,
    file: Option<PathBuf>,
    msg: Option<String>,
    reset_author: bool,
}

#[test]
fn argv0() {
    check_err::<Commit>(None::<&str>, expect!["missing executable argument (argv[0])"]);
}

#[test]
fn smoke() {
    check(
        ["/usr/bin/git", "commit", "-a", "-F", "log.txt", "--reset-author"],
        &Commit {
            a: true,
            interactive: false,
            patch: false,
            file: Some("log.txt".into()),
            msg: None,
            reset_author: true,
        },
    );
    check_err::<Commit>(["git", "commit", "-F", "a", "-m", "b"], expect!["only one of -F, -m may be given"]);
    check_err::<Commit>(["git", "push"], expect!["unrecognized subcommand 'push'"]);
}

#[test]
fn help() {
    let ret = Commit::try_parse_from(["/usr/bin/git", "commit", "--help"]).unwrap();
    #[cfg(feature = "help")]
    {
        let Outcome::Help { usage: Some(usage) } = ret else { panic!("no usage: {ret:?}") };
        assert!(usage.starts_with("Usage: git commit [-a | --interactive | --patch]"));
        assert_eq!(usage, Commit::render_usage("git").unwrap());
    }
    #[cfg(not(feature = "help"))]
    assert_eq!(ret, Outcome::Help { usage: None });

    #[derive(Debug, PartialEq, Cli)]
    #[cli(usage = "[-v]")]
    struct WithHelp {
        v: bool,
        help: bool,
    }
    // The record itself is never built on help.
    let ret = WithHelp::try_parse_with(["prog", "-h"], ParseOptions::bare()).unwrap();
    assert_eq!(ret, Outcome::Help { usage: None });
    check(["prog", "-v"], &WithHelp { v: true, help: false });
}

#[test]
fn typed_values() {
    #[derive(Debug, PartialEq, Cli)]
    #[cli(usage = "[-j <jobs>] [--depth=<depth>] <remote> [<refspec>...]")]
    struct Fetch {
        jobs: Option<usize>,
        depth: Option<u32>,
        remote: String,
        refspec: Vec<OsString>,
    }

    check(
        ["git", "-j4", "--depth=1", "origin", "main", "next"],
        &Fetch {
            jobs: Some(4),
            depth: Some(1),
            remote: "origin".into(),
            refspec: vec!["main".into(), "next".into()],
        },
    );
    check(["git", "origin"], &Fetch { jobs: None, depth: None, remote: "origin".into(), refspec: vec![] });
    check_err::<Fetch>(
        ["git", "-j", "many", "origin"],
        expect!["invalid value 'many' for 'jobs': invalid digit found in string"],
    );
    check_err::<Fetch>(["git"], expect!["argument '<remote>' is required but not provided"]);
}

#[test]
fn renamed() {
    #[derive(Debug, PartialEq, Cli)]
    #[cli(usage = "pull [-N | --[no-]rebase] [--type=<type>]")]
    struct Pull {
        pull: bool,
        #[cli(name = "N")]
        no_fetch: bool,
        rebase: bool,
        no_rebase: bool,
        r#type: Option<String>,
    }

    check(
        ["git", "pull", "--no-rebase", "--type=x"],
        &Pull { pull: true, no_fetch: false, rebase: false, no_rebase: true, r#type: Some("x".into()) },
    );
    check(
        ["git", "pull", "-N"],
        &Pull { pull: true, no_fetch: true, rebase: false, no_rebase: false, r#type: None },
    );
    check_err::<Pull>(["git", "pull", "-N", "--rebase"], expect!["only one of -N, --rebase may be given"]);
}

#[test]
fn multiple_lines() {
    #[derive(Debug, PartialEq, Cli)]
    #[cli(usage = "add [-n] <pathspec>...\nstatus [-s]")]
    struct Git {
        add: bool,
        n: bool,
        pathspec: Vec<PathBuf>,
        status: bool,
        s: bool,
    }

    check(
        ["git", "status", "-s"],
        &Git { add: false, n: false, pathspec: vec![], status: true, s: true },
    );
    check(
        ["git", "add", "a", "b"],
        &Git { add: true, n: false, pathspec: vec!["a".into(), "b".into()], status: false, s: false },
    );
    check_err::<Git>(["git"], expect!["a command is required but not provided"]);
}

#[test]
fn exact_name_first() {
    #[derive(Debug, PartialEq, Cli)]
    #[cli(usage = "add [-N] [-n]")]
    struct Add {
        add: bool,
        n: bool,
        #[cli(name = "N")]
        intent: bool,
    }

    check(["git", "add", "-n"], &Add { add: true, n: true, intent: false });
    check(["git", "add", "-N"], &Add { add: true, n: false, intent: true });
}
