//! Shared test-only helpers.

use std::fmt::{Arguments, Debug};

/// Asserts that an expression matches the given pattern.
///
/// The pattern can be optionally followed by a match guard. This works
/// like the unstable `assert_matches!()` macro (rust-lang/rust#82775).
macro_rules! assert_matches {
    ($left:expr, $($pattern:pat_param)|+ $(if $guard:expr)? $(,)?) => {
        match $left {
            $($pattern)|+ $(if $guard)? => {}
            ref left => {
                crate::tests::assert_matches_failed(
                    left,
                    stringify!($($pattern)|+ $(if $guard)?),
                    None,
                );
            }
        }
    };
    ($left:expr, $($pattern:pat_param)|+ $(if $guard:expr)?, $($arg:tt)+) => {
        match $left {
            $($pattern)|+ $(if $guard)? => {}
            ref left => {
                crate::tests::assert_matches_failed(
                    left,
                    stringify!($($pattern)|+ $(if $guard)?),
                    Some(format_args!($($arg)+)),
                );
            }
        }
    };
}

pub(crate) use assert_matches;

#[track_caller]
pub(crate) fn assert_matches_failed(left: impl Debug, right: &str, message: Option<Arguments<'_>>) {
    let message = match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    };
    panic!(
        "{}",
        indoc::formatdoc! {"
            assertion `left matches right` failed{message}
              left: {left:?}
             right: {right:?}
        "},
    );
}

/// Parses an inline YAML document, panicking on invalid input.
#[track_caller]
pub(crate) fn doc(yaml: &str) -> crate::parse::Document {
    match crate::parse::Document::from_yaml(yaml) {
        Ok(doc) => doc,
        Err(err) => panic!("invalid test document: {err}"),
    }
}
