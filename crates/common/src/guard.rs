//! Precondition checks that report failures as [`Outcome`] values.

use std::fmt::{Debug, Display};

use crate::outcome::Outcome;

/// Message-carrying outcome produced by every guard check.
pub type GuardResult = Outcome<(), String>;

/// A named argument whose presence is checked by
/// [`Guard::against_null_or_undefined_bulk`].
#[derive(Debug, Clone, Copy)]
pub struct GuardArgument<'a> {
    present: bool,
    name: &'a str,
}

impl<'a> GuardArgument<'a> {
    pub fn new<T>(argument: &Option<T>, name: &'a str) -> Self {
        Self {
            present: argument.is_some(),
            name,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }
}

/// Namespace for guard checks.
pub struct Guard;

impl Guard {
    /// Returns the first failing guard result, or success.
    pub fn combine<'a>(results: impl IntoIterator<Item = &'a GuardResult>) -> GuardResult {
        Outcome::combine(results)
    }

    pub fn greater_than<N: PartialOrd + Display>(min_value: N, actual_value: N) -> GuardResult {
        if actual_value > min_value {
            Outcome::ok_empty()
        } else {
            Outcome::fail(format!(
                "Number given {{{actual_value}}} is not greater than {{{min_value}}}"
            ))
        }
    }

    /// Checks that `text` has at least `num_chars` characters.
    pub fn against_at_least(num_chars: usize, text: &str) -> GuardResult {
        if text.chars().count() >= num_chars {
            Outcome::ok_empty()
        } else {
            Outcome::fail(format!("Text is not at least {num_chars} chars."))
        }
    }

    /// Checks that `text` has at most `num_chars` characters.
    pub fn against_at_most(num_chars: usize, text: &str) -> GuardResult {
        if text.chars().count() <= num_chars {
            Outcome::ok_empty()
        } else {
            Outcome::fail(format!("Text is greater than {num_chars} chars."))
        }
    }

    pub fn against_null_or_undefined<T>(argument: &Option<T>, argument_name: &str) -> GuardResult {
        match argument {
            Some(_) => Outcome::ok_empty(),
            None => Outcome::fail(format!("{argument_name} is null or undefined")),
        }
    }

    /// Checks every argument in order, stopping at the first missing one.
    pub fn against_null_or_undefined_bulk(args: &[GuardArgument<'_>]) -> GuardResult {
        args.iter()
            .find(|arg| !arg.present)
            .map_or_else(Outcome::ok_empty, |arg| {
                Outcome::fail(format!("{} is null or undefined", arg.name))
            })
    }

    pub fn is_one_of<T: PartialEq + Debug>(
        value: &T,
        valid_values: &[T],
        argument_name: &str,
    ) -> GuardResult {
        if valid_values.contains(value) {
            Outcome::ok_empty()
        } else {
            Outcome::fail(format!(
                "{argument_name} isn't oneOf the correct types in {valid_values:?}. Got {value:?}."
            ))
        }
    }

    /// Checks that `num` lies within `min..=max`.
    pub fn in_range<N: PartialOrd + Display>(
        num: N,
        min: N,
        max: N,
        argument_name: &str,
    ) -> GuardResult {
        if num >= min && num <= max {
            Outcome::ok_empty()
        } else {
            Outcome::fail(format!("{argument_name} is not within range {min} to {max}."))
        }
    }

    /// Checks that every number lies within `min..=max`.
    pub fn all_in_range<N: PartialOrd + Display + Copy>(
        numbers: &[N],
        min: N,
        max: N,
        argument_name: &str,
    ) -> GuardResult {
        let any_out_of_range = numbers
            .iter()
            .any(|&num| Self::in_range(num, min, max, argument_name).is_failure());

        if any_out_of_range {
            Outcome::fail(format!("{argument_name} is not within the range."))
        } else {
            Outcome::ok_empty()
        }
    }
}
