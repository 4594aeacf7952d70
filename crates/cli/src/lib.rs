#![allow(clippy::needless_return)]

mod args;

pub use args::{CommandLineArgs, parse_call_args};
