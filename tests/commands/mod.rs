//! Command-level tests

mod test_check;
mod test_prompt;
