//! The operator seam.
//!
//! Every decision that gates a change to the repository goes through
//! [`Gates`]; the engine only moves on once a call returns a value.

use crate::error::GateError;

pub trait Gates {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, GateError>;

    fn select_one(&mut self, prompt: &str, choices: &[String]) -> Result<String, GateError>;

    /// May return an empty selection.
    fn select_many(&mut self, prompt: &str, choices: &[String]) -> Result<Vec<String>, GateError>;

    fn free_text(&mut self, prompt: &str) -> Result<String, GateError>;

    /// Put information in front of the operator ahead of a decision.
    fn show(&mut self, _text: &str) {}
}
