//! Terminal prompts.

use colored::Colorize;
use inquire::{Confirm, InquireError, MultiSelect, Select, Text};

use patchport_engine::{GateError, Gates};

/// [`Gates`] answered by the operator on the terminal.
#[derive(Debug, Default)]
pub struct InquireGates;

fn gate_error(err: InquireError) -> GateError {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            GateError::Cancelled
        }
        other => GateError::Terminal(other.to_string()),
    }
}

impl Gates for InquireGates {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, GateError> {
        Confirm::new(prompt)
            .with_default(default)
            .prompt()
            .map_err(gate_error)
    }

    fn select_one(&mut self, prompt: &str, choices: &[String]) -> Result<String, GateError> {
        Select::new(prompt, choices.to_vec())
            .prompt()
            .map_err(gate_error)
    }

    fn select_many(&mut self, prompt: &str, choices: &[String]) -> Result<Vec<String>, GateError> {
        MultiSelect::new(prompt, choices.to_vec())
            .with_help_message("space to select, enter to confirm")
            .prompt()
            .map_err(gate_error)
    }

    fn free_text(&mut self, prompt: &str) -> Result<String, GateError> {
        Text::new(prompt).prompt().map_err(gate_error)
    }

    fn show(&mut self, text: &str) {
        println!("\n{}", text.yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_and_ctrl_c_cancel() {
        assert!(matches!(
            gate_error(InquireError::OperationCanceled),
            GateError::Cancelled
        ));
        assert!(matches!(
            gate_error(InquireError::OperationInterrupted),
            GateError::Cancelled
        ));
    }

    #[test]
    fn other_failures_keep_their_message() {
        let err = gate_error(InquireError::NotTTY);
        assert!(matches!(err, GateError::Terminal(ref msg) if !msg.is_empty()));
    }
}
