use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::form::ValidationErrors;
use crate::session::{NavOutcome, Session, SessionError, Submitted};
use crate::spinner::Spinner;

pub struct SubmitCommand;

#[async_trait]
impl Command for SubmitCommand {
    fn name(&self) -> &str {
        "/submit"
    }

    fn aliases(&self) -> &[&str] {
        &["/s"]
    }

    fn description(&self) -> &str {
        "submit the step (looks up the action, or saves the trace in final mode)"
    }

    async fn execute(&self, _args: &str, session: &mut Session) -> CommandResult {
        let label = if session.form().is_final() {
            "saving trace"
        } else {
            "looking up"
        };
        let spinner = Spinner::start(label);
        let result = session.submit().await;
        spinner.stop().await;

        match result {
            Ok(Submitted::Step {
                observation,
                trace_len,
            }) => {
                println!("  ✓ step #{trace_len} recorded");
                println!("  observation: {observation}");
            }
            Ok(Submitted::Trace { steps, next }) => {
                println!("  ✓ trace saved ({steps} step(s) + final answer)");
                match next {
                    NavOutcome::Moved(index) => println!("  → question #{}", index + 1),
                    NavOutcome::Exhausted => println!("  no questions left, you're done"),
                    NavOutcome::FetchFailed => {
                        eprintln!("  ✗ could not fetch the next question, try /next")
                    }
                    NavOutcome::NoOp | NavOutcome::NeedsConfirmation => {
                        println!("  that was the last question")
                    }
                }
            }
            Err(SessionError::Validation(errors)) => print_field_errors(&errors),
            Err(e) => eprintln!("  ✗ {e}"),
        }
        CommandResult::Handled
    }
}

fn print_field_errors(errors: &ValidationErrors) {
    for e in &errors.0 {
        eprintln!("  ✗ {}: {}", e.field, e.message);
    }
}
