use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::navigator::Direction;
use crate::session::{NavOutcome, Session};

pub struct NavigateCommand {
    direction: Direction,
}

impl NavigateCommand {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

#[async_trait]
impl Command for NavigateCommand {
    fn name(&self) -> &str {
        match self.direction {
            Direction::Next => "/next",
            Direction::Previous => "/prev",
        }
    }

    fn aliases(&self) -> &[&str] {
        match self.direction {
            Direction::Next => &["/n"],
            Direction::Previous => &["/p", "/previous"],
        }
    }

    fn description(&self) -> &str {
        match self.direction {
            Direction::Next => "go to the next question",
            Direction::Previous => "go to the previous question",
        }
    }

    async fn execute(&self, _args: &str, session: &mut Session) -> CommandResult {
        navigate(session, self.direction, false).await
    }
}

/// Navigate and report. Returns `Confirm` when unsaved work is in the way;
/// the REPL asks the user and calls back with `confirmed = true`.
pub async fn navigate(session: &mut Session, direction: Direction, confirmed: bool) -> CommandResult {
    match session.navigate(direction, confirmed).await {
        Ok(NavOutcome::Moved(index)) => {
            println!("  → question #{}", index + 1);
            CommandResult::Handled
        }
        Ok(NavOutcome::NoOp) => {
            match direction {
                Direction::Next => println!("  already at the last question"),
                Direction::Previous if session.navigator().is_pooled() => {
                    println!("  pooled questions cannot be revisited")
                }
                Direction::Previous => println!("  already at the first question"),
            }
            CommandResult::Handled
        }
        Ok(NavOutcome::NeedsConfirmation) => CommandResult::Confirm(direction),
        Ok(NavOutcome::FetchFailed) => {
            eprintln!("  ✗ could not fetch the next question");
            CommandResult::Handled
        }
        Ok(NavOutcome::Exhausted) => {
            println!("  no questions left, you're done");
            CommandResult::Handled
        }
        Err(e) => {
            eprintln!("  ✗ {e}");
            CommandResult::Handled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_session;
    use crate::lookup::mock::ScriptedLookup;

    #[test]
    fn names_follow_direction() {
        assert_eq!(NavigateCommand::new(Direction::Next).name(), "/next");
        assert_eq!(NavigateCommand::new(Direction::Previous).name(), "/prev");
    }

    #[tokio::test]
    async fn clean_form_moves_immediately() {
        let mut session = test_session(ScriptedLookup::new(vec![]));
        let result = NavigateCommand::new(Direction::Next)
            .execute("", &mut session)
            .await;
        assert_eq!(result, CommandResult::Handled);
        assert_eq!(session.navigator().index(), 1);
    }

    #[tokio::test]
    async fn dirty_form_asks_for_confirmation() {
        let mut session = test_session(ScriptedLookup::new(vec![]));
        session.form_mut().set_thought("half-typed");
        let result = NavigateCommand::new(Direction::Next)
            .execute("", &mut session)
            .await;
        assert_eq!(result, CommandResult::Confirm(Direction::Next));
        assert_eq!(session.navigator().index(), 0);
        assert!(session.form().is_dirty());

        let result = navigate(&mut session, Direction::Next, true).await;
        assert_eq!(result, CommandResult::Handled);
        assert_eq!(session.navigator().index(), 1);
        assert!(!session.form().is_dirty());
    }
}
