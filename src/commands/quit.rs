use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::session::Session;

pub struct QuitCommand;

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["quit", "exit", "/exit"]
    }

    fn description(&self) -> &str {
        "exit (an unsubmitted trace is discarded)"
    }

    async fn execute(&self, _args: &str, _session: &mut Session) -> CommandResult {
        CommandResult::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_session;
    use crate::lookup::mock::ScriptedLookup;

    #[tokio::test]
    async fn returns_quit() {
        let mut session = test_session(ScriptedLookup::new(vec![]));
        assert_eq!(
            QuitCommand.execute("", &mut session).await,
            CommandResult::Quit
        );
    }

    #[test]
    fn has_aliases() {
        let aliases = QuitCommand.aliases();
        assert!(aliases.contains(&"quit"));
        assert!(aliases.contains(&"exit"));
    }
}
