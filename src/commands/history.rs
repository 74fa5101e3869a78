use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::history;
use crate::session::Session;

pub struct HistoryCommand;

#[async_trait]
impl Command for HistoryCommand {
    fn name(&self) -> &str {
        "/history"
    }

    fn aliases(&self) -> &[&str] {
        &["/hist"]
    }

    fn description(&self) -> &str {
        "show the steps recorded for this question"
    }

    async fn execute(&self, _args: &str, session: &mut Session) -> CommandResult {
        print!("{}", history::render(session.trace()));
        CommandResult::Handled
    }
}
