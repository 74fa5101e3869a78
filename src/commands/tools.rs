use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::session::Session;
use crate::step::Tool;

pub struct ToolsCommand;

#[async_trait]
impl Command for ToolsCommand {
    fn name(&self) -> &str {
        "/tools"
    }

    fn description(&self) -> &str {
        "list the lookup tools"
    }

    async fn execute(&self, _args: &str, _session: &mut Session) -> CommandResult {
        print!("{}", tool_list());
        CommandResult::Handled
    }
}

fn tool_list() -> String {
    let width = Tool::ALL.iter().map(|t| t.id().len()).max().unwrap_or(0);
    let mut out = String::new();
    for tool in Tool::ALL {
        let marker = if tool.needs_question_context() {
            "  [question prepended]"
        } else {
            ""
        };
        out.push_str(&format!("  {:<width$}  {}{marker}\n", tool.id(), tool.label()));
    }
    out
}
