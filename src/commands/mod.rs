//! Built-in REPL commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry splits the input into a trigger and
//! its argument text, resolves aliases, and generates `/help`.

mod form;
mod history;
mod navigate;
mod quit;
mod submit;
mod tools;

pub use form::render_form;
pub use navigate::navigate;

use async_trait::async_trait;
use std::sync::Arc;

use crate::form::Field;
use crate::navigator::Direction;
use crate::session::Session;

/// What the REPL should do after a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// Not a command.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// Navigation needs the user to acknowledge losing unsaved work.
    Confirm(Direction),
    /// Exit the REPL.
    Quit,
}

/// A REPL command. Implement this trait to add new commands.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/submit"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/s"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Argument hint shown in `/help`, e.g. `"<text>"`.
    fn usage(&self) -> &str {
        ""
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    /// Run the command with everything after the trigger as `args`.
    async fn execute(&self, args: &str, session: &mut Session) -> CommandResult;
}

/// Holds registered commands.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(HelpCommand),
            Arc::new(form::SetFieldCommand::new(
                "/thought",
                &["/t"],
                Field::Thought,
                "set the thought for this step",
            )),
            Arc::new(form::ActionCommand),
            Arc::new(form::SetFieldCommand::new(
                "/input",
                &["/i"],
                Field::ActionInput,
                "set the input for the chosen action",
            )),
            Arc::new(form::FinalCommand),
            Arc::new(form::SetFieldCommand::new(
                "/wikipedia",
                &["/wp"],
                Field::WikipediaAnswer,
                "set the Wikipedia answer (final step)",
            )),
            Arc::new(form::SetFieldCommand::new(
                "/wikidata",
                &["/wd"],
                Field::WikidataAnswer,
                "set the Wikidata answer (final step)",
            )),
            Arc::new(form::ShowFormCommand),
            Arc::new(form::ClearCommand),
            Arc::new(submit::SubmitCommand),
            Arc::new(navigate::NavigateCommand::new(Direction::Next)),
            Arc::new(navigate::NavigateCommand::new(Direction::Previous)),
            Arc::new(history::HistoryCommand),
            Arc::new(tools::ToolsCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    /// Register an additional command.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, session: &mut Session) -> CommandResult {
        let input = input.trim();
        let (trigger, args) = match input.split_once(char::is_whitespace) {
            Some((t, rest)) => (t, rest.trim()),
            None => (input, ""),
        };

        for command in &self.commands {
            if trigger == command.name() || command.aliases().contains(&trigger) {
                // /help needs the registry to list all commands
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(args, session).await;
            }
        }

        if trigger.starts_with('/') {
            println!("unknown command: {trigger}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    /// Generate help text from all registered commands.
    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.aliases(), c.usage()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out
    }

    /// All registered command names (for testing).
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "/help"
    }

    fn aliases(&self) -> &[&str] {
        &["/h", "/?"]
    }

    fn description(&self) -> &str {
        "show this help"
    }

    async fn execute(&self, _args: &str, _session: &mut Session) -> CommandResult {
        CommandResult::Handled
    }
}

fn format_label(name: &str, aliases: &[&str], usage: &str) -> String {
    let mut label = name.to_string();
    if !usage.is_empty() {
        label.push(' ');
        label.push_str(usage);
    }
    if !aliases.is_empty() {
        label.push_str(&format!(" ({})", aliases.join(", ")));
    }
    label
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lookup::mock::ScriptedLookup;
    use crate::navigator::Navigator;
    use crate::questions::StaticQuestions;
    use crate::session::SessionConfig;
    use crate::store::sqlite::SqliteStore;

    pub(crate) fn test_session(lookup: ScriptedLookup) -> Session {
        let navigator = Navigator::with_static(StaticQuestions::builtin()).unwrap();
        Session::new(
            navigator,
            Arc::new(lookup),
            Arc::new(SqliteStore::in_memory().unwrap()),
            SessionConfig::default(),
        )
    }

    #[test]
    fn all_builtins_registered() {
        let reg = CommandRegistry::new();
        let names = reg.names();
        for name in [
            "/help", "/thought", "/action", "/input", "/final", "/wikipedia", "/wikidata",
            "/form", "/clear", "/submit", "/next", "/prev", "/history", "/tools", "/quit",
        ] {
            assert!(names.contains(&name), "missing: {name}");
        }
    }

    #[test]
    fn no_duplicate_triggers() {
        let reg = CommandRegistry::new();
        let triggers = reg.all_triggers();
        let mut seen = Vec::new();
        for t in &triggers {
            assert!(!seen.contains(t), "duplicate trigger: {t}");
            seen.push(t);
        }
    }

    #[test]
    fn help_text_includes_all_commands() {
        let reg = CommandRegistry::new();
        let text = reg.help_text();
        for name in reg.names() {
            assert!(text.contains(name), "help missing: {name}");
        }
        assert!(text.contains("/thought <text> (/t)"));
    }

    #[tokio::test]
    async fn unknown_slash_command_is_handled() {
        let reg = CommandRegistry::new();
        let mut session = test_session(ScriptedLookup::new(vec![]));
        assert_eq!(
            reg.dispatch("/foobar", &mut session).await,
            CommandResult::Handled
        );
    }

    #[tokio::test]
    async fn plain_text_is_not_a_command() {
        let reg = CommandRegistry::new();
        let mut session = test_session(ScriptedLookup::new(vec![]));
        assert_eq!(
            reg.dispatch("hello world", &mut session).await,
            CommandResult::NotACommand
        );
    }

    #[tokio::test]
    async fn args_are_passed_through_trimmed() {
        let reg = CommandRegistry::new();
        let mut session = test_session(ScriptedLookup::new(vec![]));
        reg.dispatch("/t    Looking for birth state  ", &mut session)
            .await;
        assert_eq!(session.form().thought(), "Looking for birth state");
    }

    #[test]
    fn format_label_variants() {
        assert_eq!(format_label("/form", &[], ""), "/form");
        assert_eq!(format_label("/help", &["/h", "/?"], ""), "/help (/h, /?)");
        assert_eq!(format_label("/input", &["/i"], "<text>"), "/input <text> (/i)");
    }
}
