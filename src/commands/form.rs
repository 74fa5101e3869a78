use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::form::Field;
use crate::session::Session;
use crate::step::Tool;

/// Sets one text field of the form. An empty argument clears it.
pub struct SetFieldCommand {
    name: &'static str,
    aliases: &'static [&'static str],
    field: Field,
    description: &'static str,
}

impl SetFieldCommand {
    pub fn new(
        name: &'static str,
        aliases: &'static [&'static str],
        field: Field,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            aliases,
            field,
            description,
        }
    }
}

#[async_trait]
impl Command for SetFieldCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn aliases(&self) -> &[&str] {
        self.aliases
    }

    fn usage(&self) -> &str {
        "<text>"
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn execute(&self, args: &str, session: &mut Session) -> CommandResult {
        let form = session.form_mut();
        match self.field {
            Field::Thought => form.set_thought(args),
            Field::ActionInput => form.set_action_input(args),
            Field::WikipediaAnswer => form.set_wikipedia_answer(args),
            Field::WikidataAnswer => form.set_wikidata_answer(args),
            Field::Action => {
                eprintln!("  ✗ use /action to choose a tool");
                return CommandResult::Handled;
            }
        }
        if args.is_empty() {
            println!("  ✓ {} cleared", self.field);
        } else {
            println!("  ✓ {} set", self.field);
        }
        CommandResult::Handled
    }
}

pub struct ActionCommand;

#[async_trait]
impl Command for ActionCommand {
    fn name(&self) -> &str {
        "/action"
    }

    fn aliases(&self) -> &[&str] {
        &["/a"]
    }

    fn usage(&self) -> &str {
        "<tool>"
    }

    fn description(&self) -> &str {
        "choose the tool for this step (see /tools)"
    }

    async fn execute(&self, args: &str, session: &mut Session) -> CommandResult {
        if args.is_empty() {
            session.form_mut().set_action(None);
            println!("  ✓ action cleared");
            return CommandResult::Handled;
        }
        match args.parse::<Tool>() {
            Ok(tool) => {
                session.form_mut().set_action(Some(tool));
                if tool.needs_question_context() {
                    println!("  ✓ action: {} (question text is prepended)", tool.label());
                } else {
                    println!("  ✓ action: {}", tool.label());
                }
            }
            Err(e) => {
                eprintln!("  ✗ {e}");
                eprintln!("  type /tools for the list");
            }
        }
        CommandResult::Handled
    }
}

pub struct FinalCommand;

#[async_trait]
impl Command for FinalCommand {
    fn name(&self) -> &str {
        "/final"
    }

    fn aliases(&self) -> &[&str] {
        &["/f"]
    }

    fn usage(&self) -> &str {
        "[on|off]"
    }

    fn description(&self) -> &str {
        "toggle final-answer mode (enable only once you have the answer)"
    }

    async fn execute(&self, args: &str, session: &mut Session) -> CommandResult {
        let is_final = match args.to_ascii_lowercase().as_str() {
            "" => !session.form().is_final(),
            "on" | "yes" | "true" => true,
            "off" | "no" | "false" => false,
            other => {
                eprintln!("  ✗ expected on or off, got {other:?}");
                return CommandResult::Handled;
            }
        };
        session.form_mut().set_final(is_final);
        if is_final {
            println!("  ✓ final answer mode: fill /wikipedia and /wikidata");
        } else {
            println!("  ✓ action mode: fill /action and /input");
        }
        CommandResult::Handled
    }
}

pub struct ShowFormCommand;

#[async_trait]
impl Command for ShowFormCommand {
    fn name(&self) -> &str {
        "/form"
    }

    fn description(&self) -> &str {
        "show the current question and form"
    }

    async fn execute(&self, _args: &str, session: &mut Session) -> CommandResult {
        print!("{}", render_form(session));
        CommandResult::Handled
    }
}

pub struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &str {
        "/clear"
    }

    fn description(&self) -> &str {
        "discard the form and every step recorded for this question"
    }

    async fn execute(&self, _args: &str, session: &mut Session) -> CommandResult {
        session.discard();
        println!("  ✓ form and trace cleared");
        CommandResult::Handled
    }
}

/// The question header plus the fields of the active form shape.
pub fn render_form(session: &Session) -> String {
    let mut out = String::new();
    let Some(question) = session.question() else {
        out.push_str("  no questions left\n");
        return out;
    };

    let form = session.form();
    out.push_str(&format!(
        "Question #{}\n  {}\n",
        session.navigator().index() + 1,
        question.text
    ));
    out.push_str(&format!("  thought    {}\n", show(form.thought())));
    if form.is_final() {
        out.push_str(&format!("  wikipedia  {}\n", show(form.wikipedia_answer())));
        out.push_str(&format!("  wikidata   {}\n", show(form.wikidata_answer())));
    } else {
        let action = form.action().map(|t| t.label()).unwrap_or("—");
        out.push_str(&format!("  action     {action}\n"));
        out.push_str(&format!("  input      {}\n", show(form.action_input())));
    }
    out.push_str(&format!(
        "  mode       {}\n",
        if form.is_final() { "final answer" } else { "action" }
    ));
    match session.submit_blocked() {
        Some(reason) => out.push_str(&format!("  submit     disabled ({reason})\n")),
        None => out.push_str("  submit     ready\n"),
    }
    out
}

fn show(value: &str) -> &str {
    if value.is_empty() { "—" } else { value }
}
