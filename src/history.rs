//! Read-only rendering of the active trace, one card per step.

use crate::trace::Trace;

const DIVIDER_WIDTH: usize = 60;

/// Render the trace as text cards in insertion order.
///
/// A divider separates consecutive cards; there is none after the last.
pub fn render(trace: &Trace) -> String {
    if trace.is_empty() {
        return "  (no steps recorded for this question)\n".to_string();
    }

    let divider = format!("{}\n", "-".repeat(DIVIDER_WIDTH));
    let cards = trace
        .iter()
        .enumerate()
        .map(|(i, step)| {
            format!(
                "Thought #{}\n  {}\nAction\n  {} ({})\nAction Input\n  {}\nObservation\n  {}\n",
                i + 1,
                step.thought,
                step.action.label(),
                step.action,
                step.action_input,
                step.observation.as_deref().unwrap_or("—"),
            )
        })
        .collect::<Vec<_>>();
    cards.join(&divider)
}
