use std::sync::Arc;

use crate::step::ActionStep;

/// The ordered action steps recorded for the active question.
///
/// Values are persistent: [`Trace::append`] returns a new trace and leaves
/// the receiver untouched, so older snapshots stay valid for rendering.
/// Cloning is cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    steps: Arc<[ActionStep]>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, step: ActionStep) -> Trace {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Trace {
            steps: steps.into(),
        }
    }

    pub fn clear(&self) -> Trace {
        Trace::new()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionStep> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a ActionStep;
    type IntoIter = std::slice::Iter<'a, ActionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Tool;

    fn step(n: usize) -> ActionStep {
        ActionStep {
            thought: format!("thought number {n}"),
            action: Tool::GetLabel,
            action_input: format!("Q{n}"),
            observation: Some(format!("label {n}")),
        }
    }

    #[test]
    fn new_trace_is_empty() {
        let trace = Trace::new();
        assert!(trace.is_empty());
        assert_eq!(trace.len(), 0);
    }

    #[test]
    fn append_does_not_mutate_previous() {
        let empty = Trace::new();
        let one = empty.append(step(1));
        let two = one.append(step(2));

        assert_eq!(empty.len(), 0);
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_eq!(one.steps()[0], step(1));
    }

    #[test]
    fn append_preserves_insertion_order() {
        let trace = (1..=4).fold(Trace::new(), |t, n| t.append(step(n)));
        let inputs: Vec<&str> = trace.iter().map(|s| s.action_input.as_str()).collect();
        assert_eq!(inputs, ["Q1", "Q2", "Q3", "Q4"]);
    }

    #[test]
    fn clear_returns_empty() {
        let trace = Trace::new().append(step(1)).append(step(2));
        let cleared = trace.clear();
        assert!(cleared.is_empty());
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn length_matches_append_count() {
        for count in 0..6 {
            let trace = (0..count).fold(Trace::new(), |t, n| t.append(step(n)));
            assert_eq!(trace.len(), count);
        }
    }
}
