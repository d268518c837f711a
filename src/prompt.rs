use std::io::Write;

/// Operator response to a bounded candidate choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// 1-based candidate index.
    Pick(usize),
    Abort,
    Skip,
}

/// Operator I/O used by the interactive matching paths.
///
/// The console implementation blocks on stdin; tests use a scripted
/// implementation instead.
pub trait Chooser {
    /// Free-text line prompt. Returns the raw line without the newline.
    fn input(&mut self, prompt: &str) -> String;

    /// Yes/no prompt, default yes.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Present `options` enumerated 1..N and return the operator's pick.
    /// An empty response selects `default` (1-based).
    fn choose(&mut self, header: &str, options: &[String], default: usize) -> Selection;
}

/// Parse a choice response: empty selects the default, `b`/`B` aborts,
/// `s`/`S` skips, and a number in 1..=max picks. Anything else is invalid.
pub fn parse_selection(input: &str, max: usize, default: usize) -> Option<Selection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(Selection::Pick(default));
    }
    match trimmed {
        "b" | "B" => Some(Selection::Abort),
        "s" | "S" => Some(Selection::Skip),
        _ => trimmed
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=max).contains(n))
            .map(Selection::Pick),
    }
}

/// Line-based prompts over stdin/stdout.
pub struct ConsolePrompt;

impl ConsolePrompt {
    fn read_line(&self) -> String {
        let mut line = String::new();
        // EOF or a read error degrades to an empty answer (the default).
        if std::io::stdin().read_line(&mut line).is_err() {
            return String::new();
        }
        line.trim_end_matches(['\r', '\n']).to_string()
    }
}

impl Chooser for ConsolePrompt {
    fn input(&mut self, prompt: &str) -> String {
        print!("{} ", prompt);
        let _ = std::io::stdout().flush();
        self.read_line()
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        let answer = self.input(&format!("{} (Y/n)", prompt));
        matches!(answer.trim(), "" | "y" | "Y")
    }

    fn choose(&mut self, header: &str, options: &[String], default: usize) -> Selection {
        println!("{}", header);
        for (i, option) in options.iter().enumerate() {
            println!("{}. {}", i + 1, option);
        }
        loop {
            let answer = self.input(&format!(
                "Selection [1-{}], aBort, Skip (default {}):",
                options.len(),
                default
            ));
            if let Some(selection) = parse_selection(&answer, options.len(), default) {
                return selection;
            }
            println!("Invalid selection");
        }
    }
}

/// Scripted chooser for tests: answers are consumed front to back and the
/// test panics when a prompt arrives unscripted.
#[cfg(test)]
pub struct ScriptedChooser {
    pub inputs: std::collections::VecDeque<String>,
    pub confirms: std::collections::VecDeque<bool>,
    pub selections: std::collections::VecDeque<Selection>,
}

#[cfg(test)]
impl ScriptedChooser {
    pub fn new() -> Self {
        Self {
            inputs: Default::default(),
            confirms: Default::default(),
            selections: Default::default(),
        }
    }

    pub fn with_inputs(mut self, inputs: &[&str]) -> Self {
        self.inputs = inputs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_confirms(mut self, confirms: &[bool]) -> Self {
        self.confirms = confirms.iter().copied().collect();
        self
    }

    pub fn with_selections(mut self, selections: &[Selection]) -> Self {
        self.selections = selections.iter().copied().collect();
        self
    }
}

#[cfg(test)]
impl Chooser for ScriptedChooser {
    fn input(&mut self, prompt: &str) -> String {
        self.inputs
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted input prompt: {}", prompt))
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.confirms
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted confirm prompt: {}", prompt))
    }

    fn choose(&mut self, header: &str, _options: &[String], _default: usize) -> Selection {
        self.selections
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted choice prompt: {}", header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_picks_default() {
        assert_eq!(parse_selection("", 5, 1), Some(Selection::Pick(1)));
        assert_eq!(parse_selection("  ", 5, 2), Some(Selection::Pick(2)));
    }

    #[test]
    fn abort_and_skip_letters() {
        assert_eq!(parse_selection("b", 5, 1), Some(Selection::Abort));
        assert_eq!(parse_selection("B", 5, 1), Some(Selection::Abort));
        assert_eq!(parse_selection("s", 5, 1), Some(Selection::Skip));
        assert_eq!(parse_selection("S", 5, 1), Some(Selection::Skip));
    }

    #[test]
    fn numeric_selection_is_bounded() {
        assert_eq!(parse_selection("3", 5, 1), Some(Selection::Pick(3)));
        assert_eq!(parse_selection("0", 5, 1), None);
        assert_eq!(parse_selection("6", 5, 1), None);
        assert_eq!(parse_selection("x", 5, 1), None);
    }
}
