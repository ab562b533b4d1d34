use reedline::{Completer, Span, Suggestion};
use stacksift::commands::COMMAND_NAMES;
use stacksift::models::listing::CATEGORIES;

/// Completes command names, and category names after `\category`
pub struct CommandCompleter {
    commands: Vec<String>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn candidates(&self, input: &str) -> (Vec<String>, usize, Option<&'static str>) {
        if let Some(partial) = input.strip_prefix("\\category ") {
            let partial = partial.trim_start();
            let values = std::iter::once("all")
                .chain(CATEGORIES.iter().copied())
                .filter(|c| c.to_lowercase().starts_with(&partial.to_lowercase()))
                .map(str::to_string)
                .collect();
            return (values, partial.len(), Some("category"));
        }

        if input.contains(char::is_whitespace) {
            return (Vec::new(), 0, None);
        }

        let values = self
            .commands
            .iter()
            .filter(|c| c.starts_with(input))
            .cloned()
            .collect();
        (values, input.len(), Some("command"))
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos];
        let (values, partial_len, description) = self.candidates(input);
        let start_pos = pos.saturating_sub(partial_len);

        values
            .into_iter()
            .map(|value| Suggestion {
                value,
                description: description.map(str::to_string),
                extra: None,
                span: Span {
                    start: start_pos,
                    end: pos,
                },
                style: None,
                append_whitespace: description == Some("command"),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_command_prefix() {
        let mut completer = CommandCompleter::new();
        let values: Vec<String> = completer
            .complete("\\col", 4)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["\\collections", "\\collection"]);
    }

    #[test]
    fn test_completes_categories() {
        let mut completer = CommandCompleter::new();
        let suggestions = completer.complete("\\category a", 11);
        assert!(suggestions.iter().any(|s| s.value == "all"));
        assert_eq!(suggestions[0].span.start, 10);
    }
}
