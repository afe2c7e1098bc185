//! Word counting for post bodies

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Word totals of one Markdown body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordCounts {
    /// Words in prose
    pub words: usize,
    /// Words inside inline code spans
    pub inline_code_words: usize,
}

impl WordCounts {
    /// Prose words plus inline-code words
    pub fn total(&self) -> usize {
        self.words + self.inline_code_words
    }
}

/// Count the words of a Markdown body.
///
/// Fenced and indented code blocks and raw HTML are not counted.
pub fn count_words(markdown: &str) -> WordCounts {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut counts = WordCounts::default();
    let mut in_code_block = false;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if !in_code_block => counts.words += count_tokens(&text),
            Event::Code(code) => counts.inline_code_words += count_tokens(&code),
            _ => {}
        }
    }

    counts
}

/// Whitespace separated tokens containing at least one letter or digit
fn count_tokens(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_prose() {
        let counts = count_words("# Hello World\n\nThis is a *simple* test.");
        assert_eq!(counts.words, 7);
        assert_eq!(counts.inline_code_words, 0);
    }

    #[test]
    fn test_counts_inline_code_separately() {
        let counts = count_words("Call `let x = vec![]` before returning.");
        assert_eq!(counts.words, 3);
        assert_eq!(counts.inline_code_words, 3);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn test_skips_code_blocks_and_punctuation() {
        let markdown = "Intro text - here\n\n```rust\nfn main() { println!(\"hi\"); }\n```\n\nOutro.";
        let counts = count_words(markdown);
        assert_eq!(counts.words, 4);
    }
}
