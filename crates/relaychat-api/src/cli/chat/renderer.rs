//! Markdown rendering for assistant replies.
//!
//! Prose goes through `termimad`, fenced code blocks through `syntect`.
//! Replies arrive whole, so each one is rendered once after it lands.

use std::time::Duration;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

const CODE_THEME: &str = "base16-ocean.dark";

/// A run of prose or one fenced code block.
#[derive(Debug, PartialEq)]
pub enum Segment {
    Prose(String),
    Code { lang: String, code: String },
}

/// Split markdown into prose runs and fenced code blocks.
///
/// An unclosed fence runs to the end of the text.
pub fn split_segments(markdown: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut prose = String::new();
    let mut code: Option<(String, String)> = None;

    for line in markdown.lines() {
        let is_fence = line.trim_start().starts_with("```");
        match code.as_mut() {
            Some(_) if is_fence => {
                if let Some((lang, body)) = code.take() {
                    segments.push(Segment::Code { lang, code: body });
                }
            }
            Some((_, body)) => {
                body.push_str(line);
                body.push('\n');
            }
            None if is_fence => {
                if !prose.trim().is_empty() {
                    segments.push(Segment::Prose(std::mem::take(&mut prose)));
                }
                prose.clear();
                let lang = line.trim_start().trim_start_matches('`').trim().to_string();
                code = Some((lang, String::new()));
            }
            None => {
                prose.push_str(line);
                prose.push('\n');
            }
        }
    }

    if let Some((lang, body)) = code {
        segments.push(Segment::Code { lang, code: body });
    }
    if !prose.trim().is_empty() {
        segments.push(Segment::Prose(prose));
    }
    segments
}

/// Renders replies for the terminal.
pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    styled: bool,
}

impl ChatRenderer {
    /// `styled = false` leaves replies as plain text (pipes, tests).
    pub fn new(styled: bool) -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.headers[1].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            styled,
        }
    }

    /// Render a whole reply.
    pub fn render_final(&self, markdown: &str) -> String {
        if !self.styled {
            return markdown
                .lines()
                .map(|line| format!("  {line}\n"))
                .collect();
        }

        let mut output = String::new();
        for segment in split_segments(markdown) {
            match segment {
                Segment::Prose(text) => {
                    output.push_str(&self.skin.term_text(&text).to_string());
                }
                Segment::Code { lang, code } => {
                    output.push_str(&self.highlight_code(&code, &lang));
                }
            }
        }
        output
    }

    /// Footer under a reply: which model answered and how long the turn took.
    pub fn footer(&self, model: &str, elapsed: Duration) -> String {
        let seconds = elapsed.as_secs_f64();
        if !self.styled {
            return format!("  | {model} \u{00b7} {seconds:.1}s");
        }
        format!(
            "  {} {} {} {}",
            console::style("|").dim(),
            console::style(model).dim(),
            console::style("\u{00b7}").dim(),
            console::style(format!("{seconds:.1}s")).dim(),
        )
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let label = if lang.is_empty() { "code" } else { lang };
        let mut output = format!("  {}\n", console::style(format!("--- {label} ---")).dim());

        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_prose_and_code() {
        let text = "Here you go:\n```rust\nfn main() {}\n```\nDone.";
        let segments = split_segments(text);
        assert_eq!(
            segments,
            vec![
                Segment::Prose("Here you go:\n".to_string()),
                Segment::Code {
                    lang: "rust".to_string(),
                    code: "fn main() {}\n".to_string(),
                },
                Segment::Prose("Done.\n".to_string()),
            ]
        );
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let segments = split_segments("```\nlet x = 1;");
        assert_eq!(
            segments,
            vec![Segment::Code {
                lang: String::new(),
                code: "let x = 1;\n".to_string(),
            }]
        );
    }

    #[test]
    fn plain_render_indents_lines() {
        let renderer = ChatRenderer::new(false);
        assert_eq!(renderer.render_final("a\nb"), "  a\n  b\n");
    }

    #[test]
    fn styled_render_keeps_code_text() {
        let renderer = ChatRenderer::new(true);
        let out = renderer.render_final("```python\nprint('hi')\n```");
        assert!(out.contains("--- python ---"));
        assert!(out.contains("print"));
    }

    #[test]
    fn plain_footer_names_model() {
        let renderer = ChatRenderer::new(false);
        let footer = renderer.footer("mistral-7b", Duration::from_millis(1500));
        assert_eq!(footer, "  | mistral-7b \u{00b7} 1.5s");
    }
}
