//! Comment stripping for control files.
//!
//! Control files are JSON with `//` line comments and `/* */` block comments.
//! Comments are blanked out rather than removed so that line and column
//! numbers reported by the JSON parser still point into the original text.

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    String,
    StringEscape,
    LineComment,
    BlockComment,
}

/// Blank out every comment that sits outside a string literal.
pub(super) fn strip_comments(contents: &str, source_label: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(contents.len());
    let mut state = State::Code;
    let mut chars = contents.chars().peekable();
    let (mut line, mut column) = (1usize, 0usize);
    let mut block_start = (0usize, 0usize);

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }

        match state {
            State::Code => match (ch, chars.peek().copied()) {
                ('"', _) => {
                    state = State::String;
                    out.push(ch);
                }
                ('/', Some('/')) => {
                    chars.next();
                    column += 1;
                    state = State::LineComment;
                    out.push_str("  ");
                }
                ('/', Some('*')) => {
                    chars.next();
                    block_start = (line, column);
                    column += 1;
                    state = State::BlockComment;
                    out.push_str("  ");
                }
                _ => out.push(ch),
            },
            State::String => {
                match ch {
                    '\\' => state = State::StringEscape,
                    '"' => state = State::Code,
                    _ => {}
                }
                out.push(ch);
            }
            State::StringEscape => {
                state = State::String;
                out.push(ch);
            }
            State::LineComment => {
                if ch == '\n' {
                    state = State::Code;
                    out.push(ch);
                } else {
                    out.push(blank(ch));
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    column += 1;
                    state = State::Code;
                    out.push_str("  ");
                } else {
                    out.push(blank(ch));
                }
            }
        }
    }

    if state == State::BlockComment {
        let (line, column) = block_start;
        return Err(ConfigError::ParseError {
            source_label: source_label.to_string(),
            line,
            column,
            message: "unterminated block comment".to_string(),
        });
    }

    Ok(out)
}

/// Keep line structure intact while hiding comment text.
fn blank(ch: char) -> char {
    match ch {
        '\n' | '\r' => ch,
        _ => ' ',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_line_comments_but_keeps_lines() {
        let input = "{\n  \"a\": 1, // trailing\n  // whole line\n  \"b\": 2\n}";
        let stripped = strip_comments(input, "<inline>").expect("strip");
        assert_eq!(stripped.lines().count(), input.lines().count());
        let value: serde_json::Value = serde_json::from_str(&stripped).expect("json");
        assert_eq!(value, serde_json::json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn leaves_slashes_inside_strings() {
        let input = r#"{ "dir": "/tmp//dvmdostem/*x*/", "url": "http://host" }"#;
        let stripped = strip_comments(input, "<inline>").expect("strip");
        assert_eq!(stripped, input);
    }

    #[test]
    fn handles_escaped_quotes() {
        let input = r#"{ "name": "a \"quoted\" // not a comment" } // comment"#;
        let stripped = strip_comments(input, "<inline>").expect("strip");
        let value: serde_json::Value = serde_json::from_str(&stripped).expect("json");
        assert_eq!(value["name"], "a \"quoted\" // not a comment");
    }

    #[test]
    fn strips_block_comments() {
        let input = "{ /* one\n two */ \"a\": 1 }";
        let stripped = strip_comments(input, "<inline>").expect("strip");
        let value: serde_json::Value = serde_json::from_str(&stripped).expect("json");
        assert_eq!(value, serde_json::json!({ "a": 1 }));
    }

    #[test]
    fn unterminated_block_comment_reports_its_start() {
        let input = "{\n  \"a\": 1\n  /* never closed\n}";
        let err = strip_comments(input, "config.js").unwrap_err();
        match err {
            ConfigError::ParseError {
                source_label,
                line,
                column,
                ..
            } => {
                assert_eq!(source_label, "config.js");
                assert_eq!((line, column), (3, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
