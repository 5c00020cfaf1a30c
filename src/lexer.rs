//! Shell-word tokenization and pipeline segmentation.
//!
//! Both routines share a tiny three-state scanner (unquoted, single-quoted,
//! double-quoted) with an escape flag, so an escaped quote is never mistaken
//! for a delimiter and a quoted `|` is never mistaken for a pipe operator.

use crate::error::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    Single,
    Double,
}

/// Split an interpolated command string into argument words.
///
/// Rules, POSIX-like:
/// - unquoted whitespace separates words;
/// - text inside matching single or double quotes is literal (quotes do not
///   nest, whitespace inside them does not separate);
/// - a backslash escapes the following character; in particular `\"` and
///   `\'` outside quotes yield literal quote characters in the word;
/// - inside double quotes a backslash only escapes `"` and `\`, otherwise it
///   stays literal;
/// - inside single quotes everything is literal.
///
/// Ending the string inside an open quote is an error and produces no
/// argument vector at all.
pub fn split_words(line: &str) -> Result<Vec<String>, SyntaxError> {
    let mut words = Vec::new();
    let mut word = String::new();
    // Tracks whether `word` exists at all, so that `""` produces an empty
    // word while plain whitespace produces none.
    let mut in_word = false;
    let mut state = QuoteState::Unquoted;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            match state {
                // Inside double quotes only the quote and the backslash
                // itself lose the escape; `\x` stays two characters.
                QuoteState::Double if ch != '"' && ch != '\\' => {
                    word.push('\\');
                    word.push(ch);
                }
                _ => word.push(ch),
            }
            escape = false;
            continue;
        }

        match state {
            QuoteState::Unquoted => match ch {
                '\\' => {
                    escape = true;
                    in_word = true;
                }
                '\'' => {
                    state = QuoteState::Single;
                    in_word = true;
                }
                '"' => {
                    state = QuoteState::Double;
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut word));
                        in_word = false;
                    }
                }
                c => {
                    word.push(c);
                    in_word = true;
                }
            },
            QuoteState::Single => match ch {
                '\'' => state = QuoteState::Unquoted,
                c => word.push(c),
            },
            QuoteState::Double => match ch {
                '"' => state = QuoteState::Unquoted,
                '\\' => escape = true,
                c => word.push(c),
            },
        }
    }

    if state != QuoteState::Unquoted {
        return Err(SyntaxError::UnterminatedQuote);
    }
    if escape {
        // A trailing backslash has nothing to escape; keep it literal.
        word.push('\\');
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

/// Split a raw line into pipeline-stage substrings at top-level `|`.
///
/// The stage text is returned verbatim, quotes and escapes included; only the
/// split points are decided here. Checking stages for emptiness is the
/// caller's job, as is tokenizing each stage later.
pub fn split_pipeline(line: &str) -> Vec<String> {
    let mut stages = Vec::new();
    let mut stage = String::new();
    let mut state = QuoteState::Unquoted;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            stage.push(ch);
            escape = false;
            continue;
        }
        match state {
            QuoteState::Unquoted => match ch {
                '|' => stages.push(std::mem::take(&mut stage)),
                '\\' => {
                    stage.push(ch);
                    escape = true;
                }
                '\'' => {
                    stage.push(ch);
                    state = QuoteState::Single;
                }
                '"' => {
                    stage.push(ch);
                    state = QuoteState::Double;
                }
                c => stage.push(c),
            },
            QuoteState::Single => {
                stage.push(ch);
                if ch == '\'' {
                    state = QuoteState::Unquoted;
                }
            }
            QuoteState::Double => {
                stage.push(ch);
                if ch == '"' {
                    state = QuoteState::Unquoted;
                } else if ch == '\\' {
                    escape = true;
                }
            }
        }
    }

    stages.push(stage);
    stages
}
