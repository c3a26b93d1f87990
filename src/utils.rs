use crate::language::Language;
use rustpython_ast::TextSize;

/// A utility struct to convert byte offsets to line numbers.
///
/// This is necessary because the AST parser works with byte offsets,
/// but we want to report findings with line numbers which are more human-readable.
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                // Record the start of the next line (current newline index + 1)
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a `TextSize` (byte offset) to a 1-indexed line number.
    pub fn line_index(&self, offset: TextSize) -> usize {
        let offset = offset.to_usize();
        // Binary search to find which line range the offset falls into.
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Comment and string-literal syntax of a language family.
#[derive(Debug, Clone, Copy)]
pub struct LexicalStyle {
    pub hash_comments: bool,
    pub slash_comments: bool,
    pub backtick_strings: bool,
    pub triple_quotes: bool,
}

impl LexicalStyle {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Python => Self {
                hash_comments: true,
                slash_comments: false,
                backtick_strings: false,
                triple_quotes: true,
            },
            Language::JavaScript | Language::TypeScript => Self {
                hash_comments: false,
                slash_comments: true,
                backtick_strings: true,
                triple_quotes: false,
            },
            Language::Java | Language::Cpp => Self {
                hash_comments: false,
                slash_comments: true,
                backtick_strings: false,
                triple_quotes: false,
            },
            Language::Unknown => Self {
                hash_comments: true,
                slash_comments: true,
                backtick_strings: false,
                triple_quotes: false,
            },
        }
    }
}

fn blank(ch: char) -> char {
    if ch == '\n' {
        '\n'
    } else {
        ' '
    }
}

/// Replaces comments and the contents of string literals with spaces.
///
/// Quote characters are kept so callers can still tell that a string literal
/// was present. Newlines are kept so line numbers stay valid.
pub fn blank_comments_and_strings(source: &str, style: LexicalStyle) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        let line_comment = (style.hash_comments && c == '#') || (style.slash_comments && c == '/' && next == Some('/'));
        if line_comment {
            while i < chars.len() && chars[i] != '\n' {
                out.push(' ');
                i += 1;
            }
            continue;
        }

        if style.slash_comments && c == '/' && next == Some('*') {
            out.push_str("  ");
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                out.push(blank(chars[i]));
                i += 1;
            }
            if i < chars.len() {
                out.push_str("  ");
                i += 2;
            }
            continue;
        }

        if c == '"' || c == '\'' || (style.backtick_strings && c == '`') {
            let triple = style.triple_quotes && next == Some(c) && chars.get(i + 2) == Some(&c);
            if triple {
                out.extend([c, c, c]);
                i += 3;
                while i < chars.len() && !(chars[i] == c && chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c)) {
                    out.push(blank(chars[i]));
                    i += 1;
                }
                if i < chars.len() {
                    out.extend([c, c, c]);
                    i += 3;
                }
                continue;
            }

            out.push(c);
            i += 1;
            while i < chars.len() && chars[i] != c {
                if chars[i] == '\\' {
                    out.push(' ');
                    i += 1;
                    if i < chars.len() {
                        out.push(blank(chars[i]));
                        i += 1;
                    }
                    continue;
                }
                // Unterminated single-line literal.
                if chars[i] == '\n' && c != '`' {
                    break;
                }
                out.push(blank(chars[i]));
                i += 1;
            }
            if i < chars.len() && chars[i] == c {
                out.push(c);
                i += 1;
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Width of the leading whitespace of `line`, counting a tab as four columns.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}
