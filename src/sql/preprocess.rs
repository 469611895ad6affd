//! Comment stripping and whitespace normalization.

/// Strip `--` and `/* */` comments, drop blank lines and trim.
///
/// Comment markers inside quoted literals or identifiers are kept as text.
pub fn preprocess(input: &str) -> String {
    let stripped = strip_comments(input);

    let lines: Vec<&str> = stripped
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();

    lines.join("\n").trim().to_string()
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if q == '\'' && c == '\\' {
                // Backslash escape, as read by the lexer: `'it\'s'`
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '[' => {
                quote = Some(']');
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                // Line comment: keep the newline so line structure survives
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                // Keep adjacent tokens apart: `a/* x */b` is two words
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}
