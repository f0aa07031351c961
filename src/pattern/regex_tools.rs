/// Validator that lets a parameter span the path delimiter.
pub const CROSS_DELIMITER_VALIDATOR: &str = "*";
pub const CROSS_DELIMITER_PATTERN: &str = ".+?";

/// Turns a user validator into a regex fragment that is safe to embed in a
/// compiled schema: capture groups become non-capturing so param capture
/// indexes stay stable, and a trailing `+`/`*` becomes lazy.
pub fn validator_pattern(raw: &str) -> String {
    if raw == CROSS_DELIMITER_VALIDATOR {
        return CROSS_DELIMITER_PATTERN.to_string();
    }
    let mut pattern = disable_groups(raw);
    if ends_with_greedy_repeat(&pattern) {
        pattern.push('?');
    }
    pattern
}

pub fn disable_groups(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len() + 8);
    let mut class_depth = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                }
                i += 2;
                continue;
            }
            '[' => {
                class_depth += 1;
                out.push(ch);
                // `[]...]` and `[^]...]` open with a literal bracket
                if chars.get(i + 1) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
                if chars.get(i + 1) == Some(&']') {
                    out.push(']');
                    i += 1;
                }
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(ch);
            }
            '(' if class_depth == 0 => {
                if chars.get(i + 1) == Some(&'?') {
                    let named = match (chars.get(i + 2), chars.get(i + 3)) {
                        (Some('P'), Some('<')) => Some(i + 4),
                        (Some('<'), Some(c)) if *c != '=' && *c != '!' => Some(i + 3),
                        _ => None,
                    };
                    match named {
                        Some(name_start) => {
                            let close = chars[name_start..]
                                .iter()
                                .position(|c| *c == '>')
                                .map(|offset| name_start + offset);
                            match close {
                                Some(close) => {
                                    out.push_str("(?:");
                                    i = close + 1;
                                    continue;
                                }
                                None => out.push(ch),
                            }
                        }
                        None => out.push(ch),
                    }
                } else {
                    out.push_str("(?:");
                }
            }
            _ => out.push(ch),
        }
        i += 1;
    }

    out
}

fn ends_with_greedy_repeat(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    let Some((&last, rest)) = bytes.split_last() else {
        return false;
    };
    if last != b'+' && last != b'*' {
        return false;
    }
    let backslashes = rest.iter().rev().take_while(|b| **b == b'\\').count();
    backslashes % 2 == 0 && !rest.is_empty()
}
