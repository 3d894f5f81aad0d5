//! Redis-style glob matching
//!
//! Supports `*`, `?`, character classes (`[abc]`, `[a-z]`, `[^a]`) and `\` escapes,
//! mirroring what `SCAN ... MATCH` accepts so the in-process store agrees with Redis.

/// Returns true if `text` matches the glob `pattern`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    // (pattern index just after the last '*', text index it is currently absorbing up to)
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi + 1, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '[' => match match_class(&p, pi, t[ti]) {
                    Some((true, next)) => {
                        pi = next;
                        ti += 1;
                        continue;
                    }
                    Some((false, _)) => {}
                    None => {
                        // Unterminated class is a literal '['
                        if t[ti] == '[' {
                            pi += 1;
                            ti += 1;
                            continue;
                        }
                    }
                },
                '\\' if pi + 1 < p.len() => {
                    if p[pi + 1] == t[ti] {
                        pi += 2;
                        ti += 1;
                        continue;
                    }
                }
                c => {
                    if c == t[ti] {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
            }
        }

        match star {
            Some((star_pi, star_ti)) => {
                pi = star_pi;
                ti = star_ti + 1;
                star = Some((star_pi, star_ti + 1));
            }
            None => return false,
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

/// Escape `*`, `?`, `[`, `]` and `\\` so `literal` only matches itself inside a pattern.
pub fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Evaluate the class starting at `p[start] == '['` against `ch`.
/// Returns `(matched, index after ']')`, or `None` if the class never closes.
fn match_class(p: &[char], start: usize, ch: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = i < p.len() && p[i] == '^';
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < p.len() && p[i] != ']' {
        if p[i] == '\\' && i + 1 < p.len() {
            i += 1;
        }
        let lo = p[i];

        if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            let hi = p[i + 2];
            let (a, b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            if a <= ch && ch <= b {
                matched = true;
            }
            i += 3;
        } else {
            if lo == ch {
                matched = true;
            }
            i += 1;
        }
    }

    if i >= p.len() {
        return None;
    }
    Some((matched != negate, i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_star() {
        assert!(glob_match("posts:city:beijing:*", "posts:city:beijing:page:1"));
        assert!(glob_match("posts:city:beijing:*", "posts:city:beijing:"));
        assert!(!glob_match("posts:city:beijing:*", "posts:city:shanghai:page:1"));
        assert!(!glob_match("posts:city:beijing:*", "posts:city:beijing"));
    }

    #[test]
    fn test_inner_star_backtracks() {
        assert!(glob_match("search:*:page:1", "search:foo:city:x:page:1"));
        assert!(!glob_match("search:*:page:1", "search:foo:page:12"));
        assert!(glob_match("*", ""));
        assert!(glob_match("a*b*c", "aXXbYYc"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob_match("post:?", "post:1"));
        assert!(!glob_match("post:?", "post:12"));
    }

    #[test]
    fn test_classes() {
        assert!(glob_match("page:[12]", "page:1"));
        assert!(!glob_match("page:[12]", "page:3"));
        assert!(glob_match("page:[0-9]", "page:7"));
        assert!(glob_match("page:[^0-9]", "page:x"));
        assert!(!glob_match("page:[^0-9]", "page:4"));
    }

    #[test]
    fn test_escape_glob_matches_only_the_literal() {
        for literal in ["a[b]", r"x\y", "a*b", "what?", "plain"] {
            let pattern = format!("posts:city:{}:*", escape_glob(literal));
            assert!(glob_match(&pattern, &format!("posts:city:{}:page:1", literal)));
        }
        let pattern = format!("posts:city:{}:*", escape_glob("a*b"));
        assert!(!glob_match(&pattern, "posts:city:axxb:page:1"));
        assert_eq!(escape_glob(r"a[b]\c"), r"a\[b\]\\c");
    }

    #[test]
    fn test_escapes_and_literals() {
        assert!(glob_match(r"a\*b", "a*b"));
        assert!(!glob_match(r"a\*b", "aXb"));
        assert!(glob_match("a[b", "a[b"));
        assert!(glob_match("北京:*", "北京:page:1"));
    }
}
