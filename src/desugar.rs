//! Loose whitespace syntax, rewritten into the canonical dotted-pair form.
//!
//! `(a (b c))` is easier to type than `(a.(b.c))`. The rewrite is a plain text
//! transformation run once before the reader:
//!
//! 1. Remove leading and trailing whitespace.
//! 2. Remove whitespace directly after `(` and directly before `)`.
//! 3. Replace `()` with `nil`.
//! 4. Replace every remaining run of whitespace with `.`.

/// Rewrite loose syntax into canonical dotted-pair text
pub fn desugar(source: &str) -> String {
    let trimmed = source.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            out.push(c);
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        // The input is trimmed, so a whitespace run always has a character after it
        let after_open = out.ends_with('(');
        let before_close = chars.peek() == Some(&')');
        if !after_open && !before_close {
            out.push('.');
        }
    }

    out.replace("()", "nil")
}

/// Running balance of `(` over `)` in `text`
///
/// Zero means every opened parenthesis has been closed; a negative value means
/// there are more closing parentheses than opening ones.
pub fn paren_depth(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_separators() {
        assert_eq!(desugar("(a b)"), "(a.b)");
        assert_eq!(desugar("(quote foo)"), "(quote.foo)");
        assert_eq!(desugar("(atom (quote bar))"), "(atom.(quote.bar))");
        assert_eq!(desugar("(a\t\n  b)"), "(a.b)");
    }

    #[test]
    fn test_whitespace_around_parens() {
        assert_eq!(desugar("  ( a   b )  "), "(a.b)");
        assert_eq!(desugar("((a b) c)"), "((a.b).c)");
        assert_eq!(desugar("( (a b) (c d) )"), "((a.b).(c.d))");
        assert_eq!(desugar("foo\n"), "foo");
    }

    #[test]
    fn test_empty_list_becomes_nil() {
        assert_eq!(desugar("()"), "nil");
        assert_eq!(desugar("(   )"), "nil");
        assert_eq!(desugar("(a ())"), "(a.nil)");
        assert_eq!(desugar("(() a)"), "(nil.a)");
    }

    #[test]
    fn test_canonical_text_is_unchanged() {
        for text in ["foo", "(a.b)", "((a.b).(c.(d.nil)))"] {
            assert_eq!(desugar(text), text);
        }
    }

    #[test]
    fn test_multiline_program() {
        let program = "((lambda ((x nil)\n    (cons (x x))))\n  ((quote a) nil))\n";
        assert_eq!(
            desugar(program),
            "((lambda.((x.nil).(cons.(x.x)))).((quote.a).nil))"
        );
    }

    #[test]
    fn test_paren_depth() {
        assert_eq!(paren_depth(""), 0);
        assert_eq!(paren_depth("(a (b c))"), 0);
        assert_eq!(paren_depth("(a (b"), 2);
        assert_eq!(paren_depth("a))"), -2);
    }
}
