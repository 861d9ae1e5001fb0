/// Writes every value with `f`, putting `separator` between consecutive items.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut first = true;
    for v in values {
        if !first {
            out.push_str(separator);
        }
        first = false;
        f(out, v);
    }
}

/// First keyword of a statement, uppercased, skipping whitespace, comments and parentheses.
pub fn leading_keyword(sql: &str) -> String {
    let mut input = sql;
    loop {
        input = input.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(rest) = input.strip_prefix("--") {
            input = rest.split_once('\n').map(|v| v.1).unwrap_or("");
        } else if let Some(rest) = input.strip_prefix("/*") {
            input = rest.split_once("*/").map(|v| v.1).unwrap_or("");
        } else {
            break;
        }
    }
    input
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Longest prefix of `value` not exceeding `len` bytes that ends on a char boundary.
pub fn truncate_str(value: &str, len: usize) -> &str {
    if value.len() <= len {
        return value;
    }
    let mut end = len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_str(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword() {
        assert_eq!(leading_keyword("  select 1"), "SELECT");
        assert_eq!(leading_keyword("-- hello\nINSERT INTO t"), "INSERT");
        assert_eq!(leading_keyword("/* hint */ (WITH x AS (SELECT 1) SELECT * FROM x)"), "WITH");
        assert_eq!(leading_keyword(""), "");
    }
}
