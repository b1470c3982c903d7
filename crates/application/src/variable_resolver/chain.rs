//! Fallback chains (`${opt:stage, env:STAGE, self:provider.stage}`)

use nimbus_domain::Value;

/// Splits reference content on top-level commas.
///
/// Commas inside parentheses or braces belong to the enclosing member, so
/// `file(a,b):x` stays one member.
#[must_use]
pub fn split_chain(content: &str) -> Vec<&str> {
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in content.char_indices() {
        match ch {
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                members.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    members.push(&content[start..]);

    members
}

/// A chain stops at the first acceptable value: anything but absent, `null`
/// or an empty mapping. `0`, `false` and `""` are acceptable.
#[must_use]
pub fn is_acceptable(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null() && !v.is_empty_mapping())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_simple_chain() {
        assert_eq!(
            split_chain("opt:stage,env:stage,self:provider.stage"),
            vec!["opt:stage", "env:stage", "self:provider.stage"]
        );
    }

    #[test]
    fn test_single_member() {
        assert_eq!(split_chain("opt:stage"), vec!["opt:stage"]);
    }

    #[test]
    fn test_commas_inside_parentheses_do_not_split() {
        assert_eq!(
            split_chain("file(./a,b.yml):key,opt:fallback"),
            vec!["file(./a,b.yml):key", "opt:fallback"]
        );
    }

    #[test]
    fn test_commas_inside_nested_delimiters_do_not_split() {
        assert_eq!(
            split_chain("env:${opt:a,opt:b},opt:c"),
            vec!["env:${opt:a,opt:b}", "opt:c"]
        );
    }

    #[test]
    fn test_acceptable_values() {
        assert!(is_acceptable(Some(&Value::Integer(0))));
        assert!(is_acceptable(Some(&Value::Bool(false))));
        assert!(is_acceptable(Some(&Value::from(""))));
        assert!(is_acceptable(Some(&Value::Sequence(Vec::new()))));
        assert!(!is_acceptable(None));
        assert!(!is_acceptable(Some(&Value::Null)));
        assert!(!is_acceptable(Some(&Value::empty_mapping())));
    }
}
