//! Post-resolution document helpers

use crate::value::{Mapping, Value};

/// Removes `null` entries from `provider.environment` and from every
/// `functions.<name>.environment` mapping.
///
/// After resolution `null` means "intentionally unset", so those entries must
/// not reach the deployed function configuration. Returns how many entries
/// were removed.
pub fn prune_null_environment(document: &mut Value) -> usize {
    let Some(root) = document.as_mapping_mut() else {
        return 0;
    };

    let mut removed = 0;

    if let Some(environment) = root
        .get_mut("provider")
        .and_then(Value::as_mapping_mut)
        .and_then(|provider| provider.get_mut("environment"))
        .and_then(Value::as_mapping_mut)
    {
        removed += prune_nulls(environment);
    }

    if let Some(functions) = root.get_mut("functions").and_then(Value::as_mapping_mut) {
        for function in functions.values_mut() {
            if let Some(environment) = function
                .as_mapping_mut()
                .and_then(|f| f.get_mut("environment"))
                .and_then(Value::as_mapping_mut)
            {
                removed += prune_nulls(environment);
            }
        }
    }

    removed
}

fn prune_nulls(map: &mut Mapping) -> usize {
    let before = map.len();
    map.retain(|_, value| !value.is_null());
    before - map.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document(yaml: &str) -> Value {
        Value::from(serde_yaml::from_str::<serde_yaml::Value>(yaml).unwrap())
    }

    #[test]
    fn test_prunes_provider_and_function_environments() {
        let mut doc = document(
            "provider:\n  environment:\n    KEEP: a\n    DROP: null\nfunctions:\n  hello:\n    environment:\n      GONE: ~\n      FALSE: false\n  plain:\n    handler: x\n",
        );

        let removed = prune_null_environment(&mut doc);

        assert_eq!(removed, 2);
        assert_eq!(
            doc,
            document(
                "provider:\n  environment:\n    KEEP: a\nfunctions:\n  hello:\n    environment:\n      FALSE: false\n  plain:\n    handler: x\n"
            )
        );
    }

    #[test]
    fn test_leaves_other_nulls_alone() {
        let mut doc = document("custom:\n  nothing: null\n");
        assert_eq!(prune_null_environment(&mut doc), 0);
        assert_eq!(doc, document("custom:\n  nothing: null\n"));
    }

    #[test]
    fn test_non_mapping_document() {
        let mut doc = Value::from("scalar");
        assert_eq!(prune_null_environment(&mut doc), 0);
    }
}
