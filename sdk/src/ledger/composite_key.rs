// Copyright 2021 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::error::ContextError;

/// Leading character of every composite key; keeps them disjoint from simple keys.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';

const MIN_UNICODE_RUNE: char = '\u{0}';

fn validate_composite_key_component(component: &str) -> Result<(), ContextError> {
    if component.contains(MIN_UNICODE_RUNE) {
        return Err(ContextError::InvalidKey(format!(
            "Composite key component {:?} contains U+0000",
            component
        )));
    }
    Ok(())
}

/// Builds a composite key from an object type and its attributes.
///
/// Every component is terminated by U+0000, so a key built from a prefix of `attributes` is a
/// byte prefix of the full key. That is what makes partial composite key scans work.
///
/// ```
/// use cold_chain_sdk::ledger::create_composite_key;
///
/// let key = create_composite_key("TempLog", &["B1", "2021-06-01T10:00:00Z"]).unwrap();
/// assert_eq!(key, "\u{0}TempLog\u{0}B1\u{0}2021-06-01T10:00:00Z\u{0}");
/// ```
pub fn create_composite_key(
    object_type: &str,
    attributes: &[&str],
) -> Result<String, ContextError> {
    if object_type.is_empty() {
        return Err(ContextError::InvalidKey(
            "Composite key object type cannot be empty".to_string(),
        ));
    }
    validate_composite_key_component(object_type)?;

    let mut key = String::new();
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(MIN_UNICODE_RUNE);
    for attribute in attributes {
        validate_composite_key_component(attribute)?;
        key.push_str(attribute);
        key.push(MIN_UNICODE_RUNE);
    }
    Ok(key)
}

/// Splits a composite key back into its object type and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), ContextError> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_NAMESPACE)
        .ok_or_else(|| ContextError::InvalidKey(format!("{:?} is not a composite key", key)))?;

    let mut components = body
        .split_terminator(MIN_UNICODE_RUNE)
        .map(ToString::to_string);
    let object_type = components
        .next()
        .ok_or_else(|| ContextError::InvalidKey(format!("{:?} has no object type", key)))?;

    Ok((object_type, components.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_recovers_components() {
        let key = create_composite_key("TempLog", &["B1", "t1"]).unwrap();
        let (object_type, attributes) = split_composite_key(&key).unwrap();
        assert_eq!(object_type, "TempLog");
        assert_eq!(attributes, vec!["B1".to_string(), "t1".to_string()]);
    }

    /// A key built from fewer attributes is a prefix of the full key, but a batch id that is a
    /// string prefix of another batch id does not produce a matching prefix.
    #[test]
    fn test_partial_key_is_prefix() {
        let full = create_composite_key("TempLog", &["B1", "t1"]).unwrap();
        let partial = create_composite_key("TempLog", &["B1"]).unwrap();
        let other = create_composite_key("TempLog", &["B10", "t1"]).unwrap();

        assert!(full.starts_with(&partial));
        assert!(!other.starts_with(&partial));
    }

    #[test]
    fn test_rejects_nul_in_attribute() {
        match create_composite_key("TempLog", &["B\u{0}1"]) {
            Err(ContextError::InvalidKey(_)) => (),
            res => panic!("Expected InvalidKey, got {:?}", res),
        }
    }

    #[test]
    fn test_rejects_empty_object_type() {
        assert!(create_composite_key("", &["B1"]).is_err());
    }

    #[test]
    fn test_split_rejects_simple_key() {
        assert!(split_composite_key("DELIVERY_B1").is_err());
    }
}
