//! YAML adapter, the default on-disk format.
//!
//! `serde_yaml` always emits 2-space indentation.  The canonical output of
//! this adapter nests blocks by 4 spaces, so the emitted text is re-indented
//! before it is returned:
//!
//! ```text
//! subConfig:            subConfig:
//!   key1: a      ->         key1: a
//! items:                items:
//! - name: x             -   name: x
//!   port: 1                 port: 1
//! ```
//!
//! Literal block scalars (`|`, `>`) are shifted along with their header and
//! their content is never rewritten.  If the rewritten text would not parse
//! back to the same document, the emitter's own output is kept.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{DeserializeError, SerializeError, Serializer};

/// Spaces per nesting level in the emitted YAML.
pub const YAML_INDENT: usize = 4;

/// Width of one nesting level as produced by `serde_yaml`.
const EMITTER_INDENT: usize = 2;

/// Stores config as YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YamlSerializer;

impl<T> Serializer<T> for YamlSerializer
where
    T: Serialize + DeserializeOwned,
{
    fn serialize_data(&self, data: &T) -> Result<Vec<u8>, SerializeError> {
        let text = serde_yaml::to_string(data).map_err(SerializeError::Yaml)?;
        Ok(canonical_indent(text).into_bytes())
    }

    fn deserialize_data(&self, raw: &[u8]) -> Result<T, DeserializeError> {
        serde_yaml::from_slice(raw).map_err(DeserializeError::Yaml)
    }
}

/// Re-indents emitter output to [`YAML_INDENT`], keeping the original when
/// the rewrite does not round-trip.
fn canonical_indent(text: String) -> String {
    let rewritten = reindent(&text, YAML_INDENT);
    if rewritten == text {
        return text;
    }

    let same = match (
        serde_yaml::from_str::<serde_yaml::Value>(&text),
        serde_yaml::from_str::<serde_yaml::Value>(&rewritten),
    ) {
        (Ok(before), Ok(after)) => before == after,
        _ => false,
    };
    if same {
        rewritten
    } else {
        text
    }
}

/// Rewrites the structural indentation of `text` to `step` columns per level.
fn reindent(text: &str, step: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    // Column owning an open block scalar, and how far its header moved.
    let mut block: Option<(isize, usize)> = None;

    for line in text.split_inclusive('\n') {
        if let Some((owner, shift)) = block {
            let blank = line.trim().is_empty();
            if blank || leading_spaces(line) as isize > owner {
                if !blank {
                    out.push_str(&" ".repeat(shift));
                }
                out.push_str(line);
                continue;
            }
            block = None;
        }

        let (consumed, prefix) = scale_prefix(line, step);
        let body = &line[consumed..];
        if let Some(bare) = block_scalar_header(body) {
            let owner = if bare {
                consumed as isize - EMITTER_INDENT as isize
            } else {
                consumed as isize
            };
            block = Some((owner, prefix.len() - consumed));
        }
        out.push_str(&prefix);
        out.push_str(body);
    }
    out
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count()
}

/// Scales the leading run of indentation units (`"  "` and `"- "`).
///
/// Returns the number of bytes consumed and the replacement prefix.
fn scale_prefix(line: &str, step: usize) -> (usize, String) {
    let bytes = line.as_bytes();
    let mut consumed = 0;
    let mut prefix = String::new();
    while consumed + EMITTER_INDENT <= bytes.len() {
        match &bytes[consumed..consumed + EMITTER_INDENT] {
            b"  " => prefix.push_str(&" ".repeat(step)),
            b"- " => {
                prefix.push('-');
                prefix.push_str(&" ".repeat(step - 1));
            }
            _ => break,
        }
        consumed += EMITTER_INDENT;
    }
    (consumed, prefix)
}

/// Detects a block scalar header (`|`, `|-`, `>+`, `|2-`, ...) at the end of
/// `body`.  Returns `Some(true)` when the header is the whole body (a
/// sequence entry or top-level scalar) and `Some(false)` after a `key: `.
fn block_scalar_header(body: &str) -> Option<bool> {
    let body = body.trim_end();
    let (token, bare) = match body.rsplit_once(": ") {
        Some((_, token)) => (token, false),
        None => (body, true),
    };

    let mut chars = token.chars();
    if !matches!(chars.next(), Some('|' | '>')) {
        return None;
    }
    let rest: Vec<char> = chars.collect();
    if rest.len() > 2 {
        return None;
    }
    let digits = rest.iter().filter(|c| c.is_ascii_digit()).count();
    let chomps = rest.iter().filter(|c| matches!(c, '-' | '+')).count();
    if digits <= 1 && chomps <= 1 && digits + chomps == rest.len() {
        Some(bare)
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SubConfig {
        key1: String,
        key2: i64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct TestConfig {
        string_prop: String,
        int_prop: i64,
        bool_prop: bool,
        sub_config: SubConfig,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Endpoint {
        name: String,
        ports: Vec<u16>,
        notes: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Cluster {
        endpoints: Vec<Endpoint>,
        matrix: Vec<Vec<u8>>,
    }

    fn encode<T: Serialize + DeserializeOwned>(value: &T) -> String {
        String::from_utf8(YamlSerializer.serialize_data(value).expect("serialize")).unwrap()
    }

    #[test]
    fn test_nested_mapping_uses_four_space_indentation() {
        // Arrange
        let cfg = TestConfig {
            string_prop: "not default".to_string(),
            int_prop: 11,
            bool_prop: true,
            sub_config: SubConfig {
                key1: "value 1".to_string(),
                key2: 33,
            },
        };

        // Act
        let text = encode(&cfg);

        // Assert
        assert_eq!(
            text,
            "stringProp: not default\nintProp: 11\nboolProp: true\nsubConfig:\n    key1: value 1\n    key2: 33\n"
        );
    }

    #[test]
    fn test_decodes_irregular_indentation() {
        let raw = b"stringProp: foo\nintProp: 11\nboolProp: true\nsubConfig:\n   key1: bar\n   key2: 22\n";

        let cfg: TestConfig = YamlSerializer.deserialize_data(raw).unwrap();

        assert_eq!(
            cfg,
            TestConfig {
                string_prop: "foo".to_string(),
                int_prop: 11,
                bool_prop: true,
                sub_config: SubConfig {
                    key1: "bar".to_string(),
                    key2: 22,
                },
            }
        );
    }

    #[test]
    fn test_sequences_of_mappings_survive_reindent() {
        // Arrange
        let cluster = Cluster {
            endpoints: vec![
                Endpoint {
                    name: "primary".to_string(),
                    ports: vec![80, 443],
                    notes: "first line\nsecond line\n".to_string(),
                },
                Endpoint {
                    name: "backup".to_string(),
                    ports: vec![],
                    notes: String::new(),
                },
            ],
            matrix: vec![vec![1, 2], vec![3]],
        };

        // Act
        let text = encode(&cluster);
        let decoded: Cluster = YamlSerializer.deserialize_data(text.as_bytes()).unwrap();

        // Assert
        assert_eq!(decoded, cluster);
        assert!(text.contains("-   name: primary\n    ports:\n"), "got:\n{text}");
    }

    #[test]
    fn test_malformed_yaml_is_deserialize_error() {
        let raw = b"stringProp: foo\nintProp: 11\nboolProp # error here\nsubConfig:\n   key1: bar\n";

        let result: Result<TestConfig, _> = YamlSerializer.deserialize_data(raw);

        assert!(matches!(result, Err(DeserializeError::Yaml(_))));
    }

    #[test]
    fn test_wrong_scalar_kind_is_deserialize_error() {
        let raw = b"stringProp: foo\nintProp: 11\nboolProp: yes!\n";

        let result: Result<TestConfig, _> = YamlSerializer.deserialize_data(raw);

        assert!(matches!(result, Err(DeserializeError::Yaml(_))));
    }

    #[test]
    fn test_unrepresentable_value_is_serialize_error() {
        #[derive(Debug, Deserialize)]
        struct Callback;

        impl Serialize for Callback {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot marshal type: func()"))
            }
        }

        let result = YamlSerializer.serialize_data(&Callback);

        let err = result.expect_err("callback must not serialize");
        assert!(err.to_string().contains("cannot marshal type: func()"));
    }

    // ── reindent helpers ──────────────────────────────────────────────────────

    #[test]
    fn test_reindent_keeps_literal_block_content() {
        let text = "a:\n  b: |-\n    keep  this\n      indented\n  c: 1\n";

        let out = reindent(text, 4);

        assert_eq!(out, "a:\n    b: |-\n      keep  this\n        indented\n    c: 1\n");
    }

    #[test]
    fn test_reindent_bare_block_in_sequence() {
        let text = "- |\n  x\n- y\n";

        let out = reindent(text, 4);

        assert_eq!(out, "-   |\n    x\n-   y\n");
    }

    #[test]
    fn test_block_scalar_header_detection() {
        assert_eq!(block_scalar_header("key: |\n"), Some(false));
        assert_eq!(block_scalar_header("key: >-\n"), Some(false));
        assert_eq!(block_scalar_header("key: |2-\n"), Some(false));
        assert_eq!(block_scalar_header("|+\n"), Some(true));
        assert_eq!(block_scalar_header("key: a |\n"), None);
        assert_eq!(block_scalar_header("key: value\n"), None);
        assert_eq!(block_scalar_header("key: |--\n"), None);
    }
}
