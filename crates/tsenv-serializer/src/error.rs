//! Serialization errors

use thiserror::Error;

use crate::record::SerializationId;

/// Fatal errors; any of them abandons the whole run.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("unhandled type kind: flags {flags:#x}, object flags {object_flags:#x} ({description})")]
    UnhandledTypeKind {
        flags: u32,
        object_flags: u32,
        description: String,
    },

    #[error("property '{property}' has ambiguous declarations: {}", kinds.join(", "))]
    AmbiguousDeclarations { property: String, kinds: Vec<String> },

    #[error("type record {id} was never populated")]
    UnpopulatedRecord { id: SerializationId },

    #[error("class record {id} has no instance form")]
    MissingInstanceForm { id: SerializationId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SerializeError::UnhandledTypeKind {
            flags: 0x40,
            object_flags: 0,
            description: "bigint".into(),
        };
        assert_eq!(
            err.to_string(),
            "unhandled type kind: flags 0x40, object flags 0x0 (bigint)"
        );
        let err = SerializeError::AmbiguousDeclarations {
            property: "p".into(),
            kinds: vec!["PropertySignature".into(), "MethodSignature".into()],
        };
        assert_eq!(
            err.to_string(),
            "property 'p' has ambiguous declarations: PropertySignature, MethodSignature"
        );
    }
}
