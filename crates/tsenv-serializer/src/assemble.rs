//! Result assembly

use crate::record::{NamedType, OutputDocument, SerializationId, TypeRecord};

/// A qualified name and the id its declaration serialized to
pub type Entry = (Vec<String>, SerializationId);

/// Builds the output document. Entries stay flat, so merged declarations
/// sharing a qualified name appear once each.
pub fn assemble(records: Vec<TypeRecord>, globals: Vec<Entry>, types: Vec<Entry>, ambient: Vec<Entry>) -> OutputDocument {
    OutputDocument {
        data: records,
        globals: named(globals),
        types: named(types),
        ambient: named(ambient),
    }
}

fn named(entries: Vec<Entry>) -> Vec<NamedType> {
    entries
        .into_iter()
        .map(|(q_name, ty)| NamedType { q_name, ty })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_names_are_kept() {
        let id = SerializationId::from_index(0);
        let doc = assemble(
            vec![TypeRecord::Number],
            vec![(vec!["x".into()], id), (vec!["x".into()], id)],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(doc.globals.len(), 2);
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "data": [{"kind": "Number"}],
                "globals": [{"qName": ["x"], "type": 0}, {"qName": ["x"], "type": 0}],
                "types": [],
                "ambient": []
            })
        );
    }
}
