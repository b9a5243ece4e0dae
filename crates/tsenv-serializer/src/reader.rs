//! Output reader
//!
//! Reads a serialized environment back into typed records and offers the
//! views consumers usually build on top of it.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::record::{InterfaceRecord, OutputDocument, SerializationId, TypeRecord};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("invalid environment document")]
    Json(#[from] serde_json::Error),

    #[error("{referrer} refers to missing record {id}")]
    DanglingReference { referrer: String, id: SerializationId },

    #[error("record {id} is {found}, expected {expected}")]
    WrongKind {
        id: SerializationId,
        expected: &'static str,
        found: &'static str,
    },
}

pub fn read_document(text: &str) -> Result<OutputDocument, ReadError> {
    Ok(serde_json::from_str(text)?)
}

impl OutputDocument {
    pub fn record(&self, id: SerializationId) -> Option<&TypeRecord> {
        self.data.get(id.index()?)
    }

    fn expect_record(&self, id: SerializationId, referrer: impl FnOnce() -> String) -> Result<&TypeRecord, ReadError> {
        self.record(id).ok_or_else(|| ReadError::DanglingReference {
            referrer: referrer(),
            id,
        })
    }

    /// Checks that every reference is the sentinel or a valid index, and
    /// that every class instance links to a class.
    pub fn validate(&self) -> Result<(), ReadError> {
        for (index, record) in self.data.iter().enumerate() {
            for id in record.references() {
                if !id.is_none() {
                    self.expect_record(id, || format!("record {}", index))?;
                }
            }
            if let TypeRecord::ClassInstance { class_type } = record {
                let target = self.expect_record(*class_type, || format!("record {}", index))?;
                if !matches!(target, TypeRecord::Class(_)) {
                    return Err(ReadError::WrongKind {
                        id: *class_type,
                        expected: "Class",
                        found: target.kind_name(),
                    });
                }
            }
        }
        let partitions = [("globals", &self.globals), ("types", &self.types), ("ambient", &self.ambient)];
        for (partition, entries) in partitions {
            for entry in entries {
                if !entry.ty.is_none() {
                    self.expect_record(entry.ty, || format!("{} entry '{}'", partition, entry.q_name.join(".")))?;
                }
            }
        }
        Ok(())
    }

    /// Number of records per kind.
    pub fn kind_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.data {
            *counts.entry(record.kind_name()).or_insert(0) += 1;
        }
        counts
    }

    /// The instance side of a class as an interface: its instance
    /// properties, index types and base types in instance form.
    pub fn instance_view(&self, class: SerializationId) -> Result<InterfaceRecord, ReadError> {
        let record = self.expect_record(class, || "instance view".to_string())?;
        let TypeRecord::Class(class_record) = record else {
            return Err(ReadError::WrongKind {
                id: class,
                expected: "Class",
                found: record.kind_name(),
            });
        };
        let base_types = class_record
            .base_types
            .iter()
            .map(|&base| match self.record(base) {
                Some(TypeRecord::Class(_)) => self.instance_of(base).unwrap_or(base),
                _ => base,
            })
            .collect();
        Ok(InterfaceRecord {
            type_parameters: class_record.type_parameters.clone(),
            base_types,
            declared_properties: class_record.instance_properties.clone(),
            declared_call_signatures: Vec::new(),
            declared_construct_signatures: Vec::new(),
            declared_string_index_type: class_record.declared_string_index_type,
            declared_number_index_type: class_record.declared_number_index_type,
        })
    }

    /// Id of the instance record linked to class record `class`.
    pub fn instance_of(&self, class: SerializationId) -> Option<SerializationId> {
        self.data.iter().position(|record| {
            matches!(record, TypeRecord::ClassInstance { class_type } if *class_type == class)
        })
        .map(SerializationId::from_index)
    }

    /// An interface whose properties are the global values; the first
    /// declaration of a name wins.
    pub fn global_object(&self) -> InterfaceRecord {
        let mut global = InterfaceRecord::empty();
        for entry in &self.globals {
            if let [name] = entry.q_name.as_slice() {
                global.declared_properties.entry(name.clone()).or_insert(entry.ty);
            }
        }
        global
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ClassRecord, NamedType, PropertyMap};

    fn id(index: usize) -> SerializationId {
        SerializationId::from_index(index)
    }

    fn class_document() -> OutputDocument {
        let mut instance_properties = PropertyMap::new();
        instance_properties.insert("x".into(), id(3));
        let class = |bases: Vec<SerializationId>, props: PropertyMap| {
            TypeRecord::Class(ClassRecord {
                constructors: Vec::new(),
                base_types: bases,
                static_properties: PropertyMap::new(),
                instance_properties: props,
                declared_string_index_type: SerializationId::NONE,
                declared_number_index_type: SerializationId::NONE,
                type_parameters: Vec::new(),
                type_arguments: Vec::new(),
                target: SerializationId::NONE,
            })
        };
        OutputDocument {
            data: vec![
                TypeRecord::ClassInstance { class_type: id(1) },
                class(vec![id(4)], instance_properties),
                TypeRecord::ClassInstance { class_type: id(4) },
                TypeRecord::Number,
                class(Vec::new(), PropertyMap::new()),
            ],
            globals: vec![
                NamedType {
                    q_name: vec!["Derived".into()],
                    ty: id(1),
                },
                NamedType {
                    q_name: vec!["Derived".into()],
                    ty: id(3),
                },
            ],
            types: Vec::new(),
            ambient: Vec::new(),
        }
    }

    #[test]
    fn test_validate_accepts_consistent_documents() {
        let doc = class_document();
        doc.validate().expect("valid");
        assert_eq!(doc.kind_counts()["Class"], 2);
    }

    #[test]
    fn test_validate_reports_dangling_ids() {
        let mut doc = class_document();
        doc.data.push(TypeRecord::Union {
            elements: vec![id(0), id(42)],
        });
        let err = doc.validate().expect_err("dangling");
        assert!(matches!(err, ReadError::DanglingReference { id: found, .. } if found == id(42)));
        assert_eq!(err.to_string(), "record 5 refers to missing record 42");
    }

    #[test]
    fn test_validate_checks_class_instances() {
        let mut doc = class_document();
        doc.data[0] = TypeRecord::ClassInstance { class_type: id(3) };
        let err = doc.validate().expect_err("wrong kind");
        assert!(matches!(err, ReadError::WrongKind { found: "Number", .. }));
    }

    #[test]
    fn test_instance_view() {
        let doc = class_document();
        let view = doc.instance_view(id(1)).expect("view");
        assert_eq!(view.base_types, vec![id(2)]);
        assert_eq!(view.declared_properties["x"], id(3));
        assert!(matches!(doc.instance_view(id(3)), Err(ReadError::WrongKind { .. })));
    }

    #[test]
    fn test_global_object_keeps_first_declaration() {
        let doc = class_document();
        let global = doc.global_object();
        assert_eq!(global.declared_properties.len(), 1);
        assert_eq!(global.declared_properties["Derived"], id(1));
    }

    #[test]
    fn test_read_document_round_trip() {
        let doc = class_document();
        let text = serde_json::to_string(&doc).expect("json");
        assert_eq!(read_document(&text).expect("read"), doc);
        assert!(matches!(read_document("{"), Err(ReadError::Json(_))));
    }
}
