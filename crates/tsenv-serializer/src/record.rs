//! Serialized type records
//!
//! The output model: a flat array of [`TypeRecord`]s that refer to each
//! other only through [`SerializationId`]s, plus the named entries that
//! point into it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into the record array; `-1` is "no type"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializationId(i32);

impl SerializationId {
    pub const NONE: SerializationId = SerializationId(-1);

    pub fn from_index(index: usize) -> Self {
        SerializationId(index as i32)
    }

    /// Array index, `None` for the sentinel (or any negative id).
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    pub fn is_none(self) -> bool {
        self.0 < 0
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl Default for SerializationId {
    fn default() -> Self {
        SerializationId::NONE
    }
}

impl fmt::Display for SerializationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Property name to property type
pub type PropertyMap = IndexMap<String, SerializationId>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SerializationId,
}

/// A call or construct signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub type_parameters: Vec<SerializationId>,
    pub parameters: Vec<ParameterRecord>,
    pub resolved_return_type: SerializationId,
    pub min_argument_count: usize,
    pub has_rest_parameter: bool,
}

/// Shape shared by interfaces, generics and resolved anonymous types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRecord {
    pub type_parameters: Vec<SerializationId>,
    pub base_types: Vec<SerializationId>,
    pub declared_properties: PropertyMap,
    pub declared_call_signatures: Vec<SignatureRecord>,
    pub declared_construct_signatures: Vec<SignatureRecord>,
    pub declared_string_index_type: SerializationId,
    pub declared_number_index_type: SerializationId,
}

impl InterfaceRecord {
    pub fn empty() -> Self {
        InterfaceRecord::default()
    }
}

/// An interface body that is also a reference to its generic definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericRecord {
    #[serde(flatten)]
    pub shape: InterfaceRecord,
    pub target: SerializationId,
    pub type_arguments: Vec<SerializationId>,
}

/// Constructor and static side of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub constructors: Vec<SignatureRecord>,
    pub base_types: Vec<SerializationId>,
    pub static_properties: PropertyMap,
    pub instance_properties: PropertyMap,
    pub declared_string_index_type: SerializationId,
    pub declared_number_index_type: SerializationId,
    pub type_parameters: Vec<SerializationId>,
    pub type_arguments: Vec<SerializationId>,
    pub target: SerializationId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum TypeRecord {
    Any,
    String,
    Number,
    Boolean,
    Void,
    Undefined,
    Null,
    Enum,
    Never,
    Symbol,
    Object,
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    TypeParameter {
        constraint: SerializationId,
    },
    ThisType {
        constraint: SerializationId,
    },
    Class(ClassRecord),
    ClassInstance {
        class_type: SerializationId,
    },
    Interface(InterfaceRecord),
    Generic(GenericRecord),
    Reference {
        target: SerializationId,
        type_arguments: Vec<SerializationId>,
    },
    Tuple {
        element_types: Vec<SerializationId>,
        min_length: usize,
    },
    Union {
        elements: Vec<SerializationId>,
    },
    Intersection {
        elements: Vec<SerializationId>,
    },
    IndexedAccess {
        object_type: SerializationId,
        index_type: SerializationId,
    },
    Index {
        #[serde(rename = "type")]
        ty: SerializationId,
    },
    Anonymous,
}

impl TypeRecord {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeRecord::Any => "Any",
            TypeRecord::String => "String",
            TypeRecord::Number => "Number",
            TypeRecord::Boolean => "Boolean",
            TypeRecord::Void => "Void",
            TypeRecord::Undefined => "Undefined",
            TypeRecord::Null => "Null",
            TypeRecord::Enum => "Enum",
            TypeRecord::Never => "Never",
            TypeRecord::Symbol => "Symbol",
            TypeRecord::Object => "Object",
            TypeRecord::StringLiteral { .. } => "StringLiteral",
            TypeRecord::NumberLiteral { .. } => "NumberLiteral",
            TypeRecord::BooleanLiteral { .. } => "BooleanLiteral",
            TypeRecord::TypeParameter { .. } => "TypeParameter",
            TypeRecord::ThisType { .. } => "ThisType",
            TypeRecord::Class(_) => "Class",
            TypeRecord::ClassInstance { .. } => "ClassInstance",
            TypeRecord::Interface(_) => "Interface",
            TypeRecord::Generic(_) => "Generic",
            TypeRecord::Reference { .. } => "Reference",
            TypeRecord::Tuple { .. } => "Tuple",
            TypeRecord::Union { .. } => "Union",
            TypeRecord::Intersection { .. } => "Intersection",
            TypeRecord::IndexedAccess { .. } => "IndexedAccess",
            TypeRecord::Index { .. } => "Index",
            TypeRecord::Anonymous => "Anonymous",
        }
    }

    /// Interface-like body of an `Interface` or `Generic` record.
    pub fn interface_shape(&self) -> Option<&InterfaceRecord> {
        match self {
            TypeRecord::Interface(shape) => Some(shape),
            TypeRecord::Generic(generic) => Some(&generic.shape),
            _ => None,
        }
    }

    pub fn interface_shape_mut(&mut self) -> Option<&mut InterfaceRecord> {
        match self {
            TypeRecord::Interface(shape) => Some(shape),
            TypeRecord::Generic(generic) => Some(&mut generic.shape),
            _ => None,
        }
    }

    /// Every id this record refers to, in field order.
    pub fn references(&self) -> Vec<SerializationId> {
        let mut out = Vec::new();
        match self {
            TypeRecord::TypeParameter { constraint } | TypeRecord::ThisType { constraint } => {
                out.push(*constraint)
            }
            TypeRecord::Class(class) => {
                for signature in &class.constructors {
                    signature.collect_references(&mut out);
                }
                out.extend(&class.base_types);
                out.extend(class.static_properties.values());
                out.extend(class.instance_properties.values());
                out.push(class.declared_string_index_type);
                out.push(class.declared_number_index_type);
                out.extend(&class.type_parameters);
                out.extend(&class.type_arguments);
                out.push(class.target);
            }
            TypeRecord::ClassInstance { class_type } => out.push(*class_type),
            TypeRecord::Interface(shape) => shape.collect_references(&mut out),
            TypeRecord::Generic(generic) => {
                generic.shape.collect_references(&mut out);
                out.push(generic.target);
                out.extend(&generic.type_arguments);
            }
            TypeRecord::Reference {
                target,
                type_arguments,
            } => {
                out.push(*target);
                out.extend(type_arguments);
            }
            TypeRecord::Tuple { element_types, .. } => out.extend(element_types),
            TypeRecord::Union { elements } | TypeRecord::Intersection { elements } => out.extend(elements),
            TypeRecord::IndexedAccess {
                object_type,
                index_type,
            } => {
                out.push(*object_type);
                out.push(*index_type);
            }
            TypeRecord::Index { ty } => out.push(*ty),
            _ => {}
        }
        out
    }
}

impl InterfaceRecord {
    fn collect_references(&self, out: &mut Vec<SerializationId>) {
        out.extend(&self.type_parameters);
        out.extend(&self.base_types);
        out.extend(self.declared_properties.values());
        for signature in self
            .declared_call_signatures
            .iter()
            .chain(&self.declared_construct_signatures)
        {
            signature.collect_references(out);
        }
        out.push(self.declared_string_index_type);
        out.push(self.declared_number_index_type);
    }
}

impl SignatureRecord {
    fn collect_references(&self, out: &mut Vec<SerializationId>) {
        out.extend(&self.type_parameters);
        out.extend(self.parameters.iter().map(|p| p.ty));
        out.push(self.resolved_return_type);
    }
}

/// A qualified name paired with the id of its type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedType {
    pub q_name: Vec<String>,
    #[serde(rename = "type")]
    pub ty: SerializationId,
}

/// The serialized environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub data: Vec<TypeRecord>,
    pub globals: Vec<NamedType>,
    pub types: Vec<NamedType>,
    pub ambient: Vec<NamedType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_records_carry_only_their_kind() {
        assert_eq!(serde_json::to_value(TypeRecord::Number).unwrap(), json!({"kind": "Number"}));
        assert_eq!(
            serde_json::to_value(TypeRecord::Index {
                ty: SerializationId::from_index(3)
            })
            .unwrap(),
            json!({"kind": "Index", "type": 3})
        );
    }

    #[test]
    fn test_default_ids_are_no_type() {
        assert!(SerializationId::default().is_none());
        let empty = InterfaceRecord::default();
        assert_eq!(empty.declared_string_index_type, SerializationId::NONE);
        assert_eq!(
            serde_json::to_value(&empty).unwrap()["declaredNumberIndexType"],
            json!(-1)
        );
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let record = TypeRecord::ClassInstance {
            class_type: SerializationId::from_index(1),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"kind": "ClassInstance", "classType": 1})
        );
        let tuple = TypeRecord::Tuple {
            element_types: vec![SerializationId::from_index(0)],
            min_length: 1,
        };
        assert_eq!(
            serde_json::to_value(&tuple).unwrap(),
            json!({"kind": "Tuple", "elementTypes": [0], "minLength": 1})
        );
    }

    #[test]
    fn test_generic_record_is_flat() {
        let generic = TypeRecord::Generic(GenericRecord {
            shape: InterfaceRecord::empty(),
            target: SerializationId::from_index(0),
            type_arguments: vec![SerializationId::from_index(1)],
        });
        let value = serde_json::to_value(&generic).unwrap();
        assert_eq!(value["kind"], "Generic");
        assert_eq!(value["declaredStringIndexType"], -1);
        assert_eq!(value["target"], 0);
        assert_eq!(value["typeArguments"], json!([1]));
        let back: TypeRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, generic);
    }

    #[test]
    fn test_references_list_every_id() {
        let union = TypeRecord::Union {
            elements: vec![SerializationId::from_index(2), SerializationId::from_index(5)],
        };
        assert_eq!(
            union.references(),
            vec![SerializationId::from_index(2), SerializationId::from_index(5)]
        );
        assert!(TypeRecord::Anonymous.references().is_empty());
        assert_eq!(SerializationId::NONE.index(), None);
    }
}
