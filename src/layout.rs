//! Wire-layout classification: one pass, shared by all three emitters.
//!
//! Serialize, deserialize, and length generation must never disagree on a
//! field's shape, so the classification is computed here exactly once per
//! field and the emitters consume the resulting slice verbatim. Each
//! variant carries the resolved mapping row and counts the emitters need,
//! keeping them total over the classification.

use crate::codegen::GenError;
use crate::mapping::{self, Builtin};
use crate::schema::{Field, MessageType, SchemaRegistry};

/// Wire shape of a field.
#[derive(Debug, Clone, Copy)]
pub enum WireClass {
    /// Builtin scalar with a fixed byte width.
    ScalarFixed { builtin: &'static Builtin, width: u32 },
    /// String scalar: 4-byte length prefix plus payload.
    ScalarVariable { builtin: &'static Builtin },
    /// Fixed-count array of builtin elements; no count on the wire.
    FixedArray { builtin: &'static Builtin, len: usize },
    /// Variable-count array of builtin elements; 4-byte count prefix.
    VariableArray { builtin: &'static Builtin },
    /// Single nested message value.
    Composite,
    /// Array of nested message values; count prefix unless fixed-length.
    CompositeArray { len: Option<usize> },
}

/// A field plus everything the emitters need to know about its shape.
#[derive(Debug, Clone)]
pub struct FieldLayout<'a> {
    pub field: &'a Field,
    pub class: WireClass,
    /// Java type of the field's scalar, or of one element for arrays.
    pub java_type: String,
    /// Boxed element type for `ArrayList` containers.
    pub boxed_type: String,
}

/// Classify every field of a message, in declaration order.
pub fn classify<'a>(msg: &'a MessageType) -> Result<Vec<FieldLayout<'a>>, GenError> {
    msg.fields
        .iter()
        .map(|f| classify_field(msg, f))
        .collect()
}

/// Classify one field. Precedence is significant and mirrored nowhere else.
pub fn classify_field<'a>(
    msg: &MessageType,
    field: &'a Field,
) -> Result<FieldLayout<'a>, GenError> {
    if field.is_builtin {
        let builtin = mapping::lookup(&field.base_type).ok_or_else(|| {
            GenError::UnknownBuiltinType {
                message: msg.qualified_name(),
                field: field.name.clone(),
                type_name: field.base_type.clone(),
            }
        })?;
        let class = if field.is_array {
            match field.array_len {
                None => WireClass::VariableArray { builtin },
                Some(len) => WireClass::FixedArray { builtin, len },
            }
        } else {
            // string is the only builtin without a fixed width
            match builtin.width {
                None => WireClass::ScalarVariable { builtin },
                Some(width) => WireClass::ScalarFixed { builtin, width },
            }
        };
        return Ok(FieldLayout {
            field,
            class,
            java_type: builtin.java_type.to_string(),
            boxed_type: builtin.boxed_type.to_string(),
        });
    }

    let java_type = mapping::java_class(&field.base_type);
    let class = if field.is_array {
        WireClass::CompositeArray {
            len: field.array_len,
        }
    } else {
        WireClass::Composite
    };
    Ok(FieldLayout {
        field,
        class,
        boxed_type: java_type.clone(),
        java_type,
    })
}

/// Total wire size of a message when every field is fixed-width, `None` as
/// soon as any field (transitively) is variable. Revisiting a type already
/// on the walk path means a cyclic schema; that also yields `None` here and
/// is reported properly by the identity walk.
pub fn fixed_wire_size(msg: &MessageType, registry: &SchemaRegistry) -> Option<u64> {
    fn walk(msg: &MessageType, registry: &SchemaRegistry, path: &mut Vec<String>) -> Option<u64> {
        let qualified = msg.qualified_name();
        if path.contains(&qualified) {
            return None;
        }
        path.push(qualified);
        let mut total: u64 = 0;
        for field in &msg.fields {
            let elem: u64 = if field.is_builtin {
                mapping::lookup(&field.base_type)?.width? as u64
            } else {
                let dep = registry.get(&field.base_type)?;
                walk(dep, registry, path)?
            };
            total += match (field.is_array, field.array_len) {
                (false, _) => elem,
                (true, Some(n)) => elem * n as u64,
                (true, None) => return None,
            };
        }
        path.pop();
        Some(total)
    }
    walk(msg, registry, &mut Vec::new())
}
