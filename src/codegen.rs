//! Emit Java message classes: constants, members, identity metadata, and
//! the serializationLength/serialize/deserialize methods.
//!
//! The three wire passes are three pure functions over the same classified
//! field slice from [`crate::layout`]; field order is declaration order in
//! all of them, and the wire format is strictly sequential little-endian
//! with no padding. Variable-length containers (strings, variable arrays)
//! carry a 4-byte count prefix written and consumed symmetrically.

use crate::identity::{self, TypeIdentity};
use crate::layout::{self, FieldLayout, WireClass};
use crate::mapping::{self, Builtin};
use crate::schema::{MessageType, SchemaRegistry};

/// Generation failures. Generation is deterministic, so none of these are
/// retryable; the schema has to change.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("unknown builtin type `{type_name}` in `{field}` of {message}")]
    UnknownBuiltinType {
        message: String,
        field: String,
        type_name: String,
    },
    #[error("unresolved composite type `{referenced}` in field `{field}` of {message}")]
    UnresolvedCompositeType {
        message: String,
        field: String,
        referenced: String,
    },
    #[error("cyclic type dependency: {cycle}")]
    CyclicTypeDependency { cycle: String },
}

/// One generated source unit, ready for the output writer.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub qualified_name: String,
    pub short_name: String,
    pub source: String,
}

/// Generate the Java class for `msg`. All-or-nothing: identity (which
/// validates the dependency closure) and layout run before any text is
/// produced, so a failing type emits nothing.
pub fn generate(msg: &MessageType, registry: &SchemaRegistry) -> Result<GeneratedUnit, GenError> {
    let id = identity::compute(msg, registry)?;
    let layouts = layout::classify(msg)?;
    let constants = constant_decls(msg)?;

    let mut s = String::new();
    s.push_str(&format!(
        "/* Auto-generated by msgforge for type {}; do not edit. */\n\n",
        id.qualified_name
    ));
    s.push_str(&format!(
        "package {};\n\n",
        mapping::java_package(&msg.package)
    ));
    s.push_str("import java.nio.ByteBuffer;\n\n");
    s.push_str(&format!(
        "public class {} extends {}.Message {{\n\n",
        msg.short_name,
        mapping::RUNTIME_PACKAGE
    ));

    for decl in &constants {
        s.push_str("  ");
        s.push_str(decl);
        s.push('\n');
    }
    if !constants.is_empty() {
        s.push('\n');
    }

    for l in &layouts {
        s.push_str("  ");
        s.push_str(&member_decl(l));
        s.push('\n');
    }
    if !layouts.is_empty() {
        s.push('\n');
    }

    emit_identity_methods(&mut s, &id);
    emit_length_method(&mut s, &layouts);
    emit_serialize_method(&mut s, &layouts);
    emit_deserialize_method(&mut s, &layouts);

    s.push_str(&format!("}} // class {}\n", msg.short_name));

    Ok(GeneratedUnit {
        qualified_name: id.qualified_name,
        short_name: msg.short_name.clone(),
        source: s,
    })
}

fn constant_decls(msg: &MessageType) -> Result<Vec<String>, GenError> {
    msg.constants
        .iter()
        .map(|c| {
            let builtin = mapping::lookup(&c.declared_type).ok_or_else(|| {
                GenError::UnknownBuiltinType {
                    message: msg.qualified_name(),
                    field: c.name.clone(),
                    type_name: c.declared_type.clone(),
                }
            })?;
            Ok(format!(
                "public static final {} {} = {};",
                builtin.java_type,
                c.name,
                constant_literal(builtin, &c.value)
            ))
        })
        .collect()
}

/// Render a constant value as a Java literal of the mapped type.
fn constant_literal(builtin: &Builtin, value: &str) -> String {
    match builtin.java_type {
        "java.lang.String" => format!("\"{}\"", identity::escape_for_embedding(value)),
        "long" => format!("{}L", value),
        "float" => format!("{}f", value),
        _ => value.to_string(),
    }
}

fn member_decl(l: &FieldLayout) -> String {
    let name = &l.field.name;
    match l.class {
        WireClass::ScalarFixed { .. } => {
            // time/duration are runtime value objects; numeric scalars rely
            // on the Java zero default
            if l.field.base_type == "time" || l.field.base_type == "duration" {
                format!("public {} {} = new {}();", l.java_type, name, l.java_type)
            } else {
                format!("public {} {};", l.java_type, name)
            }
        }
        WireClass::ScalarVariable { .. } => {
            format!("public {} {} = \"\";", l.java_type, name)
        }
        WireClass::FixedArray { len, .. } => format!(
            "public {}[] {} = new {}[{}];",
            l.java_type, name, l.java_type, len
        ),
        WireClass::VariableArray { .. } => format!(
            "public java.util.ArrayList<{}> {} = new java.util.ArrayList<{}>();",
            l.boxed_type, name, l.boxed_type
        ),
        WireClass::Composite => {
            format!("public {} {} = new {}();", l.java_type, name, l.java_type)
        }
        WireClass::CompositeArray { len: Some(n) } => format!(
            "public {}[] {} = new {}[{}];",
            l.java_type, name, l.java_type, n
        ),
        WireClass::CompositeArray { len: None } => format!(
            "public java.util.ArrayList<{}> {} = new java.util.ArrayList<{}>();",
            l.java_type, name, l.java_type
        ),
    }
}

fn emit_identity_methods(s: &mut String, id: &TypeIdentity) {
    s.push_str(&format!(
        "  public static java.lang.String __s_getDataType() {{ return \"{}\"; }}\n",
        id.qualified_name
    ));
    s.push_str(&format!(
        "  public static java.lang.String __s_getFingerprint() {{ return \"{}\"; }}\n",
        id.fingerprint
    ));
    s.push_str(&format!(
        "  public static java.lang.String __s_getMessageDefinition() {{ return \"{}\"; }}\n\n",
        id.escaped_text
    ));
    s.push_str("  public java.lang.String getDataType() { return __s_getDataType(); }\n");
    s.push_str("  public java.lang.String getFingerprint() { return __s_getFingerprint(); }\n");
    s.push_str(
        "  public java.lang.String getMessageDefinition() { return __s_getMessageDefinition(); }\n\n",
    );
}

/// Length pass: exact byte count `serialize` will write, without writing.
fn emit_length_method(s: &mut String, layouts: &[FieldLayout]) {
    s.push_str("  public int serializationLength() {\n");
    s.push_str("    int __l = 0;\n");
    for l in layouts {
        let name = &l.field.name;
        match l.class {
            WireClass::ScalarFixed { width, .. } => {
                s.push_str(&format!("    __l += {}; // {}\n", width, name));
            }
            WireClass::ScalarVariable { .. } => {
                s.push_str(&format!("    __l += 4 + {}.length(); // {}\n", name, name));
            }
            WireClass::FixedArray { builtin, len } => match builtin.width {
                Some(w) => {
                    s.push_str(&format!(
                        "    __l += {}; // {}\n",
                        len as u64 * w as u64,
                        name
                    ));
                }
                None => {
                    s.push_str(&format!("    for({} val : {}) {{\n", l.java_type, name));
                    s.push_str("      __l += 4 + val.length();\n");
                    s.push_str("    }\n");
                }
            },
            WireClass::VariableArray { builtin } => match builtin.width {
                Some(w) => {
                    s.push_str(&format!(
                        "    __l += 4 + {}.size() * {}; // {}\n",
                        name, w, name
                    ));
                }
                None => {
                    s.push_str("    __l += 4;\n");
                    s.push_str(&format!("    for({} val : {}) {{\n", l.java_type, name));
                    s.push_str("      __l += 4 + val.length();\n");
                    s.push_str("    }\n");
                }
            },
            WireClass::Composite => {
                s.push_str(&format!("    __l += {}.serializationLength();\n", name));
            }
            WireClass::CompositeArray { len } => {
                if len.is_none() {
                    s.push_str("    __l += 4;\n");
                }
                s.push_str(&format!("    for({} val : {}) {{\n", l.java_type, name));
                s.push_str("      __l += val.serializationLength();\n");
                s.push_str("    }\n");
            }
        }
    }
    s.push_str("    return __l;\n");
    s.push_str("  }\n\n");
}

/// Serialize pass: write each field into the buffer in declaration order.
fn emit_serialize_method(s: &mut String, layouts: &[FieldLayout]) {
    s.push_str("  public void serialize(ByteBuffer bb) {\n");
    s.push_str("    bb.order(java.nio.ByteOrder.LITTLE_ENDIAN);\n");
    for l in layouts {
        let name = &l.field.name;
        match l.class {
            WireClass::ScalarFixed { builtin, .. } | WireClass::ScalarVariable { builtin } => {
                s.push_str(&format!("    {};\n", mapping::write_call(builtin, "bb", name)));
            }
            WireClass::FixedArray { builtin, .. } => {
                s.push_str(&format!("    for({} val : {}) {{\n", l.java_type, name));
                s.push_str(&format!("      {};\n", mapping::write_call(builtin, "bb", "val")));
                s.push_str("    }\n");
            }
            WireClass::VariableArray { builtin } => {
                s.push_str(&format!("    bb.putInt({}.size());\n", name));
                s.push_str(&format!("    for({} val : {}) {{\n", l.java_type, name));
                s.push_str(&format!("      {};\n", mapping::write_call(builtin, "bb", "val")));
                s.push_str("    }\n");
            }
            WireClass::Composite => {
                s.push_str(&format!("    {}.serialize(bb);\n", name));
            }
            WireClass::CompositeArray { len } => {
                if len.is_none() {
                    s.push_str(&format!("    bb.putInt({}.size());\n", name));
                }
                s.push_str(&format!("    for({} val : {}) {{\n", l.java_type, name));
                s.push_str("      val.serialize(bb);\n");
                s.push_str("    }\n");
            }
        }
    }
    s.push_str("  }\n\n");
}

/// Deserialize pass: strict mirror of the serialize pass.
fn emit_deserialize_method(s: &mut String, layouts: &[FieldLayout]) {
    s.push_str("  public void deserialize(ByteBuffer bb) {\n");
    s.push_str("    bb.order(java.nio.ByteOrder.LITTLE_ENDIAN);\n");
    for l in layouts {
        let name = &l.field.name;
        match l.class {
            WireClass::ScalarFixed { builtin, .. } | WireClass::ScalarVariable { builtin } => {
                s.push_str(&format!("    {} = {};\n", name, mapping::read_call(builtin, "bb")));
            }
            WireClass::FixedArray { builtin, .. } => {
                s.push_str(&format!(
                    "    for(int __i = 0; __i < {}.length; __i++) {{\n",
                    name
                ));
                s.push_str(&format!(
                    "      {}[__i] = {};\n",
                    name,
                    mapping::read_call(builtin, "bb")
                ));
                s.push_str("    }\n");
            }
            WireClass::VariableArray { builtin } => {
                s.push_str(&format!("    int __{}_len = bb.getInt();\n", name));
                s.push_str(&format!(
                    "    {} = new java.util.ArrayList<{}>(__{}_len);\n",
                    name, l.boxed_type, name
                ));
                s.push_str(&format!(
                    "    for(int __i = 0; __i < __{}_len; __i++) {{\n",
                    name
                ));
                s.push_str(&format!(
                    "      {}.add({});\n",
                    name,
                    mapping::read_call(builtin, "bb")
                ));
                s.push_str("    }\n");
            }
            WireClass::Composite => {
                s.push_str(&format!("    {}.deserialize(bb);\n", name));
            }
            WireClass::CompositeArray { len: None } => {
                s.push_str(&format!("    int __{}_len = bb.getInt();\n", name));
                s.push_str(&format!(
                    "    {} = new java.util.ArrayList<{}>(__{}_len);\n",
                    name, l.java_type, name
                ));
                s.push_str(&format!(
                    "    for(int __i = 0; __i < __{}_len; __i++) {{\n",
                    name
                ));
                s.push_str(&format!("      {} __tmp = new {}();\n", l.java_type, l.java_type));
                s.push_str("      __tmp.deserialize(bb);\n");
                s.push_str(&format!("      {}.add(__tmp);\n", name));
                s.push_str("    }\n");
            }
            WireClass::CompositeArray { len: Some(_) } => {
                s.push_str(&format!(
                    "    for(int __i = 0; __i < {}.length; __i++) {{\n",
                    name
                ));
                s.push_str(&format!("      {}[__i] = new {}();\n", name, l.java_type));
                s.push_str(&format!("      {}[__i].deserialize(bb);\n", name));
                s.push_str("    }\n");
            }
        }
    }
    s.push_str("  }\n");
}
