//! Type identity: qualified name, canonical definition text over the
//! dependency closure, and the MD5 fingerprint used as the
//! wire-compatibility check between independently generated peers.
//!
//! The canonical text is rebuilt from the parsed model, so whitespace and
//! comments in the schema source can never leak into the fingerprint; only
//! the type's name and package, its field types/names/array markers in
//! declared order, and its constant declarations contribute.

use std::collections::HashMap;

use md5::{Digest, Md5};

use crate::codegen::GenError;
use crate::schema::{Field, MessageType, SchemaRegistry};

/// Identity of one message type, computed once per generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeIdentity {
    /// `pkg/Name`.
    pub qualified_name: String,
    /// 32 lowercase hex digits of MD5 over `canonical_text`.
    pub fingerprint: String,
    /// Canonical definition of the type followed by its dependency closure.
    pub canonical_text: String,
    /// `canonical_text` escaped for embedding in a Java string literal.
    pub escaped_text: String,
}

/// Compute the identity of `msg` against the registry it was loaded into.
pub fn compute(msg: &MessageType, registry: &SchemaRegistry) -> Result<TypeIdentity, GenError> {
    let deps = dependency_closure(msg, registry)?;
    let canonical_text = canonical_text(msg, &deps);
    let fingerprint = md5_hex(&canonical_text);
    let escaped_text = escape_for_embedding(&canonical_text);
    Ok(TypeIdentity {
        qualified_name: msg.qualified_name(),
        fingerprint,
        canonical_text,
        escaped_text,
    })
}

/// Every composite type `msg` references, directly or transitively, in
/// first-seen depth-first order following field declaration order, each
/// exactly once. Explicit-stack walk over the registry arena: a cyclic
/// schema is reported instead of recursing forever.
pub fn dependency_closure<'a>(
    msg: &'a MessageType,
    registry: &'a SchemaRegistry,
) -> Result<Vec<&'a MessageType>, GenError> {
    #[derive(PartialEq)]
    enum Mark {
        Open,
        Done,
    }

    struct Frame<'a> {
        ty: &'a MessageType,
        next_field: usize,
    }

    enum Step<'a> {
        Descend(&'a MessageType, &'a Field),
        Finish(&'a MessageType),
    }

    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut order: Vec<&'a MessageType> = Vec::new();
    let mut stack: Vec<Frame<'a>> = Vec::new();

    marks.insert(msg.qualified_name(), Mark::Open);
    stack.push(Frame { ty: msg, next_field: 0 });

    loop {
        let step = {
            let Some(top) = stack.last_mut() else { break };
            let ty = top.ty;
            let mut step = Step::Finish(ty);
            while top.next_field < ty.fields.len() {
                let field = &ty.fields[top.next_field];
                top.next_field += 1;
                if !field.is_builtin {
                    step = Step::Descend(ty, field);
                    break;
                }
            }
            step
        };

        match step {
            Step::Finish(ty) => {
                marks.insert(ty.qualified_name(), Mark::Done);
                stack.pop();
            }
            Step::Descend(owner, field) => match marks.get(&field.base_type) {
                Some(Mark::Done) => {}
                Some(Mark::Open) => {
                    let mut path: Vec<String> =
                        stack.iter().map(|f| f.ty.qualified_name()).collect();
                    path.push(field.base_type.clone());
                    return Err(GenError::CyclicTypeDependency {
                        cycle: path.join(" -> "),
                    });
                }
                None => {
                    let dep = registry.get(&field.base_type).ok_or_else(|| {
                        GenError::UnresolvedCompositeType {
                            message: owner.qualified_name(),
                            field: field.name.clone(),
                            referenced: field.base_type.clone(),
                        }
                    })?;
                    marks.insert(field.base_type.clone(), Mark::Open);
                    order.push(dep);
                    stack.push(Frame { ty: dep, next_field: 0 });
                }
            },
        }
    }

    Ok(order)
}

/// Canonical text: the owning type's banner and body, then each dependency
/// behind a separator, newline-joined.
pub fn canonical_text(msg: &MessageType, deps: &[&MessageType]) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("MSG: {}", msg.qualified_name()));
    push_body(&mut lines, msg);
    for dep in deps {
        lines.push("=".repeat(80));
        lines.push(format!("MSG: {}", dep.qualified_name()));
        push_body(&mut lines, dep);
    }
    lines.join("\n")
}

fn push_body(lines: &mut Vec<String>, msg: &MessageType) {
    for c in &msg.constants {
        lines.push(format!("{} {}={}", c.declared_type, c.name, c.value));
    }
    for f in &msg.fields {
        lines.push(format!("{} {}", canonical_field_type(f), f.name));
    }
}

/// Canonical spelling of a field type: resolved `pkg/Name` for composites
/// so the fingerprint cannot depend on how a reference was written.
fn canonical_field_type(field: &Field) -> String {
    match (field.is_array, field.array_len) {
        (false, _) => field.base_type.clone(),
        (true, None) => format!("{}[]", field.base_type),
        (true, Some(n)) => format!("{}[{}]", field.base_type, n),
    }
}

/// Escape for a double-quoted Java string literal: backslashes first, then
/// quotes, then newlines.
pub fn escape_for_embedding(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn md5_hex(text: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
