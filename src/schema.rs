//! Schema model for message types: fields, constants, and the registry.
//!
//! Field order is the single source of truth for wire order; every generator
//! pass consumes the same `MessageType` read-only and in declaration order.

use std::collections::HashMap;

use crate::mapping;

/// Package the reserved `Header` composite name resolves to.
pub const HEADER_PACKAGE: &str = "std";

/// A message type: ordered fields (insertion order = wire order) plus
/// named constants, owned by a package.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageType {
    pub package: String,
    pub short_name: String,
    pub fields: Vec<Field>,
    pub constants: Vec<Constant>,
}

impl MessageType {
    pub fn new(package: impl Into<String>, short_name: impl Into<String>) -> Self {
        MessageType {
            package: package.into(),
            short_name: short_name.into(),
            fields: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Package-qualified name, e.g. `geom/Point`.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.package, self.short_name)
    }
}

/// A single field, with the array suffix and builtin/composite resolution
/// already normalized for the generator passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Declared type text as written, e.g. `uint8[4]` or `Point[]`.
    pub declared_type: String,
    /// Element type with any array suffix stripped. Package-qualified for
    /// composites (`geom/Point`), bare builtin name otherwise.
    pub base_type: String,
    pub is_builtin: bool,
    pub is_array: bool,
    /// Fixed element count; `None` for variable-length arrays.
    pub array_len: Option<usize>,
}

impl Field {
    /// Normalize a declared field type into the shape the generators consume.
    ///
    /// Composite references resolve against `package`: `pkg/Name` is kept,
    /// a bare `Name` joins the owning package, and the reserved name
    /// `Header` resolves to `std/Header`.
    pub fn new(name: &str, declared_type: &str, package: &str) -> Result<Field, String> {
        let (base, is_array, array_len) = split_array_suffix(declared_type)
            .map_err(|e| format!("field `{}`: {}", name, e))?;
        let is_builtin = mapping::is_builtin(base);
        let base_type = if is_builtin {
            base.to_string()
        } else {
            resolve_composite(base, package)?
        };
        Ok(Field {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            base_type,
            is_builtin,
            is_array,
            array_len,
        })
    }
}

/// A named constant with its literal value rendered as source-safe text.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub declared_type: String,
    pub value: String,
}

/// Split an optional `[..]` suffix off a declared type.
fn split_array_suffix(declared: &str) -> Result<(&str, bool, Option<usize>), String> {
    let Some(open) = declared.find('[') else {
        return Ok((declared, false, None));
    };
    let base = &declared[..open];
    let suffix = &declared[open..];
    let inner = suffix
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| format!("malformed array suffix in `{}`", declared))?;
    if base.is_empty() {
        return Err(format!("missing element type in `{}`", declared));
    }
    if inner.is_empty() {
        return Ok((base, true, None));
    }
    let len: usize = inner
        .parse()
        .map_err(|_| format!("bad array length `{}` in `{}`", inner, declared))?;
    if len == 0 {
        return Err(format!("zero-length array in `{}`", declared));
    }
    Ok((base, true, Some(len)))
}

fn resolve_composite(base: &str, package: &str) -> Result<String, String> {
    if let Some((pkg, name)) = base.split_once('/') {
        if pkg.is_empty() || name.is_empty() || name.contains('/') {
            return Err(format!("malformed type reference `{}`", base));
        }
        return Ok(base.to_string());
    }
    if base == "Header" {
        return Ok(format!("{}/Header", HEADER_PACKAGE));
    }
    if package.is_empty() {
        return Err(format!(
            "bare type reference `{}` needs an owning package",
            base
        ));
    }
    Ok(format!("{}/{}", package, base))
}

/// All loaded message types indexed by qualified name. This is the arena
/// the dependency-closure walk runs over; it is read-only during generation.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: Vec<MessageType>,
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    pub fn insert(&mut self, msg: MessageType) -> Result<(), String> {
        let qualified = msg.qualified_name();
        if self.by_name.contains_key(&qualified) {
            return Err(format!("duplicate message type: {}", qualified));
        }
        self.by_name.insert(qualified, self.types.len());
        self.types.push(msg);
        Ok(())
    }

    pub fn get(&self, qualified_name: &str) -> Option<&MessageType> {
        self.by_name.get(qualified_name).map(|&i| &self.types[i])
    }

    /// All registered types in insertion order.
    pub fn types(&self) -> &[MessageType] {
        &self.types
    }
}
