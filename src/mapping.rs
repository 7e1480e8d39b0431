//! Builtin type mapping: abstract scalar types to Java scalars, write/read
//! call templates, and fixed wire widths.
//!
//! Java has no unsigned primitives, so unsigned integers widen to the next
//! larger signed type (`uint8` → `short`, `uint16` → `int`, `uint32` →
//! `long`) and deserialization masks the raw bits back to the logical
//! unsigned value. `uint64` has nowhere to widen to and maps to `long`
//! unchanged: values with the sign bit set read back negative. That lossy
//! mapping is part of the numeric contract consumers already depend on;
//! do not "fix" it here without coordinating a wire-compatibility break.
//!
//! Templates use `{bb}` for the buffer and `{x}` for the field accessor.

/// One row of the mapping table.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    /// Java type of a scalar field of this builtin.
    pub java_type: &'static str,
    /// Element type inside `java.util.ArrayList<...>`.
    pub boxed_type: &'static str,
    pub write_template: &'static str,
    pub read_template: &'static str,
    /// Fixed wire width in bytes; `None` for length-prefixed strings.
    pub width: Option<u32>,
}

/// Runtime package the generated code links against.
pub const RUNTIME_PACKAGE: &str = "org.msgforge.runtime";

/// Package prefix generated message classes live under.
pub const MESSAGE_PACKAGE_PREFIX: &str = "org.msgforge.msgs";

/// The exhaustive builtin table. Referencing any type name not listed here
/// is a schema defect, surfaced as `UnknownBuiltinType`; adding a builtin
/// to the schema language starts with adding its row.
pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "bool",
        java_type: "boolean",
        boxed_type: "Boolean",
        write_template: "{bb}.put((byte)({x} ? 1 : 0))",
        read_template: "{bb}.get() != 0",
        width: Some(1),
    },
    Builtin {
        name: "char",
        java_type: "byte",
        boxed_type: "Byte",
        write_template: "{bb}.put({x})",
        read_template: "{bb}.get()",
        width: Some(1),
    },
    Builtin {
        name: "int8",
        java_type: "byte",
        boxed_type: "Byte",
        write_template: "{bb}.put({x})",
        read_template: "{bb}.get()",
        width: Some(1),
    },
    Builtin {
        name: "uint8",
        java_type: "short",
        boxed_type: "Short",
        write_template: "{bb}.put((byte){x})",
        read_template: "(short)({bb}.get() & 0xff)",
        width: Some(1),
    },
    Builtin {
        name: "int16",
        java_type: "short",
        boxed_type: "Short",
        write_template: "{bb}.putShort({x})",
        read_template: "{bb}.getShort()",
        width: Some(2),
    },
    Builtin {
        name: "uint16",
        java_type: "int",
        boxed_type: "Integer",
        write_template: "{bb}.putShort((short){x})",
        read_template: "{bb}.getShort() & 0xffff",
        width: Some(2),
    },
    Builtin {
        name: "int32",
        java_type: "int",
        boxed_type: "Integer",
        write_template: "{bb}.putInt({x})",
        read_template: "{bb}.getInt()",
        width: Some(4),
    },
    Builtin {
        name: "uint32",
        java_type: "long",
        boxed_type: "Long",
        write_template: "{bb}.putInt((int){x})",
        read_template: "{bb}.getInt() & 0xffffffffL",
        width: Some(4),
    },
    Builtin {
        name: "int64",
        java_type: "long",
        boxed_type: "Long",
        write_template: "{bb}.putLong({x})",
        read_template: "{bb}.getLong()",
        width: Some(8),
    },
    Builtin {
        // Same-width signed mapping; lossy for values with the sign bit set.
        name: "uint64",
        java_type: "long",
        boxed_type: "Long",
        write_template: "{bb}.putLong({x})",
        read_template: "{bb}.getLong()",
        width: Some(8),
    },
    Builtin {
        name: "float32",
        java_type: "float",
        boxed_type: "Float",
        write_template: "{bb}.putFloat({x})",
        read_template: "{bb}.getFloat()",
        width: Some(4),
    },
    Builtin {
        name: "float64",
        java_type: "double",
        boxed_type: "Double",
        write_template: "{bb}.putDouble({x})",
        read_template: "{bb}.getDouble()",
        width: Some(8),
    },
    Builtin {
        name: "string",
        java_type: "java.lang.String",
        boxed_type: "java.lang.String",
        write_template: "org.msgforge.runtime.Serialization.writeString({bb}, {x})",
        read_template: "org.msgforge.runtime.Serialization.readString({bb})",
        width: None,
    },
    Builtin {
        // Two 4-byte parts on the wire (secs, nsecs).
        name: "time",
        java_type: "org.msgforge.runtime.Time",
        boxed_type: "org.msgforge.runtime.Time",
        write_template: "org.msgforge.runtime.Serialization.writeTime({bb}, {x})",
        read_template: "org.msgforge.runtime.Serialization.readTime({bb})",
        width: Some(8),
    },
    Builtin {
        name: "duration",
        java_type: "org.msgforge.runtime.Duration",
        boxed_type: "org.msgforge.runtime.Duration",
        write_template: "org.msgforge.runtime.Serialization.writeDuration({bb}, {x})",
        read_template: "org.msgforge.runtime.Serialization.readDuration({bb})",
        width: Some(8),
    },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

pub fn is_builtin(name: &str) -> bool {
    lookup(name).is_some()
}

/// Java package for a schema package, e.g. `geom` → `org.msgforge.msgs.geom`.
pub fn java_package(package: &str) -> String {
    format!("{}.{}", MESSAGE_PACKAGE_PREFIX, package)
}

/// Fully qualified Java class for a `pkg/Name` composite reference.
pub fn java_class(qualified_name: &str) -> String {
    match qualified_name.split_once('/') {
        Some((pkg, name)) => format!("{}.{}", java_package(pkg), name),
        None => format!("{}.{}", MESSAGE_PACKAGE_PREFIX, qualified_name),
    }
}

/// Expand a write template with the buffer and accessor expressions.
pub fn write_call(builtin: &Builtin, bb: &str, accessor: &str) -> String {
    builtin
        .write_template
        .replace("{bb}", bb)
        .replace("{x}", accessor)
}

/// Expand a read template with the buffer expression.
pub fn read_call(builtin: &Builtin, bb: &str) -> String {
    builtin.read_template.replace("{bb}", bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_targets() {
        assert_eq!(lookup("uint8").unwrap().java_type, "short");
        assert_eq!(lookup("uint16").unwrap().java_type, "int");
        assert_eq!(lookup("uint32").unwrap().java_type, "long");
        // uint64 stays same-width: the documented lossy mapping.
        assert_eq!(lookup("uint64").unwrap().java_type, "long");
        assert_eq!(lookup("char").unwrap().java_type, "byte");
    }

    #[test]
    fn widths() {
        for (name, width) in [
            ("bool", Some(1)),
            ("char", Some(1)),
            ("int8", Some(1)),
            ("uint8", Some(1)),
            ("int16", Some(2)),
            ("uint16", Some(2)),
            ("int32", Some(4)),
            ("uint32", Some(4)),
            ("int64", Some(8)),
            ("uint64", Some(8)),
            ("float32", Some(4)),
            ("float64", Some(8)),
            ("string", None),
            ("time", Some(8)),
            ("duration", Some(8)),
        ] {
            assert_eq!(lookup(name).unwrap().width, width, "width of {}", name);
        }
    }

    #[test]
    fn unknown_type_misses() {
        assert!(lookup("uint128").is_none());
        assert!(!is_builtin("Point"));
    }

    #[test]
    fn unsigned_reads_mask_back() {
        assert_eq!(
            read_call(lookup("uint8").unwrap(), "bb"),
            "(short)(bb.get() & 0xff)"
        );
        assert_eq!(
            read_call(lookup("uint16").unwrap(), "bb"),
            "bb.getShort() & 0xffff"
        );
        assert_eq!(
            read_call(lookup("uint32").unwrap(), "bb"),
            "bb.getInt() & 0xffffffffL"
        );
        // No mask for uint64: raw signed bits come back as-is.
        assert_eq!(read_call(lookup("uint64").unwrap(), "bb"), "bb.getLong()");
    }

    #[test]
    fn template_expansion() {
        let call = write_call(lookup("float64").unwrap(), "bb", "this.x");
        assert_eq!(call, "bb.putDouble(this.x)");
    }

    #[test]
    fn java_naming() {
        assert_eq!(java_package("geom"), "org.msgforge.msgs.geom");
        assert_eq!(java_class("geom/Point"), "org.msgforge.msgs.geom.Point");
    }
}
