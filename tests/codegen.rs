//! Code generation tests: emitted Java for every wire-layout class, the
//! unsigned widening policy, length arithmetic, determinism, and the
//! output writer.

use msgforge::{fixed_wire_size, generate, parse_message, GenError, GeneratedUnit, SchemaRegistry};

fn load(reg: &mut SchemaRegistry, src: &str, package: &str, name: &str) -> String {
    let msg = parse_message(src, package, name).expect("parse");
    let qualified = msg.qualified_name();
    reg.insert(msg).expect("insert");
    qualified
}

fn gen(reg: &SchemaRegistry, qualified: &str) -> GeneratedUnit {
    let msg = reg.get(qualified).expect("registered");
    generate(msg, reg).expect("generate")
}

/// Assert the needles occur in `hay` in the given order.
fn assert_ordered(hay: &str, needles: &[&str]) {
    let mut pos = 0;
    for needle in needles {
        match hay[pos..].find(needle) {
            Some(found) => pos += found + needle.len(),
            None => panic!("`{}` not found (in order) in:\n{}", needle, hay),
        }
    }
}

const POINT_MSG: &str = "\
float64 x
float64 y
float64 z
";

// ==================== Concrete scenario: geom/Point ====================

#[test]
fn point_emits_doubles_in_field_order() {
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, POINT_MSG, "geom", "Point");
    let unit = gen(&reg, &q);

    assert_ordered(
        &unit.source,
        &[
            "public void serialize(ByteBuffer bb) {",
            "bb.order(java.nio.ByteOrder.LITTLE_ENDIAN);",
            "bb.putDouble(x);",
            "bb.putDouble(y);",
            "bb.putDouble(z);",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "public void deserialize(ByteBuffer bb) {",
            "x = bb.getDouble();",
            "y = bb.getDouble();",
            "z = bb.getDouble();",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "public int serializationLength() {",
            "__l += 8; // x",
            "__l += 8; // y",
            "__l += 8; // z",
            "return __l;",
        ],
    );
    // 3 x 8-byte IEEE-754 doubles
    assert_eq!(fixed_wire_size(reg.get(&q).expect("msg"), &reg), Some(24));
}

#[test]
fn point_full_output() {
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, POINT_MSG, "geom", "Point");
    let unit = gen(&reg, &q);
    let id = msgforge::identity::compute(reg.get(&q).expect("msg"), &reg).expect("identity");

    let got = unit.source.replace(&id.fingerprint, "FINGERPRINT");
    let expected = r#"/* Auto-generated by msgforge for type geom/Point; do not edit. */

package org.msgforge.msgs.geom;

import java.nio.ByteBuffer;

public class Point extends org.msgforge.runtime.Message {

  public double x;
  public double y;
  public double z;

  public static java.lang.String __s_getDataType() { return "geom/Point"; }
  public static java.lang.String __s_getFingerprint() { return "FINGERPRINT"; }
  public static java.lang.String __s_getMessageDefinition() { return "MSG: geom/Point\nfloat64 x\nfloat64 y\nfloat64 z"; }

  public java.lang.String getDataType() { return __s_getDataType(); }
  public java.lang.String getFingerprint() { return __s_getFingerprint(); }
  public java.lang.String getMessageDefinition() { return __s_getMessageDefinition(); }

  public int serializationLength() {
    int __l = 0;
    __l += 8; // x
    __l += 8; // y
    __l += 8; // z
    return __l;
  }

  public void serialize(ByteBuffer bb) {
    bb.order(java.nio.ByteOrder.LITTLE_ENDIAN);
    bb.putDouble(x);
    bb.putDouble(y);
    bb.putDouble(z);
  }

  public void deserialize(ByteBuffer bb) {
    bb.order(java.nio.ByteOrder.LITTLE_ENDIAN);
    x = bb.getDouble();
    y = bb.getDouble();
    z = bb.getDouble();
  }
} // class Point
"#;
    assert_eq!(got, expected);
}

// ==================== Concrete scenario: string[] names ====================

#[test]
fn labels_variable_string_array() {
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, "string[] names\n", "demo", "Labels");
    let unit = gen(&reg, &q);

    // count prefix, then one length-prefixed string per element
    assert_ordered(
        &unit.source,
        &[
            "bb.putInt(names.size());",
            "for(java.lang.String val : names) {",
            "org.msgforge.runtime.Serialization.writeString(bb, val);",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "__l += 4;",
            "for(java.lang.String val : names) {",
            "__l += 4 + val.length();",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "int __names_len = bb.getInt();",
            "names = new java.util.ArrayList<java.lang.String>(__names_len);",
            "for(int __i = 0; __i < __names_len; __i++) {",
            "names.add(org.msgforge.runtime.Serialization.readString(bb));",
        ],
    );

    // ["a", "bb"] => count(4) + (4+1) + (4+2) = 15, the arithmetic the
    // emitted length code performs
    let values = ["a", "bb"];
    let total = 4 + values.iter().map(|s| 4 + s.len()).sum::<usize>();
    assert_eq!(total, 15);

    // no fixed size for a variable-length message
    assert_eq!(fixed_wire_size(reg.get(&q).expect("msg"), &reg), None);
}

// ==================== Concrete scenario: Polygon { Point[] pts } =========

#[test]
fn polygon_composite_array() {
    let mut reg = SchemaRegistry::new();
    load(&mut reg, POINT_MSG, "geom", "Point");
    let q = load(&mut reg, "Point[] pts\n", "geom", "Polygon");
    let unit = gen(&reg, &q);

    assert_ordered(
        &unit.source,
        &[
            "public java.util.ArrayList<org.msgforge.msgs.geom.Point> pts = new java.util.ArrayList<org.msgforge.msgs.geom.Point>();",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "bb.putInt(pts.size());",
            "for(org.msgforge.msgs.geom.Point val : pts) {",
            "val.serialize(bb);",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "__l += 4;",
            "for(org.msgforge.msgs.geom.Point val : pts) {",
            "__l += val.serializationLength();",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "int __pts_len = bb.getInt();",
            "pts = new java.util.ArrayList<org.msgforge.msgs.geom.Point>(__pts_len);",
            "for(int __i = 0; __i < __pts_len; __i++) {",
            "org.msgforge.msgs.geom.Point __tmp = new org.msgforge.msgs.geom.Point();",
            "__tmp.deserialize(bb);",
            "pts.add(__tmp);",
        ],
    );

    // two 24-byte points behind a 4-byte count
    assert_eq!(4 + 2 * 24, 52);
}

// ==================== Unsigned widening policy ====================

#[test]
fn unsigned_fields_widen_and_mask() {
    let src = "\
uint8 u8f
uint16 u16f
uint32 u32f
uint64 u64f
";
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, src, "demo", "Unsigned");
    let unit = gen(&reg, &q);

    // widened member slots
    assert_ordered(
        &unit.source,
        &[
            "public short u8f;",
            "public int u16f;",
            "public long u32f;",
            "public long u64f;",
        ],
    );
    // writes cast down to the wire width
    assert_ordered(
        &unit.source,
        &[
            "bb.put((byte)u8f);",
            "bb.putShort((short)u16f);",
            "bb.putInt((int)u32f);",
            "bb.putLong(u64f);",
        ],
    );
    // reads mask the raw bits back to the logical unsigned value; uint64
    // has no wider slot and keeps the raw signed bits (documented lossy)
    assert_ordered(
        &unit.source,
        &[
            "u8f = (short)(bb.get() & 0xff);",
            "u16f = bb.getShort() & 0xffff;",
            "u32f = bb.getInt() & 0xffffffffL;",
            "u64f = bb.getLong();",
        ],
    );
    // wire widths stay the declared ones, not the widened ones
    assert_ordered(
        &unit.source,
        &[
            "__l += 1; // u8f",
            "__l += 2; // u16f",
            "__l += 4; // u32f",
            "__l += 8; // u64f",
        ],
    );
}

#[test]
fn unsigned_masks_recover_boundary_values() {
    // Same integer arithmetic the emitted Java performs: the write casts
    // down to the wire width, the read widens and masks.
    for v in [0u8, 127, 128, 255] {
        let wire = v as i8; // (byte)x
        let read = (wire as i16) & 0xff; // bb.get() & 0xff
        assert_eq!(read as u8, v);
    }
    for v in [0u16, 32767, 32768, 65535] {
        let wire = v as i16; // (short)x
        let read = (wire as i32) & 0xffff; // bb.getShort() & 0xffff
        assert_eq!(read as u16, v);
    }
    for v in [0u32, 2147483647, 2147483648, 4294967295] {
        let wire = v as i32; // (int)x
        let read = (wire as i64) & 0xffffffff; // bb.getInt() & 0xffffffffL
        assert_eq!(read as u32, v);
    }
    // uint64 has no wider slot: sign-bit values come back negative
    assert_eq!(u64::MAX as i64, -1);
}

// ==================== Remaining layout classes ====================

#[test]
fn fixed_builtin_array() {
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, "uint8[4] data\n", "demo", "Blob");
    let unit = gen(&reg, &q);

    assert_ordered(&unit.source, &["public short[] data = new short[4];"]);
    // no count prefix; one literal for the whole array
    assert!(!unit.source.contains("bb.putInt(data.size())"));
    assert_ordered(&unit.source, &["__l += 4; // data"]);
    assert_ordered(
        &unit.source,
        &["for(short val : data) {", "bb.put((byte)val);"],
    );
    assert_ordered(
        &unit.source,
        &[
            "for(int __i = 0; __i < data.length; __i++) {",
            "data[__i] = (short)(bb.get() & 0xff);",
        ],
    );
    assert_eq!(fixed_wire_size(reg.get(&q).expect("msg"), &reg), Some(4));
}

#[test]
fn fixed_composite_array() {
    let mut reg = SchemaRegistry::new();
    load(&mut reg, POINT_MSG, "geom", "Point");
    let q = load(&mut reg, "Point[2] corners\n", "geom", "Box");
    let unit = gen(&reg, &q);

    assert_ordered(
        &unit.source,
        &["public org.msgforge.msgs.geom.Point[] corners = new org.msgforge.msgs.geom.Point[2];"],
    );
    assert!(!unit.source.contains("bb.putInt(corners.size())"));
    assert_ordered(
        &unit.source,
        &[
            "for(int __i = 0; __i < corners.length; __i++) {",
            "corners[__i] = new org.msgforge.msgs.geom.Point();",
            "corners[__i].deserialize(bb);",
        ],
    );
    assert_eq!(fixed_wire_size(reg.get(&q).expect("msg"), &reg), Some(48));
}

#[test]
fn fixed_string_array_lengths_per_element() {
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, "string[3] tags\n", "demo", "Tags");
    let unit = gen(&reg, &q);

    // fixed count: no prefix, but per-element length still varies
    assert!(!unit.source.contains("bb.putInt(tags.size())"));
    assert_ordered(
        &unit.source,
        &["for(java.lang.String val : tags) {", "__l += 4 + val.length();"],
    );
    assert_eq!(fixed_wire_size(reg.get(&q).expect("msg"), &reg), None);
}

#[test]
fn scalar_string_and_time() {
    let src = "\
string label
time stamp
duration ttl
";
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, src, "demo", "Meta");
    let unit = gen(&reg, &q);

    assert_ordered(
        &unit.source,
        &[
            "public java.lang.String label = \"\";",
            "public org.msgforge.runtime.Time stamp = new org.msgforge.runtime.Time();",
            "public org.msgforge.runtime.Duration ttl = new org.msgforge.runtime.Duration();",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "__l += 4 + label.length(); // label",
            "__l += 8; // stamp",
            "__l += 8; // ttl",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "org.msgforge.runtime.Serialization.writeString(bb, label);",
            "org.msgforge.runtime.Serialization.writeTime(bb, stamp);",
            "org.msgforge.runtime.Serialization.writeDuration(bb, ttl);",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "label = org.msgforge.runtime.Serialization.readString(bb);",
            "stamp = org.msgforge.runtime.Serialization.readTime(bb);",
            "ttl = org.msgforge.runtime.Serialization.readDuration(bb);",
        ],
    );
}

#[test]
fn nested_composite_scalar() {
    let mut reg = SchemaRegistry::new();
    load(&mut reg, POINT_MSG, "geom", "Point");
    let q = load(&mut reg, "Point position\nfloat32 heading\n", "geom", "Pose");
    let unit = gen(&reg, &q);

    assert_ordered(
        &unit.source,
        &[
            "public org.msgforge.msgs.geom.Point position = new org.msgforge.msgs.geom.Point();",
            "public float heading;",
        ],
    );
    assert_ordered(
        &unit.source,
        &[
            "__l += position.serializationLength();",
            "__l += 4; // heading",
        ],
    );
    assert_ordered(
        &unit.source,
        &["position.serialize(bb);", "bb.putFloat(heading);"],
    );
    assert_ordered(
        &unit.source,
        &["position.deserialize(bb);", "heading = bb.getFloat();"],
    );
}

#[test]
fn constants_emitted_with_java_literals() {
    let src = "\
int32 FOO=42
uint32 BIG=4000000000
float32 RATE=1.5
bool ENABLED=1
string GREETING=hello # world
int32 x
";
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, src, "demo", "Consts");
    let unit = gen(&reg, &q);

    assert_ordered(
        &unit.source,
        &[
            "public static final int FOO = 42;",
            "public static final long BIG = 4000000000L;",
            "public static final float RATE = 1.5f;",
            "public static final boolean ENABLED = true;",
            "public static final java.lang.String GREETING = \"hello # world\";",
            "public int x;",
        ],
    );
}

// ==================== Determinism and batch semantics ====================

#[test]
fn regeneration_is_identical() {
    let mut reg = SchemaRegistry::new();
    load(&mut reg, POINT_MSG, "geom", "Point");
    let q = load(&mut reg, "Point[] pts\n", "geom", "Polygon");
    let a = gen(&reg, &q);
    let b = gen(&reg, &q);
    assert_eq!(a.source, b.source);
}

#[test]
fn failing_type_does_not_block_others() {
    let mut reg = SchemaRegistry::new();
    let good = load(&mut reg, POINT_MSG, "geom", "Point");
    let bad = load(&mut reg, "geom/Missing m\n", "geom", "Broken");

    let err = generate(reg.get(&bad).expect("msg"), &reg).unwrap_err();
    assert!(matches!(err, GenError::UnresolvedCompositeType { .. }));
    assert!(err.to_string().contains("geom/Missing"));
    assert!(err.to_string().contains("`m`"));

    // the failure leaves the rest of the batch untouched
    let unit = gen(&reg, &good);
    assert!(unit.source.contains("public class Point"));
}

// ==================== Output writer ====================

#[test]
fn writer_places_units_in_package_tree() {
    let mut reg = SchemaRegistry::new();
    let q = load(&mut reg, POINT_MSG, "geom", "Point");
    let unit = gen(&reg, &q);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = msgforge::write_unit(dir.path(), &unit).expect("write");
    assert!(path.ends_with("org/msgforge/msgs/geom/Point.java"));
    let on_disk = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(on_disk, unit.source);

    // writing again over the existing tree is fine
    msgforge::write_unit(dir.path(), &unit).expect("rewrite");
}
