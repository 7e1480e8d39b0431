//! Parse `.msg` schema source into the schema model using PEST.

use pest::Parser;
use pest_derive::Parser as PestParser;

use crate::mapping;
use crate::schema::{Constant, Field, MessageType};

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct MsgParser;

/// Parse one `.msg` source into a `MessageType` owned by `package`.
pub fn parse_message(source: &str, package: &str, short_name: &str) -> Result<MessageType, String> {
    let pairs = MsgParser::parse(Rule::schema, source)
        .map_err(|e| format!("parse error in {}/{}: {}", package, short_name, e))?;
    let schema = pairs.into_iter().next().ok_or("empty parse")?;

    let mut msg = MessageType::new(package, short_name);
    for item in schema.into_inner() {
        match item.as_rule() {
            Rule::field_def => {
                let (declared, name) = split_decl(item)?;
                if msg.fields.iter().any(|f| f.name == name) {
                    return Err(format!(
                        "{}/{}: duplicate field name `{}`",
                        package, short_name, name
                    ));
                }
                let field = Field::new(&name, &declared, package)
                    .map_err(|e| format!("{}/{}: {}", package, short_name, e))?;
                msg.fields.push(field);
            }
            Rule::constant_def => {
                let constant = build_constant(item)
                    .map_err(|e| format!("{}/{}: {}", package, short_name, e))?;
                if msg.constants.iter().any(|c| c.name == constant.name) {
                    return Err(format!(
                        "{}/{}: duplicate constant name `{}`",
                        package, short_name, constant.name
                    ));
                }
                msg.constants.push(constant);
            }
            _ => {}
        }
    }
    Ok(msg)
}

fn split_decl(pair: pest::iterators::Pair<Rule>) -> Result<(String, String), String> {
    let mut it = pair.into_inner();
    let declared = it.next().ok_or("field: missing type")?.as_str().to_string();
    let name = it.next().ok_or("field: missing name")?.as_str().to_string();
    Ok((declared, name))
}

fn build_constant(pair: pest::iterators::Pair<Rule>) -> Result<Constant, String> {
    let mut it = pair.into_inner();
    let declared = it.next().ok_or("constant: missing type")?.as_str().to_string();
    let name = it.next().ok_or("constant: missing name")?.as_str().to_string();
    let raw = it.next().map(|p| p.as_str()).unwrap_or("");
    let value =
        constant_value(&declared, raw).map_err(|e| format!("constant `{}`: {}", name, e))?;
    Ok(Constant {
        name,
        declared_type: declared,
        value,
    })
}

/// Validate a constant's literal against its declared type and render it as
/// source-safe text. For non-string constants a trailing `#` comment is
/// stripped; a string constant owns the rest of the line verbatim.
fn constant_value(declared: &str, raw: &str) -> Result<String, String> {
    if declared.contains('[') {
        return Err("array types cannot declare constants".to_string());
    }
    if mapping::lookup(declared).is_none() {
        return Err(format!("constants must use builtin types, got `{}`", declared));
    }
    match declared {
        "string" => return Ok(raw.trim().to_string()),
        "time" | "duration" => {
            return Err(format!("`{}` cannot declare constants", declared));
        }
        _ => {}
    }
    let text = raw.split('#').next().unwrap_or("").trim();
    if text.is_empty() {
        return Err("missing value".to_string());
    }
    match declared {
        "bool" => match text {
            "true" | "1" => Ok("true".to_string()),
            "false" | "0" => Ok("false".to_string()),
            other => Err(format!("bad bool literal `{}`", other)),
        },
        "float32" | "float64" => {
            text.parse::<f64>()
                .map_err(|_| format!("bad float literal `{}`", text))?;
            Ok(text.to_string())
        }
        _ => {
            let v: i128 = text
                .parse()
                .map_err(|_| format!("bad integer literal `{}`", text))?;
            let (lo, hi) = integer_range(declared);
            if v < lo || v > hi {
                return Err(format!("{} out of range for {}", v, declared));
            }
            Ok(text.to_string())
        }
    }
}

/// Representable range of an integer constant: the logical schema range,
/// clamped for `uint64` to what a Java `long` literal can carry (the lossy
/// same-width mapping has no room for the upper half).
fn integer_range(declared: &str) -> (i128, i128) {
    match declared {
        "char" | "int8" => (i8::MIN as i128, i8::MAX as i128),
        "uint8" => (0, u8::MAX as i128),
        "int16" => (i16::MIN as i128, i16::MAX as i128),
        "uint16" => (0, u16::MAX as i128),
        "int32" => (i32::MIN as i128, i32::MAX as i128),
        "uint32" => (0, u32::MAX as i128),
        _ => (i64::MIN as i128, i64::MAX as i128),
    }
}
