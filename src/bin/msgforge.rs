//! Compile `.msg` schema files into Java message classes.
//!
//! Usage:
//!   msgforge [OPTIONS] <FILE.msg ...>
//!
//! Options:
//!   --out DIR, -o DIR       Output root for generated sources (default: gen)
//!   --include DIR, -I DIR   Package directory of dependency schemas
//!                           (repeatable; every .msg inside is loaded)
//!
//! A schema's package is the name of the directory containing it, so
//! `msgs/geom/Point.msg` defines `geom/Point`. Generation failures are
//! reported per type and do not stop the batch; the exit code is 1 if any
//! type failed, and no file is written for a failed type.

use std::path::{Path, PathBuf};
use std::process;

use msgforge::{codegen, output, parser, SchemaRegistry};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") || args.is_empty() {
        print_help();
        return Ok(());
    }

    let out_root = PathBuf::from(take_option(&mut args, "--out", "-o").unwrap_or_else(|| "gen".to_string()));
    let mut include_dirs = Vec::new();
    while let Some(dir) = take_option(&mut args, "--include", "-I") {
        include_dirs.push(PathBuf::from(dir));
    }
    if let Some(unknown) = args.iter().find(|a| a.starts_with('-')) {
        eprintln!("unknown option: {}", unknown);
        print_help();
        process::exit(1);
    }

    let mut registry = SchemaRegistry::new();
    let mut has_error = false;

    for dir in &include_dirs {
        if let Err(e) = load_package_dir(dir, &mut registry) {
            tracing::error!("{}", e);
            has_error = true;
        }
    }

    // Load every input before generating so inputs can reference each other.
    let mut targets: Vec<String> = Vec::new();
    for arg in &args {
        match load_schema_file(Path::new(arg), &mut registry) {
            Ok(qualified) => targets.push(qualified),
            Err(e) => {
                tracing::error!("{}: {}", arg, e);
                has_error = true;
            }
        }
    }

    for qualified in &targets {
        let Some(msg) = registry.get(qualified) else {
            continue;
        };
        match codegen::generate(msg, &registry) {
            Ok(unit) => match output::write_unit(&out_root, &unit) {
                Ok(path) => tracing::info!("generated {} -> {}", qualified, path.display()),
                Err(e) => {
                    tracing::error!("{}: {}", qualified, e);
                    has_error = true;
                }
            },
            Err(e) => {
                tracing::error!("{}: {}", qualified, e);
                has_error = true;
            }
        }
    }

    if has_error {
        process::exit(1);
    }
    Ok(())
}

/// Remove `--name value` (or `-short value`) from the argument vector.
fn take_option(args: &mut Vec<String>, long: &str, short: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == long || a == short)?;
    if pos + 1 >= args.len() {
        eprintln!("{} needs a value", long);
        process::exit(1);
    }
    args.remove(pos);
    Some(args.remove(pos))
}

/// Load one `.msg` file; its package is the parent directory's name.
fn load_schema_file(path: &Path, registry: &mut SchemaRegistry) -> Result<String, String> {
    let short_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| format!("cannot derive a type name from {}", path.display()))?;
    let package = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| format!("cannot derive a package from {}", path.display()))?;
    let source =
        std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let msg = parser::parse_message(&source, &package, &short_name)?;
    let qualified = msg.qualified_name();
    registry.insert(msg)?;
    Ok(qualified)
}

/// Load every `.msg` in a package directory into the registry.
fn load_package_dir(dir: &Path, registry: &mut SchemaRegistry) -> Result<(), String> {
    let entries = std::fs::read_dir(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| format!("{}: {}", dir.display(), e))?;
        let path = entry.path();
        if path.extension().map(|e| e == "msg").unwrap_or(false) {
            load_schema_file(&path, registry)?;
        }
    }
    Ok(())
}

fn print_help() {
    println!("msgforge: compile .msg schemas into Java message classes");
    println!();
    println!("USAGE:");
    println!("    msgforge [OPTIONS] <FILE.msg ...>");
    println!();
    println!("OPTIONS:");
    println!("    --out DIR, -o DIR       output root for generated sources (default: gen)");
    println!("    --include DIR, -I DIR   package directory of dependency schemas (repeatable)");
    println!("    --help, -h              print this help message");
    println!();
    println!("EXAMPLES:");
    println!("    msgforge --out gen --include msgs/std msgs/geom/Point.msg");
    println!();
}
