use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;
use std::{env, fs};

const DOM_CASES_PATH: &str = "tests/dom_cases/";
const CASES_WRITE: &str = "tests/integ_test_cases.rs";

/// One `tests/dom_cases/*.toml` file: a markup document (plus optional named files) and the CLI runs against it.
#[derive(Deserialize)]
struct CaseFile {
    given: Given,
    expect: BTreeMap<String, Expect>,
}

#[derive(Deserialize)]
struct Given {
    html: String,
    #[serde(default)]
    files: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct Expect {
    cli_args: Vec<String>,
    output: String,
    #[serde(default)]
    output_err: String,
    #[serde(default)]
    output_json: bool,
    #[serde(default = "succeeds")]
    expect_success: bool,
}

fn succeeds() -> bool {
    true
}

fn main() -> Result<(), String> {
    println!("cargo::rerun-if-changed={DOM_CASES_PATH}");
    let out_dir = env::var("OUT_DIR").map_err(|e| format!("OUT_DIR: {e}"))?;

    let mut paths = Vec::new();
    for entry in fs::read_dir(DOM_CASES_PATH).map_err(|e| format!("{DOM_CASES_PATH}: {e}"))? {
        let path = entry.map_err(|e| e.to_string())?.path();
        if !path.is_file() {
            return Err(format!("{}: not a regular file", path.display()));
        }
        paths.push(path);
    }
    paths.sort();

    let mut out = String::new();
    for path in &paths {
        write_case_module(&mut out, path).map_err(|e| format!("{}: {e}", path.display()))?;
    }

    let out_path = Path::new(&out_dir).join(CASES_WRITE);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("mkdirs on {}: {e}", parent.display()))?;
    }
    fs::write(&out_path, out).map_err(|e| format!("writing to {}: {e}", out_path.display()))
}

fn write_case_module(out: &mut String, path: &Path) -> Result<(), String> {
    let mod_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .ok_or("no file stem")?;
    let contents = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let case_file: CaseFile = toml::from_str(&contents).map_err(|e| e.to_string())?;

    // Writing to a String can't fail.
    let _ = writeln!(out, "mod {mod_name} {{\n    use super::*;\n");
    let _ = writeln!(out, "    const HTML: &str = {:?};", case_file.given.html.trim());
    let _ = write!(out, "    const FILES: [(&str, &str); {}] = [", case_file.given.files.len());
    for (name, content) in &case_file.given.files {
        let _ = write!(out, "({name:?}, {content:?}), ");
    }
    let _ = writeln!(out, "];\n");

    for (case_name, expect) in &case_file.expect {
        let fn_name: String = case_name
            .chars()
            .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
            .map(|ch| if ch.is_whitespace() { '_' } else { ch })
            .collect();
        let _ = writeln!(
            out,
            "    #[test]
    fn {fn_name}() {{
        Case {{
            cli_args: {cli_args:?},
            expect_output: {output:?},
            expect_error: {output_err:?},
            expect_output_json: {output_json},
            expect_success: {expect_success},
            html: HTML,
            files: &FILES,
        }}
        .check();
    }}
",
            cli_args = expect.cli_args,
            output = expect.output,
            output_err = expect.output_err,
            output_json = expect.output_json,
            expect_success = expect.expect_success,
        );
    }
    let _ = writeln!(out, "}}");
    Ok(())
}
