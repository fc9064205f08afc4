//! Package-level conversion tests
//!
//! Builds small .oex fixtures on disk, runs the whole conversion and
//! inspects the resulting .nex archive.

use oex2nex::{convert_extension, ConversionOptions, ParseMode};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipArchive;

const CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<widget xmlns="http://www.w3.org/ns/widgets" version="0.9">
  <name>Fixture Extension</name>
  <description>Converts things</description>
  <author href="https://example.org">Fixture Author</author>
  <preference name="interval" value="30"/>
</widget>"#;

const INDEX: &str = r#"<html><head><title>bg</title>
<script src="background.js"></script>
</head><body></body></html>"#;

const BACKGROUND: &str = r#"var counter = 0;
var p = widget.preferences;
p.saved = 1;
var tb = opera.contexts.toolbar;
tb.addItem(properties);
opera.extension.tabs.getAll();
"#;

fn write_oex(path: &Path, members: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in members {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn read_member(archive_path: &Path, name: &str) -> String {
    let file = File::open(archive_path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    let mut member = archive.by_name(name).unwrap();
    let mut content = String::new();
    member.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn test_full_conversion_produces_nex() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("fixture.oex");
    let output = dir.path().join("fixture.nex");
    write_oex(
        &input,
        &[
            ("config.xml", CONFIG),
            ("index.html", INDEX),
            ("background.js", BACKGROUND),
        ],
    );

    let result = convert_extension(&input, &output, ConversionOptions::default()).unwrap();

    // manifest content
    let manifest_json = read_member(&output, "manifest.json");
    let manifest: serde_json::Value = serde_json::from_str(&manifest_json).unwrap();
    assert_eq!(manifest["name"], "Fixture Extension");
    assert_eq!(manifest["manifest_version"], 2);
    assert_eq!(manifest["version"], "0.9");
    assert_eq!(manifest["background"]["page"], "index.html");
    // toolbar addItem produced a browser action
    assert!(manifest["browser_action"].is_object());
    // default permissions plus the discovered tabs hint
    let permissions: Vec<String> = manifest["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap().to_string())
        .collect();
    assert!(permissions.contains(&"storage".to_string()));
    assert!(permissions.contains(&"tabs".to_string()));

    // the background script was rewritten and wrapped
    let script = read_member(&output, "background.js");
    assert!(script.starts_with("opera.isReady(function(){"));
    assert!(script.contains("var counter = window[\"counter\"] = 0"));
    assert!(script.contains("p.setItem('saved', 1)"));

    // config.xml is gone, shim and page survive
    assert!(read_member(&output, "index.html").contains("oex_shim/operaextensions_background"));
    let file = File::open(&output).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    assert!(archive.by_name("config.xml").is_err());

    // default preference values exported into the background page
    assert!(result
        .new_files
        .iter()
        .any(|f| f.path.to_string_lossy() == "exported_prefs.js"));
    assert!(read_member(&output, "exported_prefs.js").contains("\"interval\""));
}

#[test]
fn test_directory_input_and_unpacked_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("unpacked-src");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("config.xml"), CONFIG).unwrap();
    fs::write(input.join("index.html"), INDEX).unwrap();
    fs::write(input.join("background.js"), "var x = 1;").unwrap();

    let output = dir.path().join("out-dir");
    let options = ConversionOptions {
        unpacked_output: true,
        ..ConversionOptions::default()
    };
    convert_extension(&input, &output, options).unwrap();

    assert!(output.join("manifest.json").exists());
    let script = fs::read_to_string(output.join("background.js")).unwrap();
    assert!(script.contains("var x = window[\"x\"] = 1"));
}

#[test]
fn test_missing_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.oex");
    write_oex(&input, &[("index.html", INDEX)]);

    let output = dir.path().join("bad.nex");
    let result = convert_extension(&input, &output, ConversionOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_broken_script_lenient_warns_but_converts() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("warned.oex");
    write_oex(
        &input,
        &[
            ("config.xml", CONFIG),
            ("index.html", INDEX),
            ("background.js", "var x = 1;"),
            ("broken.js", "var = ;;;("),
        ],
    );

    let output = dir.path().join("warned.nex");
    let result = convert_extension(&input, &output, ConversionOptions::default()).unwrap();
    assert!(result
        .report
        .warnings
        .iter()
        .any(|w| w.contains("broken.js")));
    // the broken file rides along unmodified
    assert_eq!(read_member(&output, "broken.js"), "var = ;;;(");
}

#[test]
fn test_broken_script_strict_aborts() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("strict.oex");
    write_oex(
        &input,
        &[
            ("config.xml", CONFIG),
            ("index.html", INDEX),
            ("broken.js", "var = ;;;("),
        ],
    );

    let output = dir.path().join("strict.nex");
    let options = ConversionOptions {
        parse_mode: ParseMode::Strict,
        ..ConversionOptions::default()
    };
    assert!(convert_extension(&input, &output, options).is_err());
}

#[test]
fn test_includes_become_content_scripts() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("inject.oex");
    write_oex(
        &input,
        &[
            ("config.xml", CONFIG),
            ("index.html", INDEX),
            (
                "includes/inject.js",
                "// ==UserScript==\n// @include http://example.com/*\n// ==/UserScript==\nvar q = 1;",
            ),
        ],
    );

    let output = dir.path().join("inject.nex");
    convert_extension(&input, &output, ConversionOptions::default()).unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&read_member(&output, "manifest.json")).unwrap();
    let content_scripts = manifest["content_scripts"].as_array().unwrap();
    assert_eq!(content_scripts.len(), 1);
    assert_eq!(
        content_scripts[0]["js"][0],
        "includes/000.operaextensions_injectedscript.min.js"
    );
    assert_eq!(content_scripts[0]["js"][1], "includes/inject.js");
    assert_eq!(content_scripts[0]["include_globs"][0], "http://example.com/*");

    // the injected-script shim landed in the package
    read_member(&output, "includes/000.operaextensions_injectedscript.min.js");
}
