use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use caserun::batch::{generate_function_batch, OUTPUT_YAML_NAME};
use serde_yaml::Value;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build a corpus archive holding `func_1.yaml` .. `func_<count>.yaml`.
fn write_corpus(path: &Path, count: usize) -> Result<()> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default();
    for id in 1..=count {
        writer.start_file(format!("func_{id}.yaml"), options)?;
        let record = format!(
            "name: func_{id}\nfunction: |\n  int f{id}(void) {{\n    return {id};\n  }}\n"
        );
        writer.write_all(record.as_bytes())?;
    }
    writer.finish()?;
    Ok(())
}

#[test]
fn samples_distinct_records_into_one_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let zip_path = dir.path().join("corpus.zip");
    write_corpus(&zip_path, 10)?;

    let out_dir = dir.path().join("out");
    let written = generate_function_batch(&zip_path, 4, 10, &out_dir)?;
    assert_eq!(written, out_dir.join(OUTPUT_YAML_NAME));

    let merged: Vec<Value> = serde_yaml::from_reader(File::open(&written)?)?;
    assert_eq!(merged.len(), 4);

    let mut names = BTreeSet::new();
    for record in &merged {
        let name = record["name"].as_str().expect("name field").to_string();
        assert!(name.starts_with("func_"));
        names.insert(name);

        let function = record["function"].as_str().expect("function field");
        assert!(function.contains("return"));
        // Trimmed for block-scalar output.
        assert!(!function.ends_with('\n'));
    }
    // Distinct ids, no repeats.
    assert_eq!(names.len(), 4);
    Ok(())
}

#[test]
fn function_field_is_written_as_block_scalar() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let zip_path = dir.path().join("corpus.zip");
    write_corpus(&zip_path, 3)?;

    let written = generate_function_batch(&zip_path, 3, 3, dir.path())?;
    let text = std::fs::read_to_string(written)?;
    assert!(text.contains("function: |-"), "got:\n{text}");
    // Key order preserved as read, names before bodies.
    assert!(text.find("name:").unwrap() < text.find("function:").unwrap());
    Ok(())
}

#[test]
fn batch_larger_than_total_takes_everything() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let zip_path = dir.path().join("corpus.zip");
    write_corpus(&zip_path, 3)?;

    let written = generate_function_batch(&zip_path, 50, 3, dir.path())?;
    let merged: Vec<Value> = serde_yaml::from_reader(File::open(written)?)?;
    assert_eq!(merged.len(), 3);
    Ok(())
}

#[test]
fn missing_entries_are_skipped_with_a_warning() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let zip_path = dir.path().join("corpus.zip");
    // Archive claims 5 records but only holds 3.
    write_corpus(&zip_path, 3)?;

    let written = generate_function_batch(&zip_path, 5, 5, dir.path())?;
    let merged: Vec<Value> = serde_yaml::from_reader(File::open(written)?)?;
    assert_eq!(merged.len(), 3);
    Ok(())
}

#[test]
fn missing_archive_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate_function_batch(&dir.path().join("nope.zip"), 1, 1, dir.path());
    assert!(err.is_err());
}
