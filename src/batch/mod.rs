//! Random function-batch extraction from a case archive.
//!
//! The generator's corpus is a zip archive of uniformly named records
//! (`func_1.yaml` .. `func_<total>.yaml`), each a mapping with at least a
//! `function` field holding source text. [`generate_function_batch`] samples
//! a batch of distinct records and merges them into one `functions.yaml`
//! for the next pipeline stage.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::Value;
use zip::result::ZipError;
use zip::ZipArchive;

/// Name of the merged output file.
pub const OUTPUT_YAML_NAME: &str = "functions.yaml";

/// Sample `batch_size` distinct records out of `total_files` from the
/// archive at `zip_path` and write the merged list to
/// `<output_dir>/functions.yaml`.
///
/// Ids are drawn uniformly from `1..=total_files` without replacement; a
/// batch size larger than the total takes everything. Entries missing from
/// the archive are logged and skipped. The `function` field of each record
/// is trimmed so multi-line source text serializes as a literal block
/// scalar; no process-global serializer state is touched.
///
/// Returns the path of the written file.
pub fn generate_function_batch(
    zip_path: &Path,
    batch_size: usize,
    total_files: usize,
    output_dir: &Path,
) -> Result<PathBuf> {
    let ids = sample_ids(batch_size, total_files);

    let file = File::open(zip_path)
        .with_context(|| format!("opening archive {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("reading archive {}", zip_path.display()))?;

    let mut merged: Vec<Value> = Vec::with_capacity(ids.len());
    for id in ids {
        let entry_name = format!("func_{id}.yaml");
        let entry = match archive.by_name(&entry_name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                tracing::warn!(entry = %entry_name, "not found in archive, skipping");
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading entry {entry_name}"));
            }
        };
        let mut record: Value =
            serde_yaml::from_reader(entry).with_context(|| format!("parsing {entry_name}"))?;
        block_scalar_function(&mut record);
        merged.push(record);
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let output_path = output_dir.join(OUTPUT_YAML_NAME);
    let output = File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    // Mapping order is preserved as read; no key sorting.
    serde_yaml::to_writer(output, &merged)
        .with_context(|| format!("writing {}", output_path.display()))?;

    Ok(output_path)
}

/// Draw distinct record ids from `1..=total`, at most `total` of them.
fn sample_ids(batch_size: usize, total: usize) -> Vec<usize> {
    let amount = batch_size.min(total);
    let mut rng = rand::rng();
    rand::seq::index::sample(&mut rng, total, amount)
        .iter()
        .map(|i| i + 1)
        .collect()
}

/// Trim the `function` field in place so the emitter renders it as a
/// literal block scalar (`|-`) instead of a quoted string.
fn block_scalar_function(record: &mut Value) {
    if let Value::Mapping(mapping) = record {
        if let Some(Value::String(function)) = mapping.get_mut("function") {
            *function = function.trim().to_string();
        }
    }
}
