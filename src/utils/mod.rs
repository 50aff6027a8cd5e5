//! Utilities (filenames, artifact naming, run logs).

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::hash::Hash;
use std::io::Write;
use std::path::Path;

use chrono::Local;

/// Extract the serial number from a runner-generated filename.
///
/// Case files are named `<stem>--<serial>.<ext>`; the serial sits after the
/// last `--` and before the first `.` that follows it.
///
/// ```
/// assert_eq!(caserun::utils::serial_number("crash--17.c"), Some(17));
/// assert_eq!(caserun::utils::serial_number("README.md"), None);
/// ```
pub fn serial_number(filename: &str) -> Option<u64> {
    let tail = filename.rsplit("--").next()?;
    tail.split('.').next()?.parse().ok()
}

/// Sort filenames by their serial number.
///
/// Names without a parseable serial sort first, keeping their relative
/// order (the sort is stable).
pub fn sort_by_serial(filenames: &mut [String]) {
    filenames.sort_by_key(|name| serial_number(name).unwrap_or(0));
}

/// Build the artifact name for a compiled case:
/// `ELF-<COMPILER>-<case>-<opt><march>`.
pub fn elf_name(compiler: &str, case_file: &str, opt: &str, march: &str) -> String {
    format!("ELF-{}-{}-{}{}", compiler.to_uppercase(), case_file, opt, march)
}

/// Append `value` to the vector at `key`, creating the entry if needed.
pub fn push_value<K, V>(map: &mut HashMap<K, Vec<V>>, key: K, value: V)
where
    K: Eq + Hash,
{
    map.entry(key).or_default().push(value);
}

/// Local time formatted for run-log and report names: `YYYY-MM-DD-HH-MM`.
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d-%H-%M").to_string()
}

/// Append `text` to the file at `path`, creating it if absent.
pub fn append_file(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())
}

/// Delete every regular file in `dir` whose name contains `substring`.
///
/// Subdirectories are left alone. Returns the number of files removed.
pub fn delete_files_with_substring(dir: &Path, substring: &str) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.contains(substring) && entry.path().is_file() {
            fs::remove_file(entry.path())?;
            tracing::debug!(file = name, "removed");
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_number_parses_tail() {
        assert_eq!(serial_number("case--42.c"), Some(42));
        assert_eq!(serial_number("a--b--7.yaml"), Some(7));
        assert_eq!(serial_number("case--13.out.log"), Some(13));
    }

    #[test]
    fn serial_number_rejects_non_numeric() {
        assert_eq!(serial_number("case.c"), None);
        assert_eq!(serial_number("case--x.c"), None);
    }

    #[test]
    fn sort_orders_numerically_not_lexically() {
        let mut names = vec![
            "case--10.c".to_string(),
            "case--2.c".to_string(),
            "case--1.c".to_string(),
        ];
        sort_by_serial(&mut names);
        assert_eq!(names, vec!["case--1.c", "case--2.c", "case--10.c"]);
    }

    #[test]
    fn elf_name_uppercases_compiler() {
        assert_eq!(elf_name("gcc", "case--1.c", "O2", ""), "ELF-GCC-case--1.c-O2");
        assert_eq!(
            elf_name("clang", "t.c", "O0", "-rv64gc"),
            "ELF-CLANG-t.c-O0-rv64gc"
        );
    }

    #[test]
    fn push_value_creates_and_appends() {
        let mut map: HashMap<String, Vec<i32>> = HashMap::new();
        push_value(&mut map, "k".to_string(), 1);
        push_value(&mut map, "k".to_string(), 2);
        assert_eq!(map["k"], vec![1, 2]);
    }

    #[test]
    fn timestamp_shape() {
        let ts = timestamp();
        // YYYY-MM-DD-HH-MM
        assert_eq!(ts.len(), 16);
        assert_eq!(ts.matches('-').count(), 4);
    }

    #[test]
    fn append_file_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        append_file(&path, "first\n").unwrap();
        append_file(&path, "second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn delete_matches_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ELF-GCC-a"), b"x").unwrap();
        fs::write(dir.path().join("ELF-GCC-b"), b"x").unwrap();
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("ELF-GCC-dir")).unwrap();

        let removed = delete_files_with_substring(dir.path(), "ELF-GCC").unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("keep.txt").exists());
        assert!(dir.path().join("ELF-GCC-dir").exists());
    }
}
