//! Bronze merge against a temp directory tree.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use silver_ingest::{BronzeOptions, merge_exports};
use silver_model::{Category, Layout};

const RINSE_HEADER: &str = "machine_id;timestamp;rinse_type";

fn options(root: &Path) -> BronzeOptions {
    BronzeOptions {
        export_dir: root.join("EversysDatFiles"),
        temp_dir: root.join("TempDatFiles"),
        tracker: root.join("processed_files.txt"),
        run_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
    }
}

fn layout(root: &Path) -> Layout {
    Layout::new(root.join("BronzeRawData"), root.join("SilverRawData"))
}

fn write_export(root: &Path, name: &str, contents: &str) {
    let dir = root.join("EversysDatFiles");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn merges_exports_with_single_header() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_export(
        root,
        "M1-20240314-Rinse_History.dat",
        &format!("{RINSE_HEADER}\nM1;2024-03-14 08:00:00;1\n"),
    );
    write_export(
        root,
        "M1-20240315-Rinse_History.dat",
        &format!("{RINSE_HEADER}\nM1;2024-03-15 08:00:00;2\nM1;2024-03-15 09:00:00;3\n"),
    );

    let report = merge_exports(&layout(root), &options(root)).unwrap();
    assert_eq!(report.merged.len(), 2);
    assert_eq!(report.merged_rows(), 3);
    assert!(report.failed.is_empty());

    let merged = fs::read_to_string(layout(root).source_table(Category::Rinse)).unwrap();
    assert_eq!(
        merged,
        "machine_id;timestamp;rinse_type\n\
         M1;2024-03-14 08:00:00;1\n\
         M1;2024-03-15 08:00:00;2\n\
         M1;2024-03-15 09:00:00;3\n"
    );

    let backup = root.join("BronzeRawData/Rinse/2024/03/15/Rinse.dat");
    assert_eq!(fs::read_to_string(backup).unwrap(), merged);
    assert!(!root.join("TempDatFiles/M1-20240314-Rinse_History.dat").exists());
}

#[test]
fn processed_exports_are_not_merged_twice() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_export(
        root,
        "M1-Rinse_History.dat",
        &format!("{RINSE_HEADER}\nM1;2024-03-14 08:00:00;1\n"),
    );

    merge_exports(&layout(root), &options(root)).unwrap();
    let second = merge_exports(&layout(root), &options(root)).unwrap();
    assert!(second.merged.is_empty());
    assert_eq!(second.already_processed, 1);

    let merged = fs::read_to_string(layout(root).source_table(Category::Rinse)).unwrap();
    assert_eq!(merged.lines().count(), 2);
}

#[test]
fn placeholder_gets_header_on_first_merge() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("EversysDatFiles")).unwrap();

    let first = merge_exports(&layout(root), &options(root)).unwrap();
    assert_eq!(first.placeholders.len(), 4);
    let target = layout(root).source_table(Category::Rinse);
    assert_eq!(fs::metadata(&target).unwrap().len(), 0);

    write_export(
        root,
        "M1-Rinse_History.dat",
        &format!("{RINSE_HEADER}\nM1;2024-03-14 08:00:00;1\n"),
    );
    merge_exports(&layout(root), &options(root)).unwrap();
    let merged = fs::read_to_string(&target).unwrap();
    assert!(merged.starts_with(RINSE_HEADER));
}

#[test]
fn unknown_and_empty_exports_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_export(root, "M1-Alarm_History.dat", "a;b\n1;2\n");
    write_export(root, "M1-Info_Message_History.dat", "machine_id;timestamp\n");

    let report = merge_exports(&layout(root), &options(root)).unwrap();
    assert!(report.merged.is_empty());
    assert_eq!(report.unrecognized, vec!["M1-Alarm_History.dat"]);
    assert_eq!(report.empty, vec!["M1-Info_Message_History.dat"]);

    // Empty exports are not recorded and get retried.
    let tracker = fs::read_to_string(root.join("processed_files.txt")).unwrap();
    assert!(tracker.is_empty());
}

#[test]
fn missing_export_folder_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let report = merge_exports(&layout(dir.path()), &options(dir.path())).unwrap();
    assert!(report.export_dir_missing);
    assert!(report.placeholders.is_empty());
}

#[test]
fn quoted_composites_survive_the_merge() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_export(
        root,
        "M1-Cleaning_History.dat",
        "machine_id;milk_clean_temp_left\nM1;\"30;31\"\n",
    );
    merge_exports(&layout(root), &options(root)).unwrap();
    let merged = fs::read_to_string(layout(root).source_table(Category::Cleaning)).unwrap();
    assert_eq!(merged, "machine_id;milk_clean_temp_left\nM1;\"30;31\"\n");
}
