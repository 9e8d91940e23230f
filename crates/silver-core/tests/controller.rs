//! Category runs against real directory trees.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use silver_core::{PipelineError, RunState, RunStatus, run_category, run_silver};
use silver_model::{Category, Layout};
use silver_store::{Fingerprint, HistorizedWriter, Journal, PendingCommit, Recovery};
use silver_transform::TransformError;

const INFO_HEADER: &str = "machine_id;timestamp;number;typography;type_number";

const CLEANING_HEADER: &str = "machine_id;timestamp_start;timestamp_end;powder_clean_status;\
tabs_status_left;tabs_status_right;detergent_status_left;detergent_status_right;\
milk_pump_error_left;milk_pump_error_right;milk_temp_left_1;milk_temp_left_2;\
milk_temp_right_1;milk_temp_right_2;milk_rpm_left_1;milk_rpm_left_2;milk_rpm_right_1;\
milk_rpm_right_2;milk_clean_temp_left;milk_clean_temp_right;milk_clean_rpm_left;\
milk_clean_rpm_right;milk_seq_cycle_left;milk_seq_cycle_right";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn setup() -> (tempfile::TempDir, Layout) {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path().join("BronzeRawData"), dir.path().join("SilverRawData"));
    (dir, layout)
}

fn write_source(layout: &Layout, category: Category, content: &str) {
    let path = layout.source_table(category);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn append_source(layout: &Layout, category: Category, content: &str) {
    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(layout.source_table(category))
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn ledger_lines(layout: &Layout, category: Category) -> usize {
    fs::read_to_string(layout.ledger(category))
        .map(|text| text.lines().count())
        .unwrap_or(0)
}

#[test]
fn cleaning_line_lands_in_current_and_history() {
    let (_dir, layout) = setup();
    let line = "CM-01;2024-03-15 06:00:00;03/15/2024 06:12:30;2;3;4;5;6;0;1;\
                40;41;42;43;1000;1100;1200;1300;\"30;31\";\"32;33\";\"500;510\";\"520;530\";\"1;2\";\"3;4\"";
    write_source(&layout, Category::Cleaning, &format!("{CLEANING_HEADER}\n{line}\n"));

    let report = run_category(&layout, Category::Cleaning, run_date()).unwrap();
    assert_eq!(report.status, RunStatus::Written);
    assert_eq!(report.state, RunState::LedgerPersisted);
    assert_eq!(report.rows_written, 1);

    let current = read(&layout.current_table(Category::Cleaning));
    let rows: Vec<&str> = current.lines().collect();
    assert_eq!(rows.len(), 2);
    let header: Vec<&str> = rows[0].split(';').collect();
    let values: Vec<&str> = rows[1].split(';').collect();
    let value = |name: &str| values[header.iter().position(|h| *h == name).unwrap()];
    assert_eq!(value("milk_clean_temp_left_1"), "30");
    assert_eq!(value("milk_clean_temp_left_2"), "31");
    assert_eq!(value("timestamp_end"), "2024-03-15 06:12:30");

    let snapshot = layout.history_snapshot(Category::Cleaning, run_date());
    assert_eq!(fs::read(snapshot).unwrap(), current.into_bytes());
    assert_eq!(ledger_lines(&layout, Category::Cleaning), 1);
}

#[test]
fn second_run_over_unchanged_source_is_a_no_op() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        &format!("{INFO_HEADER}\nM1;2024-03-15 10:00:00;E12;Milk;3\nM1;2024-03-15 11:00:00;E13;Steam;4\n"),
    );

    let first = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(first.rows_written, 2);
    let table_before = read(&layout.current_table(Category::Info));

    let second = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(second.status, RunStatus::UpToDate);
    assert_eq!(second.state, RunState::RecordsTransformed);
    assert_eq!(second.already_processed, 2);
    assert_eq!(second.rows_written, 0);
    assert_eq!(read(&layout.current_table(Category::Info)), table_before);
    assert_eq!(ledger_lines(&layout, Category::Info), 2);
}

#[test]
fn only_appended_lines_are_processed() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        &format!("{INFO_HEADER}\nM1;2024-03-15 10:00:00;E12;Milk;3\n"),
    );
    run_category(&layout, Category::Info, run_date()).unwrap();

    append_source(&layout, Category::Info, "M2;03/16/2024 08:30:00;E14;Water;5\n");
    let next_day = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
    let report = run_category(&layout, Category::Info, next_day).unwrap();
    assert_eq!(report.already_processed, 1);
    assert_eq!(report.rows_written, 1);

    insta::assert_snapshot!(read(&layout.current_table(Category::Info)), @r"
    machine_id;timestamp;number;typography;type_number
    M1;2024-03-15 10:00:00;E12;Milk;3
    M2;2024-03-16 08:30:00;E14;Water;5
    ");
    // Each day keeps the table as it was at the end of that day.
    assert_eq!(
        read(&layout.history_snapshot(Category::Info, run_date())).lines().count(),
        2
    );
    assert_eq!(
        read(&layout.history_snapshot(Category::Info, next_day)).lines().count(),
        3
    );
}

#[test]
fn short_lines_are_retried_until_complete() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        &format!("{INFO_HEADER}\nM1;2024-03-15 10:00:00;E12\n"),
    );

    let first = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(first.rejected, 1);
    assert_eq!(first.status, RunStatus::UpToDate);
    assert!(!layout.current_table(Category::Info).exists());
    assert_eq!(ledger_lines(&layout, Category::Info), 0);

    let second = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(second.rejected, 1);
    assert_eq!(second.already_processed, 0);
}

#[test]
fn field_warnings_still_produce_rows() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        &format!("{INFO_HEADER}\nM1;yesterday;E12;Milk;three\n"),
    );
    let report = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.field_warnings, 2);
    assert_eq!(report.warnings_by_field.get("timestamp"), Some(&1));
    assert!(read(&layout.current_table(Category::Info)).ends_with("M1;;E12;Milk;\n"));
    assert_eq!(ledger_lines(&layout, Category::Info), 1);
}

#[test]
fn repeated_line_in_one_batch_is_written_once() {
    let (_dir, layout) = setup();
    let line = "M1;2024-03-15 10:00:00;E12;Milk;3";
    write_source(&layout, Category::Info, &format!("{INFO_HEADER}\n{line}\n{line}\n"));
    let report = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.rows_written, 1);
}

#[test]
fn missing_and_blank_sources_end_cleanly() {
    let (_dir, layout) = setup();
    let missing = run_category(&layout, Category::Rinse, run_date()).unwrap();
    assert_eq!(missing.status, RunStatus::SourceMissing);
    assert_eq!(missing.state, RunState::LedgerLoaded);

    write_source(&layout, Category::Product, "\n \n");
    let empty = run_category(&layout, Category::Product, run_date()).unwrap();
    assert_eq!(empty.status, RunStatus::SourceEmpty);

    assert!(!layout.silver_root.exists());
    assert!(!layout.ledger(Category::Rinse).exists());
}

#[test]
fn missing_column_fails_only_that_category() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        "machine_id;timestamp;number\nM1;2024-03-15 10:00:00;E12\n",
    );
    write_source(
        &layout,
        Category::Rinse,
        "machine_id;timestamp;rinse_type;flow_rate_left;flow_rate_right;status_left;\
         status_right;pump_pressure;nozzle_flow_rate_left;nozzle_flow_rate_right;\
         nozzle_status_left;nozzle_status_right\n\
         M1;2024-03-15 06:00:00;2;65535;118;0;0;850;65535;95;1;1\n",
    );

    let err = run_category(&layout, Category::Info, run_date()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Transform(TransformError::MissingColumn { .. })
    ));

    let report = run_silver(&layout, &[Category::Info, Category::Rinse], run_date());
    assert!(report.has_failures());
    assert!(report.categories[0].is_failed());
    assert_eq!(report.categories[1].status, RunStatus::Written);
    assert!(!layout.current_table(Category::Info).exists());
    assert!(
        read(&layout.current_table(Category::Rinse))
            .ends_with("M1;2024-03-15 06:00:00;2;;118;0;0;850;;95;1;1\n")
    );
}

#[test]
fn foreign_current_table_is_left_alone() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        &format!("{INFO_HEADER}\nM1;2024-03-15 10:00:00;E12;Milk;3\n"),
    );
    let table = layout.current_table(Category::Info);
    fs::create_dir_all(table.parent().unwrap()).unwrap();
    fs::write(&table, "id;ts\n").unwrap();

    let err = run_category(&layout, Category::Info, run_date()).unwrap_err();
    assert!(err.to_string().contains("does not match"));
    assert_eq!(read(&table), "id;ts\n");
    assert_eq!(ledger_lines(&layout, Category::Info), 0);
}

#[test]
fn interrupted_commit_is_not_written_twice() {
    let (_dir, layout) = setup();
    let line = "M1;2024-03-15 10:00:00;E12;Milk;3";
    write_source(&layout, Category::Info, &format!("{INFO_HEADER}\n{line}\n"));

    // Reproduce a run that stopped right after the table append.
    let schema = silver_model::Schema::for_category(Category::Info);
    let record = silver_model::CleanedRecord::new(vec![
        silver_model::CellValue::Text("M1".into()),
        silver_model::CellValue::Text("2024-03-15 10:00:00".into()),
        silver_model::CellValue::Text("E12".into()),
        silver_model::CellValue::Text("Milk".into()),
        silver_model::CellValue::Int(3),
    ]);
    let writer = HistorizedWriter::new(&layout, run_date());
    let prepared = writer.prepare(&schema, &[record]).unwrap().unwrap();
    Journal::for_ledger(&layout.ledger(Category::Info))
        .begin(&PendingCommit {
            table: prepared.table.clone(),
            snapshot: prepared.snapshot.clone(),
            bytes_before: prepared.bytes_before,
            bytes_after: prepared.bytes_after(),
            fingerprints: vec![Fingerprint::of_line(line)],
        })
        .unwrap();
    writer.commit(&prepared).unwrap();

    let report = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(report.recovery, Recovery::Committed { fingerprints: 1 });
    assert_eq!(report.already_processed, 1);
    assert_eq!(report.rows_written, 0);
    assert_eq!(read(&layout.current_table(Category::Info)).lines().count(), 2);
}

#[test]
fn report_serializes_for_automation() {
    let (_dir, layout) = setup();
    let report = run_silver(&layout, &[Category::Rinse], run_date());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["run_date"], "2024-03-15");
    assert_eq!(json["categories"][0]["category"], "Rinse");
    assert_eq!(json["categories"][0]["status"]["status"], "source_missing");
    assert_eq!(json["categories"][0]["recovery"]["outcome"], "clean");
}

#[test]
fn stray_quote_falls_back_to_plain_split() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        &format!("{INFO_HEADER}\nM1;2024-03-15 10:00:00;E12;\"Clean milk;3\n"),
    );

    let first = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(first.status, RunStatus::Written);
    assert_eq!(first.rejected, 0);
    assert_eq!(first.rows_written, 1);
    assert!(
        read(&layout.current_table(Category::Info))
            .ends_with("M1;2024-03-15 10:00:00;E12;Clean milk;3\n")
    );

    let second = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(second.status, RunStatus::UpToDate);
    assert_eq!(second.already_processed, 1);
}

#[test]
fn same_day_runs_overwrite_the_snapshot() {
    let (_dir, layout) = setup();
    write_source(
        &layout,
        Category::Info,
        &format!("{INFO_HEADER}\nM1;2024-03-15 10:00:00;E12;Milk;3\n"),
    );
    run_category(&layout, Category::Info, run_date()).unwrap();
    let snapshot = layout.history_snapshot(Category::Info, run_date());
    assert_eq!(read(&snapshot).lines().count(), 2);

    append_source(&layout, Category::Info, "M2;2024-03-15 12:00:00;E14;Water;5\n");
    let report = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(report.rows_written, 1);

    let current = read(&layout.current_table(Category::Info));
    assert_eq!(current.lines().count(), 3);
    assert_eq!(read(&snapshot), current);
}

#[test]
fn failed_snapshot_keeps_ledger_and_journal() {
    let (_dir, layout) = setup();
    let line = "M1;2024-03-15 10:00:00;E12;Milk;3";
    write_source(&layout, Category::Info, &format!("{INFO_HEADER}\n{line}\n"));

    // A non-empty directory where the snapshot file belongs makes the copy fail.
    let snapshot = layout.history_snapshot(Category::Info, run_date());
    fs::create_dir_all(snapshot.join("blocked")).unwrap();

    let err = run_category(&layout, Category::Info, run_date()).unwrap_err();
    assert!(matches!(err, PipelineError::Store(_)), "{err}");
    assert_eq!(ledger_lines(&layout, Category::Info), 0);
    let journal = Journal::for_ledger(&layout.ledger(Category::Info));
    assert!(journal.path().exists());

    fs::remove_dir_all(&snapshot).unwrap();
    let report = run_category(&layout, Category::Info, run_date()).unwrap();
    assert_eq!(report.recovery, Recovery::Committed { fingerprints: 1 });
    assert_eq!(report.rows_written, 0);
    assert_eq!(ledger_lines(&layout, Category::Info), 1);
    assert!(!journal.path().exists());
    assert_eq!(read(&snapshot), read(&layout.current_table(Category::Info)));
}
