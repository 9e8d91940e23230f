use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use silver_core::{CategoryReport, RunStatus, SilverReport};
use silver_ingest::BronzeReport;
use silver_store::Recovery;

pub fn print_silver_summary(report: &SilverReport) {
    println!("Run date: {}", report.run_date);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Status"),
        header_cell("Lines"),
        header_cell("Seen"),
        header_cell("Rejected"),
        header_cell("New rows"),
        header_cell("Warnings"),
        header_cell("Current"),
        header_cell("History"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 7, CellAlignment::Center);
    align_column(&mut table, 8, CellAlignment::Center);

    for category in &report.categories {
        table.add_row(vec![
            Cell::new(category.category)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(&category.status),
            Cell::new(category.lines_read),
            dim_cell(category.already_processed + category.duplicates),
            count_cell(category.rejected, Color::Yellow),
            count_cell(category.rows_written, Color::Green),
            count_cell(category.field_warnings, Color::Yellow),
            output_cell(category.output.as_ref().map(|o| o.table.as_path())),
            output_cell(category.output.as_ref().map(|o| o.snapshot.as_path())),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(report.categories.iter().map(|c| c.lines_read).sum::<usize>())
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(
            report.categories.iter().map(|c| c.rejected).sum(),
            Color::Yellow,
        )
        .add_attribute(Attribute::Bold),
        count_cell(report.rows_written(), Color::Green).add_attribute(Attribute::Bold),
        count_cell(
            report.categories.iter().map(|c| c.field_warnings).sum(),
            Color::Yellow,
        )
        .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_warning_table(&report.categories);
    print_recoveries(&report.categories);

    let failures: Vec<_> = report
        .categories
        .iter()
        .filter_map(|c| match &c.status {
            RunStatus::Failed { message } => Some((c.category, message)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for (category, message) in failures {
            eprintln!("- {category}: {message}");
        }
    }
}

fn print_warning_table(categories: &[CategoryReport]) {
    let rows: Vec<_> = categories
        .iter()
        .flat_map(|c| {
            c.warnings_by_field
                .iter()
                .map(move |(field, count)| (c.category, field, *count))
        })
        .collect();
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Field"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (category, field, count) in rows {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(field),
            Cell::new(count).fg(Color::Yellow),
        ]);
    }
    println!();
    println!("Field warnings:");
    println!("{table}");
}

fn print_recoveries(categories: &[CategoryReport]) {
    for category in categories {
        match category.recovery {
            Recovery::Clean => {}
            Recovery::Committed { fingerprints } => println!(
                "{}: completed an interrupted commit ({fingerprints} lines)",
                category.category
            ),
            Recovery::RolledBack {
                fingerprints,
                truncated,
            } => println!(
                "{}: rolled back an interrupted commit ({fingerprints} lines{})",
                category.category,
                if truncated { ", partial rows removed" } else { "" }
            ),
        }
    }
}

pub fn print_bronze_summary(report: &BronzeReport) {
    if report.export_dir_missing {
        println!("Export folder not found, nothing merged.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Export"),
        header_cell("Category"),
        header_cell("Rows"),
        header_cell("Backup"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for merged in &report.merged {
        table.add_row(vec![
            Cell::new(&merged.file_name),
            Cell::new(merged.category).fg(Color::Blue),
            Cell::new(merged.rows),
            output_cell(Some(merged.backup.as_path())),
        ]);
    }
    for name in &report.empty {
        table.add_row(vec![
            dim_cell(name),
            dim_cell("-"),
            dim_cell(0),
            dim_cell("empty"),
        ]);
    }
    for failed in &report.failed {
        table.add_row(vec![
            Cell::new(&failed.file_name).fg(Color::Red),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new(&failed.message).fg(Color::Red),
        ]);
    }
    println!(
        "Merged {} export(s), {} row(s); {} already processed, {} unrecognized.",
        report.merged.len(),
        report.merged_rows(),
        report.already_processed,
        report.unrecognized.len()
    );
    if table.row_count() > 0 {
        println!("{table}");
    }
    for placeholder in &report.placeholders {
        println!("Created placeholder {}", placeholder.display());
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: &RunStatus) -> Cell {
    match status {
        RunStatus::Written => Cell::new("written").fg(Color::Green),
        RunStatus::UpToDate => Cell::new("up to date"),
        RunStatus::SourceMissing => dim_cell("no source"),
        RunStatus::SourceEmpty => dim_cell("empty source"),
        RunStatus::Failed { .. } => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn output_cell(path: Option<&Path>) -> Cell {
    match path {
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
