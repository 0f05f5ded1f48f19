//! Text renderings of a unified schema
//!
//! [`render_markdown`] is shown to people at suspension points.
//! [`render_prompt_description`] is the compact form handed to the SQL
//! generator.

use crate::schema::{RowCount, UnifiedSchema};
use std::fmt::Write;

/// Render the schema as a markdown overview.
pub fn render_markdown(schema: &UnifiedSchema) -> String {
    let mut out = String::from("# Schema Overview\n\n");

    let summary = &schema.summary;
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out, "- **Datasets**: {}", summary.total_datasets);
    let _ = writeln!(out, "- **Tables**: {}", summary.total_tables);
    let _ = writeln!(out, "- **Columns**: {}", summary.total_columns);
    let _ = writeln!(out, "- **Relationships**: {}", summary.total_relationships);
    let _ = writeln!(
        out,
        "- **Projects**: {}\n",
        summary.projects_accessed.join(", ")
    );

    out.push_str("## Tables and Columns\n\n");
    for table in &schema.tables {
        let _ = write!(out, "### `{}`", table.key);
        match schema.row_count_for(&table.key) {
            Some(RowCount {
                row_count: Some(n), ..
            }) => {
                let _ = write!(out, " ({} rows)", group_thousands(*n));
            }
            Some(RowCount { error: Some(_), .. }) => out.push_str(" (row count unavailable)"),
            _ => {}
        }
        out.push_str("\n\n");

        let _ = writeln!(out, "**Type**: {}", table.table_type);
        if let Some(created) = &table.creation_time {
            let _ = writeln!(out, "**Created**: {}", created);
        }
        out.push('\n');

        out.push_str("| Column | Type | Nullable | Primary Key | Position |\n");
        out.push_str("|--------|------|----------|-------------|----------|\n");
        for column in schema.columns_for(&table.key) {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                column.column_name,
                column.data_type,
                if column.is_nullable { "yes" } else { "no" },
                if column.is_primary_key { "yes" } else { "" },
                column.ordinal_position
            );
        }
        out.push('\n');
    }

    if !schema.relationships.is_empty() {
        out.push_str("## Potential Relationships (ID-like columns)\n\n");
        for (table, rels) in schema.relationships_by_table() {
            let _ = writeln!(out, "**Table**: `{}`", table);
            for rel in rels {
                let _ = write!(out, "- {} ({})", rel.column_name, rel.data_type);
                if !rel.is_nullable {
                    out.push_str(" [NOT NULL]");
                }
                out.push('\n');
            }
            out.push('\n');
        }
    }

    if !schema.issues.is_empty() {
        out.push_str("## Introspection Issues\n\n");
        for issue in &schema.issues {
            let _ = writeln!(
                out,
                "- `{}` ({}): {}",
                issue.dataset, issue.stage, issue.message
            );
        }
        out.push('\n');
    }

    out
}

/// Render the compact schema description used in generator prompts.
pub fn render_prompt_description(schema: &UnifiedSchema) -> String {
    let mut out = String::new();

    for table in &schema.tables {
        let _ = write!(out, "\nTable: `{}` (Type: {})", table.key, table.table_type);
        match schema.row_count_for(&table.key) {
            Some(RowCount {
                row_count: Some(n), ..
            }) => {
                let _ = write!(out, " ({} rows)", group_thousands(*n));
            }
            Some(RowCount {
                error: Some(err), ..
            }) => {
                let _ = write!(out, " (Row count unavailable: {})", err);
            }
            _ => {}
        }
        out.push_str("\nColumns:\n");

        for column in schema.columns_for(&table.key) {
            let _ = write!(out, "  - {}: {}", column.column_name, column.data_type);
            if column.is_primary_key {
                out.push_str(" [PRIMARY KEY]");
            }
            if !column.is_nullable {
                out.push_str(" [NOT NULL]");
            }
            out.push('\n');
        }

        if let Some(created) = &table.creation_time {
            let _ = writeln!(out, "  Created: {}", created);
        }
    }

    if !schema.relationships.is_empty() {
        out.push_str("\nPotential Relationships (ID-like columns):\n");
        for (table, rels) in schema.relationships_by_table() {
            let _ = writeln!(out, "  Table: `{}`", table);
            for rel in rels {
                let _ = write!(out, "    - {} ({})", rel.column_name, rel.data_type);
                if !rel.is_nullable {
                    out.push_str(" [NOT NULL]");
                }
                out.push('\n');
            }
        }
    }

    let summary = &schema.summary;
    out.push_str("\nSchema Summary:\n");
    let _ = writeln!(out, "  - Total Datasets: {}", summary.total_datasets);
    let _ = writeln!(out, "  - Total Tables: {}", summary.total_tables);
    let _ = writeln!(out, "  - Total Columns: {}", summary.total_columns);
    let _ = writeln!(
        out,
        "  - Projects Accessed: {}",
        summary.projects_accessed.join(", ")
    );

    out
}

/// Format an integer with `,` thousands separators.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
#[path = "presentation_test.rs"]
mod tests;
