//! Schema descriptor for the sales store.
//!
//! The same descriptor is embedded in every SQL-generation prompt and used by
//! the demo seeder to create the table, so what the model is told and what
//! the store holds cannot drift apart.

use serde::Serialize;

/// Name of the single relation queried by InsightGen.
pub const SALES_TABLE: &str = "sales";

/// A fixed description of one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Table name.
    pub name: &'static str,

    /// Columns in declaration order.
    pub columns: &'static [Column],
}

/// A column of a described table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name.
    pub name: &'static str,

    /// Declared SQLite type.
    pub data_type: &'static str,

    /// Whether this column is the table's primary key.
    pub primary_key: bool,

    /// Free-form note on the stored format, e.g. a date layout.
    pub note: Option<&'static str>,
}

impl Column {
    const fn new(name: &'static str, data_type: &'static str) -> Self {
        Self {
            name,
            data_type,
            primary_key: false,
            note: None,
        }
    }

    const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    const fn note(self, note: &'static str) -> Self {
        Self {
            note: Some(note),
            ..self
        }
    }
}

const SALES_COLUMNS: &[Column] = &[
    Column::new("order_id", "INTEGER").primary_key(),
    Column::new("product_name", "TEXT"),
    Column::new("category", "TEXT"),
    Column::new("quantity", "INTEGER"),
    Column::new("price", "REAL"),
    Column::new("order_date", "TEXT").note("YYYY-MM-DD"),
];

/// The schema exposed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// All tables in the schema.
    pub tables: Vec<Table>,
}

impl Schema {
    /// The built-in `sales` schema.
    pub fn sales() -> Self {
        Self {
            tables: vec![Table {
                name: SALES_TABLE,
                columns: SALES_COLUMNS,
            }],
        }
    }

    /// Formats the schema for inclusion in a generation prompt.
    ///
    /// ```text
    /// sales(
    ///     order_id INTEGER,
    ///     ...
    ///     order_date TEXT -- YYYY-MM-DD
    /// )
    /// ```
    pub fn format_for_llm(&self) -> String {
        self.tables
            .iter()
            .map(|table| {
                let last = table.columns.len().saturating_sub(1);
                let columns = table
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let sep = if i == last { "" } else { "," };
                        match col.note {
                            Some(note) => {
                                format!("    {} {}{} -- {}", col.name, col.data_type, sep, note)
                            }
                            None => format!("    {} {}{}", col.name, col.data_type, sep),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{}(\n{}\n)", table.name, columns)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Renders `CREATE TABLE IF NOT EXISTS` statements for every table.
    pub fn create_table_statements(&self) -> Vec<String> {
        self.tables
            .iter()
            .map(|table| {
                let columns = table
                    .columns
                    .iter()
                    .map(|col| {
                        if col.primary_key {
                            format!("    {} {} PRIMARY KEY", col.name, col.data_type)
                        } else {
                            format!("    {} {}", col.name, col.data_type)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(",\n");
                format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", table.name, columns)
            })
            .collect()
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::sales()
    }
}
