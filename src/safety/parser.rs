//! SQL parsing and classification logic.
//!
//! Uses sqlparser-rs with the SQLite dialect to parse SQL and classify
//! statements by their safety level.

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

use super::{ClassificationResult, SafetyLevel, StatementType};

/// SQL classifier that parses and classifies SQL queries.
#[derive(Debug)]
pub struct SqlClassifier {
    dialect: SQLiteDialect,
}

impl Default for SqlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlClassifier {
    /// Creates a new SQL classifier.
    pub fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
        }
    }

    /// Classifies a SQL string and returns the classification result.
    ///
    /// SQL the parser does not understand falls back to [`Self::classify_tokens`].
    pub fn classify(&self, sql: &str) -> ClassificationResult {
        let statements = match Parser::parse_sql(&self.dialect, sql) {
            Ok(statements) => statements,
            Err(e) => {
                debug!(error = %e, "Parser rejected SQL, classifying by tokens");
                return self.classify_tokens(sql, &e.to_string());
            }
        };

        match statements.as_slice() {
            [] => ClassificationResult::new(SafetyLevel::Destructive, StatementType::Unknown)
                .with_statement_count(0)
                .with_warning("Empty SQL statement."),
            [statement] => {
                let (level, stmt_type) = classify_statement(statement);
                let result = ClassificationResult::new(level, stmt_type.clone());
                if level == SafetyLevel::Safe {
                    result
                } else {
                    result.with_warning(format!("{stmt_type} statement is not allowed."))
                }
            }
            many => {
                // Multiple statements: report the most dangerous classification
                let (level, stmt_type) = many
                    .iter()
                    .map(classify_statement)
                    .fold((SafetyLevel::Safe, StatementType::Select), most_dangerous);

                ClassificationResult::new(level, StatementType::Multiple(Box::new(stmt_type)))
                    .with_statement_count(many.len())
                    .with_warning(format!(
                        "Expected a single statement, found {}.",
                        many.len()
                    ))
            }
        }
    }
}

impl SqlClassifier {
    /// Classifies SQL from its token stream alone.
    ///
    /// SQLite accepts syntax the parser lacks (`GLOB`, `LIMIT a, b`,
    /// `IS NOT <expr>`). Statements are split on semicolons outside string
    /// literals; a single statement whose first keyword is `SELECT` is safe.
    /// Anything else, including SQL that does not tokenize, is not.
    fn classify_tokens(&self, sql: &str, parse_error: &str) -> ClassificationResult {
        let unknown = |reason: String| {
            ClassificationResult::new(SafetyLevel::Destructive, StatementType::Unknown)
                .with_warning(reason)
        };

        let tokens = match Tokenizer::new(&self.dialect, sql).tokenize() {
            Ok(tokens) => tokens,
            Err(e) => return unknown(format!("Could not parse SQL: {e}")),
        };

        let statements: Vec<Vec<&Token>> = tokens
            .split(|token| *token == Token::SemiColon)
            .map(|statement| {
                statement
                    .iter()
                    .filter(|token| !matches!(token, Token::Whitespace(_) | Token::EOF))
                    .collect::<Vec<_>>()
            })
            .filter(|statement| !statement.is_empty())
            .collect();

        match statements.as_slice() {
            [statement] => match statement.first() {
                Some(Token::Word(word)) if word.keyword == Keyword::SELECT => {
                    ClassificationResult::new(SafetyLevel::Safe, StatementType::Select)
                }
                _ => unknown(format!("Could not parse SQL: {parse_error}")),
            },
            [] => unknown("Empty SQL statement.".to_string()).with_statement_count(0),
            many => ClassificationResult::new(
                SafetyLevel::Destructive,
                StatementType::Multiple(Box::new(StatementType::Unknown)),
            )
            .with_statement_count(many.len())
            .with_warning(format!(
                "Expected a single statement, found {}.",
                many.len()
            )),
        }
    }
}

/// Convenience function to classify SQL without creating a classifier instance.
pub fn classify_sql(sql: &str) -> ClassificationResult {
    SqlClassifier::new().classify(sql)
}

/// Keeps whichever of two classifications is more dangerous; ties keep the first.
fn most_dangerous(
    current: (SafetyLevel, StatementType),
    candidate: (SafetyLevel, StatementType),
) -> (SafetyLevel, StatementType) {
    if candidate.0 > current.0 {
        candidate
    } else {
        current
    }
}

/// Classifies a single parsed statement.
fn classify_statement(statement: &Statement) -> (SafetyLevel, StatementType) {
    match statement {
        // Query: may contain data-modifying CTEs, so recurse
        Statement::Query(query) => classify_query(query),

        // SQLite's EXPLAIN never runs the inner statement
        Statement::Explain { .. } => (SafetyLevel::Safe, StatementType::Explain),

        Statement::Insert(_) => (SafetyLevel::Mutating, StatementType::Insert),
        Statement::Update { .. } => (SafetyLevel::Mutating, StatementType::Update),

        Statement::Delete(_) => (SafetyLevel::Destructive, StatementType::Delete),
        Statement::Drop { .. } => (SafetyLevel::Destructive, StatementType::Drop),
        Statement::AlterTable { .. } => (SafetyLevel::Destructive, StatementType::Alter),
        Statement::CreateTable { .. }
        | Statement::CreateIndex { .. }
        | Statement::CreateView { .. }
        | Statement::CreateVirtualTable { .. } => {
            (SafetyLevel::Destructive, StatementType::Create)
        }
        Statement::Pragma { .. } => (SafetyLevel::Destructive, StatementType::Pragma),
        Statement::AttachDatabase { .. } => (SafetyLevel::Destructive, StatementType::Attach),

        // Conservative default: treat unknown statements as destructive
        _ => (SafetyLevel::Destructive, StatementType::Unknown),
    }
}

/// Classifies a Query by recursively inspecting for data-modifying operations.
fn classify_query(query: &Query) -> (SafetyLevel, StatementType) {
    let mut max = (SafetyLevel::Safe, StatementType::Select);

    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            max = most_dangerous(max, classify_query(&cte.query));
        }
    }

    most_dangerous(max, classify_set_expr(&query.body))
}

/// Classifies a SetExpr, detecting mutations and recursing into nested queries.
fn classify_set_expr(set_expr: &SetExpr) -> (SafetyLevel, StatementType) {
    match set_expr {
        // Mutations in CTE bodies (wrapped as Statement)
        SetExpr::Update(stmt) | SetExpr::Insert(stmt) => classify_statement(stmt),

        SetExpr::Query(query) => classify_query(query),

        SetExpr::Select(select) => classify_select(select),

        // UNION, INTERSECT, EXCEPT: check both sides
        SetExpr::SetOperation { left, right, .. } => {
            most_dangerous(classify_set_expr(left), classify_set_expr(right))
        }

        SetExpr::Values(_) | SetExpr::Table(_) => (SafetyLevel::Safe, StatementType::Select),
    }
}

/// Classifies a Select by checking its FROM clause for subqueries.
fn classify_select(select: &Select) -> (SafetyLevel, StatementType) {
    select
        .from
        .iter()
        .map(classify_table_with_joins)
        .fold((SafetyLevel::Safe, StatementType::Select), most_dangerous)
}

/// Classifies a TableWithJoins, checking the main relation and all joins.
fn classify_table_with_joins(twj: &TableWithJoins) -> (SafetyLevel, StatementType) {
    twj.joins
        .iter()
        .map(|join| classify_table_factor(&join.relation))
        .fold(classify_table_factor(&twj.relation), most_dangerous)
}

/// Classifies a TableFactor, recursing into derived tables (subqueries).
fn classify_table_factor(factor: &TableFactor) -> (SafetyLevel, StatementType) {
    match factor {
        TableFactor::Derived { subquery, .. } => classify_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => classify_table_with_joins(table_with_joins),
        _ => (SafetyLevel::Safe, StatementType::Select),
    }
}
