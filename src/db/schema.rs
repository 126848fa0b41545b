// src/db/schema.rs

use sqlx::PgConnection;

/// Character a schema script is split on.
pub const STATEMENT_SEPARATOR: char = ';';

const BUNDLED_SCHEMA: &str = include_str!("../../sql/schema.sql");

/// An ordered list of schema statements, applied one by one at startup.
///
/// The list is produced by a plain textual split on [`STATEMENT_SEPARATOR`].
/// Nothing is parsed, so a script that uses the separator inside a string
/// literal or a comment is cut in the wrong place. Scripts must be authored
/// with that in mind, and every statement must be safe to re-run
/// (`CREATE ... IF NOT EXISTS`), since the script is applied on every start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaScript {
    statements: Vec<String>,
}

impl SchemaScript {
    /// Splits `script` into trimmed, non-empty statements in file order.
    pub fn parse(script: &str) -> Self {
        let statements = script
            .split(STATEMENT_SEPARATOR)
            .map(str::trim)
            .filter(|stmt| !stmt.is_empty())
            .map(str::to_owned)
            .collect();

        Self { statements }
    }

    /// The schema shipped with the service (`sql/schema.sql`).
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_SCHEMA)
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Executes every statement in order on `conn`, stopping at the first failure.
    pub async fn apply(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        for (index, statement) in self.statements.iter().enumerate() {
            sqlx::raw_sql(statement.as_str())
                .execute(&mut *conn)
                .await
                .inspect_err(|e| {
                    tracing::debug!(statement = index + 1, error = %e, "Schema statement failed");
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_file_order() {
        let script = SchemaScript::parse("CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);");
        assert_eq!(
            script.statements(),
            &["CREATE TABLE a (id INT)".to_string(), "CREATE TABLE b (id INT)".to_string()]
        );
    }

    #[test]
    fn test_parse_drops_blank_segments() {
        let script = SchemaScript::parse(";;\n  SELECT 1 ;\n\n;   \n");
        assert_eq!(script.len(), 1);
        assert_eq!(script.statements()[0], "SELECT 1");
    }

    #[test]
    fn test_parse_empty_script() {
        assert!(SchemaScript::parse("  \n ").is_empty());
    }

    #[test]
    fn test_separator_inside_literal_is_split() {
        // Documented limitation: the split is textual.
        let script = SchemaScript::parse("INSERT INTO t VALUES ('a;b')");
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_bundled_schema_is_rerunnable() {
        let script = SchemaScript::bundled();
        assert_eq!(script.len(), 7);
        for statement in script.statements() {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "statement is not idempotent: {statement}"
            );
        }
    }

    #[test]
    fn test_bundled_schema_creates_tables_before_indexes() {
        let script = SchemaScript::bundled();
        let position = |needle: &str| {
            script
                .statements()
                .iter()
                .position(|s| s.contains(needle))
                .unwrap()
        };
        assert!(position("TABLE IF NOT EXISTS quiz_results") < position("idx_quiz_results_email"));
        assert!(position("TABLE IF NOT EXISTS quiz_results") < position("TABLE IF NOT EXISTS quiz_scores"));
        assert!(position("TABLE IF NOT EXISTS quiz_answers") < position("idx_quiz_answers_result_id"));
    }
}
