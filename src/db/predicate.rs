//! WHERE-villkor för `select_where`.
//!
//! Kolumnnamn kommer alltid från entiteternas konstanter, aldrig från
//! anroparen; bara värden binds som parametrar.

use rusqlite::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Eq(&'static str, Value),
    /// Ett enda `IN (...)`, även för långa listor
    In(&'static str, Vec<String>),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Eq(column, value.into())
    }

    /// Rendera till SQL-fragment och parametrar
    pub fn render(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let sql = self.render_into(&mut params);
        (sql, params)
    }

    fn render_into(&self, params: &mut Vec<Value>) -> String {
        match self {
            Self::All => "1=1".to_string(),
            Self::Eq(column, value) => {
                params.push(value.clone());
                format!("{} = ?{}", column, params.len())
            }
            Self::In(_, values) if values.is_empty() => "0=1".to_string(),
            Self::In(column, values) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| {
                        params.push(Value::Text(v.clone()));
                        format!("?{}", params.len())
                    })
                    .collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
            Self::And(parts) if parts.is_empty() => "1=1".to_string(),
            Self::And(parts) => {
                let rendered: Vec<String> = parts
                    .iter()
                    .map(|p| format!("({})", p.render_into(params)))
                    .collect();
                rendered.join(" AND ")
            }
        }
    }
}
