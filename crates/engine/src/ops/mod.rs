use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, Tolerance};

mod access;
mod expenses;
mod groups;
mod ledger;
mod settle;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Database-backed entry point: group/expense operations, the split record
/// supplier and the settlement recorder.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    tolerance: Tolerance,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Tolerance used when optimizing settlements.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    tolerance: Tolerance,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default tolerance (0.01).
    pub fn tolerance(mut self, tolerance: Tolerance) -> EngineBuilder {
        self.tolerance = tolerance;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        tracing::debug!(tolerance = %self.tolerance, "building engine");
        Ok(Engine {
            database: self.database,
            tolerance: self.tolerance,
        })
    }
}
