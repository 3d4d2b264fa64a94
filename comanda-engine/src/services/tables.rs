//! Table management

use crate::repository::{OrderRepository, TableRepository};
use crate::tenancy::LocalContext;
use crate::utils::validation::validate_name;
use shared::error::{DomainError, DomainResult};
use shared::models::{DiningTable, DiningTableCreate, TableState};
use shared::util::new_id;
use std::sync::Arc;
use uuid::Uuid;

pub struct TableService {
    tables: Arc<dyn TableRepository>,
    orders: Arc<dyn OrderRepository>,
    local: Arc<dyn LocalContext>,
}

impl TableService {
    pub fn new(
        tables: Arc<dyn TableRepository>,
        orders: Arc<dyn OrderRepository>,
        local: Arc<dyn LocalContext>,
    ) -> Self {
        Self {
            tables,
            orders,
            local,
        }
    }

    pub async fn create(&self, payload: DiningTableCreate) -> DomainResult<DiningTable> {
        let local_id = self.local.current_local_id();
        validate_name("name", &payload.name)?;
        if payload.number <= 0 {
            return Err(DomainError::validation("number", "must be positive"));
        }
        if self
            .tables
            .exists_by_number_and_local(payload.number, local_id)
            .await?
        {
            return Err(DomainError::validation(
                "number",
                format!("table number {} already exists", payload.number),
            ));
        }

        let table = DiningTable {
            id: new_id(),
            local_id,
            name: payload.name.trim().to_string(),
            number: payload.number,
            state: TableState::Free,
        };
        let saved = self.tables.save(table).await?;
        tracing::info!(table = %saved.name, number = saved.number, "table created");
        Ok(saved)
    }

    pub async fn list(&self) -> DomainResult<Vec<DiningTable>> {
        let local_id = self.local.current_local_id();
        Ok(self.tables.list_by_local(local_id).await?)
    }

    /// Delete a table; refused while an open order sits on it
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let local_id = self.local.current_local_id();
        self.tables
            .find_by_id(id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("table", id))?;

        if self
            .orders
            .find_open_by_table(id, local_id)
            .await?
            .is_some()
        {
            return Err(DomainError::validation(
                "table",
                "cannot delete a table with an open order",
            ));
        }

        self.tables.delete(id, local_id).await?;
        Ok(())
    }
}
