//! Category CRUD (independent lookup entity).

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{LedgerError, ResultLedger, accounts, categories};

use super::{Ledger, normalize_required_text};

/// Partial category update.
#[derive(Default)]
pub struct CategoryUpdate {
    pub tipo: Option<String>,
}

impl Ledger {
    pub async fn create_category(&self, tipo: &str) -> ResultLedger<categories::Model> {
        let tipo = normalize_required_text(tipo, "el tipo de categoría")?;
        let taken = categories::Entity::find()
            .filter(categories::Column::Tipo.eq(tipo.clone()))
            .one(&self.database)
            .await?;
        if taken.is_some() {
            return Err(LedgerError::ExistingKey(tipo));
        }

        Ok(categories::ActiveModel {
            tipo: ActiveValue::Set(tipo),
            ..Default::default()
        }
        .insert(&self.database)
        .await?)
    }

    pub async fn list_categories(&self) -> ResultLedger<Vec<categories::Model>> {
        Ok(categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?)
    }

    pub async fn category(&self, category_id: i32) -> ResultLedger<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("categoría".to_string()))
    }

    pub async fn update_category(
        &self,
        category_id: i32,
        update: CategoryUpdate,
    ) -> ResultLedger<categories::Model> {
        let category = self.category(category_id).await?;
        let mut active: categories::ActiveModel = category.into();
        if let Some(tipo) = update.tipo.as_deref() {
            active.tipo = ActiveValue::Set(normalize_required_text(tipo, "el tipo de categoría")?);
        }
        Ok(active.update(&self.database).await?)
    }

    /// Deletes a category unless an account still references it.
    pub async fn delete_category(&self, category_id: i32) -> ResultLedger<()> {
        let category = self.category(category_id).await?;
        let in_use = accounts::Entity::find()
            .filter(accounts::Column::CategoryId.eq(category.id))
            .one(&self.database)
            .await?;
        if in_use.is_some() {
            return Err(LedgerError::InvalidInput(
                "la categoría está en uso".to_string(),
            ));
        }
        categories::Entity::delete_by_id(category.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
