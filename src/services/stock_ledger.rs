// src/services/stock_ledger.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::inventory::{NewStockLog, ProductStock, StockChange, StockLog},
};

/// Onde o estoque mora. A implementação de produção é `PgConnection`
/// (ver `db::inventory_repo`); os testes usam uma versão em memória.
pub trait StockStore {
    /// Soma `delta` ao estoque do produto e devolve o saldo resultante.
    /// `None` quando o produto não existe nesta loja.
    async fn increment_stock(
        &mut self,
        scope: &TenantScope,
        product_id: Uuid,
        delta: i32,
    ) -> Result<Option<ProductStock>, AppError>;

    async fn append_stock_log(
        &mut self,
        scope: &TenantScope,
        entry: &NewStockLog,
    ) -> Result<StockLog, AppError>;
}

/// Único caminho para mexer no estoque: aplica o delta e registra o histórico
/// com o saldo final. O saldo pode ficar negativo.
pub async fn apply_stock_change<S>(
    store: &mut S,
    scope: &TenantScope,
    change: &StockChange,
    performed_by: Uuid,
) -> Result<Option<StockLog>, AppError>
where
    S: StockStore + ?Sized,
{
    let Some(level) = store
        .increment_stock(scope, change.product_id, change.amount)
        .await?
    else {
        tracing::warn!(
            product_id = %change.product_id,
            "Produto não encontrado, movimento de estoque ignorado"
        );
        return Ok(None);
    };

    let entry = NewStockLog {
        product_id: change.product_id,
        product_name: level.name,
        change_amount: change.amount,
        final_stock: level.stock,
        log_type: change.log_type,
        reason: change.reason.clone(),
        performed_by,
    };

    let log = store.append_stock_log(scope, &entry).await?;
    tracing::debug!(
        product_id = %log.product_id,
        change = log.change_amount,
        final_stock = log.final_stock,
        "Movimento de estoque registrado"
    );
    Ok(Some(log))
}

/// Aplica os movimentos um a um, na ordem dos itens.
pub async fn apply_stock_changes<S>(
    store: &mut S,
    scope: &TenantScope,
    changes: &[StockChange],
    performed_by: Uuid,
) -> Result<Vec<StockLog>, AppError>
where
    S: StockStore + ?Sized,
{
    let mut logs = Vec::with_capacity(changes.len());
    for change in changes {
        if let Some(log) = apply_stock_change(store, scope, change, performed_by).await? {
            logs.push(log);
        }
    }
    Ok(logs)
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;

    use chrono::Utc;
    use uuid::Uuid;

    use super::StockStore;
    use crate::{
        common::error::AppError,
        middleware::tenancy::TenantScope,
        models::inventory::{NewStockLog, ProductStock, StockLog},
    };

    /// Loja em memória: produtos por (loja, id) e o histórico em ordem de gravação.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub products: HashMap<(Uuid, Uuid), ProductStock>,
        pub logs: Vec<StockLog>,
    }

    impl MemoryStore {
        pub fn add_product(&mut self, scope: &TenantScope, name: &str, stock: i32) -> Uuid {
            let id = Uuid::new_v4();
            self.products.insert(
                (scope.tenant_id(), id),
                ProductStock { name: name.into(), stock },
            );
            id
        }

        pub fn stock_of(&self, scope: &TenantScope, product_id: Uuid) -> i32 {
            self.products[&(scope.tenant_id(), product_id)].stock
        }

        pub fn logs_for(&self, product_id: Uuid) -> Vec<StockLog> {
            self.logs.iter().filter(|l| l.product_id == product_id).cloned().collect()
        }
    }

    impl StockStore for MemoryStore {
        async fn increment_stock(
            &mut self,
            scope: &TenantScope,
            product_id: Uuid,
            delta: i32,
        ) -> Result<Option<ProductStock>, AppError> {
            Ok(self
                .products
                .get_mut(&(scope.tenant_id(), product_id))
                .map(|p| {
                    p.stock += delta;
                    p.clone()
                }))
        }

        async fn append_stock_log(
            &mut self,
            scope: &TenantScope,
            entry: &NewStockLog,
        ) -> Result<StockLog, AppError> {
            let log = StockLog {
                id: Uuid::new_v4(),
                tenant_id: scope.tenant_id(),
                product_id: entry.product_id,
                product_name: entry.product_name.clone(),
                change_amount: entry.change_amount,
                final_stock: entry.final_stock,
                log_type: entry.log_type,
                reason: entry.reason.clone(),
                performed_by: Some(entry.performed_by),
                created_at: Utc::now(),
            };
            self.logs.push(log.clone());
            Ok(log)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use crate::middleware::tenancy::test_scope;
    use crate::models::inventory::{replay_stock, StockLogType};

    fn change(product_id: Uuid, amount: i32, log_type: StockLogType) -> StockChange {
        StockChange { product_id, amount, log_type, reason: "test".into() }
    }

    #[tokio::test]
    async fn log_snapshots_the_resulting_stock() {
        let scope = test_scope();
        let mut store = MemoryStore::default();
        let product = store.add_product(&scope, "Pão", 10);

        let log = apply_stock_change(&mut store, &scope, &change(product, -3, StockLogType::Sale), Uuid::new_v4())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(log.change_amount, -3);
        assert_eq!(log.final_stock, 7);
        assert_eq!(log.product_name, "Pão");
        assert_eq!(store.stock_of(&scope, product), 7);
    }

    #[tokio::test]
    async fn stock_may_go_negative() {
        let scope = test_scope();
        let mut store = MemoryStore::default();
        let product = store.add_product(&scope, "Leite", 1);

        apply_stock_change(&mut store, &scope, &change(product, -4, StockLogType::Out), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(store.stock_of(&scope, product), -3);
    }

    #[tokio::test]
    async fn unknown_or_foreign_products_are_skipped() {
        let scope = test_scope();
        let other = test_scope();
        let mut store = MemoryStore::default();
        let foreign = store.add_product(&other, "Café", 5);

        let result = apply_stock_change(&mut store, &scope, &change(foreign, -1, StockLogType::Sale), Uuid::new_v4())
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(store.logs.is_empty());
        assert_eq!(store.stock_of(&other, foreign), 5);
    }

    #[tokio::test]
    async fn replaying_the_ledger_reproduces_stock() {
        let scope = test_scope();
        let mut store = MemoryStore::default();
        let product = store.add_product(&scope, "Açúcar", 0);
        let user = Uuid::new_v4();

        let moves = [
            change(product, 12, StockLogType::In),
            change(product, -3, StockLogType::Sale),
            change(product, 2, StockLogType::Return),
            change(product, -5, StockLogType::Out),
            change(product, 1, StockLogType::Adjustment),
        ];
        apply_stock_changes(&mut store, &scope, &moves, user).await.unwrap();

        let logs = store.logs_for(product);
        assert_eq!(logs.len(), moves.len());
        assert_eq!(replay_stock(0, &logs), store.stock_of(&scope, product));
        assert_eq!(logs.last().map(|l| l.final_stock), Some(7));
    }
}
