// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, inventory_repo::NewProduct},
    models::inventory::{
        InventoryCategory, Kardex, Movement, MovementDirection, MovementMetadata, Period,
        PeriodClosing, PriceSpec, Product, QuantitySpec,
    },
    services::ledger,
};

/// Dados de cadastro vindos do handler. Sem `code`, o código é gerado.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub code: Option<String>,
    pub name: String,
    pub category: InventoryCategory,
    pub period: Period,
    pub unit_of_measure: String,
    pub unit_price: Option<Decimal>,
    pub opening_balance: i64,
    pub reorder_threshold: i64,
}

#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub name: String,
    pub unit_of_measure: String,
    pub unit_price: Option<Decimal>,
    pub reorder_threshold: i64,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    // --- PRODUTOS ---

    pub async fn create_product<'e, E>(&self, executor: E, draft: &ProductDraft) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if draft.opening_balance < 0 || draft.reorder_threshold < 0 {
            return Err(AppError::BusinessRule(
                "Saldo inicial y punto de reorden no pueden ser negativos.".into(),
            ));
        }
        if draft.opening_balance > ledger::MAX_QUANTITY || draft.reorder_threshold > ledger::MAX_QUANTITY {
            return Err(AppError::BusinessRule("Cantidad fuera de rango.".into()));
        }
        let unit_price = draft.unit_price.map(ledger::check_price).transpose()?;

        let period = draft.period.to_string();
        let mut tx = executor.begin().await?;

        // Segunda tentativa recalcula o código depois de um conflito.
        for attempt in 0..2 {
            let code = match &draft.code {
                Some(code) => code.trim().to_uppercase(),
                None => {
                    let codes = self.inventory_repo
                        .codes_in_period(&mut *tx, draft.category, &period)
                        .await?;
                    ledger::next_code(draft.category, &codes)
                }
            };

            let new_product = NewProduct {
                code: &code,
                name: draft.name.trim(),
                category: draft.category,
                period: &period,
                unit_of_measure: draft.unit_of_measure.trim(),
                unit_price,
                opening_balance: draft.opening_balance,
                reorder_threshold: draft.reorder_threshold,
            };

            // Savepoint: o erro de unicidade não pode abortar a transação externa.
            let mut savepoint = Acquire::begin(&mut *tx).await?;
            match self.inventory_repo.insert_product(&mut *savepoint, &new_product).await {
                Ok(product) => {
                    savepoint.commit().await?;
                    tx.commit().await?;
                    tracing::info!(code = %product.code, period = %product.period, "Produto cadastrado");
                    return Ok(product);
                }
                Err(AppError::ProductCodeConflict(code)) if draft.code.is_none() && attempt == 0 => {
                    savepoint.rollback().await?;
                    tracing::warn!(%code, "Conflito ao gerar código; tentando de novo");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::ProductCodeConflict(draft.category.code_prefix().to_string()))
    }

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        category: Option<InventoryCategory>,
        period: Option<Period>,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let period = period.map(|p| p.to_string());
        self.inventory_repo
            .list_products(executor, category, period.as_deref())
            .await
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo
            .find_product(executor, id)
            .await?
            .ok_or(AppError::NotFound("Producto"))
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !(0..=ledger::MAX_QUANTITY).contains(&changes.reorder_threshold) {
            return Err(AppError::BusinessRule("Punto de reorden fuera de rango.".into()));
        }
        let unit_price = changes.unit_price.map(ledger::check_price).transpose()?;

        let mut tx = executor.begin().await?;

        let product = self.inventory_repo
            .find_product_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Producto"))?;

        if product.is_closed {
            return Err(AppError::PeriodClosed(product.period));
        }

        let updated = self.inventory_repo
            .update_product(
                &mut *tx,
                id,
                changes.name.trim(),
                changes.unit_of_measure.trim(),
                unit_price,
                changes.reorder_threshold,
                changes.is_active,
            )
            .await?
            .ok_or(AppError::NotFound("Producto"))?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn list_low_stock<'e, E>(&self, executor: E, period: Period) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = self.list_products(executor, None, Some(period)).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.is_active && ledger::is_below_reorder(p))
            .collect())
    }

    // --- MOVIMENTAÇÕES ---

    /// Grava o movimento com o produto travado. Não mexe em `stock_actual`.
    async fn record_movement(
        &self,
        conn: &mut PgConnection,
        product_id: Uuid,
        direction: MovementDirection,
        quantity: QuantitySpec,
        price: Option<PriceSpec>,
        metadata: MovementMetadata,
    ) -> Result<Movement, AppError> {
        let product = self.inventory_repo
            .find_product_for_update(&mut *conn, product_id)
            .await?
            .ok_or(AppError::NotFound("Producto"))?;

        if product.is_closed {
            return Err(AppError::PeriodClosed(product.period));
        }
        if !product.is_active {
            return Err(AppError::BusinessRule(format!(
                "El producto {} está inactivo.",
                product.code
            )));
        }

        let movement = ledger::build_movement(direction, quantity, price, metadata)?;
        ledger::validate_pricing(product.category, &movement)?;

        tracing::debug!(
            product = %product.code,
            value = ?ledger::new_movement_value(&movement),
            "Valor da movimentação"
        );

        self.inventory_repo.insert_movement(&mut *conn, product_id, &movement).await
    }

    // Saldo = abertura + entradas - saídas, sempre a partir do livro-razão.
    async fn write_balance(&self, conn: &mut PgConnection, product: &Product) -> Result<Product, AppError> {
        let movements = self.inventory_repo.list_movements(&mut *conn, product.id).await?;
        let balance = ledger::closing_balance(product.opening_balance, &movements)?;
        self.inventory_repo.set_stock_actual(&mut *conn, product.id, balance).await
    }

    /// Movimento + recálculo do saldo na mesma transação.
    #[allow(clippy::too_many_arguments)]
    pub async fn register_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        direction: MovementDirection,
        quantity: QuantitySpec,
        price: Option<PriceSpec>,
        metadata: MovementMetadata,
    ) -> Result<(Movement, Product), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let movement = self
            .record_movement(&mut *tx, product_id, direction, quantity, price, metadata)
            .await?;

        let product = self.inventory_repo
            .find_product(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("Producto"))?;
        let product = self.write_balance(&mut *tx, &product).await?;

        tx.commit().await?;

        tracing::info!(
            product = %product.code,
            direction = ?movement.direction,
            quantity = movement.quantity,
            balance = product.stock_actual,
            "Movimentação registrada"
        );

        if ledger::is_below_reorder(&product) {
            tracing::warn!(product = %product.code, balance = product.stock_actual, "Estoque abaixo do ponto de reposição");
        }

        Ok((movement, product))
    }

    pub async fn recompute_balance<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self.inventory_repo
            .find_product_for_update(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("Producto"))?;
        let product = self.write_balance(&mut *tx, &product).await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn kardex<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Kardex, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self.inventory_repo
            .find_product(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("Producto"))?;
        let movements = self.inventory_repo.list_movements(&mut *tx, product_id).await?;

        tx.commit().await?;

        Ok(Kardex {
            totals: ledger::totals(&movements)?,
            closing_balance: ledger::closing_balance(product.opening_balance, &movements)?,
            lines: ledger::kardex(product.opening_balance, &movements)?,
            product,
        })
    }

    // --- FECHAMENTO DE PERÍODO ---

    /// Recalcula e fecha o período; abre o seguinte com o saldo final como abertura.
    /// Pode ser repetido: produtos que já existem no período seguinte não são duplicados.
    pub async fn close_period<'e, E>(&self, executor: E, period: Period) -> Result<PeriodClosing, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let closed_key = period.to_string();
        let next = period.next();
        let next_key = next.to_string();

        let mut tx = executor.begin().await?;

        let products = self.inventory_repo
            .list_products(&mut *tx, None, Some(&closed_key))
            .await?;

        let mut balances = Vec::with_capacity(products.len());
        for product in &products {
            let locked = self.inventory_repo
                .find_product_for_update(&mut *tx, product.id)
                .await?
                .ok_or(AppError::NotFound("Producto"))?;
            balances.push(self.write_balance(&mut *tx, &locked).await?);
        }

        let closed_products = self.inventory_repo.close_period(&mut *tx, &closed_key).await?;

        let mut opened_products = Vec::new();
        for product in balances.iter().filter(|p| p.is_active) {
            let carried = NewProduct {
                code: &product.code,
                name: &product.name,
                category: product.category,
                period: &next_key,
                unit_of_measure: &product.unit_of_measure,
                unit_price: product.unit_price,
                opening_balance: product.stock_actual,
                reorder_threshold: product.reorder_threshold,
            };
            if let Some(opened) = self.inventory_repo.insert_product_if_absent(&mut *tx, &carried).await? {
                opened_products.push(opened);
            }
        }

        tx.commit().await?;

        tracing::info!(
            period = %closed_key,
            closed = closed_products,
            opened = opened_products.len(),
            "Período fechado"
        );

        Ok(PeriodClosing {
            closed_period: period,
            closed_products: closed_products as usize,
            opened_period: next,
            opened_products,
        })
    }
}

// Testes contra um Postgres real: `DATABASE_URL=... cargo test -- --ignored`.
// O `sqlx::test` cria um banco novo por teste e aplica as migrations.
#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn service(pool: &PgPool) -> InventoryService {
        InventoryService::new(InventoryRepository::new(pool.clone()))
    }

    fn september() -> Period {
        Period::new(2025, 9).unwrap()
    }

    fn draft(category: InventoryCategory, code: Option<&str>, opening_balance: i64) -> ProductDraft {
        ProductDraft {
            code: code.map(str::to_string),
            name: "Producto de prueba".into(),
            category,
            period: september(),
            unit_of_measure: "UND".into(),
            unit_price: None,
            opening_balance,
            reorder_threshold: 0,
        }
    }

    fn units(units: i64) -> QuantitySpec {
        QuantitySpec::Units { units }
    }

    async fn movement_count(pool: &PgPool, product_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movements WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn closing_carries_negative_stock_forward(pool: PgPool) {
        let svc = service(&pool);
        let product = svc.create_product(&pool, &draft(InventoryCategory::Aseo, None, 0)).await.unwrap();

        let (_, after_exit) = svc
            .register_movement(&pool, product.id, MovementDirection::Exit, units(5), None, MovementMetadata::default())
            .await
            .unwrap();
        assert_eq!(after_exit.stock_actual, -5);

        let closing = svc.close_period(&pool, september()).await.unwrap();
        assert_eq!(closing.closed_products, 1);
        assert_eq!(closing.opened_products.len(), 1);
        assert_eq!(closing.opened_products[0].opening_balance, -5);
        assert_eq!(closing.opened_products[0].stock_actual, -5);
        assert_eq!(closing.opened_products[0].period, "2025-10");
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn closed_period_rejects_movements_and_updates(pool: PgPool) {
        let svc = service(&pool);
        let product = svc.create_product(&pool, &draft(InventoryCategory::Papeleria, None, 4)).await.unwrap();
        svc.close_period(&pool, september()).await.unwrap();

        let movement = svc
            .register_movement(&pool, product.id, MovementDirection::Entry, units(1), None, MovementMetadata::default())
            .await;
        assert!(matches!(movement, Err(AppError::PeriodClosed(_))));
        assert_eq!(movement_count(&pool, product.id).await, 0);

        let changes = ProductChanges {
            name: "Otro nombre".into(),
            unit_of_measure: "UND".into(),
            unit_price: None,
            reorder_threshold: 0,
            is_active: true,
        };
        let update = svc.update_product(&pool, product.id, &changes).await;
        assert!(matches!(update, Err(AppError::PeriodClosed(_))));
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn inactive_product_rejects_movements(pool: PgPool) {
        let svc = service(&pool);
        let product = svc.create_product(&pool, &draft(InventoryCategory::Cafeteria, None, 2)).await.unwrap();
        let changes = ProductChanges {
            name: product.name.clone(),
            unit_of_measure: product.unit_of_measure.clone(),
            unit_price: None,
            reorder_threshold: 0,
            is_active: false,
        };
        svc.update_product(&pool, product.id, &changes).await.unwrap();

        let movement = svc
            .register_movement(&pool, product.id, MovementDirection::Exit, units(1), None, MovementMetadata::default())
            .await;
        assert!(matches!(movement, Err(AppError::BusinessRule(_))));
        assert_eq!(movement_count(&pool, product.id).await, 0);
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn rejected_movement_leaves_no_trace(pool: PgPool) {
        let svc = service(&pool);
        let product = svc.create_product(&pool, &draft(InventoryCategory::Quimicos, None, 10)).await.unwrap();

        // Entrada de químico sem preço.
        let movement = svc
            .register_movement(&pool, product.id, MovementDirection::Entry, units(3), None, MovementMetadata::default())
            .await;
        assert!(matches!(movement, Err(AppError::BusinessRule(_))));

        let too_expensive = svc
            .register_movement(
                &pool,
                product.id,
                MovementDirection::Entry,
                units(1),
                Some(PriceSpec::PerUnit(Decimal::from(1_000_000_000_000i64))),
                MovementMetadata::default(),
            )
            .await;
        assert!(matches!(too_expensive, Err(AppError::BusinessRule(_))));

        assert_eq!(movement_count(&pool, product.id).await, 0);
        let reloaded = svc.get_product(&pool, product.id).await.unwrap();
        assert_eq!(reloaded.stock_actual, 10);
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn explicit_duplicate_code_conflicts_and_generated_code_skips_it(pool: PgPool) {
        let svc = service(&pool);
        let first = svc.create_product(&pool, &draft(InventoryCategory::Aseo, Some("ase-001"), 0)).await.unwrap();
        assert_eq!(first.code, "ASE-001");

        let duplicate = svc.create_product(&pool, &draft(InventoryCategory::Aseo, Some("ASE-001"), 0)).await;
        assert!(matches!(duplicate, Err(AppError::ProductCodeConflict(_))));

        let generated = svc.create_product(&pool, &draft(InventoryCategory::Aseo, None, 0)).await.unwrap();
        assert_eq!(generated.code, "ASE-002");
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn product_prices_are_bounded(pool: PgPool) {
        let svc = service(&pool);
        let mut expensive = draft(InventoryCategory::Herramientas, None, 0);
        expensive.unit_price = Some(Decimal::from(1_000_000_000_000i64));
        let created = svc.create_product(&pool, &expensive).await;
        assert!(matches!(created, Err(AppError::BusinessRule(_))));

        expensive.unit_price = Some(ledger::max_price());
        let created = svc.create_product(&pool, &expensive).await.unwrap();
        assert_eq!(created.unit_price, Some(ledger::max_price()));
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn recompute_is_idempotent(pool: PgPool) {
        let svc = service(&pool);
        let product = svc.create_product(&pool, &draft(InventoryCategory::Papeleria, None, 3)).await.unwrap();
        for (direction, quantity) in [
            (MovementDirection::Entry, units(10)),
            (MovementDirection::Exit, units(4)),
            (MovementDirection::Entry, QuantitySpec::Packs { packs: 2, content_per_pack: 6 }),
        ] {
            svc.register_movement(&pool, product.id, direction, quantity, None, MovementMetadata::default())
                .await
                .unwrap();
        }

        let once = svc.recompute_balance(&pool, product.id).await.unwrap();
        let twice = svc.recompute_balance(&pool, product.id).await.unwrap();
        assert_eq!(once.stock_actual, 3 + 10 - 4 + 12);
        assert_eq!(once.stock_actual, twice.stock_actual);

        let kardex = svc.kardex(&pool, product.id).await.unwrap();
        assert_eq!(kardex.closing_balance, once.stock_actual);
        assert_eq!(kardex.lines.len(), 3);
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn closing_twice_does_not_duplicate_next_period(pool: PgPool) {
        let svc = service(&pool);
        svc.create_product(&pool, &draft(InventoryCategory::Aseo, None, 7)).await.unwrap();
        let retired = svc.create_product(&pool, &draft(InventoryCategory::Aseo, None, 1)).await.unwrap();
        let changes = ProductChanges {
            name: retired.name.clone(),
            unit_of_measure: retired.unit_of_measure.clone(),
            unit_price: None,
            reorder_threshold: 0,
            is_active: false,
        };
        svc.update_product(&pool, retired.id, &changes).await.unwrap();

        let first = svc.close_period(&pool, september()).await.unwrap();
        assert_eq!(first.opened_products.len(), 1);
        assert_eq!(first.opened_products[0].opening_balance, 7);

        let second = svc.close_period(&pool, september()).await.unwrap();
        assert!(second.opened_products.is_empty());

        let october = svc
            .list_products(&pool, None, Some(september().next()))
            .await
            .unwrap();
        assert_eq!(october.len(), 1);
    }
}
