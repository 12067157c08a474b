// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::{db_utils::unique_violation, error::AppError},
    models::inventory::{InventoryCategory, Movement, NewMovement, Product},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

/// Dados de cadastro de um produto em um período.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub category: InventoryCategory,
    pub period: &'a str,
    pub unit_of_measure: &'a str,
    pub unit_price: Option<Decimal>,
    pub opening_balance: i64,
    pub reorder_threshold: i64,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura"
    // ---

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        category: Option<InventoryCategory>,
        period: Option<&str>,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::inventory_category IS NULL OR category = $1)
              AND ($2::TEXT IS NULL OR period = $2)
            ORDER BY period DESC, category ASC, code ASC
            "#,
        )
        .bind(category)
        .bind(period)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Trava a linha do produto até o fim da transação.
    pub async fn find_product_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Códigos já usados em (categoria, período).
    pub async fn codes_in_period<'e, E>(
        &self,
        executor: E,
        category: InventoryCategory,
        period: &str,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT code FROM products WHERE category = $1 AND period = $2",
        )
        .bind(category)
        .bind(period)
        .fetch_all(executor)
        .await?;
        Ok(codes)
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<Movement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, Movement>(
            "SELECT * FROM movements WHERE product_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(product_id)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn insert_product<'e, E>(
        &self,
        executor: E,
        product: &NewProduct<'_>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                code, name, category, period, unit_of_measure,
                unit_price, opening_balance, reorder_threshold, stock_actual
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7)
            RETURNING *
            "#,
        )
        .bind(product.code)
        .bind(product.name)
        .bind(product.category)
        .bind(product.period)
        .bind(product.unit_of_measure)
        .bind(product.unit_price)
        .bind(product.opening_balance)
        .bind(product.reorder_threshold)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                return AppError::ProductCodeConflict(product.code.to_string());
            }
            e.into()
        })
    }

    /// Abertura do período seguinte: não duplica se o produto já existir.
    pub async fn insert_product_if_absent<'e, E>(
        &self,
        executor: E,
        product: &NewProduct<'_>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                code, name, category, period, unit_of_measure,
                unit_price, opening_balance, reorder_threshold, stock_actual
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7)
            ON CONFLICT ON CONSTRAINT products_code_category_period_key DO NOTHING
            RETURNING *
            "#,
        )
        .bind(product.code)
        .bind(product.name)
        .bind(product.category)
        .bind(product.period)
        .bind(product.unit_of_measure)
        .bind(product.unit_price)
        .bind(product.opening_balance)
        .bind(product.reorder_threshold)
        .fetch_optional(executor)
        .await?;
        Ok(inserted)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        unit_of_measure: &str,
        unit_price: Option<Decimal>,
        reorder_threshold: i64,
        is_active: bool,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $2,
                unit_of_measure = $3,
                unit_price = $4,
                reorder_threshold = $5,
                is_active = $6,
                updated_at = NOW()
            WHERE id = $1 AND is_closed = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(unit_of_measure)
        .bind(unit_price)
        .bind(reorder_threshold)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Registra uma movimentação no livro-razão. Não mexe no saldo.
    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        movement: &NewMovement,
    ) -> Result<Movement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements (
                product_id, direction, quantity, pack_count, content_per_pack,
                unit_price, price_per_pack, reference, responsible, supplier, reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(movement.direction)
        .bind(movement.quantity)
        .bind(movement.pack_count)
        .bind(movement.content_per_pack)
        .bind(movement.unit_price)
        .bind(movement.price_per_pack)
        .bind(&movement.metadata.reference)
        .bind(&movement.metadata.responsible)
        .bind(&movement.metadata.supplier)
        .bind(&movement.metadata.reason)
        .fetch_one(executor)
        .await?;
        Ok(inserted)
    }

    /// Único ponto que escreve `stock_actual`.
    pub async fn set_stock_actual<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        balance: i64,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET stock_actual = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(product_id)
        .bind(balance)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn close_period<'e, E>(&self, executor: E, period: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE products SET is_closed = TRUE, updated_at = NOW() WHERE period = $1 AND is_closed = FALSE",
        )
        .bind(period)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
