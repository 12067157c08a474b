// src/models/inventory.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- 1. Categorias (conjunto fixo) ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "inventory_category", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum InventoryCategory {
    Quimicos,     // Vira "QUIMICOS"
    Aseo,
    Papeleria,
    Cafeteria,
    Herramientas,
}

impl InventoryCategory {
    /// Prefixo de 3 letras usado nos códigos (`QUI-001`).
    pub fn code_prefix(self) -> &'static str {
        match self {
            InventoryCategory::Quimicos => "QUI",
            InventoryCategory::Aseo => "ASE",
            InventoryCategory::Papeleria => "PAP",
            InventoryCategory::Cafeteria => "CAF",
            InventoryCategory::Herramientas => "HER",
        }
    }

    /// Categorias valorizadas: toda entrada precisa de preço.
    pub fn requires_price(self) -> bool {
        matches!(self, InventoryCategory::Quimicos | InventoryCategory::Herramientas)
    }
}

// --- 2. Período (ano-mês) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) || !(1900..=9999).contains(&year) {
            return Err(AppError::InvalidPeriod(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidPeriod(raw.to_string());

        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = AppError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

// --- 3. Produto ---
// Uma instância por (código, categoria, período).
// `stock_actual` é só cache: quem manda é o livro-razão (ver services::ledger).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "QUI-007")]
    pub code: String,
    #[schema(example = "Hipoclorito de sodio 5%")]
    pub name: String,
    pub category: InventoryCategory,
    #[schema(example = "2025-09")]
    pub period: String,
    #[schema(example = "GALON")]
    pub unit_of_measure: String,
    #[schema(example = "18500.00")]
    pub unit_price: Option<Decimal>,
    pub opening_balance: i64,
    pub reorder_threshold: i64,
    pub stock_actual: i64,
    pub is_active: bool,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 4. Movimentações ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "movement_direction", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementDirection {
    Entry, // Vira "ENTRY"
    Exit,  // Vira "EXIT"
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub direction: MovementDirection,
    pub quantity: i64,
    pub pack_count: Option<i64>,
    pub content_per_pack: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub price_per_pack: Option<Decimal>,
    pub reference: Option<String>,
    pub responsible: Option<String>,
    pub supplier: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    pub fn is_pack_mode(&self) -> bool {
        self.pack_count.is_some() && self.content_per_pack.is_some()
    }

    /// Pacotes × conteúdo no modo pacote; senão a quantidade bruta.
    /// `None` quando pacotes × conteúdo não cabe em `i64`.
    pub fn effective_quantity(&self) -> Option<i64> {
        match (self.pack_count, self.content_per_pack) {
            (Some(packs), Some(content)) => packs.checked_mul(content),
            _ => Some(self.quantity),
        }
    }

    /// Pacotes × preço do pacote quando ambos existem; senão quantidade × preço unitário; senão zero.
    pub fn effective_value(&self) -> Option<Decimal> {
        if self.is_pack_mode() {
            if let (Some(packs), Some(price)) = (self.pack_count, self.price_per_pack) {
                return Decimal::from(packs).checked_mul(price);
            }
        }
        match self.unit_price {
            Some(price) => Decimal::from(self.effective_quantity()?).checked_mul(price),
            None => Some(Decimal::ZERO),
        }
    }
}

/// Como a quantidade foi informada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum QuantitySpec {
    Packs {
        packs: i64,
        #[serde(rename = "contentPerPack")]
        content_per_pack: i64,
    },
    Units { units: i64 },
}

impl QuantitySpec {
    pub fn effective(self) -> Option<i64> {
        match self {
            QuantitySpec::Units { units } => Some(units),
            QuantitySpec::Packs { packs, content_per_pack } => packs.checked_mul(content_per_pack),
        }
    }
}

/// Preço da entrada, por unidade ou por pacote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "mode", content = "amount")]
pub enum PriceSpec {
    PerUnit(Decimal),
    PerPack(Decimal),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementMetadata {
    pub reference: Option<String>,
    pub responsible: Option<String>,
    pub supplier: Option<String>,
    pub reason: Option<String>,
}

/// Movimento validado, pronto para ser gravado.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    pub direction: MovementDirection,
    pub quantity: i64,
    pub pack_count: Option<i64>,
    pub content_per_pack: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub price_per_pack: Option<Decimal>,
    pub metadata: MovementMetadata,
}

/// Linha do kardex: movimento + saldo corrente depois dele.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KardexLine {
    pub movement_id: Uuid,
    pub date: DateTime<Utc>,
    pub direction: MovementDirection,
    pub quantity: i64,
    pub value: Decimal,
    pub balance: i64,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub entries: i64,
    pub exits: i64,
    pub entry_value: Decimal,
    pub exit_value: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Kardex {
    pub product: Product,
    pub totals: LedgerTotals,
    pub closing_balance: i64,
    pub lines: Vec<KardexLine>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodClosing {
    #[schema(value_type = String, example = "2025-09")]
    pub closed_period: Period,
    pub closed_products: usize,
    #[schema(value_type = String, example = "2025-10")]
    pub opened_period: Period,
    pub opened_products: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_periods() {
        let p: Period = "2025-09".parse().unwrap();
        assert_eq!(p.to_string(), "2025-09");
        assert_eq!(p.next().to_string(), "2025-10");
        assert_eq!("2025-12".parse::<Period>().unwrap().next().to_string(), "2026-01");
    }

    #[test]
    fn rejects_malformed_periods() {
        for raw in ["2025-13", "2025-00", "25-09", "2025/09", "2025-9", ""] {
            assert!(raw.parse::<Period>().is_err(), "{raw} deveria falhar");
        }
    }

    #[test]
    fn category_prefixes() {
        assert_eq!(InventoryCategory::Quimicos.code_prefix(), "QUI");
        assert_eq!(InventoryCategory::Herramientas.code_prefix(), "HER");
        assert!(InventoryCategory::Quimicos.requires_price());
        assert!(!InventoryCategory::Papeleria.requires_price());
    }

    #[test]
    fn quantity_spec_deserializes_both_modes() {
        let units: QuantitySpec = serde_json::from_str(r#"{"units": 12}"#).unwrap();
        assert_eq!(units, QuantitySpec::Units { units: 12 });

        let packs: QuantitySpec =
            serde_json::from_str(r#"{"packs": 3, "contentPerPack": 24}"#).unwrap();
        assert_eq!(packs.effective(), Some(72));
        assert_eq!(QuantitySpec::Packs { packs: i64::MAX, content_per_pack: 2 }.effective(), None);
    }
}
