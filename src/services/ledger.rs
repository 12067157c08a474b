// src/services/ledger.rs
//
// Aritmética do livro-razão de inventário. Funções livres sobre coleções de
// movimentos: nada aqui toca no banco.

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::inventory::{
        InventoryCategory, KardexLine, LedgerTotals, Movement, MovementDirection,
        MovementMetadata, NewMovement, PriceSpec, Product, QuantitySpec,
    },
};

/// Teto de unidades por movimento, por pacote e para o saldo inicial.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Maior preço que cabe em `NUMERIC(14, 2)`.
pub fn max_price() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

fn out_of_range() -> AppError {
    AppError::BusinessRule("Cantidad fuera de rango.".into())
}

/// Preço arredondado a centavos; negativo ou acima do teto é rejeitado.
pub fn check_price(price: Decimal) -> Result<Decimal, AppError> {
    let rounded = price.round_dp(2);
    if rounded.is_sign_negative() {
        return Err(AppError::BusinessRule("El precio no puede ser negativo.".into()));
    }
    if rounded > max_price() {
        return Err(AppError::BusinessRule("Precio fuera de rango.".into()));
    }
    Ok(rounded)
}

/// Entradas, saídas e seus valores. A ordem dos movimentos não importa.
pub fn totals(movements: &[Movement]) -> Result<LedgerTotals, AppError> {
    movements.iter().try_fold(LedgerTotals::default(), |mut acc, m| {
        let quantity = m.effective_quantity().ok_or_else(out_of_range)?;
        let value = m.effective_value().ok_or_else(out_of_range)?;
        match m.direction {
            MovementDirection::Entry => {
                acc.entries = acc.entries.checked_add(quantity).ok_or_else(out_of_range)?;
                acc.entry_value = acc.entry_value.checked_add(value).ok_or_else(out_of_range)?;
            }
            MovementDirection::Exit => {
                acc.exits = acc.exits.checked_add(quantity).ok_or_else(out_of_range)?;
                acc.exit_value = acc.exit_value.checked_add(value).ok_or_else(out_of_range)?;
            }
        }
        Ok(acc)
    })
}

/// Saldo inicial + entradas − saídas.
pub fn closing_balance(opening_balance: i64, movements: &[Movement]) -> Result<i64, AppError> {
    let t = totals(movements)?;
    opening_balance
        .checked_add(t.entries)
        .and_then(|b| b.checked_sub(t.exits))
        .ok_or_else(out_of_range)
}

pub fn is_below_reorder(product: &Product) -> bool {
    product.reorder_threshold > 0 && product.stock_actual < product.reorder_threshold
}

/// Próximo código sequencial (`QUI-008`) a partir dos códigos já usados no
/// mesmo (categoria, período). Só contam códigos com o prefixo da categoria;
/// sufixos não numéricos são ignorados.
pub fn next_code(category: InventoryCategory, existing_codes: &[String]) -> String {
    let prefix = category.code_prefix();
    let highest = existing_codes
        .iter()
        .filter_map(|code| code.strip_prefix(prefix)?.strip_prefix('-'))
        .filter_map(|suffix| suffix.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{}-{:03}", prefix, highest + 1)
}

/// Movimentos em ordem cronológica com o saldo corrente após cada um.
pub fn kardex(opening_balance: i64, movements: &[Movement]) -> Result<Vec<KardexLine>, AppError> {
    let mut ordered: Vec<&Movement> = movements.iter().collect();
    ordered.sort_by_key(|m| m.created_at);

    let mut balance = opening_balance;
    ordered
        .into_iter()
        .map(|m| {
            let quantity = m.effective_quantity().ok_or_else(out_of_range)?;
            balance = match m.direction {
                MovementDirection::Entry => balance.checked_add(quantity),
                MovementDirection::Exit => balance.checked_sub(quantity),
            }
            .ok_or_else(out_of_range)?;

            Ok(KardexLine {
                movement_id: m.id,
                date: m.created_at,
                direction: m.direction,
                quantity,
                value: m.effective_value().ok_or_else(out_of_range)?,
                balance,
                reference: m.reference.clone(),
            })
        })
        .collect()
}

/// Monta o movimento a partir do que o usuário informou.
/// Quantidades negativas ou acima de `MAX_QUANTITY`, e preço por pacote sem
/// pacotes, são rejeitados. Em saídas o preço é descartado.
pub fn build_movement(
    direction: MovementDirection,
    quantity: QuantitySpec,
    price: Option<PriceSpec>,
    metadata: MovementMetadata,
) -> Result<NewMovement, AppError> {
    let (pack_count, content_per_pack) = match quantity {
        QuantitySpec::Units { units } => {
            if units < 0 {
                return Err(AppError::BusinessRule("La cantidad no puede ser negativa.".into()));
            }
            (None, None)
        }
        QuantitySpec::Packs { packs, content_per_pack } => {
            if packs < 0 || content_per_pack < 0 {
                return Err(AppError::BusinessRule(
                    "Paquetes y contenido por paquete no pueden ser negativos.".into(),
                ));
            }
            if packs > MAX_QUANTITY || content_per_pack > MAX_QUANTITY {
                return Err(out_of_range());
            }
            (Some(packs), Some(content_per_pack))
        }
    };

    let effective = quantity.effective().ok_or_else(out_of_range)?;
    if effective > MAX_QUANTITY {
        return Err(out_of_range());
    }

    let (unit_price, price_per_pack) = match (direction, price) {
        (MovementDirection::Exit, _) | (_, None) => (None, None),
        (MovementDirection::Entry, Some(PriceSpec::PerUnit(p))) => (Some(check_price(p)?), None),
        (MovementDirection::Entry, Some(PriceSpec::PerPack(p))) => {
            if pack_count.is_none() {
                return Err(AppError::BusinessRule(
                    "El precio por paquete requiere cantidad en paquetes.".into(),
                ));
            }
            (None, Some(check_price(p)?))
        }
    };

    Ok(NewMovement {
        direction,
        quantity: effective,
        pack_count,
        content_per_pack,
        unit_price,
        price_per_pack,
        metadata,
    })
}

/// Entradas em categorias valorizadas precisam de preço.
pub fn validate_pricing(category: InventoryCategory, movement: &NewMovement) -> Result<(), AppError> {
    let priced = movement.unit_price.is_some() || movement.price_per_pack.is_some();
    if movement.direction == MovementDirection::Entry && category.requires_price() && !priced {
        return Err(AppError::BusinessRule(format!(
            "Las entradas de {:?} requieren precio unitario o por paquete.",
            category
        )));
    }
    Ok(())
}

/// Valor de um movimento ainda não gravado, pela mesma regra de `Movement::effective_value`.
pub fn new_movement_value(movement: &NewMovement) -> Option<Decimal> {
    if let (Some(packs), Some(price)) = (movement.pack_count, movement.price_per_pack) {
        return Decimal::from(packs).checked_mul(price);
    }
    match movement.unit_price {
        Some(p) => Decimal::from(movement.quantity).checked_mul(p),
        None => Some(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn movement(direction: MovementDirection, quantity: i64, minute: i64) -> Movement {
        Movement {
            id: Uuid::new_v4(),
            product_id: Uuid::nil(),
            direction,
            quantity,
            pack_count: None,
            content_per_pack: None,
            unit_price: None,
            price_per_pack: None,
            reference: None,
            responsible: None,
            supplier: None,
            reason: None,
            created_at: Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap() + Duration::minutes(minute),
        }
    }

    fn packs(direction: MovementDirection, k: i64, c: i64, minute: i64) -> Movement {
        Movement {
            quantity: k * c,
            pack_count: Some(k),
            content_per_pack: Some(c),
            ..movement(direction, 0, minute)
        }
    }

    fn product(stock_actual: i64, reorder_threshold: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            code: "QUI-001".into(),
            name: "Hipoclorito".into(),
            category: InventoryCategory::Quimicos,
            period: "2025-09".into(),
            unit_of_measure: "GALON".into(),
            unit_price: None,
            opening_balance: 0,
            reorder_threshold,
            stock_actual,
            is_active: true,
            is_closed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn balance_is_opening_plus_entries_minus_exits() {
        let movements = vec![
            movement(MovementDirection::Entry, 10, 0),
            movement(MovementDirection::Exit, 4, 1),
            packs(MovementDirection::Entry, 2, 12, 2),
            movement(MovementDirection::Exit, 7, 3),
        ];
        assert_eq!(closing_balance(5, &movements).unwrap(), 5 + 10 + 24 - 4 - 7);
    }

    #[test]
    fn balance_does_not_depend_on_order() {
        let mut movements = vec![
            movement(MovementDirection::Entry, 30, 0),
            movement(MovementDirection::Exit, 12, 1),
            packs(MovementDirection::Exit, 3, 4, 2),
            movement(MovementDirection::Entry, 1, 3),
            packs(MovementDirection::Entry, 5, 6, 4),
        ];
        let expected = closing_balance(100, &movements).unwrap();

        movements.reverse();
        assert_eq!(closing_balance(100, &movements).unwrap(), expected);

        movements.rotate_left(2);
        assert_eq!(closing_balance(100, &movements).unwrap(), expected);
    }

    #[test]
    fn empty_ledger_keeps_opening_balance() {
        assert_eq!(closing_balance(42, &[]).unwrap(), 42);
        assert_eq!(totals(&[]).unwrap(), LedgerTotals::default());
    }

    #[test]
    fn pack_mode_equals_unit_mode() {
        for (k, c) in [(0, 0), (0, 5), (3, 0), (1, 1), (4, 25), (12, 6)] {
            let pack = packs(MovementDirection::Entry, k, c, 0);
            let unit = movement(MovementDirection::Entry, k * c, 0);
            assert_eq!(pack.effective_quantity(), unit.effective_quantity());

            let from_spec = QuantitySpec::Packs { packs: k, content_per_pack: c };
            assert_eq!(from_spec.effective(), QuantitySpec::Units { units: k * c }.effective());
        }
    }

    #[test]
    fn effective_value_rules() {
        let price = Decimal::from_str("2500.50").unwrap();

        let mut by_pack = packs(MovementDirection::Entry, 3, 10, 0);
        by_pack.price_per_pack = Some(price);
        assert_eq!(by_pack.effective_value(), Some(Decimal::from(3) * price));

        let mut by_unit = movement(MovementDirection::Entry, 4, 0);
        by_unit.unit_price = Some(price);
        assert_eq!(by_unit.effective_value(), Some(Decimal::from(4) * price));

        // modo pacote com preço unitário usa a quantidade efetiva
        let mut pack_unit_price = packs(MovementDirection::Entry, 2, 5, 0);
        pack_unit_price.unit_price = Some(Decimal::from(100));
        assert_eq!(pack_unit_price.effective_value(), Some(Decimal::from(1000)));

        assert_eq!(movement(MovementDirection::Exit, 9, 0).effective_value(), Some(Decimal::ZERO));
    }

    #[test]
    fn money_totals_do_not_drift() {
        let cents = Decimal::from_str("0.10").unwrap();
        let movements: Vec<Movement> = (0..1000)
            .map(|i| {
                let mut m = movement(MovementDirection::Entry, 1, i);
                m.unit_price = Some(cents);
                m
            })
            .collect();
        assert_eq!(totals(&movements).unwrap().entry_value, Decimal::from(100));
    }

    #[test]
    fn next_code_increments_highest_suffix() {
        let existing = vec!["QUI-003".to_string(), "QUI-007".to_string(), "QUI-001".to_string()];
        assert_eq!(next_code(InventoryCategory::Quimicos, &existing), "QUI-008");
    }

    #[test]
    fn next_code_starts_at_one() {
        assert_eq!(next_code(InventoryCategory::Quimicos, &[]), "QUI-001");
        assert_eq!(next_code(InventoryCategory::Aseo, &["ASE-XYZ".to_string()]), "ASE-001");
    }

    #[test]
    fn next_code_handles_wide_sequences() {
        let existing = vec!["PAP-999".to_string()];
        assert_eq!(next_code(InventoryCategory::Papeleria, &existing), "PAP-1000");
    }

    #[test]
    fn reorder_threshold() {
        assert!(is_below_reorder(&product(3, 5)));
        assert!(!is_below_reorder(&product(5, 5)));
        assert!(!is_below_reorder(&product(0, 0)));
        assert!(is_below_reorder(&product(-2, 1)));
    }

    #[test]
    fn kardex_runs_in_chronological_order() {
        let movements = vec![
            movement(MovementDirection::Exit, 3, 10),
            movement(MovementDirection::Entry, 10, 0),
            packs(MovementDirection::Entry, 2, 5, 5),
        ];
        let lines = kardex(1, &movements).unwrap();

        let balances: Vec<i64> = lines.iter().map(|l| l.balance).collect();
        assert_eq!(balances, vec![11, 21, 18]);
        assert_eq!(lines.last().unwrap().balance, closing_balance(1, &movements).unwrap());
    }

    #[test]
    fn build_movement_drops_exit_prices() {
        let m = build_movement(
            MovementDirection::Exit,
            QuantitySpec::Units { units: 5 },
            Some(PriceSpec::PerUnit(Decimal::from(10))),
            MovementMetadata::default(),
        )
        .unwrap();
        assert_eq!(m.unit_price, None);
        assert_eq!(m.quantity, 5);
    }

    #[test]
    fn build_movement_rejects_malformed_specs() {
        let negative = build_movement(
            MovementDirection::Entry,
            QuantitySpec::Units { units: -1 },
            None,
            MovementMetadata::default(),
        );
        assert!(negative.is_err());

        let pack_price_without_packs = build_movement(
            MovementDirection::Entry,
            QuantitySpec::Units { units: 3 },
            Some(PriceSpec::PerPack(Decimal::from(10))),
            MovementMetadata::default(),
        );
        assert!(pack_price_without_packs.is_err());
    }

    #[test]
    fn entry_without_price_only_fails_for_priced_categories() {
        let m = build_movement(
            MovementDirection::Entry,
            QuantitySpec::Packs { packs: 2, content_per_pack: 12 },
            None,
            MovementMetadata::default(),
        )
        .unwrap();

        assert_eq!(m.quantity, 24);
        assert_eq!(new_movement_value(&m), Some(Decimal::ZERO));
        assert!(validate_pricing(InventoryCategory::Quimicos, &m).is_err());
        assert!(validate_pricing(InventoryCategory::Papeleria, &m).is_ok());
    }

    #[test]
    fn new_movement_value_matches_stored_rule() {
        let m = build_movement(
            MovementDirection::Entry,
            QuantitySpec::Packs { packs: 3, content_per_pack: 20 },
            Some(PriceSpec::PerPack(Decimal::from_str("45000").unwrap())),
            MovementMetadata::default(),
        )
        .unwrap();
        assert_eq!(new_movement_value(&m), Some(Decimal::from(135_000)));
    }

    #[test]
    fn next_code_ignores_codes_from_other_prefixes() {
        let existing = vec!["X-900".to_string(), "QUI-002".to_string(), "QUIX-050".to_string()];
        assert_eq!(next_code(InventoryCategory::Quimicos, &existing), "QUI-003");
        assert_eq!(next_code(InventoryCategory::Aseo, &existing), "ASE-001");
    }

    #[test]
    fn build_movement_rejects_quantities_over_the_limit() {
        let huge = build_movement(
            MovementDirection::Entry,
            QuantitySpec::Units { units: i64::MAX },
            None,
            MovementMetadata::default(),
        );
        assert!(matches!(huge, Err(AppError::BusinessRule(_))));

        let many_empty_packs = build_movement(
            MovementDirection::Entry,
            QuantitySpec::Packs { packs: i64::MAX, content_per_pack: 0 },
            None,
            MovementMetadata::default(),
        );
        assert!(many_empty_packs.is_err());

        let at_limit = build_movement(
            MovementDirection::Exit,
            QuantitySpec::Units { units: MAX_QUANTITY },
            None,
            MovementMetadata::default(),
        )
        .unwrap();
        assert_eq!(at_limit.quantity, MAX_QUANTITY);
    }

    #[test]
    fn stored_movements_out_of_range_are_errors_not_panics() {
        let movements = vec![
            movement(MovementDirection::Entry, i64::MAX, 0),
            movement(MovementDirection::Entry, 1, 1),
        ];
        assert!(matches!(totals(&movements), Err(AppError::BusinessRule(_))));
        assert!(closing_balance(1, &movements).is_err());
        assert!(kardex(1, &movements).is_err());

        let below = vec![movement(MovementDirection::Exit, i64::MAX, 0)];
        assert!(closing_balance(-2, &below).is_err());

        let wide_packs = packs(MovementDirection::Entry, 0, 0, 0);
        let wide_packs = Movement { pack_count: Some(i64::MAX), content_per_pack: Some(2), ..wide_packs };
        assert_eq!(wide_packs.effective_quantity(), None);
        assert!(totals(&[wide_packs]).is_err());
    }

    #[test]
    fn prices_beyond_numeric_column_are_rejected() {
        assert_eq!(check_price(Decimal::from_str("18500.456").unwrap()).unwrap(), Decimal::from_str("18500.46").unwrap());
        assert!(check_price(max_price()).is_ok());
        assert!(check_price(Decimal::from(1_000_000_000_000i64)).is_err());
        assert!(check_price(Decimal::from(-1)).is_err());

        let too_expensive = build_movement(
            MovementDirection::Entry,
            QuantitySpec::Units { units: 1 },
            Some(PriceSpec::PerUnit(Decimal::from(1_000_000_000_000i64))),
            MovementMetadata::default(),
        );
        assert!(matches!(too_expensive, Err(AppError::BusinessRule(_))));
    }
}
