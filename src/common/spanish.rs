// src/common/spanish.rs
//
// Conversores para a redação dos contratos: valor em letras e data por extenso.
// As tabelas são fixas: a redação precisa bater com os documentos já emitidos.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const UNIDADES: [&str; 10] = [
    "", "UNO", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE",
];

const DIEZ_A_DIECINUEVE: [&str; 10] = [
    "DIEZ", "ONCE", "DOCE", "TRECE", "CATORCE", "QUINCE",
    "DIECISEIS", "DIECISIETE", "DIECIOCHO", "DIECINUEVE",
];

const DECENAS: [&str; 10] = [
    "", "DIEZ", "VEINTE", "TREINTA", "CUARENTA", "CINCUENTA",
    "SESENTA", "SETENTA", "OCHENTA", "NOVENTA",
];

const CENTENAS: [&str; 10] = [
    "", "CIENTO", "DOSCIENTOS", "TRESCIENTOS", "CUATROCIENTOS", "QUINIENTOS",
    "SEISCIENTOS", "SETECIENTOS", "OCHOCIENTOS", "NOVECIENTOS",
];

const MESES: [&str; 12] = [
    "ENERO", "FEBRERO", "MARZO", "ABRIL", "MAYO", "JUNIO",
    "JULIO", "AGOSTO", "SEPTIEMBRE", "OCTUBRE", "NOVIEMBRE", "DICIEMBRE",
];

/// Texto usado quando o contrato não tem data de término.
pub const SIN_FECHA: &str = "INDEFINIDO";

// 0..=99
fn decenas(n: u64) -> String {
    let n = n as usize;
    match n {
        0..=9 => UNIDADES[n].to_string(),
        10..=19 => DIEZ_A_DIECINUEVE[n - 10].to_string(),
        _ => {
            let (d, u) = (n / 10, n % 10);
            if u == 0 {
                DECENAS[d].to_string()
            } else {
                format!("{} Y {}", DECENAS[d], UNIDADES[u])
            }
        }
    }
}

// 0..=999
fn centenas(n: u64) -> String {
    if n == 100 {
        return "CIEN".to_string();
    }

    let c = (n / 100) as usize;
    let resto = n % 100;

    let mut partes = Vec::with_capacity(2);
    if c > 0 {
        partes.push(CENTENAS[c].to_string());
    }
    if resto > 0 {
        partes.push(decenas(resto));
    }
    partes.join(" ")
}

// Sem o sufixo "PESOS". Para n == 0 devolve string vazia.
fn spell(n: u64) -> String {
    let millones = n / 1_000_000;
    let miles = (n / 1_000) % 1_000;
    let resto = n % 1_000;

    let mut partes = Vec::with_capacity(3);

    match millones {
        0 => {}
        1 => partes.push("UN MILLON".to_string()),
        m => partes.push(format!("{} MILLONES", spell(m))),
    }

    match miles {
        0 => {}
        1 => partes.push("MIL".to_string()),
        m => partes.push(format!("{} MIL", centenas(m))),
    }

    if resto > 0 {
        partes.push(centenas(resto));
    }

    partes.join(" ")
}

/// Valor inteiro em letras, no formato dos contratos: `1500000` ->
/// `"UN MILLON QUINIENTOS MIL PESOS"`.
pub fn amount_to_words(amount: u64) -> String {
    if amount == 0 {
        return "CERO PESOS".to_string();
    }

    let texto = spell(amount);

    // Milhões exatos levam "DE": "UN MILLON DE PESOS", "DOS MILLONES DE PESOS"
    if amount % 1_000_000 == 0 {
        format!("{} DE PESOS", texto)
    } else {
        format!("{} PESOS", texto)
    }
}

/// Mesma conversão para um valor decimal; os centavos são descartados.
pub fn decimal_to_words(amount: Decimal) -> String {
    let inteiro = amount.trunc().to_u64().unwrap_or(0);
    amount_to_words(inteiro)
}

/// `"$ 1,500,000"`: parte inteira agrupada de três em três.
pub fn format_currency(amount: Decimal) -> String {
    let inteiro = amount.trunc().to_u64().unwrap_or(0).to_string();

    let mut agrupado = String::with_capacity(inteiro.len() + inteiro.len() / 3);
    for (i, ch) in inteiro.chars().enumerate() {
        if i > 0 && (inteiro.len() - i) % 3 == 0 {
            agrupado.push(',');
        }
        agrupado.push(ch);
    }

    format!("$ {}", agrupado)
}

/// `15 DE SEPTIEMBRE DE 2025`; `None` vira `INDEFINIDO`.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{} DE {} DE {}", d.day(), MESES[d.month0() as usize], d.year()),
        None => SIN_FECHA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn special_forms() {
        assert_eq!(amount_to_words(0), "CERO PESOS");
        assert_eq!(amount_to_words(100), "CIEN PESOS");
        assert_eq!(amount_to_words(1000), "MIL PESOS");
        assert_eq!(amount_to_words(1_000_000), "UN MILLON DE PESOS");
    }

    #[test]
    fn compound_amounts() {
        assert_eq!(amount_to_words(1_500_000), "UN MILLON QUINIENTOS MIL PESOS");
        assert_eq!(amount_to_words(21), "VEINTE Y UNO PESOS");
        assert_eq!(amount_to_words(16), "DIECISEIS PESOS");
        assert_eq!(amount_to_words(101), "CIENTO UNO PESOS");
        assert_eq!(amount_to_words(200), "DOSCIENTOS PESOS");
        assert_eq!(amount_to_words(2_000_000), "DOS MILLONES DE PESOS");
        assert_eq!(
            amount_to_words(1_423_500),
            "UN MILLON CUATROCIENTOS VEINTE Y TRES MIL QUINIENTOS PESOS"
        );
        assert_eq!(amount_to_words(100_000), "CIEN MIL PESOS");
        assert_eq!(amount_to_words(2_100), "DOS MIL CIEN PESOS");
    }

    #[test]
    fn decimals_drop_cents() {
        let salary = Decimal::from_str("1300000.75").unwrap();
        assert_eq!(decimal_to_words(salary), "UN MILLON TRESCIENTOS MIL PESOS");
        assert_eq!(format_currency(salary), "$ 1,300,000");
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(Decimal::ZERO), "$ 0");
        assert_eq!(format_currency(Decimal::from(999)), "$ 999");
        assert_eq!(format_currency(Decimal::from(1000)), "$ 1,000");
        assert_eq!(format_currency(Decimal::from(1_500_000)), "$ 1,500,000");
    }

    #[test]
    fn dates_in_spanish() {
        let d = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        assert_eq!(format_date(Some(d)), "15 DE SEPTIEMBRE DE 2025");

        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(format_date(Some(d)), "3 DE ENERO DE 2024");

        assert_eq!(format_date(None), "INDEFINIDO");
    }
}
