// src/services/template_engine.rs
//
// Substituição de `{TOKEN}` nas células de texto de um modelo de planilha.
// Token sem valor fica literal no documento e é reportado; não é erro.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    common::{error::AppError, spanish},
    models::{
        document::{Cell, Sheet, Workbook},
        employee::{Contract, Employee},
    },
};

/// Fonte de valores para os tokens.
pub trait FieldSource {
    fn resolve(&self, token: &str) -> Option<String>;
}

impl FieldSource for BTreeMap<String, String> {
    fn resolve(&self, token: &str) -> Option<String> {
        self.get(token).cloned()
    }
}

impl FieldSource for HashMap<String, String> {
    fn resolve(&self, token: &str) -> Option<String> {
        self.get(token).cloned()
    }
}

/// Campos conhecidos de um contrato, já tipados. O que não estiver aqui cai no
/// mapa `extra`.
#[derive(Debug, Clone)]
pub struct ContractFields {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hired_at: Option<NaiveDate>,
    pub contract_type: String,
    pub salary: rust_decimal::Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub generated_on: NaiveDate,
    pub extra: BTreeMap<String, String>,
}

impl ContractFields {
    pub const KNOWN_TOKENS: [&'static str; 14] = [
        "NOMBRE", "NOMBRES", "APELLIDOS", "CEDULA", "CARGO", "EMAIL", "TELEFONO",
        "FECHA_INGRESO", "TIPO_CONTRATO", "SALARIO", "SALARIO_LETRAS", "FECHA_INICIO",
        "FECHA_FIN", "FECHA_GENERACION",
    ];

    pub fn new(employee: &Employee, contract: &Contract, generated_on: NaiveDate) -> Self {
        Self {
            first_name: employee.first_name.trim().to_string(),
            last_name: employee.last_name.trim().to_string(),
            document_number: employee.document_number.clone(),
            position: employee.position.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            hired_at: employee.hired_at,
            contract_type: contract.contract_type.clone(),
            salary: contract.salary,
            start_date: contract.start_date,
            end_date: contract.end_date,
            generated_on,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, extra: BTreeMap<String, String>) -> Self {
        self.extra = extra;
        self
    }
}

impl FieldSource for ContractFields {
    fn resolve(&self, token: &str) -> Option<String> {
        let value = match token {
            "NOMBRE" => format!("{} {}", self.first_name, self.last_name).to_uppercase(),
            "NOMBRES" => self.first_name.to_uppercase(),
            "APELLIDOS" => self.last_name.to_uppercase(),
            "CEDULA" => self.document_number.clone(),
            "CARGO" => self.position.as_ref()?.to_uppercase(),
            "EMAIL" => self.email.clone()?,
            "TELEFONO" => self.phone.clone()?,
            "FECHA_INGRESO" => spanish::format_date(Some(self.hired_at?)),
            "TIPO_CONTRATO" => self.contract_type.to_uppercase(),
            "SALARIO" => spanish::format_currency(self.salary),
            "SALARIO_LETRAS" => spanish::decimal_to_words(self.salary),
            "FECHA_INICIO" => spanish::format_date(Some(self.start_date)),
            "FECHA_FIN" => spanish::format_date(self.end_date),
            "FECHA_GENERACION" => spanish::format_date(Some(self.generated_on)),
            other => return self.extra.get(other).cloned(),
        };
        Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub workbook: Workbook,
    pub bytes: Vec<u8>,
    pub unresolved: BTreeSet<String>,
}

// Fim do token que começa em `start` (o '{'), se for `{identificador}`.
fn token_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    match bytes.get(j) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => j += 1,
        _ => return None,
    }
    while let Some(b) = bytes.get(j) {
        if b.is_ascii_alphanumeric() || *b == b'_' {
            j += 1;
        } else {
            break;
        }
    }
    (bytes.get(j) == Some(&b'}')).then_some(j)
}

/// Nomes dos tokens presentes no texto, na ordem em que aparecem.
pub fn tokens_in(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = token_end(bytes, i) {
                found.push(&text[i + 1..end]);
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    found
}

pub fn substitute<F: FieldSource + ?Sized>(
    text: &str,
    fields: &F,
    unresolved: &mut BTreeSet<String>,
) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = token_end(bytes, i) {
                let name = &text[i + 1..end];
                out.push_str(&text[last..i]);
                match fields.resolve(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str(&text[i..=end]);
                        unresolved.insert(name.to_string());
                    }
                }
                i = end + 1;
                last = i;
                continue;
            }
        }
        i += 1;
    }

    out.push_str(&text[last..]);
    out
}

/// Todos os tokens usados no modelo.
pub fn workbook_tokens(template: &Workbook) -> BTreeSet<String> {
    template
        .sheets
        .iter()
        .flat_map(|sheet| sheet.rows.iter().flatten())
        .filter_map(|cell| match cell {
            Cell::Text(text) => Some(tokens_in(text)),
            _ => None,
        })
        .flatten()
        .map(str::to_string)
        .collect()
}

/// Renderiza o modelo. O modelo não é alterado; a saída é um novo documento
/// serializado de forma determinística.
pub fn render<F: FieldSource + ?Sized>(template: &Workbook, fields: &F) -> Result<RenderOutput, AppError> {
    let mut unresolved = BTreeSet::new();

    let sheets = template
        .sheets
        .iter()
        .map(|sheet| Sheet {
            name: sheet.name.clone(),
            rows: sheet
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| match cell {
                            Cell::Text(text) => Cell::Text(substitute(text, fields, &mut unresolved)),
                            other => other.clone(),
                        })
                        .collect()
                })
                .collect(),
        })
        .collect();

    let workbook = Workbook { sheets };
    let bytes = serde_json::to_vec(&workbook)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e)))?;

    Ok(RenderOutput { workbook, bytes, unresolved })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn template() -> Workbook {
        Workbook {
            sheets: vec![Sheet {
                name: "Contrato".into(),
                rows: vec![
                    vec![text("CONTRATO INDIVIDUAL DE TRABAJO"), Cell::Empty],
                    vec![text("Trabajador:"), text("{NOMBRE} identificado con C.C. {CEDULA}")],
                    vec![text("Salario:"), text("{SALARIO} ({SALARIO_LETRAS})")],
                    vec![text("Vigencia: {FECHA_INICIO} a {FECHA_FIN}"), Cell::Number(Decimal::from(30))],
                    vec![Cell::Bool(true), text("{ NO_ES_TOKEN } {1X} {}")],
                ],
            }],
        }
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn cell(out: &RenderOutput, row: usize, col: usize) -> &Cell {
        &out.workbook.sheets[0].rows[row][col]
    }

    #[test]
    fn empty_fields_leave_every_token_in_place() {
        let t = template();
        let out = render(&t, &BTreeMap::<String, String>::new()).unwrap();

        assert_eq!(out.workbook, t);
        let expected: BTreeSet<String> = ["NOMBRE", "CEDULA", "SALARIO", "SALARIO_LETRAS", "FECHA_INICIO", "FECHA_FIN"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(out.unresolved, expected);
        assert_eq!(workbook_tokens(&t), expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let fields = map(&[
            ("NOMBRE", "ANA RUIZ"),
            ("CEDULA", "52123456"),
            ("SALARIO", "$ 1,500,000"),
            ("SALARIO_LETRAS", "UN MILLON QUINIENTOS MIL PESOS"),
            ("FECHA_INICIO", "1 DE SEPTIEMBRE DE 2025"),
            ("FECHA_FIN", "INDEFINIDO"),
        ]);
        let first = render(&template(), &fields).unwrap();
        let second = render(&template(), &fields).unwrap();

        assert_eq!(first.bytes, second.bytes);
        assert!(first.unresolved.is_empty());
        assert_eq!(
            cell(&first, 1, 1),
            &text("ANA RUIZ identificado con C.C. 52123456")
        );
    }

    #[test]
    fn partial_fields_substitute_and_report_the_rest() {
        let out = render(&template(), &map(&[("NOMBRE", "ANA RUIZ")])).unwrap();

        assert_eq!(cell(&out, 1, 1), &text("ANA RUIZ identificado con C.C. {CEDULA}"));
        assert!(out.unresolved.contains("CEDULA"));
        assert!(!out.unresolved.contains("NOMBRE"));

        // sem tokens ou não-texto: intactos
        assert_eq!(cell(&out, 0, 0), &text("CONTRATO INDIVIDUAL DE TRABAJO"));
        assert_eq!(cell(&out, 0, 1), &Cell::Empty);
        assert_eq!(cell(&out, 3, 1), &Cell::Number(Decimal::from(30)));
        assert_eq!(cell(&out, 4, 0), &Cell::Bool(true));
        assert_eq!(cell(&out, 4, 1), &text("{ NO_ES_TOKEN } {1X} {}"));
    }

    #[test]
    fn substitution_is_purely_textual() {
        let mut unresolved = BTreeSet::new();
        let fields = map(&[("A", "{B}"), ("B", "nunca")]);
        let out = substitute("{A}{B}ñ{C}", &fields, &mut unresolved);

        assert_eq!(out, "{B}nuncañ{C}");
        assert_eq!(unresolved.into_iter().collect::<Vec<_>>(), vec!["C".to_string()]);
    }

    #[test]
    fn handles_unbalanced_braces() {
        let mut unresolved = BTreeSet::new();
        let out = substitute("{{NOMBRE}} {NOMBRE", &map(&[("NOMBRE", "X")]), &mut unresolved);
        assert_eq!(out, "{X} {NOMBRE");
        assert!(unresolved.is_empty());
    }

    #[test]
    fn contract_fields_resolve_typed_values() {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            document_number: "1032456789".into(),
            first_name: "María Fernanda".into(),
            last_name: "Gómez".into(),
            position: None,
            email: None,
            phone: Some("3001234567".into()),
            hired_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let contract = Contract {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            contract_type: "Término fijo".into(),
            salary: Decimal::from(1_500_000),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
            end_date: None,
            is_active: true,
            created_at: now,
        };
        let fields = ContractFields::new(&employee, &contract, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
            .with_extra(map(&[("CIUDAD", "BOGOTA")]));

        assert_eq!(fields.resolve("NOMBRE").as_deref(), Some("MARÍA FERNANDA GÓMEZ"));
        assert_eq!(fields.resolve("SALARIO").as_deref(), Some("$ 1,500,000"));
        assert_eq!(fields.resolve("SALARIO_LETRAS").as_deref(), Some("UN MILLON QUINIENTOS MIL PESOS"));
        assert_eq!(fields.resolve("FECHA_INICIO").as_deref(), Some("15 DE SEPTIEMBRE DE 2025"));
        assert_eq!(fields.resolve("FECHA_FIN").as_deref(), Some("INDEFINIDO"));
        assert_eq!(fields.resolve("TIPO_CONTRATO").as_deref(), Some("TÉRMINO FIJO"));
        assert_eq!(fields.resolve("CIUDAD").as_deref(), Some("BOGOTA"));

        // campos opcionais ausentes não resolvem
        assert_eq!(fields.resolve("CARGO"), None);
        assert_eq!(fields.resolve("FECHA_INGRESO"), None);
        assert_eq!(fields.resolve("DESCONOCIDO"), None);

        for token in ContractFields::KNOWN_TOKENS {
            if !["CARGO", "EMAIL", "FECHA_INGRESO"].contains(&token) {
                assert!(fields.resolve(token).is_some(), "{token} deveria resolver");
            }
        }
    }
}
