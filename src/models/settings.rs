// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "receipt_template", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptTemplate {
    #[default]
    Standard,
    Compact,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "barcode_format", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodeFormat {
    #[sqlx(rename = "EAN13")]
    #[serde(rename = "EAN13")]
    Ean13,
    #[default]
    #[sqlx(rename = "CODE128")]
    #[serde(rename = "CODE128")]
    Code128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "barcode_prefix_strategy", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodePrefixStrategy {
    #[default]
    None,
    Tenant,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[schema(ignore)] // O token já define a loja
    pub tenant_id: Uuid,

    #[schema(example = "BRL")]
    pub currency: String,
    #[schema(example = "America/Sao_Paulo")]
    pub timezone: String,
    #[schema(example = "8.5")]
    pub tax_rate: Decimal,

    pub receipt_header: Option<String>,
    pub receipt_footer: Option<String>,
    pub receipt_show_logo: bool,
    pub receipt_show_tax: bool,
    pub receipt_template: ReceiptTemplate,

    pub barcode_format: BarcodeFormat,
    pub barcode_prefix_strategy: BarcodePrefixStrategy,
    pub barcode_prefix: Option<String>,
    /// Só anda para frente.
    pub barcode_next_sequence: i64,
    pub barcode_auto_generate: bool,

    pub updated_at: DateTime<Utc>,
}

/// Documento completo de configurações; campos omitidos voltam ao padrão.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSettingsPayload {
    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code."))]
    pub currency: String,
    #[validate(length(min = 1, message = "Timezone is required."))]
    pub timezone: String,
    pub tax_rate: Decimal,
    pub receipt_header: Option<String>,
    pub receipt_footer: Option<String>,
    pub receipt_show_logo: bool,
    pub receipt_show_tax: bool,
    pub receipt_template: ReceiptTemplate,
    pub barcode_format: BarcodeFormat,
    pub barcode_prefix_strategy: BarcodePrefixStrategy,
    pub barcode_prefix: Option<String>,
    #[validate(range(min = 1, message = "Sequence starts at 1."))]
    pub barcode_next_sequence: i64,
    pub barcode_auto_generate: bool,
}

impl Default for UpdateSettingsPayload {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            timezone: "UTC".into(),
            tax_rate: Decimal::ZERO,
            receipt_header: None,
            receipt_footer: None,
            receipt_show_logo: false,
            receipt_show_tax: true,
            receipt_template: ReceiptTemplate::default(),
            barcode_format: BarcodeFormat::default(),
            barcode_prefix_strategy: BarcodePrefixStrategy::default(),
            barcode_prefix: None,
            barcode_next_sequence: 1,
            barcode_auto_generate: false,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedBarcode {
    #[schema(example = "2000000000015")]
    pub barcode: String,
    pub sequence: i64,
    pub format: BarcodeFormat,
}

// ---
// Códigos de barras
// ---

/// Prefixo numérico usado em EAN-13 para códigos internos da loja.
pub const EAN13_TENANT_PREFIX: &str = "200";

/// Dígito verificador EAN-13 sobre os 12 primeiros dígitos.
pub fn ean13_check_digit(digits: &str) -> Option<u32> {
    if digits.len() != 12 {
        return None;
    }
    let mut sum = 0;
    for (i, c) in digits.chars().enumerate() {
        let d = c.to_digit(10)?;
        sum += if i % 2 == 0 { d } else { d * 3 };
    }
    Some((10 - sum % 10) % 10)
}

fn resolve_prefix(
    format: BarcodeFormat,
    strategy: BarcodePrefixStrategy,
    custom_prefix: Option<&str>,
    tenant_slug: &str,
) -> String {
    match (strategy, format) {
        (BarcodePrefixStrategy::None, _) => String::new(),
        (BarcodePrefixStrategy::Tenant, BarcodeFormat::Ean13) => EAN13_TENANT_PREFIX.to_string(),
        (BarcodePrefixStrategy::Tenant, BarcodeFormat::Code128) => tenant_slug
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_ascii_uppercase(),
        (BarcodePrefixStrategy::Custom, _) => custom_prefix.unwrap_or_default().trim().to_string(),
    }
}

/// Monta o código de barras para um número de sequência, conforme a política da loja.
pub fn format_barcode(
    format: BarcodeFormat,
    strategy: BarcodePrefixStrategy,
    custom_prefix: Option<&str>,
    tenant_slug: &str,
    sequence: i64,
) -> Result<String, String> {
    let prefix = resolve_prefix(format, strategy, custom_prefix, tenant_slug);

    match format {
        BarcodeFormat::Code128 => Ok(format!("{}{:06}", prefix, sequence)),
        BarcodeFormat::Ean13 => {
            if !prefix.chars().all(|c| c.is_ascii_digit()) {
                return Err("EAN13 prefix must be numeric".into());
            }
            let width = 12usize
                .checked_sub(prefix.len())
                .filter(|w| *w > 0)
                .ok_or_else(|| "EAN13 prefix is too long".to_string())?;
            let body = format!("{}{:0width$}", prefix, sequence, width = width);
            if body.len() != 12 {
                return Err("Barcode sequence exhausted for EAN13".into());
            }
            let check = ean13_check_digit(&body).ok_or_else(|| "Invalid EAN13 body".to_string())?;
            Ok(format!("{}{}", body, check))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ean13_check_digit_matches_known_code() {
        assert_eq!(ean13_check_digit("400638133393"), Some(1));
        assert_eq!(ean13_check_digit("12345"), None);
    }

    #[test]
    fn ean13_without_prefix_pads_to_twelve_digits() {
        let code = format_barcode(BarcodeFormat::Ean13, BarcodePrefixStrategy::None, None, "loja", 42).unwrap();
        assert_eq!(code.len(), 13);
        assert!(code.starts_with("000000000042"));
    }

    #[test]
    fn ean13_tenant_prefix_is_numeric() {
        let code = format_barcode(BarcodeFormat::Ean13, BarcodePrefixStrategy::Tenant, None, "padaria", 1).unwrap();
        assert_eq!(&code[..12], "200000000001");
        let check = ean13_check_digit(&code[..12]).unwrap();
        assert_eq!(code.chars().last().and_then(|c| c.to_digit(10)), Some(check));
    }

    #[test]
    fn ean13_rejects_alpha_custom_prefix() {
        assert!(format_barcode(BarcodeFormat::Ean13, BarcodePrefixStrategy::Custom, Some("AB"), "x", 1).is_err());
    }

    #[test]
    fn code128_uses_slug_initials_for_tenant_prefix() {
        let code = format_barcode(BarcodeFormat::Code128, BarcodePrefixStrategy::Tenant, None, "mini-mart", 7).unwrap();
        assert_eq!(code, "MIN000007");
    }

    #[test]
    fn code128_custom_prefix() {
        let code = format_barcode(BarcodeFormat::Code128, BarcodePrefixStrategy::Custom, Some("LJ-"), "x", 123).unwrap();
        assert_eq!(code, "LJ-000123");
    }

    #[test]
    fn barcode_format_wire_names() {
        assert_eq!(serde_json::to_value(BarcodeFormat::Ean13).unwrap(), "EAN13");
        assert_eq!(serde_json::to_value(BarcodeFormat::Code128).unwrap(), "CODE128");
    }
}
