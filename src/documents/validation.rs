//! Input validation for document requests.
//!
//! Every problem is collected before anything is computed, with Spanish
//! messages and a hint that the dashboard shows next to the offending field.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use super::calculation::{line_net, MAX_DAY_COUNT, MAX_QUANTITY, MAX_UNIT_PRICE};
use super::format::parse_date;
use super::model::{CustomerType, DocumentData, StandaloneContractData};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

/// Trait for validating request objects.
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Validation error with a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Field path in request notation, e.g. `lineItems[0].quantity`
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{label} no puede estar vacío")).with_suggestion(format!(
            "Ingrese un valor para {}",
            label.to_lowercase()
        ))
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "El correo electrónico no es válido")
            .with_suggestion("Use el formato nombre@dominio.cl")
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(field, format!("La fecha '{value}' no es válida"))
            .with_suggestion("Use el formato AAAA-MM-DD, por ejemplo 2025-03-15")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Numbered summary suitable for an API error body.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validación fallida: {} error(es) encontrado(s)",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Validation functions
// ============================================================================

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, "Correo electrónico"));
        return;
    }
    if !EMAIL_RE.is_match(trimmed) {
        errors.add(ValidationError::invalid_email(field));
    }
}

/// Required date; returns the parsed value for cross-field checks.
pub fn validate_date(
    value: &str,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<chrono::NaiveDate> {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
        return None;
    }
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.add(ValidationError::invalid_date(field, value.trim()));
    }
    parsed
}

pub fn validate_at_least(value: i64, minimum: i64, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value < minimum {
        errors.add(ValidationError::new(
            field,
            format!("{label} debe ser al menos {minimum}, se recibió {value}"),
        ));
    }
}

pub fn validate_at_most(value: i64, maximum: i64, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value > maximum {
        errors.add(ValidationError::new(
            field,
            format!("{label} no puede superar {maximum}, se recibió {value}"),
        ));
    }
}

pub fn validate_non_negative(value: Decimal, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value < Decimal::ZERO {
        errors.add(ValidationError::new(
            field,
            format!("{label} no puede ser negativo, se recibió {value}"),
        ));
    }
}

impl Validator for DocumentData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.document_id, "documentId", "Número de documento", &mut errors);

        validate_required(&self.billing.first_name, "billing.firstName", "Nombre", &mut errors);
        validate_required(&self.billing.last_name, "billing.lastName", "Apellido", &mut errors);
        validate_email(&self.billing.email, "billing.email", &mut errors);

        validate_required(&self.project.name, "project.name", "Nombre del proyecto", &mut errors);
        let start = validate_date(
            &self.project.start_date,
            "project.startDate",
            "Fecha de inicio",
            &mut errors,
        );
        let end = validate_date(
            &self.project.end_date,
            "project.endDate",
            "Fecha de término",
            &mut errors,
        );
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add(
                    ValidationError::new(
                        "project.endDate",
                        "La fecha de término es anterior a la fecha de inicio",
                    )
                    .with_suggestion("Revise el período de arriendo"),
                );
            }
        }
        validate_at_least(self.project.day_count, 1, "project.dayCount", "Jornadas", &mut errors);
        validate_at_most(self.project.day_count, MAX_DAY_COUNT, "project.dayCount", "Jornadas", &mut errors);

        if self.line_items.is_empty() {
            errors.add(
                ValidationError::new("lineItems", "El pedido no contiene equipos")
                    .with_suggestion("Agregue al menos un equipo"),
            );
        }
        let mut subtotal = Decimal::ZERO;
        for (i, item) in self.line_items.iter().enumerate() {
            validate_required(&item.name, &format!("lineItems[{i}].name"), "Nombre del equipo", &mut errors);
            validate_non_negative(
                item.unit_price,
                &format!("lineItems[{i}].unitPrice"),
                "Precio unitario",
                &mut errors,
            );
            if item.unit_price > MAX_UNIT_PRICE {
                errors.add(ValidationError::new(
                    format!("lineItems[{i}].unitPrice"),
                    format!("Precio unitario no puede superar {MAX_UNIT_PRICE}, se recibió {}", item.unit_price),
                ));
            }
            let quantity_field = format!("lineItems[{i}].quantity");
            validate_at_least(item.quantity, 1, &quantity_field, "Cantidad", &mut errors);
            validate_at_most(item.quantity, MAX_QUANTITY, &quantity_field, "Cantidad", &mut errors);
            if item.quantity > 0 && self.project.day_count > 0 {
                // Out-of-range lines are already reported above.
                if let Some(sum) = line_net(item, self.project.day_count)
                    .ok()
                    .and_then(|net| subtotal.checked_add(net))
                {
                    subtotal = sum;
                }
            }
        }

        if let Some(coupon) = &self.coupon {
            validate_non_negative(coupon.discount_amount, "coupon.discountAmount", "Descuento", &mut errors);
            if coupon.discount_amount > subtotal && errors.is_empty() {
                errors.add(
                    ValidationError::new(
                        "coupon.discountAmount",
                        "El descuento supera el subtotal de productos",
                    )
                    .with_suggestion("Verifique el cupón aplicado"),
                );
            }
        }

        if let Some(shipping) = &self.shipping {
            validate_non_negative(shipping.total, "shipping.total", "Costo de despacho", &mut errors);
        }

        errors.into_result()
    }
}

impl Validator for StandaloneContractData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.customer_id, "customerId", "Identificador de cliente", &mut errors);
        validate_required(&self.full_name, "fullName", "Nombre completo", &mut errors);
        validate_email(&self.email, "email", &mut errors);

        if self.customer_type == CustomerType::Company {
            validate_required(
                self.company_name.as_deref().unwrap_or_default(),
                "companyName",
                "Razón social",
                &mut errors,
            );
            validate_required(
                self.company_tax_id.as_deref().unwrap_or_default(),
                "companyTaxId",
                "RUT de la empresa",
                &mut errors,
            );
        }

        errors.into_result()
    }
}
