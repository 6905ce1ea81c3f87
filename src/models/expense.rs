use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::error::FormError;

pub const MIN_EXPENSE_AMOUNT: f64 = 0.01;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body of `POST /budgets/expenses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub expense_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub category_id: i64,
}

/// Raw values of the "Add Transaction" form, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ExpenseForm {
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    #[validate(custom(function = "validate_amount"))]
    pub amount: String,
    #[validate(custom(function = "validate_expense_date"))]
    pub expense_date: String,
    #[validate(length(max = 500, message = "Memo must be at most 500 characters"))]
    pub memo: String,
    #[validate(custom(function = "validate_category_id"))]
    pub category_id: String,
}

impl ExpenseForm {
    /// Validates every field and builds the request body; nothing is sent on failure
    pub fn to_new_expense(&self) -> Result<NewExpense, FormError> {
        self.validate()?;

        // Each field was checked by its validator above
        let amount = parse_amount(&self.amount)
            .ok_or_else(|| FormError::single("amount", "Amount must be a number"))?;
        let expense_date = parse_date(&self.expense_date)
            .ok_or_else(|| FormError::single("expense_date", "Date must be YYYY-MM-DD"))?;
        let category_id = parse_category_id(&self.category_id)
            .ok_or_else(|| FormError::single("category_id", "Category is required"))?;
        let memo = self.memo.trim();

        Ok(NewExpense {
            description: self.description.trim().to_string(),
            amount,
            expense_date,
            memo: (!memo.is_empty()).then(|| memo.to_string()),
            category_id,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Category offered in the form picker (`GET /categories`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|a| a.is_finite())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn parse_category_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn validate_description(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(field_error("required", "Description is required"))
    } else if value.chars().count() > 255 {
        Err(field_error("length", "Description must be at most 255 characters"))
    } else {
        Ok(())
    }
}

fn validate_amount(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("required", "Amount is required"));
    }
    match parse_amount(value) {
        None => Err(field_error("number", "Amount must be a number")),
        Some(amount) if amount < MIN_EXPENSE_AMOUNT => {
            Err(field_error("range", "Amount must be at least 0.01"))
        }
        Some(_) => Ok(()),
    }
}

fn validate_expense_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("required", "Date is required"));
    }
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| field_error("date", "Date must be YYYY-MM-DD"))
}

fn validate_category_id(value: &str) -> Result<(), ValidationError> {
    parse_category_id(value)
        .map(|_| ())
        .ok_or_else(|| field_error("required", "Category is required"))
}
