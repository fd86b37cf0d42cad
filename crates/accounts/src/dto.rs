//! Request and response bodies.

use crate::config::PaginationConfig;
use crate::error::{Action, ErrorCode, ServiceError, ServiceResult};
use querygen::Order;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Per-field validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, rule: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(rule.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// An error carrying this map.
    pub fn into_error(
        self,
        code: ErrorCode,
        action: Action,
        message: &str,
        detail: &str,
    ) -> ServiceError {
        let errors = serde_json::to_value(&self).unwrap_or_default();
        ServiceError::new(code, action, message, detail).with_errors(errors)
    }

    /// Failure of a request body.
    pub fn into_body_error(self) -> ServiceError {
        self.into_error(
            ErrorCode::Invalid,
            Action::Resend,
            "BodyNotProvidedProperly",
            "body validation failed",
        )
    }

    /// `Ok(())` when empty, otherwise [`FieldErrors::into_body_error`].
    pub fn into_body_result(self) -> ServiceResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_body_error())
        }
    }
}

/// An optional `+` followed by 7 to 15 digits.
pub fn is_phone(s: &str) -> bool {
    static PHONE_RE: OnceLock<regex::Regex> = OnceLock::new();
    PHONE_RE
        .get_or_init(|| regex::Regex::new(r"^\+?[0-9]{7,15}$").expect("invalid built-in phone regex"))
        .is_match(s)
}

fn require(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "required");
        false
    } else {
        true
    }
}

fn check_phone(errors: &mut FieldErrors, phone: &str) {
    if require(errors, "phone_number", phone) && !is_phone(phone) {
        errors.add("phone_number", "phone");
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub phone_number: String,
    pub display_name: String,
    pub password: String,
}

impl RegisterRequest {
    /// Shape checks. Phone uniqueness needs the database and is checked by the
    /// service.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_phone(&mut errors, &self.phone_number);
        require(&mut errors, "display_name", &self.display_name);
        require(&mut errors, "password", &self.password);
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_phone(&mut errors, &self.phone_number);
        require(&mut errors, "password", &self.password);
        errors
    }
}

/// Listing parameters as received. Absent values fall back to configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UsersParams {
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
    pub search: Option<String>,
}

/// Validated listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub order_by: String,
    pub order: Order,
    pub per_page: i64,
    pub page: i64,
    /// Trimmed, never empty.
    pub search: Option<String>,
}

impl UsersParams {
    /// Fill defaults and check every value, reporting all failures at once.
    pub fn resolve(&self, defaults: &PaginationConfig) -> ServiceResult<ListQuery> {
        let mut errors = FieldErrors::new();

        let order_by = self.order_by.clone().unwrap_or_else(|| defaults.order_by.clone());
        if !defaults.order_columns.contains(&order_by) {
            errors.add("order_by", "choices");
        }

        let sort = self.sort.as_deref().unwrap_or(&defaults.sort);
        let order = match sort.parse::<Order>() {
            Ok(order) => order,
            Err(_) => {
                errors.add("sort", "choices");
                Order::Asc
            }
        };

        let per_page = self.per_page.unwrap_or(defaults.per_page);
        if per_page < defaults.min_per_page {
            errors.add("per_page", "min");
        }

        let page = self.page.unwrap_or(defaults.page);
        if page < 1 {
            errors.add("page", "min");
        }

        if !errors.is_empty() {
            return Err(errors.into_error(
                ErrorCode::Invalid,
                Action::DoNothing,
                "InvalidPageParameters",
                "query parameters validation failed",
            ));
        }

        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ListQuery {
            order_by,
            order,
            per_page,
            page,
            search,
        })
    }
}

/// Number of pages needed for `all_count` rows; at least 1.
pub fn pages_count(all_count: i64, per_page: i64) -> i64 {
    if per_page <= 0 || all_count <= 0 {
        return 1;
    }
    (all_count - 1) / per_page + 1
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub page: i64,
    pub per_page: i64,
    pub pages_count: i64,
    pub all_count: i64,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(all_count: i64, per_page: i64, page: i64, data: Vec<T>) -> Self {
        Self {
            page,
            per_page,
            pages_count: pages_count(all_count, per_page),
            all_count,
            count: data.len(),
            data,
        }
    }
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}
