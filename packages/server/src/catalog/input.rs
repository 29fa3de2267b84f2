use chrono::NaiveDate;
use common::{UploadPolicy, UploadedFile};
use rust_decimal::Decimal;

use super::error::CatalogError;
use crate::entity::MovieStatus;

/// Upper bound for any ticket or movie price.
pub const MAX_PRICE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Gallery images accepted in a single create or update.
pub const MAX_GALLERY_FILES: usize = 10;

/// Scalar movie fields shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFields {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub trailer_url: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: MovieStatus,
    pub cinema_id: i32,
    pub category_id: i32,
}

impl MovieFields {
    pub fn validate(&self) -> Result<(), CatalogError> {
        text("title", &self.title, 1, 150)?;
        if let Some(description) = &self.description {
            text("description", description, 0, 1000)?;
        }
        price("price", self.price)?;
        if let Some(trailer_url) = &self.trailer_url {
            web_url("trailer_url", trailer_url)?;
        }
        if self.start_date > self.end_date {
            return Err(CatalogError::invalid(
                "end_date",
                "End date must not be before start date",
            ));
        }
        id("cinema_id", self.cinema_id)?;
        id("category_id", self.category_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CreateMovie {
    pub fields: MovieFields,
    pub poster: Option<UploadedFile>,
    pub images: Vec<UploadedFile>,
    pub actor_ids: Vec<i32>,
}

impl CreateMovie {
    pub fn validate(&self, policy: &UploadPolicy) -> Result<(), CatalogError> {
        self.fields.validate()?;
        uploads(policy, self.poster.as_ref(), &self.images)?;
        ids("actor_ids", &self.actor_ids)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateMovie {
    pub fields: MovieFields,
    /// Version the caller last read. `None` skips the staleness check.
    pub version: Option<i32>,
    pub poster: Option<UploadedFile>,
    pub images: Vec<UploadedFile>,
    pub image_ids_to_delete: Vec<i32>,
    /// Complete desired actor set.
    pub actor_ids: Vec<i32>,
}

impl UpdateMovie {
    pub fn validate(&self, policy: &UploadPolicy) -> Result<(), CatalogError> {
        self.fields.validate()?;
        uploads(policy, self.poster.as_ref(), &self.images)?;
        ids("actor_ids", &self.actor_ids)?;
        ids("image_ids_to_delete", &self.image_ids_to_delete)
    }
}

/// Drops zero-length uploads, which browsers send for untouched file inputs.
pub fn present(file: Option<UploadedFile>) -> Option<UploadedFile> {
    file.filter(|f| !f.is_empty())
}

fn uploads(
    policy: &UploadPolicy,
    poster: Option<&UploadedFile>,
    images: &[UploadedFile],
) -> Result<(), CatalogError> {
    let images: Vec<&UploadedFile> = images.iter().filter(|f| !f.is_empty()).collect();
    if images.len() > MAX_GALLERY_FILES {
        return Err(CatalogError::invalid(
            "images",
            format!("At most {MAX_GALLERY_FILES} images can be uploaded at once"),
        ));
    }
    if let Some(poster) = poster.filter(|f| !f.is_empty()) {
        policy
            .check(poster)
            .map_err(|e| CatalogError::invalid("poster", e.to_string()))?;
    }
    for image in images {
        policy
            .check(image)
            .map_err(|e| CatalogError::invalid("images", e.to_string()))?;
    }
    Ok(())
}

/// Checks the trimmed character length of a text field.
pub fn text(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), CatalogError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        let message = if min == 0 {
            format!("{} must be at most {max} characters", label(field))
        } else {
            format!("{} must be {min}-{max} characters", label(field))
        };
        return Err(CatalogError::invalid(field, message));
    }
    Ok(())
}

/// Checks a money amount: within `[0, MAX_PRICE]` with at most two decimals.
pub fn price(field: &'static str, value: Decimal) -> Result<(), CatalogError> {
    if value.is_sign_negative() && !value.is_zero() || value > MAX_PRICE {
        return Err(CatalogError::invalid(
            field,
            format!("{} must be between 0 and {MAX_PRICE}", label(field)),
        ));
    }
    if value.normalize().scale() > 2 {
        return Err(CatalogError::invalid(
            field,
            format!("{} must have at most 2 decimal places", label(field)),
        ));
    }
    Ok(())
}

/// An absolute http(s) URL.
pub fn web_url(field: &'static str, value: &str) -> Result<(), CatalogError> {
    match url::Url::parse(value.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(CatalogError::invalid(
            field,
            format!("{} must be a valid http or https URL", label(field)),
        )),
    }
}

pub fn id(field: &'static str, value: i32) -> Result<(), CatalogError> {
    if value <= 0 {
        return Err(CatalogError::invalid(
            field,
            format!("{} must be a positive id", label(field)),
        ));
    }
    Ok(())
}

fn ids(field: &'static str, values: &[i32]) -> Result<(), CatalogError> {
    values.iter().try_for_each(|&value| id(field, value))
}

/// Fixes a stored amount at two fractional digits.
pub fn money(value: Decimal) -> Decimal {
    let mut value = value.round_dp(2);
    value.rescale(2);
    value
}

fn label(field: &str) -> String {
    let words = field.replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
