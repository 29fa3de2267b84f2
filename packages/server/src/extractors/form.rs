use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::UploadedFile;

use crate::error::AppError;

/// A fully buffered `multipart/form-data` body.
///
/// Text parts are kept per name in arrival order, file parts likewise.
/// Repeated names (`actor_ids`, `images`) accumulate.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    /// Reads every part. A file part larger than `max_file_bytes` aborts the
    /// read before anything else happens.
    pub async fn read(mut multipart: Multipart, max_file_bytes: u64) -> Result<Self, AppError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let data = read_capped(field, &name, &file_name, max_file_bytes).await?;
                    form.files
                        .entry(name)
                        .or_default()
                        .push(UploadedFile::new(file_name, data));
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        AppError::invalid_field(name.clone(), format!("Failed to read field: {e}"))
                    })?;
                    form.texts.entry(name).or_default().push(text);
                }
            }
        }

        Ok(form)
    }

    /// First value of a text part, trimmed. Blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.texts
            .get(name)
            .and_then(|values| values.first())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn required_text(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::invalid_field(name, format!("{name} is required")))
    }

    /// Parses a required text part.
    pub fn parse<T>(&self, name: &str) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required_text(name)?;
        raw.parse()
            .map_err(|e| AppError::invalid_field(name, format!("Invalid {name}: {e}")))
    }

    /// Parses an optional text part.
    pub fn parse_opt<T>(&self, name: &str) -> Result<Option<T>, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.text(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|e| AppError::invalid_field(name, format!("Invalid {name}: {e}")))
            })
            .transpose()
    }

    /// Integer ids from every part named `name`; each part may also hold a
    /// comma-separated list.
    pub fn ids(&self, name: &str) -> Result<Vec<i32>, AppError> {
        let Some(values) = self.texts.get(name) else {
            return Ok(Vec::new());
        };
        values
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value.parse::<i32>().map_err(|_| {
                    AppError::invalid_field(name, format!("Invalid id '{value}' in {name}"))
                })
            })
            .collect()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let mut files = self.files.remove(name)?;
        if files.is_empty() {
            None
        } else {
            Some(files.swap_remove(0))
        }
    }

    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }
}

async fn read_capped(
    mut field: Field<'_>,
    name: &str,
    file_name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::invalid_field(name, format!("Failed to read upload: {e}")))?
    {
        if (data.len() + chunk.len()) as u64 > max_bytes {
            return Err(AppError::invalid_field(
                name,
                format!("'{file_name}' exceeds size limit of {max_bytes} bytes"),
            ));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
