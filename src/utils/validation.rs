use regex::Regex;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::models::content::ImageUpload;

/// Khmer block (U+1780..U+17FF) plus whitespace. Empty input matches.
pub static KHMER_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\x{1780}-\x{17FF}\s]*$").expect("valid regex"));

/// ASCII Latin letters plus whitespace, at least one character.
pub static LATIN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("valid regex"));

/// Length bound applied when a name is created.
pub const NAME_MAX_ON_CREATE: u64 = 255;

/// Length bound applied when a category or subcategory name is updated.
pub const NAME_MAX_ON_UPDATE: u64 = 50;

/// A supplied image list must hold at least this many files.
pub const MIN_IMAGES: usize = 2;

const ALLOWED_IMAGE_TYPES: &str = "jpeg, png, jpg, gif, svg";

/// Per-field error messages, keyed by input field name.
///
/// Serializes as a plain `{ "field": ["message", ...] }` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Collects the outcome of a `validator` run into `self`.
    pub fn absorb(&mut self, result: Result<(), validator::ValidationErrors>) {
        if let Err(errors) = result {
            self.merge(errors.into());
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", humanize(&field)));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// `sub_category_en` -> `sub category en`, the wording used in messages.
pub fn humanize(field: &str) -> String {
    field.replace('_', " ")
}

/// Reads a text field from any JSON value, so a wrongly typed value fails
/// that field's rules instead of the whole body.
///
/// Numbers keep their JSON spelling and booleans become `"1"` / `"0"`.
/// Arrays and objects are kept as JSON text. `null` is absent.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Bool(flag)) => Some(if flag { "1" } else { "0" }.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Trims a string input and treats an empty result as absent.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims a string input but keeps a blank value, so partial updates can
/// tell "not sent" apart from "sent empty".
pub fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// A field that was sent but is blank cannot overwrite a stored name.
pub fn reject_blank(field: &str, value: Option<&str>, errors: &mut FieldErrors) {
    if value.is_some_and(str::is_empty) {
        errors.add(field, format!("The {} field must be a string.", humanize(field)));
    }
}

pub fn taken_message(field: &str) -> String {
    format!("The {} has already been taken.", humanize(field))
}

pub fn invalid_reference_message(field: &str) -> String {
    format!("The selected {} is invalid.", humanize(field))
}

/// Returns true when `value` already exists in `column`, ignoring the row
/// identified by `ignore` (used by updates to skip the row being edited).
pub async fn value_taken<E, C>(
    conn: &C,
    column: E::Column,
    value: &str,
    ignore: Option<(E::Column, i32)>,
) -> Result<bool, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut query = E::find().filter(column.eq(value));
    if let Some((id_column, id)) = ignore {
        query = query.filter(id_column.ne(id));
    }
    Ok(query.one(conn).await?.is_some())
}

pub async fn row_exists<E, C>(conn: &C, id_column: E::Column, id: i32) -> Result<bool, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    Ok(E::find().filter(id_column.eq(id)).one(conn).await?.is_some())
}

/// Parses a textual id and checks that the row exists. Records the
/// "selected ... is invalid" error for `field` otherwise.
pub async fn existing_reference<E, C>(
    conn: &C,
    id_column: E::Column,
    raw: Option<&str>,
    field: &str,
    errors: &mut FieldErrors,
) -> Result<Option<i32>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(id) = raw.parse::<i32>() {
        if row_exists::<E, C>(conn, id_column, id).await? {
            return Ok(Some(id));
        }
    }
    errors.add(field, invalid_reference_message(field));
    Ok(None)
}

/// Image formats accepted for content uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Svg,
}

impl ImageFormat {
    pub fn mime(&self) -> mime::Mime {
        match self {
            ImageFormat::Jpeg => mime::IMAGE_JPEG,
            ImageFormat::Png => mime::IMAGE_PNG,
            ImageFormat::Gif => mime::IMAGE_GIF,
            ImageFormat::Svg => mime::IMAGE_SVG,
        }
    }
}

/// Outcome of sniffing an uploaded file's leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCheck {
    Allowed(ImageFormat),
    /// An image, but not one of the accepted formats (e.g. WebP, BMP)
    UnsupportedImage,
    NotAnImage,
}

pub fn detect_image_format(data: &[u8]) -> ImageCheck {
    // infer has no SVG matcher and reports SVG documents as text/xml
    if looks_like_svg(data) {
        return ImageCheck::Allowed(ImageFormat::Svg);
    }

    match infer::get(data) {
        Some(kind) => match kind.mime_type() {
            "image/jpeg" => ImageCheck::Allowed(ImageFormat::Jpeg),
            "image/png" => ImageCheck::Allowed(ImageFormat::Png),
            "image/gif" => ImageCheck::Allowed(ImageFormat::Gif),
            _ if kind.matcher_type() == infer::MatcherType::Image => ImageCheck::UnsupportedImage,
            _ => ImageCheck::NotAnImage,
        },
        None => ImageCheck::NotAnImage,
    }
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(4096)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with('<') && text.to_ascii_lowercase().contains("<svg")
}

/// Applies the upload rules to an optional image list.
///
/// `None` means the field was not supplied at all and nothing is checked.
pub fn validate_images(images: Option<&[ImageUpload]>, max_size: usize, errors: &mut FieldErrors) {
    let Some(images) = images else {
        return;
    };

    if images.len() < MIN_IMAGES {
        errors.add(
            "image",
            format!("The image field must have at least {} items.", MIN_IMAGES),
        );
    }

    for (index, image) in images.iter().enumerate() {
        let key = format!("image.{}", index);

        match detect_image_format(&image.data) {
            ImageCheck::Allowed(_) => {}
            ImageCheck::UnsupportedImage => {
                errors.add(
                    &key,
                    format!("The {} field must be a file of type: {}.", key, ALLOWED_IMAGE_TYPES),
                );
            }
            ImageCheck::NotAnImage => {
                errors.add(&key, format!("The {} field must be an image.", key));
                errors.add(
                    &key,
                    format!("The {} field must be a file of type: {}.", key, ALLOWED_IMAGE_TYPES),
                );
            }
        }

        if image.data.len() > max_size {
            errors.add(
                &key,
                format!(
                    "The {} field must not be greater than {} kilobytes.",
                    key,
                    max_size / 1024
                ),
            );
        }
    }
}

/// Reduces a client-supplied filename to a single safe path segment.
pub fn sanitize_filename(filename: &str) -> String {
    // Some browsers send the full client path, with either separator
    let name = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c.is_whitespace()
                || matches!(
                    c,
                    ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';' | '#' | '%' | '&' | '+'
                )
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // No hidden files
    let sanitized = sanitized.trim_start_matches('.');

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 120 {
        let mut end = 120;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        &sanitized[..end]
    } else {
        sanitized
    };

    if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized.to_string()
    }
}
