use std::fmt;
use std::path::Path;

use axum::extract::{multipart::MultipartError, Multipart};
use bytes::Bytes;

use super::repo::{POSTER_MAX_LEN, TITLE_MAX_LEN};
use crate::csrf::services::CsrfKeys;
use crate::storage::secure_filename;

pub const ALLOWED_POSTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

const REQUIRED: &str = "This field is required.";

/// A file part as the client sent it.
#[derive(Debug, Clone)]
pub struct PosterUpload {
    pub filename: String,
    pub body: Bytes,
}

/// Raw `POST /api/v1/movies` submission, before validation.
#[derive(Debug, Default)]
pub struct MovieForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub poster: Option<PosterUpload>,
    pub csrf_token: Option<String>,
}

/// A poster that passed validation, renamed to its on-disk filename.
#[derive(Debug, Clone)]
pub struct ValidPoster {
    pub filename: String,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct ValidMovie {
    pub title: String,
    pub description: String,
    pub poster: Option<ValidPoster>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub label: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, label: &'static str, message: impl Into<String>) -> Self {
        Self { field, label, message: message.into() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error in the {} field - {}", self.label, self.message)
    }
}

impl MovieForm {
    /// Reads every part of the body. Unknown fields are skipped; a file part
    /// without a filename counts as no file.
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, MultipartError> {
        let mut form = MovieForm::default();
        while let Some(field) = mp.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("title") => form.title = Some(field.text().await?),
                Some("description") => form.description = Some(field.text().await?),
                Some("csrf_token") => form.csrf_token = Some(field.text().await?),
                Some("poster") => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let body = field.bytes().await?;
                    if !filename.is_empty() {
                        form.poster = Some(PosterUpload { filename, body });
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// Checks the whole form and reports every bad field in form order.
    /// A non-blank `csrf_token` field wins over `header_token`.
    pub fn validate(
        self,
        csrf: &CsrfKeys,
        header_token: Option<&str>,
    ) -> Result<ValidMovie, Vec<FieldError>> {
        let mut errors = Vec::new();

        let token = self
            .csrf_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(header_token);
        if let Err(e) = csrf.verify(token) {
            errors.push(FieldError::new("csrf_token", "CSRF Token", e.to_string()));
        }

        let title = required(self.title, "title", "Title", Some(TITLE_MAX_LEN), &mut errors);
        let description =
            required(self.description, "description", "Description", None, &mut errors);

        let poster = match self.poster {
            Some(upload) => match validate_poster(upload) {
                Ok(p) => Some(p),
                Err(message) => {
                    errors.push(FieldError::new("poster", "Poster", message));
                    None
                }
            },
            None => None,
        };

        match (title, description) {
            (Some(title), Some(description)) if errors.is_empty() => Ok(ValidMovie {
                title,
                description,
                poster,
            }),
            _ => Err(errors),
        }
    }
}

fn required(
    value: Option<String>,
    field: &'static str,
    label: &'static str,
    max_len: Option<usize>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => match max_len {
            Some(max) if v.chars().count() > max => {
                errors.push(FieldError::new(field, label, too_long(max)));
                None
            }
            _ => Some(v),
        },
        _ => {
            errors.push(FieldError::new(field, label, REQUIRED));
            None
        }
    }
}

fn too_long(max: usize) -> String {
    format!("Field cannot be longer than {} characters.", max)
}

fn validate_poster(upload: PosterUpload) -> Result<ValidPoster, String> {
    let filename = secure_filename(&upload.filename);
    if filename.is_empty() {
        return Err("Invalid file name.".into());
    }
    if filename.chars().count() > POSTER_MAX_LEN {
        return Err(too_long(POSTER_MAX_LEN));
    }
    let allowed = Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_POSTER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !allowed {
        return Err(format!("Images only! ({})", ALLOWED_POSTER_EXTENSIONS.join(", ")));
    }
    Ok(ValidPoster { filename, body: upload.body })
}

#[cfg(test)]
mod form_tests {
    use super::*;
    use crate::config::CsrfConfig;

    fn keys(enabled: bool) -> CsrfKeys {
        CsrfKeys::from_config(&CsrfConfig {
            secret: "test".into(),
            issuer: "movieshelf".into(),
            audience: "csrf".into(),
            ttl_minutes: 60,
            enabled,
        })
    }

    fn poster(name: &str) -> Option<PosterUpload> {
        Some(PosterUpload { filename: name.into(), body: Bytes::from_static(b"img") })
    }

    fn messages(errors: &[FieldError]) -> Vec<String> {
        errors.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn valid_form_sanitizes_poster_name() {
        let form = MovieForm {
            title: Some("Jaws".into()),
            description: Some("Shark".into()),
            poster: poster("my jaws poster.PNG"),
            csrf_token: None,
        };
        let movie = form.validate(&keys(false), None).expect("valid");
        assert_eq!(movie.title, "Jaws");
        let p = movie.poster.expect("poster");
        assert_eq!(p.filename, "my_jaws_poster.PNG");
        assert_eq!(&p.body[..], b"img");
    }

    #[test]
    fn poster_is_optional() {
        let form = MovieForm {
            title: Some("Jaws".into()),
            description: Some("Shark".into()),
            ..Default::default()
        };
        let movie = form.validate(&keys(false), None).expect("valid");
        assert!(movie.poster.is_none());
    }

    #[test]
    fn reports_every_bad_field_in_order() {
        let form = MovieForm {
            title: None,
            description: Some("   ".into()),
            poster: poster("script.exe"),
            csrf_token: None,
        };
        let errors = form.validate(&keys(true), None).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["csrf_token", "title", "description", "poster"]);
        assert_eq!(
            messages(&errors),
            vec![
                "Error in the CSRF Token field - The CSRF token is missing.",
                "Error in the Title field - This field is required.",
                "Error in the Description field - This field is required.",
                "Error in the Poster field - Images only! (jpg, jpeg, png, gif, webp)",
            ]
        );
    }

    #[test]
    fn unsalvageable_filename() {
        let form = MovieForm {
            title: Some("Jaws".into()),
            description: Some("Shark".into()),
            poster: poster("../.."),
            csrf_token: None,
        };
        let errors = form.validate(&keys(false), None).unwrap_err();
        assert_eq!(messages(&errors), vec!["Error in the Poster field - Invalid file name."]);
    }

    #[test]
    fn overlong_title_and_poster_name() {
        let form = MovieForm {
            title: Some("x".repeat(TITLE_MAX_LEN + 1)),
            description: Some("Shark".into()),
            poster: poster(&format!("{}.png", "p".repeat(POSTER_MAX_LEN))),
            csrf_token: None,
        };
        let errors = form.validate(&keys(false), None).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![
                "Error in the Title field - Field cannot be longer than 100 characters.",
                "Error in the Poster field - Field cannot be longer than 255 characters.",
            ]
        );

        let at_limit = MovieForm {
            title: Some("é".repeat(TITLE_MAX_LEN)),
            description: Some("Shark".into()),
            ..Default::default()
        };
        assert!(at_limit.validate(&keys(false), None).is_ok());
    }

    #[test]
    fn blank_form_token_falls_back_to_header() {
        let k = keys(true);
        let token = k.issue().unwrap();
        let form = MovieForm {
            title: Some("Jaws".into()),
            description: Some("Shark".into()),
            csrf_token: Some(String::new()),
            ..Default::default()
        };
        assert!(form.validate(&k, Some(&token)).is_ok());
    }

    #[test]
    fn csrf_from_header_or_form() {
        let k = keys(true);
        let token = k.issue().unwrap();
        let base = || MovieForm {
            title: Some("Jaws".into()),
            description: Some("Shark".into()),
            ..Default::default()
        };

        assert!(base().validate(&k, Some(&token)).is_ok());

        let mut with_field = base();
        with_field.csrf_token = Some(token.clone());
        assert!(with_field.validate(&k, None).is_ok());

        let errors = base().validate(&k, Some("forged")).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["Error in the CSRF Token field - The CSRF token is invalid."]
        );
    }
}
