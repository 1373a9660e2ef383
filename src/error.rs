use std::fmt;

/// Errors surfaced by the annotation widget and its helpers.
#[derive(Debug)]
pub enum Error {
    /// Options JSON could not be parsed.
    Config(serde_json::Error),
    /// Two annotation types share the same `type` key.
    DuplicateType(String),
    /// Two annotation types share the same output `annotation_name`.
    DuplicateAnnotationName(String),
    /// A toggle referenced a type that is not configured.
    UnknownType(String),
    /// Uploaded file extension is not in the accepted list.
    UnsupportedFile(String),
    /// A stored image is not a `data:` URL.
    InvalidDataUrl,
    Base64(base64::DecodeError),
    Image(image::ImageError),
    /// The bundled label font could not be parsed.
    Font(ab_glyph::InvalidFont),
    /// Submission blob was not valid JSON or lacked a field.
    Submission(String),
    /// Required annotation types absent from a submission, by label.
    MissingRequired(Vec<String>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(err) => write!(f, "invalid widget options: {err}"),
            Error::DuplicateType(key) => write!(f, "Duplicate key found: {key}"),
            Error::DuplicateAnnotationName(name) => {
                write!(f, "duplicate annotation name: {name}")
            }
            Error::UnknownType(key) => write!(f, "no annotation type configured for {key}"),
            Error::UnsupportedFile(name) => write!(f, "{name} is not a supported image type."),
            Error::InvalidDataUrl => write!(f, "image contents are not a base64 data URL"),
            Error::Base64(err) => write!(f, "invalid base64 payload: {err}"),
            Error::Image(err) => write!(f, "image error: {err}"),
            Error::Font(err) => write!(f, "label font: {err}"),
            Error::Submission(msg) => write!(f, "invalid submission: {msg}"),
            Error::MissingRequired(labels) => {
                write!(f, "Missing required annotations: {}", labels.join(", "))
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Base64(err) => Some(err),
            Error::Image(err) => Some(err),
            Error::Font(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Base64(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err)
    }
}

impl From<ab_glyph::InvalidFont> for Error {
    fn from(err: ab_glyph::InvalidFont) -> Self {
        Error::Font(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
