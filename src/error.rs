//! Errors reported outside of the evaluation hot path.

use crate::{geometry::CylDim, num::fbf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FieldError>;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("cell bin along {dim} has non-positive width: [{lower}, {upper}]")]
    DegenerateBin { dim: CylDim, lower: fbf, upper: fbf },

    #[error("cell bound along {dim} is not finite")]
    NonFiniteBound { dim: CylDim },

    #[error("cell phi span {span} exceeds one full turn")]
    PhiSpanTooLarge { span: fbf },

    #[error("unknown interpolator scheme: {0}")]
    UnknownScheme(String),

    #[error("expected points array of shape (n, 3), got ({rows}, {columns})")]
    PointShape { rows: usize, columns: usize },

    #[cfg(feature = "json")]
    #[error("invalid JSON cell description: {0}")]
    Json(String),
}
