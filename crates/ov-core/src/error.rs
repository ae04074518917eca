use crate::model::ShapeFamily;
use thiserror::Error;

/// Errors raised while converting or patching shapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unknown drawing element type `{0}`")]
    UnknownElementType(String),

    #[error("`{kind}` expects {expected} coordinates, got {got}")]
    PointArity {
        kind: String,
        expected: &'static str,
        got: usize,
    },

    #[error("bbox must have 4 values, got {0}")]
    BadBbox(usize),

    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),

    #[error("{patch:?} patch cannot apply to a {shape:?} shape")]
    FamilyMismatch {
        patch: ShapeFamily,
        shape: ShapeFamily,
    },
}
