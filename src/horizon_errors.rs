use thiserror::Error;

#[derive(Error, Debug)]
pub enum HorizonError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Elevation data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    #[error(
        "Elevation grid of {rows}x{cols} samples is too small for a spline of degree {degree}"
    )]
    GridTooSmall {
        rows: usize,
        cols: usize,
        degree: usize,
    },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ordered_float::FloatIsNan> for HorizonError {
    fn from(_: ordered_float::FloatIsNan) -> Self {
        HorizonError::InvalidConfiguration("NaN encountered in an angular or metric input".into())
    }
}

impl PartialEq for HorizonError {
    fn eq(&self, other: &Self) -> bool {
        use HorizonError::*;
        match (self, other) {
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,
            (DataUnavailable(a), DataUnavailable(b)) => a == b,
            (NumericDegeneracy(a), NumericDegeneracy(b)) => a == b,
            (
                GridTooSmall {
                    rows: r1,
                    cols: c1,
                    degree: d1,
                },
                GridTooSmall {
                    rows: r2,
                    cols: c2,
                    degree: d2,
                },
            ) => r1 == r2 && c1 == c2 && d1 == d2,

            // io errors are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
