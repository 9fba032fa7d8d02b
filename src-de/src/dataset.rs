use ndarray::{Array1, Array2};

use crate::error::{DDEError, Result};

/// Owned feature matrix and labels
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl Dataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        check_shape(&x, &y)?;
        Ok(Self { x, y })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn context(&self) -> EvaluationContext<'_> {
        EvaluationContext { x: &self.x, y: &self.y }
    }
}

/// One train/validation partition
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Read-only data shared by every evaluation of one run.
///
/// It borrows the caller's arrays for the duration of `fit`; dropping it at
/// the end of the run is what releases the data.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(x: &'a Array2<f64>, y: &'a Array1<f64>) -> Result<Self> {
        check_shape(x, y)?;
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &'a Array2<f64> {
        self.x
    }

    pub fn y(&self) -> &'a Array1<f64> {
        self.y
    }
}

fn check_shape(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(DDEError::DatasetShape { x_rows: x.nrows(), y_rows: y.len() });
    }
    Ok(())
}
