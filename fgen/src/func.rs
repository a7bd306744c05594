use crate::EvalError;

/// Target function `y = f(x)` of the function generator.
///
/// Any `Fn(f64) -> f64` is a target function, non-finite outputs are treated
/// as undefined points. Evaluators that parse text should implement this
/// trait to report their own errors.
pub trait TargetFn {
    /// Evaluate the function at `x`.
    fn eval(&self, x: f64) -> Result<f64, EvalError>;
}

impl<F> TargetFn for F
where
    F: Fn(f64) -> f64,
{
    fn eval(&self, x: f64) -> Result<f64, EvalError> {
        let y = self(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(EvalError::Undefined(x))
        }
    }
}
