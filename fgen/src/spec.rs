use crate::*;

/// Input of a function generation task.
///
/// Angles are in radians. Rotation spans are signed.
#[derive(Clone)]
pub struct LinkageSpec<F> {
    /// Target function
    pub func: F,
    x_bound: [f64; 2],
    /// Input link `[start, rotation]`
    pub theta2: [f64; 2],
    /// Output link `[start, rotation]`
    pub theta4: [f64; 2],
}

// The target function is usually a closure
impl<F> std::fmt::Debug for LinkageSpec<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("LinkageSpec")
            .field("x_bound", &self.x_bound)
            .field("theta2", &self.theta2)
            .field("theta4", &self.theta4)
            .finish_non_exhaustive()
    }
}

impl<F: TargetFn> LinkageSpec<F> {
    /// Create a task over the domain `[x_min, x_max]`.
    ///
    /// All angles default to zero.
    pub fn new(func: F, [x_min, x_max]: [f64; 2]) -> Result<Self, SynError> {
        if !(x_min.is_finite() && x_max.is_finite() && x_max > x_min) {
            return Err(SynError::Domain { x_min, x_max });
        }
        Ok(Self {
            func,
            x_bound: [x_min, x_max],
            theta2: [0.; 2],
            theta4: [0.; 2],
        })
    }

    /// Set the start angle and the rotation span of the input link.
    pub fn theta2(self, start: f64, rot: f64) -> Self {
        Self { theta2: [start, rot], ..self }
    }

    /// Set the start angle and the rotation span of the output link.
    pub fn theta4(self, start: f64, rot: f64) -> Self {
        Self { theta4: [start, rot], ..self }
    }

    /// The domain `[x_min, x_max]`.
    pub fn x_bound(&self) -> [f64; 2] {
        self.x_bound
    }

    /// Base start angles `[θ2_start, θ4_start]`.
    pub fn start(&self) -> [f64; 2] {
        [self.theta2[0], self.theta4[0]]
    }

    /// Rotation spans `[θ2_rot, θ4_rot]`.
    pub fn rot(&self) -> [f64; 2] {
        [self.theta2[1], self.theta4[1]]
    }

    /// Sample the precision points and the function values at the domain
    /// ends.
    pub fn target(&self) -> Result<FnTarget, SynError> {
        FnTarget::new(&self.func, self.x_bound)
    }

    /// Create the sweep of this task.
    ///
    /// The function is evaluated here, evaluation errors are fatal.
    pub fn sweep<'a>(&self, cfg: SweepCfg) -> Result<Sweep<'a>, SynError> {
        if let Some(&a) = self.theta2.iter().chain(&self.theta4).find(|a| !a.is_finite()) {
            return Err(SynError::Angle(a));
        }
        Ok(Sweep::new(Grid::new(self.target()?, self.start(), self.rot(), cfg)?))
    }

    /// Run the synthesis.
    pub fn synthesize(&self, cfg: SweepCfg) -> Result<Solution, SynError> {
        Ok(self.sweep(cfg)?.solve())
    }
}
