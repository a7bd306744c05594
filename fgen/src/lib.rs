//! Function generation of planar four-bar linkages with three precision
//! points.
//!
//! The target function is sampled at three Chebyshev-spaced points, both
//! domain and range are mapped to link angles, and Freudenstein's equation
//! is solved for the link ratios. The start angles of the input and output
//! links are swept over a full rotation to pick the best-conditioned
//! linkage.
//!
//! ```
//! use fgen::{LinkageSpec, SweepCfg};
//!
//! let spec = LinkageSpec::new(|x: f64| x * x, [1., 2.])
//!     .unwrap()
//!     .theta2(0., 60f64.to_radians())
//!     .theta4(0., 90f64.to_radians());
//! let s = spec.synthesize(SweepCfg::new().optimize(false)).unwrap();
//! let best = s.best.unwrap();
//! assert_eq!(best.fb.l1, 1.);
//! ```
#![cfg_attr(doc_cfg, feature(doc_cfg))]
pub use crate::{error::*, fb::*, freudenstein::*, func::*, mapping::*, pp::*, spec::*, sweep::*};

#[cfg(feature = "csv")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "csv")))]
pub mod csv;
mod error;
mod fb;
mod freudenstein;
mod func;
mod mapping;
#[cfg(feature = "plot")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "plot")))]
pub mod plot;
mod pp;
mod spec;
mod sweep;
#[cfg(test)]
mod tests;
pub mod validity;
