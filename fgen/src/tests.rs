use crate::{validity::Filter, *};
use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use std::f64::consts::TAU;

fn square() -> LinkageSpec<fn(f64) -> f64> {
    LinkageSpec::new((|x| x * x) as fn(f64) -> f64, [1., 2.])
        .unwrap()
        .theta2(0., 60f64.to_radians())
        .theta4(0., 90f64.to_radians())
}

#[test]
fn chebyshev_three_points() {
    let [x1, x2, x3] = chebyshev(1., 2.);
    let d = 0.25 * 3f64.sqrt();
    assert_abs_diff_eq!(x1, 1.5 + d, epsilon = 1e-12);
    assert_abs_diff_eq!(x2, 1.5, epsilon = 1e-12);
    assert_abs_diff_eq!(x3, 1.5 - d, epsilon = 1e-12);
    assert!(x1 > x2 && x2 > x3);
}

#[test]
fn sample_precision_points() {
    let pp = PrecisionPoints::sample(&|x: f64| 2. * x, [1., 2.]).unwrap();
    for [x, y] in pp.iter() {
        assert_abs_diff_eq!(y, 2. * x);
    }
    let tar = FnTarget::new(&|x: f64| x * x, [1., 2.]).unwrap();
    assert_eq!(tar.y_bound, [1., 4.]);
}

#[test]
fn fatal_errors() {
    let e = LinkageSpec::new(|x: f64| x, [2., 1.]).unwrap_err();
    assert!(matches!(e, SynError::Domain { .. }));
    let spec = LinkageSpec::new(|x: f64| x, [1., 2.]).unwrap();
    assert!(format!("{spec:?}").starts_with("LinkageSpec { x_bound: [1.0, 2.0]"));
    let spec = LinkageSpec::new(|x: f64| x.ln(), [-1., 1.]).unwrap();
    let e = spec.synthesize(SweepCfg::new()).unwrap_err();
    assert!(matches!(e, SynError::Eval { source: EvalError::Undefined(_), .. }));
    let e = square().synthesize(SweepCfg::new().step(7)).unwrap_err();
    assert!(matches!(e, SynError::Config(_)));
    let e = square().theta4(f64::NAN, 1.).synthesize(SweepCfg::new()).unwrap_err();
    assert!(matches!(e, SynError::Angle(_)));
}

proptest! {
    #[test]
    fn mapping_hits_both_ends(
        x_min in -5f64..5.,
        width in 0.1f64..5.,
        start in -10f64..10.,
        rot in -10f64..10.,
    ) {
        let x_max = x_min + width;
        let tar = FnTarget::new(&|x: f64| x.exp(), [x_min, x_max]).unwrap();
        let m = AngleMapping::new(&tar, [start, -start], [rot, -rot]).unwrap();
        let tol = 1e-9 * (1. + start.abs() + rot.abs());
        prop_assert!((m.input.map(x_min) - start).abs() < tol);
        prop_assert!((m.input.map(x_max) - (start + rot)).abs() < tol);
        let [y_min, y_max] = tar.y_bound;
        prop_assert!((m.output.map(y_min) + start).abs() < tol);
        prop_assert!((m.output.map(y_max) + start + rot).abs() < tol);
    }
}

#[test]
fn flat_range_mapping() {
    let tar = FnTarget::new(&|x: f64| (x - 1.5).powi(2), [1., 2.]).unwrap();
    let e = AngleMapping::new(&tar, [0.; 2], [1.; 2]).unwrap_err();
    assert_eq!(e, Reject::Mapping);
}

#[test]
fn freudenstein_residual() {
    let tar = square().target().unwrap();
    let starts = [30f64.to_radians(), 60f64.to_radians()];
    let m = AngleMapping::new(&tar, starts, square().rot()).unwrap();
    let pairs = m.pairs(&tar.pp);
    let k = FreudensteinCoef::solve(&pairs).unwrap();
    for pair in pairs {
        assert_abs_diff_eq!(k.residual(pair), 0., epsilon = 1e-9);
    }
}

#[test]
fn freudenstein_singular() {
    let pairs = [[0.3, 1.2]; 3];
    assert_eq!(FreudensteinCoef::solve(&pairs), Err(Reject::Singular));
}

#[test]
fn dimension_synthesis() {
    let k = FreudensteinCoef { k1: 0.8, k2: 1.6, k3: 0.3 };
    let fb = FourBar::from_coef(&k).unwrap();
    assert_eq!(fb.l1, 1.);
    assert_abs_diff_eq!(fb.l4, 1.25);
    assert_abs_diff_eq!(fb.l2, 0.625);
    let l3_2 = 1. + fb.l2 * fb.l2 + fb.l4 * fb.l4 - 2. * fb.l2 * fb.l4 * k.k3;
    assert_abs_diff_eq!(fb.l3 * fb.l3, l3_2, epsilon = 1e-12);
    // Recover a known linkage
    let k = FreudensteinCoef::from_loop([1., 2., 2.5, 3.]);
    let fb = FourBar::from_coef(&k).unwrap();
    assert_abs_diff_eq!(&fb.planar_loop()[..], &[1., 2., 2.5, 3.][..], epsilon = 1e-12);
}

#[test]
fn dimension_rejects() {
    let k = FreudensteinCoef { k1: 0., k2: 1., k3: 0. };
    assert_eq!(FourBar::from_coef(&k), Err(Reject::Coefficient));
    let k = FreudensteinCoef { k1: 1., k2: 1., k3: 10. };
    assert_eq!(FourBar::from_coef(&k), Err(Reject::NoRealCoupler));
}

#[test]
fn validity_filter() {
    let off = Filter { grashof: false, closure: false };
    let neg = FourBar::new([1., -0.5, 1., 1.]);
    assert_eq!(off.check(&neg, 0.), Err(Reject::NonPositive));
    assert_eq!(Filter::new().check(&FourBar::new([1., 0.5, 0., 1.]), 0.), Err(Reject::NonPositive));
    // BD = 0.5 at zero input angle, BD + r4 < r3
    let open = FourBar::new([1., 0.5, 3., 1.]);
    assert_eq!(Filter::new().check(&open, 0.), Err(Reject::NotClosed));
    assert_eq!(off.check(&open, 0.), Ok(()));
    let all = Filter { grashof: true, closure: true };
    assert_eq!(all.check(&open, 0.), Err(Reject::NonGrashof));
    let crank_rocker = FourBar::new([90., 35., 70., 70.]);
    assert_eq!(all.check(&crank_rocker, 0.), Ok(()));
}

#[test]
fn linkage_type() {
    assert_eq!(FourBar::new([90., 35., 70., 70.]).ty(), FourBarTy::GCRR);
    assert_eq!(FourBar::new([35., 90., 70., 70.]).ty(), FourBarTy::GCCC);
    assert_eq!(FourBar::new([1., 0.5, 3., 1.]).ty(), FourBarTy::Invalid);
    assert!(!FourBar::new([1., 1.1, 1.2, 2.5]).ty().is_grashof());
}

#[test]
fn position_closes_loop() {
    let fb = FourBar::new([1., 0.4, 1.1, 0.8]);
    let [a, b, c, d] = fb.pos(1.).unwrap();
    let dist = |[x1, y1]: [f64; 2], [x2, y2]: [f64; 2]| (x2 - x1).hypot(y2 - y1);
    assert_abs_diff_eq!(dist(a, b), fb.l2, epsilon = 1e-12);
    assert_abs_diff_eq!(dist(b, c), fb.l3, epsilon = 1e-12);
    assert_abs_diff_eq!(dist(c, d), fb.l4, epsilon = 1e-12);
    assert_abs_diff_eq!(dist(a, d), fb.l1, epsilon = 1e-12);
    // A crank rocker turns a full rotation
    let fb = FourBar::new([90., 35., 70., 70.]);
    assert_eq!(fb.trace(0., TAU, 36).len(), 37);
    assert!(FourBar::new([1., 0.5, 3., 1.]).pos(0.).is_none());
}

#[test]
fn identity_without_rotation_is_infeasible() {
    let spec = LinkageSpec::new(|x: f64| x, [1., 2.]).unwrap();
    let s = spec.synthesize(SweepCfg::new().optimize(false)).unwrap();
    assert!(!s.is_feasible());
    assert_eq!(s.stat.visited, 72 * 72);
    assert_eq!(s.stat.rejected(Reject::Singular), 72 * 72);
    assert!(!s.stat.early_exit);
    assert_eq!(s.into_best(), Err(SynError::NoFeasible));
}

#[test]
fn flat_range_is_infeasible() {
    let spec = LinkageSpec::new(|x: f64| (x - 1.5).powi(2), [1., 2.])
        .unwrap()
        .theta2(0., 1.)
        .theta4(0., 1.);
    let s = spec.synthesize(SweepCfg::new()).unwrap();
    assert!(s.best.is_none());
    assert_eq!(s.stat.rejected(Reject::Mapping), s.stat.visited);
}

#[test]
fn first_found() {
    let mut calls = 0;
    let mut last_improved = false;
    let s = square()
        .sweep(SweepCfg::new().optimize(false))
        .unwrap()
        .callback(|step| {
            calls += 1;
            last_improved = step.improved;
        })
        .solve();
    assert_eq!(calls, s.stat.visited);
    assert!(last_improved);
    let best = s.best.unwrap();
    assert_eq!(best.offset, [70, 255]);
    // Scan order: 14 full rows then 52 cells
    assert_eq!(s.stat.visited, 1060);
    assert!(s.stat.early_exit);
    assert_eq!(s.stat.accepted, 1);
    let expected = [1., 0.12004285539862736, 1.0375393493248157, 0.09480304542346861];
    assert_abs_diff_eq!(&best.fb.planar_loop()[..], &expected[..], epsilon = 1e-9);
}

#[test]
fn first_found_is_first_valid_cell() {
    let grid = square().sweep(SweepCfg::new().optimize(false)).unwrap();
    let first = grid.grid().cells().position(|c| grid.grid().eval(c).is_ok());
    let s = grid.solve();
    assert_eq!(first.map(|n| n + 1), Some(s.stat.visited));
}

#[test]
fn optimize_range() {
    let mut costs = Vec::new();
    let s = square()
        .sweep(SweepCfg::new().parallel(false))
        .unwrap()
        .callback(|step| {
            if let (true, Ok(c)) = (step.improved, step.eval) {
                costs.push(c.cost);
            }
        })
        .solve();
    assert!(costs.windows(2).all(|w| w[1] < w[0]));
    let best = s.best.clone().unwrap();
    assert_eq!(best.offset, [205, 55]);
    assert_abs_diff_eq!(best.cost, 0.709944671326282, epsilon = 1e-9);
    assert_eq!(costs.last().copied(), Some(best.cost));
    assert_eq!(s.stat.visited, 72 * 72);
    assert!(!s.stat.early_exit);
    assert_eq!(s.stat.accepted + s.stat.total_rejected(), s.stat.visited);
    assert_eq!(best.fb.l1, 1.);
    assert_eq!(Filter::new().check(&best.fb, best.start[0]), Ok(()));
}

#[test]
fn parallel_matches_sequential() {
    let seq = square().synthesize(SweepCfg::new().parallel(false)).unwrap();
    let par = square().synthesize(SweepCfg::new().parallel(true)).unwrap();
    assert_eq!(seq, par);
    let cfg = SweepCfg::new().min_range(0.8);
    let seq = square().synthesize(cfg.clone().parallel(false)).unwrap();
    let par = square().synthesize(cfg.parallel(true)).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn optimize_early_exit() {
    let s = square().synthesize(SweepCfg::new().min_range(1.)).unwrap();
    assert!(s.stat.early_exit);
    assert_eq!(s.stat.visited, 1060);
    assert_eq!(s.best.unwrap().offset, [70, 255]);
}

#[test]
fn optimize_max_len() {
    let s = square().synthesize(SweepCfg::new().metric(Metric::MaxLen)).unwrap();
    let best = s.best.unwrap();
    assert_eq!(best.cost, best.fb.max_len());
    let range = square().synthesize(SweepCfg::new()).unwrap().best.unwrap();
    assert!(best.cost <= range.fb.max_len());
}

#[test]
fn relaxed_filter_finds_earlier() {
    let strict = square().synthesize(SweepCfg::new().optimize(false)).unwrap();
    let relaxed = square()
        .synthesize(SweepCfg::new().optimize(false).validity(false))
        .unwrap();
    assert!(relaxed.stat.visited <= strict.stat.visited);
    assert_eq!(relaxed.stat.rejected(Reject::NotClosed), 0);
    let grashof = square()
        .synthesize(SweepCfg::new().optimize(false).grashof(true))
        .unwrap();
    assert!(grashof.best.unwrap().fb.ty().is_grashof());
    assert!(grashof.stat.rejected(Reject::NonGrashof) > 0);
}

#[test]
fn range_scale_does_not_matter() {
    for k in [1e-13, 1e6] {
        let spec = LinkageSpec::new(move |x: f64| k * x * x, [1., 2.])
            .unwrap()
            .theta2(0., 60f64.to_radians())
            .theta4(0., 90f64.to_radians());
        let s = spec.synthesize(SweepCfg::new().optimize(false)).unwrap();
        assert_eq!(s.stat.rejected(Reject::Mapping), 0);
        assert_eq!(s.best.unwrap().offset, [70, 255]);
    }
}

#[test]
fn diagnostics_keep_results() {
    for cfg in [SweepCfg::new(), SweepCfg::new().optimize(false), SweepCfg::new().min_range(1.)] {
        let quiet = square().synthesize(cfg.clone().silent(true)).unwrap();
        let loud = square().synthesize(cfg.silent(false)).unwrap();
        assert_eq!(quiet, loud);
    }
}
