use super::{logger::Logger, AnyResult};
use fgen::{csv, plot, Candidate, FourBarTy, LinkageSpec, SweepCfg, SweepStat};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

/// A synthesis job, angles are in degrees.
#[derive(clap::Args, serde::Serialize, serde::Deserialize)]
pub(super) struct Job {
    /// Target function of `x`, for example "x^2" or "ln(x)"
    #[clap(allow_hyphen_values = true)]
    func: String,
    /// Lower bound of the domain
    #[clap(long, allow_negative_numbers = true)]
    x_min: f64,
    /// Upper bound of the domain
    #[clap(long, allow_negative_numbers = true)]
    x_max: f64,
    /// Start angle of the input link
    #[clap(long, default_value_t = 0., allow_negative_numbers = true)]
    #[serde(default)]
    t2: f64,
    /// Rotation span of the input link, signed
    #[clap(long, default_value_t = 0., allow_negative_numbers = true)]
    #[serde(default)]
    t2_rot: f64,
    /// Start angle of the output link
    #[clap(long, default_value_t = 0., allow_negative_numbers = true)]
    #[serde(default)]
    t4: f64,
    /// Rotation span of the output link, signed
    #[clap(long, default_value_t = 0., allow_negative_numbers = true)]
    #[serde(default)]
    t4_rot: f64,
    #[clap(flatten)]
    #[serde(default)]
    cfg: SweepCfg,
}

#[derive(clap::Args)]
pub(super) struct Syn {
    #[clap(flatten)]
    job: Job,
    /// Output directory of the linkage, the candidate table and the plot
    #[clap(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct Run {
    /// Job file in RON format
    file: PathBuf,
    /// Output directory of the linkage, the candidate table and the plot
    #[clap(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct Pp {
    /// Target function of `x`
    #[clap(allow_hyphen_values = true)]
    func: String,
    /// Lower bound of the domain
    #[clap(long, allow_negative_numbers = true)]
    x_min: f64,
    /// Upper bound of the domain
    #[clap(long, allow_negative_numbers = true)]
    x_max: f64,
}

#[derive(serde::Serialize)]
struct Summary {
    visited: usize,
    accepted: usize,
    rejected: usize,
    early_exit: bool,
    spent: f64,
}

#[derive(serde::Serialize)]
struct Class {
    ty: FourBarTy,
    name: &'static str,
    valid: bool,
    grashof: bool,
    // Degrees
    theta2: f64,
    theta4: f64,
}

#[derive(serde::Serialize)]
struct Bound {
    x: [f64; 2],
    y: [f64; 2],
}

#[derive(serde::Serialize)]
struct Output<'a> {
    dir: &'a Path,
}

// Rejection counts as `kind=count` entries
pub(super) struct Rejections<'a>(pub(super) &'a SweepStat);

impl serde::Serialize for Rejections<'_> {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(self.0.rejections())
    }
}

pub(super) fn syn(syn: Syn, verbose: u8) -> AnyResult {
    let Syn { job, out } = syn;
    synthesize(job, out, verbose)
}

pub(super) fn run(run: Run, verbose: u8) -> AnyResult {
    let Run { file, out } = run;
    let job = ron::from_str(&std::fs::read_to_string(&file)?)?;
    synthesize(job, out, verbose)
}

pub(super) fn pp(pp: Pp) -> AnyResult {
    let Pp { func, x_min, x_max } = pp;
    let tar = LinkageSpec::new(parse_func(&func)?, [x_min, x_max])?.target()?;
    let mut log = Logger::new(std::io::stdout().lock());
    log.top_title("precision-points")?;
    log.log(&tar.pp)?;
    log.title("bound")?;
    log.log(Bound { x: tar.x_bound, y: tar.y_bound })?;
    log.flush()?;
    Ok(())
}

// Parse errors are fatal before the synthesis starts
fn parse_func(func: &str) -> AnyResult<impl Fn(f64) -> f64> {
    let invalid = |e: meval::Error| format!("invalid function \"{func}\": {e}");
    let expr = func.parse::<meval::Expr>().map_err(invalid)?;
    Ok(expr.bind("x").map_err(invalid)?)
}

fn synthesize(job: Job, out: Option<PathBuf>, verbose: u8) -> AnyResult {
    let spec = LinkageSpec::new(parse_func(&job.func)?, [job.x_min, job.x_max])?
        .theta2(job.t2.to_radians(), job.t2_rot.to_radians())
        .theta4(job.t4.to_radians(), job.t4_rot.to_radians());
    let quiet = verbose == 0 && std::env::var_os("RUST_LOG").is_none();
    let cfg = job.cfg.clone().silent(job.cfg.silent && quiet);
    let sweep = spec.sweep(cfg)?;
    // Diagnostic events share the terminal with the bar
    let pb = if sweep.grid().cfg().silent {
        ProgressBar::new(sweep.grid().len() as u64)
    } else {
        ProgressBar::hidden()
    };
    const STYLE: &str = "{elapsed_precise} {wide_bar} {pos}/{len} {msg}";
    pb.set_style(ProgressStyle::with_template(STYLE)?);
    let mut rows = Vec::new();
    let t0 = Instant::now();
    let s = sweep
        .callback(|step| {
            pb.set_position(step.visited as u64);
            if let Ok(c) = step.eval {
                rows.push(csv::Row::from(c));
            }
        })
        .solve();
    let spent = t0.elapsed();
    pb.finish_with_message(format!("| spent: {spent:?}"));
    tracing::info!(candidates = rows.len(), "sweep done");

    let mut log = Logger::new(std::io::stdout().lock());
    log.top_title("job")?;
    log.log(&job)?;
    log.title("statistics")?;
    log.log(Summary {
        visited: s.stat.visited,
        accepted: s.stat.accepted,
        rejected: s.stat.total_rejected(),
        early_exit: s.stat.early_exit,
        spent: spent.as_secs_f64(),
    })?;
    log.title("rejected")?;
    log.log(Rejections(&s.stat))?;
    log.flush()?;
    let best = s.into_best()?;
    log.title("linkage")?;
    log.log(&best)?;
    let ty = best.fb.ty();
    let [theta2, theta4] = best.start.map(f64::to_degrees);
    log.title("class")?;
    log.log(Class {
        ty,
        name: ty.name(),
        valid: ty.is_valid(),
        grashof: ty.is_grashof(),
        theta2,
        theta4,
    })?;
    if let Some(root) = out {
        write_output(&root, &best, &rows, spec.rot()[0])?;
        log.title("output")?;
        log.log(Output { dir: &root })?;
    }
    log.flush()?;
    Ok(())
}

fn write_output(root: &Path, best: &Candidate, rows: &[csv::Row], rot: f64) -> AnyResult {
    std::fs::create_dir_all(root)?;
    let pretty = ron::ser::PrettyConfig::default();
    std::fs::write(root.join("linkage.ron"), ron::ser::to_string_pretty(best, pretty)?)?;
    std::fs::write(root.join("candidates.csv"), csv::dump_csv(rows)?)?;
    let trace = best.fb.trace(best.start[0], rot, 180);
    let path = root.join("linkage.svg");
    let svg = plot::SVGBackend::new(&path, (800, 800));
    plot::linkage(svg, "Linkage", &trace)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_job_file() {
        let job = r#"(func: "x^2", x_min: 1.0, x_max: 2.0, t2_rot: 60.0, t4_rot: 90.0, cfg: (optimize: false))"#;
        let job = ron::from_str::<Job>(job).unwrap();
        assert_eq!(job.t2, 0.);
        assert_eq!(job.cfg, SweepCfg::new().optimize(false));
    }

    #[test]
    fn function_text() {
        let f = parse_func("ln(x) + x^2").unwrap();
        assert!((f(1.) - 1.).abs() < 1e-12);
        assert!(parse_func("x +").is_err());
        assert!(parse_func("y * 2").is_err());
    }

    #[test]
    fn write_files() {
        let spec = LinkageSpec::new(parse_func("x^2").unwrap(), [1., 2.])
            .unwrap()
            .theta2(0., 60f64.to_radians())
            .theta4(0., 90f64.to_radians());
        let best = spec.synthesize(SweepCfg::new().optimize(false)).unwrap().into_best().unwrap();
        let temp = temp_dir::TempDir::new().unwrap();
        let root = temp.path().join("square");
        let rows = [csv::Row::from(&best)];
        write_output(&root, &best, &rows, spec.rot()[0]).unwrap();
        for name in ["linkage.ron", "candidates.csv", "linkage.svg"] {
            assert!(root.join(name).is_file());
        }
        let back = ron::from_str::<Candidate>(&std::fs::read_to_string(root.join("linkage.ron")).unwrap());
        assert_eq!(back.unwrap().offset, best.offset);
        let table = csv::parse_csv::<csv::Row>(&std::fs::read_to_string(root.join("candidates.csv")).unwrap());
        assert_eq!(table.unwrap(), rows);
    }

    #[test]
    fn infeasible_job_is_an_error() {
        let job = Job {
            func: "x".to_string(),
            x_min: 1.,
            x_max: 2.,
            t2: 0.,
            t2_rot: 0.,
            t4: 0.,
            t4_rot: 0.,
            cfg: SweepCfg::new().optimize(false),
        };
        let temp = temp_dir::TempDir::new().unwrap();
        let out = temp.path().join("out");
        let e = synthesize(job, Some(out.clone()), 0).unwrap_err();
        assert_eq!(e.to_string(), "no feasible linkage found");
        assert!(!out.exists());
    }
}
