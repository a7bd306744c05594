//! The functions used to plot the synthesized linkage.
//!
//! ```
//! use fgen::{plot, FourBar};
//!
//! let fb = FourBar::new([1., 0.6, 1.01, 0.3]);
//! let trace = fb.trace(3.6, 1., 60);
//! let mut buf = String::new();
//! let svg = plot::SVGBackend::with_string(&mut buf, (800, 800));
//! plot::linkage(svg, "Linkage", &trace).unwrap();
//! ```
#[doc(no_inline)]
pub use plotters::{prelude::*, *};

/// Result type of the drawing backend `B`.
pub type PResult<T, B> = Result<T, DrawingAreaErrorKind<<B as DrawingBackend>::ErrorType>>;

/// Get font setting.
pub fn font() -> TextStyle<'static> {
    ("Times New Roman", 24).into_font().color(&BLACK)
}

/// Plot the joint trace `[A, B, C, D]` of a linkage.
///
/// The driver tip B and the follower tip C are drawn as curves, the links
/// are drawn at the first position.
pub fn linkage<B>(backend: B, title: &str, trace: &[[[f64; 2]; 4]]) -> PResult<(), B>
where
    B: DrawingBackend,
{
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let b = trace.iter().map(|[_, b, ..]| *b).collect::<Vec<_>>();
    let c = trace.iter().map(|[_, _, c, _]| *c).collect::<Vec<_>>();
    let joints = trace.first().copied().unwrap_or_default();
    let [x_min, x_max, y_min, y_max] = bounding_box(&[&b[..], &c[..], &joints[..]]);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, font())
        .set_label_area_size(LabelAreaPosition::Left, (8).percent())
        .set_label_area_size(LabelAreaPosition::Bottom, (4).percent())
        .margin((8).percent())
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_label_style(font())
        .y_label_style(font())
        .draw()?;
    for (i, (label, curve)) in [("Driver", &b), ("Follower", &c)].into_iter().enumerate() {
        let color = Palette99::pick(i);
        chart
            .draw_series(LineSeries::new(curve.iter().map(|&[x, y]| (x, y)), &color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    if let Some([p1, p2, p3, p4]) = trace.first() {
        let links = [[p1, p2], [p2, p3], [p3, p4]]
            .map(|[a, b]| PathElement::new(vec![(a[0], a[1]), (b[0], b[1])], BLACK.stroke_width(3)));
        chart.draw_series(links)?;
        let ground = PathElement::new(vec![(p1[0], p1[1]), (p4[0], p4[1])], BLACK.mix(0.4));
        chart.draw_series([ground])?;
        let dots = [p1, p2, p3, p4].map(|p| Circle::new((p[0], p[1]), 5, BLACK.filled()));
        chart.draw_series(dots)?;
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .label_font(font())
        .draw()?;
    Ok(())
}

/// Get the square bounding box `[x_min, x_max, y_min, y_max]` of the points.
pub fn bounding_box(curves: &[&[[f64; 2]]]) -> [f64; 4] {
    let [mut x_min, mut x_max] = [f64::INFINITY, -f64::INFINITY];
    let [mut y_min, mut y_max] = [f64::INFINITY, -f64::INFINITY];
    for &[x, y] in curves.iter().flat_map(|c| c.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && y_min.is_finite()) {
        return [-1., 1., -1., 1.];
    }
    let dx = x_max - x_min;
    let dy = y_max - y_min;
    let r = dx.max(dy).max(f64::EPSILON) * 0.55;
    let [cx, cy] = [(x_min + x_max) * 0.5, (y_min + y_max) * 0.5];
    [cx - r, cx + r, cy - r, cy + r]
}
