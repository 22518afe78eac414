//! Heat equation with Dirichlet boundary conditions.
//!
//! Propagates a Gaussian bump under $u_t = u_{xx}$ on $[-1, 1]$ with
//! $u(\pm 1) = 0$ and plots the snapshots into `heat_equation.png`.

use plotters::prelude::*;
use rusty_spectral::prelude::*;

pub fn main() {
    let prefs = Preferences::default();
    let interval = Interval::unit();

    // The operator u'' together with homogeneous Dirichlet conditions.
    let op = Operator::new(interval, Expr::u().diff(2)).with_boundary_conditions(BoundaryConditions::Dirichlet);

    let u0 = Chebfun::<f64>::construct(|x| (-20.0 * (x + 0.3).powi(2)).exp(), interval, &prefs).unwrap();
    let times = [0.0, 0.001, 0.01, 0.1, 0.5, 1.0];

    let semigroup = expm(&op, &times, &u0, &prefs).unwrap();

    for (t, u) in semigroup.iter() {
        println!(
            "t = {:<6} length = {:<4} max = {:1.4E}",
            t,
            u.length(),
            u.norm_inf()
        );
    }

    let root = BitMapBackend::new("heat_equation.png", (640, 480)).into_drawing_area();
    root.fill(&WHITE).unwrap();
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(-1.0..1.0, -0.05..1.05)
        .unwrap();

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("u(t, x)")
        .draw()
        .unwrap();

    for (index, (t, u)) in semigroup.iter().enumerate() {
        let color = Palette99::pick(index);
        chart
            .draw_series(LineSeries::new(
                (0..=400).map(|k| {
                    let x = -1.0 + k as f64 / 200.0;
                    (x, u.eval(x))
                }),
                &color,
            ))
            .unwrap()
            .label(format!("t = {}", t))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(index)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()
        .unwrap();
}
