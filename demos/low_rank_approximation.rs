//! Low-rank approximation of functions of two and three variables.
//!
//! Prints the rank of a few bivariate functions for decreasing tolerances
//! and checks the factorization $f = C D R^T$ at a point.

use rusty_spectral::prelude::*;

pub fn main() {
    let domain = Rectangle::default();

    let functions: Vec<(&str, Box<dyn Fn(f64, f64) -> f64>)> = vec![
        ("cos(xy)", Box::new(|x: f64, y: f64| (x * y).cos())),
        ("1 / (1 + 25 (x^2 + y^2))", Box::new(|x: f64, y: f64| 1.0 / (1.0 + 25.0 * (x * x + y * y)))),
        ("exp(-(x - y)^2)", Box::new(|x: f64, y: f64| (-(x - y).powi(2)).exp())),
    ];

    for (name, f) in functions.iter() {
        print!("{:<28}", name);
        for &tol in &[1E-4, 1E-8, 1E-12] {
            let prefs = Preferences::default().with_tolerance(tol);
            let approx = Chebfun2::construct(f, domain, &prefs).unwrap();
            print!(" rank {:>3} (tol {:1.0E})", approx.length(), tol);
        }
        println!();
    }

    // The factors reproduce the approximation.
    let prefs = Preferences::default();
    let approx = Chebfun2::<f64>::construct(|x, y| (x * y).cos(), domain, &prefs).unwrap();
    let (cols, diag, rows) = approx.cdr();
    let (x, y) = (0.3, -0.7);
    let from_factors: f64 = (0..approx.length()).map(|i| cols[i].eval(x) * diag[i] * rows[i].eval(y)).sum();
    println!(
        "cos(xy) at ({}, {}): factors {:1.15}, exact {:1.15}",
        x,
        y,
        from_factors,
        (x * y).cos()
    );

    let approx3 = Chebfun3::<f64>::construct(|x, y, z| (x + y + z).sin(), Cuboid::default(), &prefs).unwrap();
    println!("sin(x + y + z) has {} slice-tube terms", approx3.length());
}
