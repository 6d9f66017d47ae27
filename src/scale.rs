//! Continuous domain → range mappings used to place values on a canvas.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range, clamp: false }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        // Degenerate domain maps everything to the range midpoint (d3 does the same)
        if span == 0.0 {
            return (r0 + r1) / 2.0;
        }
        let mut t = (v - d0) / span;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + t * (r1 - r0)
    }
}

/// Base-10 log scale. Input is always clamped to the domain, which keeps
/// zero and negative values (e.g. an artist with no followers) on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let lo = d0.min(d1);
        let hi = d0.max(d1);
        let v = v.clamp(lo, hi);
        LinearScale::new((d0.log10(), d1.log10()), self.range).apply(v.log10())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        let y = LinearScale::new((0.0, 100.0), (210.0, 40.0));
        assert_eq!(y.apply(0.0), 210.0);
        assert_eq!(y.apply(100.0), 40.0);
        assert_eq!(y.apply(50.0), 125.0);
        // Unclamped extrapolates
        assert_eq!(y.apply(200.0), -130.0);
    }

    #[test]
    fn test_linear_scale_clamped() {
        let x = LinearScale::new((0.0, 7.0), (60.0, 870.0)).clamped();
        assert_eq!(x.apply(-1.0), 60.0);
        assert_eq!(x.apply(12.0), 870.0);
        assert!((x.apply(3.5) - 465.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_domain() {
        let s = LinearScale::new((5.0, 5.0), (0.0, 10.0));
        assert_eq!(s.apply(5.0), 5.0);
    }

    #[test]
    fn test_log_scale() {
        let s = LogScale::new((1e5, 1e8), (0.0, 3.0));
        assert!((s.apply(1e6) - 1.0).abs() < 1e-9);
        assert!((s.apply(1e7) - 2.0).abs() < 1e-9);
        // Clamped at both ends, zero included
        assert_eq!(s.apply(0.0), 0.0);
        assert!((s.apply(1e12) - 3.0).abs() < 1e-9);
    }
}
