//! Linear axis scales for the density plots.

/// Maps a data interval onto a pixel interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Data value to pixel. A collapsed domain maps to the start of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Pixel to data value. A collapsed range maps to the start of the domain.
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        if span == 0.0 || !span.is_finite() {
            return d0;
        }
        d0 + (pixel - r0) / span * (d1 - d0)
    }

    /// Round tick values inside the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let Some(step) = nice_step(hi - lo, count) else {
            return Vec::new();
        };

        let first = (lo / step).ceil() as i64;
        let last = (hi / step + 1e-9).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Smallest step of the form {1, 2, 5, 10}·10^k that splits `span` into at
/// most `segments` pieces.
fn nice_step(span: f64, segments: usize) -> Option<f64> {
    if !(span.is_finite() && span > 0.0) {
        return None;
    }
    let raw = span / segments.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    for mult in [1.0, 2.0, 5.0] {
        let step = mult * magnitude;
        if step >= raw {
            return Some(step);
        }
    }
    Some(10.0 * magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_and_invert() {
        let scale = LinearScale::new((-2.0, 2.0), (0.0, 100.0));
        assert_eq!(scale.map(-2.0), 0.0);
        assert_eq!(scale.map(0.0), 50.0);
        assert_eq!(scale.map(2.0), 100.0);
        assert_eq!(scale.invert(75.0), 1.0);
    }

    #[test]
    fn test_inverted_range() {
        // Screen y grows downwards
        let scale = LinearScale::new((0.0, 1.0), (80.0, 0.0));
        assert_eq!(scale.map(0.0), 80.0);
        assert_eq!(scale.map(1.0), 0.0);
        assert_eq!(scale.invert(40.0), 0.5);
    }

    #[test]
    fn test_collapsed_domain() {
        let scale = LinearScale::new((3.0, 3.0), (10.0, 20.0));
        assert_eq!(scale.map(3.0), 10.0);
        assert!(scale.ticks(5).is_empty());
    }

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(7.0, 5), Some(2.0));
        assert_eq!(nice_step(10.0, 5), Some(2.0));
        assert_eq!(nice_step(1.0, 4), Some(0.5));
        assert_eq!(nice_step(0.0, 4), None);
    }

    #[test]
    fn test_ticks_are_round_and_inside() {
        let scale = LinearScale::new((-3.5, 3.5), (0.0, 135.0));
        let ticks = scale.ticks(5);
        assert_eq!(ticks, vec![-2.0, 0.0, 2.0]);
    }
}
