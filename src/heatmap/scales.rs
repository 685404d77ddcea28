//! Positional scales
//!
//! `BandScale` maps an ordered list of discrete values onto equal, unpadded
//! bands of a pixel range. A reversed range (start > stop) lays the first value
//! out at the far end, which is how decades grow upward on screen.
//!
//! `LinearScale` is the continuous mapping used by the legend axis.

/// Discrete value → pixel band
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<i32>,
    start: f64,
    stop: f64,
}

impl BandScale {
    pub fn new(domain: Vec<i32>, start: f64, stop: f64) -> Self {
        Self {
            domain,
            start,
            stop,
        }
    }

    pub fn domain(&self) -> &[i32] {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    fn reversed(&self) -> bool {
        self.stop < self.start
    }

    fn range_min(&self) -> f64 {
        self.start.min(self.stop)
    }

    /// Width of a single band
    pub fn bandwidth(&self) -> f64 {
        if self.domain.is_empty() {
            return 0.0;
        }
        (self.stop - self.start).abs() / self.domain.len() as f64
    }

    /// Leading pixel of the band at a domain index
    fn position_of_index(&self, index: usize) -> f64 {
        let slot = if self.reversed() {
            self.domain.len() - 1 - index
        } else {
            index
        };
        self.range_min() + slot as f64 * self.bandwidth()
    }

    /// Leading pixel of the band for `value` (None if not in the domain)
    pub fn position(&self, value: i32) -> Option<f64> {
        self.domain
            .iter()
            .position(|&v| v == value)
            .map(|i| self.position_of_index(i))
    }

    /// Domain index of the band covering `pixel`, clamped to the domain bounds
    ///
    /// Pixels before the first band resolve to the first slot and pixels past
    /// the last band to the last slot. None only for an empty domain.
    pub fn clamped_index_at(&self, pixel: f64) -> Option<usize> {
        let n = self.domain.len();
        let bandwidth = self.bandwidth();
        if n == 0 || bandwidth <= 0.0 || !pixel.is_finite() {
            return if n == 0 { None } else { Some(0) };
        }

        let slot = ((pixel - self.range_min()) / bandwidth).floor();
        let slot = slot.clamp(0.0, (n - 1) as f64) as usize;
        Some(if self.reversed() { n - 1 - slot } else { slot })
    }

    /// Domain value of the band covering `pixel`, clamped to the domain bounds
    pub fn clamped_value_at(&self, pixel: f64) -> Option<i32> {
        self.clamped_index_at(pixel).map(|i| self.domain[i])
    }

    /// Domain values whose band overlaps `[lo, hi]`, even partially
    pub fn values_overlapping(&self, lo: f64, hi: f64) -> Vec<i32> {
        let bandwidth = self.bandwidth();
        self.domain
            .iter()
            .enumerate()
            .filter(|&(i, _)| {
                let start = self.position_of_index(i);
                !(start + bandwidth < lo || start > hi)
            })
            .map(|(_, &v)| v)
            .collect()
    }
}

/// Continuous domain → pixel mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return (d0 + d1) / 2.0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Round tick values covering the domain, roughly `count` of them
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        if count == 0 || !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }

        let step = tick_step(lo, hi, count);
        if step < 1.0 {
            // Divide by the inverse so 3 * 0.1 prints as 0.3
            let inverse = (1.0 / step).round();
            let first = (lo * inverse).ceil() as i64;
            let last = (hi * inverse).floor() as i64;
            (first..=last).map(|i| i as f64 / inverse).collect()
        } else {
            let first = (lo / step).ceil() as i64;
            let last = (hi / step).floor() as i64;
            (first..=last).map(|i| i as f64 * step).collect()
        }
    }
}

/// 1, 2 or 5 times a power of ten, close to (hi - lo) / count
pub fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo).abs() / count.max(1) as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}
