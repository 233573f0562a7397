#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub t: f64,
    pub cps: f64,
}

impl ChartPoint {
    pub fn new(t: f64, cps: f64) -> Self {
        Self { t, cps }
    }
}

impl From<(f64, f64)> for ChartPoint {
    fn from(v: (f64, f64)) -> Self {
        ChartPoint { t: v.0, cps: v.1 }
    }
}

impl From<ChartPoint> for (f64, f64) {
    fn from(p: ChartPoint) -> Self {
        (p.t, p.cps)
    }
}
