pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    /// Sample variance (n - 1 denominator); undefined below two samples.
    pub fn variance(samples: &[f64]) -> Option<f64> {
        if samples.len() < 2 {
            return None;
        }
        let mean = Self::mean(samples)?;
        let ss: f64 = samples.iter().map(|&v| (v - mean).powi(2)).sum();
        Some(ss / (samples.len() - 1) as f64)
    }

    /// Subtracts the sequence's own mean from every element.
    pub fn demean(samples: &[f64]) -> Vec<f64> {
        match Self::mean(samples) {
            Some(mean) => samples.iter().map(|v| v - mean).collect(),
            None => Vec::new(),
        }
    }

    /// Root-mean-square deviation between two equal-length sequences.
    pub fn rmsd(a: &[f64], b: &[f64]) -> Option<f64> {
        if a.is_empty() || a.len() != b.len() {
            return None;
        }
        let diff: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
        Some(Self::rms(&diff))
    }

    /// Pearson correlation; `None` when either side has no spread.
    pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
        if a.len() < 2 || a.len() != b.len() {
            return None;
        }
        let mean_a = Self::mean(a)?;
        let mean_b = Self::mean(b)?;
        let mut cov = 0.0;
        let mut ss_a = 0.0;
        let mut ss_b = 0.0;
        for (x, y) in a.iter().zip(b) {
            let da = x - mean_a;
            let db = y - mean_b;
            cov += da * db;
            ss_a += da * da;
            ss_b += db * db;
        }
        let denom = (ss_a * ss_b).sqrt();
        if denom <= f64::EPSILON {
            return None;
        }
        Some((cov / denom).clamp(-1.0, 1.0))
    }
}
