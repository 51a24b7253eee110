use crate::error::UsageError;

pub const DEFAULT_PERCENTILE_SET: &str = "99,95,90,75";

/// A percentile as configured, e.g. `"99"` selects the 0.99 rank and is
/// rendered as `"99pt"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Percentile {
    pub label: String,
    pub fraction: f64,
}

impl Percentile {
    pub fn new(label: &str, fraction: f64) -> Self {
        Percentile {
            label: label.to_string(),
            fraction,
        }
    }

    pub fn key(&self) -> String {
        format!("{}pt", self.label)
    }

    /// Nearest-rank index into `count` ascending values.
    ///
    /// `round(count * fraction) - 1`, clamped to `0..count`. `count` must be non-zero.
    pub fn rank_index(&self, count: usize) -> usize {
        let rank = (count as f64 * self.fraction).round() as i64 - 1;
        rank.clamp(0, count as i64 - 1) as usize
    }
}

/// Parses a comma-separated percent list. Empty segments are skipped; the
/// token itself is kept as the label.
pub fn parse_percentile_set(set: &str) -> Result<Vec<Percentile>, UsageError> {
    set.split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let percent = token
                .parse::<f64>()
                .map_err(|_| UsageError::InvalidPercentile {
                    token: token.to_string(),
                })?;
            if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
                return Err(UsageError::PercentileOutOfRange {
                    token: token.to_string(),
                });
            }
            Ok(Percentile::new(token, percent / 100.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::error::UsageError;
    use crate::percentile::{parse_percentile_set, Percentile, DEFAULT_PERCENTILE_SET};

    #[test]
    fn test_parse_default_set() {
        let percentiles = parse_percentile_set(DEFAULT_PERCENTILE_SET).unwrap();
        assert_eq!(
            percentiles,
            vec![
                Percentile::new("99", 0.99),
                Percentile::new("95", 0.95),
                Percentile::new("90", 0.9),
                Percentile::new("75", 0.75),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_token_as_label() {
        let percentiles = parse_percentile_set("99.9,50").unwrap();
        assert_eq!(percentiles[0].key(), "99.9pt");
        assert!((percentiles[0].fraction - 0.999).abs() < 1e-12);
        assert_eq!(percentiles[1].key(), "50pt");
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        assert_eq!(
            parse_percentile_set("90,,75,").unwrap(),
            vec![Percentile::new("90", 0.9), Percentile::new("75", 0.75)]
        );
        assert!(parse_percentile_set("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        match parse_percentile_set("99,abc,90") {
            Err(UsageError::InvalidPercentile { token }) => assert_eq!(token, "abc"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(parse_percentile_set(" 95").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        for token in ["0", "-5", "150", "NaN", "inf"] {
            match parse_percentile_set(token) {
                Err(UsageError::PercentileOutOfRange { token: t }) => assert_eq!(t, token),
                other => panic!("unexpected result for {}: {:?}", token, other),
            }
        }
        assert!(parse_percentile_set("100").is_ok());
    }

    #[test]
    fn test_rank_index() {
        assert_eq!(Percentile::new("90", 0.9).rank_index(2), 1);
        assert_eq!(Percentile::new("100", 1.0).rank_index(5), 4);
        assert_eq!(Percentile::new("50", 0.5).rank_index(4), 1);
        assert_eq!(Percentile::new("20", 0.2).rank_index(5), 0);
    }

    #[test]
    fn test_rank_index_clamps_underflow() {
        // round(3 * 0.1) == 0
        assert_eq!(Percentile::new("10", 0.1).rank_index(3), 0);
        assert_eq!(Percentile::new("1", 0.01).rank_index(1), 0);
    }
}
