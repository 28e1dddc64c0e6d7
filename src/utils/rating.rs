use serde::Serialize;

/// Arithmetic mean of a tool's ratings, 0 when it has none.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    sum as f64 / ratings.len() as f64
}

/// Round a mean to the one decimal place the catalog displays.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate review statistics shown on the moderation page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total: i64,
    pub average: f64,
    pub five_star: i64,
    pub low: i64,
}

impl ReviewStats {
    /// Build from the raw aggregate row; `average` is the unrounded mean.
    pub fn from_aggregate(total: i64, average: Option<f64>, five_star: i64, low: i64) -> Self {
        ReviewStats {
            total,
            average: round_rating(average.unwrap_or(0.0)),
            five_star,
            low,
        }
    }

    /// Same figures computed from an in-memory rating list.
    #[cfg(test)]
    pub fn from_ratings(ratings: &[i32]) -> Self {
        ReviewStats {
            total: ratings.len() as i64,
            average: round_rating(average_rating(ratings)),
            five_star: ratings.iter().filter(|r| **r == 5).count() as i64,
            low: ratings.iter().filter(|r| **r <= 2).count() as i64,
        }
    }
}
