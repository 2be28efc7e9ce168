//! Aggregate rating for a movie's review set.
//!
//! Always computed from the reviews at hand, never cached, so a read that
//! follows a review mutation sees the mutation.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: u64,
}

/// Mean of the ratings rounded to one decimal place; 0 for the empty set.
pub fn aggregate(ratings: &[i32]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary {
            average_rating: 0.0,
            total_reviews: 0,
        };
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    RatingSummary {
        average_rating: round_one_decimal(mean),
        total_reviews: ratings.len() as u64,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_zero() {
        let summary = aggregate(&[]);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.total_reviews, 0);
    }

    #[test]
    fn single_review_is_its_rating() {
        let summary = aggregate(&[5]);
        assert_eq!(summary.average_rating, 5.0);
        assert_eq!(summary.total_reviews, 1);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        // (5 + 4 + 4) / 3 = 4.333...
        let summary = aggregate(&[5, 4, 4]);
        assert_eq!(summary.average_rating, 4.3);

        // (5 + 4) / 2 = 4.5 stays exact
        let summary = aggregate(&[5, 4]);
        assert_eq!(summary.average_rating, 4.5);

        // (1 + 1 + 2) / 3 = 1.333... rounds down
        let summary = aggregate(&[1, 1, 2]);
        assert_eq!(summary.average_rating, 1.3);
    }

    #[test]
    fn counts_every_review() {
        let summary = aggregate(&[1, 2, 3, 4, 5]);
        assert_eq!(summary.total_reviews, 5);
        assert_eq!(summary.average_rating, 3.0);
    }
}
