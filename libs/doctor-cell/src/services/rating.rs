use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::DoctorRating;

/// Aggregate rating over a doctor's overall feedback scores.
///
/// Zero scores mean "not rated" and are left out of both the mean and the count.
pub fn summarize(overall_ratings: &[i32]) -> DoctorRating {
    let rated: Vec<i64> = overall_ratings
        .iter()
        .filter(|rating| **rating > 0)
        .map(|rating| i64::from(*rating))
        .collect();

    if rated.is_empty() {
        return DoctorRating::default();
    }

    let count = rated.len() as i64;
    let sum: i64 = rated.iter().sum();
    let average = (Decimal::from(sum) / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    DoctorRating {
        average_rating: average,
        total_reviews: count as i32,
    }
}
