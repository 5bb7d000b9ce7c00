//! Review count and average rating per company.
//!
//! Aggregation is a pure projection over a snapshot of reviews. Nothing here is
//! cached or written back to the company record. Rounding is left to consumers.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use super::domain::{AggregatedCompanyView, Company, CompanyId, Review};

/// Count and arithmetic mean of the ratings attached to one company.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub review_count: usize,
    /// Exactly `0.0` when `review_count` is zero.
    pub average_rating: f64,
}

impl RatingSummary {
    /// Summarises the reviews whose `company_id` equals `company_id`; other
    /// reviews in the slice are ignored.
    pub fn for_company(company_id: &CompanyId, reviews: &[Review]) -> Self {
        let mut accumulator = RatingAccumulator::default();
        for review in reviews.iter().filter(|review| &review.company_id == company_id) {
            accumulator.push(review);
        }
        accumulator.finish()
    }

    /// Average rounded to one decimal place, as shown next to a company name.
    pub fn rounded_to_tenth(&self) -> f64 {
        (self.average_rating * 10.0).round() / 10.0
    }

    /// Number of filled stars: the average rounded to the nearest integer.
    pub fn star_count(&self) -> u8 {
        self.average_rating.round().clamp(0.0, 5.0) as u8
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RatingAccumulator {
    count: usize,
    total: u64,
}

impl RatingAccumulator {
    fn push(&mut self, review: &Review) {
        self.count += 1;
        match review.rating {
            Some(rating) => self.total += u64::from(rating.value()),
            None => warn!(
                review_id = %review.id,
                company_id = %review.company_id,
                "review has no numeric rating, counting it as 0"
            ),
        }
    }

    fn finish(self) -> RatingSummary {
        let average_rating = if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        };

        RatingSummary {
            review_count: self.count,
            average_rating,
        }
    }
}

/// Per-company summaries built in one pass over the full review collection.
#[derive(Debug, Default)]
pub struct RatingIndex {
    summaries: HashMap<CompanyId, RatingSummary>,
}

impl RatingIndex {
    pub fn build(reviews: &[Review]) -> Self {
        let mut accumulators: HashMap<&CompanyId, RatingAccumulator> = HashMap::new();
        for review in reviews {
            accumulators
                .entry(&review.company_id)
                .or_default()
                .push(review);
        }

        let summaries = accumulators
            .into_iter()
            .map(|(company_id, accumulator)| (company_id.clone(), accumulator.finish()))
            .collect();

        Self { summaries }
    }

    /// Summary for a company, or the zero summary when it has no reviews.
    pub fn summary(&self, company_id: &CompanyId) -> RatingSummary {
        self.summaries
            .get(company_id)
            .copied()
            .unwrap_or_default()
    }

    /// Company ids referenced by reviews that are not in `companies`.
    pub fn dangling<'a>(&'a self, companies: &[Company]) -> Vec<&'a CompanyId> {
        let mut dangling: Vec<&CompanyId> = self
            .summaries
            .keys()
            .filter(|id| !companies.iter().any(|company| &company.id == *id))
            .collect();
        dangling.sort();
        dangling
    }
}

/// Joins companies with their rating summaries, preserving input order.
/// Reviews pointing at companies outside `companies` are left out of the result.
pub fn aggregate_companies(companies: Vec<Company>, reviews: &[Review]) -> Vec<AggregatedCompanyView> {
    let index = RatingIndex::build(reviews);

    for company_id in index.dangling(&companies) {
        warn!(%company_id, "reviews reference a company that does not exist");
    }

    companies
        .into_iter()
        .map(|company| {
            let rating = index.summary(&company.id);
            AggregatedCompanyView::new(company, rating)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::common::{company, review, review_without_rating};

    #[test]
    fn empty_review_set_yields_zero_summary() {
        let summary = RatingSummary::for_company(&CompanyId("C1".to_string()), &[]);
        assert_eq!(summary.review_count, 0);
        assert_eq!(summary.average_rating, 0.0);
    }

    #[test]
    fn average_is_arithmetic_mean_independent_of_order() {
        let forward = vec![review("C1", 3), review("C1", 5), review("C1", 4)];
        let mut backward = forward.clone();
        backward.reverse();

        let id = CompanyId("C1".to_string());
        let a = RatingSummary::for_company(&id, &forward);
        let b = RatingSummary::for_company(&id, &backward);

        assert_eq!(a.review_count, 3);
        assert!((a.average_rating - 4.0).abs() < f64::EPSILON);
        assert!((a.average_rating - b.average_rating).abs() < f64::EPSILON);
    }

    #[test]
    fn average_is_not_rounded() {
        let reviews = vec![review("C1", 4), review("C1", 4), review("C1", 5)];
        let summary = RatingSummary::for_company(&CompanyId("C1".to_string()), &reviews);

        assert!((summary.average_rating - 13.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.rounded_to_tenth(), 4.3);
        assert_eq!(summary.star_count(), 4);
    }

    #[test]
    fn missing_rating_counts_as_zero() {
        let reviews = vec![review("C1", 4), review_without_rating("C1")];
        let summary = RatingSummary::for_company(&CompanyId("C1".to_string()), &reviews);

        assert_eq!(summary.review_count, 2);
        assert!((summary.average_rating - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn other_companies_reviews_are_ignored() {
        let reviews = vec![review("C1", 2), review("C2", 5)];
        let summary = RatingSummary::for_company(&CompanyId("C1".to_string()), &reviews);

        assert_eq!(summary.review_count, 1);
        assert!((summary.average_rating - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregate_skips_dangling_reviews_and_keeps_order() {
        let companies = vec![company("C2", "Beta"), company("C1", "Acme")];
        let reviews = vec![review("C1", 5), review("ghost", 1), review("C1", 3)];

        let views = aggregate_companies(companies, &reviews);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id().as_str(), "C2");
        assert_eq!(views[0].rating, RatingSummary::default());
        assert_eq!(views[1].rating.review_count, 2);
        assert!((views[1].rating.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn index_reports_dangling_company_ids() {
        let companies = vec![company("C1", "Acme")];
        let reviews = vec![review("C1", 5), review("ghost", 1)];
        let index = RatingIndex::build(&reviews);

        let dangling = index.dangling(&companies);
        assert_eq!(dangling, vec![&CompanyId("ghost".to_string())]);
    }

    #[test]
    fn star_count_clamps_and_rounds() {
        let summary = RatingSummary {
            review_count: 2,
            average_rating: 4.5,
        };
        assert_eq!(summary.star_count(), 5);
        assert_eq!(RatingSummary::default().star_count(), 0);
    }
}
