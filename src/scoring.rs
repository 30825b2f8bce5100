use chrono::{Datelike, NaiveDate};

use crate::models::{
    CareHomeRecord, Confidence, DataQuality, EmployeeReview, Flag, FlagSeverity, RatingGrade,
    RegulatorRating, ReviewSentiment, ScoreCategory, ScoreComponents, ScoredHome,
    SentimentCounts, StaffQualityScore, WeightedComponent,
};
use crate::themes::{self, KeywordThemeExtractor, ThemeExtractor};

#[derive(Debug, Clone, Copy)]
struct BlendWeights {
    well_led: f64,
    effective: f64,
    regulator_sentiment: f64,
    employee_sentiment: f64,
}

const WEIGHTS_WITH_REVIEWS: BlendWeights = BlendWeights {
    well_led: 0.40,
    effective: 0.20,
    regulator_sentiment: 0.10,
    employee_sentiment: 0.30,
};

// Employee weight folds back into the regulator signals when reviews are thin.
const WEIGHTS_WITHOUT_REVIEWS: BlendWeights = BlendWeights {
    well_led: 0.45,
    effective: 0.25,
    regulator_sentiment: 0.30,
    employee_sentiment: 0.0,
};

const MIN_QUALIFYING_REVIEWS: usize = 3;
const DEFAULT_INSPECTION_AGE_MONTHS: i64 = 24;

pub fn well_led_score(grade: Option<RatingGrade>) -> f64 {
    match grade {
        Some(RatingGrade::Outstanding) => 95.0,
        Some(RatingGrade::Good) => 75.0,
        Some(RatingGrade::RequiresImprovement) => 40.0,
        Some(RatingGrade::Inadequate) => 10.0,
        None => 50.0,
    }
}

pub fn effective_score(grade: Option<RatingGrade>) -> f64 {
    match grade {
        Some(RatingGrade::Outstanding) => 90.0,
        Some(RatingGrade::Good) => 70.0,
        Some(RatingGrade::RequiresImprovement) => 35.0,
        Some(RatingGrade::Inadequate) => 5.0,
        None => 50.0,
    }
}

/// Net sentiment ratio mapped onto [0,100]; 50 is the neutral prior.
/// Recomputed from raw counts, ignoring any upstream-precomputed score.
pub fn regulator_sentiment_score(counts: Option<&SentimentCounts>) -> f64 {
    let Some(counts) = counts else {
        return 50.0;
    };
    let total = counts.positive + counts.neutral + counts.negative;
    if total == 0 {
        return 50.0;
    }
    let net = counts.positive as f64 - counts.negative as f64;
    50.0 + 50.0 * net / total as f64
}

/// None when fewer than three qualifying reviews exist; a thin review set is
/// insufficient data, not neutral data.
pub fn employee_sentiment_score(reviews: &[EmployeeReview]) -> Option<f64> {
    let mut positive = 0usize;
    let mut mixed = 0usize;
    let mut negative = 0usize;

    for review in reviews {
        match review.sentiment {
            ReviewSentiment::Positive => positive += 1,
            ReviewSentiment::Mixed => mixed += 1,
            ReviewSentiment::Negative => negative += 1,
            ReviewSentiment::Neutral => {}
        }
    }

    let qualifying = positive + mixed + negative;
    if qualifying < MIN_QUALIFYING_REVIEWS {
        return None;
    }

    Some((100.0 * positive as f64 + 50.0 * mixed as f64) / qualifying as f64)
}

/// Whole calendar months from the last inspection to `today`. Absent dates
/// count as 24 months, i.e. stale. May be negative for future-dated records.
pub fn inspection_age_months(last_inspection: Option<NaiveDate>, today: NaiveDate) -> i64 {
    let Some(inspected) = last_inspection else {
        return DEFAULT_INSPECTION_AGE_MONTHS;
    };
    let mut months = (today.year() as i64 - inspected.year() as i64) * 12
        + (today.month() as i64 - inspected.month() as i64);
    if today.day() < inspected.day() {
        months -= 1;
    }
    months
}

pub fn categorize(overall_score: f64) -> ScoreCategory {
    if overall_score >= 90.0 {
        ScoreCategory::Excellent
    } else if overall_score >= 75.0 {
        ScoreCategory::Good
    } else if overall_score >= 60.0 {
        ScoreCategory::Adequate
    } else if overall_score >= 40.0 {
        ScoreCategory::Concerning
    } else {
        ScoreCategory::Poor
    }
}

pub fn confidence(inspection_age_months: i64, review_count: usize) -> Confidence {
    if inspection_age_months < 6 && review_count >= 5 {
        Confidence::High
    } else if inspection_age_months < 12 && review_count >= 3 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn collect_flags(
    rating: &RegulatorRating,
    reviews: &[EmployeeReview],
    inspection_age_months: i64,
    employee_score: Option<f64>,
) -> Vec<Flag> {
    let mut flags = Vec::new();

    if let Some(grade @ (RatingGrade::RequiresImprovement | RatingGrade::Inadequate)) =
        rating.well_led
    {
        flags.push(Flag {
            severity: FlagSeverity::Red,
            message: format!(
                "Well-led rated '{}' at last inspection; leadership and management concerns",
                grade.label()
            ),
        });
    }

    if inspection_age_months > 18 {
        flags.push(Flag {
            severity: FlagSeverity::Yellow,
            message: format!(
                "Last inspection {inspection_age_months} months ago; regulator data may be outdated"
            ),
        });
    }

    if !reviews.is_empty()
        && reviews
            .iter()
            .all(|review| themes::mentions_staffing_shortage(review.text.as_deref()))
    {
        flags.push(Flag {
            severity: FlagSeverity::Red,
            message: "Understaffing mentioned in every employee review".to_string(),
        });
    }

    if rating.well_led == Some(RatingGrade::Outstanding) {
        if let Some(score) = employee_score {
            if score < 40.0 {
                flags.push(Flag {
                    severity: FlagSeverity::Yellow,
                    message: "Outstanding well-led rating conflicts with poor employee sentiment"
                        .to_string(),
                });
            }
        }
    }

    flags
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn render_data_age(inspection_age_months: i64) -> String {
    if inspection_age_months <= 0 {
        "Recent".to_string()
    } else {
        format!("{inspection_age_months} months ago")
    }
}

pub fn score_staff_quality(
    rating: &RegulatorRating,
    reviews: &[EmployeeReview],
    today: NaiveDate,
) -> StaffQualityScore {
    score_with_extractor(&KeywordThemeExtractor, rating, reviews, today)
}

pub fn score_with_extractor(
    extractor: &dyn ThemeExtractor,
    rating: &RegulatorRating,
    reviews: &[EmployeeReview],
    today: NaiveDate,
) -> StaffQualityScore {
    let well_led = well_led_score(rating.well_led);
    let effective = effective_score(rating.effective);
    let regulator_sentiment = regulator_sentiment_score(rating.staff_sentiment.as_ref());
    let employee_sentiment = employee_sentiment_score(reviews);

    let weights = if employee_sentiment.is_some() {
        WEIGHTS_WITH_REVIEWS
    } else {
        WEIGHTS_WITHOUT_REVIEWS
    };

    let mut overall = well_led * weights.well_led
        + effective * weights.effective
        + regulator_sentiment * weights.regulator_sentiment;
    if let Some(score) = employee_sentiment {
        overall += score * weights.employee_sentiment;
    }
    let overall = round_to_one_decimal(overall);

    let age_months = inspection_age_months(rating.last_inspection_date, today);

    StaffQualityScore {
        overall_score: overall,
        category: categorize(overall),
        confidence: confidence(age_months, reviews.len()),
        components: ScoreComponents {
            well_led: WeightedComponent {
                score: well_led,
                weight: weights.well_led,
            },
            effective: WeightedComponent {
                score: effective,
                weight: weights.effective,
            },
            regulator_sentiment: WeightedComponent {
                score: regulator_sentiment,
                weight: weights.regulator_sentiment,
            },
            employee_sentiment: employee_sentiment.map(|score| WeightedComponent {
                score,
                weight: weights.employee_sentiment,
            }),
        },
        flags: collect_flags(rating, reviews, age_months, employee_sentiment),
        themes: extractor.extract(reviews),
        data_quality: DataQuality {
            cqc_data_age: render_data_age(age_months),
            review_count: reviews.len(),
            has_insufficient_data: employee_sentiment.is_none(),
        },
    }
}

/// Score every home and rank lowest first, so the homes needing attention lead.
pub fn score_homes(homes: &[CareHomeRecord], today: NaiveDate) -> Vec<ScoredHome> {
    let mut scored: Vec<ScoredHome> = homes
        .iter()
        .map(|home| ScoredHome {
            location_id: home.location_id.clone(),
            name: home.name.clone(),
            score: score_staff_quality(&home.rating, &home.reviews, today),
        })
        .collect();

    scored.sort_by(|a, b| {
        a.score
            .overall_score
            .partial_cmp(&b.score.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

#[cfg(test)]
mod tests {
    use chrono::Months;
    use uuid::Uuid;

    use super::*;
    use crate::models::ReviewSource;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    fn months_ago(months: u32) -> NaiveDate {
        today().checked_sub_months(Months::new(months)).unwrap()
    }

    fn review(sentiment: ReviewSentiment) -> EmployeeReview {
        EmployeeReview {
            source: ReviewSource::Indeed,
            rating: 3.5,
            sentiment,
            text: None,
            author: "Care Assistant".to_string(),
            posted_at: months_ago(1),
        }
    }

    fn review_with_text(sentiment: ReviewSentiment, text: &str) -> EmployeeReview {
        EmployeeReview {
            text: Some(text.to_string()),
            ..review(sentiment)
        }
    }

    fn rating(
        well_led: Option<RatingGrade>,
        effective: Option<RatingGrade>,
        inspected_months_ago: u32,
    ) -> RegulatorRating {
        RegulatorRating {
            well_led,
            effective,
            last_inspection_date: Some(months_ago(inspected_months_ago)),
            staff_sentiment: None,
        }
    }

    fn counts(positive: u32, neutral: u32, negative: u32) -> SentimentCounts {
        SentimentCounts {
            positive,
            neutral,
            negative,
            score: None,
        }
    }

    #[test]
    fn rating_maps_follow_expected_tiers() {
        assert_eq!(well_led_score(Some(RatingGrade::Outstanding)), 95.0);
        assert_eq!(well_led_score(Some(RatingGrade::Good)), 75.0);
        assert_eq!(well_led_score(Some(RatingGrade::RequiresImprovement)), 40.0);
        assert_eq!(well_led_score(Some(RatingGrade::Inadequate)), 10.0);
        assert_eq!(well_led_score(None), 50.0);

        assert_eq!(effective_score(Some(RatingGrade::Outstanding)), 90.0);
        assert_eq!(effective_score(Some(RatingGrade::Good)), 70.0);
        assert_eq!(effective_score(Some(RatingGrade::RequiresImprovement)), 35.0);
        assert_eq!(effective_score(Some(RatingGrade::Inadequate)), 5.0);
        assert_eq!(effective_score(None), 50.0);
    }

    #[test]
    fn regulator_sentiment_maps_net_ratio_onto_score() {
        assert_eq!(regulator_sentiment_score(None), 50.0);
        assert_eq!(regulator_sentiment_score(Some(&counts(0, 0, 0))), 50.0);
        assert_eq!(regulator_sentiment_score(Some(&counts(4, 0, 0))), 100.0);
        assert_eq!(regulator_sentiment_score(Some(&counts(0, 0, 4))), 0.0);
        assert_eq!(regulator_sentiment_score(Some(&counts(3, 0, 3))), 50.0);
        assert_eq!(regulator_sentiment_score(Some(&counts(8, 2, 0))), 90.0);
    }

    #[test]
    fn employee_score_requires_three_qualifying_reviews() {
        let mut reviews = vec![
            review(ReviewSentiment::Positive),
            review(ReviewSentiment::Positive),
        ];
        reviews.extend(std::iter::repeat_with(|| review(ReviewSentiment::Neutral)).take(10));
        assert_eq!(employee_sentiment_score(&reviews), None);

        reviews.push(review(ReviewSentiment::Negative));
        let score = employee_sentiment_score(&reviews).unwrap();
        assert!((score - 200.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn employee_score_weights_mixed_reviews_at_half() {
        let reviews = vec![
            review(ReviewSentiment::Positive),
            review(ReviewSentiment::Mixed),
            review(ReviewSentiment::Negative),
        ];
        let score = employee_sentiment_score(&reviews).unwrap();
        assert!((score - 50.0).abs() < 0.001);
    }

    #[test]
    fn category_boundaries_use_greater_or_equal() {
        assert_eq!(categorize(90.0), ScoreCategory::Excellent);
        assert_eq!(categorize(89.9), ScoreCategory::Good);
        assert_eq!(categorize(75.0), ScoreCategory::Good);
        assert_eq!(categorize(60.0), ScoreCategory::Adequate);
        assert_eq!(categorize(59.9), ScoreCategory::Concerning);
        assert_eq!(categorize(40.0), ScoreCategory::Concerning);
        assert_eq!(categorize(39.9), ScoreCategory::Poor);
    }

    #[test]
    fn overall_score_stays_in_range_at_the_extremes() {
        let mut best = rating(
            Some(RatingGrade::Outstanding),
            Some(RatingGrade::Outstanding),
            1,
        );
        best.staff_sentiment = Some(counts(10, 0, 0));
        let reviews: Vec<_> = std::iter::repeat_with(|| review(ReviewSentiment::Positive))
            .take(6)
            .collect();
        let top = score_staff_quality(&best, &reviews, today());
        assert!(top.overall_score <= 100.0);

        let mut worst = rating(
            Some(RatingGrade::Inadequate),
            Some(RatingGrade::Inadequate),
            30,
        );
        worst.staff_sentiment = Some(counts(0, 0, 10));
        let reviews: Vec<_> = std::iter::repeat_with(|| review(ReviewSentiment::Negative))
            .take(6)
            .collect();
        let bottom = score_staff_quality(&worst, &reviews, today());
        assert!(bottom.overall_score >= 0.0);
    }

    #[test]
    fn weights_redistribute_when_reviews_are_missing() {
        let mut input = rating(Some(RatingGrade::Good), Some(RatingGrade::Good), 2);
        input.staff_sentiment = Some(counts(5, 0, 0));

        let without = score_staff_quality(&input, &[], today());
        let expected = round_to_one_decimal(75.0 * 0.45 + 70.0 * 0.25 + 100.0 * 0.30);
        assert!((without.overall_score - expected).abs() < 0.001);
        assert!(without.components.employee_sentiment.is_none());
        assert!(without.data_quality.has_insufficient_data);

        let reviews: Vec<_> = std::iter::repeat_with(|| review(ReviewSentiment::Positive))
            .take(3)
            .collect();
        let with = score_staff_quality(&input, &reviews, today());
        // 75*0.40 + 70*0.20 + 100*0.10 + 100*0.30
        assert!((with.overall_score - 84.0).abs() < 0.001);
        let employee = with.components.employee_sentiment.unwrap();
        assert!((employee.weight - 0.30).abs() < 0.001);
        assert!(!with.data_quality.has_insufficient_data);
    }

    #[test]
    fn confidence_needs_recent_inspection_and_enough_reviews() {
        assert_eq!(confidence(3, 6), Confidence::High);
        assert_eq!(confidence(8, 3), Confidence::Medium);
        assert_eq!(confidence(20, 1), Confidence::Low);
        assert_eq!(confidence(3, 2), Confidence::Low);
        assert_eq!(confidence(13, 10), Confidence::Low);
    }

    #[test]
    fn inspection_age_defaults_to_stale_when_date_is_missing() {
        assert_eq!(inspection_age_months(None, today()), 24);
        assert_eq!(inspection_age_months(Some(months_ago(3)), today()), 3);

        // Day of month not yet reached: 2026-07-15 -> 2026-08-01 is 0 whole months.
        let inspected = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        assert_eq!(inspection_age_months(Some(inspected), today()), 0);
    }

    #[test]
    fn leadership_and_stale_inspection_flags_co_occur() {
        let input = rating(Some(RatingGrade::Inadequate), Some(RatingGrade::Good), 25);
        let result = score_staff_quality(&input, &[], today());

        assert!(result
            .flags
            .iter()
            .any(|flag| flag.severity == FlagSeverity::Red
                && flag.message.contains("Well-led rated 'Inadequate'")));
        assert!(result
            .flags
            .iter()
            .any(|flag| flag.severity == FlagSeverity::Yellow
                && flag.message.contains("25 months ago")));
    }

    #[test]
    fn understaffing_flag_requires_every_review_to_mention_it() {
        let input = rating(Some(RatingGrade::Good), Some(RatingGrade::Good), 2);

        let all_mention = vec![
            review_with_text(ReviewSentiment::Negative, "Understaffed every weekend"),
            review_with_text(ReviewSentiment::Negative, "Constant staff shortages"),
            review_with_text(ReviewSentiment::Mixed, "shortage of senior carers"),
        ];
        let flagged = score_staff_quality(&input, &all_mention, today());
        assert!(flagged
            .flags
            .iter()
            .any(|flag| flag.severity == FlagSeverity::Red
                && flag.message.contains("Understaffing")));

        let mut one_silent = all_mention.clone();
        one_silent.push(review(ReviewSentiment::Positive));
        let unflagged = score_staff_quality(&input, &one_silent, today());
        assert!(!unflagged
            .flags
            .iter()
            .any(|flag| flag.message.contains("Understaffing")));
    }

    #[test]
    fn conflicting_signals_flag_fires_on_outstanding_with_poor_reviews() {
        let input = rating(Some(RatingGrade::Outstanding), Some(RatingGrade::Good), 2);
        let reviews = vec![
            review(ReviewSentiment::Negative),
            review(ReviewSentiment::Negative),
            review(ReviewSentiment::Negative),
        ];
        let result = score_staff_quality(&input, &reviews, today());
        assert!(result
            .flags
            .iter()
            .any(|flag| flag.severity == FlagSeverity::Yellow
                && flag.message.contains("conflicts")));
    }

    #[test]
    fn scores_blend_per_the_published_weights() {
        let mut input = rating(Some(RatingGrade::Outstanding), Some(RatingGrade::Good), 3);
        input.staff_sentiment = Some(counts(8, 2, 0));

        let mut reviews: Vec<_> = std::iter::repeat_with(|| review(ReviewSentiment::Positive))
            .take(4)
            .collect();
        reviews.push(review(ReviewSentiment::Negative));

        let result = score_staff_quality(&input, &reviews, today());

        // 95*0.40 + 70*0.20 + 90*0.10 + 80*0.30 = 85.0
        assert!((result.overall_score - 85.0).abs() < 0.001);
        assert_eq!(result.category, ScoreCategory::Good);
        assert_eq!(result.confidence, Confidence::High);

        let employee = result.components.employee_sentiment.unwrap();
        assert!((employee.score - 80.0).abs() < 0.001);
        assert_eq!(result.data_quality.review_count, 5);
        assert_eq!(result.data_quality.cqc_data_age, "3 months ago");
        assert!(result.flags.is_empty());
    }

    #[test]
    fn homes_are_ranked_lowest_score_first() {
        let home = |name: &str, grade: RatingGrade| CareHomeRecord {
            id: Uuid::new_v4(),
            location_id: format!("1-{name}"),
            name: name.to_string(),
            rating: rating(Some(grade), Some(grade), 2),
            reviews: Vec::new(),
        };

        let homes = vec![
            home("Willow Grange", RatingGrade::Outstanding),
            home("Harbour View", RatingGrade::Inadequate),
        ];
        let scored = score_homes(&homes, today());
        assert_eq!(scored[0].name, "Harbour View");
        assert!(scored[0].score.overall_score <= scored[1].score.overall_score);
    }
}
