use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// CQC key-question rating grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatingGrade {
    Outstanding,
    Good,
    RequiresImprovement,
    Inadequate,
}

impl RatingGrade {
    pub fn parse(value: &str) -> Option<RatingGrade> {
        match value.trim().to_lowercase().as_str() {
            "outstanding" => Some(RatingGrade::Outstanding),
            "good" => Some(RatingGrade::Good),
            "requires improvement" => Some(RatingGrade::RequiresImprovement),
            "inadequate" => Some(RatingGrade::Inadequate),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingGrade::Outstanding => "Outstanding",
            RatingGrade::Good => "Good",
            RatingGrade::RequiresImprovement => "Requires Improvement",
            RatingGrade::Inadequate => "Inadequate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentCounts {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    /// Precomputed upstream; scoring recomputes from the raw counts.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RegulatorRating {
    pub well_led: Option<RatingGrade>,
    pub effective: Option<RatingGrade>,
    pub last_inspection_date: Option<NaiveDate>,
    pub staff_sentiment: Option<SentimentCounts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewSource {
    Indeed,
    IndeedUk,
    Glassdoor,
}

impl ReviewSource {
    pub fn parse(value: &str) -> Option<ReviewSource> {
        match value.trim().to_lowercase().as_str() {
            "indeed" => Some(ReviewSource::Indeed),
            "indeed_uk" | "indeed-uk" => Some(ReviewSource::IndeedUk),
            "glassdoor" => Some(ReviewSource::Glassdoor),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReviewSource::Indeed => "indeed",
            ReviewSource::IndeedUk => "indeed_uk",
            ReviewSource::Glassdoor => "glassdoor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewSentiment {
    Positive,
    Mixed,
    Negative,
    Neutral,
}

impl ReviewSentiment {
    pub fn parse(value: &str) -> Option<ReviewSentiment> {
        match value.trim().to_uppercase().as_str() {
            "POSITIVE" => Some(ReviewSentiment::Positive),
            "MIXED" => Some(ReviewSentiment::Mixed),
            "NEGATIVE" => Some(ReviewSentiment::Negative),
            "NEUTRAL" => Some(ReviewSentiment::Neutral),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReviewSentiment::Positive => "POSITIVE",
            ReviewSentiment::Mixed => "MIXED",
            ReviewSentiment::Negative => "NEGATIVE",
            ReviewSentiment::Neutral => "NEUTRAL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmployeeReview {
    pub source: ReviewSource,
    pub rating: f64,
    pub sentiment: ReviewSentiment,
    pub text: Option<String>,
    pub author: String,
    pub posted_at: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CareHomeRecord {
    pub id: Uuid,
    pub location_id: String,
    pub name: String,
    pub rating: RegulatorRating,
    pub reviews: Vec<EmployeeReview>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreCategory {
    Excellent,
    Good,
    Adequate,
    Concerning,
    Poor,
}

impl ScoreCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreCategory::Excellent => "EXCELLENT",
            ScoreCategory::Good => "GOOD",
            ScoreCategory::Adequate => "ADEQUATE",
            ScoreCategory::Concerning => "CONCERNING",
            ScoreCategory::Poor => "POOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlagSeverity {
    Red,
    Yellow,
}

impl FlagSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            FlagSeverity::Red => "RED",
            FlagSeverity::Yellow => "YELLOW",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Flag {
    pub severity: FlagSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeightedComponent {
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponents {
    pub well_led: WeightedComponent,
    pub effective: WeightedComponent,
    pub regulator_sentiment: WeightedComponent,
    pub employee_sentiment: Option<WeightedComponent>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewThemes {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataQuality {
    pub cqc_data_age: String,
    pub review_count: usize,
    pub has_insufficient_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffQualityScore {
    pub overall_score: f64,
    pub category: ScoreCategory,
    pub confidence: Confidence,
    pub components: ScoreComponents,
    pub flags: Vec<Flag>,
    pub themes: ReviewThemes,
    pub data_quality: DataQuality,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredHome {
    pub location_id: String,
    pub name: String,
    pub score: StaffQualityScore,
}
