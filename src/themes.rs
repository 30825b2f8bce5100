use crate::models::{EmployeeReview, ReviewThemes};

const MANAGEMENT_THEME: &str = "Management supportive & approachable";
const TRAINING_THEME: &str = "Good training program";
const UNDERSTAFFED_THEME: &str = "Understaffed during peak shifts";
const PAY_THEME: &str = "Pay concerns mentioned";

/// Pulls recurring themes out of review free text. Keyword matching today;
/// the trait keeps the scoring arithmetic independent of how themes are found.
pub trait ThemeExtractor {
    fn extract(&self, reviews: &[EmployeeReview]) -> ReviewThemes;
}

pub struct KeywordThemeExtractor;

impl ThemeExtractor for KeywordThemeExtractor {
    fn extract(&self, reviews: &[EmployeeReview]) -> ReviewThemes {
        let mut themes = ReviewThemes::default();

        for review in reviews {
            let Some(text) = review.text.as_deref() else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            let text = text.to_lowercase();

            if text.contains("supportive")
                || text.contains("good training")
                || text.contains("management")
            {
                push_unique(&mut themes.positive, MANAGEMENT_THEME);
            }
            if text.contains("training") {
                push_unique(&mut themes.positive, TRAINING_THEME);
            }
            if mentions_staffing_shortage(Some(text.as_str())) {
                push_unique(&mut themes.negative, UNDERSTAFFED_THEME);
            }
            if text.contains("pay") || text.contains("salary") || text.contains("wage") {
                push_unique(&mut themes.negative, PAY_THEME);
            }
        }

        themes
    }
}

pub fn mentions_staffing_shortage(text: Option<&str>) -> bool {
    let Some(text) = text else {
        return false;
    };
    let text = text.to_lowercase();
    text.contains("understaff") || text.contains("shortage")
}

fn push_unique(list: &mut Vec<String>, theme: &str) {
    if !list.iter().any(|existing| existing == theme) {
        list.push(theme.to_string());
    }
}
