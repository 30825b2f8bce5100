use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{ScoredHome, WeightedComponent};

pub fn build_report(scored: &[ScoredHome], generated_on: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Staff Quality Report");
    let _ = writeln!(
        output,
        "Generated {} for {} care home(s), ranked lowest score first",
        generated_on,
        scored.len()
    );

    if scored.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No care homes matched the requested scope.");
        return output;
    }

    for home in scored {
        let score = &home.score;

        let _ = writeln!(output);
        let _ = writeln!(output, "## {} ({})", home.name, home.location_id);
        let _ = writeln!(
            output,
            "Overall {:.1} [{}], confidence {}",
            score.overall_score,
            score.category.label(),
            score.confidence.label()
        );

        let _ = writeln!(output);
        let _ = writeln!(output, "### Components");
        write_component(&mut output, "Well-led", &score.components.well_led);
        write_component(&mut output, "Effective", &score.components.effective);
        write_component(
            &mut output,
            "Regulator sentiment",
            &score.components.regulator_sentiment,
        );
        match &score.components.employee_sentiment {
            Some(component) => write_component(&mut output, "Employee sentiment", component),
            None => {
                let _ = writeln!(output, "- Employee sentiment: insufficient reviews");
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Flags");
        if score.flags.is_empty() {
            let _ = writeln!(output, "No flags raised.");
        } else {
            for flag in &score.flags {
                let _ = writeln!(output, "- [{}] {}", flag.severity.label(), flag.message);
            }
        }

        if !score.themes.positive.is_empty() || !score.themes.negative.is_empty() {
            let _ = writeln!(output);
            let _ = writeln!(output, "### Review Themes");
            for theme in &score.themes.positive {
                let _ = writeln!(output, "- (+) {theme}");
            }
            for theme in &score.themes.negative {
                let _ = writeln!(output, "- (-) {theme}");
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Data quality: inspection {}, {} review(s){}",
            score.data_quality.cqc_data_age,
            score.data_quality.review_count,
            if score.data_quality.has_insufficient_data {
                ", insufficient review data for employee sentiment"
            } else {
                ""
            }
        );
    }

    output
}

fn write_component(output: &mut String, label: &str, component: &WeightedComponent) {
    let _ = writeln!(
        output,
        "- {}: {:.1} (weight {:.2})",
        label, component.score, component.weight
    );
}
