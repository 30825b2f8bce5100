use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    CareHomeRecord, EmployeeReview, RatingGrade, RegulatorRating, ReviewSentiment, ReviewSource,
    SentimentCounts,
};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let homes = vec![
        (
            Uuid::parse_str("7b3f0d6e-8a14-4a1f-9b30-5f4c2f0f71aa")?,
            "1-1023456789",
            "Willow Grange",
            Some("Outstanding"),
            Some("Good"),
            NaiveDate::from_ymd_opt(2026, 5, 12),
            Some((8, 2, 0, 0.8f32)),
        ),
        (
            Uuid::parse_str("0ac1d2b9-63fe-4c56-8c11-d9b2a4c5e210")?,
            "1-2034567890",
            "Harbour View",
            Some("Requires Improvement"),
            Some("Requires Improvement"),
            NaiveDate::from_ymd_opt(2024, 6, 3),
            Some((1, 3, 6, -0.5f32)),
        ),
        (
            Uuid::parse_str("e5d9f1c7-40b8-49d3-9f21-7a86b0c3dd45")?,
            "1-3045678901",
            "Meadowcroft House",
            None,
            None,
            None,
            None,
        ),
    ];

    for (id, location_id, name, well_led, effective, inspected, sentiment) in homes {
        let (positive, neutral, negative, score) = match sentiment {
            Some((p, n, neg, s)) => (Some(p), Some(n), Some(neg), Some(s)),
            None => (None, None, None, None),
        };
        sqlx::query(
            r#"
            INSERT INTO staff_quality.care_homes
            (id, location_id, name, well_led, effective, last_inspection_date,
             sentiment_positive, sentiment_neutral, sentiment_negative, sentiment_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (location_id) DO UPDATE
            SET name = EXCLUDED.name,
                well_led = EXCLUDED.well_led,
                effective = EXCLUDED.effective,
                last_inspection_date = EXCLUDED.last_inspection_date,
                sentiment_positive = EXCLUDED.sentiment_positive,
                sentiment_neutral = EXCLUDED.sentiment_neutral,
                sentiment_negative = EXCLUDED.sentiment_negative,
                sentiment_score = EXCLUDED.sentiment_score
            "#,
        )
        .bind(id)
        .bind(location_id)
        .bind(name)
        .bind(well_led)
        .bind(effective)
        .bind(inspected)
        .bind(positive)
        .bind(neutral)
        .bind(negative)
        .bind(score)
        .execute(pool)
        .await?;
    }

    let reviews = vec![
        (
            "seed-001",
            "1-1023456789",
            "indeed",
            4.5f32,
            "POSITIVE",
            Some("Supportive management and good training from the start"),
            "Care Assistant",
            NaiveDate::from_ymd_opt(2026, 6, 20).context("invalid date")?,
        ),
        (
            "seed-002",
            "1-1023456789",
            "glassdoor",
            4.0f32,
            "POSITIVE",
            Some("Training programme is excellent, residents are lovely"),
            "Senior Carer",
            NaiveDate::from_ymd_opt(2026, 5, 2).context("invalid date")?,
        ),
        (
            "seed-003",
            "1-1023456789",
            "indeed_uk",
            4.0f32,
            "POSITIVE",
            None,
            "Night Carer",
            NaiveDate::from_ymd_opt(2026, 4, 11).context("invalid date")?,
        ),
        (
            "seed-004",
            "1-1023456789",
            "indeed",
            5.0f32,
            "POSITIVE",
            Some("Management actually listens"),
            "Activities Coordinator",
            NaiveDate::from_ymd_opt(2026, 3, 28).context("invalid date")?,
        ),
        (
            "seed-005",
            "1-1023456789",
            "glassdoor",
            2.0f32,
            "NEGATIVE",
            Some("Pay is below what agencies offer"),
            "Former Care Assistant",
            NaiveDate::from_ymd_opt(2026, 2, 14).context("invalid date")?,
        ),
        (
            "seed-006",
            "1-2034567890",
            "indeed",
            2.0f32,
            "NEGATIVE",
            Some("Understaffed most shifts, no time for residents"),
            "Care Assistant",
            NaiveDate::from_ymd_opt(2026, 1, 9).context("invalid date")?,
        ),
        (
            "seed-007",
            "1-2034567890",
            "indeed_uk",
            1.5f32,
            "NEGATIVE",
            Some("Constant staff shortages and low wages"),
            "Former Senior Carer",
            NaiveDate::from_ymd_opt(2025, 11, 30).context("invalid date")?,
        ),
        (
            "seed-008",
            "1-2034567890",
            "glassdoor",
            2.5f32,
            "MIXED",
            Some("Kind team but shortage of cover at weekends"),
            "Kitchen Assistant",
            NaiveDate::from_ymd_opt(2025, 10, 18).context("invalid date")?,
        ),
        (
            "seed-009",
            "1-3045678901",
            "indeed",
            3.0f32,
            "NEUTRAL",
            None,
            "Housekeeper",
            NaiveDate::from_ymd_opt(2026, 4, 5).context("invalid date")?,
        ),
    ];

    for (source_key, location_id, source, rating, sentiment, text, author, posted_at) in reviews {
        let home_id: Uuid = sqlx::query(
            "SELECT id FROM staff_quality.care_homes WHERE location_id = $1",
        )
        .bind(location_id)
        .fetch_one(pool)
        .await?
        .get("id");

        sqlx::query(
            r#"
            INSERT INTO staff_quality.employee_reviews
            (id, home_id, source, rating, sentiment, review_text, author, posted_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(home_id)
        .bind(source)
        .bind(rating)
        .bind(sentiment)
        .bind(text)
        .bind(author)
        .bind(posted_at)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_homes(
    pool: &PgPool,
    location: Option<&str>,
    name: Option<&str>,
) -> anyhow::Result<Vec<CareHomeRecord>> {
    let mut query = String::from(
        "SELECT id, location_id, name, well_led, effective, last_inspection_date, \
         sentiment_positive, sentiment_neutral, sentiment_negative, sentiment_score \
         FROM staff_quality.care_homes",
    );

    if location.is_some() {
        query.push_str(" WHERE location_id = $1");
    } else if name.is_some() {
        query.push_str(" WHERE name ILIKE $1");
    }
    query.push_str(" ORDER BY name");

    let mut rows = sqlx::query(&query);
    if let Some(value) = location {
        rows = rows.bind(value.to_string());
    } else if let Some(value) = name {
        rows = rows.bind(format!("%{value}%"));
    }

    let records = rows.fetch_all(pool).await?;
    let mut homes = Vec::new();

    for row in records {
        let id: Uuid = row.get("id");
        let reviews = fetch_reviews(pool, id).await?;

        let positive: Option<i32> = row.get("sentiment_positive");
        let neutral: Option<i32> = row.get("sentiment_neutral");
        let negative: Option<i32> = row.get("sentiment_negative");
        let score: Option<f32> = row.get("sentiment_score");
        let staff_sentiment = match (positive, neutral, negative) {
            (Some(positive), Some(neutral), Some(negative)) => Some(SentimentCounts {
                positive: positive.max(0) as u32,
                neutral: neutral.max(0) as u32,
                negative: negative.max(0) as u32,
                score: score.map(f64::from),
            }),
            _ => None,
        };

        homes.push(CareHomeRecord {
            id,
            location_id: row.get("location_id"),
            name: row.get("name"),
            rating: RegulatorRating {
                well_led: row
                    .get::<Option<String>, _>("well_led")
                    .as_deref()
                    .and_then(RatingGrade::parse),
                effective: row
                    .get::<Option<String>, _>("effective")
                    .as_deref()
                    .and_then(RatingGrade::parse),
                last_inspection_date: row.get("last_inspection_date"),
                staff_sentiment,
            },
            reviews,
        });
    }

    Ok(homes)
}

async fn fetch_reviews(pool: &PgPool, home_id: Uuid) -> anyhow::Result<Vec<EmployeeReview>> {
    let rows = sqlx::query(
        "SELECT source, rating, sentiment, review_text, author, posted_at \
         FROM staff_quality.employee_reviews WHERE home_id = $1 \
         ORDER BY posted_at DESC",
    )
    .bind(home_id)
    .fetch_all(pool)
    .await?;

    let mut reviews = Vec::new();
    for row in rows {
        reviews.push(EmployeeReview {
            // Unknown labels degrade rather than fail: source is display-only
            // and Neutral sentiment is excluded from scoring anyway.
            source: ReviewSource::parse(row.get::<String, _>("source").as_str())
                .unwrap_or(ReviewSource::Indeed),
            rating: f64::from(row.get::<f32, _>("rating")),
            sentiment: ReviewSentiment::parse(row.get::<String, _>("sentiment").as_str())
                .unwrap_or(ReviewSentiment::Neutral),
            text: row.get("review_text"),
            author: row.get("author"),
            posted_at: row.get("posted_at"),
        });
    }

    Ok(reviews)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        location_id: String,
        name: String,
        source: String,
        rating: f32,
        sentiment: String,
        review_text: Option<String>,
        author: String,
        posted_at: NaiveDate,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source = ReviewSource::parse(&row.source)
            .with_context(|| format!("unknown review source '{}'", row.source))?;
        let sentiment = ReviewSentiment::parse(&row.sentiment)
            .with_context(|| format!("unknown review sentiment '{}'", row.sentiment))?;

        let home_id: Uuid = sqlx::query(
            r#"
            INSERT INTO staff_quality.care_homes (id, location_id, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (location_id) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.location_id)
        .bind(&row.name)
        .fetch_one(pool)
        .await?
        .get("id");

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO staff_quality.employee_reviews
            (id, home_id, source, rating, sentiment, review_text, author, posted_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(home_id)
        .bind(source.label())
        .bind(row.rating)
        .bind(sentiment.label())
        .bind(&row.review_text)
        .bind(&row.author)
        .bind(row.posted_at)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
