use console::style;
use revsync::api::{Course, CourseStats, CourseraClient, short_error_message};

use crate::config;

pub(crate) async fn handle_course(
    url: &str,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = CourseraClient::new(config.api_config())?;
    let (course_url, course) = client.resolve_course(url).await?;

    // Statistics are optional; a failed search only loses those lines.
    let stats = match client.course_stats(&course, course_url.path()).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(course = %course.slug, error = %e, "Course statistics unavailable");
            eprintln!(
                "{} Statistics unavailable: {}",
                style("⚠").yellow().bold(),
                short_error_message(&e)
            );
            None
        }
    };

    for line in describe(&course, stats.as_ref()) {
        println!("{}", line);
    }

    Ok(())
}

fn describe(course: &Course, stats: Option<&CourseStats>) -> Vec<String> {
    let mut lines = vec![
        format!("{}", style(&course.name).cyan().bold()),
        format!("  ID:        {}", course.id),
        format!("  Slug:      {}", course.slug),
    ];

    if !course.primary_languages.is_empty() {
        lines.push(format!("  Languages: {}", course.primary_languages.join(", ")));
    }
    if !course.subtitle_languages.is_empty() {
        lines.push(format!("  Subtitles: {}", course.subtitle_languages.join(", ")));
    }

    if let Some(stats) = stats {
        if !stats.partners.is_empty() {
            lines.push(format!("  Partners:  {}", stats.partners.join(", ")));
        }
        if let Some(enrollments) = stats.enrollments {
            lines.push(format!("  Enrolled:  {}", enrollments));
        }
        match (stats.avg_rating, stats.num_ratings) {
            (Some(avg), Some(count)) => {
                lines.push(format!("  Rating:    {:.1} ({} ratings)", avg, count));
            }
            (Some(avg), None) => lines.push(format!("  Rating:    {:.1}", avg)),
            _ => {}
        }
    }

    if !course.learning_objectives.is_empty() {
        lines.push(String::new());
        lines.push("  What you will learn:".to_string());
        for objective in &course.learning_objectives {
            lines.push(format!("    - {}", objective.trim()));
        }
    }

    if let Some(description) = course.description.as_deref().map(str::trim)
        && !description.is_empty()
    {
        lines.push(String::new());
        lines.push(description.to_string());
    }

    lines
}
