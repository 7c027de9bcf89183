use console::style;
use revsync::api::{CourseraClient, Syllabus};

use crate::config;

pub(crate) async fn handle_syllabus(
    url: &str,
    json: bool,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = CourseraClient::new(config.api_config())?;
    let (_, course) = client.resolve_course(url).await?;
    let syllabus = client.course_syllabus(&course.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&syllabus)?);
        return Ok(());
    }

    println!("{}", style(&course.name).cyan().bold());
    for line in outline(&syllabus) {
        println!("{}", line);
    }
    Ok(())
}

fn outline(syllabus: &Syllabus) -> Vec<String> {
    let counts: Vec<String> = syllabus
        .item_counts
        .iter()
        .map(|(kind, count)| format!("{count} {kind}"))
        .collect();
    let mut lines = vec![format!(
        "  {} modules, about {} min: {}",
        syllabus.modules.len(),
        syllabus.total_minutes(),
        counts.join(", ")
    )];

    for (number, module) in syllabus.modules.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!(
            "  {}. {} ({} min)",
            number + 1,
            module.name,
            module.time_commitment_minutes
        ));
        for objective in &module.learning_objectives {
            lines.push(format!("     * {}", objective));
        }
        for (kind, items) in &module.items {
            for item in items {
                let lock = if item.locked { " [locked]" } else { "" };
                lines.push(format!("     - [{}] {} ({}){}", kind, item.name, item.id, lock));
            }
        }
    }
    lines
}
