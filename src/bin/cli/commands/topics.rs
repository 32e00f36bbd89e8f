use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;
use medstudy_lib::quiz::QuestionSource;

pub fn run(app: &App, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let topics = app.catalog.topics();

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = topics
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "name": t.name,
                        "category": t.category,
                        "questionCount": app.catalog.question_count(&t.id),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if topics.is_empty() {
                println!("(no topics)");
            }
            let mut category: Option<&str> = None;
            for topic in &topics {
                if category != Some(topic.category.as_str()) {
                    println!("{}", topic.category);
                    category = Some(topic.category.as_str());
                }
                println!(
                    "    {} [{}] ({} questions)",
                    topic.name,
                    topic.id,
                    app.catalog.question_count(&topic.id)
                );
            }
        }
    }

    Ok(())
}
