use crate::cli::CurriculumArgs;
use crate::support::{load_curriculum, yes_no};

pub fn run(source: CurriculumArgs, json: bool) {
    let curriculum = load_curriculum(&source);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&curriculum).expect("json serialization")
        );
        return;
    }

    println!("mastery curriculum");
    println!("  remedial trigger: {}", curriculum.policy.remedial_trigger.as_str());
    println!(
        "  remind when locked: {}",
        yes_no(curriculum.policy.remind_when_locked)
    );
    println!(
        "  remedial: {} ({}, {} assessments)",
        curriculum.remedial.id,
        curriculum.remedial.title,
        curriculum.remedial.assessments.len()
    );
    println!("  materials:");
    for def in &curriculum.materials {
        let questions: Vec<String> = def
            .assessments
            .iter()
            .map(|set| set.len().to_string())
            .collect();
        println!(
            "    {:<8} {:<13} {}{}",
            def.id,
            def.level.as_str(),
            def.title,
            if def.recommended { " (recommended)" } else { "" }
        );
        println!(
            "             questions per assessment: {}{}",
            questions.join(", "),
            if def.level.starts_locked() {
                "; starts locked"
            } else {
                ""
            }
        );
    }
}
