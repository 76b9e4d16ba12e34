use crate::cli::CurriculumArgs;
use mastery_curriculum::Curriculum;
use mastery_session::Session;
use mastery_ux::UxCommand;
use std::process;

/// Load the curriculum named by the flags, applying any policy override.
pub fn load_curriculum(source: &CurriculumArgs) -> Curriculum {
    let loaded = match &source.curriculum {
        Some(path) => Curriculum::load(path),
        None => Curriculum::builtin(),
    };
    let curriculum = loaded.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    match source.remedial_trigger {
        Some(trigger) => {
            let mut policy = curriculum.policy;
            policy.remedial_trigger = trigger.into();
            curriculum.with_policy(policy)
        }
        None => curriculum,
    }
}

pub fn load_session(source: &CurriculumArgs) -> Session {
    Session::new(load_curriculum(source)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    })
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
///
/// ```text
/// submit <material> <slot> <correct> <total>
/// open <material>
/// start <material> <slot>
/// answer <i,j,...>
/// abandon | dismiss | evaluate | reset
/// ```
pub fn parse_command(line: &str) -> Result<Option<UxCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["submit", material, slot, correct, total] => UxCommand::Submit {
            material_id: material.to_string(),
            slot: number("slot", slot)?,
            correct: number("correct", correct)?,
            total: number("total", total)?,
        },
        ["start", material, slot] => UxCommand::StartAssessment {
            material_id: material.to_string(),
            slot: number("slot", slot)?,
        },
        ["answer", rest @ ..] if !rest.is_empty() => UxCommand::Answer {
            answers: rest
                .join("")
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| number::<usize>("answer", s))
                .collect::<Result<Vec<_>, _>>()?,
        },
        ["open", material] => UxCommand::OpenMaterial {
            material_id: material.to_string(),
        },
        ["abandon"] => UxCommand::AbandonAssessment,
        ["dismiss"] => UxCommand::DismissAdvisory,
        ["evaluate"] => UxCommand::Evaluate,
        ["reset"] => UxCommand::Reset,
        _ => return Err(format!("unrecognized command: {line}")),
    };
    Ok(Some(command))
}

fn number<T: std::str::FromStr>(what: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{what}: not a number: {raw}"))
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
