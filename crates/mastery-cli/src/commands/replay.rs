use crate::cli::CurriculumArgs;
use crate::support::{load_session, parse_command, yes_no};
use mastery_kernel::Transition;
use mastery_ux::UxService;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::process;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepRecord {
    line: usize,
    input: String,
    result: Value,
    fired: Vec<Transition>,
    advisory: Option<String>,
    completion: u8,
}

pub fn run(script: String, source: CurriculumArgs, json: bool) {
    let text = fs::read_to_string(&script).unwrap_or_else(|e| {
        eprintln!("error: failed to read script {script}: {e}");
        process::exit(1);
    });
    let mut service = UxService::new(load_session(&source));
    let mut steps = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let command = match parse_command(raw) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("error: {script}:{line}: {e}");
                process::exit(1);
            }
        };
        let outcome = service.execute(command).unwrap_or_else(|e| {
            eprintln!("error: {script}:{line}: {e}");
            process::exit(1);
        });
        let session = service.session();
        steps.push(StepRecord {
            line,
            input: raw.trim().to_string(),
            result: outcome["result"].clone(),
            fired: session.last_fired().to_vec(),
            advisory: session.advisory().map(str::to_string),
            completion: session.completion_percentage(),
        });
    }

    let state = service.state();
    if json {
        let payload = json!({ "steps": steps, "state": state });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
        return;
    }

    println!("mastery replay {script}");
    for step in &steps {
        let fired: Vec<&str> = step.fired.iter().map(Transition::as_str).collect();
        println!("  {:>3}: {}", step.line, step.input);
        if !fired.is_empty() {
            println!("       fired: {}", fired.join(", "));
        }
    }
    println!("  final state:");
    println!("    advanced locked: {}", yes_no(state.advanced_locked));
    println!("    completion: {}%", state.completion);
    if let Some(advisory) = &state.advisory {
        println!("    advisory: {advisory}");
    }
    let ids: Vec<&str> = state.catalogue.iter().map(|m| m.id.as_str()).collect();
    println!("    catalogue: {}", ids.join(", "));
}
