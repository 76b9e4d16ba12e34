use crate::cli::CurriculumArgs;
use crate::support::{load_session, parse_command, yes_no};
use mastery_tutor::{Tutor, Unavailable};
use mastery_ux::{UxCommand, UxService};
use std::io::{self, BufRead, Write};
use std::process;

const HELP: &str = "\
commands:
  status                                  catalogue, lock state, advisory, completion
  open <material>                         study notes of an unlocked material
  start <material> <slot>                 begin an assessment
  questions                               questions of the active assessment
  answer <i,j,...>                        grade the active assessment
  abandon                                 leave the active assessment
  submit <material> <slot> <correct> <total>
  dismiss | evaluate | reset
  log                                     activity log, newest first
  ask <question>                          ask the tutor
  quit";

pub fn run(source: CurriculumArgs) {
    let mut service = UxService::new(load_session(&source));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
    let mut tutor = Tutor::new(Unavailable);

    println!("mastery repl (type `help`)");
    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        print!("> ");
        let _ = out.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: failed to read stdin: {e}");
                process::exit(1);
            }
        }
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

        match word {
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "status" => print_status(&service),
            "questions" => print_questions(&service),
            "log" => {
                for entry in service.session().activity().entries() {
                    println!(
                        "  {} {:<9} {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.kind.as_str(),
                        entry.message
                    );
                }
            }
            "ask" => {
                let session = service.session_mut();
                let profile = *session.profile();
                match runtime.block_on(tutor.ask(rest, &profile)) {
                    Ok(reply) => {
                        session.record_tutor_engagement();
                        if !reply.fallback {
                            session.record_tutor_response();
                        }
                        println!("tutor: {}", reply.text);
                    }
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            _ => match parse_command(line) {
                Ok(Some(command)) => run_command(&mut service, command),
                Ok(None) => {}
                Err(e) => eprintln!("error: {e}"),
            },
        }
    }
}

fn run_command(service: &mut UxService, command: UxCommand) {
    let show_questions = matches!(command, UxCommand::StartAssessment { .. });
    match service.execute(command) {
        Ok(outcome) => {
            let result = &outcome["result"];
            if let Some(pct) = result.get("percentage") {
                println!("score: {pct}%");
            }
            if let Some(notes) = result.get("notes").and_then(|n| n.as_str()) {
                println!("{notes}");
            }
            let fired = service.session().last_fired();
            if !fired.is_empty() {
                let names: Vec<&str> = fired.iter().map(|t| t.as_str()).collect();
                println!("fired: {}", names.join(", "));
            }
            if let Some(advisory) = service.session().advisory() {
                println!("advisory: {advisory}");
            }
            if show_questions {
                print_questions(service);
            }
        }
        Err(e) => eprintln!("error: {e}"),
    }
}

fn print_status(service: &UxService) {
    let state = service.state();
    for material in &state.catalogue {
        let scores: Vec<String> = material
            .assessment_scores
            .iter()
            .map(|(slot, pct)| format!("{slot}:{pct}"))
            .collect();
        println!(
            "  {:<8} {:<13} {:<7} {}",
            material.id,
            material.level.as_str(),
            if material.locked { "locked" } else { "open" },
            scores.join(" ")
        );
    }
    println!("advanced locked: {}", yes_no(state.advanced_locked));
    println!("completion: {}%", state.completion);
    if let Some(advisory) = &state.advisory {
        println!("advisory: {advisory}");
    }
    if let Some(active) = &state.active_assessment {
        println!("in progress: {} assessment {}", active.material_id, active.slot);
    }
}

fn print_questions(service: &UxService) {
    let Some(set) = service.session().active_questions() else {
        eprintln!("error: no assessment is in progress");
        return;
    };
    for (n, q) in set.questions.iter().enumerate() {
        println!("  {}. {}", n + 1, q.question);
        for (i, option) in q.options.iter().enumerate() {
            println!("       [{i}] {option}");
        }
    }
}
