use crate::cli::CurriculumArgs;
use crate::support::load_session;
use mastery_ux::UxService;
use mastery_ux::http::{HttpServerConfig, serve_session};
use std::net::SocketAddr;
use std::process;

pub fn run(source: CurriculumArgs, bind: String) {
    let bind_addr: SocketAddr = bind.parse().unwrap_or_else(|e| {
        eprintln!("error: invalid --bind address `{bind}`: {e}");
        process::exit(1);
    });
    let session = load_session(&source);
    let policy = *session.gate().policy();

    println!("mastery serve");
    println!("  bind: {bind_addr}");
    println!(
        "  curriculum: {}",
        source.curriculum.as_deref().unwrap_or("(embedded)")
    );
    println!("  remedial trigger: {}", policy.remedial_trigger.as_str());
    println!("  routes:");
    println!("    GET  /healthz | /state | /catalogue | /advisory | /completion | /activity | /profile");
    println!("    POST /material/open?material=<id>");
    println!("    POST /assessment/start?material=<id>&slot=<0|1>");
    println!("    POST /assessment/answer?answers=<i,j,...>");
    println!("    POST /assessment/abandon");
    println!("    POST /submit?material=<id>&slot=<0|1>&correct=<n>&total=<n>");
    println!("    POST /advisory/dismiss | /evaluate | /reset");

    let config = HttpServerConfig { bind: bind_addr };
    if let Err(e) = serve_session(config, UxService::new(session)) {
        eprintln!("error: session API failed: {e}");
        process::exit(1);
    }
}
