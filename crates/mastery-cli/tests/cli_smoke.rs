use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "mastery-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path.join(name);
        fs::write(&path, contents).expect("temp file should be written");
        path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_mastery<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_mastery");
    Command::new(bin)
        .args(args)
        .output()
        .expect("mastery command should execute")
}

fn run_mastery_with_stdin(args: &[&str], stdin: &str) -> Output {
    let bin = env!("CARGO_BIN_EXE_mastery");
    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("mastery command should spawn");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should accept input");
    child
        .wait_with_output()
        .expect("mastery command should finish")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be valid json: {e}\nstdout:\n{}",
            stdout_text(output)
        )
    })
}

const SCENARIO_SCRIPT: &str = "\
# first failure injects the remedial module
submit t4-1 0 2 5

# pass every foundational slot and the remedial module
submit t4-1 0 2 4
submit t4-1 1 2 4
submit t4-2 0 2 4
submit t4-2 1 2 4
submit t4-3 0 2 4
submit t4-3 1 2 4
submit basic-1 0 2 4
submit basic-1 1 2 4

# a failing resubmission locks Advanced again
submit t4-1 1 3 10
";

#[test]
fn curriculum_json_lists_the_embedded_curriculum() {
    let output = run_mastery(["curriculum", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["remedial"]["id"], "basic-1");
    assert_eq!(payload["remedial"]["level"], "Basic");
    assert_eq!(payload["materials"].as_array().map(Vec::len), Some(6));
    assert_eq!(payload["policy"]["remedial_trigger"], "first_failure");
}

#[test]
fn remedial_trigger_flag_overrides_policy() {
    let output = run_mastery([
        "curriculum",
        "--remedial-trigger",
        "all_foundational_attempted",
        "--json",
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(
        payload["policy"]["remedial_trigger"],
        "all_foundational_attempted"
    );
}

#[test]
fn curriculum_text_output_names_materials() {
    let output = run_mastery(["curriculum"]);
    assert_success(&output);
    let text = stdout_text(&output);
    assert!(text.contains("mastery curriculum"));
    assert!(text.contains("t5-3"));
    assert!(text.contains("starts locked"));
}

#[test]
fn replay_json_reports_each_transition() {
    let tmp = TempDirGuard::new("replay");
    let script = tmp.write("scenario.txt", SCENARIO_SCRIPT);

    let output = run_mastery([
        OsStr::new("replay"),
        script.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);

    let steps = payload["steps"].as_array().expect("steps array");
    assert_eq!(steps.len(), 10);
    assert_eq!(steps[0]["line"], 2);
    assert_eq!(steps[0]["result"]["percentage"], 40);
    assert_eq!(steps[0]["fired"], serde_json::json!(["inject_remedial"]));
    assert_eq!(steps[8]["fired"], serde_json::json!(["unlock_advanced"]));
    assert_eq!(steps[9]["fired"], serde_json::json!(["relock_advanced"]));
    assert_eq!(steps[9]["result"]["percentage"], 30);

    assert_eq!(payload["state"]["advancedLocked"], true);
    assert_eq!(payload["state"]["catalogue"][0]["id"], "basic-1");
    assert_eq!(payload["state"]["completion"], 0);
}

#[test]
fn replay_stops_at_the_first_bad_line() {
    let tmp = TempDirGuard::new("replay-bad");
    let script = tmp.write("bad.txt", "submit t4-1 0 2 5\nstart t5-1 0\n");

    let output = run_mastery([OsStr::new("replay"), script.as_os_str()]);
    assert_failure(&output);
    let stderr = stderr_text(&output);
    assert!(stderr.contains(":2:"), "stderr: {stderr}");
    assert!(stderr.contains("locked"), "stderr: {stderr}");
}

#[test]
fn replay_accepts_a_curriculum_file() {
    let tmp = TempDirGuard::new("custom");
    let curriculum = tmp.write(
        "curriculum.toml",
        r#"
[remedial]
id = "warmup"
title = "Warm-up"
format = "Article"
level = "Basic"

[[remedial.assessments]]
[[remedial.assessments.questions]]
id = 1
question = "one?"
options = ["a", "b"]
correct_answer = 0

[[remedial.assessments]]
[[remedial.assessments.questions]]
id = 2
question = "two?"
options = ["a", "b"]
correct_answer = 1

[[materials]]
id = "core"
title = "Core"
format = "Video"
level = "Foundational"

[[materials.assessments]]
[[materials.assessments.questions]]
id = 3
question = "three?"
options = ["a", "b"]
correct_answer = 0

[[materials.assessments]]
[[materials.assessments.questions]]
id = 4
question = "four?"
options = ["a", "b"]
correct_answer = 1
"#,
    );
    let script = tmp.write("script.txt", "start core 0\nanswer 1\n");

    let output = run_mastery([
        OsStr::new("replay"),
        script.as_os_str(),
        OsStr::new("--curriculum"),
        curriculum.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["steps"][1]["result"]["percentage"], 0);
    assert_eq!(payload["steps"][1]["fired"], serde_json::json!(["inject_remedial"]));
    assert_eq!(payload["state"]["catalogue"][0]["id"], "warmup");
    assert!(tmp.path().exists());
}

#[test]
fn missing_curriculum_file_fails() {
    let output = run_mastery([
        "curriculum",
        "--curriculum",
        "/nonexistent/mastery/curriculum.toml",
    ]);
    assert_failure(&output);
    assert!(stderr_text(&output).starts_with("error:"));
}

#[test]
fn repl_drives_a_session_from_stdin() {
    let output = run_mastery_with_stdin(
        &["repl"],
        "submit t4-1 0 2 5\nstatus\nask what is a loop?\nlog\nstart t5-1 0\nquit\n",
    );
    assert_success(&output);
    let stdout = stdout_text(&output);
    assert!(stdout.contains("score: 40%"), "stdout: {stdout}");
    assert!(stdout.contains("fired: inject_remedial"), "stdout: {stdout}");
    assert!(stdout.contains("basic-1"), "stdout: {stdout}");
    assert!(
        stdout.contains("tutor: I'm having trouble connecting to the tutor service right now."),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("REASONING"), "stdout: {stdout}");
    assert!(stderr_text(&output).contains("locked"));
}
