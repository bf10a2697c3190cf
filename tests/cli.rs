use std::fs;
use std::process::Command;

fn md2pdf() -> Command {
    Command::new(env!("CARGO_BIN_EXE_md2pdf"))
}

#[test]
fn missing_input_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.md");
    let output = dir.path().join("absent.pdf");

    let result = md2pdf()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("not found"), "got: {stdout}");
    assert!(!output.exists());
}

#[test]
fn default_paths_are_relative_to_working_directory() {
    let dir = tempfile::tempdir().unwrap();

    let result = md2pdf().current_dir(dir.path()).output().unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(
        stdout.contains("docs/ENTERPRISE_MATURITY_ASSESSMENT.md not found"),
        "got: {stdout}"
    );
}

#[test]
fn converts_document_and_writes_html() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.md");
    fs::write(
        &input,
        "# Maturity\n\n[TOC]\n\n## Findings\n\n| Area | Level |\n|---|---|\n| Ops | 2 |\n\n```sql\nSELECT 1;\n```\n",
    )
    .unwrap();
    let html = dir.path().join("report.html");

    let result = md2pdf().arg(&input).arg("--html").arg(&html).output().unwrap();

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Successfully converted"), "got: {stdout}");

    let pdf = fs::read(dir.path().join("report.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let html = fs::read_to_string(&html).unwrap();
    assert!(html.contains("<div class=\"toc\">"));
    assert!(html.contains("<pre><code class=\"language-sql\">"));
}

#[test]
fn explicit_bad_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.md");
    fs::write(&input, "text").unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[markdown\n").unwrap();

    let result = md2pdf()
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    assert!(!dir.path().join("report.pdf").exists());
}
