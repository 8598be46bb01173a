#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::Command as AssertCommand;

pub fn molt() -> AssertCommand {
    AssertCommand::cargo_bin("molt").expect("molt binary")
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// `git init` with a fixed identity and an initial commit of whatever
/// already exists in `dir`.
pub fn init_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "user.email", "sample@example.com"]);
    git(dir, &["config", "user.name", "Sample User"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "--allow-empty", "--no-verify", "-m", "Initial commit"]);
}

/// Commit subjects, newest first.
pub fn log_subjects(dir: &Path) -> Vec<String> {
    git(dir, &["log", "--format=%s"])
        .lines()
        .map(str::to_owned)
        .collect()
}

/// A stand-in transpiler: prepends a `// converted` marker and passes the
/// input through, failing for any input that contains `FAIL`.
pub fn write_fake_transpiler(dir: &Path) -> PathBuf {
    let script = dir.join("fake-transpiler.sh");
    fs::write(
        &script,
        "#!/bin/sh\n\
         if grep -q FAIL \"$1\"; then\n\
           echo 'unexpected token FAIL' >&2\n\
           exit 1\n\
         fi\n\
         echo '// converted'\n\
         cat \"$1\"\n",
    )
    .expect("write fake transpiler");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
    }
    script
}

/// Write a `molt.config.json` pointing at the stand-in transpiler.
pub fn write_config(dir: &Path, transpiler: &Path) {
    let config = format!(
        "{{\n  \"transpilerCmd\": \"{}\"\n}}\n",
        transpiler.display()
    );
    fs::write(dir.join("molt.config.json"), config).expect("write config");
}
