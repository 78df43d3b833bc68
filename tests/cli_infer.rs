use approx::assert_relative_eq;
use assert_cmd::Command;
use predicates::prelude::*;
use std::collections::BTreeMap;
use tempfile::TempDir;

fn parse_prob(stdout: &str) -> anyhow::Result<(String, BTreeMap<(i32, i32), f64>)> {
    let mut lines = stdout.lines();
    let header = lines.next().unwrap_or_default().to_string();
    let mut probs = BTreeMap::new();
    for line in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 3, "bad line: {}", line);
        probs.insert((fields[0].parse()?, fields[1].parse()?), fields[2].parse()?);
    }
    Ok((header, probs))
}

#[test]
fn command_infer() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("deschrambler")?;
    let output = cmd
        .arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;

    let (header, probs) = parse_prob(&stdout)?;
    assert_eq!(header, "#3");
    assert_eq!(probs.len(), 14);

    let kept = 0.9741345807939906;
    let lost = 0.00016945365117240334;
    assert_relative_eq!(probs[&(1, 2)], kept, max_relative = 1e-9);
    assert_relative_eq!(probs[&(2, 3)], kept, max_relative = 1e-9);
    assert_relative_eq!(probs[&(-3, -2)], kept, max_relative = 1e-9);
    assert_relative_eq!(probs[&(1, 3)], lost, max_relative = 1e-9);
    assert_relative_eq!(probs[&(3, 2)], lost, max_relative = 1e-9);
    assert_relative_eq!(probs[&(0, 1)], 1.0, max_relative = 1e-9);
    assert_relative_eq!(probs[&(-1, 0)], 1.0, max_relative = 1e-9);
    assert!(!probs.contains_key(&(0, 0)));

    Ok(())
}

#[test]
fn command_infer_default_outfile() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let cwd = std::env::current_dir()?;

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.current_dir(temp.path())
        .arg("infer")
        .arg("A")
        .arg("1.0")
        .arg(cwd.join("tests/infer/tree.txt"))
        .arg(cwd.join("tests/infer/genomes.txt"))
        .assert()
        .success()
        .stderr(predicate::str::contains("T = 3"));

    let content = std::fs::read_to_string(temp.path().join("adjacencies.prob"))?;
    assert!(content.starts_with("#3\n"));
    assert_eq!(content.lines().count(), 15);

    Ok(())
}

#[test]
fn command_infer_debug_log() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.env("RUST_LOG", "debug")
        .arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Initialising A (ingroup): 1 chromosomes, 0 scaffolds, 3 blocks",
        ))
        .stderr(predicate::str::contains(
            "Initialising D (outgroup): 0 chromosomes, 1 scaffolds, 3 blocks",
        ));

    Ok(())
}

#[test]
fn command_infer_joins() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("deschrambler")?;
    let output = cmd
        .arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let from_genomes = String::from_utf8(output.stdout)?;

    // C and D are outgroups; their join files hold the same adjacencies
    let mut cmd = Command::cargo_bin("deschrambler")?;
    let output = cmd
        .arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("--joins")
        .arg("tests/infer/joins")
        .arg("-o")
        .arg("stdout")
        .output()?;
    assert!(output.status.success());
    let from_joins = String::from_utf8(output.stdout)?;

    assert_eq!(from_genomes, from_joins);

    Ok(())
}

#[test]
fn command_infer_missing_joins() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("--joins")
        .arg("tests/infer")
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("C.joins"));

    Ok(())
}

#[test]
fn command_infer_missing_reference() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("infer")
        .arg("Q")
        .arg("1.0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("reference species Q"));

    Ok(())
}

#[test]
fn command_infer_zero_alpha() -> anyhow::Result<()> {
    // Without any change allowed, D contradicts the others
    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("infer")
        .arg("A")
        .arg("0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("sum to 0"))
        .stderr(predicate::str::contains("sum to -0").not());

    Ok(())
}

#[test]
fn command_infer_bad_tree() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("tests/infer/polytomy.txt")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("only binary trees"));

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("stdin")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .write_stdin("((A,B)@X,(C,D)@Y);")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("appears 2 times"));

    Ok(())
}
