use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn command_assemble() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let apcf = temp.path().join("apcf.txt");
    let joins = temp.path().join("joins.txt");

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("assemble")
        .arg("0")
        .arg("tests/apcf/scores.txt")
        .arg(&apcf)
        .arg(&joins)
        .assert()
        .success()
        .stderr(predicate::str::contains("3 APCFs"));

    assert_eq!(
        std::fs::read_to_string(&apcf)?,
        ">ANCESTOR\t7\n# APCF 1\n1 2 -3 4 $\n# APCF 2\n5 $\n# APCF 3\n6 7 $\n"
    );
    assert_eq!(
        std::fs::read_to_string(&joins)?,
        "0\t1\t0.95\n1\t2\t0.9\n2\t-3\t0.85\n-3\t4\t0.8\n4\t0\t0.75\n0\t5\t0.7\n5\t0\t0.65\n6\t7\t0.6\n"
    );

    Ok(())
}

#[test]
fn command_assemble_min_weight() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let apcf = temp.path().join("apcf.txt");
    let joins = temp.path().join("joins.txt");

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("assemble")
        .arg("0.7")
        .arg("tests/apcf/scores.txt")
        .arg(&apcf)
        .arg(&joins)
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(&apcf)?,
        ">ANCESTOR\t7\n# APCF 1\n1 2 -3 4 $\n# APCF 2\n5 $\n"
    );
    let joins = std::fs::read_to_string(&joins)?;
    assert_eq!(joins.lines().count(), 6);
    assert!(!joins.contains("0.65"));
    assert!(!joins.contains("0.6\n"));

    Ok(())
}

#[test]
fn command_assemble_cycle() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let joins = temp.path().join("joins.txt");

    let mut cmd = Command::cargo_bin("deschrambler")?;
    let output = cmd
        .arg("assemble")
        .arg("0")
        .arg("stdin")
        .arg("stdout")
        .arg(&joins)
        .write_stdin("1 2 0.9\n2 3 0.8\n3 1 0.7\n")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, ">ANCESTOR\t3\n# APCF 1\n1 2 3 $\n");
    assert_eq!(std::fs::read_to_string(&joins)?, "1\t2\t0.9\n2\t3\t0.8\n");

    Ok(())
}

#[test]
fn command_assemble_bad_scores() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("assemble")
        .arg("0")
        .arg("stdin")
        .arg(temp.path().join("apcf.txt"))
        .arg(temp.path().join("joins.txt"))
        .write_stdin("1 2 0.9\n2 3\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2"));

    // Nothing is written on failure
    assert!(!temp.path().join("apcf.txt").exists());

    Ok(())
}

#[test]
fn command_assemble_extra_field() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("assemble")
        .arg("0")
        .arg("stdin")
        .arg(temp.path().join("apcf.txt"))
        .arg(temp.path().join("joins.txt"))
        .write_stdin("1 2 0.9 junk\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 1"));

    assert!(!temp.path().join("apcf.txt").exists());
    assert!(!temp.path().join("joins.txt").exists());

    Ok(())
}

#[test]
fn command_infer_then_assemble() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let prob = temp.path().join("adjacencies.prob");
    let apcf = temp.path().join("apcf.txt");

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1.0")
        .arg("tests/infer/tree.txt")
        .arg("tests/infer/genomes.txt")
        .arg("-o")
        .arg(&prob)
        .assert()
        .success();

    let mut cmd = Command::cargo_bin("deschrambler")?;
    cmd.arg("assemble")
        .arg("0.5")
        .arg(&prob)
        .arg(&apcf)
        .arg(temp.path().join("joins.txt"))
        .assert()
        .success();

    // One whole chromosome, read on either strand
    let content = std::fs::read_to_string(&apcf)?;
    assert!(
        content == ">ANCESTOR\t3\n# APCF 1\n1 2 3 $\n"
            || content == ">ANCESTOR\t3\n# APCF 1\n-3 -2 -1 $\n",
        "{}",
        content
    );

    Ok(())
}
