use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const JANE_MD5: &str = "f71119606391ae12d0540ad0813ae10a";
const JANE_SHA256: &str = "8bc4aa80049cbdfcc75cb97b7e98d4f5f023e3c49197d3a4c70c4dbd09a6c1eb";
const UNREACHABLE_MD5: &str = "6429bc468e7c918cd189ed2cdeaa427a";

fn hashtrace() -> Command {
    let mut cmd = Command::cargo_bin("hashtrace").unwrap();
    cmd.arg("--color").arg("never");
    cmd
}

#[test]
fn finds_email_from_elements_and_writes_csv() {
    let tmp = tempdir().unwrap();
    let outdir = tmp.path().join("out");

    hashtrace()
        .arg(JANE_MD5)
        .args(["-e", "jane", "doe", "-d", "test.org", "-o"])
        .arg(&outdir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Email Hash Enumeration Results"))
        .stdout(predicate::str::contains("jane.doe@test.org"));

    let files: Vec<_> = fs::read_dir(&outdir).unwrap().collect();
    assert_eq!(files.len(), 1);
    let path = files[0].as_ref().unwrap().path();
    let content = fs::read_to_string(path).unwrap();
    assert!(content.contains("enumeration,found,jane.doe@test.org"));
}

#[test]
fn profile_supplies_target_chunks_and_public_emails() {
    let tmp = tempdir().unwrap();
    let profile = tmp.path().join("profile.json");
    fs::write(
        &profile,
        format!(
            r#"{{
                "hash": "{JANE_SHA256}",
                "preferredUsername": "janedoe",
                "displayName": "Jane Doe",
                "aboutMe": "reach me at jane@public.example",
                "accounts": [{{"shortname": "twitter", "url": "https://twitter.com/janed"}}]
            }}"#
        ),
    )
    .unwrap();

    hashtrace()
        .arg("-p")
        .arg(&profile)
        .args(["-d", "test.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SHA256"))
        .stdout(predicate::str::contains("jane.doe@test.org"))
        .stdout(predicate::str::contains("jane@public.example"));
}

#[test]
fn parallel_search_reports_exhaustion() {
    hashtrace()
        .arg(UNREACHABLE_MD5)
        .args(["-e", "a", "b", "c", "-d", "x.com", "y.com"])
        .args(["--crazy", "--parallel", "--shards", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No generated email matches"));
}

#[test]
fn wordlist_lists_every_candidate() {
    let tmp = tempdir().unwrap();
    let domains = tmp.path().join("domains.txt");
    fs::write(&domains, "# custom\ntest.org\n\n").unwrap();
    let wordlist = tmp.path().join("candidates.txt");

    hashtrace()
        .arg(JANE_MD5)
        .args(["-e", "jane", "doe", "--domains-file"])
        .arg(&domains)
        .arg("--wordlist")
        .arg(&wordlist)
        .assert()
        .success()
        .stdout(predicate::str::contains("10 candidates written"));

    let content = fs::read_to_string(&wordlist).unwrap();
    assert_eq!(content.lines().count(), 10);
    assert!(content.lines().any(|l| l == "doe-jane@test.org"));
}

#[test]
fn quiet_run_prints_nothing() {
    hashtrace()
        .arg(JANE_MD5)
        .args(["-e", "jane", "doe", "-d", "test.org", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn invalid_target_is_a_configuration_error() {
    hashtrace()
        .arg("not-a-digest")
        .args(["-e", "jane", "-d", "test.org"])
        .assert()
        .code(2);
}

#[test]
fn tier_and_custom_domains_conflict() {
    hashtrace()
        .arg(JANE_MD5)
        .args(["-e", "jane", "-l", "common", "-d", "test.org"])
        .assert()
        .code(2);
}

#[test]
fn empty_chunk_set_exits_with_hint() {
    hashtrace()
        .arg(JANE_MD5)
        .args(["-e", " ", "-d", "test.org"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("-e marco m polo p"));
}

#[test]
fn missing_profile_file_fails() {
    let tmp = tempdir().unwrap();
    hashtrace()
        .arg("-p")
        .arg(tmp.path().join("absent.json"))
        .assert()
        .code(2);
}

#[test]
fn malformed_profile_is_an_input_error() {
    let tmp = tempdir().unwrap();
    let profile = tmp.path().join("broken.json");
    fs::write(&profile, "{ not json").unwrap();
    hashtrace().arg("-p").arg(&profile).assert().code(3);
}
