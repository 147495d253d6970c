mod support;

use predicates::str::contains;

use support::{parse_envelope, td_cmd_ownerless, TestHome};

#[test]
fn owner_set_persists_across_invocations() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();

    td_cmd_ownerless(&home)
        .args(["owner", "set", "alice"])
        .assert()
        .success()
        .stdout(contains("alice"));

    let output = td_cmd_ownerless(&home)
        .args(["owner", "show", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope = parse_envelope(&output);
    assert_eq!(envelope["command"], "owner show");
    assert_eq!(envelope["data"]["owner"], "alice");
    Ok(())
}

#[test]
fn owner_set_trims_and_rejects_blank_names() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();

    td_cmd_ownerless(&home)
        .args(["owner", "set", "  bob  "])
        .assert()
        .success();
    let output = td_cmd_ownerless(&home)
        .args(["owner", "show", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_envelope(&output)["data"]["owner"], "bob");

    td_cmd_ownerless(&home)
        .args(["owner", "set", "   "])
        .assert()
        .failure()
        .code(2);
    Ok(())
}

#[test]
fn persisted_owner_scopes_task_commands() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();

    td_cmd_ownerless(&home)
        .args(["owner", "set", "carol"])
        .assert()
        .success();
    td_cmd_ownerless(&home)
        .args(["add", "Carol task", "--deadline", "2099-01-01"])
        .assert()
        .success();

    let output = td_cmd_ownerless(&home)
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope = parse_envelope(&output);
    assert_eq!(envelope["data"]["tasks"][0]["ownerId"], "carol");
    Ok(())
}

#[test]
fn config_default_owner_is_the_last_resort() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    home.write_config("[owner]\ndefault = \"dave\"\n")?;

    let output = td_cmd_ownerless(&home)
        .args(["owner", "show", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_envelope(&output)["data"]["owner"], "dave");
    Ok(())
}

#[test]
fn owner_show_without_any_owner_fails_with_hint() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();

    td_cmd_ownerless(&home)
        .args(["owner", "show"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Owner not set"))
        .stderr(contains("td owner set"));
    Ok(())
}
