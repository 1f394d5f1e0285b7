//! End-to-end tests of the helpdesk binary against a temporary data file

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

struct Desk {
    temp_dir: TempDir,
    data: PathBuf,
}

impl Desk {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("desk.yaml");
        Self { temp_dir, data }
    }

    fn initialized() -> Self {
        let desk = Self::new();
        desk.json(None, &["init", "--admin-email", "admin@example.com"]);
        desk
    }

    #[allow(deprecated)]
    fn cmd(&self, acting_as: Option<&str>) -> Command {
        let mut cmd = Command::cargo_bin("helpdesk").unwrap();
        cmd.env_remove("HELPDESK_USER")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("HOME", self.temp_dir.path())
            .arg("--data")
            .arg(&self.data)
            .arg("--no-color");
        if let Some(email) = acting_as {
            cmd.arg("--as").arg(email);
        }
        cmd
    }

    fn config_home(&self) -> PathBuf {
        self.temp_dir.path().join("config")
    }

    /// Run a command expected to succeed and parse its JSON output
    fn json(&self, acting_as: Option<&str>, args: &[&str]) -> Value {
        let output = self
            .cmd(acting_as)
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).unwrap()
    }

    /// Run a command expected to fail and parse its JSON error document
    fn json_error(&self, acting_as: Option<&str>, args: &[&str]) -> Value {
        let output = self
            .cmd(acting_as)
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).unwrap()
    }
}

fn id_of(value: &Value, key: &str) -> String {
    value[key]["id"].as_str().unwrap().to_string()
}

const ADMIN: Option<&str> = Some("admin@example.com");
const TECH: Option<&str> = Some("tomas@example.com");
const CLIENT: Option<&str> = Some("carla@example.com");

/// Admin, technician, registered client and one category
fn seeded() -> (Desk, String, String) {
    let desk = Desk::initialized();
    desk.json(ADMIN, &["category", "add", "--name", "Hardware"]);
    desk.json(
        ADMIN,
        &[
            "user",
            "add",
            "--name",
            "Tomas Tech",
            "--email",
            "tomas@example.com",
            "--role",
            "technician",
        ],
    );
    let technician = desk.json(
        ADMIN,
        &[
            "technician",
            "add",
            "--name",
            "Tomas Tech",
            "--specialty",
            "Printers",
            "--user",
            "tomas@example.com",
        ],
    );
    let registered = desk.json(
        None,
        &[
            "register",
            "--name",
            "Carla Client",
            "--email",
            "carla@example.com",
        ],
    );
    (desk, id_of(&technician, "technician"), id_of(&registered, "client"))
}

#[test]
fn test_init_creates_data_file() {
    let desk = Desk::new();
    let value = desk.json(None, &["init", "--admin-email", "Admin@Example.com"]);

    assert_eq!(value["admin"]["role"], "admin");
    assert_eq!(value["admin"]["email"], "admin@example.com");
    assert!(desk.data.exists());

    desk.cmd(None)
        .args(["init", "--admin-email", "admin@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_need_an_initialized_desk() {
    let desk = Desk::new();
    desk.cmd(ADMIN)
        .args(["ticket", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No helpdesk data file"));
}

#[test]
fn test_commands_need_an_acting_user() {
    let desk = Desk::initialized();
    let error = desk.json_error(None, &["ticket", "list"]);
    assert_eq!(error["error_type"], "unauthenticated");

    let error = desk.json_error(Some("ghost@example.com"), &["ticket", "list"]);
    assert_eq!(error["error_type"], "unauthenticated");
}

#[test]
fn test_ticket_lifecycle_end_to_end() {
    let (desk, technician_id, client_id) = seeded();

    let created = desk.json(
        CLIENT,
        &[
            "ticket",
            "new",
            "--title",
            "Printer offline",
            "--description",
            "The sales printer stopped printing",
            "--category",
            "hardware",
        ],
    );
    let ticket_id = id_of(&created, "ticket");
    assert_eq!(created["ticket"]["client_id"], client_id.as_str());
    assert_eq!(created["ticket"]["status"], "open");
    assert_eq!(created["ticket"]["priority"], "medium");

    let error = desk.json_error(TECH, &["ticket", "show", &ticket_id]);
    assert_eq!(error["error_type"], "forbidden");

    desk.json(ADMIN, &["ticket", "assign", &ticket_id, &technician_id]);

    let error = desk.json_error(TECH, &["ticket", "status", &ticket_id, "resolved"]);
    assert_eq!(error["error_type"], "illegal_transition");
    assert!(
        error["error"]
            .as_str()
            .unwrap()
            .contains("can only change to \"in_progress\"")
    );

    let started = desk.json(TECH, &["ticket", "status", &ticket_id, "in-progress"]);
    assert_eq!(started["ticket"]["status"], "in_progress");

    let assigned = desk.json(TECH, &["ticket", "assigned"]);
    assert_eq!(assigned["count"], 1);

    let mine = desk.json(CLIENT, &["ticket", "mine"]);
    assert_eq!(mine["tickets"][0]["status"], "in_progress");

    let error = desk.json_error(CLIENT, &["ticket", "delete", &ticket_id]);
    assert_eq!(error["error_type"], "forbidden");

    desk.json(ADMIN, &["ticket", "delete", &ticket_id]);
    let error = desk.json_error(ADMIN, &["ticket", "show", &ticket_id]);
    assert_eq!(error["error_type"], "not_found");
}

#[test]
fn test_capacity_limit_through_cli() {
    let (desk, technician_id, _) = seeded();

    for n in 0..5 {
        let created = desk.json(
            CLIENT,
            &[
                "ticket",
                "new",
                "--title",
                &format!("Issue {n}"),
                "--description",
                "Needs a look",
                "--category",
                "Hardware",
            ],
        );
        let ticket_id = id_of(&created, "ticket");
        desk.json(ADMIN, &["ticket", "assign", &ticket_id, &technician_id]);
        desk.json(TECH, &["ticket", "status", &ticket_id, "in_progress"]);
    }

    let technicians = desk.json(ADMIN, &["technician", "list"]);
    assert_eq!(technicians["technicians"][0]["in_progress"], 5);
    assert_eq!(technicians["technicians"][0]["at_capacity"], true);

    let created = desk.json(
        CLIENT,
        &[
            "ticket",
            "new",
            "--title",
            "One too many",
            "--description",
            "Should not be assignable",
            "--category",
            "Hardware",
        ],
    );
    let ticket_id = id_of(&created, "ticket");
    let error = desk.json_error(ADMIN, &["ticket", "assign", &ticket_id, &technician_id]);
    assert_eq!(error["error_type"], "capacity_exceeded");
    assert!(error["error"].as_str().unwrap().contains("5 tickets in progress"));
}

#[test]
fn test_human_output() {
    let (desk, _, _) = seeded();

    desk.cmd(ADMIN)
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hardware"));

    desk.cmd(CLIENT)
        .args(["ticket", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tickets found"));

    desk.cmd(CLIENT)
        .args(["technician", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}

#[test]
fn test_deactivated_records_through_cli() {
    let (desk, _, _) = seeded();

    desk.json(ADMIN, &["category", "update", "Hardware", "--active", "false"]);
    assert_eq!(desk.json(CLIENT, &["category", "list"])["count"], 0);
    assert_eq!(desk.json(ADMIN, &["category", "list"])["count"], 1);

    let users = desk.json(ADMIN, &["user", "list"]);
    assert_eq!(users["count"], 3);

    let updated = desk.json(
        ADMIN,
        &["user", "update", "carla@example.com", "--active", "false"],
    );
    assert_eq!(updated["user"]["is_active"], false);
    let error = desk.json_error(CLIENT, &["ticket", "list"]);
    assert_eq!(error["error_type"], "unauthenticated");

    let error = desk.json_error(ADMIN, &["user", "remove", "admin@example.com"]);
    assert_eq!(error["error_type"], "conflict");
    desk.json(ADMIN, &["user", "remove", "carla@example.com"]);
    assert_eq!(desk.json(ADMIN, &["user", "list"])["count"], 2);
}

#[test]
fn test_removing_busy_technician_warns() {
    let (desk, technician_id, _) = seeded();
    let created = desk.json(
        CLIENT,
        &[
            "ticket",
            "new",
            "--title",
            "Scanner jammed",
            "--description",
            "Paper stuck in the feeder",
            "--category",
            "Hardware",
        ],
    );
    let ticket_id = id_of(&created, "ticket");
    desk.json(ADMIN, &["ticket", "assign", &ticket_id, &technician_id]);

    desk.cmd(ADMIN)
        .args(["technician", "remove", &technician_id])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 ticket(s) no longer have a technician"));

    let ticket = desk.json(ADMIN, &["ticket", "show", &ticket_id]);
    assert!(ticket["ticket"]["technician_id"].is_null());
}

#[test]
#[allow(deprecated)]
fn test_help_lists_ticket_commands() {
    Command::cargo_bin("helpdesk")
        .unwrap()
        .args(["ticket", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Move a ticket to the next status"));
}
