//! CLI integration tests for update-map binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("update-map"))
}

// Helper to create a temp input file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const CUSTOMER_SCHEMA: &str = r#"{
    "name": "Customer",
    "fields": [
        { "name": "ID", "property": "id", "relational": "column:customer_id" },
        { "name": "FirstName", "property": "firstName", "optional": true },
        { "name": "Settings", "property": "settings",
          "relational": "type:jsonb", "serialization": "user_settings" },
        { "name": "Address", "property": "address",
          "relational": "embedded;embeddedPrefix:addr_", "optional": true,
          "fields": [
              { "name": "Street", "property": "street", "optional": true },
              { "name": "City", "property": "city" }
          ] }
    ]
}"#;

const CUSTOMER_PAYLOAD: &str = r#"{
    "id": "c-1",
    "firstName": "Jane",
    "settings": {"theme": "dark"},
    "address": {"street": null, "city": "Taipei"}
}"#;

fn customer_files(dir: &TempDir) -> (String, String) {
    let schema = write_temp_file(dir, "schema.json", CUSTOMER_SCHEMA);
    let payload = write_temp_file(dir, "payload.json", CUSTOMER_PAYLOAD);
    (
        schema.to_str().unwrap().to_string(),
        payload.to_str().unwrap().to_string(),
    )
}

mod relational_command {
    use super::*;

    #[test]
    fn basic_relational() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args(["relational", &payload, "--schema", &schema])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"addr_city":"Taipei","customer_id":"c-1","first_name":"Jane","user_settings":{"theme":"dark"}}"#,
            ));
    }

    #[test]
    fn relational_with_skip() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args([
                "relational",
                &payload,
                "--schema",
                &schema,
                "--skip",
                "addr_city",
                "--skip",
                "user_settings",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"customer_id":"c-1","first_name":"Jane"}"#));
    }

    #[test]
    fn relational_identity_naming() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args([
                "relational",
                &payload,
                "--schema",
                &schema,
                "--naming",
                "identity",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""FirstName":"Jane""#))
            .stdout(predicate::str::contains(r#""addr_City":"Taipei""#));
    }

    #[test]
    fn relational_with_pretty() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args(["relational", &payload, "--schema", &schema, "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn relational_with_output_file() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);
        let output = dir.path().join("output.json");

        cmd()
            .args([
                "relational",
                &payload,
                "--schema",
                &schema,
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["customer_id"], "c-1");
        assert_eq!(parsed["user_settings"]["theme"], "dark");
    }

    #[test]
    fn relational_null_embedded_group() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", CUSTOMER_SCHEMA);
        let payload = write_temp_file(
            &dir,
            "payload.json",
            r#"{"id": "c-2", "settings": {}, "address": null}"#,
        );

        cmd()
            .args([
                "relational",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"customer_id":"c-2","user_settings":{}}"#,
            ));
    }

    #[test]
    fn relational_depth_limit() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args([
                "relational",
                &payload,
                "--schema",
                &schema,
                "--max-depth",
                "0",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("nesting limit"))
            .stderr(predicate::str::contains("were mapped before the failure"));
    }

    #[test]
    fn relational_non_object_payload() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", CUSTOMER_SCHEMA);
        let payload = write_temp_file(&dir, "payload.json", "[1, 2, 3]");

        cmd()
            .args([
                "relational",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("must be a record, got array"));
    }

    #[test]
    fn relational_null_payload() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", CUSTOMER_SCHEMA);
        let payload = write_temp_file(&dir, "payload.json", "null");

        cmd()
            .args([
                "relational",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("{}"));
    }
}

mod document_command {
    use super::*;

    #[test]
    fn basic_document() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args(["document", &payload, "--schema", &schema])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""iD":"c-1""#))
            .stdout(predicate::str::contains(r#""firstName":"Jane""#))
            .stdout(predicate::str::contains(
                r#""address":{"street":null,"city":"Taipei"}"#,
            ))
            .stdout(predicate::str::contains(r#""settings":{"theme":"dark"}"#));
    }

    #[test]
    fn document_with_skip() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args([
                "document", &payload, "--schema", &schema, "--skip", "address", "--skip",
                "settings",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"firstName":"Jane","iD":"c-1"}"#));
    }
}

mod explain_command {
    use super::*;

    #[test]
    fn explain_text() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args(["explain", &payload, "--schema", &schema])
            .assert()
            .success()
            .stdout(predicate::str::contains("ID -> customer_id [column]"))
            .stdout(predicate::str::contains("FirstName -> first_name [naming]"))
            .stdout(predicate::str::contains(
                "Settings -> user_settings [serialization] (jsonb)",
            ))
            .stdout(predicate::str::contains(
                "Address.Street -> addr_street [naming] (absent)",
            ))
            .stdout(predicate::str::contains("Address.City -> addr_city [naming]"));
    }

    #[test]
    fn explain_json() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        let output = cmd()
            .args(["explain", &payload, "--schema", &schema, "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0]["field"], "ID");
        assert_eq!(entries[0]["source"], "column");
        assert_eq!(entries[2]["semi_structured"], true);
        assert_eq!(entries[3]["absent"], true);
    }

    #[test]
    fn explain_ignores_disabled_serialization() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{"name": "Secret", "fields": [{"name": "Token", "serialization": "-"}]}"#,
        );
        let payload = write_temp_file(&dir, "payload.json", r#"{"Token": "t"}"#);

        cmd()
            .args([
                "explain",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Token -> token [naming]"));
    }
}

mod snake_command {
    use super::*;

    #[test]
    fn converts_each_name() {
        cmd()
            .args(["snake", "NationalIDNo", "firstName", "HTTPServer"])
            .assert()
            .success()
            .stdout("national_id_no\nfirst_name\nhttp_server\n");
    }

    #[test]
    fn requires_a_name() {
        cmd().arg("snake").assert().failure();
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn schema_file_not_found() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "payload.json", "{}");

        cmd()
            .args([
                "relational",
                payload.to_str().unwrap(),
                "--schema",
                "/nonexistent/schema.json",
            ])
            .assert()
            .code(3)
            .stderr(
                predicate::str::contains("not found").or(predicate::str::contains("No such file")),
            );
    }

    #[test]
    fn payload_file_not_found() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", CUSTOMER_SCHEMA);

        cmd()
            .args([
                "document",
                "/nonexistent/payload.json",
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Error loading payload"));
    }

    #[test]
    fn invalid_json_payload() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", CUSTOMER_SCHEMA);
        let payload = write_temp_file(&dir, "bad.json", r#"{ not valid json"#);

        cmd()
            .args([
                "relational",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(2);
    }

    #[test]
    fn duplicate_schema_field() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{"name": "User", "fields": [{"name": "ID"}, {"name": "ID"}]}"#,
        );
        let payload = write_temp_file(&dir, "payload.json", "{}");

        cmd()
            .args([
                "relational",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("duplicate field ID"));
    }

    #[test]
    fn unwritable_output() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args([
                "relational",
                &payload,
                "--schema",
                &schema,
                "--output",
                "/nonexistent/dir/out.json",
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Error writing to"));
    }
}

mod required_args {
    use super::*;

    #[test]
    fn missing_schema_flag() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "payload.json", "{}");

        cmd()
            .args(["relational", payload.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--schema"));
    }

    #[test]
    fn missing_payload() {
        cmd()
            .args(["document", "--schema", "schema.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("PAYLOAD"));
    }

    #[test]
    fn unknown_naming_strategy() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .args([
                "relational",
                &payload,
                "--schema",
                &schema,
                "--naming",
                "kebab",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("kebab"));
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("update maps"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("update-map"));
    }

    #[test]
    fn relational_help() {
        cmd()
            .args(["relational", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--schema"))
            .stdout(predicate::str::contains("--skip"))
            .stdout(predicate::str::contains("--max-depth"));
    }
}

mod verbose_logging {
    use super::*;

    #[test]
    fn verbose_logs_to_stderr() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .env_remove("RUST_LOG")
            .args(["relational", &payload, "--schema", &schema, "--verbose"])
            .assert()
            .success()
            .stderr(predicate::str::contains("processing field"));
    }

    #[test]
    fn quiet_by_default() {
        let dir = TempDir::new().unwrap();
        let (schema, payload) = customer_files(&dir);

        cmd()
            .env_remove("RUST_LOG")
            .args(["relational", &payload, "--schema", &schema])
            .assert()
            .success()
            .stderr(predicate::str::is_empty());
    }
}
