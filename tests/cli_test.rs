//! CLI integration tests for the schema-form binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("schema-form"))
}

// Helper to create a temp input file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const PERSON_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "name": { "type": "string", "minLength": 2 },
        "age": { "type": "integer", "minimum": 0, "maximum": 120 },
        "color": { "type": "string", "enum": ["red", "blue"] }
    },
    "required": ["name"]
}"#;

mod build_command {
    use super::*;

    #[test]
    fn basic_build() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["build", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""controlType":"FormGroup""#))
            .stdout(predicate::str::contains(r#""type":"range""#))
            .stdout(predicate::str::contains(r#""type":"select""#))
            .stdout(predicate::str::contains(r#""fieldMap""#));
    }

    #[test]
    fn build_with_pretty() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["build", schema.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn build_with_data_and_options() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{ "name": "Grace" }"#);
        let options = write_temp_file(
            &dir,
            "options.json",
            r#"{
                "defaults": { "htmlClass": "wide" },
                "layout": [{ "pointer": "/name", "type": "textarea", "options": { "title": "Full name" } }]
            }"#,
        );

        cmd()
            .args([
                "build",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
                "--options",
                options.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""value":"Grace""#))
            .stdout(predicate::str::contains(r#""type":"textarea""#))
            .stdout(predicate::str::contains(r#""title":"Full name""#))
            .stdout(predicate::str::contains(r#""htmlClass":"wide""#));
    }

    #[test]
    fn build_with_output_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let output = dir.path().join("model.json");

        cmd()
            .args([
                "build",
                schema.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        // Verify file was written
        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#""templatePointer":"/controls/age""#));
    }

    #[test]
    fn build_rejects_non_object_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", "[1, 2]");

        cmd()
            .args(["build", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("root schema must be an object"));
    }

    #[test]
    fn build_rejects_invalid_options() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let options = write_temp_file(&dir, "options.json", r#"{ "layout": 3 }"#);

        cmd()
            .args([
                "build",
                schema.to_str().unwrap(),
                "--options",
                options.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid form options"));
    }

    #[test]
    fn build_verbose_logs_to_stderr() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["build", schema.to_str().unwrap(), "--verbose"])
            .assert()
            .success()
            .stderr(predicate::str::contains("form model built"));
    }
}

mod field_command {
    use super::*;

    #[test]
    fn describes_one_field() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["field", schema.to_str().unwrap(), "/age"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""type":"range""#))
            .stdout(predicate::str::contains(r#""required":false"#))
            .stdout(predicate::str::contains(r#""minimum":[0,false]"#));
    }

    #[test]
    fn required_field() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["field", schema.to_str().unwrap(), "/name"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""required":true"#))
            .stdout(predicate::str::contains(r#""minLength":[2]"#));
    }

    #[test]
    fn follows_references() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r##"{
                "type": "object",
                "definitions": { "when": { "type": "string", "format": "date" } },
                "properties": { "start": { "$ref": "#/definitions/when" } }
            }"##,
        );

        cmd()
            .args(["field", schema.to_str().unwrap(), "/start"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""type":"date""#));
    }

    #[test]
    fn unknown_pointer_fails() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["field", schema.to_str().unwrap(), "/missing"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no schema found for /missing"));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_data() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{ "name": "Ada", "age": 36 }"#);

        cmd()
            .args(["validate", schema.to_str().unwrap(), data.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn invalid_data() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{ "age": 200 }"#);

        cmd()
            .args(["validate", schema.to_str().unwrap(), data.to_str().unwrap()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"))
            .stderr(predicate::str::contains("/age"));
    }

    #[test]
    fn invalid_data_json_output() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{ "name": "A", "color": "green" }"#);

        cmd()
            .args([
                "validate",
                schema.to_str().unwrap(),
                data.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""path":"/name""#))
            .stdout(predicate::str::contains(r#""path":"/color""#));
    }

    #[test]
    fn valid_json_output() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{ "name": "Ada" }"#);

        cmd()
            .args([
                "validate",
                schema.to_str().unwrap(),
                data.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"valid":true}"#));
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_schema_file() {
        cmd()
            .args(["build", "/nonexistent/schema.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_json_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", "not json");

        cmd()
            .args(["field", schema.to_str().unwrap(), "/a"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn missing_data_file_json_output() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args([
                "validate",
                schema.to_str().unwrap(),
                "/nonexistent/data.json",
                "--json",
            ])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""valid":false"#));
    }
}
