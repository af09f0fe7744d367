use mockito::Server;
use serde_json::json;

use super::harness::{
    FULL_RUN_TESTS, TestContext, healthy_catalog, json_mock, parse_json, write_file,
};

pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&TestContext) -> Result<(), String>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "help_output",
            run: scenario_help,
        },
        Scenario {
            name: "invalid_phase",
            run: scenario_invalid_phase,
        },
        Scenario {
            name: "invalid_timeout_env",
            run: scenario_invalid_timeout_env,
        },
        Scenario {
            name: "invalid_base_url",
            run: scenario_invalid_base_url,
        },
        Scenario {
            name: "malformed_config_file",
            run: scenario_malformed_config,
        },
        Scenario {
            name: "full_run_passes",
            run: scenario_full_run_passes,
        },
        Scenario {
            name: "full_run_json",
            run: scenario_full_run_json,
        },
        Scenario {
            name: "base_url_from_config_file",
            run: scenario_base_url_from_config,
        },
        Scenario {
            name: "server_error_fails_run",
            run: scenario_server_error,
        },
        Scenario {
            name: "unreachable_server",
            run: scenario_unreachable_server,
        },
        Scenario {
            name: "inconsistent_suggestions",
            run: scenario_inconsistent_suggestions,
        },
        Scenario {
            name: "custom_photo_upload",
            run: scenario_custom_photo,
        },
        Scenario {
            name: "missing_photo_file",
            run: scenario_missing_photo,
        },
        Scenario {
            name: "actors_with_cleanup",
            run: scenario_actors_cleanup,
        },
    ]
}

fn scenario_help(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("help")?;
    let output = ctx.run_check(&env, &["--help"])?;
    output.assert_success()?;
    output.assert_stdout_contains("--base-url")?;
    output.assert_stdout_contains("--phase")?;
    output.assert_stdout_contains("--cleanup")
}

fn scenario_invalid_phase(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("invalid-phase")?;
    let output = ctx.run_check(&env, &["--phase", "directors"])?;
    output.assert_exit_code(1)?;
    output.assert_stderr_contains("Unknown phase 'directors'")
}

fn scenario_invalid_timeout_env(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("invalid-timeout")?;
    let output = ctx.run_check_with_env(&env, &[], &[("CINEBASE_TIMEOUT", "abc")])?;
    output.assert_exit_code(1)?;
    output.assert_stderr_contains("invalid value 'abc'")?;

    let output = ctx.run_check(&env, &["--timeout", "soon"])?;
    output.assert_exit_code(1)?;
    output.assert_stderr_contains("invalid value 'soon'")
}

fn scenario_invalid_base_url(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("invalid-url")?;
    let output = ctx.run_check(&env, &["--base-url", "ftp://catalog"])?;
    output.assert_exit_code(1)?;
    output.assert_stderr_contains("Invalid base URL")
}

fn scenario_malformed_config(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("bad-config")?;
    env.write_config("{ base_url: ")?;
    let output = ctx.run_check(&env, &[])?;
    output.assert_failure()?;
    output.assert_stderr_contains("Failed to parse config file")
}

fn scenario_full_run_passes(ctx: &TestContext) -> Result<(), String> {
    let (server, _mocks) = healthy_catalog();
    let env = ctx.create_env("full-run")?;
    let url = server.url();
    let output = ctx.run_check(&env, &["--base-url", &url])?;

    output.assert_success()?;
    output.assert_stdout_contains("PHASE 1: ACTOR CRUD OPERATIONS")?;
    output.assert_stdout_contains("PHASE 5: FILE UPLOAD OPERATIONS")?;
    output.assert_stdout_contains(&format!("Tests run: {}", FULL_RUN_TESTS))?;
    output.assert_stdout_contains("Success rate: 100.0%")?;
    output.assert_stdout_contains("Marion Cotillard (ID: a1)")?;
    output.assert_stdout_contains("La Môme (ID: m1)")?;
    output.assert_stdout_contains("All tests passed!")
}

fn scenario_full_run_json(ctx: &TestContext) -> Result<(), String> {
    let (server, _mocks) = healthy_catalog();
    let env = ctx.create_env("full-run-json")?;
    let url = server.url();
    let output = ctx.run_check(&env, &["--base-url", &url, "--json"])?;
    output.assert_success()?;

    let json = parse_json(&output.stdout)?;
    if json["tests_run"] != FULL_RUN_TESTS || json["tests_passed"] != FULL_RUN_TESTS {
        return Err(format!("Unexpected counts: {}", json));
    }
    if json["tests_failed"] != 0 {
        return Err(format!("Expected no failures: {}", json));
    }
    let actors = json["created_actors"]
        .as_array()
        .ok_or("created_actors is not an array")?;
    if actors.len() != 2 || actors[1]["name"] != "Jean Dujardin" {
        return Err(format!("Unexpected created actors: {:?}", actors));
    }
    Ok(())
}

fn scenario_base_url_from_config(ctx: &TestContext) -> Result<(), String> {
    let (server, _mocks) = healthy_catalog();
    let env = ctx.create_env("config-url")?;
    env.write_config(&json!({"base_url": server.url(), "timeout_secs": 5}).to_string())?;

    let output = ctx.run_check(&env, &["--phase", "search"])?;
    output.assert_success()?;
    output.assert_stdout_contains(&format!("Base URL: {}", server.url()))?;
    output.assert_stdout_contains("Tests run: 5")
}

fn scenario_server_error(ctx: &TestContext) -> Result<(), String> {
    let mut server = Server::new();
    let _genres = server.mock("GET", "/genres").with_status(500).create();
    let _nationalities = json_mock(
        &mut server,
        "GET",
        "/nationalities",
        None,
        json!({"nationalities": []}).to_string(),
    );
    let _search = json_mock(
        &mut server,
        "GET",
        "/search",
        None,
        json!({"actors": [], "movies": []}).to_string(),
    );

    let env = ctx.create_env("server-error")?;
    let url = server.url();
    let output = ctx.run_check(&env, &["--base-url", &url, "--phase", "search"])?;
    if output.status != 1 {
        return Err(format!("Expected exit 1, got {}", output.status));
    }
    output.assert_stdout_contains("FAILED - Expected 200, got 500")?;
    output.assert_stdout_contains("Tests passed: 4")?;
    output.assert_stdout_contains("1 test(s) failed")?;
    output.assert_stdout_contains("Get All Genres: expected status 200, got 500")
}

fn scenario_unreachable_server(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("unreachable")?;
    let output = ctx.run_check(
        &env,
        &["--base-url", "http://127.0.0.1:9", "--timeout", "2", "--json"],
    )?;
    output.assert_failure()?;

    // Id-dependent scenarios are skipped; the consistency check stops at its first call
    let json = parse_json(&output.stdout)?;
    if json["tests_run"] != 20 || json["tests_passed"] != 0 {
        return Err(format!("Unexpected counts: {}", json));
    }
    Ok(())
}

fn scenario_inconsistent_suggestions(ctx: &TestContext) -> Result<(), String> {
    let mut server = Server::new();
    let first = json!({"actors": [{"id": "a1"}], "movies": [], "date": "2025-03-14"});
    let rotated = json!({"actors": [{"id": "a2"}], "movies": [], "date": "2025-03-15"});
    let _first = server
        .mock("GET", "/suggestions")
        .with_status(200)
        .with_body(first.to_string())
        .expect(2)
        .create();
    let _rotated = server
        .mock("GET", "/suggestions")
        .with_status(200)
        .with_body(rotated.to_string())
        .create();

    let env = ctx.create_env("inconsistent")?;
    let url = server.url();
    let output = ctx.run_check(&env, &["--base-url", &url, "--phase", "suggestions"])?;
    output.assert_failure()?;
    output.assert_stdout_contains("Responses are not consistent")?;
    output.assert_stdout_contains("Suggestions Consistency: Response #2 differs")
}

fn scenario_custom_photo(ctx: &TestContext) -> Result<(), String> {
    let (server, _mocks) = healthy_catalog();
    let env = ctx.create_env("custom-photo")?;
    let photo = env.root.join("poster.jpg");
    write_file(&photo, "not really a jpeg")?;

    let url = server.url();
    let photo_arg = photo.to_string_lossy().to_string();
    let output = ctx.run_check(&env, &["--base-url", &url, "--photo", &photo_arg])?;
    output.assert_success()?;
    output.assert_stdout_contains("Upload Actor Photo - a1")?;
    output.assert_stdout_contains("/uploads/movies/m1.png")
}

fn scenario_missing_photo(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("missing-photo")?;
    let output = ctx.run_check(
        &env,
        &["--base-url", "http://127.0.0.1:9", "--photo", "/nonexistent/photo.png"],
    )?;
    output.assert_failure()?;
    output.assert_stderr_contains("Failed to read photo")
}

fn scenario_actors_cleanup(ctx: &TestContext) -> Result<(), String> {
    let (mut server, _mocks) = healthy_catalog();
    let updated = json!({"id": "a2", "nom": "Jean Dujardin", "age": 53, "nationalite": "Française"});
    let _update = json_mock(
        &mut server,
        "PUT",
        "/actors/a2",
        Some(json!({"age": 53})),
        updated.to_string(),
    );
    let _delete_a1 = json_mock(
        &mut server,
        "DELETE",
        "/actors/a1",
        None,
        json!({"message": "Acteur supprimé"}).to_string(),
    );
    let _delete_a2 = json_mock(
        &mut server,
        "DELETE",
        "/actors/a2",
        None,
        json!({"message": "Acteur supprimé"}).to_string(),
    );
    let _gone_a1 = server
        .mock("GET", "/actors/a1")
        .with_status(404)
        .with_body(r#"{"detail": "Acteur non trouvé"}"#)
        .create();
    let _gone_a2 = server
        .mock("GET", "/actors/a2")
        .with_status(404)
        .with_body(r#"{"detail": "Acteur non trouvé"}"#)
        .create();

    let env = ctx.create_env("cleanup")?;
    let url = server.url();
    let output = ctx.run_check(
        &env,
        &["--base-url", &url, "--phase", "actors", "--cleanup", "--json"],
    )?;
    output.assert_success()?;

    // 7 actor scenarios, one update, two deletes each followed by a 404 lookup
    let json = parse_json(&output.stdout)?;
    if json["tests_run"] != 12 || json["tests_passed"] != 12 {
        return Err(format!("Unexpected counts: {}", json));
    }
    Ok(())
}
