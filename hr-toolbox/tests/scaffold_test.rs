// Scaffold checks: shipped defaults parse and the source layout is intact.

use std::path::Path;

/// Verify that defaults/toolbox.toml is valid TOML with every section.
#[test]
fn default_config_is_valid_toml() {
    let content = std::fs::read_to_string("defaults/toolbox.toml")
        .expect("defaults/toolbox.toml should exist");
    let parsed: toml::Value = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("defaults/toolbox.toml is not valid TOML: {e}"));
    for section in ["database", "draw", "grouping", "export"] {
        assert!(
            parsed.get(section).is_some(),
            "defaults/toolbox.toml is missing [{section}]"
        );
    }
}

/// Verify that the shipped defaults pass validation.
#[test]
fn default_config_loads() {
    let content = std::fs::read_to_string("defaults/toolbox.toml").unwrap();
    let config = hr_toolbox::config::parse_config(&content, Path::new("defaults/toolbox.toml"))
        .expect("defaults should validate");
    assert!(config.draw.ticks > 0);
    assert!(config.grouping.default_group_size >= 1);
}

/// Verify that all expected directories exist.
#[test]
fn directory_structure_exists() {
    let expected_dirs = [
        "src",
        "src/roster",
        "src/draw",
        "src/grouping",
        "src/tui",
        "src/tui/widgets",
        "defaults",
        "tests",
        "tests/fixtures",
    ];
    for dir in expected_dirs {
        assert!(Path::new(dir).is_dir(), "Expected directory '{}' to exist", dir);
    }
}

/// Verify that all expected source files exist.
#[test]
fn source_files_exist() {
    let expected_files = [
        "src/main.rs",
        "src/lib.rs",
        "src/app.rs",
        "src/config.rs",
        "src/db.rs",
        "src/protocol.rs",
        "src/roster/mod.rs",
        "src/roster/participant.rs",
        "src/roster/parse.rs",
        "src/roster/state.rs",
        "src/draw/mod.rs",
        "src/draw/engine.rs",
        "src/draw/schedule.rs",
        "src/draw/celebration.rs",
        "src/grouping/mod.rs",
        "src/grouping/engine.rs",
        "src/grouping/export.rs",
        "src/tui/mod.rs",
        "src/tui/input.rs",
        "src/tui/layout.rs",
        "src/tui/widgets/mod.rs",
        "tests/fixtures/staff.csv",
    ];
    for file in expected_files {
        assert!(Path::new(file).is_file(), "Expected file '{}' to exist", file);
    }
}
