mod support;

use framexl::Catalog;
use support::TestWorkspace;

const YAML_CATALOG: &str = r#"
sheets:
  quarterly:
    rules:
      header_outer: "bold; fill=#0070C0; font_color=white"
      data: "border=all_thin"
      "score_*": "number_format=#,##0.00"
"#;

const JSON_CATALOG: &str = r#"
{
  "sheets": {
    "minimal": {
      "rules": { "header": "bold" }
    }
  }
}
"#;

#[test]
fn yaml_catalog_loads_and_overlays_builtins() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_file("styles.yaml", YAML_CATALOG);
    let catalog = Catalog::load(&path).unwrap();

    // builtins survive the overlay
    assert!(catalog.get("plain").is_ok());
    let quarterly = catalog.get("quarterly").unwrap();
    assert_eq!(quarterly.rules.len(), 3);
    assert_eq!(
        quarterly.rules.get("data").map(String::as_str),
        Some("border=all_thin")
    );
}

#[test]
fn json_catalog_loads_by_extension() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_file("styles.json", JSON_CATALOG);
    let catalog = Catalog::from_file(&path).unwrap();
    assert!(catalog.get("minimal").is_ok());
    assert!(catalog.get("plain").is_err());
}

#[test]
fn bad_directives_fail_the_load_not_the_export() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_file(
        "broken.yaml",
        "sheets:\n  broken:\n    rules:\n      header: \"blod\"\n",
    );
    let err = Catalog::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[test]
fn unknown_extension_is_rejected() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_file("styles.toml", "sheets = {}");
    assert!(Catalog::from_file(&path).is_err());
}
