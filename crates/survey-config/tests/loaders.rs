use std::fs;
use std::path::Path;

use survey_config::{ConfigError, Settings, load_plan, load_rules, parse_rules};
use survey_model::{IndicatorCriterion, Normalize, TableSpec};
use tempfile::TempDir;

#[test]
fn settings_round_trip_through_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("settings.toml");
    fs::write(
        &path,
        r#"
data_path = "data/encuesta.csv"
codebook_path = "data/codebook.xlsx"
polygons_path = "data/polygons.geojson"
key_filter_col = "departamento"
weight_col = "fac_exp"
lat_col = "lat"
lon_col = "lon"
"#,
    )
    .expect("write settings");

    let settings = Settings::load(&path).expect("load settings");
    assert_eq!(settings.key_filter_col.as_deref(), Some("departamento"));
    assert_eq!(settings.weight_col.as_deref(), Some("fac_exp"));
    assert_eq!(
        settings.polygons_path.as_deref(),
        Some(Path::new("data/polygons.geojson"))
    );
}

#[test]
fn missing_settings_file_is_io_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = Settings::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn settings_without_data_path_fail_to_parse() {
    let err = Settings::parse("codebook_path = \"cb.csv\"\n", Path::new("s.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn plan_reads_all_table_kinds() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("tabulados.toml");
    fs::write(
        &path,
        r#"
[[tabulados]]
name = "Hogares"
tables = [
    { freq = "area" },
    { crosstab = { row = "area", col = "sexo_jefatura", normalize = "columns" } },
    { crosstab = { row = "miembros", col = "area", binned = true, weight = "fac_hog" } },
    { summary = { var = "ingreso", weight = "fac_exp" } },
]

[[tabulados]]
name = "Vivienda"
tables = [{ freq = "agua" }]
"#,
    )
    .expect("write plan");

    let plan = load_plan(&path).expect("load plan");
    assert_eq!(plan.groups.len(), 2);
    let hogares = &plan.groups[0];
    assert_eq!(hogares.name, "Hogares");
    assert_eq!(hogares.tables.len(), 4);
    match &hogares.tables[1] {
        TableSpec::Crosstab(spec) => assert_eq!(spec.normalize, Normalize::Columns),
        other => panic!("expected crosstab, got {other:?}"),
    }
    match &hogares.tables[2] {
        TableSpec::Crosstab(spec) => {
            assert!(spec.binned);
            assert_eq!(spec.weight.as_deref(), Some("fac_hog"));
            assert_eq!(spec.normalize, Normalize::Index);
        }
        other => panic!("expected crosstab, got {other:?}"),
    }
}

#[test]
fn missing_rules_file_is_empty() {
    let dir = TempDir::new().expect("temp dir");
    let rules = load_rules(&dir.path().join("indicadores.toml")).expect("load rules");
    assert!(rules.is_empty());
}

#[test]
fn rules_accept_integer_thresholds() {
    let rules = parse_rules(
        r#"
[rules.pobreza]
var = "num_carencias"
threshold = 2

[rules.agua_red]
var = "agua"
label_regex_any = ["cañer", "red p[uú]blica"]
"#,
        Path::new("indicadores.toml"),
    )
    .expect("parse rules");
    assert_eq!(rules.len(), 2);
    assert_eq!(
        rules.rules["pobreza"].criterion(),
        Some(IndicatorCriterion::Threshold(2.0))
    );
    assert!(matches!(
        rules.rules["agua_red"].criterion(),
        Some(IndicatorCriterion::LabelRegexAny(patterns)) if patterns.len() == 2
    ));
}

#[test]
fn bundled_config_files_parse() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config");
    let settings = Settings::load(&root.join("settings.toml")).expect("bundled settings");
    assert_eq!(settings.weight_col.as_deref(), Some("fac_exp"));

    let plan = load_plan(&root.join("tabulados.toml")).expect("bundled plan");
    assert_eq!(plan.groups.len(), 2);
    assert_eq!(plan.groups[0].tables.len(), 4);

    let rules = load_rules(&root.join("indicadores.toml")).expect("bundled rules");
    assert_eq!(rules.len(), 3);
    assert!(matches!(
        rules.rules["agua_por_caneria"].criterion(),
        Some(IndicatorCriterion::LabelRegexAny(_))
    ));
}
