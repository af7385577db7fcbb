//! File-backed loading, the load cache and the dashboard pass.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use polars::prelude::AnyValue;
use survey_common::any_to_string;
use survey_config::Settings;
use survey_core::{
    FilterSet, HEAD_SEX_COLUMN, LoadCache, TableResult, build_dashboard, load_survey,
};
use survey_model::{
    CrosstabSpec, IndicatorRule, IndicatorRules, Normalize, SummarySpec, TableGroup, TableSpec,
    TabulationPlan,
};
use tempfile::TempDir;

const DATA: &str = "\
folio,departamento,area,sexo,miembros,ingreso,fac_exp,num_carencias
1,1,1,1,3,100,1.5,0
2,1,2,2,5,200,2.0,1
3,2,1,1,2,300,1.0,2
4,2,2,2,4,,0.5,3
5,1,1,2,1,150,1.0,2
6,2,1,1,6,250,2.0,0
";

const CODEBOOK: &str = "\
Var,Valor,Etiqueta,Etiqueta_Variable
departamento,1,San Salvador,Departamento
departamento,2,Cabañas,Departamento
area,1,Urbano,Área
area,2,Rural,Área
sexo,1,Hombre,Sexo
sexo,2,Mujer,Sexo
";

fn write_survey(dir: &Path) -> Settings {
    let data = dir.join("encuesta.csv");
    let codebook = dir.join("codebook.csv");
    fs::write(&data, DATA).unwrap();
    fs::write(&codebook, CODEBOOK).unwrap();
    let mut settings = Settings::new(data, codebook);
    settings.key_filter_col = Some("departamento".to_string());
    settings.weight_col = Some("fac_exp".to_string());
    settings.polygons_path = Some(dir.join("no_polygons.geojson"));
    settings
}

fn texts(df: &polars::prelude::DataFrame, column: &str) -> Vec<String> {
    let column = df.column(column).unwrap();
    (0..column.len())
        .map(|idx| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

#[test]
fn load_applies_labels_and_derived_fields() {
    let dir = TempDir::new().unwrap();
    let settings = write_survey(dir.path());
    let survey = load_survey(&settings).unwrap();

    assert_eq!(survey.raw.height(), 6);
    assert_eq!(survey.labeled.height(), 6);
    assert_eq!(
        texts(&survey.labeled, "sexo"),
        vec!["Hombre", "Mujer", "Hombre", "Mujer", "Mujer", "Hombre"]
    );
    assert_eq!(texts(&survey.raw, "sexo")[0], "1");
    assert_eq!(survey.labels.variable_label("area"), "Área");
    assert_eq!(survey.codebook.len(), 6);
    assert!(survey.labeled.column(HEAD_SEX_COLUMN).is_ok());
    assert!(survey.polygons.is_empty());
}

#[test]
fn missing_data_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut settings = write_survey(dir.path());
    settings.data_path = dir.path().join("no_such.csv");
    let err = load_survey(&settings).unwrap_err();
    assert!(format!("{err:#}").contains("no_such.csv"));
}

#[test]
fn cache_loads_once_per_configuration() {
    let dir = TempDir::new().unwrap();
    let settings = write_survey(dir.path());
    let loads = Cell::new(0);
    let mut cache = LoadCache::new();

    let loader = |s: &Settings| {
        loads.set(loads.get() + 1);
        load_survey(s)
    };
    let first = cache.get_or_load_with(&settings, loader).unwrap();
    let second = cache.get_or_load_with(&settings, loader).unwrap();
    assert_eq!(loads.get(), 1);
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let mut reweighted = settings.clone();
    reweighted.weight_col = None;
    reweighted.plan_path = Some(dir.path().join("tabulados.toml"));
    let third = cache.get_or_load_with(&reweighted, loader).unwrap();
    assert_eq!(loads.get(), 1);
    assert!(std::sync::Arc::ptr_eq(&first, &third));

    let mut changed = settings.clone();
    changed.polygons_path = None;
    cache.get_or_load_with(&changed, loader).unwrap();
    assert_eq!(loads.get(), 2);
    assert_eq!(cache.len(), 2);

    assert!(cache.invalidate(&settings));
    assert!(!cache.invalidate(&settings));
    cache.get_or_load_with(&settings, loader).unwrap();
    assert_eq!(loads.get(), 3);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn dashboard_tabulates_filtered_view() {
    let dir = TempDir::new().unwrap();
    let settings = write_survey(dir.path());
    let survey = load_survey(&settings).unwrap();

    let plan = TabulationPlan {
        groups: vec![TableGroup {
            name: "Hogares".to_string(),
            tables: vec![
                TableSpec::Freq("area".to_string()),
                TableSpec::Freq("no_existe".to_string()),
                TableSpec::Crosstab(CrosstabSpec {
                    row: "area".to_string(),
                    col: "sexo".to_string(),
                    weight: None,
                    normalize: Normalize::Index,
                    binned: false,
                }),
                TableSpec::Summary(SummarySpec {
                    var: "ingreso".to_string(),
                    weight: None,
                }),
            ],
        }],
    };
    let mut rules = IndicatorRules::default();
    rules.rules.insert(
        "pobreza".to_string(),
        IndicatorRule::threshold("num_carencias", 2.0),
    );
    rules
        .rules
        .insert("urbano".to_string(), IndicatorRule::regex("area", &["^urb"]));
    rules.rules.insert(
        "ausente".to_string(),
        IndicatorRule::threshold("no_existe", 1.0),
    );

    let filters = FilterSet::new().with("departamento", ["San Salvador"]);
    let report = build_dashboard(&survey, &settings, &filters, &plan, &rules).unwrap();

    assert_eq!(report.key_column.as_deref(), Some("departamento"));
    assert_eq!(report.key_label.as_deref(), Some("Departamento"));
    assert_eq!(report.metrics.records, 3);
    assert_eq!(report.metrics.weight_sum, Some(4.5));
    assert_eq!(report.metrics.groups, Some(1));

    let tables = &report.sections[0].tables;
    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0].title, "Frequency: Área");
    match &tables[0].result {
        TableResult::Frequency(table) => {
            assert!(table.weighted);
            assert_eq!(table.get("Urbano").map(|row| row.n), Some(2.5));
            assert_eq!(table.get("Rural").map(|row| row.n), Some(2.0));
        }
        other => panic!("unexpected table {other:?}"),
    }
    assert_eq!(tables[1].title, "Crosstab: Área × Sexo");
    match &tables[2].result {
        TableResult::Summary(summary) => {
            assert_eq!(summary.mean, 150.0);
            assert_eq!(summary.median, 150.0);
        }
        other => panic!("unexpected table {other:?}"),
    }

    assert_eq!(report.indicators["pobreza"], Some(33.33));
    assert_eq!(report.indicators["urbano"], Some(66.67));
    assert_eq!(report.indicators["ausente"], None);
}
