//! End-to-end flows behind `course-planner` commands: edit a catalog on disk,
//! reload it, then order, plan, export and validate it.

use cpg_core::catalog::Catalog;
use cpg_core::planner::{PlanOptions, plan_terms_detailed};
use cpg_core::topo::topo_order;

fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::seeded();
    catalog.upsert_course("CS301", "Algorithms", 4);
    catalog.upsert_course("MATH150", "Discrete Math", 3);
    let ds = catalog.find_by_code("CS201").unwrap().id.clone();
    let algo = catalog.find_by_code("CS301").unwrap().id.clone();
    let disc = catalog.find_by_code("MATH150").unwrap().id.clone();
    catalog.add_prereq(&ds, &algo);
    catalog.add_prereq(&disc, &algo);
    catalog
}

fn codes(catalog: &Catalog, ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| catalog.course(id).unwrap().code.clone())
        .collect()
}

#[test]
fn test_storage_load_nonexistent() {
    let tmpdir = tempfile::tempdir().unwrap();
    let result = cpg_core::storage::load(tmpdir.path());
    assert!(result.is_err(), "loading from empty dir should fail");
}

#[test]
fn test_init_edit_and_reload() {
    let tmpdir = tempfile::tempdir().unwrap();
    cpg_core::storage::save(tmpdir.path(), &Catalog::new()).unwrap();

    let mut catalog = cpg_core::storage::load(tmpdir.path()).unwrap();
    catalog.upsert_course("phys101", "Mechanics", 4);
    catalog.upsert_course("PHYS201", "Electromagnetism", 4);
    let a = catalog.resolve("PHYS101").unwrap().id.clone();
    let b = catalog.resolve("phys201").unwrap().id.clone();
    catalog.add_prereq(&a, &b);
    cpg_core::storage::save(tmpdir.path(), &catalog).unwrap();

    let reloaded = cpg_core::storage::load(tmpdir.path()).unwrap();
    assert_eq!(reloaded.courses.len(), 2);
    assert_eq!(reloaded.prereqs.len(), 1);
    let order = topo_order(&reloaded.graph()).unwrap();
    assert_eq!(codes(&reloaded, &order), vec!["PHYS101", "PHYS201"]);
}

#[test]
fn test_plan_with_credits() {
    let catalog = sample_catalog();
    let plan = plan_terms_detailed(&catalog.graph(), &PlanOptions::default()).unwrap();
    assert!(plan.is_complete());
    assert_eq!(codes(&catalog, &plan.terms[0]), vec!["CS101", "MATH150"]);
    assert_eq!(codes(&catalog, &plan.terms[1]), vec!["CS201"]);
    assert_eq!(codes(&catalog, &plan.terms[2]), vec!["CS301"]);
    assert_eq!(catalog.total_credits(&plan.terms[0]), 7);
}

#[test]
fn test_plan_with_code_targets() {
    let catalog = sample_catalog();
    let targets: Vec<String> = ["cs301", "cs201"]
        .iter()
        .map(|t| catalog.resolve(t).unwrap().id.clone())
        .collect();
    let opts = PlanOptions::default().with_targets(targets);
    let plan = plan_terms_detailed(&catalog.graph(), &opts).unwrap();
    assert_eq!(plan.terms.len(), 2);
    assert_eq!(codes(&catalog, &plan.terms[0]), vec!["CS201"]);
    assert_eq!(codes(&catalog, &plan.terms[1]), vec!["CS301"]);
}

#[test]
fn test_plan_json_output_shape() {
    let catalog = sample_catalog();
    let opts = PlanOptions::default().with_targets(["missing"]);
    let plan = plan_terms_detailed(&catalog.graph(), &opts).unwrap();
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["terms"].as_array().unwrap().len(), 0);
    assert_eq!(value["unscheduled"][0], "missing");
}

#[test]
fn test_cycle_blocks_plan_and_is_reported() {
    let mut catalog = sample_catalog();
    let intro = catalog.find_by_code("CS101").unwrap().id.clone();
    let algo = catalog.find_by_code("CS301").unwrap().id.clone();
    catalog.add_prereq(&algo, &intro);

    assert!(plan_terms_detailed(&catalog.graph(), &PlanOptions::default()).is_err());
    let report = cpg_nav::health::check_catalog(&catalog);
    let stuck = report.cycle.unwrap();
    assert_eq!(codes(&catalog, &stuck).len(), 3);
    assert!(!codes(&catalog, &stuck).contains(&"MATH150".to_string()));
}

#[test]
fn test_export_from_saved_catalog() {
    let tmpdir = tempfile::tempdir().unwrap();
    cpg_core::storage::save(tmpdir.path(), &sample_catalog()).unwrap();
    let loaded = cpg_core::storage::load(tmpdir.path()).unwrap();

    let mermaid = cpg_nav::export::export(
        &loaded.graph(),
        cpg_nav::export::ExportFormat::Mermaid,
        cpg_nav::export::RankDir::LeftRight,
    )
    .unwrap();
    assert!(mermaid.contains("CS301 — Algorithms"));
    assert_eq!(mermaid.matches("-->").count(), 3);
}

#[test]
fn test_config_defaults_without_file() {
    let tmpdir = tempfile::tempdir().unwrap();
    let config = cpg_core::config::CpgConfig::load(tmpdir.path()).unwrap();
    assert_eq!(config.export.direction, "LR");
}
