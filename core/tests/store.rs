//! Table store tests: atomic publication and read-back.

use loadgen_core::{
    config::{DatasetConfig, PersonaCount},
    engine::DatasetEngine,
    error::SimError,
    persona::Persona,
    store::{load_dataset, write_dataset, DatasetPaths, GROUND_TRUTH_FILE, TIDY_FILE},
};

fn config(counts: &[(Persona, usize)]) -> DatasetConfig {
    DatasetConfig::with_distribution(
        counts
            .iter()
            .map(|&(persona, count)| PersonaCount { persona, count })
            .collect(),
    )
}

#[test]
fn output_directory_is_created() {
    let root = tempfile::tempdir().unwrap();
    let nested = root.path().join("a").join("b");
    let engine = DatasetEngine::new(config(&[(Persona::P1, 2)]), 1).unwrap();
    let (paths, _) = write_dataset(&engine, &nested).unwrap();
    assert!(paths.ground_truth.is_file());
    assert!(paths.tidy.is_file());
}

#[test]
fn written_tables_read_back_intact() {
    let dir = tempfile::tempdir().unwrap();
    let engine = DatasetEngine::new(config(&[(Persona::P2, 3), (Persona::P4, 2)]), 9).unwrap();
    let (_, summary) = write_dataset(&engine, dir.path()).unwrap();

    let dataset = load_dataset(dir.path()).unwrap();
    assert_eq!(dataset.ground_truth.len(), summary.customers);
    assert_eq!(dataset.measurements.len(), summary.rows);
    assert_eq!(dataset.ground_truth[3].persona_id, "P4");
    assert!(
        dataset.measurements.iter().all(|m| m.q_value.is_some()),
        "q_value must never be empty on disk"
    );
}

#[test]
fn failed_run_leaves_no_tables_behind() {
    let dir = tempfile::tempdir().unwrap();
    // P2 needs two spike slots; a one-sample horizon fails after P1 was streamed.
    let mut cfg = config(&[(Persona::P1, 2), (Persona::P2, 1)]);
    cfg.horizon = 1;
    let engine = DatasetEngine::new(cfg, 5).unwrap();

    let err = write_dataset(&engine, dir.path()).unwrap_err();
    assert!(matches!(err, SimError::SpikeCountExceedsLength { .. }), "got {err:?}");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "partial output left behind: {leftovers:?}");
}

/// Occupy the tidy table's path with a non-empty directory so the final
/// rename of a run cannot succeed.
fn block_tidy_target(paths: &DatasetPaths) {
    std::fs::create_dir_all(paths.tidy.join("occupied")).unwrap();
}

#[test]
fn blocked_tidy_table_withdraws_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DatasetPaths::in_dir(dir.path());
    block_tidy_target(&paths);

    let engine = DatasetEngine::new(config(&[(Persona::P1, 2)]), 3).unwrap();
    let err = write_dataset(&engine, dir.path()).unwrap_err();
    assert!(matches!(err, SimError::Io(_)), "got {err:?}");

    assert!(!paths.ground_truth.exists(), "ground truth published without its tidy table");
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![TIDY_FILE.to_string()], "leftovers: {names:?}");
}

#[test]
fn blocked_tidy_table_restores_earlier_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DatasetPaths::in_dir(dir.path());
    let earlier = "customer_id,persona_id\nCUST_0001,P3\n";
    std::fs::write(&paths.ground_truth, earlier).unwrap();
    block_tidy_target(&paths);

    let engine = DatasetEngine::new(config(&[(Persona::P2, 1)]), 8).unwrap();
    assert!(write_dataset(&engine, dir.path()).is_err());

    assert_eq!(std::fs::read_to_string(&paths.ground_truth).unwrap(), earlier);
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec![GROUND_TRUTH_FILE.to_string(), TIDY_FILE.to_string()]);
}

#[test]
fn rewriting_a_dataset_replaces_both_tables() {
    let dir = tempfile::tempdir().unwrap();
    let first = DatasetEngine::new(config(&[(Persona::P1, 3)]), 1).unwrap();
    write_dataset(&first, dir.path()).unwrap();
    let second = DatasetEngine::new(config(&[(Persona::P4, 2)]), 2).unwrap();
    write_dataset(&second, dir.path()).unwrap();

    let dataset = load_dataset(dir.path()).unwrap();
    assert_eq!(dataset.ground_truth.len(), 2);
    assert!(dataset.ground_truth.iter().all(|r| r.persona_id == "P4"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2, "no sidecar files remain");
}

#[test]
fn missing_table_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, SimError::MissingInput { .. }), "got {err:?}");

    // One table alone is not enough either.
    std::fs::write(dir.path().join(TIDY_FILE), "customer_id,timestamp,p_value,q_value,v_value\n")
        .unwrap();
    match load_dataset(dir.path()).unwrap_err() {
        SimError::MissingInput { path } => assert!(path.ends_with(GROUND_TRUTH_FILE)),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn empty_q_cells_are_tolerated_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DatasetPaths::in_dir(dir.path());
    std::fs::write(&paths.ground_truth, "customer_id,persona_id\nCUST_0001,P4\n").unwrap();
    std::fs::write(
        &paths.tidy,
        "customer_id,timestamp,p_value,q_value,v_value\nCUST_0001,0,0.4,,0.01\nCUST_0001,1,0.5,0.1,0.02\n",
    )
    .unwrap();

    let dataset = load_dataset(dir.path()).unwrap();
    assert_eq!(dataset.measurements[0].q_value, None);
    assert_eq!(dataset.measurements[1].q_value, Some(0.1));
}

#[test]
fn malformed_table_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DatasetPaths::in_dir(dir.path());
    std::fs::write(&paths.ground_truth, "customer_id,persona_id\nCUST_0001,P1\n").unwrap();
    std::fs::write(
        &paths.tidy,
        "customer_id,timestamp,p_value,q_value,v_value\nCUST_0001,zero,1.0,1.0,1.0\n",
    )
    .unwrap();

    let err = load_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, SimError::MalformedTable { .. }), "got {err:?}");
}
