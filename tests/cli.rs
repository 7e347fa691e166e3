use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn plan_route() -> Command {
    Command::cargo_bin("plan_route").expect("plan_route binary")
}

fn last_waypoint(document: &Value) -> Vec<f64> {
    let waypoints = document["waypoints"].as_array().expect("waypoints array");
    assert!(!waypoints.is_empty());
    waypoints
        .last()
        .and_then(Value::as_array)
        .expect("waypoint row")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect()
}

#[test]
fn plan_route_prints_the_plan_as_json() {
    let output = plan_route()
        .args(["--config", "configs/mission.toml"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let document: Value = serde_json::from_slice(&output).expect("plan JSON");
    assert_eq!(document["planner"], "grid");
    assert_eq!(document["target_altitude"], 5.0);
    assert_eq!(document["home"]["latitude"], 37.79248);
    assert_eq!(document["home"]["longitude"], -122.39745);
    // Goal cell of the bundled map, relative to its anchor.
    assert_eq!(last_waypoint(&document), vec![364.0, -245.0, 5.0, 0.0]);
}

#[test]
fn plan_route_writes_to_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plans/route.json");

    plan_route()
        .args(["--config", "configs/mission_roadmap.yaml", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(roadmap planner)"));

    let document: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("plan file")).expect("plan JSON");
    assert_eq!(document["planner"], "roadmap");
    let last = last_waypoint(&document);
    assert_eq!(last[2], 5.0);
}

#[test]
fn plan_route_accepts_a_colliders_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let map = dir.path().join("colliders.csv");
    fs::write(
        &map,
        "lat0 37.790000, lon0 -122.400000\nposX,posY,posZ,halfSizeX,halfSizeY,halfSizeZ\n\
         -50,-100,0,0,0,0\n700,100,0,0,0,0\n",
    )
    .expect("write map");

    let output = plan_route()
        .args(["--config", "configs/mission.toml", "--colliders"])
        .arg(&map)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let document: Value = serde_json::from_slice(&output).expect("plan JSON");
    assert_eq!(document["waypoints"].as_array().map(Vec::len), Some(2));
    assert_eq!(last_waypoint(&document), vec![640.0, -22.0, 5.0, 0.0]);
}

#[test]
fn plan_route_fails_on_missing_config() {
    plan_route()
        .args(["--config", "configs/does_not_exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read configuration"));
}

#[test]
fn plan_route_fails_on_malformed_map() {
    let dir = tempfile::tempdir().expect("tempdir");
    let map = dir.path().join("colliders.csv");
    fs::write(&map, "not a header\n").expect("write map");

    plan_route()
        .args(["--config", "configs/mission.toml", "--colliders"])
        .arg(&map)
        .assert()
        .failure()
        .stderr(predicate::str::contains("obstacle map"));
}
