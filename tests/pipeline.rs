use std::fs;

use motion_planning::colliders::HomeAnchor;
use motion_planning::mission::{
    FailureKind, MissionPlanner, MissionState, PipelineError, Supervisor, SupervisorError,
    TelemetryEvent, VehicleTelemetry, WaypointPipeline, plan_waypoints,
};
use motion_planning::planner::{GridPlanner, PlannerError, RoadmapPlanner};
use motion_planning::primitives::{
    GlobalPosition, LocalPosition, ObstacleRecord, global_to_local, local_to_global,
};

const TARGET_ALTITUDE: f64 = 5.0;
const SAFETY_MARGIN: f64 = 5.0;

fn home_anchor() -> HomeAnchor {
    HomeAnchor {
        latitude: 37.79,
        longitude: -122.40,
    }
}

fn goal() -> GlobalPosition {
    GlobalPosition::new(-122.4002093, 37.79577523, 0.0)
}

/// Ground-level marker: bounds the map without blocking at the planning altitude.
fn marker(north: f64, east: f64) -> ObstacleRecord {
    ObstacleRecord {
        north,
        east,
        altitude: 0.0,
        half_north: 0.0,
        half_east: 0.0,
        half_altitude: 0.0,
    }
}

fn tower(north: f64, east: f64, half_north: f64, half_east: f64) -> ObstacleRecord {
    ObstacleRecord {
        north,
        east,
        altitude: 20.0,
        half_north,
        half_east,
        half_altitude: 20.0,
    }
}

fn open_map() -> Vec<ObstacleRecord> {
    vec![marker(-50.0, -100.0), marker(700.0, 100.0)]
}

#[test]
fn end_to_end_route_ends_at_the_goal_cell() {
    let home = home_anchor().to_global();
    let plan = plan_waypoints(
        &GridPlanner::new(),
        &home_anchor(),
        &open_map(),
        &home,
        &goal(),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    )
    .expect("plan");

    let goal_local = global_to_local(&goal(), &home);
    let last = plan.waypoints.last().expect("waypoints");
    assert_eq!(last.north, goal_local.north.trunc());
    assert_eq!(last.east, goal_local.east.trunc());
    assert_eq!(last.north, 640.0);
    assert_eq!(last.east, -22.0);
    assert_eq!(last.altitude, 5.0);
    assert_eq!(last.heading, 0.0);

    assert!(plan.waypoints.len() >= 2);
    let first = plan.waypoints[0];
    assert_eq!((first.north, first.east, first.altitude), (0.0, 0.0, 5.0));
    assert_eq!(plan.home, home);
    assert_eq!(plan.target_altitude, 5.0);
    for waypoint in &plan.waypoints {
        assert_eq!(waypoint.altitude, TARGET_ALTITUDE);
        assert_eq!(waypoint.heading, 0.0);
        assert_eq!(waypoint.north.fract(), 0.0);
        assert_eq!(waypoint.east.fract(), 0.0);
    }
}

#[test]
fn open_map_route_is_pruned_to_its_endpoints() {
    let home = home_anchor().to_global();
    let plan = plan_waypoints(
        &GridPlanner::new(),
        &home_anchor(),
        &open_map(),
        &home,
        &goal(),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    )
    .expect("plan");
    assert_eq!(plan.waypoints.len(), 2);
}

#[test]
fn route_around_a_tower_stays_clear_of_its_inflated_footprint() {
    let home = home_anchor().to_global();
    let mut obstacles = open_map();
    // Tower straddling the straight line to the goal.
    obstacles.push(tower(300.0, -10.0, 20.0, 20.0));

    let plan = plan_waypoints(
        &GridPlanner::new(),
        &home_anchor(),
        &obstacles,
        &home,
        &goal(),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    )
    .expect("plan");

    assert!(plan.waypoints.len() >= 3, "{:?}", plan.waypoints);
    let last = plan.waypoints.last().expect("waypoints");
    assert_eq!((last.north, last.east), (640.0, -22.0));
    for waypoint in &plan.waypoints {
        let inside = (waypoint.north - 300.0).abs() <= 25.0 && (waypoint.east + 10.0).abs() <= 25.0;
        assert!(!inside, "waypoint {waypoint:?} inside inflated tower");
    }
}

#[test]
fn roadmap_planner_snaps_to_lattice_nodes() {
    let home = home_anchor().to_global();
    let plan = plan_waypoints(
        &RoadmapPlanner::new(10).expect("spacing"),
        &home_anchor(),
        &open_map(),
        &home,
        &goal(),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    )
    .expect("plan");

    // Grid origin is at local (-50, -100); nodes sit every 10 m from there.
    let first = plan.waypoints[0];
    assert_eq!((first.north, first.east), (0.0, 0.0));
    let last = plan.waypoints.last().expect("waypoints");
    assert_eq!((last.north, last.east), (640.0, -20.0));
}

fn enclosed_goal_map() -> (Vec<ObstacleRecord>, GlobalPosition) {
    let home = home_anchor().to_global();
    let obstacles = vec![
        marker(-20.0, -20.0),
        marker(150.0, 150.0),
        tower(110.0, 100.0, 1.0, 11.0),
        tower(90.0, 100.0, 1.0, 11.0),
        tower(100.0, 110.0, 11.0, 1.0),
        tower(100.0, 90.0, 11.0, 1.0),
    ];
    let goal = local_to_global(&LocalPosition::new(100.4, 100.4, 0.0), &home);
    (obstacles, goal)
}

#[test]
fn enclosed_goal_is_reported_unreachable() {
    let home = home_anchor().to_global();
    let (obstacles, goal) = enclosed_goal_map();

    for result in [
        plan_waypoints(
            &GridPlanner::new(),
            &home_anchor(),
            &obstacles,
            &home,
            &goal,
            TARGET_ALTITUDE,
            0.0,
        ),
        plan_waypoints(
            &RoadmapPlanner::new(10).expect("spacing"),
            &home_anchor(),
            &obstacles,
            &home,
            &goal,
            TARGET_ALTITUDE,
            0.0,
        ),
    ] {
        match result {
            Err(PipelineError::Unreachable(PlannerError::NoPath { .. })) => {}
            other => panic!("expected unreachable goal, got {other:?}"),
        }
    }
}

#[test]
fn unreachable_goal_leaves_queue_unset_and_stops_the_mission() {
    let home = home_anchor().to_global();
    let (obstacles, goal) = enclosed_goal_map();
    let mut planner = move |telemetry: &VehicleTelemetry| {
        plan_waypoints(
            &GridPlanner::new(),
            &home_anchor(),
            &obstacles,
            &telemetry.global_position,
            &goal,
            TARGET_ALTITUDE,
            0.0,
        )
    };

    let on_ground = VehicleTelemetry {
        global_position: home,
        global_home: home,
        ..VehicleTelemetry::default()
    };
    let armed = VehicleTelemetry {
        armed: true,
        ..on_ground
    };

    let mut supervisor = Supervisor::default();
    supervisor
        .dispatch(TelemetryEvent::State, &on_ground, &mut planner)
        .expect("arming");
    let err = supervisor
        .dispatch(TelemetryEvent::State, &armed, &mut planner)
        .unwrap_err();
    assert!(matches!(err, SupervisorError::Planning(PipelineError::Unreachable(_))), "{err:?}");

    assert_eq!(supervisor.state(), MissionState::Arming);
    assert!(supervisor.remaining_waypoints().is_none());
    let failure = supervisor.failure().expect("failure recorded");
    assert_eq!(failure.kind, FailureKind::Unreachable);
    assert_eq!(failure.state, MissionState::Arming);

    // Every later event is ignored; there is no spurious takeoff or landing.
    for event in [TelemetryEvent::State, TelemetryEvent::Position, TelemetryEvent::Velocity] {
        let commands = supervisor
            .dispatch(event, &armed, &mut planner)
            .expect("ignored");
        assert!(commands.is_empty());
    }
    assert_eq!(supervisor.state(), MissionState::Arming);
}

#[test]
fn invalid_inputs_are_configuration_errors() {
    let home = home_anchor().to_global();
    let err = plan_waypoints(
        &GridPlanner::new(),
        &home_anchor(),
        &open_map(),
        &home,
        &goal(),
        0.0,
        SAFETY_MARGIN,
    )
    .unwrap_err();
    assert!(err.is_configuration(), "{err:?}");

    let err = plan_waypoints(
        &GridPlanner::new(),
        &home_anchor(),
        &open_map(),
        &home,
        &GlobalPosition::new(-122.4, 89.0, 0.0),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)), "{err:?}");

    let err = plan_waypoints(
        &GridPlanner::new(),
        &home_anchor(),
        &[],
        &home,
        &goal(),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Planner(PlannerError::EmptyMap)), "{err:?}");
    assert!(!err.is_configuration());
}

#[test]
fn pipeline_reads_the_obstacle_map_at_planning_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("colliders.csv");
    fs::write(
        &path,
        "lat0 37.790000, lon0 -122.400000\nposX,posY,posZ,halfSizeX,halfSizeY,halfSizeZ\n\
         -50,-100,0,0,0,0\n700,100,0,0,0,0\n",
    )
    .expect("write map");

    let mut pipeline = WaypointPipeline::new(
        GridPlanner::new(),
        &path,
        goal(),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    );
    let telemetry = VehicleTelemetry {
        global_position: home_anchor().to_global(),
        ..VehicleTelemetry::default()
    };
    let plan = pipeline.plan(&telemetry).expect("plan");
    let last = plan.waypoints.last().expect("waypoints");
    assert_eq!((last.north, last.east), (640.0, -22.0));

    fs::write(&path, "lat0 37.79\n").expect("corrupt map");
    let err = pipeline.plan(&telemetry).unwrap_err();
    assert!(matches!(err, PipelineError::ObstacleMap(_)), "{err:?}");
    assert!(err.is_configuration());
}

#[test]
fn malformed_map_is_a_configuration_failure_of_the_mission() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("colliders.csv");
    fs::write(&path, "lat0 37.79, lon0 -122.40\ntitles\n1,2,3\n").expect("write map");

    let mut pipeline = WaypointPipeline::new(
        GridPlanner::new(),
        &path,
        goal(),
        TARGET_ALTITUDE,
        SAFETY_MARGIN,
    );
    let on_ground = VehicleTelemetry {
        global_position: home_anchor().to_global(),
        ..VehicleTelemetry::default()
    };
    let armed = VehicleTelemetry {
        armed: true,
        ..on_ground
    };

    let mut supervisor = Supervisor::default();
    supervisor
        .dispatch(TelemetryEvent::State, &on_ground, &mut pipeline)
        .expect("arming");
    let err = supervisor
        .dispatch(TelemetryEvent::State, &armed, &mut pipeline)
        .unwrap_err();
    assert!(matches!(err, SupervisorError::Planning(PipelineError::ObstacleMap(_))));
    assert_eq!(
        supervisor.failure().map(|failure| failure.kind),
        Some(FailureKind::Configuration)
    );
    assert!(supervisor.remaining_waypoints().is_none());
}
