use std::fs;

use mavlink::MavHeader;
use mavlink::common::{
    GLOBAL_POSITION_INT_DATA, HEARTBEAT_DATA, LOCAL_POSITION_NED_DATA, MavAutopilot, MavCmd,
    MavFrame, MavMessage, MavModeFlag, MavState, MavType,
};
use motion_planning::config::GuardThresholds;
use motion_planning::link::{
    NavLog, TelemetryUpdate, VEHICLE_SYSTEM_ID, apply_message, degrees_e7, set_home_message,
};
use motion_planning::mission::supervisor::{GuardInputs, transition};
use motion_planning::mission::{MissionState, TelemetryEvent, VehicleTelemetry};
use motion_planning::primitives::Waypoint;

fn armed_guided() -> MavModeFlag {
    MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED | MavModeFlag::MAV_MODE_FLAG_GUIDED_ENABLED
}

fn from_system(system_id: u8) -> MavHeader {
    MavHeader {
        system_id,
        component_id: 1,
        sequence: 0,
    }
}

fn vehicle() -> MavHeader {
    from_system(VEHICLE_SYSTEM_ID)
}

fn heartbeat_of(mavtype: MavType, autopilot: MavAutopilot, base_mode: MavModeFlag) -> MavMessage {
    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0,
        mavtype,
        autopilot,
        base_mode,
        system_status: MavState::MAV_STATE_ACTIVE,
        mavlink_version: 3,
    })
}

fn heartbeat(base_mode: MavModeFlag) -> MavMessage {
    heartbeat_of(MavType::MAV_TYPE_QUADROTOR, MavAutopilot::MAV_AUTOPILOT_PX4, base_mode)
}

fn local_position() -> MavMessage {
    MavMessage::LOCAL_POSITION_NED(LOCAL_POSITION_NED_DATA {
        time_boot_ms: 1000,
        x: 1.5,
        y: -2.0,
        z: -5.0,
        vx: 0.5,
        vy: 0.0,
        vz: -0.25,
    })
}

fn events(update: Option<TelemetryUpdate>) -> &'static [TelemetryEvent] {
    update.expect("accepted message").events
}

#[test]
fn heartbeat_updates_armed_and_guided_flags() {
    let mut telemetry = VehicleTelemetry::default();

    let update = apply_message(&mut telemetry, VEHICLE_SYSTEM_ID, &vehicle(), heartbeat(armed_guided()));
    assert_eq!(events(update), &[TelemetryEvent::State]);
    assert!(telemetry.armed);
    assert!(telemetry.guided);

    let update = apply_message(
        &mut telemetry,
        VEHICLE_SYSTEM_ID,
        &vehicle(),
        heartbeat(MavModeFlag::empty()),
    );
    assert_eq!(update.map(|update| update.message), Some("HEARTBEAT"));
    assert!(!telemetry.armed);
    assert!(!telemetry.guided);
}

#[test]
fn ground_station_heartbeat_leaves_the_vehicle_flags_alone() {
    let mut telemetry = VehicleTelemetry::default();
    apply_message(&mut telemetry, VEHICLE_SYSTEM_ID, &vehicle(), heartbeat(armed_guided()));

    // Another ground station on the link, reporting an empty mode.
    let update = apply_message(
        &mut telemetry,
        VEHICLE_SYSTEM_ID,
        &from_system(255),
        heartbeat_of(
            MavType::MAV_TYPE_GCS,
            MavAutopilot::MAV_AUTOPILOT_INVALID,
            MavModeFlag::empty(),
        ),
    );
    assert_eq!(update, None);
    assert!(telemetry.armed);
    assert!(telemetry.guided);

    // A companion computer sharing the vehicle's system id.
    let update = apply_message(
        &mut telemetry,
        VEHICLE_SYSTEM_ID,
        &vehicle(),
        heartbeat_of(
            MavType::MAV_TYPE_ONBOARD_CONTROLLER,
            MavAutopilot::MAV_AUTOPILOT_INVALID,
            MavModeFlag::empty(),
        ),
    );
    assert_eq!(update, None);
    assert!(telemetry.armed);

    // The disarm guard still sees an armed vehicle.
    let thresholds = GuardThresholds::default();
    let target = Waypoint::default();
    let inputs = GuardInputs {
        telemetry: &telemetry,
        mission_active: true,
        target: &target,
        queued_waypoints: 0,
        thresholds: &thresholds,
    };
    assert_eq!(
        transition(MissionState::Disarming, TelemetryEvent::State, &inputs),
        None
    );
}

#[test]
fn messages_from_other_systems_are_ignored() {
    let mut telemetry = VehicleTelemetry::default();
    let update = apply_message(&mut telemetry, VEHICLE_SYSTEM_ID, &from_system(2), local_position());
    assert_eq!(update, None);
    assert_eq!(telemetry, VehicleTelemetry::default());
}

#[test]
fn local_position_raises_position_then_velocity() {
    let mut telemetry = VehicleTelemetry::default();
    let update = apply_message(&mut telemetry, VEHICLE_SYSTEM_ID, &vehicle(), local_position());

    assert_eq!(
        events(update),
        &[TelemetryEvent::Position, TelemetryEvent::Velocity]
    );
    assert_eq!(telemetry.local_position.north, 1.5);
    assert_eq!(telemetry.local_position.east, -2.0);
    assert_eq!(telemetry.altitude(), 5.0);
    assert_eq!(telemetry.local_velocity, [0.5, 0.0, -0.25]);
}

#[test]
fn global_position_refreshes_the_snapshot_without_an_event() {
    let mut telemetry = VehicleTelemetry::default();
    let update = apply_message(
        &mut telemetry,
        VEHICLE_SYSTEM_ID,
        &vehicle(),
        MavMessage::GLOBAL_POSITION_INT(GLOBAL_POSITION_INT_DATA {
            time_boot_ms: 1000,
            lat: 377_900_000,
            lon: -1_224_000_000,
            alt: 12_500,
            relative_alt: 0,
            vx: 0,
            vy: 0,
            vz: 0,
            hdg: 0,
        }),
    );

    assert!(events(update).is_empty());
    assert!((telemetry.global_position.latitude - 37.79).abs() < 1e-9);
    assert!((telemetry.global_position.longitude + 122.4).abs() < 1e-9);
    assert_eq!(telemetry.global_position.altitude, 12.5);
}

#[test]
fn set_home_keeps_centimetre_precision() {
    assert_eq!(degrees_e7(37.7924801), 377_924_801);
    assert_eq!(degrees_e7(-122.3974501), -1_223_974_501);

    match set_home_message(1, 1, -122.3974501, 37.7924801, 0.0) {
        MavMessage::COMMAND_INT(command) => {
            assert_eq!(command.command, MavCmd::MAV_CMD_DO_SET_HOME);
            assert_eq!(command.frame, MavFrame::MAV_FRAME_GLOBAL);
            assert_eq!(command.param1, 0.0);
            assert_eq!(command.x, 377_924_801);
            assert_eq!(command.y, -1_223_974_501);
            assert_eq!(command.z, 0.0);
            assert_eq!((command.target_system, command.target_component), (1, 1));
        }
        other => panic!("expected COMMAND_INT, got {other:?}"),
    }
}

#[test]
fn nav_log_records_one_row_per_update() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Logs/NavLog.csv");

    let mut log = NavLog::create(&path).expect("create log");
    let mut telemetry = VehicleTelemetry::default();
    apply_message(&mut telemetry, VEHICLE_SYSTEM_ID, &vehicle(), heartbeat(armed_guided()));
    log.record("HEARTBEAT", &telemetry).expect("record");
    apply_message(&mut telemetry, VEHICLE_SYSTEM_ID, &vehicle(), local_position());
    log.record("LOCAL_POSITION_NED", &telemetry).expect("record");
    assert_eq!(log.rows(), 2);
    assert_eq!(log.finish().expect("finish"), 2);

    let contents = fs::read_to_string(&path).expect("log file");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "time,message,north,east,down,velocity_north,velocity_east,velocity_down,\
         longitude,latitude,altitude,armed,guided"
    );
    let row: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(row[1], "LOCAL_POSITION_NED");
    assert_eq!(&row[2..5], ["1.5", "-2.0", "-5.0"]);
    assert_eq!(&row[11..], ["true", "true"]);
}
