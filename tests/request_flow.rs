use serde_json::{Value, json};
use transit_router::{AppError, make_base, process_requests, read_document};

fn document(base_file: &str) -> Value {
    json!({
        "serialization_settings": { "file": base_file },
        "routing_settings": { "bus_wait_time": 6, "bus_velocity": 40 },
        "base_requests": [
            { "type": "Bus", "name": "297", "stops": ["Biryulyovo Zapadnoye", "Biryulyovo Tovarnaya", "Universam", "Biryulyovo Zapadnoye"], "is_roundtrip": true },
            { "type": "Bus", "name": "635", "stops": ["Biryulyovo Tovarnaya", "Universam", "Prazhskaya"], "is_roundtrip": false },
            { "type": "Stop", "name": "Biryulyovo Tovarnaya", "latitude": 55.592028, "longitude": 37.653656,
              "road_distances": { "Universam": 890 } },
            { "type": "Stop", "name": "Biryulyovo Zapadnoye", "latitude": 55.574371, "longitude": 37.6517,
              "road_distances": { "Biryulyovo Tovarnaya": 2600 } },
            { "type": "Stop", "name": "Prazhskaya", "latitude": 55.611717, "longitude": 37.603938,
              "road_distances": { "Universam": 4650 } },
            { "type": "Stop", "name": "Universam", "latitude": 55.587655, "longitude": 37.645687,
              "road_distances": { "Biryulyovo Tovarnaya": 1380, "Biryulyovo Zapadnoye": 2500, "Prazhskaya": 4650 } },
            { "type": "Stop", "name": "Lonely", "latitude": 55.5, "longitude": 37.5 }
        ],
        "stat_requests": [
            { "id": 1, "type": "Bus", "name": "297" },
            { "id": 2, "type": "Bus", "name": "635" },
            { "id": 3, "type": "Stop", "name": "Universam" },
            { "id": 4, "type": "Route", "from": "Biryulyovo Zapadnoye", "to": "Universam" },
            { "id": 5, "type": "Route", "from": "Biryulyovo Zapadnoye", "to": "Prazhskaya" },
            { "id": 6, "type": "Route", "from": "Universam", "to": "Lonely" },
            { "id": 7, "type": "Route", "from": "Universam", "to": "Atlantis" },
            { "id": 8, "type": "Bus", "name": "751" },
            { "id": 9, "type": "Map" }
        ]
    })
}

fn run(document: &Value) -> Vec<Value> {
    let document = read_document(document.to_string().as_bytes()).unwrap();
    make_base(&document).unwrap();

    let mut output = Vec::new();
    process_requests(&document, &mut output, false).unwrap();
    serde_json::from_slice(&output).unwrap()
}

fn close(value: &Value, expected: f64) -> bool {
    (value.as_f64().unwrap() - expected).abs() < 1e-6
}

#[test]
fn base_file_answers_stat_requests() {
    let dir = tempfile::tempdir().unwrap();
    let base_file = dir.path().join("transport.db");
    let responses = run(&document(base_file.to_str().unwrap()));

    assert!(base_file.exists());
    assert_eq!(responses.len(), 9);
    for (index, response) in responses.iter().enumerate() {
        assert_eq!(response["request_id"], index as i64 + 1);
    }

    let bus_297 = &responses[0];
    assert_eq!(bus_297["stop_count"], 4);
    assert_eq!(bus_297["unique_stop_count"], 3);
    assert!(close(&bus_297["route_length"], 2600.0 + 890.0 + 2500.0));
    assert!(bus_297["curvature"].as_f64().unwrap() > 1.0);

    let bus_635 = &responses[1];
    assert_eq!(bus_635["stop_count"], 5);
    assert_eq!(bus_635["unique_stop_count"], 3);
    assert!(close(&bus_635["route_length"], 890.0 + 4650.0 + 4650.0 + 1380.0));

    assert_eq!(responses[2]["buses"], json!(["297", "635"]));

    // wait 6 minutes, then ride 297 for two stops at 40 km/h
    let metres_per_minute = 40.0 * 1000.0 / 60.0;
    let direct = &responses[3];
    assert!(close(
        &direct["total_time"],
        6.0 + (2600.0 + 890.0) / metres_per_minute
    ));
    assert_eq!(
        direct["items"][0],
        json!({ "type": "Wait", "stop_name": "Biryulyovo Zapadnoye", "time": 6.0 })
    );
    assert_eq!(direct["items"][1]["type"], "Bus");
    assert_eq!(direct["items"][1]["bus"], "297");
    assert_eq!(direct["items"][1]["span_count"], 2);

    let transfer = &responses[4];
    let buses: Vec<&str> = transfer["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["type"] == "Bus")
        .map(|item| item["bus"].as_str().unwrap())
        .collect();
    assert_eq!(buses, vec!["297", "635"]);
    let legs: f64 = transfer["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["time"].as_f64().unwrap())
        .sum();
    assert!(close(&transfer["total_time"], legs));

    assert_eq!(responses[5]["error_message"], "not found");
    assert_eq!(responses[6]["error_message"], "unknown stop");
    assert_eq!(responses[7]["error_message"], "not found");
    assert_eq!(responses[8]["error_message"], "unsupported request");
}

#[test]
fn pretty_output_holds_the_same_responses() {
    let dir = tempfile::tempdir().unwrap();
    let base_file = dir.path().join("transport.db");
    let value = document(base_file.to_str().unwrap());
    let document = read_document(value.to_string().as_bytes()).unwrap();
    make_base(&document).unwrap();

    let mut compact = Vec::new();
    process_requests(&document, &mut compact, false).unwrap();
    let mut pretty = Vec::new();
    process_requests(&document, &mut pretty, true).unwrap();

    assert!(pretty.len() > compact.len());
    assert_eq!(
        serde_json::from_slice::<Value>(&compact).unwrap(),
        serde_json::from_slice::<Value>(&pretty).unwrap()
    );
}

#[test]
fn invalid_settings_leave_no_base_file() {
    let dir = tempfile::tempdir().unwrap();
    let base_file = dir.path().join("transport.db");
    let mut value = document(base_file.to_str().unwrap());
    value["routing_settings"]["bus_velocity"] = json!(0);

    let document = read_document(value.to_string().as_bytes()).unwrap();
    assert!(matches!(
        make_base(&document),
        Err(AppError::Core(transit_router_core::Error::InvalidSettings(_)))
    ));
    assert!(!base_file.exists());
}

#[test]
fn missing_sections_are_reported() {
    let document = read_document(r#"{ "routing_settings": { "bus_wait_time": 1, "bus_velocity": 1 } }"#.as_bytes()).unwrap();
    assert!(matches!(
        make_base(&document),
        Err(AppError::MissingSection("serialization_settings"))
    ));

    let document = read_document(r#"{ "serialization_settings": { "file": "unused.db" } }"#.as_bytes()).unwrap();
    assert!(matches!(
        make_base(&document),
        Err(AppError::MissingSection("routing_settings"))
    ));
}

#[test]
fn processing_without_a_base_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let base_file = dir.path().join("missing.db");
    let document = read_document(document(base_file.to_str().unwrap()).to_string().as_bytes()).unwrap();

    let mut output = Vec::new();
    assert!(process_requests(&document, &mut output, false).is_err());
    assert!(output.is_empty());
}
