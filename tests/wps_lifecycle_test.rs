use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use wps_commons::core::configuration::LOCAL_ALGORITHM_REPOSITORY;
use wps_commons::{Format, LifecycleState, Properties, Wps, WpsError};

fn script_properties() -> Properties {
    let mut properties = BTreeMap::new();
    properties.insert(
        "script".to_string(),
        vec!["buffer.R".to_string(), "clip.R".to_string()],
    );
    properties
}

#[test]
fn test_lifecycle_transitions() {
    let wps = Wps::detached("localhost", 8080).unwrap();
    assert!(wps.is_stopped());
    assert!(!wps.is_running());

    wps.start().unwrap();
    assert!(wps.is_running());
    assert!(wps.is_started());
    assert!(!wps.is_starting());
    assert!(!wps.is_stopping());
    assert!(!wps.is_failed());

    wps.stop().unwrap();
    assert!(wps.is_stopped());
    assert_eq!(wps.state(), LifecycleState::Stopped);
}

#[test]
fn test_mutation_while_running_is_illegal_state() {
    let wps = Wps::detached("localhost", 8080).unwrap();
    wps.start().unwrap();

    let attempts = [
        wps.add_algorithm("org.example.Buffer").err(),
        wps.add_algorithm_repository("org.example.Repo", None).err(),
        wps.add_parser("org.example.Parser", &[], None).err(),
        wps.add_generator("org.example.Generator", &[], None).err(),
        wps.set_max_pool_size(50).err(),
        wps.set_computation_timeout(1000).err(),
    ];
    for attempt in attempts {
        assert!(matches!(attempt, Some(WpsError::IllegalState { .. })));
    }

    assert!(matches!(wps.start(), Err(WpsError::IllegalState { .. })));
    assert!(wps.configuration().unwrap().parsers.is_empty());
}

#[test]
fn test_stop_when_not_running_is_illegal_state() {
    let wps = Wps::detached("localhost", 8080).unwrap();
    assert!(matches!(wps.stop(), Err(WpsError::IllegalState { .. })));

    wps.start().unwrap();
    wps.stop().unwrap();
    assert!(matches!(wps.stop(), Err(WpsError::IllegalState { .. })));
}

#[test]
fn test_reconfigure_after_stop() {
    let wps = Wps::detached("localhost", 8080).unwrap();
    wps.start().unwrap();
    wps.stop().unwrap();

    wps.add_algorithm("org.example.Buffer").unwrap();
    wps.start().unwrap();
    assert_eq!(wps.inspect_container(|c| c.start_count()), 2);
}

#[test]
fn test_registrations_end_up_in_the_document() {
    let wps = Wps::detached("localhost", 8080).unwrap();
    let formats = [
        Format::new("application/x-zipped-shp", "Base64", None),
        Format::new("text/xml", None, "http://schemas.opengis.net/gml/2.1.2/feature.xsd"),
    ];
    wps.add_algorithm("org.example.Buffer")
        .unwrap()
        .add_algorithm("org.example.Clip")
        .unwrap()
        .add_algorithm_repository("org.example.RRepository", Some(&script_properties()))
        .unwrap()
        .add_parser("org.example.ShapefileParser", &formats, None)
        .unwrap()
        .add_generator("org.example.GmlGenerator", &formats[1..], Some(&script_properties()))
        .unwrap()
        .set_min_pool_size(2)
        .unwrap()
        .set_include_data_inputs_in_response(true)
        .unwrap();

    let config = wps.configuration().unwrap();
    assert_eq!(config.algorithms(), vec!["org.example.Buffer", "org.example.Clip"]);
    assert_eq!(config.algorithm_repositories.len(), 2);
    assert_eq!(
        config.algorithm_repositories[0].class_name,
        LOCAL_ALGORITHM_REPOSITORY
    );
    assert_eq!(config.algorithm_repositories[1].properties.len(), 2);
    assert_eq!(config.server.min_pool_size, 2);
    assert!(config.server.include_data_inputs_in_response);

    let xml = wps.configuration_xml().unwrap();
    assert!(xml.contains(
        "<Parser name=\"parser0\" className=\"org.example.ShapefileParser\" active=\"true\">"
    ));
    assert!(xml.contains("<Format mimetype=\"application/x-zipped-shp\" encoding=\"Base64\"/>"));
    assert!(xml.contains(
        "<Generator name=\"generator0\" className=\"org.example.GmlGenerator\" active=\"true\">"
    ));
    assert!(xml.contains("<Property name=\"script\" active=\"true\">clip.R</Property>"));
    assert!(xml.contains("includeDataInputsInResponse=\"true\""));
}

#[test]
fn test_concurrent_registration_is_serialised() {
    let wps = Arc::new(Wps::detached("localhost", 8080).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let wps = Arc::clone(&wps);
            thread::spawn(move || {
                let class_name = format!("org.example.Parser{}", i);
                wps.add_parser(&class_name, &[Format::from("text/xml")], None)
                    .map(|_| ())
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let config = wps.configuration().unwrap();
    let mut names: Vec<String> = config.parsers.iter().map(|p| p.name.clone()).collect();
    names.sort();
    let mut expected: Vec<String> = (0..8).map(|i| format!("parser{}", i)).collect();
    expected.sort();
    assert_eq!(names, expected);
}

#[test]
fn test_host_with_path_or_userinfo_is_rejected() {
    for host in ["localhost/evil", "user@host"] {
        let err = Wps::detached(host, 8080).err();
        assert!(matches!(err, Some(WpsError::InvalidConfigValueError { .. })));
    }
}
