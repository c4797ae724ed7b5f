//! End-to-end scenarios for the event core: intrinsic and algorithmic
//! reporting driven through property writes, with notifications observed
//! through a channel sink.

use bacev_engine::prelude::*;
use crossbeam_channel::Receiver;
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine_with_channel() -> (Rc<EventEngine>, Receiver<Notification>) {
    let (sink, rx) = ChannelSink::bounded(64);
    (EventEngine::new(Box::new(sink)), rx)
}

/// An analog input configured for intrinsic out-of-range reporting:
/// limits 0..100, deadband 5, both directions enabled.
fn analog_input(instance: u32) -> Rc<Object> {
    let obj = Object::new(
        ObjectId::new(ObjectType::AnalogInput, instance),
        format!("ai-{instance}"),
    );
    obj.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    obj.set(
        PropertyIdentifier::StatusFlags,
        Value::StatusFlags(StatusFlags::default()),
    );
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    obj.set(PropertyIdentifier::EventDetectionEnable, Value::Boolean(true));
    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    obj.set(
        PropertyIdentifier::EventTimeStamps,
        Value::Array(vec![Value::TimeStamp(TimeStamp::UNSPECIFIED); 3]),
    );
    obj.set(
        PropertyIdentifier::EventMessageTexts,
        Value::Array(vec![Value::CharacterString(String::new()); 3]),
    );
    obj.set(
        PropertyIdentifier::AckedTransitions,
        Value::TransitionBits(EventTransitionBits::ALL),
    );
    obj.set(PropertyIdentifier::LowLimit, Value::Real(0.0));
    obj.set(PropertyIdentifier::HighLimit, Value::Real(100.0));
    obj.set(PropertyIdentifier::Deadband, Value::Real(5.0));
    obj.set(
        PropertyIdentifier::LimitEnable,
        Value::LimitEnable(LimitEnable::default()),
    );
    obj.set(PropertyIdentifier::TimeDelay, Value::Unsigned(0));
    obj.set(PropertyIdentifier::TimeDelayNormal, Value::Unsigned(0));
    obj
}

fn event_state(obj: &Object) -> EventState {
    match obj.get(PropertyIdentifier::EventState) {
        Some(Value::EventState(state)) => state,
        other => panic!("unexpected eventState: {other:?}"),
    }
}

fn stamp(obj: &Object, index: usize) -> TimeStamp {
    match obj.get(PropertyIdentifier::EventTimeStamps) {
        Some(Value::Array(stamps)) => match stamps.get(index) {
            Some(Value::TimeStamp(ts)) => *ts,
            other => panic!("unexpected timestamp slot: {other:?}"),
        },
        other => panic!("unexpected eventTimeStamps: {other:?}"),
    }
}

#[test]
fn s1_out_of_range_rising() -> anyhow::Result<()> {
    init_tracing();
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(1);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    engine.run_until_settled();
    assert!(rx.try_recv().is_err(), "in-range value must not notify");

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();

    assert_eq!(event_state(&obj), EventState::HighLimit);
    assert!(!stamp(&obj, 0).is_unspecified());
    assert!(stamp(&obj, 2).is_unspecified());

    let notification = rx.try_recv()?;
    assert_eq!(notification.new_state, EventState::HighLimit);
    assert_eq!(notification.group, EventStateGroup::OffNormal);
    assert_eq!(
        notification.parameters,
        NotificationParameters::OutOfRange {
            exceeding_value: 101.0,
            status_flags: StatusFlags::default(),
            deadband: 5.0,
            exceeded_limit: 100.0,
        }
    );
    Ok(())
}

#[test]
fn s2_hysteresis_on_the_way_back() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(2);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    rx.try_recv()?;

    // 96 is still inside the deadband (100 - 5)
    obj.set(PropertyIdentifier::PresentValue, Value::Real(96.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::HighLimit);
    assert!(rx.try_recv().is_err());

    obj.set(PropertyIdentifier::PresentValue, Value::Real(94.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(!stamp(&obj, 2).is_unspecified());
    assert_eq!(rx.try_recv()?.new_state, EventState::Normal);
    Ok(())
}

#[test]
fn s3_fault_dominates_and_clears_through_normal() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(3);
    PropertyReliability::attach(&obj);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    assert_eq!(rx.try_recv()?.new_state, EventState::HighLimit);

    obj.set(
        PropertyIdentifier::Reliability,
        Value::Reliability(Reliability::OverRange),
    );
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Fault);
    assert!(!stamp(&obj, 1).is_unspecified());
    let notification = rx.try_recv()?;
    assert_eq!(notification.group, EventStateGroup::Fault);
    assert_eq!(
        notification.parameters,
        NotificationParameters::ChangeOfReliability {
            reliability: Reliability::OverRange,
            status_flags: StatusFlags::default(),
        }
    );

    // while faulted, the event algorithm must stay quiet
    obj.set(PropertyIdentifier::PresentValue, Value::Real(102.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Fault);
    assert!(rx.try_recv().is_err());

    obj.set(
        PropertyIdentifier::Reliability,
        Value::Reliability(Reliability::NoFaultDetected),
    );
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert_eq!(rx.try_recv()?.new_state, EventState::Normal);
    Ok(())
}

#[test]
fn fault_restamps_on_reliability_change_and_reannounce() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(4);
    PropertyReliability::attach(&obj);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(
        PropertyIdentifier::Reliability,
        Value::Reliability(Reliability::OpenLoop),
    );
    engine.run_until_settled();
    assert_eq!(rx.try_recv()?.group, EventStateGroup::Fault);
    let first = stamp(&obj, 1);

    // a different fault re-stamps
    obj.set(
        PropertyIdentifier::Reliability,
        Value::Reliability(Reliability::ShortedLoop),
    );
    engine.run_until_settled();
    assert_eq!(rx.try_recv()?.group, EventStateGroup::Fault);
    assert!(stamp(&obj, 1) >= first);

    // re-announcing the same fault re-stamps as well
    obj.set(
        PropertyIdentifier::Reliability,
        Value::Reliability(Reliability::ShortedLoop),
    );
    engine.run_until_settled();
    assert_eq!(rx.try_recv()?.group, EventStateGroup::Fault);
    Ok(())
}

#[test]
fn s4_change_of_state_tags_the_discrete_kind() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = Object::new(ObjectId::new(ObjectType::MultiStateInput, 5), "msi-5");
    obj.set(PropertyIdentifier::PresentValue, Value::Unsigned(1));
    obj.set(
        PropertyIdentifier::StatusFlags,
        Value::StatusFlags(StatusFlags::default()),
    );
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    obj.set(
        PropertyIdentifier::AlarmValues,
        Value::Array(vec![Value::Unsigned(2), Value::Unsigned(3)]),
    );
    EventAlgorithm::attach(&engine, &store, EventType::ChangeOfState, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Unsigned(1));
    engine.run_until_settled();
    assert!(rx.try_recv().is_err());

    obj.set(PropertyIdentifier::PresentValue, Value::Unsigned(3));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::OffNormal);
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::ChangeOfState {
            new_state: PropertyStates::Unsigned(3),
            status_flags: StatusFlags::default(),
        }
    );

    obj.set(PropertyIdentifier::PresentValue, Value::Unsigned(1));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    Ok(())
}

#[test]
fn s5_inhibit_suppresses_until_released() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(6);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(true));
    engine.run_until_settled();

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(stamp(&obj, 0).is_unspecified());
    assert!(rx.try_recv().is_err());

    // releasing the inhibit while the value still exceeds the limit commits
    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::HighLimit);
    assert_eq!(rx.try_recv()?.new_state, EventState::HighLimit);
    Ok(())
}

#[test]
fn raising_inhibit_forces_offnormal_back_to_normal() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(7);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    assert_eq!(rx.try_recv()?.new_state, EventState::HighLimit);

    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(true));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert_eq!(rx.try_recv()?.new_state, EventState::Normal);
    Ok(())
}

#[test]
fn s6_burst_of_changes_coalesces_into_one_evaluation() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(8);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::LowLimit, Value::Real(10.0));
    obj.set(PropertyIdentifier::HighLimit, Value::Real(20.0));
    obj.set(PropertyIdentifier::PresentValue, Value::Real(25.0));
    let evaluations = engine.run_until_settled();

    assert_eq!(evaluations, 1, "changes within one quantum must coalesce");
    assert_eq!(event_state(&obj), EventState::HighLimit);
    assert_eq!(rx.try_recv()?.new_state, EventState::HighLimit);
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[test]
fn reannouncing_the_same_value_is_idempotent() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(9);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    let first = rx.try_recv()?;
    let first_stamp = stamp(&obj, 0);

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    assert!(rx.try_recv().is_err(), "re-announce must not re-notify");
    assert_eq!(stamp(&obj, 0), first_stamp);
    assert_eq!(first.new_state, EventState::HighLimit);
    Ok(())
}

#[test]
fn timestamps_are_monotonic_per_group() -> anyhow::Result<()> {
    let (engine, _rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(10);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    let first_offnormal = stamp(&obj, 0);

    obj.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    engine.run_until_settled();
    obj.set(PropertyIdentifier::PresentValue, Value::Real(102.0));
    engine.run_until_settled();

    assert_eq!(event_state(&obj), EventState::HighLimit);
    assert!(stamp(&obj, 0) >= first_offnormal);
    Ok(())
}

#[test]
fn nan_takes_no_transition() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(11);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(f32::NAN));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(rx.try_recv().is_err());

    // the next valid sample recovers evaluation
    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::HighLimit);
    Ok(())
}

#[test]
fn message_text_template_substitutes_parameters() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(12);
    obj.set(
        PropertyIdentifier::EventMessageTextsConfig,
        Value::Array(vec![
            Value::CharacterString("{event_state}: {exceeding_value} over {exceeded_limit}".into()),
            Value::CharacterString(String::new()),
            Value::CharacterString(String::new()),
        ]),
    );
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();

    let notification = rx.try_recv()?;
    assert_eq!(
        notification.message.as_deref(),
        Some("high-limit: 101.0 over 100.0")
    );

    // the default text applies where no template is configured
    obj.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    engine.run_until_settled();
    let back = rx.try_recv()?;
    let message = back.message.expect("message text expected");
    assert!(message.starts_with("normal at "), "got {message:?}");
    Ok(())
}

#[test]
fn algorithmic_reporting_writes_the_enrollment_object() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();

    let monitored = Object::new(ObjectId::new(ObjectType::AnalogValue, 13), "av-13");
    monitored.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    monitored.set(
        PropertyIdentifier::StatusFlags,
        Value::StatusFlags(StatusFlags::default()),
    );
    store.insert(monitored.clone());

    let enrollment_object = Object::new(ObjectId::new(ObjectType::EventEnrollment, 1), "ee-1");
    enrollment_object.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    enrollment_object.set(PropertyIdentifier::EventDetectionEnable, Value::Boolean(true));
    enrollment_object.set(
        PropertyIdentifier::EventTimeStamps,
        Value::Array(vec![Value::TimeStamp(TimeStamp::UNSPECIFIED); 3]),
    );
    store.insert(enrollment_object.clone());

    let enrollment = EventEnrollment::new(
        enrollment_object.clone(),
        PropertyReference::new(monitored.id(), PropertyIdentifier::PresentValue),
        EventParameters::OutOfRange {
            time_delay: 0,
            low_limit: 0.0,
            high_limit: 100.0,
            deadband: 5.0,
        },
    )?;
    EventAlgorithm::attach(
        &engine,
        &store,
        EventType::OutOfRange,
        Some(&enrollment),
        &monitored,
    )?;

    monitored.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();

    // the enrollment is the initiating object; the monitored point is
    // untouched
    assert_eq!(event_state(&enrollment_object), EventState::HighLimit);
    assert!(monitored.get(PropertyIdentifier::EventState).is_none());
    assert!(!stamp(&enrollment_object, 0).is_unspecified());
    let notification = rx.try_recv()?;
    assert_eq!(notification.initiating_object, enrollment_object.id());
    Ok(())
}

#[test]
fn command_failure_watches_the_feedback() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = Object::new(ObjectId::new(ObjectType::BinaryOutput, 14), "bo-14");
    obj.set(PropertyIdentifier::PresentValue, Value::Boolean(false));
    obj.set(PropertyIdentifier::FeedbackValue, Value::Boolean(false));
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    EventAlgorithm::attach(&engine, &store, EventType::CommandFailure, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Boolean(true));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::OffNormal);
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::CommandFailure {
            command_value: Value::Boolean(true),
            status_flags: StatusFlags::default(),
            feedback_value: Value::Boolean(false),
        }
    );

    obj.set(PropertyIdentifier::FeedbackValue, Value::Boolean(true));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    Ok(())
}

#[test]
fn buffer_ready_counts_records_modularly() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = Object::new(ObjectId::new(ObjectType::TrendLog, 15), "tl-15");
    obj.set(PropertyIdentifier::RecordCount, Value::Unsigned(0));
    obj.set(PropertyIdentifier::NotificationThreshold, Value::Unsigned(10));
    obj.set(PropertyIdentifier::RecordsSinceNotification, Value::Unsigned(0));
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    EventAlgorithm::attach(&engine, &store, EventType::BufferReady, None, &obj)?;

    obj.set(PropertyIdentifier::RecordCount, Value::Unsigned(10));
    engine.run_until_settled();
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::BufferReady {
            buffer_object: obj.id(),
            previous_notification: 0,
            current_notification: 10,
        }
    );

    // below the threshold again: back to normal, previous count advanced
    obj.set(PropertyIdentifier::RecordCount, Value::Unsigned(15));
    engine.run_until_settled();
    assert_eq!(rx.try_recv()?.new_state, EventState::Normal);

    obj.set(PropertyIdentifier::RecordCount, Value::Unsigned(20));
    engine.run_until_settled();
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::BufferReady {
            buffer_object: obj.id(),
            previous_notification: 10,
            current_notification: 20,
        }
    );
    Ok(())
}

#[test]
fn change_of_characterstring_substring_match() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = Object::new(ObjectId::new(ObjectType::CharacterstringValue, 16), "csv-16");
    obj.set(
        PropertyIdentifier::PresentValue,
        Value::CharacterString("pump ok".into()),
    );
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    obj.set(
        PropertyIdentifier::AlarmValues,
        Value::Array(vec![
            Value::CharacterString(String::new()),
            Value::CharacterString("FAIL".into()),
        ]),
    );
    EventAlgorithm::attach(
        &engine,
        &store,
        EventType::ChangeOfCharacterstring,
        None,
        &obj,
    )?;

    // case-sensitive: "fail" does not match "FAIL"
    obj.set(
        PropertyIdentifier::PresentValue,
        Value::CharacterString("pump fail".into()),
    );
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(rx.try_recv().is_err());

    obj.set(
        PropertyIdentifier::PresentValue,
        Value::CharacterString("pump FAILED".into()),
    );
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::OffNormal);
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::ChangeOfCharacterstring {
            changed_value: "pump FAILED".into(),
            status_flags: StatusFlags::default(),
            alarm_value: "FAIL".into(),
        }
    );
    Ok(())
}

#[test]
fn change_of_value_reports_per_increment() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();

    let monitored = Object::new(ObjectId::new(ObjectType::AnalogValue, 17), "av-17");
    monitored.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    store.insert(monitored.clone());

    let enrollment_object = Object::new(ObjectId::new(ObjectType::EventEnrollment, 2), "ee-2");
    enrollment_object.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    store.insert(enrollment_object.clone());

    let enrollment = EventEnrollment::new(
        enrollment_object.clone(),
        PropertyReference::new(monitored.id(), PropertyIdentifier::PresentValue),
        EventParameters::ChangeOfValue {
            time_delay: 0,
            cov_criteria: CovCriteria::ReferencedPropertyIncrement(5.0),
        },
    )?;
    EventAlgorithm::attach(
        &engine,
        &store,
        EventType::ChangeOfValue,
        Some(&enrollment),
        &monitored,
    )?;

    // below the increment since the last report (50.0)
    monitored.set(PropertyIdentifier::PresentValue, Value::Real(54.0));
    engine.run_until_settled();
    assert!(rx.try_recv().is_err());

    // cumulative change crosses the increment
    monitored.set(PropertyIdentifier::PresentValue, Value::Real(56.0));
    engine.run_until_settled();
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::ChangeOfValue {
            new_value: CovNewValue::ChangedValue(56.0),
            status_flags: StatusFlags::default(),
        }
    );
    assert_eq!(event_state(&enrollment_object), EventState::OffNormal);
    Ok(())
}

#[test]
fn floating_limit_follows_the_setpoint() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = Object::new(ObjectId::new(ObjectType::Loop, 18), "loop-18");
    obj.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    obj.set(PropertyIdentifier::Setpoint, Value::Real(50.0));
    obj.set(PropertyIdentifier::HighDiffLimit, Value::Real(10.0));
    obj.set(PropertyIdentifier::Deadband, Value::Real(2.0));
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    EventAlgorithm::attach(&engine, &store, EventType::FloatingLimit, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(61.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::HighLimit);
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::FloatingLimit {
            reference_value: 61.0,
            status_flags: StatusFlags::default(),
            setpoint_value: 50.0,
            error_limit: 60.0,
        }
    );

    // inside the deadband: no release yet
    obj.set(PropertyIdentifier::PresentValue, Value::Real(59.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::HighLimit);

    obj.set(PropertyIdentifier::PresentValue, Value::Real(57.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    Ok(())
}

#[test]
fn detection_disabled_resets_and_stays_inert() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(19);
    obj.set(PropertyIdentifier::EventDetectionEnable, Value::Boolean(false));
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::HighLimit),
    );

    let cell = EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;
    assert!(cell.is_detached());
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(stamp(&obj, 0).is_unspecified());

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    assert_eq!(engine.run_until_settled(), 0);
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[test]
fn inhibit_ref_cascades_into_the_configuration_object() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();

    let switch = Object::new(ObjectId::new(ObjectType::BinaryValue, 20), "bv-20");
    switch.set(PropertyIdentifier::PresentValue, Value::Boolean(false));
    store.insert(switch.clone());

    let obj = analog_input(21);
    obj.set(
        PropertyIdentifier::EventAlgorithmInhibitRef,
        Value::PropertyRef(PropertyReference::new(
            switch.id(),
            PropertyIdentifier::PresentValue,
        )),
    );
    store.insert(obj.clone());
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    switch.set(PropertyIdentifier::PresentValue, Value::Boolean(true));
    engine.run_until_settled();
    assert_eq!(
        obj.get(PropertyIdentifier::EventAlgorithmInhibit),
        Some(Value::Boolean(true))
    );

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(rx.try_recv().is_err());

    switch.set(PropertyIdentifier::PresentValue, Value::Boolean(false));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::HighLimit);
    assert_eq!(rx.try_recv()?.new_state, EventState::HighLimit);
    Ok(())
}

#[test]
fn inhibit_ref_without_inhibit_property_is_a_config_error() {
    let (engine, _rx) = engine_with_channel();
    let store = ObjectStore::new();

    let switch = Object::new(ObjectId::new(ObjectType::BinaryValue, 22), "bv-22");
    switch.set(PropertyIdentifier::PresentValue, Value::Boolean(false));
    store.insert(switch.clone());

    let obj = Object::new(ObjectId::new(ObjectType::AnalogInput, 23), "ai-23");
    obj.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    obj.set(PropertyIdentifier::LowLimit, Value::Real(0.0));
    obj.set(PropertyIdentifier::HighLimit, Value::Real(100.0));
    obj.set(
        PropertyIdentifier::EventAlgorithmInhibitRef,
        Value::PropertyRef(PropertyReference::new(
            switch.id(),
            PropertyIdentifier::PresentValue,
        )),
    );
    let err = EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)
        .expect_err("missing eventAlgorithmInhibit must be rejected");
    assert_eq!(err, ConfigError::InhibitRefWithoutInhibit);
}

#[test]
fn unsupported_event_types_are_rejected_at_construction() {
    let (engine, _rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(24);
    for event_type in [
        EventType::AccessEvent,
        EventType::ChangeOfTimer,
        EventType::ChangeOfLifeSafety,
    ] {
        let err = EventAlgorithm::attach(&engine, &store, event_type, None, &obj)
            .expect_err("unsupported event type must be rejected");
        assert_eq!(err, ConfigError::UnsupportedEventType(event_type));
    }
}

#[test]
fn buffer_ready_defers_the_baseline_while_inhibited() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = Object::new(ObjectId::new(ObjectType::TrendLog, 27), "tl-27");
    obj.set(PropertyIdentifier::RecordCount, Value::Unsigned(0));
    obj.set(PropertyIdentifier::NotificationThreshold, Value::Unsigned(10));
    obj.set(PropertyIdentifier::RecordsSinceNotification, Value::Unsigned(0));
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    EventAlgorithm::attach(&engine, &store, EventType::BufferReady, None, &obj)?;

    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(true));
    engine.run_until_settled();

    obj.set(PropertyIdentifier::RecordCount, Value::Unsigned(15));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(rx.try_recv().is_err());

    // the accumulation that qualified while suppressed must still be
    // reported once the inhibit is released, against the old baseline
    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::OffNormal);
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::BufferReady {
            buffer_object: obj.id(),
            previous_notification: 0,
            current_notification: 15,
        }
    );
    Ok(())
}

#[test]
fn change_of_value_defers_the_baseline_while_inhibited() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();

    let monitored = Object::new(ObjectId::new(ObjectType::AnalogValue, 28), "av-28");
    monitored.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    store.insert(monitored.clone());

    let enrollment_object = Object::new(ObjectId::new(ObjectType::EventEnrollment, 3), "ee-3");
    enrollment_object.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    enrollment_object.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    store.insert(enrollment_object.clone());

    let enrollment = EventEnrollment::new(
        enrollment_object.clone(),
        PropertyReference::new(monitored.id(), PropertyIdentifier::PresentValue),
        EventParameters::ChangeOfValue {
            time_delay: 0,
            cov_criteria: CovCriteria::ReferencedPropertyIncrement(5.0),
        },
    )?;
    EventAlgorithm::attach(
        &engine,
        &store,
        EventType::ChangeOfValue,
        Some(&enrollment),
        &monitored,
    )?;

    enrollment_object.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(true));
    engine.run_until_settled();

    monitored.set(PropertyIdentifier::PresentValue, Value::Real(60.0));
    engine.run_until_settled();
    assert_eq!(event_state(&enrollment_object), EventState::Normal);
    assert!(rx.try_recv().is_err());

    // the change that satisfied the increment under inhibit is still
    // pending against the last *reported* value, so release reports it
    enrollment_object.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    engine.run_until_settled();
    assert_eq!(event_state(&enrollment_object), EventState::OffNormal);
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::ChangeOfValue {
            new_value: CovNewValue::ChangedValue(60.0),
            status_flags: StatusFlags::default(),
        }
    );
    Ok(())
}

#[test]
fn change_of_discrete_value_defers_the_baseline_while_inhibited() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = Object::new(ObjectId::new(ObjectType::MultiStateValue, 29), "msv-29");
    obj.set(PropertyIdentifier::PresentValue, Value::Unsigned(1));
    obj.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    EventAlgorithm::attach(&engine, &store, EventType::ChangeOfDiscreteValue, None, &obj)?;

    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(true));
    engine.run_until_settled();

    obj.set(PropertyIdentifier::PresentValue, Value::Unsigned(2));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(rx.try_recv().is_err());

    obj.set(PropertyIdentifier::EventAlgorithmInhibit, Value::Boolean(false));
    engine.run_until_settled();
    assert_eq!(event_state(&obj), EventState::OffNormal);
    assert_eq!(
        rx.try_recv()?.parameters,
        NotificationParameters::ChangeOfDiscreteValue {
            new_value: Value::Unsigned(2),
            status_flags: StatusFlags::default(),
        }
    );
    Ok(())
}

#[test]
fn detach_cancels_monitors_and_pending_work() -> anyhow::Result<()> {
    let (engine, rx) = engine_with_channel();
    let store = ObjectStore::new();
    let obj = analog_input(25);
    let cell = EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;
    assert_eq!(engine.algorithm_count(), 1);

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.detach(&cell);
    assert_eq!(engine.run_until_settled(), 0);
    assert_eq!(engine.algorithm_count(), 0);
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[test]
fn full_channel_drops_delivery_but_commits_state() -> anyhow::Result<()> {
    let (sink, rx) = ChannelSink::bounded(1);
    let engine = EventEngine::new(Box::new(sink));
    let store = ObjectStore::new();
    let obj = analog_input(26);
    EventAlgorithm::attach(&engine, &store, EventType::OutOfRange, None, &obj)?;

    obj.set(PropertyIdentifier::PresentValue, Value::Real(101.0));
    engine.run_until_settled();
    obj.set(PropertyIdentifier::PresentValue, Value::Real(50.0));
    engine.run_until_settled();

    // only the first notification fit the channel, but both transitions
    // committed
    assert_eq!(event_state(&obj), EventState::Normal);
    assert!(!stamp(&obj, 2).is_unspecified());
    assert_eq!(rx.try_recv()?.new_state, EventState::HighLimit);
    assert!(rx.try_recv().is_err());
    Ok(())
}
