//! Power sequencing against a recording fake panel.
//!
//! Run with: cargo test -p epd-g2 --test power

mod common;

use common::{Event, events, setup};
use epd_g2::{Builder, Config, Error, ErrorCode, PanelKind, PowerState};

fn config() -> Config {
    Config::for_panel(PanelKind::Epd144).unwrap()
}

fn count(events: &[Event], wanted: &Event) -> usize {
    events.iter().filter(|e| *e == wanted).count()
}

fn cmd(index: u8, value: u8) -> Event {
    Event::Command { index, value }
}

#[test]
fn power_up_follows_the_documented_sequence() {
    let (mut display, mut delay, log) = setup(config(), |_| {});

    display.power_up(&mut delay).unwrap();

    let expected = vec![
        // Bus reset
        Event::Reset(false),
        Event::Power(false),
        Event::Discharge(false),
        Event::ChipSelect(false),
        Event::Delay(6),
        // Supply ramp
        Event::Power(true),
        Event::Delay(11),
        // Reset pulse
        Event::Reset(true),
        Event::ChipSelect(true),
        Event::Delay(6),
        Event::Reset(false),
        Event::Delay(6),
        Event::Reset(true),
        Event::Delay(6),
        // BUSY already clear
        Event::Delay(6),
        // Handshake
        Event::Raw(vec![0x71, 0x00]),
        // Register init
        cmd(0x02, 0x40),
        Event::Read { index: 0x0F },
        cmd(0x0B, 0x02),
        Event::Data {
            index: 0x01,
            payload: vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x0F, 0xFF, 0x00],
        },
        cmd(0x07, 0xD1),
        cmd(0x08, 0x02),
        cmd(0x09, 0xC2),
        cmd(0x04, 0x03),
        cmd(0x03, 0x01),
        cmd(0x03, 0x00),
        Event::Delay(6),
        // Charge pump, first attempt succeeds
        cmd(0x05, 0x01),
        Event::Delay(155),
        cmd(0x05, 0x03),
        Event::Delay(95),
        cmd(0x05, 0x0F),
        Event::Delay(45),
        Event::Read { index: 0x0F },
        cmd(0x02, 0x06),
        Event::Ready,
    ];
    assert_eq!(events(&log), expected);
    assert_eq!(display.state(), PowerState::Ready);
}

#[test]
fn charge_pump_retries_until_ready() {
    let (mut display, mut delay, log) = setup(config(), |panel| {
        panel.status = [0x80, 0x00, 0x40].into();
    });

    display.power_up(&mut delay).unwrap();

    let events = events(&log);
    assert_eq!(count(&events, &cmd(0x05, 0x01)), 2);
    assert_eq!(count(&events, &cmd(0x02, 0x06)), 1);
    assert_eq!(count(&events, &Event::Ready), 1);
    assert!(!events.iter().any(|e| matches!(e, Event::Error(_))));
    assert_eq!(events.last(), Some(&Event::Ready));
}

#[test]
fn wrong_handshake_reports_no_device() {
    let (mut display, mut delay, log) = setup(config(), |panel| panel.probe = 0x00);

    let result = display.power_up(&mut delay);

    assert!(matches!(result, Err(Error::NoDevice { probe: 0x00 })));
    let events = events(&log);
    assert_eq!(count(&events, &Event::Error(ErrorCode::NoDevice)), 1);
    assert!(!events.iter().any(|e| matches!(
        e,
        Event::Command { .. } | Event::Data { .. } | Event::Read { .. } | Event::Ready
    )));
    assert_eq!(display.state(), PowerState::Failed);
}

#[test]
fn faulty_status_reports_unknown_fault() {
    let (mut display, mut delay, log) = setup(config(), |panel| {
        panel.status = [0x00].into();
    });

    let result = display.power_up(&mut delay);

    assert!(matches!(result, Err(Error::UnknownFault { status: 0x00 })));
    let events = events(&log);
    assert_eq!(events.last(), Some(&Event::Error(ErrorCode::UnknownFault)));
    assert_eq!(count(&events, &cmd(0x0B, 0x02)), 0);
    assert_eq!(count(&events, &Event::Ready), 0);
}

#[test]
fn charge_pump_gives_up_after_four_attempts() {
    let (mut display, mut delay, log) = setup(config(), |panel| {
        panel.status = [0x80].into();
        panel.idle_status = 0x80;
    });

    let result = display.power_up(&mut delay);

    assert!(matches!(
        result,
        Err(Error::ChargePumpTimeout { attempts: 4 })
    ));
    let events = events(&log);
    assert_eq!(count(&events, &cmd(0x05, 0x01)), 4);
    assert_eq!(count(&events, &cmd(0x05, 0x0F)), 4);
    assert_eq!(count(&events, &cmd(0x02, 0x06)), 0);
    assert_eq!(count(&events, &Event::Ready), 0);
    assert_eq!(
        events.last(),
        Some(&Event::Error(ErrorCode::ChargePumpTimeout))
    );
    assert_eq!(display.state(), PowerState::Failed);
}

#[test]
fn busy_is_polled_until_clear() {
    let (mut display, mut delay, log) = setup(config(), |panel| panel.busy_polls = 3);

    display.power_up(&mut delay).unwrap();

    let events = events(&log);
    let probe = events
        .iter()
        .position(|e| matches!(e, Event::Raw(_)))
        .unwrap();
    // Three polls, then the probe settle time
    assert_eq!(
        &events[probe - 4..probe],
        &[
            Event::Delay(10),
            Event::Delay(10),
            Event::Delay(10),
            Event::Delay(6)
        ]
    );
}

#[test]
fn stuck_busy_times_out() {
    let config = Builder::new(PanelKind::Epd144)
        .busy_poll_interval_ms(10)
        .busy_timeout_ms(50)
        .build()
        .unwrap();
    let (mut display, mut delay, log) = setup(config, |panel| panel.stuck_busy = true);

    let result = display.power_up(&mut delay);

    assert!(matches!(result, Err(Error::BusyTimeout { waited_ms: 50 })));
    let events = events(&log);
    assert_eq!(count(&events, &Event::Delay(10)), 5);
    assert!(!events.iter().any(|e| matches!(e, Event::Raw(_))));
    assert_eq!(events.last(), Some(&Event::Error(ErrorCode::BusyTimeout)));
}

#[test]
fn bus_failure_is_returned_without_observer_code() {
    let (mut display, mut delay, log) = setup(config(), |panel| panel.fail_write = Some(0));

    let result = display.power_up(&mut delay);

    assert!(matches!(result, Err(Error::Interface(_))));
    assert!(!events(&log).iter().any(|e| matches!(e, Event::Error(_))));
    assert_eq!(display.state(), PowerState::Failed);
}

#[test]
fn power_off_blanks_shuts_down_and_discharges() {
    let (mut display, mut delay, log) = setup(config(), |_| {});

    display.power_off(&mut delay).unwrap();

    let mut nothing = vec![0u8; 73];
    nothing[16..40].fill(0xFF);
    let mut border = vec![0u8; 73];
    border[72] = 0xAA;

    let expected = vec![
        Event::Data {
            index: 0x0A,
            payload: nothing,
        },
        cmd(0x02, 0x07),
        Event::Data {
            index: 0x0A,
            payload: border,
        },
        cmd(0x02, 0x07),
        Event::Delay(200),
        cmd(0x0B, 0x00),
        cmd(0x03, 0x01),
        cmd(0x05, 0x03),
        cmd(0x05, 0x01),
        cmd(0x04, 0x80),
        cmd(0x05, 0x00),
        cmd(0x07, 0x01),
        Event::Delay(55),
        Event::Power(false),
        Event::Reset(false),
        Event::ChipSelect(false),
        Event::Discharge(true),
        Event::Delay(150),
        Event::Discharge(false),
    ];
    assert_eq!(events(&log), expected);
    assert_eq!(display.state(), PowerState::Off);
}

#[test]
fn power_off_recovers_a_failed_panel() {
    let (mut display, mut delay, _log) = setup(config(), |panel| panel.probe = 0xFF);

    assert!(display.power_up(&mut delay).is_err());
    assert_eq!(display.state(), PowerState::Failed);

    display.power_off(&mut delay).unwrap();
    assert_eq!(display.state(), PowerState::Off);
}
