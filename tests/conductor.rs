use std::{cell::RefCell, rc::Rc};

use pretty_assertions::assert_eq;

use funkin_rs::prelude::*;

type EventLog = Rc<RefCell<Vec<(ConductorEvent, u32)>>>;

fn listen(conductor: &mut Conductor) -> EventLog {
    let log = EventLog::default();
    for event in [ConductorEvent::Step, ConductorEvent::Beat] {
        let sink = Rc::clone(&log);
        conductor.on(event, move |value| sink.borrow_mut().push((event, value)));
    }
    log
}

#[test]
fn beats_and_steps_follow_the_song_position() {
    let mut conductor = Conductor::new(100.0).unwrap();
    let log = listen(&mut conductor);

    for position in [0.0, 150.0, 300.0, 450.0, 600.0] {
        conductor.sync(position);
    }
    assert_eq!(
        *log.borrow(),
        vec![
            (ConductorEvent::Step, 1),
            (ConductorEvent::Step, 2),
            (ConductorEvent::Step, 3),
            (ConductorEvent::Step, 4),
            (ConductorEvent::Beat, 1),
        ]
    );

    // A jump reports only where it landed.
    log.borrow_mut().clear();
    conductor.sync(1250.0);
    assert_eq!(
        *log.borrow(),
        vec![(ConductorEvent::Step, 8), (ConductorEvent::Beat, 2)]
    );

    // Going back never repeats an event.
    log.borrow_mut().clear();
    conductor.sync(500.0);
    conductor.sync(1260.0);
    assert!(log.borrow().is_empty());
    assert_eq!(conductor.last_beat(), 2);
    assert_eq!(conductor.last_step(), 8);
}

#[test]
fn ticking_only_runs_while_playing() {
    let mut conductor = Conductor::new(100.0).unwrap();
    let log = listen(&mut conductor);

    conductor.tick(1000.0);
    assert_eq!(conductor.song_position(), 0.0);

    conductor.start();
    for _ in 0..40 {
        conductor.tick(15.0);
    }
    assert!((conductor.song_position() - 600.0).abs() < 1e-9);
    assert_eq!(conductor.last_step(), 4);
    assert_eq!(
        log.borrow()
            .iter()
            .filter(|(event, _)| *event == ConductorEvent::Beat)
            .count(),
        1
    );

    conductor.stop();
    conductor.tick(600.0);
    assert!((conductor.song_position() - 600.0).abs() < 1e-9);
}

#[test]
fn tempo_changes_keep_counters() {
    let mut conductor = Conductor::new(100.0).unwrap();
    conductor.sync(600.0);
    conductor.set_bpm(200.0).unwrap();
    assert!((conductor.crochet() - 300.0).abs() < 1e-9);
    assert_eq!(conductor.last_beat(), 1);

    let log = listen(&mut conductor);
    conductor.sync(675.0);
    assert_eq!(
        *log.borrow(),
        vec![(ConductorEvent::Step, 9), (ConductorEvent::Beat, 2)]
    );
    assert_eq!(
        conductor.set_bpm(-1.0),
        Err(ConductorError::InvalidBpm(-1.0))
    );
}

#[test]
fn unsubscribed_listeners_stay_quiet() {
    let mut conductor = Conductor::new(100.0).unwrap();
    let hits = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&hits);
    let id = conductor.on(ConductorEvent::Beat, move |_| *sink.borrow_mut() += 1);
    conductor.sync(600.0);
    assert!(conductor.off(id));
    assert!(!conductor.off(id));
    conductor.sync(1200.0);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(conductor.listener_count(), 0);
}
