use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use melee::commands::Interpreter;
use melee::config::SchedulerConfig;
use melee::kernel::body::{ActorId, Body};
use melee::kernel::collaborators::{Brain, Collaborators, TurnContext};
use melee::kernel::roster::BodySpec;
use melee::kernel::scheduler::SchedulerError;
use melee::outputs::RecordingPresenter;
use melee::planner::{Grudge, GrudgeBrain, IdleBrain};
use melee::{Scheduler, SessionState, TickOutcome};

fn config(tick_ms: u64) -> SchedulerConfig {
    SchedulerConfig {
        tick_ms,
        bodies: vec![BodySpec::player("player", 10), BodySpec::ai("a", 10)],
        ..SchedulerConfig::default()
    }
}

fn scheduler() -> Scheduler {
    let collaborators =
        Collaborators::new(RecordingPresenter::new(), IdleBrain, Interpreter::default());
    Scheduler::new(config(5), collaborators)
}

#[test]
fn test_starts_stopped_and_steps_idle() {
    let mut s = scheduler();
    assert_eq!(s.state(), SessionState::Stopped);
    assert_eq!(s.step(), TickOutcome::Idle);
    assert!(s.roster().is_none());
}

#[test]
fn test_double_start_is_rejected() {
    let mut s = scheduler();
    let first = s.start().expect("first start");

    let err = s.start().expect_err("second start must fail");
    assert!(matches!(err, SchedulerError::AlreadyRunning));
    assert_eq!(s.session_id(), Some(first), "the running session is untouched");
}

#[test]
fn test_stop_is_finalized_by_next_tick() {
    let mut s = scheduler();
    s.start().unwrap();
    s.step();
    s.step();

    s.stop();
    assert_eq!(s.state(), SessionState::Running, "stop alone does not halt");

    let TickOutcome::Halted(summary) = s.step() else {
        panic!("expected halt");
    };
    assert_eq!(summary.ticks, 2, "the halting invocation runs no pass");
    assert_eq!(summary.telemetry.ticks, 2);
    assert_eq!(s.state(), SessionState::Stopped);

    for _ in 0..3 {
        assert_eq!(s.step(), TickOutcome::Idle);
    }
    assert_eq!(s.telemetry().snapshot().ticks, 2, "no pass after the halt");
}

#[test]
fn test_quit_command_ends_session() {
    let mut s = scheduler();
    s.start().unwrap();
    s.roster_mut().unwrap().player_mut().enqueue_command("quit");

    assert!(matches!(s.step(), TickOutcome::Advanced(_)), "the quitting tick completes");
    assert!(matches!(s.step(), TickOutcome::Halted(_)));
    assert!(!s.is_running());
}

#[test]
fn test_restart_builds_fresh_roster() {
    let mut s = scheduler();
    let first = s.start().unwrap();
    {
        let roster = s.roster_mut().unwrap();
        roster.get_mut("a").unwrap().set_health(0);
        roster.player_mut().enqueue_command("wait");
    }
    s.stop();
    s.step();

    let second = s.start().expect("fresh start after halt");
    assert_ne!(first, second);
    let roster = s.roster().unwrap();
    assert_eq!(roster.get("a").unwrap().health(), 10);
    assert!(!roster.player().has_pending_command());
    assert_eq!(s.tick().unwrap().frame, 0);
}

#[test]
fn test_input_between_sessions_is_dropped() {
    let mut s = scheduler();
    let handle = s.handle();
    assert!(handle.submit("attack a").unwrap());

    s.start().unwrap();
    s.step();
    assert_eq!(s.roster().unwrap().get("a").unwrap().health(), 10);
}

#[test]
fn test_handle_input_is_normalized_into_player_queue() {
    let mut s = scheduler();
    s.start().unwrap();
    let handle = s.handle();
    assert!(handle.is_running());

    assert!(handle.submit("   ATTACK A  ").unwrap());
    assert!(!handle.submit("   ").unwrap(), "blank lines are ignored");

    s.step();
    assert_eq!(s.roster().unwrap().get("a").unwrap().health(), 5);
}

#[test]
fn test_config_is_locked_while_running() {
    let mut s = scheduler();
    s.start().unwrap();
    assert!(matches!(s.set_config(config(50)), Err(SchedulerError::AlreadyRunning)));
    assert_eq!(s.config().tick_ms, 5);

    s.stop();
    s.step();
    s.set_config(config(50)).unwrap();
    assert_eq!(s.config().tick_ms, 50);
}

#[test]
fn test_invalid_roster_fails_start() {
    let collaborators =
        Collaborators::new(RecordingPresenter::new(), IdleBrain, Interpreter::default());
    let bad = SchedulerConfig {
        bodies: vec![BodySpec::ai("a", 10)],
        ..SchedulerConfig::default()
    };
    let mut s = Scheduler::new(bad, collaborators);
    assert!(matches!(s.start(), Err(SchedulerError::Roster(_))));
    assert_eq!(s.state(), SessionState::Stopped);
}

#[tokio::test]
async fn test_run_halts_after_external_stop() {
    let mut s = scheduler();
    let handle = s.handle();

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.stop();
    });

    let summary = tokio::time::timeout(Duration::from_secs(5), s.run())
        .await
        .expect("session should halt")
        .expect("run");
    stopper.await.unwrap();

    assert!(summary.ticks >= 1);
    assert_eq!(s.state(), SessionState::Stopped);
    assert!(matches!(s.run_started().await, Err(SchedulerError::NotRunning)));
}

/// Brain that takes longer than the tick interval and records when each
/// decision started and finished.
struct SlowBrain {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

impl Brain for SlowBrain {
    fn init(&mut self, _body: &mut Body) -> anyhow::Result<()> {
        Ok(())
    }

    fn decide(&mut self, _actor: &ActorId, _ctx: &mut TurnContext<'_>) -> anyhow::Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let started = Instant::now();
        std::thread::sleep(Duration::from_millis(15));
        self.spans.lock().unwrap().push((started, Instant::now()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_ticks_never_overlap_with_slow_collaborator() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let spans = Arc::new(Mutex::new(Vec::new()));
    let brain = SlowBrain {
        in_flight: in_flight.clone(),
        max_in_flight: max_in_flight.clone(),
        spans: spans.clone(),
    };

    let collaborators =
        Collaborators::new(RecordingPresenter::new(), brain, Interpreter::default());
    let mut s = Scheduler::new(config(5), collaborators);
    let handle = s.handle();

    let started = Instant::now();
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.stop();
    });
    let summary = tokio::time::timeout(Duration::from_secs(5), s.run())
        .await
        .expect("session should halt")
        .expect("run");
    let elapsed = started.elapsed();
    stopper.await.unwrap();

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);

    let spans = spans.lock().unwrap();
    assert_eq!(spans.len() as u64, summary.ticks, "one decision per tick");
    for pair in spans.windows(2) {
        assert!(pair[1].0 >= pair[0].1, "tick started before the previous one finished");
    }

    // Missed triggers were skipped rather than queued up behind the slow pass.
    let budget = elapsed.as_millis() as u64 / 15 + 1;
    assert!(summary.ticks <= budget, "{} ticks in {:?}", summary.ticks, elapsed);
}

#[test]
fn test_brain_state_resets_between_sessions() {
    let bodies = vec![BodySpec::player("player", 10), BodySpec::ai("a", 10), BodySpec::ai("b", 10)];
    let config = SchedulerConfig { tick_ms: 5, bodies, ..SchedulerConfig::default() };
    let collaborators =
        Collaborators::new(RecordingPresenter::new(), GrudgeBrain::new(8), Interpreter::default());
    let mut s = Scheduler::new(config, collaborators);

    let mut countdowns = Vec::new();
    for _ in 0..3 {
        s.start().unwrap();
        let roster = s.roster().unwrap();
        let remaining: Vec<u32> = ["a", "b"]
            .iter()
            .map(|id| roster.get(id).unwrap().ai.get::<Grudge>().unwrap().remaining)
            .collect();
        countdowns.push(remaining);
        s.stop();
        assert!(matches!(s.step(), TickOutcome::Halted(_)));
    }

    assert_eq!(countdowns[0], vec![8, 10], "staggered by a quarter of the cooldown");
    assert!(countdowns.iter().all(|c| *c == countdowns[0]), "{countdowns:?}");
}

#[tokio::test]
async fn test_input_submitted_right_after_start_reaches_player() {
    let presenter = RecordingPresenter::new();
    let calls = presenter.log();
    let collaborators = Collaborators::new(presenter, IdleBrain, Interpreter::default());
    let mut s = Scheduler::new(config(5), collaborators);
    let handle = s.handle();

    // A console reader spawned after `start` sees a running session even
    // before the first tick fires.
    s.start().unwrap();
    let reader = {
        let handle = handle.clone();
        tokio::spawn(async move {
            assert!(handle.is_running());
            handle.submit("attack a").unwrap();
            handle.submit("quit").unwrap();
        })
    };
    reader.await.unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(5), s.run_started())
        .await
        .expect("quit should end the session")
        .expect("run");
    assert_eq!(summary.telemetry.turns.executed, 2);
    assert_eq!(calls.notices_for("player"), vec!["You hit a for 5.", "Ending session."]);

    // Typed while stopped: dropped. Typed after the restart: delivered.
    assert!(!handle.is_running());
    handle.submit("attack a").unwrap();
    s.start().unwrap();
    handle.submit("quit").unwrap();
    let summary = tokio::time::timeout(Duration::from_secs(5), s.run_started())
        .await
        .expect("quit should end the session")
        .expect("run");
    assert_eq!(summary.telemetry.turns.executed, 1);
}
