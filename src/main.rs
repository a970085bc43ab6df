use melee::commands::Interpreter;
use melee::config::SchedulerConfig;
use melee::kernel::body::{ActorId, Role};
use melee::kernel::collaborators::Collaborators;
use melee::outputs::TextPresenter;
use melee::planner::GrudgeBrain;
use melee::Scheduler;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SchedulerConfig::from_env()?;
    let viewer = config
        .bodies
        .iter()
        .find(|b| b.role == Role::Player)
        .map(|b| b.id.clone())
        .unwrap_or_else(|| ActorId::new("player"));

    let collaborators = Collaborators::new(
        TextPresenter::new(viewer, config.echo_stdout),
        GrudgeBrain::default(),
        Interpreter::new(config.attack_damage, config.heal_amount),
    );
    let mut scheduler = Scheduler::new(config, collaborators);
    let handle = scheduler.handle();

    // Every line goes to the scheduler's input (dropped by `start` if it
    // arrives while stopped) and is mirrored to the lobby, which only wakes
    // the restart prompt.
    let (lobby_tx, mut lobby_rx) = mpsc::unbounded_channel::<String>();

    println!("Commands: attack <name>, heal, wait, status, quit.\n");
    scheduler.start()?;

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Err(e) = handle.submit(&line) {
                tracing::error!("Failed to submit input: {}", e);
                break;
            }
            if lobby_tx.send(line).is_err() {
                break;
            }
        }
        // EOF ends whatever session is running; the lobby sender drops with us.
        handle.stop();
    });

    loop {
        let summary = scheduler.run_started().await?;
        tracing::info!(
            session = %summary.session,
            ticks = summary.ticks,
            executed = summary.telemetry.turns.executed,
            knockouts = summary.telemetry.turns.knockouts,
            failures = summary.telemetry.failures.total(),
            "session summary"
        );

        println!(
            "Session over after {} ticks. Press Enter to play again, Ctrl-D to exit.",
            summary.ticks
        );
        // Lines from the session that just ended are not a restart request.
        while lobby_rx.try_recv().is_ok() {}
        if lobby_rx.recv().await.is_none() {
            break;
        }

        println!("Commands: attack <name>, heal, wait, status, quit.\n");
        scheduler.start()?;
    }

    Ok(())
}
