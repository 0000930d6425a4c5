use anyhow::Context;
use clap::{ArgAction, Parser};
use inkstone_editor::{EditorEvent, LocalBackend, LocalBehaviors, SessionScript, run_session};
use inkstone_render::SceneRenderer;
use std::path::PathBuf;
use std::sync::mpsc::channel;

#[derive(Parser, Debug)]
#[command(name = "inkstone")]
#[command(version, about = "Replay a freehand ink editing session and print the resulting model")]
struct Cli {
    /// Session script (JSON)
    #[arg(value_name = "SESSION")]
    session: PathBuf,

    /// Pretty-print the model JSON
    #[arg(long, short = 'p', action = ArgAction::SetTrue)]
    pretty: bool,

    /// Print emitted editor events to stderr
    #[arg(long, short = 'e', action = ArgAction::SetTrue)]
    events: bool,

    /// Exit with an error if any command failed
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let json = std::fs::read_to_string(&cli.session)
        .with_context(|| format!("Failed to read session {}", cli.session.display()))?;
    let script = SessionScript::from_json(&json)
        .with_context(|| format!("Invalid session script {}", cli.session.display()))?;

    let (tx, rx) = channel::<EditorEvent>();
    let mut behaviors = LocalBehaviors::new(
        script.configuration.clone(),
        SceneRenderer::new(),
        LocalBackend::new(),
        tx,
    );
    let report = pollster::block_on(run_session(&mut behaviors, &script));

    if cli.events {
        for event in rx.try_iter() {
            eprintln!("{:?}", event);
        }
    }
    for error in &report.errors {
        eprintln!("error: {}", error);
    }

    let model = behaviors.model();
    let output = if cli.pretty {
        model.to_json_pretty()?
    } else {
        model.to_json()?
    };
    println!("{}", output);

    log::info!(
        "{} commands, {} strokes, {} draw commands",
        report.commands,
        model.len(),
        behaviors.renderer().commands().count()
    );
    behaviors.destroy();

    if cli.strict && !report.is_clean() {
        anyhow::bail!("{} command(s) failed", report.errors.len());
    }
    Ok(())
}
