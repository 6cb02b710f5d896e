mod replay;
mod tui;

use anyhow::{Context, Result};
use caretkeeper_config::{Config, Direction};
use caretkeeper_engine::playback::Playback;
use caretkeeper_engine::{Editor, EditorOptions, Limits, MemorySurface, TextDirection};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{env, io::stdout, path::PathBuf, process};

const SAMPLE_MARKUP: &str = "We hope you are enjoying <b>React <i>Controlled</i> Contenteditable</b>, \
if you find<br>an issue please <a href=\"#\">report it</a>";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    replay: Option<PathBuf>,
    markup: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--replay" => {
                let script = args.next().ok_or("--replay needs a script path")?;
                parsed.replay = Some(PathBuf::from(script));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path if parsed.markup.is_none() => parsed.markup = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument {extra}")),
        }
    }
    Ok(parsed)
}

fn editor_options(config: &Config) -> (EditorOptions, TextDirection) {
    let settings = &config.editor;
    let options = EditorOptions {
        root_marker_attribute: settings.root_marker_attribute.clone(),
        limits: Limits {
            max_ancestor_hops: settings.max_ancestor_hops,
            max_descent_steps: settings.max_descent_steps,
        },
        caret_jump_threshold: settings.caret_jump_threshold,
    };
    let direction = match settings.direction {
        Direction::Ltr => TextDirection::Ltr,
        Direction::Rtl => TextDirection::Rtl,
    };
    (options, direction)
}

fn build_playback(config: &Config, markup: &str) -> Result<Playback> {
    let (options, direction) = editor_options(config);
    let surface = MemorySurface::from_markup(&options.root_marker_attribute, markup)
        .context("Failed to parse markup")?
        .with_direction(direction);
    Ok(Playback::new(Editor::new(surface, options)))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args[1..]) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {} [--replay SCRIPT] [MARKUP_FILE]", args[0]);
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(Some(config)) => {
            log::info!("Loaded config from {}", config_path.display());
            config
        }
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let markup = match cli.markup.as_ref().or(config.playground.document.as_ref()) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markup file '{}'", path.display()))?,
        None => SAMPLE_MARKUP.to_string(),
    };
    let mut playback = build_playback(&config, &markup)?;

    if let Some(script_path) = cli.replay {
        let script = std::fs::read_to_string(&script_path)
            .with_context(|| format!("Failed to read script '{}'", script_path.display()))?;
        let commands = replay::parse_script(&script)?;
        let outcome = replay::run(&mut playback, &commands)?;
        println!("{outcome}");
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = tui::App::new(playback);
    let res = tui::run(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}
