use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::Event as CtEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::execute;
use crossterm::style;
use crossterm::terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lifegrid::camera::Camera;
use lifegrid::game::Game;
use lifegrid::game::GameConfig;
use lifegrid::grid::Boundary;
use lifegrid::parse_rle::load_rle;

const FRAMERATE: u64 = 30;
const FRAMETIME: Duration = Duration::from_millis(1_000 / FRAMERATE);

enum Event {
    TogglePause,
    CamResize { cols: u16, rows: u16 },
    Exit,
}

/// Run a Game of Life pattern in the terminal.
///
/// Press space to pause, and q or Ctrl-C to quit.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Pattern file in the RLE format
    path: PathBuf,

    /// Stop stepping after this many generations. Runs until exit if omitted.
    generations: Option<u64>,

    /// What lies past the edges of the grid: bounded, toroidal or unbounded
    #[arg(default_value = "bounded")]
    boundary: Boundary,
}

fn handle_event(event: CtEvent) -> Option<Event> {
    match event {
        CtEvent::Key(key_event) => match key_event {
            KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => Some(Event::Exit),
            KeyEvent {
                code: KeyCode::Char(' '),
                ..
            } => Some(Event::TogglePause),
            _ => None,
        },
        CtEvent::Resize(cols, rows) => Some(Event::CamResize { cols, rows }),
        _ => None,
    }
}

/// Camera covering the terminal, minus a status line. Braille packs 2x4 cells per character.
fn camera_for(cols: u16, rows: u16) -> (usize, usize) {
    (cols as usize * 2, rows.saturating_sub(1) as usize * 4)
}

fn run(game: &mut Game, generations: Option<u64>, stdout: &mut io::Stdout) -> anyhow::Result<()> {
    let (cols, rows) = terminal::size()?;
    let (w, h) = camera_for(cols, rows);

    let mut cam = Camera::new(w, h);
    let (top, left) = game.grid().origin();
    cam.offset_y(top);
    cam.offset_x(left);

    let mut paused = false;

    loop {
        let t = Instant::now();

        let event = if event::poll(FRAMETIME)? {
            handle_event(event::read()?)
        } else {
            None
        };

        match event {
            None => {}
            Some(Event::Exit) => break,
            Some(Event::TogglePause) => paused = !paused,
            Some(Event::CamResize { cols, rows }) => {
                let (w, h) = camera_for(cols, rows);
                cam.resize(w, h);
            }
        }

        let done = generations.is_some_and(|n| game.generation() >= n);
        if !paused && !done {
            game.step();
        }

        cam.reset();
        cam.draw(game.grid());
        let s = cam.render();

        execute!(
            stdout,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0),
        )?;

        for line in s.lines() {
            execute!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
        }

        execute!(
            stdout,
            style::Print(format!(
                "generation {}  population {}{}",
                game.generation(),
                game.grid().population(),
                if paused { "  (paused)" } else { "" }
            ))
        )?;

        let time_left = FRAMETIME.saturating_sub(t.elapsed());
        thread::sleep(time_left);
    }

    Ok(())
}

fn leave_screen(w: &mut impl Write) -> io::Result<()> {
    execute!(w, cursor::Show, terminal::LeaveAlternateScreen)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let (grid, file) = load_rle(&bytes)
        .with_context(|| format!("Failed to parse {}", args.path.display()))?;

    info!(
        name = ?file.name.map(String::from_utf8_lossy),
        rule = %file.set,
        population = grid.population(),
        "Loaded pattern"
    );

    let config = GameConfig {
        boundary: args.boundary,
        rules: file.set,
        ..GameConfig::default()
    };
    let mut game = Game::from_grid(grid, config);

    terminal::enable_raw_mode()?;
    let mut stdout = scopeguard::guard(io::stdout(), |mut stdout| {
        // Runs on panic too. Errors are dropped, there is nowhere left to report them.
        let _ = leave_screen(&mut stdout);
        let _ = terminal::disable_raw_mode();
    });
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    run(&mut game, args.generations, &mut stdout)
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::panic;
    use std::path::Path;

    use clap::CommandFactory;
    use clap::Parser;

    use super::Args;
    use lifegrid::grid::Boundary;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["lifegrid", "glider.rle"]).unwrap();

        assert_eq!(args.path, Path::new("glider.rle"));
        assert_eq!(args.generations, None);
        assert_eq!(args.boundary, Boundary::Bounded);
    }

    #[test]
    fn all_arguments() {
        let args = Args::try_parse_from(["lifegrid", "gun.rle", "120", "torus"]).unwrap();

        assert_eq!(args.generations, Some(120));
        assert_eq!(args.boundary, Boundary::Toroidal);
    }

    #[test]
    fn bad_arguments() {
        assert!(Args::try_parse_from(["lifegrid"]).is_err());
        assert!(Args::try_parse_from(["lifegrid", "a.rle", "-3"]).is_err());
        assert!(Args::try_parse_from(["lifegrid", "a.rle", "3", "infinite"]).is_err());
        assert!(Args::try_parse_from(["lifegrid", "a.rle", "3", "bounded", "extra"]).is_err());
    }

    #[test]
    fn screen_restored_on_panic() {
        let out = RefCell::new(Vec::new());

        let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = scopeguard::guard(&out, |out| {
                super::leave_screen(&mut *out.borrow_mut()).unwrap();
            });

            panic!("frame failed");
        }));

        assert!(res.is_err());
        assert_eq!(out.into_inner(), b"\x1b[?25h\x1b[?1049l");
    }
}
