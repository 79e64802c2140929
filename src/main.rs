use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use floor::area::Area;
use floor::config::{ConfigError, FloorConfig};
use floor::doc::{NumberInputError, TableId, parse_table_number};
use floor::engine::{Action, Engine};
use floor::image::{ImageError, encode_data_uri, mime_for_path};
use floor::input::{DetachedSurface, PointerSample};
use floor::persist::FileSlot;
use floor::snap::Cell;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

type FileEngine = Engine<FileSlot>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no table {id} in {area}")]
    UnknownTable { area: Area, id: TableId },
    #[error("could not start dragging table {id} in {area}")]
    DragNotStarted { area: Area, id: TableId },
    #[error(transparent)]
    Number(#[from] NumberInputError),
    #[error("background for {area} unchanged: {source}")]
    Background { area: Area, source: ImageError },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "tabletrack", about = "Restaurant floor table tracker")]
struct Cli {
    /// JSON file holding every area's layout.
    #[arg(long, env = "TABLETRACK_STORE", default_value = "tabletrack.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Area selector shared by the per-table commands.
#[derive(Args, Debug)]
struct AreaArg {
    /// Area name or slug ("Main Bar", "main-bar", "patio"...). Defaults to FLOOR_DEFAULT_AREA.
    #[arg(long)]
    area: Option<Area>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List areas with table counts.
    Areas,
    /// Print an area's tables.
    Show {
        #[command(flatten)]
        area: AreaArg,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Advance a table's status (empty, sat, food, touched).
    Cycle {
        id: u32,
        #[command(flatten)]
        area: AreaArg,
    },
    /// Assign a server name. An empty name clears it.
    Server {
        id: u32,
        name: String,
        #[command(flatten)]
        area: AreaArg,
    },
    /// Change the number shown on a table.
    Number {
        id: u32,
        number: String,
        #[command(flatten)]
        area: AreaArg,
    },
    /// Place a table at a grid cell.
    Move {
        id: u32,
        #[arg(long)]
        col: u32,
        #[arg(long)]
        row: u32,
        #[command(flatten)]
        area: AreaArg,
    },
    /// Drag a table by a pixel offset, snapping to the grid.
    Drag {
        id: u32,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        dx: f64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        dy: f64,
        #[command(flatten)]
        area: AreaArg,
    },
    /// Set an area's background image from a file.
    Background {
        path: PathBuf,
        #[command(flatten)]
        area: AreaArg,
    },
    /// Restore every area to the default layout.
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = FloorConfig::from_env()?;
    let mut engine = Engine::open(FileSlot::new(&cli.store), &config);
    tracing::debug!(store = %cli.store.display(), "store opened");
    run(&mut engine, &config, cli.command).await
}

async fn run(engine: &mut FileEngine, config: &FloorConfig, command: Command) -> Result<(), CliError> {
    match command {
        Command::Areas => {
            run_areas(engine);
            Ok(())
        }
        Command::Show { area, json } => {
            engine.switch_area(area.resolve(config));
            run_show(engine, json)
        }
        Command::Cycle { id, area } => {
            let id = select(engine, &area, config, id)?;
            engine.cycle_status(id);
            print_table(engine, id);
            Ok(())
        }
        Command::Server { id, name, area } => {
            let id = select(engine, &area, config, id)?;
            engine.set_server(id, &name);
            print_table(engine, id);
            Ok(())
        }
        Command::Number { id, number, area } => {
            let id = select(engine, &area, config, id)?;
            parse_table_number(&number)?;
            engine.set_number(id, &number);
            print_table(engine, id);
            Ok(())
        }
        Command::Move { id, col, row, area } => {
            let id = select(engine, &area, config, id)?;
            engine.move_table(id, Cell::new(col, row));
            print_table(engine, id);
            Ok(())
        }
        Command::Drag { id, dx, dy, area } => {
            let id = select(engine, &area, config, id)?;
            run_drag(engine, id, dx, dy)?;
            print_table(engine, id);
            Ok(())
        }
        Command::Background { path, area } => run_background(engine, area.resolve(config), path).await,
        Command::Reset => {
            engine.reset();
            println!("all areas reset");
            Ok(())
        }
    }
}

impl AreaArg {
    fn resolve(&self, config: &FloorConfig) -> Area {
        self.area.unwrap_or(config.default_area)
    }
}

/// Switch to the requested area and confirm the table exists there.
fn select(engine: &mut FileEngine, area: &AreaArg, config: &FloorConfig, id: u32) -> Result<TableId, CliError> {
    let area = area.resolve(config);
    engine.switch_area(area);
    let id = TableId(id);
    if engine.core.table(id).is_none() {
        return Err(CliError::UnknownTable { area, id });
    }
    Ok(id)
}

fn run_areas(engine: &FileEngine) {
    for (area, layout) in engine.registry().iter() {
        let background = if layout.background.is_some() { "background" } else { "no background" };
        println!("{:<10} {:>3} tables  {background}", area.name(), layout.tables.len());
    }
}

fn run_show(engine: &FileEngine, json: bool) -> Result<(), CliError> {
    let layout = engine.active_layout();
    if json {
        println!("{}", serde_json::to_string_pretty(layout)?);
        return Ok(());
    }
    println!("{}", engine.active_area());
    for table in &layout.tables {
        println!(
            "  #{:<4} {:<8} {:<16} ({}, {})  id {}",
            table.number,
            table.status.as_str(),
            table.server_label(),
            table.col,
            table.row,
            table.id
        );
    }
    Ok(())
}

fn print_table(engine: &FileEngine, id: TableId) {
    if let Some(table) = engine.core.table(id) {
        println!(
            "{} table #{}: {}, {}, at ({}, {})",
            engine.active_area(),
            table.number,
            table.status,
            table.server_label(),
            table.col,
            table.row
        );
    }
}

/// Replay a press-move-release gesture on table `id`. The drag is started on
/// the named table, not whatever sits on top of it, and moves go straight to
/// the engine, so no window listeners are needed. Edit mode is restored.
fn run_drag(engine: &mut FileEngine, id: TableId, dx: f64, dy: f64) -> Result<(), CliError> {
    let was_editing = engine.is_edit_mode();
    if !was_editing {
        engine.toggle_edit_mode();
    }
    let started = match engine.table_center(id) {
        Some(start) => {
            let actions = engine.begin_drag(id, PointerSample::mouse(start.x, start.y), &mut DetachedSurface);
            let started = actions.iter().any(|a| matches!(a, Action::DragStarted { id: dragged, .. } if *dragged == id));
            if started {
                engine.on_move(PointerSample::mouse(start.x + dx, start.y + dy));
                engine.on_release();
            }
            started
        }
        None => false,
    };
    if !was_editing {
        engine.toggle_edit_mode();
    }
    if started { Ok(()) } else { Err(CliError::DragNotStarted { area: engine.active_area(), id }) }
}

async fn run_background(engine: &mut FileEngine, area: Area, path: PathBuf) -> Result<(), CliError> {
    let decoded = match tokio::fs::read(&path).await {
        Ok(bytes) => encode_data_uri(&mime_for_path(&path), &bytes),
        Err(e) => Err(ImageError::Read(e.to_string())),
    };
    match decoded {
        Ok(image) => {
            engine.set_background(area, image);
            println!("{area} background set from {}", path.display());
            Ok(())
        }
        Err(source) => Err(CliError::Background { area, source }),
    }
}
