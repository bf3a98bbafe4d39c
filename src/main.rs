use anyhow::{bail, Context};
use gcodeview::{init_logging, preview_file, synthesize_file, Config, InputKind};
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = "usage: gcodeview [--config <file>] <file.gcode|file.nc|file.dxf|file.json>";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut config_path = None;
    let mut input = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config_path = Some(PathBuf::from(args.next().context(USAGE)?));
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }
    let input = input.context(USAGE)?;

    let config_path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    info!("GCodeView {} using {}", gcodeview::VERSION, config_path.display());

    match InputKind::from_path(&input) {
        Some(InputKind::Gcode) => {
            let summary = preview_file(&input, &config)?;
            println!("{}", summary.to_json()?);
        }
        Some(InputKind::Geometry) => {
            print!("{}", synthesize_file(&input, &config)?);
        }
        None => bail!("unsupported input file {}\n{USAGE}", input.display()),
    }

    Ok(())
}
