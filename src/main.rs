//! `tvg-render`: decode a TinyVG file and rasterize it to a TGA image.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use eyre::{eyre, Context, Result};
use structopt::StructOpt;

use tinyvg::canvas::Canvas;
use tinyvg::error::CliError;
use tinyvg::supersample;
use tinyvg::{parser, render, tga};

#[derive(StructOpt)]
#[structopt(name = "tvg-render", about = "Render a TinyVG file to a TGA image")]
struct Options {
    /// Input .tvg file, or `-` to read from stdin.
    input: PathBuf,

    /// Output .tga file, or `-` to write to stdout. Defaults to stdout.
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// Override output geometry as `WxH` instead of using the file's header.
    #[structopt(short, long)]
    geometry: Option<String>,

    /// Anti-alias by rendering at 4x and downsampling.
    #[structopt(short, long)]
    anti_alias: bool,

    /// Render at NxN super-sampling and downsample (1..=32). Overrides
    /// --anti-alias.
    #[structopt(short, long)]
    super_sampling: Option<u32>,
}

fn parse_geometry(spec: &str) -> Result<(u32, u32), CliError> {
    let (w, h) = spec
        .split_once('x')
        .ok_or_else(|| CliError::BadArgs(format!("invalid --geometry '{spec}', expected WxH")))?;

    let width: u32 = w
        .parse()
        .map_err(|_| CliError::BadArgs(format!("invalid width in --geometry '{spec}'")))?;
    let height: u32 = h
        .parse()
        .map_err(|_| CliError::BadArgs(format!("invalid height in --geometry '{spec}'")))?;

    Ok((width, height))
}

fn read_input(path: &PathBuf) -> Result<Vec<u8>, CliError> {
    let mut buf = Vec::new();

    if path.as_os_str() == "-" {
        io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| CliError::ReadError(e.to_string()))?;
    } else {
        buf = std::fs::read(path).map_err(|e| CliError::ReadError(e.to_string()))?;
    }

    Ok(buf)
}

fn write_output(path: &Option<PathBuf>, canvas: &Canvas) -> Result<(), CliError> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            let mut file =
                std::fs::File::create(p).map_err(|e| CliError::WriteError(e.to_string()))?;
            tga::write_tga(canvas, &mut file).map_err(|e| CliError::WriteError(e.to_string()))?;
        }
        _ => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            tga::write_tga(canvas, &mut lock).map_err(|e| CliError::WriteError(e.to_string()))?;
            lock.flush().map_err(|e| CliError::WriteError(e.to_string()))?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let opts = Options::from_args();

    let factor = supersample::resolve_factor(opts.anti_alias, opts.super_sampling)?;

    let data = read_input(&opts.input)?;
    let (mut header, color_table, commands) =
        parser::parse(&data).wrap_err("failed to parse TinyVG input")?;

    if let Some(spec) = &opts.geometry {
        let (width, height) = parse_geometry(spec)?;
        header.width = width;
        header.height = height;
    }

    if header.width == 0 || header.height == 0 {
        return Err(eyre!("output geometry must be non-zero in both dimensions"));
    }

    let mut canvas = Canvas::new(header.width * factor, header.height * factor);

    for command in &commands {
        render::render(&mut canvas, &header, &color_table, command)
            .wrap_err("rendering failed")?;
    }

    let canvas = canvas.downsample(factor);

    write_output(&opts.output, &canvas)?;

    log::info!(
        "rendered {} draw command(s) at {}x supersampling into {}x{}",
        commands.len(),
        factor,
        canvas.width(),
        canvas.height()
    );

    Ok(())
}
