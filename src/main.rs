//! # Reticle CLI
//!
//! Command-line interface for building photomask reticle layouts.
//!
//! ## Usage
//!
//! ```bash
//! # Pack 25 images of 5x5 µm onto ASML300 reticles and write JSON + SVG
//! reticle build --source images.json --image-size 5000x5000 \
//!     --id lot42 --text "run a" --format json,svg --out-dir out/
//!
//! # Only place layers 1/0..3/0, under a frame template
//! reticle build --source images.json --image-size 5000x5000 \
//!     --layers 1/0,2/0,3/0 --template frame.json --id lot42
//!
//! # Show how many reticles 40 images need
//! reticle pack --image-size 5000x5000 --count 40
//!
//! # Render a stand-alone barcode
//! reticle barcode LOT42-R0 --output barcode.svg
//!
//! # List encodable characters
//! reticle symbols
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use reticle::{
    ReticleAssembler, ReticleError, ReticleProfile,
    barcode::{self, SymbologyTable},
    export::{ExportFormat, Manifest},
    geometry::{Canvas, Layer, Size},
    packer::Packing,
};

/// Reticle - Photomask reticle layout generator
#[derive(Parser, Debug)]
#[command(name = "reticle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log per-slot and per-canvas progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble reticles from a source geometry file
    Build {
        /// Source geometry (JSON) holding one image per layer
        #[arg(long, value_name = "FILE")]
        source: PathBuf,

        /// Image size at wafer scale, e.g. 5000x5000
        #[arg(long)]
        image_size: Size,

        /// Image layers in slot order (defaults to every source layer, sorted)
        #[arg(long, value_delimiter = ',')]
        layers: Vec<Layer>,

        /// Reticle identifier
        #[arg(long)]
        id: String,

        /// Free annotation text
        #[arg(long, default_value = "")]
        text: String,

        /// Template geometry (JSON) copied under every reticle
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Built-in profile name or JSON profile file
        #[arg(long, default_value = "ASML300")]
        profile: String,

        /// Custom symbology table (JSON)
        #[arg(long, value_name = "FILE")]
        symbology: Option<PathBuf>,

        /// Output formats
        #[arg(long, value_delimiter = ',', default_value = "json")]
        format: Vec<ExportFormat>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show the grid and slot assignment for a number of images
    Pack {
        /// Image size at wafer scale, e.g. 5000x5000
        #[arg(long)]
        image_size: Size,

        /// Number of images
        #[arg(long)]
        count: usize,

        /// Built-in profile name or JSON profile file
        #[arg(long, default_value = "ASML300")]
        profile: String,

        /// Print the packing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a single barcode
    Barcode {
        /// Text to encode
        text: String,

        /// Bar height
        #[arg(long, default_value = "5000")]
        height: f64,

        /// Output layer
        #[arg(long, default_value = "4/0")]
        layer: Layer,

        /// Output file (format from extension: .json, .svg, .png)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Custom symbology table (JSON)
        #[arg(long, value_name = "FILE")]
        symbology: Option<PathBuf>,
    },

    /// List encodable characters and their bar patterns
    Symbols {
        /// Custom symbology table (JSON)
        #[arg(long, value_name = "FILE")]
        symbology: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> Result<(), ReticleError> {
    match command {
        Commands::Build {
            source,
            image_size,
            layers,
            id,
            text,
            template,
            profile,
            symbology,
            format,
            out_dir,
        } => {
            let profile = ReticleProfile::parse(&profile)?;
            let owned_table;
            let table = match symbology {
                Some(path) => {
                    owned_table = load_table(&path)?;
                    &owned_table
                }
                None => SymbologyTable::builtin()?,
            };

            let source_canvas = Canvas::load(&source)?;
            let layers = if layers.is_empty() {
                source_canvas.layers().into_iter().collect()
            } else {
                layers
            };
            let template = template.as_deref().map(Canvas::load).transpose()?;

            let mut assembler = ReticleAssembler::new(&profile, table);
            if let Some(template) = &template {
                assembler = assembler.with_template(template);
            }
            let assembly = assembler.build(&source_canvas, image_size, &layers, &id, &text)?;

            let mut manifest =
                Manifest::from_assembly(&assembly, &profile.name).with_source(&source);
            let manifest_path = manifest.write_assembly(&assembly, &format, &out_dir)?;
            for entry in &manifest.reticles {
                println!("{}: {} image(s)", entry.name, entry.slot_count);
            }
            println!(
                "Wrote {} reticle(s) to {} ({})",
                assembly.reticles.len(),
                out_dir.display(),
                manifest_path.display()
            );
            Ok(())
        }

        Commands::Pack {
            image_size,
            count,
            profile,
            json,
        } => {
            let profile = ReticleProfile::parse(&profile)?;
            let packing = profile.pack(image_size, count)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&packing)?);
            } else {
                print_packing(&profile, &packing);
            }
            Ok(())
        }

        Commands::Barcode {
            text,
            height,
            layer,
            output,
            symbology,
        } => {
            let owned_table;
            let table = match symbology {
                Some(path) => {
                    owned_table = load_table(&path)?;
                    &owned_table
                }
                None => SymbologyTable::builtin()?,
            };

            let encoded = barcode::filter_text(&text, barcode::DEFAULT_MAX_LENGTH, table);
            let symbols = barcode::encode(&text, barcode::DEFAULT_MAX_LENGTH, table);
            let layout = barcode::render(&symbols, height, layer);
            println!(
                "Encoded {:?}: {} symbols, {} bars, width {} (footprint {})",
                encoded,
                symbols.len(),
                layout.bars.len(),
                layout.width,
                layout.footprint_width()
            );

            if let Some(path) = output {
                let format: ExportFormat = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("json")
                    .parse()?;
                let canvas = layout.into_canvas(format!("barcode_{}", encoded));
                fs::write(&path, format.render(&canvas)?)?;
                println!("Saved to {}", path.display());
            }
            Ok(())
        }

        Commands::Symbols { symbology } => {
            let owned_table;
            let table = match symbology {
                Some(path) => {
                    owned_table = load_table(&path)?;
                    &owned_table
                }
                None => SymbologyTable::builtin()?,
            };

            println!("Encodable characters ({}):", table.len());
            for ch in table.characters() {
                if let Some(symbol) = table.get(ch) {
                    println!("  {:?}  {}", ch, pattern(symbol.tokens()));
                }
            }
            println!("\nStart/stop:  {}", pattern(table.start().tokens()));
            Ok(())
        }
    }
}

fn load_table(path: &Path) -> Result<SymbologyTable, ReticleError> {
    Ok(SymbologyTable::from_json(&fs::read_to_string(path)?)?)
}

fn pattern(tokens: &[barcode::BarKind]) -> String {
    tokens.iter().map(|t| t.code()).collect::<Vec<_>>().join(" ")
}

fn print_packing(profile: &ReticleProfile, packing: &Packing) {
    let grid = packing.grid;
    println!("Profile: {}", profile.name);
    println!(
        "Grid: {} x {} ({} per reticle), pitch {} x {}",
        grid.n_cols,
        grid.n_rows,
        grid.capacity(),
        grid.pitch.width,
        grid.pitch.height
    );
    println!("Reticles: {}", packing.canvas_count());
    for canvas in &packing.canvases {
        println!("\nReticle {}:", canvas.index);
        // row 0 is the bottom row
        for row in (0..grid.n_rows).rev() {
            let cells: Vec<String> = (0..grid.n_cols)
                .map(|col| match canvas.slot_at(row, col) {
                    Some(index) => format!("{:>4}", index),
                    None => "   .".to_string(),
                })
                .collect();
            println!("  {}", cells.join(""));
        }
    }
}
