use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use image::ImageFormat;
use invisiovault::stego::capacity::max_payload_bytes;
use invisiovault::{polyglot, qr, stego, utils};

#[derive(Parser)]
#[command(name = "invisiovault")]
#[command(about = "Hide files in images, polyglot archives and QR fragments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a file (or a text note) inside a carrier image
    Hide {
        /// Path to the carrier image
        #[arg(short, long)]
        image: String,

        /// Path to the file to hide
        #[arg(short, long)]
        file: Option<String>,

        /// Literal text to hide instead of a file
        #[arg(short, long)]
        text: Option<String>,

        /// Path for the output image (must end with .png)
        #[arg(short, long)]
        output: String,

        /// Optional password for encryption
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Extract a hidden file from a carrier image
    Extract {
        /// Path to the carrier image
        #[arg(short, long)]
        image: String,

        /// Path for the extracted file (defaults to the stored filename)
        #[arg(short, long)]
        output: Option<String>,

        /// Password, if the data was hidden with one
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show how many bytes a carrier image can hold
    Capacity {
        /// Path to the carrier image
        #[arg(short, long)]
        image: String,
    },

    /// Create or unpack polyglot files
    Polyglot {
        #[command(subcommand)]
        command: PolyglotCommands,
    },

    /// Encode or decode QR fragment strings
    Qr {
        #[command(subcommand)]
        command: QrCommands,
    },
}

#[derive(Subcommand)]
enum PolyglotCommands {
    /// Append a file to a carrier so the result doubles as an archive
    Create {
        /// Path to the carrier file (image, PDF, anything)
        #[arg(short, long)]
        carrier: String,

        /// Path to the file to hide
        #[arg(short, long)]
        file: String,

        /// Path for the output polyglot
        #[arg(short, long)]
        output: String,

        /// Optional password for archive-level encryption
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Extract the hidden file from a polyglot
    Extract {
        /// Path to the polyglot file
        #[arg(short, long)]
        input: String,

        /// Path for the extracted file (defaults to the stored filename)
        #[arg(short, long)]
        output: Option<String>,

        /// Password, if the archive was encrypted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum QrCommands {
    /// Combine visible text and a hidden secret into one string
    Encode {
        /// Text that stays visible to any scanner
        #[arg(long)]
        public: String,

        /// Secret to hide behind the visible text
        #[arg(long)]
        secret: String,

        /// Optional password for encryption
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Recover the hidden secret from a combined string
    Decode {
        /// The combined string, as scanned
        #[arg(long)]
        input: String,

        /// Password, if the secret was encrypted
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hide { image, file, text, output, password } => {
            let output_path = Path::new(&output);
            if !output_path.extension().is_some_and(|ext| ext == "png") {
                eprintln!("Error: Output file must have .png extension (lossy formats destroy hidden data)");
                std::process::exit(1);
            }

            let (payload, filename, mime_type) = match (file, text) {
                (Some(path), None) => {
                    let data = std::fs::read(&path)
                        .with_context(|| format!("reading {path}"))?;
                    let name = Path::new(&path)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "file.bin".to_string());
                    let mime = utils::guess_mime_type(&name).to_string();
                    (data, name, mime)
                }
                (None, Some(note)) => {
                    (note.into_bytes(), "note.txt".to_string(), "text/plain".to_string())
                }
                _ => {
                    eprintln!("Error: Must specify exactly one of --file or --text");
                    std::process::exit(1);
                }
            };

            let carrier = image::open(&image).with_context(|| format!("opening {image}"))?;

            println!("Hiding {filename} ({} bytes) in {image} -> {output}", payload.len());
            let stego_image =
                stego::hide(&carrier, &payload, &filename, &mime_type, password.as_deref())?;
            stego_image.save_with_format(output_path, ImageFormat::Png)?;
            println!("File hidden successfully!");
        }

        Commands::Extract { image, output, password } => {
            let carrier = image::open(&image).with_context(|| format!("opening {image}"))?;

            println!("Extracting hidden data from {image}");
            let hidden = stego::extract(&carrier, password.as_deref())?;

            let output_path = output.map_or_else(|| PathBuf::from(&hidden.filename), PathBuf::from);
            std::fs::write(&output_path, &hidden.data)?;
            println!(
                "Extracted {} ({}, {} bytes) -> {}",
                hidden.filename,
                hidden.mime_type,
                hidden.data.len(),
                output_path.display()
            );
        }

        Commands::Capacity { image } => {
            let carrier = image::open(&image).with_context(|| format!("opening {image}"))?;
            let pixels = carrier.width() as usize * carrier.height() as usize;
            println!(
                "{image}: {}x{} = {pixels} pixels, up to {} bytes of hidden frame",
                carrier.width(),
                carrier.height(),
                max_payload_bytes(pixels)
            );
        }

        Commands::Polyglot { command } => match command {
            PolyglotCommands::Create { carrier, file, output, password } => {
                let carrier_data =
                    std::fs::read(&carrier).with_context(|| format!("reading {carrier}"))?;
                let file_data = std::fs::read(&file).with_context(|| format!("reading {file}"))?;
                let filename = Path::new(&file)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "file.bin".to_string());

                println!("Creating polyglot: {carrier} + {file} -> {output}");
                let polyglot_data = polyglot::create_polyglot(
                    &carrier_data,
                    &file_data,
                    &filename,
                    password.as_deref(),
                )?;
                std::fs::write(&output, polyglot_data)?;
                println!("Polyglot created successfully!");
            }

            PolyglotCommands::Extract { input, output, password } => {
                let data = std::fs::read(&input).with_context(|| format!("reading {input}"))?;

                println!("Extracting hidden file from {input}");
                let (file_data, filename) =
                    polyglot::extract_from_polyglot(&data, password.as_deref())?;

                let output_path = output.map_or_else(|| PathBuf::from(&filename), PathBuf::from);
                std::fs::write(&output_path, &file_data)?;
                println!(
                    "Extracted {filename} ({} bytes) -> {}",
                    file_data.len(),
                    output_path.display()
                );
            }
        },

        Commands::Qr { command } => match command {
            QrCommands::Encode { public, secret, password } => {
                println!("{}", qr::encode_fragment(&public, &secret, password.as_deref()));
            }

            QrCommands::Decode { input, password } => {
                let (public, secret) = qr::decode_fragment(&input, password.as_deref())?;
                println!("Public: {public}");
                if secret.is_empty() {
                    println!("No hidden data found");
                } else {
                    println!("Secret: {secret}");
                }
            }
        },
    }

    Ok(())
}
