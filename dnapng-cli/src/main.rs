use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dnapng::alphabet::Base;
use dnapng::layout::Layout;
use dnapng::pack::{self, BaseOrder};
use dnapng::{otp, strip_padding, CodecConfig, CodecError, Decoder};

mod png_io;

/// Convert DNA sequences to PNG block images and back
#[derive(Parser)]
#[command(name = "dnapng", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a DNA sequence as a PNG image
    Encode {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        codec: CodecArgs,
        /// Number of blocks per row
        #[arg(long)]
        cols: Option<u32>,
        /// Fill unused blocks with opaque black instead of transparency
        #[arg(long)]
        opaque_pad: bool,
    },
    /// Read a DNA sequence back from a PNG image
    Decode {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        codec: CodecArgs,
        /// Maximum intensity distance (0-255) to the nearest base
        #[arg(long)]
        tolerance: Option<u8>,
        /// Drop trailing padding characters from the output
        #[arg(long)]
        strip_padding: bool,
    },
    /// Decode a PNG image and print a JSON summary
    Inspect {
        /// Input PNG file
        image: PathBuf,
        #[command(flatten)]
        codec: CodecArgs,
        /// Maximum intensity distance (0-255) to the nearest base
        #[arg(long)]
        tolerance: Option<u8>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Convert raw bytes to a DNA sequence, four bases per byte
    Pack {
        #[command(flatten)]
        io: IoArgs,
        /// Bases per output line (0 = no wrapping)
        #[arg(short, long, default_value = "64")]
        wrap: usize,
        /// Bit assignment of the bases
        #[arg(long, value_enum, default_value = "acgt")]
        order: Order,
    },
    /// Convert a DNA sequence back to raw bytes
    Unpack {
        #[command(flatten)]
        io: IoArgs,
        /// Bit assignment of the bases
        #[arg(long, value_enum, default_value = "acgt")]
        order: Order,
    },
    /// XOR a file with a DNA key (one-time pad)
    Encrypt {
        plaintext: PathBuf,
        key: PathBuf,
        output: PathBuf,
    },
    /// Reverse `encrypt` with the same key
    Decrypt {
        ciphertext: PathBuf,
        key: PathBuf,
        output: PathBuf,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Codec settings shared by every image command. Flags override `--config`.
#[derive(Args)]
struct CodecArgs {
    /// TOML file with codec settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Block size in pixels
    #[arg(short = 'b', long)]
    block_size: Option<u32>,
    /// Number of block rows per block group
    #[arg(long)]
    rows: Option<u32>,
    /// Padding character
    #[arg(long)]
    pad: Option<char>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Acgt,
    Atcg,
}

impl From<Order> for BaseOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Acgt => BaseOrder::Acgt,
            Order::Atcg => BaseOrder::Atcg,
        }
    }
}

#[derive(Serialize)]
struct InspectReport {
    file: String,
    image_width: u32,
    image_height: u32,
    block_size: u32,
    blocks_per_row: u32,
    block_rows: u32,
    blocks: usize,
    bases: BaseCounts,
    padding: usize,
    sequence_length: usize,
}

#[derive(Serialize, Default)]
struct BaseCounts {
    a: usize,
    t: usize,
    c: usize,
    g: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Encode {
            io,
            codec,
            cols,
            opaque_pad,
        } => {
            let mut config = resolve_config(&codec)?;
            if let Some(cols) = cols {
                config.layout.blocks_per_row = cols;
            }
            if opaque_pad {
                config.transparent_padding = false;
            }
            config.validate()?;
            cmd_encode(&io, &config)
        }
        Command::Decode {
            io,
            codec,
            tolerance,
            strip_padding,
        } => {
            let mut config = resolve_config(&codec)?;
            if let Some(tolerance) = tolerance {
                config.tolerance = tolerance;
            }
            cmd_decode(&io, &config, strip_padding)
        }
        Command::Inspect {
            image,
            codec,
            tolerance,
            pretty,
        } => {
            let mut config = resolve_config(&codec)?;
            if let Some(tolerance) = tolerance {
                config.tolerance = tolerance;
            }
            cmd_inspect(&image, &config, pretty)
        }
        Command::Pack { io, wrap, order } => cmd_pack(&io, wrap, order.into()),
        Command::Unpack { io, order } => cmd_unpack(&io, order.into()),
        Command::Encrypt {
            plaintext,
            key,
            output,
        } => cmd_encrypt(&plaintext, &key, &output),
        Command::Decrypt {
            ciphertext,
            key,
            output,
        } => cmd_decrypt(&ciphertext, &key, &output),
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Start from `--config` (or defaults) and apply flag overrides.
fn resolve_config(args: &CodecArgs) -> Result<CodecConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let toml_str = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            CodecConfig::from_toml(&toml_str)
                .with_context(|| format!("parsing config from {}", path.display()))?
        }
        None => CodecConfig::default(),
    };
    if let Some(block_size) = args.block_size {
        config.layout.block_size = block_size;
    }
    if let Some(rows) = args.rows {
        config.layout.rows_per_block = rows;
    }
    if let Some(pad) = args.pad {
        config.padding = pad;
    }
    config.validate()?;
    debug!(?config, "resolved codec config");
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    let mut w = open_output(path)?;
    w.write_all(data).context("writing output")?;
    w.flush().context("flushing output")?;
    Ok(())
}

fn describe(path: Option<&Path>, stdio: &str) -> String {
    path.map_or_else(|| stdio.to_string(), |p| p.display().to_string())
}

fn cmd_encode(args: &IoArgs, config: &CodecConfig) -> Result<()> {
    let data = read_input(args.input.as_deref())?;
    let text = String::from_utf8(data).context("input sequence is not valid UTF-8")?;
    anyhow::ensure!(
        text.chars().any(|c| !c.is_ascii_whitespace()),
        "input sequence is empty"
    );

    let img = encode_sequence(&text, config)?;
    info!(
        "encoded {} as {}x{} image",
        describe(args.input.as_deref(), "stdin"),
        img.width,
        img.height
    );

    let mut w = open_output(args.output.as_deref())?;
    png_io::write_rgba_png(&mut w, &img)?;
    w.flush().context("flushing output")?;
    Ok(())
}

fn encode_sequence(text: &str, config: &CodecConfig) -> Result<dnapng::RgbaImage> {
    dnapng::encode(text, config).map_err(|err| {
        let context = match err {
            CodecError::InvalidSymbol { .. } => format!(
                "invalid DNA sequence: only A, T, C, G and {} are allowed",
                config.padding
            ),
            _ => "encoding sequence".to_string(),
        };
        anyhow::Error::new(err).context(context)
    })
}

fn load_image(path: Option<&Path>) -> Result<dnapng::RgbaImage> {
    let bytes = read_input(path)?;
    png_io::read_rgba_png(&bytes)
        .with_context(|| format!("loading image from {}", describe(path, "stdin")))
}

fn cmd_decode(args: &IoArgs, config: &CodecConfig, strip: bool) -> Result<()> {
    let img = load_image(args.input.as_deref())?;
    let sequence = Decoder::from_config(config)?
        .decode(&img)
        .context("decoding image")?;
    info!(
        "decoded {} blocks from {}x{} image",
        sequence.chars().count(),
        img.width,
        img.height
    );

    let out = if strip {
        strip_padding(&sequence, config.padding)
    } else {
        sequence.as_str()
    };
    write_output(args.output.as_deref(), out.as_bytes())
}

fn cmd_inspect(path: &Path, config: &CodecConfig, pretty: bool) -> Result<()> {
    let img = load_image(Some(path))?;
    let shape = Layout::grid_shape(img.width, img.height, config.layout.block_size)?;
    let sequence = Decoder::from_config(config)?
        .decode(&img)
        .context("decoding image")?;

    let mut bases = BaseCounts::default();
    let mut padding = 0;
    for c in sequence.chars() {
        match Base::from_char(c) {
            Some(Base::A) => bases.a += 1,
            Some(Base::T) => bases.t += 1,
            Some(Base::C) => bases.c += 1,
            Some(Base::G) => bases.g += 1,
            None => padding += 1,
        }
    }
    debug_assert_eq!(
        bases.a + bases.t + bases.c + bases.g + padding,
        shape.block_count()
    );

    let report = InspectReport {
        file: path.display().to_string(),
        image_width: img.width,
        image_height: img.height,
        block_size: config.layout.block_size,
        blocks_per_row: shape.blocks_per_row,
        block_rows: shape.block_rows,
        blocks: shape.block_count(),
        bases,
        padding,
        sequence_length: strip_padding(&sequence, config.padding).chars().count(),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_pack(args: &IoArgs, wrap: usize, order: BaseOrder) -> Result<()> {
    let data = read_input(args.input.as_deref())?;
    let sequence = pack::pack_bytes(&data, order);
    debug!(bytes = data.len(), bases = sequence.len(), "packed input");
    write_output(
        args.output.as_deref(),
        pack::wrap_lines(&sequence, wrap).as_bytes(),
    )
}

fn cmd_unpack(args: &IoArgs, order: BaseOrder) -> Result<()> {
    let data = read_input(args.input.as_deref())?;
    let text = String::from_utf8(data).context("input sequence is not valid UTF-8")?;
    let bytes = pack::unpack_bases(&text, order).context("decoding DNA sequence")?;
    debug!(bytes = bytes.len(), "unpacked input");
    write_output(args.output.as_deref(), &bytes)
}

fn read_key(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading key {}", path.display()))
}

fn cmd_encrypt(plaintext: &Path, key: &Path, output: &Path) -> Result<()> {
    let data = fs::read(plaintext)
        .with_context(|| format!("reading plaintext {}", plaintext.display()))?;
    let key = read_key(key)?;
    let cipher = otp::encrypt(&data, &key).context("encrypting")?;
    debug!(
        "plaintext as DNA (first 20 bases): {}",
        pack::pack_bytes(&data[..data.len().min(5)], BaseOrder::Atcg)
    );
    fs::write(output, cipher.as_bytes())
        .with_context(|| format!("writing {}", output.display()))?;
    info!("ciphertext ({} bases) saved to {}", cipher.len(), output.display());
    Ok(())
}

fn cmd_decrypt(ciphertext: &Path, key: &Path, output: &Path) -> Result<()> {
    let cipher = fs::read_to_string(ciphertext)
        .with_context(|| format!("reading ciphertext {}", ciphertext.display()))?;
    let key = read_key(key)?;
    let plain = otp::decrypt(&cipher, &key).context("decrypting")?;
    fs::write(output, &plain).with_context(|| format!("writing {}", output.display()))?;
    info!("plaintext ({} bytes) saved to {}", plain.len(), output.display());
    Ok(())
}
