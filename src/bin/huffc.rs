use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use huffman_text::{compress_with_stats, decompress, load_tree, save_tree, Compressed, Framing};
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Compress and decompress text with a Huffman code", long_about = None)]
struct Args {
    /// Increase logging verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes <output_prefix>.huff and <output_prefix>.hufftree.
    Compress {
        input: PathBuf,
        output_prefix: PathBuf,

        /// Write the bare bit stream without a bit count header.
        #[arg(long)]
        legacy: bool,
    },
    /// Restores the original text from a .huff and .hufftree pair.
    Decompress {
        input: PathBuf,
        tree: PathBuf,
        output: PathBuf,

        /// The input has no bit count header.
        #[arg(long)]
        legacy: bool,
    },
}

fn framing(legacy: bool) -> Framing {
    if legacy {
        Framing::Legacy
    } else {
        Framing::Counted
    }
}

fn with_extension(prefix: &Path, ext: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .verbosity(2 + args.verbose as usize)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .context("cannot initialise logging")?;

    match args.command {
        Command::Compress {
            input,
            output_prefix,
            legacy,
        } => {
            let text = fs::read(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let (compressed, artifact, stats) = compress_with_stats(&text)
                .with_context(|| format!("cannot compress {}", input.display()))?;

            let huff_path = with_extension(&output_prefix, "huff");
            let mut out = BufWriter::new(
                File::create(&huff_path)
                    .with_context(|| format!("cannot create {}", huff_path.display()))?,
            );
            compressed.write_to(&mut out, framing(legacy))?;

            let tree_path = with_extension(&output_prefix, "hufftree");
            let mut out = BufWriter::new(
                File::create(&tree_path)
                    .with_context(|| format!("cannot create {}", tree_path.display()))?,
            );
            save_tree(&artifact, &mut out)?;
            out.flush()?;

            info!("original size: {} bits", stats.original_bits);
            info!("compressed size: {} bits", stats.compressed_bits);
            info!("compression ratio: {:.2}%", stats.ratio());
            info!(
                "wrote {} and {}",
                huff_path.display(),
                tree_path.display()
            );
        }
        Command::Decompress {
            input,
            tree,
            output,
            legacy,
        } => {
            let artifact = load_tree(BufReader::new(
                File::open(&tree).with_context(|| format!("cannot open {}", tree.display()))?,
            ))
            .with_context(|| format!("cannot load tree from {}", tree.display()))?;

            let compressed = Compressed::read_from(
                BufReader::new(
                    File::open(&input)
                        .with_context(|| format!("cannot open {}", input.display()))?,
                ),
                framing(legacy),
            )
            .with_context(|| format!("cannot read {}", input.display()))?;

            let text = decompress(&compressed, &artifact)
                .with_context(|| format!("cannot decompress {}", input.display()))?;
            fs::write(&output, &text)
                .with_context(|| format!("cannot write {}", output.display()))?;

            info!("decompressed {} bytes into {}", text.len(), output.display());
        }
    }

    Ok(())
}
