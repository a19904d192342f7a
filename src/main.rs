//! Command-line driver for zipview.
//!
//! Loads the archive (memory-mapped or fetched over HTTP), then lists,
//! tests or extracts its members.

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, warn};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

use zipview::cli::base_name;
use zipview::{Cli, Entry, ZipArchive, io};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let buffer = io::load(&cli.file)
        .await
        .with_context(|| format!("cannot read {}", cli.file))?;
    let archive = ZipArchive::new(&buffer)
        .with_context(|| format!("{}: cannot locate end of central directory", cli.file))?;
    debug!(
        "{}: {} entries, EOCD at offset {}",
        cli.file,
        archive.len(),
        archive.eocd_offset()
    );

    if cli.comment {
        println!("{}", String::from_utf8_lossy(archive.comment().as_bytes()));
        if !(cli.list || cli.verbose || cli.test) {
            return Ok(());
        }
    }

    if cli.list || cli.verbose {
        list_files(&archive, cli.verbose)
    } else if cli.test {
        test_archive(&archive, &cli)
    } else {
        extract_files(&archive, &cli).await
    }
}

fn list_files(archive: &ZipArchive<'_>, verbose: bool) -> Result<()> {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  {:>8}  Name",
            "Length", "Size", "Cmpr", "Date", "Time", "CRC-32"
        );
        println!("{}", "-".repeat(80));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in archive.entries() {
        let entry = entry.context("reading central directory")?;

        if !verbose {
            println!("{}", entry.name());
            continue;
        }

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _) = entry.mod_time();
        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {:08x}  {}",
            entry.uncompressed_size(),
            entry.compressed_size(),
            ratio(entry.compressed_size(), entry.uncompressed_size()),
            year,
            month,
            day,
            hour,
            minute,
            entry.crc32(),
            entry.name()
        );

        if !entry.is_directory() {
            total_uncompressed += entry.uncompressed_size();
            total_compressed += entry.compressed_size();
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(80));
        println!(
            "{:>10}  {:>10}  {}  {:>31}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
    }

    Ok(())
}

/// Space saved by compression, as a right-aligned percentage.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - compressed * 100 / uncompressed)
    } else {
        "  0%".to_string()
    }
}

fn test_archive(archive: &ZipArchive<'_>, cli: &Cli) -> Result<()> {
    let mut failures = 0usize;

    for entry in archive.entries() {
        let entry = entry.context("reading central directory")?;
        if entry.is_directory() || !cli.selects(&entry.name()) {
            continue;
        }

        match archive.extract_with(&entry, |_| {}) {
            Ok(_) => {
                if !cli.is_quiet() {
                    println!("    testing: {:<40}  OK", entry.name());
                }
            }
            Err(e) => {
                failures += 1;
                println!("    testing: {:<40}  {}", entry.name(), e.root());
            }
        }
    }

    if failures > 0 {
        bail!("{failures} error(s) detected in {}", cli.file);
    }
    if !cli.is_very_quiet() {
        println!("No errors detected in compressed data of {}.", cli.file);
    }
    Ok(())
}

async fn extract_files(archive: &ZipArchive<'_>, cli: &Cli) -> Result<()> {
    let entries = archive
        .entries()
        .collect::<zipview::Result<Vec<_>>>()
        .context("reading central directory")?;

    let selected: Vec<_> = entries
        .iter()
        .filter(|e| !e.is_directory() && cli.selects(&e.name()))
        .collect();

    let show_filename = cli.pipe && selected.len() > 1;
    for entry in selected {
        extract_file(archive, entry, cli, show_filename)
            .await
            .with_context(|| format!("entry {} ({})", entry.index, entry.name()))?;
    }

    Ok(())
}

async fn extract_file(
    archive: &ZipArchive<'_>,
    entry: &Entry<'_>,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    let name = entry.name();

    if cli.pipe {
        let content = archive.extract_to_vec(entry)?;
        let mut stdout = tokio::io::stdout();
        if show_filename {
            stdout
                .write_all(format!("--- {name} ---\n").as_bytes())
                .await?;
        }
        stdout.write_all(&content).await?;
        stdout.flush().await?;
        return Ok(());
    }

    let Some(output_path) = output_path(&name, cli) else {
        warn!("Skipping {name}: path escapes the extraction directory");
        return Ok(());
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {name} (file exists)");
            }
            return Ok(());
        }
        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {name} (use -o to overwrite)");
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  inflating: {}", output_path.display());
    }

    let content = archive.extract_to_vec(entry)?;
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output_path, content)
        .await
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    Ok(())
}

/// Destination for a member, or `None` for absolute or `..` names.
fn output_path(name: &str, cli: &Cli) -> Option<PathBuf> {
    let relative = if cli.junk_paths { base_name(name) } else { name };
    let relative = Path::new(relative);

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    Some(match &cli.extract_dir {
        Some(dir) => Path::new(dir).join(relative),
        None => relative.to_path_buf(),
    })
}
