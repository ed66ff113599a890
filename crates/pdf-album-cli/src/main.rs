mod logger;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pdf_album::{
    AlbumSettings, ContentKind, ContentUnit, DiscoverOptions, FolderHandle, LocalFolderStore,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdfalbum", about = "Story folder to PDF album tool", version)]
struct Cli {
    /// Directory the story folders live in
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Story folder, relative to the root
    #[arg(short, long, default_value = ".", global = true)]
    folder: String,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the story units in order
    List {
        /// Show the content of text units
        #[arg(long)]
        hydrate_text: bool,
    },

    /// Assemble the story into size-limited PDF albums
    Build {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output file name prefix
        #[arg(long, default_value = "album")]
        prefix: String,

        /// JSON settings file; flags below override it
        #[arg(long)]
        settings: Option<PathBuf>,

        /// JPEG quality for images (1-100)
        #[arg(long)]
        quality: Option<u8>,

        /// Maximum size of each album in megabytes
        #[arg(long)]
        max_size_mb: Option<f64>,

        /// Page margin in mm
        #[arg(long)]
        margin_mm: Option<f32>,
    },

    /// Split a multi-page PDF unit into one unit per page
    Split {
        /// File name of the PDF unit
        filename: String,
    },

    /// Create a text unit (name it `*.h1.txt` or `*.h2.txt` for headings)
    AddText {
        /// File name of the new unit
        name: String,

        /// Text content
        content: String,

        /// Insert after this unit instead of at the end
        #[arg(long)]
        after: Option<String>,
    },

    /// Drop units from the saved order. The files stay in the folder and are
    /// listed after the ordered units.
    Remove {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    /// Move units to the front of the story, in the given order
    Reorder {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
}

/// Run a blocking core call off the async runtime
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> pdf_album::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

fn position_of(units: &[ContentUnit], name: &str) -> Result<usize> {
    units
        .iter()
        .position(|u| u.filename == name)
        .with_context(|| format!("No unit named {} in this story", name))
}

async fn load_settings(
    path: Option<&Path>,
    quality: Option<u8>,
    max_size_mb: Option<f64>,
    margin_mm: Option<f32>,
) -> Result<AlbumSettings> {
    let mut settings = match path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            AlbumSettings::from_json(&json)?
        }
        None => AlbumSettings::default(),
    };

    if let Some(quality) = quality {
        settings.image_quality = quality;
    }
    if let Some(mb) = max_size_mb {
        settings = settings.with_max_megabytes(mb);
    }
    if let Some(margin) = margin_mm {
        settings.margin_mm = margin;
    }

    settings.validate()?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::new(cli.verbose).init()?;

    let store = LocalFolderStore::new(&cli.root);
    let folder = FolderHandle(cli.folder.clone());

    match cli.command {
        Commands::List { hydrate_text } => {
            let options = DiscoverOptions { hydrate_text };
            let units = blocking(move || {
                pdf_album::discover_content_with(&store, &folder, &options)
            })
            .await?;

            for (i, unit) in units.iter().enumerate() {
                println!("{:>4}  {:<5}  {}", i + 1, unit.kind, unit.filename);
                if let Some(text) = &unit.text_content {
                    for line in text.lines() {
                        println!("               | {}", line);
                    }
                }
            }
            println!("{} units", units.len());
        }

        Commands::Build {
            output,
            prefix,
            settings,
            quality,
            max_size_mb,
            margin_mm,
        } => {
            let settings = load_settings(settings.as_deref(), quality, max_size_mb, margin_mm).await?;

            let set = blocking(move || {
                let units = pdf_album::discover_content(&store, &folder)?;
                pdf_album::assemble_albums(&store, &units, &settings, |fraction, message| {
                    println!("[{:>3.0}%] {}", fraction * 100.0, message);
                })
            })
            .await?;

            for skipped in &set.skipped {
                println!("Skipped {}: {}", skipped.filename, skipped.reason);
            }
            for page in &set.oversized {
                println!(
                    "Warning: a page of {} is {:.1} MB on its own (album {})",
                    page.filename,
                    page.bytes as f64 / (1024.0 * 1024.0),
                    page.album_index + 1
                );
            }

            if set.albums.is_empty() {
                println!("Nothing to build");
                return Ok(());
            }

            tokio::fs::create_dir_all(&output)
                .await
                .with_context(|| format!("Failed to create {}", output.display()))?;

            for (i, album) in set.albums.iter().enumerate() {
                let path = output.join(format!("{}_{:02}.pdf", prefix, i + 1));
                tokio::fs::write(&path, &album.bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "Album {} → {} ({} pages, {:.1} MB)",
                    i + 1,
                    path.display(),
                    album.page_count,
                    album.size() as f64 / (1024.0 * 1024.0)
                );
            }
        }

        Commands::Split { filename } => {
            let mut units = {
                let (store, folder) = (store.clone(), folder.clone());
                blocking(move || pdf_album::discover_content(&store, &folder)).await?
            };
            let index = position_of(&units, &filename)?;
            let unit = units[index].clone();
            if unit.kind != ContentKind::Pdf {
                bail!("{} is not a PDF", filename);
            }

            let pages = blocking(move || {
                let pages = pdf_album::split_pdf_unit(&store, &folder, &unit)?;
                pdf_album::replace_with_split(&mut units, index, pages.clone());
                pdf_album::persist_order(&store, &folder, &units)?;
                Ok(pages)
            })
            .await?;

            for page in &pages {
                println!("  {}", page.filename);
            }
            println!("Split {} into {} pages", filename, pages.len());
        }

        Commands::AddText {
            name,
            content,
            after,
        } => {
            let created = blocking(move || {
                let mut units = pdf_album::discover_content(&store, &folder)?;
                let position = after.as_deref().and_then(|anchor| {
                    units.iter().position(|u| u.filename == anchor).map(|i| i + 1)
                });
                if position.is_none() && after.is_some() {
                    log::warn!("Anchor unit not found, appending {}", name);
                }

                let unit = pdf_album::create_text_unit(&store, &folder, &name, &content)?;
                let filename = unit.filename.clone();
                pdf_album::insert_unit(&mut units, position, unit);
                pdf_album::persist_order(&store, &folder, &units)?;
                Ok(filename)
            })
            .await?;

            println!("Added {}", created);
        }

        Commands::Remove { names } => {
            let mut units = {
                let (store, folder) = (store.clone(), folder.clone());
                blocking(move || pdf_album::discover_content(&store, &folder)).await?
            };
            let indices = names
                .iter()
                .map(|name| position_of(&units, name))
                .collect::<Result<Vec<_>>>()?;

            let removed = pdf_album::remove_units(&mut units, &indices);
            blocking(move || pdf_album::persist_order(&store, &folder, &units)).await?;

            for unit in &removed {
                println!("Removed {}", unit.filename);
            }
        }

        Commands::Reorder { names } => {
            let mut units = {
                let (store, folder) = (store.clone(), folder.clone());
                blocking(move || pdf_album::discover_content(&store, &folder)).await?
            };

            let mut picked = Vec::with_capacity(names.len());
            for name in &names {
                let index = position_of(&units, name)?;
                picked.extend(pdf_album::remove_units(&mut units, &[index]));
            }
            pdf_album::paste_units(&mut units, picked, None);

            let count = units.len();
            blocking(move || pdf_album::persist_order(&store, &folder, &units)).await?;
            println!("Saved order of {} units", count);
        }
    }

    Ok(())
}
