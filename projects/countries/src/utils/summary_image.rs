use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::prelude::*;
use plotters::style::register_font;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::task::spawn_blocking;

use crate::db::country::models::Country;
use crate::store::{CountryStore, StoreError};

pub const CANVAS_WIDTH: u32 = 1000;
pub const CANVAS_HEIGHT: u32 = 600;

/// Number of ranked countries drawn on the summary.
pub const SUMMARY_TOP_N: usize = 5;

const HEADING_FONT_SIZE: u32 = 32;
const BODY_FONT_SIZE: u32 = 16;

/// Family the embedded face is registered under. Rendering never consults
/// system fonts.
const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

#[derive(Debug, Error)]
pub enum SummaryImageError {
    #[error("ReadStore: {source}")]
    ReadStore {
        #[from]
        source: StoreError,
    },
    #[error("CreateDirectory: {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: io::Error,
    },
    #[error("RegisterFont: embedded font could not be parsed")]
    RegisterFont,
    #[error("Draw: {message}")]
    Draw {
        message: String,
    },
    #[error("EncodePng: {source}")]
    EncodePng {
        #[from]
        source: image::ImageError,
    },
    #[error("WriteImage: {path}: {source}")]
    WriteImage {
        path: PathBuf,
        source: io::Error,
    },
    #[error("BlockingTask: {source}")]
    BlockingTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

/// One ranked line of the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub name: String,
    pub estimated_gdp: f64,
}

/// Everything the image shows, captured at read time.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub total_countries: i64,
    pub generated_at: DateTime<Utc>,
    pub top: Vec<SummaryEntry>,
}

impl SummarySnapshot {
    pub fn new(total_countries: i64, generated_at: DateTime<Utc>, top: &[Country]) -> Self {
        let top = top
            .iter()
            .filter_map(|c| {
                c.estimated_gdp.map(|gdp| SummaryEntry {
                    name: c.name.clone(),
                    estimated_gdp: gdp,
                })
            })
            .collect();

        Self { total_countries, generated_at, top }
    }
}

/// A positioned line of text on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size: u32,
}

pub fn layout(snapshot: &SummarySnapshot) -> Vec<TextLine> {
    let mut lines = vec![
        TextLine {
            text: format!("Total countries: {}", snapshot.total_countries),
            x: 20,
            y: 20,
            size: HEADING_FONT_SIZE,
        },
        TextLine {
            text: format!(
                "Generated at: {}",
                snapshot.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            x: 20,
            y: 80,
            size: BODY_FONT_SIZE,
        },
        TextLine {
            text: format!("Top {SUMMARY_TOP_N} by estimated GDP:"),
            x: 20,
            y: 140,
            size: HEADING_FONT_SIZE,
        },
    ];

    if snapshot.top.is_empty() {
        lines.push(TextLine {
            text: "No countries with an estimated GDP yet".to_string(),
            x: 40,
            y: 190,
            size: BODY_FONT_SIZE,
        });
    }

    for (idx, entry) in snapshot.top.iter().enumerate() {
        lines.push(TextLine {
            text: format!("{}. {} - {:.2}", idx + 1, entry.name, entry.estimated_gdp),
            x: 40,
            y: 190 + 40 * idx as i32,
            size: BODY_FONT_SIZE,
        });
    }

    lines
}

/// Renders the PNG summary to a fixed path and serves it back.
#[derive(Debug, Clone)]
pub struct SummaryImage {
    path: PathBuf,
}

impl SummaryImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the count and top entries from `store`, then renders them.
    pub async fn render_from_store<S: CountryStore>(
        &self,
        store: &S,
    ) -> Result<SummarySnapshot, SummaryImageError> {
        let status = store.status().await?;
        let top = store.top_by_estimated_gdp(SUMMARY_TOP_N).await?;
        let snapshot = SummarySnapshot::new(status.total_countries, Utc::now(), &top);

        self.render(snapshot.clone()).await?;
        Ok(snapshot)
    }

    pub async fn render(&self, snapshot: SummarySnapshot) -> Result<(), SummaryImageError> {
        let path = self.path.clone();
        spawn_blocking(move || draw_summary(&path, &snapshot, FONT_FAMILY)).await?
    }

    /// `Ok(None)` until the first successful render.
    pub async fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn draw_error<E>(err: DrawingAreaErrorKind<E>) -> SummaryImageError
where
    E: std::error::Error + Send + Sync,
{
    SummaryImageError::Draw { message: err.to_string() }
}

fn register_embedded_font() -> Result<(), SummaryImageError> {
    let registered = *FONT_REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if registered {
        Ok(())
    } else {
        Err(SummaryImageError::RegisterFont)
    }
}

/// Draws the whole canvas in memory and returns it PNG-encoded.
fn draw_png(snapshot: &SummarySnapshot, font_family: &str) -> Result<Vec<u8>, SummaryImageError> {
    register_embedded_font()?;

    let mut pixels = vec![0u8; (CANVAS_WIDTH * CANVAS_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (CANVAS_WIDTH, CANVAS_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        for line in layout(snapshot) {
            let style = (font_family, line.size).into_font().color(&BLACK);
            root.draw_text(&line.text, &style, (line.x, line.y))
                .map_err(draw_error)?;
        }

        root.present().map_err(draw_error)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&pixels, CANVAS_WIDTH, CANVAS_HEIGHT, ColorType::Rgb8)?;
    Ok(png)
}

/// Replaces `path` with `bytes` through a sibling temp file and a rename, so
/// readers see either the previous image or the new one.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), SummaryImageError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(|source| {
                SummaryImageError::CreateDirectory { path: parent.to_path_buf(), source }
            })?;
            parent
        }
        None => Path::new("."),
    };

    let write_error = |source: io::Error| SummaryImageError::WriteImage { path: path.to_path_buf(), source };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(bytes).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

fn draw_summary(
    path: &Path,
    snapshot: &SummarySnapshot,
    font_family: &str,
) -> Result<(), SummaryImageError> {
    let png = draw_png(snapshot, font_family)?;
    write_atomically(path, &png)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn snapshot(top: Vec<SummaryEntry>) -> SummarySnapshot {
        SummarySnapshot {
            total_countries: 250,
            generated_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            top,
        }
    }

    #[test]
    fn layout_ranks_entries_with_two_decimals() {
        let lines = layout(&snapshot(vec![
            SummaryEntry { name: "Testland".into(), estimated_gdp: 10_000_000.0 },
            SummaryEntry { name: "Otherland".into(), estimated_gdp: 1234.5 },
        ]));

        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "Total countries: 250",
                "Generated at: 2026-10-18T09:30:00Z",
                "Top 5 by estimated GDP:",
                "1. Testland - 10000000.00",
                "2. Otherland - 1234.50",
            ]
        );
        assert_eq!(lines[4].y, 230);
    }

    #[test]
    fn layout_notes_an_empty_ranking() {
        let lines = layout(&snapshot(Vec::new()));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].text, "No countries with an estimated GDP yet");
    }

    #[tokio::test]
    async fn read_before_render_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let image = SummaryImage::new(dir.path().join("missing.png"));
        assert!(image.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn render_creates_directory_and_png() {
        let dir = tempfile::tempdir().unwrap();
        let image = SummaryImage::new(dir.path().join("cache").join("summary.png"));

        image
            .render(snapshot(vec![SummaryEntry { name: "Testland".into(), estimated_gdp: 42.0 }]))
            .await
            .unwrap();

        let bytes = image.read().await.unwrap().expect("image written");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    fn entries_in(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[tokio::test]
    async fn failed_draw_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.png");

        let err = draw_summary(&path, &snapshot(Vec::new()), "no-such-family").unwrap_err();
        assert!(matches!(err, SummaryImageError::Draw { .. }));

        let image = SummaryImage::new(&path);
        assert!(image.read().await.unwrap().is_none());
        assert!(entries_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn failed_draw_keeps_the_previous_image() {
        let dir = tempfile::tempdir().unwrap();
        let image = SummaryImage::new(dir.path().join("summary.png"));
        image
            .render(snapshot(vec![SummaryEntry { name: "Testland".into(), estimated_gdp: 42.0 }]))
            .await
            .unwrap();
        let before = image.read().await.unwrap().expect("first render written");

        assert!(draw_summary(image.path(), &snapshot(Vec::new()), "no-such-family").is_err());

        assert_eq!(image.read().await.unwrap(), Some(before));
        assert_eq!(entries_in(dir.path()), [image.path().to_path_buf()]);
    }

    #[test]
    fn rerender_replaces_the_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.png");

        draw_summary(&path, &snapshot(Vec::new()), FONT_FAMILY).unwrap();
        let first = std::fs::read(&path).unwrap();
        draw_summary(
            &path,
            &snapshot(vec![SummaryEntry { name: "Testland".into(), estimated_gdp: 1.0 }]),
            FONT_FAMILY,
        )
        .unwrap();

        assert_ne!(std::fs::read(&path).unwrap(), first);
        assert_eq!(entries_in(dir.path()), [path]);
    }
}
