use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::models::{Listing, COLUMNS};

/// `spacemarket_favorites_YYYYmmdd_HHMMSS.xlsx`
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("spacemarket_favorites_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

/// Header row followed by one row per listing
pub fn rows(listings: &[Listing]) -> Vec<[&str; 7]> {
    std::iter::once(COLUMNS)
        .chain(listings.iter().map(Listing::to_row))
        .collect()
}

/// Write the listings to an .xlsx workbook at `path`.
///
/// Nothing collected is an error: no file is created for an empty run.
pub fn write_workbook(listings: &[Listing], path: &Path) -> Result<PathBuf> {
    if listings.is_empty() {
        return Err(ScrapeError::Export("no favorites were collected".to_string()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                ScrapeError::Export(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (r, row) in rows(listings).iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if r == 0 {
                sheet.write_string_with_format(r as u32, c as u16, *value, &header)?;
            } else {
                sheet.write_string(r as u32, c as u16, *value)?;
            }
        }
    }

    workbook.save(path)?;
    info!("💾 Saved {} listings to {}", listings.len(), path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing(n: usize) -> Listing {
        Listing::from_parts(
            format!("Space {n}"),
            format!("¥{n},000"),
            String::new(),
            format!("https://www.spacemarket.com/spaces/{n}"),
            String::new(),
        )
        .unwrap()
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let err = write_workbook(&[], &path).unwrap_err();
        assert!(matches!(err, ScrapeError::Export(_)));
        assert!(!path.exists());
    }

    #[test]
    fn writes_header_plus_one_row_per_listing() {
        let listings: Vec<_> = (1..=3).map(listing).collect();

        let table = rows(&listings);
        assert_eq!(table.len(), 4);
        assert_eq!(table[0], COLUMNS);
        assert_eq!(table[2][0], "Space 2");
        assert_eq!(table[2][1], "¥2,000");
        assert_eq!(table[2][5], "https://www.spacemarket.com/spaces/2");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.xlsx");
        let written = write_workbook(&listings, &path).unwrap();
        assert_eq!(written, path);
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn file_name_carries_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(export_file_name(at), "spacemarket_favorites_20240309_070501.xlsx");
    }
}
