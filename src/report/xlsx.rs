use anyhow::{Context, Result};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};
use std::{borrow::Cow, path::Path};
use tracing::{info, instrument, warn};

use crate::process::RegionSheet;

/// Longest string a cell may hold.
const MAX_CELL_CHARS: usize = 32_767;

/// Write one sheet per region, header row first, in the given order.
///
/// Returns `false` without touching the disk when there is nothing to write.
#[instrument(level = "info", skip(sheets), fields(path = %path.display(), sheets = sheets.len()))]
pub fn write_workbook(path: &Path, sheets: &[RegionSheet]) -> Result<bool> {
    if sheets.is_empty() {
        info!("no matching region, workbook not written");
        return Ok(false);
    }

    let header_format = Format::new().set_bold();
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(sheet.sheet_name())
            .with_context(|| format!("naming sheet {}", sheet.sheet_name()))?;
        fill_sheet(ws, sheet, &header_format)
            .with_context(|| format!("filling sheet {}", sheet.sheet_name()))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("saving workbook {}", path.display()))?;
    info!("workbook written");
    Ok(true)
}

fn fill_sheet(ws: &mut Worksheet, sheet: &RegionSheet, header_format: &Format) -> Result<()> {
    for (c, header) in sheet.table.headers.iter().enumerate() {
        ws.write_string_with_format(0, col(c)?, excel_text(header), header_format)?;
    }
    for (r, row) in sheet.table.rows.iter().enumerate() {
        let r = RowNum::try_from(r + 1).context("too many rows for a sheet")?;
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            ws.write_string(r, col(c)?, excel_text(cell))?;
        }
    }
    ws.set_freeze_panes(1, 0)?;
    Ok(())
}

fn col(c: usize) -> Result<ColNum> {
    ColNum::try_from(c).context("too many columns for a sheet")
}

fn excel_text(cell: &str) -> Cow<'_, str> {
    if cell.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(cell);
    }
    warn!(chars = cell.chars().count(), "cell truncated to fit the sheet");
    Cow::Owned(cell.chars().take(MAX_CELL_CHARS).collect())
}
