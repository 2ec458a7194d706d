//! Terminal I/O layer: raw mode, Kitty Graphics Protocol, form and status
//! rendering, OSC 52.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    style::{self, Stylize},
    terminal,
};
use std::io::{self, Write, stdout};

use super::state::{self, Layout};
use crate::probe::{LayoutSnapshot, Measure};
use crate::request::Level;
use crate::size_mode::{SizeMode, SizeModeController};

const CHUNK_SIZE: usize = 4096;

/// Kitty image ID for the QR bitmap. Re-transmitting under the same ID
/// replaces the previous symbol's data.
pub(super) const QR_IMAGE_ID: u32 = 1;

// ---------------------------------------------------------------------------
// RawGuard — restores raw mode / alternate screen / images via Drop
// ---------------------------------------------------------------------------

pub(super) struct RawGuard {
    cleaned: bool,
}

impl RawGuard {
    pub(super) fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        stdout().execute(terminal::EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        Ok(Self { cleaned: false })
    }

    pub(super) fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        let mut out = stdout();
        let _ = write!(out, "\x1b_Ga=d,d=A,q=2\x1b\\");
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Query the current layout. `window_size()` reports pixel dimensions on
/// Kitty-class terminals; elsewhere we fall back to cell counts only and the
/// viewer stays on the half-block rendition.
pub(super) fn query_layout() -> anyhow::Result<Layout> {
    match terminal::window_size() {
        Ok(ws) => Ok(state::compute_layout(ws.columns, ws.rows, ws.width, ws.height)),
        Err(_) => {
            let (cols, rows) = terminal::size()?;
            Ok(state::compute_layout(cols, rows, 0, 0))
        }
    }
}

/// `Measure` capability backed by a live terminal query.
pub(super) struct TerminalMeasure;

impl Measure for TerminalMeasure {
    fn measure(&self) -> Option<LayoutSnapshot> {
        query_layout().ok()?.snapshot()
    }
}

// ---------------------------------------------------------------------------
// Kitty protocol helpers
// ---------------------------------------------------------------------------

/// Transfer PNG data in chunks (a=t: data only, no placement). All commands
/// use q=2 to suppress responses, which crossterm would misparse as input.
pub(super) fn send_image(png_data: &[u8], image_id: u32) -> io::Result<()> {
    let encoded = BASE64.encode(png_data);
    let chunks: Vec<&[u8]> = encoded.as_bytes().chunks(CHUNK_SIZE).collect();

    let mut out = stdout();
    for (i, chunk) in chunks.iter().enumerate() {
        let is_last = i == chunks.len() - 1;
        let m = if is_last { 0 } else { 1 };
        let chunk = std::str::from_utf8(chunk).expect("base64 is ASCII");
        if i == 0 {
            write!(out, "\x1b_Ga=t,f=100,i={image_id},t=d,q=2,m={m};{chunk}\x1b\\")?;
        } else {
            write!(out, "\x1b_Gm={m},q=2;{chunk}\x1b\\")?;
        }
    }
    out.flush()
}

/// Place the transferred bitmap centered in the QR area, scaled to the
/// cell rectangle that corresponds to `size_px`.
pub(super) fn place_image(layout: &Layout, size_px: u32, image_id: u32) -> io::Result<()> {
    let cell_w = u32::from(layout.cell_w.max(1));
    let cell_h = u32::from(layout.cell_h.max(1));
    let cols = (size_px.div_ceil(cell_w) as u16).clamp(1, layout.term_cols.max(1));
    let rows = (size_px.div_ceil(cell_h) as u16).clamp(1, layout.qr_rows.max(1));
    let start_col = (layout.term_cols.saturating_sub(cols)) / 2;

    let mut out = stdout();
    out.queue(cursor::MoveTo(start_col, layout.anchor_row))?;
    write!(out, "\x1b_Ga=p,i={image_id},c={cols},r={rows},C=1,q=2\x1b\\")?;
    out.flush()
}

/// Delete all image data and placements.
pub(super) fn delete_all_images() -> io::Result<()> {
    let mut out = stdout();
    write!(out, "\x1b_Ga=d,d=A,q=2\x1b\\")?;
    out.flush()
}

/// Clear the text layer.
pub(super) fn clear_screen() -> io::Result<()> {
    let mut out = stdout();
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.flush()
}

// ---------------------------------------------------------------------------
// Form / symbol / status drawing
// ---------------------------------------------------------------------------

/// Draw the input form: text field on row 0, level selector and sizes on
/// row 1.
pub(super) fn draw_form(
    layout: &Layout,
    text: &str,
    level: Level,
    sizes: &SizeModeController,
) -> io::Result<()> {
    let mut out = stdout();
    let cols = layout.term_cols as usize;

    // Text field, tail-truncated so the caret stays visible while typing.
    let label = " Text: ";
    let budget = cols.saturating_sub(label.len() + 1);
    let shown: String = if text.chars().count() > budget {
        text.chars().skip(text.chars().count() - budget).collect()
    } else {
        text.to_string()
    };
    out.queue(cursor::MoveTo(0, 0))?;
    write!(out, "{label}{shown}{}", "▏".bold())?;

    // Level selector + size readout.
    out.queue(cursor::MoveTo(0, 1))?;
    write!(out, " Level:")?;
    for l in Level::ALL {
        if l == level {
            write!(out, " {}", format!("[{l}]").bold().reverse())?;
        } else {
            write!(out, "  {l} ")?;
        }
    }
    let auto_marker = if sizes.mode() == SizeMode::Auto { "*" } else { " " };
    let manual_marker = if sizes.mode() == SizeMode::Manual { "*" } else { " " };
    write!(
        out,
        "   Size: {auto_marker}auto {}px  {manual_marker}manual {}px",
        sizes.auto_size(),
        sizes.manual_size(),
    )?;
    out.queue(style::ResetColor)?;
    out.flush()
}

/// Print the half-block symbol centered in the QR area, clipped to fit.
pub(super) fn draw_cells(layout: &Layout, cells: &str) -> io::Result<()> {
    let mut out = stdout();
    let width = cells.lines().next().map_or(0, |l| l.chars().count());
    let start_col = (layout.term_cols as usize).saturating_sub(width) as u16 / 2;

    for (i, line) in cells.lines().enumerate() {
        if i as u16 >= layout.qr_rows {
            break;
        }
        out.queue(cursor::MoveTo(start_col, layout.anchor_row + i as u16))?;
        let clipped: String = line.chars().take(layout.term_cols as usize).collect();
        write!(out, "{clipped}")?;
    }
    out.flush()
}

/// Empty-state hint shown when there is no text.
pub(super) fn draw_empty_hint(layout: &Layout) -> io::Result<()> {
    let mut out = stdout();
    let hint = "Type to generate a QR code";
    let start_col = (layout.term_cols as usize).saturating_sub(hint.len()) as u16 / 2;
    let row = layout.anchor_row + layout.qr_rows / 2;
    out.queue(cursor::MoveTo(start_col, row))?;
    write!(out, "{}", hint.dark_grey())?;
    out.queue(style::ResetColor)?;
    out.flush()
}

/// Status bar on the last terminal row.
///
/// `pending`: an encode is in flight (the bitmap has not caught up yet)
/// `flash`: transient message (save/copy feedback), cleared on next keypress
pub(super) fn draw_status_bar(
    layout: &Layout,
    sizes: &SizeModeController,
    pending: bool,
    flash: Option<&str>,
) -> io::Result<()> {
    let mut out = stdout();
    out.queue(cursor::MoveTo(0, layout.status_row))?;

    let mode = match sizes.mode() {
        SizeMode::Auto => "auto",
        SizeMode::Manual => "manual",
    };
    let spinner = if pending { " ~" } else { "" };

    let middle = if let Some(msg) = flash {
        format!(" {msg} | {}px {mode}{spinner}", sizes.effective_size())
    } else {
        format!(
            " {}px {mode}{spinner}  [^L:level Tab:size-mode ↑/↓:size ^Y:copy-link ^S:save ^O:open ^U:clear Esc:quit]",
            sizes.effective_size()
        )
    };

    let padded = format!("{:<width$}", middle, width = layout.term_cols as usize);
    write!(out, "{}", padded.on_dark_grey().white())?;
    out.queue(style::ResetColor)?;
    out.flush()
}

/// Send text to the system clipboard via OSC 52.
pub(super) fn send_osc52(text: &str) -> io::Result<()> {
    let encoded = BASE64.encode(text.as_bytes());
    let mut out = stdout();
    write!(out, "\x1b]52;c;{encoded}\x1b\\")?;
    out.flush()
}

pub(super) fn check_tty() -> anyhow::Result<()> {
    use std::io::IsTerminal;
    // Only stdout matters. crossterm's `use-dev-tty` reads keyboard from
    // /dev/tty, so stdin being a pipe is always fine.
    if !io::stdout().is_terminal() {
        anyhow::bail!(
            "qrview requires an interactive terminal.\n\
             \n\
             Bitmap display needs Kitty graphics (Kitty, Ghostty, WezTerm);\n\
             other terminals get the text rendition.\n\
             To write a PNG non-interactively, use: qrview render <text> -o qr.png"
        );
    }
    Ok(())
}
