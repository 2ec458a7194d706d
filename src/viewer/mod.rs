//! Interactive QR viewer.
//!
//! Layout:
//!   rows 0..FORM_ROWS   : text field + level selector + size readout
//!   rows FORM_ROWS..    : the symbol (Kitty bitmap, or half-block text)
//!   row term_rows-1     : status bar
//!
//! Two-tier display:
//!   Every edit immediately shows the half-block rendition of the current
//!   request while the encode worker produces the PNG bitmap. The bitmap is
//!   placed only once its key still matches the current inputs, so rapid
//!   typing or resizing can never leave a mismatched symbol on screen.
//!
//! Kitty response suppression:
//!   All Kitty Graphics Protocol commands use `q=2` (suppress all
//!   responses). Without this, responses are delivered as APC sequences
//!   that crossterm misparses as key events.

mod input;
mod state;
mod terminal;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use log::{debug, info, warn};

use crate::config::Config;
use crate::encode;
use crate::generator::{CodeGenerator, Display};
use crate::permalink;
use crate::request::{GenerationRequest, Level};
use crate::size_mode::{SizeMode, SizeModeController};
use crate::watch::ResizeWatcher;

use input::{Action, map_key_event};
use terminal::QR_IMAGE_ID;

/// Manual size before the user ever enters one.
const DEFAULT_MANUAL_SIZE: u32 = 512;

pub struct ViewerOptions {
    pub initial_text: String,
    pub level: Level,
    /// `--size N`: start in manual mode at this size.
    pub manual_size: Option<u32>,
}

/// Run the interactive viewer until the user quits.
pub fn run(opts: ViewerOptions, config: &Config) -> anyhow::Result<()> {
    terminal::check_tty()?;

    let mut layout = terminal::query_layout()?;
    if !layout.has_pixels() {
        info!("viewer: no pixel geometry reported, staying on text rendition");
    }

    let mut guard = terminal::RawGuard::enter()?;

    let mut sizes = SizeModeController::new(
        config.rule.min_size,
        opts.manual_size.unwrap_or(DEFAULT_MANUAL_SIZE),
    );
    if opts.manual_size.is_some() {
        sizes.set_mode(SizeMode::Manual);
    }
    let mut watcher = ResizeWatcher::new(terminal::TerminalMeasure, config.rule);
    watcher.start(&mut sizes);

    let mut text = opts.initial_text;
    let mut level = opts.level;
    let mut generator = CodeGenerator::new();
    let mut flash: Option<String> = None;
    let mut last_saved: Option<PathBuf> = None;

    resubmit(&mut generator, &text, level, &sizes);
    redraw(&layout, &text, level, &sizes, &generator, flash.as_deref())?;

    let mut dirty = false;
    let mut last_render = Instant::now();

    loop {
        // Drain encode completions into the state machine.
        if generator.pump() {
            dirty = true;
        }

        let timeout = if dirty {
            config.viewer.frame_budget.saturating_sub(last_render.elapsed())
        } else if generator.is_pending() {
            // Wake soon to pick up the completion.
            Duration::from_millis(50)
        } else {
            Duration::from_secs(86400)
        };

        if event::poll(timeout)? {
            let ev = event::read()?;
            debug!("event: {ev:?}");

            match ev {
                Event::Key(key_event) => {
                    let had_flash = flash.take().is_some();

                    match map_key_event(key_event) {
                        Some(Action::Quit) => break,

                        Some(Action::Insert(c)) => {
                            text.push(c);
                            dirty = true;
                        }
                        Some(Action::Backspace) => {
                            text.pop();
                            dirty = true;
                        }
                        Some(Action::ClearText) => {
                            text.clear();
                            dirty = true;
                        }

                        Some(Action::CycleLevel) => {
                            level = level.cycle();
                            dirty = true;
                        }

                        Some(Action::ToggleSizeMode) => {
                            sizes.toggle_mode();
                            dirty = true;
                        }
                        Some(Action::SizeUp) => {
                            sizes.bump_manual(config.viewer.size_step as i32);
                            dirty = true;
                        }
                        Some(Action::SizeDown) => {
                            sizes.bump_manual(-(config.viewer.size_step as i32));
                            dirty = true;
                        }

                        Some(Action::CopyPermalink) => {
                            let url = permalink::share_url(&config.share_base, &text);
                            match terminal::send_osc52(&url) {
                                Ok(()) => flash = Some("Permalink copied".into()),
                                Err(e) => {
                                    warn!("OSC 52 failed: {e}");
                                    flash = Some("Copy failed".into());
                                }
                            }
                            dirty = true;
                        }

                        Some(Action::SavePng) => {
                            if let Display::Bitmap { png, .. } = generator.current_display() {
                                let path = &config.viewer.save_path;
                                match std::fs::write(path, png) {
                                    Ok(()) => {
                                        flash = Some(format!("Saved {}", path.display()));
                                        last_saved = Some(path.clone());
                                    }
                                    Err(e) => {
                                        warn!("save failed: {e}");
                                        flash = Some(format!("Save failed: {e}"));
                                    }
                                }
                            } else {
                                flash = Some("No bitmap to save yet".into());
                            }
                            dirty = true;
                        }

                        Some(Action::OpenPng) => {
                            match &last_saved {
                                Some(path) => {
                                    if let Err(e) = open::that_detached(path) {
                                        warn!("open failed: {e}");
                                        flash = Some("Open failed".into());
                                    }
                                }
                                None => flash = Some("Save first (^S)".into()),
                            }
                            dirty = true;
                        }

                        None => {
                            if had_flash {
                                dirty = true;
                            }
                        }
                    }
                }

                Event::Resize(..) => {
                    layout = terminal::query_layout()?;
                    watcher.trigger(&mut sizes);
                    dirty = true;
                }

                _ => {}
            }
            continue;
        }

        // poll timeout → frame budget elapsed, execute redraw
        if dirty {
            generator.pump();
            resubmit(&mut generator, &text, level, &sizes);
            redraw(&layout, &text, level, &sizes, &generator, flash.as_deref())?;
            dirty = false;
            last_render = Instant::now();
        }
    }

    watcher.stop();
    generator.dispose();
    guard.cleanup();
    Ok(())
}

/// Derive the current request and submit it. Invalid input is rejected here
/// at the boundary; the prior display stays up.
fn resubmit(generator: &mut CodeGenerator, text: &str, level: Level, sizes: &SizeModeController) {
    match GenerationRequest::new(text, level, sizes.effective_size()) {
        Ok(request) => generator.submit(request),
        Err(e) => debug!("request not submitted: {e}"),
    }
}

/// Full redraw: form + symbol + status bar.
fn redraw(
    layout: &state::Layout,
    text: &str,
    level: Level,
    sizes: &SizeModeController,
    generator: &CodeGenerator,
    flash: Option<&str>,
) -> anyhow::Result<()> {
    terminal::delete_all_images()?;
    terminal::clear_screen()?;
    terminal::draw_form(layout, text, level, sizes)?;

    match generator.current_display() {
        Display::Empty => terminal::draw_empty_hint(layout)?,
        Display::Fallback { request } => draw_fallback(layout, request)?,
        Display::Bitmap { request, png } => {
            if layout.has_pixels() {
                terminal::send_image(png, QR_IMAGE_ID)?;
                terminal::place_image(layout, request.size, QR_IMAGE_ID)?;
            } else {
                // No Kitty-usable geometry: the bitmap still exists for ^S,
                // but the screen keeps the text rendition.
                draw_fallback(layout, request)?;
            }
        }
    }

    terminal::draw_status_bar(layout, sizes, generator.is_pending(), flash)?;
    Ok(())
}

fn draw_fallback(layout: &state::Layout, request: &GenerationRequest) -> anyhow::Result<()> {
    match encode::render_cells(&request.text, request.level) {
        Ok(cells) => terminal::draw_cells(layout, &cells)?,
        // Oversized or otherwise unencodable text: leave the area blank,
        // the worker logs the definitive error.
        Err(e) => debug!("fallback rendition unavailable: {e}"),
    }
    Ok(())
}
