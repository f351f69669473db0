// src/selection.rs
// Full-screen minifb overlay: shows a frozen screenshot, turns mouse input into
// PointerEvents for the session and draws whatever selection it reports back.

use anyhow::Result;
use image::RgbaImage;
use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};

use rsgif::constants::colors;
use rsgif::i18n::{text, Text};
use rsgif::selection_logic::{PointerEvent, Rect, SelectorUpdate};
use rsgif::{SessionController, SessionState};

use crate::draw::{draw_label, LABEL_HEIGHT};
use crate::ui::Presenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayExit {
    Confirmed,
    Cancelled,
}

/// Runs until the selection is confirmed or cancelled (Esc / window closed).
pub fn run_overlay(
    controller: &mut SessionController,
    presenter: &mut Presenter,
    screenshot: &RgbaImage,
) -> Result<OverlayExit> {
    let (w, h) = (screenshot.width() as usize, screenshot.height() as usize);
    let base: Vec<u32> = screenshot
        .pixels()
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect();
    let mut buffer = base.clone();

    let title = text(presenter.lang(), Text::SelectHint);
    let mut window = Window::new(
        title,
        w,
        h,
        WindowOptions { borderless: true, topmost: true, ..WindowOptions::default() },
    )?;
    window.set_target_fps(60);

    let mut was_down = false;
    let mut last_pos: Option<(i32, i32)> = None;
    let mut shown_title = title.to_string();

    while window.is_open() && controller.state() == SessionState::Selecting {
        if window.is_key_down(Key::Escape) {
            break;
        }

        for event in pointer_events(&window, &mut was_down, &mut last_pos) {
            if let SelectorUpdate::Confirmed(_) = controller.pointer(event) {
                presenter.drain();
                return Ok(OverlayExit::Confirmed);
            }
        }
        presenter.drain();

        let label = presenter.selection_label().unwrap_or(title);
        if label != shown_title {
            window.set_title(label);
            shown_title = label.to_string();
        }

        draw_overlay(&mut buffer, &base, w, h, presenter.preview());
        window.update_with_buffer(&buffer, w, h)?;
    }

    controller.cancel_selection();
    presenter.drain();
    Ok(OverlayExit::Cancelled)
}

/// Derives down/drag/up/move/scroll/click from minifb's polled mouse state.
/// The selector ignores whichever kinds its mode does not use.
fn pointer_events(
    window: &Window,
    was_down: &mut bool,
    last_pos: &mut Option<(i32, i32)>,
) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    let down = window.get_mouse_down(MouseButton::Left);

    if let Some((mx, my)) = window.get_mouse_pos(MouseMode::Clamp) {
        let (x, y) = (mx as i32, my as i32);
        let moved = *last_pos != Some((x, y));

        match (*was_down, down) {
            (false, true) => events.push(PointerEvent::Down { x, y }),
            (true, true) if moved => events.push(PointerEvent::Drag { x, y }),
            (true, false) => {
                events.push(PointerEvent::Up { x, y });
                events.push(PointerEvent::Click { x, y });
            }
            (false, false) if moved => events.push(PointerEvent::Move { x, y }),
            _ => {}
        }

        if let Some((_, dy)) = window.get_scroll_wheel() {
            if dy != 0.0 {
                events.push(PointerEvent::Scroll { x, y, delta: dy });
            }
        }
        *last_pos = Some((x, y));
    }

    *was_down = down;
    events
}

fn dim(pix: u32) -> u32 {
    (pix >> 1) & 0x7F7F7F
}

/// 在缓冲区绘制半透明遮罩、选区边框和尺寸标签
pub fn draw_overlay(
    buffer: &mut [u32],
    base: &[u32],
    width: usize,
    height: usize,
    selection: Option<(Rect, &str)>,
) {
    // 整体遮罩：暗化图像 50%
    for (dst, src) in buffer.iter_mut().zip(base) {
        *dst = dim(*src);
    }

    let Some((rect, label)) = selection else {
        return;
    };

    let x0 = rect.x1().clamp(0, width as i32 - 1) as usize;
    let y0 = rect.y1().clamp(0, height as i32 - 1) as usize;
    let x1 = rect.x2().clamp(0, width as i32 - 1) as usize;
    let y1 = rect.y2().clamp(0, height as i32 - 1) as usize;

    // 反遮罩：选区内恢复原图
    for y in y0..y1 {
        let row = y * width;
        buffer[row + x0..row + x1].copy_from_slice(&base[row + x0..row + x1]);
    }

    // 边框
    for x in x0..=x1 {
        buffer[y0 * width + x] = colors::BORDER;
        buffer[y1 * width + x] = colors::BORDER;
    }
    for y in y0..=y1 {
        buffer[y * width + x0] = colors::BORDER;
        buffer[y * width + x1] = colors::BORDER;
    }

    // 尺寸标签放在选区左上角外侧，贴近屏幕顶部时放进选区内
    let label_y = if rect.y1() - LABEL_HEIGHT >= 0 {
        rect.y1() - LABEL_HEIGHT
    } else {
        rect.y1() + 1
    };
    draw_label(buffer, width, height, rect.x1().max(0), label_y, label);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_interior_is_not_dimmed() {
        let (w, h) = (40, 30);
        let base = vec![0x808080; w * h];
        let mut buffer = vec![0; w * h];
        let rect = Rect::from_corners((5, 20), (25, 28));

        draw_overlay(&mut buffer, &base, w, h, Some((rect, "")));

        assert_eq!(buffer[0], 0x404040);
        assert_eq!(buffer[26 * w + 20], 0x808080);
        assert_eq!(buffer[20 * w + 10], colors::BORDER);
        assert_eq!(buffer[24 * w + 25], colors::BORDER);
    }

    #[test]
    fn no_selection_dims_everything() {
        let base = vec![0xFFFFFF; 16];
        let mut buffer = vec![0; 16];
        draw_overlay(&mut buffer, &base, 4, 4, None);
        assert!(buffer.iter().all(|&p| p == 0x7F7F7F));
    }
}
