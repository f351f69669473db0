// src/selection_logic.rs
// Pure selection state; no window dependency here. The overlay in selection.rs
// turns minifb input into PointerEvents and feeds them through a Selector.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::constants::{
    FIXED_RATIO_INITIAL_WIDTH, FIXED_RATIO_MIN_WIDTH, MIN_SELECTION_SIZE, ZOOM_IN_FACTOR,
    ZOOM_OUT_FACTOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// 矩形选区结构体
///
/// Always normalized: `x1 <= x2` and `y1 <= y2`. Confirmed selections are
/// strictly non-empty; live previews may be degenerate.
pub struct Rect {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Rect {
    /// Builds the rectangle spanned by two corners, in any drag direction.
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        Rect {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Live `WxH` annotation drawn next to the rectangle.
    pub fn size_label(&self) -> String {
        format!("{}x{}", self.width(), self.height())
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x1, self.y1, self.x2, self.y2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatioError {
    #[error("Invalid ratio format {0:?}, expected W:H such as 16:9")]
    InvalidRatioFormat(String),
}

/// 固定宽高比，例如 16:9
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    width: f64,
    height: f64,
}

impl AspectRatio {
    /// `W / H`
    pub fn value(&self) -> f64 {
        self.width / self.height
    }
}

impl FromStr for AspectRatio {
    type Err = RatioError;

    /// Accepts `W:H` with an ASCII or full-width colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RatioError::InvalidRatioFormat(s.to_string());
        let normalized = s.trim().replace('：', ":");

        let mut parts = normalized.split(':');
        let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let parse_side = |side: &str| {
            side.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
        };
        match (parse_side(w), parse_side(h)) {
            (Some(width), Some(height)) => Ok(AspectRatio { width, height }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// What the user asked for before the ratio text is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    FreeForm,
    FixedRatio,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMode {
    FreeForm,
    FixedRatio(AspectRatio),
}

impl SelectionMode {
    /// The ratio text is only consulted for fixed-ratio selections.
    pub fn resolve(kind: SelectionKind, ratio_text: &str) -> Result<Self, RatioError> {
        match kind {
            SelectionKind::FreeForm => Ok(SelectionMode::FreeForm),
            SelectionKind::FixedRatio => Ok(SelectionMode::FixedRatio(ratio_text.parse()?)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: i32, y: i32 },
    Drag { x: i32, y: i32 },
    Up { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    /// Positive delta scrolls up (zoom in), negative scrolls down.
    Scroll { x: i32, y: i32, delta: f32 },
    Click { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorUpdate {
    /// Event had no effect on the selection.
    Unchanged,
    /// Redraw the live rectangle.
    Preview(Rect),
    /// A drag ended below the minimum size; the selector stays active.
    Discarded,
    Confirmed(Rect),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSettings {
    pub min_size: i32,
    pub min_fixed_width: f64,
    pub initial_fixed_width: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        SelectionSettings {
            min_size: MIN_SELECTION_SIZE,
            min_fixed_width: FIXED_RATIO_MIN_WIDTH,
            initial_fixed_width: FIXED_RATIO_INITIAL_WIDTH,
            zoom_in_factor: ZOOM_IN_FACTOR,
            zoom_out_factor: ZOOM_OUT_FACTOR,
        }
    }
}

/// 自由拖拽选区
#[derive(Debug, Clone, PartialEq)]
pub struct FreeFormSelector {
    start: Option<(i32, i32)>,
    min_size: i32,
}

impl FreeFormSelector {
    pub fn new(min_size: i32) -> Self {
        FreeFormSelector { start: None, min_size }
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectorUpdate {
        match event {
            PointerEvent::Down { x, y } => {
                self.start = Some((x, y));
                SelectorUpdate::Preview(Rect::from_corners((x, y), (x, y)))
            }
            PointerEvent::Drag { x, y } => match self.start {
                Some(start) => SelectorUpdate::Preview(Rect::from_corners(start, (x, y))),
                None => SelectorUpdate::Unchanged,
            },
            PointerEvent::Up { x, y } => {
                let Some(start) = self.start.take() else {
                    return SelectorUpdate::Unchanged;
                };

                let rect = Rect::from_corners(start, (x, y));
                if rect.width() < self.min_size || rect.height() < self.min_size {
                    debug!("discarding {} drag below {}px", rect.size_label(), self.min_size);
                    SelectorUpdate::Discarded
                } else {
                    SelectorUpdate::Confirmed(rect)
                }
            }
            _ => SelectorUpdate::Unchanged,
        }
    }
}

/// 固定比例选区：跟随鼠标移动，滚轮缩放，单击确认
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRatioSelector {
    ratio: AspectRatio,
    width: f64,
    min_width: f64,
    max_width: f64,
    zoom_in: f64,
    zoom_out: f64,
}

impl FixedRatioSelector {
    pub fn new(ratio: AspectRatio, screen: ScreenSize, settings: &SelectionSettings) -> Self {
        let min_width = settings.min_fixed_width;
        let max_width = (screen.width as f64).max(min_width);
        FixedRatioSelector {
            ratio,
            width: settings.initial_fixed_width.clamp(min_width, max_width),
            min_width,
            max_width,
            zoom_in: settings.zoom_in_factor,
            zoom_out: settings.zoom_out_factor,
        }
    }

    pub fn ratio(&self) -> AspectRatio {
        self.ratio
    }

    /// Pixel size of the rectangle; height follows the rounded width.
    pub fn size(&self) -> (i32, i32) {
        let w = self.width.round() as i32;
        let h = ((w as f64 / self.ratio.value()).round() as i32).max(1);
        (w, h)
    }

    fn rect_at(&self, (cx, cy): (i32, i32)) -> Rect {
        let (w, h) = self.size();
        let x1 = cx - w / 2;
        let y1 = cy - h / 2;
        Rect::from_corners((x1, y1), (x1 + w, y1 + h))
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectorUpdate {
        match event {
            PointerEvent::Move { x, y } | PointerEvent::Drag { x, y } => {
                SelectorUpdate::Preview(self.rect_at((x, y)))
            }
            PointerEvent::Scroll { x, y, delta } => {
                if delta > 0.0 {
                    self.width *= self.zoom_in;
                } else if delta < 0.0 {
                    self.width *= self.zoom_out;
                }
                self.width = self.width.clamp(self.min_width, self.max_width);
                SelectorUpdate::Preview(self.rect_at((x, y)))
            }
            PointerEvent::Click { x, y } => SelectorUpdate::Confirmed(self.rect_at((x, y))),
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => SelectorUpdate::Unchanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    FreeForm(FreeFormSelector),
    FixedRatio(FixedRatioSelector),
}

impl Selector {
    pub fn new(mode: SelectionMode, screen: ScreenSize, settings: &SelectionSettings) -> Self {
        match mode {
            SelectionMode::FreeForm => Selector::FreeForm(FreeFormSelector::new(settings.min_size)),
            SelectionMode::FixedRatio(ratio) => {
                Selector::FixedRatio(FixedRatioSelector::new(ratio, screen, settings))
            }
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectorUpdate {
        match self {
            Selector::FreeForm(s) => s.handle(event),
            Selector::FixedRatio(s) => s.handle(event),
        }
    }
}
