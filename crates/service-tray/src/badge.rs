//! Procedural tray icons: a white glyph with a coloured status badge.

use crate::{AppError, AppResult};

use service_tray_core::{IndicatorImage, ServiceState};

use image::{Rgba, RgbaImage};
use tray_icon::Icon;

/// Icon edge length in pixels.
pub(crate) const ICON_SIZE: u32 = 64;

pub(crate) const COLOR_RUNNING: Rgba<u8> = Rgba([46, 204, 113, 255]);
pub(crate) const COLOR_STOPPED: Rgba<u8> = Rgba([231, 76, 60, 255]);
pub(crate) const COLOR_TRANSITION: Rgba<u8> = Rgba([241, 196, 15, 255]);
pub(crate) const COLOR_ERROR: Rgba<u8> = Rgba([155, 89, 182, 255]);
pub(crate) const COLOR_OUTLINE: Rgba<u8> = Rgba([20, 20, 20, 255]);
pub(crate) const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const GLYPH_STROKE: f32 = 3.0;
const BADGE_OUTLINE: f32 = 4.0;
const DIM_DOT_ALPHA: u8 = 150;
const DEGREES_PER_FRAME: f32 = 45.0;

/// Badge geometry, derived from the icon size.
#[derive(Debug, Clone, Copy)]
struct Badge {
    cx: f32,
    cy: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    size: u32,
}

impl Badge {
    fn for_size(size: u32) -> Self {
        // 45% of the icon, anchored bottom-right.
        let badge = size * 45 / 100;
        let x1 = (size - badge) as f32;
        let x2 = size as f32;
        Self {
            cx: (x1 + x2) / 2.0,
            cy: (x1 + x2) / 2.0,
            x1,
            y1: x1,
            x2,
            y2: x2,
            size: badge,
        }
    }

    fn radius(&self) -> f32 {
        self.size as f32 / 2.0
    }

    fn stroke(&self) -> f32 {
        (self.size / 10).max(4) as f32
    }
}

/// Render `image` as RGBA pixels.
pub(crate) fn render(image: IndicatorImage) -> RgbaImage {
    let mut img = base_glyph();
    let badge = Badge::for_size(ICON_SIZE);
    let state = image.state();

    fill_circle(&mut img, badge.cx, badge.cy, badge.radius() + BADGE_OUTLINE, COLOR_OUTLINE);
    fill_circle(&mut img, badge.cx, badge.cy, badge.radius(), badge_color(state));

    match state {
        ServiceState::Running => {}
        ServiceState::Stopped => {
            let margin = (badge.size / 5) as f32;
            draw_line(
                &mut img,
                (badge.x1 + margin, badge.y1 + margin),
                (badge.x2 - margin, badge.y2 - margin),
                badge.stroke(),
                WHITE,
            );
        }
        ServiceState::Error => {
            let margin = (badge.size / 4) as f32;
            draw_line(
                &mut img,
                (badge.x1 + margin, badge.y1 + margin),
                (badge.x2 - margin, badge.y2 - margin),
                badge.stroke(),
                WHITE,
            );
            draw_line(
                &mut img,
                (badge.x2 - margin, badge.y1 + margin),
                (badge.x1 + margin, badge.y2 - margin),
                badge.stroke(),
                WHITE,
            );
        }
        ServiceState::Starting | ServiceState::Stopping => {
            let frame = match image {
                IndicatorImage::Animated { frame, .. } => frame,
                IndicatorImage::Static(_) => 0,
            };
            draw_spinner(&mut img, &badge, frame);
        }
    }

    img
}

/// Render `image` and wrap it as a tray icon.
#[track_caller]
pub(crate) fn icon(image: IndicatorImage) -> AppResult<Icon> {
    let rgba = render(image);
    let (width, height) = (rgba.width(), rgba.height());

    Icon::from_rgba(rgba.into_raw(), width, height)
        .map_err(|e| AppError::tray(format!("Failed to create icon from RGBA: {e}")))
}

pub(crate) fn badge_color(state: ServiceState) -> Rgba<u8> {
    match state {
        ServiceState::Running => COLOR_RUNNING,
        ServiceState::Stopped => COLOR_STOPPED,
        ServiceState::Starting | ServiceState::Stopping => COLOR_TRANSITION,
        ServiceState::Error => COLOR_ERROR,
    }
}

/// Head-and-body ring glyph in white on transparent.
fn base_glyph() -> RgbaImage {
    let mut img = RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, Rgba([0, 0, 0, 0]));
    stroke_ellipse(&mut img, (16.0, 8.0, 48.0, 40.0), GLYPH_STROKE, WHITE);
    stroke_ellipse(&mut img, (20.0, 44.0, 44.0, 60.0), GLYPH_STROKE, WHITE);
    img
}

/// Three dots on a circle, the lead dot opaque, rotating 45 degrees per frame.
fn draw_spinner(img: &mut RgbaImage, badge: &Badge, frame: u8) {
    let orbit = (badge.size / 4) as f32;
    let dot_radius = (badge.size / 10).max(5) as f32 / 2.0;

    for i in 0..3u8 {
        let degrees = f32::from(frame) * DEGREES_PER_FRAME + f32::from(i) * 120.0;
        let angle = degrees.to_radians();
        let dx = (orbit * angle.cos()).trunc();
        let dy = (orbit * angle.sin()).trunc();
        let alpha = if i == 0 { 255 } else { DIM_DOT_ALPHA };

        fill_circle(
            img,
            badge.cx + dx,
            badge.cy + dy,
            dot_radius,
            Rgba([255, 255, 255, alpha]),
        );
    }
}

/// Pixels are covered when their centre lies inside the shape.
fn for_each_pixel(img: &mut RgbaImage, covered: impl Fn(f32, f32) -> bool, color: Rgba<u8>) {
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        if covered(x as f32 + 0.5, y as f32 + 0.5) {
            blend(pixel, color);
        }
    }
}

fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, r: f32, color: Rgba<u8>) {
    for_each_pixel(
        img,
        |x, y| (x - cx).powi(2) + (y - cy).powi(2) <= r * r,
        color,
    );
}

fn stroke_ellipse(img: &mut RgbaImage, bbox: (f32, f32, f32, f32), width: f32, color: Rgba<u8>) {
    let (x1, y1, x2, y2) = bbox;
    let (cx, cy) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    let (rx, ry) = ((x2 - x1) / 2.0, (y2 - y1) / 2.0);
    let inside = |x: f32, y: f32, rx: f32, ry: f32| {
        ((x - cx) / rx).powi(2) + ((y - cy) / ry).powi(2) <= 1.0
    };

    for_each_pixel(
        img,
        |x, y| inside(x, y, rx, ry) && !inside(x, y, rx - width, ry - width),
        color,
    );
}

fn draw_line(img: &mut RgbaImage, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba<u8>) {
    let (ax, ay) = from;
    let (dx, dy) = (to.0 - ax, to.1 - ay);
    let len_sq = dx * dx + dy * dy;
    let half = width / 2.0;

    for_each_pixel(
        img,
        |x, y| {
            let t = if len_sq == 0.0 {
                0.0
            } else {
                (((x - ax) * dx + (y - ay) * dy) / len_sq).clamp(0.0, 1.0)
            };
            let (px, py) = (ax + t * dx, ay + t * dy);
            (x - px).powi(2) + (y - py).powi(2) <= half * half
        },
        color,
    );
}

/// Source-over compositing of `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = f32::from(src[3]) / 255.0;
    if sa >= 1.0 {
        *dst = src;
        return;
    }

    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }

    for c in 0..3 {
        let s = f32::from(src[c]);
        let d = f32::from(dst[c]);
        dst[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}
