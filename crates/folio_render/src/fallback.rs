//! Static fallback background
//!
//! Gradients, two soft glows and a handful of floating dots. All motion is
//! left to CSS keyframes; nothing runs per frame in application code. On a
//! native surface the same layout is painted once, without the keyframes.

use std::f32::consts::TAU;
use std::fmt::Write;

use folio_core::math::SeededRng;
use folio_core::scene::Rgb;
use serde::Serialize;

use crate::backend::Vertex;

pub const DOT_COUNT: usize = 20;
pub const DOT_SIZE_PX: f32 = 4.0;
const DOT_ALPHA: f32 = 0.3;
/// Distance of each glow from its corner, as a fraction of the viewport.
const GLOW_INSET: f32 = 0.25;
/// Triangles per painted glow or dot.
const DISC_SEGMENTS: usize = 24;

/// Animation delay range for dots, seconds.
const DOT_DELAY: (f32, f32) = (0.0, 5.0);
/// Animation duration range for dots, seconds.
const DOT_DURATION: (f32, f32) = (3.0, 7.0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingDot {
    pub left_pct: f32,
    pub top_pct: f32,
    pub delay_s: f32,
    pub duration_s: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlowAnchor {
    TopLeft,
    BottomRight,
}

impl GlowAnchor {
    fn css(self) -> &'static str {
        match self {
            GlowAnchor::TopLeft => "top:25%;left:25%",
            GlowAnchor::BottomRight => "bottom:25%;right:25%",
        }
    }

    /// Centre of a glow `size` pixels across, measured from the top-left
    /// of a `width` x `height` viewport.
    fn centre(self, size: f32, width: f32, height: f32) -> (f32, f32) {
        let half = size / 2.0;
        match self {
            GlowAnchor::TopLeft => (width * GLOW_INSET + half, height * GLOW_INSET + half),
            GlowAnchor::BottomRight => (
                width * (1.0 - GLOW_INSET) - half,
                height * (1.0 - GLOW_INSET) - half,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glow {
    pub anchor: GlowAnchor,
    pub size_px: u32,
    pub color: Rgb,
    pub alpha: f32,
    pub blur_px: u32,
    pub delay_s: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CssBackground {
    /// Diagonal gradient stops, top-left to bottom-right.
    pub gradient: [Rgb; 3],
    pub glows: Vec<Glow>,
    pub dots: Vec<FloatingDot>,
}

impl CssBackground {
    /// Lay out the fallback; each dot gets its own position and phase.
    pub fn generate(seed: u64) -> Self {
        let mut rng = SeededRng::new(seed);
        let dots = (0..DOT_COUNT)
            .map(|_| FloatingDot {
                left_pct: rng.range(0.0, 100.0),
                top_pct: rng.range(0.0, 100.0),
                delay_s: rng.range(DOT_DELAY.0, DOT_DELAY.1),
                duration_s: rng.range(DOT_DURATION.0, DOT_DURATION.1),
            })
            .collect();

        Self {
            gradient: [Rgb::from_hex(0x0f172a), Rgb::from_hex(0x1e293b), Rgb::from_hex(0x0f172a)],
            glows: vec![
                Glow {
                    anchor: GlowAnchor::TopLeft,
                    size_px: 256,
                    color: Rgb::from_hex(0x3b82f6),
                    alpha: 0.1,
                    blur_px: 64,
                    delay_s: 0.0,
                },
                Glow {
                    anchor: GlowAnchor::BottomRight,
                    size_px: 192,
                    color: Rgb::from_hex(0xa855f7),
                    alpha: 0.1,
                    blur_px: 40,
                    delay_s: 2.0,
                },
            ],
            dots,
        }
    }

    /// Self-contained HTML fragment with the keyframes it needs.
    pub fn to_html(&self) -> String {
        let [from, via, to] = self.gradient.map(Rgb::to_hex_string);
        let mut html = String::new();
        html.push_str(
            "<style>\
             @keyframes folio-float{0%,100%{transform:translateY(0)}50%{transform:translateY(-20px)}}\
             @keyframes folio-pulse{0%,100%{opacity:1}50%{opacity:.5}}\
             </style>\n",
        );
        let _ = writeln!(
            html,
            "<div class=\"folio-bg\" style=\"position:fixed;inset:0;z-index:-10;overflow:hidden;\
             background:linear-gradient(to bottom right,{from},{via},{to})\">"
        );
        for glow in &self.glows {
            let _ = writeln!(
                html,
                "  <div style=\"position:absolute;{};width:{}px;height:{}px;border-radius:9999px;\
                 background:{};filter:blur({}px);animation:folio-pulse 2s ease-in-out infinite;\
                 animation-delay:{}s\"></div>",
                glow.anchor.css(),
                glow.size_px,
                glow.size_px,
                css_rgba(glow.color, glow.alpha),
                glow.blur_px,
                glow.delay_s
            );
        }
        for dot in &self.dots {
            let _ = writeln!(
                html,
                "  <div style=\"position:absolute;left:{:.2}%;top:{:.2}%;width:4px;height:4px;\
                 border-radius:9999px;background:{};\
                 animation:folio-float {:.2}s ease-in-out infinite;animation-delay:{:.2}s\"></div>",
                dot.left_pct,
                dot.top_pct,
                css_rgba(dot_color(), DOT_ALPHA),
                dot.duration_s,
                dot.delay_s
            );
        }
        html.push_str("</div>\n");
        html
    }

    /// Triangle-list geometry of the resting layout for a surface of
    /// `viewport` physical pixels: the gradient as one full-screen quad,
    /// then the glows and dots as discs fading out to their rim.
    pub fn vertices(&self, viewport: (u32, u32), pixel_ratio: f32) -> Vec<Vertex> {
        let (width, height) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        let ndc = |x: f32, y: f32| [x / width * 2.0 - 1.0, 1.0 - y / height * 2.0];
        let discs = self.glows.len() + self.dots.len();
        let mut out = Vec::with_capacity(6 + discs * DISC_SEGMENTS * 3);

        // split along the top-right/bottom-left diagonal so the middle stop
        // runs corner to corner
        let [from, via, to] = self.gradient;
        let corner = |x: f32, y: f32, c: Rgb| Vertex {
            position: [x, y],
            color: rgba(c, 1.0),
        };
        let (tl, tr) = (corner(-1.0, 1.0, from), corner(1.0, 1.0, via));
        let (bl, br) = (corner(-1.0, -1.0, via), corner(1.0, -1.0, to));
        out.extend_from_slice(&[tl, tr, bl, tr, br, bl]);

        for glow in &self.glows {
            let size = glow.size_px as f32 * pixel_ratio;
            let radius = size / 2.0 + glow.blur_px as f32 * pixel_ratio;
            let centre = glow.anchor.centre(size, width, height);
            push_disc(&mut out, centre, radius, rgba(glow.color, glow.alpha), &ndc);
        }
        let dot_radius = DOT_SIZE_PX * pixel_ratio / 2.0;
        for dot in &self.dots {
            let centre = (
                dot.left_pct / 100.0 * width + dot_radius,
                dot.top_pct / 100.0 * height + dot_radius,
            );
            push_disc(&mut out, centre, dot_radius, rgba(dot_color(), DOT_ALPHA), &ndc);
        }
        out
    }
}

fn dot_color() -> Rgb {
    Rgb::from_hex(0x60a5fa)
}

fn rgba(color: Rgb, alpha: f32) -> [f32; 4] {
    [color.r, color.g, color.b, alpha]
}

fn css_rgba(color: Rgb, alpha: f32) -> String {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("rgba({},{},{},{alpha})", c(color.r), c(color.g), c(color.b))
}

/// Fan of triangles around `centre` (pixels), opaque at the centre and
/// transparent at the rim.
fn push_disc(
    out: &mut Vec<Vertex>,
    centre: (f32, f32),
    radius: f32,
    color: [f32; 4],
    ndc: &impl Fn(f32, f32) -> [f32; 2],
) {
    let (cx, cy) = centre;
    let rim = [color[0], color[1], color[2], 0.0];
    let point = |i: usize| {
        let angle = i as f32 / DISC_SEGMENTS as f32 * TAU;
        Vertex {
            position: ndc(cx + radius * angle.cos(), cy + radius * angle.sin()),
            color: rim,
        }
    };
    let hub = Vertex {
        position: ndc(cx, cy),
        color,
    };
    for i in 0..DISC_SEGMENTS {
        out.extend_from_slice(&[hub, point(i), point(i + 1)]);
    }
}
