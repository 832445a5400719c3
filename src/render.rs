//! SVG rendering of a play in canonical coordinates.
//!
//! Positions map per axis: `x` is a percentage of the width (`0..=100`) and
//! `y` spans `0..=70` of the height. Decoration sizes are a separate concern
//! and follow only the requested width against a 1000px reference, so a
//! thumbnail and a detail view of the same play look equally weighted.

use tracing::warn;

use std::f64::consts::PI;

use crate::model::{Icon, IconKind, PlayData, PlayRecord, Player, RouteEnd, SegmentStyle};
use crate::normalize::{CANONICAL_MAX_X, CANONICAL_MAX_Y};
use crate::palette::{MarkerShape, Palette};
use crate::style::DiagramStyle;
use crate::xml::{escape_xml, num};

/// Width that decoration sizes are specified against.
pub const REFERENCE_WIDTH: f64 = 1000.0;
pub const THUMBNAIL_SIZE: (f64, f64) = (400.0, 300.0);
pub const DETAIL_SIZE: (f64, f64) = (800.0, 600.0);
pub const MIN_STROKE_WIDTH: f64 = 1.5;

const TOKEN_RADIUS: f64 = 15.0;
const ROUTE_STROKE: f64 = 3.0;
const TOKEN_OUTLINE_STROKE: f64 = 2.0;
const LABEL_FONT_SIZE: f64 = 12.0;
/// Baseline drop that puts a bold label at the token's optical center.
const LABEL_BASELINE_OFFSET: f64 = 5.0;
const ICON_SIZE: f64 = 30.0;
const STAR_OUTER_RADIUS: f64 = 20.0;
const STAR_INNER_RADIUS: f64 = 10.0;
const STAR_SPIKES: usize = 5;
/// Dash and gap length at the reference route stroke.
const DASH_LENGTH: f64 = 8.0;
const WAVE_STEP: f64 = 15.0;
const WAVE_AMPLITUDE: f64 = 6.0;

const GUIDE_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];

/// Decoration sizes for one output width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decorations {
    pub token_radius: f64,
    pub route_stroke: f64,
    pub outline_stroke: f64,
    pub font_size: f64,
    pub label_offset: f64,
    pub icon_size: f64,
    pub star_outer: f64,
    pub star_inner: f64,
    pub dash: f64,
    pub wave_step: f64,
    pub wave_amplitude: f64,
}

impl Decorations {
    pub fn for_width(width: f64, style: &DiagramStyle) -> Self {
        let scale = width / REFERENCE_WIDTH;
        let shape = scale * style.shape_scale;
        let stroke = scale * style.stroke_scale;

        let route_stroke = (ROUTE_STROKE * stroke).max(MIN_STROKE_WIDTH);

        Self {
            token_radius: TOKEN_RADIUS * shape,
            route_stroke,
            outline_stroke: (TOKEN_OUTLINE_STROKE * stroke).max(MIN_STROKE_WIDTH),
            font_size: LABEL_FONT_SIZE * shape,
            label_offset: LABEL_BASELINE_OFFSET * shape,
            icon_size: ICON_SIZE * shape,
            star_outer: STAR_OUTER_RADIUS * shape,
            star_inner: STAR_INNER_RADIUS * shape,
            dash: DASH_LENGTH * route_stroke / ROUTE_STROKE,
            wave_step: WAVE_STEP * shape,
            wave_amplitude: WAVE_AMPLITUDE * shape,
        }
    }
}

/// Canonical → pixel mapping for one canvas.
#[derive(Debug, Clone, Copy)]
struct Canvas {
    width: f64,
    height: f64,
}

impl Canvas {
    fn px(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.width / CANONICAL_MAX_X,
            y * self.height / CANONICAL_MAX_Y,
        )
    }
}

/// Draws plays with a fixed style. Holds no per-call state, so one renderer
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct PlayRenderer {
    style: DiagramStyle,
    palette: Palette,
    fixed_size: bool,
}

impl Default for PlayRenderer {
    fn default() -> Self {
        Self::new(DiagramStyle::default())
    }
}

impl PlayRenderer {
    pub fn new(style: DiagramStyle) -> Self {
        let palette = style.palette();
        Self {
            style,
            palette,
            fixed_size: false,
        }
    }

    /// Emit pixel `width`/`height` on the root instead of the responsive
    /// `100%`/`auto` used for embedding. Standalone files need this.
    pub fn with_fixed_size(mut self) -> Self {
        self.fixed_size = true;
        self
    }

    pub fn style(&self) -> &DiagramStyle {
        &self.style
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn render_record(&self, record: &PlayRecord, width: f64, height: f64) -> String {
        match &record.data {
            Some(data) => self.render(data, width, height),
            None => String::new(),
        }
    }

    pub fn render_thumbnail(&self, record: &PlayRecord) -> String {
        self.render_record(record, THUMBNAIL_SIZE.0, THUMBNAIL_SIZE.1)
    }

    pub fn render_detail(&self, record: &PlayRecord) -> String {
        self.render_record(record, DETAIL_SIZE.0, DETAIL_SIZE.1)
    }

    /// Renders a payload already in canonical space. A payload without a
    /// player array renders as an empty string.
    pub fn render(&self, data: &PlayData, width: f64, height: f64) -> String {
        let Some(players) = data.players.as_deref() else {
            return String::new();
        };

        let canvas = Canvas { width, height };
        let deco = Decorations::for_width(width, &self.style);
        let mut svg = String::new();

        self.render_field(&mut svg, &canvas);

        let mut shapes: Vec<MarkerShape> = Vec::new();
        for player in players.iter().filter(|p| !p.route.is_empty()) {
            let shape = end_shape(player);
            if !shapes.contains(&shape) {
                shapes.push(shape);
            }
        }
        if !shapes.is_empty() {
            svg.push_str(&self.palette.marker_defs(&self.style.marker_prefix, &shapes));
        }

        // routes first so each token covers the start of its own route
        for (idx, player) in players.iter().enumerate() {
            if !player.route.is_empty() {
                self.render_route(&mut svg, idx, player, &canvas, &deco);
            }
        }
        for player in players {
            self.render_token(&mut svg, player, &canvas, &deco);
        }
        for (idx, icon) in data.icons.iter().enumerate() {
            self.render_icon(&mut svg, idx, icon, &canvas, &deco);
        }

        self.wrap(svg, width, height)
    }

    fn wrap(&self, content: String, width: f64, height: f64) -> String {
        let (w, h) = (num(width), num(height));
        let size = if self.fixed_size {
            format!(r#"width="{}" height="{}""#, w, h)
        } else {
            r#"width="100%" height="auto""#.to_string()
        };
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" {}>{}</svg>"#,
            w, h, size, content
        )
    }

    fn render_field(&self, svg: &mut String, canvas: &Canvas) {
        let style = &self.style;
        svg.push_str(&format!(
            r#"<rect width="{}" height="{}" fill="{}" />"#,
            num(canvas.width),
            num(canvas.height),
            escape_xml(&style.background_color)
        ));

        for (i, fraction) in GUIDE_FRACTIONS.iter().enumerate() {
            let midline = i == 1;
            let (stroke, stroke_width) = if midline {
                (&style.midline_color, style.midline_width)
            } else {
                (&style.guide_color, style.guide_width)
            };
            let y = num(canvas.height * fraction);
            svg.push_str(&format!(
                r#"<line x1="0" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" />"#,
                y,
                num(canvas.width),
                y,
                escape_xml(stroke),
                num(stroke_width)
            ));
        }
    }

    fn render_route(
        &self,
        svg: &mut String,
        idx: usize,
        player: &Player,
        canvas: &Canvas,
        deco: &Decorations,
    ) {
        let color = player
            .color
            .as_deref()
            .unwrap_or(self.style.route_fallback_color.as_str());
        let choice = self.palette.lookup(color);
        if choice.fallback {
            warn!(
                player = idx,
                color,
                marker = %choice.entry.marker_id,
                "color not in palette, using default marker"
            );
        }
        if let Some(RouteEnd::Other(kind)) = &player.route_end_type {
            warn!(player = idx, kind = %kind, "unknown route end, drawing arrowhead");
        }

        let marker = format!(
            "url(#{}{})",
            escape_xml(&self.style.marker_prefix),
            escape_xml(choice.entry.marker(end_shape(player)))
        );
        let stroke = escape_xml(color);
        let points: Vec<(f64, f64)> = std::iter::once((player.x, player.y))
            .chain(player.route.iter().map(|pt| (pt.x, pt.y)))
            .map(|(x, y)| canvas.px(x, y))
            .collect();

        if player.has_plain_route() {
            let points = points
                .iter()
                .map(|&(x, y)| format!("{},{}", num(x), num(y)))
                .collect::<Vec<_>>()
                .join(" ");
            svg.push_str(&format!(
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" marker-end="{}" />"#,
                points,
                stroke,
                num(deco.route_stroke),
                marker
            ));
            return;
        }

        let last = points.len() - 2;
        for (seg, pair) in points.windows(2).enumerate() {
            let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
            let end = if seg == last {
                format!(r#" marker-end="{}""#, marker)
            } else {
                String::new()
            };

            match player.segment_style(seg) {
                Some(SegmentStyle::Squiggly) => svg.push_str(&format!(
                    r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round" stroke-linecap="round"{} />"#,
                    zigzag_path(pair[0], pair[1], deco.wave_step, deco.wave_amplitude),
                    stroke,
                    num(deco.route_stroke),
                    end
                )),
                style => {
                    let dash = match style {
                        Some(SegmentStyle::Dashed) => {
                            format!(r#" stroke-dasharray="{},{}""#, num(deco.dash), num(deco.dash))
                        }
                        Some(SegmentStyle::Other(kind)) => {
                            warn!(player = idx, segment = seg, kind = %kind, "unknown segment style, drawing solid");
                            String::new()
                        }
                        _ => String::new(),
                    };
                    svg.push_str(&format!(
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"{}{} />"#,
                        num(x1),
                        num(y1),
                        num(x2),
                        num(y2),
                        stroke,
                        num(deco.route_stroke),
                        dash,
                        end
                    ));
                }
            }
        }
    }

    fn render_token(&self, svg: &mut String, player: &Player, canvas: &Canvas, deco: &Decorations) {
        let (cx, cy) = canvas.px(player.x, player.y);
        let fill = player
            .color
            .as_deref()
            .unwrap_or(self.style.token_fallback_color.as_str());

        if player.is_primary() {
            svg.push_str(&format!(
                r#"<polygon points="{}" fill="{}" stroke="{}" stroke-width="{}" />"#,
                star_points(cx, cy, deco.star_outer, deco.star_inner),
                escape_xml(fill),
                escape_xml(&self.style.token_outline_color),
                num(deco.outline_stroke)
            ));
        } else {
            svg.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}" />"#,
                num(cx),
                num(cy),
                num(deco.token_radius),
                escape_xml(fill),
                escape_xml(&self.style.token_outline_color),
                num(deco.outline_stroke)
            ));
        }

        if !player.label.is_empty() {
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" text-anchor="middle" fill="{}" font-family="{}" font-size="{}px" font-weight="bold">{}</text>"#,
                num(cx),
                num(cy + deco.label_offset),
                escape_xml(&self.style.label_color),
                escape_xml(&self.style.font_family),
                num(deco.font_size),
                escape_xml(&player.label)
            ));
        }
    }

    fn render_icon(&self, svg: &mut String, idx: usize, icon: &Icon, canvas: &Canvas, deco: &Decorations) {
        let href = match &icon.kind {
            IconKind::Ball => &self.style.ball_href,
            IconKind::DecoyBall => &self.style.decoy_ball_href,
            IconKind::Other(kind) => {
                warn!(icon = idx, kind = %kind, "unknown icon kind, drawing ball badge");
                &self.style.ball_href
            }
        };

        let (px, py) = canvas.px(icon.x, icon.y);
        let half = deco.icon_size / 2.0;
        svg.push_str(&format!(
            r#"<image href="{}" x="{}" y="{}" width="{}" height="{}" />"#,
            escape_xml(href),
            num(px - half),
            num(py - half),
            num(deco.icon_size),
            num(deco.icon_size)
        ));
    }
}

fn end_shape(player: &Player) -> MarkerShape {
    match player.route_end_type {
        Some(RouteEnd::Circle) => MarkerShape::Circle,
        _ => MarkerShape::Arrow,
    }
}

/// Alternating outer and inner vertices, first spike pointing up.
fn star_points(cx: f64, cy: f64, outer: f64, inner: f64) -> String {
    let step = PI / STAR_SPIKES as f64;
    (0..STAR_SPIKES * 2)
        .map(|i| {
            let angle = 1.5 * PI + step * i as f64;
            let r = if i % 2 == 0 { outer } else { inner };
            format!("{},{}", num(cx + angle.cos() * r), num(cy + angle.sin() * r))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Zig-zag between two pixel points: one vertex every `step`, alternating
/// `amplitude` to either side, landing exactly on `to`. Short segments stay
/// straight.
fn zigzag_path(from: (f64, f64), to: (f64, f64), step: f64, amplitude: f64) -> String {
    let ((x1, y1), (x2, y2)) = (from, to);
    let (dx, dy) = (x2 - x1, y2 - y1);
    let dist = dx.hypot(dy);
    let steps = if step > 0.0 { (dist / step).floor() as usize } else { 0 };

    let mut d = format!("M {} {}", num(x1), num(y1));
    if steps >= 2 {
        // unit normal to the segment
        let (nx, ny) = (-dy / dist, dx / dist);
        for i in 1..steps {
            let t = i as f64 / steps as f64;
            let offset = if i % 2 == 0 { amplitude } else { -amplitude };
            d.push_str(&format!(
                " L {} {}",
                num(x1 + dx * t + nx * offset),
                num(y1 + dy * t + ny * offset)
            ));
        }
    }
    d.push_str(&format!(" L {} {}", num(x2), num(y2)));
    d
}

/// Renders with the classic style.
pub fn render(data: &PlayData, width: f64, height: f64) -> String {
    PlayRenderer::default().render(data, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RecordId, RouteEnd, SegmentStyle};
    use crate::normalize::normalize;
    use crate::palette::STANDARD_HEXES;
    use proptest::prelude::*;
    use quick_xml::Reader;
    use quick_xml::events::{BytesStart, Event};
    use std::collections::HashMap;

    #[derive(Debug)]
    struct Element {
        name: String,
        attrs: HashMap<String, String>,
        text: String,
    }

    impl Element {
        fn attr(&self, key: &str) -> &str {
            self.attrs.get(key).map(String::as_str).unwrap_or("")
        }
    }

    fn element(e: &BytesStart<'_>) -> Element {
        let attrs = e
            .attributes()
            .map(|a| {
                let a = a.expect("attribute");
                (
                    String::from_utf8_lossy(a.key.as_ref()).into_owned(),
                    String::from_utf8_lossy(&a.value).into_owned(),
                )
            })
            .collect();
        Element {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attrs,
            text: String::new(),
        }
    }

    /// Flattens the document into elements in document order.
    fn parse(svg: &str) -> Vec<Element> {
        let mut reader = Reader::from_str(svg);
        let mut out: Vec<Element> = Vec::new();
        loop {
            match reader.read_event().expect("well-formed svg") {
                Event::Start(e) | Event::Empty(e) => out.push(element(&e)),
                Event::Text(t) => {
                    if let Some(last) = out.last_mut() {
                        last.text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        out
    }

    fn named<'a>(elements: &'a [Element], name: &str) -> Vec<&'a Element> {
        elements.iter().filter(|e| e.name == name).collect()
    }

    fn single(player: Player) -> PlayData {
        PlayData::with_players(vec![player])
    }

    #[test]
    fn no_player_array_renders_nothing() {
        assert_eq!(render(&PlayData::default(), 400.0, 300.0), "");

        let record = PlayRecord {
            id: Some(RecordId::Number(1)),
            ..PlayRecord::default()
        };
        assert_eq!(PlayRenderer::default().render_thumbnail(&record), "");
    }

    #[test]
    fn thumbnail_and_detail_presets_scale_one_record() {
        let record = PlayRecord {
            id: Some(RecordId::Number(3)),
            data: Some(single(Player::at(50.0, 35.0).colored("#6366f1").labeled("C"))),
            ..PlayRecord::default()
        };
        let renderer = PlayRenderer::default();

        let thumb = renderer.render_thumbnail(&record);
        assert!(thumb.contains(r#"viewBox="0 0 400 300""#));
        let elements = parse(&thumb);
        assert_eq!(named(&elements, "circle")[0].attr("r"), "6");
        assert_eq!(named(&elements, "circle")[0].attr("cx"), "200");

        let detail = renderer.render_detail(&record);
        assert!(detail.contains(r#"viewBox="0 0 800 600""#));
        let elements = parse(&detail);
        assert_eq!(named(&elements, "circle")[0].attr("r"), "12");
        assert_eq!(named(&elements, "circle")[0].attr("cx"), "400");
        assert_eq!(named(&elements, "text")[0].text, "C");
    }

    #[test]
    fn empty_player_list_renders_only_the_field() {
        let svg = render(&PlayData::with_players(vec![]), 400.0, 300.0);
        let elements = parse(&svg);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["svg", "rect", "line", "line", "line"]);

        let rect = &elements[1];
        assert_eq!(rect.attr("width"), "400");
        assert_eq!(rect.attr("height"), "300");
    }

    #[test]
    fn guide_lines_sit_on_quarters_with_heavier_midline() {
        let svg = render(&PlayData::with_players(vec![]), 800.0, 600.0);
        let elements = parse(&svg);
        let lines = named(&elements, "line");

        let ys: Vec<&str> = lines.iter().map(|l| l.attr("y1")).collect();
        assert_eq!(ys, ["150", "300", "450"]);
        assert_eq!(lines[1].attr("stroke-width"), "4");
        assert_eq!(lines[1].attr("stroke"), "#9ca3af");
        assert_eq!(lines[0].attr("stroke-width"), "2");
        assert_eq!(lines[2].attr("stroke"), "#e5e7eb");
        assert!(lines.iter().all(|l| l.attr("x2") == "800"));
    }

    #[test]
    fn stationary_player_thumbnail() {
        let data = single(Player::at(50.0, 35.0).colored("#22c55e").labeled("WR"));
        let svg = render(&data, 400.0, 300.0);
        let elements = parse(&svg);

        assert!(named(&elements, "polyline").is_empty());
        assert!(named(&elements, "defs").is_empty());

        let circles = named(&elements, "circle");
        assert_eq!(circles.len(), 1);
        assert_eq!(circles[0].attr("cx"), "200");
        assert_eq!(circles[0].attr("cy"), "150");
        assert_eq!(circles[0].attr("r"), "6");
        assert_eq!(circles[0].attr("fill"), "#22c55e");

        let texts = named(&elements, "text");
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "WR");
        assert_eq!(texts[0].attr("x"), "200");
        assert_eq!(texts[0].attr("y"), "152");
        assert_eq!(texts[0].attr("text-anchor"), "middle");
        assert_eq!(texts[0].attr("font-size"), "4.8px");
    }

    #[test]
    fn legacy_record_normalizes_to_the_same_picture() {
        let legacy = single(Player::at(500.0, 350.0).colored("#22c55e").labeled("WR"));
        let canonical = single(Player::at(50.0, 35.0).colored("#22c55e").labeled("WR"));
        assert_eq!(
            render(&normalize(&legacy), 400.0, 300.0),
            render(&canonical, 400.0, 300.0)
        );
    }

    #[test]
    fn route_polyline_starts_at_player() {
        let data = single(
            Player::at(50.0, 35.0)
                .colored("#ef4444")
                .with_route(&[(60.0, 35.0), (60.0, 20.0)]),
        );
        let svg = render(&data, 800.0, 600.0);
        let elements = parse(&svg);

        let lines = named(&elements, "polyline");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].attr("points"), "400,300 480,300 480,171.429");
        assert_eq!(lines[0].attr("stroke"), "#ef4444");
        assert_eq!(lines[0].attr("fill"), "none");
        assert_eq!(lines[0].attr("marker-end"), "url(#arrowhead-ef4444)");
        assert_eq!(lines[0].attr("stroke-width"), "2.4");

        let markers = named(&elements, "marker");
        assert_eq!(markers.len(), 9);
        assert!(markers.iter().any(|m| m.attr("id") == "arrowhead-ef4444"));
    }

    #[test]
    fn styled_segments_draw_one_element_each() {
        let data = single(
            Player::at(10.0, 10.0)
                .colored("#ef4444")
                .with_route(&[(20.0, 10.0), (20.0, 30.0)])
                .with_segment_styles(&[SegmentStyle::Dashed, SegmentStyle::Solid])
                .ending(RouteEnd::Circle),
        );
        let elements = parse(&render(&data, 1000.0, 700.0));
        assert!(named(&elements, "polyline").is_empty());

        let segments: Vec<&Element> = named(&elements, "line")
            .into_iter()
            .filter(|l| l.attr("stroke") == "#ef4444")
            .collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(
            [segments[0].attr("x1"), segments[0].attr("y1"), segments[0].attr("x2"), segments[0].attr("y2")],
            ["100", "100", "200", "100"]
        );
        assert_eq!(segments[0].attr("stroke-dasharray"), "8,8");
        assert_eq!(segments[0].attr("marker-end"), "");
        assert_eq!(segments[1].attr("stroke-dasharray"), "");
        assert_eq!(segments[1].attr("y2"), "300");
        assert_eq!(segments[1].attr("marker-end"), "url(#circlehead-ef4444)");

        let markers = named(&elements, "marker");
        assert_eq!(markers.len(), 9);
        assert!(markers.iter().all(|m| m.attr("id").starts_with("circlehead-")));
    }

    #[test]
    fn dashes_follow_route_stroke() {
        let data = single(
            Player::at(10.0, 10.0)
                .with_route(&[(20.0, 10.0)])
                .with_segment_styles(&[SegmentStyle::Dashed]),
        );
        let elements = parse(&render(&data, 400.0, 300.0));
        let segment = named(&elements, "line")
            .into_iter()
            .find(|l| l.attr("stroke") == "#1f2937")
            .expect("route segment");
        // 1.5px floor stroke, dashes keep the 8:3 ratio
        assert_eq!(segment.attr("stroke-width"), "1.5");
        assert_eq!(segment.attr("stroke-dasharray"), "4,4");
        assert_eq!(segment.attr("marker-end"), "url(#arrowhead-1f2937)");
    }

    #[test]
    fn squiggly_segment_is_a_zigzag_path() {
        let data = single(
            Player::at(10.0, 10.0)
                .colored("#22c55e")
                .with_route(&[(40.0, 10.0)])
                .with_segment_styles(&[SegmentStyle::Squiggly]),
        );
        let elements = parse(&render(&data, 1000.0, 700.0));
        let paths = named(&elements, "path");
        assert_eq!(paths.len(), 1);

        let d = paths[0].attr("d");
        assert!(d.starts_with("M 100 100 L 115 94 L 130 106 "), "{}", d);
        assert!(d.ends_with(" L 400 100"), "{}", d);
        assert_eq!(d.matches(" L ").count(), 20);
        assert_eq!(paths[0].attr("fill"), "none");
        assert_eq!(paths[0].attr("stroke-linecap"), "round");
        assert_eq!(paths[0].attr("marker-end"), "url(#arrowhead-22c55e)");
    }

    #[test]
    fn short_zigzag_stays_straight() {
        assert_eq!(zigzag_path((0.0, 0.0), (20.0, 0.0), 15.0, 6.0), "M 0 0 L 20 0");
        assert_eq!(zigzag_path((5.0, 5.0), (5.0, 5.0), 15.0, 6.0), "M 5 5 L 5 5");
    }

    #[test]
    fn mixed_route_ends_declare_both_marker_sets() {
        let data = PlayData::with_players(vec![
            Player::at(10.0, 10.0).colored("#6366f1").with_route(&[(20.0, 20.0)]),
            Player::at(30.0, 10.0)
                .colored("#6366f1")
                .with_route(&[(40.0, 20.0)])
                .ending(RouteEnd::Circle),
        ]);
        let elements = parse(&render(&data, 800.0, 600.0));
        assert_eq!(named(&elements, "marker").len(), 18);

        let lines = named(&elements, "polyline");
        assert_eq!(lines[0].attr("marker-end"), "url(#arrowhead-6366f1)");
        assert_eq!(lines[1].attr("marker-end"), "url(#circlehead-6366f1)");
    }

    #[test]
    fn primary_player_is_a_star() {
        let data = PlayData::with_players(vec![
            Player::at(50.0, 35.0).colored("#eab308").labeled("X").as_primary(),
            Player::at(20.0, 35.0),
        ]);
        let elements = parse(&render(&data, 1000.0, 700.0));

        let stars = named(&elements, "polygon");
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].attr("fill"), "#eab308");
        let points: Vec<&str> = stars[0].attr("points").split(' ').collect();
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], "500,330");
        assert_eq!(points[5], "500,360");

        assert_eq!(named(&elements, "circle").len(), 1);
        assert_eq!(named(&elements, "text")[0].text, "X");
    }

    #[test]
    fn draw_order_is_routes_then_tokens_then_icons() {
        let mut data = PlayData::with_players(vec![
            Player::at(10.0, 10.0).colored("#6366f1"),
            Player::at(20.0, 20.0).colored("#ef4444").with_route(&[(30.0, 5.0)]),
        ]);
        data.icons.push(Icon {
            x: 20.0,
            y: 22.0,
            ..Icon::default()
        });

        let elements = parse(&render(&data, 400.0, 300.0));
        let order: Vec<&str> = elements
            .iter()
            .map(|e| e.name.as_str())
            .filter(|n| matches!(*n, "polyline" | "circle" | "image"))
            .collect();
        assert_eq!(order, ["polyline", "circle", "circle", "image"]);
    }

    #[test]
    fn every_palette_color_uses_its_own_marker() {
        for hex in STANDARD_HEXES {
            let color = format!("#{}", hex);
            let data = single(Player::at(10.0, 10.0).colored(&color).with_route(&[(20.0, 20.0)]));
            let elements = parse(&render(&data, 800.0, 600.0));
            let line = named(&elements, "polyline")[0];
            assert_eq!(line.attr("marker-end"), format!("url(#arrowhead-{})", hex));
            assert_eq!(line.attr("stroke"), color);
        }
    }

    #[test]
    fn unknown_color_keeps_literal_stroke_with_default_marker() {
        let data = single(Player::at(10.0, 10.0).colored("#3b82f6").with_route(&[(20.0, 20.0)]));
        let elements = parse(&render(&data, 800.0, 600.0));
        let line = named(&elements, "polyline")[0];
        assert_eq!(line.attr("stroke"), "#3b82f6");
        assert_eq!(line.attr("marker-end"), "url(#arrowhead-1f2937)");
    }

    #[test]
    fn missing_color_uses_fallbacks() {
        let data = single(Player::at(10.0, 10.0).with_route(&[(20.0, 20.0)]));
        let elements = parse(&render(&data, 800.0, 600.0));
        assert_eq!(named(&elements, "polyline")[0].attr("stroke"), "#1f2937");
        assert_eq!(named(&elements, "circle")[0].attr("fill"), "#3b82f6");
    }

    #[test]
    fn icons_are_centered_badges() {
        let mut data = PlayData::with_players(vec![]);
        data.icons.push(Icon {
            x: 50.0,
            y: 35.0,
            kind: IconKind::Ball,
            ..Icon::default()
        });
        data.icons.push(Icon {
            x: 25.0,
            y: 35.0,
            kind: IconKind::DecoyBall,
            ..Icon::default()
        });
        data.icons.push(Icon {
            kind: IconKind::Other("cone".to_string()),
            ..Icon::default()
        });

        let elements = parse(&render(&data, 1000.0, 700.0));
        let images = named(&elements, "image");
        assert_eq!(images.len(), 3);
        assert_eq!(images[0].attr("x"), "485");
        assert_eq!(images[0].attr("y"), "335");
        assert_eq!(images[0].attr("width"), "30");
        assert_eq!(images[0].attr("href"), "/images/football.png");
        assert_eq!(images[1].attr("href"), "/images/football-decoy.png");
        assert_eq!(images[2].attr("href"), "/images/football.png");
    }

    #[test]
    fn labels_are_escaped() {
        let data = single(Player::at(10.0, 10.0).labeled("<X&Y>"));
        let svg = render(&data, 400.0, 300.0);
        assert!(svg.contains(">&lt;X&amp;Y&gt;</text>"));
    }

    #[test]
    fn marker_prefix_applies_to_defs_and_references() {
        let style = DiagramStyle {
            marker_prefix: "p7-".to_string(),
            ..DiagramStyle::default()
        };
        let data = single(Player::at(10.0, 10.0).colored("#ec4899").with_route(&[(20.0, 20.0)]));
        let svg = PlayRenderer::new(style).render(&data, 400.0, 300.0);
        assert!(svg.contains(r#"id="p7-arrowhead-ec4899""#));
        assert!(svg.contains("url(#p7-arrowhead-ec4899)"));
    }

    #[test]
    fn fixed_size_root_for_standalone_files() {
        let data = PlayData::with_players(vec![]);
        let responsive = render(&data, 400.0, 300.0);
        assert!(responsive.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300" width="100%" height="auto">"#
        ));

        let fixed = PlayRenderer::default().with_fixed_size().render(&data, 400.0, 300.0);
        assert!(fixed.contains(r#"viewBox="0 0 400 300" width="400" height="300""#));
    }

    #[test]
    fn wristband_style_thickens_strokes_and_shapes() {
        let style = DiagramStyle::from_builtin("wristband").expect("wristband");
        let deco = Decorations::for_width(1000.0, &style);
        assert_eq!(deco.route_stroke, 7.5);
        assert_eq!(deco.token_radius, 22.5);
        assert_eq!(deco.dash, 20.0);

        let renderer = PlayRenderer::new(style);
        assert_eq!(renderer.style().stroke_scale, 2.5);
        assert_eq!(renderer.style().background_color, "#ffffff");
        assert_eq!(renderer.palette().markers().len(), 9);
        assert_eq!(renderer.palette().lookup("#ef4444").entry.marker_id, "arrowhead-ef4444");
    }

    #[test]
    fn renderer_is_shareable_across_threads() {
        let renderer = &PlayRenderer::default();
        let plays: Vec<PlayData> = (0..8)
            .map(|i| single(Player::at(i as f64 * 10.0, 30.0).colored("#06b6d4").with_route(&[(50.0, 5.0)])))
            .collect();
        let serial: Vec<String> = plays.iter().map(|p| renderer.render(p, 400.0, 300.0)).collect();

        let parallel: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = plays
                .iter()
                .map(|p| scope.spawn(move || renderer.render(p, 400.0, 300.0)))
                .collect();
            handles.into_iter().map(|h| h.join().expect("render thread")).collect()
        });
        assert_eq!(serial, parallel);
    }

    proptest! {
        #[test]
        fn prop_decorations_scale_with_width(width in 1.0f64..4000.0) {
            let style = DiagramStyle::default();
            let deco = Decorations::for_width(width, &style);
            let s = width / REFERENCE_WIDTH;
            prop_assert!((deco.token_radius - 15.0 * s).abs() < 1e-9);
            prop_assert!((deco.font_size - 12.0 * s).abs() < 1e-9);
            prop_assert!((deco.route_stroke - (3.0 * s).max(1.5)).abs() < 1e-9);
            prop_assert!(deco.route_stroke >= MIN_STROKE_WIDTH);
            prop_assert!(deco.outline_stroke >= MIN_STROKE_WIDTH);
        }

        #[test]
        fn prop_render_is_deterministic(
            x in 0.0f64..=100.0,
            y in 0.0f64..=70.0,
            hex in prop::sample::select(STANDARD_HEXES.to_vec()),
            w in 50.0f64..2000.0,
            h in 50.0f64..2000.0,
        ) {
            let data = single(Player::at(x, y).colored(&format!("#{}", hex)).labeled("X").with_route(&[(y, x / 2.0)]));
            prop_assert_eq!(render(&data, w, h), render(&data, w, h));
        }
    }
}
