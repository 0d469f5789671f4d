//! Line chart with point hover tooltips.
//!
//! [`LineChart`] is pure geometry: it turns a value series into canvas
//! [`DrawCommand`]s and maps pointer positions back to data points. The
//! [`Chart`] widget owns the canvas and tooltip nodes in a container.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::ChartOptions;
use crate::consts::{CHART_GRID_STEPS, CHART_PADDING, CHART_POINT_RADIUS, CHART_TOOLTIP_OFFSET};
use crate::dom::{Document, ElementId, Point, UiEvent};
use crate::error::WidgetError;
use crate::widget::{EventFlow, Widget, px, require_target};

const TOOLTIP_CLASS: &str = "chart__tooltip";

/// Colors and sizes of a line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub line_color: String,
    pub point_color: String,
    pub grid_color: String,
    pub padding: f64,
    pub point_radius: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            line_color: "rgba(168,229,242, 1)".to_owned(),
            point_color: "rgba(168,229,242, 1)".to_owned(),
            grid_color: "#F5F8FA".to_owned(),
            padding: CHART_PADDING,
            point_radius: CHART_POINT_RADIUS,
        }
    }
}

/// One 2D canvas drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    StrokeLine {
        from: Point,
        to: Point,
        color: String,
        line_width: f64,
    },
    StrokePath {
        points: Vec<Point>,
        color: String,
        line_width: f64,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: String,
    },
}

/// Largest value of the series. A NaN anywhere yields NaN.
fn max_value(values: &[f64]) -> f64 {
    values.iter().fold(f64::NEG_INFINITY, |max, &value| {
        if max.is_nan() || value.is_nan() {
            f64::NAN
        } else {
            max.max(value)
        }
    })
}

/// Formats a number the way a browser prints it (`10`, `12.5`, `NaN`,
/// `Infinity`).
pub fn format_number(value: f64) -> String {
    match value {
        f64::INFINITY => "Infinity".to_owned(),
        f64::NEG_INFINITY => "-Infinity".to_owned(),
        _ => value.to_string(),
    }
}

/// Geometry of a line chart over a labelled value series.
///
/// Points are spread evenly across the plot area and scaled against the
/// series maximum, so the largest value touches the top padding.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    width: f64,
    height: f64,
    labels: Vec<String>,
    values: Vec<f64>,
    max: f64,
    style: ChartStyle,
}

impl LineChart {
    pub fn new(options: ChartOptions, style: ChartStyle) -> Self {
        Self {
            width: options.width,
            height: options.height,
            max: max_value(&options.values),
            labels: options.labels,
            values: options.values,
            style,
        }
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn height(&self) -> f64 {
        self.height
    }

    pub const fn max(&self) -> f64 {
        self.max
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub const fn style(&self) -> &ChartStyle {
        &self.style
    }

    fn plot_width(&self) -> f64 {
        self.width - self.style.padding * 2.0
    }

    fn plot_height(&self) -> f64 {
        self.height - self.style.padding * 2.0
    }

    /// Canvas position of data point `index`.
    ///
    /// A single-point series has no horizontal step, so its x is NaN.
    #[allow(clippy::cast_precision_loss)]
    pub fn point(&self, index: usize) -> Option<Point> {
        let value = *self.values.get(index)?;
        let step = self.plot_width() / (self.values.len() as f64 - 1.0);
        let x = self.style.padding + step * index as f64;
        let y = self.height - self.style.padding - (value / self.max) * self.plot_height();
        Some(Point::new(x, y))
    }

    pub fn points(&self) -> Vec<Point> {
        (0..self.values.len()).filter_map(|index| self.point(index)).collect()
    }

    /// Horizontal grid lines from the top of the plot area to the bottom.
    pub fn grid_lines(&self) -> Vec<(Point, Point)> {
        let padding = self.style.padding;
        let step = self.plot_height() / f64::from(CHART_GRID_STEPS);
        (0..=CHART_GRID_STEPS)
            .map(|i| {
                let y = padding + step * f64::from(i);
                (Point::new(padding, y), Point::new(self.width - padding, y))
            })
            .collect()
    }

    /// Full frame: clear, grid, series line, then point markers.
    pub fn draw(&self) -> Vec<DrawCommand> {
        let points = self.points();
        let mut commands = vec![DrawCommand::Clear {
            width: self.width,
            height: self.height,
        }];
        commands.extend(self.grid_lines().into_iter().map(|(from, to)| {
            DrawCommand::StrokeLine {
                from,
                to,
                color: self.style.grid_color.clone(),
                line_width: 1.0,
            }
        }));
        commands.push(DrawCommand::StrokePath {
            points: points.clone(),
            color: self.style.line_color.clone(),
            line_width: 2.0,
        });
        commands.extend(points.into_iter().map(|center| DrawCommand::FillCircle {
            center,
            radius: self.style.point_radius,
            color: self.style.point_color.clone(),
        }));
        commands
    }

    /// First data point within the point radius of `mouse` on both axes.
    pub fn hit_test(&self, mouse: Point) -> Option<usize> {
        let radius = self.style.point_radius;
        self.points().iter().position(|point| {
            (mouse.x - point.x).abs() < radius && (mouse.y - point.y).abs() < radius
        })
    }

    /// Tooltip markup for data point `index`. A missing label prints empty.
    pub fn tooltip_text(&self, index: usize) -> Option<String> {
        let value = self.values.get(index)?;
        let label = self.labels.get(index).map_or("", String::as_str);
        Some(format!("Date: {label}<br>Result: {}", format_number(*value)))
    }
}

/// Line chart rendered into a container element.
#[derive(Debug)]
pub struct Chart {
    container: ElementId,
    canvas: ElementId,
    tooltip: ElementId,
    chart: LineChart,
}

impl Chart {
    /// Appends a canvas and a hidden tooltip to `container`.
    ///
    /// # Errors
    /// Returns `WidgetError::MissingTarget` if `container` is not in the
    /// document.
    pub fn new(
        doc: &mut Document,
        container: ElementId,
        options: ChartOptions,
        style: ChartStyle,
    ) -> Result<Self, WidgetError> {
        require_target(doc, container, Self::NAME)?;
        let chart = LineChart::new(options, style);

        let canvas = doc.create_element("canvas");
        doc.set_attribute(canvas, "width", &format_number(chart.width()))?;
        doc.set_attribute(canvas, "height", &format_number(chart.height()))?;
        doc.append_child(container, canvas)?;

        let tooltip = doc.create_element("div");
        doc.set_class_name(tooltip, TOOLTIP_CLASS)?;
        doc.set_style(tooltip, "position", "absolute")?;
        doc.set_style(tooltip, "pointer-events", "none")?;
        doc.set_style(tooltip, "display", "none")?;
        doc.append_child(container, tooltip)?;

        debug!(
            element = %container,
            points = chart.values().len(),
            max = chart.max(),
            "chart attached"
        );
        Ok(Self {
            container,
            canvas,
            tooltip,
            chart,
        })
    }

    pub const fn canvas(&self) -> ElementId {
        self.canvas
    }

    pub const fn tooltip(&self) -> ElementId {
        self.tooltip
    }

    pub const fn chart(&self) -> &LineChart {
        &self.chart
    }

    /// Drawing commands for the canvas
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.chart.draw()
    }

    fn hover(&self, doc: &mut Document, client: Point, page: Point) -> Result<(), WidgetError> {
        let rect = doc.rect(self.canvas)?;
        let mouse = Point::new(client.x - rect.left, client.y - rect.top);
        let hit = self
            .chart
            .hit_test(mouse)
            .and_then(|index| self.chart.tooltip_text(index));

        let Some(text) = hit else {
            doc.set_style(self.tooltip, "display", "none")?;
            return Ok(());
        };
        trace!(element = %self.container, %text, "chart point hovered");
        doc.set_style(self.tooltip, "left", &px(page.x + CHART_TOOLTIP_OFFSET))?;
        doc.set_style(self.tooltip, "top", &px(page.y + CHART_TOOLTIP_OFFSET))?;
        doc.set_style(self.tooltip, "display", "block")?;
        doc.set_text(self.tooltip, &text)?;
        Ok(())
    }
}

impl Widget for Chart {
    const NAME: &'static str = "Chart";

    fn target(&self) -> ElementId {
        self.container
    }

    fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> Result<EventFlow, WidgetError> {
        match *event {
            UiEvent::PointerMove {
                target,
                client,
                page,
            } if target == self.canvas => {
                self.hover(doc, client, page)?;
                Ok(EventFlow::Handled)
            }
            _ => Ok(EventFlow::Ignored),
        }
    }

    /// Removes the canvas and tooltip. Either may already be gone along with
    /// the container.
    fn teardown(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        for node in [self.canvas, self.tooltip] {
            if doc.exists(node) {
                doc.destroy(node)?;
            }
        }
        debug!(element = %self.container, "chart detached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;

    fn options(values: &[f64]) -> ChartOptions {
        ChartOptions {
            width: 140.0,
            height: 140.0,
            labels: vec!["Jan".to_owned(), "Feb".to_owned(), "Mar".to_owned()],
            values: values.to_vec(),
        }
    }

    fn line_chart(values: &[f64]) -> LineChart {
        LineChart::new(options(values), ChartStyle::default())
    }

    #[test]
    fn test_points_scale_to_plot_area() {
        let chart = line_chart(&[0.0, 50.0, 100.0]);
        assert_eq!(chart.max(), 100.0);
        assert_eq!(
            chart.points(),
            vec![
                Point::new(20.0, 120.0),
                Point::new(70.0, 70.0),
                Point::new(120.0, 20.0)
            ]
        );
        assert_eq!(chart.point(3), None);
    }

    #[test]
    fn test_grid_lines() {
        let chart = line_chart(&[0.0, 50.0, 100.0]);
        let lines = chart.grid_lines();
        assert_eq!(lines.len(), 6);
        let ys: Vec<f64> = lines.iter().map(|(from, _)| from.y).collect();
        assert_eq!(ys, vec![20.0, 40.0, 60.0, 80.0, 100.0, 120.0]);
        assert!(lines.iter().all(|(from, to)| from.x == 20.0 && to.x == 120.0));
    }

    #[test]
    fn test_draw_order() {
        let chart = line_chart(&[0.0, 50.0, 100.0]);
        let commands = chart.draw();
        // clear + 6 grid lines + path + 3 points
        assert_eq!(commands.len(), 11);
        assert_eq!(
            commands[0],
            DrawCommand::Clear {
                width: 140.0,
                height: 140.0
            }
        );
        assert!(matches!(
            &commands[1],
            DrawCommand::StrokeLine { color, line_width, .. } if color == "#F5F8FA" && *line_width == 1.0
        ));
        assert!(matches!(
            &commands[7],
            DrawCommand::StrokePath { points, line_width, .. } if points.len() == 3 && *line_width == 2.0
        ));
        assert_eq!(
            commands[10],
            DrawCommand::FillCircle {
                center: Point::new(120.0, 20.0),
                radius: 5.0,
                color: "rgba(168,229,242, 1)".to_owned()
            }
        );
    }

    #[test]
    fn test_draw_commands_serialize() {
        let chart = line_chart(&[0.0, 50.0, 100.0]);
        let json = serde_json::to_value(&chart.draw()[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"op": "clear", "width": 140.0, "height": 140.0})
        );
    }

    #[test]
    fn test_nan_propagates() {
        let chart = line_chart(&[10.0, f64::NAN, 30.0]);
        assert!(chart.max().is_nan());
        assert!(chart.points().iter().all(|point| point.y.is_nan()));
        assert_eq!(chart.hit_test(Point::new(20.0, 120.0)), None);
    }

    #[test]
    fn test_single_point_has_nan_x() {
        let chart = line_chart(&[42.0]);
        let point = chart.point(0).unwrap();
        assert!(point.x.is_nan());
        assert_eq!(point.y, 20.0);
    }

    #[test]
    fn test_hit_test_within_radius() {
        let chart = line_chart(&[0.0, 50.0, 100.0]);
        assert_eq!(chart.hit_test(Point::new(72.0, 68.0)), Some(1));
        assert_eq!(chart.hit_test(Point::new(16.0, 124.0)), Some(0));
        // the radius bound is exclusive
        assert_eq!(chart.hit_test(Point::new(75.0, 70.0)), None);
        assert_eq!(chart.hit_test(Point::new(45.0, 95.0)), None);
    }

    #[test]
    fn test_tooltip_text() {
        let chart = line_chart(&[0.0, 12.5, 100.0, f64::INFINITY]);
        assert_eq!(chart.tooltip_text(1).unwrap(), "Date: Feb<br>Result: 12.5");
        assert_eq!(chart.tooltip_text(2).unwrap(), "Date: Mar<br>Result: 100");
        assert_eq!(chart.tooltip_text(3).unwrap(), "Date: <br>Result: Infinity");
        assert_eq!(chart.tooltip_text(4), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(400.0), "400");
        assert_eq!(format_number(-3.25), "-3.25");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    fn chart_fixture() -> (Document, Chart) {
        let mut doc = Document::new();
        let container = doc.create_element("div");
        doc.append_child(doc.body(), container).unwrap();
        let chart = Chart::new(
            &mut doc,
            container,
            options(&[0.0, 50.0, 100.0]),
            ChartStyle::default(),
        )
        .unwrap();
        doc.set_rect(chart.canvas(), Rect::new(100.0, 50.0, 140.0, 140.0))
            .unwrap();
        (doc, chart)
    }

    #[test]
    fn test_widget_builds_canvas_and_hidden_tooltip() {
        let (doc, chart) = chart_fixture();
        let container = chart.target();
        assert_eq!(
            doc.get(container).unwrap().children(),
            &[chart.canvas(), chart.tooltip()]
        );
        assert_eq!(doc.attribute(chart.canvas(), "width"), Some("140"));
        assert_eq!(doc.attribute(chart.canvas(), "height"), Some("140"));
        assert!(doc.has_class(chart.tooltip(), "chart__tooltip"));
        assert_eq!(doc.style(chart.tooltip(), "position"), Some("absolute"));
        assert_eq!(doc.style(chart.tooltip(), "pointer-events"), Some("none"));
        assert_eq!(doc.style(chart.tooltip(), "display"), Some("none"));
        assert_eq!(chart.commands().len(), 11);
    }

    #[test]
    fn test_hover_shows_and_hides_tooltip() {
        let (mut doc, mut chart) = chart_fixture();
        let canvas = chart.canvas();
        let tooltip = chart.tooltip();

        let over_point = UiEvent::PointerMove {
            target: canvas,
            client: Point::new(121.0, 171.0),
            page: Point::new(121.0, 571.0),
        };
        assert_eq!(chart.handle(&mut doc, &over_point).unwrap(), EventFlow::Handled);
        assert_eq!(doc.style(tooltip, "display"), Some("block"));
        assert_eq!(doc.style(tooltip, "left"), Some("131px"));
        assert_eq!(doc.style(tooltip, "top"), Some("581px"));
        assert_eq!(doc.get(tooltip).unwrap().text(), "Date: Feb<br>Result: 50");

        let off_point = UiEvent::PointerMove {
            target: canvas,
            client: Point::new(60.0, 110.0),
            page: Point::new(60.0, 510.0),
        };
        chart.handle(&mut doc, &off_point).unwrap();
        assert_eq!(doc.style(tooltip, "display"), Some("none"));
    }

    #[test]
    fn test_moves_off_canvas_ignored() {
        let (mut doc, mut chart) = chart_fixture();
        let event = UiEvent::PointerMove {
            target: chart.tooltip(),
            client: Point::new(121.0, 171.0),
            page: Point::new(121.0, 571.0),
        };
        assert_eq!(chart.handle(&mut doc, &event).unwrap(), EventFlow::Ignored);
        assert_eq!(
            chart.handle(&mut doc, &UiEvent::Click(chart.canvas())).unwrap(),
            EventFlow::Ignored
        );
    }

    #[test]
    fn test_teardown_removes_canvas_and_tooltip() {
        let (mut doc, mut chart) = chart_fixture();
        let container = chart.target();
        let nodes = doc.node_count();
        chart.teardown(&mut doc).unwrap();

        assert!(!doc.exists(chart.canvas()));
        assert!(!doc.exists(chart.tooltip()));
        assert!(doc.get(container).unwrap().children().is_empty());
        assert_eq!(doc.node_count(), nodes - 2);

        // attaching again after detach yields a single canvas
        let again = Chart::new(
            &mut doc,
            container,
            options(&[1.0, 2.0]),
            ChartStyle::default(),
        )
        .unwrap();
        assert_eq!(
            doc.get(container).unwrap().children(),
            &[again.canvas(), again.tooltip()]
        );
    }

    #[test]
    fn test_teardown_after_container_destroyed() {
        let (mut doc, mut chart) = chart_fixture();
        doc.destroy(chart.target()).unwrap();
        chart.teardown(&mut doc).unwrap();
        assert_eq!(doc.node_count(), 1);
    }
}
