//! Terminal line chart for pivoted download series
//!
//! Draws in an alternate screen and waits for a keypress before
//! restoring the terminal.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Terminal,
};

use pypistats_core::chart::ChartRenderer;
use pypistats_core::pivot::PivotSeries;
use pypistats_core::Result;

const LINE_COLORS: &[Color] = &[
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
];

/// Renders pivoted series as a full-screen terminal chart.
pub struct TerminalChart {
    title: String,
}

impl TerminalChart {
    pub fn new(package: &str) -> Self {
        Self {
            title: format!("{package} downloads (press any key to exit)"),
        }
    }
}

impl ChartRenderer for TerminalChart {
    fn render(&mut self, series: &[PivotSeries], x_label: &str, y_label: &str) -> Result<()> {
        if series.is_empty() {
            return Ok(());
        }

        let points = series_to_points(series);
        // Every series covers the same buckets, so the first one defines
        // the x axis
        let x_keys: Vec<&str> = series[0]
            .points
            .iter()
            .map(|(date, _)| date.as_str())
            .collect();
        let y_max = points
            .iter()
            .flatten()
            .map(|(_, y)| *y)
            .fold(1.0_f64, f64::max);

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = draw_until_keypress(
            &mut terminal,
            &self.title,
            series,
            &points,
            &x_keys,
            y_max,
            x_label,
            y_label,
        );

        // Restore terminal on every exit path
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }
}

/// Index each series' points so they share a numeric x axis.
fn series_to_points(series: &[PivotSeries]) -> Vec<Vec<(f64, f64)>> {
    series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .enumerate()
                .map(|(i, (_, y))| (i as f64, *y as f64))
                .collect()
        })
        .collect()
}

/// Spread a handful of bucket labels across the x axis.
fn axis_labels(x_keys: &[&str]) -> Vec<String> {
    match x_keys.len() {
        0 => vec![],
        1 => vec![x_keys[0].to_string()],
        2 => vec![x_keys[0].to_string(), x_keys[1].to_string()],
        n => vec![
            x_keys[0].to_string(),
            x_keys[n / 2].to_string(),
            x_keys[n - 1].to_string(),
        ],
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_until_keypress(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    title: &str,
    series: &[PivotSeries],
    points: &[Vec<(f64, f64)>],
    x_keys: &[&str],
    y_max: f64,
    x_label: &str,
    y_label: &str,
) -> Result<()> {
    let x_bound = (x_keys.len().saturating_sub(1)).max(1) as f64;

    loop {
        terminal.draw(|frame| {
            let datasets: Vec<Dataset> = series
                .iter()
                .zip(points)
                .enumerate()
                .map(|(i, (s, data))| {
                    Dataset::default()
                        .name(s.category.clone())
                        .marker(symbols::Marker::Dot)
                        .graph_type(GraphType::Line)
                        .style(Style::default().fg(LINE_COLORS[i % LINE_COLORS.len()]))
                        .data(data)
                })
                .collect();

            let chart = Chart::new(datasets)
                .block(Block::default().title(title.to_string()).borders(Borders::ALL))
                .x_axis(
                    Axis::default()
                        .title(x_label.to_string())
                        .bounds([0.0, x_bound])
                        .labels(axis_labels(x_keys)),
                )
                .y_axis(
                    Axis::default()
                        .title(y_label.to_string())
                        // y axis starts at zero, counts never go negative
                        .bounds([0.0, y_max])
                        .labels(vec![
                            "0".to_string(),
                            format!("{}", (y_max / 2.0) as i64),
                            format!("{}", y_max as i64),
                        ]),
                );

            frame.render_widget(chart, frame.area());
        })?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(_) = event::read()? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(category: &str, points: &[(&str, i64)]) -> PivotSeries {
        PivotSeries {
            category: category.to_string(),
            points: points
                .iter()
                .map(|(date, count)| (date.to_string(), *count))
                .collect(),
        }
    }

    #[test]
    fn test_points_are_indexed_in_bucket_order() {
        let input = vec![series("US", &[("2021-01-01", 10), ("2021-01-02", 5)])];
        let points = series_to_points(&input);
        assert_eq!(points, vec![vec![(0.0, 10.0), (1.0, 5.0)]]);
    }

    #[test]
    fn test_axis_labels_span_the_range() {
        let keys = ["2021-01-01", "2021-01-02", "2021-01-03", "2021-01-04"];
        assert_eq!(
            axis_labels(&keys),
            vec!["2021-01-01", "2021-01-03", "2021-01-04"]
        );
        assert_eq!(axis_labels(&[]), Vec::<String>::new());
    }
}
