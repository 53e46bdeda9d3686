//! Console table for finished proxy checks

use crate::proxy::ProxyRecord;
use crossterm::style::{style, Color as TermColor, Stylize};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};
use std::io::{self, Write};

const TITLE: &str = "Proxies";

const COLUMNS: [&str; 6] = ["host", "port", "login", "password", "http", "socks5"];

const COLUMN_SPACING: u16 = 2;

const AVAILABLE: &str = "✓";
const UNAVAILABLE: &str = "✗";

/// Renders proxy records as a bordered table
#[derive(Debug, Clone)]
pub struct ProxyTable {
    color: bool,
}

impl ProxyTable {
    pub fn new() -> Self {
        Self { color: true }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Print the table to stdout
    pub fn display(&self, proxies: &[ProxyRecord]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.render(&mut out, proxies)?;
        out.flush()
    }

    /// Write the table to any writer
    pub fn render<W: Write>(&self, out: &mut W, proxies: &[ProxyRecord]) -> io::Result<()> {
        for buffer in Self::draw(proxies) {
            self.write_buffer(out, &buffer)?;
        }
        Ok(())
    }

    /// Draw the table into one or more stacked buffers
    ///
    /// A buffer area is capped at `u16::MAX` cells, so long lists are split
    /// into consecutive slices sharing the same column widths.
    fn draw(proxies: &[ProxyRecord]) -> Vec<Buffer> {
        let rows: Vec<[String; 6]> = proxies.iter().map(Self::row).collect();

        let widths: Vec<u16> = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, name)| {
                rows.iter()
                    .map(|row| row[i].chars().count())
                    .chain([name.len()])
                    .max()
                    .map_or(0, |w| u16::try_from(w).unwrap_or(u16::MAX))
            })
            .collect();
        let constraints: Vec<Constraint> = widths.iter().map(|&w| Constraint::Length(w)).collect();

        let spacing = COLUMN_SPACING * (COLUMNS.len() as u16 - 1);
        let width = widths
            .iter()
            .fold(spacing + 2, |acc, &w| acc.saturating_add(w))
            .max(TITLE.len() as u16 + 2);
        let per_slice = usize::from((u16::MAX / width).saturating_sub(3).max(1));

        let slices: Vec<&[[String; 6]]> = if rows.is_empty() {
            vec![&rows[..]]
        } else {
            rows.chunks(per_slice).collect()
        };
        let last = slices.len() - 1;

        slices
            .into_iter()
            .enumerate()
            .map(|(i, slice)| {
                let first = i == 0;
                let mut borders = Borders::LEFT | Borders::RIGHT;
                let mut height = slice.len() as u16;
                if first {
                    borders |= Borders::TOP;
                    height += 2;
                }
                if i == last {
                    borders |= Borders::BOTTOM;
                    height += 1;
                }

                let mut block = Block::default().borders(borders);
                if first {
                    block = block.title(TITLE).title_alignment(Alignment::Center);
                }

                let mut table = Table::new(slice.iter().map(Self::styled_row))
                    .block(block)
                    .widths(&constraints)
                    .column_spacing(COLUMN_SPACING);
                if first {
                    let header = Row::new(COLUMNS).style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    );
                    table = table.header(header);
                }

                let area = Rect::new(0, 0, width, height);
                let mut buffer = Buffer::empty(area);
                table.render(area, &mut buffer);
                buffer
            })
            .collect()
    }

    fn row(proxy: &ProxyRecord) -> [String; 6] {
        let flag = |available: bool| (if available { AVAILABLE } else { UNAVAILABLE }).to_string();
        [
            proxy.host.clone(),
            proxy.port.to_string(),
            proxy.login.clone().unwrap_or_default(),
            proxy.password.clone().unwrap_or_default(),
            flag(proxy.http()),
            flag(proxy.socks5()),
        ]
    }

    fn styled_row(values: &[String; 6]) -> Row<'_> {
        Row::new(values.iter().map(|value| {
            let color = if value == UNAVAILABLE {
                Color::Red
            } else {
                Color::Green
            };
            Cell::from(value.as_str()).style(Style::default().fg(color))
        }))
    }

    /// Print a drawn buffer line by line, turning cell styles into escapes
    fn write_buffer<W: Write>(&self, out: &mut W, buffer: &Buffer) -> io::Result<()> {
        let area = buffer.area;
        for y in area.top()..area.bottom() {
            let mut line = String::new();
            let mut run = String::new();
            let mut run_style: Option<(Color, bool)> = None;

            for x in area.left()..area.right() {
                let cell = buffer.get(x, y);
                let cell_style = (cell.fg, cell.modifier.contains(Modifier::BOLD));
                if run_style != Some(cell_style) {
                    self.push_run(&mut line, &run, run_style);
                    run.clear();
                    run_style = Some(cell_style);
                }
                run.push_str(&cell.symbol);
            }
            self.push_run(&mut line, &run, run_style);

            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    fn push_run(&self, line: &mut String, run: &str, run_style: Option<(Color, bool)>) {
        match run_style {
            Some((fg, bold)) if self.color && (fg != Color::Reset || bold) => {
                let mut styled = style(run).with(TermColor::from(fg));
                if bold {
                    styled = styled.bold();
                }
                line.push_str(&styled.to_string());
            }
            _ => line.push_str(run),
        }
    }
}

impl Default for ProxyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyType;

    fn render(proxies: &[ProxyRecord]) -> String {
        let mut out = Vec::new();
        ProxyTable::new()
            .with_color(false)
            .render(&mut out, proxies)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn cells(line: &str) -> Vec<&str> {
        line.trim_matches(|c: char| c == '│' || c.is_whitespace())
            .split_whitespace()
            .collect()
    }

    #[test]
    fn test_empty_table() {
        let output = render(&[]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(TITLE));
        assert_eq!(cells(lines[1]), COLUMNS);
        assert!(lines[2].starts_with('└'));
    }

    #[test]
    fn test_rows_show_flags() {
        let mut working = ProxyRecord::with_auth("1.2.3.4", 8080, "user", "pass");
        working.mark_available(ProxyType::Http);
        let down = ProxyRecord::new("5.6.7.8", 1080);

        let output = render(&[working, down]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);

        assert_eq!(cells(lines[2]), ["1.2.3.4", "8080", "user", "pass", "✓", "✗"]);
        assert_eq!(cells(lines[3]), ["5.6.7.8", "1080", "✗", "✗"]);
    }

    #[test]
    fn test_lines_are_aligned() {
        let proxy = ProxyRecord::with_auth("very.long.hostname.example", 3128, "u", "p");
        let output = render(&[proxy]);
        let widths: Vec<usize> = output.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_long_lists_stay_one_table() {
        let proxies: Vec<ProxyRecord> = (0..2000u16)
            .map(|i| ProxyRecord::new(format!("10.0.{}.{}", i / 250, i % 250), 1000 + i))
            .collect();

        let output = render(&proxies);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), proxies.len() + 3);
        assert_eq!(lines.iter().filter(|l| l.contains(TITLE)).count(), 1);
        assert_eq!(lines.iter().filter(|l| l.starts_with('└')).count(), 1);
        assert_eq!(cells(lines[1999 + 2])[0], "10.0.7.249");

        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }
}
