// Drone Wx Profile - METAR/SPECI and PIREP summaries for drone operations
// Copyright (C) 2025 FiendishDrWu
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::io::{self as io, Write};
use crossterm::{
    execute,
    style::{Color, SetForegroundColor, SetBackgroundColor, SetAttribute, Attribute},
    event::{read, Event, KeyCode},
    terminal::{enable_raw_mode, disable_raw_mode, Clear, ClearType},
    cursor,
};
use dialoguer::Input;
use std::io::stdout;

use dronewx::config::SavedSite;
use dronewx::profile::{display_ceiling, display_visibility, join_heights, MetarRow, PirepRow};
use dronewx::FlightCategory;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const BANNER: &str = r#"
╔═════════════════════════════════[ Drone Wx ]══════════════════════════════════╗
║                                                                               ║
║       ██████╗ ██████╗  ██████╗ ███╗   ██╗███████╗   ██╗    ██╗██╗  ██╗        ║
║       ██╔══██╗██╔══██╗██╔═══██╗████╗  ██║██╔════╝   ██║    ██║╚██╗██╔╝        ║
║       ██║  ██║██████╔╝██║   ██║██╔██╗ ██║█████╗     ██║ █╗ ██║ ╚███╔╝         ║
║       ██║  ██║██╔══██╗██║   ██║██║╚██╗██║██╔══╝     ██║███╗██║ ██╔██╗         ║
║       ██████╔╝██║  ██║╚██████╔╝██║ ╚████║███████╗   ╚███╔███╔╝██╔╝ ██╗        ║
║       ╚═════╝ ╚═╝  ╚═╝ ╚═════╝ ╚═╝  ╚═══╝╚══════╝    ╚══╝╚══╝ ╚═╝  ╚═╝        ║
║                                   [v{VERSION_PLACEHOLDER}]                                    ║
║                                                                               ║
╚═══════════════════════════[ Drone Weather Profile ]═══════════════════════════╝"#;

// Color schemes for different UI elements
const BANNER_COLORS: [Color; 3] = [Color::Cyan, Color::Blue, Color::White];
const MENU_COLORS: [Color; 2] = [Color::Yellow, Color::DarkYellow];
const HEADER_COLORS: [Color; 2] = [Color::Magenta, Color::DarkMagenta];
const TABLE_COLOR: Color = Color::Cyan;

// Widest a raw report column may get before it is cut with "..."
const MAX_RAW_COLUMN: usize = 90;

fn term_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

fn prompt_error(e: dialoguer::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

pub fn clear_screen() -> io::Result<()> {
    let mut stdout = stdout();
    execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        cursor::Show
    )?;
    stdout.flush()?;
    Ok(())
}

pub fn draw_banner() -> io::Result<()> {
    let mut stdout = stdout();
    let banner_with_version = BANNER.replace("{VERSION_PLACEHOLDER}", VERSION);

    for (i, line) in banner_with_version.lines().enumerate() {
        let color = BANNER_COLORS[i % BANNER_COLORS.len()];
        execute!(
            stdout,
            SetAttribute(Attribute::Bold),
            SetForegroundColor(color),
            SetBackgroundColor(Color::Black)
        )?;
        println!("{}", line);
    }

    execute!(
        stdout,
        SetAttribute(Attribute::Reset),
        SetBackgroundColor(Color::Reset)
    )?;
    Ok(())
}

pub fn draw_menu_box(title: &str, options: &[&str]) -> io::Result<()> {
    let mut stdout = stdout();
    let width = options.iter().map(|s| s.chars().count()).max().unwrap_or(0) + 4;
    let width = width.max(title.chars().count() + 4);

    execute!(stdout, SetForegroundColor(MENU_COLORS[0]))?;
    println!("╔═[{}]{}╗", title, "═".repeat(width - title.chars().count() - 3));

    for (i, option) in options.iter().enumerate() {
        let color = MENU_COLORS[i % MENU_COLORS.len()];
        execute!(stdout, SetForegroundColor(color))?;
        println!("║ {} {}{} ║",
            if i == 0 { "►" } else { "•" },
            option,
            " ".repeat(width - option.chars().count() - 4)
        );
    }

    execute!(stdout, SetForegroundColor(MENU_COLORS[0]))?;
    println!("╚{}╝", "═".repeat(width));
    execute!(stdout, SetAttribute(Attribute::Reset))?;
    Ok(())
}

pub fn draw_section_header(title: &str) -> io::Result<()> {
    let mut stdout = stdout();
    let term_width = term_width().max(title.len() + 6);
    let padding = term_width.saturating_sub(title.len() + 4) / 2;

    execute!(stdout, SetForegroundColor(HEADER_COLORS[0]))?;
    println!("\n╔{}╗", "═".repeat(term_width - 2));

    execute!(stdout, SetForegroundColor(HEADER_COLORS[1]))?;
    println!("║{}{}{} ║",
        " ".repeat(padding),
        title,
        " ".repeat(term_width.saturating_sub(padding + title.len() + 3))
    );

    execute!(stdout, SetForegroundColor(HEADER_COLORS[0]))?;
    println!("╚{}╝", "═".repeat(term_width - 2));
    execute!(stdout, SetAttribute(Attribute::Reset))?;
    Ok(())
}

pub fn draw_input_prompt(prompt: &str) -> io::Result<()> {
    let mut stdout = stdout();
    execute!(
        stdout,
        cursor::Show,
        SetForegroundColor(Color::Green),
        SetAttribute(Attribute::Bold)
    )?;
    print!("┌─[INPUT]─── {}\n└──╼ ", prompt);
    stdout.flush()?;
    execute!(stdout, SetAttribute(Attribute::Reset))?;
    Ok(())
}

pub fn draw_output_box(content: &str) -> io::Result<()> {
    let width = term_width().saturating_sub(4);

    println!("╔{}╗", "═".repeat(width));
    for line in content.lines() {
        if line.chars().count() < width {
            println!("║ {}{} ║", line, " ".repeat(width.saturating_sub(line.chars().count()).saturating_sub(2)));
        } else {
            // Word wrap
            let mut current_line = String::new();

            for word in line.split_whitespace() {
                if current_line.is_empty() {
                    current_line = word.to_string();
                } else if current_line.len() + word.len() + 1 < width.saturating_sub(2) {
                    current_line.push(' ');
                    current_line.push_str(word);
                } else {
                    println!("║ {}{} ║", current_line, " ".repeat(width.saturating_sub(current_line.len()).saturating_sub(2)));
                    current_line = word.to_string();
                }
            }

            if !current_line.is_empty() {
                println!("║ {}{} ║", current_line, " ".repeat(width.saturating_sub(current_line.len()).saturating_sub(2)));
            }
        }
    }
    println!("╚{}╝", "═".repeat(width));
    Ok(())
}

pub fn draw_error_box(error: &str) -> io::Result<()> {
    let mut stdout = stdout();
    execute!(stdout, SetForegroundColor(Color::Red), SetAttribute(Attribute::Bold))?;
    draw_output_box(error)?;
    execute!(stdout, SetAttribute(Attribute::Reset))?;
    Ok(())
}

pub fn draw_success_box(message: &str) -> io::Result<()> {
    let mut stdout = stdout();
    execute!(stdout, SetForegroundColor(Color::Green), SetAttribute(Attribute::Bold))?;
    draw_output_box(message)?;
    execute!(stdout, SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Conventional sectional-chart colors for each category.
pub fn category_color(category: FlightCategory) -> Color {
    match category {
        FlightCategory::Lifr => Color::Magenta,
        FlightCategory::Ifr => Color::Red,
        FlightCategory::Mvfr => Color::Blue,
        FlightCategory::Vfr => Color::Green,
        FlightCategory::Unknown => Color::Grey,
    }
}

pub fn draw_category_badge(label: &str, category: FlightCategory) -> io::Result<()> {
    let mut stdout = stdout();
    print!("  {} ", label);
    execute!(
        stdout,
        SetForegroundColor(Color::Black),
        SetBackgroundColor(category_color(category)),
        SetAttribute(Attribute::Bold)
    )?;
    print!(" {} ", category);
    execute!(stdout, SetAttribute(Attribute::Reset), SetBackgroundColor(Color::Reset))?;
    println!();
    Ok(())
}

fn clip(cell: &str, max: usize) -> String {
    if cell.chars().count() <= max {
        cell.to_string()
    } else {
        let kept: String = cell.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Boxed table; the last column is assumed to be the raw report and is
/// clipped so rows stay on one line.
pub fn draw_table(headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut stdout = stdout();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let fixed: usize = widths.iter().rev().skip(1).map(|w| w + 3).sum();
    if let Some(last) = widths.last_mut() {
        let room = term_width().saturating_sub(fixed + 4).max(20);
        *last = (*last).min(room).min(MAX_RAW_COLUMN);
    }

    let rule = |left: &str, mid: &str, right: &str| {
        let parts: Vec<String> = widths.iter().map(|w| "═".repeat(w + 2)).collect();
        format!("{}{}{}", left, parts.join(mid), right)
    };
    let format_row = |cells: &[String]| {
        let parts: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = clip(cells.get(i).map(String::as_str).unwrap_or(""), *w);
                format!(" {}{} ", cell, " ".repeat(w.saturating_sub(cell.chars().count())))
            })
            .collect();
        format!("║{}║", parts.join("│"))
    };

    execute!(stdout, SetForegroundColor(TABLE_COLOR))?;
    println!("{}", rule("╔", "╤", "╗"));
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    println!("{}", format_row(&header_cells));
    println!("{}", rule("╟", "┼", "╢").replace('═', "─"));
    execute!(stdout, SetAttribute(Attribute::Reset))?;

    for row in rows {
        println!("{}", format_row(row));
    }

    execute!(stdout, SetForegroundColor(TABLE_COLOR))?;
    println!("{}", rule("╚", "╧", "╝"));
    execute!(stdout, SetAttribute(Attribute::Reset))?;
    Ok(())
}

pub fn draw_metar_table(rows: &[MetarRow]) -> io::Result<()> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.observed.clone().unwrap_or_default(),
                row.category.to_string(),
                display_ceiling(row.ceiling_ft),
                display_visibility(row.visibility_sm),
                row.raw.clone(),
            ]
        })
        .collect();
    draw_table(&["Observed", "Cat", "Ceiling ft", "Vis SM", "Raw"], &cells)
}

pub fn draw_pirep_table(rows: &[PirepRow]) -> io::Result<()> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.observed.clone().unwrap_or_default(),
                join_heights(&row.bases),
                join_heights(&row.tops),
                row.raw.clone(),
            ]
        })
        .collect();
    draw_table(&["Observed", "Bases", "Tops", "Raw"], &cells)
}

pub fn read_single_char() -> io::Result<char> {
    let mut stdout = stdout();
    stdout.flush()?;

    enable_raw_mode()?;
    let result = restoring(read_key, disable_raw_mode);
    println!();
    result
}

// Runs in raw mode; the caller switches it back off whatever happens here.
fn read_key() -> io::Result<char> {
    // Drop anything typed while the screen was redrawing
    while crossterm::event::poll(std::time::Duration::from_millis(10))? {
        let _ = read()?;
    }

    let result: io::Result<char> = loop {
        if let Event::Key(key_event) = read()? {
            match key_event.code {
                KeyCode::Char(c) => {
                    break Ok(c);
                },
                KeyCode::Enter => {
                    break Err(io::Error::new(io::ErrorKind::Other, "Enter pressed"));
                },
                _ => continue
            }
        }
    };

    while crossterm::event::poll(std::time::Duration::from_millis(0))? {
        let _ = read()?;
    }

    result
}

/// Runs `body`, then `restore` no matter how `body` ended. The body's error
/// wins over the restore error.
fn restoring<T>(
    body: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

pub fn read_text(default: Option<&str>) -> io::Result<String> {
    let mut input = Input::<String>::new();
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    input.interact_text().map_err(prompt_error)
}

pub fn read_number<T>(default: T) -> io::Result<T>
where
    T: Clone + ToString + std::str::FromStr,
    <T as std::str::FromStr>::Err: ToString + std::fmt::Debug,
{
    Input::<T>::new()
        .default(default)
        .interact_text()
        .map_err(prompt_error)
}

pub fn select_site_from_list(sites: &[SavedSite]) -> io::Result<Option<SavedSite>> {
    let labels: Vec<String> = sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            format!(
                "{}. {} ({} | {:.4}, {:.4})",
                i + 1,
                site.name,
                site.station,
                site.latitude,
                site.longitude
            )
        })
        .collect();
    let options: Vec<&str> = labels.iter().map(String::as_str).collect();
    draw_menu_box("Saved Sites", &options)?;

    draw_input_prompt("Enter site number (0 to cancel)")?;
    let choice: usize = read_number(0)?;
    if choice == 0 || choice > sites.len() {
        return Ok(None);
    }
    Ok(Some(sites[choice - 1].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn restore_runs_after_a_failed_read() {
        let restored = Cell::new(false);
        let result: io::Result<char> = restoring(
            || Err(io::Error::new(io::ErrorKind::BrokenPipe, "event stream closed")),
            || {
                restored.set(true);
                Ok(())
            },
        );
        assert!(restored.get());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn restore_failure_is_reported_after_a_good_read() {
        let result = restoring(|| Ok('1'), || Err(io::Error::new(io::ErrorKind::Other, "tty gone")));
        assert!(result.is_err());

        assert_eq!(restoring(|| Ok('1'), || Ok(())).unwrap(), '1');
    }

    #[test]
    fn long_cells_are_clipped() {
        assert_eq!(clip("KTRI", 10), "KTRI");
        assert_eq!(clip("KTRI 171753Z", 8), "KTRI ...");
    }
}
